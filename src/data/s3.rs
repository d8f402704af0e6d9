//! Signed `GET` of a single S3 object (AWS Signature Version 4).

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use super::loader::{DataSource, LoadError};
use crate::config::S3Settings;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of an empty body; GET requests carry no payload.
const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

pub struct S3Source {
    settings: S3Settings,
    client: Client,
}

impl S3Source {
    pub fn new(settings: S3Settings) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;
        Ok(Self { settings, client })
    }
}

impl DataSource for S3Source {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.settings.bucket, self.settings.key)
    }

    fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let request = SignedRequest::get_object(&self.settings, Utc::now());

        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("S3 GET {} returned {status}: {body}", request.url);
            return Err(LoadError::SourceUnavailable(format!(
                "{} returned HTTP {status}",
                self.describe()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Request signing
// ---------------------------------------------------------------------------

/// URL plus the headers that must accompany it, `Authorization` included.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn get_object(settings: &S3Settings, now: DateTime<Utc>) -> Self {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let encoded_key = uri_encode(&settings.key, false);
        let (host, path, base) = match &settings.endpoint {
            Some(endpoint) => {
                let base = endpoint.trim_end_matches('/').to_string();
                let host = base
                    .split_once("://")
                    .map(|(_, rest)| rest)
                    .unwrap_or(&base)
                    .to_string();
                let path = format!("/{}/{}", uri_encode(&settings.bucket, true), encoded_key);
                (host, path, base)
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", settings.bucket, settings.region);
                let path = format!("/{encoded_key}");
                let base = format!("https://{host}");
                (host, path, base)
            }
        };

        // Canonical headers must be sorted by lowercase name.
        let mut signed: Vec<(String, String)> = vec![
            ("host".to_string(), host),
            ("x-amz-content-sha256".to_string(), EMPTY_PAYLOAD_SHA256.to_string()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        if let Some(token) = &settings.session_token {
            signed.push(("x-amz-security-token".to_string(), token.clone()));
        }
        signed.sort_by(|a, b| a.0.cmp(&b.0));

        let canonical_headers: String = signed
            .iter()
            .map(|(k, v)| format!("{k}:{}\n", v.trim()))
            .collect();
        let signed_headers = signed
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "GET\n{path}\n\n{canonical_headers}\n{signed_headers}\n{EMPTY_PAYLOAD_SHA256}"
        );

        let scope = format!("{date}/{}/{SERVICE}/aws4_request", settings.region);
        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            hex(&Sha256::digest(canonical_request.as_bytes()))
        );

        let key = signing_key(&settings.secret_access_key, &date, &settings.region);
        let signature = hex(&hmac_sha256(&key, string_to_sign.as_bytes()));

        let authorization = format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            settings.access_key_id
        );

        // reqwest sets Host itself.
        let mut headers: Vec<(String, String)> =
            signed.into_iter().filter(|(k, _)| k != "host").collect();
        headers.push(("authorization".to_string(), authorization));

        SignedRequest {
            url: format!("{base}{path}"),
            headers,
        }
    }
}

fn signing_key(secret: &str, date: &str, region: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // HMAC accepts keys of any length, so construction cannot fail.
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 takes keys of any size"),
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Percent-encode everything except RFC 3986 unreserved characters.
/// `/` is kept as-is for object keys, which may contain path segments.
fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b'/' if !encode_slash => out.push('/'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn settings() -> S3Settings {
        S3Settings {
            access_key_id: "AKIDEXAMPLE".into(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".into(),
            region: "us-east-1".into(),
            bucket: "land-data".into(),
            key: "exports/listings 2024.csv".into(),
            session_token: None,
            endpoint: None,
            timeout_secs: 30,
        }
    }

    impl SignedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 24, 8, 30, 0).unwrap()
    }

    #[test]
    fn hmac_matches_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        assert_eq!(
            hex(&mac),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn empty_payload_hash_constant() {
        assert_eq!(hex(&Sha256::digest(b"")), EMPTY_PAYLOAD_SHA256);
    }

    #[test]
    fn key_encoding_keeps_slashes() {
        assert_eq!(uri_encode("a b/c+d~e.csv", false), "a%20b/c%2Bd~e.csv");
        assert_eq!(uri_encode("a/b", true), "a%2Fb");
    }

    #[test]
    fn virtual_hosted_url_and_headers() {
        let req = SignedRequest::get_object(&settings(), at());
        assert_eq!(
            req.url,
            "https://land-data.s3.us-east-1.amazonaws.com/exports/listings%202024.csv"
        );
        assert_eq!(req.header("x-amz-date"), Some("20240524T083000Z"));
        assert_eq!(req.header("x-amz-content-sha256"), Some(EMPTY_PAYLOAD_SHA256));
        assert_eq!(req.header("host"), None);

        let auth = req.header("authorization").unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240524/us-east-1/s3/aws4_request, \
             SignedHeaders=host;x-amz-content-sha256;x-amz-date, Signature="
        ));
        let signature = auth.rsplit("Signature=").next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_is_deterministic_and_secret_dependent() {
        let a = SignedRequest::get_object(&settings(), at());
        let b = SignedRequest::get_object(&settings(), at());
        assert_eq!(a.header("authorization"), b.header("authorization"));

        let mut other = settings();
        other.secret_access_key = "different".into();
        let c = SignedRequest::get_object(&other, at());
        assert_ne!(a.header("authorization"), c.header("authorization"));
    }

    #[test]
    fn session_token_is_signed() {
        let mut s = settings();
        s.session_token = Some("token123".into());
        let req = SignedRequest::get_object(&s, at());
        assert_eq!(req.header("x-amz-security-token"), Some("token123"));
        assert!(req
            .header("authorization")
            .unwrap()
            .contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date;x-amz-security-token,"));
    }

    #[test]
    fn custom_endpoint_uses_path_style() {
        let mut s = settings();
        s.endpoint = Some("http://localhost:9000/".into());
        let req = SignedRequest::get_object(&s, at());
        assert_eq!(
            req.url,
            "http://localhost:9000/land-data/exports/listings%202024.csv"
        );
    }
}
