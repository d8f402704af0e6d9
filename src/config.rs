use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Default location of the secrets file, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";
/// Environment variable that points at a different secrets file.
pub const SECRETS_PATH_ENV: &str = "LAND_DASHBOARD_SECRETS";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ---------------------------------------------------------------------------
// Raw secrets, as found in the TOML file / environment
// ---------------------------------------------------------------------------

/// Flat key set, same names as the hosted dashboard's secrets. Every key may
/// also come from an environment variable of the same name.
#[derive(Deserialize, Default, Clone, PartialEq)]
pub struct Secrets {
    #[serde(rename = "AWS_ACCESS_KEY_ID")]
    pub access_key_id: Option<String>,
    #[serde(rename = "AWS_SECRET_ACCESS_KEY")]
    pub secret_access_key: Option<String>,
    #[serde(rename = "AWS_SESSION_TOKEN")]
    pub session_token: Option<String>,
    #[serde(rename = "AWS_REGION")]
    pub region: Option<String>,
    #[serde(rename = "BUCKET_NAME")]
    pub bucket: Option<String>,
    #[serde(rename = "FILE_KEY")]
    pub key: Option<String>,
    #[serde(rename = "S3_ENDPOINT")]
    pub endpoint: Option<String>,
    #[serde(rename = "TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
    #[serde(rename = "LOCAL_CSV")]
    pub local_csv: Option<PathBuf>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<redacted>"))
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("local_csv", &self.local_csv)
            .finish()
    }
}

impl Secrets {
    /// Read the secrets file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(SECRETS_PATH_ENV).unwrap_or_else(|_| DEFAULT_SECRETS_PATH.to_string());
        let mut secrets = Self::from_file(Path::new(&path))?;
        secrets.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(secrets)
    }

    /// A missing file is not an error; the environment may supply everything.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::warn!("No secrets file at {}, using environment only", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading secrets file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Replace fields with values from `lookup`, keyed by the TOML names.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let strings: [(&str, &mut Option<String>); 7] = [
            ("AWS_ACCESS_KEY_ID", &mut self.access_key_id),
            ("AWS_SECRET_ACCESS_KEY", &mut self.secret_access_key),
            ("AWS_SESSION_TOKEN", &mut self.session_token),
            ("AWS_REGION", &mut self.region),
            ("BUCKET_NAME", &mut self.bucket),
            ("FILE_KEY", &mut self.key),
            ("S3_ENDPOINT", &mut self.endpoint),
        ];
        for (name, field) in strings {
            if let Some(v) = lookup(name) {
                *field = Some(v);
            }
        }

        if let Some(v) = lookup("TIMEOUT_SECS") {
            let secs = v
                .trim()
                .parse()
                .with_context(|| format!("TIMEOUT_SECS must be a whole number, got '{v}'"))?;
            self.timeout_secs = Some(secs);
        }
        if let Some(v) = lookup("LOCAL_CSV") {
            self.local_csv = Some(PathBuf::from(v));
        }
        Ok(())
    }

    /// Decide where listings come from. A local CSV wins over S3.
    pub fn source(&self) -> Result<SourceConfig> {
        if let Some(path) = &self.local_csv {
            return Ok(SourceConfig::Local(path.clone()));
        }

        fn required(value: &Option<String>, name: &str) -> Result<String> {
            match value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => Ok(v.to_string()),
                _ => bail!("missing {name} (set it in the secrets file or environment)"),
            }
        }

        Ok(SourceConfig::S3(S3Settings {
            access_key_id: required(&self.access_key_id, "AWS_ACCESS_KEY_ID")?,
            secret_access_key: required(&self.secret_access_key, "AWS_SECRET_ACCESS_KEY")?,
            region: required(&self.region, "AWS_REGION")?,
            bucket: required(&self.bucket, "BUCKET_NAME")?,
            key: required(&self.key, "FILE_KEY")?,
            session_token: self.session_token.clone().filter(|t| !t.is_empty()),
            endpoint: self.endpoint.clone().filter(|e| !e.is_empty()),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }))
    }
}

// ---------------------------------------------------------------------------
// Resolved source configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    Local(PathBuf),
    S3(S3Settings),
}

/// Everything needed to fetch one object. Treated as opaque strings.
#[derive(Clone, PartialEq)]
pub struct S3Settings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub bucket: String,
    pub key: String,
    pub session_token: Option<String>,
    /// Path-style endpoint for S3-compatible stores; AWS when `None`.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
