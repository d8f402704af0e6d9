//! Writes `sample_listings.csv` for running the dashboard without S3:
//!
//! ```text
//! cargo run --bin generate_sample
//! LOCAL_CSV=sample_listings.csv cargo run
//! ```

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// `$` + comma grouping, the way listing exports usually write prices.
fn dollars(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::from("$");
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn main() -> anyhow::Result<()> {
    let mut rng = SimpleRng::new(42);

    // (county, typical price per acre)
    let counties = [
        ("Bexar", 18_000.0),
        ("Travis", 45_000.0),
        ("Comal", 25_000.0),
        ("Kendall", 22_000.0),
        ("Bandera", 9_000.0),
        ("Kerr", 11_000.0),
    ];
    let terrain = ["Wooded", "Pasture", "Creek frontage", "Hill Country views", "Cleared"];
    // Cells exports sometimes carry instead of a number.
    let odd_prices = ["N/A", "Call for price", "", "TBD"];

    let output_path = "sample_listings.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["County", "Price", "Acres", "URL", "Terrain"])?;

    let n_rows = 120;
    for id in 0..n_rows {
        let (county, per_acre) = counties[id % counties.len()];
        let acres = (rng.range(1.0, 150.0) * 100.0).round() / 100.0;

        let price = if rng.next_f64() < 0.08 {
            rng.pick(&odd_prices).to_string()
        } else {
            let noisy = per_acre * acres * rng.range(0.7, 1.3);
            dollars((noisy / 1000.0).round() as u64 * 1000)
        };

        let url = format!("https://example.com/land/{county}/{}", 10_000 + id);
        writer.write_record([
            county,
            price.as_str(),
            acres.to_string().as_str(),
            url.as_str(),
            rng.pick(&terrain),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {n_rows} listings to {output_path}");
    Ok(())
}
