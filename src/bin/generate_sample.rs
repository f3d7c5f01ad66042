use anyhow::{Context, Result};
use nomi_piacenza::data::model::Record;

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
}

/// Expected yearly births for a name: base popularity drifting linearly
/// over the years, scaled by citizenship group.
fn expected_births(popularity: f64, trend: f64, year: i32, group_share: f64) -> f64 {
    let drift = 1.0 + trend * f64::from(year - 2015) / 10.0;
    (popularity * drift * group_share).max(0.0)
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_nomi.csv".to_string());

    let mut rng = SimpleRng::new(42);

    // (name, sex, popularity, trend)
    let names: [(&str, &str, f64, f64); 16] = [
        ("Leonardo", "M", 14.0, 0.4),
        ("Francesco", "M", 12.0, -0.1),
        ("Alessandro", "M", 11.0, -0.3),
        ("Lorenzo", "M", 10.0, 0.1),
        ("Mattia", "M", 8.0, -0.5),
        ("Mario", "M", 3.0, -0.2),
        ("Mohamed", "M", 5.0, 0.3),
        ("Adam", "M", 4.0, 0.6),
        ("Sofia", "F", 13.0, 0.0),
        ("Aurora", "F", 11.0, 0.5),
        ("Giulia", "F", 10.0, -0.4),
        ("Ginevra", "F", 8.0, 0.3),
        ("Alice", "F", 7.0, 0.1),
        ("Maria", "F", 4.0, -0.2),
        ("Sara", "F", 5.0, 0.0),
        ("Amira", "F", 3.0, 0.7),
    ];
    // (group, share of births)
    let groups = [("Italiani", 0.75), ("Stranieri", 0.25)];

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    let mut rows = 0usize;
    for year in 2005..=2025 {
        for &(name, sex, popularity, trend) in &names {
            for &(group, share) in &groups {
                let mean = expected_births(popularity, trend, year, share);
                let occurrences = (mean * (0.5 + rng.next_f64())).round() as u64;
                // The published dataset omits zero counts.
                if occurrences == 0 {
                    continue;
                }
                writer.serialize(Record {
                    name: name.to_string(),
                    citizenship_group: group.to_string(),
                    sex: sex.to_string(),
                    birth_year: year,
                    occurrences,
                })?;
                rows += 1;
            }
        }
    }
    writer.flush().context("flushing CSV")?;

    println!("Wrote {rows} rows to {output_path}");
    Ok(())
}
