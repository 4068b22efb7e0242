//! Writes a synthetic ellipsometer line-scan table in the layout `xyz-plot`
//! reads: two metadata rows, one header row, then repeating (x, y, n) groups.

fn index_profile(x: f64, y: f64) -> f64 {
    // Refractive index with a shallow radial dip around the wafer centre.
    let r2 = (x - 5.0).powi(2) + (y - 5.0).powi(2);
    1.46 - 0.02 * (-r2 / 18.0).exp()
}

/// Deterministic noise source (splitmix64).
struct Noise(u64);

impl Noise {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller
    fn gauss(&mut self, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

fn main() -> anyhow::Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data_plotting.csv".to_string());

    let mut noise = Noise(42);

    // Line scans at y = 1, 2, ..., 9 cm, each sampled every 0.5 cm along x.
    let scan_ys: Vec<f64> = (1..=9).map(f64::from).collect();
    let xs: Vec<f64> = (0..=20).map(|i| f64::from(i) * 0.5).collect();

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&output_path)?;

    writer.write_record(["Ellipsometer line scans (synthetic)"])?;
    writer.write_record([""])?;

    let header: Vec<&str> = scan_ys
        .iter()
        .flat_map(|_| ["x (cm)", "y (cm)", "n"])
        .collect();
    writer.write_record(&header)?;

    for &x in &xs {
        let mut row = Vec::with_capacity(scan_ys.len() * 3);
        for &y in &scan_ys {
            let n = index_profile(x, y) + noise.gauss(0.0005);
            row.push(format!("{x:.1}"));
            row.push(format!("{y:.1}"));
            row.push(format!("{n:.5}"));
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;

    println!(
        "Wrote {} line scans ({} points each) to {output_path}",
        scan_ys.len(),
        xs.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_seeded_and_in_unit_interval() {
        let (mut a, mut b) = (Noise(42), Noise(42));
        for _ in 0..1000 {
            let v = a.next_f64();
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, b.next_f64());
        }
        assert_ne!(Noise(1).next_f64(), Noise(2).next_f64());
    }
}
