//! `percept-datagen` – synthetic radar and camera files.
//!
//! Produces a matching pair of sensor files whose object ids run
//! sequentially from 1, so the default positional fusion pairs every record.
//!
//! | file   | column              | distribution                     |
//! |--------|---------------------|----------------------------------|
//! | radar  | distance (ft)       | uniform `[1, 101]`, 6 sig. digits|
//! | radar  | relative speed (mph)| uniform `[0, 15]`, 6 sig. digits |
//! | camera | object type         | one of [`OBJECT_TYPES`]          |
//! | camera | confidence          | uniform `[0, 1]`, two decimals   |
//!
//! The pipeline crates never depend on this one; any other producer of the
//! same file format is interchangeable with it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use percept_report::format_number;
use percept_types::{DEFAULT_CAPACITY, PerceptError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

/// Object classes the camera generator draws from.
pub const OBJECT_TYPES: [&str; 3] = ["pedestrian", "vehicle", "bicycle"];

const COLUMN_WIDTH: usize = 15;

/// Writes synthetic sensor data using any [`Rng`].
///
/// # Example
///
/// ```
/// use percept_datagen::Generator;
///
/// let mut generator = Generator::seeded(7, 3);
/// let mut radar = Vec::new();
/// let mut camera = Vec::new();
/// generator.write_radar(&mut radar).unwrap();
/// generator.write_camera(&mut camera).unwrap();
/// assert_eq!(String::from_utf8(radar).unwrap().lines().count(), 4);
/// ```
pub struct Generator<R: Rng> {
    rng: R,
    count: usize,
}

impl Generator<StdRng> {
    /// Reproducible generator for `count` objects.
    pub fn seeded(seed: u64, count: usize) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), count)
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(count: usize) -> Self {
        Self::with_rng(StdRng::from_entropy(), count)
    }
}

impl Default for Generator<StdRng> {
    fn default() -> Self {
        Self::from_entropy(DEFAULT_CAPACITY)
    }
}

impl<R: Rng> Generator<R> {
    pub fn with_rng(rng: R, count: usize) -> Self {
        Self { rng, count }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Write a radar file: header plus `count` lines of `id distance speed`.
    pub fn write_radar(&mut self, out: &mut impl Write) -> Result<(), PerceptError> {
        writeln!(
            out,
            "{:>w$}{:>w$}{:>w$}",
            "object_id",
            "distance (ft)",
            "relative_speed (mph)",
            w = COLUMN_WIDTH
        )?;
        for id in 1..=self.count {
            let distance: f64 = self.rng.gen_range(1.0..=101.0);
            let relative_speed: f64 = self.rng.gen_range(0.0..=15.0);
            writeln!(
                out,
                "{id:>w$}{:>w$}{:>w$}",
                format_number(distance),
                format_number(relative_speed),
                w = COLUMN_WIDTH
            )?;
        }
        Ok(())
    }

    /// Write a camera file: header plus `count` lines of `id label confidence`.
    pub fn write_camera(&mut self, out: &mut impl Write) -> Result<(), PerceptError> {
        writeln!(
            out,
            "{:>w$}{:>w$}{:>w$}",
            "object_id",
            "object_type",
            "confidence (0-1)",
            w = COLUMN_WIDTH
        )?;
        for id in 1..=self.count {
            let label = OBJECT_TYPES[self.rng.gen_range(0..OBJECT_TYPES.len())];
            let confidence: f64 = self.rng.gen_range(0.0..=1.0);
            writeln!(
                out,
                "{id:>w$}{label:>w$}{confidence:>w$.2}",
                w = COLUMN_WIDTH
            )?;
        }
        Ok(())
    }

    /// Create (or truncate) both files and fill them.
    ///
    /// Each file is written independently: a radar failure does not prevent
    /// the camera file from being produced. The first error is returned.
    pub fn write_files(
        &mut self,
        radar_path: impl AsRef<Path>,
        camera_path: impl AsRef<Path>,
    ) -> Result<(), PerceptError> {
        let radar = create_output(radar_path.as_ref()).and_then(|mut out| {
            self.write_radar(&mut out)?;
            out.flush()?;
            Ok(())
        });
        let camera = create_output(camera_path.as_ref()).and_then(|mut out| {
            self.write_camera(&mut out)?;
            out.flush()?;
            Ok(())
        });
        info!(
            count = self.count,
            radar = %radar_path.as_ref().display(),
            camera = %camera_path.as_ref().display(),
            "sensor files generated"
        );
        radar.and(camera)
    }
}

fn create_output(path: &Path) -> Result<BufWriter<File>, PerceptError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| PerceptError::SinkUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use percept_store::SensorStore;

    #[test]
    fn same_seed_same_output() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        Generator::seeded(42, 20).write_radar(&mut a).unwrap();
        Generator::seeded(42, 20).write_radar(&mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generated_values_stay_in_range() {
        let mut generator = Generator::seeded(1, 200);
        let mut radar = Vec::new();
        let mut camera = Vec::new();
        generator.write_radar(&mut radar).unwrap();
        generator.write_camera(&mut camera).unwrap();

        let mut store = SensorStore::default();
        assert_eq!(store.load_radar(radar.as_slice()), 200);
        assert_eq!(store.load_camera(camera.as_slice()), 200);

        for (i, r) in store.radar().iter().enumerate() {
            assert_eq!(r.object_id, i as i64 + 1);
            assert!((1.0..=101.0).contains(&r.distance));
            assert!((0.0..=15.0).contains(&r.relative_speed));
        }
        for c in store.camera() {
            assert!(OBJECT_TYPES.contains(&c.label.as_str()));
            assert!((0.0..=1.0).contains(&c.confidence));
        }
    }

    #[test]
    fn radar_values_use_six_significant_digits() {
        let mut radar = Vec::new();
        Generator::seeded(11, 50).write_radar(&mut radar).unwrap();
        let text = String::from_utf8(radar).unwrap();
        for line in text.lines().skip(1) {
            for value in line.split_whitespace().skip(1) {
                let digits = value.chars().filter(char::is_ascii_digit).count();
                assert!(digits <= 6, "{value}");
                assert!(!value.contains('.') || !value.ends_with('0'), "{value}");
            }
        }
    }

    #[test]
    fn write_files_creates_both_files() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let radar = dir.path().join("radar_data.txt");
        let camera = dir.path().join("camera_data.txt");
        Generator::seeded(3, 5).write_files(&radar, &camera).unwrap();

        let radar_text = std::fs::read_to_string(&radar).unwrap();
        let camera_text = std::fs::read_to_string(&camera).unwrap();
        assert_eq!(radar_text.lines().count(), 6);
        assert!(camera_text.starts_with("      object_id"));
    }

    #[test]
    fn unwritable_path_still_writes_the_other_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let camera = dir.path().join("camera_data.txt");
        let result =
            Generator::seeded(3, 5).write_files(dir.path().join("missing/radar.txt"), &camera);
        assert!(matches!(result, Err(PerceptError::SinkUnavailable { .. })));
        assert!(camera.exists());
    }
}
