//! [`SensorStore`] – bounded radar and camera collections for one run.
//!
//! Capacity is a configuration value, not a domain invariant. Input beyond it
//! is dropped and reported with a `warn!` event; it is never an error.
//! A malformed record ends a load early; the error is kept on the store
//! until that sensor is loaded again.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use percept_types::{CameraObservation, DEFAULT_CAPACITY, PerceptError, RadarObservation};
use tracing::{debug, error, warn};

use crate::parse::{LoadOutcome, SensorRecord, read_records};

/// Arrival-ordered radar and camera observations, each capped at `capacity`.
///
/// # Example
///
/// ```
/// use percept_store::SensorStore;
///
/// let mut store = SensorStore::new(2);
/// let n = store.load_radar("hdr\n1 10 1\n2 20 2\n3 30 3\n".as_bytes());
/// assert_eq!(n, 2);
/// assert!(store.radar_truncated());
/// ```
#[derive(Debug, Clone)]
pub struct SensorStore {
    capacity: usize,
    radar: Vec<RadarObservation>,
    camera: Vec<CameraObservation>,
    radar_truncated: bool,
    camera_truncated: bool,
    radar_malformed: Option<PerceptError>,
    camera_malformed: Option<PerceptError>,
}

impl Default for SensorStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SensorStore {
    /// Create an empty store holding at most `capacity` records per sensor.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            radar: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            camera: Vec::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            radar_truncated: false,
            camera_truncated: false,
            radar_malformed: None,
            camera_malformed: None,
        }
    }

    /// Replace the radar collection with records parsed from `source`.
    ///
    /// Returns the number of records kept.
    pub fn load_radar(&mut self, source: impl BufRead) -> usize {
        let outcome = read_records::<RadarObservation>(source, self.capacity);
        self.radar_truncated = outcome.truncated;
        self.radar_malformed = outcome.malformed.clone();
        self.radar = self.accept(outcome);
        self.radar.len()
    }

    /// Replace the camera collection with records parsed from `source`.
    ///
    /// Returns the number of records kept.
    pub fn load_camera(&mut self, source: impl BufRead) -> usize {
        let outcome = read_records::<CameraObservation>(source, self.capacity);
        self.camera_truncated = outcome.truncated;
        self.camera_malformed = outcome.malformed.clone();
        self.camera = self.accept(outcome);
        self.camera.len()
    }

    /// Load radar observations from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptError::SourceUnavailable`] when the file cannot be
    /// opened. The radar collection is left empty in that case.
    pub fn load_radar_file(&mut self, path: impl AsRef<Path>) -> Result<usize, PerceptError> {
        match open_source::<RadarObservation>(path.as_ref()) {
            Ok(reader) => Ok(self.load_radar(reader)),
            Err(e) => {
                self.radar.clear();
                self.radar_truncated = false;
                self.radar_malformed = None;
                Err(e)
            }
        }
    }

    /// Load camera observations from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptError::SourceUnavailable`] when the file cannot be
    /// opened. The camera collection is left empty in that case.
    pub fn load_camera_file(&mut self, path: impl AsRef<Path>) -> Result<usize, PerceptError> {
        match open_source::<CameraObservation>(path.as_ref()) {
            Ok(reader) => Ok(self.load_camera(reader)),
            Err(e) => {
                self.camera.clear();
                self.camera_truncated = false;
                self.camera_malformed = None;
                Err(e)
            }
        }
    }

    pub fn radar(&self) -> &[RadarObservation] {
        &self.radar
    }

    pub fn camera(&self) -> &[CameraObservation] {
        &self.camera
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` when the last radar load dropped input beyond capacity.
    pub fn radar_truncated(&self) -> bool {
        self.radar_truncated
    }

    /// `true` when the last camera load dropped input beyond capacity.
    pub fn camera_truncated(&self) -> bool {
        self.camera_truncated
    }

    /// The [`PerceptError::MalformedRecord`] that cut the last radar load
    /// short, if any. The records before it are kept.
    pub fn radar_malformed(&self) -> Option<&PerceptError> {
        self.radar_malformed.as_ref()
    }

    /// Camera counterpart of [`SensorStore::radar_malformed`].
    pub fn camera_malformed(&self) -> Option<&PerceptError> {
        self.camera_malformed.as_ref()
    }

    fn accept<T: SensorRecord>(&self, outcome: LoadOutcome<T>) -> Vec<T> {
        if outcome.truncated {
            warn!(
                sensor = T::KIND,
                capacity = self.capacity,
                "capacity reached; remaining records ignored"
            );
        }
        if let Some(err) = &outcome.malformed {
            warn!(
                sensor = T::KIND,
                kept = outcome.records.len(),
                error = %err,
                "stopped reading at malformed record"
            );
        }
        debug!(sensor = T::KIND, count = outcome.records.len(), "sensor records loaded");
        outcome.records
    }
}

fn open_source<T: SensorRecord>(path: &Path) -> Result<BufReader<File>, PerceptError> {
    File::open(path).map(BufReader::new).map_err(|e| {
        let err = PerceptError::SourceUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        };
        error!(sensor = T::KIND, error = %err, "sensor source unavailable");
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn radar_lines(n: usize) -> String {
        let mut s = String::from("object_id distance relative_speed\n");
        for i in 1..=n {
            s.push_str(&format!("{i} {}.5 1.0\n", i * 2));
        }
        s
    }

    #[test]
    fn default_capacity_is_two_hundred() {
        assert_eq!(SensorStore::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn more_than_capacity_keeps_first_entries_in_order() {
        let mut store = SensorStore::new(5);
        let n = store.load_radar(radar_lines(8).as_bytes());
        assert_eq!(n, 5);
        let ids: Vec<i64> = store.radar().iter().map(|r| r.object_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(store.radar_truncated());
    }

    #[test]
    fn default_store_caps_at_two_hundred() {
        let mut store = SensorStore::default();
        assert_eq!(store.load_radar(radar_lines(250).as_bytes()), 200);
        assert_eq!(store.radar().last().map(|r| r.object_id), Some(200));
    }

    #[test]
    fn reload_replaces_previous_contents() {
        let mut store = SensorStore::new(10);
        store.load_radar(radar_lines(4).as_bytes());
        store.load_radar(radar_lines(2).as_bytes());
        assert_eq!(store.radar().len(), 2);
        assert!(!store.radar_truncated());
    }

    #[test]
    fn missing_file_yields_source_unavailable_and_empty_collection() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let mut store = SensorStore::default();
        store.load_camera("hdr\n1 vehicle 0.9\n".as_bytes());
        assert_eq!(store.camera().len(), 1);

        let err = store
            .load_camera_file(dir.path().join("missing_camera.txt"))
            .unwrap_err();
        assert!(matches!(err, PerceptError::SourceUnavailable { .. }));
        assert!(store.camera().is_empty());
    }

    #[test]
    fn radar_failure_does_not_touch_camera() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let camera_path = dir.path().join("camera_data.txt");
        std::fs::write(&camera_path, "hdr\n1 vehicle 0.9\n2 bicycle 0.3\n").unwrap();

        let mut store = SensorStore::default();
        assert!(store.load_radar_file(dir.path().join("nope.txt")).is_err());
        assert_eq!(store.load_camera_file(&camera_path).unwrap(), 2);
        assert!(store.radar().is_empty());
    }

    #[test]
    fn malformed_record_is_kept_until_next_load() {
        let mut store = SensorStore::default();
        assert_eq!(store.load_radar("hdr\n1 10 1\n2 near 1\n3 80 1\n".as_bytes()), 1);
        assert!(matches!(
            store.radar_malformed(),
            Some(PerceptError::MalformedRecord { index: 1, .. })
        ));
        assert!(store.camera_malformed().is_none());

        store.load_radar(radar_lines(2).as_bytes());
        assert!(store.radar_malformed().is_none());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        write!(file, "{}", radar_lines(3)).unwrap();
        let mut store = SensorStore::default();
        assert_eq!(store.load_radar_file(file.path()).unwrap(), 3);
        assert!((store.radar()[2].distance - 6.5).abs() < 1e-12);
    }
}
