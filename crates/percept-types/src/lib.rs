//! `percept-types` – shared data model for the perception pipeline.
//!
//! Every other crate in the workspace speaks in these types: the raw sensor
//! observations produced by the store, the [`FusedObject`] records produced by
//! the fusion engine, and the [`DecisionOutcome`] records consumed by the
//! reporting sinks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default maximum number of records held per sensor collection in one run.
pub const DEFAULT_CAPACITY: usize = 200;

/// Maximum number of characters kept from a camera label.
pub const MAX_LABEL_LEN: usize = 19;

// ────────────────────────────────────────────────────────────────────────────
// Observations
// ────────────────────────────────────────────────────────────────────────────

/// A single radar return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadarObservation {
    pub object_id: i64,
    /// Range to the object (feet).
    pub distance: f64,
    /// Closing speed relative to the vehicle (mph).
    pub relative_speed: f64,
}

/// A single camera classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraObservation {
    pub object_id: i64,
    /// Object class, e.g. `"pedestrian"`. At most [`MAX_LABEL_LEN`] characters.
    pub label: String,
    /// Classifier confidence in `[0, 1]`.
    pub confidence: f64,
}

impl CameraObservation {
    /// Build an observation, truncating `label` to [`MAX_LABEL_LEN`] characters.
    pub fn new(object_id: i64, label: &str, confidence: f64) -> Self {
        Self {
            object_id,
            label: truncate_label(label),
            confidence,
        }
    }
}

/// Cut `label` down to at most [`MAX_LABEL_LEN`] characters.
pub fn truncate_label(label: &str) -> String {
    label.chars().take(MAX_LABEL_LEN).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Fused record
// ────────────────────────────────────────────────────────────────────────────

/// Radar and camera observations of the same object combined into one record.
///
/// Only obtainable through [`FusedObject::from_pair`], which refuses to pair
/// observations whose ids differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedObject {
    pub object_id: i64,
    pub label: String,
    pub confidence: f64,
    pub distance: f64,
    pub relative_speed: f64,
}

impl FusedObject {
    /// Fuse `radar` and `camera`, or `None` when their ids do not match.
    ///
    /// ```
    /// use percept_types::{CameraObservation, FusedObject, RadarObservation};
    ///
    /// let radar = RadarObservation { object_id: 7, distance: 42.0, relative_speed: 3.5 };
    /// let camera = CameraObservation::new(7, "vehicle", 0.92);
    /// let fused = FusedObject::from_pair(&radar, &camera).unwrap();
    /// assert_eq!(fused.label, "vehicle");
    /// assert_eq!(fused.distance, 42.0);
    ///
    /// let other = CameraObservation::new(8, "vehicle", 0.92);
    /// assert!(FusedObject::from_pair(&radar, &other).is_none());
    /// ```
    pub fn from_pair(radar: &RadarObservation, camera: &CameraObservation) -> Option<Self> {
        if radar.object_id != camera.object_id {
            return None;
        }
        Some(Self {
            object_id: radar.object_id,
            label: camera.label.clone(),
            confidence: camera.confidence,
            distance: radar.distance,
            relative_speed: radar.relative_speed,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Decisions
// ────────────────────────────────────────────────────────────────────────────

/// What the vehicle does about a fused object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Brake,
    Continue,
}

impl Action {
    /// Text written to the decision log for this action.
    pub fn log_text(self) -> &'static str {
        match self {
            Action::Brake => "breaking for object",
            Action::Continue => "continuing to destination object",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.log_text())
    }
}

impl FromStr for Action {
    type Err = PerceptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "breaking for object" => Ok(Action::Brake),
            "continuing to destination object" => Ok(Action::Continue),
            other => Err(PerceptError::InvalidLog(format!(
                "unknown decision text '{other}'"
            ))),
        }
    }
}

/// The decision taken for one fused object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionOutcome {
    pub object_id: i64,
    pub label: String,
    pub action: Action,
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Errors reported by the pipeline stages. None of them is fatal to a run.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PerceptError {
    #[error("Source unavailable: unable to open {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("Malformed record {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("Sink unavailable: unable to open {path}: {reason}")]
    SinkUnavailable { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid decision log: {0}")]
    InvalidLog(String),
}

impl From<std::io::Error> for PerceptError {
    fn from(e: std::io::Error) -> Self {
        PerceptError::Io(e.to_string())
    }
}
