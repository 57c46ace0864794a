//! Sensor Fusion Engine.
//!
//! Combines the radar stream (range and closing speed) and the camera stream
//! (class label and confidence) into a single [`FusedObject`] per object.
//!
//! Two alignment strategies exist:
//!
//! - **Positional** (default) – the streams are assumed to be pre-sorted by
//!   the same id sequence. Index `i` of one stream is paired with index `i`
//!   of the other for as long as the ids agree; the first disagreement, or
//!   the end of the shorter stream, ends fusion. Everything after that point
//!   is dropped without error.
//! - **Keyed** – each radar observation is joined with the first camera
//!   observation that carries the same id, regardless of position. Radar
//!   order is kept; unmatched records on either side are dropped.
//!
//! # Example
//!
//! ```rust
//! use percept_fusion::{AlignmentStrategy, FusionEngine};
//! use percept_types::{CameraObservation, RadarObservation};
//!
//! let radar = vec![
//!     RadarObservation { object_id: 1, distance: 30.0, relative_speed: 5.0 },
//!     RadarObservation { object_id: 2, distance: 80.0, relative_speed: 1.0 },
//! ];
//! let camera = vec![
//!     CameraObservation::new(1, "pedestrian", 0.9),
//!     CameraObservation::new(3, "vehicle", 0.7),
//! ];
//!
//! let fused = FusionEngine::default().fuse(&radar, &camera);
//! assert_eq!(fused.len(), 1);
//! assert_eq!(fused[0].label, "pedestrian");
//!
//! let keyed = FusionEngine::new(AlignmentStrategy::Keyed).fuse(&radar, &camera);
//! assert_eq!(keyed.len(), 1);
//! ```

use std::collections::HashMap;

use percept_types::{CameraObservation, FusedObject, RadarObservation};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// AlignmentStrategy
// ────────────────────────────────────────────────────────────────────────────

/// How radar and camera observations are matched to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentStrategy {
    /// Equal id at equal index, stopping at the first mismatch.
    #[default]
    Positional,
    /// Join on `object_id`, independent of position.
    Keyed,
}

// ────────────────────────────────────────────────────────────────────────────
// FusionEngine
// ────────────────────────────────────────────────────────────────────────────

/// Produces [`FusedObject`] records from radar and camera observations.
///
/// The engine holds no state between calls; every [`FusionEngine::fuse`]
/// result is derived from its arguments alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionEngine {
    strategy: AlignmentStrategy,
}

impl FusionEngine {
    pub fn new(strategy: AlignmentStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AlignmentStrategy {
        self.strategy
    }

    /// Fuse `radar` with `camera` using the configured strategy.
    pub fn fuse(
        &self,
        radar: &[RadarObservation],
        camera: &[CameraObservation],
    ) -> Vec<FusedObject> {
        let fused = match self.strategy {
            AlignmentStrategy::Positional => fuse_positional(radar, camera),
            AlignmentStrategy::Keyed => fuse_keyed(radar, camera),
        };

        let dropped = radar.len().max(camera.len()) - fused.len();
        debug!(
            strategy = ?self.strategy,
            radar = radar.len(),
            camera = camera.len(),
            fused = fused.len(),
            dropped,
            "fusion complete"
        );
        fused
    }
}

/// Pair equal indices while their ids agree.
///
/// The output length is the number of consecutive matching pairs from the
/// start of both streams.
fn fuse_positional(radar: &[RadarObservation], camera: &[CameraObservation]) -> Vec<FusedObject> {
    radar
        .iter()
        .zip(camera)
        .map_while(|(r, c)| FusedObject::from_pair(r, c))
        .collect()
}

fn fuse_keyed(radar: &[RadarObservation], camera: &[CameraObservation]) -> Vec<FusedObject> {
    let mut by_id: HashMap<i64, &CameraObservation> = HashMap::with_capacity(camera.len());
    for c in camera {
        by_id.entry(c.object_id).or_insert(c);
    }
    radar
        .iter()
        .filter_map(|r| by_id.get(&r.object_id).and_then(|c| FusedObject::from_pair(r, c)))
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
