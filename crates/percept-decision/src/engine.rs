//! [`DecisionEngine`] – braking rule over fused objects.
//!
//! An object triggers [`Action::Brake`] when it is both close and confidently
//! classified:
//!
//! ```text
//! brake  ⇔  distance < dist_threshold  ∧  confidence > confidence_gate
//! ```
//!
//! Everything else is [`Action::Continue`]. The engine keeps no state between
//! calls; the brake tally is part of the returned [`DecisionReport`].

use percept_types::{Action, DecisionOutcome, FusedObject};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ────────────────────────────────────────────────────────────────────────────
// Thresholds
// ────────────────────────────────────────────────────────────────────────────

/// Fixed thresholds for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Objects closer than this (feet) are braking candidates.
    #[serde(default = "default_dist_threshold")]
    pub dist_threshold: f64,

    /// Declared high-confidence level. Not consulted by the braking rule,
    /// which gates on [`Thresholds::confidence_gate`].
    #[serde(default = "default_cfd_threshold")]
    pub cfd_threshold: f64,

    /// Minimum (exclusive) classifier confidence for a braking candidate.
    #[serde(default = "default_confidence_gate")]
    pub confidence_gate: f64,
}

fn default_dist_threshold() -> f64 {
    70.0
}
fn default_cfd_threshold() -> f64 {
    0.8
}
fn default_confidence_gate() -> f64 {
    0.5
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            dist_threshold: default_dist_threshold(),
            cfd_threshold: default_cfd_threshold(),
            confidence_gate: default_confidence_gate(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DecisionReport
// ────────────────────────────────────────────────────────────────────────────

/// Ordered outcomes of one [`DecisionEngine::decide`] call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionReport {
    /// One outcome per input object, in input order.
    pub outcomes: Vec<DecisionOutcome>,
    /// Number of [`Action::Brake`] outcomes.
    pub brake_count: usize,
}

impl DecisionReport {
    /// Outcomes that required braking.
    pub fn close_calls(&self) -> impl Iterator<Item = &DecisionOutcome> {
        self.outcomes.iter().filter(|o| o.action == Action::Brake)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// DecisionEngine
// ────────────────────────────────────────────────────────────────────────────

/// Applies the braking rule to fused objects.
///
/// # Example
///
/// ```
/// use percept_decision::DecisionEngine;
/// use percept_types::{Action, CameraObservation, FusedObject, RadarObservation};
///
/// let radar = RadarObservation { object_id: 1, distance: 25.0, relative_speed: 8.0 };
/// let camera = CameraObservation::new(1, "pedestrian", 0.93);
/// let fused = FusedObject::from_pair(&radar, &camera).unwrap();
///
/// let report = DecisionEngine::default().decide(&[fused]);
/// assert_eq!(report.outcomes[0].action, Action::Brake);
/// assert_eq!(report.brake_count, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine {
    thresholds: Thresholds,
}

impl DecisionEngine {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Decide the action for a single fused object.
    pub fn classify(&self, object: &FusedObject) -> Action {
        if object.distance < self.thresholds.dist_threshold
            && object.confidence > self.thresholds.confidence_gate
        {
            Action::Brake
        } else {
            Action::Continue
        }
    }

    /// Decide every object in `objects`, preserving order, and count brakes.
    pub fn decide(&self, objects: &[FusedObject]) -> DecisionReport {
        let mut report = DecisionReport {
            outcomes: Vec::with_capacity(objects.len()),
            brake_count: 0,
        };

        for object in objects {
            let action = self.classify(object);
            if action == Action::Brake {
                report.brake_count += 1;
            }
            debug!(
                object_id = object.object_id,
                distance = object.distance,
                confidence = object.confidence,
                ?action,
                "decision"
            );
            report.outcomes.push(DecisionOutcome {
                object_id: object.object_id,
                label: object.label.clone(),
                action,
            });
        }

        info!(
            objects = objects.len(),
            close_calls = report.brake_count,
            "decisions complete"
        );
        report
    }
}
