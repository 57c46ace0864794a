//! [`PerceptionRun`] – store → fusion → decision → sinks.
//!
//! A run never aborts. Each stage that cannot do its job records a
//! [`PerceptError`] in the [`RunSummary`] and the run moves on:
//!
//! | failure              | effect                                         |
//! |----------------------|------------------------------------------------|
//! | sensor file missing  | that sensor has zero records                   |
//! | malformed record     | that sensor keeps the records before it        |
//! | decision log missing | no decisions, no notifications, no log written |
//! | a sink write fails   | that sink gets nothing more; the others finish |

use std::io::Write;
use std::path::PathBuf;

use percept_decision::{DecisionEngine, DecisionReport, Thresholds};
use percept_fusion::{AlignmentStrategy, FusionEngine};
use percept_report::{DecisionLog, DecisionSink, TerminalSink, render_fused_table};
use percept_store::SensorStore;
use percept_types::{DEFAULT_CAPACITY, DecisionOutcome, FusedObject, PerceptError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, info_span, warn};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Inputs and tuning for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_radar_path")]
    pub radar_path: PathBuf,

    #[serde(default = "default_camera_path")]
    pub camera_path: PathBuf,

    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Maximum records kept per sensor.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub alignment: AlignmentStrategy,

    #[serde(default)]
    pub thresholds: Thresholds,
}

fn default_radar_path() -> PathBuf {
    PathBuf::from("radar_data.txt")
}
fn default_camera_path() -> PathBuf {
    PathBuf::from("camera_data.txt")
}
fn default_log_path() -> PathBuf {
    PathBuf::from("perception_log.txt")
}
fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            radar_path: default_radar_path(),
            camera_path: default_camera_path(),
            log_path: default_log_path(),
            capacity: default_capacity(),
            alignment: AlignmentStrategy::default(),
            thresholds: Thresholds::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Summary
// ────────────────────────────────────────────────────────────────────────────

/// What happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub radar_records: usize,
    pub camera_records: usize,
    pub radar_truncated: bool,
    pub camera_truncated: bool,
    pub fused: Vec<FusedObject>,
    /// Empty when the decision step was skipped.
    pub outcomes: Vec<DecisionOutcome>,
    /// `None` when the decision step was skipped.
    pub close_calls: Option<usize>,
    /// Failures reported by the stages, in the order they happened.
    pub errors: Vec<PerceptError>,
}

impl RunSummary {
    pub fn decided(&self) -> bool {
        self.close_calls.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PerceptionRun
// ────────────────────────────────────────────────────────────────────────────

/// A single perception run. Build a fresh one per run; nothing carries over.
///
/// # Example
///
/// ```no_run
/// use percept_runtime::{PerceptionRun, RunConfig};
///
/// let summary = PerceptionRun::new(RunConfig::default()).execute(&mut std::io::stdout());
/// println!("close calls: {:?}", summary.close_calls);
/// ```
#[derive(Debug)]
pub struct PerceptionRun {
    config: RunConfig,
    store: SensorStore,
    fusion: FusionEngine,
    decision: DecisionEngine,
}

impl PerceptionRun {
    pub fn new(config: RunConfig) -> Self {
        Self {
            store: SensorStore::new(config.capacity),
            fusion: FusionEngine::new(config.alignment),
            decision: DecisionEngine::new(config.thresholds),
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every stage, writing terminal output to `terminal`.
    pub fn execute(mut self, terminal: &mut impl Write) -> RunSummary {
        let _span = info_span!("perception_run").entered();
        let mut summary = RunSummary::default();

        if let Err(e) = self.store.load_radar_file(&self.config.radar_path) {
            summary.errors.push(e);
        }
        summary.errors.extend(self.store.radar_malformed().cloned());
        if let Err(e) = self.store.load_camera_file(&self.config.camera_path) {
            summary.errors.push(e);
        }
        summary.errors.extend(self.store.camera_malformed().cloned());
        summary.radar_records = self.store.radar().len();
        summary.camera_records = self.store.camera().len();
        summary.radar_truncated = self.store.radar_truncated();
        summary.camera_truncated = self.store.camera_truncated();

        let fused = self.fusion.fuse(self.store.radar(), self.store.camera());
        if let Err(e) = render_fused_table(&fused, terminal) {
            warn!(error = %e, "failed to print fused table");
            summary.errors.push(e);
        }

        match DecisionLog::create(&self.config.log_path) {
            Ok(mut log) => {
                let report = self.decision.decide(&fused);
                let mut screen = TerminalSink::new(&mut *terminal);
                let mut sinks: [&mut dyn DecisionSink; 2] = [&mut log, &mut screen];
                summary.errors.extend(emit(&report, &mut sinks));
                summary.close_calls = Some(report.brake_count);
                summary.outcomes = report.outcomes;
            }
            Err(e) => {
                warn!("decision step skipped: decision log unavailable");
                summary.errors.push(e);
            }
        }

        summary.fused = fused;
        info!(
            radar = summary.radar_records,
            camera = summary.camera_records,
            fused = summary.fused.len(),
            close_calls = ?summary.close_calls,
            errors = summary.errors.len(),
            "perception run finished"
        );
        summary
    }
}

/// Feed `report` to every sink: header, each outcome in order, then the total.
///
/// Sinks fail independently. A sink whose call returns an error receives
/// nothing further; the others still see every outcome and the total. The
/// errors are returned in sink order.
pub fn emit(report: &DecisionReport, sinks: &mut [&mut dyn DecisionSink]) -> Vec<PerceptError> {
    let mut failures: Vec<Option<PerceptError>> = sinks.iter().map(|_| None).collect();

    drive(sinks, &mut failures, |sink| sink.begin());
    for outcome in &report.outcomes {
        drive(sinks, &mut failures, |sink| sink.record(outcome));
    }
    drive(sinks, &mut failures, |sink| sink.finish(report.brake_count));

    failures.into_iter().flatten().collect()
}

fn drive(
    sinks: &mut [&mut dyn DecisionSink],
    failures: &mut [Option<PerceptError>],
    mut step: impl FnMut(&mut dyn DecisionSink) -> Result<(), PerceptError>,
) {
    for (index, (sink, failure)) in sinks.iter_mut().zip(failures.iter_mut()).enumerate() {
        if failure.is_none()
            && let Err(e) = step(&mut **sink)
        {
            error!(sink = index, error = %e, "decision sink failed; no further output to it");
            *failure = Some(e);
        }
    }
}
