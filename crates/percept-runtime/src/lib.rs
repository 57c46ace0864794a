//! `percept-runtime` – one perception run, end to end.
//!
//! # Modules
//!
//! - [`pipeline`] – [`PerceptionRun`][pipeline::PerceptionRun]: loads both
//!   sensor files into a [`SensorStore`][percept_store::SensorStore], fuses
//!   them, prints the fused table, then decides and reports through the
//!   decision log and the terminal. Every stage reports failures into the
//!   returned [`RunSummary`][pipeline::RunSummary] instead of aborting.

pub mod pipeline;

pub use pipeline::{PerceptionRun, RunConfig, RunSummary};
