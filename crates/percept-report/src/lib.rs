//! `percept-report` – the Reporting Sink.
//!
//! Everything the pipeline shows or persists goes through this crate.
//!
//! # Modules
//!
//! - [`table`] – [`render_fused_table`][table::render_fused_table]: fixed-width
//!   terminal table of fused objects.
//! - [`sink`] – [`DecisionSink`][sink::DecisionSink] trait and the
//!   [`TerminalSink`][sink::TerminalSink] that prints progressive brake /
//!   continue notifications.
//! - [`log`] – [`DecisionLog`][log::DecisionLog]: the persistent decision log
//!   file, plus [`read_log`][log::read_log] to parse one back.

pub mod log;
pub mod sink;
pub mod table;

pub use log::{DecisionLog, LoggedDecision, ParsedLog, read_log};
pub use sink::{DecisionSink, TerminalSink};
pub use table::{format_number, render_fused_table};
