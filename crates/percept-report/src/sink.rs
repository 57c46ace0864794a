//! [`DecisionSink`] – consumer of decision outcomes.
//!
//! The runtime feeds every outcome to each sink in order, then calls
//! [`DecisionSink::finish`] once with the close-call total for the run.

use std::io::Write;

use colored::Colorize;
use percept_types::{Action, DecisionOutcome, PerceptError};

/// Receives the ordered decision outcomes of one run.
pub trait DecisionSink {
    /// Called once before the first outcome.
    fn begin(&mut self) -> Result<(), PerceptError> {
        Ok(())
    }

    /// Called once per outcome, in decision order.
    fn record(&mut self, outcome: &DecisionOutcome) -> Result<(), PerceptError>;

    /// Called once after the last outcome with the number of brake actions.
    fn finish(&mut self, brake_count: usize) -> Result<(), PerceptError>;
}

/// Prints a notification per outcome and the close-call total to a terminal.
pub struct TerminalSink<W: Write> {
    out: W,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DecisionSink for TerminalSink<W> {
    fn record(&mut self, outcome: &DecisionOutcome) -> Result<(), PerceptError> {
        let line = match outcome.action {
            Action::Brake => format!("Sending brake command for object: {}", outcome.object_id)
                .red()
                .bold(),
            Action::Continue => {
                format!("Continue along path for object: {}", outcome.object_id).green()
            }
        };
        writeln!(self.out)?;
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn finish(&mut self, brake_count: usize) -> Result<(), PerceptError> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}",
            format!("Number of close calls: {brake_count}").bold()
        )?;
        self.out.flush()?;
        Ok(())
    }
}
