//! Decision log file.
//!
//! # Format
//!
//! ```text
//!       object_id                                Decision      object avoided
//!               1                     breaking for object          pedestrian
//!               2        continuing to destination object             vehicle
//! Collisions avoided: 1
//! ```
//!
//! Columns are right-aligned to widths 15, 40 and 20. The trailing line holds
//! the number of brake decisions in the file.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use percept_types::{Action, DecisionOutcome, PerceptError};
use tracing::error;

use crate::sink::DecisionSink;

const ID_WIDTH: usize = 15;
const DECISION_WIDTH: usize = 40;
const LABEL_WIDTH: usize = 20;
const AGGREGATE_PREFIX: &str = "Collisions avoided:";

// ────────────────────────────────────────────────────────────────────────────
// Writer
// ────────────────────────────────────────────────────────────────────────────

/// Writes decision outcomes in the log format above.
///
/// Labels are written as-is. [`read_log`] recovers them exactly unless they
/// begin or end with whitespace, which the column padding absorbs.
pub struct DecisionLog<W: Write> {
    out: W,
}

impl DecisionLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptError::SinkUnavailable`] when the file cannot be
    /// opened for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PerceptError> {
        let path = path.as_ref();
        File::create(path)
            .map(|f| Self::new(BufWriter::new(f)))
            .map_err(|e| {
                let err = PerceptError::SinkUnavailable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                };
                error!(error = %err, "decision log unavailable");
                err
            })
    }
}

impl<W: Write> DecisionLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DecisionSink for DecisionLog<W> {
    fn begin(&mut self) -> Result<(), PerceptError> {
        writeln!(
            self.out,
            "{:>ID_WIDTH$}{:>DECISION_WIDTH$}{:>LABEL_WIDTH$}",
            "object_id", "Decision", "object avoided"
        )?;
        Ok(())
    }

    fn record(&mut self, outcome: &DecisionOutcome) -> Result<(), PerceptError> {
        writeln!(
            self.out,
            "{:>ID_WIDTH$}{:>DECISION_WIDTH$}{:>LABEL_WIDTH$}",
            outcome.object_id,
            outcome.action.log_text(),
            outcome.label
        )?;
        Ok(())
    }

    fn finish(&mut self, brake_count: usize) -> Result<(), PerceptError> {
        writeln!(self.out, "{AGGREGATE_PREFIX} {brake_count}")?;
        self.out.flush()?;
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Reader
// ────────────────────────────────────────────────────────────────────────────

/// One decision line read back from a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedDecision {
    pub object_id: i64,
    pub action: Action,
    pub label: String,
}

/// A fully parsed decision log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    pub decisions: Vec<LoggedDecision>,
    /// Value of the trailing `Collisions avoided:` line.
    pub collisions_avoided: usize,
}

impl ParsedLog {
    /// Number of brake decisions among [`ParsedLog::decisions`].
    pub fn brake_lines(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.action == Action::Brake)
            .count()
    }
}

/// Parse a decision log written by [`DecisionLog`].
///
/// The first line is treated as the header. Blank lines are ignored.
///
/// # Errors
///
/// [`PerceptError::InvalidLog`] when a decision line does not have the
/// `id decision label` shape, when anything follows the aggregate line, or
/// when the aggregate line is missing.
pub fn read_log(source: impl BufRead) -> Result<ParsedLog, PerceptError> {
    let mut lines = source.lines();
    if lines.next().transpose()?.is_none() {
        return Err(PerceptError::InvalidLog("empty log".to_string()));
    }

    let mut decisions = Vec::new();
    let mut collisions_avoided = None;

    for (n, line) in lines.enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if collisions_avoided.is_some() {
            return Err(PerceptError::InvalidLog(format!(
                "line {}: content after aggregate line",
                n + 2
            )));
        }
        if let Some(count) = trimmed.strip_prefix(AGGREGATE_PREFIX) {
            let count = count.trim().parse::<usize>().map_err(|e| {
                PerceptError::InvalidLog(format!("line {}: aggregate count: {e}", n + 2))
            })?;
            collisions_avoided = Some(count);
            continue;
        }
        decisions.push(parse_decision_line(trimmed).map_err(|reason| {
            PerceptError::InvalidLog(format!("line {}: {reason}", n + 2))
        })?);
    }

    let collisions_avoided = collisions_avoided
        .ok_or_else(|| PerceptError::InvalidLog("missing aggregate line".to_string()))?;

    Ok(ParsedLog {
        decisions,
        collisions_avoided,
    })
}

fn parse_decision_line(line: &str) -> Result<LoggedDecision, String> {
    let (id, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("expected 'id decision label', got '{line}'"))?;
    let object_id = id
        .parse::<i64>()
        .map_err(|e| format!("object_id '{id}': {e}"))?;
    let rest = rest.trim_start();
    let (action, label) = [Action::Brake, Action::Continue]
        .into_iter()
        .find_map(|action| rest.strip_prefix(action.log_text()).map(|label| (action, label)))
        .ok_or_else(|| format!("unknown decision in '{line}'"))?;
    Ok(LoggedDecision {
        object_id,
        action,
        label: label.trim_start().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<DecisionOutcome> {
        vec![
            DecisionOutcome {
                object_id: 1,
                label: "pedestrian".to_string(),
                action: Action::Brake,
            },
            DecisionOutcome {
                object_id: 2,
                label: "vehicle".to_string(),
                action: Action::Continue,
            },
            DecisionOutcome {
                object_id: 3,
                label: "bicycle".to_string(),
                action: Action::Brake,
            },
        ]
    }

    fn write_all(outcomes: &[DecisionOutcome], brake_count: usize) -> String {
        let mut log = DecisionLog::new(Vec::new());
        log.begin().unwrap();
        for o in outcomes {
            log.record(o).unwrap();
        }
        log.finish(brake_count).unwrap();
        String::from_utf8(log.into_inner()).unwrap()
    }

    #[test]
    fn log_layout_matches_column_widths() {
        let text = write_all(&outcomes(), 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].len(), ID_WIDTH + DECISION_WIDTH + LABEL_WIDTH);
        assert!(lines[0].trim_start().starts_with("object_id"));
        assert!(lines[1].contains("breaking for object"));
        assert!(lines[2].contains("continuing to destination object"));
        assert_eq!(lines[4], "Collisions avoided: 2");
    }

    #[test]
    fn written_log_reads_back_identically() {
        let outcomes = outcomes();
        let text = write_all(&outcomes, 2);
        let parsed = read_log(text.as_bytes()).unwrap();

        assert_eq!(parsed.collisions_avoided, 2);
        assert_eq!(parsed.brake_lines(), 2);
        assert_eq!(parsed.decisions.len(), outcomes.len());
        for (read, written) in parsed.decisions.iter().zip(&outcomes) {
            assert_eq!(read.object_id, written.object_id);
            assert_eq!(read.action, written.action);
            assert_eq!(read.label, written.label);
        }
    }

    #[test]
    fn empty_run_log_reads_back() {
        let text = write_all(&[], 0);
        let parsed = read_log(text.as_bytes()).unwrap();
        assert!(parsed.decisions.is_empty());
        assert_eq!(parsed.collisions_avoided, 0);
    }

    #[test]
    fn missing_aggregate_is_invalid() {
        let text = write_all(&outcomes(), 2);
        let truncated: String = text.lines().take(3).map(|l| format!("{l}\n")).collect();
        assert!(matches!(
            read_log(truncated.as_bytes()),
            Err(PerceptError::InvalidLog(_))
        ));
    }

    #[test]
    fn labels_with_spaces_or_empty_read_back() {
        let outcomes = vec![
            DecisionOutcome {
                object_id: 8,
                label: "traffic cone".to_string(),
                action: Action::Continue,
            },
            DecisionOutcome {
                object_id: 9,
                label: String::new(),
                action: Action::Brake,
            },
            DecisionOutcome {
                object_id: 10,
                label: "articulated truck xl".to_string(),
                action: Action::Brake,
            },
        ];
        let parsed = read_log(write_all(&outcomes, 2).as_bytes()).unwrap();
        let labels: Vec<&str> = parsed.decisions.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["traffic cone", "", "articulated truck xl"]);
        assert_eq!(parsed.brake_lines(), 2);
    }

    #[test]
    fn unknown_decision_text_is_invalid() {
        let text = "hdr\n   7   swerving around   vehicle\nCollisions avoided: 0\n";
        assert!(read_log(text.as_bytes()).is_err());
    }

    #[test]
    fn create_in_missing_directory_is_sink_unavailable() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let err = DecisionLog::create(dir.path().join("no/such/dir/log.txt"))
            .err()
            .expect("create must fail");
        assert!(matches!(err, PerceptError::SinkUnavailable { .. }));
    }

    #[test]
    fn file_log_roundtrip() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("perception_log.txt");
        let mut log = DecisionLog::create(&path).unwrap();
        log.begin().unwrap();
        for o in &outcomes() {
            log.record(o).unwrap();
        }
        log.finish(2).unwrap();
        drop(log);

        let file = std::io::BufReader::new(File::open(&path).unwrap());
        let parsed = read_log(file).unwrap();
        assert_eq!(parsed.decisions.len(), 3);
        assert_eq!(parsed.collisions_avoided, 2);
    }
}
