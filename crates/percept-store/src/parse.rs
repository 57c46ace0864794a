//! Record parsing for whitespace-delimited sensor files.
//!
//! A sensor file is one header line followed by a stream of tokens. Every
//! record is the next three tokens, so line breaks inside the body carry no
//! meaning. Reading stops at the first of:
//!
//! - end of input (a trailing partial record is dropped),
//! - the configured capacity,
//! - a record whose tokens fail to parse.
//!
//! Records read before the stop are always kept.

use std::io::BufRead;
use std::ops::RangeInclusive;

use percept_types::{CameraObservation, PerceptError, RadarObservation};

// ────────────────────────────────────────────────────────────────────────────
// SensorRecord trait
// ────────────────────────────────────────────────────────────────────────────

/// A record type that can be parsed from three whitespace-separated tokens.
pub trait SensorRecord: Sized {
    /// Short name used in log fields, e.g. `"radar"`.
    const KIND: &'static str;

    /// Parse one record from its three tokens.
    fn from_tokens(tokens: [&str; 3]) -> Result<Self, String>;
}

impl SensorRecord for RadarObservation {
    const KIND: &'static str = "radar";

    fn from_tokens([id, distance, speed]: [&str; 3]) -> Result<Self, String> {
        Ok(RadarObservation {
            object_id: parse_id(id)?,
            distance: parse_float("distance", distance, 0.0..=f64::MAX)?,
            relative_speed: parse_float("relative_speed", speed, f64::MIN..=f64::MAX)?,
        })
    }
}

impl SensorRecord for CameraObservation {
    const KIND: &'static str = "camera";

    fn from_tokens([id, label, confidence]: [&str; 3]) -> Result<Self, String> {
        Ok(CameraObservation::new(
            parse_id(id)?,
            label,
            parse_float("confidence", confidence, 0.0..=1.0)?,
        ))
    }
}

fn parse_id(token: &str) -> Result<i64, String> {
    token
        .parse::<i64>()
        .map_err(|e| format!("object_id '{token}': {e}"))
}

/// Parse a finite number inside `range`. `nan` and `inf` are rejected.
fn parse_float(field: &str, token: &str, range: RangeInclusive<f64>) -> Result<f64, String> {
    let value = token
        .parse::<f64>()
        .map_err(|e| format!("{field} '{token}': {e}"))?;
    if !range.contains(&value) {
        return Err(format!(
            "{field} '{token}': outside [{}, {}]",
            range.start(),
            range.end()
        ));
    }
    Ok(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Loading
// ────────────────────────────────────────────────────────────────────────────

/// Result of reading one sensor source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome<T> {
    /// Records read, in input order.
    pub records: Vec<T>,
    /// `true` when reading stopped at capacity with input still remaining.
    pub truncated: bool,
    /// The record that stopped reading early, if any.
    pub malformed: Option<PerceptError>,
}

/// Read up to `capacity` records of type `T` from `source`, skipping the
/// first (header) line.
///
/// ```
/// use percept_store::parse::read_records;
/// use percept_types::RadarObservation;
///
/// let input = "object_id distance speed\n1 20.5 3.0\n2 81.0 0.5\n";
/// let outcome = read_records::<RadarObservation>(input.as_bytes(), 200);
/// assert_eq!(outcome.records.len(), 2);
/// assert!(!outcome.truncated);
/// ```
pub fn read_records<T: SensorRecord>(source: impl BufRead, capacity: usize) -> LoadOutcome<T> {
    let mut tokens = Tokens::new(source);
    let mut outcome = LoadOutcome {
        records: Vec::new(),
        truncated: false,
        malformed: None,
    };

    tokens.skip_line();

    loop {
        if outcome.records.len() >= capacity {
            outcome.truncated = tokens.has_more();
            break;
        }
        let index = outcome.records.len();
        let Some(first) = tokens.next() else { break };
        let (Some(second), Some(third)) = (tokens.next(), tokens.next()) else {
            break;
        };
        match T::from_tokens([first.as_str(), second.as_str(), third.as_str()]) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                outcome.malformed = Some(PerceptError::MalformedRecord { index, reason });
                break;
            }
        }
    }

    if let Some(err) = tokens.error.take() {
        outcome.malformed.get_or_insert(err);
    }

    outcome
}

/// Lazy whitespace tokenizer over a [`BufRead`].
///
/// A read error (including invalid UTF-8) ends the stream and is remembered
/// so that the caller can report it like any other malformed record.
struct Tokens<R> {
    source: R,
    pending: std::collections::VecDeque<String>,
    exhausted: bool,
    lines_read: usize,
    error: Option<PerceptError>,
}

impl<R: BufRead> Tokens<R> {
    fn new(source: R) -> Self {
        Self {
            source,
            pending: std::collections::VecDeque::new(),
            exhausted: false,
            lines_read: 0,
            error: None,
        }
    }

    fn read_line(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let mut line = String::new();
        match self.source.read_line(&mut line) {
            Ok(0) => {
                self.exhausted = true;
                None
            }
            Ok(_) => {
                self.lines_read += 1;
                Some(line)
            }
            Err(e) => {
                self.exhausted = true;
                self.error = Some(PerceptError::MalformedRecord {
                    index: self.lines_read,
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    fn skip_line(&mut self) {
        let _ = self.read_line();
    }

    fn fill(&mut self) -> bool {
        while self.pending.is_empty() {
            let Some(line) = self.read_line() else {
                return false;
            };
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        true
    }

    fn has_more(&mut self) -> bool {
        self.fill()
    }
}

impl<R: BufRead> Iterator for Tokens<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.fill() {
            self.pending.pop_front()
        } else {
            None
        }
    }
}
