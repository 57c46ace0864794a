//! Fixed-width table of fused objects.
//!
//! Five right-aligned columns of width [`COLUMN_WIDTH`]. Numbers are printed
//! with six significant digits and no trailing zeros (see [`format_number`]).

use std::io::Write;

use percept_types::{FusedObject, PerceptError};

/// Width of every column in the fused-object table.
pub const COLUMN_WIDTH: usize = 30;

const HEADINGS: [&str; 5] = [
    "obj id",
    "obj type",
    "confidence",
    "obj distance",
    "obj relative speed (mph)",
];

/// Write the fused-object table to `out`.
///
/// ```
/// use percept_report::render_fused_table;
/// use percept_types::FusedObject;
///
/// let rows = vec![FusedObject {
///     object_id: 1,
///     label: "vehicle".into(),
///     confidence: 0.75,
///     distance: 42.125,
///     relative_speed: 3.0,
/// }];
/// let mut out = Vec::new();
/// render_fused_table(&rows, &mut out).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains("Fused Data shown below:"));
/// assert!(text.contains("42.125"));
/// ```
pub fn render_fused_table(rows: &[FusedObject], out: &mut impl Write) -> Result<(), PerceptError> {
    writeln!(out)?;
    writeln!(out, "Fused Data shown below:")?;
    for heading in HEADINGS {
        write!(out, "{heading:>w$}", w = COLUMN_WIDTH)?;
    }
    writeln!(out)?;

    for row in rows {
        writeln!(
            out,
            "{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}",
            row.object_id,
            row.label,
            format_number(row.confidence),
            format_number(row.distance),
            format_number(row.relative_speed),
            w = COLUMN_WIDTH,
        )?;
    }
    Ok(())
}

/// Format `value` with six significant digits, dropping trailing zeros.
///
/// Magnitudes below `1e-4` or at/above `1e6` switch to exponent notation
/// (`1.5e+06`).
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // Rounded to six significant digits: "d.ddddde<exp>".
    let sci = format!("{value:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if !(-4..6).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.abs());
    }

    let decimals = (5 - exp).max(0) as usize;
    trim_zeros(&format!("{value:.decimals$}")).to_string()
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
