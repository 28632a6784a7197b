//! Answer normalisation onto the common 1–5 continuum.
//!
//! Unparseable input yields `None` and is left out of aggregation; it is never an error.

use crate::key::{AnswerValue, ScaleType};

/// Textual labels from the agreement, frequency and intensity scales.
const LABELS: [(&str, f64); 17] = [
    ("strongly disagree", 1.0),
    ("disagree",          2.0),
    ("neutral",           3.0),
    ("agree",             4.0),
    ("strongly agree",    5.0),
    ("never",             1.0),
    ("rarely",            2.0),
    ("sometimes",         3.0),
    ("often",             4.0),
    ("always",            5.0),
    ("very low",          1.0),
    ("low",               2.0),
    ("slightly low",      2.0),
    ("moderate",          3.0),
    ("slightly high",     4.0),
    ("high",              4.0),
    ("very high",         5.0),
];

/// Parse a raw answer into a number on its native scale.
///
/// Finite numbers pass through. Strings are read by their leading digits
/// (`"4 - Agree"` → 4), falling back to the label dictionary. The result is always finite.
pub fn parse_numeric(raw: &AnswerValue) -> Option<f64> {
    match raw {
        AnswerValue::Number(n) if n.is_finite() => Some(*n),
        AnswerValue::Number(_) => None,
        AnswerValue::Text(s)   => leading_integer(s).or_else(|| label_value(s)),
        AnswerValue::Other(_)  => None,
    }
}

fn leading_integer(s: &str) -> Option<f64> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn label_value(s: &str) -> Option<f64> {
    let label = s.trim().to_lowercase();
    LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, v)| *v)
}

/// Reverse a value on its native scale: 7-point → 8 − v, 5-point family → 6 − v.
pub fn reverse_on_native(v: f64, scale: &ScaleType) -> f64 {
    if scale.is_seven_point() {
        8.0 - v
    } else if scale.is_five_point() {
        6.0 - v
    } else {
        v
    }
}

/// Convert a native value to the common 1–5 range. 7-point scales are rescaled linearly.
pub fn to_common5(v: f64, scale: &ScaleType) -> f64 {
    if scale.is_seven_point() {
        1.0 + (v - 1.0) * (4.0 / 6.0)
    } else {
        v
    }
}

/// Full normalisation of one answer: parse, optionally reverse, convert range.
pub fn normalise_answer(raw: &AnswerValue, scale: &ScaleType, reverse_scored: bool) -> Option<f64> {
    let v = parse_numeric(raw)?;
    let native = if reverse_scored { reverse_on_native(v, scale) } else { v };
    Some(to_common5(native, scale)).filter(|v| v.is_finite())
}
