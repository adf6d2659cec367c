//! Raw cell values as decoded from a spreadsheet, and numeric coercion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single decoded cell. Mirrors what a spreadsheet decoder hands over:
/// a string, a number, or nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Blank for column-extent purposes: no value or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Numeric contribution of this cell. See [`to_number`].
    pub fn to_number(&self) -> f64 {
        to_number(self)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&number_text(*n)),
        }
    }
}

/// Shortest text for a number, in the form spreadsheet users see in web
/// tools: plain digits between 1e-6 and 1e21, exponent form (`1e-7`,
/// `1.5e+21`) outside that. Keyword conditions match against this text.
fn number_text(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let text = format!("{:e}", n);
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    if n.fract() == 0.0 && abs < 1e15 {
        return (n as i64).to_string();
    }
    n.to_string()
}

/// Coerce a cell into a number.
///
/// Numbers pass through. Anything else is stringified, stripped of every
/// character that is not a digit, `.` or `-`, and the longest leading float
/// is parsed from what remains. Thousands separators, currency symbols and
/// trailing units therefore vanish ("$1,234.50 USD" is 1234.5). Input with no
/// extractable number is 0.
pub fn to_number(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::Empty => 0.0,
        CellValue::Text(s) => parse_lenient(s),
    }
}

/// The text half of [`to_number`].
pub fn parse_lenient(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    leading_float(&cleaned).unwrap_or(0.0)
}

/// Parse `[-]digits[.digits]` from the start of `s`, ignoring whatever follows.
/// "12-3" is 12, "1.2.3" is 1.2, ".5" is 0.5, "-" and "." are nothing.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}
