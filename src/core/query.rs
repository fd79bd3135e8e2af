//! Query values and read-time coercion.
//!
//! The fragment always stores strings. When the query is exposed to consumers,
//! values that read as numbers are converted, following the string-to-number
//! grammar browsers use for `Number(value)`, restricted to finite results.

use super::codec::HashParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A coerced query value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Number(f64),
    Text(String),
}

/// Coerced view of every fragment parameter.
pub type Query = BTreeMap<String, QueryValue>;

impl QueryValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Ordered set of query edits: `Some` sets a key, `None` deletes it.
///
/// # Example
///
/// ```rust
/// use hashstate::core::QueryUpdate;
///
/// let update = QueryUpdate::new().set("count", 42).set("tab", "profile").remove("draft");
/// assert_eq!(update.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryUpdate {
    entries: Vec<(String, Option<QueryValue>)>,
}

impl QueryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`.
    pub fn set(self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.entry(key, Some(value.into()))
    }

    /// Delete `key`.
    pub fn remove(self, key: impl Into<String>) -> Self {
        self.entry(key, None)
    }

    /// Add an edit; a later edit of the same key overrides an earlier one.
    pub fn entry(mut self, key: impl Into<String>, value: Option<QueryValue>) -> Self {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&QueryValue>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for QueryUpdate
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |update, (k, v)| update.entry(k, v.map(Into::into)))
    }
}

/// Coerce a single raw value.
///
/// # Example
///
/// ```rust
/// use hashstate::core::{coerce_value, QueryValue};
///
/// assert_eq!(coerce_value("42"), QueryValue::Number(42.0));
/// assert_eq!(coerce_value("3.25"), QueryValue::Number(3.25));
/// assert_eq!(coerce_value("1.2.3"), QueryValue::Text("1.2.3".into()));
/// assert_eq!(coerce_value(""), QueryValue::Text(String::new()));
/// ```
pub fn coerce_value(raw: &str) -> QueryValue {
    match parse_number(raw) {
        Some(n) => QueryValue::Number(n),
        None => QueryValue::Text(raw.to_string()),
    }
}

/// Coerce every parameter of a fragment.
pub fn coerce(params: &HashParams) -> Query {
    params
        .iter()
        .map(|(key, value)| (key.to_string(), coerce_value(value)))
        .collect()
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Parse a string-numeric literal, returning `None` for anything that would
/// not convert to a finite number.
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return None;
    }

    let value = match radix_of(trimmed) {
        Some((radix, digits)) => parse_radix_integer(digits, radix)?,
        None if is_decimal_literal(trimmed) => trimmed.parse::<f64>().ok()?,
        None => return None,
    };

    value.is_finite().then_some(value)
}

fn radix_of(s: &str) -> Option<(u32, &str)> {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    Some((radix, &s[2..]))
}

fn parse_radix_integer(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}

/// Render a number the way it is written back into a fragment.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        // Positional notation only for exponents in -6..=20.
        let scientific = format!("{n:e}");
        let parts = scientific
            .split_once('e')
            .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)));
        match parts {
            Some((_, exp)) if (-6..21).contains(&exp) => n.to_string(),
            Some((mantissa, exp)) if exp > 0 => format!("{mantissa}e+{exp}"),
            Some((mantissa, exp)) => format!("{mantissa}e{exp}"),
            None => n.to_string(),
        }
    }
}
