// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed values.
//!
//! [`Value`] is the structured side of every conversion. The loose side is
//! `serde_json::Value`, re-exported as [`Loose`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::{ConvertError, Result};
use crate::record::Record;

/// The loose, JSON-compatible value tree.
pub type Loose = serde_json::Value;

/// A typed value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent marker (`None` / null).
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex),
    Str(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(DateTimeValue),

    // Composites
    List(Vec<Value>),
    /// Unique elements, insertion order kept.
    Set(Vec<Value>),
    FrozenSet(Vec<Value>),
    Tuple(Vec<Value>),
    /// Ordered key/value pairs with unique keys.
    Map(Vec<(Value, Value)>),
    Record(Record),

    // Special
    /// Value of a user-defined named type.
    Custom { type_name: String, value: Box<Value> },
    /// Untyped value held in loose form.
    Any(Loose),
}

impl Value {
    /// Name of the runtime type, used for unstructure hook lookup.
    pub fn type_name(&self) -> &str {
        match self {
            Self::None => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Complex(_) => "complex",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::FrozenSet(_) => "frozenset",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "dict",
            Self::Record(r) => r.type_name(),
            Self::Custom { type_name, .. } => type_name,
            Self::Any(_) => "Any",
        }
    }

    /// Build a set, dropping later duplicates.
    pub fn set_of(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Set(dedup(items))
    }

    pub fn frozen_set_of(items: impl IntoIterator<Item = Value>) -> Self {
        Self::FrozenSet(dedup(items))
    }

    /// Build a map; a repeated key overwrites the earlier value in place.
    pub fn map_of(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut out: Vec<(Value, Value)> = Vec::new();
        for (key, value) in pairs {
            map_insert(&mut out, key, value);
        }
        Self::Map(out)
    }

    /// Wrap a value as an instance of a named custom type.
    pub fn custom(type_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Custom {
            type_name: type_name.into(),
            value: Box::new(value.into()),
        }
    }

    /// Check if value is the absent marker.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Elements of a list, set, frozen set or tuple.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) | Self::Set(v) | Self::FrozenSet(v) | Self::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a map entry by key.
    pub fn map_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Map(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

pub(crate) fn dedup(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

pub(crate) fn map_insert(pairs: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}

/// Sets and maps compare without regard to order.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Complex(a), Self::Complex(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Set(a), Self::Set(b)) | (Self::FrozenSet(a), Self::FrozenSet(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.contains(x))
            }
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            (Self::Record(a), Self::Record(b)) => a == b,
            (
                Self::Custom {
                    type_name: n1,
                    value: v1,
                },
                Self::Custom {
                    type_name: n2,
                    value: v2,
                },
            ) => n1 == n2 && v1 == v2,
            (Self::Any(a), Self::Any(b)) => a == b,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Complex
// ---------------------------------------------------------------------------

/// Complex number with `f64` parts.
///
/// Text form is `(a+bj)` (`(2+0j)`, `(1.5-2j)`), or `bj` when the real part
/// is positive zero. Parsing also accepts the unparenthesized form, a bare
/// real part and a bare imaginary part (`3j`, `-j`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.re == 0.0 && self.re.is_sign_positive() {
            write!(f, "{}j", self.im)
        } else if self.im.is_sign_negative() {
            write!(f, "({}-{}j)", self.re, -self.im)
        } else {
            write!(f, "({}+{}j)", self.re, self.im)
        }
    }
}

impl FromStr for Complex {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut text = s.trim();
        if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            text = inner.trim();
        }
        if text.is_empty() {
            return Err("empty complex literal".into());
        }

        let parse = |part: &str| -> std::result::Result<f64, String> {
            match part {
                "" | "+" => Ok(1.0),
                "-" => Ok(-1.0),
                other => other
                    .parse::<f64>()
                    .map_err(|e| format!("{other:?}: {e}")),
            }
        };

        let Some(body) = text.strip_suffix(['j', 'J']) else {
            return text
                .parse::<f64>()
                .map(|re| Self::new(re, 0.0))
                .map_err(|e| format!("{text:?}: {e}"));
        };

        // Split at the last sign that is not part of an exponent.
        let bytes = body.as_bytes();
        let split = (1..bytes.len())
            .rev()
            .find(|&i| matches!(bytes[i], b'+' | b'-') && !matches!(bytes[i - 1], b'e' | b'E'));

        match split {
            Some(i) => {
                let re = body[..i]
                    .parse::<f64>()
                    .map_err(|e| format!("{:?}: {e}", &body[..i]))?;
                Ok(Self::new(re, parse(&body[i..])?))
            }
            None => Ok(Self::new(0.0, parse(body)?)),
        }
    }
}

// ---------------------------------------------------------------------------
// DateTimeValue
// ---------------------------------------------------------------------------

/// A date/time, naive or carrying a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Offset(DateTime<FixedOffset>),
}

impl DateTimeValue {
    /// Parse ISO-8601 text.
    ///
    /// Accepts a `T` or space separator, optional fractional seconds, an
    /// optional `Z`/`±hh:mm` offset, and a bare date (midnight).
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(Self::Offset(dt));
        }
        for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
            if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
                return Some(Self::Offset(dt));
            }
        }
        for fmt in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                return Some(Self::Naive(dt));
            }
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(|d| Self::Naive(d.and_time(NaiveTime::MIN)))
    }

    /// ISO-8601 text. Fractional seconds only when non-zero, as six digits
    /// (nine when there is sub-microsecond precision).
    pub fn iso_format(&self) -> String {
        let (nanos, offset) = match self {
            Self::Naive(dt) => (dt.nanosecond(), ""),
            Self::Offset(dt) => (dt.nanosecond(), "%:z"),
        };
        let fraction = match nanos {
            0 => "",
            n if n % 1_000 == 0 => "%.6f",
            _ => "%.9f",
        };
        let pattern = format!("%Y-%m-%dT%H:%M:%S{fraction}{offset}");
        match self {
            Self::Naive(dt) => dt.format(&pattern).to_string(),
            Self::Offset(dt) => dt.format(&pattern).to_string(),
        }
    }

    /// Calendar date part.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Naive(dt) => dt.date(),
            Self::Offset(dt) => dt.date_naive(),
        }
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.iso_format())
    }
}

// ---------------------------------------------------------------------------
// Conversion traits
// ---------------------------------------------------------------------------

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Complex> for Value {
    fn from(v: Complex) -> Self {
        Self::Complex(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(DateTimeValue::Naive(v))
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::DateTime(DateTimeValue::Offset(v))
    }
}

impl From<DateTimeValue> for Value {
    fn from(v: DateTimeValue) -> Self {
        Self::DateTime(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

/// Trait for extracting Rust values from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: &str, got: &Value) -> ConvertError {
    ConvertError::ConversionFailure {
        target: expected.to_string(),
        value: format!("{got:?}"),
        reason: format!("value is {}", got.type_name()),
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch($name, other)),
                }
            }
        }
    };
}

impl_from_value!(bool, Bool, "bool");
impl_from_value!(i64, Int, "int");
impl_from_value!(f64, Float, "float");
impl_from_value!(Complex, Complex, "complex");
impl_from_value!(String, Str, "str");
impl_from_value!(NaiveDate, Date, "date");
impl_from_value!(DateTimeValue, DateTime, "datetime");
impl_from_value!(Record, Record, "record");

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self> {
        let items = value.as_sequence().ok_or_else(|| mismatch("sequence", value))?;
        items.iter().map(T::from_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(1i64).type_name(), "int");
        assert_eq!(Value::from("a").type_name(), "str");
        assert_eq!(Value::None.type_name(), "None");
        assert_eq!(Value::Tuple(vec![]).type_name(), "tuple");
        assert_eq!(Value::Map(vec![]).type_name(), "dict");
        assert_eq!(Value::custom("CapitalStr", "Monkey").type_name(), "CapitalStr");
    }

    #[test]
    fn test_set_dedup_and_unordered_eq() {
        let a = Value::set_of(vec![1i64.into(), 2i64.into(), 1i64.into()]);
        assert_eq!(a.as_sequence().map(<[Value]>::len), Some(2));
        let b = Value::set_of(vec![2i64.into(), 1i64.into()]);
        assert_eq!(a, b);
        assert_ne!(a, Value::frozen_set_of(vec![1i64.into(), 2i64.into()]));
    }

    #[test]
    fn test_map_last_key_wins() {
        let m = Value::map_of(vec![
            ("a".into(), 1i64.into()),
            ("b".into(), 2i64.into()),
            ("a".into(), 3i64.into()),
        ]);
        assert_eq!(m.map_get(&"a".into()), Some(&Value::Int(3)));
        let Value::Map(pairs) = &m else {
            panic!("map expected");
        };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Value::from("a"));
    }

    #[test]
    fn test_complex_text_form() {
        assert_eq!(Complex::new(2.0, 0.0).to_string(), "(2+0j)");
        assert_eq!(Complex::new(1.5, -2.0).to_string(), "(1.5-2j)");
        assert_eq!(Complex::new(0.0, 2.0).to_string(), "2j");
        assert_eq!(Complex::new(0.0, -0.5).to_string(), "-0.5j");
        assert_eq!(Complex::new(-0.0, 1.0).to_string(), "(-0+1j)");
        for c in [Complex::new(2.0, 0.0), Complex::new(0.0, 2.0), Complex::new(1.5, -2.0)] {
            assert_eq!(c.to_string().parse::<Complex>(), Ok(c));
        }
        for (text, expected) in [
            ("2+0j", Complex::new(2.0, 0.0)),
            ("(1.5-2j)", Complex::new(1.5, -2.0)),
            ("3", Complex::new(3.0, 0.0)),
            ("-j", Complex::new(0.0, -1.0)),
            ("4J", Complex::new(0.0, 4.0)),
            ("1e3+2e-1j", Complex::new(1000.0, 0.2)),
        ] {
            assert_eq!(text.parse::<Complex>(), Ok(expected), "{text}");
        }
        assert!("abc".parse::<Complex>().is_err());
        assert!("1+xj".parse::<Complex>().is_err());
    }

    #[test]
    fn test_datetime_parse_and_format() {
        let naive = DateTimeValue::parse("2024-03-01T10:20:30.123456").expect("naive");
        assert!(matches!(naive, DateTimeValue::Naive(_)));
        assert_eq!(naive.iso_format(), "2024-03-01T10:20:30.123456");

        let whole = DateTimeValue::parse("2024-03-01 10:20:30").expect("space");
        assert_eq!(whole.iso_format(), "2024-03-01T10:20:30");

        let zoned = DateTimeValue::parse("2024-03-01T10:20:30+02:00").expect("zoned");
        assert!(matches!(zoned, DateTimeValue::Offset(_)));
        assert_eq!(zoned.iso_format(), "2024-03-01T10:20:30+02:00");

        let date_only = DateTimeValue::parse("2024-03-01").expect("date");
        assert_eq!(date_only.iso_format(), "2024-03-01T00:00:00");
        assert_eq!(date_only.date(), NaiveDate::from_ymd_opt(2024, 3, 1).expect("ymd"));

        let millis = DateTimeValue::parse("2024-03-01T10:20:30.25").expect("millis");
        assert_eq!(millis.iso_format(), "2024-03-01T10:20:30.250000");
        let zoned_millis = DateTimeValue::parse("2024-03-01T10:20:30.5+02:00").expect("zoned");
        assert_eq!(zoned_millis.iso_format(), "2024-03-01T10:20:30.500000+02:00");
        let nanos = DateTimeValue::parse("2024-03-01T10:20:30.123456789").expect("nanos");
        assert_eq!(nanos.iso_format(), "2024-03-01T10:20:30.123456789");

        assert!(DateTimeValue::parse("yesterday").is_none());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i64::from_value(&Value::Int(3)), Ok(3));
        assert!(i64::from_value(&Value::Str("3".into())).is_err());
        assert_eq!(
            Option::<i64>::from_value(&Value::None),
            Ok(None)
        );
        assert_eq!(
            Vec::<String>::from_value(&Value::Tuple(vec!["a".into(), "b".into()])),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
    }
}
