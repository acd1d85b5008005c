// Copyright 2025 Filterql Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for filterql - runtime values with type information
//!
//! This module provides the tagged [`Value`] union the evaluator computes
//! with, the widening rules between its numeric members, and the explicit
//! conversion machinery behind the `Convert` function.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::{Error, Result};
use super::types::ValueType;

/// Timestamp formats supported for parsing
/// Order matters - more specific formats first
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z", // RFC3339 with fractional seconds
    "%Y-%m-%dT%H:%M:%S%:z",    // RFC3339
    "%Y-%m-%dT%H:%M:%SZ",      // RFC3339 UTC
    "%Y-%m-%dT%H:%M:%S%.f",    // ISO with fractional seconds
    "%Y-%m-%dT%H:%M:%S",       // ISO without timezone
    "%Y-%m-%d %H:%M:%S%.f",    // SQL-style with fractional seconds
    "%Y-%m-%d %H:%M:%S",       // SQL-style
    "%Y-%m-%d %H:%M",          // SQL-style, minute precision
    "%Y/%m/%d %H:%M:%S",       // Alternative with slashes
    "%m/%d/%Y %H:%M:%S",       // US format with time
];

const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S%.f", // High precision
    "%H:%M:%S",    // Standard
    "%H:%M",       // Hours and minutes only
];

/// A runtime value with type information
///
/// Each variant carries its payload directly; `Null` carries the
/// [`ValueType`] of its origin so null propagation stays typed. Strings
/// use `Arc<str>` for cheap cloning during row scans.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Typed NULL value; `ValueType::Undefined` when the origin is unknown
    Null(ValueType),

    /// Boolean value
    Boolean(bool),

    /// 32-bit signed integer
    Int32(i32),

    /// 64-bit signed integer
    Int64(i64),

    /// Fixed-precision decimal number
    Decimal(Decimal),

    /// 32-bit floating point
    Single(f32),

    /// 64-bit floating point
    Double(f64),

    /// UTF-8 text string (Arc for cheap cloning)
    Str(Arc<str>),

    /// Timestamp (UTC)
    DateTime(DateTime<Utc>),

    /// 16-byte globally unique identifier
    Guid(Uuid),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a NULL value with a type hint
    pub fn null(value_type: ValueType) -> Self {
        Value::Null(value_type)
    }

    /// Create a NULL value of unknown origin type
    pub fn null_undefined() -> Self {
        Value::Null(ValueType::Undefined)
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Str(Arc::from(value.into().as_str()))
    }

    /// Create a text value from Arc<str> (zero-copy)
    pub fn text_arc(value: Arc<str>) -> Self {
        Value::Str(value)
    }

    // =========================================================================
    // Type accessors
    // =========================================================================

    /// Returns the value type of this value
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null(vt) => *vt,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Int32(_) => ValueType::Int32,
            Value::Int64(_) => ValueType::Int64,
            Value::Decimal(_) => ValueType::Decimal,
            Value::Single(_) => ValueType::Single,
            Value::Double(_) => ValueType::Double,
            Value::Str(_) => ValueType::String,
            Value::DateTime(_) => ValueType::DateTime,
            Value::Guid(_) => ValueType::Guid,
        }
    }

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    // =========================================================================
    // Payload extractors
    // =========================================================================

    /// Extract as bool; None when NULL or not a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract as i64 from any integer variant
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as f64 from any numeric variant
    pub fn as_float64(&self) -> Option<f64> {
        match self {
            Value::Int32(v) => Some(*v as f64),
            Value::Int64(v) => Some(*v as f64),
            Value::Decimal(d) => d.to_f64(),
            Value::Single(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as string reference (strings only, avoids clone)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract as DateTime<Utc>
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    /// Extract as Guid
    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Value::Guid(g) => Some(*g),
            _ => None,
        }
    }

    // =========================================================================
    // Numeric widening
    // =========================================================================

    /// Widen a numeric value to a (wider) member of the numeric lattice.
    ///
    /// Returns None when self is not numeric or the target cannot hold the
    /// payload (e.g. widening a float down is never attempted by callers).
    pub(crate) fn widen_to(&self, target: ValueType) -> Option<Value> {
        match (self, target) {
            (Value::Int32(v), ValueType::Int32) => Some(Value::Int32(*v)),
            (Value::Int32(v), ValueType::Int64) => Some(Value::Int64(*v as i64)),
            (Value::Int32(v), ValueType::Decimal) => Some(Value::Decimal(Decimal::from(*v))),
            (Value::Int32(v), ValueType::Single) => Some(Value::Single(*v as f32)),
            (Value::Int32(v), ValueType::Double) => Some(Value::Double(*v as f64)),
            (Value::Int64(v), ValueType::Int64) => Some(Value::Int64(*v)),
            (Value::Int64(v), ValueType::Decimal) => Some(Value::Decimal(Decimal::from(*v))),
            (Value::Int64(v), ValueType::Single) => Some(Value::Single(*v as f32)),
            (Value::Int64(v), ValueType::Double) => Some(Value::Double(*v as f64)),
            (Value::Decimal(d), ValueType::Decimal) => Some(Value::Decimal(*d)),
            (Value::Decimal(d), ValueType::Single) => d.to_f32().map(Value::Single),
            (Value::Decimal(d), ValueType::Double) => d.to_f64().map(Value::Double),
            (Value::Single(v), ValueType::Single) => Some(Value::Single(*v)),
            (Value::Single(v), ValueType::Double) => Some(Value::Double(*v as f64)),
            (Value::Double(v), ValueType::Double) => Some(Value::Double(*v)),
            _ => None,
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Value equality under the filter-engine comparison rules: strings
    /// compare case-insensitively, cross-type numerics widen first.
    ///
    /// Both operands must be non-null; cross-category comparison errors.
    pub fn equals(&self, other: &Value) -> Result<bool> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.eq_ignore_ascii_case(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
            (Value::DateTime(a), Value::DateTime(b)) => Ok(a == b),
            (Value::Guid(a), Value::Guid(b)) => Ok(a == b),
            _ => self.compare(other).map(|ord| ord == Ordering::Equal),
        }
    }

    /// Ordering comparison under the filter-engine rules: strings compare
    /// with case-sensitive lexicographic order, cross-type numerics widen.
    ///
    /// Both operands must be non-null; cross-category comparison errors.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Ok(a.as_ref().cmp(b.as_ref())),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Ok(a.cmp(b)),
            (Value::Guid(a), Value::Guid(b)) => Ok(a.cmp(b)),
            _ => {
                let join = self
                    .value_type()
                    .join(other.value_type())
                    .filter(|vt| vt.is_numeric())
                    .ok_or_else(|| {
                        Error::evaluation(format!(
                            "cannot compare {} with {}",
                            self.value_type(),
                            other.value_type()
                        ))
                    })?;

                let left = self.widen_to(join);
                let right = other.widen_to(join);
                match (left, right) {
                    (Some(Value::Int32(a)), Some(Value::Int32(b))) => Ok(a.cmp(&b)),
                    (Some(Value::Int64(a)), Some(Value::Int64(b))) => Ok(a.cmp(&b)),
                    (Some(Value::Decimal(a)), Some(Value::Decimal(b))) => Ok(a.cmp(&b)),
                    (Some(Value::Single(a)), Some(Value::Single(b))) => {
                        Ok(compare_floats(a as f64, b as f64))
                    }
                    (Some(Value::Double(a)), Some(Value::Double(b))) => Ok(compare_floats(a, b)),
                    _ => Err(Error::evaluation(format!(
                        "cannot compare {} with {}",
                        self.value_type(),
                        other.value_type()
                    ))),
                }
            }
        }
    }

    // =========================================================================
    // Explicit conversion (the Convert function)
    // =========================================================================

    /// Convert this value to the target value type.
    ///
    /// NULL converts to a NULL of the target type; an unparseable or
    /// unrepresentable conversion yields a NULL of the target type rather
    /// than an error.
    pub fn convert_to(&self, target: ValueType) -> Value {
        if self.is_null() || target == ValueType::Undefined {
            return Value::Null(target);
        }

        if self.value_type() == target {
            return self.clone();
        }

        match target {
            ValueType::Boolean => self.convert_to_boolean(),
            ValueType::Int32 => self
                .to_integer()
                .and_then(|v| i32::try_from(v).ok())
                .map_or(Value::Null(target), Value::Int32),
            ValueType::Int64 => self.to_integer().map_or(Value::Null(target), Value::Int64),
            ValueType::Decimal => self.convert_to_decimal(),
            ValueType::Single => self
                .to_float()
                .map_or(Value::Null(target), |v| Value::Single(v as f32)),
            ValueType::Double => self.to_float().map_or(Value::Null(target), Value::Double),
            ValueType::String => Value::text(self.to_string()),
            ValueType::DateTime => self.convert_to_datetime(),
            ValueType::Guid => match self {
                Value::Str(s) => parse_guid(s).map_or(Value::Null(target), Value::Guid),
                _ => Value::Null(target),
            },
            ValueType::Undefined => Value::Null(target),
        }
    }

    fn convert_to_boolean(&self) -> Value {
        match self {
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Int32(v) => Value::Boolean(*v != 0),
            Value::Int64(v) => Value::Boolean(*v != 0),
            Value::Decimal(d) => Value::Boolean(!d.is_zero()),
            Value::Single(v) => Value::Boolean(*v != 0.0),
            Value::Double(v) => Value::Boolean(*v != 0.0),
            Value::Str(s) => {
                let s_ref: &str = s.as_ref();
                if s_ref.eq_ignore_ascii_case("true") || s_ref == "1" {
                    Value::Boolean(true)
                } else if s_ref.eq_ignore_ascii_case("false") || s_ref == "0" {
                    Value::Boolean(false)
                } else {
                    Value::Null(ValueType::Boolean)
                }
            }
            _ => Value::Null(ValueType::Boolean),
        }
    }

    fn convert_to_decimal(&self) -> Value {
        match self {
            Value::Boolean(b) => Value::Decimal(Decimal::from(u8::from(*b))),
            Value::Int32(v) => Value::Decimal(Decimal::from(*v)),
            Value::Int64(v) => Value::Decimal(Decimal::from(*v)),
            Value::Decimal(d) => Value::Decimal(*d),
            Value::Single(v) => {
                Decimal::from_f32(*v).map_or(Value::Null(ValueType::Decimal), Value::Decimal)
            }
            Value::Double(v) => {
                Decimal::from_f64(*v).map_or(Value::Null(ValueType::Decimal), Value::Decimal)
            }
            Value::Str(s) => s
                .parse::<Decimal>()
                .map_or(Value::Null(ValueType::Decimal), Value::Decimal),
            Value::DateTime(t) => Value::Decimal(Decimal::from(t.timestamp())),
            _ => Value::Null(ValueType::Decimal),
        }
    }

    fn convert_to_datetime(&self) -> Value {
        let from_seconds =
            |secs: i64| DateTime::from_timestamp(secs, 0).map_or(Value::Null(ValueType::DateTime), Value::DateTime);

        match self {
            Value::DateTime(t) => Value::DateTime(*t),
            Value::Str(s) => {
                parse_timestamp(s).map_or(Value::Null(ValueType::DateTime), Value::DateTime)
            }
            Value::Int32(v) => from_seconds(*v as i64),
            Value::Int64(v) => from_seconds(*v),
            Value::Decimal(d) => d
                .trunc()
                .to_i64()
                .map_or(Value::Null(ValueType::DateTime), from_seconds),
            Value::Single(v) => from_seconds(v.trunc() as i64),
            Value::Double(v) => from_seconds(v.trunc() as i64),
            _ => Value::Null(ValueType::DateTime),
        }
    }

    /// Whole-number view used by integer conversions; truncates fractions
    fn to_integer(&self) -> Option<i64> {
        match self {
            Value::Boolean(b) => Some(i64::from(*b)),
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            Value::Decimal(d) => d.trunc().to_i64(),
            Value::Single(v) if v.is_finite() => Some(v.trunc() as i64),
            Value::Double(v) if v.is_finite() => Some(v.trunc() as i64),
            Value::Str(s) => s
                .trim()
                .parse::<i64>()
                .ok()
                .or_else(|| s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64)),
            Value::DateTime(t) => Some(t.timestamp()),
            _ => None,
        }
    }

    /// Floating-point view used by Single/Double conversions
    fn to_float(&self) -> Option<f64> {
        match self {
            Value::Boolean(b) => Some(f64::from(u8::from(*b))),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            Value::DateTime(t) => Some(t.timestamp() as f64),
            _ => self.as_float64(),
        }
    }
}

// =========================================================================
// Trait implementations
// =========================================================================

impl Default for Value {
    fn default() -> Self {
        Value::Null(ValueType::Undefined)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null(_) => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Single(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{}", s),
            Value::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
            Value::Guid(g) => write!(f, "{}", g),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Single(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v.as_str()))
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null(ValueType::Undefined),
        }
    }
}

// =========================================================================
// Helper functions
// =========================================================================

/// Parse a timestamp string with multiple format support
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    // Try each timestamp format
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Ok(dt.with_timezone(&Utc));
        }
        // Try parsing as naive datetime and assume UTC
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date-only formats
    for format in &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            let datetime = date.and_hms_opt(0, 0, 0).unwrap();
            return Ok(Utc.from_utc_datetime(&datetime));
        }
    }

    // Try time-only formats (use today's date)
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(s, format) {
            let today = Utc::now().date_naive();
            return Ok(Utc.from_utc_datetime(&today.and_time(time)));
        }
    }

    Err(Error::parse(format!("invalid timestamp format: {}", s)))
}

/// Parse a GUID string, accepting optional surrounding braces
pub fn parse_guid(s: &str) -> Option<Uuid> {
    let s = s.trim();
    let s = s
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(s);
    Uuid::parse_str(s).ok()
}

/// Compare two floats with NaN ordered after all other values
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::str::FromStr;

    #[test]
    fn test_constructors() {
        assert!(Value::null(ValueType::Int32).is_null());
        assert_eq!(
            Value::null_undefined().value_type(),
            ValueType::Undefined
        );
        assert_eq!(Value::text("hello").as_str(), Some("hello"));
        assert_eq!(Value::from(42i32).value_type(), ValueType::Int32);
        assert_eq!(Value::from(42i64).value_type(), ValueType::Int64);
        assert_eq!(Value::from(1.5f32).value_type(), ValueType::Single);
        assert_eq!(Value::from(1.5f64).value_type(), ValueType::Double);
        assert_eq!(Value::from(true).value_type(), ValueType::Boolean);
        assert_eq!(Value::from(Option::<i32>::None).value_type(), ValueType::Undefined);
    }

    #[test]
    fn test_widen_to() {
        assert_eq!(
            Value::Int32(7).widen_to(ValueType::Int64),
            Some(Value::Int64(7))
        );
        assert_eq!(
            Value::Int32(7).widen_to(ValueType::Double),
            Some(Value::Double(7.0))
        );
        assert_eq!(
            Value::Int64(7).widen_to(ValueType::Decimal),
            Some(Value::Decimal(Decimal::from(7)))
        );
        assert_eq!(
            Value::Single(1.5).widen_to(ValueType::Double),
            Some(Value::Double(1.5))
        );
        // Never narrows
        assert_eq!(Value::Double(1.5).widen_to(ValueType::Int32), None);
        // Non-numeric operands are rejected
        assert_eq!(Value::text("x").widen_to(ValueType::Double), None);
    }

    #[test]
    fn test_equals_strings_case_insensitive() {
        assert!(Value::text("FREQ").equals(&Value::text("freq")).unwrap());
        assert!(!Value::text("FREQ").equals(&Value::text("VPHM")).unwrap());
    }

    #[test]
    fn test_compare_strings_case_sensitive() {
        assert_eq!(
            Value::text("A").compare(&Value::text("a")).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::text("b").compare(&Value::text("b")).unwrap(),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_cross_type_numeric() {
        assert_eq!(
            Value::Int32(2).compare(&Value::Double(2.5)).unwrap(),
            Ordering::Less
        );
        assert_eq!(
            Value::Int64(3).compare(&Value::Int32(3)).unwrap(),
            Ordering::Equal
        );
        assert!(Value::Int32(2).equals(&Value::Double(2.0)).unwrap());
        assert_eq!(
            Value::Decimal(Decimal::from_str("59.97").unwrap())
                .compare(&Value::Int32(60))
                .unwrap(),
            Ordering::Less
        );
    }

    #[test]
    fn test_compare_cross_category_errors() {
        assert!(Value::text("1").compare(&Value::Int32(1)).is_err());
        assert!(Value::Boolean(true).compare(&Value::Int32(1)).is_err());
        assert!(Value::Guid(Uuid::nil())
            .compare(&Value::text("x"))
            .is_err());
    }

    #[test]
    fn test_convert_to_numeric() {
        assert_eq!(
            Value::text("42").convert_to(ValueType::Int32),
            Value::Int32(42)
        );
        assert_eq!(
            Value::Double(3.7).convert_to(ValueType::Int64),
            Value::Int64(3)
        );
        assert_eq!(
            Value::Int32(1).convert_to(ValueType::Double),
            Value::Double(1.0)
        );
        assert_eq!(
            Value::text("59.97").convert_to(ValueType::Decimal),
            Value::Decimal(Decimal::from_str("59.97").unwrap())
        );
        // Unparseable conversion yields a typed null
        assert_eq!(
            Value::text("not a number").convert_to(ValueType::Int32),
            Value::Null(ValueType::Int32)
        );
        // Out-of-range narrows to null, not garbage
        assert_eq!(
            Value::Int64(i64::MAX).convert_to(ValueType::Int32),
            Value::Null(ValueType::Int32)
        );
    }

    #[test]
    fn test_convert_null_stays_null() {
        let converted = Value::null_undefined().convert_to(ValueType::Double);
        assert_eq!(converted, Value::Null(ValueType::Double));
    }

    #[test]
    fn test_convert_to_boolean() {
        assert_eq!(
            Value::text("TRUE").convert_to(ValueType::Boolean),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::text("0").convert_to(ValueType::Boolean),
            Value::Boolean(false)
        );
        assert_eq!(
            Value::Int32(5).convert_to(ValueType::Boolean),
            Value::Boolean(true)
        );
        assert_eq!(
            Value::text("maybe").convert_to(ValueType::Boolean),
            Value::Null(ValueType::Boolean)
        );
    }

    #[test]
    fn test_convert_to_string_round_trips() {
        assert_eq!(
            Value::Int32(42).convert_to(ValueType::String),
            Value::text("42")
        );
        assert_eq!(
            Value::Double(59.97).convert_to(ValueType::String),
            Value::text("59.97")
        );
        assert_eq!(
            Value::Boolean(false).convert_to(ValueType::String),
            Value::text("false")
        );

        let guid = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        let s = Value::Guid(guid).convert_to(ValueType::String);
        assert_eq!(s.convert_to(ValueType::Guid), Value::Guid(guid));
    }

    #[test]
    fn test_convert_to_guid() {
        let guid = Uuid::parse_str("33333333-3333-3333-3333-333333333333").unwrap();
        assert_eq!(
            Value::text("{33333333-3333-3333-3333-333333333333}").convert_to(ValueType::Guid),
            Value::Guid(guid)
        );
        assert_eq!(
            Value::Int32(1).convert_to(ValueType::Guid),
            Value::Null(ValueType::Guid)
        );
    }

    #[test]
    fn test_convert_datetime_seconds() {
        let ts = parse_timestamp("2019-01-01 00:00:00").unwrap();
        let seconds = Value::DateTime(ts).convert_to(ValueType::Int64);
        assert_eq!(seconds, Value::Int64(ts.timestamp()));
        assert_eq!(seconds.convert_to(ValueType::DateTime), Value::DateTime(ts));
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("2019-01-15T10:30:00Z").unwrap();
        assert_eq!(ts.year(), 2019);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 15);
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 30);

        let ts = parse_timestamp("2019-01-15 10:30:00").unwrap();
        assert_eq!(ts.hour(), 10);

        let ts = parse_timestamp("2019-01-15").unwrap();
        assert_eq!(ts.hour(), 0);

        assert!(parse_timestamp("not a date").is_err());
    }

    #[test]
    fn test_parse_guid() {
        let expected = Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap();
        assert_eq!(
            parse_guid("22222222-2222-2222-2222-222222222222"),
            Some(expected)
        );
        assert_eq!(
            parse_guid("{22222222-2222-2222-2222-222222222222}"),
            Some(expected)
        );
        assert_eq!(parse_guid("{unbalanced"), None);
        assert_eq!(parse_guid("not-a-guid"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::null(ValueType::Int32).to_string(), "NULL");
        assert_eq!(Value::Int32(42).to_string(), "42");
        assert_eq!(Value::Double(3.5).to_string(), "3.5");
        assert_eq!(Value::Boolean(true).to_string(), "true");
        assert_eq!(Value::text("hello").to_string(), "hello");
    }
}
