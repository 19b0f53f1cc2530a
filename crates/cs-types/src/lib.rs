#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Int,
    Float,
    String,
    Bool,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A raw host-side value, before it is coerced into an [`Element`] of some kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&Element> for Value {
    fn from(value: &Element) -> Self {
        value.to_value()
    }
}

impl From<Element> for Value {
    fn from(value: Element) -> Self {
        value.to_value()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single typed value. Every variant can hold the missing state; `Float`
/// uses IEEE NaN, the other kinds use `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Element {
    Int(Option<i64>),
    Float(f64),
    String(Option<String>),
    Bool(Option<bool>),
}

impl Element {
    #[must_use]
    pub fn missing(kind: Kind) -> Self {
        match kind {
            Kind::Int => Self::Int(None),
            Kind::Float => Self::Float(f64::NAN),
            Kind::String => Self::String(None),
            Kind::Bool => Self::Bool(None),
        }
    }

    /// Coerce a raw value into an element of `kind`. Values that cannot be
    /// represented in `kind` become missing.
    #[must_use]
    pub fn from_value(kind: Kind, value: Value) -> Self {
        match kind {
            Kind::Int => Self::Int(match value {
                Value::Null => None,
                Value::Int(v) => Some(v),
                Value::Float(v) => float_to_int(v),
                Value::String(v) => parse_int(&v),
                Value::Bool(v) => Some(i64::from(v)),
            }),
            Kind::Float => Self::Float(match value {
                Value::Null => f64::NAN,
                Value::Int(v) => v as f64,
                Value::Float(v) => v,
                Value::String(v) => parse_float(&v),
                Value::Bool(v) => bool_to_float(v),
            }),
            Kind::String => Self::String(match value {
                Value::Null => None,
                Value::Int(v) => Some(v.to_string()),
                Value::Float(v) if v.is_nan() => None,
                Value::Float(v) => Some(format_float(v)),
                Value::String(v) => Some(v),
                Value::Bool(v) => Some(v.to_string()),
            }),
            Kind::Bool => Self::Bool(match value {
                Value::Null => None,
                Value::Int(0) => Some(false),
                Value::Int(1) => Some(true),
                Value::Int(_) => None,
                Value::Float(v) if v == 0.0 => Some(false),
                Value::Float(v) if v == 1.0 => Some(true),
                Value::Float(_) => None,
                Value::String(v) => parse_bool(&v),
                Value::Bool(v) => Some(v),
            }),
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::String(_) => Kind::String,
            Self::Bool(_) => Kind::Bool,
        }
    }

    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Int(v) => v.is_none(),
            Self::Float(v) => v.is_nan(),
            Self::String(v) => v.is_none(),
            Self::Bool(v) => v.is_none(),
        }
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(Some(v)) => Value::Int(*v),
            Self::Float(v) if !v.is_nan() => Value::Float(*v),
            Self::String(Some(v)) => Value::String(v.clone()),
            Self::Bool(Some(v)) => Value::Bool(*v),
            _ => Value::Null,
        }
    }

    /// Returns a copy of this element converted to `kind`.
    #[must_use]
    pub fn coerce(&self, kind: Kind) -> Self {
        if self.kind() == kind {
            return self.clone();
        }
        Self::from_value(kind, self.to_value())
    }

    /// Replace the stored value, keeping this element's kind.
    pub fn set(&mut self, value: impl Into<Value>) {
        *self = Self::from_value(self.kind(), value.into());
    }

    pub fn set_element(&mut self, other: &Element) {
        *self = other.coerce(self.kind());
    }

    pub fn set_int(&mut self, value: i64) {
        self.set(Value::Int(value));
    }

    pub fn set_float(&mut self, value: f64) {
        self.set(Value::Float(value));
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.set(Value::String(value.into()));
    }

    pub fn set_bool(&mut self, value: bool) {
        self.set(Value::Bool(value));
    }

    pub fn set_missing(&mut self) {
        *self = Self::missing(self.kind());
    }

    /// Float projection. Never fails: missing or non-numeric values become NaN.
    #[must_use]
    pub fn as_float(&self) -> f64 {
        match self {
            Self::Int(Some(v)) => *v as f64,
            Self::Float(v) => *v,
            Self::String(Some(v)) => parse_float(v),
            Self::Bool(Some(v)) => bool_to_float(*v),
            _ => f64::NAN,
        }
    }

    pub fn as_int(&self) -> Result<i64, TypeError> {
        if self.is_missing() {
            return Err(TypeError::ValueIsMissing { kind: self.kind() });
        }
        match self {
            Self::Int(Some(v)) => Ok(*v),
            Self::Float(v) => float_to_int(*v).ok_or(TypeError::LossyFloatToInt { value: *v }),
            Self::String(Some(v)) => parse_int(v).ok_or_else(|| TypeError::Unparsable {
                value: v.clone(),
                to: Kind::Int,
            }),
            Self::Bool(Some(v)) => Ok(i64::from(*v)),
            _ => Err(TypeError::ValueIsMissing { kind: self.kind() }),
        }
    }

    pub fn as_bool(&self) -> Result<bool, TypeError> {
        if self.is_missing() {
            return Err(TypeError::ValueIsMissing { kind: self.kind() });
        }
        match self {
            Self::Int(Some(0)) => Ok(false),
            Self::Int(Some(1)) => Ok(true),
            Self::Int(Some(v)) => Err(TypeError::InvalidBoolInt { value: *v }),
            Self::Float(v) if *v == 0.0 => Ok(false),
            Self::Float(v) if *v == 1.0 => Ok(true),
            Self::Float(v) => Err(TypeError::InvalidBoolFloat { value: *v }),
            Self::String(Some(v)) => parse_bool(v).ok_or_else(|| TypeError::Unparsable {
                value: v.clone(),
                to: Kind::Bool,
            }),
            Self::Bool(Some(v)) => Ok(*v),
            _ => Err(TypeError::ValueIsMissing { kind: self.kind() }),
        }
    }

    /// Textual form. Missing values render as `NaN`, floats with six decimals.
    #[must_use]
    pub fn as_string(&self) -> String {
        match self {
            Self::Int(Some(v)) => v.to_string(),
            Self::Float(v) => format_float(*v),
            Self::String(Some(v)) => v.clone(),
            Self::Bool(Some(v)) => v.to_string(),
            _ => MISSING_TEXT.to_owned(),
        }
    }

    /// Orders `self` against `other` after converting `other` to this
    /// element's kind. `None` when either side is missing or the conversion
    /// fails, so missing values are neither less nor greater than anything.
    #[must_use]
    pub fn compare(&self, other: &Element) -> Option<Ordering> {
        if self.is_missing() || other.is_missing() {
            return None;
        }
        match self {
            Self::Int(Some(a)) => other.as_int().ok().map(|b| a.cmp(&b)),
            Self::Float(a) => a.partial_cmp(&other.as_float()),
            Self::String(Some(a)) => Some(a.as_str().cmp(other.as_string().as_str())),
            Self::Bool(Some(a)) => other.as_bool().ok().map(|b| a.cmp(&b)),
            _ => None,
        }
    }

    #[must_use]
    pub fn equals(&self, other: &Element) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    #[must_use]
    pub fn not_equals(&self, other: &Element) -> bool {
        matches!(self.compare(other), Some(Ordering::Less | Ordering::Greater))
    }

    #[must_use]
    pub fn less(&self, other: &Element) -> bool {
        self.compare(other) == Some(Ordering::Less)
    }

    #[must_use]
    pub fn less_eq(&self, other: &Element) -> bool {
        matches!(self.compare(other), Some(Ordering::Less | Ordering::Equal))
    }

    #[must_use]
    pub fn greater(&self, other: &Element) -> bool {
        self.compare(other) == Some(Ordering::Greater)
    }

    #[must_use]
    pub fn greater_eq(&self, other: &Element) -> bool {
        matches!(
            self.compare(other),
            Some(Ordering::Greater | Ordering::Equal)
        )
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

pub const MISSING_TEXT: &str = "NaN";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("cannot convert float {value} to int")]
    LossyFloatToInt { value: f64 },
    #[error("expected 0/1 for bool conversion from int but found {value}")]
    InvalidBoolInt { value: i64 },
    #[error("expected 0.0/1.0 for bool conversion from float but found {value}")]
    InvalidBoolFloat { value: f64 },
    #[error("cannot parse {value:?} as {to}")]
    Unparsable { value: String, to: Kind },
    #[error("value is missing ({kind})")]
    ValueIsMissing { kind: Kind },
}

#[must_use]
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        MISSING_TEXT.to_owned()
    } else {
        format!("{value:.6}")
    }
}

fn float_to_int(value: f64) -> Option<i64> {
    if value.is_finite() && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn bool_to_float(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

fn parse_float(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Kind, TypeError, Value};

    #[test]
    fn coercion_follows_target_kind() {
        assert_eq!(Element::from_value(Kind::Int, 2.9.into()), Element::Int(Some(2)));
        assert_eq!(Element::from_value(Kind::Int, "12".into()), Element::Int(Some(12)));
        assert_eq!(Element::from_value(Kind::Int, "abc".into()), Element::Int(None));
        assert_eq!(
            Element::from_value(Kind::String, 1.5.into()),
            Element::String(Some("1.500000".to_owned()))
        );
        assert_eq!(Element::from_value(Kind::Bool, "T".into()), Element::Bool(Some(true)));
        assert_eq!(Element::from_value(Kind::Bool, 2_i64.into()), Element::Bool(None));
        assert!(Element::from_value(Kind::Float, Value::Null).is_missing());
    }

    #[test]
    fn nan_text_is_a_real_string_value() {
        let element = Element::from_value(Kind::String, "NaN".into());
        assert!(!element.is_missing());
        assert_eq!(element.as_string(), "NaN");
    }

    #[test]
    fn missing_values_compare_as_neither_less_nor_greater() {
        let missing = Element::missing(Kind::Int);
        let one = Element::Int(Some(1));
        assert!(!missing.less(&one));
        assert!(!missing.greater(&one));
        assert!(!one.less(&missing));
        assert!(!missing.equals(&missing));
        assert!(!missing.not_equals(&one));
    }

    #[test]
    fn comparisons_convert_the_right_hand_side() {
        let a = Element::Int(Some(3));
        assert!(a.equals(&Element::Float(3.0)));
        assert!(a.less(&Element::String(Some("4".to_owned()))));
        let s = Element::String(Some("b".to_owned()));
        assert!(s.greater(&Element::String(Some("a".to_owned()))));
        assert!(Element::Bool(Some(false)).less(&Element::Bool(Some(true))));
    }

    #[test]
    fn narrowing_conversions_report_type_errors() {
        let err = Element::Float(f64::INFINITY).as_int().expect_err("inf must fail");
        assert!(matches!(err, TypeError::LossyFloatToInt { .. }));

        let err = Element::Int(Some(4)).as_bool().expect_err("4 is not a bool");
        assert_eq!(
            err.to_string(),
            "expected 0/1 for bool conversion from int but found 4"
        );

        let err = Element::missing(Kind::Bool).as_int().expect_err("missing");
        assert_eq!(err, TypeError::ValueIsMissing { kind: Kind::Bool });

        assert!(Element::String(Some("x".to_owned())).as_float().is_nan());
    }

    #[test]
    fn setters_keep_the_element_kind() {
        let mut element = Element::Int(Some(1));
        element.set(7.8);
        assert_eq!(element, Element::Int(Some(7)));
        element.set_element(&Element::String(Some("42".to_owned())));
        assert_eq!(element, Element::Int(Some(42)));
        element.set(Option::<i64>::None);
        assert!(element.is_missing());
        assert_eq!(element.kind(), Kind::Int);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&Kind::Float).expect("serialize");
        assert_eq!(json, "\"float\"");
    }
}
