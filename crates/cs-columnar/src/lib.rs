#![forbid(unsafe_code)]

pub mod numeric;

use std::cmp::Ordering;

use cs_types::{Element, Kind, TypeError, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw input for building or growing a column. Every host collection the
/// crate accepts is funnelled through here before being coerced to a kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Values(Vec<Value>);

impl Values {
    #[must_use]
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// A single missing value, the shape produced by an absent input.
    #[must_use]
    pub fn missing() -> Self {
        Self(vec![Value::Null])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl<T: Into<Value>> From<Vec<T>> for Values {
    fn from(values: Vec<T>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Values {
    fn from(values: &[T]) -> Self {
        Self(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Values {
    fn from(values: [T; N]) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Values {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl From<Element> for Values {
    fn from(value: Element) -> Self {
        Self(vec![value.to_value()])
    }
}

impl From<&Element> for Values {
    fn from(value: &Element) -> Self {
        Self(vec![value.to_value()])
    }
}

impl From<i64> for Values {
    fn from(value: i64) -> Self {
        Self(vec![Value::Int(value)])
    }
}

impl From<i32> for Values {
    fn from(value: i32) -> Self {
        Self(vec![Value::from(value)])
    }
}

impl From<f64> for Values {
    fn from(value: f64) -> Self {
        Self(vec![Value::Float(value)])
    }
}

impl From<bool> for Values {
    fn from(value: bool) -> Self {
        Self(vec![Value::Bool(value)])
    }
}

impl From<&str> for Values {
    fn from(value: &str) -> Self {
        Self(vec![Value::from(value)])
    }
}

impl From<String> for Values {
    fn from(value: String) -> Self {
        Self(vec![Value::String(value)])
    }
}

impl From<&Column> for Values {
    fn from(column: &Column) -> Self {
        Self(column.values.iter().map(Element::to_value).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityMask {
    bits: Vec<bool>,
}

impl ValidityMask {
    #[must_use]
    pub fn from_elements(values: &[Element]) -> Self {
        let bits = values.iter().map(|value| !value.is_missing()).collect();
        Self { bits }
    }

    #[must_use]
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    #[must_use]
    pub fn count_valid(&self) -> usize {
        self.bits.iter().filter(|bit| **bit).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }

    #[must_use]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ColumnError {
    #[error("column length mismatch: left={left}, right={right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("position {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("slice [{start}, {end}) is out of bounds for length {len}")]
    InvalidSlice { start: usize, end: usize, len: usize },
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Homogeneous element storage: every element has the column's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    kind: Kind,
    values: Vec<Element>,
}

impl Column {
    /// Construct a column, coercing every raw value to `kind`.
    #[must_use]
    pub fn new(kind: Kind, values: impl Into<Values>) -> Self {
        let values = values
            .into()
            .into_inner()
            .into_iter()
            .map(|value| Element::from_value(kind, value))
            .collect();
        Self { kind, values }
    }

    #[must_use]
    pub fn from_elements(kind: Kind, elements: Vec<Element>) -> Self {
        let values = elements
            .into_iter()
            .map(|element| {
                if element.kind() == kind {
                    element
                } else {
                    element.coerce(kind)
                }
            })
            .collect();
        Self { kind, values }
    }

    #[must_use]
    pub fn empty(kind: Kind) -> Self {
        Self {
            kind,
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn repeat(kind: Kind, value: Value, len: usize) -> Self {
        let element = Element::from_value(kind, value);
        Self {
            kind,
            values: vec![element; len],
        }
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Element> {
        self.values.get(idx)
    }

    /// Overwrite the element at `idx`, coercing `value` to the column kind.
    pub fn set_element(&mut self, idx: usize, value: &Element) -> Result<(), ColumnError> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(idx)
            .ok_or(ColumnError::OutOfRange { index: idx, len })?;
        slot.set_element(value);
        Ok(())
    }

    /// Apply `f` to every missing slot; the closure receives the slot index.
    pub fn fill_missing_with(&mut self, mut f: impl FnMut(usize) -> Option<Element>) {
        for (idx, slot) in self.values.iter_mut().enumerate() {
            if slot.is_missing() {
                if let Some(replacement) = f(idx) {
                    slot.set_element(&replacement);
                }
            }
        }
    }

    pub fn extend_values(&mut self, values: impl Into<Values>) {
        let kind = self.kind;
        self.values.extend(
            values
                .into()
                .into_inner()
                .into_iter()
                .map(|value| Element::from_value(kind, value)),
        );
    }

    pub fn extend_from(&mut self, other: &Self) {
        let kind = self.kind;
        self.values
            .extend(other.values.iter().map(|element| element.coerce(kind)));
    }

    /// Gather elements by position. Duplicates are allowed; any position past
    /// the end is an error.
    pub fn take(&self, positions: &[usize]) -> Result<Self, ColumnError> {
        let values = positions
            .iter()
            .map(|&idx| {
                self.values
                    .get(idx)
                    .cloned()
                    .ok_or(ColumnError::OutOfRange {
                        index: idx,
                        len: self.values.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            kind: self.kind,
            values,
        })
    }

    pub fn slice(&self, start: usize, end: usize) -> Result<Self, ColumnError> {
        if start > end || end > self.values.len() {
            return Err(ColumnError::InvalidSlice {
                start,
                end,
                len: self.values.len(),
            });
        }
        Ok(Self {
            kind: self.kind,
            values: self.values[start..end].to_vec(),
        })
    }

    #[must_use]
    pub fn validity(&self) -> ValidityMask {
        ValidityMask::from_elements(&self.values)
    }

    /// Float projection of every element (missing and non-numeric become NaN).
    #[must_use]
    pub fn floats(&self) -> Vec<f64> {
        self.values.iter().map(Element::as_float).collect()
    }
}

/// Positions that sort `values`: non-missing elements stably ascending (or
/// descending when `reverse`), followed by missing positions in their original
/// order regardless of `reverse`.
#[must_use]
pub fn order_positions(values: &[Element], reverse: bool) -> Vec<usize> {
    let (mut present, missing): (Vec<usize>, Vec<usize>) =
        (0..values.len()).partition(|&idx| !values[idx].is_missing());

    present.sort_by(|&a, &b| {
        let ord = values[a].compare(&values[b]).unwrap_or(Ordering::Equal);
        if reverse { ord.reverse() } else { ord }
    });

    present.extend(missing);
    present
}

/// Largest non-missing element, first occurrence on ties.
#[must_use]
pub fn max_element(values: &[Element]) -> Option<&Element> {
    extreme_element(values, Ordering::Greater)
}

/// Smallest non-missing element, first occurrence on ties.
#[must_use]
pub fn min_element(values: &[Element]) -> Option<&Element> {
    extreme_element(values, Ordering::Less)
}

fn extreme_element(values: &[Element], wanted: Ordering) -> Option<&Element> {
    let mut best: Option<&Element> = None;
    for value in values.iter().filter(|value| !value.is_missing()) {
        best = match best {
            Some(current) if value.compare(current) != Some(wanted) => Some(current),
            _ => Some(value),
        };
    }
    best
}

/// Middle value of the ordered non-missing elements, averaging the two middle
/// values for an even count. NaN for empty input and for string or bool kinds.
#[must_use]
pub fn median(kind: Kind, values: &[Element]) -> f64 {
    if matches!(kind, Kind::String | Kind::Bool) {
        return f64::NAN;
    }
    let present: Vec<Element> = values
        .iter()
        .filter(|value| !value.is_missing())
        .cloned()
        .collect();
    if present.is_empty() {
        return f64::NAN;
    }
    let ordered: Vec<f64> = order_positions(&present, false)
        .into_iter()
        .map(|idx| present[idx].as_float())
        .collect();

    let mid = ordered.len() / 2;
    if ordered.len() % 2 != 0 {
        ordered[mid]
    } else {
        (ordered[mid - 1] + ordered[mid]) * 0.5
    }
}
