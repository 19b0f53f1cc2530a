#![forbid(unsafe_code)]

macro_rules! emit {
    ($level:ident, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)+);
    };
}

pub mod cache;
pub mod immutable;
pub mod rolling;

use std::fmt;
use std::str::FromStr;

use cs_columnar::{
    ArithmeticOp, Column, ColumnError, Values, max_element, median, min_element, numeric,
    order_positions,
};
use cs_index::{IndexError, Indexes, resolve_positions};
use cs_types::{Element, Kind, TypeError, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{CacheStats, CacheableRolling, CacheableSeries, CachedValue, MemoCache};
pub use immutable::ImmutableSeries;
pub use rolling::{Rolling, RollingOptions};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SeriesError {
    #[error("{op} error: conversion failed: {source}")]
    Conversion {
        op: &'static str,
        #[source]
        source: TypeError,
    },
    #[error("{op} error: dimensions mismatch (left={left}, right={right})")]
    DimensionMismatch {
        op: &'static str,
        left: usize,
        right: usize,
    },
    #[error("{op} error: index {index} out of range for length {len}")]
    IndexOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{op} error: {source}")]
    Index {
        op: &'static str,
        #[source]
        source: IndexError,
    },
    #[error("unknown comparator: {0:?}")]
    UnknownComparator(String),
    #[error("{op} error: invalid argument: {detail}")]
    Argument { op: &'static str, detail: String },
    #[error("{op} error: argument has errors: {source}")]
    ArgumentPoisoned {
        op: &'static str,
        #[source]
        source: Box<SeriesError>,
    },
    #[error("{op} error: series is read-only")]
    ReadOnly { op: &'static str },
    #[error("{op} error: {source}")]
    Column {
        op: &'static str,
        #[source]
        source: ColumnError,
    },
}

impl SeriesError {
    fn from_column(op: &'static str, err: ColumnError) -> Self {
        match err {
            ColumnError::OutOfRange { index, len } => Self::IndexOutOfRange { op, index, len },
            ColumnError::LengthMismatch { left, right } => {
                Self::DimensionMismatch { op, left, right }
            }
            ColumnError::Type(source) => Self::Conversion { op, source },
            other => Self::Column { op, source: other },
        }
    }

    fn poisoned_argument(op: &'static str, err: &SeriesError) -> Self {
        Self::ArgumentPoisoned {
            op,
            source: Box::new(err.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Eq,
    Neq,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    In,
}

impl Comparator {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::In => "in",
        }
    }

    /// Evaluate the comparator for one pair. `In` against a single element is
    /// plain equality.
    #[must_use]
    pub fn holds(self, left: &Element, right: &Element) -> bool {
        match self {
            Self::Eq | Self::In => left.equals(right),
            Self::Neq => left.not_equals(right),
            Self::Greater => left.greater(right),
            Self::GreaterEq => left.greater_eq(right),
            Self::Less => left.less(right),
            Self::LessEq => left.less_eq(right),
        }
    }
}

impl FromStr for Comparator {
    type Err = SeriesError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(match raw {
            "==" => Self::Eq,
            "!=" => Self::Neq,
            ">" => Self::Greater,
            ">=" => Self::GreaterEq,
            "<" => Self::Less,
            "<=" => Self::LessEq,
            "in" => Self::In,
            other => return Err(SeriesError::UnknownComparator(other.to_owned())),
        })
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An ordered, homogeneously typed sequence of elements with a name and a
/// sticky error slot.
///
/// Operations that hit a data error do not return `Err`; they return a
/// poisoned series carrying the error, and every later series-producing
/// operation on a poisoned input hands the poison along instead of computing.
/// Use [`Series::error`] or [`Series::check`] to surface it.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    column: Column,
    error: Option<SeriesError>,
}

impl Series {
    pub fn new(values: impl Into<Values>, kind: Kind, name: impl Into<String>) -> Self {
        Self::from_column(name, Column::new(kind, values))
    }

    pub fn from_column(name: impl Into<String>, column: Column) -> Self {
        Self {
            name: name.into(),
            column,
            error: None,
        }
    }

    /// A poisoned, empty series of `kind`.
    #[must_use]
    pub fn from_error(kind: Kind, error: SeriesError) -> Self {
        Self {
            name: String::new(),
            column: Column::empty(kind),
            error: Some(error),
        }
    }

    /// `len` copies of `value`. A null default yields a single missing slot.
    pub fn with_default(
        value: impl Into<Value>,
        kind: Kind,
        name: impl Into<String>,
        len: usize,
    ) -> Self {
        let value = value.into();
        let column = if value == Value::Null {
            Column::new(kind, Values::missing())
        } else {
            Column::repeat(kind, value, len)
        };
        Self::from_column(name, column)
    }

    pub fn ints(values: impl Into<Values>) -> Self {
        Self::new(values, Kind::Int, "")
    }

    pub fn floats(values: impl Into<Values>) -> Self {
        Self::new(values, Kind::Float, "")
    }

    pub fn strings(values: impl Into<Values>) -> Self {
        Self::new(values, Kind::String, "")
    }

    pub fn bools(values: impl Into<Values>) -> Self {
        Self::new(values, Kind::Bool, "")
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Same kind and name, no elements.
    #[must_use]
    pub fn empty(&self) -> Self {
        Self::from_column(self.name.clone(), Column::empty(self.kind()))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.column.kind()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.column.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }

    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }

    #[must_use]
    pub fn elements(&self) -> &[Element] {
        self.column.elements()
    }

    #[must_use]
    pub fn error(&self) -> Option<&SeriesError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.error.is_some()
    }

    pub fn check(&self) -> Result<&Self, SeriesError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }

    pub fn set_error(&mut self, error: SeriesError) {
        emit!(debug, op = "set_error", error = %error, "series poisoned");
        self.error = Some(error);
    }

    fn poison(&mut self, error: SeriesError) -> &mut Self {
        self.set_error(error);
        self
    }

    /// Fresh poisoned result of the receiver's kind and name.
    fn fail(&self, error: SeriesError) -> Self {
        emit!(debug, series = %self.name, error = %error, "operation poisoned its result");
        Self {
            name: self.name.clone(),
            column: Column::empty(self.kind()),
            error: Some(error),
        }
    }

    fn derived(&self, name: String, column: Column) -> Self {
        Self::from_column(name, column)
    }

    /// Element at `i`; negative positions count back from the end.
    #[must_use]
    pub fn elem(&self, i: isize) -> Option<&Element> {
        let idx = if i < 0 {
            self.len().checked_sub(i.unsigned_abs())?
        } else {
            usize::try_from(i).ok()?
        };
        self.column.get(idx)
    }

    #[must_use]
    pub fn val(&self, i: isize) -> Option<Value> {
        self.elem(i).map(Element::to_value)
    }

    #[must_use]
    pub fn records(&self) -> Vec<String> {
        self.elements().iter().map(Element::as_string).collect()
    }

    #[must_use]
    pub fn to_floats(&self) -> Vec<f64> {
        self.column.floats()
    }

    pub fn to_ints(&self) -> Result<Vec<i64>, SeriesError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.elements()
            .iter()
            .map(|value| {
                value
                    .as_int()
                    .map_err(|source| SeriesError::Conversion { op: "int", source })
            })
            .collect()
    }

    pub fn to_bools(&self) -> Result<Vec<bool>, SeriesError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.elements()
            .iter()
            .map(|value| {
                value
                    .as_bool()
                    .map_err(|source| SeriesError::Conversion { op: "bool", source })
            })
            .collect()
    }

    #[must_use]
    pub fn has_nan(&self) -> bool {
        self.elements().iter().any(Element::is_missing)
    }

    #[must_use]
    pub fn is_nan(&self) -> Vec<bool> {
        self.elements().iter().map(Element::is_missing).collect()
    }

    #[must_use]
    pub fn is_not_nan(&self) -> Vec<bool> {
        self.column.validity().bits().to_vec()
    }

    /// Elements `start..end`.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        match self.column.slice(start, end) {
            Ok(column) => self.derived(format!("{}_Slice({start},{end})", self.name), column),
            Err(err) => self.fail(SeriesError::from_column("slice", err)),
        }
    }

    /// Elements at the resolved positions, in selector order.
    pub fn subset(&self, indexes: impl Into<Indexes>) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let positions = match resolve_positions(self.len(), &indexes.into()) {
            Ok(positions) => positions,
            Err(source) => return self.fail(SeriesError::Index { op: "subset", source }),
        };
        match self.column.take(&positions) {
            Ok(column) => self.derived(self.name.clone(), column),
            Err(err) => self.fail(SeriesError::from_column("subset", err)),
        }
    }

    /// Overwrite the selected positions in place with `values`, element by
    /// element. Writes made before a failing position are kept.
    pub fn set(&mut self, indexes: impl Into<Indexes>, values: &Series) -> &mut Self {
        if self.is_poisoned() {
            return self;
        }
        if let Some(err) = values.error() {
            return self.poison(SeriesError::poisoned_argument("set", err));
        }
        let positions = match resolve_positions(self.len(), &indexes.into()) {
            Ok(positions) => positions,
            Err(source) => return self.poison(SeriesError::Index { op: "set", source }),
        };
        if positions.len() != values.len() {
            return self.poison(SeriesError::DimensionMismatch {
                op: "set",
                left: positions.len(),
                right: values.len(),
            });
        }
        for (position, value) in positions.into_iter().zip(values.elements()) {
            if let Err(err) = self.column.set_element(position, value) {
                return self.poison(SeriesError::from_column("set", err));
            }
        }
        self
    }

    /// Grow the series in place, coercing `values` to the series kind.
    pub fn append(&mut self, values: impl Into<Values>) {
        if self.is_poisoned() {
            return;
        }
        self.column.extend_values(values);
    }

    #[must_use]
    pub fn concat(&self, other: &Series) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        if let Some(err) = other.error() {
            return self.fail(SeriesError::poisoned_argument("concat", err));
        }
        let mut out = self.clone();
        out.column.extend_from(&other.column);
        out
    }

    /// Element-wise comparison against `rhs`, which is first coerced to this
    /// series' kind. A single right-hand value broadcasts; `In` tests
    /// membership in the whole right-hand side.
    pub fn compare(&self, comparator: Comparator, rhs: impl Into<Values>) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let rhs = Column::new(self.kind(), rhs);
        let right = rhs.elements();

        let flags: Vec<bool> = if comparator == Comparator::In {
            self.elements()
                .iter()
                .map(|value| right.iter().any(|candidate| value.equals(candidate)))
                .collect()
        } else if right.len() == 1 {
            self.elements()
                .iter()
                .map(|value| comparator.holds(value, &right[0]))
                .collect()
        } else if right.len() == self.len() {
            self.elements()
                .iter()
                .zip(right)
                .map(|(value, other)| comparator.holds(value, other))
                .collect()
        } else {
            return self.fail(SeriesError::DimensionMismatch {
                op: "compare",
                left: self.len(),
                right: right.len(),
            });
        };
        Self::bools(flags)
    }

    /// Like [`Series::compare`] with the comparator given by its symbol.
    pub fn compare_symbol(&self, symbol: &str, rhs: impl Into<Values>) -> Self {
        match symbol.parse::<Comparator>() {
            Ok(comparator) => self.compare(comparator, rhs),
            Err(err) => self.fail(err),
        }
    }

    /// Apply a user predicate to every element, without any kind coercion.
    pub fn compare_with(&self, predicate: impl Fn(&Element) -> bool) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        Self::bools(self.elements().iter().map(predicate).collect::<Vec<_>>())
    }

    /// Permutation that sorts the series; missing values go last in their
    /// original order. Empty for a poisoned series.
    #[must_use]
    pub fn order(&self, reverse: bool) -> Vec<usize> {
        if self.is_poisoned() {
            return Vec::new();
        }
        order_positions(self.elements(), reverse)
    }

    fn numeric_input(&self) -> Option<Vec<f64>> {
        if self.is_poisoned() || self.is_empty() || self.kind() == Kind::String {
            return None;
        }
        Some(self.to_floats())
    }

    /// Left-to-right sum of the float projection; a single NaN poisons it.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.numeric_input()
            .map_or(f64::NAN, |values| numeric::sum(&values))
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.is_poisoned() {
            return f64::NAN;
        }
        numeric::mean(&self.to_floats())
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        if self.is_poisoned() {
            return f64::NAN;
        }
        numeric::sample_std_dev(&self.to_floats())
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        if self.is_poisoned() {
            return f64::NAN;
        }
        median(self.kind(), self.elements())
    }

    #[must_use]
    pub fn prod(&self) -> f64 {
        if self.is_poisoned() {
            return f64::NAN;
        }
        numeric::prod(&self.to_floats())
    }

    /// Largest element, keeping the series kind.
    #[must_use]
    pub fn max_element(&self) -> Option<Element> {
        if self.is_poisoned() {
            return None;
        }
        max_element(self.elements()).cloned()
    }

    #[must_use]
    pub fn min_element(&self) -> Option<Element> {
        if self.is_poisoned() {
            return None;
        }
        min_element(self.elements()).cloned()
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        if self.numeric_input().is_none() {
            return f64::NAN;
        }
        self.max_element().map_or(f64::NAN, |value| value.as_float())
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        if self.numeric_input().is_none() {
            return f64::NAN;
        }
        self.min_element().map_or(f64::NAN, |value| value.as_float())
    }

    #[must_use]
    pub fn max_str(&self) -> String {
        if self.kind() != Kind::String {
            return String::new();
        }
        self.max_element()
            .map(|value| value.as_string())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn min_str(&self) -> String {
        if self.kind() != Kind::String {
            return String::new();
        }
        self.min_element()
            .map(|value| value.as_string())
            .unwrap_or_default()
    }

    /// Empirical quantile of the ascending values. `p == 0` is [`Series::min`]
    /// and `p == 1` is [`Series::max`].
    #[must_use]
    pub fn quantile(&self, p: f64) -> f64 {
        if self.is_poisoned() {
            return f64::NAN;
        }
        quantile_of(self.kind(), self.elements(), p)
    }

    /// Several quantiles sharing one sort. Empty for string or empty series.
    #[must_use]
    pub fn quantiles(&self, ps: &[f64]) -> Vec<f64> {
        if self.numeric_input().is_none() {
            return Vec::new();
        }
        let mut ordered: Option<Vec<f64>> = None;
        ps.iter()
            .map(|&p| {
                if p == 0.0 {
                    self.min()
                } else if p == 1.0 {
                    self.max()
                } else {
                    let sorted = ordered.get_or_insert_with(|| ordered_floats(self.elements()));
                    numeric::empirical_quantile(p, sorted)
                }
            })
            .collect()
    }

    /// Rank of `data` among the non-missing values: the position of the first
    /// value greater than `data`, divided by the value count rounded up to
    /// the next even number. 1 when no value is greater.
    #[must_use]
    pub fn data_quantile(&self, data: f64) -> f64 {
        self.data_quantile_base()
            .map_or(f64::NAN, |(ordered, denom)| data_rank(data, &ordered, denom))
    }

    #[must_use]
    pub fn data_quantiles(&self, datas: &[f64]) -> Vec<f64> {
        self.data_quantile_base().map_or_else(Vec::new, |(ordered, denom)| {
            datas
                .iter()
                .map(|&data| data_rank(data, &ordered, denom))
                .collect()
        })
    }

    fn data_quantile_base(&self) -> Option<(Vec<f64>, usize)> {
        self.numeric_input()?;
        let present: Vec<Element> = self
            .elements()
            .iter()
            .filter(|value| !value.is_missing())
            .cloned()
            .collect();
        if present.is_empty() {
            return None;
        }
        let ordered = ordered_floats(&present);
        // Odd counts are rounded up to keep the rank buckets evenly spaced.
        let denom = if ordered.len() % 2 == 1 {
            ordered.len() + 1
        } else {
            ordered.len()
        };
        Some((ordered, denom))
    }

    /// Same-kind series of `f(element, position)`; results are coerced back to
    /// the series kind.
    pub fn map(&self, f: impl Fn(&Element, usize) -> Element) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let mapped = self
            .elements()
            .iter()
            .enumerate()
            .map(|(idx, value)| f(value, idx))
            .collect();
        self.derived(self.name.clone(), Column::from_elements(self.kind(), mapped))
    }

    pub fn filter(&self, keep: impl Fn(&Element, usize) -> bool) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let kept = self
            .elements()
            .iter()
            .enumerate()
            .filter(|(idx, value)| keep(value, *idx))
            .map(|(_, value)| value.clone())
            .collect();
        self.derived(self.name.clone(), Column::from_elements(self.kind(), kept))
    }

    /// Move values `periods` positions down (positive) or up (negative),
    /// filling the vacated slots with missing values.
    #[must_use]
    pub fn shift(&self, periods: i64) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        if self.is_empty() {
            return self.empty();
        }
        if periods == 0 {
            return self.copy();
        }
        let len = self.len();
        let gap = usize::try_from(periods.unsigned_abs())
            .unwrap_or(usize::MAX)
            .min(len);
        let filler = std::iter::repeat_n(Element::missing(self.kind()), gap);
        let elements = self.elements();
        let shifted: Vec<Element> = if periods > 0 {
            filler.chain(elements[..len - gap].iter().cloned()).collect()
        } else {
            elements[gap..].iter().cloned().chain(filler).collect()
        };
        self.derived(
            format!("{}_Shift({periods})", self.name),
            Column::from_elements(self.kind(), shifted),
        )
    }

    fn float_map(&self, name: String, f: impl Fn(f64) -> f64) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let values: Vec<f64> = self.to_floats().into_iter().map(f).collect();
        self.derived(name, Column::new(self.kind(), values))
    }

    #[must_use]
    pub fn add_const(&self, c: f64) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let values = numeric::add_const(c, &self.to_floats());
        self.derived(format!("({} + {c})", self.name), Column::new(self.kind(), values))
    }

    #[must_use]
    pub fn mul_const(&self, c: f64) -> Self {
        self.float_map(format!("({} * {c})", self.name), |v| v * c)
    }

    #[must_use]
    pub fn div_const(&self, c: f64) -> Self {
        self.float_map(format!("({} / {c})", self.name), |v| v / c)
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        self.float_map(format!("Abs({})", self.name), f64::abs)
    }

    #[must_use]
    pub fn cum_prod(&self) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let values = numeric::cum_prod(&self.to_floats());
        self.derived(format!("CumProd({})", self.name), Column::new(self.kind(), values))
    }

    fn binary(&self, other: &Series, op: ArithmeticOp, op_name: &'static str) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        if let Some(err) = other.error() {
            return self.fail(SeriesError::poisoned_argument(op_name, err));
        }
        match numeric::elementwise(&self.to_floats(), &other.to_floats(), op) {
            Ok(values) => Self::new(
                values,
                Kind::Float,
                format!("({} {} {})", self.name, op.symbol(), other.name),
            ),
            Err(err) => self.fail(SeriesError::from_column(op_name, err)),
        }
    }

    #[must_use]
    pub fn add(&self, other: &Series) -> Self {
        self.binary(other, ArithmeticOp::Add, "add")
    }

    #[must_use]
    pub fn sub(&self, other: &Series) -> Self {
        self.binary(other, ArithmeticOp::Sub, "sub")
    }

    #[must_use]
    pub fn mul(&self, other: &Series) -> Self {
        self.binary(other, ArithmeticOp::Mul, "mul")
    }

    #[must_use]
    pub fn div(&self, other: &Series) -> Self {
        self.binary(other, ArithmeticOp::Div, "div")
    }

    fn logical(&self, rhs: Values, op_name: &'static str, f: fn(bool, bool) -> bool) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let rhs = Column::new(Kind::Bool, rhs);
        let right = rhs.elements();
        if right.len() != 1 && right.len() != self.len() {
            return self.fail(SeriesError::DimensionMismatch {
                op: op_name,
                left: self.len(),
                right: right.len(),
            });
        }
        let values: Vec<Value> = self
            .elements()
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let other = if right.len() == 1 { &right[0] } else { &right[idx] };
                match (value.coerce(Kind::Bool).as_bool(), other.as_bool()) {
                    (Ok(a), Ok(b)) => Value::Bool(f(a, b)),
                    _ => Value::Null,
                }
            })
            .collect();
        Self::new(values, Kind::Bool, self.name.clone())
    }

    pub fn and(&self, rhs: impl Into<Values>) -> Self {
        self.logical(rhs.into(), "and", |a, b| a && b)
    }

    pub fn or(&self, rhs: impl Into<Values>) -> Self {
        self.logical(rhs.into(), "or", |a, b| a || b)
    }

    #[must_use]
    pub fn not(&self) -> Self {
        if self.is_poisoned() {
            return self.clone();
        }
        let values: Vec<Value> = self
            .elements()
            .iter()
            .map(|value| match value.coerce(Kind::Bool).as_bool() {
                Ok(flag) => Value::Bool(!flag),
                Err(_) => Value::Null,
            })
            .collect();
        Self::new(values, Kind::Bool, format!("!{}", self.name))
    }

    /// Replace every missing value in place.
    pub fn fill_nan(&mut self, value: impl Into<Value>) {
        if self.is_poisoned() {
            return;
        }
        let replacement = Element::from_value(self.kind(), value.into());
        self.column.fill_missing_with(|_| Some(replacement.clone()));
    }

    /// Carry the last non-missing value forward over missing runs.
    pub fn fill_nan_forward(&mut self) {
        if self.is_poisoned() {
            return;
        }
        let mut last: Option<Element> = None;
        let filled: Vec<Option<Element>> = self
            .elements()
            .iter()
            .map(|value| {
                if value.is_missing() {
                    last.clone()
                } else {
                    last = Some(value.clone());
                    None
                }
            })
            .collect();
        self.column.fill_missing_with(|idx| filled[idx].clone());
    }

    /// Carry the next non-missing value backward over missing runs.
    pub fn fill_nan_backward(&mut self) {
        if self.is_poisoned() {
            return;
        }
        let mut next: Option<Element> = None;
        let mut filled: Vec<Option<Element>> = self
            .elements()
            .iter()
            .rev()
            .map(|value| {
                if value.is_missing() {
                    next.clone()
                } else {
                    next = Some(value.clone());
                    None
                }
            })
            .collect();
        filled.reverse();
        self.column.fill_missing_with(|idx| filled[idx].clone());
    }

    /// Deep, independent duplicate, including any poisoned state.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    #[must_use]
    pub fn cache_able(self) -> CacheableSeries {
        CacheableSeries::new(self)
    }

    #[must_use]
    pub fn immutable(self) -> ImmutableSeries {
        ImmutableSeries::new(self)
    }

    #[must_use]
    pub fn rolling(&self, window: usize, min_periods: usize) -> Rolling<'_> {
        Rolling::new(
            self,
            RollingOptions::new(window).with_min_periods(min_periods),
        )
    }

    /// Multi-line dump with name, kind, length and values.
    #[must_use]
    pub fn str_info(&self) -> String {
        let mut lines = Vec::new();
        if !self.name.is_empty() {
            lines.push(format!("Name: {}", self.name));
        }
        lines.push(format!("Type: {}", self.kind()));
        lines.push(format!("Length: {}", self.len()));
        if !self.is_empty() {
            lines.push(format!("Values: {self}"));
        }
        lines.join("\n")
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.records().join(" "))
    }
}

impl From<&Series> for Values {
    fn from(series: &Series) -> Self {
        Values::from(series.column())
    }
}

impl From<&Series> for Indexes {
    fn from(series: &Series) -> Self {
        Indexes::Series {
            kind: series.kind(),
            values: series.elements().to_vec(),
            error: series.error().map(ToString::to_string),
        }
    }
}

/// Combine several series element by element. Each input must have length 1
/// (broadcast) or the common length; the result takes the first input's kind.
pub fn operation(
    inputs: &[&Series],
    f: impl Fn(usize, &[&Element]) -> Value,
) -> Result<Series, SeriesError> {
    let Some(first) = inputs.first() else {
        return Err(SeriesError::Argument {
            op: "operation",
            detail: "at least one series is required".to_owned(),
        });
    };
    if let Some(err) = inputs.iter().find_map(|series| series.error()) {
        return Err(SeriesError::poisoned_argument("operation", err));
    }
    let len = inputs.iter().map(|series| series.len()).max().unwrap_or(0);
    if let Some(bad) = inputs
        .iter()
        .find(|series| series.len() != len && series.len() != 1)
    {
        return Err(SeriesError::DimensionMismatch {
            op: "operation",
            left: len,
            right: bad.len(),
        });
    }

    let values = (0..len)
        .map(|idx| {
            let args: Vec<&Element> = inputs
                .iter()
                .map(|series| {
                    let elements = series.elements();
                    if elements.len() == 1 { &elements[0] } else { &elements[idx] }
                })
                .collect();
            f(idx, &args)
        })
        .collect::<Vec<_>>();
    Ok(Series::new(values, first.kind(), ""))
}

pub(crate) fn ordered_floats(elements: &[Element]) -> Vec<f64> {
    order_positions(elements, false)
        .into_iter()
        .map(|idx| elements[idx].as_float())
        .collect()
}

/// Quantile over a slice of elements of `kind`, shared with the rolling engine.
pub(crate) fn quantile_of(kind: Kind, elements: &[Element], p: f64) -> f64 {
    if kind == Kind::String || elements.is_empty() {
        return f64::NAN;
    }
    if p == 0.0 {
        return min_element(elements).map_or(f64::NAN, Element::as_float);
    }
    if p == 1.0 {
        return max_element(elements).map_or(f64::NAN, Element::as_float);
    }
    numeric::empirical_quantile(p, &ordered_floats(elements))
}

fn data_rank(data: f64, ordered: &[f64], denom: usize) -> f64 {
    ordered
        .iter()
        .position(|value| data < *value)
        .map_or(1.0, |idx| idx as f64 / denom as f64)
}
