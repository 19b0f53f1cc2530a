use std::ops::Deref;

use cs_columnar::Values;
use cs_index::Indexes;
use cs_types::Value;

use crate::{Series, SeriesError};

/// Read-only view of a [`Series`]. Reads go through `Deref`; every in-place
/// mutator is rejected with [`SeriesError::ReadOnly`] and leaves the data as
/// it was.
#[derive(Debug, Clone, PartialEq)]
pub struct ImmutableSeries {
    series: Series,
}

impl ImmutableSeries {
    #[must_use]
    pub fn new(series: Series) -> Self {
        Self { series }
    }

    /// Mutable, independent copy of the wrapped series.
    #[must_use]
    pub fn copy(&self) -> Series {
        self.series.clone()
    }

    #[must_use]
    pub fn into_inner(self) -> Series {
        self.series
    }

    pub fn set(&mut self, _indexes: impl Into<Indexes>, _values: &Series) -> Result<(), SeriesError> {
        Err(read_only("set"))
    }

    pub fn append(&mut self, _values: impl Into<Values>) -> Result<(), SeriesError> {
        Err(read_only("append"))
    }

    pub fn fill_nan(&mut self, _value: impl Into<Value>) -> Result<(), SeriesError> {
        Err(read_only("fill_nan"))
    }

    pub fn fill_nan_forward(&mut self) -> Result<(), SeriesError> {
        Err(read_only("fill_nan_forward"))
    }

    pub fn fill_nan_backward(&mut self) -> Result<(), SeriesError> {
        Err(read_only("fill_nan_backward"))
    }

    pub fn set_name(&mut self, _name: impl Into<String>) -> Result<(), SeriesError> {
        Err(read_only("set_name"))
    }

    pub fn set_error(&mut self, _error: SeriesError) -> Result<(), SeriesError> {
        Err(read_only("set_error"))
    }
}

impl Deref for ImmutableSeries {
    type Target = Series;

    fn deref(&self) -> &Series {
        &self.series
    }
}

impl From<Series> for ImmutableSeries {
    fn from(series: Series) -> Self {
        Self::new(series)
    }
}

fn read_only(op: &'static str) -> SeriesError {
    emit!(debug, op, "mutation rejected on read-only series");
    SeriesError::ReadOnly { op }
}

#[cfg(test)]
mod tests {
    use crate::{Series, SeriesError};

    #[test]
    fn mutators_are_rejected_and_data_is_unchanged() {
        let mut frozen = Series::ints(vec![1_i64, 2]).with_name("f").immutable();
        assert_eq!(
            frozen.set(0_usize, &Series::ints(vec![9_i64])),
            Err(SeriesError::ReadOnly { op: "set" })
        );
        assert!(frozen.append(3_i64).is_err());
        assert!(frozen.fill_nan(0_i64).is_err());
        assert!(frozen.fill_nan_forward().is_err());
        assert!(frozen.fill_nan_backward().is_err());
        assert!(frozen.set_name("g").is_err());
        assert_eq!(frozen.records(), vec!["1", "2"]);
        assert_eq!(frozen.name(), "f");
        assert!(!frozen.is_poisoned());
    }

    #[test]
    fn reads_and_derivations_pass_through() {
        let frozen = Series::floats(vec![1.0, -4.0]).immutable();
        assert_eq!(frozen.sum(), -3.0);
        assert_eq!(frozen.abs().to_floats(), vec![1.0, 4.0]);

        let mut thawed = frozen.copy();
        thawed.append(2.0);
        assert_eq!(thawed.len(), 3);
        assert_eq!(frozen.len(), 2);
    }
}
