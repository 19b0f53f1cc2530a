#![forbid(unsafe_code)]

//! Typed, column-oriented series.
//!
//! A [`Series`] holds elements of a single [`Kind`] (int, float, string or
//! bool), each of which may be missing. Data errors do not panic or return
//! `Err`; they poison the resulting series and travel down the call chain
//! until [`Series::check`] surfaces them.
//!
//! ```
//! use colseries::{Comparator, Series};
//!
//! let prices = Series::floats(vec![1.5, -3.23, 34.0]).with_name("px");
//! let rising = prices.compare(Comparator::Greater, 0.0);
//! assert_eq!(rising.to_bools().expect("bools"), vec![true, false, true]);
//!
//! let smoothed = prices.rolling(2, 1).mean();
//! assert_eq!(smoothed.name(), "px_Rolling(2,1)_Mean");
//! ```

pub use cs_columnar::{
    ArithmeticOp, Column, ColumnError, ValidityMask, Values, max_element, median, min_element,
    numeric, order_positions,
};
pub use cs_index::{IndexError, Indexes, resolve_positions};
pub use cs_series::{
    CacheStats, CacheableRolling, CacheableSeries, CachedValue, Comparator, ImmutableSeries,
    MemoCache, Rolling, RollingOptions, Series, SeriesError, operation,
};
pub use cs_types::{Element, Kind, MISSING_TEXT, TypeError, Value, format_float};
