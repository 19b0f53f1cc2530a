//! Memoizing wrappers around [`Series`] and [`Rolling`].
//!
//! Each wrapper owns a private [`MemoCache`] keyed by the operation and its
//! arguments. Only successful results are stored; a poisoned series or a
//! failed conversion is recomputed on every call. Derived series come back
//! as `Rc<CacheableSeries>`, so chained calls on them are memoized too.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Deref;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Rolling, RollingOptions, Series, SeriesError};

/// A memoized result.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Bool(bool),
    Float(f64),
    Floats(Vec<f64>),
    Ints(Vec<i64>),
    Bools(Vec<bool>),
    Positions(Vec<usize>),
    Text(String),
    Texts(Vec<String>),
    Series(Rc<CacheableSeries>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MemoCache {
    entries: HashMap<String, CachedValue>,
    stats: CacheStats,
}

impl MemoCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look `key` up, counting the outcome as a hit or a miss.
    pub fn lookup(&mut self, key: &str) -> Option<CachedValue> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    pub fn insert(&mut self, key: impl Into<String>, value: CachedValue) {
        self.entries.insert(key.into(), value);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub(crate) trait CacheValue: Sized {
    fn to_cached(&self) -> CachedValue;
    fn from_cached(value: &CachedValue) -> Option<Self>;
}

macro_rules! cache_value {
    ($ty:ty, $variant:ident) => {
        impl CacheValue for $ty {
            fn to_cached(&self) -> CachedValue {
                CachedValue::$variant(self.clone())
            }

            fn from_cached(value: &CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

cache_value!(bool, Bool);
cache_value!(f64, Float);
cache_value!(Vec<f64>, Floats);
cache_value!(Vec<i64>, Ints);
cache_value!(Vec<bool>, Bools);
cache_value!(Vec<usize>, Positions);
cache_value!(String, Text);
cache_value!(Vec<String>, Texts);
cache_value!(Rc<CacheableSeries>, Series);

#[derive(Debug, Clone, Default)]
struct Memo(RefCell<MemoCache>);

impl Memo {
    fn lookup<T: CacheValue>(&self, key: &str) -> Option<T> {
        let hit = self.0.borrow_mut().lookup(key);
        emit!(trace, key, hit = hit.is_some(), "memo lookup");
        hit.as_ref().and_then(T::from_cached)
    }

    fn store<T: CacheValue>(&self, key: String, value: &T) {
        self.0.borrow_mut().insert(key, value.to_cached());
    }

    /// `storable` is false when the value was read off a poisoned series.
    fn memoize<T: CacheValue>(
        &self,
        key: String,
        storable: bool,
        compute: impl FnOnce() -> T,
    ) -> T {
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }
        let value = compute();
        if storable {
            self.store(key, &value);
        }
        value
    }

    fn memoize_result<T: CacheValue>(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<T, SeriesError>,
    ) -> Result<T, SeriesError> {
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.store(key, &value);
        Ok(value)
    }

    fn memoize_series(&self, key: String, compute: impl FnOnce() -> Series) -> Rc<CacheableSeries> {
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }
        let derived = Rc::new(CacheableSeries::new(compute()));
        if !derived.is_poisoned() {
            self.store(key, &derived);
        }
        derived
    }

    fn stats(&self) -> CacheStats {
        self.0.borrow().stats()
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

/// A [`Series`] whose derived results are computed once.
///
/// All read-only [`Series`] operations remain reachable through `Deref`;
/// the methods defined here shadow the ones worth memoizing.
#[derive(Debug, Clone)]
pub struct CacheableSeries {
    series: Series,
    memo: Memo,
}

impl CacheableSeries {
    #[must_use]
    pub fn new(series: Series) -> Self {
        Self {
            series,
            memo: Memo::default(),
        }
    }

    #[must_use]
    pub fn series(&self) -> &Series {
        &self.series
    }

    #[must_use]
    pub fn into_inner(self) -> Series {
        self.series
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.memo.stats()
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.memo.len()
    }

    /// Already memoizing; returns `self` unchanged.
    #[must_use]
    pub fn cache_able(self) -> Self {
        self
    }

    /// Independent duplicate carrying a snapshot of the cache.
    #[must_use]
    pub fn copy(&self) -> Self {
        self.clone()
    }

    #[must_use]
    pub fn rolling(&self, window: usize, min_periods: usize) -> CacheableRolling<'_> {
        CacheableRolling::new(self.series.rolling(window, min_periods))
    }

    fn read<T: CacheValue>(&self, key: String, compute: impl FnOnce() -> T) -> T {
        self.memo.memoize(key, !self.series.is_poisoned(), compute)
    }

    #[must_use]
    pub fn has_nan(&self) -> bool {
        self.read("HasNaN".to_owned(), || self.series.has_nan())
    }

    #[must_use]
    pub fn is_nan(&self) -> Vec<bool> {
        self.read("IsNaN".to_owned(), || self.series.is_nan())
    }

    #[must_use]
    pub fn is_not_nan(&self) -> Vec<bool> {
        self.read("IsNotNaN".to_owned(), || self.series.is_not_nan())
    }

    #[must_use]
    pub fn records(&self) -> Vec<String> {
        self.read("Records".to_owned(), || self.series.records())
    }

    #[must_use]
    pub fn to_floats(&self) -> Vec<f64> {
        self.read("Float".to_owned(), || self.series.to_floats())
    }

    pub fn to_ints(&self) -> Result<Vec<i64>, SeriesError> {
        self.memo
            .memoize_result("Int".to_owned(), || self.series.to_ints())
    }

    pub fn to_bools(&self) -> Result<Vec<bool>, SeriesError> {
        self.memo
            .memoize_result("Bool".to_owned(), || self.series.to_bools())
    }

    #[must_use]
    pub fn order(&self, reverse: bool) -> Vec<usize> {
        self.read(format!("Order({reverse})"), || self.series.order(reverse))
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.read("Sum".to_owned(), || self.series.sum())
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.read("Mean".to_owned(), || self.series.mean())
    }

    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.read("StdDev".to_owned(), || self.series.std_dev())
    }

    #[must_use]
    pub fn median(&self) -> f64 {
        self.read("Median".to_owned(), || self.series.median())
    }

    #[must_use]
    pub fn prod(&self) -> f64 {
        self.read("Prod".to_owned(), || self.series.prod())
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.read("Max".to_owned(), || self.series.max())
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.read("Min".to_owned(), || self.series.min())
    }

    #[must_use]
    pub fn max_str(&self) -> String {
        self.read("MaxStr".to_owned(), || self.series.max_str())
    }

    #[must_use]
    pub fn min_str(&self) -> String {
        self.read("MinStr".to_owned(), || self.series.min_str())
    }

    #[must_use]
    pub fn quantile(&self, p: f64) -> f64 {
        self.read(format!("Quantile({p:.6})"), || self.series.quantile(p))
    }

    #[must_use]
    pub fn quantiles(&self, ps: &[f64]) -> Vec<f64> {
        self.read(format!("Quantiles({})", key_list(ps)), || {
            self.series.quantiles(ps)
        })
    }

    #[must_use]
    pub fn data_quantile(&self, data: f64) -> f64 {
        self.read(format!("DataQuantile({data:.6})"), || {
            self.series.data_quantile(data)
        })
    }

    #[must_use]
    pub fn data_quantiles(&self, datas: &[f64]) -> Vec<f64> {
        self.read(format!("DataQuantiles({})", key_list(datas)), || {
            self.series.data_quantiles(datas)
        })
    }

    #[must_use]
    pub fn shift(&self, periods: i64) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("Shift({periods})"), || self.series.shift(periods))
    }

    #[must_use]
    pub fn add_const(&self, c: f64) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("AddConst({c:.6})"), || self.series.add_const(c))
    }

    #[must_use]
    pub fn mul_const(&self, c: f64) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("MulConst({c:.6})"), || self.series.mul_const(c))
    }

    #[must_use]
    pub fn div_const(&self, c: f64) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("DivConst({c:.6})"), || self.series.div_const(c))
    }

    #[must_use]
    pub fn abs(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Abs".to_owned(), || self.series.abs())
    }

    #[must_use]
    pub fn cum_prod(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("CumProd".to_owned(), || self.series.cum_prod())
    }

    #[must_use]
    pub fn not(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Not".to_owned(), || self.series.not())
    }
}

impl Deref for CacheableSeries {
    type Target = Series;

    fn deref(&self) -> &Series {
        &self.series
    }
}

impl From<Series> for CacheableSeries {
    fn from(series: Series) -> Self {
        Self::new(series)
    }
}

/// Rolling aggregates memoized per window configuration.
#[derive(Debug, Clone)]
pub struct CacheableRolling<'a> {
    rolling: Rolling<'a>,
    memo: Memo,
}

impl<'a> CacheableRolling<'a> {
    #[must_use]
    pub fn new(rolling: Rolling<'a>) -> Self {
        Self {
            rolling,
            memo: Memo::default(),
        }
    }

    #[must_use]
    pub fn options(&self) -> RollingOptions {
        self.rolling.options()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.memo.stats()
    }

    #[must_use]
    pub fn max(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Max".to_owned(), || self.rolling.max())
    }

    #[must_use]
    pub fn min(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Min".to_owned(), || self.rolling.min())
    }

    #[must_use]
    pub fn mean(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Mean".to_owned(), || self.rolling.mean())
    }

    #[must_use]
    pub fn median(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("Median".to_owned(), || self.rolling.median())
    }

    #[must_use]
    pub fn std_dev(&self) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series("StdDev".to_owned(), || self.rolling.std_dev())
    }

    #[must_use]
    pub fn quantile(&self, p: f64) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("Quantile({p:.6})"), || self.rolling.quantile(p))
    }

    #[must_use]
    pub fn mean_by_weights(&self, weights: &[f64]) -> Rc<CacheableSeries> {
        self.memo
            .memoize_series(format!("MeanByWeights({})", key_list(weights)), || {
                self.rolling.mean_by_weights(weights)
            })
    }
}

fn key_list(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| format!("{value:.6}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{CacheStats, CacheableSeries, MemoCache};
    use crate::Series;

    #[test]
    fn repeated_reads_hit_the_cache() {
        let cs = Series::floats(vec![3.0, 1.0, 2.0]).cache_able();
        assert_eq!(cs.mean(), 2.0);
        assert_eq!(cs.mean(), 2.0);
        assert_eq!(cs.order(false), vec![1, 2, 0]);
        assert_eq!(cs.order(false), vec![1, 2, 0]);
        assert_eq!(cs.order(true), vec![0, 2, 1]);
        assert_eq!(cs.cache_stats(), CacheStats { hits: 2, misses: 3 });
        assert_eq!(cs.cached_entries(), 3);
    }

    #[test]
    fn quantile_keys_distinguish_arguments() {
        let cs = Series::ints(vec![1_i64, 2, 3, 4]).cache_able();
        assert_eq!(cs.quantile(0.5), 2.0);
        assert_eq!(cs.quantile(0.75), 3.0);
        assert_eq!(cs.quantile(0.5), 2.0);
        assert_eq!(cs.cache_stats().hits, 1);
    }

    #[test]
    fn derived_series_are_shared_and_chainable() {
        let cs = Series::ints(vec![-1_i64, 2]).with_name("x").cache_able();
        let first = cs.abs();
        let second = cs.abs();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Abs(x)");
        assert_eq!(first.sum(), 3.0);
        assert_eq!(first.sum(), 3.0);
        assert_eq!(first.cache_stats().hits, 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cs = Series::strings(vec!["x"]).cache_able();
        assert!(cs.to_ints().is_err());
        assert!(cs.to_ints().is_err());
        assert_eq!(cs.cache_stats(), CacheStats { hits: 0, misses: 2 });

        let poisoned = Series::ints(vec![1_i64]).subset(vec![4_usize]).cache_able();
        let shifted = poisoned.shift(1);
        assert!(shifted.is_poisoned());
        assert!(poisoned.mean().is_nan());
        assert!(poisoned.mean().is_nan());
        assert!(poisoned.order(false).is_empty());
        assert_eq!(poisoned.cached_entries(), 0);
        assert_eq!(poisoned.cache_stats().hits, 0);
    }

    #[test]
    fn copy_snapshots_the_cache() {
        let cs = Series::floats(vec![1.0, 2.0]).cache_able();
        let _ = cs.max();
        let copy = cs.copy();
        let _ = copy.max();
        assert_eq!(copy.cache_stats().hits, 1);
        assert_eq!(cs.cache_stats().hits, 0);
    }

    #[test]
    fn cacheable_of_cacheable_is_identity() {
        let cs = Series::floats(vec![1.0]).cache_able();
        let _ = cs.sum();
        let again: CacheableSeries = cs.cache_able();
        assert_eq!(again.cached_entries(), 1);
    }

    #[test]
    fn rolling_results_are_memoized_per_wrapper() {
        let cs = Series::floats(vec![1.0, 2.0, 3.0]).cache_able();
        let rolling = cs.rolling(2, 1);
        let a = rolling.mean_by_weights(&[1.0, 1.0]);
        let b = rolling.mean_by_weights(&[1.0, 1.0]);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(a.to_floats(), vec![1.0, 1.5, 2.5]);
        let c = rolling.mean_by_weights(&[2.0, 1.0]);
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(rolling.cache_stats(), CacheStats { hits: 1, misses: 2 });
    }

    #[test]
    fn memo_cache_counts_lookups() {
        let mut cache = MemoCache::new();
        assert!(cache.lookup("k").is_none());
        cache.insert("k", super::CachedValue::Float(1.0));
        assert!(cache.lookup("k").is_some());
        assert!(cache.contains("k"));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        cache.clear();
        assert!(cache.is_empty());
    }
}
