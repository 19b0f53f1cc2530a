use std::rc::Rc;

use colseries::{CacheStats, Comparator, Series, SeriesError, Value};

#[test]
fn cached_rolling_chain_computes_each_step_once() {
    let cs = Series::floats(vec![1.5, -3.23, -0.337397, -0.380079, 1.60979, 34.0]).cache_able();
    let rolling = cs.rolling(3, 2);

    let max = rolling.max();
    let max_again = rolling.max();
    assert!(Rc::ptr_eq(&max, &max_again));

    let nested = max.rolling(3, 2);
    let first = nested.max();
    let second = nested.max();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(first.records()[3], "1.500000");

    assert_eq!(rolling.cache_stats(), CacheStats { hits: 1, misses: 1 });
    assert_eq!(nested.cache_stats(), CacheStats { hits: 1, misses: 1 });
}

#[test]
fn cached_reads_match_uncached_reads() {
    let plain = Series::ints(vec![23_i64, 13, 101, -64, -3]);
    let cached = plain.clone().cache_able();
    for _ in 0..2 {
        assert_eq!(cached.mean(), plain.mean());
        assert_eq!(cached.median(), plain.median());
        assert_eq!(cached.std_dev(), plain.std_dev());
        assert_eq!(cached.quantile(0.8), plain.quantile(0.8));
        assert_eq!(cached.order(true), plain.order(true));
        assert_eq!(cached.records(), plain.records());
        assert_eq!(cached.to_ints().expect("ints"), plain.to_ints().expect("ints"));
        assert_eq!(
            cached.data_quantiles(&[0.0, 50.0]),
            plain.data_quantiles(&[0.0, 50.0])
        );
    }
    let stats = cached.cache_stats();
    assert_eq!(stats.misses, 8);
    assert_eq!(stats.hits, 8);
}

#[test]
fn copies_start_warm_and_diverge() {
    let cached = Series::floats(vec![2.0, 4.0]).cache_able();
    let doubled = cached.mul_const(2.0);
    assert_eq!(doubled.to_floats(), vec![4.0, 8.0]);

    let copy = cached.copy();
    let from_copy = copy.mul_const(2.0);
    assert!(Rc::ptr_eq(&doubled, &from_copy));
    assert_eq!(copy.cache_stats().hits, 1);
    assert_eq!(cached.cache_stats().hits, 0);
}

#[test]
fn reads_not_memoized_still_reach_the_series() {
    let cached = Series::ints(vec![1_i64, 2, 3]).with_name("n").cache_able();
    let filtered = cached.compare(Comparator::GreaterEq, 2_i64);
    assert_eq!(filtered.to_bools().expect("bools"), vec![false, true, true]);
    assert_eq!(cached.subset(vec![2_usize]).records(), vec!["3"]);
    assert_eq!(cached.name(), "n");
}

fn flags() -> Series {
    Series::bools(vec![false, true, false, false, true])
}

#[test]
fn scalar_right_hand_sides_broadcast() {
    let s = flags();
    assert_eq!(s.and("true").records(), s.records());
    assert_eq!(s.or("true").records(), vec!["true"; 5]);
    assert_eq!(s.and(false).records(), vec!["false"; 5]);
}

#[test]
fn every_rhs_kind_is_read_as_bool() {
    let s = flags();
    let anded = vec!["false"; 5];
    let ored = vec!["true", "true", "true", "false", "true"];

    assert_eq!(s.and(vec![1_i64, 0, 1, 0, 0]).records(), anded);
    assert_eq!(s.and(vec![1.0, 0.0, 1.0, 0.0, 0.0]).records(), anded);
    assert_eq!(s.and(vec!["1", "0", "1", "0", "0"]).records(), anded);
    assert_eq!(s.and(vec![true, false, true, false, false]).records(), anded);

    assert_eq!(s.or(vec![1_i64, 0, 1, 0, 0]).records(), ored);
    assert_eq!(s.or(vec![1.0, 0.0, 1.0, 0.0, 0.0]).records(), ored);
    assert_eq!(s.or(vec!["1", "0", "1", "0", "0"]).records(), ored);
    assert_eq!(
        s.or(&Series::bools(vec![true, false, true, false, false]))
            .records(),
        ored
    );
}

#[test]
fn missing_operands_yield_missing() {
    let s = Series::bools(vec![Value::Bool(true), Value::Null]);
    assert_eq!(s.or(vec![Value::Null, Value::Bool(true)]).records(), vec!["NaN", "NaN"]);
    assert_eq!(s.not().records(), vec!["false", "NaN"]);
}

#[test]
fn length_mismatch_poisons() {
    let out = flags().or(vec![true, false]);
    assert_eq!(
        out.error(),
        Some(&SeriesError::DimensionMismatch {
            op: "or",
            left: 5,
            right: 2
        })
    );
}

#[test]
fn immutable_series_blocks_writes() {
    let mut frozen = flags().immutable();
    let err = frozen.append(true).expect_err("read-only");
    assert_eq!(err, SeriesError::ReadOnly { op: "append" });
    assert!(err.to_string().contains("read-only"));
    assert_eq!(frozen.len(), 5);
    assert_eq!(frozen.not().len(), 5);
}
