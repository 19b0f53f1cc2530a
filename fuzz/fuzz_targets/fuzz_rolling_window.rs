#![no_main]

use colseries::Series;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&window, rest)) = data.split_first() else {
        return;
    };
    let Some((&min_periods, rest)) = rest.split_first() else {
        return;
    };
    let values: Vec<i64> = rest.iter().map(|b| i64::from(*b) - 100).collect();
    let series = Series::ints(values);
    let (window, min_periods) = (usize::from(window % 16), usize::from(min_periods % 16));
    let rolling = series.rolling(window, min_periods);
    assert_eq!(
        rolling.options().validate().is_ok(),
        window > 0 && min_periods <= window
    );
    let weights = [0.5, 0.3, 0.2];
    for out in [
        rolling.max(),
        rolling.min(),
        rolling.mean(),
        rolling.median(),
        rolling.std_dev(),
        rolling.quantile(0.5),
        rolling.mean_by_weights(&weights),
    ] {
        match out.error() {
            Some(_) => assert!(rolling.options().validate().is_err()),
            None => assert_eq!(out.len(), series.len()),
        }
    }
});
