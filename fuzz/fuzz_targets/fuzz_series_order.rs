#![no_main]

use colseries::{Series, Value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let values: Vec<Value> = data
        .chunks(2)
        .map(|chunk| match chunk {
            [0, _] => Value::Null,
            [_, raw] => Value::Float(f64::from(*raw) - 128.0),
            _ => Value::Float(f64::NAN),
        })
        .collect();
    let series = Series::floats(values);
    for reverse in [false, true] {
        let order = series.order(reverse);
        assert_eq!(order.len(), series.len());
        let missing = series.is_nan();
        let first_missing = order.iter().position(|&idx| missing[idx]);
        if let Some(start) = first_missing {
            assert!(order[start..].iter().all(|&idx| missing[idx]));
        }
    }
    if !series.is_empty() && !series.has_nan() {
        assert_eq!(series.quantile(0.0), series.min());
        assert_eq!(series.quantile(1.0), series.max());
    }
});
