use colseries::{Kind, Series};

const NAN: f64 = f64::NAN;

fn assert_floats(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length of {actual:?}");
    for (idx, (got, want)) in actual.iter().zip(expected).enumerate() {
        if want.is_nan() {
            assert!(got.is_nan(), "position {idx}: expected NaN, got {got}");
        } else {
            assert!(
                (got - want).abs() < 1e-6,
                "position {idx}: expected {want}, got {got}"
            );
        }
    }
}

fn bools() -> Series {
    Series::bools(vec![false, true, false, false, true])
}

fn floats() -> Series {
    Series::floats(vec![1.5, -3.23, -0.337397, -0.380079, 1.60979, 34.0])
}

fn strings() -> Series {
    Series::strings(vec![
        "20210618", "20200909", "20200910", "20200912", "20200911",
    ])
}

fn ints() -> Series {
    Series::ints(vec![23_i64, 13, 101, -64, -3])
}

#[test]
fn bool_source() {
    let s = bools();
    let rolling = s.rolling(2, 1);

    let max = rolling.max();
    assert_eq!(max.kind(), Kind::Bool);
    assert_eq!(max.records(), vec!["false", "true", "true", "false", "true"]);
    assert_eq!(rolling.min().records(), vec!["false"; 5]);
    assert_floats(&rolling.mean().to_floats(), &[0.0, 0.5, 0.5, 0.0, 0.5]);
    assert_floats(
        &rolling.quantile(0.8).to_floats(),
        &[0.0, 1.0, 1.0, 0.0, 1.0],
    );
    assert_floats(&rolling.median().to_floats(), &[NAN; 5]);
    assert_floats(
        &rolling.std_dev().to_floats(),
        &[NAN, 0.707107, 0.707107, 0.0, 0.707107],
    );

    let nested = max.rolling(2, 1).max();
    assert_eq!(nested.records(), vec!["false", "true", "true", "true", "true"]);
}

#[test]
fn float_source() {
    let s = floats();
    let rolling = s.rolling(3, 2);

    assert_floats(
        &rolling.max().to_floats(),
        &[NAN, 1.5, 1.5, -0.337397, 1.60979, 34.0],
    );
    assert_floats(
        &rolling.min().to_floats(),
        &[NAN, -3.23, -3.23, -3.23, -0.380079, -0.380079],
    );
    assert_floats(
        &rolling.mean().to_floats(),
        &[NAN, -0.865, -0.689132333, -1.315825333, 0.297438, 11.743237],
    );
    assert_floats(
        &rolling.quantile(0.7).to_floats(),
        &[NAN, 1.5, 1.5, -0.337397, 1.60979, 34.0],
    );
    assert_floats(
        &rolling.median().to_floats(),
        &[NAN, -0.865, -0.337397, -0.380079, -0.337397, 1.60979],
    );
    assert_floats(
        &rolling.std_dev().to_floats(),
        &[
            NAN,
            3.344615075,
            2.384536288,
            1.657861251,
            1.136730517,
            19.30058339,
        ],
    );
    assert_floats(
        &rolling.mean_by_weights(&[0.5, 0.3, 0.2]).to_floats(),
        &[NAN, -0.392, -0.2864794, -1.7922349, 0.0392358, 7.0928975],
    );

    let max_of_max = rolling.max().rolling(3, 2).max();
    assert_floats(
        &max_of_max.to_floats(),
        &[NAN, NAN, NAN, 1.5, 1.60979, 34.0],
    );
    let min_of_min = rolling.min().rolling(3, 2).min();
    assert_floats(
        &min_of_min.to_floats(),
        &[NAN, NAN, NAN, -3.23, -3.23, -3.23],
    );
}

#[test]
fn string_source() {
    let s = strings();
    let rolling = s.rolling(3, 2);

    let max = rolling.max();
    assert_eq!(max.kind(), Kind::String);
    assert_eq!(
        max.records(),
        vec!["NaN", "20210618", "20210618", "20200912", "20200912"]
    );
    assert_eq!(
        rolling.min().records(),
        vec!["NaN", "20200909", "20200909", "20200909", "20200910"]
    );
    assert_floats(
        &rolling.mean().to_floats(),
        &[NAN, 20205763.5, 20204145.666667, 20200910.333333, 20200911.0],
    );
    assert_floats(&rolling.quantile(0.5).to_floats(), &[NAN; 5]);
    assert_floats(&rolling.median().to_floats(), &[NAN; 5]);
    assert_floats(
        &rolling.std_dev().to_floats(),
        &[NAN, 6865.299739, 5605.205111, 1.527525, 1.0],
    );
}

#[test]
fn int_source() {
    let s = ints();
    let rolling = s.rolling(3, 1);

    let max = rolling.max();
    assert_eq!(max.kind(), Kind::Int);
    assert_eq!(max.records(), vec!["23", "23", "101", "101", "101"]);
    assert_eq!(
        rolling.min().records(),
        vec!["23", "13", "13", "-64", "-64"]
    );
    assert_floats(
        &rolling.mean().to_floats(),
        &[23.0, 18.0, 45.666667, 16.666667, 11.333333],
    );
    assert_floats(
        &rolling.quantile(0.8).to_floats(),
        &[23.0, 23.0, 101.0, 101.0, 101.0],
    );
    assert_floats(
        &rolling.median().to_floats(),
        &[23.0, 18.0, 23.0, 13.0, -3.0],
    );
    assert_floats(
        &rolling.std_dev().to_floats(),
        &[NAN, 7.071067812, 48.18021724, 82.56108849, 83.4286122],
    );
}

#[test]
fn weights_renormalize_over_partial_history() {
    let s = Series::floats(vec![23.0, 13.0, 101.0, -64.0, -3.0]);
    assert_floats(
        &s.rolling(3, 1).mean_by_weights(&[5.0, 3.0, 2.0]).to_floats(),
        &[23.0, 19.0, 35.6, 24.0, 30.7],
    );
}

#[test]
fn rolling_output_is_named_after_the_source() {
    let s = ints().with_name("qty");
    assert_eq!(s.rolling(3, 1).median().name(), "qty_Rolling(3,1)_Median");
    assert_eq!(
        s.rolling(3, 1).quantile(0.8).name(),
        "qty_Rolling(3,1)_Quantile(0.8)"
    );
}
