#![no_main]

use colseries::{Element, Kind, Value};
use libfuzzer_sys::fuzz_target;

const KINDS: [Kind; 4] = [Kind::Int, Kind::Float, Kind::String, Kind::Bool];

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    for kind in KINDS {
        let element = Element::from_value(kind, Value::String(text.to_owned()));
        assert_eq!(element.kind(), kind);
        for target in KINDS {
            let coerced = element.coerce(target);
            assert_eq!(coerced.kind(), target);
            if element.is_missing() {
                assert!(coerced.is_missing());
            }
        }
        let _ = element.as_int();
        let _ = element.as_bool();
        let _ = element.as_string();
    }
});
