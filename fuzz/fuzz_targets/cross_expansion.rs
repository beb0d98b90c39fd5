#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [f64; 4]| {
    if data
        .iter()
        .any(|v| !v.is_finite() || v.abs() > 1e150 || (v.abs() != 0.0 && v.abs() < 1e-150))
    {
        return;
    }

    let e = robust2d::cross_expansion(data[0], data[1], data[2], data[3]);

    assert_eq!(e.len(), 4);
    assert!(e.components().iter().all(|c| c.is_finite()));
    assert!(e.check_invariants());
});
