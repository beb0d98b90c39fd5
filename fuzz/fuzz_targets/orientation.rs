#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: [(f64, f64); 3]| {
    // Stay clear of intermediate overflow; the predicate contract covers
    // finite arithmetic only.
    if data
        .iter()
        .any(|(x, y)| !x.is_finite() || !y.is_finite() || x.abs() > 1e150 || y.abs() > 1e150)
    {
        return;
    }

    let p = robust2d::Coord { x: data[0].0, y: data[0].1 };
    let a = robust2d::Coord { x: data[1].0, y: data[1].1 };
    let b = robust2d::Coord { x: data[2].0, y: data[2].1 };

    let forward = robust2d::orientation(p, a, b);
    let reverse = robust2d::orientation(p, b, a);

    assert!(forward.is_finite());
    // Reversing the line flips the winding, so the signs must oppose.
    assert_eq!(forward > 0.0, reverse < 0.0);
    assert_eq!(forward == 0.0, reverse == 0.0);
});
