#![cfg_attr(feature = "no_std", no_std)]
#![allow(non_snake_case)]

//! # Adaptive-Precision Expansion Arithmetic and a Robust 2D Orientation Predicate
//!
//! The exact side-of-line core of a 2D rigid-body collision pipeline, built on
//! the adaptive-precision techniques of Jonathan Richard Shewchuk
//! ([https://www.cs.cmu.edu/~quake/robust.html](https://www.cs.cmu.edu/~quake/robust.html)):
//! error-free transforms recover the exact rounding error of individual
//! floating-point operations, multi-component [`Expansion`]s carry values
//! beyond double precision, and the [`orientation`] predicate escalates
//! through four precision tiers, paying for exact arithmetic only when a
//! cheap error bound cannot certify the sign of an approximation.
//!
//! Wrong signs in orientation tests destabilize everything downstream of
//! them: contact generation, hull construction and penetration resolution all
//! assume the side-of-line oracle is consistent. The predicate here returns a
//! `f64` whose sign always matches the true mathematical sign of the
//! orientation determinant, for any finite inputs, with `0.0` indicating
//! exact collinearity.
//!
//! The public API accepts both `f32` and `f64` coordinates, with input
//! converted to `f64` for internal use. This has no effect on precision, as
//! the [IEEE-754 standard](https://drive.google.com/file/d/0B3O3Ys97VjtxYXBCY08wanNoZ1U/view)
//! (section 5.3) guarantees that conversion from `f32` to `f64` is exact.
//!
//! All arithmetic assumes strict IEEE-754 binary64 round-to-nearest-even
//! semantics with no extended intermediate precision and no FMA contraction.
//! `NaN` and infinite coordinates are out of contract and are not validated.
//!
//! # Features
//! - `no_std`: Build without the Rust standard library

mod expansion;

pub use expansion::Expansion;


/// A two dimensional coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Coord<T: Into<f64>> {
    pub x: T,
    pub y: T,
}

// These values are precomputed from the machine-epsilon derivation loop of
// the original design (halve until 1.0 + e == 1.0). They are the same in all
// IEEE-754 environments, including rust f64; a test re-derives them.
const SPLITTER: f64 = 134_217_729f64;
const EPSILON: f64 = 0.000_000_000_000_000_111_022_302_462_515_65;
const RESULTERRBOUND: f64 = (3.0 + 8.0 * EPSILON) * EPSILON;
const ERRBOUND_A: f64 = (3.0 + 16.0 * EPSILON) * EPSILON;
const ERRBOUND_B: f64 = (2.0 + 12.0 * EPSILON) * EPSILON;
const ERRBOUND_C: f64 = (9.0 + 64.0 * EPSILON) * EPSILON * EPSILON;

// `f64::abs` is not in `core`, see https://github.com/rust-lang/rust/issues/50145
#[cfg(feature = "no_std")]
#[inline(always)]
pub(crate) fn abs(x: f64) -> f64 {
    ieee754::Ieee754::abs(x)
}
#[cfg(not(feature = "no_std"))]
#[inline(always)]
pub(crate) fn abs(x: f64) -> f64 {
    x.abs()
}

/// Returns a positive value if `point` lies to the **left** of the directed
/// line from `line_start` to `line_end` (the three points wind
/// counterclockwise).
/// Returns a negative value if it lies to the **right** (clockwise winding).
/// Returns `0` if the three points are exactly **collinear**.
///
/// The sign of the result is always correct, even in near-degenerate
/// configurations where the naive double-precision determinant cancels
/// catastrophically. Precision escalates adaptively: the overwhelming
/// majority of calls resolve with plain double arithmetic, and fully exact
/// expansion arithmetic runs only for nearly collinear inputs.
pub fn orientation<T: Into<f64>>(
    point: Coord<T>,
    line_start: Coord<T>,
    line_end: Coord<T>,
) -> f64 {
    let p = Coord {
        x: point.x.into(),
        y: point.y.into(),
    };
    let a = Coord {
        x: line_start.x.into(),
        y: line_start.y.into(),
    };
    let b = Coord {
        x: line_end.x.into(),
        y: line_end.y.into(),
    };

    let det_left = (p.x - b.x) * (a.y - b.y);
    let det_right = (p.y - b.y) * (a.x - b.x);
    let det = det_left - det_right;

    // When either product is zero or the products disagree in sign, the
    // subtraction cannot cancel catastrophically and det is already reliable.
    if det_left == 0.0 || det_right == 0.0 || (det_left > 0.0) != (det_right > 0.0) {
        return det;
    }

    let detsum = abs(det_left + det_right);
    let errbound = ERRBOUND_A * detsum;
    if det >= errbound || -det >= errbound {
        return det;
    }

    orientation_adapt(p, a, b, detsum)
}

/// Tiers 1-3 of the adaptive predicate. `detsum` is the magnitude sum of the
/// two tier-0 products, against which the remaining error bounds are scaled.
fn orientation_adapt(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>, detsum: f64) -> f64 {
    let acx = p.x - b.x;
    let acy = p.y - b.y;
    let bcx = a.x - b.x;
    let bcy = a.y - b.y;

    // Tier 1: the cross product of the rounded coordinate differences,
    // carried exactly as a 4-component expansion.
    let B = cross_expansion(acx, acy, bcx, bcy);

    let mut det = B.estimate();
    let errbound = ERRBOUND_B * detsum;
    if det >= errbound || -det >= errbound {
        return det;
    }

    // Tier 2: fold in the rounding errors of the coordinate differences as a
    // first-order correction, still in plain arithmetic.
    let acxtail = two_diff_tail(p.x, b.x, acx);
    let bcxtail = two_diff_tail(a.x, b.x, bcx);
    let acytail = two_diff_tail(p.y, b.y, acy);
    let bcytail = two_diff_tail(a.y, b.y, bcy);

    if acxtail == 0.0 && acytail == 0.0 && bcxtail == 0.0 && bcytail == 0.0 {
        return det;
    }

    let errbound = ERRBOUND_C * detsum + RESULTERRBOUND * abs(det);
    det += (acx * bcytail + bcy * acxtail) - (acy * bcxtail + bcx * acytail);

    if det >= errbound || -det >= errbound {
        return det;
    }

    // Tier 3: fully exact. Accumulate the three remaining cross-product
    // expansions into B; the last component of the final expansion alone
    // determines the sign.
    let U = cross_expansion(acxtail, acytail, bcx, bcy);
    let mut C1 = Expansion::<8>::new();
    B.sum_into(&U, &mut C1);

    let U = cross_expansion(acx, acy, bcxtail, bcytail);
    let mut C2 = Expansion::<12>::new();
    C1.sum_into(&U, &mut C2);

    let U = cross_expansion(acxtail, acytail, bcxtail, bcytail);
    let mut D = Expansion::<16>::new();
    C2.sum_into(&U, &mut D);

    D.get(D.len() - 1)
}

/// Computes `ax * by - ay * bx` exactly as a 4-component [`Expansion`].
///
/// The two products are expanded with error-free transforms and combined with
/// the fixed two-two-diff composition, so the result is good to the last bit.
/// Always exactly 4 components in increasing magnitude order, zeros included;
/// ordinary callers only need [`Expansion::estimate`] on the result.
pub fn cross_expansion(ax: f64, ay: f64, bx: f64, by: f64) -> Expansion<4> {
    let mut out = Expansion::new();
    cross_expansion_into(ax, ay, bx, by, &mut out);
    out
}

/// Buffer-reuse form of [`cross_expansion`]: `out` is cleared and refilled.
pub fn cross_expansion_into(ax: f64, ay: f64, bx: f64, by: f64, out: &mut Expansion<4>) {
    out.clear();
    let (det_left, det_left_tail) = two_product(ax, by);
    let (det_right, det_right_tail) = two_product(ay, bx);
    let (x3, x2, x1, x0) = two_two_diff(det_left, det_left_tail, det_right, det_right_tail);
    out.append(x0);
    out.append(x1);
    out.append(x2);
    out.append(x3);
}

// Each error-free transform below is a fixed chain of individually rounded
// operations recovering the exact rounding error of one floating-point
// operation. The operation order must not be altered or algebraically
// simplified.

#[inline]
pub(crate) fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    (x, two_sum_tail(a, b, x))
}

#[inline]
pub(crate) fn two_sum_tail(a: f64, b: f64, x: f64) -> f64 {
    let bvirt = x - a;
    let avirt = x - bvirt;
    let bround = b - bvirt;
    let around = a - avirt;
    around + bround
}

// Requires |a| >= |b|; used where the ordering is already known, as in
// expansion summation.
#[inline]
pub(crate) fn fast_two_sum(a: f64, b: f64) -> (f64, f64) {
    let x = a + b;
    (x, fast_two_sum_tail(a, b, x))
}

#[inline]
pub(crate) fn fast_two_sum_tail(a: f64, b: f64, x: f64) -> f64 {
    let bvirt = x - a;
    b - bvirt
}

#[inline]
pub(crate) fn two_diff(a: f64, b: f64) -> (f64, f64) {
    let x = a - b;
    (x, two_diff_tail(a, b, x))
}

#[inline]
pub(crate) fn two_diff_tail(a: f64, b: f64, x: f64) -> f64 {
    let bvirt = a - x;
    let avirt = x + bvirt;
    let bround = bvirt - b;
    let around = a - avirt;
    around + bround
}

// Dekker's splitting: break a double into high and low halves whose pairwise
// products are exact.
#[inline]
pub(crate) fn split(a: f64) -> (f64, f64) {
    let c = SPLITTER * a;
    let abig = c - a;
    let ahi = c - abig;
    let alo = a - ahi;
    (ahi, alo)
}

#[inline]
pub(crate) fn two_product(a: f64, b: f64) -> (f64, f64) {
    let x = a * b;
    (x, two_product_tail(a, b, x))
}

#[inline]
pub(crate) fn two_product_tail(a: f64, b: f64, x: f64) -> f64 {
    let (ahi, alo) = split(a);
    let (bhi, blo) = split(b);
    let err1 = x - (ahi * bhi);
    let err2 = err1 - (alo * bhi);
    let err3 = err2 - (ahi * blo);
    (alo * blo) - err3
}

#[inline]
pub(crate) fn two_one_diff(a1: f64, a0: f64, b: f64) -> (f64, f64, f64) {
    let (i, x0) = two_diff(a0, b);
    let (x2, x1) = two_sum(a1, i);
    (x2, x1, x0)
}

// Exact difference of two 2-component expansions, yielding exactly four
// components in increasing magnitude order.
#[inline]
pub(crate) fn two_two_diff(a1: f64, a0: f64, b1: f64, b0: f64) -> (f64, f64, f64, f64) {
    let (j, r0, x0) = two_one_diff(a1, a0, b0);
    let (x3, x2, x1) = two_one_diff(j, r0, b1);
    (x3, x2, x1, x0)
}
