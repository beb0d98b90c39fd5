//! Fixed-capacity floating-point expansions.
//!
//! An expansion represents one extended-precision real number as a sequence of
//! `f64` components stored in increasing magnitude order, where the mantissa
//! bit ranges of any two non-zero components do not overlap. The exact value is
//! the mathematical sum of all components; because they are non-overlapping and
//! sorted, the last component alone carries the sign of the whole value.

use crate::{abs, fast_two_sum, two_sum};

/// A non-overlapping increasing expansion of `f64` components with a
/// compile-time capacity and a logical length.
///
/// `CAP` is chosen by the caller from the closed-form worst-case component
/// count of the operation that fills the buffer: a cross product needs 4,
/// the successive sums of the adaptive orientation predicate need 8, 12
/// and 16. Buffers live on the stack and are reused across calls via
/// [`clear`](Expansion::clear), so the hot path never allocates.
///
/// Components may include exact zeros; zeros are ignored by the ordering and
/// non-overlap invariant. The invariant is maintained by the producing
/// algorithms, not validated on mutation; [`check_invariants`](Expansion::check_invariants)
/// exists for tests.
#[derive(Copy, Clone, Debug)]
pub struct Expansion<const CAP: usize> {
    components: [f64; CAP],
    size: usize,
}

impl<const CAP: usize> Default for Expansion<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> Expansion<CAP> {
    /// Creates an empty expansion.
    ///
    /// # Panics
    /// Panics if `CAP` is zero.
    pub fn new() -> Self {
        assert!(CAP > 0, "expansion capacity must be positive");
        Expansion {
            components: [0.0; CAP],
            size: 0,
        }
    }

    /// The number of live components.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the expansion holds no components.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The fixed component capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        CAP
    }

    /// Returns component `i` (components are ordered by increasing magnitude).
    ///
    /// # Panics
    /// Panics if `i` is not in `[0, len)`.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        assert!(i < self.size, "component index {} out of range 0..{}", i, self.size);
        self.components[i]
    }

    /// The live components as a slice.
    #[inline]
    pub fn components(&self) -> &[f64] {
        &self.components[..self.size]
    }

    /// Resets the expansion to empty so the buffer can be reused.
    #[inline]
    pub fn clear(&mut self) {
        self.size = 0;
    }

    /// Appends `v` as the new highest-magnitude component.
    ///
    /// The caller is responsible for keeping the expansion non-overlapping and
    /// sorted; this is not checked here.
    ///
    /// # Panics
    /// Panics when the expansion is full. Capacities are derived from
    /// worst-case component bounds, so hitting this indicates a capacity
    /// planning bug in the caller.
    #[inline]
    pub fn append(&mut self, v: f64) {
        assert!(self.size < CAP, "expansion capacity {} exhausted", CAP);
        self.components[self.size] = v;
        self.size += 1;
    }

    /// Appends `v` unless it is exactly zero (standard zero elimination).
    #[inline]
    pub fn append_non_zero(&mut self, v: f64) {
        if v != 0.0 {
            self.append(v);
        }
    }

    /// Ensures at least one component exists by appending `0.0` when empty,
    /// so that component 0 and the last component can be read unconditionally.
    #[inline]
    pub fn normalize(&mut self) {
        if self.size == 0 {
            self.append(0.0);
        }
    }

    /// A fast, possibly lossy approximation of the represented value: the
    /// plain floating-point sum of the components, smallest first.
    pub fn estimate(&self) -> f64 {
        let mut q = 0.0;
        for c in self.components() {
            q += *c;
        }
        q
    }

    /// Verifies the non-overlapping increasing invariant by bit inspection.
    ///
    /// For every adjacent pair of non-zero components, the later component
    /// must have at least the magnitude of the earlier one and the least
    /// significant set bit of its significand must lie strictly above the
    /// most significant set bit of the earlier one. Expensive; intended for
    /// tests only.
    pub fn check_invariants(&self) -> bool {
        let mut prev: Option<f64> = None;
        for &c in self.components() {
            if c == 0.0 {
                continue;
            }
            if let Some(p) = prev {
                if abs(c) < abs(p) {
                    return false;
                }
                let (_, hi_prev) = bit_range(p);
                let (lo_cur, _) = bit_range(c);
                if lo_cur <= hi_prev {
                    return false;
                }
            }
            prev = Some(c);
        }
        true
    }

    /// Adds `other` to this expansion exactly, writing the result into `out`.
    ///
    /// This is fast-expansion-sum with zero elimination: both inputs are
    /// merge-walked by increasing magnitude, each step feeding the current
    /// head and the running carry through an error-free transform whose error
    /// term is appended to `out`. Reordering the rounded operations breaks
    /// exactness.
    ///
    /// `out` is cleared first and is normalized on return, so it always ends
    /// with at least one component. `out` cannot alias the inputs (exclusive
    /// borrow). Debug builds assert that `out` has room for the worst case
    /// `self.len() + other.len()`.
    pub fn sum_into<const M: usize, const R: usize>(
        &self,
        other: &Expansion<M>,
        out: &mut Expansion<R>,
    ) {
        debug_assert!(
            R >= self.size + other.size,
            "result capacity {} below worst case {}",
            R,
            self.size + other.size
        );
        out.clear();

        let e = self.components();
        let f = other.components();
        if e.is_empty() || f.is_empty() {
            for &c in e {
                out.append_non_zero(c);
            }
            for &c in f {
                out.append_non_zero(c);
            }
            out.normalize();
            return;
        }

        let mut enow = e[0];
        let mut fnow = f[0];
        let mut eindex = 0;
        let mut findex = 0;
        // Pick whichever head has the smaller magnitude; the two-way
        // comparison below is branchless against NaN-free finite inputs.
        let mut q;
        if (fnow > enow) == (fnow > -enow) {
            q = enow;
            eindex += 1;
        } else {
            q = fnow;
            findex += 1;
        }

        if eindex < e.len() && findex < f.len() {
            enow = e[eindex];
            fnow = f[findex];
            // The second-smallest component dominates the first, so the
            // cheaper fast-two-sum suffices for this one step.
            let (qnew, hh) = if (fnow > enow) == (fnow > -enow) {
                eindex += 1;
                fast_two_sum(enow, q)
            } else {
                findex += 1;
                fast_two_sum(fnow, q)
            };
            q = qnew;
            out.append_non_zero(hh);

            while eindex < e.len() && findex < f.len() {
                enow = e[eindex];
                fnow = f[findex];
                let (qnew, hh) = if (fnow > enow) == (fnow > -enow) {
                    eindex += 1;
                    two_sum(q, enow)
                } else {
                    findex += 1;
                    two_sum(q, fnow)
                };
                q = qnew;
                out.append_non_zero(hh);
            }
        }

        while eindex < e.len() {
            let (qnew, hh) = two_sum(q, e[eindex]);
            q = qnew;
            eindex += 1;
            out.append_non_zero(hh);
        }
        while findex < f.len() {
            let (qnew, hh) = two_sum(q, f[findex]);
            q = qnew;
            findex += 1;
            out.append_non_zero(hh);
        }

        out.append_non_zero(q);
        out.normalize();
    }

    /// Convenience form of [`sum_into`](Expansion::sum_into) returning an
    /// owned result; the caller picks the result capacity `R`.
    pub fn sum<const M: usize, const R: usize>(&self, other: &Expansion<M>) -> Expansion<R> {
        let mut out = Expansion::new();
        self.sum_into(other, &mut out);
        out
    }
}

/// The closed range of significand bit positions set in `x`, as exponents of
/// two. `x` must be non-zero and finite.
fn bit_range(x: f64) -> (i32, i32) {
    const MANTISSA_MASK: u64 = (1 << 52) - 1;
    let bits = x.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let mantissa = bits & MANTISSA_MASK;
    if biased == 0 {
        // Subnormal: value is mantissa * 2^-1074, no implicit bit.
        let msb = 63 - mantissa.leading_zeros() as i32;
        let lsb = mantissa.trailing_zeros() as i32;
        (-1074 + lsb, -1074 + msb)
    } else {
        // Normal: 53-bit significand with the implicit leading bit at
        // position 52, scaled by 2^(biased - 1075).
        let scale = biased - 1075;
        let full = mantissa | (1 << 52);
        (scale + full.trailing_zeros() as i32, scale + 52)
    }
}
