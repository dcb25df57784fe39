//! Timepoint bounds and the saturating arithmetic used to accumulate them.

use crate::clock::ComparisonOp;
use std::fmt;

/// A point in `ℕ ∪ {∞}`. `None` represents `∞`.
pub type Timepoint = Option<u64>;

/// Saturating addition over `ℕ ∪ {∞}`: `∞ ⊕ b = ∞` for any `b`, and otherwise plain
/// `u64` addition saturated at `u64::MAX` so repeated accumulation never panics or wraps.
pub fn safe_add(a: Timepoint, b: Timepoint) -> Timepoint {
    match (a, b) {
        (None, _) | (_, None) => None,
        (Some(a), Some(b)) => Some(a.saturating_add(b)),
    }
}

/// An interval `(lower, upper)` together with the strictness of each end, matching the
/// `l_op, r_op ∈ {<, ≤}` restriction from the data model. An unbounded upper end (`upper =
/// None`, i.e. `∞`) is always open (`r_op = Lt`): `∞` is never included, so treating it as a
/// strict bound keeps `render`/comparisons well-defined without a special case.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
    pub lower: u64,
    pub upper: Timepoint,
    pub l_op: ComparisonOp,
    pub r_op: ComparisonOp,
}

impl Bounds {
    /// Builds bounds with the default operators: `lower <= c` and, if bounded, `c <= upper`
    /// (open, `c < upper`, i.e. using `Lt`, if `upper` is `∞`).
    pub fn new(lower: u64, upper: Timepoint) -> Bounds {
        let r_op = if upper.is_none() { ComparisonOp::Lt } else { ComparisonOp::Le };
        Bounds {
            lower,
            upper,
            l_op: ComparisonOp::Le,
            r_op,
        }
    }

    /// Builds bounds with explicit operators on both ends.
    ///
    /// # Panics
    /// Panics (debug builds only) if `l_op`/`r_op` are not one of `{Lt, Le}`, or if the upper
    /// bound is `∞` but `r_op` is not `Lt` — an open upper bound is a data-model invariant, not
    /// a caller choice.
    pub fn with_ops(lower: u64, upper: Timepoint, l_op: ComparisonOp, r_op: ComparisonOp) -> Bounds {
        debug_assert!(matches!(l_op, ComparisonOp::Lt | ComparisonOp::Le));
        debug_assert!(matches!(r_op, ComparisonOp::Lt | ComparisonOp::Le));
        debug_assert!(upper.is_some() || matches!(r_op, ComparisonOp::Lt));
        Bounds {
            lower,
            upper,
            l_op,
            r_op,
        }
    }

    pub fn is_upper_bounded(&self) -> bool {
        self.upper.is_some()
    }

    /// True unless the lower bound is the trivial `0 <= c` (the default produced by `new`).
    pub fn is_lower_bounded(&self) -> bool {
        self.lower != 0 || !matches!(self.l_op, ComparisonOp::Le)
    }

    /// Renders this interval as a guard against `clock`, e.g. `"c >= 3 && c <= 7"`. Only the
    /// bounded side(s) appear: an unbounded lower bound contributes nothing, and an unbounded
    /// upper (`∞`) contributes nothing either (its openness is structural, not a comparison).
    pub fn guard(&self, clock: &str) -> String {
        let lower = if self.is_lower_bounded() {
            format!("{clock} {} {}", self.l_op.reverse_op(), self.lower)
        } else {
            String::new()
        };
        let upper = match self.upper {
            Some(u) => format!("{clock} {} {u}", self.r_op),
            None => String::new(),
        };
        crate::guard::and_constraints(&lower, &upper)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(u) => write!(f, "[{} {} . {} {}]", self.lower, self.l_op, self.r_op, u),
            None => write!(f, "[{} {} . {})", self.lower, self.l_op, "inf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_never_overflows() {
        assert_eq!(safe_add(Some(3), Some(4)), Some(7));
        assert_eq!(safe_add(None, Some(4)), None);
        assert_eq!(safe_add(Some(4), None), None);
        assert_eq!(safe_add(Some(u64::MAX), Some(1)), Some(u64::MAX));
    }

    #[test]
    fn saturation_is_monotone() {
        for (a, b) in [(Some(0), Some(0)), (Some(5), Some(2)), (None, Some(9)), (Some(9), None)] {
            let sum = safe_add(a, b);
            if let (Some(sum), Some(a)) = (sum, a) {
                assert!(sum >= a);
            }
            if let (Some(sum), Some(b)) = (sum, b) {
                assert!(sum >= b);
            }
        }
    }

    #[test]
    fn unbounded_upper_is_open() {
        let b = Bounds::new(0, None);
        assert_eq!(b.r_op, ComparisonOp::Lt);
    }

    #[test]
    fn guard_renders_both_sides_when_bounded() {
        let b = Bounds::new(3, Some(7));
        assert_eq!(b.guard("c"), "c >= 3 && c <= 7");
    }

    #[test]
    fn guard_omits_unbounded_sides() {
        assert_eq!(Bounds::new(0, None).guard("c"), "");
        assert_eq!(Bounds::new(3, None).guard("c"), "c >= 3");
    }
}
