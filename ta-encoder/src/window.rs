//! Window/context calculator (§ Window/Context Calculator): given an activating plan action and a
//! temporal bound, computes the contiguous index range of plan actions a rewrite must span.

use ta_ir::{safe_add, Bounds, Timepoint};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Window {
    pub start: usize,
    pub len: usize,
}

impl Window {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Computes the forward (Future-like) window starting at `activation_index`.
///
/// A single continuous scan, using saturating addition so an unbounded duration never causes
/// overflow: `lb_acc`/`ub_acc` accumulate every plan action's lower/upper duration from
/// `activation_index` onward without ever resetting. While the running `ub_acc` has not yet
/// reached `lb_off`, the window start advances past the current plan action (it necessarily
/// finishes before the constraint's satisfaction window opens). The window ends at the first plan
/// action where the running `lb_acc` reaches `bound.upper + ub_off`, or at the explicit ending
/// plan action, whichever comes first; if neither ever triggers, the window runs to the end of the
/// plan. Increasing `bound.upper` can only push the end further out, never pull the start in, so
/// the returned window is monotone non-shrinking in `bound.upper`.
pub fn compute_future_window(durations: &[Bounds], activation_index: usize, bound: &Bounds, lb_off: u64, ub_off: Timepoint, explicit_end: Option<usize>) -> Option<Window> {
    let n = durations.len();
    if activation_index >= n {
        return None;
    }
    if let Some(end_idx) = explicit_end {
        if activation_index > end_idx {
            return None;
        }
    }

    let target_lb = safe_add(bound.upper, ub_off);
    let mut lb_acc: u64 = 0;
    let mut ub_acc: Timepoint = Some(0);
    let mut window_start = activation_index;

    for end in activation_index..n {
        lb_acc = lb_acc.saturating_add(durations[end].lower);
        ub_acc = safe_add(ub_acc, durations[end].upper);
        if ub_acc.map_or(false, |u| u < lb_off) {
            window_start += 1;
        }

        let reached_target = target_lb.is_some_and(|t| lb_acc >= t);
        let reached_explicit_end = explicit_end.is_some_and(|e| end >= e);
        if reached_target || reached_explicit_end {
            if window_start > end {
                return Some(Window { start: window_start, len: 0 });
            }
            return Some(Window {
                start: window_start,
                len: end - window_start + 1,
            });
        }
    }

    if window_start >= n {
        return Some(Window { start: window_start, len: 0 });
    }
    Some(Window {
        start: window_start,
        len: n - window_start,
    })
}

/// Computes the backward (Past-like) window preceding `activation_index`, bounded by `context`
/// plan actions. The activation's own plan action is not part of the window.
pub fn compute_past_window(activation_index: usize, context: usize) -> Window {
    let start = activation_index.saturating_sub(context);
    Window {
        start,
        len: activation_index.saturating_sub(start),
    }
}
