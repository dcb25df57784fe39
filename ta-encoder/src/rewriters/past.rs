//! The `Past` rewriter (§ Rewriter: Past(bounds B, targets T)).
//!
//! Symmetric to [`crate::rewriters::future`] but the window precedes the activation. A fresh
//! clock `c` is reset on entry to the window; a fresh boolean `b` is set on every transition that
//! enters a target location inside the window. The single return transition, from the window's
//! last clone back into the activation's own (unrewritten) timeline, requires `b == true` and the
//! satisfaction guard, and resets `b`. Unlike `Future`, an out-of-bounds run is not trapped while
//! still inside the window (there is no live invariant to enforce): both the lower-bound-not-yet
//! reached case and the upper-bound-exceeded case are only checked at the return point, matching
//! the source's activation-channel-guarded trap transition — a behaviour specific to `Past`.

use hashbrown::HashSet;
use itertools::Itertools;
use ta_ir::{filter_automaton, Bounds, Transition, TRAP};
use tracing::debug_span;

use crate::error::Diagnostic;
use crate::ids;
use crate::timeline::{TimelineEntry, TimelineStore};
use crate::window::compute_past_window;

pub fn encode_past(store: &mut TimelineStore, context: usize, name: &str, activation_pa: &str, bounds: &Bounds, targets: &HashSet<String>) -> Result<(), Diagnostic> {
    let _span = debug_span!("encode_past", name, activation_pa).entered();

    let Some(act_idx) = store.index_of(activation_pa) else {
        return Err(Diagnostic::unknown_reference(activation_pa, "encode_past: unknown activation plan action"));
    };
    let window = compute_past_window(act_idx, context);
    if window.is_empty() {
        return Err(Diagnostic::empty_window(activation_pa, "encode_past: computed window contains no plan actions"));
    }

    let counter = store.next_counter();
    let op_prefix = format!("{name}P{counter}");
    let clock = format!("c_{name}_{counter}");
    let boolean = format!("b_{name}_{counter}");
    let guard_sat = bounds.guard(&clock);
    let window_pa_ids: Vec<String> = store.pa_order()[window.start..window.end()].to_vec();

    for pid in &window_pa_ids {
        let Some(base_entry) = store.entry(pid, "") else { continue };
        let all_locs: HashSet<String> = base_entry.automaton.locations.iter().map(|l| l.id.clone()).collect();
        let mut clone_ta = filter_automaton(&base_entry.automaton, &all_locs, &op_prefix, |old_id| {
            let base = ids::base_location_id(old_id);
            ids::timeline_loc_id(pid, &op_prefix, base)
        });
        for t in clone_ta.transitions.iter_mut() {
            if targets.contains(ids::base_location_id(&t.dest)) {
                t.update = ta_ir::and_updates(&t.update, &format!("{boolean} = true"));
            }
        }
        store.set_entry(pid, &op_prefix, TimelineEntry { automaton: clone_ta, trans_out: Vec::new() });
    }

    for (from, to) in window_pa_ids.iter().tuple_windows() {
        let base_entry = store.entry(from, "").unwrap();
        let base_locs: Vec<String> = base_entry.automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
        let extra: Vec<Transition> = base_locs
            .iter()
            .map(|base_id| {
                let base = ids::base_location_id(base_id);
                let dest = ids::timeline_loc_id(to, &op_prefix, base);
                let update = if targets.contains(base) { format!("{boolean} = true") } else { String::new() };
                Transition::new(ids::timeline_loc_id(from, &op_prefix, base), dest, "", "", update, "")
            })
            .collect();
        store.entry_mut(from, &op_prefix).unwrap().trans_out.extend(extra);
    }

    let window_start = window_pa_ids[0].clone();
    let entry_update = format!("{clock} = 0");
    if window.start == 0 {
        let base_locs: Vec<String> = store.entry(&window_start, "").unwrap().automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
        let entry_edges: Vec<Transition> = base_locs
            .iter()
            .map(|base_id| {
                let base = ids::base_location_id(base_id);
                Transition::new(ids::timeline_loc_id(&window_start, "", base), ids::timeline_loc_id(&window_start, &op_prefix, base), "", "", entry_update.clone(), "")
            })
            .collect();
        store.entry_mut(&window_start, "").unwrap().trans_out.extend(entry_edges);
    } else {
        let prev = store.pa_order()[window.start - 1].clone();
        let redirected: Vec<Transition> = store
            .entry(&prev, "")
            .unwrap()
            .trans_out
            .iter()
            .filter(|t| ids::get_prefix(&t.dest, ids::TL_SEP) == window_start.as_str())
            .map(|t| {
                let base = ids::base_location_id(&t.dest);
                Transition::new(t.source.clone(), ids::timeline_loc_id(&window_start, &op_prefix, base), t.action.clone(), t.guard.clone(), format!("{}, {entry_update}", t.update), t.sync.clone())
            })
            .collect();
        store.entry_mut(&prev, "").unwrap().trans_out.extend(redirected);
    }

    let window_last = window_pa_ids.last().unwrap().clone();
    let base_locs: Vec<String> = store.entry(&window_last, "").unwrap().automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
    let mut return_edges = Vec::new();
    for base_id in &base_locs {
        let base = ids::base_location_id(base_id);
        let src = ids::timeline_loc_id(&window_last, &op_prefix, base);
        let dst = ids::timeline_loc_id(activation_pa, "", base);
        let guard = ta_ir::and_constraints(&format!("{boolean} == true"), &guard_sat);
        return_edges.push(Transition::new(src.clone(), dst, "", guard, format!("{boolean} = false"), ""));
        if bounds.is_lower_bounded() {
            return_edges.push(Transition::new(src.clone(), TRAP, "", format!("{boolean} == true && {clock} < {}", bounds.lower), "", ""));
        }
        if let Some(upper) = bounds.upper {
            return_edges.push(Transition::new(src, TRAP, "", format!("{boolean} == true && {clock} > {upper}"), "", ""));
        }
    }
    store.entry_mut(&window_last, &op_prefix).unwrap().trans_out.extend(return_edges);

    Ok(())
}
