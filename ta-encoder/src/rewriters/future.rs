//! The `Future` rewriter (§ Rewriter: Future(bounds B, targets T)).
//!
//! During the computed window, execution is shadowed by a clone of every timeline in the window,
//! carrying a fresh clock `c` and (if `B` is upper-bounded) the invariant `c <op_r> B.upper` on
//! every clone location. The run enters the clone the moment it enters the window (resetting
//! `c`), follows the same transition structure as the unrewritten timelines while inside it, and
//! may return to the corresponding unrewritten location — rejoining the rest of the plan — only
//! from a target location, only while the satisfaction guard `(c >= B.lower) && (c <= B.upper)`
//! holds. A clone location for which the bound has been exceeded has an explicit transition to
//! `trap`, since the invariant alone only blocks time elapse, not the location itself.
//!
//! Locations internal to the window that are never targets, and never get to return, are simply
//! dead ends once the window is exhausted: they do not reach `trap` unless the bound is actually
//! exceeded, but they also cannot reach `QUERY`, which is the intended restriction.

use hashbrown::HashSet;
use itertools::Itertools;
use plan_model::Plan;
use ta_ir::{filter_automaton, Transition, TRAP};
use tracing::debug_span;

use crate::error::Diagnostic;
use crate::ids;
use crate::timeline::{TimelineEntry, TimelineStore};
use crate::window::compute_future_window;

pub fn encode_future(store: &mut TimelineStore, plan: &Plan, name: &str, activation_pa: &str, bounds: &ta_ir::Bounds, targets: &HashSet<String>) -> Result<(), Diagnostic> {
    let _span = debug_span!("encode_future", name, activation_pa).entered();

    let Some(act_idx) = store.index_of(activation_pa) else {
        return Err(Diagnostic::unknown_reference(activation_pa, "encode_future: unknown activation plan action"));
    };
    let durations: Vec<ta_ir::Bounds> = plan.actions.iter().map(|pa| pa.duration).collect();
    let window = compute_future_window(&durations, act_idx, bounds, 0, Some(0), None);
    let Some(window) = window else {
        return Err(Diagnostic::empty_window(activation_pa, "encode_future: window runs past the end of the plan"));
    };
    if window.is_empty() {
        return Err(Diagnostic::empty_window(activation_pa, "encode_future: computed window contains no plan actions"));
    }

    let counter = store.next_counter();
    let op_prefix = format!("{name}F{counter}");
    let clock = format!("c_{name}_{counter}");
    let guard_sat = bounds.guard(&clock);
    let window_pa_ids: Vec<String> = store.pa_order()[window.start..window.end()].to_vec();
    let trap_guard = bounds.upper.map(|u| format!("{clock} {} {u}", bounds.r_op.inverse_op()));

    for pid in &window_pa_ids {
        let Some(base_entry) = store.entry(pid, "") else { continue };
        let all_locs: HashSet<String> = base_entry.automaton.locations.iter().map(|l| l.id.clone()).collect();
        let mut clone_ta = filter_automaton(&base_entry.automaton, &all_locs, &op_prefix, |old_id| {
            let base = ids::base_location_id(old_id);
            ids::timeline_loc_id(pid, &op_prefix, base)
        });
        if let Some(upper) = bounds.upper {
            let non_trap: HashSet<String> = clone_ta.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
            ta_ir::add_invariants(&mut clone_ta, &non_trap, &format!("{clock} {} {upper}", bounds.r_op));
        }
        let mut trans_out = Vec::new();
        if let Some(guard) = &trap_guard {
            for loc in clone_ta.locations.iter().filter(|l| l.id != TRAP) {
                trans_out.push(Transition::new(loc.id.clone(), TRAP, "", guard.clone(), "", ""));
            }
        }
        for target in targets {
            let clone_id = ids::timeline_loc_id(pid, &op_prefix, target);
            if clone_ta.location(&clone_id).is_some() {
                let original_id = ids::timeline_loc_id(pid, "", target);
                trans_out.push(Transition::new(clone_id, original_id, "", guard_sat.clone(), "", ""));
            }
        }
        store.set_entry(pid, &op_prefix, TimelineEntry { automaton: clone_ta, trans_out });
    }

    for (from, to) in window_pa_ids.iter().tuple_windows() {
        let to_idx = store.index_of(to).unwrap();
        let guard = plan.actions[to_idx].absolute_time.guard(plan_model::constants::GLOBAL_CLOCK);
        let update = format!("{} = 0", plan_model::constants::GLOBAL_CLOCK);
        let base_entry = store.entry(from, "").unwrap();
        let base_locs: Vec<String> = base_entry.automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
        let extra: Vec<Transition> = base_locs
            .iter()
            .map(|base_id| {
                let base = ids::base_location_id(base_id);
                Transition::new(ids::timeline_loc_id(from, &op_prefix, base), ids::timeline_loc_id(to, &op_prefix, base), "", guard.clone(), update.clone(), "")
            })
            .collect();
        store.entry_mut(from, &op_prefix).unwrap().trans_out.extend(extra);
    }

    let window_start = window_pa_ids[0].clone();
    if window.start == 0 {
        let base_locs: Vec<String> = store.entry(&window_start, "").unwrap().automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
        let entry_edges: Vec<Transition> = base_locs
            .iter()
            .map(|base_id| {
                let base = ids::base_location_id(base_id);
                Transition::new(ids::timeline_loc_id(&window_start, "", base), ids::timeline_loc_id(&window_start, &op_prefix, base), "", "", format!("{clock} = 0"), "")
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
                Transition::new(t.source.clone(), ids::timeline_loc_id(&window_start, &op_prefix, base), t.action.clone(), t.guard.clone(), format!("{}, {clock} = 0", t.update), t.sync.clone())
            })
            .collect();
        store.entry_mut(&prev, "").unwrap().trans_out.extend(redirected);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineStore;
    use plan_model::{ActionName, PlanAction};
    use ta_ir::{Automaton, Bounds, Location};

    fn base() -> Automaton {
        Automaton::new(
            vec![Location::new("s0", "").initial(), Location::new("s1", "")],
            vec![Transition::new("s0", "s1", "go", "", "", "")],
            "base",
            true,
        )
    }

    fn two_action_plan() -> Plan {
        Plan::new(vec![
            PlanAction::new(ActionName::new("A", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
            PlanAction::new(ActionName::new("B", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
        ])
    }

    #[test]
    fn clones_carry_the_upper_bound_invariant() {
        let mut store = TimelineStore::build(&base(), &two_action_plan());
        let mut targets = HashSet::new();
        targets.insert("s1".to_string());
        encode_future(&mut store, &two_action_plan(), "evt", "A::1", &Bounds::new(3, Some(7)), &targets).unwrap();
        let clone = store.entry("A::1", "evtF0").unwrap();
        assert!(clone.automaton.locations.iter().filter(|l| l.id != TRAP).all(|l| l.invariant.contains("<= 7")));
    }

    #[test]
    fn return_edge_from_target_clone_carries_satisfaction_guard() {
        let mut store = TimelineStore::build(&base(), &two_action_plan());
        let mut targets = HashSet::new();
        targets.insert("s1".to_string());
        encode_future(&mut store, &two_action_plan(), "evt", "A::1", &Bounds::new(3, Some(7)), &targets).unwrap();
        let clone = store.entry("A::1", "evtF0").unwrap();
        let ret = clone.trans_out.iter().find(|t| t.dest == "A::1@@;;s1").unwrap();
        assert_eq!(ret.guard, "c_evt_0 >= 3 && c_evt_0 <= 7");
    }

    #[test]
    fn entry_into_first_window_timeline_resets_the_clock() {
        let mut store = TimelineStore::build(&base(), &two_action_plan());
        let targets = HashSet::from_iter(["s1".to_string()]);
        encode_future(&mut store, &two_action_plan(), "evt", "A::1", &Bounds::new(3, Some(7)), &targets).unwrap();
        let original = store.entry("A::1", "").unwrap();
        assert!(original.trans_out.iter().any(|t| t.dest.starts_with("A::1@@evtF0") && t.update.contains("c_evt_0 = 0")));
    }
}
