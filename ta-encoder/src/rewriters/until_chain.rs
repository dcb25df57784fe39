//! The `UntilChain` rewriter (§ Rewriter: UntilChain), the largest and hardest of the direct
//! encodings: a sequence of stages, each with its own bounds and targets, sharing a single clock
//! `c` across the whole chain.
//!
//! Each stage's window is computed exactly as for `Future`, but offset by the accumulated
//! lower/upper duration of every earlier stage, and bounded above by the end activation. A
//! stage's clone is filtered down to that stage's targets only (not the whole base automaton, as
//! `Future` does), since the chain only cares about *which* target was reached, not about
//! shadowing every possible location. Consecutive stages are stitched by connecting every target
//! location of the previous stage's last window timeline to every target location of the next
//! stage's first window timeline, guarded by the previous stage's satisfaction constraint and
//! resetting `c` — the chain only "uses up" a stage once some target of it has actually been
//! observed. The first stage's entry mirrors `Future`'s; the last stage's exit returns to the
//! unrewritten timeline, guarded by the final stage's satisfaction constraint.

use itertools::Itertools;
use plan_model::ChainStageSpec;
use plan_model::Plan;
use ta_ir::{filter_automaton, safe_add, Transition, TRAP};
use tracing::debug_span;

use crate::error::Diagnostic;
use crate::ids;
use crate::timeline::{TimelineEntry, TimelineStore};
use crate::window::compute_future_window;

pub fn encode_until_chain(store: &mut TimelineStore, plan: &Plan, name: &str, start_pa: &str, end_pa: &str, stages: &[ChainStageSpec]) -> Result<(), Diagnostic> {
    let _span = debug_span!("encode_until_chain", name, start_pa, end_pa, stages = stages.len()).entered();

    let Some(start_idx) = store.index_of(start_pa) else {
        return Err(Diagnostic::unknown_reference(start_pa, "encode_until_chain: unknown start activation"));
    };
    let Some(end_idx) = store.index_of(end_pa) else {
        return Err(Diagnostic::unknown_reference(end_pa, "encode_until_chain: unknown end activation"));
    };
    let durations: Vec<ta_ir::Bounds> = plan.actions.iter().map(|pa| pa.duration).collect();
    let clock = format!("c_{name}");

    let mut cumulative_lb: u64 = 0;
    let mut cumulative_ub: ta_ir::Timepoint = Some(0);
    let mut prev: Option<(String, String)> = None; // (last pa of previous window, previous op_prefix)
    let mut prev_guard: Option<String> = None;
    let mut prev_targets: Vec<String> = Vec::new();
    let mut last_window_last_pa = String::new();
    let mut last_prefix = String::new();

    for (stage_idx, stage) in stages.iter().enumerate() {
        // Every stage re-derives its window from the chain's fixed start, not from where the
        // previous stage's window ended: `cumulative_lb`/`cumulative_ub` alone carry the earlier
        // stages forward, mirroring a single continuous scan over the whole chain.
        let window = compute_future_window(&durations, start_idx, &stage.bounds, cumulative_lb, cumulative_ub, Some(end_idx));
        let Some(window) = window else {
            return Err(Diagnostic::empty_window(start_pa, format!("encode_until_chain: stage {stage_idx} window runs past the end activation")));
        };
        if window.is_empty() {
            return Err(Diagnostic::empty_window(start_pa, format!("encode_until_chain: stage {stage_idx} window is empty")));
        }

        let counter = store.next_counter();
        let op_prefix = format!("{name}F{counter}");
        let pa_ids: Vec<String> = store.pa_order()[window.start..window.end()].to_vec();
        let guard_sat = stage.bounds.guard(&clock);
        let trap_guard = stage.bounds.upper.map(|u| format!("{clock} {} {u}", stage.bounds.r_op.inverse_op()));

        for pid in &pa_ids {
            let base_entry = store.entry(pid, "").unwrap();
            let qualified_targets: hashbrown::HashSet<String> = stage.targets.iter().map(|t| ids::timeline_loc_id(pid, "", t)).collect();
            let mut clone_ta = filter_automaton(&base_entry.automaton, &qualified_targets, &op_prefix, |old_id| {
                let base = ids::base_location_id(old_id);
                ids::timeline_loc_id(pid, &op_prefix, base)
            });
            if let Some(upper) = stage.bounds.upper {
                let non_trap: hashbrown::HashSet<String> = clone_ta.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
                ta_ir::add_invariants(&mut clone_ta, &non_trap, &format!("{clock} {} {upper}", stage.bounds.r_op));
            }
            let mut trans_out = Vec::new();
            if let Some(tg) = &trap_guard {
                for loc in clone_ta.locations.iter().filter(|l| l.id != TRAP) {
                    trans_out.push(Transition::new(loc.id.clone(), TRAP, "", tg.clone(), "", ""));
                }
            }
            store.set_entry(pid, &op_prefix, TimelineEntry { automaton: clone_ta, trans_out });
        }

        for (from, to) in pa_ids.iter().tuple_windows() {
            let to_idx = store.index_of(to).unwrap();
            let guard = plan.actions[to_idx].absolute_time.guard(plan_model::constants::GLOBAL_CLOCK);
            let update = format!("{} = 0", plan_model::constants::GLOBAL_CLOCK);
            let mut extra = Vec::new();
            for t in &stage.targets {
                let src = ids::timeline_loc_id(from, &op_prefix, t);
                let dst = ids::timeline_loc_id(to, &op_prefix, t);
                if store.entry(from, &op_prefix).unwrap().automaton.location(&src).is_some() && store.entry(to, &op_prefix).unwrap().automaton.location(&dst).is_some() {
                    extra.push(Transition::new(src, dst, "", guard.clone(), update.clone(), ""));
                }
            }
            store.entry_mut(from, &op_prefix).unwrap().trans_out.extend(extra);
        }

        let first_pa = pa_ids[0].clone();
        let last_pa = pa_ids.last().unwrap().clone();

        if let (Some((prev_last_pa, prev_prefix)), Some(pg)) = (&prev, &prev_guard) {
            let mut cross = Vec::new();
            for pt in &prev_targets {
                let src = ids::timeline_loc_id(prev_last_pa, prev_prefix, pt);
                if store.entry(prev_last_pa, prev_prefix).unwrap().automaton.location(&src).is_none() {
                    continue;
                }
                for ct in &stage.targets {
                    let dst = ids::timeline_loc_id(&first_pa, &op_prefix, ct);
                    if store.entry(&first_pa, &op_prefix).unwrap().automaton.location(&dst).is_some() {
                        cross.push(Transition::new(src.clone(), dst, "", pg.clone(), format!("{clock} = 0"), ""));
                    }
                }
            }
            store.entry_mut(prev_last_pa, prev_prefix).unwrap().trans_out.extend(cross);
        } else {
            // First stage: redirect entry from the plan action preceding `start_pa` (or, if the
            // chain starts at the very first plan action, an in-place epsilon edge), resetting c.
            if window.start == 0 {
                let base_locs: Vec<String> = store.entry(&first_pa, "").unwrap().automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
                let entry_edges: Vec<Transition> = base_locs
                    .iter()
                    .filter_map(|base_id| {
                        let base = ids::base_location_id(base_id);
                        if stage.targets.contains(base) {
                            Some(Transition::new(
                                ids::timeline_loc_id(&first_pa, "", base),
                                ids::timeline_loc_id(&first_pa, &op_prefix, base),
                                "",
                                "",
                                format!("{clock} = 0"),
                                "",
                            ))
                        } else {
                            None
                        }
                    })
                    .collect();
                store.entry_mut(&first_pa, "").unwrap().trans_out.extend(entry_edges);
            } else {
                let prev_pa = store.pa_order()[window.start - 1].clone();
                let redirected: Vec<Transition> = store
                    .entry(&prev_pa, "")
                    .unwrap()
                    .trans_out
                    .iter()
                    .filter(|t| ids::get_prefix(&t.dest, ids::TL_SEP) == first_pa.as_str())
                    .filter(|t| stage.targets.contains(ids::base_location_id(&t.dest)))
                    .map(|t| {
                        let base = ids::base_location_id(&t.dest);
                        Transition::new(t.source.clone(), ids::timeline_loc_id(&first_pa, &op_prefix, base), t.action.clone(), t.guard.clone(), format!("{}, {clock} = 0", t.update), t.sync.clone())
                    })
                    .collect();
                store.entry_mut(&prev_pa, "").unwrap().trans_out.extend(redirected);
            }
        }

        cumulative_lb = cumulative_lb.saturating_add(stage.bounds.lower);
        cumulative_ub = safe_add(cumulative_ub, stage.bounds.upper);
        prev = Some((last_pa.clone(), op_prefix.clone()));
        prev_guard = Some(guard_sat);
        prev_targets = stage.targets.iter().cloned().collect();
        last_window_last_pa = last_pa;
        last_prefix = op_prefix;
    }

    let last_stage = stages.last().expect("at least one stage");
    let final_guard = prev_guard.expect("loop runs at least once");
    let mut return_edges = Vec::new();
    for t in &last_stage.targets {
        let src = ids::timeline_loc_id(&last_window_last_pa, &last_prefix, t);
        if store.entry(&last_window_last_pa, &last_prefix).unwrap().automaton.location(&src).is_none() {
            continue;
        }
        let dst = ids::timeline_loc_id(&last_window_last_pa, "", t);
        return_edges.push(Transition::new(src, dst, "", final_guard.clone(), "", ""));
    }
    store.entry_mut(&last_window_last_pa, &last_prefix).unwrap().trans_out.extend(return_edges);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineStore;
    use hashbrown::HashSet;
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

    // Six actions with a 1-time-unit duration each, so each stage's window (which grows by
    // accumulated *minimum* duration, not by action count) has enough plan actions between
    // `start` and `end` to terminate before the explicit end rather than swallowing it.
    fn six_action_plan() -> Plan {
        Plan::new(
            ["A", "B", "C", "D", "E", "F"]
                .iter()
                .map(|op| PlanAction::new(ActionName::new(*op, vec![]), Bounds::new(1, Some(1)), Bounds::new(0, None), Bounds::new(0, None)))
                .collect(),
        )
    }

    #[test]
    fn stitches_stage_one_targets_to_stage_two_targets() {
        let mut store = TimelineStore::build(&base(), &six_action_plan());
        let stages = vec![
            ChainStageSpec {
                bounds: Bounds::new(0, Some(3)),
                targets: HashSet::from_iter(["s1".to_string()]),
            },
            ChainStageSpec {
                bounds: Bounds::new(0, Some(5)),
                targets: HashSet::from_iter(["s0".to_string()]),
            },
        ];
        encode_until_chain(&mut store, &six_action_plan(), "chain", "B::2", "F::6", &stages).unwrap();

        let found = store
            .timelines()
            .values()
            .flat_map(|by_prefix| by_prefix.values())
            .flat_map(|entry| entry.trans_out.iter())
            .any(|t| t.dest.ends_with(";;s0") && t.guard == "c_chain <= 3" && t.update.contains("c_chain = 0"));
        assert!(found, "expected a stage1->stage2 edge guarded by stage1's satisfaction constraint");
    }
}
