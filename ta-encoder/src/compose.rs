//! Encoder composition (§ 4.11 Encoder Composition): merges two stores built over the same
//! `pa_order` by taking, per `(plan_action, timeline_prefix)` pair present in either store, the
//! product of the two automata (product of locations, conjunction of invariants, synchronous
//! product of transitions matched by action/sync label) and the set union of outgoing
//! cross-timeline transitions. A prefix present in only one store passes through unchanged —
//! merge is a union over prefixes, a product only where both sides rewrote the same timeline.

use hashbrown::HashMap;
use ta_ir::{Automaton, Location, Transition};

use crate::error::EncodeError;
use crate::timeline::{TimelineEntry, TimelineStore};

pub fn merge(left: TimelineStore, right: TimelineStore) -> Result<TimelineStore, EncodeError> {
    if left.pa_order() != right.pa_order() {
        return Err(EncodeError::MismatchedPlanOrder {
            left: left.pa_order().to_vec(),
            right: right.pa_order().to_vec(),
        });
    }

    let pa_order = left.pa_order().to_vec();
    let base = left.base().clone();
    let fresh_counter = left_counter_hint(&left).max(left_counter_hint(&right));

    let mut merged = TimelineStore::from_parts(pa_order, HashMap::new(), base, fresh_counter);

    for pa_id in merged.pa_order().to_vec() {
        let left_prefixes: Vec<String> = left.prefixes(&pa_id).map(str::to_string).collect();
        let right_prefixes: Vec<String> = right.prefixes(&pa_id).map(str::to_string).collect();
        let mut seen = hashbrown::HashSet::new();

        for prefix in left_prefixes.iter().chain(right_prefixes.iter()) {
            if !seen.insert(prefix.clone()) {
                continue;
            }
            let l = left.entry(&pa_id, prefix);
            let r = right.entry(&pa_id, prefix);
            let entry = match (l, r) {
                (Some(l), Some(r)) => product_entry(l, r),
                (Some(l), None) => l.clone(),
                (None, Some(r)) => r.clone(),
                (None, None) => unreachable!("prefix came from one of the two stores"),
            };
            merged.set_entry(&pa_id, prefix, entry);
        }
    }

    Ok(merged)
}

/// An over-approximation of the counter each store has reached: the number of distinct
/// non-empty prefixes ever recorded for any plan action, so merged stores keep allocating fresh
/// names past whatever either side already used.
fn left_counter_hint(store: &TimelineStore) -> u64 {
    store.pa_order().iter().flat_map(|pa| store.prefixes(pa)).filter(|p| !p.is_empty()).count() as u64
}

fn product_entry(l: &TimelineEntry, r: &TimelineEntry) -> TimelineEntry {
    TimelineEntry {
        automaton: product_automaton(&l.automaton, &r.automaton),
        trans_out: union_transitions(&l.trans_out, &r.trans_out),
    }
}

/// Products locations by id (conjoining invariants when both sides define the same id), unions
/// any id present on only one side, and forms the synchronous product of transitions: two
/// transitions with the same `(source, dest, action, sync)` merge their guards/updates; a
/// transition present on only one side carries over unchanged (the other automaton is implicitly
/// idle on that id).
fn product_automaton(a: &Automaton, b: &Automaton) -> Automaton {
    let mut locations: HashMap<String, Location> = HashMap::new();
    for loc in a.locations.iter().chain(b.locations.iter()) {
        locations
            .entry(loc.id.clone())
            .and_modify(|existing| {
                existing.invariant = ta_ir::and_constraints(&existing.invariant, &loc.invariant);
                existing.urgent = existing.urgent || loc.urgent;
            })
            .or_insert_with(|| loc.clone());
    }

    let mut keyed: HashMap<(String, String, String, String), Transition> = HashMap::new();
    for t in a.transitions.iter().chain(b.transitions.iter()) {
        let key = (t.source.clone(), t.dest.clone(), t.action.clone(), t.sync.clone());
        keyed
            .entry(key)
            .and_modify(|existing| {
                existing.guard = ta_ir::and_constraints(&existing.guard, &t.guard);
                existing.update = ta_ir::and_updates(&existing.update, &t.update);
            })
            .or_insert_with(|| t.clone());
    }

    let mut clocks = a.clocks.clone();
    clocks.extend(b.clocks.iter().cloned());
    let mut bool_vars = a.bool_vars.clone();
    bool_vars.extend(b.bool_vars.iter().cloned());

    Automaton {
        locations: locations.into_values().collect(),
        transitions: keyed.into_values().collect(),
        clocks,
        bool_vars,
        prefix: a.prefix.clone(),
    }
}

fn union_transitions(a: &[Transition], b: &[Transition]) -> Vec<Transition> {
    let mut out = a.to_vec();
    for t in b {
        if !out.iter().any(|existing| existing.source == t.source && existing.dest == t.dest && existing.guard == t.guard && existing.update == t.update && existing.sync == t.sync) {
            out.push(t.clone());
        }
    }
    out
}
