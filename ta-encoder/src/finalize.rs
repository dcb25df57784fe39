//! The finalizer (§ 4.12 Finalizer): flattens a [`TimelineStore`] into the single product
//! automaton the downstream model checker consumes.

use ta_ir::{Automaton, AutomataSystem, Location, TRAP};

use crate::timeline::{TimelineStore, QUERY};

/// Collects every timeline entry's automaton, unions their transitions with every cross-timeline
/// edge recorded in `trans_out`, and produces one [`Automaton`] with prefix `"direct"`. `QUERY`
/// is added as an explicit location (it is never cloned or filtered, only referenced as an edge
/// destination) so it can be handed to the model checker as the reachability target.
pub fn finalize(store: &TimelineStore) -> AutomataSystem {
    let mut automata: Vec<Automaton> = Vec::new();
    let mut inter_edges = Vec::new();

    for pa_id in store.pa_order() {
        for prefix in store.prefixes(pa_id) {
            let entry = store.entry(pa_id, prefix).expect("prefix came from this store");
            // Every timeline entry carries its own `trap` location (the single shared identity
            // every clone was built with); strip it here so `merge_automata` doesn't see the same
            // id declared once per entry, and let the final `Automaton::new` add it back exactly
            // once.
            let mut ta = entry.automaton.clone();
            ta.locations.retain(|l| l.id != TRAP);
            automata.push(ta);
            inter_edges.extend(entry.trans_out.iter().cloned());
        }
    }

    let mut direct = ta_ir::merge_automata(&automata, inter_edges, "direct");
    if direct.location(QUERY).is_none() {
        direct.locations.push(Location::new(QUERY, ""));
    }

    AutomataSystem {
        instances: vec![(direct, "direct".to_string())],
        globals: ta_ir::AutomataGlobals::default(),
    }
}
