//! The `Invariant` rewriter (§ Rewriter: Invariant): restricts the activating timeline, and every
//! inbound cross-timeline transition from the previous timeline, to the target location set.
//! Outbound transitions keep arbitrary destinations but their sources must be in the target set.

use hashbrown::HashSet;
use ta_ir::filter_automaton;
use tracing::debug_span;

use crate::error::Diagnostic;
use crate::rewriters::{qualify, restrict_inbound};
use crate::timeline::TimelineStore;

pub fn encode_invariant(store: &mut TimelineStore, pa_id: &str, targets: &HashSet<String>) -> Result<(), Diagnostic> {
    let _span = debug_span!("encode_invariant", pa_id, targets = targets.len()).entered();

    if store.index_of(pa_id).is_none() {
        return Err(Diagnostic::unknown_reference(pa_id, "encode_invariant: unknown plan action"));
    }
    let Some(entry) = store.entry(pa_id, "") else {
        return Err(Diagnostic::unknown_reference(pa_id, "encode_invariant: no unrewritten timeline entry"));
    };
    let qualified = qualify(pa_id, "", targets);
    let unknown: Vec<&String> = targets.iter().filter(|t| entry.automaton.location(&ids_qualify(pa_id, t)).is_none()).collect();
    if let Some(bad) = unknown.first() {
        return Err(Diagnostic::unknown_reference((*bad).clone(), "encode_invariant: unknown base location in targets"));
    }

    let ta = filter_automaton(&entry.automaton, &qualified, "", |id| id.to_string());
    let entry = store.entry_mut(pa_id, "").unwrap();
    entry.automaton = ta;
    entry.trans_out.retain(|t| qualified.contains(&t.source) || t.source == ta_ir::TRAP);

    restrict_inbound(store, pa_id, &qualified);
    Ok(())
}

fn ids_qualify(pa_id: &str, base_id: &str) -> String {
    crate::ids::timeline_loc_id(pa_id, "", base_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineStore;
    use plan_model::{ActionName, Plan, PlanAction};
    use ta_ir::{Automaton, Bounds, Location, Transition};

    fn base() -> Automaton {
        Automaton::new(
            vec![Location::new("s0", "").initial(), Location::new("s1", "")],
            vec![Transition::new("s0", "s1", "go", "", "", "")],
            "base",
            true,
        )
    }

    fn plan() -> Plan {
        Plan::new(vec![
            PlanAction::new(ActionName::new("A", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
            PlanAction::new(ActionName::new("B", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
        ])
    }

    #[test]
    fn restricts_activating_timeline_to_targets() {
        let mut store = TimelineStore::build(&base(), &plan());
        let mut targets = HashSet::new();
        targets.insert("s0".to_string());
        encode_invariant(&mut store, "A::1", &targets).unwrap();
        let entry = store.entry("A::1", "").unwrap();
        assert!(entry.automaton.location("A::1@@;;s0").is_some());
        assert!(entry.automaton.location("A::1@@;;s1").is_none());
    }

    #[test]
    fn removes_inbound_edges_to_dropped_locations() {
        let mut store = TimelineStore::build(&base(), &plan());
        let mut targets = HashSet::new();
        targets.insert("s0".to_string());
        encode_invariant(&mut store, "B::2", &targets).unwrap();
        let a = store.entry("A::1", "").unwrap();
        assert!(a.trans_out.iter().all(|t| t.dest == "B::2@@;;s0"));
    }

    #[test]
    fn unknown_plan_action_is_a_diagnostic() {
        let mut store = TimelineStore::build(&base(), &plan());
        let targets = HashSet::new();
        assert!(encode_invariant(&mut store, "Z::9", &targets).is_err());
    }
}
