use hashbrown::HashSet;
use plan_model::{ActionName, ChainStageSpec, Plan, PlanAction, UnarySpec};
use ta_encoder::{Encoder, QUERY};
use ta_ir::{AutomataGlobals, AutomataSystem, Automaton, Bounds, Location, Transition, TRAP};

fn base() -> Automaton {
    Automaton::new(
        vec![Location::new("s0", "").initial(), Location::new("s1", "")],
        vec![Transition::new("s0", "s1", "go", "", "", "")],
        "base",
        true,
    )
}

fn system() -> AutomataSystem {
    AutomataSystem {
        instances: vec![(base(), "base".to_string())],
        globals: AutomataGlobals::default(),
    }
}

fn two_action_plan() -> Plan {
    Plan::new(vec![
        PlanAction::new(ActionName::new("A", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
        PlanAction::new(ActionName::new("B", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
    ])
}

// A 1-time-unit duration per action, so each stage's window (which grows by accumulated
// *minimum* duration, not by action count) terminates before running out of plan actions.
fn six_action_plan() -> Plan {
    Plan::new(
        ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|op| PlanAction::new(ActionName::new(*op, vec![]), Bounds::new(1, Some(1)), Bounds::new(0, None), Bounds::new(0, None)))
            .collect(),
    )
}

#[test]
fn plain_two_action_plan_chains_into_query() {
    let encoder = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let result = encoder.finalize();
    let (ta, _) = &result.instances[0];

    for id in ["A::1@@;;s0", "A::1@@;;s1", "B::2@@;;s0", "B::2@@;;s1", QUERY] {
        assert!(ta.locations.iter().any(|l| l.id == id), "missing {id}");
    }
    assert!(ta.transitions.iter().any(|t| t.source == "A::1@@;;s0" && t.dest == "B::2@@;;s0"));
    assert!(ta.transitions.iter().any(|t| t.source == "A::1@@;;s1" && t.dest == "B::2@@;;s1"));
    assert!(ta.transitions.iter().any(|t| t.source == "B::2@@;;s0" && t.dest == QUERY));
    assert!(ta.transitions.iter().any(|t| t.source == "B::2@@;;s1" && t.dest == QUERY));
}

#[test]
fn future_constraint_installs_clock_invariant_and_return_guard() {
    let mut encoder = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let spec = UnarySpec {
        bounds: Bounds::new(3, Some(7)),
        targets: HashSet::from_iter(["s1".to_string()]),
    };
    assert!(encoder.encode_future("soon", "A::1", &spec).unwrap().is_none());

    let result = encoder.finalize();
    let (ta, _) = &result.instances[0];
    let clone_locations: Vec<&Location> = ta.locations.iter().filter(|l| l.id.starts_with("A::1@@soonF0")).collect();
    assert!(!clone_locations.is_empty());
    assert!(clone_locations.iter().all(|l| l.invariant.contains("<= 7")));

    let ret = ta.transitions.iter().find(|t| t.dest == "A::1@@;;s1" && t.source.starts_with("A::1@@soonF0")).unwrap();
    assert_eq!(ret.guard, "c_soon_0 >= 3 && c_soon_0 <= 7");

    assert!(ta.transitions.iter().any(|t| t.dest == TRAP && t.guard.contains("c_soon_0 > 7")));
}

#[test]
fn past_constraint_requires_boolean_and_clock_window() {
    let mut encoder = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let spec = UnarySpec {
        bounds: Bounds::new(2, Some(5)),
        targets: HashSet::from_iter(["s1".to_string()]),
    };
    assert!(encoder.encode_past("was", "B::2", &spec).unwrap().is_none());

    let result = encoder.finalize();
    let (ta, _) = &result.instances[0];
    let into_s1 = ta.transitions.iter().find(|t| t.dest == "A::1@@wasP0;;s1").unwrap();
    assert!(into_s1.update.contains("b_was_0 = true"));

    let ret = ta
        .transitions
        .iter()
        .find(|t| t.source.starts_with("A::1@@wasP0") && (t.dest == "B::2@@;;s0" || t.dest == "B::2@@;;s1") && t.guard.contains("b_was_0 == true"))
        .expect("expected a return edge guarded by the boolean and the clock window");
    assert!(ret.guard.contains("c_was_0 >= 2"));
    assert!(ret.guard.contains("c_was_0 <= 5"));
}

#[test]
fn until_chain_stitches_stage_windows_with_the_first_stages_guard() {
    let mut encoder = Encoder::new_encoder(&system(), six_action_plan(), 0);
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
    assert!(encoder.encode_until_chain("chain", "B::2", "F::6", &stages).unwrap().is_none());

    let result = encoder.finalize();
    let (ta, _) = &result.instances[0];
    assert!(ta
        .transitions
        .iter()
        .any(|t| t.dest.ends_with(";;s0") && t.guard == "c_chain <= 3" && t.update.contains("c_chain = 0")));
    assert!(ta.transitions.iter().any(|t| t.dest == TRAP && t.guard.contains("c_chain > 3")));
}

#[test]
fn merging_two_encoders_keeps_both_clocks_and_a_single_query() {
    let mut e1 = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let future_spec = UnarySpec {
        bounds: Bounds::new(3, Some(7)),
        targets: HashSet::from_iter(["s1".to_string()]),
    };
    e1.encode_future("soon", "A::1", &future_spec).unwrap();

    let mut e2 = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let past_spec = UnarySpec {
        bounds: Bounds::new(2, Some(5)),
        targets: HashSet::from_iter(["s1".to_string()]),
    };
    e2.encode_past("was", "B::2", &past_spec).unwrap();

    let merged = e1.merge(e2).unwrap();
    let result = merged.finalize();
    let (ta, _) = &result.instances[0];

    assert!(ta.transitions.iter().any(|t| t.guard.contains("c_soon_0")));
    assert!(ta.transitions.iter().any(|t| t.update.contains("b_was_0")));
    assert_eq!(ta.locations.iter().filter(|l| l.id == QUERY).count(), 1);
    assert_eq!(ta.locations.iter().filter(|l| l.id == TRAP).count(), 1);
}

#[test]
fn invariant_rewriter_drops_inbound_edges_to_excluded_targets() {
    let mut encoder = Encoder::new_encoder(&system(), two_action_plan(), 0);
    let targets = HashSet::from_iter(["s0".to_string()]);
    assert!(encoder.encode_invariant(&targets, "B::2").unwrap().is_none());

    let result = encoder.finalize();
    let (ta, _) = &result.instances[0];
    assert!(ta.transitions.iter().any(|t| t.source == "A::1@@;;s0" && t.dest == "B::2@@;;s0"));
    assert!(!ta.transitions.iter().any(|t| t.dest == "B::2@@;;s1"));
    assert!(ta.location("B::2@@;;s1").is_none());
}
