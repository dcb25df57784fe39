//! Builds the plan automaton (§ Plan Automaton): one urgent location per plan action, threaded
//! between a non-urgent `start` and `end`, guarded by each plan action's absolute-time bound and
//! resetting the global plan clock. Used only to seed timeline-store construction; it is never
//! part of the finalized network.

use crate::constants::{END_PA, GLOBAL_CLOCK, START_PA};
use crate::plan::Plan;
use ta_ir::{Automaton, Location, Transition};

/// The location id of the `i`-th (0-based) plan action's urgent location in the plan automaton.
pub fn plan_action_location(index: usize) -> String {
    format!("pa{index}")
}

pub fn build_plan_automaton(plan: &Plan) -> Automaton {
    let mut locations = vec![Location::new(START_PA, "").initial()];
    for i in 0..plan.len() {
        locations.push(Location::new(plan_action_location(i), "").urgent());
    }
    locations.push(Location::new(END_PA, ""));

    let mut transitions = Vec::new();
    let mut prev = START_PA.to_string();
    for (i, pa) in plan.actions.iter().enumerate() {
        let here = plan_action_location(i);
        let guard = pa.absolute_time.guard(GLOBAL_CLOCK);
        transitions.push(Transition::new(&prev, &here, pa.name.op.clone(), guard, format!("{GLOBAL_CLOCK} = 0"), ""));
        prev = here;
    }
    transitions.push(Transition::new(&prev, END_PA, "", "", "", ""));

    Automaton::new(locations, transitions, "plan", true)
}
