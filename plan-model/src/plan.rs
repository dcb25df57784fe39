//! The timed plan: an ordered sequence of plan actions.

use crate::action_name::ActionName;
use ta_ir::Bounds;

/// One timed step of the plan.
#[derive(Clone, Debug)]
pub struct PlanAction {
    pub name: ActionName,
    pub duration: Bounds,
    pub absolute_time: Bounds,
    pub delay_tolerance: Bounds,
}

impl PlanAction {
    pub fn new(name: ActionName, duration: Bounds, absolute_time: Bounds, delay_tolerance: Bounds) -> PlanAction {
        PlanAction {
            name,
            duration,
            absolute_time,
            delay_tolerance,
        }
    }
}

/// An ordered plan. Indices into `actions` are 0-based internally; the 1-based convention with
/// implicit `start`/`end` markers at positions `0` and `N+1` belongs to the identifier grammar
/// (see the core encoder), not to this in-memory representation.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub actions: Vec<PlanAction>,
}

impl Plan {
    pub fn new(actions: Vec<PlanAction>) -> Plan {
        Plan { actions }
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlanAction> {
        self.actions.get(index)
    }

    /// Index of the first plan action whose name matches `pattern`, if any.
    pub fn index_of(&self, pattern: &ActionName) -> Option<usize> {
        self.actions.iter().position(|pa| pattern.matches(&pa.name))
    }
}
