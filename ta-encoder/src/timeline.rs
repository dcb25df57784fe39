//! Timeline-store construction (§ Timeline Store Construction): one [`TimelineEntry`] per plan
//! action, seeded by filtering the base automaton, linked by copy transitions derived from the
//! plan automaton, and terminated by edges into the distinguished [`QUERY`] location.

use hashbrown::HashMap;
use plan_model::Plan;
use ta_ir::{filter_automaton, Automaton, Transition, TRAP};

use crate::ids;

/// The location the last plan action's timeline transitions into; the downstream model checker's
/// reachability target.
pub const QUERY: &str = "QUERY";

/// An automaton copy for one `(plan_action, operator_prefix)` pair, plus the transitions it
/// contributes into other timelines (including, for the last plan action, into [`QUERY`]).
#[derive(Clone, Debug)]
pub struct TimelineEntry {
    pub automaton: Automaton,
    pub trans_out: Vec<Transition>,
}

/// `pa_id -> (op_prefix_chain -> TimelineEntry)`. The unrewritten copy of each plan action lives
/// under the empty-string prefix.
pub type Timelines = HashMap<String, HashMap<String, TimelineEntry>>;

pub struct TimelineStore {
    pa_order: Vec<String>,
    timelines: Timelines,
    base: Automaton,
    fresh_counter: u64,
}

impl TimelineStore {
    /// Builds the store in one pass over `plan`: filters `base` into one prefixed copy per plan
    /// action, links consecutive copies with transitions carrying each plan action's
    /// absolute-time guard and a reset of the plan clock, injects each plan action's
    /// duration-upper invariant, and finally wires every location of the last plan action's
    /// timeline into [`QUERY`].
    pub fn build(base: &Automaton, plan: &Plan) -> TimelineStore {
        let base_ids: hashbrown::HashSet<String> = base.locations.iter().map(|l| l.id.clone()).collect();
        let mut timelines: Timelines = HashMap::new();
        let mut pa_order = Vec::new();
        let mut prev_id: Option<String> = None;

        for (i, pa) in plan.actions.iter().enumerate() {
            let id = ids::pa_id(&pa.name.op, i + 1);
            let ta = filter_automaton(base, &base_ids, &id, |base_id| ids::timeline_loc_id(&id, "", base_id));

            let mut entry = TimelineEntry { automaton: ta, trans_out: Vec::new() };

            let upper_guard = pa.duration.upper.map(|u| format!("{} <= {u}", plan_model::constants::GLOBAL_CLOCK));
            if let Some(inv) = upper_guard {
                let filter: hashbrown::HashSet<String> = entry.automaton.locations.iter().filter(|l| l.id != TRAP).map(|l| l.id.clone()).collect();
                ta_ir::add_invariants(&mut entry.automaton, &filter, &inv);
            }

            if let Some(prev) = &prev_id {
                let guard = pa.absolute_time.guard(plan_model::constants::GLOBAL_CLOCK);
                let update = format!("{} = 0", plan_model::constants::GLOBAL_CLOCK);
                let prev_entry = timelines.get_mut(prev).unwrap().get_mut("").unwrap();
                for base_loc in base.locations.iter().filter(|l| l.id != TRAP) {
                    let src = ids::timeline_loc_id(prev, "", &base_loc.id);
                    let dst = ids::timeline_loc_id(&id, "", &base_loc.id);
                    prev_entry.trans_out.push(Transition::new(src, dst, "", guard.clone(), update.clone(), ""));
                }
            }

            timelines.entry(id.clone()).or_default().insert(String::new(), entry);
            pa_order.push(id.clone());
            prev_id = Some(id);
        }

        if let Some(last) = &prev_id {
            let last_entry = timelines.get_mut(last).unwrap().get_mut("").unwrap();
            let query_edges: Vec<Transition> = last_entry
                .automaton
                .locations
                .iter()
                .filter(|l| l.id != TRAP)
                .map(|l| Transition::new(l.id.clone(), QUERY, "", "", "", ""))
                .collect();
            last_entry.trans_out.extend(query_edges);
        }

        TimelineStore {
            pa_order,
            timelines,
            base: base.clone(),
            fresh_counter: 0,
        }
    }

    /// Assembles a store directly from its parts. Used by [`crate::compose::merge`], which
    /// builds a fresh `Timelines` map rather than mutating either input store in place.
    pub(crate) fn from_parts(pa_order: Vec<String>, timelines: Timelines, base: Automaton, fresh_counter: u64) -> TimelineStore {
        TimelineStore { pa_order, timelines, base, fresh_counter }
    }

    pub fn pa_order(&self) -> &[String] {
        &self.pa_order
    }

    pub fn base(&self) -> &Automaton {
        &self.base
    }

    pub fn index_of(&self, pa_id: &str) -> Option<usize> {
        self.pa_order.iter().position(|p| p == pa_id)
    }

    pub fn entry(&self, pa_id: &str, prefix: &str) -> Option<&TimelineEntry> {
        self.timelines.get(pa_id)?.get(prefix)
    }

    pub fn entry_mut(&mut self, pa_id: &str, prefix: &str) -> Option<&mut TimelineEntry> {
        self.timelines.get_mut(pa_id)?.get_mut(prefix)
    }

    pub fn prefixes(&self, pa_id: &str) -> impl Iterator<Item = &str> {
        self.timelines.get(pa_id).into_iter().flat_map(|m| m.keys().map(String::as_str))
    }

    /// Inserts or overwrites the entry for `(pa_id, prefix)`. Rewriters use "overwrite"
    /// semantics when a later stage shares an earlier stage's prefix.
    pub fn set_entry(&mut self, pa_id: &str, prefix: &str, entry: TimelineEntry) {
        self.timelines.entry(pa_id.to_string()).or_default().insert(prefix.to_string(), entry);
    }

    pub fn remove_entry(&mut self, pa_id: &str, prefix: &str) -> Option<TimelineEntry> {
        self.timelines.get_mut(pa_id)?.remove(prefix)
    }

    /// Returns and increments the per-store monotonic fresh-name counter.
    pub fn next_counter(&mut self) -> u64 {
        let c = self.fresh_counter;
        self.fresh_counter += 1;
        c
    }

    pub fn timelines(&self) -> &Timelines {
        &self.timelines
    }

    /// True iff every timeline entry has exactly one `trap` location and `pa_order` covers
    /// exactly the store's keys; used by tests to check the store invariant after a rewrite.
    pub fn check_invariants(&self) -> bool {
        self.pa_order.iter().collect::<hashbrown::HashSet<_>>().len() == self.pa_order.len()
            && self.timelines.values().all(|by_prefix| {
                by_prefix
                    .values()
                    .all(|e| e.automaton.locations.iter().filter(|l| l.id == TRAP).count() == 1)
            })
    }
}
