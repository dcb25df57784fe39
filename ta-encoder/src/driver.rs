//! The driver API (§ 6 External Interfaces): [`Encoder`], the public entry point wrapping a
//! [`TimelineStore`] with the invariant checks construction requires (duplicate timeline prefix,
//! rewrite of `QUERY`) and dispatching onto the five rewriters.

use env_param::EnvParam;
use hashbrown::HashSet;
use plan_model::{ChainStageSpec, Plan, UnarySpec};
use ta_ir::AutomataSystem;
use tracing::warn;

use crate::compose;
use crate::error::{Diagnostic, EncodeError};
use crate::finalize::finalize;
use crate::rewriters::{future::encode_future, invariant::encode_invariant, no_op::encode_no_op, past::encode_past, until_chain::encode_until_chain};
use crate::timeline::{TimelineStore, QUERY};

/// How many plan actions back a `Past` rewrite scans by default, overridable via the
/// `TA_ENCODER_PAST_CONTEXT` environment variable.
pub static PAST_CONTEXT: EnvParam<usize> = EnvParam::new("TA_ENCODER_PAST_CONTEXT", "8");

/// The public driver: one `Encoder` per encoding job, wrapping a single [`TimelineStore`] for its
/// lifetime (§ 5 Concurrency & Resource Model — single-threaded, no shared mutable state between
/// jobs).
pub struct Encoder {
    store: TimelineStore,
    plan: Plan,
}

impl Encoder {
    /// Builds the store from `system.instances[base_index]`'s automaton and `plan`.
    ///
    /// # Panics
    /// Panics if `base_index` is out of range for `system.instances` — a caller error, not a
    /// condition a job can recover from.
    pub fn new_encoder(system: &AutomataSystem, plan: Plan, base_index: usize) -> Encoder {
        let (base, _name) = &system.instances[base_index];
        let store = TimelineStore::build(base, &plan);
        Encoder { store, plan }
    }

    fn guard_not_query(&self, pa_id: &str) -> Result<(), EncodeError> {
        if pa_id == QUERY {
            return Err(EncodeError::RewriteOfQuery);
        }
        Ok(())
    }

    pub fn encode_future(&mut self, name: &str, pa_id: &str, spec: &UnarySpec) -> Result<Option<Diagnostic>, EncodeError> {
        self.guard_not_query(pa_id)?;
        match encode_future(&mut self.store, &self.plan, name, pa_id, &spec.bounds, &spec.targets) {
            Ok(()) => Ok(None),
            Err(d) => {
                warn!(%d, "encode_future: non-fatal diagnostic");
                Ok(Some(d))
            }
        }
    }

    pub fn encode_past(&mut self, name: &str, pa_id: &str, spec: &UnarySpec) -> Result<Option<Diagnostic>, EncodeError> {
        self.guard_not_query(pa_id)?;
        match encode_past(&mut self.store, PAST_CONTEXT.get(), name, pa_id, &spec.bounds, &spec.targets) {
            Ok(()) => Ok(None),
            Err(d) => {
                warn!(%d, "encode_past: non-fatal diagnostic");
                Ok(Some(d))
            }
        }
    }

    pub fn encode_no_op(&mut self, targets: &HashSet<String>, pa_id: &str) -> Result<Option<Diagnostic>, EncodeError> {
        self.guard_not_query(pa_id)?;
        match encode_no_op(&mut self.store, pa_id, targets) {
            Ok(()) => Ok(None),
            Err(d) => Ok(Some(d)),
        }
    }

    pub fn encode_invariant(&mut self, targets: &HashSet<String>, pa_id: &str) -> Result<Option<Diagnostic>, EncodeError> {
        self.guard_not_query(pa_id)?;
        match encode_invariant(&mut self.store, pa_id, targets) {
            Ok(()) => Ok(None),
            Err(d) => Ok(Some(d)),
        }
    }

    pub fn encode_until_chain(&mut self, name: &str, start_pa_id: &str, end_pa_id: &str, stages: &[ChainStageSpec]) -> Result<Option<Diagnostic>, EncodeError> {
        self.guard_not_query(start_pa_id)?;
        self.guard_not_query(end_pa_id)?;
        match encode_until_chain(&mut self.store, &self.plan, name, start_pa_id, end_pa_id, stages) {
            Ok(()) => Ok(None),
            Err(d) => Ok(Some(d)),
        }
    }

    pub fn merge(self, other: Encoder) -> Result<Encoder, EncodeError> {
        let plan = self.plan;
        let store = compose::merge(self.store, other.store)?;
        Ok(Encoder { store, plan })
    }

    pub fn finalize(&self) -> AutomataSystem {
        finalize(&self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plan_model::{ActionName, PlanAction};
    use ta_ir::{Automaton, AutomataGlobals, Bounds, Location, Transition};

    fn system() -> AutomataSystem {
        let base = Automaton::new(
            vec![Location::new("s0", "").initial(), Location::new("s1", "")],
            vec![Transition::new("s0", "s1", "go", "", "", "")],
            "base",
            true,
        );
        AutomataSystem {
            instances: vec![(base, "base".to_string())],
            globals: AutomataGlobals::default(),
        }
    }

    fn plan() -> Plan {
        Plan::new(vec![
            PlanAction::new(ActionName::new("A", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
            PlanAction::new(ActionName::new("B", vec![]), Bounds::new(0, None), Bounds::new(0, None), Bounds::new(0, None)),
        ])
    }

    #[test]
    fn rejects_rewrite_of_query() {
        let mut enc = Encoder::new_encoder(&system(), plan(), 0);
        let targets = HashSet::from_iter(["s0".to_string()]);
        assert!(enc.encode_no_op(&targets, QUERY).is_err());
    }

    #[test]
    fn finalize_without_any_rewrite_still_reaches_query() {
        let enc = Encoder::new_encoder(&system(), plan(), 0);
        let system = enc.finalize();
        let (ta, _) = &system.instances[0];
        assert!(ta.transitions.iter().any(|t| t.dest == QUERY));
    }

    #[test]
    fn encode_future_then_finalize_keeps_a_single_trap() {
        let mut enc = Encoder::new_encoder(&system(), plan(), 0);
        let spec = UnarySpec {
            bounds: Bounds::new(0, Some(5)),
            targets: HashSet::from_iter(["s1".to_string()]),
        };
        enc.encode_future("evt", "A::1", &spec).unwrap();
        let system = enc.finalize();
        let (ta, _) = &system.instances[0];
        assert_eq!(ta.locations.iter().filter(|l| l.id == ta_ir::TRAP).count(), 1);
    }
}
