//! The `NoOp` rewriter (§ Rewriter: NoOp): identical to `Invariant` on the inbound side, but the
//! activating timeline itself is left untouched. Asserts "at the activation, state ∈ targets"
//! without constraining subsequent behaviour.

use hashbrown::HashSet;
use tracing::debug_span;

use crate::error::Diagnostic;
use crate::rewriters::{qualify, restrict_inbound};
use crate::timeline::TimelineStore;

pub fn encode_no_op(store: &mut TimelineStore, pa_id: &str, targets: &HashSet<String>) -> Result<(), Diagnostic> {
    let _span = debug_span!("encode_no_op", pa_id, targets = targets.len()).entered();

    if store.entry(pa_id, "").is_none() {
        return Err(Diagnostic::unknown_reference(pa_id, "encode_no_op: unknown plan action"));
    }
    let qualified = qualify(pa_id, "", targets);
    restrict_inbound(store, pa_id, &qualified);
    Ok(())
}
