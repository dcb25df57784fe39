pub mod future;
pub mod invariant;
pub mod no_op;
pub mod past;
pub mod until_chain;

use hashbrown::HashSet;

use crate::ids;
use crate::timeline::TimelineStore;

/// Qualifies a set of base location ids into this timeline's fully-qualified ids.
pub(crate) fn qualify(pa_id: &str, op_prefix_chain: &str, targets: &HashSet<String>) -> HashSet<String> {
    targets.iter().map(|t| ids::timeline_loc_id(pa_id, op_prefix_chain, t)).collect()
}

/// Restricts the predecessor timeline's outbound edges into `(pa_id, "")` to the ones landing in
/// `keep_qualified` — used by the `Invariant` and `NoOp` rewriters, whose inbound-side behaviour
/// is identical.
pub(crate) fn restrict_inbound(store: &mut TimelineStore, pa_id: &str, keep_qualified: &HashSet<String>) {
    let Some(idx) = store.index_of(pa_id) else { return };
    if idx == 0 {
        return;
    }
    let prev_id = store.pa_order()[idx - 1].clone();
    let belongs_to_this_timeline = format!("{pa_id}{}", ids::TL_SEP);
    if let Some(prev_entry) = store.entry_mut(&prev_id, "") {
        prev_entry.trans_out.retain(|t| !t.dest.starts_with(&belongs_to_this_timeline) || keep_qualified.contains(&t.dest));
    }
}
