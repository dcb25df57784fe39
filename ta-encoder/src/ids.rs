//! The identifier grammar (§ External Interfaces): stable separators and the helpers that build
//! and tear down fully-qualified location ids. Preserved bit-for-bit because the downstream
//! serializer and trace parser parse these strings.
//!
//! Grammar:
//! - plan-action id: `<op> PA_SEP <index>` (e.g. `pick::3`)
//! - timeline-local location id: `<pa_id> TL_SEP <op_prefix_chain> CONSTRAINT_SEP <base_location_id>`
//! - `BASE_SEP` (== `CONSTRAINT_SEP`) splits a fully-qualified id into `(timeline_prefix, base_location_id)`
//!
//! `TL_SEP` and `CONSTRAINT_SEP` each occur exactly once in any id this module generates: the
//! op-prefix chain is built by straight concatenation of operator-name segments (never by
//! re-inserting `TL_SEP`), which is what makes `get_prefix`/`get_suffix` round-trip.

pub const PA_SEP: &str = "::";
pub const TL_SEP: &str = "@@";
pub const CONSTRAINT_SEP: &str = ";;";
pub const BASE_SEP: &str = CONSTRAINT_SEP;

/// The substring of `id` up to the first occurrence of `sep`, or all of `id` if `sep` does not
/// occur.
pub fn get_prefix<'a>(id: &'a str, sep: &str) -> &'a str {
    match id.find(sep) {
        Some(i) => &id[..i],
        None => id,
    }
}

/// The substring of `id` after the last occurrence of `sep`, or all of `id` if `sep` does not
/// occur.
pub fn get_suffix<'a>(id: &'a str, sep: &str) -> &'a str {
    match id.rfind(sep) {
        Some(i) => &id[i + sep.len()..],
        None => id,
    }
}

pub fn pa_id(op: &str, index: usize) -> String {
    format!("{op}{PA_SEP}{index}")
}

/// Builds a fully-qualified timeline-local location id from its three grammar parts.
pub fn timeline_loc_id(pa_id: &str, op_prefix_chain: &str, base_location_id: &str) -> String {
    format!("{pa_id}{TL_SEP}{op_prefix_chain}{CONSTRAINT_SEP}{base_location_id}")
}

/// The `(pa_id, op_prefix_chain)` pair this id was built under.
pub fn timeline_prefix(id: &str) -> &str {
    get_prefix(id, CONSTRAINT_SEP)
}

/// The base (unqualified) location id this fully-qualified id was built from.
pub fn base_location_id(id: &str) -> &str {
    get_suffix(id, CONSTRAINT_SEP)
}

/// Appends a new operator-name segment onto an existing op-prefix chain. Chains are built by
/// concatenation, not by a separator, so that `TL_SEP`/`CONSTRAINT_SEP` keep occurring exactly
/// once regardless of how many rewrites have stacked.
pub fn extend_prefix_chain(chain: &str, segment: &str) -> String {
    format!("{chain}{segment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pa_id_uses_pa_sep() {
        assert_eq!(pa_id("pick", 3), "pick::3");
    }

    #[test]
    fn round_trips_through_tl_sep() {
        let id = timeline_loc_id(&pa_id("pick", 3), "icp_cF7", "cam_on");
        assert_eq!(id, "pick::3@@icp_cF7;;cam_on");
        let prefix = get_prefix(&id, TL_SEP);
        let suffix = get_suffix(&id, TL_SEP);
        assert_eq!(format!("{prefix}{TL_SEP}{suffix}"), id);
        assert_eq!(prefix, "pick::3");
    }

    #[test]
    fn round_trips_for_empty_op_prefix_chain() {
        let id = timeline_loc_id(&pa_id("pick", 3), "", "cam_on");
        let prefix = get_prefix(&id, TL_SEP);
        let suffix = get_suffix(&id, TL_SEP);
        assert_eq!(format!("{prefix}{TL_SEP}{suffix}"), id);
    }

    #[test]
    fn base_sep_splits_into_timeline_prefix_and_base_id() {
        let id = timeline_loc_id(&pa_id("pick", 3), "icp_cF7", "cam_on");
        assert_eq!(timeline_prefix(&id), "pick::3@@icp_cF7");
        assert_eq!(base_location_id(&id), "cam_on");
    }

    #[test]
    fn get_prefix_returns_whole_string_when_sep_absent() {
        assert_eq!(get_prefix("abc", "::"), "abc");
        assert_eq!(get_suffix("abc", "::"), "abc");
    }
}
