//! Special names from the identifier grammar that are fixed by construction rather than
//! generated per job.

/// The initial location of the plan automaton; not urgent, carries no invariant.
pub const START_PA: &str = "start";

/// The terminal location of the plan automaton.
pub const END_PA: &str = "end";

/// Name under which the plan automaton is registered in an `AutomataSystem`. The plan automaton
/// itself never appears in the finalized network; it only seeds timeline-store construction.
pub const PLAN_TA_NAME: &str = "plan";

/// The clock reset on every plan-automaton transition, tracking time since the start of the plan.
pub const GLOBAL_CLOCK: &str = "t_plan";

/// The sigil marking an action argument as a pattern variable: an argument whose first character
/// equals `VAR_PREFIX` is a pattern variable rather than a literal.
pub const VAR_PREFIX: char = '?';
