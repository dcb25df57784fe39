//! Timed-automaton intermediate representation: clocks, the clock-constraint algebra, string-level
//! guard conjunction, and the `Automaton`/`AutomataSystem` types rewriters and the encoder build on.

pub mod automaton;
pub mod bounds;
pub mod clock;
pub mod constraint;
pub mod guard;

pub use automaton::{add_invariants, filter_automaton, merge_automata, Automaton, AutomataGlobals, AutomataSystem, ChanType, Channel, Location, Transition, TRAP};
pub use bounds::{safe_add, Bounds, Timepoint};
pub use clock::{Clock, ComparisonOp};
pub use constraint::{make_cmp, make_conj, make_diff, make_true, ClockConstraint};
pub use guard::{and_constraints, and_updates};
