//! The timed-automaton intermediate representation (TA-IR): locations, transitions, the
//! `Automaton` they form, and the handful of structural operations (`add_invariants`,
//! `filter_automaton`, `merge_automata`) every rewriter is built from.

use crate::guard::and_constraints;
use hashbrown::HashSet;

/// Every automaton produced by this crate carries a sink location with this id and no outgoing
/// transitions; runs that violate an upper bound are routed here.
pub const TRAP: &str = "trap";

/// A location: an id, a (possibly empty, meaning "true") invariant, and the `urgent`/`initial`
/// flags from the data model.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Location {
    pub id: String,
    pub invariant: String,
    pub urgent: bool,
    pub initial: bool,
}

impl Location {
    pub fn new(id: impl Into<String>, invariant: impl Into<String>) -> Location {
        Location {
            id: id.into(),
            invariant: invariant.into(),
            urgent: false,
            initial: false,
        }
    }

    pub fn urgent(mut self) -> Location {
        self.urgent = true;
        self
    }

    pub fn initial(mut self) -> Location {
        self.initial = true;
        self
    }

    pub fn trap() -> Location {
        Location::new(TRAP, "")
    }
}

/// A transition: source/destination location ids, an action label, a guard, an update and a
/// synchronization channel, all as plain (possibly empty) strings, plus the `passive` flag
/// marking receive-only synchronization.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transition {
    pub source: String,
    pub dest: String,
    pub action: String,
    pub guard: String,
    pub update: String,
    pub sync: String,
    pub passive: bool,
}

impl Transition {
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        action: impl Into<String>,
        guard: impl Into<String>,
        update: impl Into<String>,
        sync: impl Into<String>,
    ) -> Transition {
        Transition {
            source: source.into(),
            dest: dest.into(),
            action: action.into(),
            guard: guard.into(),
            update: update.into(),
            sync: sync.into(),
            passive: false,
        }
    }

    pub fn passive(mut self) -> Transition {
        self.passive = true;
        self
    }

    /// Adds `guard` to this transition's existing guard via [`and_constraints`].
    pub fn and_guard(mut self, guard: &str) -> Transition {
        self.guard = and_constraints(&self.guard, guard);
        self
    }

    /// Adds `update` to this transition's existing update (comma-joined, `""` as identity).
    pub fn and_update(mut self, update: &str) -> Transition {
        self.update = crate::guard::and_updates(&self.update, update);
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChanType {
    Binary,
    Broadcast,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Channel {
    pub ty: ChanType,
    pub name: String,
}

/// Globals shared across all automata of an [`AutomataSystem`].
#[derive(Clone, Default, Debug)]
pub struct AutomataGlobals {
    pub clocks: Vec<String>,
    pub bool_vars: Vec<String>,
    pub channels: Vec<Channel>,
}

/// A single automaton: its locations, transitions, and the clocks/booleans it declares locally
/// (in addition to whatever is declared in the enclosing [`AutomataGlobals`]).
///
/// Invariant: after construction via [`Automaton::new`] with `ensure_trap = true`, there is
/// exactly one location with id [`TRAP`] and no outgoing transitions.
#[derive(Clone, Debug)]
pub struct Automaton {
    pub locations: Vec<Location>,
    pub transitions: Vec<Transition>,
    pub clocks: Vec<String>,
    pub bool_vars: Vec<String>,
    pub prefix: String,
}

impl Automaton {
    /// Builds an automaton, appending a [`TRAP`] location with a trivial invariant if none of
    /// `locations` already has that id and `ensure_trap` is set.
    pub fn new(mut locations: Vec<Location>, transitions: Vec<Transition>, prefix: impl Into<String>, ensure_trap: bool) -> Automaton {
        if ensure_trap && !locations.iter().any(|l| l.id == TRAP) {
            locations.push(Location::trap());
        }
        Automaton {
            locations,
            transitions,
            clocks: Vec::new(),
            bool_vars: Vec::new(),
            prefix: prefix.into(),
        }
    }

    pub fn has_trap(&self) -> bool {
        self.locations.iter().any(|l| l.id == TRAP)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn initial_location(&self) -> Option<&Location> {
        self.locations.iter().find(|l| l.initial)
    }
}

/// An automaton paired with the (possibly empty) instance name it is registered under.
#[derive(Clone, Debug)]
pub struct AutomataSystem {
    pub instances: Vec<(Automaton, String)>,
    pub globals: AutomataGlobals,
}

/// Conjoins `inv` onto the invariant of every location in `ta` whose id appears in `filter`.
/// Applying the same invariant twice is idempotent only up to `render`-level duplication (the
/// string is appended both times); callers relying on idempotence (e.g. `encode_invariant`,
/// which restricts locations rather than conjoining an invariant) should not call this twice
/// with the same `inv` unless that duplication is acceptable to the downstream model checker.
pub fn add_invariants(ta: &mut Automaton, filter: &HashSet<String>, inv: &str) {
    for loc in ta.locations.iter_mut() {
        if filter.contains(&loc.id) {
            loc.invariant = and_constraints(&loc.invariant, inv);
        }
    }
}

/// Produces a copy of `ta` restricted to the locations in `keep` (the trap location is always
/// implicitly kept), with every retained id passed through `id_map`. [`TRAP`] itself is never
/// remapped: every automaton copy shares the same trap identity, so a run that reaches `trap` in
/// one timeline is indistinguishable from reaching it in any other. Transitions are kept only
/// when both endpoints survive the restriction, and have both (non-trap) endpoints remapped the
/// same way.
pub fn filter_automaton(ta: &Automaton, keep: &HashSet<String>, new_prefix: &str, id_map: impl Fn(&str) -> String) -> Automaton {
    let keeps = |id: &str| id == TRAP || keep.contains(id);
    let map_id = |id: &str| if id == TRAP { TRAP.to_string() } else { id_map(id) };
    let locations: Vec<Location> = ta
        .locations
        .iter()
        .filter(|l| keeps(&l.id))
        .map(|l| Location { id: map_id(&l.id), ..l.clone() })
        .collect();
    let transitions: Vec<Transition> = ta
        .transitions
        .iter()
        .filter(|t| keeps(&t.source) && keeps(&t.dest))
        .map(|t| Transition {
            source: map_id(&t.source),
            dest: map_id(&t.dest),
            ..t.clone()
        })
        .collect();
    let mut copy = Automaton::new(locations, transitions, new_prefix, true);
    copy.clocks = ta.clocks.clone();
    copy.bool_vars = ta.bool_vars.clone();
    copy
}

/// Unions the locations and transitions of every automaton in `list` (their ids are assumed
/// already unique, e.g. via per-copy prefixing) and appends `inter_edges` as additional
/// transitions connecting them.
pub fn merge_automata(list: &[Automaton], inter_edges: Vec<Transition>, prefix: impl Into<String>) -> Automaton {
    let mut locations = Vec::new();
    let mut transitions = Vec::new();
    let mut clocks = Vec::new();
    let mut bool_vars = Vec::new();
    for ta in list {
        locations.extend(ta.locations.iter().cloned());
        transitions.extend(ta.transitions.iter().cloned());
        clocks.extend(ta.clocks.iter().cloned());
        bool_vars.extend(ta.bool_vars.iter().cloned());
    }
    transitions.extend(inter_edges);
    let mut merged = Automaton::new(locations, transitions, prefix, true);
    clocks.sort();
    clocks.dedup();
    bool_vars.sort();
    bool_vars.dedup();
    merged.clocks = clocks;
    merged.bool_vars = bool_vars;
    merged
}
