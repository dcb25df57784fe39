//! Constraint descriptors: the typed records naming a temporal operator and its
//! targets/activations, dispatched onto rewriters by the driver.

use crate::action_name::ActionName;
use hashbrown::HashSet;
use ta_ir::Bounds;

/// The set of base-automaton location ids a rewrite targets.
pub type Targets = HashSet<String>;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    Future,
    Past,
    NoOp,
    Invariant,
}

/// `Until`/`Since` are declared here so the descriptor and driver surface exist, but neither has
/// a rewriter: both are unimplemented, matching the source's commented-out branches.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Until,
    Since,
}

#[derive(Clone, Debug)]
pub struct UnarySpec {
    pub bounds: Bounds,
    pub targets: Targets,
}

#[derive(Clone, Debug)]
pub struct ChainStageSpec {
    pub bounds: Bounds,
    pub targets: Targets,
}

/// One constraint descriptor, as consumed by `new_encoder`'s driver loop.
#[derive(Clone, Debug)]
pub enum EncICInfo {
    Unary {
        name: String,
        op: UnaryOp,
        spec: UnarySpec,
        activations: Vec<ActionName>,
    },
    Binary {
        name: String,
        op: BinaryOp,
        spec: UnarySpec,
        activations: Vec<ActionName>,
        pre_targets: Targets,
    },
    Chain {
        name: String,
        activations_start: Vec<ActionName>,
        stages: Vec<ChainStageSpec>,
        activations_end: Vec<ActionName>,
    },
}

impl EncICInfo {
    pub fn name(&self) -> &str {
        match self {
            EncICInfo::Unary { name, .. } => name,
            EncICInfo::Binary { name, .. } => name,
            EncICInfo::Chain { name, .. } => name,
        }
    }
}
