//! The plan model: parameterized action names, the timed plan itself, constraint descriptors,
//! and the plan automaton built from a plan.

pub mod action_name;
pub mod constants;
pub mod enc_ic_info;
pub mod plan;
pub mod plan_automaton;

pub use action_name::ActionName;
pub use enc_ic_info::{BinaryOp, ChainStageSpec, EncICInfo, Targets, UnaryOp, UnarySpec};
pub use plan::{Plan, PlanAction};
pub use plan_automaton::{build_plan_automaton, plan_action_location};
