//! The direct encoder: compiles a timed plan and a set of metric temporal constraints into a
//! network of timed automata, by rewriting one timeline-store copy of a base automaton per plan
//! action. See [`driver::Encoder`] for the public entry point.

pub mod compose;
pub mod driver;
pub mod error;
pub mod finalize;
pub mod ids;
pub mod rewriters;
pub mod timeline;
pub mod window;

pub use driver::{Encoder, PAST_CONTEXT};
pub use error::{Diagnostic, DiagnosticKind, EncodeError};
pub use timeline::{TimelineEntry, TimelineStore, Timelines, QUERY};
pub use window::{compute_future_window, compute_past_window, Window};
