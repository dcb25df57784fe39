//! The two failure channels: non-fatal [`Diagnostic`]s returned alongside an unchanged store, and
//! fatal [`EncodeError`]s that abort the job.

use thiserror::Error;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DiagnosticKind {
    /// An id referenced by a rewrite (plan-action, base location, clock) does not exist.
    UnknownReference,
    /// The computed window for a rewrite contains zero plan actions.
    EmptyWindow,
}

/// A non-fatal diagnostic: the store is returned unchanged, but the issue is surfaced rather than
/// silently dropped.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub offending_id: String,
    pub context: String,
}

impl Diagnostic {
    pub fn unknown_reference(offending_id: impl Into<String>, context: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::UnknownReference,
            offending_id: offending_id.into(),
            context: context.into(),
        }
    }

    pub fn empty_window(offending_id: impl Into<String>, context: impl Into<String>) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::EmptyWindow,
            offending_id: offending_id.into(),
            context: context.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} on {:?}: {}", self.kind, self.offending_id, self.context)
    }
}

/// Fatal errors: invariant violations in construction that abort the job rather than degrade to
/// a diagnostic.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("timeline prefix {prefix:?} is already in use for plan action {pa_id:?}")]
    DuplicateTimelinePrefix { pa_id: String, prefix: String },

    #[error("cannot rewrite the terminal QUERY location")]
    RewriteOfQuery,

    #[error("cannot merge encoders with differing pa_order ({left:?} vs {right:?})")]
    MismatchedPlanOrder { left: Vec<String>, right: Vec<String> },
}
