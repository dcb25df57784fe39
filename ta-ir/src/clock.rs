//! Clocks and the comparison operators used to build clock constraints.

use std::fmt;

/// A named real-valued clock. Clocks are monotonically increasing between resets and are
/// shared by identity: two [`Clock`] values with the same name denote the same clock, even
/// across automaton copies, unless one of them has been renamed with a prefix.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Clock(pub String);

impl Clock {
    pub fn new(name: impl Into<String>) -> Self {
        Clock(name.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Clock {
    fn from(s: &str) -> Self {
        Clock(s.to_string())
    }
}

impl From<String> for Clock {
    fn from(s: String) -> Self {
        Clock(s)
    }
}

/// A comparison operator over clock values. `Bounds` restricts itself to `Lt`/`Le`; the full
/// set is needed by [`crate::constraint::ClockConstraint`], whose `Comparison` and `Difference`
/// variants may carry any of the six.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComparisonOp {
    Lt,
    Le,
    Eq,
    Neq,
    Ge,
    Gt,
}

impl ComparisonOp {
    /// Swaps the operator as if the two sides of the comparison were exchanged:
    /// `a op b` becomes `b reverse_op(op) a`. Fixed on `Eq`/`Neq`.
    pub fn reverse_op(self) -> ComparisonOp {
        use ComparisonOp::*;
        match self {
            Lt => Gt,
            Gt => Lt,
            Le => Ge,
            Ge => Le,
            Eq => Eq,
            Neq => Neq,
        }
    }

    /// The logical negation of the operator: `!(a op b) == a inverse_op(op) b`.
    pub fn inverse_op(self) -> ComparisonOp {
        use ComparisonOp::*;
        match self {
            Lt => Ge,
            Ge => Lt,
            Le => Gt,
            Gt => Le,
            Eq => Neq,
            Neq => Eq,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Gt => ">",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_op_is_involutive() {
        for op in [
            ComparisonOp::Lt,
            ComparisonOp::Le,
            ComparisonOp::Eq,
            ComparisonOp::Neq,
            ComparisonOp::Ge,
            ComparisonOp::Gt,
        ] {
            assert_eq!(op.reverse_op().reverse_op(), op);
        }
    }

    #[test]
    fn inverse_op_is_involutive() {
        for op in [
            ComparisonOp::Lt,
            ComparisonOp::Le,
            ComparisonOp::Eq,
            ComparisonOp::Neq,
            ComparisonOp::Ge,
            ComparisonOp::Gt,
        ] {
            assert_eq!(op.inverse_op().inverse_op(), op);
        }
    }

    #[test]
    fn reverse_fixes_eq_and_neq() {
        assert_eq!(ComparisonOp::Eq.reverse_op(), ComparisonOp::Eq);
        assert_eq!(ComparisonOp::Neq.reverse_op(), ComparisonOp::Neq);
    }
}
