//! Parameterized action names and the pattern-variable substitution used to ground them.

use crate::constants::VAR_PREFIX;

/// A parameterized name `op(args)`. An argument whose first character is [`VAR_PREFIX`] is a
/// pattern variable; a constraint's activation/target descriptors carry `ActionName`s with
/// pattern variables, matched positionally against the concrete names of plan actions.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ActionName {
    pub op: String,
    pub args: Vec<String>,
}

impl ActionName {
    pub fn new(op: impl Into<String>, args: Vec<String>) -> ActionName {
        ActionName { op: op.into(), args }
    }

    pub fn is_pattern_var(arg: &str) -> bool {
        arg.starts_with(VAR_PREFIX)
    }

    /// True if every argument is a literal (no pattern variables).
    pub fn is_ground(&self) -> bool {
        self.args.iter().all(|a| !Self::is_pattern_var(a))
    }

    /// Substitutes this name's pattern-variable arguments, in order, with `concrete_args`,
    /// leaving literal arguments untouched. Consumes exactly as many entries of `concrete_args`
    /// as there are pattern variables in `self`.
    ///
    /// # Panics
    /// Panics if `concrete_args` has fewer entries than `self` has pattern variables.
    pub fn ground(&self, concrete_args: &[String]) -> ActionName {
        let mut supply = concrete_args.iter();
        let args = self
            .args
            .iter()
            .map(|a| {
                if Self::is_pattern_var(a) {
                    supply.next().expect("not enough concrete arguments to ground all pattern variables").clone()
                } else {
                    a.clone()
                }
            })
            .collect();
        ActionName { op: self.op.clone(), args }
    }

    /// True if `concrete` could result from grounding `self`: same op, same arity, and every
    /// literal argument of `self` equals the corresponding argument of `concrete`.
    pub fn matches(&self, concrete: &ActionName) -> bool {
        self.op == concrete.op
            && self.args.len() == concrete.args.len()
            && self
                .args
                .iter()
                .zip(concrete.args.iter())
                .all(|(pattern, actual)| Self::is_pattern_var(pattern) || pattern == actual)
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.op, self.args.join(", "))
    }
}
