//! Reaction order of a rule direction.

use std::fmt;

use crate::pattern::ComplexPattern;

/// Number of reactant complexes a rule direction consumes.
///
/// Determines the dimension a mass-action rate constant must have:
/// concentration^(1-n) · time^-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionOrder {
    Zero,
    First,
    Second,
    Higher(u32),
}

impl ReactionOrder {
    /// Order of a reaction consuming `reactants`.
    ///
    /// Each complex pattern counts once, so two copies of the same pattern
    /// (`A() + A()`) are bimolecular.
    pub fn from_reactants(reactants: &[ComplexPattern]) -> Self {
        Self::from_count(u32::try_from(reactants.len()).unwrap_or(u32::MAX))
    }

    /// Order for a number of reactant species.
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => Self::Zero,
            1 => Self::First,
            2 => Self::Second,
            n => Self::Higher(n),
        }
    }

    /// Number of reactants this order stands for.
    pub fn reactant_count(self) -> u32 {
        match self {
            Self::Zero => 0,
            Self::First => 1,
            Self::Second => 2,
            Self::Higher(n) => n,
        }
    }
}

impl fmt::Display for ReactionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reactant_count())
    }
}
