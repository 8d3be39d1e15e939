//! Physical-type categories used to pick canonical units and to validate
//! the role a unit plays in a model.

use std::fmt;

/// Coarse classification of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Dimensionless,
    /// Any registered concentration pattern, including molecule counts.
    Concentration,
    Time,
    Mass,
    Volume,
    /// Mass-action rate constant for a reaction consuming `order` reactants:
    /// dimension concentration^(1-order) · time^-1.
    RateConstant { order: u32 },
    /// Anything else, labelled with its physical-type name.
    Other(String),
}

impl Category {
    /// Categories whose units `SimulationUnits` rewrites to canonical ones.
    pub fn is_convertible(&self) -> bool {
        matches!(self, Self::Concentration | Self::Time)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dimensionless => write!(f, "dimensionless"),
            Self::Concentration => write!(f, "concentration"),
            Self::Time => write!(f, "time"),
            Self::Mass => write!(f, "mass"),
            Self::Volume => write!(f, "volume"),
            Self::RateConstant { order: 0 } => write!(f, "reaction rate"),
            Self::RateConstant { order: 1 } => write!(f, "frequency"),
            Self::RateConstant { order: 2 } => write!(f, "second order rate constant"),
            Self::RateConstant { order } => write!(f, "order-{} rate constant", order),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}
