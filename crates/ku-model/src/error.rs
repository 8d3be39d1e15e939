//! Model construction errors.

use ku_core::ComponentId;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Structural errors raised while defining a model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A component (or an initial for the same pattern) already exists.
    #[error("Duplicate component name '{name}'")]
    DuplicateName { name: String },

    /// Lookup by name or id found nothing.
    #[error("No component named '{what}' in model")]
    UnknownComponent { what: String },

    /// The referenced component has the wrong kind for its role.
    #[error("Component {id} is a {actual}, but {role} requires a {expected}")]
    WrongKind {
        id: ComponentId,
        role: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    /// Reversible rule declared without a reverse rate.
    #[error("Reversible rule '{rule}' needs a reverse rate")]
    MissingReverseRate { rule: String },

    /// Reverse rate given for an irreversible rule.
    #[error("Reverse rate specified for rule '{rule}', but its rule expression is not reversible")]
    UnexpectedReverseRate { rule: String },

    /// A parameter value was NaN or infinite.
    #[error("Parameter '{name}' has non-finite value {value}")]
    NonFinite { name: String, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_component() {
        let err = ModelError::MissingReverseRate {
            rule: "bind".into(),
        };
        assert!(err.to_string().contains("'bind'"));

        let err = ModelError::WrongKind {
            id: ComponentId::from_index(3),
            role: "rule rate",
            expected: "parameter or expression",
            actual: "monomer",
        };
        assert_eq!(
            err.to_string(),
            "Component #3 is a monomer, but rule rate requires a parameter or expression"
        );
    }
}
