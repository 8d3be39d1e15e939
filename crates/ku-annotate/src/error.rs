//! Errors for unit-annotated model construction.

use ku_model::ModelError;
use ku_units::{ConfigurationError, UnitError};
use thiserror::Error;

pub type AnnotateResult<T> = Result<T, AnnotateError>;

/// Fatal errors. Consistency findings are never reported through this type;
/// see [`crate::check`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnnotateError {
    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Units only attach to parameters, observables and expressions.
    #[error("Unit can't be assigned to {kind} '{component}'")]
    NotAnnotatable {
        component: String,
        kind: &'static str,
    },

    /// `convert` on a component that has no unit.
    #[error("Component '{component}' has no unit to convert")]
    NotAnnotated { component: String },
}
