//! Unit parsing, conversion, and registry configuration errors.

use thiserror::Error;

/// Result type for unit operations.
pub type UnitResult<T> = Result<T, UnitError>;

/// Errors raised while parsing, composing, or converting units.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Input text is not a well-formed unit expression.
    #[error("Unrecognizable unit pattern '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// A symbol in the expression is not defined in the registry.
    #[error("Unknown unit '{symbol}'")]
    UnknownUnit { symbol: String },

    /// The two units have different dimensions and no equivalency bridges them.
    #[error("Unable to convert units {from} to {to}")]
    Incompatible { from: String, to: String },

    /// A molar <-> molecule conversion was requested without a molecule volume.
    #[error("Converting {from} to {to} needs the '{equivalency}' equivalency; configure it first")]
    NoEquivalency {
        from: String,
        to: String,
        equivalency: &'static str,
    },

    /// A unit could not be composed from an expression's operands.
    #[error("Cannot compose a unit for '{expr}': {reason}")]
    Compose { expr: String, reason: String },

    /// Arithmetic produced a non-finite scale or value.
    #[error("Non-finite value for {what}")]
    NonFinite { what: &'static str },
}

/// Errors raised by invalid global unit setup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Molecule volume must be positive and finite, got {value}")]
    NonPositiveVolume { value: f64 },

    #[error("Unit '{unit}' is not a volume unit")]
    NotAVolume { unit: String },

    #[error("{role} unit pattern '{unit}' isn't a recognized {expected} pattern")]
    WrongCategory {
        role: &'static str,
        unit: String,
        expected: &'static str,
    },

    #[error("SimulationUnits already defined for model '{model}'")]
    DuplicateSimulationUnits { model: String },

    #[error("Unit '{symbol}' is already defined")]
    DuplicateDefinition { symbol: String },

    #[error(transparent)]
    Unit(#[from] UnitError),
}
