use thiserror::Error;

pub type KuResult<T> = Result<T, KuError>;

/// Failures shared by every kinunits crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KuError {
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
