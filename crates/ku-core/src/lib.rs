//! ku-core: shared foundation for kinunits.
//!
//! Contains:
//! - units (uom quantities for amounts, concentrations and volumes, plus Avogadro)
//! - numeric (tolerances and scale comparison)
//! - ids (component handles in declaration order)
//! - error (shared error type)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{KuError, KuResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
