//! ku-annotate: physical units for rule-based kinetic models.
//!
//! Provides:
//! - `UnitModel`: a model plus its unit registry, annotations and
//!   simulation-unit policy
//! - Unit-aware component constructors (through `ComponentBuilder`)
//! - Automatic conversion to model-wide `SimulationUnits`
//! - `check`: advisory consistency findings, logged with `tracing`
//! - `units`: scoped model definition followed by a check
//!
//! # Example
//!
//! ```
//! use ku_annotate::{UnitModel, check};
//!
//! let mut model = UnitModel::new("degradation");
//! model.set_simulation_units("uM", "s", None).unwrap();
//! let protein_0 = model.parameter_with_unit("protein_0", 500.0, "nM").unwrap();
//!
//! assert!((model.value(protein_0).unwrap() - 0.5).abs() < 1e-12);
//! assert_eq!(model.unit_map()["protein_0"], "uM");
//! assert!(check(&model).is_clean());
//! ```

pub mod activate;
pub mod annotation;
pub mod check;
pub(crate) mod compose;
pub mod error;
pub mod model;
pub mod simulation;
pub mod spec;

pub use activate::{IntoUnitModel, Scoped, units};
pub use annotation::{AnnotationSource, AnnotationStatus, UnitAnnotation};
pub use check::{CheckReport, CheckSummary, Finding, FindingKind, check};
pub use error::{AnnotateError, AnnotateResult};
pub use ku_model::ComponentBuilder;
pub use model::{AttachOutcome, UnitModel};
pub use simulation::SimulationUnits;
pub use spec::UnitSpec;
