//! Turning plain models into unit-aware ones, and scoped definition with a
//! guaranteed consistency check.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use ku_model::Model;
use ku_units::UnitRegistry;

use crate::check::{CheckReport, check};
use crate::error::AnnotateResult;
use crate::model::UnitModel;

/// Conversion into a [`UnitModel`]. Unitizing a `UnitModel` returns it as is.
pub trait IntoUnitModel {
    fn unitize(self) -> UnitModel;
}

impl IntoUnitModel for Model {
    fn unitize(self) -> UnitModel {
        UnitModel::from_model(self, Arc::new(UnitRegistry::default()))
    }
}

impl IntoUnitModel for UnitModel {
    fn unitize(self) -> UnitModel {
        self
    }
}

/// What a [`units`] scope leaves behind.
#[derive(Debug)]
pub struct Scoped<T> {
    pub model: UnitModel,
    pub result: AnnotateResult<T>,
    pub report: CheckReport,
}

/// Unitize `model`, run `define` on it, then check it.
///
/// The check runs whether `define` returns an error or panics; a panic is
/// resumed after the check's warnings have been emitted.
pub fn units<M, T, F>(model: M, define: F) -> Scoped<T>
where
    M: IntoUnitModel,
    F: FnOnce(&mut UnitModel) -> AnnotateResult<T>,
{
    let mut model = model.unitize();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| define(&mut model)));
    let report = check(&model);
    match outcome {
        Ok(result) => Scoped {
            model,
            result,
            report,
        },
        Err(payload) => panic::resume_unwind(payload),
    }
}
