//! Unit annotations on model components.

use std::fmt;

use ku_core::ComponentId;
use ku_model::ComponentKind;
use ku_units::PhysicalUnit;

/// Where an annotation's unit came from.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationSource {
    /// Written by the modeler.
    Declared,
    /// Filled in from the model: canonical concentration for observables,
    /// composed operand units for expressions. `issue` is set when
    /// composition failed and the unit fell back to dimensionless.
    Inferred { issue: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationStatus {
    /// The annotation in force for its component.
    Active,
    /// A later, different declaration. Recorded for the checker, never applied.
    Conflict,
}

/// One unit bound to one component.
#[derive(Debug, Clone)]
pub struct UnitAnnotation {
    pub component: ComponentId,
    pub name: String,
    pub kind: ComponentKind,
    /// Unit as declared, before any conversion.
    pub declared: PhysicalUnit,
    /// Unit in force now.
    pub unit: PhysicalUnit,
    pub source: AnnotationSource,
    pub status: AnnotationStatus,
    /// Product of all conversion factors applied to the component's value.
    pub factor: f64,
}

impl UnitAnnotation {
    /// Applied to the component, not a rejected conflict.
    pub fn is_active(&self) -> bool {
        self.status == AnnotationStatus::Active
    }

    /// Unit carries no net dimension.
    pub fn is_dimensionless(&self) -> bool {
        self.unit.is_dimensionless()
    }

    /// Unit text, or `None` for dimensionless.
    pub fn value(&self) -> Option<String> {
        (!self.is_dimensionless()).then(|| self.unit.text())
    }

    /// Does `unit` restate this annotation, either as declared or as converted?
    pub(crate) fn restates(&self, unit: &PhysicalUnit) -> bool {
        self.declared == *unit || self.unit == *unit
    }
}

impl fmt::Display for UnitAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(text) => write!(f, "Unit({}, '{}')", self.name, text),
            None => write!(f, "Unit({}, None)", self.name),
        }
    }
}
