//! The component-construction protocol.
//!
//! Macros and model-definition code build against `ComponentBuilder`
//! rather than a concrete container, so a wrapper that adds behaviour
//! (unit checks, logging) sees every component a macro creates.

use ku_core::ComponentId;

use crate::component::ObservableKind;
use crate::error::ModelError;
use crate::expr::Expr;
use crate::model::Model;
use crate::pattern::{ComplexPattern, MonomerPattern, RuleExpression};

pub trait ComponentBuilder {
    type Error: From<ModelError>;

    /// The model built so far.
    fn model(&self) -> &Model;

    fn monomer(&mut self, name: &str, sites: &[&str]) -> Result<ComponentId, Self::Error>;

    fn parameter(&mut self, name: &str, value: f64) -> Result<ComponentId, Self::Error>;

    fn rule(
        &mut self,
        name: &str,
        expression: RuleExpression,
        rate_forward: ComponentId,
        rate_reverse: Option<ComponentId>,
    ) -> Result<ComponentId, Self::Error>;

    fn initial(&mut self, pattern: ComplexPattern, value: ComponentId) -> Result<(), Self::Error>;

    fn observable(
        &mut self,
        name: &str,
        pattern: Vec<ComplexPattern>,
    ) -> Result<ComponentId, Self::Error>;

    fn expression(&mut self, name: &str, expr: Expr) -> Result<ComponentId, Self::Error>;

    fn lookup(&self, name: &str) -> Option<ComponentId> {
        self.model().lookup(name)
    }

    fn pattern(&self, monomer: ComponentId) -> Result<MonomerPattern, Self::Error> {
        Ok(self.model().pattern(monomer)?)
    }

    fn symbol(&self, id: ComponentId) -> Result<Expr, Self::Error> {
        Ok(self.model().symbol(id)?)
    }
}

impl ComponentBuilder for Model {
    type Error = ModelError;

    fn model(&self) -> &Model {
        self
    }

    fn monomer(&mut self, name: &str, sites: &[&str]) -> Result<ComponentId, ModelError> {
        self.add_monomer(name, sites)
    }

    fn parameter(&mut self, name: &str, value: f64) -> Result<ComponentId, ModelError> {
        self.add_parameter(name, value)
    }

    fn rule(
        &mut self,
        name: &str,
        expression: RuleExpression,
        rate_forward: ComponentId,
        rate_reverse: Option<ComponentId>,
    ) -> Result<ComponentId, ModelError> {
        self.add_rule(name, expression, rate_forward, rate_reverse)
    }

    fn initial(&mut self, pattern: ComplexPattern, value: ComponentId) -> Result<(), ModelError> {
        self.add_initial(pattern, value, false)
    }

    fn observable(
        &mut self,
        name: &str,
        pattern: Vec<ComplexPattern>,
    ) -> Result<ComponentId, ModelError> {
        self.add_observable(name, pattern, ObservableKind::Molecules)
    }

    fn expression(&mut self, name: &str, expr: Expr) -> Result<ComponentId, ModelError> {
        self.add_expression(name, expr)
    }
}
