//! The model container.

use std::collections::HashMap;

use ku_core::{ComponentId, ensure_finite};

use crate::component::{
    Component, Expression, Initial, Monomer, Observable, ObservableKind, Parameter, Rule,
};
use crate::error::{ModelError, ModelResult};
use crate::expr::Expr;
use crate::order::ReactionOrder;
use crate::pattern::{ComplexPattern, MonomerPattern, RuleExpression};
use crate::validate;

/// All components of one model, in declaration order, with name lookup.
///
/// Every `add_*` method validates its references before inserting, so a
/// `Model` never holds a dangling id.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    components: Vec<Component>,
    by_name: HashMap<String, ComponentId>,
    initials: Vec<Initial>,
}

impl Model {
    /// Empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn next_id(&self) -> ComponentId {
        ComponentId::from_index(u32::try_from(self.components.len()).unwrap_or(u32::MAX))
    }

    fn push(&mut self, component: Component) -> ComponentId {
        let id = component.id();
        self.by_name.insert(component.name().to_string(), id);
        self.components.push(component);
        id
    }


    /// Declare a monomer with its binding sites.
    pub fn add_monomer(&mut self, name: &str, sites: &[&str]) -> ModelResult<ComponentId> {
        validate::unique_name(self, name)?;
        let id = self.next_id();
        Ok(self.push(Component::Monomer(Monomer {
            id,
            name: name.to_string(),
            sites: sites.iter().map(|s| s.to_string()).collect(),
        })))
    }

    /// Declare a numeric parameter; non-finite values are rejected.
    pub fn add_parameter(&mut self, name: &str, value: f64) -> ModelResult<ComponentId> {
        validate::unique_name(self, name)?;
        ensure_finite(value, "parameter value").map_err(|_| ModelError::NonFinite {
            name: name.to_string(),
            value,
        })?;
        let id = self.next_id();
        Ok(self.push(Component::Parameter(Parameter {
            id,
            name: name.to_string(),
            value,
        })))
    }

    /// Add a rule; reaction orders are inferred here, once.
    pub fn add_rule(
        &mut self,
        name: &str,
        expression: RuleExpression,
        rate_forward: ComponentId,
        rate_reverse: Option<ComponentId>,
    ) -> ModelResult<ComponentId> {
        validate::unique_name(self, name)?;
        validate::rule_direction(name, &expression, rate_reverse)?;
        validate::patterns(self, &expression.reactants)?;
        validate::patterns(self, &expression.products)?;
        validate::numeric_ref(self, rate_forward, "forward rate")?;
        if let Some(reverse) = rate_reverse {
            validate::numeric_ref(self, reverse, "reverse rate")?;
        }

        let forward_order = ReactionOrder::from_reactants(&expression.reactants);
        let reverse_order = expression
            .reversible
            .then(|| ReactionOrder::from_reactants(&expression.products));
        let id = self.next_id();
        Ok(self.push(Component::Rule(Rule {
            id,
            name: name.to_string(),
            expression,
            rate_forward,
            rate_reverse,
            forward_order,
            reverse_order,
        })))
    }

    /// Set the initial amount of a species to a parameter or expression.
    pub fn add_initial(
        &mut self,
        pattern: ComplexPattern,
        value: ComponentId,
        fixed: bool,
    ) -> ModelResult<()> {
        validate::patterns(self, std::slice::from_ref(&pattern))?;
        validate::numeric_ref(self, value, "initial value")?;
        if self.initials.iter().any(|i| i.pattern == pattern) {
            return Err(ModelError::DuplicateName {
                name: format!("Initial({})", pattern),
            });
        }
        self.initials.push(Initial {
            pattern,
            value,
            fixed,
        });
        Ok(())
    }

    /// Declare an observable summing the given patterns.
    pub fn add_observable(
        &mut self,
        name: &str,
        pattern: Vec<ComplexPattern>,
        kind: ObservableKind,
    ) -> ModelResult<ComponentId> {
        validate::unique_name(self, name)?;
        validate::patterns(self, &pattern)?;
        let id = self.next_id();
        Ok(self.push(Component::Observable(Observable {
            id,
            name: name.to_string(),
            pattern,
            kind,
        })))
    }

    /// Declare a named expression over other components.
    pub fn add_expression(&mut self, name: &str, expr: Expr) -> ModelResult<ComponentId> {
        validate::unique_name(self, name)?;
        for id in expr.symbols() {
            self.get(id)?;
        }
        let id = self.next_id();
        Ok(self.push(Component::Expression(Expression {
            id,
            name: name.to_string(),
            expr,
        })))
    }

    /// Overwrite a parameter value (unit conversion rescales through here).
    pub fn set_parameter_value(&mut self, id: ComponentId, value: f64) -> ModelResult<()> {
        let name = self.get(id)?.name().to_string();
        ensure_finite(value, "parameter value")
            .map_err(|_| ModelError::NonFinite { name, value })?;
        match self.components.get_mut(id.slot()) {
            Some(Component::Parameter(p)) => {
                p.value = value;
                Ok(())
            }
            Some(other) => Err(ModelError::WrongKind {
                id,
                role: "value update",
                expected: "parameter",
                actual: other.kind().name(),
            }),
            None => Err(ModelError::UnknownComponent {
                what: id.to_string(),
            }),
        }
    }


    /// Id of the component called `name`.
    pub fn lookup(&self, name: &str) -> Option<ComponentId> {
        self.by_name.get(name).copied()
    }

    /// Component with id `id`.
    pub fn get(&self, id: ComponentId) -> ModelResult<&Component> {
        self.components
            .get(id.slot())
            .ok_or_else(|| ModelError::UnknownComponent {
                what: id.to_string(),
            })
    }

    /// Component called `name`.
    pub fn get_by_name(&self, name: &str) -> ModelResult<&Component> {
        let id = self.lookup(name).ok_or_else(|| ModelError::UnknownComponent {
            what: name.to_string(),
        })?;
        self.get(id)
    }

    /// Parameter with id `id`; other kinds are an error.
    pub fn get_parameter(&self, id: ComponentId) -> ModelResult<&Parameter> {
        match self.get(id)? {
            Component::Parameter(p) => Ok(p),
            other => Err(wrong_kind(id, "parameter", other)),
        }
    }

    /// Rule with id `id`; other kinds are an error.
    pub fn get_rule(&self, id: ComponentId) -> ModelResult<&Rule> {
        match self.get(id)? {
            Component::Rule(r) => Ok(r),
            other => Err(wrong_kind(id, "rule", other)),
        }
    }

    /// Expression with id `id`; other kinds are an error.
    pub fn get_expression(&self, id: ComponentId) -> ModelResult<&Expression> {
        match self.get(id)? {
            Component::Expression(e) => Ok(e),
            other => Err(wrong_kind(id, "expression", other)),
        }
    }

    /// Bare pattern `Name()` for a monomer.
    pub fn pattern(&self, monomer: ComponentId) -> ModelResult<MonomerPattern> {
        match self.get(monomer)? {
            Component::Monomer(m) => Ok(MonomerPattern::new(m.id, m.name.clone())),
            other => Err(wrong_kind(monomer, "monomer", other)),
        }
    }

    /// Symbol referring to a component, for building expressions.
    pub fn symbol(&self, id: ComponentId) -> ModelResult<Expr> {
        let component = self.get(id)?;
        Ok(Expr::symbol(id, component.name()))
    }

    /// Numeric value of a parameter, or of an expression over parameters.
    pub fn value_of(&self, id: ComponentId) -> Option<f64> {
        match self.get(id).ok()? {
            Component::Parameter(p) => Some(p.value),
            Component::Expression(e) => e.expr.evaluate(&|sym| self.value_of(sym)),
            _ => None,
        }
    }

    /// All components in declaration order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Initial conditions in declaration order.
    pub fn initials(&self) -> &[Initial] {
        &self.initials
    }

    /// Parameters in declaration order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.components.iter().filter_map(|c| match c {
            Component::Parameter(p) => Some(p),
            _ => None,
        })
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.components.iter().filter_map(|c| match c {
            Component::Rule(r) => Some(r),
            _ => None,
        })
    }

    /// Observables in declaration order.
    pub fn observables(&self) -> impl Iterator<Item = &Observable> {
        self.components.iter().filter_map(|c| match c {
            Component::Observable(o) => Some(o),
            _ => None,
        })
    }

    /// Expressions in declaration order.
    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.components.iter().filter_map(|c| match c {
            Component::Expression(e) => Some(e),
            _ => None,
        })
    }
}

fn wrong_kind(id: ComponentId, expected: &'static str, actual: &Component) -> ModelError {
    ModelError::WrongKind {
        id,
        role: "lookup",
        expected,
        actual: actual.kind().name(),
    }
}
