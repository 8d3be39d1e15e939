//! A model together with its unit context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use ku_core::{ComponentId, Volume};
use ku_model::{
    Component, ComponentBuilder, ComponentKind, ComplexPattern, Expr, Model, ObservableKind,
    ReactionOrder, Rule, RuleExpression,
};
use ku_units::{ConfigurationError, PhysicalUnit, UnitRegistry};

use crate::annotation::{AnnotationSource, AnnotationStatus, UnitAnnotation};
use crate::check;
use crate::compose::compose_unit;
use crate::error::{AnnotateError, AnnotateResult};
use crate::simulation::SimulationUnits;
use crate::spec::UnitSpec;

/// Result of [`UnitModel::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// First unit for the component; recorded and (if needed) converted.
    Attached,
    /// Same unit as the one already attached; nothing changed.
    Unchanged,
    /// A different unit than the one already attached; recorded as a
    /// conflict for the checker and otherwise ignored.
    Conflict,
}

/// A [`Model`] with unit annotations, a shared unit registry and an
/// optional [`SimulationUnits`] policy.
///
/// Implements [`ComponentBuilder`], so model definitions and macros written
/// against the builder protocol get unit inference and construction-time
/// warnings for free.
#[derive(Debug, Clone)]
pub struct UnitModel {
    model: Model,
    registry: Arc<UnitRegistry>,
    simulation_units: Option<SimulationUnits>,
    annotations: Vec<UnitAnnotation>,
}

impl UnitModel {
    /// Empty model using the built-in unit registry.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_registry(name, Arc::new(UnitRegistry::default()))
    }

    /// Empty model sharing `registry` with other models.
    pub fn with_registry(name: impl Into<String>, registry: Arc<UnitRegistry>) -> Self {
        Self::from_model(Model::new(name), registry)
    }

    /// Wrap an existing model; its components start without units.
    pub fn from_model(model: Model, registry: Arc<UnitRegistry>) -> Self {
        Self {
            model,
            registry,
            simulation_units: None,
            annotations: Vec::new(),
        }
    }

    /// Name of the underlying model.
    pub fn name(&self) -> &str {
        self.model.name()
    }

    /// The underlying model, read-only.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Drop the unit context and keep the plain model.
    pub fn into_model(self) -> Model {
        self.model
    }

    /// Unit registry in use by this model.
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Handle to the registry, for building further models on it.
    pub fn shared_registry(&self) -> Arc<UnitRegistry> {
        Arc::clone(&self.registry)
    }

    /// Mutable registry for this model. Clones it first if it is shared.
    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        Arc::make_mut(&mut self.registry)
    }

    /// Configure the molar <-> molecule-count equivalency for this model.
    pub fn set_molecule_volume(&mut self, value: f64, unit: &str) -> Result<Volume, ConfigurationError> {
        self.registry_mut().set_molecule_volume(value, unit)
    }


    /// Canonical units, if they have been set.
    pub fn simulation_units(&self) -> Option<&SimulationUnits> {
        self.simulation_units.as_ref()
    }

    /// Install the model's canonical units and convert every unit already
    /// attached, in declaration order.
    ///
    /// All conversions are computed before any value changes, so a failure
    /// leaves the model untouched.
    pub fn set_simulation_units(
        &mut self,
        concentration: &str,
        time: &str,
        volume: Option<&str>,
    ) -> AnnotateResult<&SimulationUnits> {
        if self.simulation_units.is_some() {
            return Err(ConfigurationError::DuplicateSimulationUnits {
                model: self.name().to_string(),
            }
            .into());
        }
        let sim = SimulationUnits::new(&self.registry, concentration, time, volume)?;

        let mut plan = Vec::new();
        for (idx, ann) in self.annotations.iter().enumerate() {
            if !ann.is_active() {
                continue;
            }
            if let Some(target) = sim.canonical_unit(&self.registry, &ann.unit) {
                let factor = self.registry.conversion_factor(&ann.unit, &target)?;
                plan.push((idx, target, factor));
            }
        }

        for (idx, target, factor) in plan {
            let component = self.annotations[idx].component;
            self.rescale(component, factor)?;
            let ann = &mut self.annotations[idx];
            tracing::debug!(
                component = %ann.name,
                from = %ann.unit,
                to = %target,
                factor,
                "retro-converted to simulation units"
            );
            ann.unit = target;
            ann.factor *= factor;
        }

        Ok(&*self.simulation_units.insert(sim))
    }


    /// Active annotation of `component`, if any.
    pub fn annotation(&self, component: ComponentId) -> Option<&UnitAnnotation> {
        self.annotations
            .iter()
            .find(|a| a.component == component && a.is_active())
    }

    fn active_index(&self, component: ComponentId) -> Option<usize> {
        self.annotations
            .iter()
            .position(|a| a.component == component && a.is_active())
    }

    /// Attach a unit to a parameter, observable or expression.
    ///
    /// With simulation units in place, concentration and time parts are
    /// converted immediately and a parameter's value is rescaled.
    pub fn attach(
        &mut self,
        component: ComponentId,
        spec: impl Into<UnitSpec>,
    ) -> AnnotateResult<AttachOutcome> {
        self.annotatable(component)?;
        let unit = self.resolve(spec.into())?;
        self.attach_resolved(component, unit, AnnotationSource::Declared)
    }

    /// Attach `spec` and convert it to `target` in one step.
    ///
    /// Simulation units, when present, take precedence over `target`.
    pub fn attach_converted(
        &mut self,
        component: ComponentId,
        spec: impl Into<UnitSpec>,
        target: &str,
    ) -> AnnotateResult<AttachOutcome> {
        self.annotatable(component)?;
        let unit = self.resolve(spec.into())?;
        let convert = self.simulation_units.is_none() && self.annotation(component).is_none();
        if convert {
            let target_unit = self.registry.parse(target)?;
            if !unit.is_dimensionless() {
                self.registry.conversion_factor(&unit, &target_unit)?;
            }
        } else if self.simulation_units.is_some() {
            tracing::debug!(target, "simulation units override explicit conversion target");
        }

        let outcome = self.attach_resolved(component, unit, AnnotationSource::Declared)?;
        if convert && outcome == AttachOutcome::Attached {
            self.convert(component, target)?;
        }
        Ok(outcome)
    }

    /// Convert the component's unit to `target`, rescaling its value.
    ///
    /// Returns the factor applied. Dimensionless components are left alone.
    pub fn convert(&mut self, component: ComponentId, target: &str) -> AnnotateResult<f64> {
        let idx = self.active_index(component).ok_or_else(|| AnnotateError::NotAnnotated {
            component: self
                .model
                .get(component)
                .map(|c| c.name().to_string())
                .unwrap_or_else(|_| component.to_string()),
        })?;
        if self.annotations[idx].is_dimensionless() {
            tracing::debug!(component = %self.annotations[idx].name, "dimensionless; conversion skipped");
            return Ok(1.0);
        }

        let target_unit = self.registry.parse(target)?;
        let factor = self
            .registry
            .conversion_factor(&self.annotations[idx].unit, &target_unit)?;
        self.rescale(component, factor)?;

        let ann = &mut self.annotations[idx];
        tracing::debug!(component = %ann.name, from = %ann.unit, to = %target_unit, factor, "converted");
        ann.unit = target_unit;
        ann.factor *= factor;
        Ok(factor)
    }

    fn annotatable(&self, component: ComponentId) -> AnnotateResult<()> {
        let c = self.model.get(component)?;
        match c.kind() {
            ComponentKind::Parameter | ComponentKind::Observable | ComponentKind::Expression => Ok(()),
            other => Err(AnnotateError::NotAnnotatable {
                component: c.name().to_string(),
                kind: other.name(),
            }),
        }
    }

    fn resolve(&self, spec: UnitSpec) -> AnnotateResult<PhysicalUnit> {
        Ok(match spec {
            UnitSpec::Text(text) => self.registry.parse(&text)?,
            UnitSpec::Dimensionless => PhysicalUnit::dimensionless(),
            UnitSpec::Derived(expr) => {
                compose_unit(&expr, &|id| self.annotation(id).map(|a| a.unit.clone()))?
            }
        })
    }

    fn attach_resolved(
        &mut self,
        component: ComponentId,
        unit: PhysicalUnit,
        source: AnnotationSource,
    ) -> AnnotateResult<AttachOutcome> {
        let c = self.model.get(component)?;
        let (name, kind) = (c.name().to_string(), c.kind());

        if let Some(existing) = self.annotation(component) {
            if existing.restates(&unit) {
                tracing::debug!(component = %name, unit = %unit, "unit re-attached; unchanged");
                return Ok(AttachOutcome::Unchanged);
            }
            tracing::warn!(
                target: "ku_annotate::model",
                component = %name,
                existing = %existing.unit,
                declared = %unit,
                "component already has a unit; conflicting declaration recorded"
            );
            self.annotations.push(UnitAnnotation {
                component,
                name,
                kind,
                declared: unit.clone(),
                unit,
                source,
                status: AnnotationStatus::Conflict,
                factor: 1.0,
            });
            return Ok(AttachOutcome::Conflict);
        }

        let canonical = self
            .simulation_units
            .as_ref()
            .and_then(|sim| sim.canonical_unit(&self.registry, &unit));
        let (current, factor) = match canonical {
            Some(target) => {
                let factor = self.registry.conversion_factor(&unit, &target)?;
                tracing::debug!(component = %name, from = %unit, to = %target, factor, "converted to simulation units");
                (target, factor)
            }
            None => (unit.clone(), 1.0),
        };
        self.rescale(component, factor)?;

        self.annotations.push(UnitAnnotation {
            component,
            name,
            kind,
            declared: unit,
            unit: current,
            source,
            status: AnnotationStatus::Active,
            factor,
        });
        Ok(AttachOutcome::Attached)
    }

    /// Multiply a parameter's value by `factor`. Other kinds carry no value.
    fn rescale(&mut self, component: ComponentId, factor: f64) -> AnnotateResult<()> {
        let value = match self.model.get_parameter(component) {
            Ok(p) => p.value * factor,
            Err(_) => return Ok(()),
        };
        self.model.set_parameter_value(component, value)?;
        Ok(())
    }


    /// Declare a parameter and attach `unit` to it. The unit is resolved
    /// first, so an unparsable unit leaves the model unchanged.
    pub fn parameter_with_unit(
        &mut self,
        name: &str,
        value: f64,
        unit: impl Into<UnitSpec>,
    ) -> AnnotateResult<ComponentId> {
        let unit = self.resolve(unit.into())?;
        let id = self.model.add_parameter(name, value)?;
        self.attach_resolved(id, unit, AnnotationSource::Declared)?;
        Ok(id)
    }

    /// Declare an observable with an explicit unit.
    pub fn observable_with_unit(
        &mut self,
        name: &str,
        pattern: Vec<ComplexPattern>,
        unit: impl Into<UnitSpec>,
    ) -> AnnotateResult<ComponentId> {
        let unit = self.resolve(unit.into())?;
        let id = self.model.add_observable(name, pattern, ObservableKind::Molecules)?;
        self.attach_resolved(id, unit, AnnotationSource::Declared)?;
        Ok(id)
    }

    /// Declare an expression with an explicit unit instead of a composed one.
    pub fn expression_with_unit(
        &mut self,
        name: &str,
        expr: Expr,
        unit: impl Into<UnitSpec>,
    ) -> AnnotateResult<ComponentId> {
        let unit = self.resolve(unit.into())?;
        let id = self.model.add_expression(name, expr)?;
        self.attach_resolved(id, unit, AnnotationSource::Declared)?;
        Ok(id)
    }

    /// Declare an initial whose amount is held constant during simulation.
    pub fn initial_fixed(&mut self, pattern: ComplexPattern, value: ComponentId) -> AnnotateResult<()> {
        self.add_initial(pattern, value, true)
    }

    fn add_initial(&mut self, pattern: ComplexPattern, value: ComponentId, fixed: bool) -> AnnotateResult<()> {
        self.model.add_initial(pattern, value, fixed)?;
        if let Some(initial) = self.model.initials().last()
            && let Some(finding) = check::initial_finding(self, initial)
        {
            check::warn_construction(&finding);
        }
        Ok(())
    }

    /// Run a macro (or any builder-generic helper) and report which
    /// components it created.
    pub fn apply_macro<T, F>(&mut self, build: F) -> AnnotateResult<(T, Vec<ComponentId>)>
    where
        F: FnOnce(&mut Self) -> AnnotateResult<T>,
    {
        let before = self.model.components().len();
        let out = build(self)?;
        let created: Vec<ComponentId> = self.model.components()[before..]
            .iter()
            .map(Component::id)
            .collect();
        tracing::debug!(model = %self.name(), created = created.len(), "macro applied");
        Ok((out, created))
    }


    /// Every annotation, conflicts included, in declaration order.
    pub fn units(&self) -> &[UnitAnnotation] {
        &self.annotations
    }

    /// Component name to unit text, for active annotations.
    pub fn unit_map(&self) -> BTreeMap<String, String> {
        self.annotations
            .iter()
            .filter(|a| a.is_active())
            .map(|a| (a.name.clone(), a.unit.text()))
            .collect()
    }

    /// Each rule with its forward and (if reversible) reverse order.
    pub fn reaction_orders(&self) -> Vec<(&Rule, ReactionOrder, Option<ReactionOrder>)> {
        self.model
            .rules()
            .map(|r| (r, r.forward_order, r.reverse_order))
            .collect()
    }

    /// Current numeric value of a parameter or expression.
    pub fn value(&self, component: ComponentId) -> Option<f64> {
        self.model.value_of(component)
    }

    /// `Parameter('k', 0.1), unit=[1/s]` style rendering.
    pub fn describe(&self, component: ComponentId) -> AnnotateResult<String> {
        let c = self.model.get(component)?;
        Ok(match self.annotation(component) {
            Some(ann) => format!(
                "{}, unit=[{}]",
                c,
                ann.value().unwrap_or_else(|| "None".to_string())
            ),
            None => c.to_string(),
        })
    }
}

impl fmt::Display for UnitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Model '{}'", self.name())?;
        if let Some(sim) = &self.simulation_units {
            writeln!(f, "  {}", sim)?;
        }
        for c in self.model.components() {
            match self.describe(c.id()) {
                Ok(text) => writeln!(f, "  {}", text)?,
                Err(_) => writeln!(f, "  {}", c)?,
            }
        }
        for initial in self.model.initials() {
            let value = self
                .model
                .get(initial.value)
                .map(|c| c.name().to_string())
                .unwrap_or_default();
            writeln!(f, "  Initial({}, {})", initial.pattern, value)?;
        }
        Ok(())
    }
}

impl ComponentBuilder for UnitModel {
    type Error = AnnotateError;

    fn model(&self) -> &Model {
        &self.model
    }

    fn monomer(&mut self, name: &str, sites: &[&str]) -> AnnotateResult<ComponentId> {
        Ok(self.model.add_monomer(name, sites)?)
    }

    fn parameter(&mut self, name: &str, value: f64) -> AnnotateResult<ComponentId> {
        Ok(self.model.add_parameter(name, value)?)
    }

    /// Adds the rule, then warns about rate constants that do not fit the
    /// rule's reaction orders.
    fn rule(
        &mut self,
        name: &str,
        expression: RuleExpression,
        rate_forward: ComponentId,
        rate_reverse: Option<ComponentId>,
    ) -> AnnotateResult<ComponentId> {
        let id = self
            .model
            .add_rule(name, expression, rate_forward, rate_reverse)?;
        let rule = self.model.get_rule(id)?;
        for finding in check::rule_findings(self, rule) {
            check::warn_construction(&finding);
        }
        Ok(id)
    }

    /// Adds the initial, then warns if its value is not a concentration.
    fn initial(&mut self, pattern: ComplexPattern, value: ComponentId) -> AnnotateResult<()> {
        self.add_initial(pattern, value, false)
    }

    /// Adds the observable; with simulation units it gets the canonical
    /// concentration unit.
    fn observable(&mut self, name: &str, pattern: Vec<ComplexPattern>) -> AnnotateResult<ComponentId> {
        let id = self.model.add_observable(name, pattern, ObservableKind::Molecules)?;
        if let Some(sim) = &self.simulation_units {
            let unit = sim.concentration_unit().clone();
            self.attach_resolved(id, unit, AnnotationSource::Inferred { issue: None })?;
        }
        Ok(id)
    }

    /// Adds the expression; with simulation units its unit is composed from
    /// its operands, falling back to dimensionless with a warning.
    fn expression(&mut self, name: &str, expr: Expr) -> AnnotateResult<ComponentId> {
        let composed = self
            .simulation_units
            .is_some()
            .then(|| compose_unit(&expr, &|id| self.annotation(id).map(|a| a.unit.clone())));
        let id = self.model.add_expression(name, expr)?;

        match composed {
            Some(Ok(unit)) => {
                self.attach_resolved(id, unit, AnnotationSource::Inferred { issue: None })?;
            }
            Some(Err(err)) => {
                let source = AnnotationSource::Inferred {
                    issue: Some(err.to_string()),
                };
                self.attach_resolved(id, PhysicalUnit::dimensionless(), source)?;
                if let Some(finding) = self.annotation(id).and_then(check::expression_finding) {
                    check::warn_construction(&finding);
                }
            }
            None => {}
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restating_the_declared_unit_after_conversion_is_unchanged() {
        let mut m = UnitModel::new("t");
        m.set_simulation_units("uM", "s", None).unwrap();
        let k = m.parameter_with_unit("k", 60.0, "1/min").unwrap();
        assert_eq!(m.attach(k, "1/min").unwrap(), AttachOutcome::Unchanged);
        assert_eq!(m.attach(k, "Hz").unwrap(), AttachOutcome::Unchanged);
        assert_eq!(m.attach(k, "1/h").unwrap(), AttachOutcome::Conflict);
        assert_eq!(m.unit_map()["k"], "1/s");
    }

    #[test]
    fn factor_accumulates_over_conversions() {
        let mut m = UnitModel::new("t");
        let a = m.parameter_with_unit("A_0", 1.0, "mM").unwrap();
        m.convert(a, "uM").unwrap();
        m.set_simulation_units("nM", "s", None).unwrap();
        let ann = m.annotation(a).unwrap();
        assert!((ann.factor - 1e6).abs() < 1e-6);
        assert_eq!(ann.declared.text(), "mM");
        assert!((m.value(a).unwrap() - 1e6).abs() < 1e-6);
    }

    #[test]
    fn registry_is_cloned_only_when_shared() {
        let mut m = UnitModel::new("t");
        let before = Arc::as_ptr(&m.registry);
        m.registry_mut().add_concentration_pattern("cell^-1").unwrap();
        assert_eq!(Arc::as_ptr(&m.registry), before);

        let shared = m.shared_registry();
        m.registry_mut().add_concentration_pattern("m^-2").unwrap();
        assert_ne!(Arc::as_ptr(&m.registry), Arc::as_ptr(&shared));
    }

    #[test]
    fn display_lists_components_with_units() {
        let mut m = UnitModel::new("shown");
        m.set_simulation_units("uM", "s", None).unwrap();
        let a = m.monomer("A", &[]).unwrap();
        let p = m.parameter_with_unit("A_0", 5.0, "uM").unwrap();
        let pa = m.pattern(a).unwrap();
        m.initial(pa.into(), p).unwrap();
        let text = m.to_string();
        assert!(text.starts_with("Model 'shown'\n  SimulationUnits(concentration='uM', time='s')\n"));
        assert!(text.contains("Parameter('A_0', 5.0), unit=[uM]"));
        assert!(text.contains("Initial(A(), A_0)"));
    }
}
