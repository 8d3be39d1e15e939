//! Whole-model unit consistency checking.
//!
//! [`check`] never mutates and never fails: every finding is emitted as a
//! `tracing` warning and collected into a [`CheckReport`].

use ku_core::ComponentId;
use ku_model::{ComponentKind, Initial, ReactionOrder, Rule};
use ku_units::Category;
use serde::Serialize;

use crate::annotation::{AnnotationSource, UnitAnnotation};
use crate::model::UnitModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// A component was given a second, different unit.
    DuplicateUnit,
    /// Two components of the same category use different units.
    InconsistentUnits,
    /// A parameter (or a reversible rule's rate) has no unit.
    MissingUnit,
    /// A rate constant's unit does not fit its reaction order.
    RateOrderMismatch,
    /// An initial amount or observable whose unit is not a concentration.
    NotAConcentration,
    /// An expression whose unit could not be composed from its operands.
    UncomposableExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub component: String,
    pub message: String,
}

/// Counts per finding kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub duplicate_units: usize,
    pub inconsistent_units: usize,
    pub missing_units: usize,
    pub rate_order_mismatches: usize,
    pub not_a_concentration: usize,
    pub uncomposable_expressions: usize,
}

impl CheckSummary {
    fn slot(&mut self, kind: FindingKind) -> &mut usize {
        match kind {
            FindingKind::DuplicateUnit => &mut self.duplicate_units,
            FindingKind::InconsistentUnits => &mut self.inconsistent_units,
            FindingKind::MissingUnit => &mut self.missing_units,
            FindingKind::RateOrderMismatch => &mut self.rate_order_mismatches,
            FindingKind::NotAConcentration => &mut self.not_a_concentration,
            FindingKind::UncomposableExpression => &mut self.uncomposable_expressions,
        }
    }

    /// Findings of `kind`.
    pub fn count(&self, kind: FindingKind) -> usize {
        match kind {
            FindingKind::DuplicateUnit => self.duplicate_units,
            FindingKind::InconsistentUnits => self.inconsistent_units,
            FindingKind::MissingUnit => self.missing_units,
            FindingKind::RateOrderMismatch => self.rate_order_mismatches,
            FindingKind::NotAConcentration => self.not_a_concentration,
            FindingKind::UncomposableExpression => self.uncomposable_expressions,
        }
    }

    /// Findings of every kind.
    pub fn total(&self) -> usize {
        self.duplicate_units
            + self.inconsistent_units
            + self.missing_units
            + self.rate_order_mismatches
            + self.not_a_concentration
            + self.uncomposable_expressions
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub findings: Vec<Finding>,
    pub summary: CheckSummary,
}

impl CheckReport {
    fn push(&mut self, finding: Finding) {
        *self.summary.slot(finding.kind) += 1;
        self.findings.push(finding);
    }

    /// Findings of `kind`.
    pub fn count(&self, kind: FindingKind) -> usize {
        self.summary.count(kind)
    }

    /// No findings at all.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings of `kind`, in report order.
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }
}

/// Check `model` for duplicate, inconsistent and missing units, rate
/// constants that do not fit their rule, and non-concentration initials.
pub fn check(model: &UnitModel) -> CheckReport {
    let mut report = CheckReport::default();
    duplicate_units(model, &mut report);
    inconsistent_units(model, &mut report);
    missing_units(model, &mut report);

    for rule in model.model().rules() {
        for finding in rule_findings(model, rule) {
            if finding.kind != FindingKind::MissingUnit {
                report.push(finding);
            }
        }
    }
    for initial in model.model().initials() {
        if let Some(finding) = initial_finding(model, initial) {
            report.push(finding);
        }
    }
    for ann in model.units().iter().filter(|a| a.is_active()) {
        if let Some(finding) = observable_finding(model, ann) {
            report.push(finding);
        }
        if let Some(finding) = expression_finding(ann) {
            report.push(finding);
        }
    }

    for finding in &report.findings {
        tracing::warn!(
            target: "ku_annotate::check",
            component = %finding.component,
            kind = ?finding.kind,
            "{}",
            finding.message
        );
    }
    report
}

fn duplicate_units(model: &UnitModel, report: &mut CheckReport) {
    for ann in model.units().iter().filter(|a| !a.is_active()) {
        let active = model
            .annotation(ann.component)
            .map(|a| a.unit.text())
            .unwrap_or_default();
        report.push(Finding {
            kind: FindingKind::DuplicateUnit,
            component: ann.name.clone(),
            message: format!(
                "{} '{}' has been assigned multiple units: '{}' is in force, '{}' was ignored",
                ann.kind,
                ann.name,
                active,
                ann.unit.text()
            ),
        });
    }
}

fn inconsistent_units(model: &UnitModel, report: &mut CheckReport) {
    let registry = model.registry();
    let mut groups: Vec<(Category, Vec<&UnitAnnotation>)> = Vec::new();
    for ann in model.units().iter().filter(|a| a.is_active()) {
        let category = registry.categorize(&ann.unit);
        match groups.iter_mut().find(|(c, _)| *c == category) {
            Some((_, members)) => members.push(ann),
            None => groups.push((category, vec![ann])),
        }
    }

    for (category, members) in &groups {
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if a.unit != b.unit {
                    report.push(Finding {
                        kind: FindingKind::InconsistentUnits,
                        component: b.name.clone(),
                        message: format!(
                            "Units '{}' for {} '{}' and '{}' for {} '{}' of unit-type '{}' do not match",
                            a.unit.text(),
                            a.kind,
                            a.name,
                            b.unit.text(),
                            b.kind,
                            b.name,
                            category
                        ),
                    });
                }
            }
        }
    }
}

/// Unannotated parameters, then unannotated rates of half-annotated
/// reversible rules; each component at most once.
fn missing_units(model: &UnitModel, report: &mut CheckReport) {
    let mut seen: Vec<String> = Vec::new();
    for p in model.model().parameters() {
        if model.annotation(p.id).is_none() {
            seen.push(p.name.clone());
            report.push(Finding {
                kind: FindingKind::MissingUnit,
                component: p.name.clone(),
                message: format!("Parameter '{}' hasn't been assigned any units", p.name),
            });
        }
    }
    for rule in model.model().rules() {
        for finding in rule_findings(model, rule) {
            if finding.kind == FindingKind::MissingUnit && !seen.contains(&finding.component) {
                seen.push(finding.component.clone());
                report.push(finding);
            }
        }
    }
}

/// Rate-constant findings for one rule: order mismatches per direction and,
/// for reversible rules, a rate left without a unit while the other has one.
pub(crate) fn rule_findings(model: &UnitModel, rule: &Rule) -> Vec<Finding> {
    let mut out = Vec::new();

    if let (Some(reverse), Some(_)) = (rule.rate_reverse, rule.reverse_order) {
        let forward_unit = model.annotation(rule.rate_forward);
        let reverse_unit = model.annotation(reverse);
        let half = match (forward_unit, reverse_unit) {
            (Some(has), None) => Some((has, reverse)),
            (None, Some(has)) => Some((has, rule.rate_forward)),
            _ => None,
        };
        if let Some((has, lacking)) = half {
            let lacking_name = component_name(model, lacking);
            out.push(Finding {
                kind: FindingKind::MissingUnit,
                component: lacking_name.clone(),
                message: format!(
                    "Both rate parameters of reversible rule '{}' need units: '{}' has '{}', '{}' has none",
                    rule.name,
                    has.name,
                    has.unit.text(),
                    lacking_name
                ),
            });
        }
    }

    out.extend(rate_mismatch(model, rule, "forward", rule.rate_forward, rule.forward_order));
    if let (Some(reverse), Some(order)) = (rule.rate_reverse, rule.reverse_order) {
        out.extend(rate_mismatch(model, rule, "reverse", reverse, order));
    }
    out
}

fn rate_mismatch(
    model: &UnitModel,
    rule: &Rule,
    direction: &str,
    rate: ComponentId,
    order: ReactionOrder,
) -> Option<Finding> {
    let ann = model.annotation(rate)?;
    if model
        .registry()
        .is_rate_constant_for(&ann.unit, order.reactant_count())
    {
        return None;
    }
    Some(Finding {
        kind: FindingKind::RateOrderMismatch,
        component: ann.name.clone(),
        message: format!(
            "The rate parameter '{}' with units '{}' for the {} reaction of rule '{}' with order {} doesn't have the correct unit pattern for that reaction order",
            ann.name,
            ann.unit.text(),
            direction,
            rule.name,
            order
        ),
    })
}

pub(crate) fn initial_finding(model: &UnitModel, initial: &Initial) -> Option<Finding> {
    let ann = model.annotation(initial.value)?;
    if model.registry().is_concentration(&ann.unit) {
        return None;
    }
    Some(Finding {
        kind: FindingKind::NotAConcentration,
        component: ann.name.clone(),
        message: format!(
            "{} '{}' with units '{}' passed to Initial({}) doesn't have a recognized concentration unit pattern",
            ann.kind,
            ann.name,
            ann.unit.text(),
            initial.pattern
        ),
    })
}

/// Explicitly declared observable units must be concentrations.
fn observable_finding(model: &UnitModel, ann: &UnitAnnotation) -> Option<Finding> {
    if ann.kind != ComponentKind::Observable
        || ann.source != AnnotationSource::Declared
        || model.registry().is_concentration(&ann.unit)
    {
        return None;
    }
    Some(Finding {
        kind: FindingKind::NotAConcentration,
        component: ann.name.clone(),
        message: format!(
            "Observable '{}' must be assigned a concentration or amount unit pattern; '{}' isn't one",
            ann.name,
            ann.unit.text()
        ),
    })
}

pub(crate) fn expression_finding(ann: &UnitAnnotation) -> Option<Finding> {
    let AnnotationSource::Inferred { issue: Some(issue) } = &ann.source else {
        return None;
    };
    Some(Finding {
        kind: FindingKind::UncomposableExpression,
        component: ann.name.clone(),
        message: format!("Expression '{}' treated as dimensionless: {}", ann.name, issue),
    })
}

fn component_name(model: &UnitModel, id: ComponentId) -> String {
    model
        .model()
        .get(id)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|_| id.to_string())
}

/// Construction-time channel for the same findings.
pub(crate) fn warn_construction(finding: &Finding) {
    tracing::warn!(
        target: "ku_annotate::model",
        component = %finding.component,
        kind = ?finding.kind,
        "{}",
        finding.message
    );
}
