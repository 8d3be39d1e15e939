//! Construction-time structural checks.

use ku_core::ComponentId;

use crate::component::{Component, ComponentKind};
use crate::error::{ModelError, ModelResult};
use crate::model::Model;
use crate::pattern::{ComplexPattern, RuleExpression};

/// The component must exist and hold a number: a parameter or an expression.
pub(crate) fn numeric_ref(model: &Model, id: ComponentId, role: &'static str) -> ModelResult<()> {
    let component = model.get(id)?;
    match component.kind() {
        ComponentKind::Parameter | ComponentKind::Expression => Ok(()),
        other => Err(ModelError::WrongKind {
            id,
            role,
            expected: "parameter or expression",
            actual: other.name(),
        }),
    }
}

/// Reverse rate must be present exactly when the rule is reversible.
pub(crate) fn rule_direction(
    name: &str,
    expression: &RuleExpression,
    rate_reverse: Option<ComponentId>,
) -> ModelResult<()> {
    match (expression.reversible, rate_reverse) {
        (true, None) => Err(ModelError::MissingReverseRate {
            rule: name.to_string(),
        }),
        (false, Some(_)) => Err(ModelError::UnexpectedReverseRate {
            rule: name.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Every monomer pattern must point at a monomer of this model.
pub(crate) fn patterns(model: &Model, patterns: &[ComplexPattern]) -> ModelResult<()> {
    for cp in patterns {
        for mp in &cp.monomers {
            match model.get(mp.monomer)? {
                Component::Monomer(_) => {}
                other => {
                    return Err(ModelError::WrongKind {
                        id: mp.monomer,
                        role: "monomer pattern",
                        expected: "monomer",
                        actual: other.kind().name(),
                    });
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn unique_name(model: &Model, name: &str) -> ModelResult<()> {
    if model.lookup(name).is_some() {
        return Err(ModelError::DuplicateName {
            name: name.to_string(),
        });
    }
    Ok(())
}
