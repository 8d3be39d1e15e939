//! Unit composition over symbolic expressions.

use ku_core::ComponentId;
use ku_model::Expr;
use ku_units::{PhysicalUnit, UnitError, UnitResult};

const OUT_OF_RANGE: &str = "unit exponent out of range";

/// Unit of `expr`, given the unit of each referenced component.
///
/// Products, quotients and integer powers combine algebraically. Sums need
/// equal units on both sides and functions need a dimensionless argument.
/// A referenced component without a unit makes the whole expression
/// uncomposable.
pub(crate) fn compose_unit<F>(expr: &Expr, unit_of: &F) -> UnitResult<PhysicalUnit>
where
    F: Fn(ComponentId) -> Option<PhysicalUnit>,
{
    let fail = |reason: String| UnitError::Compose {
        expr: expr.to_string(),
        reason,
    };

    match expr {
        Expr::Num(_) => Ok(PhysicalUnit::dimensionless()),
        Expr::Symbol { id, name } => {
            unit_of(*id).ok_or_else(|| fail(format!("'{}' has no unit", name)))
        }
        Expr::Mul(a, b) => compose_unit(a, unit_of)?
            .checked_mul(&compose_unit(b, unit_of)?)
            .ok_or_else(|| fail(OUT_OF_RANGE.to_string())),
        Expr::Div(a, b) => compose_unit(a, unit_of)?
            .checked_div(&compose_unit(b, unit_of)?)
            .ok_or_else(|| fail(OUT_OF_RANGE.to_string())),
        Expr::Neg(a) => compose_unit(a, unit_of),
        Expr::Pow(a, n) => compose_unit(a, unit_of)?
            .checked_powi(*n)
            .ok_or_else(|| fail(OUT_OF_RANGE.to_string())),
        Expr::Add(a, b) | Expr::Sub(a, b) => {
            let left = compose_unit(a, unit_of)?;
            let right = compose_unit(b, unit_of)?;
            if left == right {
                Ok(left)
            } else {
                Err(fail(format!(
                    "operands in '{}' and '{}' cannot be added",
                    left, right
                )))
            }
        }
        Expr::Call(func, a) => {
            let arg = compose_unit(a, unit_of)?;
            if arg.is_dimensionless() {
                Ok(PhysicalUnit::dimensionless())
            } else {
                Err(fail(format!("{} of a quantity in '{}'", func.name(), arg)))
            }
        }
    }
}
