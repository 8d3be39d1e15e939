//! What a caller may hand to `attach`.

use ku_model::Expr;

/// A unit declaration: text, explicit dimensionless, or composed from the
/// units of the components an expression refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitSpec {
    Text(String),
    Dimensionless,
    Derived(Expr),
}

impl From<&str> for UnitSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for UnitSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// `None` means explicitly dimensionless.
impl From<Option<&str>> for UnitSpec {
    fn from(text: Option<&str>) -> Self {
        text.map_or(Self::Dimensionless, Self::from)
    }
}

impl From<Expr> for UnitSpec {
    fn from(expr: Expr) -> Self {
        Self::Derived(expr)
    }
}
