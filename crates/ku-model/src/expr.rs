//! Symbolic expressions over model components.
//!
//! Small expression tree: numbers, component symbols, arithmetic, integer
//! powers and a few elementary functions. Built with the usual operators:
//!
//! ```
//! use ku_core::ComponentId;
//! use ku_model::Expr;
//!
//! let k = Expr::symbol(ComponentId::from_index(0), "k");
//! let a = Expr::symbol(ComponentId::from_index(1), "A_total");
//! let rate = 2.0 * k * a.powi(2);
//! assert_eq!(rate.to_string(), "2*k*A_total**2");
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use ku_core::ComponentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Exp,
    Log,
    Sqrt,
}

impl Func {
    /// Function name as written in expressions.
    pub fn name(self) -> &'static str {
        match self {
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Sqrt => "sqrt",
        }
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Exp => x.exp(),
            Self::Log => x.ln(),
            Self::Sqrt => x.sqrt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Num(f64),
    Symbol { id: ComponentId, name: String },
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Pow(Box<Expr>, i32),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Numeric literal.
    pub fn num(value: f64) -> Self {
        Self::Num(value)
    }

    /// Reference to a parameter or expression.
    pub fn symbol(id: ComponentId, name: impl Into<String>) -> Self {
        Self::Symbol {
            id,
            name: name.into(),
        }
    }

    /// Integer power.
    pub fn powi(self, n: i32) -> Self {
        Self::Pow(Box::new(self), n)
    }

    /// Function application.
    pub fn call(func: Func, arg: Expr) -> Self {
        Self::Call(func, Box::new(arg))
    }

    /// Component ids referenced by this expression, first occurrence order.
    pub fn symbols(&self) -> Vec<ComponentId> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut Vec<ComponentId>) {
        match self {
            Self::Num(_) => {}
            Self::Symbol { id, .. } => {
                if !out.contains(id) {
                    out.push(*id);
                }
            }
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) => {
                a.collect_symbols(out);
                b.collect_symbols(out);
            }
            Self::Neg(a) | Self::Pow(a, _) | Self::Call(_, a) => a.collect_symbols(out),
        }
    }

    /// Numeric value, with symbols resolved by `lookup`.
    ///
    /// Returns `None` if any symbol has no value.
    pub fn evaluate(&self, lookup: &dyn Fn(ComponentId) -> Option<f64>) -> Option<f64> {
        Some(match self {
            Self::Num(v) => *v,
            Self::Symbol { id, .. } => lookup(*id)?,
            Self::Add(a, b) => a.evaluate(lookup)? + b.evaluate(lookup)?,
            Self::Sub(a, b) => a.evaluate(lookup)? - b.evaluate(lookup)?,
            Self::Mul(a, b) => a.evaluate(lookup)? * b.evaluate(lookup)?,
            Self::Div(a, b) => a.evaluate(lookup)? / b.evaluate(lookup)?,
            Self::Neg(a) => -a.evaluate(lookup)?,
            Self::Pow(a, n) => a.evaluate(lookup)?.powi(*n),
            Self::Call(func, a) => func.apply(a.evaluate(lookup)?),
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Add(..) | Self::Sub(..) => 1,
            Self::Mul(..) | Self::Div(..) => 2,
            Self::Neg(_) => 3,
            Self::Pow(..) => 4,
            Self::Num(v) if *v < 0.0 => 3,
            Self::Num(_) | Self::Symbol { .. } | Self::Call(..) => 5,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(v) => write!(f, "{}", v),
            Self::Symbol { name, .. } => write!(f, "{}", name),
            Self::Add(a, b) => {
                a.write_operand(f, 1)?;
                write!(f, " + ")?;
                b.write_operand(f, 2)
            }
            Self::Sub(a, b) => {
                a.write_operand(f, 1)?;
                write!(f, " - ")?;
                b.write_operand(f, 2)
            }
            Self::Mul(a, b) => {
                a.write_operand(f, 2)?;
                write!(f, "*")?;
                b.write_operand(f, 3)
            }
            Self::Div(a, b) => {
                a.write_operand(f, 2)?;
                write!(f, "/")?;
                b.write_operand(f, 3)
            }
            Self::Neg(a) => {
                write!(f, "-")?;
                a.write_operand(f, 3)
            }
            Self::Pow(a, n) => {
                a.write_operand(f, 5)?;
                if *n < 0 {
                    write!(f, "**({})", n)
                } else {
                    write!(f, "**{}", n)
                }
            }
            Self::Call(func, a) => write!(f, "{}({})", func.name(), a),
        }
    }
}

macro_rules! binary_op {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl $trait for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::$variant(Box::new(self), Box::new(Expr::Num(rhs)))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$variant(Box::new(Expr::Num(self)), Box::new(rhs))
            }
        }
    };
}

binary_op!(Add, add, Add);
binary_op!(Sub, sub, Sub);
binary_op!(Mul, mul, Mul);
binary_op!(Div, div, Div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(i: u32, name: &str) -> Expr {
        Expr::symbol(ComponentId::from_index(i), name)
    }

    #[test]
    fn display_respects_precedence() {
        let e = (sym(0, "a") + sym(1, "b")) * sym(2, "c");
        assert_eq!(e.to_string(), "(a + b)*c");
        let e = sym(0, "a") / (sym(1, "b") * sym(2, "c"));
        assert_eq!(e.to_string(), "a/(b*c)");
        let e = sym(0, "a") - (sym(1, "b") - sym(2, "c"));
        assert_eq!(e.to_string(), "a - (b - c)");
        assert_eq!(sym(0, "a").powi(-1).to_string(), "a**(-1)");
    }

    #[test]
    fn symbols_are_deduplicated_in_order() {
        let e = sym(1, "b") * sym(0, "a") + sym(1, "b");
        assert_eq!(
            e.symbols(),
            vec![ComponentId::from_index(1), ComponentId::from_index(0)]
        );
    }

    #[test]
    fn evaluates_with_lookup() {
        let e = 2.0 * sym(0, "k") / sym(1, "v") + Expr::call(Func::Exp, Expr::num(0.0));
        let values = |id: ComponentId| match id.index() {
            0 => Some(3.0),
            1 => Some(4.0),
            _ => None,
        };
        assert_eq!(e.evaluate(&values), Some(2.5));
        assert_eq!(sym(7, "x").evaluate(&values), None);
    }
}
