//! Model component data types.

use std::fmt;

use ku_core::ComponentId;

use crate::expr::Expr;
use crate::order::ReactionOrder;
use crate::pattern::{ComplexPattern, RuleExpression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Monomer,
    Parameter,
    Rule,
    Observable,
    Expression,
}

impl ComponentKind {
    /// Lowercase kind name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Monomer => "monomer",
            Self::Parameter => "parameter",
            Self::Rule => "rule",
            Self::Observable => "observable",
            Self::Expression => "expression",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Monomer {
    pub id: ComponentId,
    pub name: String,
    pub sites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: ComponentId,
    pub name: String,
    pub value: f64,
}

/// A rule with its rate references and the reaction order of each direction,
/// fixed when the rule is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: ComponentId,
    pub name: String,
    pub expression: RuleExpression,
    pub rate_forward: ComponentId,
    pub rate_reverse: Option<ComponentId>,
    pub forward_order: ReactionOrder,
    /// Order of the reverse direction, present only for reversible rules.
    pub reverse_order: Option<ReactionOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservableKind {
    /// Count every matching monomer pattern occurrence.
    Molecules,
    /// Count each matching species once.
    Species,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    pub id: ComponentId,
    pub name: String,
    pub pattern: Vec<ComplexPattern>,
    pub kind: ObservableKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub id: ComponentId,
    pub name: String,
    pub expr: Expr,
}

/// Initial amount of a species. Not a named component; keyed by pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct Initial {
    pub pattern: ComplexPattern,
    /// Parameter or expression holding the amount.
    pub value: ComponentId,
    pub fixed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Monomer(Monomer),
    Parameter(Parameter),
    Rule(Rule),
    Observable(Observable),
    Expression(Expression),
}

impl Component {
    /// Declaration-order id.
    pub fn id(&self) -> ComponentId {
        match self {
            Self::Monomer(c) => c.id,
            Self::Parameter(c) => c.id,
            Self::Rule(c) => c.id,
            Self::Observable(c) => c.id,
            Self::Expression(c) => c.id,
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Monomer(c) => &c.name,
            Self::Parameter(c) => &c.name,
            Self::Rule(c) => &c.name,
            Self::Observable(c) => &c.name,
            Self::Expression(c) => &c.name,
        }
    }

    /// Which kind of component this is.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Monomer(_) => ComponentKind::Monomer,
            Self::Parameter(_) => ComponentKind::Parameter,
            Self::Rule(_) => ComponentKind::Rule,
            Self::Observable(_) => ComponentKind::Observable,
            Self::Expression(_) => ComponentKind::Expression,
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monomer(m) => write!(f, "Monomer('{}', {:?})", m.name, m.sites),
            Self::Parameter(p) => write!(f, "Parameter('{}', {:?})", p.name, p.value),
            Self::Rule(r) => write!(f, "Rule('{}', {})", r.name, r.expression),
            Self::Observable(o) => {
                write!(f, "Observable('{}', ", o.name)?;
                for (i, cp) in o.pattern.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{}", cp)?;
                }
                write!(f, ")")
            }
            Self::Expression(e) => write!(f, "Expression('{}', {})", e.name, e.expr),
        }
    }
}
