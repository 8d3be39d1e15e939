//! Species patterns and rule expressions.

use std::fmt;
use std::ops::Rem;

use ku_core::ComponentId;

/// What a pattern says about one monomer site.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteCondition {
    /// Site must be free.
    Unbound,
    /// Site holds bond `n`, shared with another site in the same complex.
    Bond(u32),
    /// Site is in the named state, bond unspecified.
    State(String),
    /// Named state and bond `n`.
    StateBond(String, u32),
    /// Site is bound to something.
    Any,
    /// Site is bound or free.
    Wild,
}

impl fmt::Display for SiteCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "None"),
            Self::Bond(n) => write!(f, "{}", n),
            Self::State(s) => write!(f, "'{}'", s),
            Self::StateBond(s, n) => write!(f, "('{}', {})", s, n),
            Self::Any => write!(f, "ANY"),
            Self::Wild => write!(f, "WILD"),
        }
    }
}

/// One monomer with conditions on some of its sites, e.g. `A(b=None)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomerPattern {
    pub monomer: ComponentId,
    pub name: String,
    pub sites: Vec<(String, SiteCondition)>,
}

impl MonomerPattern {
    /// Pattern on `monomer` with no site conditions.
    pub fn new(monomer: ComponentId, name: impl Into<String>) -> Self {
        Self {
            monomer,
            name: name.into(),
            sites: Vec::new(),
        }
    }

    /// Add (or replace) the condition on `site`.
    pub fn site(mut self, site: impl Into<String>, condition: SiteCondition) -> Self {
        let site = site.into();
        match self.sites.iter_mut().find(|(s, _)| *s == site) {
            Some(existing) => existing.1 = condition,
            None => self.sites.push((site, condition)),
        }
        self
    }
}

impl fmt::Display for MonomerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, (site, cond)) in self.sites.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", site, cond)?;
        }
        write!(f, ")")
    }
}

/// Monomer patterns joined into one complex, e.g. `A(b=1) % B(a=1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexPattern {
    pub monomers: Vec<MonomerPattern>,
}

impl ComplexPattern {
    /// Complex of the given monomer patterns.
    pub fn new(monomers: Vec<MonomerPattern>) -> Self {
        Self { monomers }
    }
}

impl From<MonomerPattern> for ComplexPattern {
    fn from(mp: MonomerPattern) -> Self {
        Self { monomers: vec![mp] }
    }
}

impl Rem<MonomerPattern> for MonomerPattern {
    type Output = ComplexPattern;

    fn rem(self, rhs: MonomerPattern) -> ComplexPattern {
        ComplexPattern::new(vec![self, rhs])
    }
}

impl Rem<MonomerPattern> for ComplexPattern {
    type Output = ComplexPattern;

    fn rem(mut self, rhs: MonomerPattern) -> ComplexPattern {
        self.monomers.push(rhs);
        self
    }
}

impl fmt::Display for ComplexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mp) in self.monomers.iter().enumerate() {
            if i > 0 {
                write!(f, " % ")?;
            }
            write!(f, "{}", mp)?;
        }
        Ok(())
    }
}

/// Left and right sides of a rule, with its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleExpression {
    pub reactants: Vec<ComplexPattern>,
    pub products: Vec<ComplexPattern>,
    pub reversible: bool,
}

impl RuleExpression {
    /// `reactants >> products`
    pub fn irreversible(reactants: Vec<ComplexPattern>, products: Vec<ComplexPattern>) -> Self {
        Self {
            reactants,
            products,
            reversible: false,
        }
    }

    /// `reactants | products`
    pub fn reversible(reactants: Vec<ComplexPattern>, products: Vec<ComplexPattern>) -> Self {
        Self {
            reactants,
            products,
            reversible: true,
        }
    }
}

fn write_side(f: &mut fmt::Formatter<'_>, side: &[ComplexPattern]) -> fmt::Result {
    if side.is_empty() {
        return write!(f, "None");
    }
    for (i, cp) in side.iter().enumerate() {
        if i > 0 {
            write!(f, " + ")?;
        }
        write!(f, "{}", cp)?;
    }
    Ok(())
}

impl fmt::Display for RuleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_side(f, &self.reactants)?;
        write!(f, "{}", if self.reversible { " | " } else { " >> " })?;
        write_side(f, &self.products)
    }
}
