//! Physical units: a scale relative to coherent SI plus a dimension.
//!
//! A unit remembers the named factors it was built from (`uM`, `s`, ...) so
//! compound units can be rewritten factor by factor and rendered back to
//! text.

use std::fmt;

use ku_core::same_scale;

use crate::dimension::Dimension;

/// One named unit raised to an integer power inside a compound unit.
#[derive(Debug, Clone)]
pub struct UnitFactor {
    pub symbol: String,
    pub power: i32,
    /// Coherent-SI scale of the symbol itself (not raised to `power`).
    pub scale: f64,
    /// Dimension of the symbol itself (not raised to `power`).
    pub dimension: Dimension,
}

impl UnitFactor {
    /// Factor for `symbol` at power one.
    pub fn new(symbol: impl Into<String>, scale: f64, dimension: Dimension) -> Self {
        Self {
            symbol: symbol.into(),
            power: 1,
            scale,
            dimension,
        }
    }
}

/// A parsed or composed physical unit.
///
/// Equality is physical equivalence: `1/s == Hz`, `nM != uM`.
#[derive(Debug, Clone)]
pub struct PhysicalUnit {
    factors: Vec<UnitFactor>,
    /// Bare numeric multiplier (`1000 s`), separate from the factor scales.
    multiplier: f64,
    /// Text the unit was declared with; `None` once arithmetic rebuilt it.
    declared: Option<String>,
}

impl PhysicalUnit {
    /// The explicit dimensionless unit.
    pub fn dimensionless() -> Self {
        Self {
            factors: Vec::new(),
            multiplier: 1.0,
            declared: None,
        }
    }

    /// Unit made of a single factor.
    pub fn from_factor(factor: UnitFactor) -> Self {
        Self::from_parts(vec![factor], 1.0)
    }

    /// Unit from factors and a bare multiplier; repeated symbols merge.
    pub fn from_parts(factors: Vec<UnitFactor>, multiplier: f64) -> Self {
        let mut unit = Self {
            factors: Vec::new(),
            multiplier,
            declared: None,
        };
        for factor in factors {
            unit.push_factor(factor);
        }
        unit
    }

    /// Attach the text the user wrote, so display keeps their spelling.
    pub fn with_declared(mut self, text: impl Into<String>) -> Self {
        self.declared = Some(text.into());
        self
    }

    fn push_factor(&mut self, factor: UnitFactor) {
        self.merge_factor(factor, i32::saturating_add);
    }

    fn checked_push_factor(&mut self, factor: UnitFactor) -> Option<()> {
        let mut overflow = false;
        self.merge_factor(factor, |a, b| {
            a.checked_add(b).unwrap_or_else(|| {
                overflow = true;
                0
            })
        });
        (!overflow).then_some(())
    }

    fn merge_factor(&mut self, factor: UnitFactor, mut add: impl FnMut(i32, i32) -> i32) {
        if factor.power == 0 {
            return;
        }
        match self.factors.iter_mut().find(|f| f.symbol == factor.symbol) {
            Some(existing) => existing.power = add(existing.power, factor.power),
            None => self.factors.push(factor),
        }
        self.factors.retain(|f| f.power != 0);
    }

    /// Named factors with nonzero powers.
    pub fn factors(&self) -> &[UnitFactor] {
        &self.factors
    }

    /// Bare numeric multiplier.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Scale relative to the coherent SI unit of the same dimension.
    pub fn scale(&self) -> f64 {
        self.factors
            .iter()
            .fold(self.multiplier, |acc, f| acc * f.scale.powi(f.power))
    }

    /// Combined dimension of all factors.
    pub fn dimension(&self) -> Dimension {
        self.factors
            .iter()
            .fold(Dimension::dimensionless(), |acc, f| {
                acc.mul(&f.dimension.powi(f.power))
            })
    }

    /// Dimension computed without saturation; `None` if an exponent overflows.
    fn exact_dimension(&self) -> Option<Dimension> {
        self.factors.iter().try_fold(Dimension::dimensionless(), |acc, f| {
            acc.checked_mul(&f.dimension.checked_powi(f.power)?)
        })
    }

    /// No net dimension, whatever the scale.
    pub fn is_dimensionless(&self) -> bool {
        self.dimension().is_dimensionless()
    }

    /// Product; exponents saturate like [`PhysicalUnit::powi`].
    pub fn mul(&self, other: &PhysicalUnit) -> PhysicalUnit {
        let mut out = Self::from_parts(self.factors.clone(), self.multiplier * other.multiplier);
        for factor in &other.factors {
            out.push_factor(factor.clone());
        }
        out
    }

    /// Quotient; exponents saturate like [`PhysicalUnit::powi`].
    pub fn div(&self, other: &PhysicalUnit) -> PhysicalUnit {
        self.mul(&other.powi(-1))
    }

    /// Integer power. Exponents saturate at the `i32` bounds; parsed and
    /// composed units go through [`PhysicalUnit::checked_powi`] instead.
    pub fn powi(&self, n: i32) -> PhysicalUnit {
        let factors = self
            .factors
            .iter()
            .map(|f| UnitFactor {
                power: f.power.saturating_mul(n),
                ..f.clone()
            })
            .collect();
        Self::from_parts(factors, self.multiplier.powi(n))
    }

    /// `self * other`, or `None` if any exponent would overflow.
    pub fn checked_mul(&self, other: &PhysicalUnit) -> Option<PhysicalUnit> {
        let mut out = Self::from_parts(self.factors.clone(), self.multiplier * other.multiplier);
        for factor in &other.factors {
            out.checked_push_factor(factor.clone())?;
        }
        out.exact_dimension()?;
        Some(out)
    }

    /// `self / other`, or `None` if any exponent would overflow.
    pub fn checked_div(&self, other: &PhysicalUnit) -> Option<PhysicalUnit> {
        self.checked_mul(&other.checked_powi(-1)?)
    }

    /// `self^n`, or `None` if any exponent would overflow.
    pub fn checked_powi(&self, n: i32) -> Option<PhysicalUnit> {
        let mut out = Self::from_parts(Vec::new(), self.multiplier.powi(n));
        for f in &self.factors {
            out.checked_push_factor(UnitFactor {
                power: f.power.checked_mul(n)?,
                ..f.clone()
            })?;
        }
        out.exact_dimension()?;
        Some(out)
    }

    /// Same dimension, regardless of scale.
    pub fn is_compatible(&self, other: &PhysicalUnit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Canonical text built from the factors: `uM`, `1/s`, `1/(uM*s)`, `m^-3` style.
    pub fn format(&self) -> String {
        let render = |symbol: &str, power: i32| {
            if power == 1 {
                symbol.to_string()
            } else {
                format!("{}^{}", symbol, power)
            }
        };

        let num: Vec<String> = self
            .factors
            .iter()
            .filter(|f| f.power > 0)
            .map(|f| render(&f.symbol, f.power))
            .collect();
        let den: Vec<String> = self
            .factors
            .iter()
            .filter(|f| f.power < 0)
            .map(|f| render(&f.symbol, -f.power))
            .collect();

        let mut out = if num.is_empty() {
            String::new()
        } else {
            num.join("*")
        };
        if self.multiplier != 1.0 {
            out = if out.is_empty() {
                format!("{}", self.multiplier)
            } else {
                format!("{} {}", self.multiplier, out)
            };
        }
        if out.is_empty() {
            out.push('1');
        }
        match den.len() {
            0 => out,
            1 => format!("{}/{}", out, den[0]),
            _ => format!("{}/({})", out, den.join("*")),
        }
    }

    /// Text as declared, or the canonical rendering after arithmetic.
    pub fn text(&self) -> String {
        self.declared.clone().unwrap_or_else(|| self.format())
    }
}

impl PartialEq for PhysicalUnit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension() == other.dimension() && same_scale(self.scale(), other.scale())
    }
}

impl fmt::Display for PhysicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::BaseDimension;

    fn second() -> UnitFactor {
        UnitFactor::new("s", 1.0, Dimension::time())
    }

    fn micromolar() -> UnitFactor {
        UnitFactor::new("uM", 1e-3, Dimension::molar_concentration())
    }

    #[test]
    fn second_order_rate_constant_formats() {
        let s = PhysicalUnit::from_factor(second());
        let um = PhysicalUnit::from_factor(micromolar());
        let k2 = um.mul(&s).powi(-1);
        assert_eq!(k2.format(), "1/(uM*s)");
        assert_eq!(
            k2.dimension(),
            Dimension::of(&[
                (BaseDimension::Amount, -1),
                (BaseDimension::Length, 3),
                (BaseDimension::Time, -1)
            ])
        );
        assert!((k2.scale() - 1e3).abs() < 1e-9);
    }

    #[test]
    fn cancelling_factors_drop_out() {
        let s = PhysicalUnit::from_factor(second());
        let ratio = s.div(&s);
        assert!(ratio.factors().is_empty());
        assert_eq!(ratio.format(), "1");
        assert_eq!(ratio, PhysicalUnit::dimensionless());
    }

    #[test]
    fn declared_text_wins_until_arithmetic() {
        let s = PhysicalUnit::from_factor(second()).with_declared("s ");
        assert_eq!(s.text(), "s ");
        assert_eq!(s.powi(-1).text(), "1/s");
    }

    #[test]
    fn checked_ops_refuse_overflowing_exponents() {
        let s = PhysicalUnit::from_factor(second());
        let huge = s.checked_powi(i32::MAX).unwrap();
        assert!(huge.checked_mul(&s).is_none());
        assert!(huge.checked_powi(2).is_none());
        assert!(huge.checked_div(&s).is_some());

        // liters are L^3, so the dimension overflows before the factor power does
        let liter = PhysicalUnit::from_factor(UnitFactor::new("L", 1e-3, Dimension::volume()));
        assert!(liter.checked_powi(1 << 30).is_none());
        assert_eq!(liter.checked_powi(2).unwrap().format(), "L^2");
    }

    #[test]
    fn equality_is_equivalence() {
        let hz = PhysicalUnit::from_factor(UnitFactor::new("Hz", 1.0, Dimension::frequency()));
        let per_s = PhysicalUnit::from_factor(second()).powi(-1);
        assert_eq!(hz, per_s);
        let ms = PhysicalUnit::from_factor(UnitFactor::new("ms", 1e-3, Dimension::time()));
        assert_ne!(ms, PhysicalUnit::from_factor(second()));
    }
}
