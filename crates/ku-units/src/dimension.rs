//! Runtime dimensional analysis.
//!
//! A dimension is a product of base dimensions raised to integer powers.
//! Besides the seven SI base quantities, registries may introduce named
//! counting dimensions (`cell`, `molecules`) that no SI quantity absorbs.

use std::collections::BTreeMap;
use std::fmt;

/// One axis of the dimension vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseDimension {
    /// Mass [M] - kilogram
    Mass,
    /// Length [L] - meter
    Length,
    /// Time [T] - second
    Time,
    /// Electric current [I] - ampere
    Current,
    /// Thermodynamic temperature [Θ] - kelvin
    Temperature,
    /// Amount of substance [N] - mole
    Amount,
    /// Luminous intensity [J] - candela
    Luminosity,
    /// Registry-defined counting dimension such as `cell` or `molecules`.
    Named(String),
}

impl BaseDimension {
    /// Short symbol used in rendered dimensions.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Mass => "M",
            Self::Length => "L",
            Self::Time => "T",
            Self::Current => "I",
            Self::Temperature => "Θ",
            Self::Amount => "N",
            Self::Luminosity => "J",
            Self::Named(name) => name,
        }
    }
}

/// Exponents over the base dimensions. Zero exponents are never stored, so
/// structural equality is dimensional equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    exponents: BTreeMap<BaseDimension, i32>,
}

impl Dimension {
    /// Dimensionless (pure number)
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single base dimension to the first power.
    pub fn base(base: BaseDimension) -> Self {
        Self::of(&[(base, 1)])
    }

    /// Counting dimension registered under `name`.
    pub fn named(name: &str) -> Self {
        Self::base(BaseDimension::Named(name.to_string()))
    }

    /// Build a dimension from `(base, exponent)` pairs; repeated bases add up.
    pub fn of(parts: &[(BaseDimension, i32)]) -> Self {
        let mut dim = Self::default();
        for (base, exp) in parts {
            dim.add_exponent(base.clone(), *exp);
        }
        dim
    }

    /// M
    pub fn mass() -> Self {
        Self::base(BaseDimension::Mass)
    }

    /// L
    pub fn length() -> Self {
        Self::base(BaseDimension::Length)
    }

    /// T
    pub fn time() -> Self {
        Self::base(BaseDimension::Time)
    }

    /// N
    pub fn amount() -> Self {
        Self::base(BaseDimension::Amount)
    }

    /// Volume [L³]
    pub fn volume() -> Self {
        Self::of(&[(BaseDimension::Length, 3)])
    }

    /// Frequency [T⁻¹]
    pub fn frequency() -> Self {
        Self::of(&[(BaseDimension::Time, -1)])
    }

    /// Molar concentration [N L⁻³]
    pub fn molar_concentration() -> Self {
        Self::of(&[(BaseDimension::Amount, 1), (BaseDimension::Length, -3)])
    }

    fn add_exponent(&mut self, base: BaseDimension, exp: i32) {
        let current = self.exponent(&base);
        self.set_exponent(base, current.saturating_add(exp));
    }

    fn checked_add_exponent(&mut self, base: BaseDimension, exp: i32) -> Option<()> {
        let sum = self.exponent(&base).checked_add(exp)?;
        self.set_exponent(base, sum);
        Some(())
    }

    fn set_exponent(&mut self, base: BaseDimension, exp: i32) {
        if exp == 0 {
            self.exponents.remove(&base);
        } else {
            self.exponents.insert(base, exp);
        }
    }

    /// Exponent of `base` (zero when absent).
    pub fn exponent(&self, base: &BaseDimension) -> i32 {
        self.exponents.get(base).copied().unwrap_or(0)
    }

    /// Nonzero exponents in base order.
    pub fn iter(&self) -> impl Iterator<Item = (&BaseDimension, i32)> {
        self.exponents.iter().map(|(b, e)| (b, *e))
    }

    /// Multiply dimensions (add exponents). Exponents saturate at the `i32`
    /// bounds; see [`Dimension::checked_mul`].
    pub fn mul(&self, other: &Dimension) -> Dimension {
        let mut out = self.clone();
        for (base, exp) in &other.exponents {
            out.add_exponent(base.clone(), *exp);
        }
        out
    }

    /// Divide dimensions (subtract exponents)
    pub fn div(&self, other: &Dimension) -> Dimension {
        self.mul(&other.recip())
    }

    /// Reciprocal (negate all exponents)
    pub fn recip(&self) -> Dimension {
        self.powi(-1)
    }

    /// Raise to integer power (multiply all exponents). Exponents saturate
    /// at the `i32` bounds; see [`Dimension::checked_powi`].
    pub fn powi(&self, n: i32) -> Dimension {
        let mut out = Self::default();
        for (base, exp) in &self.exponents {
            out.add_exponent(base.clone(), exp.saturating_mul(n));
        }
        out
    }

    /// `self * other`, or `None` if an exponent overflows.
    pub fn checked_mul(&self, other: &Dimension) -> Option<Dimension> {
        let mut out = self.clone();
        for (base, exp) in &other.exponents {
            out.checked_add_exponent(base.clone(), *exp)?;
        }
        Some(out)
    }

    /// `self^n`, or `None` if an exponent overflows.
    pub fn checked_powi(&self, n: i32) -> Option<Dimension> {
        let mut out = Self::default();
        for (base, exp) in &self.exponents {
            out.checked_add_exponent(base.clone(), exp.checked_mul(n)?)?;
        }
        Some(out)
    }

    /// No nonzero exponent.
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.is_empty()
    }

    /// Find `k` with `self == step^k`, if one exists.
    ///
    /// Used to detect how many times an equivalency has to be applied to
    /// bridge two dimensions.
    pub fn power_of(&self, step: &Dimension) -> Option<i32> {
        if self.is_dimensionless() {
            return Some(0);
        }
        let (base, step_exp) = step.exponents.iter().next()?;
        let exp = self.exponent(base);
        if exp.checked_rem(*step_exp)? != 0 {
            return None;
        }
        let k = exp.checked_div(*step_exp)?;
        (step.checked_powi(k)? == *self).then_some(k)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dimensionless() {
            return write!(f, "1");
        }

        let mut num: Vec<String> = Vec::new();
        let mut den: Vec<String> = Vec::new();
        for (base, exp) in &self.exponents {
            let target = if *exp > 0 { &mut num } else { &mut den };
            if exp.abs() == 1 {
                target.push(base.symbol().to_string());
            } else {
                target.push(format!("{}{}", base.symbol(), superscript(exp.abs())));
            }
        }

        let num_str = if num.is_empty() {
            "1".to_string()
        } else {
            num.join(" ")
        };

        if den.is_empty() {
            write!(f, "{}", num_str)
        } else {
            write!(f, "{} / {}", num_str, den.join(" "))
        }
    }
}

fn superscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|d| match d {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molar_concentration_is_amount_per_volume() {
        let conc = Dimension::amount().div(&Dimension::volume());
        assert_eq!(conc, Dimension::molar_concentration());
    }

    #[test]
    fn recip_time_is_frequency() {
        assert_eq!(Dimension::time().recip(), Dimension::frequency());
    }

    #[test]
    fn cancelling_exponents_leave_dimensionless() {
        let d = Dimension::volume().div(&Dimension::volume());
        assert!(d.is_dimensionless());
        assert_eq!(d, Dimension::dimensionless());
    }

    #[test]
    fn power_of_detects_integer_steps() {
        let step = Dimension::molar_concentration().div(&Dimension::named("molecules"));
        assert_eq!(step.powi(-1).power_of(&step), Some(-1));
        assert_eq!(step.powi(2).power_of(&step), Some(2));
        assert_eq!(Dimension::time().power_of(&step), None);
    }

    #[test]
    fn checked_ops_report_overflow() {
        let big = Dimension::of(&[(BaseDimension::Time, i32::MAX)]);
        assert_eq!(big.checked_mul(&Dimension::time()), None);
        assert_eq!(Dimension::volume().checked_powi(i32::MAX), None);
        assert_eq!(
            Dimension::time().checked_powi(-3),
            Some(Dimension::of(&[(BaseDimension::Time, -3)]))
        );
        // the infallible forms saturate instead of wrapping
        assert_eq!(big.mul(&Dimension::time()).exponent(&BaseDimension::Time), i32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(Dimension::molar_concentration().to_string(), "N / L³");
        assert_eq!(Dimension::frequency().to_string(), "1 / T");
        assert_eq!(Dimension::dimensionless().to_string(), "1");
        assert_eq!(Dimension::named("cell").recip().to_string(), "1 / cell");
    }
}
