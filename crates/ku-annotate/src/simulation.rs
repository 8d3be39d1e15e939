//! Model-wide canonical units.

use std::fmt;

use ku_units::{ConfigurationError, Dimension, PhysicalUnit, UnitRegistry};

/// The concentration and time units (and optionally a volume unit) every
/// concentration- or time-bearing unit in a model is rewritten to.
#[derive(Debug, Clone)]
pub struct SimulationUnits {
    concentration: PhysicalUnit,
    time: PhysicalUnit,
    volume: Option<PhysicalUnit>,
}

impl SimulationUnits {
    /// Validate and parse the canonical units against `registry`.
    ///
    /// `concentration` must match a concentration pattern (molecule counts
    /// included), `time` must be a time unit, `volume` a volume unit.
    pub fn new(
        registry: &UnitRegistry,
        concentration: &str,
        time: &str,
        volume: Option<&str>,
    ) -> Result<Self, ConfigurationError> {
        let conc = registry.parse(concentration)?;
        if !registry.is_concentration(&conc) {
            return Err(ConfigurationError::WrongCategory {
                role: "Concentration",
                unit: concentration.to_string(),
                expected: "concentration",
            });
        }
        let t = registry.parse(time)?;
        if t.dimension() != Dimension::time() {
            return Err(ConfigurationError::WrongCategory {
                role: "Time",
                unit: time.to_string(),
                expected: "time",
            });
        }
        let volume = match volume {
            Some(text) => {
                let v = registry.parse(text)?;
                if v.dimension() != Dimension::volume() {
                    return Err(ConfigurationError::NotAVolume {
                        unit: text.to_string(),
                    });
                }
                Some(v)
            }
            None => None,
        };
        Ok(Self {
            concentration: conc,
            time: t,
            volume,
        })
    }

    /// Canonical concentration unit, as declared.
    pub fn concentration(&self) -> String {
        self.concentration.text()
    }

    /// Canonical time unit, as declared.
    pub fn time(&self) -> String {
        self.time.text()
    }

    /// Inverse of the time unit, e.g. `1/s`.
    pub fn frequency(&self) -> String {
        self.frequency_unit().text()
    }

    /// Canonical volume unit, if one was given.
    pub fn volume(&self) -> Option<String> {
        self.volume.as_ref().map(PhysicalUnit::text)
    }

    /// Parsed canonical concentration unit.
    pub fn concentration_unit(&self) -> &PhysicalUnit {
        &self.concentration
    }

    /// Parsed canonical time unit.
    pub fn time_unit(&self) -> &PhysicalUnit {
        &self.time
    }

    /// Parsed inverse time unit.
    pub fn frequency_unit(&self) -> PhysicalUnit {
        self.time.powi(-1)
    }

    /// Parsed canonical volume unit, if one was given.
    pub fn volume_unit(&self) -> Option<&PhysicalUnit> {
        self.volume.as_ref()
    }

    /// `unit` with its concentration, time and (if configured) volume parts
    /// replaced by the canonical ones: `1/(nM*h)` becomes `1/(uM*s)`.
    ///
    /// Returns `None` when `unit` has no such part.
    pub fn canonical_unit(&self, registry: &UnitRegistry, unit: &PhysicalUnit) -> Option<PhysicalUnit> {
        if unit.is_dimensionless() {
            return None;
        }
        if registry.is_concentration(unit) {
            return Some(self.concentration.clone());
        }

        let mut rewritten = false;
        let mut out = PhysicalUnit::dimensionless();
        for factor in unit.factors() {
            let single = PhysicalUnit::from_factor(ku_units::UnitFactor {
                power: 1,
                ..factor.clone()
            });
            let dim = single.dimension();
            let part = if registry.is_concentration(&single) {
                Some(&self.concentration)
            } else if dim == Dimension::time() {
                Some(&self.time)
            } else if dim == Dimension::volume() {
                self.volume.as_ref()
            } else {
                None
            };
            match part {
                Some(canonical) => {
                    rewritten = true;
                    out = out.mul(&canonical.powi(factor.power));
                }
                None => out = out.mul(&single.powi(factor.power)),
            }
        }
        rewritten.then_some(out)
    }
}

impl fmt::Display for SimulationUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SimulationUnits(concentration='{}', time='{}'",
            self.concentration(),
            self.time()
        )?;
        if let Some(volume) = self.volume() {
            write!(f, ", volume='{}'", volume)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ku_units::UnitError;

    fn reg() -> UnitRegistry {
        UnitRegistry::default()
    }

    #[test]
    fn validates_roles() {
        let r = reg();
        assert!(SimulationUnits::new(&r, "uM", "s", None).is_ok());
        assert!(SimulationUnits::new(&r, "molecules", "min", Some("pL")).is_ok());
        assert!(matches!(
            SimulationUnits::new(&r, "s", "s", None),
            Err(ConfigurationError::WrongCategory { role: "Concentration", .. })
        ));
        assert!(matches!(
            SimulationUnits::new(&r, "uM", "uM", None),
            Err(ConfigurationError::WrongCategory { role: "Time", .. })
        ));
        assert!(matches!(
            SimulationUnits::new(&r, "uM", "s", Some("m^2")),
            Err(ConfigurationError::NotAVolume { .. })
        ));
        assert!(matches!(
            SimulationUnits::new(&r, "zorkmid", "s", None),
            Err(ConfigurationError::Unit(UnitError::UnknownUnit { .. }))
        ));
    }

    #[test]
    fn accessors_and_display() {
        let r = reg();
        let sim = SimulationUnits::new(&r, "nM", "h", None).unwrap();
        assert_eq!(sim.concentration(), "nM");
        assert_eq!(sim.time(), "h");
        assert_eq!(sim.frequency(), "1/h");
        assert_eq!(sim.volume(), None);
        assert_eq!(sim.to_string(), "SimulationUnits(concentration='nM', time='h')");

        let sim = SimulationUnits::new(&r, "uM", "s", Some("pL")).unwrap();
        assert_eq!(
            sim.to_string(),
            "SimulationUnits(concentration='uM', time='s', volume='pL')"
        );
    }

    #[test]
    fn canonicalises_compound_units() {
        let r = reg();
        let sim = SimulationUnits::new(&r, "uM", "s", None).unwrap();
        let canon = |t: &str| sim.canonical_unit(&r, &r.parse(t).unwrap()).map(|u| u.text());
        assert_eq!(canon("nM").as_deref(), Some("uM"));
        assert_eq!(canon("1/h").as_deref(), Some("1/s"));
        assert_eq!(canon("1/(nM*h)").as_deref(), Some("1/(uM*s)"));
        assert_eq!(canon("nM/min").as_deref(), Some("uM/s"));
        assert_eq!(canon("mg").as_deref(), None);
        // no volume configured, so volumes stay as declared
        assert_eq!(canon("pL").as_deref(), None);
        assert_eq!(canon("1").as_deref(), None);
    }

    #[test]
    fn volume_parts_follow_configured_volume() {
        let r = reg();
        let sim = SimulationUnits::new(&r, "uM", "s", Some("pL")).unwrap();
        let out = sim.canonical_unit(&r, &r.parse("fL/min").unwrap()).unwrap();
        assert_eq!(out.text(), "pL/s");
    }
}
