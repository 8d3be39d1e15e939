//! Conversion factors and equivalencies.
//!
//! Same-dimension conversions are a ratio of scales. Dimensions that differ
//! can only be bridged by a registered [`Equivalency`], applied as many times
//! as the dimension gap requires (`1/(M*s)` -> `1/(molecules*s)` applies the
//! molar-to-molecules rule once, inverted).

use ku_core::{Volume, constants::AVOGADRO_PER_MOL};
use uom::si::volume::cubic_meter;

use crate::dimension::Dimension;
use crate::error::{UnitError, UnitResult};
use crate::unit::PhysicalUnit;

/// Name of the molar concentration <-> molecule count equivalency.
pub const MOLECULES_EQUIVALENCY: &str = "molar_to_molecules";

/// Named counting dimension for molecule numbers.
pub const MOLECULES: &str = "molecules";

/// A bidirectional conversion rule: one coherent-SI unit of `from` equals
/// `factor` coherent units of `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equivalency {
    pub name: &'static str,
    pub from: Dimension,
    pub to: Dimension,
    pub factor: f64,
}

impl Equivalency {
    /// `molecules = molar_concentration × volume × N_A`.
    ///
    /// In coherent units one mol/m^3 in `volume` holds `V[m^3] · N_A` molecules.
    pub fn molar_to_molecules(volume: Volume) -> Self {
        Self {
            name: MOLECULES_EQUIVALENCY,
            from: Dimension::molar_concentration(),
            to: Dimension::named(MOLECULES),
            factor: volume.get::<cubic_meter>() * AVOGADRO_PER_MOL,
        }
    }

    fn step(&self) -> Dimension {
        self.from.div(&self.to)
    }
}

/// Factor `f` such that `value_in_to = value_in_from * f`.
pub fn conversion_factor(
    from: &PhysicalUnit,
    to: &PhysicalUnit,
    equivalencies: &[Equivalency],
) -> UnitResult<f64> {
    let from_dim = from.dimension();
    let to_dim = to.dimension();
    let base = from.scale() / to.scale();

    if from_dim == to_dim {
        return finite(base);
    }

    let gap = from_dim.div(&to_dim);
    for eq in equivalencies {
        if let Some(k) = gap.power_of(&eq.step()) {
            tracing::debug!(
                equivalency = eq.name,
                power = k,
                from = %from,
                to = %to,
                "bridging dimensions through equivalency"
            );
            return finite(base * eq.factor.powi(k));
        }
    }

    let molecule_step = Dimension::molar_concentration().div(&Dimension::named(MOLECULES));
    if gap.power_of(&molecule_step).is_some() {
        return Err(UnitError::NoEquivalency {
            from: from.text(),
            to: to.text(),
            equivalency: MOLECULES_EQUIVALENCY,
        });
    }

    Err(UnitError::Incompatible {
        from: from.text(),
        to: to.text(),
    })
}

fn finite(factor: f64) -> UnitResult<f64> {
    if factor.is_finite() {
        Ok(factor)
    } else {
        Err(UnitError::NonFinite {
            what: "conversion factor",
        })
    }
}
