//! Typed SI quantities for the chemistry side of a model.
//!
//! Unit expressions are handled dynamically in ku-units; these types give
//! it exact SI scale factors and keep volumes typed.

use uom::si::f64::{
    AmountOfSubstance as UomAmountOfSubstance, Mass as UomMass,
    MolarConcentration as UomMolarConcentration, Time as UomTime, Volume as UomVolume,
};

pub type Amount = UomAmountOfSubstance;
pub type Mass = UomMass;
pub type MolarConc = UomMolarConcentration;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn liters(v: f64) -> Volume {
    use uom::si::volume::liter;
    Volume::new::<liter>(v)
}

#[inline]
pub fn cubic_meters(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn mol(v: f64) -> Amount {
    use uom::si::amount_of_substance::mole;
    Amount::new::<mole>(v)
}

#[inline]
pub fn molar(v: f64) -> MolarConc {
    use uom::si::molar_concentration::mole_per_liter;
    MolarConc::new::<mole_per_liter>(v)
}

pub mod constants {
    use super::*;

    /// Avogadro constant, exact since the 2019 SI redefinition.
    pub const AVOGADRO_PER_MOL: f64 = 6.022_140_76e23;

    /// Number of molecules in `amount`.
    #[inline]
    pub fn molecules_in(amount: Amount) -> f64 {
        use uom::si::amount_of_substance::mole;
        amount.get::<mole>() * AVOGADRO_PER_MOL
    }
}
