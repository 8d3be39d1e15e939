//! The unit registry: named unit definitions, SI prefixes, physical-type
//! names, the concentration/rate pattern tables, and equivalencies.
//!
//! A registry is configured up front (custom units, molecule volume) and
//! then shared read-only by the models built against it.

use std::collections::HashMap;

use ku_core::{Mass, MolarConc, Time, Volume, cubic_meters};
use uom::si::{mass, molar_concentration, time, volume};

use crate::category::Category;
use crate::convert::{Equivalency, MOLECULES, MOLECULES_EQUIVALENCY, conversion_factor};
use crate::dimension::Dimension;
use crate::error::{ConfigurationError, UnitError, UnitResult};
use crate::parse::parse_unit;
use crate::unit::{PhysicalUnit, UnitFactor};

/// SI prefixes; two-letter `da` first so it wins over `d`.
const PREFIXES: &[(&str, f64)] = &[
    ("da", 1e1),
    ("Q", 1e30),
    ("R", 1e27),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("μ", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
    ("y", 1e-24),
    ("r", 1e-27),
    ("q", 1e-30),
];

/// Prefixes molar concentration does not take (`MM`, `kM`, ... read badly).
const MOLAR_EXCLUDED_PREFIXES: &[&str] = &[
    "Q", "R", "Y", "Z", "E", "P", "T", "G", "M", "k", "h", "da", "z", "y", "r", "q",
];

/// Which SI prefixes a unit symbol accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum PrefixPolicy {
    Unprefixed,
    AllPrefixes,
    AllExcept(Vec<String>),
}

impl PrefixPolicy {
    /// Every prefix except the listed ones.
    pub fn all_except(excluded: &[&str]) -> Self {
        Self::AllExcept(excluded.iter().map(|p| p.to_string()).collect())
    }

    fn allows(&self, prefix: &str) -> bool {
        match self {
            Self::Unprefixed => false,
            Self::AllPrefixes => true,
            Self::AllExcept(excluded) => !excluded.iter().any(|p| p == prefix),
        }
    }
}

/// A named unit: its coherent-SI scale and its dimension.
#[derive(Debug, Clone)]
pub struct UnitDef {
    pub symbol: String,
    pub scale: f64,
    pub dimension: Dimension,
    pub prefixes: PrefixPolicy,
    pub doc: String,
}

/// A unit pattern that marks a role (concentration, zero-order rate).
#[derive(Debug, Clone)]
pub struct Pattern {
    pub text: String,
    pub dimension: Dimension,
}

#[derive(Debug, Clone)]
pub struct UnitRegistry {
    definitions: HashMap<String, UnitDef>,
    physical_types: Vec<(Dimension, String)>,
    concentration_patterns: Vec<Pattern>,
    rate_patterns: Vec<Pattern>,
    equivalencies: Vec<Equivalency>,
}

impl Default for UnitRegistry {
    /// Registry with the built-in biology unit set.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.install_builtins();
        registry
    }
}

impl UnitRegistry {
    /// Registry without any definitions.
    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
            physical_types: Vec::new(),
            concentration_patterns: Vec::new(),
            rate_patterns: Vec::new(),
            equivalencies: Vec::new(),
        }
    }

    fn insert(
        &mut self,
        symbol: &str,
        scale: f64,
        dimension: Dimension,
        prefixes: PrefixPolicy,
        doc: &str,
    ) {
        self.definitions.insert(
            symbol.to_string(),
            UnitDef {
                symbol: symbol.to_string(),
                scale,
                dimension,
                prefixes,
                doc: doc.to_string(),
            },
        );
    }

    fn install_builtins(&mut self) {
        use PrefixPolicy::{AllPrefixes, Unprefixed};

        let sec = |t: Time| t.get::<time::second>();
        self.insert("s", 1.0, Dimension::time(), AllPrefixes, "second");
        self.insert("min", sec(Time::new::<time::minute>(1.0)), Dimension::time(), Unprefixed, "minute");
        self.insert("h", sec(Time::new::<time::hour>(1.0)), Dimension::time(), Unprefixed, "hour");
        self.insert("hr", sec(Time::new::<time::hour>(1.0)), Dimension::time(), Unprefixed, "hour");
        self.insert("d", sec(Time::new::<time::day>(1.0)), Dimension::time(), Unprefixed, "day");
        self.insert("day", sec(Time::new::<time::day>(1.0)), Dimension::time(), Unprefixed, "day");
        self.insert("yr", sec(Time::new::<time::year>(1.0)), Dimension::time(), Unprefixed, "year");
        self.insert("Hz", 1.0, Dimension::frequency(), AllPrefixes, "hertz");

        self.insert("m", 1.0, Dimension::length(), AllPrefixes, "meter");
        let liter = Volume::new::<volume::liter>(1.0).get::<volume::cubic_meter>();
        self.insert("L", liter, Dimension::volume(), AllPrefixes, "liter");
        self.insert("l", liter, Dimension::volume(), AllPrefixes, "liter");
        self.insert(
            "g",
            Mass::new::<mass::gram>(1.0).get::<mass::kilogram>(),
            Dimension::mass(),
            AllPrefixes,
            "gram",
        );
        self.insert("mol", 1.0, Dimension::amount(), AllPrefixes, "mole");
        self.insert(
            "M",
            MolarConc::new::<molar_concentration::mole_per_liter>(1.0)
                .get::<molar_concentration::mole_per_cubic_meter>(),
            Dimension::molar_concentration(),
            PrefixPolicy::all_except(MOLAR_EXCLUDED_PREFIXES),
            "molar concentration (M)",
        );
        self.insert(
            "mcg",
            Mass::new::<mass::microgram>(1.0).get::<mass::kilogram>(),
            Dimension::mass(),
            Unprefixed,
            "alias for microgram (ug)",
        );
        self.insert("cell", 1.0, Dimension::named("cell"), Unprefixed, "cell unit");
        self.insert("cells", 1.0, Dimension::named("cell"), Unprefixed, "cell unit");
        self.insert(MOLECULES, 1.0, Dimension::named(MOLECULES), Unprefixed, "number of molecules");
        self.insert("molec", 1.0, Dimension::named(MOLECULES), Unprefixed, "number of molecules");

        let length = Dimension::length;
        let per_time = || Dimension::time().recip();
        let names: [(Dimension, &str); 21] = [
            (Dimension::dimensionless(), "dimensionless"),
            (Dimension::time(), "time"),
            (Dimension::frequency(), "frequency"),
            (length(), "length"),
            (length().powi(2), "area"),
            (Dimension::volume(), "volume"),
            (Dimension::mass(), "mass"),
            (Dimension::amount(), "amount of substance"),
            (Dimension::molar_concentration(), "molar concentration"),
            (Dimension::mass().div(&Dimension::volume()), "mass density"),
            (Dimension::mass().div(&length().powi(2)), "surface mass density"),
            (length().powi(-3), "number density"),
            (length().powi(-2), "column density"),
            (Dimension::amount().mul(&per_time()), "catalytic activity"),
            (Dimension::named("cell"), "cell"),
            (Dimension::named("cell").recip(), "number per cell"),
            (Dimension::named("cell").mul(&per_time()), "cellular reaction rate"),
            (Dimension::amount().div(&length().powi(2)), "mole area density"),
            (Dimension::mass().mul(&per_time()), "mass velocity"),
            (Dimension::named(MOLECULES), "number of molecules"),
            (Dimension::volume().mul(&per_time()), "volumetric flow rate"),
        ];
        for (dim, name) in names {
            self.physical_types.push((dim, name.to_string()));
        }

        // These only reference the definitions installed above.
        for text in ["M", "g/m^3", "g/m^2", "1/cell", "mol/m^2", "m^-3", "m^-2", MOLECULES] {
            if let Ok(unit) = self.parse(text) {
                self.concentration_patterns.push(Pattern {
                    text: text.to_string(),
                    dimension: unit.dimension(),
                });
            }
        }
        for text in ["M/s", "mol/s", "g/s", "m^-2/s", "m^-3/s", "1/(cell*s)", "molecules/s"] {
            if let Ok(unit) = self.parse(text) {
                self.rate_patterns.push(Pattern {
                    text: text.to_string(),
                    dimension: unit.dimension(),
                });
            }
        }
    }


    /// Define `symbol` as an alias or compound of existing units, e.g.
    /// `define_unit("mcg", "ug", ...)` or `define_unit("nM_per_h", "nM/h", ...)`.
    pub fn define_unit(
        &mut self,
        symbol: &str,
        definition: &str,
        prefixes: PrefixPolicy,
        doc: &str,
    ) -> Result<PhysicalUnit, ConfigurationError> {
        if self.definitions.contains_key(symbol) {
            return Err(ConfigurationError::DuplicateDefinition {
                symbol: symbol.to_string(),
            });
        }
        let unit = self.parse(definition)?;
        self.insert(symbol, unit.scale(), unit.dimension(), prefixes, doc);
        tracing::debug!(symbol, definition, "defined unit");
        Ok(unit)
    }

    /// Define `symbol` as a new counting dimension of its own.
    pub fn define_base_unit(
        &mut self,
        symbol: &str,
        prefixes: PrefixPolicy,
        doc: &str,
    ) -> Result<(), ConfigurationError> {
        if self.definitions.contains_key(symbol) {
            return Err(ConfigurationError::DuplicateDefinition {
                symbol: symbol.to_string(),
            });
        }
        self.insert(symbol, 1.0, Dimension::named(symbol), prefixes, doc);
        Ok(())
    }

    /// Name the physical type of `unit`'s dimension; later names win.
    pub fn define_physical_type(&mut self, unit: &str, name: &str) -> UnitResult<()> {
        let dim = self.parse(unit)?.dimension();
        self.physical_types.retain(|(d, _)| *d != dim);
        self.physical_types.push((dim, name.to_string()));
        Ok(())
    }

    /// Register another unit pattern that counts as a concentration.
    pub fn add_concentration_pattern(&mut self, unit: &str) -> UnitResult<()> {
        let dimension = self.parse(unit)?.dimension();
        self.concentration_patterns.push(Pattern {
            text: unit.to_string(),
            dimension,
        });
        Ok(())
    }

    /// Register another unit pattern that counts as a zero-order rate.
    pub fn add_rate_pattern(&mut self, unit: &str) -> UnitResult<()> {
        let dimension = self.parse(unit)?.dimension();
        self.rate_patterns.push(Pattern {
            text: unit.to_string(),
            dimension,
        });
        Ok(())
    }

    /// Definition registered under `symbol`, without prefix resolution.
    pub fn definition(&self, symbol: &str) -> Option<&UnitDef> {
        self.definitions.get(symbol)
    }

    /// Units that count as concentrations.
    pub fn concentration_patterns(&self) -> &[Pattern] {
        &self.concentration_patterns
    }

    /// Units that count as zero-order rates.
    pub fn rate_patterns(&self) -> &[Pattern] {
        &self.rate_patterns
    }


    /// Set the reference volume for molar concentration <-> molecule count
    /// conversions, replacing any previous one.
    pub fn set_molecule_volume(&mut self, value: f64, unit: &str) -> Result<Volume, ConfigurationError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigurationError::NonPositiveVolume { value });
        }
        let parsed = self.parse(unit)?;
        if parsed.dimension() != Dimension::volume() {
            return Err(ConfigurationError::NotAVolume {
                unit: unit.to_string(),
            });
        }
        let volume = cubic_meters(value * parsed.scale());
        self.equivalencies.retain(|eq| eq.name != MOLECULES_EQUIVALENCY);
        self.equivalencies.push(Equivalency::molar_to_molecules(volume));
        tracing::debug!(value, unit, "molecule volume set");
        Ok(volume)
    }

    /// Reference volume of the molecule-count equivalency, if set.
    pub fn molecule_volume(&self) -> Option<Volume> {
        self.equivalencies
            .iter()
            .find(|eq| eq.name == MOLECULES_EQUIVALENCY)
            .map(|eq| cubic_meters(eq.factor / ku_core::constants::AVOGADRO_PER_MOL))
    }

    /// Active equivalencies, applied when dimensions differ.
    pub fn equivalencies(&self) -> &[Equivalency] {
        &self.equivalencies
    }


    /// Parse a unit expression such as `"1/(uM*s)"`.
    pub fn parse(&self, text: &str) -> UnitResult<PhysicalUnit> {
        parse_unit(text, |symbol| self.resolve(symbol))
    }

    /// Resolve a single symbol, trying exact definitions before prefixes.
    fn resolve(&self, symbol: &str) -> UnitResult<UnitFactor> {
        if let Some(def) = self.definitions.get(symbol) {
            return Ok(UnitFactor::new(symbol, def.scale, def.dimension.clone()));
        }
        for (prefix, factor) in PREFIXES {
            let Some(rest) = symbol.strip_prefix(prefix) else {
                continue;
            };
            if let Some(def) = self.definitions.get(rest)
                && def.prefixes.allows(prefix)
            {
                return Ok(UnitFactor::new(
                    symbol,
                    factor * def.scale,
                    def.dimension.clone(),
                ));
            }
        }
        Err(UnitError::UnknownUnit {
            symbol: symbol.to_string(),
        })
    }

    /// Factor to multiply a value in `from` by to express it in `to`.
    pub fn conversion_factor(&self, from: &PhysicalUnit, to: &PhysicalUnit) -> UnitResult<f64> {
        conversion_factor(from, to, &self.equivalencies)
    }

    /// `value` in `from` expressed in `to`.
    pub fn convert_value(&self, value: f64, from: &PhysicalUnit, to: &PhysicalUnit) -> UnitResult<f64> {
        Ok(value * self.conversion_factor(from, to)?)
    }


    /// Registered physical-type name, falling back to the dimension formula.
    pub fn physical_type(&self, unit: &PhysicalUnit) -> String {
        self.physical_type_of(&unit.dimension())
    }

    /// Registered physical-type name of a dimension, if any.
    pub fn physical_type_of(&self, dim: &Dimension) -> String {
        self.physical_types
            .iter()
            .find(|(d, _)| d == dim)
            .map(|(_, name)| name.clone())
            .unwrap_or_else(|| dim.to_string())
    }

    /// Does `unit` match a registered concentration pattern?
    pub fn is_concentration(&self, unit: &PhysicalUnit) -> bool {
        self.is_concentration_dim(&unit.dimension())
    }

    fn is_concentration_dim(&self, dim: &Dimension) -> bool {
        self.concentration_patterns.iter().any(|p| p.dimension == *dim)
    }

    /// Does `unit` match a registered zero-order rate pattern?
    pub fn is_zero_order_rate_constant(&self, unit: &PhysicalUnit) -> bool {
        let dim = unit.dimension();
        self.rate_patterns.iter().any(|p| p.dimension == dim)
    }

    /// Is `unit` an inverse time?
    pub fn is_first_order_rate_constant(&self, unit: &PhysicalUnit) -> bool {
        unit.dimension() == Dimension::frequency()
    }

    /// Is `unit` an inverse concentration per time?
    pub fn is_second_order_rate_constant(&self, unit: &PhysicalUnit) -> bool {
        self.is_rate_constant_for(unit, 2)
    }

    /// Does `unit` fit a mass-action rate constant for `reactants` consumed
    /// reactants, i.e. concentration^(1-n) · time^-1?
    pub fn is_rate_constant_for(&self, unit: &PhysicalUnit, reactants: u32) -> bool {
        match reactants {
            0 => self.is_zero_order_rate_constant(unit),
            1 => self.is_first_order_rate_constant(unit),
            n => {
                let Ok(power) = i32::try_from(n - 1) else {
                    return false;
                };
                // dim · T = C^-(n-1)  =>  C^(n-1) = (dim · T)^-1
                let conc_power = unit.dimension().mul(&Dimension::time()).recip();
                self.concentration_patterns
                    .iter()
                    .any(|p| p.dimension.powi(power) == conc_power)
            }
        }
    }

    /// Classify `unit` into the category used for consistency grouping.
    pub fn categorize(&self, unit: &PhysicalUnit) -> Category {
        let dim = unit.dimension();
        if dim.is_dimensionless() {
            return Category::Dimensionless;
        }
        if self.is_concentration_dim(&dim) {
            return Category::Concentration;
        }
        if self.is_zero_order_rate_constant(unit) {
            return Category::RateConstant { order: 0 };
        }
        if dim == Dimension::frequency() {
            return Category::RateConstant { order: 1 };
        }
        if let Some(order) = (2..=3).find(|n| self.is_rate_constant_for(unit, *n)) {
            return Category::RateConstant { order };
        }
        if dim == Dimension::time() {
            return Category::Time;
        }
        if dim == Dimension::mass() {
            return Category::Mass;
        }
        if dim == Dimension::volume() {
            return Category::Volume;
        }
        Category::Other(self.physical_type_of(&dim))
    }
}
