//! ku-units: runtime unit algebra for kinetic models.
//!
//! - dimension: base-dimension exponent vectors
//! - unit: named compound units with SI scale
//! - registry: definitions, prefixes, physical types, equivalencies
//! - category: role classification (concentration, time, rate constants)
//! - convert: conversion factors across dimensions via equivalencies

pub mod category;
pub mod convert;
pub mod dimension;
pub mod error;
mod parse;
pub mod registry;
pub mod unit;

pub use category::Category;
pub use convert::{Equivalency, MOLECULES, MOLECULES_EQUIVALENCY, conversion_factor};
pub use dimension::{BaseDimension, Dimension};
pub use error::{ConfigurationError, UnitError, UnitResult};
pub use registry::{Pattern, PrefixPolicy, UnitDef, UnitRegistry};
pub use unit::{PhysicalUnit, UnitFactor};
