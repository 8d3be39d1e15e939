//! ku-model: the rule-based model definition layer for kinunits.
//!
//! Provides:
//! - Monomers, patterns and rule expressions
//! - Parameters, rules, initials, observables and symbolic expressions
//! - A model container with name lookup and construction-time validation
//! - The `ComponentBuilder` protocol that macros build against
//! - Reaction-order inference for rules
//!
//! # Example
//!
//! ```
//! use ku_model::{ComponentBuilder, Model, ReactionOrder, RuleExpression};
//!
//! let mut model = Model::new("decay");
//! let a = model.monomer("A", &[]).unwrap();
//! let k = model.parameter("k", 0.1).unwrap();
//! let expr = RuleExpression::irreversible(vec![model.pattern(a).unwrap().into()], vec![]);
//! let r = model.rule("A_decays", expr, k, None).unwrap();
//!
//! assert_eq!(model.get_rule(r).unwrap().forward_order, ReactionOrder::First);
//! ```

pub mod builder;
pub mod component;
pub mod error;
pub mod expr;
pub mod macros;
pub mod model;
pub mod order;
pub mod pattern;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::ComponentBuilder;
pub use component::{
    Component, ComponentKind, Expression, Initial, Monomer, Observable, ObservableKind, Parameter,
    Rule,
};
pub use error::{ModelError, ModelResult};
pub use expr::{Expr, Func};
pub use model::Model;
pub use order::ReactionOrder;
pub use pattern::{ComplexPattern, MonomerPattern, RuleExpression, SiteCondition};
