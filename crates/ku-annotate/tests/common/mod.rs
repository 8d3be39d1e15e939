#![allow(dead_code)]

use ku_annotate::{ComponentBuilder, UnitModel};
use ku_core::ComponentId;
use ku_model::{ComplexPattern, macros};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// Show construction and check warnings in test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub fn close(a: f64, b: f64) -> bool {
    ku_core::nearly_equal(a, b, ku_core::Tolerances { abs: 0.0, rel: 1e-9 })
}

/// `Protein` with a degradation rule and an initial amount.
///
/// Returns (k_deg, protein_0).
pub fn degradation(
    model: &mut UnitModel,
    k_unit: &str,
    amount_unit: &str,
) -> (ComponentId, ComponentId) {
    let protein = model.monomer("Protein", &[]).unwrap();
    let k_deg = model.parameter_with_unit("k_deg", 0.1, k_unit).unwrap();
    let protein_0 = model
        .parameter_with_unit("protein_0", 500.0, amount_unit)
        .unwrap();
    let pattern: ComplexPattern = model.pattern(protein).unwrap().into();
    model.initial(pattern.clone(), protein_0).unwrap();
    macros::degrade(model, pattern.clone(), k_deg).unwrap();
    model.observable("Protein_total", vec![pattern]).unwrap();
    (k_deg, protein_0)
}

/// Records the target and message of every event it sees.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<(String, String)>>>);

impl Captured {
    pub fn targets(&self, target: &str) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}

impl<S: Subscriber> Layer<S> for Captured {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.0
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), message));
    }
}

/// Run `f` with a capturing subscriber installed for this thread.
pub fn capture<T>(f: impl FnOnce() -> T) -> (T, Captured) {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, captured)
}
