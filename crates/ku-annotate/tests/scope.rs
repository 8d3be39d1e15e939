mod common;

use std::panic::{self, AssertUnwindSafe};

use common::{capture, close, degradation};
use ku_annotate::{
    AnnotateError, AnnotateResult, ComponentBuilder, FindingKind, IntoUnitModel, UnitModel, units,
};
use ku_model::{Model, macros};

#[test]
fn scope_checks_after_definition() {
    let scoped = units(Model::new("scoped"), |m| {
        m.set_simulation_units("uM", "s", None)?;
        let (k, _) = degradation(m, "1/min", "nM");
        Ok(k)
    });
    let k = scoped.result.unwrap();
    assert!(close(scoped.model.value(k).unwrap(), 0.1 / 60.0));
    assert!(scoped.report.is_clean(), "{:?}", scoped.report.findings);
}

#[test]
fn scope_checks_even_when_definition_fails() {
    let scoped = units(Model::new("failing"), |m| {
        m.parameter("k", 1.0)?;
        m.parameter_with_unit("k2", 1.0, "1/parsec")?;
        Ok(())
    });
    assert!(matches!(scoped.result, Err(AnnotateError::Unit(_))));
    assert_eq!(scoped.report.count(FindingKind::MissingUnit), 1);
    assert!(scoped.model.model().lookup("k2").is_none());
}

#[test]
fn scope_checks_before_a_panic_propagates() {
    let (outcome, captured) = capture(|| {
        panic::catch_unwind(AssertUnwindSafe(|| {
            units(Model::new("panicking"), |m| -> AnnotateResult<()> {
                m.parameter("k", 1.0)?;
                panic!("definition blew up")
            })
        }))
    });
    assert!(outcome.is_err());
    let warnings = captured.targets("ku_annotate::check");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("'k'"));
}

#[test]
fn unitizing_is_idempotent() {
    let mut model = UnitModel::new("twice");
    model.set_simulation_units("nM", "h", None).unwrap();
    model.parameter_with_unit("k", 1.0, "1/h").unwrap();

    let again = model.clone().unitize().unitize();
    assert_eq!(again.units().len(), 1);
    assert_eq!(again.simulation_units().unwrap().time(), "h");
    assert_eq!(again.unit_map(), model.unit_map());
}

#[test]
fn unitized_plain_model_has_no_units_yet() {
    let mut plain = Model::new("plain");
    plain.add_parameter("k", 0.5).unwrap();
    let model = plain.unitize();
    assert!(model.units().is_empty());
    assert!(model.simulation_units().is_none());
    assert_eq!(model.value(model.model().lookup("k").unwrap()), Some(0.5));
}

#[test]
fn apply_macro_reports_created_components() {
    let mut model = UnitModel::new("macro");
    model.set_simulation_units("uM", "s", None).unwrap();
    let a = model.monomer("A", &["b"]).unwrap();
    let b = model.monomer("B", &["a"]).unwrap();

    let (rule, created) = model
        .apply_macro(|m| {
            let kf = m.parameter_with_unit("kf", 1e-3, "1/(nM*s)")?;
            let kr = m.parameter_with_unit("kr", 6.0, "1/min")?;
            let pa = m.pattern(a)?;
            let pb = m.pattern(b)?;
            macros::bind(m, pa, "b", pb, "a", kf, kr)
        })
        .unwrap();

    assert_eq!(created.len(), 3);
    assert_eq!(*created.last().unwrap(), rule);
    let kf = model.model().lookup("kf").unwrap();
    let kr = model.model().lookup("kr").unwrap();
    assert!(close(model.value(kf).unwrap(), 1.0));
    assert!(close(model.value(kr).unwrap(), 0.1));
    assert_eq!(model.unit_map()["kf"], "1/(uM*s)");
}
