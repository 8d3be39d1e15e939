mod common;

use common::{close, degradation, init_tracing};
use ku_annotate::{
    AnnotateError, AnnotationSource, AttachOutcome, ComponentBuilder, FindingKind, UnitModel,
    UnitSpec, check,
};
use ku_units::{ConfigurationError, UnitError};
use proptest::prelude::*;

#[test]
fn degradation_model_converts_to_simulation_units() {
    init_tracing();
    let mut model = UnitModel::new("degradation");
    model.set_simulation_units("uM", "s", None).unwrap();
    let (k_deg, protein_0) = degradation(&mut model, "1/s", "nM");

    assert!(close(model.value(protein_0).unwrap(), 0.5));
    assert_eq!(model.annotation(protein_0).unwrap().unit.text(), "uM");
    assert!(close(model.value(k_deg).unwrap(), 0.1));
    assert_eq!(model.unit_map()["k_deg"], "1/s");
    assert_eq!(model.unit_map()["Protein_total"], "uM");

    let report = check(&model);
    assert!(report.is_clean(), "{:?}", report.findings);
}

#[test]
fn reattaching_the_same_unit_is_a_no_op() {
    let mut model = UnitModel::new("idem");
    model.set_simulation_units("uM", "s", None).unwrap();
    let p = model.parameter_with_unit("A_0", 250.0, "nM").unwrap();
    let before = model.value(p).unwrap();

    assert_eq!(model.attach(p, "nM").unwrap(), AttachOutcome::Unchanged);
    assert_eq!(model.attach(p, "uM").unwrap(), AttachOutcome::Unchanged);
    assert_eq!(model.value(p).unwrap(), before);
    assert_eq!(model.units().len(), 1);
}

#[test]
fn a_different_unit_is_recorded_as_conflict_and_not_applied() {
    let mut model = UnitModel::new("dup");
    let k = model.parameter_with_unit("k", 2.0, "1/s").unwrap();
    assert_eq!(model.attach(k, "1/h").unwrap(), AttachOutcome::Conflict);

    assert_eq!(model.value(k).unwrap(), 2.0);
    assert_eq!(model.annotation(k).unwrap().unit.text(), "1/s");
    assert_eq!(model.units().len(), 2);

    let report = check(&model);
    assert_eq!(report.count(FindingKind::DuplicateUnit), 1);
}

#[test]
fn simulation_units_convert_earlier_declarations_in_order() {
    let mut model = UnitModel::new("retro");
    let kf = model.parameter_with_unit("kf", 1.0, "1/(nM*h)").unwrap();
    let kr = model.parameter_with_unit("kr", 60.0, "1/min").unwrap();
    let a0 = model.parameter_with_unit("A_0", 2.0, "mM").unwrap();
    let n = model.parameter_with_unit("n", 3.0, None::<&str>).unwrap();

    model.set_simulation_units("uM", "s", None).unwrap();

    assert_eq!(model.annotation(kf).unwrap().unit.text(), "1/(uM*s)");
    assert!(close(model.value(kf).unwrap(), 1000.0 / 3600.0));
    assert_eq!(model.annotation(kr).unwrap().unit.text(), "1/s");
    assert!(close(model.value(kr).unwrap(), 1.0));
    assert_eq!(model.annotation(a0).unwrap().unit.text(), "uM");
    assert!(close(model.value(a0).unwrap(), 2000.0));
    assert_eq!(model.value(n).unwrap(), 3.0);
    assert_eq!(model.annotation(n).unwrap().value(), None);

    let names: Vec<_> = model.units().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["kf", "kr", "A_0", "n"]);
}

#[test]
fn only_one_simulation_units_per_model() {
    let mut model = UnitModel::new("twice");
    model.set_simulation_units("uM", "s", None).unwrap();
    let err = model.set_simulation_units("nM", "h", None).unwrap_err();
    assert!(matches!(
        err,
        AnnotateError::Configuration(ConfigurationError::DuplicateSimulationUnits { .. })
    ));
    assert_eq!(model.simulation_units().unwrap().concentration(), "uM");
}

#[test]
fn failed_retro_conversion_leaves_values_alone() {
    let mut model = UnitModel::new("atomic");
    let a = model.parameter_with_unit("A_0", 5.0, "nM").unwrap();
    let err = model.set_simulation_units("molecules", "s", None).unwrap_err();
    assert!(matches!(
        err,
        AnnotateError::Unit(UnitError::NoEquivalency { .. })
    ));
    assert_eq!(model.value(a).unwrap(), 5.0);
    assert!(model.simulation_units().is_none());
}

#[test]
fn molecule_counts_with_configured_volume() {
    let mut model = UnitModel::new("stochastic");
    model.set_molecule_volume(1.0, "pL").unwrap();
    model.set_simulation_units("molecules", "s", None).unwrap();
    let a = model.parameter_with_unit("A_0", 1.0, "nM").unwrap();
    let kf = model.parameter_with_unit("kf", 602.214076, "1/(nM*s)").unwrap();

    assert!(close(model.value(a).unwrap(), 602.214076));
    assert_eq!(model.annotation(a).unwrap().unit.text(), "molecules");
    assert!(close(model.value(kf).unwrap(), 1.0));
    assert_eq!(model.annotation(kf).unwrap().unit.text(), "1/(molecules*s)");
}

#[test]
fn molecule_volume_must_be_positive() {
    let mut model = UnitModel::new("bad_volume");
    assert!(matches!(
        model.set_molecule_volume(0.0, "pL"),
        Err(ConfigurationError::NonPositiveVolume { .. })
    ));
}

#[test]
fn explicit_conversion() {
    let mut model = UnitModel::new("convert");
    let k = model.parameter_with_unit("k", 3.6, "1/h").unwrap();
    let factor = model.convert(k, "1/s").unwrap();
    assert!(close(factor, 1.0 / 3600.0));
    assert!(close(model.value(k).unwrap(), 0.001));
    assert_eq!(model.annotation(k).unwrap().unit.text(), "1/s");

    let c = model.parameter("c", 1.0).unwrap();
    assert!(matches!(
        model.convert(c, "uM"),
        Err(AnnotateError::NotAnnotated { .. })
    ));
    assert!(matches!(
        model.convert(k, "uM"),
        Err(AnnotateError::Unit(UnitError::Incompatible { .. }))
    ));
}

#[test]
fn converting_a_dimensionless_component_is_skipped() {
    let mut model = UnitModel::new("ratio");
    let hill = model.parameter_with_unit("hill", 2.0, UnitSpec::Dimensionless).unwrap();
    assert_eq!(model.convert(hill, "uM").unwrap(), 1.0);
    assert_eq!(model.value(hill).unwrap(), 2.0);
}

#[test]
fn attach_converted_applies_target_without_simulation_units() {
    let mut model = UnitModel::new("attach_converted");
    let a = model.parameter("A_0", 100.0).unwrap();
    let outcome = model.attach_converted(a, "nM", "uM").unwrap();
    assert_eq!(outcome, AttachOutcome::Attached);
    assert!(close(model.value(a).unwrap(), 0.1));
    assert_eq!(model.annotation(a).unwrap().unit.text(), "uM");

    let b = model.parameter("B_0", 100.0).unwrap();
    assert!(model.attach_converted(b, "nM", "s").is_err());
    assert!(model.annotation(b).is_none());
    assert_eq!(model.value(b).unwrap(), 100.0);
}

#[test]
fn unparsable_units_fail_before_declaring() {
    let mut model = UnitModel::new("parse");
    let err = model.parameter_with_unit("k", 1.0, "1/fortnight").unwrap_err();
    assert!(matches!(err, AnnotateError::Unit(UnitError::UnknownUnit { .. })));
    assert!(model.model().lookup("k").is_none());
}

#[test]
fn units_only_attach_to_numeric_components() {
    let mut model = UnitModel::new("kinds");
    let a = model.monomer("A", &[]).unwrap();
    assert!(matches!(
        model.attach(a, "uM"),
        Err(AnnotateError::NotAnnotatable { kind: "monomer", .. })
    ));
}

#[test]
fn derived_units_compose_from_annotated_components() {
    let mut model = UnitModel::new("derived");
    let kf = model.parameter_with_unit("kf", 1.0, "1/(uM*s)").unwrap();
    let kr = model.parameter_with_unit("kr", 0.1, "1/s").unwrap();
    let kd = model.parameter("Kd", 0.1).unwrap();
    let ratio = model.symbol(kr).unwrap() / model.symbol(kf).unwrap();
    model.attach(kd, ratio).unwrap();
    assert_eq!(model.annotation(kd).unwrap().unit, model.registry().parse("uM").unwrap());
}

#[test]
fn observables_and_expressions_infer_units() {
    init_tracing();
    let mut model = UnitModel::new("infer");
    model.set_simulation_units("uM", "s", None).unwrap();
    let a = model.monomer("A", &[]).unwrap();
    let k = model.parameter_with_unit("k", 0.5, "1/s").unwrap();
    let pa = model.pattern(a).unwrap();
    let obs = model.observable("A_total", vec![pa.into()]).unwrap();

    let flux = model.symbol(k).unwrap() * model.symbol(obs).unwrap();
    let e = model.expression("flux", flux).unwrap();
    let ann = model.annotation(e).unwrap();
    assert_eq!(ann.unit, model.registry().parse("uM/s").unwrap());
    assert_eq!(ann.source, AnnotationSource::Inferred { issue: None });

    let bad = model.symbol(k).unwrap() + model.symbol(obs).unwrap();
    let e2 = model.expression("bad", bad).unwrap();
    let ann = model.annotation(e2).unwrap();
    assert!(ann.is_dimensionless());
    assert!(matches!(ann.source, AnnotationSource::Inferred { issue: Some(_) }));
    assert_eq!(check(&model).count(FindingKind::UncomposableExpression), 1);
}

#[test]
fn without_simulation_units_nothing_is_inferred() {
    let mut model = UnitModel::new("plain");
    let a = model.monomer("A", &[]).unwrap();
    let pa = model.pattern(a).unwrap();
    let obs = model.observable("A_total", vec![pa.into()]).unwrap();
    let twice = 2.0 * model.symbol(obs).unwrap();
    let e = model.expression("twice", twice).unwrap();
    assert!(model.annotation(obs).is_none());
    assert!(model.annotation(e).is_none());
}

#[test]
fn describe_shows_units() {
    let mut model = UnitModel::new("repr");
    let k = model.parameter_with_unit("k", 0.1, "1/s").unwrap();
    let n = model.parameter_with_unit("n", 2.0, None::<&str>).unwrap();
    let m = model.parameter("m", 1.0).unwrap();
    assert_eq!(model.describe(k).unwrap(), "Parameter('k', 0.1), unit=[1/s]");
    assert_eq!(model.describe(n).unwrap(), "Parameter('n', 2.0), unit=[None]");
    assert_eq!(model.describe(m).unwrap(), "Parameter('m', 1.0)");
    assert!(model.to_string().contains("Parameter('k', 0.1), unit=[1/s]"));
}

#[test]
fn registry_changes_stay_local_to_the_model() {
    let mut a = UnitModel::new("a");
    let b = UnitModel::with_registry("b", a.shared_registry());
    a.set_molecule_volume(1.0, "pL").unwrap();
    assert!(a.registry().molecule_volume().is_some());
    assert!(b.registry().molecule_volume().is_none());
}

const CONC: &[&str] = &["M", "mM", "uM", "nM", "pM"];

proptest! {
    #[test]
    fn convert_there_and_back(a in 0..CONC.len(), b in 0..CONC.len(), v in 1e-3f64..1e6) {
        let mut model = UnitModel::new("round_trip");
        let p = model.parameter_with_unit("x", v, CONC[a]).unwrap();
        model.convert(p, CONC[b]).unwrap();
        model.convert(p, CONC[a]).unwrap();
        prop_assert!(close(model.value(p).unwrap(), v));
    }

    #[test]
    fn simulation_units_rescale_by_conversion_factor(a in 0..CONC.len(), c in 0..CONC.len(), v in 1e-3f64..1e6) {
        let mut model = UnitModel::new("rescale");
        model.set_simulation_units(CONC[c], "s", None).unwrap();
        let p = model.parameter_with_unit("x", v, CONC[a]).unwrap();

        let reg = model.registry();
        let factor = reg
            .conversion_factor(&reg.parse(CONC[a]).unwrap(), &reg.parse(CONC[c]).unwrap())
            .unwrap();
        prop_assert!(close(model.value(p).unwrap(), v * factor));
        prop_assert_eq!(model.annotation(p).unwrap().unit.text(), CONC[c]);
    }
}
