//! Reusable rule-building helpers.
//!
//! Each helper creates its rules through a [`ComponentBuilder`], so whatever
//! the builder checks on `rule` applies to the rules created here too. Rates
//! are passed as already-declared parameters or expressions.

use ku_core::ComponentId;

use crate::builder::ComponentBuilder;
use crate::pattern::{ComplexPattern, MonomerPattern, RuleExpression, SiteCondition};

/// Rule-name fragment for a complex: monomer names joined by `_`.
fn complex_name(cp: &ComplexPattern) -> String {
    cp.monomers
        .iter()
        .map(|mp| mp.name.as_str())
        .collect::<Vec<_>>()
        .join("_")
}

/// `None >> species` at rate `k` (zero order).
pub fn synthesize<B: ComponentBuilder>(
    builder: &mut B,
    species: ComplexPattern,
    k: ComponentId,
) -> Result<ComponentId, B::Error> {
    let name = format!("synthesize_{}", complex_name(&species));
    builder.rule(&name, RuleExpression::irreversible(vec![], vec![species]), k, None)
}

/// `species >> None` at rate `k` (first order).
pub fn degrade<B: ComponentBuilder>(
    builder: &mut B,
    species: ComplexPattern,
    k: ComponentId,
) -> Result<ComponentId, B::Error> {
    let name = format!("degrade_{}", complex_name(&species));
    builder.rule(&name, RuleExpression::irreversible(vec![species], vec![]), k, None)
}

/// `s1 | s2` with forward `kf` and reverse `kr` (both first order).
pub fn equilibrate<B: ComponentBuilder>(
    builder: &mut B,
    s1: ComplexPattern,
    s2: ComplexPattern,
    kf: ComponentId,
    kr: ComponentId,
) -> Result<ComponentId, B::Error> {
    let name = format!("equilibrate_{}_to_{}", complex_name(&s1), complex_name(&s2));
    builder.rule(&name, RuleExpression::reversible(vec![s1], vec![s2]), kf, Some(kr))
}

/// Reversible binding of `a` and `b` through `site_a`/`site_b`:
/// `A(s=None) + B(t=None) | A(s=1) % B(t=1)`.
pub fn bind<B: ComponentBuilder>(
    builder: &mut B,
    a: MonomerPattern,
    site_a: &str,
    b: MonomerPattern,
    site_b: &str,
    kf: ComponentId,
    kr: ComponentId,
) -> Result<ComponentId, B::Error> {
    let name = format!("bind_{}_{}", a.name, b.name);
    let free_a = a.clone().site(site_a, SiteCondition::Unbound);
    let free_b = b.clone().site(site_b, SiteCondition::Unbound);
    let bound = a.site(site_a, SiteCondition::Bond(1)) % b.site(site_b, SiteCondition::Bond(1));
    builder.rule(
        &name,
        RuleExpression::reversible(vec![free_a.into(), free_b.into()], vec![bound]),
        kf,
        Some(kr),
    )
}

/// Two-step Michaelis-Menten catalysis:
/// `E + S | E:S` (kf, kr) then `E:S >> E + P` (kc).
///
/// Returns the ids of the binding rule and the conversion rule.
pub fn catalyze<B: ComponentBuilder>(
    builder: &mut B,
    enzyme: MonomerPattern,
    e_site: &str,
    substrate: MonomerPattern,
    s_site: &str,
    product: ComplexPattern,
    rates: [ComponentId; 3],
) -> Result<(ComponentId, ComponentId), B::Error> {
    let [kf, kr, kc] = rates;
    let bind_rule = bind(builder, enzyme.clone(), e_site, substrate.clone(), s_site, kf, kr)?;

    let name = format!(
        "catalyze_{}_{}_to_{}",
        enzyme.name,
        substrate.name,
        complex_name(&product)
    );
    let complex = enzyme.clone().site(e_site, SiteCondition::Bond(1))
        % substrate.site(s_site, SiteCondition::Bond(1));
    let free_enzyme = enzyme.site(e_site, SiteCondition::Unbound);
    let convert_rule = builder.rule(
        &name,
        RuleExpression::irreversible(vec![complex], vec![free_enzyme.into(), product]),
        kc,
        None,
    )?;
    Ok((bind_rule, convert_rule))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::order::ReactionOrder;

    #[test]
    fn catalysis_creates_two_rules_with_expected_orders() {
        let mut m = Model::new("mm");
        let e = m.add_monomer("E", &["s"]).unwrap();
        let s = m.add_monomer("S", &["e"]).unwrap();
        let p = m.add_monomer("P", &[]).unwrap();
        let kf = m.add_parameter("kf", 1.0).unwrap();
        let kr = m.add_parameter("kr", 0.1).unwrap();
        let kc = m.add_parameter("kc", 0.01).unwrap();

        let (pe, ps, pp) = (
            m.pattern(e).unwrap(),
            m.pattern(s).unwrap(),
            m.pattern(p).unwrap(),
        );
        let (b, c) = catalyze(&mut m, pe, "s", ps, "e", pp.into(), [kf, kr, kc]).unwrap();

        let bind_rule = m.get_rule(b).unwrap();
        assert_eq!(bind_rule.name, "bind_E_S");
        assert_eq!(bind_rule.forward_order, ReactionOrder::Second);
        assert_eq!(bind_rule.reverse_order, Some(ReactionOrder::First));

        let convert_rule = m.get_rule(c).unwrap();
        assert_eq!(convert_rule.name, "catalyze_E_S_to_P");
        assert_eq!(convert_rule.forward_order, ReactionOrder::First);
        assert_eq!(
            convert_rule.expression.to_string(),
            "E(s=1) % S(e=1) >> E(s=None) + P()"
        );
    }

    #[test]
    fn synthesis_is_zero_order() {
        let mut m = Model::new("syn");
        let a = m.add_monomer("A", &[]).unwrap();
        let k = m.add_parameter("k_syn", 1.0).unwrap();
        let pa = m.pattern(a).unwrap();
        let r = synthesize(&mut m, pa.into(), k).unwrap();
        assert_eq!(m.get_rule(r).unwrap().forward_order, ReactionOrder::Zero);
        assert_eq!(m.get_rule(r).unwrap().name, "synthesize_A");
    }
}
