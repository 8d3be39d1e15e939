use crate::KuError;

/// Absolute and relative slack for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerances {
    /// Purely relative comparison, for values spanning many decades.
    pub const fn relative(rel: f64) -> Self {
        Self { abs: 0.0, rel }
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// Equal within the absolute or relative tolerance.
pub fn nearly_equal(a: f64, b: f64, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// Do two unit scale factors describe the same unit?
///
/// Scales range from femto prefixes to Avogadro-sized counts, so only a
/// relative comparison is meaningful.
pub fn same_scale(a: f64, b: f64) -> bool {
    nearly_equal(a, b, Tolerances::relative(1e-9))
}

/// Reject NaN and infinities before they reach a model.
pub fn ensure_finite(value: f64, what: &'static str) -> Result<f64, KuError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(KuError::NonFinite { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absolute_slack_near_zero() {
        let tol = Tolerances::default();
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(0.0, 1e-6, tol));
    }

    #[test]
    fn relative_slack_at_scale() {
        assert!(same_scale(6.022e23, 6.022e23 * (1.0 + 1e-12)));
        assert!(same_scale(1e-21, 1e-21 * (1.0 - 1e-10)));
        assert!(!same_scale(1e-15, 2e-15));
        assert!(!nearly_equal(1e-3, 1e-3 + 1e-6, Tolerances::relative(1e-9)));
    }

    #[test]
    fn non_finite_values_are_named() {
        let err = ensure_finite(f64::INFINITY, "parameter value").unwrap_err();
        assert!(err.to_string().contains("parameter value"));
        assert_eq!(ensure_finite(0.5, "x").unwrap(), 0.5);
    }

    proptest! {
        #[test]
        fn comparison_is_symmetric(a in -1e30f64..1e30, b in -1e30f64..1e30) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn rounding_noise_keeps_scale(exp in -30i32..30, noise in -1e-12f64..1e-12) {
            let scale = 10f64.powi(exp);
            prop_assert!(same_scale(scale, scale * (1.0 + noise)));
        }
    }
}
