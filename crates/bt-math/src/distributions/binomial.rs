//! Binomial distribution helpers.
//!
//! [`peizer_pratt_method2_inversion`] maps a normal quantile to the binomial
//! success probability that reproduces it on an odd number of trials; it is
//! the building block of the Leisen-Reimer lattice. [`binomial_pmf`] wraps
//! `statrs` and is used to cross-check lattice rollbacks against the
//! closed-form binomial expectation.

use bt_core::{ensure, errors::Result, Error, Real};
use statrs::distribution::{Binomial, Discrete};

/// Peizer-Pratt method 2 inversion.
///
/// Returns the probability `p ∈ [0, 1]` such that a binomial distribution
/// with `n` trials approximates `Φ(z)` at its median. `n` must be odd.
///
/// Reference: Leisen & Reimer (1996), eq. (7).
pub fn peizer_pratt_method2_inversion(z: Real, n: usize) -> Result<Real> {
    ensure!(n % 2 == 1, "Peizer-Pratt inversion requires an odd number of steps, got {n}");
    let nf = n as Real;
    let r = z / (nf + 1.0 / 3.0 + 0.1 / (nf + 1.0));
    let ex = (-r * r * (nf + 1.0 / 6.0)).exp();
    let sign = if z > 0.0 { 1.0 } else { -1.0 };
    Ok(0.5 + sign * (0.25 * (1.0 - ex)).sqrt())
}

/// Probability mass `P(X = k)` of a binomial distribution with `n` trials and
/// success probability `p`.
pub fn binomial_pmf(p: Real, n: u64, k: u64) -> Result<Real> {
    let dist = Binomial::new(p, n)
        .map_err(|e| Error::InvalidArgument(format!("binomial({n}, {p}): {e}")))?;
    Ok(dist.pmf(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn peizer_pratt_centre_is_one_half() {
        let p = peizer_pratt_method2_inversion(0.0, 101).unwrap();
        assert_abs_diff_eq!(p, 0.5, epsilon = 1e-15);
    }

    #[test]
    fn peizer_pratt_is_odd_around_one_half() {
        let up = peizer_pratt_method2_inversion(0.7, 51).unwrap();
        let down = peizer_pratt_method2_inversion(-0.7, 51).unwrap();
        assert_abs_diff_eq!(up + down, 1.0, epsilon = 1e-15);
        assert!(up > 0.5);
    }

    #[test]
    fn peizer_pratt_rejects_even_steps() {
        assert!(matches!(
            peizer_pratt_method2_inversion(0.3, 100),
            Err(Error::Precondition(_))
        ));
    }

    #[test]
    fn pmf_sums_to_one() {
        let total: Real = (0..=20).map(|k| binomial_pmf(0.3, 20, k).unwrap()).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pmf_rejects_bad_probability() {
        assert!(binomial_pmf(1.5, 10, 3).is_err());
    }
}
