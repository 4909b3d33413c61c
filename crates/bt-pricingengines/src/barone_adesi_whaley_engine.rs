//! Barone-Adesi-Whaley American option approximation.
//!
//! A fast quadratic approximation of the early-exercise premium, used as the
//! American benchmark for the lattice engines. Only its value is analytic;
//! the engine reports finite-difference delta and gamma.

use bt_core::{errors::Result, Real};
use bt_instruments::{OptionType, PricingEngine, PricingResult, VanillaOption};
use bt_market::ProcessParameters;
use bt_math::{normal_cdf, normal_pdf};

use crate::analytic_european_engine::{black_scholes_merton, check_horizon};

/// Relative spot bump used for the finite-difference Greeks.
const SPOT_BUMP: Real = 1e-4;

/// Barone-Adesi-Whaley American option pricing engine.
///
/// Uses the quadratic approximation method from Barone-Adesi & Whaley (1987)
/// which extends the Black-Scholes formula to American-style exercise.
/// European options are priced with the same formula; for them the premium
/// term is simply an approximation error, so prefer the analytic engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaroneAdesiWhaleyEngine;

impl BaroneAdesiWhaleyEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }
}

/// Contract terms shared by the call and put branches.
#[derive(Clone, Copy)]
struct Terms {
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Real,
}

impl Terms {
    fn d1(&self, s: Real) -> Real {
        ((s / self.strike).ln() + (self.r - self.q + 0.5 * self.sigma * self.sigma) * self.t)
            / (self.sigma * self.t.sqrt())
    }

    fn european(&self, option_type: OptionType, s: Real) -> Real {
        black_scholes_merton(option_type, s, self.strike, self.r, self.q, self.sigma, self.t).value
    }
}

/// Barone-Adesi-Whaley American option price.
pub fn barone_adesi_whaley(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    r: Real,
    q: Real,
    sigma: Real,
    t: Real,
) -> Real {
    if t <= 0.0 {
        let phi = option_type.sign();
        return (phi * (spot - strike)).max(0.0);
    }

    let terms = Terms {
        strike,
        r,
        q,
        sigma,
        t,
    };
    let european = terms.european(option_type, spot);
    if sigma <= 0.0 {
        return european.max(option_type.sign() * (spot - strike)).max(0.0);
    }

    let sigma2 = sigma * sigma;
    let m = 2.0 * r / sigma2;
    let n = 2.0 * (r - q) / sigma2;
    let big_k = 1.0 - (-r * t).exp();

    if big_k.abs() < 1e-15 {
        return european;
    }

    let root = ((n - 1.0) * (n - 1.0) + 4.0 * m / big_k).sqrt();
    match option_type {
        OptionType::Call => baw_call(spot, &terms, european, (-(n - 1.0) + root) / 2.0),
        OptionType::Put => baw_put(spot, &terms, european, (-(n - 1.0) - root) / 2.0),
    }
}

fn baw_call(spot: Real, terms: &Terms, european: Real, q2: Real) -> Real {
    if q2 <= 1.0 {
        return european;
    }

    let s_star = find_critical_call(terms, q2);

    if spot >= s_star {
        spot - terms.strike
    } else {
        let a2 = (s_star / q2) * (1.0 - (-terms.q * terms.t).exp() * normal_cdf(terms.d1(s_star)));
        european + a2 * (spot / s_star).powf(q2)
    }
}

fn baw_put(spot: Real, terms: &Terms, european: Real, q1: Real) -> Real {
    let s_star = find_critical_put(terms, q1);

    if spot <= s_star {
        terms.strike - spot
    } else {
        let a1 =
            -(s_star / q1) * (1.0 - (-terms.q * terms.t).exp() * normal_cdf(-terms.d1(s_star)));
        european + a1 * (spot / s_star).powf(q1)
    }
}

/// Critical call exercise price S* via Newton's method.
/// Solves g(S) = (S − K) − C(S) − (S/q₂)(1 − e^{−qT}N(d₁(S))) = 0.
fn find_critical_call(terms: &Terms, q2: Real) -> Real {
    let Terms {
        strike,
        r,
        q,
        sigma,
        t,
    } = *terms;
    let s_inf = strike / (1.0 - 2.0 / q2);
    let h2 = -((r - q) * t + 2.0 * sigma * t.sqrt()) * strike / (s_inf - strike);
    let mut si = s_inf + (strike - s_inf) * (-h2).exp();
    si = si.max(strike * 1.001);

    let eq = (-q * t).exp();
    let sst = sigma * t.sqrt();
    for _ in 0..200 {
        let bs = terms.european(OptionType::Call, si);
        let d1 = terms.d1(si);
        let nd1 = normal_cdf(d1);

        let a2 = (si / q2) * (1.0 - eq * nd1);
        let gv = (si - strike) - bs - a2;
        if gv.abs() < 1e-8 * strike {
            return si;
        }

        // g'(S) = 1 − e^{−qT}N(d₁) − (1/q₂)(1 − e^{−qT}N(d₁)) + e^{−qT}n(d₁)/(q₂σ√T)
        let da2 = (1.0 / q2) * (1.0 - eq * nd1) - eq * normal_pdf(d1) / (q2 * sst);
        let gp = 1.0 - eq * nd1 - da2;
        if gp.abs() < 1e-15 {
            break;
        }

        si -= gv / gp;
        si = si.max(strike * 1.001).min(strike * 100.0);
    }

    si
}

/// Critical put exercise price S* via Newton's method.
/// Solves g(S) = (K − S) − P(S) + (S/q₁)(1 − e^{−qT}N(−d₁(S))) = 0.
fn find_critical_put(terms: &Terms, q1: Real) -> Real {
    let Terms {
        strike,
        r,
        q,
        sigma,
        t,
    } = *terms;
    let s_zero = strike / (1.0 - 2.0 / q1);
    let h1 = ((r - q) * t - 2.0 * sigma * t.sqrt()) * strike / (strike - s_zero);
    let mut si = s_zero + (strike - s_zero) * (-h1).exp();
    si = si.max(1e-10).min(strike * 0.999);

    let eq = (-q * t).exp();
    let sst = sigma * t.sqrt();
    for _ in 0..200 {
        let bs = terms.european(OptionType::Put, si);
        let d1 = terms.d1(si);
        let nmd1 = normal_cdf(-d1);

        let a1 = -(si / q1) * (1.0 - eq * nmd1);
        let gv = (strike - si) - bs - a1;
        if gv.abs() < 1e-8 * strike {
            return si;
        }

        // g'(S) = −1 + e^{−qT}N(−d₁) + (1/q₁)(1 − e^{−qT}N(−d₁)) + e^{−qT}n(d₁)/(q₁σ√T)
        let da1 = -(1.0 / q1) * (1.0 - eq * nmd1) - eq * normal_pdf(d1) / (q1 * sst);
        let gp = -1.0 + eq * nmd1 - da1;
        if gp.abs() < 1e-15 {
            break;
        }

        si -= gv / gp;
        si = si.max(1e-10).min(strike * 0.999);
    }

    si
}

impl PricingEngine for BaroneAdesiWhaleyEngine {
    fn calculate(&self, params: &ProcessParameters, option: &VanillaOption) -> Result<PricingResult> {
        check_horizon(params, option)?;

        let price = |spot: Real| {
            barone_adesi_whaley(
                option.option_type(),
                spot,
                option.strike(),
                params.risk_free_rate(),
                params.dividend_yield(),
                params.volatility(),
                params.time_to_maturity(),
            )
        };

        let spot = params.spot();
        let h = SPOT_BUMP * spot;
        let (up, mid, down) = (price(spot + h), price(spot), price(spot - h));

        Ok(PricingResult::new(
            mid,
            (up - down) / (2.0 * h),
            (up - 2.0 * mid + down) / (h * h),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_market::Date;

    #[test]
    fn american_call_geq_european() {
        let (spot, strike, r, q, sigma, t) = (100.0, 100.0, 0.05, 0.02, 0.25, 1.0);

        let american = barone_adesi_whaley(OptionType::Call, spot, strike, r, q, sigma, t);
        let european = black_scholes_merton(OptionType::Call, spot, strike, r, q, sigma, t).value;

        assert!(
            american >= european - 0.01,
            "american={american}, european={european}"
        );
    }

    #[test]
    fn american_put_geq_european() {
        let (spot, strike, r, q, sigma, t) = (100.0, 100.0, 0.05, 0.0, 0.25, 1.0);

        let american = barone_adesi_whaley(OptionType::Put, spot, strike, r, q, sigma, t);
        let european = black_scholes_merton(OptionType::Put, spot, strike, r, q, sigma, t).value;

        assert!(
            american > european,
            "american={american}, european={european}"
        );
    }

    #[test]
    fn deep_itm_put_near_intrinsic() {
        // Deep ITM American put should be close to intrinsic value with early exercise
        let price = barone_adesi_whaley(OptionType::Put, 50.0, 100.0, 0.10, 0.0, 0.25, 1.0);
        let intrinsic = 50.0;

        assert!(price >= intrinsic - 0.01, "price={price}, intrinsic={intrinsic}");
    }

    #[test]
    fn american_call_no_dividend_equals_european() {
        // Without dividends, American call = European call
        let (spot, strike, r, q, sigma, t) = (100.0, 100.0, 0.05, 0.0, 0.20, 1.0);

        let american = barone_adesi_whaley(OptionType::Call, spot, strike, r, q, sigma, t);
        let european = black_scholes_merton(OptionType::Call, spot, strike, r, q, sigma, t).value;

        assert!(
            (american - european).abs() < 1e-12,
            "american={american}, european={european}"
        );
    }

    #[test]
    fn engine_reports_finite_difference_greeks() {
        let valuation = Date::from_ymd_opt(2025, 1, 15).unwrap();
        let expiry = Date::from_ymd_opt(2026, 1, 15).unwrap();
        let params = ProcessParameters::new(100.0, 0.05, 0.0, 0.20, valuation, expiry).unwrap();

        // With q = 0 the call has no premium, so the bumps reproduce BS Greeks.
        let call = VanillaOption::american(OptionType::Call, 100.0, expiry);
        let res = BaroneAdesiWhaleyEngine::new().calculate(&params, &call).unwrap();
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);
        assert!((res.value - bs.value).abs() < 1e-12);
        assert!((res.delta - bs.delta).abs() < 1e-6, "delta={}", res.delta);
        assert!((res.gamma - bs.gamma).abs() < 1e-4, "gamma={}", res.gamma);

        let put = VanillaOption::american(OptionType::Put, 100.0, expiry);
        let res = BaroneAdesiWhaleyEngine.calculate(&params, &put).unwrap();
        assert!(res.delta < 0.0 && res.delta > -1.0, "delta={}", res.delta);
        assert!(res.gamma > 0.0, "gamma={}", res.gamma);
    }
}
