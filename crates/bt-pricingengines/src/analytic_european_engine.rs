//! Analytic European option engine (Black-Scholes-Merton).
//!
//! Prices European vanilla options with the closed-form Black-Scholes-Merton
//! formula. Used as the convergence benchmark for the lattice schemes and as
//! the reference value of the strike-aligned control variate.

use bt_core::{ensure, errors::Result, Error, Real};
use bt_instruments::{ExerciseType, OptionType, PricingEngine, PricingResult, VanillaOption};
use bt_market::ProcessParameters;
use bt_math::{normal_cdf, normal_pdf};

/// Analytic pricing engine for European vanilla options.
///
/// Implements the Black-Scholes-Merton closed-form solution:
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticEuropeanEngine;

impl AnalyticEuropeanEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }
}

/// Black-Scholes-Merton value, delta and gamma of a European option.
///
/// A pure function of its arguments: identical inputs give bit-identical
/// outputs.
pub fn black_scholes_merton(
    option_type: OptionType,
    spot: Real,
    strike: Real,
    risk_free_rate: Real,
    dividend_yield: Real,
    volatility: Real,
    time_to_expiry: Real,
) -> PricingResult {
    let phi = option_type.sign();
    let t = time_to_expiry;

    if t <= 0.0 {
        let intrinsic = (phi * (spot - strike)).max(0.0);
        return PricingResult::new(intrinsic, 0.0, 0.0);
    }

    let r = risk_free_rate;
    let q = dividend_yield;
    let sigma = volatility;
    let std_dev = sigma * t.sqrt();
    let df_r = (-r * t).exp();
    let df_q = (-q * t).exp();
    let fwd = spot * ((r - q) * t).exp();

    // Zero variance: the option is a forward or worthless.
    if std_dev <= 1e-15 {
        let itm = phi * (fwd - strike) > 0.0;
        let value = if itm { phi * (spot * df_q - strike * df_r) } else { 0.0 };
        let delta = if itm { phi * df_q } else { 0.0 };
        return PricingResult::new(value, delta, 0.0);
    }

    let d1 = ((spot / strike).ln() + (r - q + 0.5 * sigma * sigma) * t) / std_dev;
    let d2 = d1 - std_dev;

    let nd1 = normal_cdf(phi * d1);
    let nd2 = normal_cdf(phi * d2);

    let value = phi * (spot * df_q * nd1 - strike * df_r * nd2);
    let delta = phi * df_q * nd1;
    let gamma = df_q * normal_pdf(d1) / (spot * std_dev);

    PricingResult::new(value, delta, gamma)
}

/// The option's expiry must be the end of the process horizon.
pub(crate) fn check_horizon(params: &ProcessParameters, option: &VanillaOption) -> Result<()> {
    ensure!(
        option.maturity() == params.maturity_date(),
        "option expiry {} differs from process maturity {}",
        option.maturity(),
        params.maturity_date()
    );
    Ok(())
}

impl PricingEngine for AnalyticEuropeanEngine {
    fn calculate(&self, params: &ProcessParameters, option: &VanillaOption) -> Result<PricingResult> {
        if option.exercise_type() != ExerciseType::European {
            return Err(Error::InvalidArgument(format!(
                "analytic engine prices European exercise only, got {}",
                option.exercise()
            )));
        }
        check_horizon(params, option)?;

        Ok(black_scholes_merton(
            option.option_type(),
            params.spot(),
            option.strike(),
            params.risk_free_rate(),
            params.dividend_yield(),
            params.volatility(),
            params.time_to_maturity(),
        ))
    }
}
