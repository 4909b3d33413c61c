//! Black-Scholes-Merton process parameters
//!
//! `dS/S = (r − q) dt + σ dW`
//!
//! [`ProcessParameters`] is the flat process resolved against a pricing
//! horizon: spot, continuously compounded rate and dividend yield, constant
//! volatility, and the year fraction between valuation and maturity. Every
//! lattice scheme derives its geometry from these values alone.

use crate::day_counter::{Actual365Fixed, DayCounter};
use bt_core::{ensure, errors::Result, DiscountFactor, Rate, Real, Time, Volatility};
use chrono::NaiveDate;

/// Immutable inputs of a constant-coefficient Black-Scholes-Merton process
/// over `[valuation_date, maturity_date]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessParameters {
    spot: Real,
    risk_free_rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    valuation_date: NaiveDate,
    maturity_date: NaiveDate,
    time_to_maturity: Time,
}

impl ProcessParameters {
    /// Create process parameters, measuring the horizon with Actual/365 (Fixed).
    ///
    /// # Errors
    /// `Precondition` if the spot is not positive, the volatility is negative
    /// or non-finite, a rate is non-finite, or the maturity is not after the
    /// valuation date.
    pub fn new(
        spot: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        valuation_date: NaiveDate,
        maturity_date: NaiveDate,
    ) -> Result<Self> {
        Self::with_day_counter(
            spot,
            risk_free_rate,
            dividend_yield,
            volatility,
            valuation_date,
            maturity_date,
            &Actual365Fixed,
        )
    }

    /// Create process parameters, measuring the horizon with `day_counter`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_day_counter(
        spot: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        valuation_date: NaiveDate,
        maturity_date: NaiveDate,
        day_counter: &dyn DayCounter,
    ) -> Result<Self> {
        ensure!(spot > 0.0 && spot.is_finite(), "spot must be positive, got {spot}");
        ensure!(
            volatility >= 0.0 && volatility.is_finite(),
            "volatility must be non-negative, got {volatility}"
        );
        ensure!(
            risk_free_rate.is_finite() && dividend_yield.is_finite(),
            "rates must be finite (r = {risk_free_rate}, q = {dividend_yield})"
        );
        ensure!(
            maturity_date > valuation_date,
            "maturity {maturity_date} must be after valuation date {valuation_date}"
        );
        let time_to_maturity = day_counter.year_fraction(valuation_date, maturity_date);
        ensure!(
            time_to_maturity > 0.0,
            "{} gives a non-positive horizon between {valuation_date} and {maturity_date}",
            day_counter.name()
        );
        Ok(Self {
            spot,
            risk_free_rate,
            dividend_yield,
            volatility,
            valuation_date,
            maturity_date,
            time_to_maturity,
        })
    }

    /// A copy of these parameters with a different spot.
    ///
    /// # Errors
    /// `Precondition` if `spot` is not positive.
    pub fn with_spot(&self, spot: Real) -> Result<Self> {
        ensure!(spot > 0.0 && spot.is_finite(), "spot must be positive, got {spot}");
        Ok(Self { spot, ..*self })
    }

    /// Spot price of the underlying.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Continuously compounded risk-free rate.
    pub fn risk_free_rate(&self) -> Rate {
        self.risk_free_rate
    }

    /// Continuously compounded dividend yield.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Constant Black volatility.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Date the process starts from.
    pub fn valuation_date(&self) -> NaiveDate {
        self.valuation_date
    }

    /// End of the pricing horizon.
    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }

    /// Year fraction between valuation and maturity.
    pub fn time_to_maturity(&self) -> Time {
        self.time_to_maturity
    }

    /// Drift of the log price, `r − q − σ²/2`.
    pub fn log_drift(&self) -> Real {
        self.risk_free_rate - self.dividend_yield - 0.5 * self.volatility * self.volatility
    }

    /// Variance of the log price over `dt`, `σ²·dt`.
    pub fn log_variance(&self, dt: Time) -> Real {
        self.volatility * self.volatility * dt
    }

    /// Risk-neutral forward growth factor over `dt`, `exp((r − q)·dt)`.
    pub fn forward_growth(&self, dt: Time) -> Real {
        ((self.risk_free_rate - self.dividend_yield) * dt).exp()
    }

    /// Risk-free discount factor over `dt`, `exp(−r·dt)`.
    pub fn discount(&self, dt: Time) -> DiscountFactor {
        (-self.risk_free_rate * dt).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_counter::Actual360;
    use approx::assert_abs_diff_eq;
    use bt_core::Error;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params() -> ProcessParameters {
        ProcessParameters::new(100.0, 0.03, 0.01, 0.20, date(2017, 1, 8), date(2018, 2, 5))
            .unwrap()
    }

    #[test]
    fn horizon_uses_actual_365() {
        assert_abs_diff_eq!(params().time_to_maturity(), 393.0 / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn horizon_with_other_day_counter() {
        let p = ProcessParameters::with_day_counter(
            100.0,
            0.03,
            0.0,
            0.2,
            date(2023, 1, 1),
            date(2023, 7, 1),
            &Actual360,
        )
        .unwrap();
        assert_abs_diff_eq!(p.time_to_maturity(), 181.0 / 360.0, epsilon = 1e-15);
    }

    #[test]
    fn derived_quantities() {
        let p = params();
        assert_abs_diff_eq!(p.log_drift(), 0.03 - 0.01 - 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(p.log_variance(0.5), 0.02, epsilon = 1e-15);
        assert_abs_diff_eq!(p.forward_growth(1.0), 0.02_f64.exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(p.discount(1.0), (-0.03_f64).exp(), epsilon = 1e-15);
    }

    #[test]
    fn rejects_non_positive_spot() {
        let err = ProcessParameters::new(0.0, 0.03, 0.0, 0.2, date(2017, 1, 8), date(2018, 2, 5));
        assert!(matches!(err, Err(Error::Precondition(_))));
    }

    #[test]
    fn rejects_negative_volatility() {
        let err = ProcessParameters::new(100.0, 0.03, 0.0, -0.2, date(2017, 1, 8), date(2018, 2, 5));
        assert!(matches!(err, Err(Error::Precondition(_))));
    }

    #[test]
    fn zero_volatility_is_a_valid_process() {
        let p = ProcessParameters::new(100.0, 0.03, 0.0, 0.0, date(2017, 1, 8), date(2018, 2, 5));
        assert!(p.is_ok());
    }

    #[test]
    fn rejects_maturity_before_valuation() {
        let err = ProcessParameters::new(100.0, 0.03, 0.0, 0.2, date(2018, 2, 5), date(2017, 1, 8));
        assert!(matches!(err, Err(Error::Precondition(_))));
    }

    #[test]
    fn with_spot_keeps_everything_else() {
        let p = params();
        let bumped = p.with_spot(110.0).unwrap();
        assert_eq!(bumped.spot(), 110.0);
        assert_eq!(bumped.volatility(), p.volatility());
        assert_eq!(bumped.time_to_maturity(), p.time_to_maturity());
        assert!(p.with_spot(-1.0).is_err());
    }
}
