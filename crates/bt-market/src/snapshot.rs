//! Flat market snapshot.
//!
//! A [`MarketSnapshot`] bundles the quotes of a flat Black-Scholes-Merton
//! market (spot, continuously compounded rate and dividend yield, constant
//! volatility) with the date they are valid for and the day-count convention
//! of the curves. Resolving it against a maturity yields the
//! [`ProcessParameters`] the lattice engines consume.

use crate::day_counter::{Actual365Fixed, DayCounter};
use crate::process::ProcessParameters;
use bt_core::{errors::Result, Rate, Real, Volatility};
use chrono::NaiveDate;
use std::sync::Arc;

/// Read-only bundle of flat market data.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    /// Spot price of the underlying.
    pub spot: Real,
    /// Continuously compounded risk-free rate.
    pub risk_free_rate: Rate,
    /// Continuously compounded dividend yield.
    pub dividend_yield: Rate,
    /// Constant Black volatility.
    pub volatility: Volatility,
    /// Reference (settlement) date of the curves.
    pub reference_date: NaiveDate,
    day_counter: Arc<dyn DayCounter>,
}

impl MarketSnapshot {
    /// Create a snapshot whose curves use Actual/365 (Fixed).
    pub fn new(
        spot: Real,
        risk_free_rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        reference_date: NaiveDate,
    ) -> Self {
        Self {
            spot,
            risk_free_rate,
            dividend_yield,
            volatility,
            reference_date,
            day_counter: Arc::new(Actual365Fixed),
        }
    }

    /// Replace the day-count convention of the curves.
    pub fn with_day_counter(mut self, day_counter: Arc<dyn DayCounter>) -> Self {
        self.day_counter = day_counter;
        self
    }

    /// The day-count convention of the curves.
    pub fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    /// Resolve the snapshot against `maturity`.
    ///
    /// # Errors
    /// Propagates the validation errors of [`ProcessParameters`].
    pub fn process_parameters(&self, maturity: NaiveDate) -> Result<ProcessParameters> {
        ProcessParameters::with_day_counter(
            self.spot,
            self.risk_free_rate,
            self.dividend_yield,
            self.volatility,
            self.reference_date,
            maturity,
            &*self.day_counter,
        )
    }
}
