//! Vanilla option instrument.

use crate::exercise::{Exercise, ExerciseType};
use crate::instrument::{PricingEngine, PricingResult};
use crate::payoff::{OptionType, PlainVanillaPayoff, StrikedPayoff};
use bt_core::{errors::Result, Real};
use bt_market::{Date, ProcessParameters};
use std::sync::Arc;

/// A plain vanilla option on a single underlying asset.
///
/// The payoff is shared behind an `Arc` so one instrument can be priced by
/// several engines, possibly on different threads.
#[derive(Debug, Clone)]
pub struct VanillaOption {
    payoff: Arc<dyn StrikedPayoff>,
    exercise: Exercise,
}

impl VanillaOption {
    /// Create a new vanilla option.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self { payoff, exercise }
    }

    /// Convenience: create a European call/put.
    pub fn european(option_type: OptionType, strike: Real, expiry: Date) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::european(expiry),
        )
    }

    /// Convenience: create an American call/put.
    pub fn american(option_type: OptionType, strike: Real, expiry: Date) -> Self {
        Self::new(
            Arc::new(PlainVanillaPayoff::new(option_type, strike)),
            Exercise::american(expiry),
        )
    }

    /// The strike price.
    pub fn strike(&self) -> Real {
        self.payoff.strike()
    }

    /// The option type (call/put).
    pub fn option_type(&self) -> OptionType {
        self.payoff.option_type()
    }

    /// The payoff.
    pub fn payoff(&self) -> &dyn StrikedPayoff {
        &*self.payoff
    }

    /// The exercise.
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    /// The exercise kind.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise.exercise_type()
    }

    /// Expiry date.
    pub fn maturity(&self) -> Date {
        self.exercise.last_date()
    }

    /// Price this option using the given engine.
    pub fn price(
        &self,
        engine: &dyn PricingEngine,
        params: &ProcessParameters,
    ) -> Result<PricingResult> {
        engine.calculate(params, self)
    }
}
