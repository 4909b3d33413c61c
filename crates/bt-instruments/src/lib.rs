//! # bt-instruments
//!
//! Vanilla options: payoffs, exercise rights, the option instrument itself,
//! and the [`PricingEngine`] interface every engine implements.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod instrument;
pub mod option;
pub mod payoff;

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResult};
pub use option::VanillaOption;
pub use payoff::{OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
