//! # bt-pricingengines
//!
//! Pricing engines for vanilla options: the cached binomial lattice engine
//! and the closed-form benchmarks it is compared against.
//!
//! ## Engines
//!
//! - [`LatticeEngine`]: build/rollback/query lattice engine with a build cache
//! - [`BinomialVanillaEngine`]: [`PricingEngine`](bt_instruments::PricingEngine)
//!   adapter around a cached [`LatticeEngine`]
//! - [`AnalyticEuropeanEngine`]: Black-Scholes-Merton closed form for European options
//! - [`BaroneAdesiWhaleyEngine`]: quadratic approximation for American options
//!
//! ## Example
//!
//! ```
//! use bt_instruments::{OptionType, VanillaOption};
//! use bt_market::{Date, ProcessParameters};
//! use bt_methods::DiscretizationKind;
//! use bt_pricingengines::{black_scholes_merton, price};
//!
//! let valuation = Date::from_ymd_opt(2017, 1, 8).unwrap();
//! let maturity = Date::from_ymd_opt(2018, 2, 5).unwrap();
//! let params = ProcessParameters::new(100.0, 0.03, 0.0, 0.20, valuation, maturity)?;
//! let option = VanillaOption::european(OptionType::Call, 110.0, maturity);
//!
//! let lattice = price(DiscretizationKind::CoxRossRubinstein, &params, &option, 1000)?;
//! let bs = black_scholes_merton(
//!     OptionType::Call, 100.0, 110.0, 0.03, 0.0, 0.20, params.time_to_maturity(),
//! );
//! assert!((lattice.value - bs.value).abs() < 0.01);
//! # Ok::<(), bt_core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analytic_european_engine;
pub mod barone_adesi_whaley_engine;
pub mod binomial_engine;
pub mod lattice_engine;

pub use analytic_european_engine::{black_scholes_merton, AnalyticEuropeanEngine};
pub use barone_adesi_whaley_engine::{barone_adesi_whaley, BaroneAdesiWhaleyEngine};
pub use binomial_engine::BinomialVanillaEngine;
pub use lattice_engine::{
    price, EngineSettings, GreeksMethod, InstrumentKey, LatticeEngine, LatticeKey,
};
