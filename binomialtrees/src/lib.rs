//! # binomialtrees
//!
//! Binomial lattice pricing of vanilla options.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `bt-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use binomialtrees::instruments::{OptionType, VanillaOption};
//! use binomialtrees::market::{Date, MarketSnapshot};
//! use binomialtrees::methods::DiscretizationKind;
//! use binomialtrees::price;
//!
//! let maturity = Date::from_ymd_opt(2018, 2, 5).unwrap();
//! let market = MarketSnapshot::new(100.0, 0.03, 0.0, 0.20, Date::from_ymd_opt(2017, 1, 8).unwrap());
//! let params = market.process_parameters(maturity)?;
//!
//! let put = VanillaOption::american(OptionType::Put, 110.0, maturity);
//! let result = price(DiscretizationKind::LeisenReimer, &params, &put, 501)?;
//! assert!(result.value >= 10.0);
//! assert!(result.delta < 0.0 && result.gamma > 0.0);
//! # Ok::<(), binomialtrees::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use bt_core as core;

/// Normal distribution and binomial helpers.
pub use bt_math as math;

/// Day counters, process parameters and market snapshots.
pub use bt_market as market;

/// Payoffs, exercise rights, vanilla options and the engine interface.
pub use bt_instruments as instruments;

/// Discretization schemes and the binomial lattice.
pub use bt_methods as methods;

/// Lattice, analytic and approximation pricing engines.
pub use bt_pricingengines as pricingengines;

pub use bt_core::{Error, Result};
pub use bt_pricingengines::price;
