//! # bt-market
//!
//! Market inputs consumed by the lattice engines: day-count conventions,
//! flat market snapshots, and the resolved Black-Scholes-Merton process
//! parameters for a given pricing horizon.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod day_counter;
pub mod process;
pub mod snapshot;

pub use chrono::NaiveDate as Date;
pub use day_counter::{Actual360, Actual365Fixed, DayCounter};
pub use process::ProcessParameters;
pub use snapshot::MarketSnapshot;
