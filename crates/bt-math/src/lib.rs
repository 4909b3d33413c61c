//! # bt-math
//!
//! Mathematical utilities for binomialtrees: the standard normal
//! distribution and the binomial-distribution helpers used by the
//! strike-centred lattice schemes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Probability distributions (normal, binomial).
pub mod distributions;

pub use distributions::{
    binomial_pmf, normal_cdf, normal_pdf, peizer_pratt_method2_inversion,
};
