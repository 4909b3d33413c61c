//! Probability distributions.
//!
//! The normal CDF and the binomial probability mass function delegate to the
//! `statrs` crate; the Peizer-Pratt inversion is implemented directly.

pub mod binomial;
pub mod normal;

pub use binomial::{binomial_pmf, peizer_pratt_method2_inversion};
pub use normal::{normal_cdf, normal_pdf};
