//! # bt-methods
//!
//! Numerical methods for binomialtrees: the lattice discretization schemes
//! and the recombining binomial lattice with backward induction.
//!
//! # Modules
//!
//! * [`lattice`]: discretization schemes, lattice storage, rollback

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Lattice methods: discretization schemes and backward induction.
pub mod lattice;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use lattice::{
    discretize, BinomialLattice, DiscretizationKind, LatticeGeometry, PROBABILITY_TOLERANCE,
};
