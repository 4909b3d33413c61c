//! Lattice methods for option pricing.
//!
//! # Overview
//!
//! * [`DiscretizationKind`]: the six two-branch schemes (Jarrow-Rudd, CRR,
//!   Trigeorgis, Tian, Leisen-Reimer, Joshi4)
//! * [`LatticeGeometry`]: validated per-step up/down factors and probability
//! * [`BinomialLattice`]: flat triangular node storage with backward induction
//!
//! A geometry is produced by [`discretize`] and is the only input the lattice
//! needs besides the spot; the lattice never knows which scheme produced it.

pub mod binomial_lattice;
pub mod discretization;

pub use binomial_lattice::BinomialLattice;
pub use discretization::{discretize, DiscretizationKind, LatticeGeometry, PROBABILITY_TOLERANCE};
