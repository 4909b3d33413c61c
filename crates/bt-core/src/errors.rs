//! Error types for binomialtrees.
//!
//! A single `thiserror`-derived enum covers every failure the pricing stack
//! can report. The `ensure!` and `fail!` macros give early returns for
//! precondition checks and runtime failures.

use thiserror::Error;

/// The top-level error type used throughout binomialtrees.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A discretization scheme could not produce a usable lattice geometry
    /// (probability outside `[0, 1]`, non-finite factors, too few steps).
    #[error("invalid discretization: {reason}")]
    InvalidDiscretization {
        /// Why the geometry was rejected.
        reason: String,
    },

    /// Value or Greeks were queried before a lattice was built and rolled back.
    #[error("lattice has not been rolled back")]
    NotRolledBack,
}

impl Error {
    /// Shorthand for [`Error::InvalidDiscretization`].
    pub fn invalid_discretization(reason: impl Into<String>) -> Self {
        Error::InvalidDiscretization {
            reason: reason.into(),
        }
    }
}

/// Shorthand `Result` type used throughout binomialtrees.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use bt_core::{ensure, errors::Error};
/// fn positive(x: f64) -> bt_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use bt_core::{fail, errors::Error};
/// fn always_err() -> bt_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
