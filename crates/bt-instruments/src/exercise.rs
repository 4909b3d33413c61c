//! Option exercise rights.
//!
//! An [`Exercise`] defines *when* an option can be exercised: only at expiry
//! (European) or at any time up to expiry (American). On a lattice, American
//! exercise is tested at every node of every column.

use bt_market::Date;
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

/// Exercise specification for an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exercise {
    exercise_type: ExerciseType,
    expiry: Date,
}

impl Exercise {
    /// Create a European exercise (single expiry date).
    pub fn european(expiry: Date) -> Self {
        Self {
            exercise_type: ExerciseType::European,
            expiry,
        }
    }

    /// Create an American exercise, exercisable from valuation up to `expiry`.
    pub fn american(expiry: Date) -> Self {
        Self {
            exercise_type: ExerciseType::American,
            expiry,
        }
    }

    /// The last possible exercise date.
    pub fn last_date(&self) -> Date {
        self.expiry
    }

    /// The type of exercise.
    pub fn exercise_type(&self) -> ExerciseType {
        self.exercise_type
    }

    /// `true` if the holder may exercise before expiry.
    pub fn allows_early_exercise(&self) -> bool {
        self.exercise_type == ExerciseType::American
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.exercise_type {
            ExerciseType::European => write!(f, "European({})", self.expiry),
            ExerciseType::American => write!(f, "American(until {})", self.expiry),
        }
    }
}
