//! Recombining binomial lattice with flat triangular storage.
//!
//! Column `i` (time `i·Δt`) holds `i + 1` nodes; node `(i, j)` is reached by
//! `j` up-moves and `i − j` down-moves and carries the underlying price
//! `S·u^j·d^(i−j)`. Prices and rolled-back values live in two flat vectors
//! indexed through [`offset`], so a lattice is one contiguous allocation per
//! quantity and clones cheaply.

use super::discretization::LatticeGeometry;
use bt_core::{errors::Result, DiscountFactor, Error, Real, Size};

/// Index of the first node of column `column` in the flat storage.
#[inline]
pub fn offset(column: Size) -> Size {
    column * (column + 1) / 2
}

/// A binomial lattice of underlying prices and option values.
#[derive(Debug, Clone)]
pub struct BinomialLattice {
    geometry: LatticeGeometry,
    spot: Real,
    prices: Vec<Real>,
    values: Vec<Real>,
    exercised: Vec<bool>,
    /// Lowest column whose values are known.
    filled_from: Size,
}

impl BinomialLattice {
    /// Build the node prices of `geometry` rooted at `spot` and set the
    /// terminal column to `payoff` of each terminal price.
    ///
    /// Prices are evaluated in log space, `exp(ln S + j·ln u + (i−j)·ln d)`,
    /// so deep columns do not accumulate multiplicative rounding.
    pub fn build(spot: Real, geometry: LatticeGeometry, payoff: impl Fn(Real) -> Real) -> Self {
        let n = geometry.steps();
        let len = offset(n + 1);
        let ln_spot = spot.ln();
        let ln_up = geometry.up().ln();
        let ln_down = geometry.down().ln();

        let mut prices = Vec::with_capacity(len);
        for i in 0..=n {
            for j in 0..=i {
                let x = ln_spot + j as Real * ln_up + (i - j) as Real * ln_down;
                prices.push(x.exp());
            }
        }
        // The root is the spot itself, not its log round-trip.
        prices[0] = spot;

        let mut values = vec![0.0; len];
        let terminal = offset(n);
        for (value, &price) in values[terminal..].iter_mut().zip(&prices[terminal..]) {
            *value = payoff(price);
        }

        Self {
            geometry,
            spot,
            prices,
            values,
            exercised: vec![false; len],
            filled_from: n,
        }
    }

    /// The geometry this lattice was built from.
    pub fn geometry(&self) -> &LatticeGeometry {
        &self.geometry
    }

    /// Root price.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.geometry.steps()
    }

    /// Total number of nodes, `(N+1)(N+2)/2`.
    pub fn node_count(&self) -> Size {
        self.prices.len()
    }

    /// Underlying price at node `(i, j)`.
    pub fn underlying(&self, i: Size, j: Size) -> Real {
        debug_assert!(j <= i && i <= self.steps());
        self.prices[offset(i) + j]
    }

    /// Underlying prices of column `i`.
    pub fn column_prices(&self, i: Size) -> &[Real] {
        &self.prices[offset(i)..offset(i + 1)]
    }

    /// `true` once the root value is known.
    pub fn is_rolled_back(&self) -> bool {
        self.filled_from == 0
    }

    /// Option value at node `(i, j)`.
    ///
    /// # Errors
    /// `NotRolledBack` if the rollback has not reached column `i` yet.
    pub fn value(&self, i: Size, j: Size) -> Result<Real> {
        Ok(self.column_values(i)?[j])
    }

    /// Option values of column `i`.
    ///
    /// # Errors
    /// `NotRolledBack` if the rollback has not reached column `i` yet.
    pub fn column_values(&self, i: Size) -> Result<&[Real]> {
        if i < self.filled_from || i > self.steps() {
            return Err(Error::NotRolledBack);
        }
        Ok(&self.values[offset(i)..offset(i + 1)])
    }

    /// Value at the root node `(0, 0)`.
    pub fn root_value(&self) -> Result<Real> {
        self.value(0, 0)
    }

    /// Overwrite column `column` with `f(price)` and restart the rollback
    /// from there. Columns above `column` keep their previous contents.
    ///
    /// # Errors
    /// `InvalidArgument` if `column` is beyond the terminal column.
    pub fn seed_column(&mut self, column: Size, f: impl Fn(Real) -> Real) -> Result<()> {
        if column > self.steps() {
            return Err(Error::InvalidArgument(format!(
                "column {column} beyond terminal column {}",
                self.steps()
            )));
        }
        let range = offset(column)..offset(column + 1);
        for (value, &price) in self.values[range.clone()].iter_mut().zip(&self.prices[range]) {
            *value = f(price);
        }
        self.filled_from = column;
        Ok(())
    }

    /// Backward induction down to the root.
    ///
    /// Each node becomes `disc·[p·V(i+1, j+1) + (1−p)·V(i+1, j)]`. When
    /// `exercise` is given, the continuation value is compared with
    /// `exercise(price)` at every node and the larger one kept; nodes where
    /// exercise wins are recorded for [`exercise_frontier`](Self::exercise_frontier).
    ///
    /// Discounted branch weights are computed once for the whole lattice.
    /// Calling this on a rolled-back lattice is a no-op.
    pub fn rollback(&mut self, discount: DiscountFactor, exercise: Option<&dyn Fn(Real) -> Real>) {
        let p = self.geometry.probability();
        let disc_up = discount * p;
        let disc_down = discount * (1.0 - p);

        for i in (0..self.filled_from).rev() {
            let start = offset(i);
            let next_start = offset(i + 1);
            let (head, tail) = self.values.split_at_mut(next_start);
            let current = &mut head[start..];
            let next = &tail[..i + 2];

            for j in 0..=i {
                current[j] = disc_up * next[j + 1] + disc_down * next[j];
            }

            if let Some(intrinsic) = exercise {
                let prices = &self.prices[start..next_start];
                let flags = &mut self.exercised[start..next_start];
                for j in 0..=i {
                    let now = intrinsic(prices[j]);
                    if now > current[j] {
                        current[j] = now;
                        flags[j] = true;
                    } else {
                        flags[j] = false;
                    }
                }
            }
        }
        self.filled_from = 0;
        tracing::trace!(steps = self.steps(), root = self.values[0], "lattice rolled back");
    }

    /// Root value of a plain discounted expectation over this lattice's
    /// prices, without early exercise, starting from `f(price)` on column
    /// `column` (the terminal column for a payoff).
    ///
    /// Runs on a scratch column so the stored values are left untouched.
    ///
    /// # Errors
    /// `InvalidArgument` if `column` is beyond the terminal column.
    pub fn european_value(
        &self,
        discount: DiscountFactor,
        column: Size,
        f: impl Fn(Real) -> Real,
    ) -> Result<Real> {
        if column > self.steps() {
            return Err(Error::InvalidArgument(format!(
                "column {column} beyond terminal column {}",
                self.steps()
            )));
        }
        let p = self.geometry.probability();
        let disc_up = discount * p;
        let disc_down = discount * (1.0 - p);

        let mut scratch: Vec<Real> = self.column_prices(column).iter().map(|&s| f(s)).collect();
        for i in (0..column).rev() {
            for j in 0..=i {
                scratch[j] = disc_up * scratch[j + 1] + disc_down * scratch[j];
            }
        }
        Ok(scratch[0])
    }

    /// `true` if the last rollback exercised early at node `(i, j)`.
    pub fn exercised(&self, i: Size, j: Size) -> bool {
        self.exercised[offset(i) + j]
    }

    /// Early-exercise frontier recorded by the last rollback with exercise.
    ///
    /// One entry per column `0..N`: the underlying price of the exercised
    /// node adjacent to the continuation region, or `None` when the column is
    /// entirely in one region.
    pub fn exercise_frontier(&self) -> Vec<Option<Real>> {
        (0..self.steps())
            .map(|i| {
                let flags = &self.exercised[offset(i)..offset(i + 1)];
                flags.windows(2).position(|w| w[0] != w[1]).map(|j| {
                    let node = if flags[j] { j } else { j + 1 };
                    self.underlying(i, node)
                })
            })
            .collect()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
