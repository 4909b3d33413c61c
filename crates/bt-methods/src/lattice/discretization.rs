//! Discretization schemes for recombining binomial lattices.
//!
//! Each scheme maps a Black-Scholes-Merton process and a step count to a
//! [`LatticeGeometry`]: the per-step up/down multipliers and the risk-neutral
//! up probability. The rollback is agnostic to which scheme produced a
//! geometry.
//!
//! | Variant | Family | Reference |
//! |---|---|---|
//! | [`DiscretizationKind::JarrowRudd`] | Equal probabilities | Jarrow & Rudd (1983) |
//! | [`DiscretizationKind::CoxRossRubinstein`] | Equal jumps, martingale probability | Cox, Ross & Rubinstein (1979) |
//! | [`DiscretizationKind::Trigeorgis`] | Equal jumps, log-moment matching | Trigeorgis (1991) |
//! | [`DiscretizationKind::Tian`] | Third-moment matching | Tian (1993) |
//! | [`DiscretizationKind::LeisenReimer`] | Strike-centred, odd steps | Leisen & Reimer (1996) |
//! | [`DiscretizationKind::Joshi4`] | Fourth-order, odd steps | Joshi (2008) |

use bt_core::{ensure, errors::Result, Error, Probability, Real, Size, Time};
use bt_market::ProcessParameters;
use bt_math::peizer_pratt_method2_inversion;
use std::fmt;
use std::str::FromStr;

/// Probabilities this far outside `[0, 1]` are treated as rounding noise and
/// snapped to the bound; anything further out is rejected.
pub const PROBABILITY_TOLERANCE: Real = 1e-12;

/// The closed set of discretization schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum DiscretizationKind {
    /// `p = ½`, jumps `exp(μΔt ± σ√Δt)` with `μ = r − q − σ²/2`.
    JarrowRudd,
    /// `u = exp(σ√Δt)`, `d = 1/u`, `p` from the martingale condition.
    CoxRossRubinstein,
    /// Equal jumps matching the mean and variance of the log return.
    Trigeorgis,
    /// Matches the first three moments of the terminal distribution.
    Tian,
    /// Peizer-Pratt inversion centred on the strike, odd step count.
    LeisenReimer,
    /// Joshi's fourth-order expansion of the up probability, odd step count.
    Joshi4,
}

impl DiscretizationKind {
    /// Every scheme, in the order the benchmarks report them.
    pub const ALL: [DiscretizationKind; 6] = [
        DiscretizationKind::JarrowRudd,
        DiscretizationKind::CoxRossRubinstein,
        DiscretizationKind::Trigeorgis,
        DiscretizationKind::Tian,
        DiscretizationKind::LeisenReimer,
        DiscretizationKind::Joshi4,
    ];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            DiscretizationKind::JarrowRudd => "jarrow-rudd",
            DiscretizationKind::CoxRossRubinstein => "cox-ross-rubinstein",
            DiscretizationKind::Trigeorgis => "trigeorgis",
            DiscretizationKind::Tian => "tian",
            DiscretizationKind::LeisenReimer => "leisen-reimer",
            DiscretizationKind::Joshi4 => "joshi4",
        }
    }

    /// `true` for the schemes whose geometry depends on the strike.
    pub fn requires_strike(self) -> bool {
        matches!(
            self,
            DiscretizationKind::LeisenReimer | DiscretizationKind::Joshi4
        )
    }

    /// Number of steps actually used for a requested `steps`.
    ///
    /// Strike-centred schemes need an odd count and round up to the next odd
    /// number; the others use `steps` unchanged.
    pub fn effective_steps(self, steps: Size) -> Size {
        if self.requires_strike() && steps % 2 == 0 {
            steps + 1
        } else {
            steps
        }
    }
}

impl fmt::Display for DiscretizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DiscretizationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "jarrowrudd" | "jr" => Ok(DiscretizationKind::JarrowRudd),
            "coxrossrubinstein" | "crr" => Ok(DiscretizationKind::CoxRossRubinstein),
            "trigeorgis" => Ok(DiscretizationKind::Trigeorgis),
            "tian" => Ok(DiscretizationKind::Tian),
            "leisenreimer" | "lr" => Ok(DiscretizationKind::LeisenReimer),
            "joshi4" | "joshi" => Ok(DiscretizationKind::Joshi4),
            _ => Err(Error::InvalidArgument(format!(
                "unknown discretization scheme '{s}'"
            ))),
        }
    }
}

/// Per-step geometry of a recombining binomial lattice.
///
/// Invariants, checked on construction: all fields finite, `steps > 0`,
/// `dt > 0`, `0 < down < 1 < up`, `0 ≤ probability ≤ 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeGeometry {
    kind: DiscretizationKind,
    steps: Size,
    dt: Time,
    up: Real,
    down: Real,
    probability: Probability,
}

impl LatticeGeometry {
    /// Validate and assemble a geometry.
    ///
    /// # Errors
    /// `InvalidDiscretization` if any invariant fails. Probabilities within
    /// [`PROBABILITY_TOLERANCE`] of `[0, 1]` are snapped to the bound first.
    pub fn new(
        kind: DiscretizationKind,
        steps: Size,
        dt: Time,
        up: Real,
        down: Real,
        probability: Probability,
    ) -> Result<Self> {
        if steps == 0 {
            return Err(Error::invalid_discretization(format!(
                "{kind}: at least one step is required"
            )));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::invalid_discretization(format!(
                "{kind}: time step {dt} must be positive"
            )));
        }
        if !(up.is_finite() && down.is_finite() && 0.0 < down && down < 1.0 && 1.0 < up) {
            return Err(Error::invalid_discretization(format!(
                "{kind}: factors u = {up}, d = {down} must satisfy 0 < d < 1 < u \
                 (try more steps)"
            )));
        }
        if !probability.is_finite()
            || probability < -PROBABILITY_TOLERANCE
            || probability > 1.0 + PROBABILITY_TOLERANCE
        {
            return Err(Error::invalid_discretization(format!(
                "{kind}: probability {probability} outside [0, 1] with {steps} steps \
                 (try more steps)"
            )));
        }
        Ok(Self {
            kind,
            steps,
            dt,
            up,
            down,
            probability: probability.clamp(0.0, 1.0),
        })
    }

    /// Scheme that produced this geometry.
    pub fn kind(&self) -> DiscretizationKind {
        self.kind
    }

    /// Number of time steps (may exceed the requested count for odd-step schemes).
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Up multiplier `u`.
    pub fn up(&self) -> Real {
        self.up
    }

    /// Down multiplier `d`.
    pub fn down(&self) -> Real {
        self.down
    }

    /// Risk-neutral probability of the up branch.
    pub fn probability(&self) -> Probability {
        self.probability
    }

    /// Deviation of the one-step expected growth `p·u + (1−p)·d` from the
    /// risk-neutral forward growth `exp((r − q)Δt)`.
    ///
    /// Zero up to rounding for the schemes that impose the martingale
    /// condition exactly; `O(Δt²)` for Jarrow-Rudd and Trigeorgis.
    pub fn drift_error(&self, params: &ProcessParameters) -> Real {
        let p = self.probability;
        p * self.up + (1.0 - p) * self.down - params.forward_growth(self.dt)
    }
}

/// Build the geometry of `kind` for `params` with (at least) `steps` steps.
///
/// `strike` is read only by the strike-centred schemes
/// ([`DiscretizationKind::requires_strike`]).
///
/// # Errors
/// * `InvalidDiscretization` for zero steps, zero volatility, or a degenerate
///   probability / factor pair.
/// * `Precondition` if a strike-centred scheme gets a non-positive strike.
pub fn discretize(
    kind: DiscretizationKind,
    params: &ProcessParameters,
    steps: Size,
    strike: Real,
) -> Result<LatticeGeometry> {
    let result = build_geometry(kind, params, steps, strike);
    if let Err(err) = &result {
        tracing::warn!(%kind, steps, error = %err, "discretization rejected");
    }
    result
}

fn build_geometry(
    kind: DiscretizationKind,
    params: &ProcessParameters,
    steps: Size,
    strike: Real,
) -> Result<LatticeGeometry> {
    if steps == 0 {
        return Err(Error::invalid_discretization(format!(
            "{kind}: at least one step is required"
        )));
    }
    if params.volatility() <= 0.0 {
        return Err(Error::invalid_discretization(format!(
            "{kind}: zero volatility collapses the lattice"
        )));
    }
    if kind.requires_strike() {
        ensure!(strike > 0.0, "{kind}: strike must be positive, got {strike}");
    }

    let n = kind.effective_steps(steps);
    let dt = params.time_to_maturity() / n as Real;
    let drift_per_step = params.log_drift() * dt;
    let variance = params.log_variance(dt);

    let (up, down, pu) = match kind {
        DiscretizationKind::JarrowRudd => {
            let dx = variance.sqrt();
            ((drift_per_step + dx).exp(), (drift_per_step - dx).exp(), 0.5)
        }
        DiscretizationKind::CoxRossRubinstein => {
            let up = variance.sqrt().exp();
            let down = 1.0 / up;
            let pu = (params.forward_growth(dt) - down) / (up - down);
            (up, down, pu)
        }
        DiscretizationKind::Trigeorgis => {
            let dx = (variance + drift_per_step * drift_per_step).sqrt();
            let pu = 0.5 + 0.5 * drift_per_step / dx;
            (dx.exp(), (-dx).exp(), pu)
        }
        DiscretizationKind::Tian => {
            let q = variance.exp();
            let r = params.forward_growth(dt);
            let root = (q * q + 2.0 * q - 3.0).sqrt();
            let up = 0.5 * r * q * (q + 1.0 + root);
            let down = 0.5 * r * q * (q + 1.0 - root);
            let pu = (r - down) / (up - down);
            (up, down, pu)
        }
        DiscretizationKind::LeisenReimer | DiscretizationKind::Joshi4 => {
            let total_std = params.log_variance(params.time_to_maturity()).sqrt();
            let ermqdt = params.forward_growth(dt);
            let d2 = ((params.spot() / strike).ln() + drift_per_step * n as Real) / total_std;
            let (pu, pdash) = if kind == DiscretizationKind::LeisenReimer {
                (
                    peizer_pratt_method2_inversion(d2, n)?,
                    peizer_pratt_method2_inversion(d2 + total_std, n)?,
                )
            } else {
                let k = (n as Real - 1.0) / 2.0;
                (
                    joshi4_up_probability(k, d2),
                    joshi4_up_probability(k, d2 + total_std),
                )
            };
            let up = ermqdt * pdash / pu;
            let down = (ermqdt - pu * up) / (1.0 - pu);
            (up, down, pu)
        }
    };

    LatticeGeometry::new(kind, n, dt, up, down, pu)
}

/// Joshi's fourth-order up probability for `k = (n − 1)/2` and quantile `dj`.
fn joshi4_up_probability(k: Real, dj: Real) -> Real {
    let alpha = dj / (8.0_f64).sqrt();
    let alpha2 = alpha * alpha;
    let alpha3 = alpha * alpha2;
    let alpha5 = alpha3 * alpha2;
    let alpha7 = alpha5 * alpha2;
    let beta = -0.375 * alpha - alpha3;
    let gamma = (5.0 / 6.0) * alpha5 + (13.0 / 12.0) * alpha3 + (25.0 / 128.0) * alpha;
    let delta = -0.1025 * alpha - 0.9285 * alpha3 - 1.43 * alpha5 - 0.5 * alpha7;
    let rootk = k.sqrt();
    let mut p = 0.5;
    p += alpha / rootk;
    p += beta / (k * rootk);
    p += gamma / (k * k * rootk);
    p += delta / (k * k * k * rootk);
    p
}

// ─── Tests ────────────────────────────────────────────────────────────────────
