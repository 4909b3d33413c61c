//! Cached binomial lattice engine.
//!
//! [`LatticeEngine`] owns at most one built lattice (plus its auxiliary
//! lattices) together with the [`LatticeKey`] it was built for. Value, delta
//! and gamma are all read from that one build; a query for a different key
//! drops it and builds again.
//!
//! ```text
//! build(kind, params, option, N) ──► rollback() ──► value() / delta() / gamma()
//!        │ key unchanged: no-op            │ already rolled back: no-op
//! ```

use bt_core::{errors::Result, Error, Real, Size};
use bt_instruments::{ExerciseType, OptionType, PricingResult, VanillaOption};
use bt_market::{Date, ProcessParameters};
use bt_methods::{discretize, BinomialLattice, DiscretizationKind};
use tracing::debug;

use crate::analytic_european_engine::{black_scholes_merton, check_horizon};

// ─── Settings ─────────────────────────────────────────────────────────────────

/// How delta and gamma are extracted from a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum GreeksMethod {
    /// Finite differences on columns 1 and 2 of the pricing lattice.
    /// No extra work beyond the single build.
    #[default]
    SharedLattice,
    /// Two extra lattices rooted at `S·u/d` and `S·d/u`, rolled back
    /// alongside the main one; delta and gamma are three-point differences
    /// at time zero. Triples the build cost.
    PerturbedLattices,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct EngineSettings {
    /// Greek extraction mode.
    pub greeks: GreeksMethod,
    /// Replace the values of column `N−1` with the one-step closed-form
    /// value before rolling back.
    pub smoothing: bool,
}

// ─── Cache key ────────────────────────────────────────────────────────────────

/// The parts of an option a lattice depends on.
///
/// Payoffs are identified by option type and strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrumentKey {
    option_type: OptionType,
    strike: u64,
    exercise: ExerciseType,
    maturity: Date,
}

impl InstrumentKey {
    /// Key of `option`.
    pub fn new(option: &VanillaOption) -> Self {
        Self {
            option_type: option.option_type(),
            strike: option.strike().to_bits(),
            exercise: option.exercise_type(),
            maturity: option.maturity(),
        }
    }
}

/// Everything a built lattice depends on.
///
/// Floats are compared by bit pattern, so any change to an input, however
/// small, makes a cached lattice stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeKey {
    kind: DiscretizationKind,
    process: [u64; 5],
    valuation_date: Date,
    maturity_date: Date,
    steps: Size,
    instrument: InstrumentKey,
    reference: Option<u64>,
}

impl LatticeKey {
    /// Key for pricing `option` under `params` with `steps` steps of `kind`,
    /// corrected against `reference` if one is given.
    pub fn new(
        kind: DiscretizationKind,
        params: &ProcessParameters,
        option: &VanillaOption,
        steps: Size,
        reference: Option<Real>,
    ) -> Self {
        Self {
            kind,
            process: [
                params.spot().to_bits(),
                params.risk_free_rate().to_bits(),
                params.dividend_yield().to_bits(),
                params.volatility().to_bits(),
                params.time_to_maturity().to_bits(),
            ],
            valuation_date: params.valuation_date(),
            maturity_date: params.maturity_date(),
            steps,
            instrument: InstrumentKey::new(option),
            reference: reference.map(Real::to_bits),
        }
    }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct CachedLattice {
    key: LatticeKey,
    params: ProcessParameters,
    option: VanillaOption,
    main: BinomialLattice,
    /// Roots at `S·u/d` and `S·d/u`, present in `PerturbedLattices` mode.
    perturbed: Option<[BinomialLattice; 2]>,
    /// Closed-form European value used by the control variate.
    reference: Option<Real>,
    /// `reference − V_european` on the main lattice, set by the rollback.
    correction: Option<Real>,
    rolled_back: bool,
}

/// Binomial lattice engine with a single-entry build cache.
///
/// A failed build leaves the engine empty, so later queries report
/// [`Error::NotRolledBack`] rather than stale numbers.
#[derive(Debug, Default)]
pub struct LatticeEngine {
    settings: EngineSettings,
    reference: Option<Real>,
    cache: Option<CachedLattice>,
    build_count: usize,
}

impl LatticeEngine {
    /// Create an engine with the given settings.
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Correct Leisen-Reimer values with the closed-form European value
    /// `reference` of the option being priced.
    pub fn with_control_variate(mut self, reference: Real) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Set or clear the control-variate reference for later builds.
    pub fn set_control_variate(&mut self, reference: Option<Real>) {
        self.reference = reference;
    }

    /// The engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Number of lattice builds performed so far. Cache hits do not count.
    pub fn build_count(&self) -> usize {
        self.build_count
    }

    /// Key of the cached lattice, if any.
    pub fn cached_key(&self) -> Option<&LatticeKey> {
        self.cache.as_ref().map(|c| &c.key)
    }

    /// `true` unless a lattice for exactly `key` is cached.
    pub fn is_stale(&self, key: &LatticeKey) -> bool {
        self.cached_key() != Some(key)
    }

    /// Build the lattice for `option` under `params`, unless it is cached.
    ///
    /// # Errors
    /// `InvalidDiscretization` if the scheme cannot produce a geometry with
    /// at least two steps, `Precondition` for inconsistent inputs.
    pub fn build(
        &mut self,
        kind: DiscretizationKind,
        params: &ProcessParameters,
        option: &VanillaOption,
        steps: Size,
    ) -> Result<()> {
        let reference = self
            .reference
            .filter(|_| kind == DiscretizationKind::LeisenReimer);
        let key = LatticeKey::new(kind, params, option, steps, reference);
        if !self.is_stale(&key) {
            debug!(%kind, steps, "lattice cache hit");
            return Ok(());
        }
        debug!(%kind, steps, "lattice cache miss");

        // Release the previous arrays before allocating new ones.
        self.cache = None;
        check_horizon(params, option)?;

        let strike = option.strike();
        let geometry = discretize(kind, params, steps, strike)?;
        if geometry.steps() < 2 {
            return Err(Error::invalid_discretization(format!(
                "{kind} needs at least 2 steps for delta and gamma, got {}",
                geometry.steps()
            )));
        }
        let payoff = |s: Real| option.payoff().value(s);
        let main = BinomialLattice::build(params.spot(), geometry, payoff);

        let perturbed = match self.settings.greeks {
            GreeksMethod::SharedLattice => None,
            GreeksMethod::PerturbedLattices => {
                let auxiliary = |root: Real| -> Result<BinomialLattice> {
                    let shifted = params.with_spot(root)?;
                    let g = discretize(kind, &shifted, steps, strike)?;
                    Ok(BinomialLattice::build(root, g, payoff))
                };
                let shift = geometry.up() / geometry.down();
                Some([
                    auxiliary(params.spot() * shift)?,
                    auxiliary(params.spot() / shift)?,
                ])
            }
        };

        self.build_count += 1;
        debug!(
            %kind,
            steps = geometry.steps(),
            up = geometry.up(),
            down = geometry.down(),
            probability = geometry.probability(),
            nodes = main.node_count(),
            builds = self.build_count,
            "lattice built"
        );

        self.cache = Some(CachedLattice {
            key,
            params: *params,
            option: option.clone(),
            main,
            perturbed,
            reference,
            correction: None,
            rolled_back: false,
        });
        Ok(())
    }

    /// Roll every cached lattice back to its root.
    ///
    /// American options take the larger of continuation and intrinsic value
    /// at every node. Does nothing if the cached lattice is already rolled
    /// back.
    ///
    /// # Errors
    /// `NotRolledBack` if no lattice has been built.
    pub fn rollback(&mut self) -> Result<()> {
        let smoothing = self.settings.smoothing;
        let cache = self.cache.as_mut().ok_or(Error::NotRolledBack)?;
        if cache.rolled_back {
            return Ok(());
        }
        let CachedLattice {
            params,
            option,
            main,
            perturbed,
            reference,
            correction,
            rolled_back,
            ..
        } = cache;
        let (params, option) = (&*params, &*option);

        let early = option.exercise().allows_early_exercise();
        let intrinsic = |s: Real| option.payoff().value(s);
        let exercise: Option<&dyn Fn(Real) -> Real> = if early { Some(&intrinsic) } else { None };

        let mut lattices: Vec<&mut BinomialLattice> = vec![&mut *main];
        if let Some([up, down]) = perturbed.as_mut() {
            lattices.push(up);
            lattices.push(down);
        }
        for lattice in lattices {
            let dt = lattice.geometry().dt();
            if smoothing {
                let last = lattice.steps() - 1;
                lattice.seed_column(last, |s| one_step_value(params, option, dt, s, early))?;
            }
            lattice.rollback(params.discount(dt), exercise);
        }

        if let Some(reference) = *reference {
            let dt = main.geometry().dt();
            let discount = params.discount(dt);
            let european = if smoothing {
                main.european_value(discount, main.steps() - 1, |s| {
                    one_step_value(params, option, dt, s, false)
                })?
            } else {
                main.european_value(discount, main.steps(), intrinsic)?
            };
            *correction = Some(reference - european);
            debug!(reference, european, "control variate applied");
        }

        *rolled_back = true;
        Ok(())
    }

    fn rolled_back(&self) -> Result<&CachedLattice> {
        match &self.cache {
            Some(cache) if cache.rolled_back => Ok(cache),
            _ => Err(Error::NotRolledBack),
        }
    }

    /// Present value at the root, with the control-variate correction if one
    /// applies.
    ///
    /// # Errors
    /// `NotRolledBack` before a completed [`rollback`](Self::rollback).
    pub fn value(&self) -> Result<Real> {
        let cache = self.rolled_back()?;
        let raw = cache.main.root_value()?;
        Ok(raw + cache.correction.unwrap_or(0.0))
    }

    /// ∂V/∂S.
    ///
    /// # Errors
    /// `NotRolledBack` before a completed [`rollback`](Self::rollback).
    pub fn delta(&self) -> Result<Real> {
        let cache = self.rolled_back()?;
        match &cache.perturbed {
            None => {
                let v = cache.main.column_values(1)?;
                let s = cache.main.column_prices(1);
                Ok((v[1] - v[0]) / (s[1] - s[0]))
            }
            Some(aux) => {
                let p = ThreePoint::new(&cache.main, aux)?;
                Ok((p.h_d * p.h_d * (p.v_up - p.v_mid) + p.h_u * p.h_u * (p.v_mid - p.v_down))
                    / (p.h_u * p.h_d * (p.h_u + p.h_d)))
            }
        }
    }

    /// ∂²V/∂S².
    ///
    /// # Errors
    /// `NotRolledBack` before a completed [`rollback`](Self::rollback).
    pub fn gamma(&self) -> Result<Real> {
        let cache = self.rolled_back()?;
        match &cache.perturbed {
            None => {
                let v = cache.main.column_values(2)?;
                let s = cache.main.column_prices(2);
                let delta_up = (v[2] - v[1]) / (s[2] - s[1]);
                let delta_down = (v[1] - v[0]) / (s[1] - s[0]);
                Ok((delta_up - delta_down) / (0.5 * (s[2] - s[0])))
            }
            Some(aux) => {
                let p = ThreePoint::new(&cache.main, aux)?;
                Ok(2.0 * (p.h_d * p.v_up - (p.h_u + p.h_d) * p.v_mid + p.h_u * p.v_down)
                    / (p.h_u * p.h_d * (p.h_u + p.h_d)))
            }
        }
    }

    /// Early-exercise frontier of the cached lattice, one entry per column.
    ///
    /// # Errors
    /// `NotRolledBack` before a completed [`rollback`](Self::rollback).
    pub fn exercise_frontier(&self) -> Result<Vec<Option<Real>>> {
        Ok(self.rolled_back()?.main.exercise_frontier())
    }

    /// Build (or reuse), roll back, and read value, delta and gamma.
    pub fn calculate(
        &mut self,
        kind: DiscretizationKind,
        params: &ProcessParameters,
        option: &VanillaOption,
        steps: Size,
    ) -> Result<PricingResult> {
        self.build(kind, params, option, steps)?;
        self.rollback()?;
        Ok(PricingResult::new(self.value()?, self.delta()?, self.gamma()?))
    }
}

/// Root values and spacings of the main and auxiliary lattices.
struct ThreePoint {
    v_up: Real,
    v_mid: Real,
    v_down: Real,
    h_u: Real,
    h_d: Real,
}

impl ThreePoint {
    fn new(main: &BinomialLattice, [up, down]: &[BinomialLattice; 2]) -> Result<Self> {
        Ok(Self {
            v_up: up.root_value()?,
            v_mid: main.root_value()?,
            v_down: down.root_value()?,
            h_u: up.spot() - main.spot(),
            h_d: main.spot() - down.spot(),
        })
    }
}

/// Closed-form value one step before expiry, floored at intrinsic value when
/// early exercise is allowed.
fn one_step_value(
    params: &ProcessParameters,
    option: &VanillaOption,
    dt: Real,
    spot: Real,
    early: bool,
) -> Real {
    let continuation = black_scholes_merton(
        option.option_type(),
        spot,
        option.strike(),
        params.risk_free_rate(),
        params.dividend_yield(),
        params.volatility(),
        dt,
    )
    .value;
    if early {
        continuation.max(option.payoff().value(spot))
    } else {
        continuation
    }
}

/// Price `option` with a fresh engine using default settings.
///
/// Deterministic: identical arguments give bit-identical results.
///
/// # Errors
/// `InvalidDiscretization` if `steps` is too small for `kind`, `Precondition`
/// for inconsistent inputs.
pub fn price(
    kind: DiscretizationKind,
    params: &ProcessParameters,
    option: &VanillaOption,
    steps: Size,
) -> Result<PricingResult> {
    LatticeEngine::default().calculate(kind, params, option, steps)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dates() -> (Date, Date) {
        (
            Date::from_ymd_opt(2025, 1, 15).unwrap(),
            Date::from_ymd_opt(2026, 1, 15).unwrap(),
        )
    }

    fn params() -> ProcessParameters {
        let (valuation, expiry) = dates();
        ProcessParameters::new(100.0, 0.05, 0.0, 0.20, valuation, expiry).unwrap()
    }

    fn call() -> VanillaOption {
        VanillaOption::european(OptionType::Call, 100.0, dates().1)
    }

    #[test]
    fn queries_before_build_or_rollback_fail() {
        let mut engine = LatticeEngine::default();
        assert_eq!(engine.value(), Err(Error::NotRolledBack));
        assert_eq!(engine.rollback(), Err(Error::NotRolledBack));

        engine
            .build(DiscretizationKind::CoxRossRubinstein, &params(), &call(), 100)
            .unwrap();
        assert_eq!(engine.value(), Err(Error::NotRolledBack));
        assert_eq!(engine.delta(), Err(Error::NotRolledBack));
        assert_eq!(engine.gamma(), Err(Error::NotRolledBack));
        assert_eq!(engine.exercise_frontier(), Err(Error::NotRolledBack));

        engine.rollback().unwrap();
        assert!(engine.value().is_ok());
    }

    #[test]
    fn identical_key_reuses_build() {
        let mut engine = LatticeEngine::default();
        let kind = DiscretizationKind::Tian;
        let first = engine.calculate(kind, &params(), &call(), 200).unwrap();
        let second = engine.calculate(kind, &params(), &call(), 200).unwrap();
        assert_eq!(engine.build_count(), 1);
        assert_eq!(first, second);

        let key = LatticeKey::new(kind, &params(), &call(), 200, None);
        assert!(!engine.is_stale(&key));
        assert_eq!(engine.cached_key(), Some(&key));
    }

    #[test]
    fn any_key_change_forces_rebuild() {
        let mut engine = LatticeEngine::default();
        let kind = DiscretizationKind::CoxRossRubinstein;
        let p = params();
        let base = LatticeKey::new(kind, &p, &call(), 100, None);
        engine.build(kind, &p, &call(), 100).unwrap();
        assert!(!engine.is_stale(&base));

        let bumped = p.with_spot(100.0 + 1e-9).unwrap();
        let put = VanillaOption::european(OptionType::Put, 100.0, dates().1);
        let american = VanillaOption::american(OptionType::Call, 100.0, dates().1);
        for key in [
            LatticeKey::new(kind, &bumped, &call(), 100, None),
            LatticeKey::new(kind, &p, &call(), 101, None),
            LatticeKey::new(DiscretizationKind::JarrowRudd, &p, &call(), 100, None),
            LatticeKey::new(kind, &p, &put, 100, None),
            LatticeKey::new(kind, &p, &american, 100, None),
            LatticeKey::new(kind, &p, &call(), 100, Some(10.45)),
        ] {
            assert!(engine.is_stale(&key), "{key:?}");
        }

        engine.build(kind, &p, &call(), 101).unwrap();
        assert_eq!(engine.build_count(), 2);
        assert!(engine.is_stale(&base));
    }

    #[test]
    fn failed_build_clears_cache() {
        let mut engine = LatticeEngine::default();
        let kind = DiscretizationKind::CoxRossRubinstein;
        engine.calculate(kind, &params(), &call(), 50).unwrap();

        let (valuation, expiry) = dates();
        let drifting = ProcessParameters::new(100.0, 0.2, 0.0, 0.02, valuation, expiry).unwrap();
        let err = engine.build(kind, &drifting, &call(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidDiscretization { .. }));
        assert!(engine.cached_key().is_none());
        assert_eq!(engine.value(), Err(Error::NotRolledBack));
    }

    #[test]
    fn single_step_lattice_is_rejected() {
        let err = price(DiscretizationKind::JarrowRudd, &params(), &call(), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidDiscretization { .. }), "{err}");
    }

    #[test]
    fn greeks_do_not_disturb_value() {
        let mut engine = LatticeEngine::new(EngineSettings {
            greeks: GreeksMethod::PerturbedLattices,
            smoothing: false,
        });
        engine
            .build(DiscretizationKind::Trigeorgis, &params(), &call(), 300)
            .unwrap();
        engine.rollback().unwrap();
        let alone = engine.value().unwrap();
        engine.delta().unwrap();
        engine.gamma().unwrap();
        assert_eq!(engine.value().unwrap(), alone);
        assert_eq!(engine.build_count(), 1);
    }

    #[test]
    fn control_variate_only_touches_leisen_reimer() {
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0);

        let mut engine = LatticeEngine::default().with_control_variate(bs.value);
        let lr = engine
            .calculate(DiscretizationKind::LeisenReimer, &params(), &call(), 101)
            .unwrap();
        // European option: the correction replaces the lattice value exactly.
        assert!((lr.value - bs.value).abs() < 1e-12, "{} vs {}", lr.value, bs.value);

        let crr_plain = price(DiscretizationKind::CoxRossRubinstein, &params(), &call(), 101).unwrap();
        let crr = engine
            .calculate(DiscretizationKind::CoxRossRubinstein, &params(), &call(), 101)
            .unwrap();
        assert_eq!(crr, crr_plain);
    }

    #[test]
    fn smoothing_reduces_crr_oscillation() {
        let smooth = EngineSettings {
            greeks: GreeksMethod::SharedLattice,
            smoothing: true,
        };
        let bs = black_scholes_merton(OptionType::Call, 100.0, 100.0, 0.05, 0.0, 0.20, 1.0).value;
        let kind = DiscretizationKind::CoxRossRubinstein;
        let mut worst_plain: Real = 0.0;
        let mut worst_smooth: Real = 0.0;
        for steps in [100, 101, 150, 151] {
            let plain = price(kind, &params(), &call(), steps).unwrap().value;
            let smoothed = LatticeEngine::new(smooth)
                .calculate(kind, &params(), &call(), steps)
                .unwrap()
                .value;
            worst_plain = worst_plain.max((plain - bs).abs());
            worst_smooth = worst_smooth.max((smoothed - bs).abs());
        }
        assert!(
            worst_smooth < worst_plain,
            "smoothed error {worst_smooth:.2e} >= plain error {worst_plain:.2e}"
        );
    }

    #[test]
    fn american_put_frontier_is_exposed() {
        let put = VanillaOption::american(OptionType::Put, 100.0, dates().1);
        let mut engine = LatticeEngine::default();
        engine
            .calculate(DiscretizationKind::CoxRossRubinstein, &params(), &put, 100)
            .unwrap();
        let frontier = engine.exercise_frontier().unwrap();
        assert_eq!(frontier.len(), 100);
        assert!(frontier.iter().flatten().all(|&b| b < 100.0));
    }
}
