//! Binomial vanilla engine.
//!
//! Adapts [`LatticeEngine`] to the [`PricingEngine`] interface. The engine
//! fixes the scheme and step count; the lattice cache sits behind a mutex so
//! repeated pricing of the same option with the same inputs reuses one build.

use std::sync::Mutex;

use bt_core::{errors::Result, Error, Size};
use bt_instruments::{PricingEngine, PricingResult, VanillaOption};
use bt_market::ProcessParameters;
use bt_methods::DiscretizationKind;

use crate::analytic_european_engine::black_scholes_merton;
use crate::lattice_engine::{EngineSettings, LatticeEngine};

/// Pricing engine for vanilla options on a binomial lattice.
#[derive(Debug)]
pub struct BinomialVanillaEngine {
    kind: DiscretizationKind,
    steps: Size,
    control_variate: bool,
    lattice: Mutex<LatticeEngine>,
}

impl BinomialVanillaEngine {
    /// Create an engine with default settings.
    pub fn new(kind: DiscretizationKind, steps: Size) -> Self {
        Self {
            kind,
            steps,
            control_variate: false,
            lattice: Mutex::new(LatticeEngine::default()),
        }
    }

    /// Replace the lattice settings. Drops any cached build.
    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.lattice = Mutex::new(LatticeEngine::new(settings));
        self
    }

    /// Correct Leisen-Reimer values with the closed-form European price.
    pub fn with_control_variate(mut self, enabled: bool) -> Self {
        self.control_variate = enabled;
        self
    }

    /// The discretization scheme.
    pub fn kind(&self) -> DiscretizationKind {
        self.kind
    }

    /// The requested step count.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Number of lattice builds performed so far.
    pub fn build_count(&self) -> Result<usize> {
        Ok(self.lock()?.build_count())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LatticeEngine>> {
        self.lattice
            .lock()
            .map_err(|_| Error::Runtime("lattice cache lock poisoned".into()))
    }
}

impl PricingEngine for BinomialVanillaEngine {
    fn calculate(&self, params: &ProcessParameters, option: &VanillaOption) -> Result<PricingResult> {
        let reference = self.control_variate.then(|| {
            black_scholes_merton(
                option.option_type(),
                params.spot(),
                option.strike(),
                params.risk_free_rate(),
                params.dividend_yield(),
                params.volatility(),
                params.time_to_maturity(),
            )
            .value
        });

        let mut lattice = self.lock()?;
        lattice.set_control_variate(reference);
        lattice.calculate(self.kind, params, option, self.steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lattice_engine::GreeksMethod;
    use bt_instruments::OptionType;
    use bt_market::Date;
    use std::sync::Arc;

    fn setup() -> (ProcessParameters, VanillaOption) {
        let valuation = Date::from_ymd_opt(2025, 1, 15).unwrap();
        let expiry = Date::from_ymd_opt(2026, 1, 15).unwrap();
        (
            ProcessParameters::new(100.0, 0.05, 0.02, 0.25, valuation, expiry).unwrap(),
            VanillaOption::american(OptionType::Put, 100.0, expiry),
        )
    }

    #[test]
    fn repeated_pricing_reuses_the_build() {
        let (params, option) = setup();
        let engine = BinomialVanillaEngine::new(DiscretizationKind::CoxRossRubinstein, 200);
        let first = option.price(&engine, &params).unwrap();
        let second = option.price(&engine, &params).unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.build_count().unwrap(), 1);

        let moved = params.with_spot(101.0).unwrap();
        option.price(&engine, &moved).unwrap();
        assert_eq!(engine.build_count().unwrap(), 2);
    }

    #[test]
    fn engine_can_be_shared_across_threads() {
        let (params, option) = setup();
        let engine = Arc::new(
            BinomialVanillaEngine::new(DiscretizationKind::Tian, 150).with_settings(
                EngineSettings {
                    greeks: GreeksMethod::PerturbedLattices,
                    smoothing: false,
                },
            ),
        );
        let expected = option.price(&*engine, &params).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let option = option.clone();
                std::thread::spawn(move || option.price(&*engine, &params).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
        assert_eq!(engine.build_count().unwrap(), 1);
    }

    #[test]
    fn control_variate_moves_leisen_reimer_towards_reference() {
        let (params, _) = setup();
        let expiry = params.maturity_date();
        let european = VanillaOption::european(OptionType::Call, 105.0, expiry);
        let bs = black_scholes_merton(OptionType::Call, 100.0, 105.0, 0.05, 0.02, 0.25, 1.0);

        let engine = BinomialVanillaEngine::new(DiscretizationKind::LeisenReimer, 51)
            .with_control_variate(true);
        assert!(engine.kind() == DiscretizationKind::LeisenReimer && engine.steps() == 51);
        let res = european.price(&engine, &params).unwrap();
        assert!((res.value - bs.value).abs() < 1e-12, "{} vs {}", res.value, bs.value);
    }
}
