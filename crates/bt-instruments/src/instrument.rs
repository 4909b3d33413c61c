//! Pricing results and the pricing-engine interface.
//!
//! An engine maps a vanilla option and a set of process parameters to a
//! [`PricingResult`]. Engines are free to cache work between calls as long as
//! identical inputs keep producing identical results.

use crate::option::VanillaOption;
use bt_core::{errors::Result, Real};
use bt_market::ProcessParameters;

/// Value and first/second spot sensitivities of an option.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Net present value.
    pub value: Real,
    /// ∂V/∂S.
    pub delta: Real,
    /// ∂²V/∂S².
    pub gamma: Real,
}

impl PricingResult {
    /// Create a result from its three components.
    pub fn new(value: Real, delta: Real, gamma: Real) -> Self {
        Self {
            value,
            delta,
            gamma,
        }
    }
}

/// Base trait for all pricing engines.
pub trait PricingEngine: std::fmt::Debug + Send + Sync {
    /// Price `option` under the process described by `params`.
    fn calculate(&self, params: &ProcessParameters, option: &VanillaOption)
        -> Result<PricingResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_fields() {
        let r = PricingResult::new(4.2, 0.55, 0.02);
        assert_eq!(r.value, 4.2);
        assert_eq!(r.delta, 0.55);
        assert_eq!(r.gamma, 0.02);
        assert_eq!(PricingResult::default(), PricingResult::new(0.0, 0.0, 0.0));
    }
}
