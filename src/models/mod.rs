pub mod black_scholes;
pub mod binomial;
pub mod monte_carlo;
pub mod registry;

use crate::errors::{PricingError, PricingResult};
use crate::state::ModelParams;

/// All pricing models implement this trait.
/// price() must be a pure function: deterministic output from inputs only.
/// Send + Sync required so one instance can serve every grid cell across rayon workers.
pub trait PricingModel: Send + Sync {
    /// Canonical registry id, e.g. "black-scholes".
    fn id(&self) -> &'static str;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Extra identifiers that resolve to this model. Already normalised.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Raw (unrounded) value of a European option. Non-negative on success.
    fn price(&self, params: &ModelParams) -> PricingResult<f64>;
}

/// Reject degenerate inputs that would divide by zero inside any model.
#[inline]
pub(crate) fn check_inputs(model: &str, params: &ModelParams) -> PricingResult<()> {
    if !(params.sigma_sqrt_t > 0.0) || !params.sigma_sqrt_t.is_finite() {
        return Err(PricingError::ComputationFailure(format!(
            "{model}: sigma*sqrt(T) = {} is not a positive finite number",
            params.sigma_sqrt_t
        )));
    }
    if !params.discount.is_finite() {
        return Err(PricingError::ComputationFailure(format!(
            "{model}: discount factor overflowed (r={}, T={})",
            params.rate, params.ttl_years
        )));
    }
    Ok(())
}

/// Final gate on a model's output: non-finite fails, float round-off below zero reads as 0.
#[inline]
pub(crate) fn finite_price(model: &str, value: f64) -> PricingResult<f64> {
    if !value.is_finite() {
        return Err(PricingError::ComputationFailure(format!(
            "{model}: non-finite price {value}"
        )));
    }
    if value < 0.0 {
        if value > -1e-9 {
            return Ok(0.0);
        }
        return Err(PricingError::ComputationFailure(format!(
            "{model}: negative price {value}"
        )));
    }
    Ok(value)
}
