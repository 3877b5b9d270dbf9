use crate::errors::PricingResult;
use crate::models::{check_inputs, finite_price, PricingModel};
use crate::state::{ModelParams, OptionKind};
use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes closed form for European options.
///
/// call = S*Phi(d1) - K*e^{-rT}*Phi(d2)
/// put  = K*e^{-rT}*Phi(-d2) - S*Phi(-d1)
///
/// where d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// and d2 = d1 - sigma * sqrt(T).
///
/// Exact up to floating precision. The other models are tested against it.
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self {
            normal: Normal::standard(),
        }
    }

    #[inline]
    fn d1_d2(params: &ModelParams) -> (f64, f64) {
        let ln_s_k = (params.spot / params.strike).ln();
        let d1 = (ln_s_k + (params.rate + params.half_sigma_sq) * params.ttl_years)
            / params.sigma_sqrt_t;
        (d1, d1 - params.sigma_sqrt_t)
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingModel for BlackScholes {
    #[inline]
    fn id(&self) -> &'static str {
        "black-scholes"
    }

    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["closed-form", "bs"]
    }

    fn price(&self, params: &ModelParams) -> PricingResult<f64> {
        check_inputs(self.name(), params)?;

        let (d1, d2) = Self::d1_d2(params);
        let pv_strike = params.strike * params.discount;

        let price = match params.kind {
            OptionKind::Call => {
                params.spot * self.normal.cdf(d1) - pv_strike * self.normal.cdf(d2)
            }
            OptionKind::Put => {
                pv_strike * self.normal.cdf(-d2) - params.spot * self.normal.cdf(-d1)
            }
        };

        finite_price(self.name(), price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PricingError;

    fn params(spot: f64, kind: OptionKind) -> ModelParams {
        ModelParams::new(spot, 100.0, 1.0, 0.05, 0.2, kind)
    }

    #[test]
    fn test_atm_call_reference() {
        let model = BlackScholes::new();
        let p = model.price(&params(100.0, OptionKind::Call)).unwrap();
        assert!((p - 10.4506).abs() < 1e-3, "ATM call={p} should be ~10.45");
    }

    #[test]
    fn test_atm_put_reference() {
        let model = BlackScholes::new();
        let p = model.price(&params(100.0, OptionKind::Put)).unwrap();
        assert!((p - 5.5735).abs() < 1e-3, "ATM put={p} should be ~5.57");
    }

    #[test]
    fn test_put_call_parity() {
        let model = BlackScholes::new();
        let cases = [
            (100.0, 100.0, 1.0, 0.05, 0.2),
            (50.0, 100.0, 0.5, 0.0, 0.35),
            (180.0, 120.0, 2.0, -0.01, 0.6),
            (95.0, 105.0, 0.01, 0.1, 0.15),
            (1_000.0, 900.0, 5.0, 0.03, 1.2),
        ];
        for (s, k, t, r, sigma) in cases {
            let call = model
                .price(&ModelParams::new(s, k, t, r, sigma, OptionKind::Call))
                .unwrap();
            let put = model
                .price(&ModelParams::new(s, k, t, r, sigma, OptionKind::Put))
                .unwrap();
            let parity = s - k * (-r * t).exp();
            assert!(
                (call - put - parity).abs() < 1e-6,
                "parity broken for S={s} K={k}: call-put={} vs {parity}",
                call - put
            );
        }
    }

    #[test]
    fn test_deep_otm_non_negative() {
        let model = BlackScholes::new();
        let call = model.price(&params(5.0, OptionKind::Call)).unwrap();
        let put = model.price(&params(5_000.0, OptionKind::Put)).unwrap();
        assert!(call >= 0.0 && call < 1e-6, "deep OTM call={call}");
        assert!(put >= 0.0 && put < 1e-6, "deep OTM put={put}");
    }

    #[test]
    fn test_zero_vol_fails() {
        let model = BlackScholes::new();
        let p = ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.0, OptionKind::Call);
        assert!(matches!(model.price(&p), Err(PricingError::ComputationFailure(_))));
    }
}
