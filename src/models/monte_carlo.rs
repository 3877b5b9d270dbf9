use crate::errors::{PricingError, PricingResult};
use crate::models::{check_inputs, finite_price, PricingModel};
use crate::state::{ModelParams, OptionKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use sha2::{Digest, Sha256};

/// Monte Carlo valuation of a European option under GBM.
///
/// S_T = S * exp((r - sigma^2/2)*T + sigma*sqrt(T)*Z),  Z ~ N(0,1)
/// price = e^{-rT} * mean(payoff(S_T))
///
/// Terminal prices are sampled directly (no time stepping). Every draw Z is
/// paired with -Z; the estimator averages each pair first, so the standard
/// error is taken over pair means.
///
/// The RNG stream is seeded from the request coordinates, so the same
/// (S, K, T, r, sigma, kind) always reproduces the same price and concurrent
/// grid cells never share generator state.
pub struct MonteCarlo {
    /// Total terminal draws (both legs of every antithetic pair)
    paths: usize,
    base_seed: u64,
}

/// Price plus sampling error. Stack-allocated.
#[derive(Debug, Clone, Copy)]
pub struct McEstimate {
    pub price: f64,
    pub std_error: f64,
    pub pairs: usize,
}

impl MonteCarlo {
    pub fn new(paths: usize, base_seed: u64) -> Self {
        Self { paths, base_seed }
    }

    /// Stream seed for one valuation: SHA-256 over the base seed and the raw
    /// bits of every coordinate, truncated to 64 bits.
    pub fn coordinate_seed(&self, params: &ModelParams) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.base_seed.to_le_bytes());
        for v in [
            params.spot,
            params.strike,
            params.ttl_years,
            params.rate,
            params.sigma,
        ] {
            hasher.update(v.to_bits().to_le_bytes());
        }
        hasher.update([match params.kind {
            OptionKind::Call => 0u8,
            OptionKind::Put => 1u8,
        }]);
        let digest = hasher.finalize();
        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(word)
    }

    pub fn simulate(&self, params: &ModelParams) -> PricingResult<McEstimate> {
        check_inputs(self.name(), params)?;

        let pairs = self.paths.div_ceil(2).max(1);
        let mut rng = StdRng::seed_from_u64(self.coordinate_seed(params));

        let drift = (params.rate - params.half_sigma_sq) * params.ttl_years;
        let diffusion = params.sigma_sqrt_t;

        let mut sum = 0.0_f64;
        let mut sum_sq = 0.0_f64;
        for _ in 0..pairs {
            let z: f64 = StandardNormal.sample(&mut rng);
            let up = params.spot * diffusion.mul_add(z, drift).exp();
            let down = params.spot * diffusion.mul_add(-z, drift).exp();
            let y = 0.5
                * (params.kind.payoff(up, params.strike) + params.kind.payoff(down, params.strike));
            sum += y;
            sum_sq += y * y;
        }

        let n = pairs as f64;
        let mean = sum / n;
        let variance = if pairs > 1 {
            ((sum_sq - n * mean * mean) / (n - 1.0)).max(0.0)
        } else {
            0.0
        };

        let price = finite_price(self.name(), params.discount * mean)?;
        let std_error = params.discount * (variance / n).sqrt();
        if !std_error.is_finite() {
            return Err(PricingError::ComputationFailure(format!(
                "{}: non-finite standard error",
                self.name()
            )));
        }

        Ok(McEstimate {
            price,
            std_error,
            pairs,
        })
    }
}

impl PricingModel for MonteCarlo {
    #[inline]
    fn id(&self) -> &'static str {
        "monte-carlo"
    }

    #[inline]
    fn name(&self) -> &'static str {
        "Monte Carlo"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["simulation", "mc"]
    }

    fn price(&self, params: &ModelParams) -> PricingResult<f64> {
        let est = self.simulate(params)?;
        tracing::trace!(pairs = est.pairs, std_error = est.std_error, "mc estimate");
        Ok(est.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::BlackScholes;

    #[test]
    fn test_converges_to_closed_form() {
        let mc = MonteCarlo::new(100_000, 42);
        let bs = BlackScholes::new();
        let cases = [
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Put),
            ModelParams::new(80.0, 100.0, 0.5, 0.02, 0.4, OptionKind::Call),
        ];
        for params in cases {
            let est = mc.simulate(&params).unwrap();
            let exact = bs.price(&params).unwrap();
            assert!(est.std_error > 0.0);
            assert!(
                (est.price - exact).abs() <= 3.0 * est.std_error,
                "MC {} vs BS {exact} (se={}) for {:?}",
                est.price,
                est.std_error,
                params.kind
            );
        }
    }

    #[test]
    fn test_deterministic_per_coordinates() {
        let mc = MonteCarlo::new(10_000, 7);
        let params = ModelParams::new(120.0, 100.0, 0.75, 0.03, 0.25, OptionKind::Put);
        let a = mc.price(&params).unwrap();
        let b = mc.price(&params).unwrap();
        assert_eq!(a.to_bits(), b.to_bits(), "same request must reproduce: {a} vs {b}");
    }

    #[test]
    fn test_seed_depends_on_every_coordinate() {
        let mc = MonteCarlo::new(1_000, 7);
        let base = ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call);
        let seed = mc.coordinate_seed(&base);
        let variants = [
            ModelParams::new(101.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 101.0, 1.0, 0.05, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.1, 0.05, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.0, 0.06, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.3, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Put),
        ];
        for v in variants {
            assert_ne!(mc.coordinate_seed(&v), seed, "seed collision for {v:?}");
        }
        assert_ne!(MonteCarlo::new(1_000, 8).coordinate_seed(&base), seed);
    }

    #[test]
    fn test_odd_path_count_rounds_up_to_pairs() {
        let mc = MonteCarlo::new(5, 1);
        let params = ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call);
        assert_eq!(mc.simulate(&params).unwrap().pairs, 3);
    }

    #[test]
    fn test_overflow_is_computation_failure() {
        let mc = MonteCarlo::new(1_000, 1);
        let params = ModelParams::new(1e308, 1.0, 1.0, 0.05, 1.0, OptionKind::Call);
        assert!(matches!(
            mc.price(&params),
            Err(PricingError::ComputationFailure(_))
        ));
    }
}
