use crate::errors::{PricingError, PricingResult};
use crate::models::{check_inputs, finite_price, PricingModel};
use crate::state::ModelParams;

/// Cox-Ross-Rubinstein binomial lattice, European exercise only.
///
/// dt = T/M, u = e^{sigma*sqrt(dt)}, d = 1/u, p = (e^{r*dt} - d) / (u - d)
///
/// Terminal payoffs over M+1 nodes, then backward induction
/// V = e^{-r*dt} * (p*V_up + (1-p)*V_down) down to the root.
/// No early-exercise comparison at interior nodes.
pub struct BinomialTree {
    steps: usize,
}

impl BinomialTree {
    pub fn new(steps: usize) -> Self {
        Self { steps }
    }
}

impl PricingModel for BinomialTree {
    #[inline]
    fn id(&self) -> &'static str {
        "binomial"
    }

    #[inline]
    fn name(&self) -> &'static str {
        "Binomial"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["lattice", "crr"]
    }

    fn price(&self, params: &ModelParams) -> PricingResult<f64> {
        check_inputs(self.name(), params)?;

        if self.steps == 0 {
            return Err(PricingError::ComputationFailure(
                "Binomial: lattice needs at least one step".into(),
            ));
        }

        let m = self.steps;
        let dt = params.ttl_years / m as f64;
        let u = (params.sigma * dt.sqrt()).exp();
        let d = 1.0 / u;
        let p = ((params.rate * dt).exp() - d) / (u - d);
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(PricingError::ComputationFailure(format!(
                "Binomial: risk-neutral probability {p} outside [0, 1] (u={u}, d={d})"
            )));
        }

        let disc = (-params.rate * dt).exp();
        let disc_p = disc * p;
        let disc_q = disc * (1.0 - p);

        // spot * u^j * d^(m-j) = spot * e^{(2j - m) * sigma*sqrt(dt)}
        let log_step = params.sigma * dt.sqrt();
        let mut values = Vec::with_capacity(m + 1);
        for j in 0..=m {
            let node = params.spot * ((2.0 * j as f64 - m as f64) * log_step).exp();
            if !node.is_normal() {
                return Err(PricingError::ComputationFailure(format!(
                    "Binomial: terminal node {j} of {m} out of range ({node})"
                )));
            }
            values.push(params.kind.payoff(node, params.strike));
        }

        for i in (0..m).rev() {
            for j in 0..=i {
                values[j] = disc_p * values[j + 1] + disc_q * values[j];
            }
        }

        finite_price(self.name(), values[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::black_scholes::BlackScholes;
    use crate::state::OptionKind;

    #[test]
    fn test_converges_to_closed_form() {
        let tree = BinomialTree::new(500);
        let bs = BlackScholes::new();
        let cases = [
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call),
            ModelParams::new(100.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Put),
            ModelParams::new(95.0, 100.0, 1.0, 0.05, 0.2, OptionKind::Call),
        ];
        for params in cases {
            let lattice = tree.price(&params).unwrap();
            let exact = bs.price(&params).unwrap();
            assert!(
                (lattice - exact).abs() < 0.01,
                "CRR(500)={lattice} vs BS={exact} for S={} {:?}",
                params.spot,
                params.kind
            );
        }
    }

    #[test]
    fn test_single_step_by_hand() {
        let tree = BinomialTree::new(1);
        let params = ModelParams::new(100.0, 100.0, 1.0, 0.0, 0.2, OptionKind::Call);
        let u = 0.2_f64.exp();
        let d = 1.0 / u;
        let p = (1.0 - d) / (u - d);
        let expected = p * (100.0 * u - 100.0);
        let got = tree.price(&params).unwrap();
        assert!((got - expected).abs() < 1e-12, "one-step CRR={got}, expected {expected}");
    }

    #[test]
    fn test_arbitrage_lattice_fails() {
        // Drift per step beats the up move when vol is tiny.
        let tree = BinomialTree::new(1);
        let params = ModelParams::new(100.0, 100.0, 1.0, 0.05, 1e-6, OptionKind::Call);
        assert!(matches!(
            tree.price(&params),
            Err(PricingError::ComputationFailure(_))
        ));
    }

    #[test]
    fn test_extreme_spread_fails_instead_of_zero() {
        // sigma*sqrt(T) ~ 55: the bottom node underflows, the top one overflows
        let tree = BinomialTree::new(500);
        for kind in [OptionKind::Call, OptionKind::Put] {
            let params = ModelParams::new(100.0, 100.0, 30.0, 0.05, 10.0, kind);
            assert!(
                matches!(tree.price(&params), Err(PricingError::ComputationFailure(_))),
                "{kind:?} lattice should fail at sigma=10, T=30"
            );
        }
    }

    #[test]
    fn test_non_negative() {
        let tree = BinomialTree::new(200);
        for spot in [1.0, 50.0, 100.0, 400.0] {
            for kind in [OptionKind::Call, OptionKind::Put] {
                let v = tree
                    .price(&ModelParams::new(spot, 100.0, 1.0, 0.05, 0.3, kind))
                    .unwrap();
                assert!(v >= 0.0, "negative lattice value {v} at S={spot}");
            }
        }
    }
}
