use crate::config::AppConfig;
use crate::engine::{FailureObserver, PricingEngine};
use crate::errors::PricingError;
use portable_atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ── Option / View selectors ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    /// Payoff at expiry for a terminal spot.
    #[inline(always)]
    pub fn payoff(self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum View {
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "P&L")]
    Pnl,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Price => write!(f, "price"),
            Self::Pnl => write!(f, "P&L"),
        }
    }
}

// ── Model inputs (precomputed once per valuation) ──

/// Everything a pricing model needs. Stack-allocated, Copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParams {
    pub spot: f64,
    pub strike: f64,
    pub ttl_years: f64,
    pub rate: f64,
    pub sigma: f64,
    pub kind: OptionKind,
    // Precomputed
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
    pub half_sigma_sq: f64,
    pub discount: f64,
}

impl ModelParams {
    #[inline]
    pub fn new(
        spot: f64,
        strike: f64,
        ttl_years: f64,
        rate: f64,
        sigma: f64,
        kind: OptionKind,
    ) -> Self {
        let sqrt_t = ttl_years.sqrt();
        Self {
            spot,
            strike,
            ttl_years,
            rate,
            sigma,
            kind,
            sqrt_t,
            sigma_sqrt_t: sigma * sqrt_t,
            half_sigma_sq: 0.5 * sigma * sigma,
            discount: (-rate * ttl_years).exp(),
        }
    }
}

// ── Validated requests ──

/// A single valuation. Only built by the validator, immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRequest {
    pub spot: f64,
    pub strike: f64,
    pub ttl_years: f64,
    pub rate: f64,
    pub sigma: f64,
    pub kind: OptionKind,
    /// Normalised model identifier, resolved by the registry.
    pub model: String,
    pub view: View,
    pub reference_price: f64,
}

impl PricingRequest {
    #[inline]
    pub fn params(&self) -> ModelParams {
        ModelParams::new(self.spot, self.strike, self.ttl_years, self.rate, self.sigma, self.kind)
    }
}

/// A batched valuation over spot × volatility.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRequest {
    pub spots: Vec<f64>,
    pub vols: Vec<f64>,
    pub strike: f64,
    pub ttl_years: f64,
    pub rate: f64,
    pub kind: OptionKind,
    pub model: String,
    pub view: View,
}

impl GridRequest {
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.spots.len(), self.vols.len())
    }

    /// Model inputs for one (spot, vol) coordinate with the grid's shared fields.
    #[inline]
    pub fn params_at(&self, spot: f64, sigma: f64) -> ModelParams {
        ModelParams::new(spot, self.strike, self.ttl_years, self.rate, sigma, self.kind)
    }

    /// The per-cell request, carrying the grid's baseline as its reference price.
    pub fn cell(&self, spot: f64, sigma: f64, baseline: f64) -> PricingRequest {
        PricingRequest {
            spot,
            strike: self.strike,
            ttl_years: self.ttl_years,
            rate: self.rate,
            sigma,
            kind: self.kind,
            model: self.model.clone(),
            view: self.view,
            reference_price: baseline,
        }
    }
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub valuations_served: AtomicU64,
    pub grids_served: AtomicU64,
    pub cells_priced: AtomicU64,
    pub validation_failures: AtomicU64,
    pub computation_failures: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            valuations_served: AtomicU64::new(0),
            grids_served: AtomicU64::new(0),
            cells_priced: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            computation_failures: AtomicU64::new(0),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use portable_atomic::Ordering::Relaxed;
        serde_json::json!({
            "valuations_served": self.valuations_served.load(Relaxed),
            "grids_served": self.grids_served.load(Relaxed),
            "cells_priced": self.cells_priced.load(Relaxed),
            "validation_failures": self.validation_failures.load(Relaxed),
            "computation_failures": self.computation_failures.load(Relaxed),
        })
    }
}

impl Default for PerfCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Failure hook used by the binary: structured log line plus a counter bump.
impl FailureObserver for PerfCounters {
    fn on_validation_failure(&self, err: &PricingError) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(kind = err.kind(), field = err.field(), error = %err, "request rejected");
    }

    fn on_computation_failure(&self, model: &str, err: &PricingError) {
        self.computation_failures.fetch_add(1, Ordering::Relaxed);
        tracing::error!(model = model, error = %err, "valuation failed");
    }

    fn on_single(&self) {
        self.valuations_served.fetch_add(1, Ordering::Relaxed);
        self.cells_priced.fetch_add(1, Ordering::Relaxed);
    }

    fn on_grid(&self, cells: usize) {
        self.grids_served.fetch_add(1, Ordering::Relaxed);
        self.cells_priced.fetch_add(cells as u64, Ordering::Relaxed);
    }
}

// ── Application shared state ──

pub struct AppState {
    pub config: AppConfig,
    pub engine: PricingEngine,
    pub counters: Arc<PerfCounters>,
}

impl AppState {
    pub fn new(config: AppConfig, engine: PricingEngine, counters: Arc<PerfCounters>) -> Arc<Self> {
        Arc::new(Self {
            config,
            engine,
            counters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoffs() {
        assert_eq!(OptionKind::Call.payoff(110.0, 100.0), 10.0);
        assert_eq!(OptionKind::Call.payoff(90.0, 100.0), 0.0);
        assert_eq!(OptionKind::Put.payoff(90.0, 100.0), 10.0);
        assert_eq!(OptionKind::Put.payoff(110.0, 100.0), 0.0);
    }

    #[test]
    fn test_params_precompute() {
        let p = ModelParams::new(100.0, 100.0, 4.0, 0.05, 0.2, OptionKind::Call);
        assert_eq!(p.sqrt_t, 2.0);
        assert!((p.sigma_sqrt_t - 0.4).abs() < 1e-15);
        assert!((p.discount - (-0.2_f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_cell_carries_baseline() {
        let grid = GridRequest {
            spots: vec![90.0, 100.0],
            vols: vec![0.2],
            strike: 100.0,
            ttl_years: 1.0,
            rate: 0.05,
            kind: OptionKind::Put,
            model: "binomial".into(),
            view: View::Pnl,
        };
        let req = grid.cell(90.0, 0.2, 3.5);
        assert_eq!(req.reference_price, 3.5);
        assert_eq!(req.kind, OptionKind::Put);
        assert_eq!(req.params(), grid.params_at(90.0, 0.2));
    }

    #[test]
    fn test_counters_split_single_and_grid() {
        let counters = PerfCounters::new();
        counters.on_single();
        counters.on_grid(30);
        assert_eq!(counters.valuations_served.load(Ordering::Relaxed), 1);
        assert_eq!(counters.grids_served.load(Ordering::Relaxed), 1);
        assert_eq!(counters.cells_priced.load(Ordering::Relaxed), 31);
    }
}
