pub mod baseline;
pub mod format;
pub mod grid;
pub mod validate;
pub mod view;

use crate::errors::{PricingError, PricingResult};
use crate::models::registry::ModelRegistry;
use crate::models::PricingModel;
use crate::state::{GridRequest, PricingRequest};
use format::HeatmapResult;
use std::sync::Arc;
use std::time::Instant;
use validate::{RawGridRequest, RawPricingRequest};

/// Hook the engine calls on every outcome. Keeps the core free of any
/// particular logging or metrics choice.
pub trait FailureObserver: Send + Sync {
    fn on_validation_failure(&self, err: &PricingError);
    fn on_computation_failure(&self, model: &str, err: &PricingError);
    fn on_single(&self) {}
    fn on_grid(&self, _cells: usize) {}
}

/// Strategy -> view transform -> rounding for one validated request.
#[inline]
pub fn value(model: &dyn PricingModel, req: &PricingRequest) -> PricingResult<f64> {
    let raw = model.price(&req.params())?;
    Ok(format::round_cents(view::present(raw, req.view, req.reference_price)))
}

/// Stateless across calls: holds only the read-only registry and the hook.
pub struct PricingEngine {
    registry: Arc<ModelRegistry>,
    observer: Arc<dyn FailureObserver>,
    max_grid_cells: usize,
}

impl PricingEngine {
    pub fn new(
        registry: Arc<ModelRegistry>,
        observer: Arc<dyn FailureObserver>,
        max_grid_cells: usize,
    ) -> Self {
        Self {
            registry,
            observer,
            max_grid_cells,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Validator -> Dispatcher -> Strategy -> Transform, rounded.
    pub fn price(&self, raw: &RawPricingRequest) -> PricingResult<f64> {
        let req = validate::validate_request(raw).map_err(|e| self.rejected(e))?;
        self.price_request(&req)
    }

    pub fn price_request(&self, req: &PricingRequest) -> PricingResult<f64> {
        let model = self.dispatch(&req.model)?;
        let out = value(model, req).map_err(|e| self.failed(model.id(), e))?;
        self.observer.on_single();
        Ok(out)
    }

    /// Validate, resolve the baseline once, then sweep every cell.
    pub fn heatmap(&self, raw: &RawGridRequest) -> PricingResult<HeatmapResult> {
        let grid =
            validate::validate_grid(raw, self.max_grid_cells).map_err(|e| self.rejected(e))?;
        self.heatmap_request(&grid)
    }

    pub fn heatmap_request(&self, grid: &GridRequest) -> PricingResult<HeatmapResult> {
        let model = self.dispatch(&grid.model)?;
        let (rows, cols) = grid.shape();

        let span = tracing::info_span!(
            "heatmap",
            request_id = %uuid::Uuid::new_v4(),
            model = model.id(),
            rows,
            cols,
            view = %grid.view,
        );
        let _enter = span.enter();
        let started = Instant::now();

        let baseline =
            baseline::resolve_baseline(model, grid).map_err(|e| self.failed(model.id(), e))?;
        let result =
            grid::evaluate(model, grid, baseline).map_err(|e| self.failed(model.id(), e))?;

        tracing::debug!(
            rows = result.rows(),
            cols = result.cols(),
            baseline = baseline,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "heatmap evaluated"
        );
        self.observer.on_grid(rows * cols);
        Ok(result)
    }

    fn dispatch(&self, identifier: &str) -> PricingResult<&dyn PricingModel> {
        self.registry.resolve(identifier).map_err(|e| self.rejected(e))
    }

    /// Hands a validation failure to the observer and returns it.
    pub fn rejected(&self, err: PricingError) -> PricingError {
        self.observer.on_validation_failure(&err);
        err
    }

    fn failed(&self, model: &str, err: PricingError) -> PricingError {
        self.observer.on_computation_failure(model, &err);
        err
    }
}
