use crate::errors::PricingResult;
use crate::models::PricingModel;
use crate::state::{GridRequest, View};

/// Position of the reference cell along both grid axes (the 4th spot, the 4th vol).
/// Kept for compatibility with existing clients, which centre a 7-point ladder there.
pub const REFERENCE_INDEX: usize = 3;

/// The single raw price every P&L cell of `grid` is measured against.
///
/// Price view: 0 with no model call. P&L view: one model call at
/// (spots[3], vols[3]) when both axes are long enough, else 0.
pub fn resolve_baseline(model: &dyn PricingModel, grid: &GridRequest) -> PricingResult<f64> {
    if grid.view != View::Pnl {
        return Ok(0.0);
    }

    match (
        grid.spots.get(REFERENCE_INDEX),
        grid.vols.get(REFERENCE_INDEX),
    ) {
        (Some(&spot), Some(&sigma)) => model.price(&grid.params_at(spot, sigma)),
        _ => Ok(0.0),
    }
}
