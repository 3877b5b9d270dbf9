use crate::engine::format::HeatmapResult;
use crate::engine::value;
use crate::errors::PricingResult;
use crate::models::PricingModel;
use crate::state::GridRequest;
use rayon::prelude::*;

/// Sweep spot (rows) × vol (columns) on the rayon pool.
///
/// `baseline` is resolved by the caller before the sweep and is the reference
/// price of every cell. Cells are independent; the collected matrix keeps input
/// order. Any failing cell fails the whole grid.
pub fn evaluate(
    model: &dyn PricingModel,
    grid: &GridRequest,
    baseline: f64,
) -> PricingResult<HeatmapResult> {
    let (rows, cols) = grid.shape();
    if cols == 0 {
        return Ok(HeatmapResult::new(vec![Vec::new(); rows]));
    }

    // rayon workers do not inherit the caller's span
    let span = tracing::Span::current();
    let cells = (0..rows * cols)
        .into_par_iter()
        .map(|idx| {
            span.in_scope(|| {
                let cell = grid.cell(grid.spots[idx / cols], grid.vols[idx % cols], baseline);
                value(model, &cell)
            })
        })
        .collect::<PricingResult<Vec<f64>>>()?;

    Ok(HeatmapResult::new(
        cells.chunks(cols).map(<[f64]>::to_vec).collect(),
    ))
}
