use crate::state::View;

/// Presentation of a raw valuation. P&L is raw minus the reference and may be negative.
#[inline]
pub fn present(raw_price: f64, view: View, reference_price: f64) -> f64 {
    match view {
        View::Price => raw_price,
        View::Pnl => raw_price - reference_price,
    }
}
