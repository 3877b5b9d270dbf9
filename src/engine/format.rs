use crate::errors::PricingError;

/// Round half away from zero to 2 decimals. Negative zero comes out as 0.
/// Magnitudes past 1e15 have no cent resolution left and pass through.
#[inline]
pub fn round_cents(x: f64) -> f64 {
    if !x.is_finite() || x.abs() >= 1e15 {
        return x;
    }
    let r = (x * 100.0).round() / 100.0;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Successful single valuation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ValuationResponse {
    pub option_price: f64,
}

/// Matrix of rounded results: one row per spot, one column per volatility.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HeatmapResult {
    heatmap: Vec<Vec<f64>>,
}

impl HeatmapResult {
    pub fn new(heatmap: Vec<Vec<f64>>) -> Self {
        Self { heatmap }
    }

    pub fn rows(&self) -> usize {
        self.heatmap.len()
    }

    pub fn cols(&self) -> usize {
        self.heatmap.first().map_or(0, Vec::len)
    }

    #[cfg(test)]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.heatmap.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Failure body. `kind` tells the failure apart from a numeric result.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&PricingError> for ErrorBody {
    fn from(err: &PricingError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            field: err.field().map(str::to_string),
        }
    }
}
