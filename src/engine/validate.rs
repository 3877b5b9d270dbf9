use crate::errors::{PricingError, PricingResult};
use crate::models::registry::{normalize_id, DEFAULT_MODEL};
use crate::state::{GridRequest, OptionKind, PricingRequest, View};

/// A numeric field as it arrives on the wire: JSON number or decimal string
/// (form inputs are posted as strings).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Number(f64),
    Text(String),
}

/// Single valuation, unvalidated.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPricingRequest {
    pub spot_price: Option<WireNumber>,
    pub strike_price: Option<WireNumber>,
    pub time_to_maturity: Option<WireNumber>,
    pub risk_free_rate: Option<WireNumber>,
    pub volatility: Option<WireNumber>,
    pub option_type: Option<String>,
    pub model_type: Option<String>,
    pub view_type: Option<String>,
    pub reference_price: Option<WireNumber>,
}

/// Batched valuation, unvalidated.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawGridRequest {
    pub spot_prices: Option<Vec<WireNumber>>,
    pub volatilities: Option<Vec<WireNumber>>,
    pub strike_price: Option<WireNumber>,
    pub time_to_maturity: Option<WireNumber>,
    pub risk_free_rate: Option<WireNumber>,
    pub option_type: Option<String>,
    pub model_type: Option<String>,
    pub view_type: Option<String>,
}

pub fn validate_request(raw: &RawPricingRequest) -> PricingResult<PricingRequest> {
    let spot = positive("spotPrice", raw.spot_price.as_ref())?;
    let strike = positive("strikePrice", raw.strike_price.as_ref())?;
    let ttl_years = positive("timeToMaturity", raw.time_to_maturity.as_ref())?;
    let rate = finite("riskFreeRate", raw.risk_free_rate.as_ref())?;
    let sigma = positive("volatility", raw.volatility.as_ref())?;
    let kind = parse_kind(raw.option_type.as_deref())?;
    let view = parse_view(raw.view_type.as_deref())?;
    let reference_price = match raw.reference_price.as_ref() {
        Some(v) if !is_blank(v) => finite("referencePrice", Some(v))?,
        _ => 0.0,
    };

    Ok(PricingRequest {
        spot,
        strike,
        ttl_years,
        rate,
        sigma,
        kind,
        model: model_id(raw.model_type.as_deref()),
        view,
        reference_price,
    })
}

pub fn validate_grid(raw: &RawGridRequest, max_cells: usize) -> PricingResult<GridRequest> {
    let spots = positive_sequence("spotPrices", raw.spot_prices.as_deref())?;
    let vols = positive_sequence("volatilities", raw.volatilities.as_deref())?;

    let cells = spots.len().saturating_mul(vols.len());
    if cells > max_cells {
        return Err(PricingError::invalid(
            "grid",
            format!(
                "{}x{} = {cells} cells exceeds the limit of {max_cells}",
                spots.len(),
                vols.len()
            ),
        ));
    }

    let strike = positive("strikePrice", raw.strike_price.as_ref())?;
    let ttl_years = positive("timeToMaturity", raw.time_to_maturity.as_ref())?;
    let rate = finite("riskFreeRate", raw.risk_free_rate.as_ref())?;
    let kind = parse_kind(raw.option_type.as_deref())?;
    let view = parse_view(raw.view_type.as_deref())?;

    Ok(GridRequest {
        spots,
        vols,
        strike,
        ttl_years,
        rate,
        kind,
        model: model_id(raw.model_type.as_deref()),
        view,
    })
}

pub fn parse_kind(raw: Option<&str>) -> PricingResult<OptionKind> {
    match raw.map(normalize_id).as_deref() {
        None | Some("") => Ok(OptionKind::Call),
        Some("call") => Ok(OptionKind::Call),
        Some("put") => Ok(OptionKind::Put),
        Some(_) => Err(PricingError::invalid(
            "optionType",
            format!("expected 'call' or 'put', got '{}'", raw.unwrap_or_default()),
        )),
    }
}

pub fn parse_view(raw: Option<&str>) -> PricingResult<View> {
    match raw.map(normalize_id).as_deref() {
        None | Some("") => Ok(View::Price),
        Some("price") => Ok(View::Price),
        Some("p&l") | Some("pnl") => Ok(View::Pnl),
        Some(_) => Err(PricingError::InvalidView(raw.unwrap_or_default().to_string())),
    }
}

/// Absent or blank selects the closed form. Anything else goes to the registry as-is.
fn model_id(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => DEFAULT_MODEL.to_string(),
        Some(id) => id.to_string(),
    }
}

fn is_blank(v: &WireNumber) -> bool {
    matches!(v, WireNumber::Text(s) if s.trim().is_empty())
}

fn finite(field: &str, value: Option<&WireNumber>) -> PricingResult<f64> {
    let x = match value {
        None => return Err(PricingError::invalid(field, "missing")),
        Some(v) if is_blank(v) => return Err(PricingError::invalid(field, "missing")),
        Some(WireNumber::Number(x)) => *x,
        Some(WireNumber::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PricingError::invalid(field, format!("'{s}' is not a number")))?,
    };
    if !x.is_finite() {
        return Err(PricingError::invalid(field, "must be finite"));
    }
    Ok(x)
}

fn positive(field: &str, value: Option<&WireNumber>) -> PricingResult<f64> {
    let x = finite(field, value)?;
    if x <= 0.0 {
        return Err(PricingError::invalid(field, format!("must be > 0, got {x}")));
    }
    Ok(x)
}

fn positive_sequence(field: &str, values: Option<&[WireNumber]>) -> PricingResult<Vec<f64>> {
    let values = values.ok_or_else(|| PricingError::invalid(field, "missing"))?;
    if values.is_empty() {
        return Err(PricingError::invalid(field, "must not be empty"));
    }
    values
        .iter()
        .enumerate()
        .map(|(i, v)| positive(&format!("{field}[{i}]"), Some(v)))
        .collect()
}
