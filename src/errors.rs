/// Domain-specific error types for the pricing engine.
/// Every failure surfaces to the caller as one of these. The engine must:
/// - Reject bad input before any model runs
/// - Abort an evaluation (or a whole grid) on a non-finite result, never substitute a value
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("unknown model: {0}")]
    InvalidModel(String),

    #[error("unknown view: {0}")]
    InvalidView(String),

    #[error("computation failure: {0}")]
    ComputationFailure(String),

    #[error("config error: {0}")]
    Config(String),
}

impl PricingError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PricingError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable tag used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::InvalidModel(_) => "InvalidModel",
            Self::InvalidView(_) => "InvalidView",
            Self::ComputationFailure(_) => "ComputationFailure",
            Self::Config(_) => "Config",
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidParameter { field, .. } => Some(field),
            _ => None,
        }
    }

    /// True for failures detected at the boundary, before any model is invoked.
    #[inline]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::InvalidModel(_) | Self::InvalidView(_)
        )
    }
}

pub type PricingResult<T> = Result<T, PricingError>;
