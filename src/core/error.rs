use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl CalcError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn parameter(&self) -> &'static str {
        match self {
            Self::InvalidParameter { name, .. } => name,
        }
    }
}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(name, "must be a finite number"))
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if require_finite(name, value)? <= 0.0 {
        return Err(CalcError::invalid(name, "must be > 0"));
    }
    Ok(value)
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, CalcError> {
    if require_finite(name, value)? < 0.0 {
        return Err(CalcError::invalid(name, "must be >= 0"));
    }
    Ok(value)
}
