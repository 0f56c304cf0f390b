//! Smoothing parameters for the seasonal model.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Level, trend and seasonal smoothing weights.
///
/// All three are validated together at construction; each must be finite
/// and strictly inside `(0, 1)`. There is no partially specified triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters")]
pub struct ModelParameters {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

#[derive(Deserialize)]
struct RawParameters {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

impl TryFrom<RawParameters> for ModelParameters {
    type Error = ForecastError;

    fn try_from(raw: RawParameters) -> Result<Self> {
        Self::new(raw.alpha, raw.beta, raw.gamma)
    }
}

impl ModelParameters {
    /// Triple used when no grid candidate can be fitted.
    pub const FALLBACK: ModelParameters = ModelParameters {
        alpha: 0.3,
        beta: 0.2,
        gamma: 0.2,
    };

    /// Validate and build a parameter triple.
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Result<Self> {
        check_unit_open("alpha", alpha)?;
        check_unit_open("beta", beta)?;
        check_unit_open("gamma", gamma)?;
        Ok(Self { alpha, beta, gamma })
    }

    /// Level smoothing weight.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Trend smoothing weight.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Seasonal smoothing weight.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self::FALLBACK
    }
}

fn check_unit_open(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "{name} must lie in (0, 1), got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_interior_values() {
        let p = ModelParameters::new(0.5, 0.1, 0.9).unwrap();
        assert_eq!(p.alpha(), 0.5);
        assert_eq!(p.beta(), 0.1);
        assert_eq!(p.gamma(), 0.9);
    }

    #[test]
    fn rejects_boundaries_and_nan() {
        assert!(ModelParameters::new(0.0, 0.2, 0.2).is_err());
        assert!(ModelParameters::new(0.3, 1.0, 0.2).is_err());
        assert!(ModelParameters::new(0.3, 0.2, f64::NAN).is_err());
    }

    #[test]
    fn error_names_the_offending_parameter() {
        let err = ModelParameters::new(0.3, 0.2, 1.5).unwrap_err();
        assert!(err.to_string().contains("gamma"));
    }

    #[test]
    fn default_is_fallback_triple() {
        assert_eq!(ModelParameters::default(), ModelParameters::FALLBACK);
    }

    #[test]
    fn deserialization_validates() {
        let ok: ModelParameters =
            serde_json::from_str(r#"{"alpha":0.4,"beta":0.1,"gamma":0.3}"#).unwrap();
        assert_eq!(ok.alpha(), 0.4);

        let bad = serde_json::from_str::<ModelParameters>(r#"{"alpha":1.4,"beta":0.1,"gamma":0.3}"#);
        assert!(bad.is_err());
    }
}
