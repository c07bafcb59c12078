//! Two-sided confidence level for prediction intervals.

use crate::error::{ForecastError, Result};
use crate::utils::quantile_normal;

/// Coverage of a two-sided prediction interval, stored as a fraction.
///
/// Valid levels lie in `[0.5, 0.99]`; the default is 95%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceLevel(f64);

impl ConfidenceLevel {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 0.99;

    /// Build from a fraction such as `0.95`.
    pub fn from_fraction(level: f64) -> Result<Self> {
        if !level.is_finite() || !(Self::MIN..=Self::MAX).contains(&level) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in [{}, {}], got {}",
                Self::MIN,
                Self::MAX,
                level
            )));
        }
        Ok(Self(level))
    }

    /// Build from a percentage such as `95`.
    pub fn from_percent(percent: f64) -> Result<Self> {
        if !percent.is_finite() || !(50.0..=99.0).contains(&percent) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence percentage must be in [50, 99], got {}",
                percent
            )));
        }
        Ok(Self(percent / 100.0))
    }

    pub fn fraction(&self) -> f64 {
        self.0
    }

    pub fn percent(&self) -> f64 {
        self.0 * 100.0
    }

    /// Standard normal quantile bounding the central `level` mass.
    pub fn z_score(&self) -> f64 {
        quantile_normal(0.5 + self.0 / 2.0)
    }
}

impl Default for ConfidenceLevel {
    fn default() -> Self {
        Self(0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn percent_and_fraction_agree() {
        let a = ConfidenceLevel::from_percent(80.0).unwrap();
        let b = ConfidenceLevel::from_fraction(0.8).unwrap();
        assert_relative_eq!(a.fraction(), b.fraction(), epsilon = 1e-12);
        assert_relative_eq!(a.percent(), 80.0, epsilon = 1e-9);
    }

    #[test]
    fn rejects_out_of_range_levels() {
        assert!(ConfidenceLevel::from_percent(49.0).is_err());
        assert!(ConfidenceLevel::from_percent(99.5).is_err());
        assert!(ConfidenceLevel::from_fraction(0.999).is_err());
        assert!(ConfidenceLevel::from_fraction(f64::NAN).is_err());
    }

    #[test]
    fn default_z_score_is_1_96() {
        let level = ConfidenceLevel::default();
        assert_relative_eq!(level.z_score(), 1.959964, epsilon = 1e-4);
    }

    #[test]
    fn z_score_grows_with_coverage() {
        let z80 = ConfidenceLevel::from_percent(80.0).unwrap().z_score();
        let z99 = ConfidenceLevel::from_percent(99.0).unwrap().z_score();
        assert_relative_eq!(z80, 1.281552, epsilon = 1e-4);
        assert!(z99 > z80);
    }
}
