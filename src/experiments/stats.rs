//! Confidence intervals over repeated runs.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;

use crate::core::errors::StatisticsError;

/// Two-tailed standard-normal critical value for significance `alpha`.
///
/// alpha = 0.01 gives about 2.5758.
pub fn critical_value(alpha: f64) -> Result<f64, StatisticsError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatisticsError::NonFiniteCritical(alpha));
    }

    let normal = Normal::new(0.0, 1.0).map_err(|e| StatisticsError::Distribution(e.to_string()))?;
    let z = normal.inverse_cdf(1.0 - alpha / 2.0);

    if !z.is_finite() {
        return Err(StatisticsError::NonFiniteCritical(alpha));
    }
    Ok(z)
}

/// Mean with a symmetric interval stored as signed offsets from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub mean: f64,
    /// Always <= 0.
    pub lower_offset: f64,
    /// Always >= 0.
    pub upper_offset: f64,
}

impl ConfidenceInterval {
    pub fn half_width(&self) -> f64 {
        self.upper_offset
    }

    pub fn lower(&self) -> f64 {
        self.mean + self.lower_offset
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.upper_offset
    }
}

/// Sample standard deviation (n - 1), 0 for fewer than two samples.
pub fn sample_std_dev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    samples.iter().std_dev()
}

/// Interval of `samples` with half-width `critical * s / sqrt(denominator)`.
pub fn confidence_interval(samples: &[f64], critical: f64, denominator: usize) -> ConfidenceInterval {
    let mean = if samples.is_empty() {
        0.0
    } else {
        samples.iter().mean()
    };

    let standard_error = if denominator == 0 {
        0.0
    } else {
        sample_std_dev(samples) / (denominator as f64).sqrt()
    };
    let half_width = critical * standard_error;

    ConfidenceInterval {
        mean,
        // 0.0 - x keeps a zero width from rendering as -0
        lower_offset: 0.0 - half_width,
        upper_offset: half_width,
    }
}
