//! Descriptive statistics over numeric collections.

use serde::Serialize;

/// Count, mean and sample standard deviation of a numeric collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    /// Arithmetic mean; 0 when the collection is empty.
    pub mean: f64,
    /// Sample (n−1) standard deviation; 0 when fewer than 2 values are
    /// present.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Copy with mean and standard deviation rounded to one decimal place.
    ///
    /// Rounding belongs to the reporting boundary; computations downstream of
    /// [`describe`] should use the unrounded values.
    pub fn rounded_to_tenths(self) -> Self {
        Self {
            count: self.count,
            mean: round_tenths(self.mean),
            std_dev: round_tenths(self.std_dev),
        }
    }
}

/// Compute [`DescriptiveStats`] over `values`.
///
/// The zero-value policies (mean of nothing is 0, deviation of a single
/// value is 0) are kept for compatibility with the existing reports; they
/// are a simplification, not a statistical statement.
pub fn describe(values: &[i32]) -> DescriptiveStats {
    let count = values.len();
    if count == 0 {
        return DescriptiveStats {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
        };
    }

    let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / count as f64;
    let std_dev = if count < 2 {
        0.0
    } else {
        let variance = values
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum::<f64>()
            / (count as f64 - 1.0);
        variance.sqrt()
    };

    DescriptiveStats {
        count,
        mean,
        std_dev,
    }
}

fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
