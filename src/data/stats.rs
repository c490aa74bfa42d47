// ---------------------------------------------------------------------------
// Summary – mean / std / min / max over a column of floats
// ---------------------------------------------------------------------------

/// Descriptive statistics of one column.
///
/// NaN inputs are treated as missing and skipped. Every statistic is NaN
/// when no value remains; `std` is the sample standard deviation (n − 1)
/// and is NaN for fewer than two values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of non-NaN values.
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let present: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        let count = present.len();
        if count == 0 {
            return Summary {
                count,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = present.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let ss: f64 = present.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        };
        let min = present.iter().copied().fold(f64::INFINITY, f64::min);
        let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Summary {
            count,
            mean,
            std,
            min,
            max,
        }
    }

    /// `max − min`, NaN when empty.
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
