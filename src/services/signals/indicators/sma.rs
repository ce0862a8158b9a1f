//! Simple Moving Average (SMA) indicator.

/// SMA (Simple Moving Average) indicator.
///
/// Average of the trailing `period` values; undefined until a full window exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Calculate the SMA at every index; `None` for the first `period - 1` indices.
    pub fn series(&self, values: &[f64]) -> Vec<Option<f64>> {
        if self.period == 0 {
            return vec![None; values.len()];
        }

        let mut out = Vec::with_capacity(values.len());
        let mut sum = 0.0;

        for (i, &value) in values.iter().enumerate() {
            sum += value;
            if i >= self.period {
                sum -= values[i - self.period];
            }

            if i + 1 >= self.period {
                out.push(Some(sum / self.period as f64));
            } else {
                out.push(None);
            }
        }

        out
    }
}
