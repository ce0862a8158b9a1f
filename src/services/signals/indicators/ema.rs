//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Recursive smoothing with `alpha = 2 / (span + 1)`, seeded by the first
/// value so every index has a value and no future data is used.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ema {
    span: usize,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self { span }
    }

    /// Smoothing factor.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.span as f64 + 1.0)
    }

    /// Calculate the EMA at every index of `values`.
    pub fn series(&self, values: &[f64]) -> Vec<f64> {
        let alpha = self.alpha();
        let mut out = Vec::with_capacity(values.len());

        let mut iter = values.iter();
        let Some(&first) = iter.next() else {
            return out;
        };

        let mut ema = first;
        out.push(ema);
        for &value in iter {
            ema = alpha * value + (1.0 - alpha) * ema;
            out.push(ema);
        }

        out
    }
}
