/// Exponential moving average, incremental form.
///
/// Same recurrence as pandas `ewm(span=span, adjust=False).mean()`:
///   point 0  → value = raw (first observation)
///   point 1+ → value = α·raw + (1−α)·prev   where α = 2/(span+1)
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    value: f64,
    seeded: bool,
}

impl Ema {
    pub fn new(span: u32) -> Self {
        Self {
            alpha: 2.0 / (f64::from(span) + 1.0),
            value: 0.0,
            seeded: false,
        }
    }

    /// Feed one observation, return the current smoothed value.
    pub fn update(&mut self, raw: f64) -> f64 {
        if self.seeded {
            self.value = self.alpha * raw + (1.0 - self.alpha) * self.value;
        } else {
            self.value = raw;
            self.seeded = true;
        }
        self.value
    }
}

/// Smooth a dense series; the output has the same length as the input.
pub fn smooth(values: &[f64], span: u32) -> Vec<f64> {
    let mut ema = Ema::new(span);
    values.iter().map(|&v| ema.update(v)).collect()
}
