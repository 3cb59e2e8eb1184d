/// Online scalar estimate fed one observation at a time.
pub trait Estimator {
    fn add(&mut self, value: f64, weight: f64);

    fn estimation(&self) -> f64;
}

/// Weighted running mean. `NaN` until something is added.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEstimator {
    weight: f64,
    sum: f64,
}

impl Estimator for BasicEstimator {
    fn add(&mut self, value: f64, weight: f64) {
        if value.is_nan() || weight <= 0.0 {
            return;
        }
        self.weight += weight;
        self.sum += value * weight;
    }

    fn estimation(&self) -> f64 {
        if self.weight > 0.0 {
            self.sum / self.weight
        } else {
            f64::NAN
        }
    }
}
