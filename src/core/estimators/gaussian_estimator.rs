use crate::utils::math::normal_probability;

/// Weighted running mean/variance of one attribute for one class.
#[derive(Clone, Debug, Default)]
pub struct GaussianEstimator {
    weight_sum: f64,
    mean: f64,
    variance_sum: f64,
}

impl GaussianEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn observe(&mut self, value: f64, weight: f64) {
        if !value.is_finite() || weight <= 0.0 {
            return;
        }

        if self.weight_sum > 0.0 {
            self.weight_sum += weight;
            let last_mean = self.mean;
            self.mean += weight * (value - last_mean) / self.weight_sum;
            self.variance_sum += weight * (value - last_mean) * (value - self.mean);
        } else {
            self.mean = value;
            self.weight_sum = weight;
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        if self.weight_sum > 1.0 {
            self.variance_sum / (self.weight_sum - 1.0)
        } else {
            0.0
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn total_weight(&self) -> f64 {
        self.weight_sum
    }

    /// Estimated weight observed below, at and above `value`. The three parts
    /// are non-negative and sum to the total weight.
    pub fn weight_split_at(&self, value: f64) -> [f64; 3] {
        let equal = (self.density(value) * self.weight_sum).clamp(0.0, self.weight_sum);
        let std_dev = self.std_dev();
        let less = if std_dev > 0.0 {
            normal_probability((value - self.mean) / std_dev) * self.weight_sum - equal
        } else if value > self.mean {
            self.weight_sum - equal
        } else {
            0.0
        };
        let less = less.clamp(0.0, self.weight_sum - equal);

        let greater = (self.weight_sum - equal - less).max(0.0);
        [less, equal, greater]
    }

    pub fn density(&self, value: f64) -> f64 {
        if self.weight_sum <= 0.0 {
            return 0.0;
        }
        let std_dev = self.std_dev();
        if std_dev > 0.0 {
            let diff = value - self.mean;
            let norm = (2.0 * std::f64::consts::PI).sqrt() * std_dev;
            return ((-diff * diff) / (2.0 * std_dev * std_dev)).exp() / norm;
        }
        if value == self.mean { 1.0 } else { 0.0 }
    }

    pub fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
