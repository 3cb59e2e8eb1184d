use std::collections::VecDeque;

pub const DEFAULT_DELTA: f64 = 0.002;
const MIN_SUB_WINDOW: usize = 5;
const CHECK_PERIOD: usize = 32;
const MAX_WINDOW: usize = 1 << 14;

/// Adaptive sliding window over a bounded real-valued signal.
///
/// After every `CHECK_PERIOD` inputs the window is tested for a split into
/// an older and a newer part whose means differ by more than the cut bound;
/// when one is found the older part is dropped and the test repeats.
#[derive(Clone, Debug)]
pub struct Adwin {
    window: VecDeque<f64>,
    sum: f64,
    sum_of_squares: f64,
    delta: f64,
    inputs_since_check: usize,
}

impl Adwin {
    pub fn new(delta: f64) -> Self {
        Self {
            window: VecDeque::new(),
            sum: 0.0,
            sum_of_squares: 0.0,
            delta: delta.clamp(1e-10, 1.0),
            inputs_since_check: 0,
        }
    }

    /// Adds a value, returns `true` if the window shrank.
    pub fn push(&mut self, value: f64) -> bool {
        self.window.push_back(value);
        self.sum += value;
        self.sum_of_squares += value * value;

        if self.window.len() > MAX_WINDOW {
            self.drop_oldest(1);
        }

        self.inputs_since_check += 1;
        if self.inputs_since_check < CHECK_PERIOD {
            return false;
        }
        self.inputs_since_check = 0;

        let mut shrank = false;
        while let Some(cut) = self.find_cut() {
            self.drop_oldest(cut);
            shrank = true;
        }
        shrank
    }

    pub fn width(&self) -> usize {
        self.window.len()
    }

    pub fn mean(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.sum / self.window.len() as f64
    }

    pub fn variance(&self) -> f64 {
        let n = self.window.len() as f64;
        if n < 2.0 {
            return 0.0;
        }
        let mean = self.sum / n;
        (self.sum_of_squares / n - mean * mean).max(0.0)
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
        self.sum_of_squares = 0.0;
        self.inputs_since_check = 0;
    }

    fn drop_oldest(&mut self, count: usize) {
        for _ in 0..count {
            if let Some(v) = self.window.pop_front() {
                self.sum -= v;
                self.sum_of_squares -= v * v;
            }
        }
        if self.window.is_empty() {
            self.sum = 0.0;
            self.sum_of_squares = 0.0;
        }
    }

    /// Smallest number of old elements whose removal the bound supports.
    fn find_cut(&self) -> Option<usize> {
        let n = self.window.len();
        if n < 2 * MIN_SUB_WINDOW {
            return None;
        }
        let variance = self.variance();
        let mut prefix = 0.0;

        for (i, v) in self.window.iter().enumerate() {
            prefix += v;
            let n0 = i + 1;
            let n1 = n - n0;
            if n0 < MIN_SUB_WINDOW {
                continue;
            }
            if n1 < MIN_SUB_WINDOW {
                break;
            }
            let mean0 = prefix / n0 as f64;
            let mean1 = (self.sum - prefix) / n1 as f64;
            if (mean0 - mean1).abs() > self.cut_bound(n0, n1, variance) {
                return Some(n0);
            }
        }
        None
    }

    fn cut_bound(&self, n0: usize, n1: usize, variance: f64) -> f64 {
        let n = (n0 + n1) as f64;
        let dd = (2.0 * n.ln() / self.delta).ln();
        let m = 1.0 / (n0 - MIN_SUB_WINDOW + 1) as f64 + 1.0 / (n1 - MIN_SUB_WINDOW + 1) as f64;
        (2.0 * m * variance * dd).sqrt() + 2.0 / 3.0 * dd * m
    }
}

impl Default for Adwin {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stationary_signal_keeps_growing() {
        let mut adwin = Adwin::default();
        let mut shrank = false;
        for i in 0..2000 {
            shrank |= adwin.push(if i % 10 == 0 { 1.0 } else { 0.0 });
        }
        assert!(!shrank);
        assert_eq!(adwin.width(), 2000);
        assert!((adwin.mean() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_abrupt_shift_drops_old_part() {
        let mut adwin = Adwin::default();
        for _ in 0..1000 {
            adwin.push(0.0);
        }
        let mut detected_at = None;
        for i in 0..200 {
            if adwin.push(1.0) {
                detected_at = Some(i);
                break;
            }
        }
        let detected_at = detected_at.expect("shift from 0 to 1 is detected");
        assert!(detected_at < 100);
        assert!(adwin.width() < 1000);
        assert!(adwin.mean() > 0.3);
    }

    #[test]
    fn test_variance_of_binary_signal() {
        let mut adwin = Adwin::default();
        for i in 0..100 {
            adwin.push((i % 2) as f64);
        }
        assert!((adwin.variance() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_reset_empties_window() {
        let mut adwin = Adwin::new(5.0);
        assert_eq!(adwin.delta(), 1.0);
        for _ in 0..40 {
            adwin.push(1.0);
        }
        adwin.reset();
        assert_eq!(adwin.width(), 0);
        assert_eq!(adwin.mean(), 0.0);
    }
}
