use crate::classifiers::plastic_tree::drift::adwin::{Adwin, DEFAULT_DELTA};
use std::fmt;

/// Error-rate monitor consulted by nodes that keep a background subtree.
pub trait ChangeDetector: fmt::Debug {
    /// Feeds one outcome, 0 for a correct prediction and 1 for a mistake.
    fn input(&mut self, value: f64);
    fn estimation(&self) -> f64;
    fn width(&self) -> usize;
    /// Returns whether a change was signalled since the last call, clearing it.
    fn take_change(&mut self) -> bool;
    /// Same configuration, no history.
    fn new_empty(&self) -> Box<dyn ChangeDetector>;
    fn calc_memory_size(&self) -> usize;
    fn clone_box(&self) -> Box<dyn ChangeDetector>;
}

impl Clone for Box<dyn ChangeDetector> {
    fn clone(&self) -> Box<dyn ChangeDetector> {
        self.clone_box()
    }
}

/// [`ChangeDetector`] backed by an [`Adwin`] window. A shrink of the window
/// raises the change flag, which stays up until taken.
#[derive(Clone, Debug)]
pub struct AdwinChangeDetector {
    adwin: Adwin,
    change: bool,
}

impl AdwinChangeDetector {
    pub fn new(delta: f64) -> Self {
        Self {
            adwin: Adwin::new(delta),
            change: false,
        }
    }
}

impl Default for AdwinChangeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DELTA)
    }
}

impl ChangeDetector for AdwinChangeDetector {
    fn input(&mut self, value: f64) {
        if self.adwin.push(value) {
            self.change = true;
        }
    }

    fn estimation(&self) -> f64 {
        self.adwin.mean()
    }

    fn width(&self) -> usize {
        self.adwin.width()
    }

    fn take_change(&mut self) -> bool {
        std::mem::take(&mut self.change)
    }

    fn new_empty(&self) -> Box<dyn ChangeDetector> {
        Box::new(Self::new(self.adwin.delta()))
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>() + self.adwin.width() * size_of::<f64>()
    }

    fn clone_box(&self) -> Box<dyn ChangeDetector> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_flag_is_one_shot() {
        let mut detector = AdwinChangeDetector::default();
        for _ in 0..500 {
            detector.input(0.0);
        }
        assert!(!detector.take_change());
        for _ in 0..128 {
            detector.input(1.0);
        }
        assert!(detector.take_change());
        assert!(!detector.take_change());
        assert!(detector.estimation() > 0.0);
    }

    #[test]
    fn test_new_empty_forgets_history() {
        let mut detector = AdwinChangeDetector::new(0.01);
        for _ in 0..64 {
            detector.input(1.0);
        }
        let fresh = detector.new_empty();
        assert_eq!(fresh.width(), 0);
        assert_eq!(detector.width(), 64);
    }
}
