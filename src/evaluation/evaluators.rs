use crate::core::instances::Instance;
use crate::evaluation::{BasicEstimator, Estimator, Measurement};

/// Accumulates test-then-train outcomes and reports performance figures.
pub trait PerformanceEvaluator {
    fn reset(&mut self);

    /// Records the votes produced for `instance` before training on it.
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>);

    fn performance(&self) -> Vec<Measurement>;
}

/// Index of the largest vote. `None` when there are no votes or all are zero.
fn predicted_class(votes: &[f64]) -> Option<usize> {
    votes
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite() && **v > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// `(observed - chance) / (1 - chance)`, zero when chance agreement is total.
fn agreement_beyond(observed: f64, chance: f64) -> f64 {
    if (1.0 - chance).abs() < f64::EPSILON {
        0.0
    } else {
        (observed - chance) / (1.0 - chance)
    }
}

/// Accuracy, Cohen's kappa and the two streaming kappas: `kappa_t` against a
/// classifier repeating the previous label and `kappa_m` against one always
/// predicting the majority seen so far.
#[derive(Debug, Clone)]
pub struct BasicClassificationEvaluator {
    num_classes: usize,
    total_weight: f64,
    accuracy: BasicEstimator,
    predicted_weight: Vec<f64>,
    true_weight: Vec<f64>,
    no_change_correct: f64,
    majority_correct: f64,
    last_seen_class: Option<usize>,
}

impl BasicClassificationEvaluator {
    pub fn new(num_classes: usize) -> Self {
        Self {
            num_classes,
            total_weight: 0.0,
            accuracy: BasicEstimator::default(),
            predicted_weight: vec![0.0; num_classes],
            true_weight: vec![0.0; num_classes],
            no_change_correct: 0.0,
            majority_correct: 0.0,
            last_seen_class: None,
        }
    }

    fn majority_class(&self) -> Option<usize> {
        predicted_class(&self.true_weight)
    }

    fn kappa(&self, accuracy: f64) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        let chance: f64 = self
            .predicted_weight
            .iter()
            .zip(&self.true_weight)
            .map(|(p, t)| (p / self.total_weight) * (t / self.total_weight))
            .sum();
        agreement_beyond(accuracy, chance)
    }

    fn versus_baseline(&self, accuracy: f64, baseline_correct: f64) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        agreement_beyond(accuracy, baseline_correct / self.total_weight)
    }
}

impl PerformanceEvaluator for BasicClassificationEvaluator {
    fn reset(&mut self) {
        *self = Self::new(self.num_classes);
    }

    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>) {
        let weight = instance.weight();
        let Some(true_class) = instance
            .class_value()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .map(|c| c as usize)
        else {
            return;
        };
        let Some(predicted) = predicted_class(&votes) else {
            return;
        };
        if weight <= 0.0 {
            return;
        }

        let needed = true_class.max(predicted) + 1;
        if needed > self.num_classes {
            self.num_classes = needed;
            self.predicted_weight.resize(needed, 0.0);
            self.true_weight.resize(needed, 0.0);
        }

        if self.majority_class() == Some(true_class) {
            self.majority_correct += weight;
        }
        if self.last_seen_class == Some(true_class) {
            self.no_change_correct += weight;
        }

        let correct = if predicted == true_class { 1.0 } else { 0.0 };
        self.accuracy.add(correct, weight);
        self.total_weight += weight;
        self.predicted_weight[predicted] += weight;
        self.true_weight[true_class] += weight;
        self.last_seen_class = Some(true_class);
    }

    fn performance(&self) -> Vec<Measurement> {
        let accuracy = self.accuracy.estimation();
        vec![
            Measurement::new("accuracy", accuracy),
            Measurement::new("kappa", self.kappa(accuracy)),
            Measurement::new("kappa_t", self.versus_baseline(accuracy, self.no_change_correct)),
            Measurement::new("kappa_m", self.versus_baseline(accuracy, self.majority_correct)),
        ]
    }
}
