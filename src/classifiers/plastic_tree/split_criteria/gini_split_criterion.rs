use crate::classifiers::plastic_tree::split_criteria::split_criterion::SplitCriterion;
use std::any::Any;

#[derive(Debug, Default)]
pub struct GiniSplitCriterion;

impl GiniSplitCriterion {
    pub fn new() -> Self {
        Self
    }

    pub fn compute_gini(distribution: &[f64], sum_of_weights: f64) -> f64 {
        distribution
            .iter()
            .fold(1.0, |gini, w| gini - (w / sum_of_weights).powi(2))
    }
}

impl SplitCriterion for GiniSplitCriterion {
    fn get_range_of_merit(&self, _pre_split_distribution: &[f64]) -> f64 {
        1.0
    }

    fn get_merit_of_split(
        &self,
        _pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64 {
        let weights: Vec<f64> = post_split_dists.iter().map(|d| d.iter().sum()).collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return 1.0;
        }

        let gini: f64 = post_split_dists
            .iter()
            .zip(&weights)
            .filter(|(_, w)| **w > 0.0)
            .map(|(dist, w)| (w / total_weight) * Self::compute_gini(dist, *w))
            .sum();

        1.0 - gini
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
