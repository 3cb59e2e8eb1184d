use crate::classifiers::plastic_tree::split_criteria::split_criterion::SplitCriterion;
use std::any::Any;

/// Information gain with a minimum branch fraction: splits that leave fewer
/// than two branches holding `min_branch_frac` of the weight score
/// `NEG_INFINITY`.
#[derive(Debug)]
pub struct InfoGainSplitCriterion {
    min_branch_frac: f64,
}

impl Default for InfoGainSplitCriterion {
    fn default() -> Self {
        Self::new(0.01)
    }
}

impl InfoGainSplitCriterion {
    pub fn new(min_branch_frac: f64) -> Self {
        Self { min_branch_frac }
    }

    pub fn compute_entropy(distribution: &[f64]) -> f64 {
        let sum: f64 = distribution.iter().sum();
        if sum <= 0.0 {
            return 0.0;
        }
        let mut entropy = 0.0;
        for &w in distribution {
            if w > 0.0 {
                entropy -= w * w.log2();
            }
        }
        entropy / sum + sum.log2()
    }

    fn post_split_entropy(post_split_dists: &[Vec<f64>]) -> f64 {
        let weights: Vec<f64> = post_split_dists.iter().map(|d| d.iter().sum()).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        post_split_dists
            .iter()
            .zip(&weights)
            .map(|(dist, w)| w * Self::compute_entropy(dist))
            .sum::<f64>()
            / total
    }

    fn num_subsets_greater_than_frac(&self, post_split_dists: &[Vec<f64>]) -> usize {
        let weights: Vec<f64> = post_split_dists.iter().map(|d| d.iter().sum()).collect();
        let total: f64 = weights.iter().sum();
        weights
            .iter()
            .filter(|w| total > 0.0 && **w / total > self.min_branch_frac)
            .count()
    }
}

impl SplitCriterion for InfoGainSplitCriterion {
    fn get_range_of_merit(&self, pre_split_distribution: &[f64]) -> f64 {
        let num_classes = pre_split_distribution.len().max(2);
        (num_classes as f64).log2()
    }

    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64 {
        if self.num_subsets_greater_than_frac(post_split_dists) < 2 {
            return f64::NEG_INFINITY;
        }
        Self::compute_entropy(pre_split_distribution) - Self::post_split_entropy(post_split_dists)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
