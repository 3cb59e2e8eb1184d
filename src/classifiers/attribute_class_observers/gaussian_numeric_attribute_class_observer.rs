use crate::classifiers::attribute_class_observers::attribute_class_observer::AttributeClassObserver;
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::plastic_tree::instance_conditional_test::NumericAttributeBinaryTest;
use crate::classifiers::plastic_tree::split_criteria::SplitCriterion;
use crate::core::estimators::GaussianEstimator;
use std::any::Any;
use std::mem::size_of;

/// Per-class Gaussian summaries of a numeric attribute. Candidate thresholds
/// are `num_bins` equally spaced points inside the observed range.
#[derive(Clone, Debug)]
pub struct GaussianNumericAttributeClassObserver {
    min_value_observed_per_class: Vec<f64>,
    max_value_observed_per_class: Vec<f64>,
    attribute_value_distribution_per_class: Vec<Option<GaussianEstimator>>,
    num_bins: usize,
}

impl Default for GaussianNumericAttributeClassObserver {
    fn default() -> Self {
        Self::new(10)
    }
}

impl GaussianNumericAttributeClassObserver {
    pub fn new(num_bins: usize) -> Self {
        GaussianNumericAttributeClassObserver {
            min_value_observed_per_class: Vec::new(),
            max_value_observed_per_class: Vec::new(),
            attribute_value_distribution_per_class: Vec::new(),
            num_bins: num_bins.max(1),
        }
    }

    #[inline]
    fn ensure_class(&mut self, class_val: usize) {
        if class_val >= self.attribute_value_distribution_per_class.len() {
            let new_len = class_val + 1;
            self.attribute_value_distribution_per_class
                .resize_with(new_len, || None);
            self.min_value_observed_per_class.resize(new_len, 0.0);
            self.max_value_observed_per_class.resize(new_len, 0.0);
        }
    }

    fn observed_range(&self) -> Option<(f64, f64)> {
        let mut min_val = f64::INFINITY;
        let mut max_val = f64::NEG_INFINITY;

        for (i, est) in self.attribute_value_distribution_per_class.iter().enumerate() {
            if est.is_some() {
                min_val = min_val.min(self.min_value_observed_per_class[i]);
                max_val = max_val.max(self.max_value_observed_per_class[i]);
            }
        }

        (min_val.is_finite() && max_val.is_finite()).then_some((min_val, max_val))
    }

    pub fn get_split_point_suggestions(&self) -> Vec<f64> {
        let Some((min_val, max_val)) = self.observed_range() else {
            return vec![];
        };

        let step = (max_val - min_val) / (self.num_bins as f64 + 1.0);
        (0..self.num_bins)
            .map(|i| min_val + step * (i as f64 + 1.0))
            .filter(|v| *v > min_val && *v < max_val)
            .collect()
    }

    /// Class weights below (`[0]`) and at or above (`[1]`) `split_value`.
    pub fn get_class_dists_resulting_from_binary_split(&self, split_value: f64) -> Vec<Vec<f64>> {
        let num_classes = self.attribute_value_distribution_per_class.len();
        let mut lhs = vec![0.0; num_classes];
        let mut rhs = vec![0.0; num_classes];

        for (class_idx, est) in self.attribute_value_distribution_per_class.iter().enumerate() {
            let Some(est) = est else { continue };
            if split_value <= self.min_value_observed_per_class[class_idx] {
                rhs[class_idx] += est.total_weight();
            } else if split_value > self.max_value_observed_per_class[class_idx] {
                lhs[class_idx] += est.total_weight();
            } else {
                let [less, equal, greater] = est.weight_split_at(split_value);
                lhs[class_idx] += less;
                rhs[class_idx] += equal + greater;
            }
        }
        vec![lhs, rhs]
    }

    fn suggestion_at(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        split_value: f64,
    ) -> AttributeSplitSuggestion {
        let post_dists = self.get_class_dists_resulting_from_binary_split(split_value);
        let merit = criterion.get_merit_of_split(pre_split_dist, &post_dists);
        AttributeSplitSuggestion::new(
            Some(Box::new(NumericAttributeBinaryTest::new(att_index, split_value))),
            post_dists,
            merit,
        )
    }
}

impl AttributeClassObserver for GaussianNumericAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64) {
        if !att_val.is_finite() || !weight.is_finite() || weight <= 0.0 {
            return;
        }

        self.ensure_class(class_val);

        match &mut self.attribute_value_distribution_per_class[class_val] {
            Some(est) => {
                let min = &mut self.min_value_observed_per_class[class_val];
                *min = min.min(att_val);
                let max = &mut self.max_value_observed_per_class[class_val];
                *max = max.max(att_val);
                est.observe(att_val, weight);
            }
            slot @ None => {
                let mut est = GaussianEstimator::new();
                est.observe(att_val, weight);
                *slot = Some(est);
                self.min_value_observed_per_class[class_val] = att_val;
                self.max_value_observed_per_class[class_val] = att_val;
            }
        }
    }

    fn get_best_evaluated_split_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        _binary_only: bool,
    ) -> Option<AttributeSplitSuggestion> {
        let mut best: Option<AttributeSplitSuggestion> = None;

        for split_value in self.get_split_point_suggestions() {
            let candidate = self.suggestion_at(criterion, pre_split_dist, att_index, split_value);
            if best.as_ref().is_none_or(|b| candidate.merit() > b.merit()) {
                best = Some(candidate);
            }
        }
        best
    }

    fn force_split(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        split_value: Option<f64>,
    ) -> Option<AttributeSplitSuggestion> {
        let threshold = split_value.filter(|v| v.is_finite())?;
        Some(self.suggestion_at(criterion, pre_split_dist, att_index, threshold))
    }

    fn new_empty(&self) -> Box<dyn AttributeClassObserver> {
        Box::new(Self::new(self.num_bins))
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
            + (self.min_value_observed_per_class.capacity()
                + self.max_value_observed_per_class.capacity())
                * size_of::<f64>()
            + self.attribute_value_distribution_per_class.capacity()
                * size_of::<Option<GaussianEstimator>>()
    }

    fn clone_box(&self) -> Box<dyn AttributeClassObserver> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::plastic_tree::split_criteria::InfoGainSplitCriterion;

    fn separable_observer() -> GaussianNumericAttributeClassObserver {
        let mut obs = GaussianNumericAttributeClassObserver::default();
        for i in 0..50 {
            obs.observe_attribute_class(i as f64 / 10.0, 0, 1.0);
            obs.observe_attribute_class(10.0 + i as f64 / 10.0, 1, 1.0);
        }
        obs
    }

    #[test]
    fn test_empty_observer_has_no_candidates() {
        let obs = GaussianNumericAttributeClassObserver::default();
        assert!(obs.get_split_point_suggestions().is_empty());
        let criterion = InfoGainSplitCriterion::default();
        assert!(
            obs.get_best_evaluated_split_suggestion(&criterion, &[], 0, false)
                .is_none()
        );
    }

    #[test]
    fn test_candidates_lie_strictly_inside_range() {
        let obs = separable_observer();
        let points = obs.get_split_point_suggestions();
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| *p > 0.0 && *p < 14.9));
    }

    #[test]
    fn test_separable_classes_split_between_ranges() {
        let obs = separable_observer();
        let criterion = InfoGainSplitCriterion::default();
        let best = obs
            .get_best_evaluated_split_suggestion(&criterion, &[50.0, 50.0], 2, false)
            .unwrap();
        let threshold = best.split_test().unwrap().split_value().unwrap();
        assert!(threshold > 4.9 && threshold < 10.0, "threshold {threshold}");
        assert!(best.merit() > 0.9);
        let dists = best.resulting_class_distributions();
        assert!((dists[0][0] - 50.0).abs() < 1e-6);
        assert!((dists[1][1] - 50.0).abs() < 1e-6);
        assert!(dists.iter().flatten().all(|w| *w >= 0.0));
    }

    #[test]
    fn test_thresholds_inside_a_class_range_yield_no_negative_weights() {
        let obs = separable_observer();
        let criterion = InfoGainSplitCriterion::default();
        for threshold in obs.get_split_point_suggestions() {
            let forced = obs
                .force_split(&criterion, &[50.0, 50.0], 0, Some(threshold))
                .unwrap();
            let dists = forced.resulting_class_distributions();
            assert!(dists.iter().flatten().all(|w| *w >= 0.0), "{threshold}: {dists:?}");
            assert!(forced.merit() <= 1.0 + 1e-12, "{threshold}: {}", forced.merit());
        }
    }

    #[test]
    fn test_forced_split_uses_requested_threshold() {
        let obs = separable_observer();
        let criterion = InfoGainSplitCriterion::default();
        let forced = obs
            .force_split(&criterion, &[50.0, 50.0], 1, Some(7.5))
            .unwrap();
        assert_eq!(forced.split_test().unwrap().split_value(), Some(7.5));
        assert_eq!(forced.split_test().unwrap().attribute_index(), 1);
        assert!(obs.force_split(&criterion, &[50.0, 50.0], 1, None).is_none());
    }

    #[test]
    fn test_new_empty_keeps_bins_but_drops_state() {
        let obs = separable_observer();
        let fresh = obs.new_empty();
        let fresh = fresh
            .as_any()
            .downcast_ref::<GaussianNumericAttributeClassObserver>()
            .unwrap();
        assert_eq!(fresh.num_bins, 10);
        assert!(fresh.get_split_point_suggestions().is_empty());
    }
}
