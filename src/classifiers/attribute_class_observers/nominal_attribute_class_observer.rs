use crate::classifiers::attribute_class_observers::attribute_class_observer::AttributeClassObserver;
use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::plastic_tree::instance_conditional_test::{
    NominalAttributeBinaryTest, NominalAttributeMultiwayTest,
};
use crate::classifiers::plastic_tree::split_criteria::SplitCriterion;
use std::any::Any;
use std::mem::size_of;

#[derive(Clone, Debug, Default)]
pub struct NominalAttributeClassObserver {
    total_weight_observed: f64,
    missing_weight_observed: f64,
    attribute_value_distribution_per_class: Vec<Vec<f64>>,
}

impl NominalAttributeClassObserver {
    pub fn new() -> NominalAttributeClassObserver {
        Self::default()
    }

    #[inline]
    fn ensure_value(&mut self, class_val: usize, att_val_int: usize) {
        if class_val >= self.attribute_value_distribution_per_class.len() {
            self.attribute_value_distribution_per_class
                .resize_with(class_val + 1, Vec::new);
        }
        let row = &mut self.attribute_value_distribution_per_class[class_val];
        if att_val_int >= row.len() {
            row.resize(att_val_int + 1, 0.0);
        }
    }

    pub fn get_max_att_vals_observed(&self) -> usize {
        self.attribute_value_distribution_per_class
            .iter()
            .map(|row| row.len())
            .max()
            .unwrap_or(0)
    }

    pub fn total_weight_observed(&self) -> f64 {
        self.total_weight_observed
    }

    pub fn get_class_dists_resulting_from_multiway_split(
        &self,
        max_att_vals: usize,
    ) -> Vec<Vec<f64>> {
        let num_classes = self.attribute_value_distribution_per_class.len();
        let mut dists = vec![vec![0.0; num_classes]; max_att_vals];

        for (class_idx, row) in self
            .attribute_value_distribution_per_class
            .iter()
            .enumerate()
        {
            for (val_idx, &count) in row.iter().enumerate() {
                dists[val_idx][class_idx] = count;
            }
        }
        dists
    }

    pub fn get_class_dists_resulting_from_binary_split(&self, val_index: usize) -> Vec<Vec<f64>> {
        let num_classes = self.attribute_value_distribution_per_class.len();
        let mut lhs = vec![0.0; num_classes];
        let mut rhs = vec![0.0; num_classes];

        for (class_idx, row) in self
            .attribute_value_distribution_per_class
            .iter()
            .enumerate()
        {
            let matching = row.get(val_index).copied().unwrap_or(0.0);
            lhs[class_idx] = matching;
            rhs[class_idx] = row.iter().sum::<f64>() - matching;
        }
        vec![lhs, rhs]
    }

    fn multiway_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
    ) -> AttributeSplitSuggestion {
        let post_split_dists =
            self.get_class_dists_resulting_from_multiway_split(self.get_max_att_vals_observed());
        let merit = criterion.get_merit_of_split(pre_split_dist, &post_split_dists);
        AttributeSplitSuggestion::new(
            Some(Box::new(NominalAttributeMultiwayTest::new(att_index))),
            post_split_dists,
            merit,
        )
    }

    fn binary_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        val_index: usize,
    ) -> AttributeSplitSuggestion {
        let post_split_dists = self.get_class_dists_resulting_from_binary_split(val_index);
        let merit = criterion.get_merit_of_split(pre_split_dist, &post_split_dists);
        AttributeSplitSuggestion::new(
            Some(Box::new(NominalAttributeBinaryTest::new(att_index, val_index))),
            post_split_dists,
            merit,
        )
    }
}

impl AttributeClassObserver for NominalAttributeClassObserver {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64) {
        if att_val.is_nan() || att_val < 0.0 {
            self.missing_weight_observed += weight;
        } else {
            let att_val_int = att_val as usize;
            self.ensure_value(class_val, att_val_int);
            self.attribute_value_distribution_per_class[class_val][att_val_int] += weight;
        }
        self.total_weight_observed += weight;
    }

    fn get_best_evaluated_split_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        binary_only: bool,
    ) -> Option<AttributeSplitSuggestion> {
        let mut best: Option<AttributeSplitSuggestion> = None;

        if !binary_only {
            best = Some(self.multiway_suggestion(criterion, pre_split_dist, att_index));
        }

        for val_index in 0..self.get_max_att_vals_observed() {
            let candidate = self.binary_suggestion(criterion, pre_split_dist, att_index, val_index);
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
        match split_value {
            Some(v) if v.is_finite() && v >= 0.0 => Some(self.binary_suggestion(
                criterion,
                pre_split_dist,
                att_index,
                v as usize,
            )),
            Some(_) => None,
            None => Some(self.multiway_suggestion(criterion, pre_split_dist, att_index)),
        }
    }

    fn new_empty(&self) -> Box<dyn AttributeClassObserver> {
        Box::new(Self::new())
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
            + self.attribute_value_distribution_per_class.capacity() * size_of::<Vec<f64>>()
            + self
                .attribute_value_distribution_per_class
                .iter()
                .map(|row| row.capacity() * size_of::<f64>())
                .sum::<usize>()
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

    const EPS: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS
    }

    fn observer_with(rows: &[(f64, usize, f64)]) -> NominalAttributeClassObserver {
        let mut obs = NominalAttributeClassObserver::new();
        for &(v, c, w) in rows {
            obs.observe_attribute_class(v, c, w);
        }
        obs
    }

    #[test]
    fn test_starts_empty() {
        let obs = NominalAttributeClassObserver::new();
        assert_eq!(obs.get_max_att_vals_observed(), 0);
        assert!(approx_eq(obs.total_weight_observed(), 0.0));
    }

    #[test]
    fn test_missing_values_only_count_towards_total() {
        let obs = observer_with(&[(f64::NAN, 0, 2.5), (2.0, 0, 1.5)]);
        assert!(approx_eq(obs.missing_weight_observed, 2.5));
        assert!(approx_eq(obs.total_weight_observed(), 4.0));
        assert_eq!(obs.get_max_att_vals_observed(), 3);
    }

    #[test]
    fn test_multiway_dists_are_transposed_counts() {
        let obs = observer_with(&[(0.0, 0, 2.0), (1.0, 1, 3.0), (1.0, 0, 1.0)]);
        let dists = obs.get_class_dists_resulting_from_multiway_split(2);
        assert_eq!(dists, vec![vec![2.0, 0.0], vec![1.0, 3.0]]);
    }

    #[test]
    fn test_binary_dists_split_matching_value_from_rest() {
        let obs = observer_with(&[(0.0, 0, 2.0), (1.0, 1, 3.0), (2.0, 1, 1.0)]);
        let dists = obs.get_class_dists_resulting_from_binary_split(1);
        assert_eq!(dists, vec![vec![0.0, 3.0], vec![2.0, 1.0]]);
    }

    #[test]
    fn test_best_suggestion_prefers_informative_binary_value() {
        let obs = observer_with(&[(0.0, 0, 10.0), (1.0, 1, 10.0), (2.0, 1, 10.0)]);
        let criterion = InfoGainSplitCriterion::default();
        let best = obs
            .get_best_evaluated_split_suggestion(&criterion, &[10.0, 20.0], 4, true)
            .unwrap();
        let test = best.split_test().unwrap();
        assert_eq!(test.attribute_index(), 4);
        assert_eq!(test.split_value(), Some(0.0));
    }

    #[test]
    fn test_forced_split_honours_requested_layout() {
        let obs = observer_with(&[(0.0, 0, 4.0), (1.0, 1, 4.0), (2.0, 0, 4.0)]);
        let criterion = InfoGainSplitCriterion::default();

        let multiway = obs.force_split(&criterion, &[8.0, 4.0], 0, None).unwrap();
        assert!(!multiway.split_test().unwrap().is_binary());
        assert_eq!(multiway.number_of_splits(), 3);

        let binary = obs.force_split(&criterion, &[8.0, 4.0], 0, Some(2.0)).unwrap();
        assert_eq!(binary.split_test().unwrap().split_value(), Some(2.0));
        assert_eq!(
            binary.resulting_class_distributions(),
            &[vec![4.0, 0.0], vec![4.0, 4.0]]
        );

        assert!(obs.force_split(&criterion, &[8.0, 4.0], 0, Some(-1.0)).is_none());
    }
}
