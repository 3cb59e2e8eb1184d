use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::plastic_tree::split_criteria::SplitCriterion;
use std::any::Any;
use std::fmt;

/// Per-attribute sufficient statistics kept at a tree node.
pub trait AttributeClassObserver: fmt::Debug {
    fn observe_attribute_class(&mut self, att_val: f64, class_val: usize, weight: f64);

    fn get_best_evaluated_split_suggestion(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        binary_only: bool,
    ) -> Option<AttributeSplitSuggestion>;

    /// Builds the suggestion for a split chosen by the caller instead of the
    /// best one: a numeric threshold or nominal value in `split_value`, or a
    /// multiway nominal split when `split_value` is `None`.
    fn force_split(
        &self,
        criterion: &dyn SplitCriterion,
        pre_split_dist: &[f64],
        att_index: usize,
        split_value: Option<f64>,
    ) -> Option<AttributeSplitSuggestion>;

    /// A fresh observer of the same kind.
    fn new_empty(&self) -> Box<dyn AttributeClassObserver>;

    fn calc_memory_size(&self) -> usize;
    fn clone_box(&self) -> Box<dyn AttributeClassObserver>;
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn AttributeClassObserver> {
    fn clone(&self) -> Box<dyn AttributeClassObserver> {
        self.clone_box()
    }
}
