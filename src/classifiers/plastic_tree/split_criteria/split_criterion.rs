use std::any::Any;

/// Merit function used to rank candidate splits.
pub trait SplitCriterion: Any {
    /// Upper bound of the merit for the given class distribution (the `R` of
    /// the Hoeffding bound).
    fn get_range_of_merit(&self, pre_split_distribution: &[f64]) -> f64;
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64;
    fn as_any(&self) -> &dyn Any;
}
