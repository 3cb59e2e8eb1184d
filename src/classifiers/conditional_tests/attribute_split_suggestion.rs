use crate::classifiers::plastic_tree::instance_conditional_test::InstanceConditionalTest;
use std::cmp::Ordering;

/// Candidate split: a test (or `None` for "do not split"), the class
/// distribution each branch would receive, and its merit.
#[derive(Clone, Debug)]
pub struct AttributeSplitSuggestion {
    split_test: Option<Box<dyn InstanceConditionalTest>>,
    resulting_class_distribution: Vec<Vec<f64>>,
    merit: f64,
}

impl AttributeSplitSuggestion {
    pub fn new(
        split_test: Option<Box<dyn InstanceConditionalTest>>,
        resulting_class_distribution: Vec<Vec<f64>>,
        merit: f64,
    ) -> Self {
        Self {
            split_test,
            resulting_class_distribution,
            merit,
        }
    }

    /// The "do not split" candidate.
    pub fn null_split(merit: f64) -> Self {
        Self::new(None, Vec::new(), merit)
    }

    pub fn split_test(&self) -> Option<&dyn InstanceConditionalTest> {
        self.split_test.as_deref()
    }

    pub fn is_null_split(&self) -> bool {
        self.split_test.is_none()
    }

    /// Attribute the suggestion splits on; `None` for the null split.
    pub fn attribute_index(&self) -> Option<usize> {
        self.split_test().map(|t| t.attribute_index())
    }

    pub fn resulting_class_distributions(&self) -> &[Vec<f64>] {
        &self.resulting_class_distribution
    }

    pub fn merit(&self) -> f64 {
        self.merit
    }

    pub fn number_of_splits(&self) -> usize {
        self.resulting_class_distribution.len()
    }

    pub fn resulting_class_distribution_from_split(&self, split_index: usize) -> Vec<f64> {
        self.resulting_class_distribution
            .get(split_index)
            .cloned()
            .unwrap_or_default()
    }
}

impl PartialEq for AttributeSplitSuggestion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttributeSplitSuggestion {}

impl PartialOrd for AttributeSplitSuggestion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeSplitSuggestion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.merit.total_cmp(&other.merit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::plastic_tree::instance_conditional_test::NumericAttributeBinaryTest;

    #[test]
    fn test_orders_by_merit_ascending() {
        let mut suggestions = vec![
            AttributeSplitSuggestion::null_split(0.2),
            AttributeSplitSuggestion::new(
                Some(Box::new(NumericAttributeBinaryTest::new(0, 1.0))),
                vec![vec![1.0], vec![2.0]],
                0.7,
            ),
            AttributeSplitSuggestion::null_split(f64::NEG_INFINITY),
        ];
        suggestions.sort();
        assert_eq!(suggestions[0].merit(), f64::NEG_INFINITY);
        assert_eq!(suggestions[2].attribute_index(), Some(0));
        assert_eq!(suggestions[2].number_of_splits(), 2);
        assert!(suggestions[1].is_null_split());
        assert!(suggestions[1].resulting_class_distribution_from_split(5).is_empty());
    }
}
