use crate::core::attributes::Attribute;
use std::any::Any;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct NominalAttribute {
    pub name: String,
    pub values: Vec<String>,
    pub label_to_index: HashMap<String, usize>,
}

impl NominalAttribute {
    /// Builds the label index from the order of `values`.
    pub fn from_labels<S: Into<String>>(name: S, values: Vec<String>) -> NominalAttribute {
        let label_to_index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        NominalAttribute {
            name: name.into(),
            values,
            label_to_index,
        }
    }

    pub fn index_of_value(&self, v: &str) -> Option<usize> {
        self.label_to_index.get(v).copied()
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

impl Attribute for NominalAttribute {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn cardinality(&self) -> Option<usize> {
        Some(self.values.len())
    }

    fn calc_memory_size(&self) -> usize {
        let mut total: usize = 0;

        total += size_of::<Self>();
        total += self.name.capacity();
        total += self.values.capacity() * size_of::<String>();
        total += self.values.iter().map(|s| s.capacity()).sum::<usize>();
        total += self.label_to_index.capacity() * size_of::<(String, usize)>();
        total += self
            .label_to_index
            .keys()
            .map(|k| k.capacity())
            .sum::<usize>();

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_indexes_in_order() {
        let att = NominalAttribute::from_labels("color", vec!["red".into(), "blue".into()]);
        assert_eq!(att.index_of_value("blue"), Some(1));
        assert_eq!(att.value(0), Some("red"));
        assert_eq!(att.cardinality(), Some(2));
        assert!(att.is_nominal());
        assert!(!att.is_numeric());
    }
}
