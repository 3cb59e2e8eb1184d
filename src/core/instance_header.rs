use crate::core::attributes::{Attribute, AttributeRef};
use std::fmt;

/// Schema shared by every instance of a stream.
pub struct InstanceHeader {
    relation_name: String,
    pub attributes: Vec<AttributeRef>,
    class_index: usize,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<AttributeRef>,
        class_index: usize,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_index,
        }
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        self.attributes.get(index).map(|a| a.as_ref() as &dyn Attribute)
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn number_of_classes(&self) -> usize {
        self.attribute_at_index(self.class_index)
            .and_then(|a| a.cardinality())
            .unwrap_or(0)
    }

    /// Maps an index that skips the class attribute to a raw attribute index.
    pub fn model_to_instance_index(&self, model_index: usize) -> usize {
        if model_index < self.class_index {
            model_index
        } else {
            model_index + 1
        }
    }

    pub fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
            + self.relation_name.capacity()
            + self.attributes.capacity() * size_of::<AttributeRef>()
            + self
                .attributes
                .iter()
                .map(|a| a.calc_memory_size())
                .sum::<usize>()
    }
}

impl fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field("class_index", &self.class_index)
            .field("n_attributes", &self.attributes.len())
            .finish()
    }
}
