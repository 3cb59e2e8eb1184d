use crate::classifiers::plastic_tree::instance_conditional_test::instance_conditional_test::{
    InstanceConditionalTest, tested_value,
};
use crate::core::instances::Instance;
use std::any::Any;

/// One branch per attribute value.
#[derive(Clone, Debug, PartialEq)]
pub struct NominalAttributeMultiwayTest {
    attribute_index: usize,
}

impl NominalAttributeMultiwayTest {
    pub fn new(attribute_index: usize) -> Self {
        Self { attribute_index }
    }
}

impl InstanceConditionalTest for NominalAttributeMultiwayTest {
    fn branch_for_instance(&self, instance: &dyn Instance) -> Option<usize> {
        tested_value(instance, self.attribute_index).map(|v| v as usize)
    }

    fn max_branches(&self) -> usize {
        usize::MAX
    }

    fn attribute_index(&self) -> usize {
        self.attribute_index
    }

    fn split_value(&self) -> Option<f64> {
        None
    }

    fn is_numeric(&self) -> bool {
        false
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }

    fn clone_box(&self) -> Box<dyn InstanceConditionalTest> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instances::DenseInstance;
    use crate::testing::header_nominal;

    #[test]
    fn test_branch_is_the_value_index() {
        let header = header_nominal(&[3, 5]);
        let test = NominalAttributeMultiwayTest::new(1);
        let inst = DenseInstance::new(header, vec![0.0, 4.0, 1.0], 1.0);
        assert_eq!(test.branch_for_instance(&inst), Some(4));
        assert!(!test.is_binary());
        assert_eq!(test.split_value(), None);
    }
}
