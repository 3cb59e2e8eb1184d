use crate::core::instances::Instance;
use std::any::Any;
use std::fmt;

/// Routing rule installed at an internal node.
///
/// `attribute_index` is a model index: it skips the class attribute, the
/// same convention attribute observers are keyed by.
pub trait InstanceConditionalTest: Any + fmt::Debug {
    fn branch_for_instance(&self, instance: &dyn Instance) -> Option<usize>;
    fn max_branches(&self) -> usize;
    fn attribute_index(&self) -> usize;
    /// Threshold of a numeric test or value of a nominal binary test.
    fn split_value(&self) -> Option<f64>;
    fn is_numeric(&self) -> bool;
    fn calc_memory_size(&self) -> usize;
    fn clone_box(&self) -> Box<dyn InstanceConditionalTest>;
    fn as_any(&self) -> &dyn Any;

    fn is_binary(&self) -> bool {
        self.max_branches() == 2
    }
}

impl Clone for Box<dyn InstanceConditionalTest> {
    fn clone(&self) -> Box<dyn InstanceConditionalTest> {
        self.clone_box()
    }
}

/// Reads the value a test depends on, `None` when it is missing.
pub(crate) fn tested_value(instance: &dyn Instance, model_index: usize) -> Option<f64> {
    let index = instance.header().model_to_instance_index(model_index);
    instance.value_at_index(index).filter(|v| !v.is_nan())
}
