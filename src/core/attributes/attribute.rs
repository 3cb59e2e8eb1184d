use super::{NominalAttribute, NumericAttribute};
use std::any::Any;
use std::sync::Arc;

pub type AttributeRef = Arc<dyn Attribute + Send + Sync>;

pub trait Attribute: Any + Send + Sync {
    fn name(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    /// Number of admissible values, `None` for numeric attributes.
    fn cardinality(&self) -> Option<usize>;

    fn calc_memory_size(&self) -> usize;

    fn is_nominal(&self) -> bool {
        self.as_any().is::<NominalAttribute>()
    }

    fn is_numeric(&self) -> bool {
        self.as_any().is::<NumericAttribute>()
    }
}
