use crate::core::attributes::Attribute;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::instance::Instance;
use std::io::{Error, ErrorKind};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct DenseInstance {
    pub header: Arc<InstanceHeader>,
    pub values: Vec<f64>,
    pub weight: f64,
}

impl DenseInstance {
    pub fn new(header: Arc<InstanceHeader>, values: Vec<f64>, weight: f64) -> DenseInstance {
        DenseInstance {
            header,
            values,
            weight,
        }
    }
}

impl Instance for DenseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    fn attribute_at_index(&self, index: usize) -> Option<&dyn Attribute> {
        self.header.attribute_at_index(index)
    }

    fn number_of_attributes(&self) -> usize {
        self.header.number_of_attributes()
    }

    fn class_index(&self) -> usize {
        self.header.class_index()
    }

    fn class_value(&self) -> Option<f64> {
        self.values.get(self.header.class_index()).copied()
    }

    fn set_class_value(&mut self, new_value: f64) -> Result<(), Error> {
        let index = self.header.class_index();
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = new_value;
                Ok(())
            }
            None => Err(Error::new(
                ErrorKind::InvalidInput,
                "Class index out of bounds",
            )),
        }
    }

    fn number_of_classes(&self) -> usize {
        self.header.number_of_classes()
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::header_numeric;

    #[test]
    fn test_reads_values_and_class() {
        let header = header_numeric(2);
        let mut inst = DenseInstance::new(header, vec![0.5, f64::NAN, 1.0], 1.0);
        assert_eq!(inst.value_at_index(0), Some(0.5));
        assert!(inst.is_missing_at_index(1));
        assert!(inst.is_missing_at_index(7));
        assert_eq!(inst.class_value(), Some(1.0));
        inst.set_class_value(0.0).unwrap();
        assert_eq!(inst.class_value(), Some(0.0));
        assert_eq!(inst.number_of_classes(), 2);
    }
}
