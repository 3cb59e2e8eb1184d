use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::streams::Stream;
use crate::testing::fixtures::header_numeric;
use std::io::Error;
use std::sync::Arc;

/// Replays a fixed list of instances.
pub struct VecStream {
    header: Arc<InstanceHeader>,
    instances: Vec<DenseInstance>,
    position: usize,
}

impl VecStream {
    pub fn new(header: Arc<InstanceHeader>, instances: Vec<DenseInstance>) -> Self {
        Self {
            header,
            instances,
            position: 0,
        }
    }

    /// One constant numeric attribute per instance, labelled by `labels`.
    pub fn from_labels(labels: Vec<usize>) -> Self {
        let header = header_numeric(1);
        let instances = labels
            .into_iter()
            .map(|y| DenseInstance::new(Arc::clone(&header), vec![0.0, y as f64], 1.0))
            .collect();
        Self::new(header, instances)
    }
}

impl Stream for VecStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.position < self.instances.len()
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        let instance = self.instances.get(self.position)?.clone();
        self.position += 1;
        Some(Box::new(instance))
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.position = 0;
        Ok(())
    }
}
