use crate::classifiers::Classifier;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

fn one_hot(instance: &dyn Instance, num_classes: usize) -> Vec<f64> {
    let mut votes = vec![0.0; num_classes.max(2)];
    if let Some(y) = instance.class_value().map(|v| v as usize) {
        if y < votes.len() {
            votes[y] = 1.0;
        }
    }
    votes
}

/// Votes for the true class of every instance.
#[derive(Default)]
pub struct OracleClassifier {
    num_classes: usize,
}

impl Classifier for OracleClassifier {
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        one_hot(instance, self.num_classes)
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) {
        self.num_classes = header.number_of_classes();
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {}

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}

/// Never votes.
#[derive(Default)]
pub struct ClassifierNoVotes;

impl Classifier for ClassifierNoVotes {
    fn get_votes_for_instance(&self, _instance: &dyn Instance) -> Vec<f64> {
        Vec::new()
    }

    fn set_model_context(&mut self, _header: Arc<InstanceHeader>) {}

    fn train_on_instance(&mut self, _instance: &dyn Instance) {}

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}

pub struct TrainSpyHandle(Arc<AtomicU64>);

impl TrainSpyHandle {
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Oracle that counts how often it is trained.
pub struct TrainSpyClassifier {
    oracle: OracleClassifier,
    count: Arc<AtomicU64>,
}

impl TrainSpyClassifier {
    pub fn new() -> (Self, TrainSpyHandle) {
        let count = Arc::new(AtomicU64::new(0));
        let spy = Self {
            oracle: OracleClassifier::default(),
            count: Arc::clone(&count),
        };
        (spy, TrainSpyHandle(count))
    }
}

impl Classifier for TrainSpyClassifier {
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        self.oracle.get_votes_for_instance(instance)
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) {
        self.oracle.set_model_context(header);
    }

    fn train_on_instance(&mut self, _instance: &dyn Instance) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
    }
}
