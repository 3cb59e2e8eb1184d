mod classifiers;
mod fixtures;
mod streams;

pub use classifiers::{ClassifierNoVotes, OracleClassifier, TrainSpyClassifier, TrainSpyHandle};
pub use fixtures::{
    header_mixed, header_nominal, header_numeric, nominal_instance, numeric_instance,
};
pub use streams::VecStream;
