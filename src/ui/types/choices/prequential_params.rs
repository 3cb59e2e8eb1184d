use crate::evaluation::CurveFormat;
use crate::ui::types::choices::{LearnerChoice, StreamChoice};
use std::path::PathBuf;

/// Everything a prequential run needs, as assembled from the command line.
#[derive(Debug, Clone)]
pub struct PrequentialParams {
    pub learner: LearnerChoice,
    pub stream: StreamChoice,
    pub max_instances: Option<u64>,
    pub max_seconds: Option<u64>,
    pub sample_frequency: u64,
    pub mem_check_frequency: u64,
    pub dump_file: Option<PathBuf>,
    pub dump_format: CurveFormat,
}
