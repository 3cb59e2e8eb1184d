mod error;
mod learners;
mod streams;

pub use error::BuildError;
pub use learners::build_learner;
pub use streams::build_stream;
