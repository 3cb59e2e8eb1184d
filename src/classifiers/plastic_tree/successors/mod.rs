mod successor_identifier;
mod successors;

pub use successor_identifier::{DEFAULT_NOMINAL_VALUE, SuccessorIdentifier};
pub use successors::{SuccessorAddResult, Successors};
