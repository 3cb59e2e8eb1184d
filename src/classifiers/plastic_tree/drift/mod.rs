mod adwin;
mod change_detector;

pub use adwin::Adwin;
pub use change_detector::{AdwinChangeDetector, ChangeDetector};
