mod branch;
mod restructurer;

pub use branch::{Branch, DecoupledBranch, TreeElement};
pub use restructurer::{RestructureOutcome, Restructurer};
