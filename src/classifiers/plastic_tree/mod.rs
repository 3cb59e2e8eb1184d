mod background;
pub mod drift;
pub mod instance_conditional_test;
pub mod nodes;
pub mod options;
mod plastic_tree;
pub mod restructuring;
pub mod split_criteria;
mod splitting;
pub mod successors;

pub use options::{
    DEFAULT_ACCEPTED_DEVIATION, DEFAULT_MAX_BRANCH_LENGTH, DriftPolicy, PlasticTreeOptions,
    ReevaluationPolicy, SplitCriterionKind, TreeVariant,
};
pub use plastic_tree::PlasticTree;
