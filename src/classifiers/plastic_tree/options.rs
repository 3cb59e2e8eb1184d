use crate::classifiers::attribute_class_observers::{
    AttributeClassObserver, GaussianNumericAttributeClassObserver, NominalAttributeClassObserver,
};
use crate::classifiers::plastic_tree::drift::{AdwinChangeDetector, ChangeDetector};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// What an internal node does when its periodic re-evaluation finds a
/// better split than the installed one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReevaluationPolicy {
    /// Internal nodes never reconsider their split.
    Off,
    /// Replace the split and rebuild the successors from scratch.
    Resplit,
    /// Reorder the subtree so the new attribute is on top, keeping what was
    /// learned below it where possible.
    Restructure {
        max_branch_length: usize,
        accepted_deviation: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriftPolicy {
    Off,
    /// Grow a shadow subtree when a node's error monitor signals change and
    /// swap it in once it is significantly better.
    BackgroundLearner,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TreeVariant {
    HoeffdingTree,
    Efdt,
    Plastic,
    AdaptivePlastic,
    Efhat,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SplitCriterionKind {
    InfoGain,
    Gini,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlasticTreeOptions {
    pub grace_period: usize,
    pub reevaluation_period: usize,
    pub split_confidence: f64,
    /// When set, the split confidence decays as `c * exp(-attempts)`.
    pub adaptive_confidence: Option<f64>,
    pub tie_threshold: f64,
    pub reevaluation_tie_threshold: f64,
    pub relative_min_delta_g: f64,
    pub binary_splits: bool,
    pub no_pre_prune: bool,
    pub max_depth: usize,
    pub numeric_estimator_bins: usize,
    pub reevaluation: ReevaluationPolicy,
    pub drift: DriftPolicy,
    /// Keep a child from choosing its parent's split attribute.
    pub block_parent_attribute: bool,
}

pub const DEFAULT_MAX_BRANCH_LENGTH: usize = 5;
pub const DEFAULT_ACCEPTED_DEVIATION: f64 = 0.05;

impl PlasticTreeOptions {
    pub fn for_variant(variant: TreeVariant) -> Self {
        let restructure = ReevaluationPolicy::Restructure {
            max_branch_length: DEFAULT_MAX_BRANCH_LENGTH,
            accepted_deviation: DEFAULT_ACCEPTED_DEVIATION,
        };
        let (reevaluation, drift) = match variant {
            TreeVariant::HoeffdingTree => (ReevaluationPolicy::Off, DriftPolicy::Off),
            TreeVariant::Efdt => (ReevaluationPolicy::Resplit, DriftPolicy::Off),
            TreeVariant::Plastic => (restructure, DriftPolicy::Off),
            TreeVariant::AdaptivePlastic => (restructure, DriftPolicy::BackgroundLearner),
            TreeVariant::Efhat => (ReevaluationPolicy::Off, DriftPolicy::BackgroundLearner),
        };
        Self {
            grace_period: 200,
            reevaluation_period: 200,
            split_confidence: 0.001,
            adaptive_confidence: None,
            tie_threshold: 0.05,
            reevaluation_tie_threshold: 0.05,
            relative_min_delta_g: 0.5,
            binary_splits: false,
            no_pre_prune: false,
            max_depth: 20,
            numeric_estimator_bins: 10,
            reevaluation,
            drift,
            block_parent_attribute: matches!(reevaluation, ReevaluationPolicy::Restructure { .. }),
        }
    }

    /// Branch length and threshold tolerance of restructuring. Presets that
    /// do not restructure are left as they are.
    pub fn with_restructuring_limits(
        mut self,
        max_branch_length: usize,
        accepted_deviation: f64,
    ) -> Self {
        if self.restructures() {
            self.reevaluation = ReevaluationPolicy::Restructure {
                max_branch_length,
                accepted_deviation,
            };
        }
        self
    }

    pub fn restructures(&self) -> bool {
        matches!(self.reevaluation, ReevaluationPolicy::Restructure { .. })
    }

    pub fn tracks_drift(&self) -> bool {
        self.drift == DriftPolicy::BackgroundLearner
    }

    /// Error monitor every node gets while drift tracking is on.
    pub(crate) fn new_change_detector(&self) -> Option<Box<dyn ChangeDetector>> {
        self.tracks_drift()
            .then(|| Box::new(AdwinChangeDetector::default()) as Box<dyn ChangeDetector>)
    }

    pub(crate) fn new_observer(&self, numeric: bool) -> Box<dyn AttributeClassObserver> {
        if numeric {
            Box::new(GaussianNumericAttributeClassObserver::new(
                self.numeric_estimator_bins,
            ))
        } else {
            Box::new(NominalAttributeClassObserver::new())
        }
    }
}

impl Default for PlasticTreeOptions {
    fn default() -> Self {
        Self::for_variant(TreeVariant::Plastic)
    }
}
