use crate::classifiers::plastic_tree::{
    DEFAULT_ACCEPTED_DEVIATION, DEFAULT_MAX_BRANCH_LENGTH, SplitCriterionKind, TreeVariant,
};
use crate::ui::types::choices::UIChoice;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

fn default_variant() -> TreeVariant {
    TreeVariant::Plastic
}
fn default_split_criterion() -> SplitCriterionKind {
    SplitCriterionKind::InfoGain
}
fn default_grace_period() -> usize {
    200
}
fn default_reevaluation_period() -> usize {
    200
}
fn default_split_confidence() -> f64 {
    0.001
}
fn default_tie_threshold() -> f64 {
    0.05
}
fn default_relative_min_delta_g() -> f64 {
    0.5
}
fn default_max_depth() -> usize {
    20
}
fn default_max_branch_length() -> usize {
    DEFAULT_MAX_BRANCH_LENGTH
}
fn default_accepted_deviation() -> f64 {
    DEFAULT_ACCEPTED_DEVIATION
}
fn default_numeric_estimator_bins() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PlasticTreeParams {
    /// Set from the learner kind when the choice is built.
    #[serde(default = "default_variant")]
    #[schemars(skip)]
    pub variant: TreeVariant,

    #[serde(default = "default_split_criterion")]
    #[schemars(
        title = "Split criterion",
        description = "Merit used to rank candidate splits (info-gain or gini)."
    )]
    pub split_criterion: SplitCriterionKind,

    #[serde(default = "default_grace_period")]
    #[schemars(
        title = "Grace period",
        description = "Instances a leaf observes between split attempts.",
        range(min = 1),
        default = "default_grace_period"
    )]
    pub grace_period: usize,

    #[serde(default = "default_reevaluation_period")]
    #[schemars(
        title = "Re-evaluation period",
        description = "Instances an internal node observes between split re-evaluations.",
        range(min = 1),
        default = "default_reevaluation_period"
    )]
    pub reevaluation_period: usize,

    #[serde(default = "default_split_confidence")]
    #[schemars(
        title = "Split confidence",
        description = "Allowed error in a split decision (0-1].",
        range(min = 0.0, max = 1.0),
        default = "default_split_confidence"
    )]
    pub split_confidence: f64,

    #[serde(default)]
    #[schemars(
        title = "Adaptive confidence",
        description = "If set (e.g. 0.2), the confidence shrinks as c * exp(-split attempts)."
    )]
    pub adaptive_confidence: Option<f64>,

    #[serde(default = "default_tie_threshold")]
    #[schemars(
        title = "Tie threshold",
        description = "Split anyway when the Hoeffding bound drops below this (0-1].",
        range(min = 0.0, max = 1.0),
        default = "default_tie_threshold"
    )]
    pub tie_threshold: f64,

    #[serde(default = "default_tie_threshold")]
    #[schemars(
        title = "Re-evaluation tie threshold",
        description = "Tie threshold used when an internal node re-evaluates its split (0-1].",
        range(min = 0.0, max = 1.0),
        default = "default_tie_threshold"
    )]
    pub reevaluation_tie_threshold: f64,

    #[serde(default = "default_relative_min_delta_g")]
    #[schemars(
        title = "Relative minimum merit gain",
        description = "Fraction of the tie threshold a tied winner must still gain (0-1].",
        range(min = 0.0, max = 1.0),
        default = "default_relative_min_delta_g"
    )]
    pub relative_min_delta_g: f64,

    #[serde(default)]
    #[schemars(title = "Binary splits only?", description = "Only allow binary splits.")]
    pub binary_splits: bool,

    #[serde(default)]
    #[schemars(
        title = "Disable pre-pruning?",
        description = "Never consider the null split."
    )]
    pub no_pre_prune: bool,

    #[serde(default = "default_max_depth")]
    #[schemars(
        title = "Maximum depth",
        description = "Leaves at this depth stop splitting.",
        default = "default_max_depth"
    )]
    pub max_depth: usize,

    #[serde(default = "default_max_branch_length")]
    #[schemars(
        title = "Maximum branch length",
        description = "Depth restructuring reaches below a node; 1 falls back to resplitting.",
        range(min = 1),
        default = "default_max_branch_length"
    )]
    pub max_branch_length: usize,

    #[serde(default = "default_accepted_deviation")]
    #[schemars(
        title = "Accepted threshold deviation",
        description = "Numeric thresholds closer than this are treated as the same split.",
        range(min = 0.0),
        default = "default_accepted_deviation"
    )]
    pub accepted_deviation: f64,

    #[serde(default = "default_numeric_estimator_bins")]
    #[schemars(
        title = "Numeric split points",
        description = "Candidate thresholds evaluated per numeric attribute.",
        range(min = 1),
        default = "default_numeric_estimator_bins"
    )]
    pub numeric_estimator_bins: usize,

    #[serde(default)]
    #[schemars(
        title = "Block parent attribute",
        description = "Keep children from splitting on the parent's attribute (empty = variant default)."
    )]
    pub block_parent_attribute: Option<bool>,
}

impl PlasticTreeParams {
    pub fn for_variant(variant: TreeVariant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}

impl Default for PlasticTreeParams {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            split_criterion: default_split_criterion(),
            grace_period: default_grace_period(),
            reevaluation_period: default_reevaluation_period(),
            split_confidence: default_split_confidence(),
            adaptive_confidence: None,
            tie_threshold: default_tie_threshold(),
            reevaluation_tie_threshold: default_tie_threshold(),
            relative_min_delta_g: default_relative_min_delta_g(),
            binary_splits: false,
            no_pre_prune: false,
            max_depth: default_max_depth(),
            max_branch_length: default_max_branch_length(),
            accepted_deviation: default_accepted_deviation(),
            numeric_estimator_bins: default_numeric_estimator_bins(),
            block_parent_attribute: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(LearnerKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum LearnerChoice {
    #[strum_discriminants(strum(
        message = "Hoeffding Tree",
        detailed_message = "Grows splits, never reconsiders them."
    ))]
    HoeffdingTree(PlasticTreeParams),

    #[strum_discriminants(strum(
        message = "EFDT",
        detailed_message = "Re-evaluates splits and rebuilds the subtree when a better one appears."
    ))]
    Efdt(PlasticTreeParams),

    #[strum_discriminants(strum(
        message = "PLASTIC",
        detailed_message = "Re-evaluates splits and restructures the subtree in place."
    ))]
    Plastic(PlasticTreeParams),

    #[strum_discriminants(strum(
        message = "Adaptive PLASTIC",
        detailed_message = "PLASTIC with background subtrees replacing drifted branches."
    ))]
    AdaptivePlastic(PlasticTreeParams),

    #[strum_discriminants(strum(
        message = "EFHAT",
        detailed_message = "Hoeffding tree with background subtrees replacing drifted branches."
    ))]
    Efhat(PlasticTreeParams),
}

impl From<LearnerKind> for TreeVariant {
    fn from(kind: LearnerKind) -> Self {
        match kind {
            LearnerKind::HoeffdingTree => TreeVariant::HoeffdingTree,
            LearnerKind::Efdt => TreeVariant::Efdt,
            LearnerKind::Plastic => TreeVariant::Plastic,
            LearnerKind::AdaptivePlastic => TreeVariant::AdaptivePlastic,
            LearnerKind::Efhat => TreeVariant::Efhat,
        }
    }
}

impl LearnerChoice {
    /// Parameters with `variant` taken from the choice itself.
    pub fn into_params(self) -> PlasticTreeParams {
        let kind = LearnerKind::from(&self);
        let mut params = match self {
            LearnerChoice::HoeffdingTree(p)
            | LearnerChoice::Efdt(p)
            | LearnerChoice::Plastic(p)
            | LearnerChoice::AdaptivePlastic(p)
            | LearnerChoice::Efhat(p) => p,
        };
        params.variant = kind.into();
        params
    }
}

impl UIChoice for LearnerChoice {
    type Kind = LearnerKind;

    fn schema() -> Schema {
        schema_for!(LearnerChoice)
    }

    fn default_params(kind: Self::Kind) -> Value {
        serde_json::to_value(PlasticTreeParams::for_variant(kind.into())).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_kinds_match_tree_variants_by_name() {
        for kind in LearnerKind::iter() {
            let variant = TreeVariant::from(kind);
            assert_eq!(kind.to_string(), variant.to_string());
        }
        assert_eq!(
            LearnerKind::from_str("adaptive-plastic").ok(),
            Some(LearnerKind::AdaptivePlastic)
        );
    }

    #[test]
    fn test_from_parts_fills_defaults_and_sets_variant() {
        let choice = LearnerChoice::from_parts(
            LearnerKind::Efhat,
            serde_json::json!({ "grace_period": 50 }),
        )
        .unwrap();
        let params = choice.into_params();
        assert_eq!(params.variant, TreeVariant::Efhat);
        assert_eq!(params.grace_period, 50);
        assert_eq!(params.max_branch_length, DEFAULT_MAX_BRANCH_LENGTH);
        assert_eq!(params.split_criterion, SplitCriterionKind::InfoGain);
    }

    #[test]
    fn test_tagged_serialization_and_split_criterion_names() {
        let v = serde_json::to_value(LearnerChoice::Plastic(PlasticTreeParams::default())).unwrap();
        assert_eq!(v["type"], "plastic");
        assert_eq!(v["params"]["split_criterion"], "info-gain");
        assert!(v["params"].get("variant").is_some());
    }

    #[test]
    fn test_default_params_round_trip() {
        let value = LearnerChoice::default_params(LearnerKind::Efdt);
        let params: PlasticTreeParams = serde_json::from_value(value).unwrap();
        assert_eq!(params, PlasticTreeParams::for_variant(TreeVariant::Efdt));
    }
}
