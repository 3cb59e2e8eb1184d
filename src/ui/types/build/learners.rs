use crate::classifiers::Classifier;
use crate::classifiers::plastic_tree::split_criteria::{
    GiniSplitCriterion, InfoGainSplitCriterion, SplitCriterion,
};
use crate::classifiers::plastic_tree::{PlasticTree, PlasticTreeOptions, SplitCriterionKind};
use crate::ui::types::build::BuildError;
use crate::ui::types::choices::{LearnerChoice, PlasticTreeParams};
use std::convert::TryFrom;

fn require(condition: bool, message: &str) -> Result<(), BuildError> {
    if condition {
        Ok(())
    } else {
        Err(BuildError::InvalidParameter(message.into()))
    }
}

fn in_unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

impl TryFrom<PlasticTreeParams> for PlasticTree {
    type Error = BuildError;

    fn try_from(params: PlasticTreeParams) -> Result<Self, Self::Error> {
        require(params.grace_period > 0, "grace_period must be > 0")?;
        require(params.reevaluation_period > 0, "reevaluation_period must be > 0")?;
        require(
            in_unit_interval(params.split_confidence),
            "split_confidence must be in (0, 1]",
        )?;
        require(
            params.adaptive_confidence.is_none_or(in_unit_interval),
            "adaptive_confidence must be in (0, 1]",
        )?;
        require(
            in_unit_interval(params.tie_threshold),
            "tie_threshold must be in (0, 1]",
        )?;
        require(
            in_unit_interval(params.reevaluation_tie_threshold),
            "reevaluation_tie_threshold must be in (0, 1]",
        )?;
        require(
            in_unit_interval(params.relative_min_delta_g),
            "relative_min_delta_g must be in (0, 1]",
        )?;
        require(params.max_branch_length >= 1, "max_branch_length must be >= 1")?;
        require(
            params.accepted_deviation.is_finite() && params.accepted_deviation >= 0.0,
            "accepted_deviation must be >= 0",
        )?;
        require(
            params.numeric_estimator_bins >= 1,
            "numeric_estimator_bins must be >= 1",
        )?;

        let mut options = PlasticTreeOptions::for_variant(params.variant)
            .with_restructuring_limits(params.max_branch_length, params.accepted_deviation);
        options.grace_period = params.grace_period;
        options.reevaluation_period = params.reevaluation_period;
        options.split_confidence = params.split_confidence;
        options.adaptive_confidence = params.adaptive_confidence;
        options.tie_threshold = params.tie_threshold;
        options.reevaluation_tie_threshold = params.reevaluation_tie_threshold;
        options.relative_min_delta_g = params.relative_min_delta_g;
        options.binary_splits = params.binary_splits;
        options.no_pre_prune = params.no_pre_prune;
        options.max_depth = params.max_depth;
        options.numeric_estimator_bins = params.numeric_estimator_bins;
        if let Some(block) = params.block_parent_attribute {
            options.block_parent_attribute = block;
        }

        let split_criterion: Box<dyn SplitCriterion> = match params.split_criterion {
            SplitCriterionKind::InfoGain => Box::new(InfoGainSplitCriterion::default()),
            SplitCriterionKind::Gini => Box::new(GiniSplitCriterion),
        };
        Ok(PlasticTree::new(options, split_criterion))
    }
}

pub fn build_learner(choice: LearnerChoice) -> Result<Box<dyn Classifier>, BuildError> {
    Ok(Box::new(PlasticTree::try_from(choice.into_params())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::plastic_tree::{DriftPolicy, ReevaluationPolicy, TreeVariant};

    #[test]
    fn test_variant_and_overrides_reach_the_options() {
        let params = PlasticTreeParams {
            grace_period: 50,
            max_branch_length: 3,
            accepted_deviation: 0.1,
            adaptive_confidence: Some(0.2),
            ..PlasticTreeParams::for_variant(TreeVariant::AdaptivePlastic)
        };
        let tree = PlasticTree::try_from(params).unwrap();
        let options = tree.options();
        assert_eq!(options.grace_period, 50);
        assert_eq!(options.adaptive_confidence, Some(0.2));
        assert_eq!(options.drift, DriftPolicy::BackgroundLearner);
        assert_eq!(
            options.reevaluation,
            ReevaluationPolicy::Restructure {
                max_branch_length: 3,
                accepted_deviation: 0.1
            }
        );
    }

    #[test]
    fn test_branch_length_is_ignored_without_restructuring() {
        let params = PlasticTreeParams {
            max_branch_length: 1,
            block_parent_attribute: Some(true),
            ..PlasticTreeParams::for_variant(TreeVariant::Efdt)
        };
        let tree = PlasticTree::try_from(params).unwrap();
        assert_eq!(tree.options().reevaluation, ReevaluationPolicy::Resplit);
        assert!(tree.options().block_parent_attribute);
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let bad = [
            PlasticTreeParams {
                grace_period: 0,
                ..PlasticTreeParams::default()
            },
            PlasticTreeParams {
                split_confidence: 0.0,
                ..PlasticTreeParams::default()
            },
            PlasticTreeParams {
                adaptive_confidence: Some(1.5),
                ..PlasticTreeParams::default()
            },
            PlasticTreeParams {
                max_branch_length: 0,
                ..PlasticTreeParams::default()
            },
            PlasticTreeParams {
                accepted_deviation: -0.1,
                ..PlasticTreeParams::default()
            },
        ];
        for params in bad {
            let err = PlasticTree::try_from(params).err().unwrap();
            assert!(matches!(err, BuildError::InvalidParameter(_)));
        }
    }

    #[test]
    fn test_build_learner_accepts_every_kind() {
        let choice = LearnerChoice::Efhat(PlasticTreeParams::default());
        assert!(build_learner(choice).is_ok());
        let choice = LearnerChoice::HoeffdingTree(PlasticTreeParams {
            tie_threshold: 2.0,
            ..PlasticTreeParams::default()
        });
        assert!(build_learner(choice).is_err());
    }
}
