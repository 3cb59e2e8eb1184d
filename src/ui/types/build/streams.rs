use crate::streams::Stream;
use crate::streams::generators::{ConceptSwitch, SeaGenerator};
use crate::ui::types::build::BuildError;
use crate::ui::types::choices::{SeaParameters, StreamChoice};
use std::convert::TryFrom;

impl TryFrom<SeaParameters> for SeaGenerator {
    type Error = BuildError;

    fn try_from(parameters: SeaParameters) -> Result<Self, Self::Error> {
        if !(0.0..=1.0).contains(&parameters.noise_pct) {
            return Err(BuildError::InvalidParameter(
                "noise_pct must be in [0, 1]".into(),
            ));
        }
        let noise_percentage = (parameters.noise_pct * 100.0).round() as u32;

        let generator = SeaGenerator::new(
            parameters.function_id,
            parameters.balance,
            noise_percentage,
            parameters.max_instances,
            parameters.seed,
        )?;

        match (parameters.drift_position, parameters.drift_function_id) {
            (Some(position), Some(function_id)) => Ok(generator.with_concept_switch(ConceptSwitch {
                position,
                function_id,
            })?),
            (None, None) => Ok(generator),
            _ => Err(BuildError::InvalidParameter(
                "drift_position and drift_function_id must be set together".into(),
            )),
        }
    }
}

pub fn build_stream(choice: StreamChoice) -> Result<Box<dyn Stream>, BuildError> {
    match choice {
        StreamChoice::SeaGenerator(p) => Ok(Box::new(SeaGenerator::try_from(p)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_build_an_unbounded_stream() {
        let stream = build_stream(StreamChoice::SeaGenerator(SeaParameters::default())).unwrap();
        assert!(stream.has_more_instances());
        assert_eq!(stream.header().number_of_classes(), 2);
    }

    #[test]
    fn test_invalid_parameters_are_reported() {
        let noisy = SeaParameters {
            noise_pct: 1.5,
            ..SeaParameters::default()
        };
        assert!(matches!(
            SeaGenerator::try_from(noisy),
            Err(BuildError::InvalidParameter(_))
        ));

        let bad_function = SeaParameters {
            function_id: 9,
            ..SeaParameters::default()
        };
        assert!(matches!(
            SeaGenerator::try_from(bad_function),
            Err(BuildError::Io(_))
        ));

        let half_drift = SeaParameters {
            drift_position: Some(10),
            ..SeaParameters::default()
        };
        assert!(SeaGenerator::try_from(half_drift).is_err());
    }

    #[test]
    fn test_drift_parameters_build_a_switching_stream() {
        let params = SeaParameters {
            max_instances: Some(20),
            drift_position: Some(10),
            drift_function_id: Some(4),
            ..SeaParameters::default()
        };
        let mut stream = build_stream(StreamChoice::SeaGenerator(params)).unwrap();
        let mut produced = 0;
        while stream.next_instance().is_some() {
            produced += 1;
        }
        assert_eq!(produced, 20);
    }
}
