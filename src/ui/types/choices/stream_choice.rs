use crate::ui::types::choices::UIChoice;
use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

const DEFAULT_SEED: u64 = 42;
fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_sea_function() -> u8 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SeaParameters {
    #[serde(default = "default_sea_function")]
    #[schemars(
        title = "Function",
        description = "SEA concept used from the start (1-4)",
        range(min = 1, max = 4),
        default = "default_sea_function"
    )]
    pub function_id: u8,

    #[serde(default)]
    #[schemars(title = "Balance", description = "Alternate the two classes?")]
    pub balance: bool,

    #[serde(default)]
    #[schemars(
        title = "Noise",
        description = "Fraction of labels flipped (0.0-1.0)",
        range(min = 0.0, max = 1.0)
    )]
    pub noise_pct: f32,

    #[serde(default)]
    #[schemars(
        title = "Max Instances",
        description = "Upper bound on instances; empty = infinite"
    )]
    pub max_instances: Option<u64>,

    #[serde(default)]
    #[schemars(
        title = "Drift Position",
        description = "Instance at which the concept switches; empty = no drift"
    )]
    pub drift_position: Option<u64>,

    #[serde(default)]
    #[schemars(
        title = "Drift Function",
        description = "SEA concept used after the switch (1-4)"
    )]
    pub drift_function_id: Option<u8>,

    #[serde(default = "default_seed")]
    #[schemars(title = "Seed", description = "PRNG seed", default = "default_seed")]
    pub seed: u64,
}

impl Default for SeaParameters {
    fn default() -> Self {
        Self {
            function_id: default_sea_function(),
            balance: false,
            noise_pct: 0.0,
            max_instances: None,
            drift_position: None,
            drift_function_id: None,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(StreamKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum StreamChoice {
    #[strum_discriminants(strum(
        message = "SEA Generator",
        detailed_message = "SEA concepts, optionally switching abruptly mid-stream."
    ))]
    SeaGenerator(SeaParameters),
}

impl UIChoice for StreamChoice {
    type Kind = StreamKind;

    fn schema() -> Schema {
        schema_for!(StreamChoice)
    }

    fn default_params(kind: Self::Kind) -> Value {
        match kind {
            StreamKind::SeaGenerator => {
                serde_json::to_value(SeaParameters::default()).unwrap_or(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::EnumMessage;

    #[test]
    fn test_default_params_match_struct_defaults() {
        let value = StreamChoice::default_params(StreamKind::SeaGenerator);
        let sea: SeaParameters = serde_json::from_value(value).unwrap();
        assert_eq!(sea, SeaParameters::default());
        assert_eq!(sea.seed, DEFAULT_SEED);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let choice = StreamChoice::from_parts(
            StreamKind::SeaGenerator,
            json!({ "function_id": 3, "drift_position": 1000 }),
        )
        .unwrap();
        let StreamChoice::SeaGenerator(sea) = choice;
        assert_eq!(sea.function_id, 3);
        assert_eq!(sea.drift_position, Some(1000));
        assert_eq!(sea.drift_function_id, None);
        assert!(!sea.balance);
    }

    #[test]
    fn test_tag_and_message() {
        let v = serde_json::to_value(StreamChoice::SeaGenerator(SeaParameters::default())).unwrap();
        assert_eq!(v["type"], "sea-generator");
        assert_eq!(StreamKind::SeaGenerator.get_message(), Some("SEA Generator"));
    }
}
