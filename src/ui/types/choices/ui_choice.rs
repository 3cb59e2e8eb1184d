use anyhow::Result;
use schemars::{JsonSchema, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use strum::{EnumMessage, IntoEnumIterator};

/// A tagged `{"type": ..., "params": ...}` enum the command line can build
/// from a kind name plus parameter overrides.
pub trait UIChoice: Sized + Serialize + DeserializeOwned + JsonSchema {
    type Kind: Copy + Into<&'static str> + EnumMessage + IntoEnumIterator;

    fn schema() -> Schema;

    /// Default `params` object for `kind`.
    fn default_params(kind: Self::Kind) -> Value;

    fn from_parts(kind: Self::Kind, params: Value) -> Result<Self> {
        let key: &'static str = kind.into();
        let v = json!({ "type": key, "params": params });
        Ok(serde_json::from_value(v)?)
    }

    /// `name  message` lines for every kind, for listings and error hints.
    fn describe_kinds() -> Vec<String> {
        Self::Kind::iter()
            .map(|k| {
                let name: &'static str = k.into();
                format!("{name:<20} {}", k.get_message().unwrap_or(""))
            })
            .collect()
    }
}
