//! Serde forms of the catalog JSON.
//!
//! These mirror the wire layout one-to-one and perform no validation beyond what
//! serde does; the `TryFrom` impls in [`super::definition`] turn them into the
//! validated definitions.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group_order: Vec<String>,
    #[serde(default)]
    pub analytics: Vec<RawTransformerDef>,
    #[serde(default)]
    pub samples: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransformerDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub input_channels: Vec<RawChannelDef>,
    #[serde(default)]
    pub output_channels: Vec<RawChannelDef>,
    #[serde(default)]
    pub properties: Vec<RawPropertyDef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannelDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "truthy")]
    pub optional: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub repeated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPropertyDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub property_type: String,
    #[serde(default, deserialize_with = "truthy")]
    pub optional: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub repeated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<RawValidator>,
}

/// Declarative validator: numeric bounds and/or a regular expression.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawValidator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Coerces any JSON value to a boolean by truthiness.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

pub(crate) fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
