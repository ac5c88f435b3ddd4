//! The `{...}` property block of an analytic line.

use super::grammar::quote;
use crate::catalog::{PropertyType, TransformerDef};
use crate::model::{PropertyValue, Transformer, whole_i64};
use itertools::Itertools;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// The entries of a property block in source order, duplicates included.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct PropertyBlock(pub Vec<(String, Value)>);

impl<'de> Deserialize<'de> for PropertyBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = PropertyBlock;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a flat object of property values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(PropertyBlock(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl PropertyBlock {
    pub(crate) fn parse(block: &str) -> Result<Self, String> {
        serde_json::from_str(block).map_err(|e| e.to_string())
    }
}

/// Reads one literal as a value of `property_type`.
///
/// Strings are coerced: numbers may carry their unit suffix (`d` for decimal,
/// `f` for float) and booleans must be exactly `true` or `false`. Native JSON
/// numbers and booleans are taken as they are.
pub(crate) fn coerce(value: &Value, property_type: PropertyType) -> Option<PropertyValue> {
    let Value::String(text) = value else {
        return PropertyValue::from_json(value, property_type);
    };
    match property_type {
        PropertyType::String => Some(PropertyValue::String(text.clone())),
        PropertyType::Boolean => match text.as_str() {
            "true" => Some(PropertyValue::Boolean(true)),
            "false" => Some(PropertyValue::Boolean(false)),
            _ => None,
        },
        PropertyType::Integer => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_i64))
                .map(PropertyValue::Integer)
        }
        PropertyType::Float => parse_number(text, 'f').map(PropertyValue::Float),
        PropertyType::Decimal => parse_number(text, 'd').map(PropertyValue::Decimal),
    }
}

fn parse_number(text: &str, suffix: char) -> Option<f64> {
    let text = text.trim();
    text.strip_suffix(suffix)
        .unwrap_or(text)
        .parse::<f64>()
        .ok()
        .filter(|f| !f.is_nan())
}

/// Renders a value the way the format writes it: always a string, with the
/// numeric unit suffix where the type has one.
pub(crate) fn render_value(value: &PropertyValue) -> String {
    match value {
        PropertyValue::String(s) => s.clone(),
        PropertyValue::Boolean(b) => b.to_string(),
        PropertyValue::Integer(i) => i.to_string(),
        PropertyValue::Float(f) => format!("{:?}f", f),
        PropertyValue::Decimal(d) => format!("{:?}d", d),
    }
}

/// Renders the property block of `transformer`. Properties without a value
/// are left out; repeated properties become a list under a single key.
pub(crate) fn render_block(transformer: &Transformer, def: &TransformerDef) -> String {
    let entries = transformer
        .properties()
        .iter()
        .filter(|p| p.value().is_some())
        .map(|p| p.definition_name())
        .unique()
        .map(|name| {
            let repeated = def.property(name).is_some_and(|p| p.is_repeated());
            let values: Vec<String> = transformer
                .property_values(name)
                .map(|v| quote(&render_value(v)))
                .collect();
            let rendered = if repeated {
                format!("[{}]", values.join(","))
            } else {
                values.into_iter().last().unwrap_or_default()
            };
            format!("{}:{}", quote(name), rendered)
        })
        .join(",");
    format!("{{{}}}", entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn block_keeps_duplicates_in_order() {
        let block = PropertyBlock::parse(r#"{"a":"1","b":"x","a":"2"}"#).unwrap();
        assert_eq!(
            block.0,
            vec![
                ("a".to_string(), json!("1")),
                ("b".to_string(), json!("x")),
                ("a".to_string(), json!("2")),
            ]
        );
        assert_eq!(PropertyBlock::parse("{}").unwrap(), PropertyBlock::default());
    }

    #[test]
    fn broken_block_is_an_error() {
        assert!(PropertyBlock::parse(r#"{"a":"1""#).is_err());
        assert!(PropertyBlock::parse(r#"["a"]"#).is_err());
    }

    #[test]
    fn numeric_strings_drop_their_suffix() {
        assert_eq!(
            coerce(&json!("2.5d"), PropertyType::Decimal),
            Some(PropertyValue::Decimal(2.5))
        );
        assert_eq!(
            coerce(&json!("1.0f"), PropertyType::Float),
            Some(PropertyValue::Float(1.0))
        );
        assert_eq!(
            coerce(&json!("42"), PropertyType::Integer),
            Some(PropertyValue::Integer(42))
        );
        assert_eq!(coerce(&json!("ABC"), PropertyType::Decimal), None);
        assert_eq!(coerce(&json!("4.5"), PropertyType::Integer), None);
        assert_eq!(coerce(&json!("1e30"), PropertyType::Integer), None);
    }

    #[test]
    fn booleans_are_case_sensitive() {
        assert_eq!(
            coerce(&json!("true"), PropertyType::Boolean),
            Some(PropertyValue::Boolean(true))
        );
        assert_eq!(coerce(&json!("True"), PropertyType::Boolean), None);
        assert_eq!(
            coerce(&json!(false), PropertyType::Boolean),
            Some(PropertyValue::Boolean(false))
        );
    }

    #[test]
    fn values_render_with_unit_suffix() {
        assert_eq!(render_value(&PropertyValue::Decimal(10.0)), "10.0d");
        assert_eq!(render_value(&PropertyValue::Float(0.5)), "0.5f");
        assert_eq!(render_value(&PropertyValue::Integer(-3)), "-3");
        assert_eq!(render_value(&PropertyValue::Boolean(true)), "true");
        assert_eq!(
            coerce(&json!(render_value(&PropertyValue::Decimal(1e-7))), PropertyType::Decimal),
            Some(PropertyValue::Decimal(1e-7))
        );
    }
}
