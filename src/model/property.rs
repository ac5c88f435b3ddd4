use super::value::PropertyValue;
use crate::catalog::PropertyDef;
use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};

/// A concrete value bound to a [`PropertyDef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    definition_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<PropertyValue>,
    #[serde(default)]
    optional: bool,
}

impl Property {
    /// Binds `value` to `def`, validating type, valid values and the
    /// validator. An absent value is only allowed on optional properties.
    pub fn new(def: &PropertyDef, value: Option<PropertyValue>) -> Result<Self, DefinitionError> {
        match &value {
            Some(v) => def.validate(v)?,
            None if !def.is_optional() => {
                return Err(DefinitionError::MissingValue(def.name().to_string()));
            }
            None => {}
        }
        Ok(Self {
            definition_name: def.name().to_string(),
            value,
            optional: def.is_optional(),
        })
    }

    /// Binds an untyped JSON literal; `null` counts as absent.
    pub fn from_json(def: &PropertyDef, value: &serde_json::Value) -> Result<Self, DefinitionError> {
        if value.is_null() {
            return Self::new(def, None);
        }
        let typed = PropertyValue::from_json(value, def.property_type()).ok_or_else(|| {
            DefinitionError::TypeMismatch {
                property: def.name().to_string(),
                expected: def.property_type(),
                found: value.to_string(),
            }
        })?;
        Self::new(def, Some(typed))
    }

    /// The property at its declared default (or its type's zero value).
    pub fn with_default(def: &PropertyDef) -> Self {
        Self {
            definition_name: def.name().to_string(),
            value: Some(def.initial_value()),
            optional: def.is_optional(),
        }
    }

    pub fn definition_name(&self) -> &str {
        &self.definition_name
    }

    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Replaces the value after validating it against `def`.
    pub fn set_value(
        &mut self,
        def: &PropertyDef,
        value: Option<PropertyValue>,
    ) -> Result<(), DefinitionError> {
        *self = Self::new(def, value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PropertyType;
    use serde_json::json;

    fn threshold() -> PropertyDef {
        PropertyDef::new("threshold", "Threshold value", PropertyType::Decimal).unwrap()
    }

    #[test]
    fn missing_value_requires_optional() {
        assert!(matches!(
            Property::new(&threshold(), None),
            Err(DefinitionError::MissingValue(_))
        ));
        assert!(Property::new(&threshold().optional(true), None).is_ok());
    }

    #[test]
    fn json_value_must_match_type() {
        assert!(Property::from_json(&threshold(), &json!(12.5)).is_ok());
        assert!(matches!(
            Property::from_json(&threshold(), &json!("12.5")),
            Err(DefinitionError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_outside_valid_values_is_rejected() {
        let def = PropertyDef::new("mode", "Mode", PropertyType::String)
            .unwrap()
            .with_valid_values(vec![PropertyValue::String("fast".into())])
            .unwrap();
        assert!(matches!(
            Property::new(&def, Some(PropertyValue::String("slow".into()))),
            Err(DefinitionError::NotAValidValue { .. })
        ));
    }
}
