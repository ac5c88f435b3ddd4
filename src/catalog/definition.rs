use super::raw::{RawChannelDef, RawPropertyDef, RawTransformerDef};
use super::validator::Validator;
use crate::error::DefinitionError;
use crate::model::PropertyValue;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The value type a property is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Boolean,
    Integer,
    Float,
    Decimal,
}

impl PropertyType {
    /// Parses the catalog spelling of a type (`"string"`, `"boolean"`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "decimal" => Some(Self::Decimal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Decimal => "decimal",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Decimal)
    }

    /// The value a fresh, non-optional property of this type starts with.
    pub fn zero_value(&self) -> PropertyValue {
        match self {
            Self::String => PropertyValue::String(String::new()),
            Self::Boolean => PropertyValue::Boolean(false),
            Self::Integer => PropertyValue::Integer(0),
            Self::Float => PropertyValue::Float(0.0),
            Self::Decimal => PropertyValue::Decimal(0.0),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of a named, typed analytic property.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    name: String,
    description: String,
    property_type: PropertyType,
    optional: bool,
    repeated: bool,
    valid_values: Option<Vec<PropertyValue>>,
    validator: Option<Validator>,
    default_value: Option<PropertyValue>,
}

impl PropertyDef {
    pub fn new(
        name: &str,
        description: &str,
        property_type: PropertyType,
    ) -> Result<Self, DefinitionError> {
        if name.trim().is_empty() {
            return Err(DefinitionError::Invalid(
                "property name must be a non-empty string".to_string(),
            ));
        }
        if description.trim().is_empty() {
            return Err(DefinitionError::Invalid(format!(
                "property '{}' must have a non-empty description",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            property_type,
            optional: false,
            repeated: false,
            valid_values: None,
            validator: None,
            default_value: None,
        })
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn repeated(mut self, repeated: bool) -> Self {
        self.repeated = repeated;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Restricts the property to `values`. The first entry becomes the default
    /// unless an explicit default was already set.
    pub fn with_valid_values(mut self, values: Vec<PropertyValue>) -> Result<Self, DefinitionError> {
        for value in &values {
            self.check_type(value)?;
        }
        if self.default_value.is_none() {
            self.default_value = values.first().cloned();
        }
        self.valid_values = Some(values);
        Ok(self)
    }

    pub fn with_default(mut self, value: PropertyValue) -> Result<Self, DefinitionError> {
        self.check_type(&value)?;
        self.default_value = Some(value);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn property_type(&self) -> PropertyType {
        self.property_type
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    pub fn valid_values(&self) -> Option<&[PropertyValue]> {
        self.valid_values.as_deref()
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn default_value(&self) -> Option<&PropertyValue> {
        self.default_value.as_ref()
    }

    /// The declared default, or the type's zero value.
    pub fn initial_value(&self) -> PropertyValue {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.property_type.zero_value())
    }

    /// Whether a freshly created transformer carries this property.
    pub fn is_populated_by_default(&self) -> bool {
        !self.optional && !self.repeated
    }

    /// Checks type, valid values and the validator predicate.
    pub fn validate(&self, value: &PropertyValue) -> Result<(), DefinitionError> {
        self.check_type(value)?;
        if let Some(valid) = &self.valid_values {
            if !valid.contains(value) {
                return Err(DefinitionError::NotAValidValue {
                    property: self.name.clone(),
                    value: value.to_string(),
                });
            }
        }
        if let Some(validator) = &self.validator {
            validator
                .check(value)
                .map_err(|message| DefinitionError::Rejected {
                    property: self.name.clone(),
                    value: value.to_string(),
                    message,
                })?;
        }
        Ok(())
    }

    fn check_type(&self, value: &PropertyValue) -> Result<(), DefinitionError> {
        if value.property_type() == self.property_type {
            Ok(())
        } else {
            Err(DefinitionError::TypeMismatch {
                property: self.name.clone(),
                expected: self.property_type,
                found: value.to_string(),
            })
        }
    }
}

impl TryFrom<RawPropertyDef> for PropertyDef {
    type Error = DefinitionError;

    fn try_from(raw: RawPropertyDef) -> Result<Self, Self::Error> {
        let property_type = PropertyType::parse(&raw.property_type).ok_or_else(|| {
            DefinitionError::Invalid(format!(
                "property '{}' has unknown type '{}'",
                raw.name, raw.property_type
            ))
        })?;

        let mut def = PropertyDef::new(&raw.name, &raw.description, property_type)?
            .optional(raw.optional)
            .repeated(raw.repeated);

        if let Some(default) = &raw.default_value {
            let value = PropertyValue::from_json(default, property_type).ok_or_else(|| {
                DefinitionError::TypeMismatch {
                    property: raw.name.clone(),
                    expected: property_type,
                    found: default.to_string(),
                }
            })?;
            def = def.with_default(value)?;
        }

        if let Some(valid_values) = &raw.valid_values {
            let values = valid_values
                .iter()
                .map(|v| {
                    PropertyValue::from_json(v, property_type).ok_or_else(|| {
                        DefinitionError::TypeMismatch {
                            property: raw.name.clone(),
                            expected: property_type,
                            found: v.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            def = def.with_valid_values(values)?;
        }

        if let Some(validator) = &raw.validator {
            def = def.with_validator(Validator::from_raw(validator)?);
        }

        Ok(def)
    }
}

/// Static definition of an input or output channel slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformerChannelDef {
    pub name: String,
    pub description: String,
    pub optional: bool,
    pub repeated: bool,
    pub prefix: Option<String>,
}

impl TransformerChannelDef {
    /// A required, single-name slot.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            optional: false,
            repeated: false,
            prefix: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Slots a freshly created transformer carries a channel for.
    pub fn is_populated_by_default(&self) -> bool {
        self.repeated || !self.optional
    }

    /// Prepends the declared prefix unless `name` already carries it.
    pub fn apply_prefix(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) if !name.starts_with(prefix.as_str()) => format!("{}{}", prefix, name),
            _ => name.to_string(),
        }
    }
}

impl TryFrom<RawChannelDef> for TransformerChannelDef {
    type Error = DefinitionError;

    fn try_from(raw: RawChannelDef) -> Result<Self, Self::Error> {
        if raw.name.trim().is_empty() {
            return Err(DefinitionError::Invalid(
                "channel name must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            name: raw.name,
            description: raw.description,
            optional: raw.optional,
            repeated: raw.repeated,
            prefix: raw.prefix.filter(|p| !p.is_empty()),
        })
    }
}

/// Static definition of one analytic type in the catalog.
#[derive(Debug, Clone)]
pub struct TransformerDef {
    name: String,
    description: String,
    group: String,
    documentation: String,
    properties: Vec<PropertyDef>,
    input_channels: Vec<TransformerChannelDef>,
    output_channels: Vec<TransformerChannelDef>,
}

impl TransformerDef {
    pub fn new(
        name: &str,
        group: &str,
        properties: Vec<PropertyDef>,
        input_channels: Vec<TransformerChannelDef>,
        output_channels: Vec<TransformerChannelDef>,
    ) -> Result<Self, DefinitionError> {
        if name.trim().is_empty() {
            return Err(DefinitionError::Invalid(
                "analytic name must be a non-empty string".to_string(),
            ));
        }
        let mut seen = AHashSet::new();
        for property in &properties {
            if !seen.insert(property.name()) {
                return Err(DefinitionError::DuplicateProperty {
                    owner: name.to_string(),
                    property: property.name().to_string(),
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            description: String::new(),
            group: group.to_string(),
            documentation: String::new(),
            properties,
            input_channels,
            output_channels,
        })
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn input_channels(&self) -> &[TransformerChannelDef] {
        &self.input_channels
    }

    pub fn output_channels(&self) -> &[TransformerChannelDef] {
        &self.output_channels
    }

    pub fn input_channel(&self, name: &str) -> Option<&TransformerChannelDef> {
        self.input_channels.iter().find(|c| c.name == name)
    }

    pub fn output_channel(&self, name: &str) -> Option<&TransformerChannelDef> {
        self.output_channels.iter().find(|c| c.name == name)
    }
}

impl TryFrom<RawTransformerDef> for TransformerDef {
    type Error = DefinitionError;

    fn try_from(raw: RawTransformerDef) -> Result<Self, Self::Error> {
        let properties = raw
            .properties
            .into_iter()
            .map(PropertyDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let inputs = raw
            .input_channels
            .into_iter()
            .map(TransformerChannelDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = raw
            .output_channels
            .into_iter()
            .map(TransformerChannelDef::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransformerDef::new(&raw.name, &raw.group, properties, inputs, outputs)?
            .with_description(&raw.description)
            .with_documentation(&raw.documentation))
    }
}
