use super::channel::Channel;
use super::property::Property;
use super::value::PropertyValue;
use crate::catalog::{PropertyDef, TransformerChannelDef, TransformerDef};
use crate::error::DefinitionError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// A concrete instance of a [`TransformerDef`].
///
/// The definition is referenced by name only and resolved through whichever
/// catalog the caller holds. Channel instances carry their slot's name; the
/// user-facing names of a row's endpoints live in the row's overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformer {
    name: String,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    input_channels: Vec<Channel>,
    #[serde(default)]
    output_channels: Vec<Channel>,
}

impl Transformer {
    /// A fresh instance: required, non-repeated properties at their defaults,
    /// one channel per required or repeated slot.
    pub fn new(def: &TransformerDef) -> Self {
        Self {
            name: def.name().to_string(),
            properties: def
                .properties()
                .iter()
                .filter(|p| p.is_populated_by_default())
                .map(Property::with_default)
                .collect(),
            input_channels: default_channels(def.input_channels()),
            output_channels: default_channels(def.output_channels()),
        }
    }

    pub fn builder(def: &TransformerDef) -> TransformerBuilder<'_> {
        TransformerBuilder::new(def)
    }

    pub(crate) fn from_parts(
        name: &str,
        properties: Vec<Property>,
        input_channels: Vec<Channel>,
        output_channels: Vec<Channel>,
    ) -> Self {
        Self {
            name: name.to_string(),
            properties,
            input_channels,
            output_channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn input_channels(&self) -> &[Channel] {
        &self.input_channels
    }

    pub fn output_channels(&self) -> &[Channel] {
        &self.output_channels
    }

    /// First property bound to `name`.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.definition_name() == name)
    }

    /// Every value bound to `name`, in order (several for repeated properties).
    pub fn property_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a PropertyValue> {
        self.properties
            .iter()
            .filter(move |p| p.definition_name() == name)
            .filter_map(Property::value)
    }

    /// Sets `name` to a single value, replacing every existing binding.
    pub fn set_property(
        &mut self,
        def: &TransformerDef,
        name: &str,
        value: Option<PropertyValue>,
    ) -> Result<(), DefinitionError> {
        let property_def = self.lookup(def, name)?;
        let property = Property::new(property_def, value)?;
        match self.properties.iter().position(|p| p.definition_name() == name) {
            Some(first) => {
                self.properties[first] = property;
                let mut index = 0;
                self.properties.retain(|p| {
                    let keep = index <= first || p.definition_name() != name;
                    index += 1;
                    keep
                });
            }
            None => self.properties.push(property),
        }
        Ok(())
    }

    /// Appends a binding. Only repeated properties may be bound more than once.
    pub fn add_property(
        &mut self,
        def: &TransformerDef,
        name: &str,
        value: Option<PropertyValue>,
    ) -> Result<(), DefinitionError> {
        let property_def = self.lookup(def, name)?;
        if !property_def.is_repeated() && self.property(name).is_some() {
            return Err(DefinitionError::DuplicateProperty {
                owner: self.name.clone(),
                property: name.to_string(),
            });
        }
        self.properties.push(Property::new(property_def, value)?);
        Ok(())
    }

    /// Removes every binding of `name`, returning how many were removed.
    pub fn remove_property(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| p.definition_name() != name);
        before - self.properties.len()
    }

    /// The slot definition an input channel instance belongs to.
    pub fn input_slot<'d>(
        &self,
        def: &'d TransformerDef,
        index: usize,
    ) -> Option<&'d TransformerChannelDef> {
        self.input_channels
            .get(index)
            .and_then(|c| def.input_channel(c.name()))
    }

    /// The slot definition an output channel instance belongs to.
    pub fn output_slot<'d>(
        &self,
        def: &'d TransformerDef,
        index: usize,
    ) -> Option<&'d TransformerChannelDef> {
        self.output_channels
            .get(index)
            .and_then(|c| def.output_channel(c.name()))
    }

    /// Checks every binding against `def`.
    pub fn validate(&self, def: &TransformerDef) -> Result<(), DefinitionError> {
        if self.name != def.name() {
            return Err(DefinitionError::Invalid(format!(
                "transformer '{}' validated against definition '{}'",
                self.name,
                def.name()
            )));
        }
        let mut seen = AHashSet::new();
        for property in &self.properties {
            let property_def = self.lookup(def, property.definition_name())?;
            if !seen.insert(property.definition_name()) && !property_def.is_repeated() {
                return Err(DefinitionError::DuplicateProperty {
                    owner: self.name.clone(),
                    property: property.definition_name().to_string(),
                });
            }
            Property::new(property_def, property.value().cloned())?;
        }
        for channel in &self.input_channels {
            Channel::new(channel.name())?;
        }
        for channel in &self.output_channels {
            Channel::new(channel.name())?;
        }
        Ok(())
    }

    fn lookup<'d>(&self, def: &'d TransformerDef, name: &str) -> Result<&'d PropertyDef, DefinitionError> {
        def.property(name)
            .ok_or_else(|| DefinitionError::UnknownProperty {
                analytic: def.name().to_string(),
                property: name.to_string(),
            })
    }
}

fn default_channels(slots: &[TransformerChannelDef]) -> Vec<Channel> {
    slots
        .iter()
        .filter(|slot| slot.is_populated_by_default())
        .map(|slot| Channel::from_slot(&slot.name))
        .collect()
}

/// Property edits, applied in call order by [`TransformerBuilder::build`].
enum PendingProperty {
    Set(String, Option<PropertyValue>),
    Add(String, PropertyValue),
    Clear(String),
}

/// Builds a [`Transformer`] starting from the definition's defaults.
pub struct TransformerBuilder<'a> {
    def: &'a TransformerDef,
    transformer: Transformer,
    pending: Vec<PendingProperty>,
}

impl<'a> TransformerBuilder<'a> {
    pub fn new(def: &'a TransformerDef) -> Self {
        Self {
            def,
            transformer: Transformer::new(def),
            pending: Vec::new(),
        }
    }

    /// Sets a property, replacing its default.
    pub fn with_property(mut self, name: &str, value: PropertyValue) -> Self {
        self.pending
            .push(PendingProperty::Set(name.to_string(), Some(value)));
        self
    }

    /// Sets an optional property to "no value".
    pub fn without_value(mut self, name: &str) -> Self {
        self.pending.push(PendingProperty::Set(name.to_string(), None));
        self
    }

    /// Binds a repeated property to `values`, one binding each, replacing any
    /// earlier bindings.
    pub fn with_repeated(mut self, name: &str, values: Vec<PropertyValue>) -> Self {
        self.pending.push(PendingProperty::Clear(name.to_string()));
        self.pending.extend(
            values
                .into_iter()
                .map(|value| PendingProperty::Add(name.to_string(), value)),
        );
        self
    }

    /// Replaces the channel instances of a slot with `count` copies.
    pub fn with_input_count(mut self, slot: &str, count: usize) -> Self {
        self.transformer.input_channels =
            resize_slot(self.def.input_channels(), &self.transformer.input_channels, slot, count);
        self
    }

    pub fn with_output_count(mut self, slot: &str, count: usize) -> Self {
        self.transformer.output_channels =
            resize_slot(self.def.output_channels(), &self.transformer.output_channels, slot, count);
        self
    }

    pub fn build(mut self) -> Result<Transformer, DefinitionError> {
        for pending in std::mem::take(&mut self.pending) {
            match pending {
                PendingProperty::Set(name, value) => {
                    self.transformer.set_property(self.def, &name, value)?
                }
                PendingProperty::Add(name, value) => {
                    self.transformer.add_property(self.def, &name, Some(value))?
                }
                PendingProperty::Clear(name) => {
                    self.transformer.remove_property(&name);
                }
            }
        }
        Ok(self.transformer)
    }
}

/// Rebuilds a channel list in slot order with `count` instances of `slot`.
fn resize_slot(
    slots: &[TransformerChannelDef],
    current: &[Channel],
    slot: &str,
    count: usize,
) -> Vec<Channel> {
    slots
        .iter()
        .flat_map(|def| {
            let n = if def.name == slot {
                count
            } else {
                current.iter().filter(|c| c.name() == def.name).count()
            };
            std::iter::repeat_n(Channel::from_slot(&def.name), n)
        })
        .collect()
}
