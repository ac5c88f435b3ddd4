use super::CodecOptions;
use super::grammar::{self, AnalyticLine, Line};
use super::properties::{PropertyBlock, coerce};
use crate::catalog::{Metadata, PropertyDef, TransformerChannelDef, TransformerDef};
use crate::channels::{ChannelRegistry, assign_channels};
use crate::error::{CatalogError, ConfigError, DefinitionError, ParseError};
use crate::model::{Channel, Config, PropertyValue, Row, Transformer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Analytic lines sharing one `\\ Row:` marker (or none, for the lines before
/// the first marker).
#[derive(Debug, Default)]
struct RowGroup<'a> {
    lines: Vec<(usize, AnalyticLine<'a>)>,
}

/// Why a row group did not become a [`Row`].
enum RowGroupError {
    /// The group holds no analytics and is left out of the config.
    IgnorableRow,
    Fatal(ParseError),
}

impl From<ParseError> for RowGroupError {
    fn from(error: ParseError) -> Self {
        RowGroupError::Fatal(error)
    }
}

impl From<CatalogError> for RowGroupError {
    fn from(error: CatalogError) -> Self {
        RowGroupError::Fatal(error.into())
    }
}

impl From<ConfigError> for RowGroupError {
    fn from(error: ConfigError) -> Self {
        RowGroupError::Fatal(error.into())
    }
}

#[derive(Debug, Default)]
struct Header {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
}

/// Reads one text configuration against one catalog snapshot.
pub(crate) struct Deserializer<'a, R: ChannelRegistry + ?Sized> {
    metadata: &'a Metadata,
    options: &'a CodecOptions,
    registry: &'a mut R,
}

impl<'a, R: ChannelRegistry + ?Sized> Deserializer<'a, R> {
    pub(crate) fn new(metadata: &'a Metadata, options: &'a CodecOptions, registry: &'a mut R) -> Self {
        Self {
            metadata,
            options,
            registry,
        }
    }

    pub(crate) fn deserialize(&mut self, text: &str) -> Result<Config, ParseError> {
        let mut header = Header::default();
        let mut groups: Vec<RowGroup<'_>> = Vec::new();

        for (index, raw_line) in text.lines().enumerate() {
            if raw_line.trim().is_empty() {
                continue;
            }
            let line_number = index + 1;
            match grammar::classify(raw_line) {
                Some(Line::Marker { key, value }) => match key {
                    "Name" => header.name = Some(value.trim().to_string()),
                    "Description" => header.description = Some(value.to_string()),
                    "Version" => header.version = Some(value.to_string()),
                    "Row" => groups.push(RowGroup::default()),
                    _ => trace!(line_number, key, "Ignoring unknown marker"),
                },
                Some(Line::Comment) => {}
                Some(Line::Analytic(analytic)) => {
                    if groups.is_empty() {
                        groups.push(RowGroup::default());
                    }
                    if let Some(group) = groups.last_mut() {
                        group.lines.push((line_number, analytic));
                    }
                }
                None => {
                    return Err(ParseError::MalformedLine {
                        line_number,
                        line: raw_line.to_string(),
                    });
                }
            }
        }

        let name = header
            .name
            .filter(|n| !n.is_empty())
            .ok_or(ParseError::MissingName)?;

        let mut builder = Config::builder().with_name(&name);
        if let Some(description) = &header.description {
            builder = builder.with_description(description);
        }
        if let Some(version) = &header.version {
            builder = builder.with_metadata_version(version);
        }

        let mut referenced = Vec::new();
        for (index, group) in groups.iter().enumerate() {
            match self.build_row(group, &mut referenced) {
                Ok(row) => {
                    debug!(group = index, transformers = row.transformers().len(), "Parsed row");
                    builder = builder.with_row(row);
                }
                Err(RowGroupError::IgnorableRow) => {
                    debug!(group = index, "Dropping row group without analytics");
                }
                Err(RowGroupError::Fatal(error)) => return Err(error),
            }
        }

        let config = builder.build()?;
        for name in &referenced {
            self.registry.add(name);
        }
        Ok(config)
    }

    /// Builds the row of one group, appending every non-empty channel name it
    /// references to `referenced`.
    fn build_row<'g>(
        &self,
        group: &'g RowGroup<'_>,
        referenced: &mut Vec<&'g str>,
    ) -> Result<Row, RowGroupError> {
        let Some(last) = group.lines.len().checked_sub(1) else {
            return Err(RowGroupError::IgnorableRow);
        };

        let mut row = Row::new(self.options.max_transformer_count)?;
        let mut transformers = Vec::with_capacity(group.lines.len());

        for (position, (line_number, line)) in group.lines.iter().enumerate() {
            debug!(line_number, analytic = %line.name, namespace = line.namespace, "Parsing analytic");
            let def = self.metadata.get_analytic(&line.name)?;
            referenced.extend(
                line.inputs
                    .iter()
                    .chain(&line.outputs)
                    .map(String::as_str)
                    .filter(|name| !name.is_empty()),
            );

            let (inputs, input_names) = bind_channels(&line.inputs, def.input_channels());
            let (outputs, output_names) = bind_channels(&line.outputs, def.output_channels());
            trace!(analytic = %line.name, ?input_names, ?output_names, "Assigned channels");

            if position == 0 {
                for (index, channel) in overrides(&input_names, &inputs)? {
                    row.set_input_override(index, Some(channel));
                }
            }
            if position == last {
                for (index, channel) in overrides(&output_names, &outputs)? {
                    row.set_output_override(index, Some(channel));
                }
            }

            let defaults = Transformer::new(def).properties().to_vec();
            let mut transformer = Transformer::from_parts(def.name(), defaults, inputs, outputs);
            self.apply_properties(&mut transformer, def, line)?;
            transformers.push(transformer);
        }

        row.set_transformers(transformers)?;
        Ok(row)
    }

    fn apply_properties(
        &self,
        transformer: &mut Transformer,
        def: &TransformerDef,
        line: &AnalyticLine<'_>,
    ) -> Result<(), ParseError> {
        let block = PropertyBlock::parse(line.properties).map_err(|message| {
            ParseError::MalformedPropertyBlock {
                analytic: line.name.clone(),
                block: line.properties.to_string(),
                message,
            }
        })?;

        for (key, value) in block.0 {
            let Some(property_def) = def.property(&key) else {
                if self.options.strict_properties {
                    return Err(ParseError::UnknownProperty {
                        analytic: line.name.clone(),
                        property: key,
                    });
                }
                warn!(analytic = %line.name, property = %key, "Dropping unknown property");
                continue;
            };

            let invalid = |source: DefinitionError| ParseError::InvalidProperty {
                analytic: line.name.clone(),
                source,
            };

            if property_def.is_repeated() {
                let elements = match value {
                    Value::Array(elements) => elements,
                    scalar => vec![scalar],
                };
                for element in elements {
                    let typed = typed_value(&element, property_def, &line.name)?;
                    transformer
                        .add_property(def, &key, typed)
                        .map_err(invalid)?;
                }
            } else {
                let typed = typed_value(&value, property_def, &line.name)?;
                transformer
                    .set_property(def, &key, typed)
                    .map_err(invalid)?;
            }
        }
        Ok(())
    }
}

/// Coerces one literal; `null` stands for "no value".
fn typed_value(
    value: &Value,
    def: &PropertyDef,
    analytic: &str,
) -> Result<Option<PropertyValue>, ParseError> {
    if value.is_null() {
        return Ok(None);
    }
    coerce(value, def.property_type())
        .map(Some)
        .ok_or_else(|| ParseError::PropertyTypeMismatch {
            value: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
            analytic: analytic.to_string(),
            property: def.name().to_string(),
            expected: def.property_type(),
        })
}

/// Channel instances for one side of an analytic, in slot order, together
/// with the (prefix-stripped) name each one was given.
fn bind_channels(names: &[String], slots: &[TransformerChannelDef]) -> (Vec<Channel>, Vec<String>) {
    let names: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !n.is_empty())
        .collect();
    assign_channels(&names, slots)
        .into_iter()
        .flat_map(|assignment| {
            let slot = assignment.def.name.as_str();
            assignment
                .names
                .into_iter()
                .map(move |name| (Channel::from_slot(slot), name))
        })
        .unzip()
}

/// User-chosen endpoint names: everything that is neither a synthesized
/// `Row<N>:Channel<M>` link nor the slot's own name.
fn overrides(names: &[String], channels: &[Channel]) -> Result<BTreeMap<usize, Channel>, ConfigError> {
    let mut overrides = BTreeMap::new();
    for (index, (name, channel)) in names.iter().zip(channels).enumerate() {
        if name.starts_with("Row") || name == channel.name() {
            continue;
        }
        overrides.insert(index, Channel::new(name)?);
    }
    Ok(overrides)
}
