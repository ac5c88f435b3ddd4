use super::channel::Channel;
use super::transformer::Transformer;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Transformer capacity given to rows that do not ask for another one.
pub const DEFAULT_MAX_TRANSFORMER_COUNT: usize = 3;

/// Process-unique identity of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        RowId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An ordered chain of transformers sharing one logical input/output pair.
///
/// A clone keeps the original's [`RowId`]; use [`Row::duplicate`] for a copy
/// with its own identity. Equality is structural and ignores the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(skip, default = "RowId::next")]
    id: RowId,
    max_transformer_count: usize,
    #[serde(default)]
    transformers: Vec<Transformer>,
    #[serde(default)]
    input_channel_overrides: BTreeMap<usize, Channel>,
    #[serde(default)]
    output_channel_overrides: BTreeMap<usize, Channel>,
}

impl Row {
    pub fn new(max_transformer_count: usize) -> Result<Self, ConfigError> {
        if max_transformer_count == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            id: RowId::next(),
            max_transformer_count,
            transformers: Vec::new(),
            input_channel_overrides: BTreeMap::new(),
            output_channel_overrides: BTreeMap::new(),
        })
    }

    pub fn builder() -> RowBuilder {
        RowBuilder::new()
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// A structural copy with a fresh identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: RowId::next(),
            ..self.clone()
        }
    }

    pub fn max_transformer_count(&self) -> usize {
        self.max_transformer_count
    }

    pub fn transformers(&self) -> &[Transformer] {
        &self.transformers
    }

    pub fn transformer_mut(&mut self, index: usize) -> Option<&mut Transformer> {
        self.transformers.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.transformers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.transformers.len() >= self.max_transformer_count
    }

    pub fn push_transformer(&mut self, transformer: Transformer) -> Result<(), ConfigError> {
        self.insert_transformer(self.transformers.len(), transformer)
    }

    pub fn insert_transformer(
        &mut self,
        index: usize,
        transformer: Transformer,
    ) -> Result<(), ConfigError> {
        if index > self.transformers.len() {
            return Err(ConfigError::IndexOutOfRange {
                index,
                len: self.transformers.len(),
            });
        }
        if self.is_full() {
            return Err(ConfigError::RowCapacityExceeded {
                max: self.max_transformer_count,
                count: self.transformers.len() + 1,
            });
        }
        self.transformers.insert(index, transformer);
        Ok(())
    }

    pub fn remove_transformer(&mut self, index: usize) -> Result<Transformer, ConfigError> {
        if index >= self.transformers.len() {
            return Err(ConfigError::IndexOutOfRange {
                index,
                len: self.transformers.len(),
            });
        }
        Ok(self.transformers.remove(index))
    }

    /// Replaces the whole chain.
    pub fn set_transformers(&mut self, transformers: Vec<Transformer>) -> Result<(), ConfigError> {
        check_capacity(self.max_transformer_count, transformers.len())?;
        self.transformers = transformers;
        Ok(())
    }

    pub fn input_channel_overrides(&self) -> &BTreeMap<usize, Channel> {
        &self.input_channel_overrides
    }

    pub fn output_channel_overrides(&self) -> &BTreeMap<usize, Channel> {
        &self.output_channel_overrides
    }

    /// Overrides (or with `None`, restores) the row input channel at `index`.
    pub fn set_input_override(&mut self, index: usize, channel: Option<Channel>) {
        match channel {
            Some(c) => self.input_channel_overrides.insert(index, c),
            None => self.input_channel_overrides.remove(&index),
        };
    }

    pub fn set_output_override(&mut self, index: usize, channel: Option<Channel>) {
        match channel {
            Some(c) => self.output_channel_overrides.insert(index, c),
            None => self.output_channel_overrides.remove(&index),
        };
    }

    /// The first transformer's inputs with overrides applied.
    pub fn effective_input_channels(&self) -> Vec<Channel> {
        self.transformers
            .first()
            .map(|t| apply_overrides(t.input_channels(), &self.input_channel_overrides))
            .unwrap_or_default()
    }

    /// The last transformer's outputs with overrides applied.
    pub fn effective_output_channels(&self) -> Vec<Channel> {
        self.transformers
            .last()
            .map(|t| apply_overrides(t.output_channels(), &self.output_channel_overrides))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_transformer_count == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        check_capacity(self.max_transformer_count, self.transformers.len())?;
        for channel in self
            .input_channel_overrides
            .values()
            .chain(self.output_channel_overrides.values())
        {
            Channel::new(channel.name())?;
        }
        Ok(())
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.max_transformer_count == other.max_transformer_count
            && self.transformers == other.transformers
            && self.input_channel_overrides == other.input_channel_overrides
            && self.output_channel_overrides == other.output_channel_overrides
    }
}

fn check_capacity(max: usize, count: usize) -> Result<(), ConfigError> {
    if count > max {
        Err(ConfigError::RowCapacityExceeded { max, count })
    } else {
        Ok(())
    }
}

fn apply_overrides(channels: &[Channel], overrides: &BTreeMap<usize, Channel>) -> Vec<Channel> {
    channels
        .iter()
        .enumerate()
        .map(|(i, c)| overrides.get(&i).unwrap_or(c).clone())
        .collect()
}

/// Builds a [`Row`].
///
/// `P` is the builder the row is nested in; a standalone builder has `P = ()`
/// and finishes with [`RowBuilder::build`], a nested one hands the row back to
/// its parent (see `ConfigBuilder::row`).
pub struct RowBuilder<P = ()> {
    parent: P,
    max_transformer_count: usize,
    transformers: Vec<Transformer>,
    input_overrides: Vec<(usize, String)>,
    output_overrides: Vec<(usize, String)>,
}

impl RowBuilder<()> {
    pub fn new() -> Self {
        Self::with_parent(())
    }

    pub fn build(self) -> Result<Row, ConfigError> {
        self.finish().1
    }
}

impl Default for RowBuilder<()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RowBuilder<P> {
    pub(crate) fn with_parent(parent: P) -> Self {
        Self {
            parent,
            max_transformer_count: DEFAULT_MAX_TRANSFORMER_COUNT,
            transformers: Vec::new(),
            input_overrides: Vec::new(),
            output_overrides: Vec::new(),
        }
    }

    pub fn with_max_transformer_count(mut self, max: usize) -> Self {
        self.max_transformer_count = max;
        self
    }

    pub fn with_transformer(mut self, transformer: Transformer) -> Self {
        self.transformers.push(transformer);
        self
    }

    pub fn with_input_override(mut self, index: usize, name: &str) -> Self {
        self.input_overrides.push((index, name.to_string()));
        self
    }

    pub fn with_output_override(mut self, index: usize, name: &str) -> Self {
        self.output_overrides.push((index, name.to_string()));
        self
    }

    /// Splits the builder into its parent and the built row.
    pub(crate) fn finish(self) -> (P, Result<Row, ConfigError>) {
        let row = build_row(
            self.max_transformer_count,
            self.transformers,
            self.input_overrides,
            self.output_overrides,
        );
        (self.parent, row)
    }
}

fn build_row(
    max_transformer_count: usize,
    transformers: Vec<Transformer>,
    input_overrides: Vec<(usize, String)>,
    output_overrides: Vec<(usize, String)>,
) -> Result<Row, ConfigError> {
    let mut row = Row::new(max_transformer_count)?;
    row.set_transformers(transformers)?;
    for (index, name) in input_overrides {
        row.set_input_override(index, Some(Channel::new(&name)?));
    }
    for (index, name) in output_overrides {
        row.set_output_override(index, Some(Channel::new(&name)?));
    }
    Ok(row)
}
