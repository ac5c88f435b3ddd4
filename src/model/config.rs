use super::notify::{Notifier, SubscriptionId};
use super::row::{Row, RowBuilder, RowId};
use crate::catalog::Metadata;
use crate::error::ConfigError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Structural change of a [`Config`] or of one of its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigChange {
    NameChanged,
    DescriptionChanged,
    MetadataVersionChanged,
    RowAdded { id: RowId, index: usize },
    RowRemoved { id: RowId, index: usize },
    RowMoved { id: RowId, from: usize, to: usize },
    RowChanged { id: RowId },
}

/// A complete pipeline configuration: an ordered list of unique rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata_version: Option<String>,
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(skip)]
    notifier: Notifier<ConfigChange>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The description, `""` when none was given.
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn metadata_version(&self) -> Option<&str> {
        self.metadata_version.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
        self.notifier.notify(&ConfigChange::NameChanged);
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.notifier.notify(&ConfigChange::DescriptionChanged);
    }

    pub fn set_metadata_version(&mut self, version: Option<String>) {
        self.metadata_version = version;
        self.notifier.notify(&ConfigChange::MetadataVersionChanged);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn row_index(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id() == id)
    }

    pub fn add_row(&mut self, row: Row) -> Result<(), ConfigError> {
        self.insert_row(self.rows.len(), row)
    }

    pub fn insert_row(&mut self, index: usize, row: Row) -> Result<(), ConfigError> {
        if self.row_index(row.id()).is_some() {
            return Err(ConfigError::DuplicateRow(row.id()));
        }
        if index > self.rows.len() {
            return Err(ConfigError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let id = row.id();
        self.rows.insert(index, row);
        self.notifier.notify(&ConfigChange::RowAdded { id, index });
        Ok(())
    }

    /// Removes the row with `id`, returning whether it was present.
    pub fn remove_row(&mut self, id: RowId) -> bool {
        match self.row_index(id) {
            Some(index) => {
                self.rows.remove(index);
                self.notifier.notify(&ConfigChange::RowRemoved { id, index });
                true
            }
            None => false,
        }
    }

    /// Moves the row at `from` so it ends up at `to`. Both indices must be
    /// within the current bounds.
    pub fn move_row(&mut self, from: usize, to: usize) -> Result<(), ConfigError> {
        let len = self.rows.len();
        for index in [from, to] {
            if index >= len {
                return Err(ConfigError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        let row = self.rows.remove(from);
        let id = row.id();
        self.rows.insert(to, row);
        self.notifier.notify(&ConfigChange::RowMoved { id, from, to });
        Ok(())
    }

    /// Mutates one row in place and notifies listeners afterwards.
    pub fn update_row<T, F>(&mut self, id: RowId, update: F) -> Result<T, ConfigError>
    where
        F: FnOnce(&mut Row) -> T,
    {
        let index = self.row_index(id).ok_or(ConfigError::RowNotFound(id))?;
        let result = update(&mut self.rows[index]);
        self.notifier.notify(&ConfigChange::RowChanged { id });
        Ok(result)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ConfigChange) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Structural invariants: unique rows, each within its capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = AHashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if !seen.insert(row.id()) {
                return Err(ConfigError::DuplicateRow(row.id()));
            }
            row.validate()?;
        }
        Ok(())
    }

    /// Structural invariants plus every transformer checked against `metadata`.
    pub fn validate_against(&self, metadata: &Metadata) -> Result<(), ConfigError> {
        self.validate()?;
        for row in &self.rows {
            for transformer in row.transformers() {
                let def = metadata.get_analytic(transformer.name())?;
                transformer.validate(def)?;
            }
        }
        if let Some(version) = self.metadata_version() {
            if !metadata.version().is_empty() && version != metadata.version() {
                tracing::warn!(
                    config_version = version,
                    catalog_version = metadata.version(),
                    "Config was written against a different catalog version"
                );
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.metadata_version == other.metadata_version
            && self.rows == other.rows
    }
}

/// Builds a [`Config`], with rows built in place through [`ConfigBuilder::row`].
#[derive(Default)]
pub struct ConfigBuilder {
    name: Option<String>,
    description: Option<String>,
    metadata_version: Option<String>,
    rows: Vec<Result<Row, ConfigError>>,
}

impl ConfigBuilder {
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_metadata_version(mut self, version: &str) -> Self {
        self.metadata_version = Some(version.to_string());
        self
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(Ok(row));
        self
    }

    /// Opens a nested row builder; [`RowBuilder::end_row`] returns here.
    pub fn row(self) -> RowBuilder<ConfigBuilder> {
        RowBuilder::with_parent(self)
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = Config {
            name: self.name,
            description: self.description,
            metadata_version: self.metadata_version,
            ..Config::default()
        };
        for row in self.rows {
            config.add_row(row?)?;
        }
        Ok(config)
    }
}

impl RowBuilder<ConfigBuilder> {
    /// Closes the row and hands it to the enclosing config builder.
    pub fn end_row(self) -> ConfigBuilder {
        let (mut parent, row) = self.finish();
        parent.rows.push(row);
        parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn three_rows() -> Config {
        Config::builder()
            .with_name("Rows")
            .row()
            .end_row()
            .row()
            .with_max_transformer_count(2)
            .end_row()
            .row()
            .with_max_transformer_count(1)
            .end_row()
            .build()
            .unwrap()
    }

    fn capacities(config: &Config) -> Vec<usize> {
        config
            .rows()
            .iter()
            .map(Row::max_transformer_count)
            .collect()
    }

    #[test]
    fn move_row_reorders_and_keeps_length() {
        let mut config = three_rows();
        config.move_row(0, 2).unwrap();
        assert_eq!(capacities(&config), vec![2, 1, 3]);
        config.move_row(1, 1).unwrap();
        assert_eq!(capacities(&config), vec![2, 1, 3]);
    }

    #[test]
    fn move_row_out_of_bounds_fails() {
        let mut config = three_rows();
        assert_eq!(
            config.move_row(3, 0),
            Err(ConfigError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert!(config.move_row(0, 3).is_err());
        assert_eq!(capacities(&config), vec![3, 2, 1]);
    }

    #[test]
    fn duplicate_row_identity_is_rejected() {
        let mut config = Config::new();
        let row = Row::new(3).unwrap();
        config.add_row(row.clone()).unwrap();
        assert_eq!(config.add_row(row.clone()), Err(ConfigError::DuplicateRow(row.id())));
        config.add_row(row.duplicate()).unwrap();
        assert_eq!(config.rows().len(), 2);
    }

    #[test]
    fn remove_row_reports_presence() {
        let mut config = three_rows();
        let id = config.rows()[1].id();
        assert!(config.remove_row(id));
        assert!(!config.remove_row(id));
        assert_eq!(config.rows().len(), 2);
    }

    #[test]
    fn listeners_see_descendant_changes() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut config = three_rows();
        let sink = Rc::clone(&events);
        config.subscribe(move |e| sink.borrow_mut().push(*e));

        let id = config.rows()[0].id();
        config
            .update_row(id, |row| row.set_input_override(0, None))
            .unwrap();
        config.set_name(Some("Renamed".into()));

        assert_eq!(
            *events.borrow(),
            vec![ConfigChange::RowChanged { id }, ConfigChange::NameChanged]
        );
    }

    #[test]
    fn json_round_trip_is_structural() {
        let config = three_rows();
        let restored = Config::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(restored, config);
        assert_ne!(restored.rows()[0].id(), config.rows()[0].id());
    }
}
