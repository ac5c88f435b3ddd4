//! The analytic catalog: static definitions of every analytic type a
//! configuration may instantiate.

use crate::error::CatalogError;
use crate::model::{Notifier, SubscriptionId, Transformer};
use ahash::AHashMap;
use itertools::Itertools;
use std::sync::Arc;

mod definition;
pub mod raw;
mod validator;

pub use definition::{PropertyDef, PropertyType, TransformerChannelDef, TransformerDef};
pub use raw::{RawChannelDef, RawMetadata, RawPropertyDef, RawTransformerDef, RawValidator};
pub use validator::Validator;

/// An immutable catalog of analytic definitions, unique by name.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    version: String,
    group_order: Vec<String>,
    analytics: Vec<TransformerDef>,
    index: AHashMap<String, usize>,
    samples: Vec<String>,
    raw: RawMetadata,
}

impl Metadata {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawMetadata =
            serde_json::from_str(json).map_err(|e| CatalogError::Json(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawMetadata) -> Result<Self, CatalogError> {
        let mut analytics = Vec::with_capacity(raw.analytics.len());
        let mut index = AHashMap::with_capacity(raw.analytics.len());
        for raw_def in raw.analytics.iter().cloned() {
            let def = TransformerDef::try_from(raw_def)?;
            if index.insert(def.name().to_string(), analytics.len()).is_some() {
                return Err(CatalogError::DuplicateAnalytic(def.name().to_string()));
            }
            analytics.push(def);
        }
        Ok(Self {
            version: raw.version.clone(),
            group_order: raw.group_order.clone(),
            analytics,
            index,
            samples: raw.samples.clone(),
            raw,
        })
    }

    /// Builds a new catalog holding every current definition plus `def`.
    /// `self` is left untouched.
    pub fn with_analytic(&self, def: RawTransformerDef) -> Result<Self, CatalogError> {
        let mut raw = self.raw.clone();
        raw.analytics.push(def);
        Self::from_raw(raw)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn group_order(&self) -> &[String] {
        &self.group_order
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn analytics(&self) -> &[TransformerDef] {
        &self.analytics
    }

    pub fn raw(&self) -> &RawMetadata {
        &self.raw
    }

    pub fn get_analytic(&self, name: &str) -> Result<&TransformerDef, CatalogError> {
        self.index
            .get(name)
            .map(|&i| &self.analytics[i])
            .ok_or_else(|| CatalogError::UnknownAnalytic(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Instantiates `name` with only its required, non-repeated properties,
    /// each set to its default.
    pub fn create_analytic(&self, name: &str) -> Result<Transformer, CatalogError> {
        Ok(Transformer::new(self.get_analytic(name)?))
    }

    /// Analytics grouped for display: groups listed in `groupOrder` first, in
    /// that order, then the remaining groups alphabetically. Within a group,
    /// analytics are sorted by name.
    pub fn analytics_by_group(&self) -> Vec<(String, Vec<&TransformerDef>)> {
        let rank = |group: &str| {
            self.group_order
                .iter()
                .position(|g| g == group)
                .unwrap_or(self.group_order.len())
        };
        let groups = self
            .analytics
            .iter()
            .sorted_by(|a, b| {
                rank(a.group())
                    .cmp(&rank(b.group()))
                    .then_with(|| a.group().cmp(b.group()))
                    .then_with(|| a.name().cmp(b.name()))
            })
            .chunk_by(|def| def.group().to_string());
        let result = groups
            .into_iter()
            .map(|(group, defs)| (group, defs.collect()))
            .collect();
        result
    }
}

/// The process-wide current catalog.
///
/// The catalog is never mutated in place: every load builds a fresh
/// `Metadata` and swaps the shared pointer, so readers holding an older
/// snapshot keep a consistent view.
#[derive(Debug, Default)]
pub struct ActiveCatalog {
    current: Arc<Metadata>,
    notifier: Notifier<Arc<Metadata>>,
}

impl ActiveCatalog {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            current: Arc::new(metadata),
            notifier: Notifier::default(),
        }
    }

    pub fn get(&self) -> Arc<Metadata> {
        Arc::clone(&self.current)
    }

    pub fn replace(&mut self, metadata: Metadata) {
        tracing::info!(
            version = metadata.version(),
            analytics = metadata.analytics().len(),
            "Active catalog replaced"
        );
        self.current = Arc::new(metadata);
        let snapshot = Arc::clone(&self.current);
        self.notifier.notify(&snapshot);
    }

    pub fn load_metadata(&mut self, json: &str) -> Result<(), CatalogError> {
        let metadata = Metadata::from_json(json)?;
        self.replace(metadata);
        Ok(())
    }

    pub fn load_analytic(&mut self, def: RawTransformerDef) -> Result<(), CatalogError> {
        let metadata = self.current.with_analytic(def)?;
        self.replace(metadata);
        Ok(())
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Arc<Metadata>) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }
}
