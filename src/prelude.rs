//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use analytics_builder::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let metadata = Metadata::from_json(&std::fs::read_to_string("path/to/catalog.json")?)?;
//! let text = std::fs::read_to_string("path/to/config.evt")?;
//!
//! let mut known = KnownChannels::new();
//! let config = EplCodec::new(&metadata).deserialize_with_registry(&text, &mut known)?;
//! config.validate_against(&metadata)?;
//!
//! println!("{} rows, channels: {:?}", config.rows().len(), known.sorted());
//! # Ok(())
//! # }
//! ```

// Catalog
pub use crate::catalog::{
    ActiveCatalog, Metadata, PropertyDef, PropertyType, TransformerChannelDef, TransformerDef,
    Validator,
};

// Configuration model
pub use crate::model::{
    Channel, Config, ConfigChange, Property, PropertyValue, Row, RowId, SubscriptionId,
    Transformer,
};

// Channels and codec
pub use crate::channels::{ChannelRegistry, KnownChannels, assign_channels};
pub use crate::codec::{CodecOptions, EplCodec};

// Error types
pub use crate::error::{CatalogError, ConfigError, DefinitionError, ParseError, SerializeError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
