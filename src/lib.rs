//! # Analytics Builder - Pipeline Configuration Model and Text Codec
//!
//! **Analytics Builder** models analytics pipeline configurations and converts them to and
//! from a line-oriented text format. A configuration is an ordered list of rows; each row is
//! a chain of transformers, each an instance of an analytic type declared in a catalog.
//!
//! ## Core Workflow
//!
//! 1.  **Load a Catalog**: Parse the analytic catalog JSON into a [`catalog::Metadata`]. It holds
//!     every analytic definition (properties, channel slots, groups) and is never mutated;
//!     [`catalog::ActiveCatalog`] swaps whole snapshots when a new one is loaded.
//! 2.  **Read or Build a Config**: Deserialize text with an [`codec::EplCodec`] bound to the
//!     catalog, or assemble one with `Config::builder()`.
//! 3.  **Edit**: Rows and transformers validate every change against their definitions and
//!     report structural changes to subscribers.
//! 4.  **Write**: Serialize back to text. Channels between transformers of a row are written
//!     as synthesized `Row<N>:Channel<M>` links and recognised as such when read back.
//!
//! ## Quick Start
//!
//! ```rust
//! use analytics_builder::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let metadata = Metadata::from_json(r#"{
//!     "version": "1.0.0.0",
//!     "analytics": [{
//!         "name": "Threshold",
//!         "group": "Detection",
//!         "inputChannels": [{"name": "Input"}],
//!         "outputChannels": [{"name": "Output"}],
//!         "properties": [
//!             {"name": "threshold", "description": "Threshold value", "type": "decimal"}
//!         ]
//!     }]
//! }"#)?;
//!
//! let text = r#"\\ Name: Alarms
//! \\ Version: 1.0.0.0
//! \\ Row: 0
//! com.industry.analytics.Analytic("Threshold",["Temp"],["Alarm"],{"threshold":"30.0d"})
//! "#;
//!
//! let codec = EplCodec::new(&metadata);
//! let config = codec.deserialize(text)?;
//! let threshold = config.rows()[0].transformers()[0].property("threshold");
//! assert_eq!(threshold.and_then(Property::value), Some(&PropertyValue::Decimal(30.0)));
//!
//! assert_eq!(codec.serialize(&config)?, text);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod channels;
pub mod codec;
pub mod error;
pub mod model;
pub mod prelude;
