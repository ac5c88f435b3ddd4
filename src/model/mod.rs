//! The configuration model: transformers bound to catalog definitions,
//! arranged in rows, collected in a config.

mod channel;
mod config;
mod notify;
mod property;
mod row;
mod transformer;
mod value;

pub use channel::Channel;
pub use config::{Config, ConfigBuilder, ConfigChange};
pub use notify::{Notifier, SubscriptionId};
pub use property::Property;
pub use row::{DEFAULT_MAX_TRANSFORMER_COUNT, Row, RowBuilder, RowId};
pub use transformer::{Transformer, TransformerBuilder};
pub use value::PropertyValue;
pub(crate) use value::whole_i64;
