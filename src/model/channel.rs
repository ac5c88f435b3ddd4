use crate::error::DefinitionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named channel: either a transformer's channel instance or a row-level
/// override of one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel {
    name: String,
}

impl Channel {
    pub fn new(name: &str) -> Result<Self, DefinitionError> {
        if name.is_empty() {
            return Err(DefinitionError::Invalid(
                "channel name must be a non-empty string".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Caller guarantees `name` is non-empty (catalog slot names are validated).
    pub(crate) fn from_slot(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
