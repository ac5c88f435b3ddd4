//! Reading and writing configurations in the line-oriented analytics text
//! format.
//!
//! A codec is bound to one catalog snapshot: every analytic name in the text
//! is resolved against it, and the serializer consults it to re-apply channel
//! prefixes.
//!
//! ```ignore
//! let codec = EplCodec::builder(&metadata)
//!     .with_namespace("com.industry.analytics")
//!     .with_strict_properties(true)
//!     .build();
//! let config = codec.deserialize(&text)?;
//! assert_eq!(codec.serialize(&config)?, text);
//! ```

use crate::catalog::Metadata;
use crate::channels::ChannelRegistry;
use crate::error::{ParseError, SerializeError};
use crate::model::{Config, DEFAULT_MAX_TRANSFORMER_COUNT};

mod deserializer;
mod grammar;
mod properties;
mod serializer;

use deserializer::Deserializer;

/// Namespace written in front of every `Analytic(...)` call.
pub const DEFAULT_NAMESPACE: &str = "com.industry.analytics";

/// Version written when a config does not carry one.
pub const DEFAULT_VERSION: &str = "0.0.0.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOptions {
    pub namespace: String,
    /// Capacity given to every row read from text.
    pub max_transformer_count: usize,
    /// Fail on property keys the analytic does not define instead of
    /// dropping them.
    pub strict_properties: bool,
    pub default_version: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_transformer_count: DEFAULT_MAX_TRANSFORMER_COUNT,
            strict_properties: false,
            default_version: DEFAULT_VERSION.to_string(),
        }
    }
}

pub struct EplCodec<'m> {
    metadata: &'m Metadata,
    options: CodecOptions,
}

pub struct EplCodecBuilder<'m> {
    metadata: &'m Metadata,
    options: CodecOptions,
}

impl<'m> EplCodecBuilder<'m> {
    pub fn new(metadata: &'m Metadata) -> Self {
        Self {
            metadata,
            options: CodecOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.options.namespace = namespace.to_string();
        self
    }

    pub fn with_max_transformer_count(mut self, max: usize) -> Self {
        self.options.max_transformer_count = max;
        self
    }

    pub fn with_strict_properties(mut self, strict: bool) -> Self {
        self.options.strict_properties = strict;
        self
    }

    pub fn with_default_version(mut self, version: &str) -> Self {
        self.options.default_version = version.to_string();
        self
    }

    pub fn build(self) -> EplCodec<'m> {
        EplCodec {
            metadata: self.metadata,
            options: self.options,
        }
    }
}

impl<'m> EplCodec<'m> {
    pub fn new(metadata: &'m Metadata) -> Self {
        EplCodecBuilder::new(metadata).build()
    }

    pub fn builder(metadata: &'m Metadata) -> EplCodecBuilder<'m> {
        EplCodecBuilder::new(metadata)
    }

    pub fn metadata(&self) -> &'m Metadata {
        self.metadata
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Reads a text configuration. Either the whole text is accepted or an
    /// error is returned; no partial config is produced.
    pub fn deserialize(&self, text: &str) -> Result<Config, ParseError> {
        self.deserialize_with_registry(text, &mut ())
    }

    /// Like [`EplCodec::deserialize`], additionally recording every channel
    /// name the text references in `registry`.
    pub fn deserialize_with_registry<R: ChannelRegistry + ?Sized>(
        &self,
        text: &str,
        registry: &mut R,
    ) -> Result<Config, ParseError> {
        Deserializer::new(self.metadata, &self.options, registry).deserialize(text)
    }

    pub fn serialize(&self, config: &Config) -> Result<String, SerializeError> {
        serializer::serialize(config, self.metadata, &self.options)
    }
}
