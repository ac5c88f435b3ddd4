use ahash::AHashSet;
use itertools::Itertools;

/// Sink for every channel name seen while reading configurations, used to
/// offer known channels for selection.
pub trait ChannelRegistry {
    fn add(&mut self, name: &str);
    fn clear(&mut self);
}

/// In-memory [`ChannelRegistry`].
#[derive(Debug, Clone, Default)]
pub struct KnownChannels {
    names: AHashSet<String>,
}

impl KnownChannels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Known names in lexical order.
    pub fn sorted(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).sorted().collect()
    }
}

impl ChannelRegistry for KnownChannels {
    fn add(&mut self, name: &str) {
        if !name.is_empty() && !self.names.contains(name) {
            self.names.insert(name.to_string());
        }
    }

    fn clear(&mut self) {
        self.names.clear();
    }
}

/// A registry that discards everything.
impl ChannelRegistry for () {
    fn add(&mut self, _name: &str) {}
    fn clear(&mut self) {}
}
