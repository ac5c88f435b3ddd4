//! Channel-name handling shared by the codec: binding flat name lists to
//! channel slots, and the registry of channel names seen so far.

mod registry;
mod rules;

pub use registry::{ChannelRegistry, KnownChannels};
pub use rules::{ChannelAssignment, assign_channels};
