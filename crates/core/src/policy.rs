//! The offload decision.

use crate::config::OffloadConfig;

/// Whether a message of `total_size` bytes (body plus caller attributes) must
/// have its body moved to the payload store.
///
/// `always_through_store` forces offload regardless of size. Otherwise offload
/// happens when payload support is enabled and the size is strictly above the
/// threshold. Multi-protocol messages are rejected before this is consulted.
pub fn should_offload(config: &OffloadConfig, total_size: usize) -> bool {
    config.always_through_store()
        || (config.payload_support_enabled() && total_size > config.payload_size_threshold())
}
