//! Attribute constraints for offloaded messages.

use std::collections::HashMap;

use tracing::error;

use crate::constants::{MAX_ALLOWED_ATTRIBUTES, RESERVED_ATTRIBUTE_NAME};
use crate::error::OffloadError;
use crate::message::AttributeValue;

/// Reject attribute maps with more than [`MAX_ALLOWED_ATTRIBUTES`] entries.
pub fn validate_count(attributes: &HashMap<String, AttributeValue>) -> Result<(), OffloadError> {
    let count = attributes.len();
    if count > MAX_ALLOWED_ATTRIBUTES {
        let err = OffloadError::TooManyAttributes {
            count,
            max: MAX_ALLOWED_ATTRIBUTES,
        };
        error!(count, max = MAX_ALLOWED_ATTRIBUTES, "{err}");
        return Err(err);
    }
    Ok(())
}

/// Reject attribute maps that already use [`RESERVED_ATTRIBUTE_NAME`].
pub fn validate_reserved_name_absent(
    attributes: &HashMap<String, AttributeValue>,
) -> Result<(), OffloadError> {
    if attributes.contains_key(RESERVED_ATTRIBUTE_NAME) {
        let err = OffloadError::ReservedAttributeName(RESERVED_ATTRIBUTE_NAME.to_owned());
        error!("{err}");
        return Err(err);
    }
    Ok(())
}

/// Reject an attribute size above `threshold`.
pub fn validate_total_size(threshold: usize, size: usize) -> Result<(), OffloadError> {
    if size > threshold {
        let err = OffloadError::AttributeSizeExceeded { size, threshold };
        error!(size, threshold, "{err}");
        return Err(err);
    }
    Ok(())
}
