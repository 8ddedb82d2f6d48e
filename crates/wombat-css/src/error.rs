//! Layout errors.

use thiserror::Error;

use crate::layout::inline::run::AttachmentId;

/// Contract violations reported by the checked accessors of the layout
/// engine.
///
/// Recoverable conditions (unknown tags, malformed declarations, a
/// measurement race) are never errors; they degrade in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A frame was requested for an identity the engine never registered.
    #[error("attachment {0} is not part of the current run")]
    UnknownAttachment(AttachmentId),
}
