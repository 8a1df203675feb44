//! Outbound message transport seam.
//!
//! The conversational transport (Telegram, Matrix, web chat, ...) lives
//! outside this crate; the notifier only needs to send a message and later
//! edit it in place. Both operations are best-effort.

use async_trait::async_trait;

use crate::error::TransportError;

/// Handle to a previously sent message, used for in-place edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle(pub String);

/// Best-effort outbound messaging to the requester's conversation.
///
/// Must tolerate concurrent access from multiple independent jobs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a new visible message, returning a handle for later edits.
    async fn send_message(&self, text: &str) -> Result<MessageHandle, TransportError>;

    /// Update an existing message in place.
    async fn edit_message(&self, handle: &MessageHandle, text: &str)
        -> Result<(), TransportError>;
}
