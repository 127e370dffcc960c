//! The subscriber seam between the dispatch loop and the gateway.

use std::sync::Arc;

use async_trait::async_trait;

/// A connected control panel, as seen by the broadcast hub.
///
/// Delivery may suspend (for example on a full outbound queue); the hub
/// awaits each subscriber in turn. Returning `false` marks the subscriber
/// dead and it is pruned after the current broadcast pass.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Stable connection id.
    fn id(&self) -> &str;

    /// Deliver one serialized frame.
    async fn deliver(&self, payload: Arc<String>) -> bool;
}
