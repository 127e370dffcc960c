//! Inbound frame decoding: panel JSON → dispatch loop commands.

use metrics::counter;
use tracing::{debug, warn};

use vrcbridge_core::ClientMessage;
use vrcbridge_runtime::BridgeHandle;

use crate::metrics::WS_INVALID_FRAMES_TOTAL;

/// What became of one text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoded and queued on the dispatch loop.
    Submitted,
    /// Not a recognized command; logged and ignored.
    Invalid,
    /// The dispatch loop has stopped.
    LoopStopped,
}

/// Decode `text` and submit it on behalf of `conn_id`.
pub fn handle_frame(text: &str, conn_id: &str, handle: &BridgeHandle) -> FrameOutcome {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(error) => {
            warn!(conn_id, %error, len = text.len(), "invalid frame ignored");
            counter!(WS_INVALID_FRAMES_TOTAL).increment(1);
            return FrameOutcome::Invalid;
        }
    };
    debug!(conn_id, ?message, "frame decoded");
    if handle.submit(conn_id, message) {
        FrameOutcome::Submitted
    } else {
        FrameOutcome::LoopStopped
    }
}
