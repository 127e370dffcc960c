//! Subscriber-issued commands.

use tracing::{debug, warn};

use vrcbridge_core::constants::CHATBOX_INPUT_ADDRESS;
use vrcbridge_core::{ClientMessage, CoercionError, ParamValue, ServerMessage};
use vrcbridge_osc::OscSender;

use crate::hub::BroadcastHub;
use crate::metrics::COMMANDS_TOTAL;
use crate::registry::Registry;

/// What a command did.
#[derive(Debug, PartialEq)]
pub enum CommandOutcome {
    /// The value was sent to VRChat, stored, and broadcast as `input`.
    Sent {
        /// Parameter name.
        name: String,
        /// Coerced value.
        value: ParamValue,
    },
    /// Chatbox text was sent.
    Chatbox,
    /// No parameter has that name; nothing was sent.
    UnknownParameter {
        /// Requested name.
        name: String,
    },
    /// The value could not be converted to the parameter's type; nothing
    /// was sent.
    Rejected {
        /// Parameter name.
        name: String,
        /// Why coercion failed.
        error: CoercionError,
    },
}

impl CommandOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Sent { .. } | Self::Chatbox => "accepted",
            Self::UnknownParameter { .. } => "unknown",
            Self::Rejected { .. } => "rejected",
        }
    }
}

/// Apply one command.
///
/// An accepted `set` is echoed to every subscriber, including the one that
/// issued it, so all panels converge on the same value.
pub async fn handle_command(
    message: ClientMessage,
    registry: &mut Registry,
    sender: &dyn OscSender,
    hub: &mut BroadcastHub,
) -> CommandOutcome {
    let (kind, outcome) = match message {
        ClientMessage::Set { name, value } => ("set", set(name, &value, registry, sender, hub).await),
        ClientMessage::Chatbox {
            text,
            send,
            notification,
        } => {
            sender.send(
                CHATBOX_INPUT_ADDRESS,
                &[
                    ParamValue::String(text),
                    ParamValue::Bool(send),
                    ParamValue::Bool(notification),
                ],
            );
            ("chatbox", CommandOutcome::Chatbox)
        }
    };
    metrics::counter!(COMMANDS_TOTAL, "type" => kind, "outcome" => outcome.label()).increment(1);
    outcome
}

async fn set(
    name: String,
    raw: &serde_json::Value,
    registry: &mut Registry,
    sender: &dyn OscSender,
    hub: &mut BroadcastHub,
) -> CommandOutcome {
    let Some(param) = registry.lookup_by_name_mut(&name) else {
        warn!(name = %name, "set for unknown parameter ignored");
        return CommandOutcome::UnknownParameter { name };
    };

    let value = match param.param_type.coerce_json(raw) {
        Ok(value) => value,
        Err(error) => {
            warn!(name = %name, %error, "set value rejected");
            return CommandOutcome::Rejected { name, error };
        }
    };

    sender.send(&param.address, std::slice::from_ref(&value));
    param.value = Some(value.clone());
    let category = param.category;
    debug!(name = %name, %value, "parameter set");

    let _ = hub
        .broadcast(&ServerMessage::Input {
            name: name.clone(),
            value: value.clone(),
            category,
        })
        .await;
    CommandOutcome::Sent { name, value }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
