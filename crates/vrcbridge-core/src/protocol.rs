//! JSON frames exchanged with control panels over the WebSocket.
//!
//! Both directions are internally tagged on `type`. Decoding and encoding
//! happen only at the socket boundary; everything inside the bridge works
//! with these enums.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parameter::{Category, ParameterView};
use crate::value::ParamValue;

/// Server → panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Base registry snapshot, sent once on connect.
    Init {
        /// Built-in parameters in catalog order.
        parameters: Vec<ParameterView>,
    },
    /// A value reported by VRChat.
    Output {
        /// Parameter name.
        name: String,
        /// New value.
        value: ParamValue,
        /// Parameter category.
        category: Category,
    },
    /// A value set by a panel and forwarded to VRChat.
    Input {
        /// Parameter name.
        name: String,
        /// Value as sent to VRChat.
        value: ParamValue,
        /// Parameter category.
        category: Category,
    },
    /// Parameters discovered for the avatar just loaded.
    CustomParams {
        /// Avatar display name from its definition file.
        #[serde(rename = "avatarName")]
        avatar_name: String,
        /// The accepted dynamic set.
        parameters: Vec<ParameterView>,
    },
    /// The previous avatar's parameters are gone.
    ClearCustomParams,
}

impl ServerMessage {
    /// The `type` tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Output { .. } => "output",
            Self::Input { .. } => "input",
            Self::CustomParams { .. } => "custom_params",
            Self::ClearCustomParams => "clear_custom_params",
        }
    }
}

/// Panel → server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Set a parameter by name.
    Set {
        /// Parameter name.
        name: String,
        /// Raw value; coerced to the parameter's type by the bridge.
        value: Value,
    },
    /// Send chatbox text.
    Chatbox {
        /// Message text.
        #[serde(default)]
        text: String,
        /// Send immediately instead of opening the keyboard.
        #[serde(default = "default_true")]
        send: bool,
        /// Play the notification sound.
        #[serde(default = "default_true")]
        notification: bool,
    },
}

fn default_true() -> bool {
    true
}
