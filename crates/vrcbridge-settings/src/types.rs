//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a settings
//! file only needs the keys it changes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "osc": { "sendPort": 9000, "receivePort": 9001 },
///   "web": { "port": 8080 },
///   "avatar": { "oscDir": "D:/VRChat/OSC" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeSettings {
    /// Control-protocol endpoints.
    pub osc: OscSettings,
    /// HTTP / WebSocket gateway.
    pub web: WebSettings,
    /// Avatar definition discovery.
    pub avatar: AvatarSettings,
    /// Dispatch loop tuning.
    pub runtime: RuntimeSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

impl BridgeSettings {
    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.web.outbound_buffer == 0 {
            return Err(SettingsError::InvalidValue(
                "web.outboundBuffer must be positive".into(),
            ));
        }
        if self.web.max_message_size == 0 {
            return Err(SettingsError::InvalidValue(
                "web.maxMessageSize must be positive".into(),
            ));
        }
        if self.runtime.poll_interval_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "runtime.pollIntervalMs must be positive".into(),
            ));
        }
        if self.osc.send_port == 0 || self.osc.receive_port == 0 {
            return Err(SettingsError::InvalidValue(
                "osc ports must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// UDP endpoints for talking to VRChat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OscSettings {
    /// Where VRChat listens.
    pub send_host: String,
    /// VRChat's input port.
    pub send_port: u16,
    /// Local bind address for VRChat's output.
    pub receive_host: String,
    /// VRChat's output port.
    pub receive_port: u16,
}

impl Default for OscSettings {
    fn default() -> Self {
        Self {
            send_host: "127.0.0.1".to_string(),
            send_port: 9000,
            receive_host: "0.0.0.0".to_string(),
            receive_port: 9001,
        }
    }
}

/// Gateway settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebSettings {
    /// Bind address.
    pub host: String,
    /// HTTP / WebSocket port.
    pub port: u16,
    /// Directory holding `index.html` and the panel assets.
    pub static_dir: PathBuf,
    /// Per-connection outbound queue capacity.
    pub outbound_buffer: usize,
    /// Largest accepted inbound frame, in bytes.
    pub max_message_size: usize,
    /// Interval between keepalive pings, in seconds.
    pub heartbeat_interval_secs: u64,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("static"),
            outbound_buffer: 1024,
            max_message_size: 1024 * 1024,
            heartbeat_interval_secs: 30,
        }
    }
}

/// Avatar definition discovery.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvatarSettings {
    /// VRChat's `OSC` directory. Derived from the platform when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub osc_dir: Option<PathBuf>,
}

/// Dispatch loop tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeSettings {
    /// How long the dispatch loop waits on its queue before re-checking for
    /// shutdown.
    pub poll_interval_ms: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

/// Log output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of compact text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(BridgeSettings::default()).unwrap();
        assert_eq!(json["osc"]["sendPort"], 9000);
        assert_eq!(json["osc"]["receiveHost"], "0.0.0.0");
        assert_eq!(json["web"]["staticDir"], "static");
        assert_eq!(json["runtime"]["pollIntervalMs"], 100);
        assert!(json["avatar"].get("oscDir").is_none());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: BridgeSettings =
            serde_json::from_str(r#"{"web": {"port": 9999}}"#).unwrap();
        assert_eq!(settings.web.port, 9999);
        assert_eq!(settings.web.host, "0.0.0.0");
        assert_eq!(settings.osc, OscSettings::default());
    }

    #[test]
    fn avatar_dir_parses() {
        let settings: BridgeSettings =
            serde_json::from_str(r#"{"avatar": {"oscDir": "/srv/osc"}}"#).unwrap();
        assert_eq!(settings.avatar.osc_dir, Some(PathBuf::from("/srv/osc")));
    }

    #[test]
    fn validate_rejects_zero_buffer() {
        let mut settings = BridgeSettings::default();
        settings.web.outbound_buffer = 0;
        assert_matches!(settings.validate(), Err(SettingsError::InvalidValue(_)));
    }

    #[test]
    fn validate_rejects_zero_poll_interval() {
        let mut settings = BridgeSettings::default();
        settings.runtime.poll_interval_ms = 0;
        assert_matches!(settings.validate(), Err(SettingsError::InvalidValue(_)));
    }
}
