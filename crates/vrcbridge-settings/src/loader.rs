//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`BridgeSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `VRCBRIDGE_*` environment overrides
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::BridgeSettings;

/// Resolve the default settings file (`~/.vrcbridge/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".vrcbridge").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<BridgeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<BridgeSettings> {
    let defaults = serde_json::to_value(BridgeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: BridgeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning and the file/default value kept.
pub fn apply_env_overrides(settings: &mut BridgeSettings) {
    // ── OSC ─────────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VRCBRIDGE_OSC_SEND_HOST") {
        settings.osc.send_host = v;
    }
    if let Some(v) = read_env_u16("VRCBRIDGE_OSC_SEND_PORT", 1, 65535) {
        settings.osc.send_port = v;
    }
    if let Some(v) = read_env_string("VRCBRIDGE_OSC_RECEIVE_HOST") {
        settings.osc.receive_host = v;
    }
    if let Some(v) = read_env_u16("VRCBRIDGE_OSC_RECEIVE_PORT", 1, 65535) {
        settings.osc.receive_port = v;
    }

    // ── Web ─────────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VRCBRIDGE_WEB_HOST") {
        settings.web.host = v;
    }
    if let Some(v) = read_env_u16("VRCBRIDGE_WEB_PORT", 1, 65535) {
        settings.web.port = v;
    }
    if let Some(v) = read_env_string("VRCBRIDGE_STATIC_DIR") {
        settings.web.static_dir = PathBuf::from(v);
    }

    // ── Avatar / runtime ────────────────────────────────────────────
    if let Some(v) = read_env_string("VRCBRIDGE_AVATAR_OSC_DIR") {
        settings.avatar.osc_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = read_env_u64("VRCBRIDGE_POLL_INTERVAL_MS", 1, 10_000) {
        settings.runtime.poll_interval_ms = v;
    }

    // ── Logging ─────────────────────────────────────────────────────
    if let Some(v) = read_env_string("VRCBRIDGE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_bool("VRCBRIDGE_LOG_JSON") {
        settings.logging.json = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers ─────────────────────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_bool(name: &str) -> Option<bool> {
    let val = std::env::var(name).ok()?;
    let result = parse_bool(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
    }
    result
}

fn read_env_u16(name: &str, min: u16, max: u16) -> Option<u16> {
    let val = std::env::var(name).ok()?;
    let result = parse_u16_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
    }
    result
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
