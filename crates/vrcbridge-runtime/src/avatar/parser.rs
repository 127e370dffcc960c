//! Avatar definition parsing.
//!
//! ```json
//! {
//!   "id": "avtr_...",
//!   "name": "Kitsune",
//!   "parameters": [
//!     { "name": "Hue",
//!       "input":  { "address": "/avatar/parameters/Hue", "type": "Float" },
//!       "output": { "address": "/avatar/parameters/Hue", "type": "Float" } }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use vrcbridge_core::constants::CUSTOM_PARAM_PREFIX;
use vrcbridge_core::{Bounds, Category, Direction, ParamType, Parameter};

use crate::errors::ParseError;

/// A parsed definition file.
#[derive(Clone, Debug, PartialEq)]
pub struct AvatarDefinition {
    /// Avatar id, when the file records one.
    pub id: Option<String>,
    /// Display name.
    pub name: String,
    /// Derived parameters, in file order.
    pub parameters: Vec<Parameter>,
}

#[derive(Deserialize)]
struct RawDefinition {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    parameters: Vec<RawParameter>,
}

#[derive(Deserialize)]
struct RawParameter {
    name: String,
    #[serde(default)]
    input: Option<RawEndpoint>,
    #[serde(default)]
    output: Option<RawEndpoint>,
}

#[derive(Deserialize)]
struct RawEndpoint {
    address: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    min: Option<f64>,
    #[serde(default)]
    max: Option<f64>,
}

/// Read and parse the definition at `path`.
pub fn load_definition(path: &Path) -> Result<AvatarDefinition, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_definition(&text)
}

/// Parse definition text. A leading UTF-8 byte order mark is ignored.
pub fn parse_definition(text: &str) -> Result<AvatarDefinition, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let raw: RawDefinition = serde_json::from_str(text)?;
    let parameters = raw
        .parameters
        .into_iter()
        .filter_map(derive_parameter)
        .collect();
    Ok(AvatarDefinition {
        id: raw.id,
        name: raw.name,
        parameters,
    })
}

/// One definition entry → at most one parameter.
///
/// The input endpoint governs address, type and bounds when present.
fn derive_parameter(raw: RawParameter) -> Option<Parameter> {
    let direction = Direction::new(raw.input.is_some(), raw.output.is_some());
    let Some(endpoint) = raw.input.as_ref().or(raw.output.as_ref()) else {
        debug!(name = %raw.name, "definition entry has no endpoints, skipping");
        return None;
    };
    let Some(param_type) = definition_type(&endpoint.kind) else {
        debug!(name = %raw.name, kind = %endpoint.kind, "unsupported parameter type, skipping");
        return None;
    };

    let defaults = Bounds::default_for(param_type);
    let bounds = Bounds::new(
        endpoint.min.unwrap_or(defaults.min),
        endpoint.max.unwrap_or(defaults.max),
    );

    Some(
        Parameter::new(
            format!("{CUSTOM_PARAM_PREFIX}{}", raw.name),
            endpoint.address.clone(),
            param_type,
            Category::CustomAvatar,
        )
        .with_bounds(bounds)
        .with_direction(direction)
        .with_display(raw.name, endpoint.address.clone()),
    )
}

fn definition_type(kind: &str) -> Option<ParamType> {
    match kind {
        "Float" => Some(ParamType::Float),
        "Int" => Some(ParamType::Int),
        "Bool" => Some(ParamType::Bool),
        "String" => Some(ParamType::String),
        _ => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
