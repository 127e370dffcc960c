//! The parameter data model.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{ParamType, ParamValue};

/// Closed set of parameter categories, used for routing and UI grouping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// `/input/*` locomotion and action controls.
    Input,
    /// `/chatbox/*`.
    Chatbox,
    /// `/usercamera/*`.
    Camera,
    /// Identity and avatar-level system values.
    System,
    /// Pose composites under `/tracking/*`.
    Tracking,
    /// `/dolly/*` camera dolly controls.
    Dolly,
    /// Generic avatar parameters.
    Avatar,
    /// Parameters discovered from the current avatar's definition file.
    CustomAvatar,
}

impl Category {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Chatbox => "chatbox",
            Self::Camera => "camera",
            Self::System => "system",
            Self::Tracking => "tracking",
            Self::Dolly => "dolly",
            Self::Avatar => "avatar",
            Self::CustomAvatar => "custom-avatar",
        }
    }

    /// Whether an inbound event classified as `self` may resolve to a
    /// parameter of category `target`.
    ///
    /// Avatar-class events (`/avatar/parameters/*`) feed the generic, custom,
    /// and system parameters that live under that address space.
    pub fn routes_to(self, target: Category) -> bool {
        match self {
            Self::Avatar => matches!(
                target,
                Self::Avatar | Self::CustomAvatar | Self::System
            ),
            other => other == target,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a parameter may flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Direction {
    /// A subscriber may set it and the bridge forwards it to VRChat.
    pub accepts_inbound: bool,
    /// VRChat reports it and the bridge mirrors it to subscribers.
    pub reports_outbound: bool,
}

impl Direction {
    /// Neither direction.
    pub const NONE: Self = Self::new(false, false);
    /// Settable only.
    pub const INBOUND: Self = Self::new(true, false);
    /// Reported only.
    pub const OUTBOUND: Self = Self::new(false, true);
    /// Both.
    pub const BOTH: Self = Self::new(true, true);

    /// Build from the two flags.
    pub const fn new(accepts_inbound: bool, reports_outbound: bool) -> Self {
        Self {
            accepts_inbound,
            reports_outbound,
        }
    }
}

/// Advisory numeric range. Never enforced on write.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Lower end.
    pub min: f64,
    /// Upper end.
    pub max: f64,
}

impl Bounds {
    /// Explicit range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Default range for a declared type.
    pub const fn default_for(param_type: ParamType) -> Self {
        match param_type {
            ParamType::Int => Self::new(0.0, 20.0),
            ParamType::Float | ParamType::Bool | ParamType::String => Self::new(0.0, 1.0),
        }
    }

    /// Whether `value` lies inside the range (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Presentation-only metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayMeta {
    /// Short human-readable name.
    pub label: String,
    /// One-line description.
    pub description: String,
}

/// A named, typed control point.
#[derive(Clone, Debug, PartialEq)]
pub struct Parameter {
    /// Unique within a registry.
    pub name: String,
    /// OSC address. Shared only by the members of a pose composite.
    pub address: String,
    /// Declared type.
    pub param_type: ParamType,
    /// Last known value; `None` until the first update.
    pub value: Option<ParamValue>,
    /// Advisory range.
    pub bounds: Bounds,
    /// Flow flags.
    pub direction: Direction,
    /// Routing / grouping category.
    pub category: Category,
    /// Slot in a pose payload, for pose composite members.
    pub component_index: Option<usize>,
    /// Label and description.
    pub display: DisplayMeta,
}

impl Parameter {
    /// Create a parameter with type-default bounds and no direction flags.
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        param_type: ParamType,
        category: Category,
    ) -> Self {
        let name = name.into();
        Self {
            display: DisplayMeta {
                label: name.clone(),
                description: String::new(),
            },
            name,
            address: address.into(),
            param_type,
            value: None,
            bounds: Bounds::default_for(param_type),
            direction: Direction::NONE,
            category,
            component_index: None,
        }
    }

    /// Override the advisory range.
    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Set the direction flags.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Bind the parameter to a pose payload slot.
    #[must_use]
    pub fn with_component(mut self, index: usize) -> Self {
        self.component_index = Some(index);
        self
    }

    /// Set label and description.
    #[must_use]
    pub fn with_display(mut self, label: impl Into<String>, description: impl Into<String>) -> Self {
        self.display = DisplayMeta {
            label: label.into(),
            description: description.into(),
        };
        self
    }

    /// Whether this parameter is a member of a pose composite.
    pub fn is_pose_component(&self) -> bool {
        self.component_index.is_some()
    }

    /// Store an inbound value, converted to the declared type when possible.
    ///
    /// Returns the value actually stored.
    pub fn assign(&mut self, value: ParamValue) -> &ParamValue {
        let stored = self.param_type.coerce(&value).unwrap_or(value);
        self.value.insert(stored)
    }

    /// Serializable view for subscribers.
    pub fn view(&self) -> ParameterView {
        ParameterView {
            name: self.name.clone(),
            param_type: self.param_type,
            address: self.address.clone(),
            min: self.bounds.min,
            max: self.bounds.max,
            is_input: self.direction.accepts_inbound,
            is_output: self.direction.reports_outbound,
            value: self.value.clone(),
            category: self.category,
            label: self.display.label.clone(),
            description: self.display.description.clone(),
            component_index: self.component_index,
        }
    }
}

/// Wire form of a [`Parameter`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterView {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub param_type: ParamType,
    /// OSC address.
    pub address: String,
    /// Advisory lower bound.
    pub min: f64,
    /// Advisory upper bound.
    pub max: f64,
    /// Settable by subscribers.
    pub is_input: bool,
    /// Reported by VRChat.
    pub is_output: bool,
    /// Current value, `null` until known.
    pub value: Option<ParamValue>,
    /// Category.
    pub category: Category,
    /// Display label.
    pub label: String,
    /// Display description.
    pub description: String,
    /// Pose slot, present only for pose composite members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_index: Option<usize>,
}
