//! Classification of raw OSC callbacks.
//!
//! Runs on the listener thread. Each classified message becomes one
//! [`InboundEvent`] on the dispatch loop's queue; the queue is the only
//! thing shared with the loop.

use tracing::debug;

use vrcbridge_core::constants::{
    AVATAR_CHANGE_ADDRESS, AVATAR_PARAMETERS_PATTERN, CAMERA_PATTERN, POSE_COMPONENTS,
    TRACKING_POSE_PATTERN,
};
use vrcbridge_core::{Category, ParamValue};
use vrcbridge_osc::{OscArgs, OscError, OscRouter};

use crate::bridge::BridgeHandle;

/// A classified inbound message.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundEvent {
    /// OSC address as received.
    pub address: String,
    /// What the message carries.
    pub kind: EventKind,
}

/// Payload of an [`InboundEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    /// A single value for the parameter at the address.
    Update {
        /// Routing category the address was classified under.
        category: Category,
        /// First argument.
        value: ParamValue,
    },
    /// The worn avatar changed.
    IdentityChange {
        /// New avatar id.
        entity_id: String,
    },
    /// A six-component pose for a pose composite.
    Pose {
        /// Components in slot order.
        components: Vec<ParamValue>,
    },
}

impl EventKind {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::IdentityChange { .. } => "identity",
            Self::Pose { .. } => "pose",
        }
    }
}

/// `/avatar/parameters/*`: the first argument.
pub fn classify_avatar(address: &str, args: OscArgs) -> Option<InboundEvent> {
    first_value(address, args, Category::Avatar)
}

/// `/avatar/change`: the first argument as a string.
pub fn classify_identity(address: &str, args: OscArgs) -> Option<InboundEvent> {
    let first = first_arg(address, args)?;
    Some(InboundEvent {
        address: address.to_owned(),
        kind: EventKind::IdentityChange {
            entity_id: first.to_string(),
        },
    })
}

/// `/usercamera/*`: the first argument.
pub fn classify_camera(address: &str, args: OscArgs) -> Option<InboundEvent> {
    first_value(address, args, Category::Camera)
}

/// `/tracking/vrsystem/**/pose`: the first six arguments, by wire
/// position. Shorter payloads, and payloads with an unsupported argument
/// among the six, are dropped.
pub fn classify_pose(address: &str, mut args: OscArgs) -> Option<InboundEvent> {
    if args.len() < POSE_COMPONENTS {
        debug!(address, len = args.len(), "short pose payload dropped");
        return None;
    }
    args.truncate(POSE_COMPONENTS);
    let Some(components) = args.into_iter().collect::<Option<Vec<_>>>() else {
        debug!(address, "pose payload with unsupported component dropped");
        return None;
    };
    Some(InboundEvent {
        address: address.to_owned(),
        kind: EventKind::Pose { components },
    })
}

fn first_arg(address: &str, args: OscArgs) -> Option<ParamValue> {
    match args.into_iter().next() {
        Some(Some(value)) => Some(value),
        Some(None) => {
            debug!(address, "unsupported first argument, message dropped");
            None
        }
        None => {
            debug!(address, "message without arguments dropped");
            None
        }
    }
}

fn first_value(address: &str, args: OscArgs, category: Category) -> Option<InboundEvent> {
    let value = first_arg(address, args)?;
    Some(InboundEvent {
        address: address.to_owned(),
        kind: EventKind::Update { category, value },
    })
}

/// Build the listener router. Routes are tried in order:
/// avatar parameters, identity change, camera, tracking pose. Anything else
/// is logged and dropped.
pub fn router(handle: &BridgeHandle) -> Result<OscRouter, OscError> {
    type Classifier = fn(&str, OscArgs) -> Option<InboundEvent>;
    let routes: [(&str, Classifier); 4] = [
        (AVATAR_PARAMETERS_PATTERN, classify_avatar),
        (AVATAR_CHANGE_ADDRESS, classify_identity),
        (CAMERA_PATTERN, classify_camera),
        (TRACKING_POSE_PATTERN, classify_pose),
    ];

    let mut router = OscRouter::new();
    for (pattern, classify) in routes {
        let handle = handle.clone();
        router.map(pattern, move |address, args| {
            if let Some(event) = classify(address, args) {
                let _ = handle.enqueue(event);
            }
        })?;
    }
    router.set_default_handler(|address, _| debug!(address, "unclassified osc address"));
    Ok(router)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
