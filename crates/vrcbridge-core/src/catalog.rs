//! Built-in VRChat OSC parameters seeded into every registry.

use crate::parameter::{Bounds, Category, Direction, Parameter};
use crate::value::ParamType;

use Category::{Camera, Chatbox, Dolly, Input, System};
use ParamType::{Bool, Float, Int};

struct Entry {
    name: &'static str,
    address: &'static str,
    param_type: ParamType,
    bounds: Option<(f64, f64)>,
    category: Category,
    label: &'static str,
    description: &'static str,
}

const fn entry(
    name: &'static str,
    address: &'static str,
    param_type: ParamType,
    category: Category,
    label: &'static str,
    description: &'static str,
) -> Entry {
    Entry {
        name,
        address,
        param_type,
        bounds: None,
        category,
        label,
        description,
    }
}

const fn ranged(
    name: &'static str,
    address: &'static str,
    param_type: ParamType,
    bounds: (f64, f64),
    category: Category,
    label: &'static str,
    description: &'static str,
) -> Entry {
    Entry {
        name,
        address,
        param_type,
        bounds: Some(bounds),
        category,
        label,
        description,
    }
}

const ENTRIES: &[Entry] = &[
    // Input axes
    ranged("Input_Horizontal", "/input/Horizontal", Float, (-1.0, 1.0), Input, "Horizontal", "Strafe left (-1) / right (1)"),
    ranged("Input_Vertical", "/input/Vertical", Float, (-1.0, 1.0), Input, "Vertical", "Move backward (-1) / forward (1)"),
    ranged("Input_LookHorizontal", "/input/LookHorizontal", Float, (-1.0, 1.0), Input, "Look Horizontal", "Turn left (-1) / right (1)"),
    ranged("Input_LookVertical", "/input/LookVertical", Float, (-1.0, 1.0), Input, "Look Vertical", "Look down (-1) / up (1)"),
    // Input buttons
    entry("Input_Jump", "/input/Jump", Bool, Input, "Jump", "Jump while held"),
    entry("Input_Run", "/input/Run", Bool, Input, "Run", "Sprint while held"),
    entry("Input_Voice", "/input/Voice", Bool, Input, "Voice", "Toggle microphone"),
    entry("Input_MoveForward", "/input/MoveForward", Bool, Input, "Move Forward", "Walk forward while held"),
    entry("Input_MoveBackward", "/input/MoveBackward", Bool, Input, "Move Backward", "Walk backward while held"),
    entry("Input_MoveLeft", "/input/MoveLeft", Bool, Input, "Move Left", "Strafe left while held"),
    entry("Input_MoveRight", "/input/MoveRight", Bool, Input, "Move Right", "Strafe right while held"),
    entry("Input_GrabLeft", "/input/GrabLeft", Bool, Input, "Grab Left", "Left hand grab"),
    entry("Input_UseLeft", "/input/UseLeft", Bool, Input, "Use Left", "Left hand use"),
    entry("Input_DropLeft", "/input/DropLeft", Bool, Input, "Drop Left", "Left hand drop"),
    entry("Input_GrabRight", "/input/GrabRight", Bool, Input, "Grab Right", "Right hand grab"),
    entry("Input_UseRight", "/input/UseRight", Bool, Input, "Use Right", "Right hand use"),
    entry("Input_DropRight", "/input/DropRight", Bool, Input, "Drop Right", "Right hand drop"),
    entry("Input_LookLeft", "/input/LookLeft", Bool, Input, "Look Left", "Snap turn left"),
    entry("Input_LookRight", "/input/LookRight", Bool, Input, "Look Right", "Snap turn right"),
    entry("Input_ComfortLeft", "/input/ComfortLeft", Bool, Input, "Comfort Left", "Comfort turn left"),
    entry("Input_ComfortRight", "/input/ComfortRight", Bool, Input, "Comfort Right", "Comfort turn right"),
    entry("Input_AFKToggle", "/input/AFKToggle", Bool, Input, "AFK", "Toggle AFK state"),
    // Chatbox
    entry("Chatbox_Typing", "/chatbox/typing", Bool, Chatbox, "Typing", "Show the typing indicator"),
    // User camera
    ranged("Camera_Mode", "/usercamera/Mode", Int, (0.0, 6.0), Camera, "Mode", "0 off, 1 photo, 2 stream, 3 emoji, 4 multilayer, 5 print, 6 drone"),
    ranged("Camera_Zoom", "/usercamera/Zoom", Float, (20.0, 150.0), Camera, "Zoom", "Field of view in degrees"),
    ranged("Camera_Exposure", "/usercamera/Exposure", Float, (-10.0, 4.0), Camera, "Exposure", "Exposure compensation"),
    ranged("Camera_FocalDistance", "/usercamera/FocalDistance", Float, (0.0, 10.0), Camera, "Focal Distance", "Focus distance in meters"),
    ranged("Camera_Aperture", "/usercamera/Aperture", Float, (1.4, 32.0), Camera, "Aperture", "f-stop"),
    entry("Camera_Capture", "/usercamera/Capture", Bool, Camera, "Capture", "Take a picture"),
    entry("Camera_CaptureDelayed", "/usercamera/CaptureDelayed", Bool, Camera, "Capture Delayed", "Take a picture after the timer"),
    entry("Camera_Close", "/usercamera/Close", Bool, Camera, "Close", "Close the camera"),
    entry("Camera_ShowUIInCamera", "/usercamera/ShowUIInCamera", Bool, Camera, "Show UI", "Render UI in the camera"),
    entry("Camera_LocalPlayer", "/usercamera/LocalPlayer", Bool, Camera, "Local Player", "Render the local player"),
    entry("Camera_RemotePlayer", "/usercamera/RemotePlayer", Bool, Camera, "Remote Players", "Render remote players"),
    entry("Camera_Environment", "/usercamera/Environment", Bool, Camera, "Environment", "Render the world"),
    entry("Camera_GreenScreen", "/usercamera/GreenScreen", Bool, Camera, "Green Screen", "Replace the background"),
    entry("Camera_Lock", "/usercamera/Lock", Bool, Camera, "Lock", "Lock the camera in place"),
    entry("Camera_SmoothMovement", "/usercamera/SmoothMovement", Bool, Camera, "Smooth Movement", "Smooth camera motion"),
    entry("Camera_LookAtMe", "/usercamera/LookAtMe", Bool, Camera, "Look At Me", "Keep the camera pointed at the player"),
    entry("Camera_Flying", "/usercamera/Flying", Bool, Camera, "Flying", "Free-flying camera"),
    entry("Camera_Streaming", "/usercamera/Streaming", Bool, Camera, "Streaming", "Send the camera to the stream output"),
    // Camera dolly
    entry("Dolly_Play", "/dolly/Play", Bool, Dolly, "Play", "Play the dolly path"),
    entry("Dolly_PlayDelayed", "/dolly/PlayDelayed", Bool, Dolly, "Play Delayed", "Play the dolly path after the timer"),
    entry("Dolly_Import", "/dolly/Import", ParamType::String, Dolly, "Import", "Load a dolly path from JSON"),
    // System values
    entry("System_AvatarID", "/avatar/change", ParamType::String, System, "Avatar ID", "Currently worn avatar"),
    entry("System_VRMode", "/avatar/parameters/VRMode", Int, System, "VR Mode", "1 in VR, 0 on desktop"),
    entry("System_TrackingType", "/avatar/parameters/TrackingType", Int, System, "Tracking Type", "Number of tracked points"),
    entry("System_EyeHeightAsMeters", "/avatar/parameters/EyeHeightAsMeters", Float, System, "Eye Height (m)", "Avatar eye height in meters"),
    entry("System_EyeHeightAsPercent", "/avatar/parameters/EyeHeightAsPercent", Float, System, "Eye Height (%)", "Eye height relative to the scaling range"),
];

/// Tracked devices that report a six-float pose.
const POSE_DEVICES: &[(&str, &str, &str)] = &[
    ("Head", "head", "Head"),
    ("LeftWrist", "leftwrist", "Left wrist"),
    ("RightWrist", "rightwrist", "Right wrist"),
];

/// Pose payload slots in wire order.
const POSE_SLOTS: &[(&str, &str)] = &[
    ("PosX", "position X"),
    ("PosY", "position Y"),
    ("PosZ", "position Z"),
    ("RotX", "rotation X"),
    ("RotY", "rotation Y"),
    ("RotZ", "rotation Z"),
];

fn direction_for(category: Category) -> Direction {
    match category {
        Category::Camera | Category::System => Direction::BOTH,
        Category::Tracking => Direction::OUTBOUND,
        _ => Direction::INBOUND,
    }
}

/// The pose composite members for one tracked device.
pub fn pose_composite(device: &str, segment: &str, label: &str) -> Vec<Parameter> {
    let address = format!("/tracking/vrsystem/{segment}/pose");
    POSE_SLOTS
        .iter()
        .enumerate()
        .map(|(index, (slot, slot_label))| {
            Parameter::new(
                format!("Tracking_{device}{slot}"),
                address.clone(),
                ParamType::Float,
                Category::Tracking,
            )
            .with_bounds(Bounds::new(-360.0, 360.0))
            .with_direction(direction_for(Category::Tracking))
            .with_component(index)
            .with_display(format!("{label} {slot_label}"), format!("{label} {slot_label}"))
        })
        .collect()
}

/// Every built-in parameter, in display order.
pub fn builtin_parameters() -> Vec<Parameter> {
    let mut params: Vec<Parameter> = ENTRIES
        .iter()
        .map(|e| {
            let mut p = Parameter::new(e.name, e.address, e.param_type, e.category)
                .with_direction(direction_for(e.category))
                .with_display(e.label, e.description);
            if let Some((min, max)) = e.bounds {
                p = p.with_bounds(Bounds::new(min, max));
            }
            p
        })
        .collect();

    for (device, segment, label) in POSE_DEVICES {
        params.extend(pose_composite(device, segment, label));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn names_are_unique() {
        let params = builtin_parameters();
        let names: HashSet<_> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), params.len());
    }

    #[test]
    fn addresses_unique_outside_pose_composites() {
        let params = builtin_parameters();
        let mut seen = HashSet::new();
        for p in params.iter().filter(|p| !p.is_pose_component()) {
            assert!(seen.insert(p.address.as_str()), "duplicate address {}", p.address);
        }
    }

    #[test]
    fn pose_composites_cover_all_slots() {
        let params = builtin_parameters();
        let mut by_address: HashMap<&str, Vec<usize>> = HashMap::new();
        for p in params.iter().filter(|p| p.is_pose_component()) {
            by_address
                .entry(p.address.as_str())
                .or_default()
                .push(p.component_index.unwrap());
        }
        assert_eq!(by_address.len(), 3);
        for slots in by_address.values_mut() {
            slots.sort_unstable();
            assert_eq!(slots, &vec![0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn head_pose_naming() {
        let head = pose_composite("Head", "head", "Head");
        assert_eq!(head[0].name, "Tracking_HeadPosX");
        assert_eq!(head[3].name, "Tracking_HeadRotX");
        assert_eq!(head[3].component_index, Some(3));
        assert_eq!(head[3].address, "/tracking/vrsystem/head/pose");
    }

    #[test]
    fn identity_parameter_present() {
        let params = builtin_parameters();
        let id = params.iter().find(|p| p.name == "System_AvatarID").unwrap();
        assert_eq!(id.address, "/avatar/change");
        assert_eq!(id.param_type, ParamType::String);
        assert_eq!(id.category, Category::System);
    }

    #[test]
    fn catalog_ranges_applied() {
        let params = builtin_parameters();
        let zoom = params.iter().find(|p| p.name == "Camera_Zoom").unwrap();
        assert_eq!(zoom.bounds, Bounds::new(20.0, 150.0));
        assert!(zoom.direction.reports_outbound);
        let jump = params.iter().find(|p| p.name == "Input_Jump").unwrap();
        assert_eq!(jump.direction, Direction::INBOUND);
    }
}
