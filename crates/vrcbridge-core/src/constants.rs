//! Well-known OSC addresses and patterns used by VRChat.

/// Avatar parameter updates (`/avatar/parameters/<name>`).
pub const AVATAR_PARAMETERS_PATTERN: &str = "/avatar/parameters/*";

/// Sent by VRChat whenever the local avatar changes. First argument is the avatar id.
pub const AVATAR_CHANGE_ADDRESS: &str = "/avatar/change";

/// User camera state (`/usercamera/<control>`).
pub const CAMERA_PATTERN: &str = "/usercamera/*";

/// Tracked device poses (`/tracking/vrsystem/<device>/pose`).
pub const TRACKING_POSE_PATTERN: &str = "/tracking/vrsystem/**/pose";

/// Chatbox text input. Expects `(text, send_immediately, notify)`.
pub const CHATBOX_INPUT_ADDRESS: &str = "/chatbox/input";

/// Number of floats in a pose payload: position xyz then rotation xyz.
pub const POSE_COMPONENTS: usize = 6;

/// Prefix applied to every parameter discovered from an avatar definition file.
pub const CUSTOM_PARAM_PREFIX: &str = "Custom_";

/// Prefix of the per-user folder inside the VRChat OSC directory.
pub const USER_FOLDER_PREFIX: &str = "usr_";

/// Folder holding avatar definition files inside a user folder.
pub const AVATARS_FOLDER: &str = "Avatars";
