//! Locating avatar definition files.

use std::path::{Path, PathBuf};

use tracing::debug;

use vrcbridge_core::constants::{AVATARS_FOLDER, USER_FOLDER_PREFIX};

use crate::errors::DiscoveryError;

/// Steam app id for VRChat, which names its Proton prefix.
const VRCHAT_APP_ID: &str = "438100";

/// The OSC directory VRChat uses on this platform.
pub fn default_osc_dir() -> Result<PathBuf, DiscoveryError> {
    let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
    if cfg!(windows) {
        windows_osc_dir(var("LOCALAPPDATA"), var("USERPROFILE"))
    } else {
        proton_osc_dir(var("HOME"))
    }
}

/// `%LOCALAPPDATA%\..\LocalLow\VRChat\VRChat\OSC`, falling back to the
/// profile directory.
pub fn windows_osc_dir(
    local_app_data: Option<String>,
    user_profile: Option<String>,
) -> Result<PathBuf, DiscoveryError> {
    let app_data = match (local_app_data, user_profile) {
        (Some(local), _) => PathBuf::from(local).join(".."),
        (None, Some(profile)) => PathBuf::from(profile).join("AppData"),
        (None, None) => return Err(DiscoveryError::EnvUnset { name: "LOCALAPPDATA" }),
    };
    Ok(app_data.join("LocalLow").join("VRChat").join("VRChat").join("OSC"))
}

/// The OSC directory inside the Steam Proton prefix.
pub fn proton_osc_dir(home: Option<String>) -> Result<PathBuf, DiscoveryError> {
    let home = home.ok_or(DiscoveryError::EnvUnset { name: "HOME" })?;
    Ok(PathBuf::from(home)
        .join(".steam/steam/steamapps/compatdata")
        .join(VRCHAT_APP_ID)
        .join("pfx/drive_c/users/steamuser/AppData/LocalLow/VRChat/VRChat/OSC"))
}

/// Find `<root>/usr_*/Avatars/<entity_id>.json`.
///
/// User folders are searched in name order and the first one holding the
/// file wins.
pub fn find_definition(root: &Path, entity_id: &str) -> Result<PathBuf, DiscoveryError> {
    if entity_id.is_empty()
        || entity_id.contains(['/', '\\'])
        || entity_id == "."
        || entity_id == ".."
    {
        return Err(DiscoveryError::InvalidEntityId {
            entity_id: entity_id.to_owned(),
        });
    }
    if !root.is_dir() {
        return Err(DiscoveryError::InstallDirMissing {
            path: root.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(root).map_err(|_| DiscoveryError::InstallDirMissing {
        path: root.to_path_buf(),
    })?;
    let mut user_dirs: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.starts_with(USER_FOLDER_PREFIX))
        })
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    user_dirs.sort();

    if user_dirs.is_empty() {
        return Err(DiscoveryError::NoUserFolder {
            root: root.to_path_buf(),
        });
    }

    let file_name = format!("{entity_id}.json");
    for dir in &user_dirs {
        let candidate = dir.join(AVATARS_FOLDER).join(&file_name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found avatar definition");
            return Ok(candidate);
        }
    }

    Err(DiscoveryError::DefinitionNotFound {
        entity_id: entity_id.to_owned(),
        root: root.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::write_definition;
    use assert_matches::assert_matches;

    #[test]
    fn windows_prefers_local_app_data() {
        let dir = windows_osc_dir(Some(r"C:\Users\me\AppData\Local".into()), None).unwrap();
        assert!(dir.ends_with("LocalLow/VRChat/VRChat/OSC"));
        assert!(dir.starts_with(r"C:\Users\me\AppData\Local"));
    }

    #[test]
    fn windows_falls_back_to_profile() {
        let dir = windows_osc_dir(None, Some("/profile".into())).unwrap();
        assert!(dir.starts_with("/profile/AppData"));
    }

    #[test]
    fn windows_without_env_fails() {
        assert_matches!(
            windows_osc_dir(None, None),
            Err(DiscoveryError::EnvUnset { .. })
        );
    }

    #[test]
    fn proton_path_shape() {
        let dir = proton_osc_dir(Some("/home/me".into())).unwrap();
        assert!(dir.starts_with("/home/me/.steam/steam/steamapps/compatdata/438100"));
        assert!(dir.ends_with("VRChat/VRChat/OSC"));
        assert_matches!(proton_osc_dir(None), Err(DiscoveryError::EnvUnset { name: "HOME" }));
    }

    #[test]
    fn finds_definition_in_user_folder() {
        let root = tempfile::tempdir().unwrap();
        write_definition(root.path(), "abc", "avtr_1", "{}");
        let path = find_definition(root.path(), "avtr_1").unwrap();
        assert!(path.ends_with("usr_abc/Avatars/avtr_1.json"));
    }

    #[test]
    fn searches_every_user_folder() {
        let root = tempfile::tempdir().unwrap();
        write_definition(root.path(), "a", "avtr_other", "{}");
        write_definition(root.path(), "b", "avtr_1", "{}");
        let path = find_definition(root.path(), "avtr_1").unwrap();
        assert!(path.ends_with("usr_b/Avatars/avtr_1.json"));
    }

    #[test]
    fn missing_root() {
        let root = tempfile::tempdir().unwrap();
        assert_matches!(
            find_definition(&root.path().join("OSC"), "avtr_1"),
            Err(DiscoveryError::InstallDirMissing { .. })
        );
    }

    #[test]
    fn no_user_folder() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("other")).unwrap();
        assert_matches!(
            find_definition(root.path(), "avtr_1"),
            Err(DiscoveryError::NoUserFolder { .. })
        );
    }

    #[test]
    fn definition_not_found() {
        let root = tempfile::tempdir().unwrap();
        write_definition(root.path(), "abc", "avtr_2", "{}");
        assert_matches!(
            find_definition(root.path(), "avtr_1"),
            Err(DiscoveryError::DefinitionNotFound { .. })
        );
    }

    #[test]
    fn rejects_path_like_ids() {
        let root = tempfile::tempdir().unwrap();
        for id in ["", "..", "../x", r"a\b"] {
            assert_matches!(
                find_definition(root.path(), id),
                Err(DiscoveryError::InvalidEntityId { .. })
            );
        }
    }
}
