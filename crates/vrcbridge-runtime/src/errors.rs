//! Avatar loading failures.
//!
//! None of these are fatal to the bridge; each ends one reconciliation in
//! the `Failed` phase.

use std::path::PathBuf;

use thiserror::Error;

/// The definition file for an avatar could not be located.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The environment variable the platform default is derived from is unset.
    #[error("environment variable {name} is not set")]
    EnvUnset {
        /// Variable name.
        name: &'static str,
    },
    /// The VRChat OSC directory does not exist.
    #[error("osc directory {} does not exist", path.display())]
    InstallDirMissing {
        /// Directory searched.
        path: PathBuf,
    },
    /// No `usr_*` folder under the OSC directory.
    #[error("no user folder under {}", root.display())]
    NoUserFolder {
        /// Directory searched.
        root: PathBuf,
    },
    /// No user folder holds a definition for the avatar.
    #[error("no definition for avatar {entity_id} under {}", root.display())]
    DefinitionNotFound {
        /// Avatar id.
        entity_id: String,
        /// Directory searched.
        root: PathBuf,
    },
    /// The avatar id is not usable as a file name.
    #[error("avatar id {entity_id:?} is not a valid file name")]
    InvalidEntityId {
        /// Avatar id.
        entity_id: String,
    },
}

/// A definition file was found but could not be read.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Read failure.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Malformed JSON or a document of the wrong shape.
    #[error("malformed avatar definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a reconciliation ended in `Failed`.
#[derive(Debug, Error)]
pub enum AvatarError {
    /// See [`DiscoveryError`].
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// See [`ParseError`].
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Every parsed parameter was skipped or collided with an existing address.
    #[error("avatar {entity_id} contributed no new parameters")]
    NothingAccepted {
        /// Avatar id.
        entity_id: String,
    },
}

impl AvatarError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Discovery(_) => "discovery",
            Self::Parse(_) => "parse",
            Self::NothingAccepted { .. } => "empty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn discovery_display_includes_path() {
        let err = DiscoveryError::InstallDirMissing {
            path: Path::new("/nope/OSC").to_path_buf(),
        };
        assert_eq!(err.to_string(), "osc directory /nope/OSC does not exist");
    }

    #[test]
    fn avatar_error_kinds() {
        let discovery: AvatarError = DiscoveryError::EnvUnset { name: "HOME" }.into();
        assert_eq!(discovery.kind(), "discovery");
        assert_eq!(discovery.to_string(), "environment variable HOME is not set");

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let parse: AvatarError = ParseError::Json(json_err).into();
        assert_eq!(parse.kind(), "parse");

        let empty = AvatarError::NothingAccepted {
            entity_id: "avtr_1".into(),
        };
        assert_eq!(empty.kind(), "empty");
    }
}
