//! Per-identity reconciliation of avatar parameters.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use vrcbridge_core::ServerMessage;

use crate::avatar::discovery::{default_osc_dir, find_definition};
use crate::avatar::parser::load_definition;
use crate::errors::AvatarError;
use crate::hub::BroadcastHub;
use crate::metrics::AVATAR_LOADS_TOTAL;
use crate::registry::Registry;

/// Where the most recent reconciliation got to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadPhase {
    /// No reconciliation has run.
    #[default]
    Idle,
    /// Locating the definition file.
    Discovering,
    /// Reading the definition file.
    Parsing,
    /// Merging into the registry.
    Reconciling,
    /// A session is active.
    Loaded,
    /// The last reconciliation produced no session.
    Failed,
}

/// The avatar whose parameters are currently merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarSession {
    /// Avatar id from the identity-change event.
    pub entity_id: String,
    /// Display name from the definition file.
    pub entity_name: String,
    /// Names of the accepted dynamic parameters.
    pub parameters: Vec<String>,
}

/// Result of [`AvatarLoader::reconcile`].
#[derive(Debug)]
pub enum ReconcileOutcome {
    /// Same avatar as the last request; nothing was done.
    Unchanged,
    /// A new session is active.
    Loaded {
        /// Avatar display name.
        entity_name: String,
        /// Number of parameters merged.
        accepted: usize,
    },
    /// The previous session (if any) was torn down but nothing replaced it.
    Failed(AvatarError),
}

/// The avatar parameter state machine.
///
/// Tracks the last requested avatar id separately from the active session,
/// so a repeated identity event is a no-op even when the first load failed.
#[derive(Debug, Default)]
pub struct AvatarLoader {
    osc_dir: Option<PathBuf>,
    current_entity: Option<String>,
    session: Option<AvatarSession>,
    phase: LoadPhase,
}

impl AvatarLoader {
    /// Loader searching `osc_dir`, or the platform default when `None`.
    pub fn new(osc_dir: Option<PathBuf>) -> Self {
        Self {
            osc_dir,
            ..Self::default()
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&AvatarSession> {
        self.session.as_ref()
    }

    /// The last requested avatar id.
    pub fn current_entity(&self) -> Option<&str> {
        self.current_entity.as_deref()
    }

    /// Phase the last reconciliation ended in.
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Switch to `entity_id`.
    ///
    /// Tears down the previous session (removing its parameters and telling
    /// subscribers to discard them) before attempting the new load, so a
    /// failed load leaves no avatar parameters registered.
    #[instrument(skip(self, registry, hub))]
    pub async fn reconcile(
        &mut self,
        entity_id: &str,
        registry: &mut Registry,
        hub: &mut BroadcastHub,
    ) -> ReconcileOutcome {
        if self.current_entity.as_deref() == Some(entity_id) {
            return ReconcileOutcome::Unchanged;
        }
        self.current_entity = Some(entity_id.to_owned());

        if let Some(previous) = self.session.take() {
            let removed = registry.unmerge_dynamic(&previous.parameters);
            info!(previous = %previous.entity_id, removed, "avatar session torn down");
            let _ = hub.broadcast(&ServerMessage::ClearCustomParams).await;
        }

        match self.load(entity_id, registry) {
            Ok(session) => {
                let entity_name = session.entity_name.clone();
                let accepted = session.parameters.len();
                self.phase = LoadPhase::Loaded;
                self.session = Some(session);
                metrics::counter!(AVATAR_LOADS_TOTAL, "outcome" => "loaded").increment(1);
                info!(entity_name = %entity_name, accepted, "avatar parameters loaded");

                let _ = hub
                    .broadcast(&ServerMessage::CustomParams {
                        avatar_name: entity_name.clone(),
                        parameters: registry.dynamic_views(),
                    })
                    .await;
                ReconcileOutcome::Loaded {
                    entity_name,
                    accepted,
                }
            }
            Err(error) => {
                self.phase = LoadPhase::Failed;
                metrics::counter!(AVATAR_LOADS_TOTAL, "outcome" => error.kind()).increment(1);
                warn!(%error, "avatar parameters not loaded");
                ReconcileOutcome::Failed(error)
            }
        }
    }

    fn load(&mut self, entity_id: &str, registry: &mut Registry) -> Result<AvatarSession, AvatarError> {
        self.phase = LoadPhase::Discovering;
        let root = match &self.osc_dir {
            Some(dir) => dir.clone(),
            None => default_osc_dir()?,
        };
        let path = find_definition(&root, entity_id)?;

        self.phase = LoadPhase::Parsing;
        let definition = load_definition(&path)?;

        self.phase = LoadPhase::Reconciling;
        let accepted = registry.merge_dynamic(definition.parameters);
        if accepted.is_empty() {
            return Err(AvatarError::NothingAccepted {
                entity_id: entity_id.to_owned(),
            });
        }

        Ok(AvatarSession {
            entity_id: entity_id.to_owned(),
            entity_name: definition.name,
            parameters: accepted.into_iter().map(|p| p.name).collect(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DiscoveryError;
    use crate::testutil::{ChannelSubscriber, frames, write_definition};
    use assert_matches::assert_matches;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc::UnboundedReceiver;

    const FOO: &str = r#"{"name":"Fox","parameters":[
        {"name":"Foo","input":{"address":"/avatar/parameters/Foo","type":"Float"}}
    ]}"#;

    const BAR: &str = r#"{"name":"Cat","parameters":[
        {"name":"Bar","input":{"address":"/avatar/parameters/Bar","type":"Bool"},
                      "output":{"address":"/avatar/parameters/Bar","type":"Bool"}}
    ]}"#;

    struct Fixture {
        _root: tempfile::TempDir,
        loader: AvatarLoader,
        registry: Registry,
        hub: BroadcastHub,
        rx: UnboundedReceiver<Arc<String>>,
    }

    fn fixture(defs: &[(&str, &str)]) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        for (id, body) in defs {
            write_definition(root.path(), "user", id, body);
        }
        let mut hub = BroadcastHub::new(Arc::new(AtomicUsize::new(0)));
        let (sub, rx) = ChannelSubscriber::new("panel");
        hub.add(sub);
        Fixture {
            loader: AvatarLoader::new(Some(root.path().to_path_buf())),
            _root: root,
            registry: Registry::builtin().unwrap(),
            hub,
            rx,
        }
    }

    impl Fixture {
        async fn reconcile(&mut self, id: &str) -> ReconcileOutcome {
            self.loader
                .reconcile(id, &mut self.registry, &mut self.hub)
                .await
        }

        fn types(&mut self) -> Vec<String> {
            frames(&mut self.rx)
                .iter()
                .map(|f| f["type"].as_str().unwrap().to_owned())
                .collect()
        }
    }

    #[tokio::test]
    async fn first_identity_loads_session() {
        let mut fx = fixture(&[("avtr_123", FOO)]);

        let outcome = fx.reconcile("avtr_123").await;
        assert_matches!(outcome, ReconcileOutcome::Loaded { accepted: 1, ref entity_name } if entity_name == "Fox");
        assert_eq!(fx.loader.phase(), LoadPhase::Loaded);

        let sent: Vec<Value> = frames(&mut fx.rx);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["type"], "custom_params");
        assert_eq!(sent[0]["avatarName"], "Fox");
        assert_eq!(sent[0]["parameters"][0]["name"], "Custom_Foo");
        assert_eq!(sent[0]["parameters"][0]["isInput"], true);

        let session = fx.loader.session().unwrap();
        assert_eq!(session.entity_id, "avtr_123");
        assert_eq!(session.parameters, vec!["Custom_Foo"]);
        assert!(fx.registry.lookup_by_name("Custom_Foo").is_some());
    }

    #[tokio::test]
    async fn same_identity_twice_is_a_noop() {
        let mut fx = fixture(&[("avtr_123", FOO)]);
        let _ = fx.reconcile("avtr_123").await;
        let _ = fx.types();
        let len = fx.registry.len();

        assert_matches!(fx.reconcile("avtr_123").await, ReconcileOutcome::Unchanged);
        assert!(fx.types().is_empty());
        assert_eq!(fx.registry.len(), len);
        assert_eq!(fx.loader.session().unwrap().entity_id, "avtr_123");
    }

    #[tokio::test]
    async fn switching_tears_down_before_loading() {
        let mut fx = fixture(&[("avtr_1", FOO), ("avtr_2", BAR)]);
        let _ = fx.reconcile("avtr_1").await;
        let _ = fx.types();

        let outcome = fx.reconcile("avtr_2").await;
        assert_matches!(outcome, ReconcileOutcome::Loaded { .. });
        assert_eq!(fx.types(), vec!["clear_custom_params", "custom_params"]);
        assert!(fx.registry.lookup_by_name("Custom_Foo").is_none());
        assert!(fx.registry.lookup_by_name("Custom_Bar").is_some());
        assert_eq!(fx.registry.dynamic_len(), 1);
    }

    #[tokio::test]
    async fn failed_load_still_tears_down() {
        let mut fx = fixture(&[("avtr_1", FOO)]);
        let _ = fx.reconcile("avtr_1").await;
        let _ = fx.types();

        let outcome = fx.reconcile("avtr_missing").await;
        assert_matches!(
            outcome,
            ReconcileOutcome::Failed(AvatarError::Discovery(DiscoveryError::DefinitionNotFound { .. }))
        );
        assert_eq!(fx.types(), vec!["clear_custom_params"]);
        assert_eq!(fx.registry.dynamic_len(), 0);
        assert!(fx.loader.session().is_none());
        assert_eq!(fx.loader.phase(), LoadPhase::Failed);
        assert_eq!(fx.loader.current_entity(), Some("avtr_missing"));
    }

    #[tokio::test]
    async fn repeated_failed_identity_is_a_noop() {
        let mut fx = fixture(&[]);
        assert_matches!(fx.reconcile("avtr_x").await, ReconcileOutcome::Failed(_));
        assert_matches!(fx.reconcile("avtr_x").await, ReconcileOutcome::Unchanged);
    }

    #[tokio::test]
    async fn no_clear_without_prior_session() {
        let mut fx = fixture(&[]);
        let _ = fx.reconcile("avtr_x").await;
        assert!(fx.types().is_empty());
    }

    #[tokio::test]
    async fn all_colliding_parameters_fail() {
        let colliding = r#"{"name":"Dup","parameters":[
            {"name":"VR","input":{"address":"/avatar/parameters/VRMode","type":"Int"}}
        ]}"#;
        let mut fx = fixture(&[("avtr_dup", colliding)]);

        assert_matches!(
            fx.reconcile("avtr_dup").await,
            ReconcileOutcome::Failed(AvatarError::NothingAccepted { .. })
        );
        assert!(fx.types().is_empty());
        assert_eq!(fx.registry.dynamic_len(), 0);
    }

    #[tokio::test]
    async fn malformed_definition_fails_with_parse_error() {
        let mut fx = fixture(&[("avtr_bad", "{ not json")]);
        assert_matches!(
            fx.reconcile("avtr_bad").await,
            ReconcileOutcome::Failed(AvatarError::Parse(_))
        );
        assert_eq!(fx.loader.phase(), LoadPhase::Failed);
    }

    #[tokio::test]
    async fn partial_collision_keeps_the_rest() {
        let mixed = r#"{"name":"Mix","parameters":[
            {"name":"VR","input":{"address":"/avatar/parameters/VRMode","type":"Int"}},
            {"name":"Ears","input":{"address":"/avatar/parameters/Ears","type":"Bool"}}
        ]}"#;
        let mut fx = fixture(&[("avtr_mix", mixed)]);
        let _ = fx.reconcile("avtr_mix").await;

        let sent = frames(&mut fx.rx);
        let params = sent[0]["parameters"].as_array().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0]["name"], "Custom_Ears");
        assert_eq!(params[0]["type"], json!("Bool"));
    }
}
