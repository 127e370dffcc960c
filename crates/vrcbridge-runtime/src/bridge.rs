//! The dispatch loop.
//!
//! [`Bridge`] owns the registry, the avatar loader, and the subscriber set,
//! and is the only code that mutates them. Everything else (the OSC listener
//! thread, WebSocket tasks, the health endpoint) sends a [`BridgeMessage`]
//! through a [`BridgeHandle`]. Messages are processed strictly in arrival
//! order, one at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use vrcbridge_core::constants::AVATAR_CHANGE_ADDRESS;
use vrcbridge_core::{Category, ClientMessage, ParamValue, ServerMessage};
use vrcbridge_osc::OscSender;

use crate::avatar::AvatarLoader;
use crate::commands::handle_command;
use crate::hub::{BroadcastHub, send_to};
use crate::inbound::{EventKind, InboundEvent};
use crate::metrics::{INBOUND_DROPS_TOTAL, INBOUND_EVENTS_TOTAL};
use crate::registry::Registry;
use crate::subscriber::Subscriber;

/// Work for the dispatch loop.
pub enum BridgeMessage {
    /// A classified OSC message.
    Osc(InboundEvent),
    /// A panel connected. It receives the snapshot before any later update.
    Connect(Arc<dyn Subscriber>),
    /// A panel disconnected.
    Disconnect(String),
    /// A panel sent a command.
    Client {
        /// Issuing connection id.
        from: String,
        /// The command.
        message: ClientMessage,
    },
    /// Status query.
    Status(oneshot::Sender<BridgeStatus>),
}

impl std::fmt::Debug for BridgeMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Osc(event) => f.debug_tuple("Osc").field(event).finish(),
            Self::Connect(sub) => f.debug_tuple("Connect").field(&sub.id()).finish(),
            Self::Disconnect(id) => f.debug_tuple("Disconnect").field(id).finish(),
            Self::Client { from, message } => f
                .debug_struct("Client")
                .field("from", from)
                .field("message", message)
                .finish(),
            Self::Status(_) => f.write_str("Status"),
        }
    }
}

/// Point-in-time view of the loop's state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeStatus {
    /// Live subscribers.
    pub subscribers: usize,
    /// Registered parameters, base and dynamic.
    pub parameters: usize,
    /// Display name of the active avatar session.
    pub active_avatar: Option<String>,
}

/// Cloneable sender side of the dispatch loop.
#[derive(Clone, Debug)]
pub struct BridgeHandle {
    tx: mpsc::UnboundedSender<BridgeMessage>,
    subscribers: Arc<AtomicUsize>,
}

impl BridgeHandle {
    /// Queue an inbound event. Never blocks; returns `false` (and logs) when
    /// the loop has stopped.
    pub fn enqueue(&self, event: InboundEvent) -> bool {
        let kind = event.kind.label();
        if self.tx.send(BridgeMessage::Osc(event)).is_ok() {
            metrics::counter!(INBOUND_EVENTS_TOTAL, "kind" => kind).increment(1);
            true
        } else {
            metrics::counter!(INBOUND_DROPS_TOTAL, "reason" => "closed").increment(1);
            warn!(kind, "dispatch loop unavailable, dropping inbound event");
            false
        }
    }

    /// Register a subscriber.
    pub fn connect(&self, subscriber: Arc<dyn Subscriber>) -> bool {
        self.tx.send(BridgeMessage::Connect(subscriber)).is_ok()
    }

    /// Unregister a subscriber.
    pub fn disconnect(&self, id: &str) -> bool {
        self.tx.send(BridgeMessage::Disconnect(id.to_owned())).is_ok()
    }

    /// Submit a command on behalf of subscriber `from`.
    pub fn submit(&self, from: &str, message: ClientMessage) -> bool {
        self.tx
            .send(BridgeMessage::Client {
                from: from.to_owned(),
                message,
            })
            .is_ok()
    }

    /// Ask the loop for its status. `None` if the loop has stopped.
    pub async fn status(&self) -> Option<BridgeStatus> {
        let (tx, rx) = oneshot::channel();
        self.tx.send(BridgeMessage::Status(tx)).ok()?;
        rx.await.ok()
    }

    /// Live subscriber count, as last published by the loop.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }
}

/// The single owner of bridge state.
pub struct Bridge {
    registry: Registry,
    loader: AvatarLoader,
    hub: BroadcastHub,
    sender: Arc<dyn OscSender>,
    rx: mpsc::UnboundedReceiver<BridgeMessage>,
    poll_interval: Duration,
}

impl Bridge {
    /// Build the loop and its handle.
    ///
    /// `poll_interval` bounds how long the loop waits on an empty queue
    /// before re-checking for shutdown.
    pub fn new(
        registry: Registry,
        loader: AvatarLoader,
        sender: Arc<dyn OscSender>,
        poll_interval: Duration,
    ) -> (Self, BridgeHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscribers = Arc::new(AtomicUsize::new(0));
        let bridge = Self {
            registry,
            loader,
            hub: BroadcastHub::new(Arc::clone(&subscribers)),
            sender,
            rx,
            poll_interval,
        };
        (bridge, BridgeHandle { tx, subscribers })
    }

    /// Process messages until `cancel` fires or every handle is dropped.
    ///
    /// A message already being processed runs to completion; cancellation
    /// only prevents the next one from starting.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!(parameters = self.registry.len(), "dispatch loop started");
        while !cancel.is_cancelled() {
            match tokio::time::timeout(self.poll_interval, self.rx.recv()).await {
                Ok(Some(message)) => self.process(message).await,
                Ok(None) => {
                    debug!("all bridge handles dropped");
                    break;
                }
                Err(_) => {}
            }
        }
        info!("dispatch loop stopped");
    }

    /// Process one message.
    pub async fn process(&mut self, message: BridgeMessage) {
        match message {
            BridgeMessage::Osc(event) => self.dispatch(event).await,
            BridgeMessage::Connect(subscriber) => self.connect(subscriber).await,
            BridgeMessage::Disconnect(id) => {
                let _ = self.hub.remove(&id);
            }
            BridgeMessage::Client { from, message } => {
                debug!(conn_id = %from, ?message, "client command");
                let _ = handle_command(
                    message,
                    &mut self.registry,
                    self.sender.as_ref(),
                    &mut self.hub,
                )
                .await;
            }
            BridgeMessage::Status(reply) => {
                let _ = reply.send(self.status());
            }
        }
    }

    /// Take the next queued message without waiting.
    pub fn try_next(&mut self) -> Option<BridgeMessage> {
        self.rx.try_recv().ok()
    }

    /// Process every message currently queued.
    pub async fn drain(&mut self) {
        while let Some(message) = self.try_next() {
            self.process(message).await;
        }
    }

    /// Current status.
    pub fn status(&self) -> BridgeStatus {
        BridgeStatus {
            subscribers: self.hub.len(),
            parameters: self.registry.len(),
            active_avatar: self.loader.session().map(|s| s.entity_name.clone()),
        }
    }

    /// The registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The avatar loader.
    pub fn loader(&self) -> &AvatarLoader {
        &self.loader
    }

    /// Deliver the snapshot, then join the live set.
    ///
    /// Runs on the loop like every other message, so no broadcast can land
    /// between the snapshot and the subscriber being added.
    async fn connect(&mut self, subscriber: Arc<dyn Subscriber>) {
        let snapshot = self.registry.snapshot();
        let init = ServerMessage::Init {
            parameters: snapshot.base,
        };
        if !send_to(subscriber.as_ref(), &init).await {
            warn!(conn_id = %subscriber.id(), "snapshot delivery failed, not subscribing");
            return;
        }
        if let Some(session) = self.loader.session() {
            let custom = ServerMessage::CustomParams {
                avatar_name: session.entity_name.clone(),
                parameters: snapshot.dynamic,
            };
            if !send_to(subscriber.as_ref(), &custom).await {
                warn!(conn_id = %subscriber.id(), "avatar snapshot delivery failed, not subscribing");
                return;
            }
        }
        self.hub.add(subscriber);
    }

    #[instrument(skip_all, fields(address = %event.address, kind = event.kind.label()))]
    async fn dispatch(&mut self, event: InboundEvent) {
        let InboundEvent { address, kind } = event;
        match kind {
            EventKind::IdentityChange { entity_id } => {
                let _ = self
                    .loader
                    .reconcile(&entity_id, &mut self.registry, &mut self.hub)
                    .await;
                self.update(Category::System, AVATAR_CHANGE_ADDRESS, ParamValue::String(entity_id))
                    .await;
            }
            EventKind::Pose { components } => {
                let outputs: Vec<ServerMessage> = self
                    .registry
                    .pose_components_mut(&address)
                    .filter_map(|param| {
                        let value = components.get(param.component_index?)?.clone();
                        Some(ServerMessage::Output {
                            value: param.assign(value).clone(),
                            name: param.name.clone(),
                            category: param.category,
                        })
                    })
                    .collect();
                if outputs.is_empty() {
                    debug!("no pose composite at address");
                }
                for output in &outputs {
                    let _ = self.hub.broadcast(output).await;
                }
            }
            EventKind::Update { category, value } => {
                self.update(category, &address, value).await;
            }
        }
    }

    async fn update(&mut self, category: Category, address: &str, value: ParamValue) {
        let Some(param) = self.registry.resolve_mut(category, address) else {
            debug!(address, %category, "no parameter registered for address");
            return;
        };
        let output = ServerMessage::Output {
            value: param.assign(value).clone(),
            name: param.name.clone(),
            category: param.category,
        };
        let _ = self.hub.broadcast(&output).await;
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("parameters", &self.registry.len())
            .field("hub", &self.hub)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
