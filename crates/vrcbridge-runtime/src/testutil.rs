//! Test doubles for the runtime.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use vrcbridge_core::ParamValue;
use vrcbridge_osc::OscSender;

use crate::subscriber::Subscriber;

/// Records every send.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, Vec<ParamValue>)>>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<(String, Vec<ParamValue>)> {
        self.sent.lock().clone()
    }
}

impl OscSender for RecordingSender {
    fn send(&self, address: &str, args: &[ParamValue]) {
        self.sent.lock().push((address.to_owned(), args.to_vec()));
    }
}

/// Subscriber backed by an unbounded channel.
pub struct ChannelSubscriber {
    id: String,
    tx: mpsc::UnboundedSender<Arc<String>>,
}

impl ChannelSubscriber {
    pub fn new(id: &str) -> (Arc<dyn Subscriber>, mpsc::UnboundedReceiver<Arc<String>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = Arc::new(Self {
            id: id.to_owned(),
            tx,
        });
        (sub, rx)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, payload: Arc<String>) -> bool {
        self.tx.send(payload).is_ok()
    }
}

/// Subscriber whose every delivery fails.
pub struct FailingSubscriber {
    id: String,
}

impl FailingSubscriber {
    pub fn new(id: &str) -> Arc<dyn Subscriber> {
        Arc::new(Self { id: id.to_owned() })
    }
}

#[async_trait]
impl Subscriber for FailingSubscriber {
    fn id(&self) -> &str {
        &self.id
    }

    async fn deliver(&self, _payload: Arc<String>) -> bool {
        false
    }
}

/// Drain every frame currently queued for a subscriber, parsed as JSON.
pub fn frames(rx: &mut mpsc::UnboundedReceiver<Arc<String>>) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        out.push(serde_json::from_str(&frame).unwrap());
    }
    out
}

/// Write an avatar definition under `<root>/usr_<user>/Avatars/<id>.json`.
pub fn write_definition(root: &std::path::Path, user: &str, id: &str, body: &str) {
    let dir = root.join(format!("usr_{user}")).join("Avatars");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{id}.json")), body).unwrap();
}
