//! Fakes shared by the unit tests: a scripted transport and collaborators
//! that record what they were given.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Notify;
use url::Url;

use crate::coordinator::{
    CollaboratorError, FatalErrorRenderer, OptionsTarget, OptionsView, Viewer, ViewerTarget,
};
use crate::domain::Params;
use crate::loader::{ConfigTransport, TransportError};

/// Transport answering from a fixed table of URLs.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: HashMap<String, Result<Vec<u8>, TransportError>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.as_bytes().to_vec()));
        self
    }

    pub(crate) fn fail(mut self, url: &str, err: TransportError) -> Self {
        self.responses.insert(url.to_string(), Err(err));
        self
    }

    /// Hold every response until the gate is notified.
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigTransport for FakeTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Request(format!("no route to {}", url))))
    }
}

/// Ordered log of collaborator calls.
#[derive(Clone, Default)]
pub(crate) struct Events(Arc<Mutex<Vec<String>>>);

impl Events {
    pub(crate) fn push(&self, event: &str) {
        self.0.lock().push(event.to_string());
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

/// How a fake viewer reports readiness.
#[derive(Clone)]
pub(crate) enum ReadyBehavior {
    Immediate,
    Fail(String),
    Gate(Arc<Notify>),
}

pub(crate) struct RecordingViewer {
    events: Events,
    ready: ReadyBehavior,
}

#[async_trait]
impl Viewer for RecordingViewer {
    async fn ready(&self) -> Result<(), CollaboratorError> {
        match &self.ready {
            ReadyBehavior::Immediate => {}
            ReadyBehavior::Fail(message) => return Err(CollaboratorError::new(message.clone())),
            ReadyBehavior::Gate(gate) => gate.notified().await,
        }
        self.events.push("viewer.ready");
        Ok(())
    }

    fn dispose(&self) {
        self.events.push("viewer.dispose");
    }
}

pub(crate) struct RecordingOptionsView {
    events: Events,
}

impl OptionsView for RecordingOptionsView {
    fn dispose(&self) {
        self.events.push("options.dispose");
    }
}

/// Address of the data behind a viewer handle, for identity checks.
pub(crate) fn viewer_addr(viewer: &Arc<dyn Viewer>) -> usize {
    Arc::as_ptr(viewer) as *const () as usize
}

pub(crate) struct RecordingViewerTarget {
    pub(crate) events: Events,
    ready: ReadyBehavior,
    fail_mount: bool,
    pub(crate) mounts: Mutex<Vec<(Value, Params)>>,
    pub(crate) viewer: Mutex<Option<usize>>,
}

impl RecordingViewerTarget {
    pub(crate) fn new(events: Events) -> Self {
        Self {
            events,
            ready: ReadyBehavior::Immediate,
            fail_mount: false,
            mounts: Mutex::new(Vec::new()),
            viewer: Mutex::new(None),
        }
    }

    pub(crate) fn with_ready(mut self, ready: ReadyBehavior) -> Self {
        self.ready = ready;
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    pub(crate) fn mount_count(&self) -> usize {
        self.mounts.lock().len()
    }
}

impl ViewerTarget for RecordingViewerTarget {
    fn mount(&self, model: &Value, params: &Params) -> Result<Arc<dyn Viewer>, CollaboratorError> {
        self.mounts.lock().push((model.clone(), params.clone()));
        if self.fail_mount {
            return Err(CollaboratorError::new("viewer mount failed"));
        }
        self.events.push("viewer.mount");
        let viewer: Arc<dyn Viewer> = Arc::new(RecordingViewer {
            events: self.events.clone(),
            ready: self.ready.clone(),
        });
        *self.viewer.lock() = Some(viewer_addr(&viewer));
        Ok(viewer)
    }
}

/// Test-side handle of an options mount that blocks its worker thread.
pub(crate) struct MountHold {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl MountHold {
    /// Block until the mount has started.
    pub(crate) fn wait_entered(&self) {
        self.entered.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    pub(crate) fn release(&self) {
        self.release.send(()).unwrap();
    }
}

pub(crate) struct RecordingOptionsTarget {
    events: Events,
    fail_mount: bool,
    hold: Option<Mutex<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
    pub(crate) mounts: Mutex<Vec<(Value, usize)>>,
}

impl RecordingOptionsTarget {
    pub(crate) fn new(events: Events) -> Self {
        Self {
            events,
            fail_mount: false,
            hold: None,
            mounts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    /// Make `mount` block until the returned hold is released.
    pub(crate) fn held(mut self) -> (Self, MountHold) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.hold = Some(Mutex::new((entered_tx, release_rx)));
        let hold = MountHold {
            entered: entered_rx,
            release: release_tx,
        };
        (self, hold)
    }

    pub(crate) fn mount_count(&self) -> usize {
        self.mounts.lock().len()
    }
}

impl OptionsTarget for RecordingOptionsTarget {
    fn mount(
        &self,
        options: &Value,
        viewer: Arc<dyn Viewer>,
    ) -> Result<Box<dyn OptionsView>, CollaboratorError> {
        if let Some(hold) = &self.hold {
            let hold = hold.lock();
            hold.0.send(()).unwrap();
            hold.1.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        self.mounts.lock().push((options.clone(), viewer_addr(&viewer)));
        if self.fail_mount {
            return Err(CollaboratorError::new("options mount failed"));
        }
        self.events.push("options.mount");
        Ok(Box::new(RecordingOptionsView {
            events: self.events.clone(),
        }))
    }
}

#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) messages: Mutex<Vec<String>>,
}

impl FatalErrorRenderer for RecordingRenderer {
    fn render_fatal(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
