//! Initialization coordinator.
//!
//! Drives one configuration through the whole pipeline:
//! ```text
//! resolve source  -> Absent / invalid URL fails immediately
//! load            -> the only network suspension point
//! validate        -> violations are logged, never fatal
//! apply           -> mount viewer, await readiness, mount options UI
//! ```
//!
//! Construction spawns the pipeline and returns right away. Every terminal
//! failure is caught here, logged, and published as
//! [`ResolutionOutcome::Failed`]; nothing is retried.

mod collaborators;
mod state;

pub use collaborators::{
    CollaboratorError, FatalErrorRenderer, OptionsTarget, OptionsView, Viewer, ViewerTarget,
};
pub use state::{EmbedPolicy, InitError, Phase, ResolutionOutcome, EMBEDDING_DISALLOWED_MESSAGE};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::{ConfigObject, ConfigReference};
use crate::loader::{ConfigLoader, LoadError};
use crate::schema::{SchemaValidator, ValidationResult};
use crate::source::{resolve_from_host, ConfigSource, HostEnvironment, Resolution};

/// Everything a coordinator needs besides its mount targets.
#[derive(Clone)]
pub struct CoordinatorContext {
    pub host: HostEnvironment,
    pub loader: ConfigLoader,
    pub validator: Arc<SchemaValidator>,
    pub embed_policy: EmbedPolicy,
    pub fatal_renderer: Option<Arc<dyn FatalErrorRenderer>>,
}

impl CoordinatorContext {
    /// Create a context with the default HTTP loader and embedding allowed.
    pub fn new(host: HostEnvironment, validator: Arc<SchemaValidator>) -> Self {
        Self {
            host,
            loader: ConfigLoader::new(),
            validator,
            embed_policy: EmbedPolicy::default(),
            fatal_renderer: None,
        }
    }

    pub fn with_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_embed_policy(mut self, embed_policy: EmbedPolicy) -> Self {
        self.embed_policy = embed_policy;
        self
    }

    pub fn with_fatal_renderer(mut self, renderer: Arc<dyn FatalErrorRenderer>) -> Self {
        self.fatal_renderer = Some(renderer);
        self
    }
}

/// Mutable state guarded by one lock so that installing collaborators and
/// disposing them can never interleave.
#[derive(Default)]
struct Slot {
    phase: Phase,
    transitions: Vec<Phase>,
    /// Set while the options target is mounting against the installed
    /// viewer. The pipeline then owns both releases.
    mounting_options: bool,
    config: Option<Arc<ConfigObject>>,
    validation: Option<ValidationResult>,
    outcome: Option<ResolutionOutcome>,
    viewer: Option<Arc<dyn Viewer>>,
    options: Option<Box<dyn OptionsView>>,
}

struct Shared {
    slot: Mutex<Slot>,
    phase_tx: watch::Sender<Phase>,
}

impl Shared {
    fn set_phase(slot: &mut Slot, phase_tx: &watch::Sender<Phase>, phase: Phase) {
        slot.phase = phase;
        slot.transitions.push(phase);
        phase_tx.send_replace(phase);
    }

    /// Advance the pipeline phase. Returns false once the coordinator has
    /// been disposed, in which case the pipeline must stop.
    fn advance(&self, phase: Phase) -> bool {
        let mut slot = self.slot.lock();
        if slot.phase == Phase::Disposed {
            return false;
        }
        debug!("Phase {} -> {}", slot.phase, phase);
        Self::set_phase(&mut slot, &self.phase_tx, phase);
        true
    }

    fn fail(&self, err: InitError) {
        let mut slot = self.slot.lock();
        if slot.phase == Phase::Disposed {
            debug!("Discarding failure after dispose: {}", err);
            return;
        }
        error!("Configuration failed: {}", err);
        slot.outcome = Some(ResolutionOutcome::Failed(err));
        Self::set_phase(&mut slot, &self.phase_tx, Phase::Failed);
    }
}

/// Resolves one configuration and owns the collaborators built from it.
pub struct InitializationCoordinator {
    id: Uuid,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl InitializationCoordinator {
    /// Start resolving a configuration.
    ///
    /// Returns before resolution completes; the pipeline runs on the current
    /// tokio runtime. Use [`settled`](Self::settled) to wait for the outcome.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn construct(
        viewer_target: Arc<dyn ViewerTarget>,
        options_target: Arc<dyn OptionsTarget>,
        explicit_config: Option<ConfigObject>,
        context: CoordinatorContext,
    ) -> Self {
        let id = Uuid::new_v4();
        let (phase_tx, _) = watch::channel(Phase::Uninitialized);
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            phase_tx,
        });
        let cancel = CancellationToken::new();

        let pipeline = Pipeline {
            shared: shared.clone(),
            viewer_target,
            options_target,
            context,
        };
        let token = cancel.clone();
        let span = info_span!("coordinator", id = %id);

        tokio::spawn(
            async move {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Pipeline cancelled by dispose");
                    }
                    _ = pipeline.run(explicit_config) => {}
                }
            }
            .instrument(span),
        );

        Self { id, shared, cancel }
    }

    /// Instance id, also recorded on the pipeline's tracing span.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.shared.slot.lock().phase
    }

    /// Every phase entered since construction, in order.
    ///
    /// Unlike [`subscribe`](Self::subscribe), nothing is coalesced.
    pub fn transitions(&self) -> Vec<Phase> {
        self.shared.slot.lock().transitions.clone()
    }

    /// Watch phase transitions.
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    /// The canonical config, once loaded.
    pub fn config(&self) -> Option<Arc<ConfigObject>> {
        self.shared.slot.lock().config.clone()
    }

    /// Schema validation result of the canonical config, once loaded.
    pub fn validation(&self) -> Option<ValidationResult> {
        self.shared.slot.lock().validation.clone()
    }

    /// The pipeline's terminal outcome, if it has reached one.
    pub fn outcome(&self) -> Option<ResolutionOutcome> {
        self.shared.slot.lock().outcome.clone()
    }

    /// Wait until the pipeline is ready, failed, or the coordinator was
    /// disposed.
    ///
    /// Returns `None` when disposal came before the pipeline settled.
    pub async fn settled(&self) -> Option<ResolutionOutcome> {
        let mut rx = self.subscribe();
        if rx.wait_for(Phase::is_settled).await.is_err() {
            return None;
        }
        self.outcome()
    }

    /// Release the options UI, then the viewer.
    ///
    /// An in-flight load is cancelled and any late result is discarded.
    /// Disposing without live collaborators, or twice, is a logged no-op.
    pub fn dispose(&self) {
        let (options, viewer) = {
            let mut slot = self.shared.slot.lock();
            if slot.phase == Phase::Disposed {
                warn!(id = %self.id, "Coordinator already disposed");
                return;
            }
            self.cancel.cancel();
            let options = slot.options.take();
            let viewer = if slot.mounting_options {
                debug!(id = %self.id, "Options UI still mounting, pipeline releases the viewer");
                None
            } else {
                slot.viewer.take()
            };
            Shared::set_phase(&mut slot, &self.shared.phase_tx, Phase::Disposed);
            (options, viewer)
        };

        if options.is_none() && viewer.is_none() {
            debug!(id = %self.id, "Disposed coordinator without live collaborators");
        }
        if let Some(options) = options {
            options.dispose();
        }
        if let Some(viewer) = viewer {
            viewer.dispose();
        }
        info!(id = %self.id, "Coordinator disposed");
    }
}

/// The asynchronous half of a coordinator.
struct Pipeline {
    shared: Arc<Shared>,
    viewer_target: Arc<dyn ViewerTarget>,
    options_target: Arc<dyn OptionsTarget>,
    context: CoordinatorContext,
}

impl Pipeline {
    async fn run(self, explicit_config: Option<ConfigObject>) {
        if !self.shared.advance(Phase::Resolving) {
            return;
        }

        if self.context.host.embedded && !self.context.embed_policy.allow_embed {
            if let Some(renderer) = &self.context.fatal_renderer {
                renderer.render_fatal(EMBEDDING_DISALLOWED_MESSAGE);
            }
            self.shared.fail(InitError::EmbeddingDisallowed);
            return;
        }

        let reference = match self.resolve(explicit_config) {
            Ok(reference) => reference,
            Err(err) => {
                self.shared.fail(err.into());
                return;
            }
        };

        if !self.shared.advance(Phase::Loading) {
            return;
        }
        let config = match self.context.loader.load(reference).await {
            Ok(config) => config,
            Err(err) => {
                self.shared.fail(err.into());
                return;
            }
        };

        if !self.shared.advance(Phase::ValidatingAndApplying) {
            return;
        }
        let validation = self.context.validator.validate(&config);
        if !validation.is_valid() {
            let errors: Vec<String> = validation.errors().iter().map(ToString::to_string).collect();
            warn!("Config does not match the schema: {}", errors.join("; "));
        }

        let config = Arc::new(config);
        {
            let mut slot = self.shared.slot.lock();
            if slot.phase == Phase::Disposed {
                return;
            }
            slot.config = Some(config.clone());
            slot.validation = Some(validation);
        }

        if let Err(err) = self.apply(config.clone()).await {
            self.shared.fail(err.into());
            return;
        }

        let mut slot = self.shared.slot.lock();
        if slot.phase == Phase::Disposed {
            return;
        }
        slot.outcome = Some(ResolutionOutcome::Ready(config));
        Shared::set_phase(&mut slot, &self.shared.phase_tx, Phase::Ready);
        info!("Configuration ready");
    }

    /// Pick the source and log where the config comes from.
    fn resolve(&self, explicit_config: Option<ConfigObject>) -> Result<ConfigReference, LoadError> {
        match resolve_from_host(explicit_config.as_ref(), &self.context.host) {
            Resolution::Resolved { reference, source } => {
                match (&reference, source) {
                    (ConfigReference::RemoteUrl(url), ConfigSource::QueryString) => {
                        info!("Loading config from URL {}", url);
                    }
                    (ConfigReference::RemoteUrl(url), _) => {
                        info!("Loading default config URL {}", url);
                    }
                    (ConfigReference::Inline(_), ConfigSource::DefaultObject) => {
                        info!("Loading config from host default");
                    }
                    (ConfigReference::Inline(_), _) => {
                        debug!("Using explicit config");
                    }
                    (ConfigReference::Absent, _) => return Err(LoadError::NoSourceFound),
                }
                Ok(reference)
            }
            Resolution::InvalidUrl { value, reason } => Err(LoadError::InvalidUrl { value, reason }),
        }
    }

    /// Mount the viewer, wait for it, then mount the options UI.
    async fn apply(&self, config: Arc<ConfigObject>) -> Result<(), CollaboratorError> {
        let viewer = self.viewer_target.mount(config.model(), &config.params())?;
        {
            let mut slot = self.shared.slot.lock();
            if slot.phase == Phase::Disposed {
                drop(slot);
                viewer.dispose();
                return Ok(());
            }
            slot.viewer = Some(viewer.clone());
        }

        if let Err(err) = viewer.ready().await {
            self.release_viewer();
            return Err(err);
        }
        debug!("Viewer ready");
        {
            let mut slot = self.shared.slot.lock();
            if slot.phase == Phase::Disposed {
                return Ok(());
            }
            slot.mounting_options = true;
        }

        let mounted = self.options_target.mount(config.options(), viewer);

        let mut slot = self.shared.slot.lock();
        slot.mounting_options = false;
        let options = match mounted {
            Ok(options) => options,
            Err(err) => {
                drop(slot);
                self.release_viewer();
                return Err(err);
            }
        };
        if slot.phase == Phase::Disposed {
            let viewer = slot.viewer.take();
            drop(slot);
            options.dispose();
            if let Some(viewer) = viewer {
                viewer.dispose();
            }
            return Ok(());
        }
        slot.options = Some(options);
        Ok(())
    }

    fn release_viewer(&self) {
        let viewer = self.shared.slot.lock().viewer.take();
        if let Some(viewer) = viewer {
            viewer.dispose();
        }
    }
}
