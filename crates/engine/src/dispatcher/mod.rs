//! The gesture dispatcher.
//!
//! [`GestureHandler`] is the input-side handle: it answers key events
//! synchronously and posts work to a single dispatcher task. Proximity
//! readings, torch callbacks and binding updates are posted to the same
//! queue, so all engine state is only touched from that task.

pub mod state;

use crate::action_map::{ActionMap, Resolution};
use crate::config::EngineConfig;
use crate::config_sync::{self, ConfigSync};
use crate::executor::ActionExecutor;
use crate::input::{KeyAction, KeyDisposition, KeyEvent};
use crate::platform::{Services, SetupState, TorchListenerRef};
use crate::proximity::{ProximityGate, ProximityWait};
use crate::torch::TorchCallback;
use gestures_driver::{GestureCatalog, GestureDriver};
use gestures_events::{ActionCode, BindingsUpdate};
use gestures_storage::prefs;
use state::{
    DispatchState, PendingRequest, ReadingOutcome, RequestId, RequestOutcome, TimeoutOutcome,
};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

pub(crate) enum DispatchMessage {
    Gesture(ActionCode),
    ProximityReading { request: RequestId, distance: f32 },
    Bindings(BindingsUpdate),
    TorchChanged { camera_id: String, enabled: bool },
    TorchUnavailable { camera_id: String },
    Reset,
    Sync(oneshot::Sender<()>),
    Shutdown,
}

pub(crate) type DispatchSender = mpsc::UnboundedSender<DispatchMessage>;
pub(crate) type WeakDispatchSender = mpsc::WeakUnboundedSender<DispatchMessage>;

/// Entry point of the engine.
///
/// Cheap to clone. The dispatcher task stops after [`GestureHandler::shutdown`]
/// or once every handle and [`ConfigSync`] is dropped.
#[derive(Clone)]
pub struct GestureHandler {
    action_map: ActionMap,
    setup: Arc<dyn SetupState>,
    tx: DispatchSender,
}

impl GestureHandler {
    /// Query the driver once and start the engine.
    ///
    /// An unreachable driver leaves the feature disabled for this session:
    /// the engine runs with no bindings and passes every key through.
    /// Must be called from within a tokio runtime.
    pub fn start(config: EngineConfig, services: Services, driver: &dyn GestureDriver) -> Self {
        let catalog = GestureCatalog::load_or_empty(driver);
        Self::with_catalog(config, services, &catalog)
    }

    /// Start the engine for an already loaded catalog.
    ///
    /// Initial bindings come from the persisted preferences, so a restarted
    /// engine doesn't depend on seeing a fresh update broadcast.
    pub fn with_catalog(config: EngineConfig, services: Services, catalog: &GestureCatalog) -> Self {
        let initial = prefs::current_bindings(
            services.preferences.as_ref(),
            catalog.gestures(),
            &config.default_actions,
        );
        let action_map = ActionMap::from_bindings(config_sync::bindings_from_update(&initial));

        let (tx, rx) = mpsc::unbounded_channel();
        let torch_listener: TorchListenerRef = Arc::new(TorchCallback::new(tx.downgrade()));
        services.camera.register_torch_listener(torch_listener);

        let dispatcher = Dispatcher::new(&config, &services, action_map.clone(), tx.downgrade());
        tokio::spawn(dispatcher.run(rx));

        tracing::info!(
            gestures = catalog.len(),
            bindings = action_map.len(),
            "gesture engine started"
        );

        Self {
            action_map,
            setup: services.setup.clone(),
            tx,
        }
    }

    /// Decide what happens to a key event.
    ///
    /// Called on the input thread; never blocks.
    pub fn handle_key_event(&self, event: &KeyEvent) -> KeyDisposition {
        let Resolution::Bound(action) = self.action_map.resolve(event.scan_code) else {
            return KeyDisposition::PassThrough;
        };
        if event.action != KeyAction::Up || !self.setup.is_user_setup_complete() {
            return KeyDisposition::PassThrough;
        }
        if action.is_none() {
            return KeyDisposition::Consumed;
        }

        if self.tx.send(DispatchMessage::Gesture(action)).is_err() {
            tracing::warn!(action = %action, "dispatcher stopped, gesture dropped");
        }
        KeyDisposition::Consumed
    }

    pub fn action_map(&self) -> &ActionMap {
        &self.action_map
    }

    /// Handle for delivering binding updates to this engine.
    pub fn config_sync(&self) -> ConfigSync {
        ConfigSync::new(self.tx.clone())
    }

    /// Resolves once every message posted before the call was handled.
    pub async fn sync(&self) {
        let (reply, done) = oneshot::channel();
        if self.tx.send(DispatchMessage::Sync(reply)).is_ok() {
            let _ = done.await;
        }
    }

    /// Abandon a pending request, if any.
    pub fn reset(&self) {
        let _ = self.tx.send(DispatchMessage::Reset);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(DispatchMessage::Shutdown);
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

struct Dispatcher {
    state: DispatchState,
    gate: ProximityGate,
    executor: ActionExecutor,
    action_map: ActionMap,
    wait: Option<ProximityWait>,
    tx: WeakDispatchSender,
}

impl Dispatcher {
    fn new(
        config: &EngineConfig,
        services: &Services,
        action_map: ActionMap,
        tx: WeakDispatchSender,
    ) -> Self {
        Self {
            state: DispatchState::new(),
            gate: ProximityGate::new(services, config),
            executor: ActionExecutor::new(services, config),
            action_map,
            wait: None,
            tx,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DispatchMessage>) {
        tracing::debug!("gesture dispatcher running");

        loop {
            let message = match self.state.deadline() {
                Some(deadline) => tokio::select! {
                    biased;
                    message = rx.recv() => message,
                    _ = tokio::time::sleep_until(deadline) => {
                        self.on_timeout();
                        continue;
                    }
                },
                None => rx.recv().await,
            };

            let Some(message) = message else {
                break;
            };
            if !self.handle(message) {
                break;
            }
        }

        if let Some(request) = self.state.cancel() {
            tracing::debug!(request = request.id, "pending gesture dropped on shutdown");
        }
        self.finish_wait();
        tracing::info!("gesture dispatcher stopped");
    }

    /// Returns false when the dispatcher should stop.
    fn handle(&mut self, message: DispatchMessage) -> bool {
        match message {
            DispatchMessage::Gesture(action) => self.on_gesture(action),
            DispatchMessage::ProximityReading { request, distance } => {
                self.on_reading(request, distance)
            }
            DispatchMessage::Bindings(update) => {
                let count = self
                    .action_map
                    .replace_all(config_sync::bindings_from_update(&update));
                tracing::debug!(bindings = count, "gesture bindings replaced");
            }
            DispatchMessage::TorchChanged { camera_id, enabled } => {
                self.executor.on_torch_mode_changed(&camera_id, enabled);
            }
            DispatchMessage::TorchUnavailable { camera_id } => {
                self.executor.on_torch_mode_unavailable(&camera_id);
            }
            DispatchMessage::Reset => {
                if let Some(request) = self.state.cancel() {
                    tracing::debug!(request = request.id, "pending gesture reset");
                }
                self.finish_wait();
            }
            DispatchMessage::Sync(reply) => {
                let _ = reply.send(());
            }
            DispatchMessage::Shutdown => return false,
        }
        true
    }

    fn on_gesture(&mut self, action: ActionCode) {
        let proximity_timeout = self.gate.is_enabled().then(|| self.gate.timeout());

        match self
            .state
            .request(action, proximity_timeout, Instant::now())
        {
            RequestOutcome::Busy => {
                tracing::debug!(action = %action, "gesture already pending, dropped");
            }
            RequestOutcome::Armed(request) => self.dispatch(request),
            RequestOutcome::AwaitProximity(request) => {
                match self.gate.begin(self.reading_listener(request.id)) {
                    Ok(wait) => {
                        tracing::debug!(request = request.id, action = %action, "waiting for proximity sensor");
                        self.wait = Some(wait);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "proximity check unavailable, gesture dropped");
                        self.state.cancel();
                    }
                }
            }
        }
    }

    fn on_reading(&mut self, request: RequestId, distance: f32) {
        let Some(maximum_range) = self.gate.maximum_range() else {
            return;
        };

        match self.state.on_reading(request, distance, maximum_range) {
            ReadingOutcome::Stale => {
                tracing::trace!(request, "late proximity reading ignored");
            }
            ReadingOutcome::Near => {
                tracing::trace!(request, distance, "screen covered, still waiting");
            }
            ReadingOutcome::Far(armed) => {
                self.finish_wait();
                self.dispatch(armed);
            }
        }
    }

    fn on_timeout(&mut self) {
        let Some(request) = self.state.pending().map(|p| p.id) else {
            return;
        };
        if let TimeoutOutcome::Expired(expired) = self.state.on_timeout(request) {
            self.finish_wait();
            tracing::debug!(
                request = expired.id,
                action = %expired.action,
                "proximity check timed out, gesture suppressed"
            );
        }
    }

    fn dispatch(&mut self, request: PendingRequest) {
        self.executor.execute(request.action);
        self.state.complete(request.id);
    }

    fn finish_wait(&mut self) {
        if let Some(wait) = self.wait.take() {
            wait.finish();
        }
    }

    /// Sensor callback posting readings for `request` onto the queue.
    fn reading_listener(&self, request: RequestId) -> crate::platform::ProximityListener {
        let tx = self.tx.clone();
        Arc::new(move |distance: f32| {
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(DispatchMessage::ProximityReading { request, distance });
            }
        })
    }
}
