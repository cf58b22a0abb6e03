//! Rotation & sync controller.
//!
//! A single Tokio task owns the [`RotationState`] and reacts to:
//!
//! - the rotation deadline (armed while two or more posters are loaded,
//!   re-armed whenever the list length or cycle speed changes),
//! - commands from the [`RotationController`] handle,
//! - store change events, or an interval poll when the store cannot push,
//! - completion of optimistic writes,
//! - cancellation.
//!
//! Every state change is published as a [`RotationView`] on a `watch`
//! channel. A failed initial load is retried with exponential backoff.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use poster_client::reconnect::{next_delay, ReconnectConfig};
use poster_core::error::CoreError;
use poster_core::poster::{PosterPatch, PosterRecord};
use poster_core::rotation::{Direction, ListChangePolicy, PendingEdit, Phase, RotationState};
use poster_core::settings::Settings;
use poster_core::store::{PosterStore, StoreEvent, Subscription, SubscriptionEvent};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::KioskConfig;

/// Buffered commands before `send` waits.
const COMMAND_BUFFER: usize = 32;

/// Default refetch period when the store has no change push.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Runtime knobs for the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub list_change_policy: ListChangePolicy,
    pub poll_interval: Duration,
    pub retry: ReconnectConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            list_change_policy: ListChangePolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry: ReconnectConfig::default(),
        }
    }
}

impl From<&KioskConfig> for ControllerOptions {
    fn from(config: &KioskConfig) -> Self {
        Self {
            list_change_policy: config.list_change_policy,
            poll_interval: config.poll_interval,
            retry: config.retry.clone(),
        }
    }
}

/// Snapshot of what the kiosk should display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationView {
    pub phase: Phase,
    pub index: usize,
    pub len: usize,
    pub current: Option<PosterRecord>,
    /// `"2 of 5"`-style label.
    pub position: Option<String>,
    pub cycle_speed_secs: u32,
    /// Last refresh or write failure, cleared by the next success.
    pub notice: Option<String>,
}

impl RotationView {
    fn from_state(state: &RotationState, settings: &Settings, notice: Option<String>) -> Self {
        Self {
            phase: state.phase().clone(),
            index: state.index(),
            len: state.len(),
            current: state.current().cloned(),
            position: state.position_label(),
            cycle_speed_secs: settings.cycle_speed_secs,
            notice,
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, CoreError>>;

enum Command {
    Navigate(Direction),
    Jump(usize, Reply<()>),
    Refresh,
    Update {
        id: String,
        patch: PosterPatch,
        reply: Reply<PosterRecord>,
    },
}

/// Result of a store write, returned to the controller task.
struct WriteOutcome {
    edit: Option<PendingEdit>,
    result: Result<PosterRecord, CoreError>,
    reply: Reply<PosterRecord>,
}

/// Handle to a running controller task.
///
/// Dropping the handle stops the task; [`shutdown`](Self::shutdown) also
/// waits for it to finish.
pub struct RotationController {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<RotationView>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RotationController {
    /// Spawn the controller over `store`. The initial load starts immediately.
    pub fn spawn(store: Arc<dyn PosterStore>, options: ControllerOptions) -> Self {
        let state = RotationState::new(options.list_change_policy);
        let settings = Settings::default();
        let (view_tx, view) = watch::channel(RotationView::from_state(&state, &settings, None));
        let (commands, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = Worker {
            store,
            state,
            settings,
            retry_delay: options.retry.initial_delay,
            options,
            deadline: None,
            retry_at: None,
            subscription: None,
            poll: None,
            notice: None,
            view_tx,
            writes_tx,
        };
        let task = tokio::spawn(worker.run(commands_rx, writes_rx, cancel.clone()));

        Self {
            commands,
            view,
            cancel,
            task,
        }
    }

    /// Subscribe to view updates.
    pub fn view(&self) -> watch::Receiver<RotationView> {
        self.view.clone()
    }

    /// The latest published view.
    pub fn current_view(&self) -> RotationView {
        self.view.borrow().clone()
    }

    /// Step to the previous or next poster. Ignored with fewer than two.
    pub async fn navigate(&self, direction: Direction) -> Result<(), CoreError> {
        self.send(Command::Navigate(direction)).await
    }

    /// Show the poster at zero-based `index`.
    pub async fn jump(&self, index: usize) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Jump(index, reply)).await?;
        rx.await.map_err(|_| stopped())?
    }

    /// Refetch posters and settings from the store.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.send(Command::Refresh).await
    }

    /// Edit a poster optimistically.
    ///
    /// The patch is shown at once. On failure the error is returned and the
    /// previous record put back, unless a newer store snapshot has already
    /// replaced the edit. The write itself is not cancelled by
    /// [`shutdown`](Self::shutdown).
    pub async fn update_poster(
        &self,
        id: impl Into<String>,
        patch: PosterPatch,
    ) -> Result<PosterRecord, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Update {
            id: id.into(),
            patch,
            reply,
        })
        .await?;
        rx.await.map_err(|_| stopped())?
    }

    /// Stop the timer and subscription and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Rotation controller task failed");
        }
    }

    async fn send(&self, command: Command) -> Result<(), CoreError> {
        self.commands.send(command).await.map_err(|_| stopped())
    }
}

fn stopped() -> CoreError {
    CoreError::Internal("Rotation controller has stopped".into())
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

enum Wake {
    Stop,
    Tick,
    Retry,
    Command(Command),
    Write(WriteOutcome),
    Change(SubscriptionEvent),
    Poll,
}

struct Worker {
    store: Arc<dyn PosterStore>,
    state: RotationState,
    settings: Settings,
    options: ControllerOptions,
    /// Next automatic advance.
    deadline: Option<Instant>,
    /// Next initial-load attempt after a failure.
    retry_at: Option<Instant>,
    retry_delay: Duration,
    subscription: Option<Subscription>,
    poll: Option<Interval>,
    notice: Option<String>,
    view_tx: watch::Sender<RotationView>,
    writes_tx: mpsc::UnboundedSender<WriteOutcome>,
}

impl Worker {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut writes: mpsc::UnboundedReceiver<WriteOutcome>,
        cancel: CancellationToken,
    ) {
        self.subscription = self.store.subscribe();
        if self.subscription.is_none() {
            tracing::info!(
                poll_interval_secs = self.options.poll_interval.as_secs(),
                "Store has no change push, polling",
            );
            self.start_polling();
        }

        if !self.refresh(&cancel).await {
            return;
        }

        loop {
            let wake = tokio::select! {
                () = cancel.cancelled() => Wake::Stop,
                () = sleep_until(self.deadline) => Wake::Tick,
                () = sleep_until(self.retry_at) => Wake::Retry,
                command = commands.recv() => match command {
                    Some(command) => Wake::Command(command),
                    None => Wake::Stop,
                },
                Some(outcome) = writes.recv() => Wake::Write(outcome),
                event = next_change(&mut self.subscription) => Wake::Change(event),
                () = next_poll(&mut self.poll) => Wake::Poll,
            };

            let keep_running = match wake {
                Wake::Stop => false,
                Wake::Tick => {
                    self.tick();
                    true
                }
                Wake::Retry | Wake::Poll => self.refresh(&cancel).await,
                Wake::Command(command) => self.handle_command(command, &cancel).await,
                Wake::Write(outcome) => {
                    self.finish_write(outcome);
                    true
                }
                Wake::Change(event) => self.handle_change(event, &cancel).await,
            };
            if !keep_running {
                break;
            }
        }

        tracing::info!("Rotation controller stopped");
    }

    fn tick(&mut self) {
        self.state.tick();
        self.deadline = Some(Instant::now() + self.settings.cycle_duration());
        tracing::debug!(index = self.state.index(), "Rotation advanced");
        self.publish();
    }

    async fn handle_command(&mut self, command: Command, cancel: &CancellationToken) -> bool {
        match command {
            Command::Navigate(direction) => {
                if self.state.navigate(direction) {
                    self.publish();
                } else {
                    tracing::debug!(?direction, "Navigation ignored");
                }
            }
            Command::Jump(index, reply) => {
                let result = self.state.jump(index);
                if result.is_ok() {
                    self.publish();
                }
                let _ = reply.send(result);
            }
            Command::Refresh => return self.refresh(cancel).await,
            Command::Update { id, patch, reply } => self.start_write(id, patch, reply),
        }
        true
    }

    async fn handle_change(&mut self, event: SubscriptionEvent, cancel: &CancellationToken) -> bool {
        match event {
            SubscriptionEvent::Event(StoreEvent::Posters(posters)) => {
                let before = self.timer_key();
                self.state.replace_posters(posters);
                self.sync_timer(before);
                tracing::debug!(posters = self.state.len(), "Poster list changed");
                self.publish();
            }
            SubscriptionEvent::Event(StoreEvent::Settings(settings)) => {
                let before = self.timer_key();
                self.settings = settings;
                self.sync_timer(before);
                tracing::info!(cycle_speed_secs = settings.cycle_speed_secs, "Cycle speed changed");
                self.publish();
            }
            SubscriptionEvent::Lagged => {
                tracing::warn!("Change subscription lagged, refetching");
                return self.refresh(cancel).await;
            }
            SubscriptionEvent::Closed => {
                tracing::warn!("Change subscription closed, falling back to polling");
                self.subscription = None;
                self.start_polling();
            }
        }
        true
    }

    /// Fetch posters and settings. Returns `false` if cancelled meanwhile.
    async fn refresh(&mut self, cancel: &CancellationToken) -> bool {
        let fetched = tokio::select! {
            () = cancel.cancelled() => return false,
            fetched = fetch(self.store.as_ref()) => fetched,
        };

        match fetched {
            Ok((posters, settings)) => {
                let before = self.timer_key();
                match self.state.phase() {
                    Phase::Loading | Phase::Failed(_) => self.state.load_succeeded(posters),
                    Phase::Ready | Phase::Empty => self.state.replace_posters(posters),
                }
                self.settings = settings;
                self.retry_at = None;
                self.retry_delay = self.options.retry.initial_delay;
                self.notice = None;
                self.sync_timer(before);
                tracing::info!(
                    posters = self.state.len(),
                    cycle_speed_secs = self.settings.cycle_speed_secs,
                    "Posters loaded",
                );
            }
            Err(e) if self.is_loaded() => {
                tracing::warn!(error = %e, "Poster refresh failed, keeping current list");
                self.notice = Some(format!("Refresh failed: {e}"));
            }
            Err(e) => {
                // A retry soon will not fix a rejected token or bad data.
                if !e.is_transient() {
                    self.retry_delay = self.options.retry.max_delay;
                }
                tracing::warn!(
                    error = %e,
                    transient = e.is_transient(),
                    retry_in_ms = self.retry_delay.as_millis() as u64,
                    "Initial poster load failed",
                );
                self.state.load_failed(e.to_string());
                self.retry_at = Some(Instant::now() + self.retry_delay);
                self.retry_delay = next_delay(self.retry_delay, &self.options.retry);
            }
        }
        self.publish();
        true
    }

    fn start_write(&mut self, id: String, patch: PosterPatch, reply: Reply<PosterRecord>) {
        let edit = self.state.apply_patch(&id, &patch);
        if edit.is_some() {
            self.publish();
        }

        let store = Arc::clone(&self.store);
        let writes = self.writes_tx.clone();
        tokio::spawn(async move {
            let result = store.update_poster(&id, patch).await;
            let outcome = WriteOutcome {
                edit,
                result,
                reply,
            };
            // Controller gone: answer the caller directly.
            if let Err(mpsc::error::SendError(outcome)) = writes.send(outcome) {
                let _ = outcome.reply.send(outcome.result);
            }
        });
    }

    fn finish_write(&mut self, outcome: WriteOutcome) {
        match &outcome.result {
            Ok(record) => {
                tracing::info!(poster_id = %record.id, "Poster updated");
                self.state.reconcile(record.clone());
                self.notice = None;
            }
            Err(e) => {
                let rolled_back = outcome.edit.is_some_and(|edit| self.state.restore(edit));
                tracing::warn!(error = %e, rolled_back, "Poster update failed");
                self.notice = Some(format!("Update failed: {e}"));
            }
        }
        self.publish();
        let _ = outcome.reply.send(outcome.result);
    }

    fn is_loaded(&self) -> bool {
        matches!(self.state.phase(), Phase::Ready | Phase::Empty)
    }

    fn timer_key(&self) -> (usize, u32) {
        (self.state.len(), self.settings.cycle_speed_secs)
    }

    /// Re-arm the deadline when the list length or cycle speed changed.
    fn sync_timer(&mut self, (len_before, speed_before): (usize, u32)) {
        if !self.state.timer_enabled() {
            if self.deadline.take().is_some() {
                tracing::debug!("Rotation timer disarmed");
            }
            return;
        }
        let changed =
            len_before != self.state.len() || speed_before != self.settings.cycle_speed_secs;
        if changed || self.deadline.is_none() {
            self.deadline = Some(Instant::now() + self.settings.cycle_duration());
        }
    }

    fn start_polling(&mut self) {
        let period = self.options.poll_interval;
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.poll = Some(interval);
    }

    fn publish(&self) {
        self.view_tx.send_replace(RotationView::from_state(
            &self.state,
            &self.settings,
            self.notice.clone(),
        ));
    }
}

async fn fetch(store: &dyn PosterStore) -> Result<(Vec<PosterRecord>, Settings), CoreError> {
    tokio::try_join!(store.list_posters(), store.get_settings())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn next_change(subscription: &mut Option<Subscription>) -> SubscriptionEvent {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => pending().await,
    }
}

async fn next_poll(poll: &mut Option<Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}
