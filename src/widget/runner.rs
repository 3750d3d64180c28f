//! Widget driver: server-first commands with local fallback, and the
//! local-tick / server-sync loops

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    services::{validate_duration_seconds, TimerAction},
    state::Timer,
};

use super::{
    client::{TimerApi, WidgetError},
    notifier::CompletionNotifier,
    render::Renderer,
    sync_state::{StatusSnapshot, WidgetState},
};

/// A user request fed into the running widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCommand {
    Start { name: Option<String>, seconds: u32 },
    Control { id: String, action: TimerAction },
    Quit,
}

impl WidgetCommand {
    /// Parse `start <seconds> [name]`, `pause|resume|stop <id>` or `quit`
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or_else(|| "empty command".to_string())?;

        match verb {
            "start" => {
                let seconds = parts
                    .next()
                    .ok_or_else(|| "usage: start <seconds> [name]".to_string())?
                    .parse::<u32>()
                    .map_err(|e| format!("invalid seconds: {}", e))?;
                let name = parts.collect::<Vec<_>>().join(" ");
                Ok(WidgetCommand::Start {
                    name: (!name.is_empty()).then_some(name),
                    seconds,
                })
            }
            "quit" | "exit" => Ok(WidgetCommand::Quit),
            other => {
                let action = other.parse::<TimerAction>().map_err(|e| e.to_string())?;
                let id = parts
                    .next()
                    .ok_or_else(|| format!("usage: {} <id>", action))?
                    .to_string();
                Ok(WidgetCommand::Control { id, action })
            }
        }
    }
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Intervals driving the two widget loops
#[derive(Debug, Clone, Copy)]
pub struct WidgetTiming {
    pub sync_interval: Duration,
    pub tick_interval: Duration,
}

impl Default for WidgetTiming {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(2),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// A status fetch running alongside the widget loop
type PendingFetch = Pin<Box<dyn Future<Output = Result<StatusSnapshot, WidgetError>> + Send>>;

/// Resolve the in-flight fetch, or never when there is none
async fn next_fetch(fetch: &mut Option<PendingFetch>) -> Result<StatusSnapshot, WidgetError> {
    match fetch {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

/// One rendered widget instance
pub struct Widget<A, N, R> {
    api: Arc<A>,
    state: WidgetState,
    notifier: N,
    renderer: R,
}

impl<A, N, R> Widget<A, N, R>
where
    A: TimerApi,
    N: CompletionNotifier,
    R: Renderer,
{
    pub fn new(api: A, notifier: N, renderer: R, history_limit: usize) -> Self {
        Self {
            api: Arc::new(api),
            state: WidgetState::new(history_limit),
            notifier,
            renderer,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    fn render(&mut self) {
        self.renderer.render(&self.state);
    }

    fn apply(&mut self, snapshot: StatusSnapshot) -> bool {
        let changed = self.state.reconcile(snapshot, &mut self.notifier);
        if changed {
            self.render();
        }
        changed
    }

    /// One reconciliation against the server. Returns true on a re-render.
    pub async fn sync_once(&mut self) -> bool {
        let fetched = self.api.fetch_status().await;
        self.apply_fetch(fetched)
    }

    fn apply_fetch(&mut self, fetched: Result<StatusSnapshot, WidgetError>) -> bool {
        match fetched {
            Ok(snapshot) => self.apply(snapshot),
            Err(e) => {
                debug!("Sync failed: {}", e);
                if self.state.mark_disconnected() {
                    warn!("Lost connection to timer server: {}", e);
                    self.render();
                    return true;
                }
                false
            }
        }
    }

    /// One local countdown step. Returns true on a re-render.
    pub fn tick_once(&mut self) -> bool {
        let changed = self.state.local_tick(&mut self.notifier);
        if changed {
            self.render();
        }
        changed
    }

    /// Start a timer on the server, or locally if it cannot be reached
    pub async fn start_timer(
        &mut self,
        name: Option<&str>,
        seconds: u32,
    ) -> Result<Timer, WidgetError> {
        let seconds = validate_duration_seconds(seconds as i64)
            .map_err(|e| WidgetError::Rejected(e.to_string()))?;

        match self.api.start_timer(name, seconds).await {
            Ok(envelope) => {
                let created = envelope.timer.clone().map(Timer::from);
                self.apply(StatusSnapshot::from(envelope));
                created.ok_or_else(|| {
                    WidgetError::Rejected("server response did not include the timer".to_string())
                })
            }
            Err(e) if e.is_unreachable() => {
                warn!("Server unreachable, starting timer locally: {}", e);
                self.state.mark_disconnected();
                let timer = self.state.create_local(name, seconds);
                self.render();
                Ok(timer)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply a control verb on the server, or locally if it cannot be
    /// reached. Returns whether the timer changed state.
    pub async fn control_timer(
        &mut self,
        timer_id: &str,
        action: TimerAction,
    ) -> Result<bool, WidgetError> {
        match self.api.control_timer(timer_id, action).await {
            Ok(envelope) => {
                let applied = envelope.success;
                if !applied {
                    info!("Server declined {} for {}: {}", action, timer_id, envelope.message);
                }
                self.apply(StatusSnapshot::from(envelope));
                Ok(applied)
            }
            Err(e) if e.is_unreachable() => {
                warn!("Server unreachable, applying {} locally: {}", action, e);
                self.state.mark_disconnected();
                let applied = self.state.control_local(timer_id, action);
                if applied {
                    self.render();
                }
                Ok(applied)
            }
            Err(e) => Err(e),
        }
    }

    /// Execute one user command. Returns false when the widget should quit.
    pub async fn execute(&mut self, command: WidgetCommand) -> bool {
        match command {
            WidgetCommand::Start { name, seconds } => {
                if let Err(e) = self.start_timer(name.as_deref(), seconds).await {
                    warn!("Could not start timer: {}", e);
                }
            }
            WidgetCommand::Control { id, action } => match self.state.resolve_id(&id) {
                Some(id) => {
                    if let Err(e) = self.control_timer(&id, action).await {
                        warn!("Could not {} timer: {}", action, e);
                    }
                }
                None => warn!("No single active timer matches '{}'", id),
            },
            WidgetCommand::Quit => return false,
        }
        true
    }

    /// Start a status fetch that does not borrow the widget
    fn spawn_fetch(&self) -> PendingFetch
    where
        A: 'static,
    {
        let api = Arc::clone(&self.api);
        Box::pin(async move { api.fetch_status().await })
    }

    /// Run both loops until `shutdown` resolves or a quit command arrives.
    ///
    /// State is only mutated inside select branches, and each branch runs
    /// to completion before the next is polled. The status fetch itself is
    /// polled as its own branch, so a slow server delays reconciliation
    /// without holding back local ticks. At most one fetch is in flight.
    /// The local tick only fires while a timer is running.
    pub async fn run<F>(
        mut self,
        timing: WidgetTiming,
        mut commands: mpsc::Receiver<WidgetCommand>,
        shutdown: F,
    ) -> Self
    where
        A: 'static,
        F: Future<Output = ()>,
    {
        info!(
            "Widget running: sync every {:?}, tick every {:?}",
            timing.sync_interval, timing.tick_interval
        );

        let mut sync = interval(timing.sync_interval.max(MIN_INTERVAL));
        sync.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut tick = interval(timing.tick_interval.max(MIN_INTERVAL));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut in_flight: Option<PendingFetch> = None;
        let mut local_ticking = false;
        let mut commands_open = true;
        tokio::pin!(shutdown);

        self.render();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Widget shutting down");
                    break;
                }
                _ = sync.tick(), if in_flight.is_none() => {
                    in_flight = Some(self.spawn_fetch());
                }
                fetched = next_fetch(&mut in_flight), if in_flight.is_some() => {
                    in_flight = None;
                    self.apply_fetch(fetched);
                }
                _ = tick.tick(), if local_ticking => {
                    self.tick_once();
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => {
                        // A fetch started before the command reports stale state
                        in_flight = None;
                        if !self.execute(command).await {
                            info!("Quit requested");
                            break;
                        }
                    }
                    None => commands_open = false,
                },
            }

            // Idle -> LocalTicking starts a fresh one-second cadence
            let running = self.state.has_running();
            if running && !local_ticking {
                tick.reset();
            }
            local_ticking = running;
        }

        self
    }
}
