use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::json;
use tokio::{net::TcpListener, sync::mpsc};

use countdown_tools::{
    api::create_router,
    services::{CommandService, ControlTimerRequest, Envelope, StartTimerRequest, TimerAction},
    state::{default_presets, shared_store, AppState, SharedStore, Timer, TimerStatus},
    tasks::{run_tick, timer_tick_task},
    widget::{
        CompletionNotifier, HttpTimerApi, Renderer, StatusSnapshot, TimerApi, Widget,
        WidgetCommand, WidgetError, WidgetState, WidgetTiming,
    },
};

// ==================== Test doubles ====================

#[derive(Clone, Default)]
struct SharedNotifier(Arc<Mutex<Vec<String>>>);

impl SharedNotifier {
    fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }
}

impl CompletionNotifier for SharedNotifier {
    fn notify(&mut self, timer: &Timer) {
        self.0.lock().unwrap().push(timer.id.clone());
    }
}

#[derive(Clone, Default)]
struct CountingRenderer(Arc<AtomicUsize>);

impl Renderer for CountingRenderer {
    fn render(&mut self, _state: &WidgetState) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-process server that can be switched offline
#[derive(Clone)]
struct FakeServer {
    store: SharedStore,
    commands: CommandService,
    online: Arc<AtomicBool>,
}

impl FakeServer {
    fn new() -> Self {
        let store = shared_store();
        let commands = CommandService::new(Arc::clone(&store), default_presets(), 10);
        Self {
            store,
            commands,
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), WidgetError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(WidgetError::Status {
                status: 503,
                message: "offline".to_string(),
            })
        }
    }
}

#[async_trait]
impl TimerApi for FakeServer {
    async fn fetch_status(&self) -> Result<StatusSnapshot, WidgetError> {
        self.check()?;
        let envelope = self
            .commands
            .get_timer_status()
            .map_err(|e| WidgetError::Rejected(e.to_string()))?;
        Ok(StatusSnapshot::from(envelope))
    }

    async fn start_timer(
        &self,
        name: Option<&str>,
        duration_seconds: u32,
    ) -> Result<Envelope, WidgetError> {
        self.check()?;
        self.commands
            .start_timer(&StartTimerRequest {
                name: name.map(str::to_string),
                duration_seconds: Some(json!(duration_seconds)),
            })
            .map_err(|e| WidgetError::Rejected(e.to_string()))
    }

    async fn control_timer(
        &self,
        timer_id: &str,
        action: TimerAction,
    ) -> Result<Envelope, WidgetError> {
        self.check()?;
        self.commands
            .control_timer(&ControlTimerRequest {
                timer_id: Some(timer_id.to_string()),
                action: Some(action.to_string()),
            })
            .map_err(|e| WidgetError::Rejected(e.to_string()))
    }
}

type TestWidget<A> = Widget<A, SharedNotifier, CountingRenderer>;

fn widget_for<A: TimerApi>(api: A) -> (TestWidget<A>, SharedNotifier, CountingRenderer) {
    let notifier = SharedNotifier::default();
    let renderer = CountingRenderer::default();
    let widget = Widget::new(api, notifier.clone(), renderer.clone(), 10);
    (widget, notifier, renderer)
}

// ==================== Sync protocol ====================

#[tokio::test]
async fn test_server_completion_is_reconciled_once() {
    let server = FakeServer::new();
    let (mut widget, notifier, _) = widget_for(server.clone());

    let timer = widget.start_timer(Some("X"), 10).await.unwrap();
    assert_eq!(widget.state().active().len(), 1);
    assert!(widget.state().is_connected());

    for _ in 0..10 {
        run_tick(&server.store).unwrap();
    }

    assert!(widget.sync_once().await);
    assert!(widget.state().active().is_empty());
    assert_eq!(widget.state().history()[0].id, timer.id);
    assert_eq!(widget.state().history()[0].status, TimerStatus::Completed);
    assert_eq!(notifier.count(), 1);

    assert!(!widget.sync_once().await);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_sync_without_changes_does_not_render() {
    let server = FakeServer::new();
    let (mut widget, _, renderer) = widget_for(server.clone());

    assert!(widget.sync_once().await);
    let renders = renderer.0.load(Ordering::SeqCst);
    assert!(!widget.sync_once().await);
    assert_eq!(renderer.0.load(Ordering::SeqCst), renders);
}

#[tokio::test]
async fn test_offline_start_falls_back_to_local() {
    let server = FakeServer::new();
    server.set_online(false);
    let (mut widget, notifier, _) = widget_for(server.clone());

    let timer = widget.start_timer(Some("Offline"), 2).await.unwrap();
    assert_eq!(timer.status, TimerStatus::Running);
    assert!(!widget.state().is_connected());
    assert_eq!(server.commands.get_timer_status().unwrap().active_timers.len(), 0);

    assert!(widget.control_timer(&timer.id, TimerAction::Pause).await.unwrap());
    assert!(!widget.tick_once());
    assert!(widget.control_timer(&timer.id, TimerAction::Resume).await.unwrap());

    widget.tick_once();
    widget.tick_once();
    assert!(widget.state().is_idle());
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_invalid_duration_is_rejected_without_fallback() {
    let server = FakeServer::new();
    let (mut widget, _, _) = widget_for(server);

    let result = widget.start_timer(Some("bad"), 0).await;
    assert!(matches!(result, Err(WidgetError::Rejected(_))));
    assert!(widget.state().is_idle());
}

#[tokio::test]
async fn test_server_decline_is_not_applied_locally() {
    let server = FakeServer::new();
    let (mut widget, _, _) = widget_for(server.clone());
    let timer = widget.start_timer(None, 30).await.unwrap();

    assert!(!widget.control_timer(&timer.id, TimerAction::Resume).await.unwrap());
    assert_eq!(widget.state().get(&timer.id).unwrap().status, TimerStatus::Running);
}

#[tokio::test]
async fn test_execute_resolves_id_prefix() {
    let server = FakeServer::new();
    let (mut widget, notifier, _) = widget_for(server.clone());
    let timer = widget.start_timer(Some("t"), 30).await.unwrap();

    let keep_running = widget
        .execute(WidgetCommand::Control {
            id: timer.id[..6].to_string(),
            action: TimerAction::Stop,
        })
        .await;

    assert!(keep_running);
    assert!(widget.state().is_idle());
    assert_eq!(widget.state().history()[0].status, TimerStatus::Stopped);
    assert_eq!(notifier.count(), 0);
    assert!(!widget.execute(WidgetCommand::Quit).await);
}

#[tokio::test(start_paused = true)]
async fn test_run_loop_tracks_server_to_completion() {
    let server = FakeServer::new();
    let ticker = tokio::spawn(timer_tick_task(Arc::clone(&server.store)));
    let (widget, notifier, _) = widget_for(server.clone());

    let (tx, rx) = mpsc::channel(4);
    tx.send(WidgetCommand::Start {
        name: Some("loop".to_string()),
        seconds: 3,
    })
    .await
    .unwrap();

    let widget = widget
        .run(
            WidgetTiming::default(),
            rx,
            tokio::time::sleep(Duration::from_millis(5500)),
        )
        .await;

    assert!(widget.state().active().is_empty());
    assert_eq!(widget.state().history().len(), 1);
    assert_eq!(widget.state().history()[0].name, "loop");
    assert_eq!(notifier.count(), 1);

    drop(tx);
    ticker.abort();
}

/// Server whose status fetch hangs before failing
struct HungServer {
    delay: Duration,
}

impl HungServer {
    fn unavailable() -> WidgetError {
        WidgetError::Status {
            status: 503,
            message: "unavailable".to_string(),
        }
    }
}

#[async_trait]
impl TimerApi for HungServer {
    async fn fetch_status(&self) -> Result<StatusSnapshot, WidgetError> {
        tokio::time::sleep(self.delay).await;
        Err(Self::unavailable())
    }

    async fn start_timer(&self, _: Option<&str>, _: u32) -> Result<Envelope, WidgetError> {
        Err(Self::unavailable())
    }

    async fn control_timer(&self, _: &str, _: TimerAction) -> Result<Envelope, WidgetError> {
        Err(Self::unavailable())
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_sync_does_not_hold_back_local_ticks() {
    let api = HungServer {
        delay: Duration::from_millis(1900),
    };
    let (mut widget, _, _) = widget_for(api);
    let timer = widget.start_timer(Some("offline"), 100).await.unwrap();

    let (_tx, rx) = mpsc::channel(1);
    let widget = widget
        .run(
            WidgetTiming::default(),
            rx,
            tokio::time::sleep(Duration::from_millis(20_500)),
        )
        .await;

    // 20 one-second ticks fit in 20.5s
    let remaining = widget.state().get(&timer.id).unwrap().remaining_seconds;
    assert!((79..=81).contains(&remaining), "remaining={}", remaining);
    assert!(!widget.state().is_connected());
}

/// Server whose status reply is captured at request time and delivered late
#[derive(Clone)]
struct LaggingServer {
    inner: FakeServer,
    delay: Duration,
}

#[async_trait]
impl TimerApi for LaggingServer {
    async fn fetch_status(&self) -> Result<StatusSnapshot, WidgetError> {
        let snapshot = self.inner.fetch_status().await;
        tokio::time::sleep(self.delay).await;
        snapshot
    }

    async fn start_timer(
        &self,
        name: Option<&str>,
        duration_seconds: u32,
    ) -> Result<Envelope, WidgetError> {
        self.inner.start_timer(name, duration_seconds).await
    }

    async fn control_timer(
        &self,
        timer_id: &str,
        action: TimerAction,
    ) -> Result<Envelope, WidgetError> {
        self.inner.control_timer(timer_id, action).await
    }
}

#[tokio::test(start_paused = true)]
async fn test_command_discards_fetch_started_before_it() {
    let api = LaggingServer {
        inner: FakeServer::new(),
        delay: Duration::from_millis(1500),
    };
    let (widget, notifier, _) = widget_for(api);

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(WidgetCommand::Start {
            name: Some("fresh".to_string()),
            seconds: 60,
        })
        .await
        .unwrap();
        // Hold the channel open past shutdown
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let widget = widget
        .run(
            WidgetTiming::default(),
            rx,
            tokio::time::sleep(Duration::from_millis(1900)),
        )
        .await;

    assert_eq!(widget.state().active().len(), 1);
    assert_eq!(widget.state().active()[0].name, "fresh");
    assert!(widget.state().history().is_empty());
    assert_eq!(notifier.count(), 0);
}

// ==================== Real HTTP ====================

async fn spawn_server() -> (String, Arc<AppState>) {
    let state = Arc::new(AppState::new(10, 2000));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

#[tokio::test]
async fn test_http_widget_round_trip() {
    let (url, state) = spawn_server().await;
    let api = HttpTimerApi::new(url, Duration::from_secs(2)).unwrap();
    let (mut widget, notifier, _) = widget_for(api);

    let timer = widget.start_timer(Some("Coffee Break"), 300).await.unwrap();
    assert_eq!(timer.remaining_seconds, 300);
    assert!(widget.state().is_connected());
    assert!(!widget.state().presets().is_empty());

    assert!(widget.control_timer(&timer.id, TimerAction::Pause).await.unwrap());
    assert_eq!(widget.state().active()[0].status, TimerStatus::Paused);
    assert!(!widget.control_timer(&timer.id, TimerAction::Pause).await.unwrap());
    assert!(widget.control_timer(&timer.id, TimerAction::Resume).await.unwrap());

    for _ in 0..300 {
        run_tick(&state.store).unwrap();
    }
    widget.sync_once().await;

    assert!(widget.state().active().is_empty());
    assert_eq!(widget.state().history()[0].id, timer.id);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_http_client_reports_server_rejection() {
    let (url, _state) = spawn_server().await;
    let api = HttpTimerApi::new(url, Duration::from_secs(2)).unwrap();

    let result = api.start_timer(None, 9000).await;
    match result {
        Err(WidgetError::Rejected(message)) => assert!(message.contains("durationSeconds")),
        other => panic!("expected rejection, got {:?}", other.map(|e| e.message)),
    }
}

#[tokio::test]
async fn test_unreachable_server_runs_locally() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpTimerApi::new(format!("http://{}", addr), Duration::from_millis(500)).unwrap();
    let (mut widget, _, _) = widget_for(api);

    let timer = widget.start_timer(Some("solo"), 60).await.unwrap();
    assert!(!widget.state().is_connected());
    assert_eq!(widget.state().active()[0].id, timer.id);

    assert!(!widget.sync_once().await);
    assert_eq!(widget.state().active().len(), 1);
}
