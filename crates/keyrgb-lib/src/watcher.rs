//! Focus watcher: polls the foreground application and re-themes the keyboard.
//!
//! One worker thread runs [`FocusWatcher::tick`] every poll interval. The
//! tracker and the controller live behind a single mutex that both the tick
//! and [`FocusWatcher::status`] take, so a status query never observes a
//! half-applied transition.
//!
//! Per tick:
//! 1. read the foreground process name (outside the lock);
//! 2. debounce it through [`FocusTracker`];
//! 3. on a change, connect first if needed, then encode and send once.
//!
//! A change that arrives while the keyboard is absent stays pending and the
//! connect is retried on later ticks under [`RetryBackoff`], until it succeeds
//! or a newer change replaces it. A failed send is reported and dropped.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use serde::Serialize;

use crate::config::{Config, MIN_POLL_INTERVAL_MS};
use crate::controller::KeyboardController;
use crate::device::{DeviceChannel, DiscoveredDevice};
use crate::focus::{AppCategory, FocusAction, FocusChange, FocusTracker};
use crate::lighting::{LightingTheme, Rgb, parse_color_or_default};
use crate::probe::ForegroundProbe;
use crate::reconnect::{self, BackoffPolicy, RetryBackoff};

/// Default time between foreground probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default key backlight intensity while watching (percent).
pub const DEFAULT_INTENSITY: i32 = 75;

/// What the watcher sends on every focus change.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    pub key_color: Rgb,
    pub intensity: i32,
    pub backoff: BackoffPolicy,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            key_color: Rgb::WHITE,
            intensity: DEFAULT_INTENSITY,
            backoff: BackoffPolicy::starting_at(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl From<&Config> for WatchSettings {
    fn from(config: &Config) -> Self {
        let poll_interval =
            Duration::from_millis(config.poll_interval_ms.max(MIN_POLL_INTERVAL_MS));
        Self {
            poll_interval,
            key_color: parse_color_or_default(&config.key_color),
            intensity: i32::from(config.key_intensity.min(100)),
            // First retry of a deferred change lands on the next poll.
            backoff: BackoffPolicy::starting_at(poll_interval),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    Idle,
    Polling,
}

/// Outcome of a tick that did something observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// The theme for a new focus was sent and acknowledged.
    Applied { change: FocusChange },
    /// The keyboard could not be opened; the change stays pending.
    DeviceUnavailable { change: FocusChange, error: String },
    /// The packet was not acknowledged. Not retried.
    SendFailed { change: FocusChange, error: String },
}

/// Snapshot returned by [`FocusWatcher::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchStatus {
    pub state: WatchState,
    pub last_process: Option<String>,
    pub category: Option<AppCategory>,
    pub theme: Option<LightingTheme>,
    /// A change is waiting for the keyboard to appear.
    pub pending: bool,
    pub connected: bool,
    pub device: Option<DiscoveredDevice>,
}

struct Shared<C: DeviceChannel> {
    tracker: FocusTracker,
    controller: KeyboardController<C>,
    current: Option<FocusChange>,
    pending: bool,
    backoff: RetryBackoff,
    state: WatchState,
}

impl<C: DeviceChannel> Shared<C> {
    fn step(&mut self, process_name: &str, settings: &WatchSettings) -> Option<WatchEvent> {
        match self.tracker.observe(process_name) {
            FocusAction::Changed(change) => {
                log::info!(
                    "focus: {} ({}) -> theme {}",
                    change.process,
                    change.category,
                    change.theme
                );
                self.current = Some(change.clone());
                self.pending = false;
                self.backoff.reset();
                self.apply(change, settings)
            }
            FocusAction::NoChange | FocusAction::Unreadable if self.pending => {
                let change = self.current.clone()?;
                self.apply(change, settings)
            }
            FocusAction::NoChange | FocusAction::Unreadable => None,
        }
    }

    fn apply(&mut self, change: FocusChange, settings: &WatchSettings) -> Option<WatchEvent> {
        if !self.controller.is_connected() {
            match reconnect::try_connect(&mut self.backoff, &mut self.controller)? {
                Ok(()) => {}
                Err(e) => {
                    self.pending = true;
                    return Some(WatchEvent::DeviceUnavailable {
                        change,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.pending = false;
        match self
            .controller
            .apply_theme(settings.key_color, settings.intensity, change.theme)
        {
            Ok(()) => Some(WatchEvent::Applied { change }),
            Err(e) => {
                log::warn!("failed to apply theme for {}: {e}", change.process);
                // Reopen on the next change in case the keyboard went away.
                self.controller.disconnect();
                Some(WatchEvent::SendFailed {
                    change,
                    error: e.to_string(),
                })
            }
        }
    }
}

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Polls a [`ForegroundProbe`] and drives a [`KeyboardController`].
pub struct FocusWatcher<C: DeviceChannel, P: ForegroundProbe> {
    shared: Arc<Mutex<Shared<C>>>,
    probe: Arc<P>,
    settings: WatchSettings,
    events: Option<Sender<WatchEvent>>,
    worker: Option<Worker>,
}

fn lock<C: DeviceChannel>(shared: &Mutex<Shared<C>>) -> MutexGuard<'_, Shared<C>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

fn run_tick<C: DeviceChannel, P: ForegroundProbe>(
    shared: &Mutex<Shared<C>>,
    probe: &P,
    settings: &WatchSettings,
    events: Option<&Sender<WatchEvent>>,
) -> Option<WatchEvent> {
    let name = probe.process_name();
    let event = lock(shared).step(&name, settings)?;
    if let Some(tx) = events {
        let _ = tx.send(event.clone());
    }
    Some(event)
}

impl<C: DeviceChannel, P: ForegroundProbe> FocusWatcher<C, P> {
    pub fn new(controller: KeyboardController<C>, probe: P, settings: WatchSettings) -> Self {
        FocusWatcher {
            shared: Arc::new(Mutex::new(Shared {
                tracker: FocusTracker::new(),
                controller,
                current: None,
                pending: false,
                backoff: RetryBackoff::new(settings.backoff.clone()),
                state: WatchState::Idle,
            })),
            probe: Arc::new(probe),
            settings,
            events: None,
            worker: None,
        }
    }

    /// Publish tick outcomes on `tx`. Must be set before [`start`](Self::start).
    pub fn with_events(mut self, tx: Sender<WatchEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn settings(&self) -> &WatchSettings {
        &self.settings
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Run one poll cycle on the calling thread.
    pub fn tick(&self) -> Option<WatchEvent> {
        run_tick(&self.shared, &*self.probe, &self.settings, self.events.as_ref())
    }

    pub fn state(&self) -> WatchState {
        lock(&self.shared).state
    }

    pub fn status(&self) -> WatchStatus {
        let shared = lock(&self.shared);
        let current = shared.current.as_ref();
        WatchStatus {
            state: shared.state,
            last_process: shared.tracker.last_process().map(str::to_string),
            category: current.map(|c| c.category),
            theme: current.map(|c| c.theme),
            pending: shared.pending,
            connected: shared.controller.is_connected(),
            device: shared.controller.device().cloned(),
        }
    }

    /// Stop polling and wait for the worker to exit. No-op when idle.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            if worker.handle.join().is_err() {
                log::warn!("watch worker panicked");
            }
            log::debug!("watcher stopped");
        }
        lock(&self.shared).state = WatchState::Idle;
    }
}

impl<C, P> FocusWatcher<C, P>
where
    C: DeviceChannel + Send + 'static,
    C::Stream: Send + 'static,
    P: ForegroundProbe + Send + Sync + 'static,
{
    /// Start the worker thread. No-op when already polling.
    pub fn start(&mut self) -> crate::error::Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let probe = Arc::clone(&self.probe);
        let settings = self.settings.clone();
        let events = self.events.clone();

        lock(&self.shared).state = WatchState::Polling;
        let spawned = std::thread::Builder::new()
            .name("keyrgb-watch".into())
            .spawn(move || {
                loop {
                    run_tick(&shared, &*probe, &settings, events.as_ref());
                    match stop_rx.recv_timeout(settings.poll_interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
            });

        match spawned {
            Ok(handle) => {
                log::debug!(
                    "watcher polling every {} ms",
                    self.settings.poll_interval.as_millis()
                );
                self.worker = Some(Worker { stop_tx, handle });
                Ok(())
            }
            Err(e) => {
                lock(&self.shared).state = WatchState::Idle;
                Err(e.into())
            }
        }
    }
}

impl<C: DeviceChannel, P: ForegroundProbe> Drop for FocusWatcher<C, P> {
    fn drop(&mut self) {
        self.stop();
    }
}
