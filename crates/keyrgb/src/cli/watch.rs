//! `watch` subcommand: follow window focus and re-theme the keyboard.

use std::sync::atomic::Ordering;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use keyrgb_lib::probe::PlatformProbe;
use keyrgb_lib::watcher::{FocusWatcher, WatchEvent, WatchSettings};

use super::{
    Config, DeviceSession, HidapiChannel, KeyboardController, KeyrgbError, RUNNING, Result,
    lighting,
};

fn print_event(event: &WatchEvent, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(event)
            .map_err(|e| KeyrgbError::Config(format!("JSON serialization failed: {e}")))?;
        println!("{line}");
        return Ok(());
    }
    match event {
        WatchEvent::Applied { change } => println!(
            "  {} ({}) -> theme {}",
            change.process, change.category, change.theme
        ),
        WatchEvent::DeviceUnavailable { change, error } => println!(
            "  {} ({}) -> waiting for keyboard: {error}",
            change.process, change.category
        ),
        WatchEvent::SendFailed { change, error } => {
            println!("  {} -> send failed: {error}", change.process)
        }
    }
    Ok(())
}

pub(super) fn cmd_watch(config: &Config, json: bool) -> Result<()> {
    let settings = WatchSettings::from(config);
    let channel = HidapiChannel::new()?;
    let session = DeviceSession::new(channel).with_preferred_path(&config.device_path);

    #[cfg(not(windows))]
    log::warn!(
        "foreground window detection is only available on Windows; no focus changes will be seen"
    );

    if !json {
        println!(
            "[config] keys {} at {}%, polling every {} ms",
            lighting::format_color(settings.key_color),
            settings.intensity,
            settings.poll_interval.as_millis()
        );
        println!("Watching focus. Press Ctrl+C to stop.");
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = FocusWatcher::new(
        KeyboardController::from_session(session),
        PlatformProbe::default(),
        settings,
    )
    .with_events(tx);
    watcher.start()?;

    while RUNNING.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(250)) {
            Ok(event) => print_event(&event, json)?,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    watcher.stop();
    if !json {
        println!("Stopped.");
    }
    Ok(())
}
