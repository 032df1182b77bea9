//! Integration tests: end-to-end focus sequences using MockChannel and ScriptedProbe.
//!
//! These drive the watcher through the public API and check the exact
//! packets that reach the keyboard.

use std::sync::mpsc;
use std::time::Duration;

use keyrgb_lib::controller::KeyboardController;
use keyrgb_lib::device::mock::{MockChannel, keyboard_endpoint, lighting_endpoint};
use keyrgb_lib::lighting::{LightingPacket, LightingTheme, Rgb};
use keyrgb_lib::probe::mock::ScriptedProbe;
use keyrgb_lib::protocol::*;
use keyrgb_lib::session::DeviceSession;
use keyrgb_lib::watcher::{FocusWatcher, WatchEvent, WatchSettings};

fn watcher(
    ch: MockChannel,
    names: &[&str],
    settings: WatchSettings,
) -> FocusWatcher<MockChannel, ScriptedProbe> {
    FocusWatcher::new(
        KeyboardController::new(ch),
        ScriptedProbe::new(names.iter().copied()),
        settings,
    )
}

fn accent(packet: &[u8]) -> (u8, u8) {
    (packet[OFF_LINE_COLOR], packet[OFF_VOLUME_COLOR])
}

// ── App switching ──

#[test]
fn app_switches_produce_expected_accents() {
    let ch = MockChannel::new();
    let probe = ch.clone();
    let w = watcher(
        ch,
        &["Code", "OUTLOOK", "notepad", "msedge"],
        WatchSettings::default(),
    );

    for _ in 0..4 {
        assert!(matches!(w.tick(), Some(WatchEvent::Applied { .. })));
    }

    let writes = probe.writes();
    let accents: Vec<_> = writes.iter().map(|p| accent(p)).collect();
    assert_eq!(accents, vec![(1, 3), (3, 5), (6, 8), (5, 7)]);

    // Every packet carries white at 75 % and otherwise matches the template.
    for p in &writes {
        assert_eq!(p.len(), PACKET_LEN);
        assert_eq!(&p[OFF_KEY_R..=OFF_KEY_B], &[191, 191, 191]);
        for (i, (&got, &base)) in p.iter().zip(BASE_PACKET.iter()).enumerate() {
            if !MUTABLE_OFFSETS.contains(&i) {
                assert_eq!(got, base, "byte {i}");
            }
        }
    }
}

#[test]
fn executable_file_names_map_to_accents() {
    let ch = MockChannel::new();
    let probe = ch.clone();
    let w = watcher(ch, &["Code.exe", "OUTLOOK.EXE"], WatchSettings::default());

    w.tick();
    w.tick();

    let writes = probe.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(accent(&writes[0]), (1, 3));
    assert_eq!(accent(&writes[1]), (3, 5));
}

#[test]
fn configured_key_color_and_intensity_are_used() {
    let ch = MockChannel::new();
    let probe = ch.clone();
    let settings = WatchSettings {
        key_color: Rgb::new(200, 100, 50),
        intensity: 50,
        ..WatchSettings::default()
    };
    let w = watcher(ch, &["EXCEL"], settings);
    w.tick();

    let expected = LightingPacket::encode(Rgb::new(200, 100, 50), 50, LightingTheme::Green);
    assert_eq!(probe.writes(), vec![expected.as_bytes().to_vec()]);
}

#[test]
fn repeated_focus_sends_once() {
    let ch = MockChannel::new();
    let probe = ch.clone();
    let w = watcher(
        ch,
        &["Code", "code", "", "Code", "CODE"],
        WatchSettings::default(),
    );
    for _ in 0..5 {
        w.tick();
    }
    assert_eq!(probe.writes().len(), 1);
}

// ── Device availability ──

#[test]
fn connect_happens_before_first_send() {
    let ch = MockChannel::with_devices(vec![
        keyboard_endpoint("mock://boot"),
        lighting_endpoint("mock://light"),
    ]);
    let probe = ch.clone();
    let w = watcher(ch, &["Code"], WatchSettings::default());
    assert!(!w.status().connected);

    w.tick();

    let st = probe.state();
    assert_eq!(st.enumerate_calls, 1);
    assert_eq!(st.open_attempts, vec!["mock://light"]);
    assert_eq!(st.writes.len(), 1);
    drop(st);
    assert_eq!(w.status().device.unwrap().path, "mock://light");
}

#[test]
fn unplugged_keyboard_recovers_on_later_tick() {
    let ch = MockChannel::empty();
    let probe = ch.clone();
    let mut settings = WatchSettings::default();
    settings.backoff.initial_delay = Duration::ZERO;
    settings.backoff.max_delay = Duration::ZERO;
    let (tx, rx) = mpsc::channel();
    let w = watcher(ch, &["WINWORD"], settings).with_events(tx);

    w.tick();
    w.tick();
    probe.set_devices(vec![lighting_endpoint("mock://kb")]);
    w.tick();
    w.tick();

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 3, "{events:?}");
    assert!(matches!(events[0], WatchEvent::DeviceUnavailable { .. }));
    assert!(matches!(events[1], WatchEvent::DeviceUnavailable { .. }));
    assert!(matches!(events[2], WatchEvent::Applied { .. }));
    assert_eq!(accent(&probe.writes()[0]), (3, 5));
}

#[test]
fn send_failure_reconnects_on_next_change() {
    let ch = MockChannel::new();
    ch.state().fail_write = true;
    let probe = ch.clone();
    let w = watcher(ch, &["Code"], WatchSettings::default());

    assert!(matches!(w.tick(), Some(WatchEvent::SendFailed { .. })));
    assert!(!w.status().connected);

    probe.state().fail_write = false;
    w.probe().set("notepad");
    assert!(matches!(w.tick(), Some(WatchEvent::Applied { .. })));
    let st = probe.state();
    assert_eq!(st.open_attempts.len(), 2);
    assert_eq!(st.writes.len(), 1);
}

// ── Worker lifecycle ──

#[test]
fn worker_applies_and_stops_cleanly() {
    let ch = MockChannel::new();
    let probe = ch.clone();
    let (tx, rx) = mpsc::channel();
    let settings = WatchSettings {
        poll_interval: Duration::from_millis(5),
        ..WatchSettings::default()
    };
    let mut w = watcher(ch, &["rider64"], settings).with_events(tx);

    w.start().unwrap();
    let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(event, WatchEvent::Applied { change } if change.theme == LightingTheme::Orange));
    w.stop();
    drop(w);

    let st = probe.state();
    assert_eq!(st.writes.len(), 1);
    assert_eq!(st.closes, 1);
}

// ── Direct session use ──

#[test]
fn session_with_preferred_path_and_solid_color() {
    let ch = MockChannel::with_devices(vec![
        lighting_endpoint("mock://a"),
        lighting_endpoint("mock://b"),
    ]);
    let probe = ch.clone();
    let session = DeviceSession::new(ch).with_preferred_path("mock://b");
    let mut c = KeyboardController::from_session(session);
    c.connect().unwrap();
    assert_eq!(c.device().unwrap().path, "mock://b");

    let theme = c.apply_solid_color(Rgb::new(0, 0, 255), 100).unwrap();
    assert_eq!(theme, LightingTheme::DarkBlue);
    assert_eq!(accent(&probe.writes()[0]), (5, 7));
}
