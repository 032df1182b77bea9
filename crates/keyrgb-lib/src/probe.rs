//! Foreground window probe: trait + Windows backend.

/// Reports which application currently has window focus.
///
/// Both methods return an empty string when the information is unavailable
/// (no foreground window, access denied, unsupported platform).
pub trait ForegroundProbe {
    /// Process name of the focused window, without directory or extension
    /// (e.g. `"Code"`, `"OUTLOOK"`).
    fn process_name(&self) -> String;

    fn window_title(&self) -> String;
}

// ── Windows implementation ──

#[cfg(windows)]
mod win32 {
    use super::ForegroundProbe;

    use windows::Win32::Foundation::{CloseHandle, HWND};
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
        QueryFullProcessImageNameW,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        GetForegroundWindow, GetWindowTextW, GetWindowThreadProcessId,
    };
    use windows::core::PWSTR;

    /// Queries the foreground window through user32/kernel32.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct Win32Probe;

    impl Win32Probe {
        pub fn new() -> Self {
            Win32Probe
        }

        fn foreground() -> Option<HWND> {
            // SAFETY: no preconditions; returns a null handle when nothing has focus.
            let hwnd = unsafe { GetForegroundWindow() };
            (!hwnd.is_invalid()).then_some(hwnd)
        }

        fn image_path(pid: u32) -> Option<String> {
            // SAFETY: the handle is closed below on every path after a successful open.
            unsafe {
                let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
                let mut buf = [0u16; 1024];
                let mut len = buf.len() as u32;
                let res = QueryFullProcessImageNameW(
                    handle,
                    PROCESS_NAME_WIN32,
                    PWSTR(buf.as_mut_ptr()),
                    &mut len,
                );
                let _ = CloseHandle(handle);
                res.ok()?;
                Some(String::from_utf16_lossy(&buf[..len as usize]))
            }
        }
    }

    impl ForegroundProbe for Win32Probe {
        fn process_name(&self) -> String {
            let Some(hwnd) = Self::foreground() else {
                return String::new();
            };
            let mut pid = 0u32;
            // SAFETY: `hwnd` is a window handle returned by GetForegroundWindow.
            unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32)) };
            if pid == 0 {
                return String::new();
            }
            match Self::image_path(pid) {
                Some(path) => super::process_stem(&path).to_string(),
                None => {
                    log::debug!("cannot query image name of pid {pid}");
                    String::new()
                }
            }
        }

        fn window_title(&self) -> String {
            let Some(hwnd) = Self::foreground() else {
                return String::new();
            };
            let mut buf = [0u16; 512];
            // SAFETY: the buffer outlives the call and its length is passed implicitly.
            let n = unsafe { GetWindowTextW(hwnd, &mut buf) };
            if n <= 0 {
                return String::new();
            }
            String::from_utf16_lossy(&buf[..n as usize])
        }
    }
}

#[cfg(windows)]
pub use win32::Win32Probe;

/// Probe for platforms without a foreground-window API. Always reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubProbe;

impl ForegroundProbe for StubProbe {
    fn process_name(&self) -> String {
        String::new()
    }

    fn window_title(&self) -> String {
        String::new()
    }
}

/// Probe type for the current platform.
#[cfg(windows)]
pub type PlatformProbe = Win32Probe;
#[cfg(not(windows))]
pub type PlatformProbe = StubProbe;

/// File stem of an executable path: `C:\Apps\Code.exe` → `Code`.
pub fn process_stem(path: &str) -> &str {
    let file = path.rsplit(['\\', '/']).next().unwrap_or(path);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

// ── Mock ──

/// Scripted probe for testing (available to integration tests and downstream crates).
#[doc(hidden)]
pub mod mock {
    use super::ForegroundProbe;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a queue of process names, one per call. Once the queue is
    /// drained the last name keeps being reported.
    #[derive(Debug, Default)]
    pub struct ScriptedProbe {
        queue: Mutex<VecDeque<String>>,
        current: Mutex<String>,
        title: Mutex<String>,
    }

    impl ScriptedProbe {
        pub fn new<I, S>(names: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            ScriptedProbe {
                queue: Mutex::new(names.into_iter().map(Into::into).collect()),
                ..Self::default()
            }
        }

        /// Report `name` from now on, discarding anything still queued.
        pub fn set(&self, name: &str) {
            if let Ok(mut q) = self.queue.lock() {
                q.clear();
            }
            if let Ok(mut cur) = self.current.lock() {
                *cur = name.to_string();
            }
        }

        pub fn set_title(&self, title: &str) {
            if let Ok(mut t) = self.title.lock() {
                *t = title.to_string();
            }
        }
    }

    impl ForegroundProbe for ScriptedProbe {
        fn process_name(&self) -> String {
            let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
            let Ok(mut cur) = self.current.lock() else {
                return String::new();
            };
            if let Some(name) = next {
                *cur = name;
            }
            cur.clone()
        }

        fn window_title(&self) -> String {
            self.title.lock().map(|t| t.clone()).unwrap_or_default()
        }
    }
}
