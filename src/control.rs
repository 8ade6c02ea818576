//! Shutdown signalling: OS signals, and raw-mode stdin hotkeys.
//!
//! The original handles only `SIGINT`/`SIGTERM`, installed via a raw
//! `libc::signal` call and a static flag (`main.cpp`'s `ctrlc_handler`).
//! This extends that with an interactive `q`/`s` hotkey reader, since a
//! foreground miner process benefits from a quit/status key without
//! needing a second terminal to send a signal from.

use std::io::Read;
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::info;

/// Key presses recognised by the stdin reader thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hotkey {
    Quit,
    StatusDump,
}

/// Spawn a task that resolves `shutdown` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_watcher(shutdown: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(s) => s,
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {e}");
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, shutting down");
            }
            _ = sigterm.recv() => {
                info!("received terminate signal, shutting down");
            }
        }
        shutdown.store(true, Ordering::Relaxed);
    });
}

/// Read timeout applied to the raw terminal, in tenths of a second. A
/// `VMIN=0`/`VTIME` read returns empty after this interval even with no
/// keypress, so the thread can notice `shutdown` without a true stdin
/// close.
const READ_POLL_DECISECONDS: u8 = 1;

/// Spawn a blocking OS thread that reads single keypresses from stdin in
/// raw (non-canonical, no-echo) mode and forwards recognised hotkeys.
/// The read is on a short poll timeout rather than blocking indefinitely,
/// so the thread notices `shutdown` and exits promptly; join the returned
/// handle during shutdown to ensure the terminal is restored to cooked
/// mode (via `RawModeGuard`'s `Drop`) before the process exits.
pub fn spawn_hotkey_reader(
    shutdown: Arc<AtomicBool>,
    on_key: impl Fn(Hotkey) + Send + 'static,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let fd = std::io::stdin().as_raw_fd();
        let guard = match RawModeGuard::enable(fd) {
            Ok(guard) => guard,
            Err(e) => {
                log::warn!("could not enable raw terminal mode, hotkeys disabled: {e}");
                return;
            }
        };

        let mut stdin = std::io::stdin();
        let mut byte = [0u8; 1];
        while !shutdown.load(Ordering::Relaxed) {
            match stdin.read(&mut byte) {
                Ok(0) => continue, // poll timeout elapsed, no key pressed
                Ok(_) => match byte[0] {
                    b'q' | b'Q' => {
                        on_key(Hotkey::Quit);
                        break;
                    }
                    b's' | b'S' => on_key(Hotkey::StatusDump),
                    _ => {}
                },
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        drop(guard);
    })
}

/// Puts the terminal into raw mode for the lifetime of the guard, restoring
/// the original settings on drop.
struct RawModeGuard {
    fd: i32,
    original: libc::termios,
}

impl RawModeGuard {
    fn enable(fd: i32) -> std::io::Result<Self> {
        unsafe {
            let mut original: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut original) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            let mut raw = original;
            libc::cfmakeraw(&mut raw);
            // VMIN=0, VTIME>0: reads return after the timeout even with no
            // data, instead of blocking forever for one byte.
            raw.c_cc[libc::VMIN] = 0;
            raw.c_cc[libc::VTIME] = READ_POLL_DECISECONDS;
            if libc::tcsetattr(fd, libc::TCSANOW, &raw) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(RawModeGuard { fd, original })
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.original);
        }
    }
}
