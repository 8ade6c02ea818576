//! Operator-facing console output, serialised so lines from different
//! workers/tasks never interleave mid-line.
//!
//! Mirrors the original's `g_cout_mutex` (`MiningCommon.h`) guarding
//! `std::cout`/`std::cerr` across threads. Share/hashrate/status lines are
//! operator UX, not diagnostics, so they go through this lock and straight
//! to stdout rather than through `log`.

use std::io::Write;
use std::sync::Mutex;

static OUTPUT_LOCK: Mutex<()> = Mutex::new(());

/// Print one line to stdout, holding the shared lock for its duration.
pub fn print_line(line: &str) {
    let _guard = OUTPUT_LOCK.lock().expect("console output lock poisoned");
    println!("{line}");
    let _ = std::io::stdout().flush();
}
