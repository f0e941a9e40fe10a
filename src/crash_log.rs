//! Crash logging infrastructure.
//!
//! Provides a breadcrumb ring buffer, a panic hook that restores the terminal
//! and persists a crash report, and startup detection of a previous crash.

use std::backtrace::Backtrace;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::Local;

use crate::config;

// ---------------------------------------------------------------------------
// Breadcrumb ring buffer
// ---------------------------------------------------------------------------

struct Breadcrumb {
    elapsed: Duration,
    thread: String,
    message: String,
}

static START: OnceLock<Instant> = OnceLock::new();
static BREADCRUMBS: OnceLock<Mutex<VecDeque<Breadcrumb>>> = OnceLock::new();

const MAX_BREADCRUMBS: usize = 50;

/// Crash logs kept on disk
pub const KEEP_CRASH_LOGS: usize = 10;

/// Initialize globals. Call once at the very start of `main()`.
pub fn init() {
    START.get_or_init(Instant::now);
    BREADCRUMBS.get_or_init(|| Mutex::new(VecDeque::with_capacity(MAX_BREADCRUMBS)));
}

/// Record a breadcrumb. Older entries fall off once the buffer is full.
pub fn breadcrumb(message: String) {
    let Some(start) = START.get() else { return };
    let Some(crumbs) = BREADCRUMBS.get() else { return };
    let entry = Breadcrumb {
        elapsed: start.elapsed(),
        thread: std::thread::current().name().unwrap_or("unnamed").to_string(),
        message,
    };
    if let Ok(mut guard) = crumbs.lock() {
        if guard.len() >= MAX_BREADCRUMBS {
            guard.pop_front();
        }
        guard.push_back(entry);
    }
}

fn format_breadcrumbs() -> String {
    let Some(crumbs) = BREADCRUMBS.get() else {
        return String::new();
    };
    let Ok(guard) = crumbs.lock() else {
        return String::new();
    };
    guard
        .iter()
        .map(|b| format!("[{:8.3}s] [{}] {}\n", b.elapsed.as_secs_f64(), b.thread, b.message))
        .collect()
}

// ---------------------------------------------------------------------------
// Crash directory helpers
// ---------------------------------------------------------------------------

fn crash_dir() -> PathBuf {
    config::config_dir().join("crashes")
}

fn clean_exit_marker() -> PathBuf {
    config::config_dir().join(".last_clean_exit")
}

fn is_crash_log(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("log")
}

// ---------------------------------------------------------------------------
// Panic hook
// ---------------------------------------------------------------------------

fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn build_report(message: &str, location: Option<String>, backtrace: &Backtrace) -> String {
    let mut report = String::with_capacity(4096);
    report.push_str("=== Gitraffe Crash Report ===\n");
    report.push_str(&format!(
        "Timestamp: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    report.push_str(&format!("Version: {}\n", env!("CARGO_PKG_VERSION")));
    report.push_str(&format!("OS: {}\n", std::env::consts::OS));

    report.push_str("\n--- Panic ---\n");
    report.push_str(&format!("Message: {message}\n"));
    if let Some(loc) = location {
        report.push_str(&format!("Location: {loc}\n"));
    }

    let crumbs = format_breadcrumbs();
    if !crumbs.is_empty() {
        report.push_str("\n--- Breadcrumbs ---\n");
        report.push_str(&crumbs);
    }

    report.push_str("\n--- Backtrace ---\n");
    report.push_str(&backtrace.to_string());
    report
}

/// Install a panic hook that restores the terminal, then writes a crash
/// report to disk. Call once at startup, after `init()`.
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        // The default hook's message is unreadable inside the alternate screen
        crate::terminal::restore();
        default_hook(info);

        let backtrace = Backtrace::force_capture();
        let location = info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
        let report = build_report(&panic_message(info), location, &backtrace);

        let dir = crash_dir();
        if fs::create_dir_all(&dir).is_ok() {
            let filename = format!("crash-{}.log", Local::now().format("%Y-%m-%d-%H%M%S"));
            let _ = fs::write(dir.join(filename), report);
        }
    }));
}

// ---------------------------------------------------------------------------
// Startup detection
// ---------------------------------------------------------------------------

/// Write a marker file indicating a clean exit.
pub fn mark_clean_exit() {
    let path = clean_exit_marker();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let _ = fs::write(&path, Local::now().to_rfc3339());
}

/// Newest crash log written after the last clean exit, if any
pub fn has_crash_since_last_exit() -> Option<PathBuf> {
    newest_crash_since(&crash_dir(), &clean_exit_marker())
}

fn newest_crash_since(dir: &Path, marker: &Path) -> Option<PathBuf> {
    let marker_mtime = fs::metadata(marker)
        .and_then(|m| m.modified())
        .unwrap_or(UNIX_EPOCH);

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if !is_crash_log(&path) {
            continue;
        }
        let Ok(mtime) = path.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        if mtime > marker_mtime && newest.as_ref().is_none_or(|(t, _)| mtime > *t) {
            newest = Some((mtime, path));
        }
    }
    newest.map(|(_, p)| p)
}

/// Delete oldest crash logs beyond the keep limit.
pub fn prune_crash_logs(keep: usize) {
    prune_in(&crash_dir(), keep);
}

fn prune_in(dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    let mut logs: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| is_crash_log(p))
        .collect();
    if logs.len() <= keep {
        return;
    }

    // File names embed the timestamp, so name order is age order
    logs.sort();
    let to_remove = logs.len() - keep;
    for path in &logs[..to_remove] {
        let _ = fs::remove_file(path);
    }
}
