use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::messages::AppEvent;

/// Debounce interval: coalesce rapid filesystem events into a single reload.
const DEBOUNCE_MS: u64 = 500;

/// Watches a repository's git metadata (HEAD, refs) for changes,
/// sending one debounced [`AppEvent::RepoChanged`] per burst.
pub struct RepoWatcher {
    _watcher: RecommendedWatcher,
}

impl RepoWatcher {
    /// Start watching. Dropping the returned handle stops the watcher and,
    /// once its channel closes, the debounce thread.
    pub fn new(git_dir: &Path, events: Sender<AppEvent>) -> notify::Result<Self> {
        let (raw_tx, raw_rx) = mpsc::channel::<Event>();
        spawn_debounce_thread(raw_rx, events);

        let git_dir_owned = git_dir.to_path_buf();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_relevant_event(&event, &git_dir_owned) => {
                    let _ = raw_tx.send(event);
                }
                Ok(_) => {}
                Err(e) => warn!("watch error: {e}"),
            },
            Config::default(),
        )?;

        // Only git metadata moves history; working tree edits never do
        watcher.watch(git_dir, RecursiveMode::NonRecursive)?;
        let refs_dir = git_dir.join("refs");
        if let Err(e) = watcher.watch(&refs_dir, RecursiveMode::Recursive) {
            warn!("not watching {}: {e}", refs_dir.display());
        }

        debug!("watching {}", git_dir.display());
        Ok(RepoWatcher { _watcher: watcher })
    }
}

/// Returns true for create/modify/remove events on the metadata files that
/// move HEAD or refs. Anything outside `git_dir` is ignored.
fn is_relevant_event(event: &Event, git_dir: &Path) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
        _ => return false,
    }

    event.paths.iter().any(|path| {
        let Ok(relative) = path.strip_prefix(git_dir) else {
            return false;
        };
        let rel_str = relative.to_string_lossy();
        rel_str == "HEAD"
            || rel_str == "packed-refs"
            || rel_str.starts_with("refs")
            || rel_str == "MERGE_HEAD"
            || rel_str == "REBASE_HEAD"
            || rel_str == "CHERRY_PICK_HEAD"
    })
}

/// Forward one [`AppEvent::RepoChanged`] after `DEBOUNCE_MS` of quiet
/// following any number of raw events.
fn spawn_debounce_thread(raw_rx: Receiver<Event>, out_tx: Sender<AppEvent>) {
    let spawned = std::thread::Builder::new()
        .name("gitraffe-watch-debounce".into())
        .spawn(move || {
            let debounce = Duration::from_millis(DEBOUNCE_MS);
            let mut last_event: Option<Instant> = None;
            loop {
                let timeout = match last_event {
                    Some(t) => debounce.saturating_sub(t.elapsed()),
                    None => Duration::from_secs(60),
                };

                match raw_rx.recv_timeout(timeout) {
                    Ok(_) => last_event = Some(Instant::now()),
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if last_event.take().is_some() && out_tx.send(AppEvent::RepoChanged).is_err() {
                            return;
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => return,
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Failed to spawn watcher debounce thread: {e}");
    }
}
