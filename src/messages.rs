use std::path::PathBuf;
use std::sync::mpsc::Sender;

use tracing::{debug, error, info};

use crate::git::{GitCli, RepoInfo};
use crate::graph::{self, DiffPayload, GraphStyle, History};
use crate::input::NavAction;

/// History plus the repository summary read alongside it
#[derive(Clone, Debug)]
pub struct LoadedHistory {
    pub history: History,
    pub repo: RepoInfo,
}

/// Everything the control loop reacts to, in arrival order
#[derive(Clone, Debug)]
pub enum AppEvent {
    Resize { width: usize, height: usize },
    Nav(NavAction),
    HistoryLoaded(Result<LoadedHistory, String>),
    DiffLoaded {
        full_hash: String,
        payload: Result<DiffPayload, String>,
    },
    /// The watcher saw a relevant filesystem change
    RepoChanged,
}

impl AppEvent {
    /// Short description for crash breadcrumbs
    pub fn breadcrumb(&self) -> String {
        match self {
            AppEvent::Resize { width, height } => format!("resize {width}x{height}"),
            AppEvent::Nav(action) => format!("nav {action:?}"),
            AppEvent::HistoryLoaded(Ok(loaded)) => {
                format!("history loaded ({} commits)", loaded.history.store.len())
            }
            AppEvent::HistoryLoaded(Err(_)) => "history load failed".to_string(),
            AppEvent::DiffLoaded { full_hash, .. } => {
                format!("diff loaded {}", graph::short_hash(full_hash))
            }
            AppEvent::RepoChanged => "repo changed".to_string(),
        }
    }
}

/// Background work requested by the update function
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    LoadHistory,
    LoadDiff { full_hash: String },
}

/// What background tasks need to reach the repository
#[derive(Clone, Debug)]
pub struct TaskContext {
    pub workdir: PathBuf,
    pub max_commits: usize,
    pub diff_line_cap: usize,
    pub graph_style: GraphStyle,
}

impl TaskContext {
    fn git(&self) -> GitCli {
        GitCli::new(&self.workdir, self.max_commits)
    }

    /// Blocking history load; run in a background thread
    pub fn load_history(&self) -> Result<LoadedHistory, String> {
        let git = self.git();
        let history = graph::load_history(&git, self.graph_style).map_err(|e| e.to_string())?;
        Ok(LoadedHistory {
            history,
            repo: git.repo_info(),
        })
    }

    /// Blocking diff fetch; run in a background thread
    pub fn load_diff(&self, full_hash: &str) -> Result<DiffPayload, String> {
        self.git()
            .show_diff(full_hash, self.diff_line_cap)
            .map_err(|e| format!("{e:#}"))
    }
}

/// The event a task would have produced had it failed with `reason`
fn failure_event(task: &Task, reason: String) -> AppEvent {
    match task {
        Task::LoadHistory => AppEvent::HistoryLoaded(Err(reason)),
        Task::LoadDiff { full_hash } => AppEvent::DiffLoaded {
            full_hash: full_hash.clone(),
            payload: Err(reason),
        },
    }
}

/// Run `task` on its own thread, sending the result back as an event.
/// Tasks never touch application state. Every task reports exactly once,
/// even when its thread cannot be started.
pub fn spawn_task(task: Task, ctx: &TaskContext, sender: &Sender<AppEvent>) {
    let ctx = ctx.clone();
    let fallback = task.clone();
    let reply = sender.clone();
    let (name, job): (&str, Box<dyn FnOnce() -> AppEvent + Send>) = match task {
        Task::LoadHistory => (
            "gitraffe-history",
            Box::new(move || AppEvent::HistoryLoaded(ctx.load_history())),
        ),
        Task::LoadDiff { full_hash } => (
            "gitraffe-diff",
            Box::new(move || {
                let payload = ctx.load_diff(&full_hash);
                AppEvent::DiffLoaded { full_hash, payload }
            }),
        ),
    };

    debug!("spawning {name}");
    let spawned = std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let event = job();
            // The loop may have exited already
            let _ = reply.send(event);
        });
    if let Err(e) = spawned {
        error!("Failed to spawn {name} thread: {e}");
        let _ = sender.send(failure_event(&fallback, format!("could not start {name}: {e}")));
    } else {
        info!("started {name}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ctx(workdir: PathBuf) -> TaskContext {
        TaskContext {
            workdir,
            max_commits: 10,
            diff_line_cap: 300,
            graph_style: GraphStyle::Unicode,
        }
    }

    #[test]
    fn test_history_task_reports_back() {
        let dir = TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();

        let (tx, rx) = mpsc::channel();
        spawn_task(Task::LoadHistory, &ctx(dir.path().to_path_buf()), &tx);
        let event = rx.recv_timeout(Duration::from_secs(30)).unwrap();

        // An empty repository degrades all the way to the library and loads nothing
        let AppEvent::HistoryLoaded(Ok(loaded)) = event else {
            panic!("expected a loaded history, got {event:?}");
        };
        assert!(loaded.history.store.is_empty());
    }

    #[test]
    fn test_diff_task_reports_failure_as_event() {
        let dir = TempDir::new().unwrap();
        let (tx, rx) = mpsc::channel();
        let hash = "0".repeat(40);
        spawn_task(
            Task::LoadDiff { full_hash: hash.clone() },
            &ctx(dir.path().join("missing")),
            &tx,
        );
        match rx.recv_timeout(Duration::from_secs(30)).unwrap() {
            AppEvent::DiffLoaded { full_hash, payload } => {
                assert_eq!(full_hash, hash);
                assert!(payload.is_err());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_failure_event_matches_task() {
        let hash = "a".repeat(40);
        match failure_event(&Task::LoadDiff { full_hash: hash.clone() }, "no threads".into()) {
            AppEvent::DiffLoaded { full_hash, payload } => {
                assert_eq!(full_hash, hash);
                assert_eq!(payload.unwrap_err(), "no threads");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(matches!(
            failure_event(&Task::LoadHistory, "no threads".into()),
            AppEvent::HistoryLoaded(Err(_))
        ));
    }

    #[test]
    fn test_breadcrumbs() {
        assert_eq!(AppEvent::RepoChanged.breadcrumb(), "repo changed");
        assert_eq!(
            AppEvent::Resize { width: 80, height: 24 }.breadcrumb(),
            "resize 80x24"
        );
        assert_eq!(AppEvent::Nav(NavAction::Down).breadcrumb(), "nav Down");
    }
}
