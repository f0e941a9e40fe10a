//! Application state and the event reducer.
//!
//! [`update`] is the only place state changes. Each event kind has its own
//! handler; handlers never block and ask for background work by returning a
//! [`Task`].

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::git::RepoInfo;
use crate::graph::{DiffPayload, History};
use crate::input::NavAction;
use crate::messages::{AppEvent, LoadedHistory, Task};
use crate::views::{CommitDetailView, CommitGraphView};

/// Which bordered box has keyboard focus
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FocusPanel {
    RepoInfo,
    #[default]
    CommitList,
    CommitDetail,
}

impl FocusPanel {
    pub fn next(self) -> Self {
        match self {
            FocusPanel::RepoInfo => FocusPanel::CommitList,
            FocusPanel::CommitList => FocusPanel::CommitDetail,
            FocusPanel::CommitDetail => FocusPanel::RepoInfo,
        }
    }
}

/// Cursor state shared by the graph and detail panels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Index into the commit store; meaningful once any commit is loaded
    pub selected_commit: usize,
    pub focused: FocusPanel,
    /// First visible line of the detail buffer
    pub detail_scroll: usize,
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub width: usize,
    pub height: usize,
    pub repo: RepoInfo,
    pub history: Option<History>,
    /// Set when the very first load fails; the error frame shows it
    pub load_error: Option<String>,
    pub loading: bool,
    pub selection: SelectionState,
    /// Connector columns hidden on the left of the graph panel
    pub graph_scroll_x: usize,
    /// Full hashes with a diff fetch in flight
    pub pending_diffs: HashSet<String>,
    /// Transient footer message, replacing the key help
    pub status: Option<String>,
    pub running: bool,
    pub page_size: usize,
    pub log_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(page_size: usize, log_path: Option<PathBuf>) -> Self {
        Self {
            width: 0,
            height: 0,
            repo: RepoInfo::default(),
            history: None,
            load_error: None,
            loading: true,
            selection: SelectionState::default(),
            graph_scroll_x: 0,
            pending_diffs: HashSet::new(),
            status: None,
            running: true,
            page_size: page_size.max(1),
            log_path,
        }
    }

    /// Full hash of the selected commit, if any commit is loaded
    pub fn selected_hash(&self) -> Option<&str> {
        let history = self.history.as_ref()?;
        history
            .store
            .get(self.selection.selected_commit)
            .ok()
            .map(|c| c.full_hash.as_str())
    }

    fn commit_count(&self) -> usize {
        self.history.as_ref().map_or(0, |h| h.store.len())
    }

    fn detail_line_count(&self) -> usize {
        self.history
            .as_ref()
            .and_then(|h| h.store.get(self.selection.selected_commit).ok())
            .map_or(0, CommitDetailView::line_count)
    }

    fn select(&mut self, index: usize) {
        let count = self.commit_count();
        if count == 0 {
            return;
        }
        let index = index.min(count - 1);
        if index != self.selection.selected_commit {
            self.selection.selected_commit = index;
            self.selection.detail_scroll = 0;
        }
    }

    fn scroll_detail(&mut self, offset: usize) {
        let max = self.detail_line_count().saturating_sub(1);
        self.selection.detail_scroll = offset.min(max);
    }
}

/// Apply one event, returning the new state and any background work to start
pub fn update(mut state: AppState, event: AppEvent) -> (AppState, Option<Task>) {
    let task = match event {
        AppEvent::Resize { width, height } => handle_resize(&mut state, width, height),
        AppEvent::Nav(action) => handle_nav(&mut state, action),
        AppEvent::HistoryLoaded(result) => handle_history_loaded(&mut state, result),
        AppEvent::DiffLoaded { full_hash, payload } => {
            handle_diff_loaded(&mut state, full_hash, payload)
        }
        AppEvent::RepoChanged => handle_repo_changed(&mut state),
    };
    (state, task)
}

fn handle_resize(state: &mut AppState, width: usize, height: usize) -> Option<Task> {
    debug!("resize to {width}x{height}");
    state.width = width;
    state.height = height;
    None
}

fn handle_nav(state: &mut AppState, action: NavAction) -> Option<Task> {
    let page = state.page_size;
    if !matches!(action, NavAction::Reload | NavAction::Quit) && !state.loading {
        // Status messages last until the next key press
        state.status = None;
    }
    match action {
        NavAction::Quit => {
            state.running = false;
            return None;
        }
        NavAction::Focus(panel) => state.selection.focused = panel,
        NavAction::NextFocus => state.selection.focused = state.selection.focused.next(),
        NavAction::Reload => return request_reload(state),
        NavAction::PanLeft => state.graph_scroll_x = state.graph_scroll_x.saturating_sub(1),
        NavAction::PanRight => {
            let max = state.history.as_ref().map_or(0, CommitGraphView::max_scroll_x);
            state.graph_scroll_x = (state.graph_scroll_x + 1).min(max);
        }
        movement => match state.selection.focused {
            FocusPanel::CommitList => {
                let current = state.selection.selected_commit;
                let target = match movement {
                    NavAction::Up => current.saturating_sub(1),
                    NavAction::Down => current + 1,
                    NavAction::PageUp => current.saturating_sub(page),
                    NavAction::PageDown => current + page,
                    NavAction::Top => 0,
                    NavAction::Bottom => usize::MAX,
                    _ => current,
                };
                state.select(target);
                return maybe_load_diff(state);
            }
            FocusPanel::CommitDetail => {
                let current = state.selection.detail_scroll;
                let target = match movement {
                    NavAction::Up => current.saturating_sub(1),
                    NavAction::Down => current + 1,
                    NavAction::PageUp => current.saturating_sub(page),
                    NavAction::PageDown => current + page,
                    NavAction::Top => 0,
                    NavAction::Bottom => usize::MAX,
                    _ => current,
                };
                state.scroll_detail(target);
            }
            FocusPanel::RepoInfo => {}
        },
    }
    None
}

fn request_reload(state: &mut AppState) -> Option<Task> {
    if state.loading {
        return None;
    }
    state.loading = true;
    state.status = Some("Reloading...".to_string());
    Some(Task::LoadHistory)
}

fn handle_repo_changed(state: &mut AppState) -> Option<Task> {
    debug!("repository changed on disk");
    request_reload(state)
}

fn handle_history_loaded(
    state: &mut AppState,
    result: Result<LoadedHistory, String>,
) -> Option<Task> {
    state.loading = false;
    let loaded = match result {
        Ok(loaded) => loaded,
        Err(message) => {
            warn!("history load failed: {message}");
            if state.history.is_some() {
                state.status = Some(format!("Reload failed: {message}"));
            } else {
                state.load_error = Some(message);
            }
            return None;
        }
    };

    let LoadedHistory { mut history, repo } = loaded;
    let previous_hash = state.selected_hash().map(str::to_string);
    let reloaded = state.history.is_some();
    if let Some(previous) = &state.history {
        history.adopt_diffs(previous);
    }

    let restored = previous_hash
        .as_deref()
        .and_then(|hash| history.store.index_of(hash));
    info!(
        "history ready: {} commits ({:?} mode), selection {}",
        history.store.len(),
        history.mode,
        if restored.is_some() { "restored" } else { "reset" }
    );

    let commit_count = history.store.len();
    state.graph_scroll_x = state
        .graph_scroll_x
        .min(CommitGraphView::max_scroll_x(&history));
    state.history = Some(history);
    state.repo = repo;
    state.load_error = None;

    match restored {
        Some(index) => {
            state.selection.selected_commit = index;
            let scroll = state.selection.detail_scroll;
            state.scroll_detail(scroll);
        }
        None => {
            state.selection.selected_commit = 0;
            state.selection.detail_scroll = 0;
        }
    }
    if reloaded {
        state.status = Some(format!("Reloaded {commit_count} commits"));
    }

    maybe_load_diff(state)
}

fn handle_diff_loaded(
    state: &mut AppState,
    full_hash: String,
    payload: Result<DiffPayload, String>,
) -> Option<Task> {
    state.pending_diffs.remove(&full_hash);

    let payload = payload.unwrap_or_else(|message| {
        warn!("diff for {full_hash} failed: {message}");
        DiffPayload {
            summary: format!("Failed to load diff: {message}"),
            ..Default::default()
        }
    });

    let history = state.history.as_mut()?;
    match history.store.index_of(&full_hash) {
        Some(index) => {
            if let Err(e) = history.store.attach_diff(index, payload) {
                warn!("dropping diff for {full_hash}: {e}");
            }
        }
        None => debug!("diff for {full_hash} arrived after its commit was unloaded"),
    }
    None
}

/// Ask for the selected commit's diff unless it is cached or already in flight
fn maybe_load_diff(state: &mut AppState) -> Option<Task> {
    let history = state.history.as_ref()?;
    let commit = history.store.get(state.selection.selected_commit).ok()?;
    if commit.diff_loaded() || state.pending_diffs.contains(&commit.full_hash) {
        return None;
    }
    let full_hash = commit.full_hash.clone();
    state.pending_diffs.insert(full_hash.clone());
    Some(Task::LoadDiff { full_hash })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Commit, GraphStyle};

    fn hash(n: u8) -> String {
        format!("{:040x}", n)
    }

    fn history(range: std::ops::RangeInclusive<u8>) -> History {
        let commits = range
            .rev()
            .map(|n| Commit::new(hash(n), "Alice", 0, format!("commit {n}"), &[], ""))
            .collect();
        History::from_commits(commits, GraphStyle::Unicode)
    }

    fn loaded(history: History) -> AppEvent {
        AppEvent::HistoryLoaded(Ok(LoadedHistory {
            history,
            repo: RepoInfo::default(),
        }))
    }

    fn diff(text: &str) -> DiffPayload {
        DiffPayload {
            summary: "1 file changed".into(),
            body: text.into(),
            truncated: false,
        }
    }

    fn ready_state() -> AppState {
        let state = AppState::new(10, None);
        let (state, task) = update(state, loaded(history(1..=30)));
        assert_eq!(task, Some(Task::LoadDiff { full_hash: hash(30) }));
        state
    }

    fn nav(state: AppState, action: NavAction) -> (AppState, Option<Task>) {
        update(state, AppEvent::Nav(action))
    }

    #[test]
    fn test_initial_selection() {
        let state = ready_state();
        assert_eq!(state.selection.selected_commit, 0);
        assert_eq!(state.selection.focused, FocusPanel::CommitList);
        assert!(!state.loading);
        assert!(state.status.is_none());
    }

    #[test]
    fn test_moving_selection_resets_detail_scroll() {
        let mut state = ready_state();
        state.selection.detail_scroll = 3;
        let (state, task) = nav(state, NavAction::Down);
        assert_eq!(state.selection.selected_commit, 1);
        assert_eq!(state.selection.detail_scroll, 0);
        assert_eq!(task, Some(Task::LoadDiff { full_hash: hash(29) }));
    }

    #[test]
    fn test_selection_is_clamped() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Up);
        assert_eq!(state.selection.selected_commit, 0);
        let (state, _) = nav(state, NavAction::Bottom);
        assert_eq!(state.selection.selected_commit, 29);
        let (state, _) = nav(state, NavAction::PageDown);
        assert_eq!(state.selection.selected_commit, 29);
        let (state, _) = nav(state, NavAction::PageUp);
        assert_eq!(state.selection.selected_commit, 19);
    }

    #[test]
    fn test_duplicate_diff_requests_are_suppressed() {
        let state = ready_state();
        let (state, first) = nav(state, NavAction::Down);
        assert!(first.is_some());
        let (state, _) = nav(state, NavAction::Up);
        let (_, again) = nav(state, NavAction::Down);
        assert_eq!(again, None);
    }

    #[test]
    fn test_failed_diff_is_no_longer_pending() {
        let state = ready_state();
        let (state, _) = update(
            state,
            AppEvent::DiffLoaded {
                full_hash: hash(30),
                payload: Err("could not start gitraffe-diff".into()),
            },
        );
        assert!(state.pending_diffs.is_empty());
        let commit = state.history.as_ref().unwrap().store.get(0).unwrap();
        assert!(commit.diff_loaded());
        assert!(commit.diff().unwrap().summary.starts_with("Failed to load diff"));
    }

    #[test]
    fn test_diff_for_unselected_commit_is_cached() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Down);
        let (state, _) = nav(state, NavAction::Down);

        // The diff of the first commit arrives after the selection moved on
        let (state, _) = update(
            state,
            AppEvent::DiffLoaded {
                full_hash: hash(30),
                payload: Ok(diff("+a")),
            },
        );
        assert!(!state.pending_diffs.contains(&hash(30)));
        let store = &state.history.as_ref().unwrap().store;
        assert_eq!(store.get(0).unwrap().diff(), Some(&diff("+a")));

        // Going back does not fetch again
        let (state, _) = nav(state, NavAction::Top);
        let (_, task) = nav(state, NavAction::Top);
        assert_eq!(task, None);
    }

    #[test]
    fn test_failed_diff_is_cached_as_message() {
        let state = ready_state();
        let (state, _) = update(
            state,
            AppEvent::DiffLoaded {
                full_hash: hash(30),
                payload: Err("bad object".into()),
            },
        );
        let commit = state.history.as_ref().unwrap().store.get(0).unwrap().clone();
        assert!(commit.diff().unwrap().summary.contains("bad object"));
    }

    #[test]
    fn test_detail_scroll_is_clamped() {
        let mut state = ready_state();
        state.selection.focused = FocusPanel::CommitDetail;
        let lines = state.detail_line_count();
        let (state, _) = nav(state, NavAction::Bottom);
        assert_eq!(state.selection.detail_scroll, lines - 1);
        assert_eq!(state.selection.selected_commit, 0);
        let (state, _) = nav(state, NavAction::Top);
        assert_eq!(state.selection.detail_scroll, 0);
    }

    #[test]
    fn test_repo_info_focus_ignores_movement() {
        let mut state = ready_state();
        state.selection.focused = FocusPanel::RepoInfo;
        let (state, task) = nav(state, NavAction::Down);
        assert_eq!(state.selection.selected_commit, 0);
        assert_eq!(task, None);
    }

    #[test]
    fn test_focus_cycle() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::NextFocus);
        assert_eq!(state.selection.focused, FocusPanel::CommitDetail);
        let (state, _) = nav(state, NavAction::NextFocus);
        assert_eq!(state.selection.focused, FocusPanel::RepoInfo);
        let (state, _) = nav(state, NavAction::Focus(FocusPanel::CommitList));
        assert_eq!(state.selection.focused, FocusPanel::CommitList);
    }

    #[test]
    fn test_reload_restores_selection_and_diffs() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Down);
        let (state, _) = update(
            state,
            AppEvent::DiffLoaded {
                full_hash: hash(29),
                payload: Ok(diff("+b")),
            },
        );

        let (state, task) = nav(state, NavAction::Reload);
        assert_eq!(task, Some(Task::LoadHistory));
        assert!(state.loading);
        // A second request while loading is ignored
        let (state, again) = update(state, AppEvent::RepoChanged);
        assert_eq!(again, None);

        // Two new commits on top shift every index
        let (state, task) = update(state, loaded(history(1..=32)));
        assert_eq!(state.selected_hash(), Some(hash(29).as_str()));
        assert_eq!(state.selection.selected_commit, 3);
        assert_eq!(task, None);
        assert_eq!(state.status.as_deref(), Some("Reloaded 32 commits"));
    }

    #[test]
    fn test_reload_resets_missing_selection() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Bottom);
        let (state, _) = nav(state, NavAction::Reload);
        let (state, task) = update(state, loaded(history(5..=10)));
        assert_eq!(state.selection.selected_commit, 0);
        assert_eq!(task, Some(Task::LoadDiff { full_hash: hash(10) }));
    }

    #[test]
    fn test_first_load_failure_sets_error() {
        let state = AppState::new(10, None);
        let (state, task) = update(state, AppEvent::HistoryLoaded(Err("not a repository".into())));
        assert_eq!(task, None);
        assert_eq!(state.load_error.as_deref(), Some("not a repository"));
        assert!(!state.loading);
    }

    #[test]
    fn test_reload_failure_keeps_history() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Reload);
        let (state, _) = update(state, AppEvent::HistoryLoaded(Err("locked".into())));
        assert!(state.history.is_some());
        assert!(state.load_error.is_none());
        assert_eq!(state.status.as_deref(), Some("Reload failed: locked"));
    }

    #[test]
    fn test_status_clears_on_next_key() {
        let state = ready_state();
        let (state, _) = nav(state, NavAction::Reload);
        let (state, _) = nav(state, NavAction::Down);
        assert_eq!(state.status.as_deref(), Some("Reloading..."));
        let (state, _) = update(state, AppEvent::HistoryLoaded(Err("locked".into())));
        let (state, _) = nav(state, NavAction::Down);
        assert!(state.status.is_none());
    }

    #[test]
    fn test_pan_is_clamped() {
        let state = ready_state();
        // Simple-mode rows are one column wide, so there is nothing to pan
        let (state, _) = nav(state, NavAction::PanRight);
        assert_eq!(state.graph_scroll_x, 0);
        let (state, _) = nav(state, NavAction::PanLeft);
        assert_eq!(state.graph_scroll_x, 0);
    }

    #[test]
    fn test_empty_history_is_inert() {
        let state = AppState::new(10, None);
        let (state, task) = update(state, loaded(History::from_commits(Vec::new(), GraphStyle::Unicode)));
        assert_eq!(task, None);
        let (state, task) = nav(state, NavAction::Down);
        assert_eq!(task, None);
        assert_eq!(state.selected_hash(), None);
    }

    #[test]
    fn test_quit_and_resize() {
        let state = ready_state();
        let (state, _) = update(state, AppEvent::Resize { width: 80, height: 24 });
        assert_eq!((state.width, state.height), (80, 24));
        let (state, _) = nav(state, NavAction::Quit);
        assert!(!state.running);
    }
}
