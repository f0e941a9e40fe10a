//! Commit history model: display rows over an index-addressed commit table.

mod parser;
mod store;

pub use parser::{GraphStreamParser, GraphStyle, parse_flat};
pub use store::{Commit, CommitStore, DiffPayload, short_hash};

use tracing::{info, warn};

use crate::error::{Error, Result};

/// One line of the rendered graph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayRow {
    /// Connector glyphs, already transliterated
    pub connector_glyphs: String,
    /// Columns occupied by the connector in the source stream
    pub visual_width: usize,
    /// Index into the commit store; `None` for connector-only lines
    pub commit: Option<usize>,
}

/// Where the rows came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// Parsed from `git log --graph`
    Graph,
    /// One row per commit, no connector data
    Simple,
}

/// Parsed history: the commit table plus the rows that reference it
#[derive(Clone, Debug)]
pub struct History {
    pub store: CommitStore,
    pub rows: Vec<DisplayRow>,
    /// Widest connector over all rows; every row is padded to this width
    pub max_graph_width: usize,
    pub mode: HistoryMode,
}

impl History {
    /// Build a simple-mode history: row `i` shows commit `i` with a node glyph.
    pub fn from_commits(commits: Vec<Commit>, style: GraphStyle) -> Self {
        let mut store = CommitStore::new();
        let mut rows = Vec::with_capacity(commits.len());
        for (row, commit) in commits.into_iter().enumerate() {
            let glyph = style.node_glyph(&commit);
            let index = store.push(commit, row);
            rows.push(DisplayRow {
                connector_glyphs: glyph.to_string(),
                visual_width: 1,
                commit: Some(index),
            });
        }
        let max_graph_width = if rows.is_empty() { 0 } else { 1 };
        Self {
            store,
            rows,
            max_graph_width,
            mode: HistoryMode::Simple,
        }
    }

    /// Row on which the given commit is drawn
    pub fn row_of_commit(&self, commit: usize) -> Result<usize> {
        let row = self.store.first_row_of_commit(commit)?;
        if row >= self.rows.len() {
            return Err(Error::IndexOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        Ok(row)
    }

    /// Carry fetched diffs over from a previous history by full hash
    pub fn adopt_diffs(&mut self, previous: &History) {
        for commit in previous.store.iter() {
            let Some(diff) = commit.diff() else { continue };
            if let Some(index) = self.store.index_of(&commit.full_hash) {
                // The index was just resolved from this store, so this cannot fail
                let _ = self.store.attach_diff(index, diff.clone());
            }
        }
    }
}

/// Upstream provider of commit history.
///
/// Implementations try, in order: a graph-formatted stream, a flat record
/// stream, and direct enumeration of commit objects.
pub trait HistorySource {
    /// Lines of `git log --graph` output with `\0` separated records
    fn graph_lines(&self) -> anyhow::Result<Vec<String>>;
    /// Lines of `|` separated records, one per commit
    fn flat_lines(&self) -> anyhow::Result<Vec<String>>;
    /// Commits enumerated without any text stream
    fn library_commits(&self) -> anyhow::Result<Vec<Commit>>;
}

/// Load history, degrading from graph mode to simple mode when the graph
/// stream cannot be produced.
pub fn load_history(source: &dyn HistorySource, style: GraphStyle) -> Result<History> {
    let graph_error = match source
        .graph_lines()
        .map_err(|e| Error::SourceUnavailable(format!("{e:#}")))
        .and_then(|lines| GraphStreamParser::new(style).parse(&lines))
    {
        Ok(history) => {
            info!(
                "loaded {} commits in {} rows (graph width {})",
                history.store.len(),
                history.rows.len(),
                history.max_graph_width
            );
            return Ok(history);
        }
        Err(e) => e,
    };
    warn!("graph history unavailable, using simple mode: {graph_error}");

    let flat_error = match source
        .flat_lines()
        .map_err(|e| Error::SourceUnavailable(format!("{e:#}")))
        .and_then(|lines| parse_flat(&lines, style))
    {
        Ok(history) => {
            info!("loaded {} commits from flat log", history.store.len());
            return Ok(history);
        }
        Err(e) => e,
    };
    warn!("flat history unavailable, enumerating commits directly: {flat_error}");

    match source.library_commits() {
        Ok(commits) => {
            info!("loaded {} commits from repository objects", commits.len());
            Ok(History::from_commits(commits, style))
        }
        Err(e) => Err(Error::SourceUnavailable(format!(
            "graph: {graph_error}; fallback: {flat_error}; library: {e:#}"
        ))),
    }
}
