//! Commit records and the append-only table that owns them.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::error::{Error, Result};

/// Number of hex digits shown for abbreviated commit ids
pub const SHORT_HASH_LEN: usize = 7;

/// Abbreviate a commit id for display. Ids shorter than the prefix are kept whole.
pub fn short_hash(full: &str) -> String {
    full.chars().take(SHORT_HASH_LEN).collect()
}

/// Diff data fetched lazily for a single commit
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffPayload {
    /// `--stat` style summary
    pub summary: String,
    /// Patch text, possibly cut at the configured line cap
    pub body: String,
    /// Whether `body` was cut
    pub truncated: bool,
}

/// A single parsed commit record
#[derive(Clone, Debug)]
pub struct Commit {
    pub short_hash: String,
    pub full_hash: String,
    pub author: String,
    /// Author timestamp in seconds since the unix epoch
    pub authored_at: i64,
    pub subject: String,
    pub parent_short_hashes: Vec<String>,
    /// Ref decorations (`HEAD -> main, tag: v1.0`), empty when undecorated
    pub refs: String,
    diff: Option<DiffPayload>,
}

impl Commit {
    pub fn new(
        full_hash: impl Into<String>,
        author: impl Into<String>,
        authored_at: i64,
        subject: impl Into<String>,
        parent_hashes: &[&str],
        refs: impl Into<String>,
    ) -> Self {
        let full_hash = full_hash.into();
        Self {
            short_hash: short_hash(&full_hash),
            full_hash,
            author: author.into(),
            authored_at,
            subject: subject.into(),
            parent_short_hashes: parent_hashes.iter().map(|p| short_hash(p)).collect(),
            refs: refs.into().trim().to_string(),
            diff: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_short_hashes.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_short_hashes.len() >= 2
    }

    pub fn diff(&self) -> Option<&DiffPayload> {
        self.diff.as_ref()
    }

    pub fn diff_loaded(&self) -> bool {
        self.diff.is_some()
    }

    /// Author date in local time, `YYYY-MM-DD HH:MM:SS`
    pub fn authored_at_display(&self) -> String {
        DateTime::from_timestamp(self.authored_at, 0)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Append-only, index-addressed table of commits.
///
/// Display rows refer to commits by index into this table. The table also
/// remembers the first row each commit appeared on, and resolves full hashes
/// back to indices.
#[derive(Clone, Debug, Default)]
pub struct CommitStore {
    commits: Vec<Commit>,
    first_rows: Vec<usize>,
    by_hash: HashMap<String, usize>,
}

impl CommitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a commit first seen on `row`, returning its index
    pub fn push(&mut self, commit: Commit, row: usize) -> usize {
        let index = self.commits.len();
        self.by_hash.entry(commit.full_hash.clone()).or_insert(index);
        self.commits.push(commit);
        self.first_rows.push(row);
        index
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&Commit> {
        self.commits.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.commits.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commit> {
        self.commits.iter()
    }

    /// Row index on which the commit at `index` was recorded
    pub fn first_row_of_commit(&self, index: usize) -> Result<usize> {
        self.first_rows
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                index,
                len: self.first_rows.len(),
            })
    }

    /// Resolve a full commit id to its index
    pub fn index_of(&self, full_hash: &str) -> Option<usize> {
        self.by_hash.get(full_hash).copied()
    }

    /// Attach fetched diff data. Applying the same payload again leaves the
    /// stored state unchanged.
    pub fn attach_diff(&mut self, index: usize, payload: DiffPayload) -> Result<()> {
        let len = self.commits.len();
        let commit = self
            .commits
            .get_mut(index)
            .ok_or(Error::IndexOutOfRange { index, len })?;
        if commit.diff.as_ref() != Some(&payload) {
            commit.diff = Some(payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH_A: &str = "1111111111111111111111111111111111111111";
    const HASH_B: &str = "2222222222222222222222222222222222222222";

    fn store_with_two() -> CommitStore {
        let mut store = CommitStore::new();
        store.push(Commit::new(HASH_A, "Alice", 1_700_000_000, "Initial", &[], ""), 0);
        store.push(
            Commit::new(HASH_B, "Bob", 1_700_000_100, "Second", &[HASH_A], " HEAD -> main "),
            2,
        );
        store
    }

    #[test]
    fn test_commit_fields() {
        let store = store_with_two();
        let second = store.get(1).unwrap();
        assert_eq!(second.short_hash, "2222222");
        assert_eq!(second.full_hash, HASH_B);
        assert_eq!(second.parent_short_hashes, vec!["1111111".to_string()]);
        assert_eq!(second.refs, "HEAD -> main");
        assert!(!second.is_root());
        assert!(!second.is_merge());
        assert!(store.get(0).unwrap().is_root());
    }

    #[test]
    fn test_get_out_of_range() {
        let store = store_with_two();
        assert_eq!(
            store.get(2).unwrap_err(),
            Error::IndexOutOfRange { index: 2, len: 2 }
        );
        assert!(store.first_row_of_commit(5).is_err());
        assert!(CommitStore::new().get(0).is_err());
    }

    #[test]
    fn test_first_row_and_hash_lookup() {
        let store = store_with_two();
        assert_eq!(store.first_row_of_commit(0).unwrap(), 0);
        assert_eq!(store.first_row_of_commit(1).unwrap(), 2);
        assert_eq!(store.index_of(HASH_B), Some(1));
        assert_eq!(store.index_of("2222222"), None);
    }

    #[test]
    fn test_attach_diff_is_idempotent() {
        let payload = DiffPayload {
            summary: " a.txt | 1 +".into(),
            body: "+hello".into(),
            truncated: false,
        };

        let mut once = store_with_two();
        once.attach_diff(1, payload.clone()).unwrap();

        let mut twice = store_with_two();
        twice.attach_diff(1, payload.clone()).unwrap();
        twice.attach_diff(1, payload.clone()).unwrap();

        assert_eq!(once.get(1).unwrap().diff(), twice.get(1).unwrap().diff());
        assert!(twice.get(1).unwrap().diff_loaded());
        assert!(!twice.get(0).unwrap().diff_loaded());
    }

    #[test]
    fn test_attach_diff_out_of_range() {
        let mut store = store_with_two();
        let err = store.attach_diff(9, DiffPayload::default()).unwrap_err();
        assert_eq!(err, Error::IndexOutOfRange { index: 9, len: 2 });
    }

    #[test]
    fn test_short_hash_of_short_input() {
        assert_eq!(short_hash("abc"), "abc");
        assert_eq!(short_hash(HASH_A), "1111111");
    }
}
