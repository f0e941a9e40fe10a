//! Parsing of `git log --graph` output and the flat fallback stream.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{Commit, CommitStore};
use super::{DisplayRow, History, HistoryMode};
use crate::error::{Error, Result};

/// Separator between fields of a graph record (`%x00`)
pub const FIELD_SEPARATOR: char = '\0';
/// Separator between fields of a flat record
pub const FLAT_SEPARATOR: char = '|';

/// hash, author, timestamp, subject, parents, refs
const MAX_FIELDS: usize = 6;
/// Records without at least hash, author, timestamp and subject are dropped
const MIN_FIELDS: usize = 4;

static HASH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9a-f]{40}").expect("hash pattern is a valid regex"));

/// Character set used for connector glyphs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStyle {
    /// Box-drawing glyphs (`●`, `│`)
    #[default]
    Unicode,
    /// Git's own ASCII glyphs, untouched
    Ascii,
}

impl GraphStyle {
    /// Node glyph for a commit shown without connector data
    pub fn node_glyph(self, commit: &Commit) -> char {
        match (self, commit.is_root(), commit.is_merge()) {
            (GraphStyle::Unicode, true, _) => '◉',
            (GraphStyle::Unicode, _, true) => '◆',
            (GraphStyle::Unicode, _, _) => '●',
            (GraphStyle::Ascii, true, _) => 'o',
            (GraphStyle::Ascii, _, true) => 'M',
            (GraphStyle::Ascii, _, _) => '*',
        }
    }
}

const UNICODE_GLYPHS: &[(char, char)] = &[('*', '●'), ('|', '│')];

/// Map git's ASCII connector glyphs onto the display set. Unknown characters
/// pass through unchanged; every substitution is one column wide.
pub fn transliterate(connector: &str, style: GraphStyle) -> String {
    match style {
        GraphStyle::Ascii => connector.to_string(),
        GraphStyle::Unicode => connector
            .chars()
            .map(|c| {
                UNICODE_GLYPHS
                    .iter()
                    .find(|(from, _)| *from == c)
                    .map(|(_, to)| *to)
                    .unwrap_or(c)
            })
            .collect(),
    }
}

/// Byte range of the first full commit id in `line`, if any
pub fn find_commit_hash(line: &str) -> Option<Range<usize>> {
    HASH_PATTERN.find(line).map(|m| m.range())
}

fn parse_timestamp(raw: &str, hash: &str) -> i64 {
    match raw.trim().parse::<i64>() {
        Ok(ts) => ts,
        Err(e) => {
            warn!("bad timestamp {raw:?} on {hash}: {e}");
            0
        }
    }
}

fn build_commit(fields: &[&str]) -> Commit {
    let hash = fields[0];
    let parents: Vec<&str> = fields
        .get(4)
        .map(|p| p.split_whitespace().collect())
        .unwrap_or_default();
    Commit::new(
        hash,
        fields[1],
        parse_timestamp(fields[2], hash),
        fields[3],
        &parents,
        fields.get(5).copied().unwrap_or(""),
    )
}

/// Parse a `\0` separated graph record starting at the commit id
pub fn parse_record(record: &str) -> Result<Commit> {
    let fields: Vec<&str> = record.splitn(MAX_FIELDS, FIELD_SEPARATOR).collect();
    if fields.len() < MIN_FIELDS {
        return Err(Error::ParseSkip(format!(
            "expected at least {MIN_FIELDS} fields, found {}",
            fields.len()
        )));
    }
    Ok(build_commit(&fields))
}

/// Parse a `|` separated flat record. The subject may itself contain `|`,
/// so the trailing parents and refs fields are split from the right.
pub fn parse_flat_record(line: &str) -> Result<Commit> {
    let head: Vec<&str> = line.splitn(MIN_FIELDS, FLAT_SEPARATOR).collect();
    if head.len() < MIN_FIELDS {
        return Err(Error::ParseSkip(format!(
            "expected at least {MIN_FIELDS} fields, found {}",
            head.len()
        )));
    }
    if find_commit_hash(head[0]).map(|r| r.start) != Some(0) {
        return Err(Error::ParseSkip(format!("no commit id at start of {line:?}")));
    }

    let mut tail: Vec<&str> = head[3].rsplitn(3, FLAT_SEPARATOR).collect();
    tail.reverse();
    let (subject, parents, refs) = match tail.as_slice() {
        [subject, parents, refs] => (*subject, *parents, *refs),
        [subject, parents] => (*subject, *parents, ""),
        [subject] => (*subject, "", ""),
        _ => (head[3], "", ""),
    };

    Ok(build_commit(&[head[0], head[1], head[2], subject, parents, refs]))
}

/// Turns `git log --graph` lines into display rows and a commit table
pub struct GraphStreamParser {
    style: GraphStyle,
}

impl GraphStreamParser {
    pub fn new(style: GraphStyle) -> Self {
        Self { style }
    }

    /// Parse a full graph stream.
    ///
    /// Fails with [`Error::SourceUnavailable`] when the stream holds no commit
    /// record at all, which callers take as the signal to fall back to the flat
    /// stream.
    pub fn parse<I, S>(&self, lines: I) -> Result<History>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = CommitStore::new();
        let mut rows: Vec<DisplayRow> = Vec::new();
        let mut max_graph_width = 0;
        let mut skipped = 0usize;

        for line in lines {
            let line = line.as_ref();
            if line.is_empty() {
                continue;
            }

            let (connector, commit) = match find_commit_hash(line) {
                Some(range) => match parse_record(&line[range.start..]) {
                    Ok(commit) => (&line[..range.start], Some(commit)),
                    Err(e) => {
                        debug!("dropping graph line: {e}");
                        skipped += 1;
                        continue;
                    }
                },
                None => (line, None),
            };

            let visual_width = connector.chars().count();
            max_graph_width = max_graph_width.max(visual_width);

            let row = rows.len();
            rows.push(DisplayRow {
                connector_glyphs: transliterate(connector, self.style),
                visual_width,
                commit: commit.map(|c| store.push(c, row)),
            });
        }

        if store.is_empty() {
            return Err(Error::SourceUnavailable(
                "graph output contained no commit records".to_string(),
            ));
        }

        debug!(
            "parsed graph: {} commits, {} rows, {} skipped, max graph width {}",
            store.len(),
            rows.len(),
            skipped,
            max_graph_width
        );

        Ok(History {
            store,
            rows,
            max_graph_width,
            mode: HistoryMode::Graph,
        })
    }
}

/// Parse the flat stream into a simple-mode history (one row per commit)
pub fn parse_flat<I, S>(lines: I, style: GraphStyle) -> Result<History>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut commits = Vec::new();
    let mut seen_lines = 0usize;

    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        seen_lines += 1;
        match parse_flat_record(line) {
            Ok(commit) => commits.push(commit),
            Err(e) => debug!("dropping flat line: {e}"),
        }
    }

    if commits.is_empty() && seen_lines > 0 {
        return Err(Error::SourceUnavailable(
            "flat output contained no commit records".to_string(),
        ));
    }

    Ok(History::from_commits(commits, style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HASH1: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";
    const HASH2: &str = "0fedcba9876543210fedcba9876543210fedcba9";

    #[test]
    fn test_find_commit_hash() {
        let line = format!("| * {HASH1}\0Alice");
        assert_eq!(find_commit_hash(&line), Some(4..44));
        assert_eq!(find_commit_hash("|\\"), None);
        // 39 hex digits is not an id
        assert_eq!(find_commit_hash(&HASH1[..39]), None);
        // Uppercase is not what git prints for %H
        assert_eq!(find_commit_hash(&HASH1.to_uppercase()), None);
    }

    #[test]
    fn test_transliterate() {
        assert_eq!(transliterate("* | /", GraphStyle::Unicode), "● │ /");
        assert_eq!(transliterate("|\\", GraphStyle::Unicode), "│\\");
        assert_eq!(transliterate("* |", GraphStyle::Ascii), "* |");
    }

    #[test]
    fn test_three_line_scenario() {
        let lines = vec![
            format!("* {HASH1}\0Alice\01700000000\0Initial\0\0"),
            "|\\".to_string(),
            format!("* {HASH2}\0Bob\01700000100\0Second\0{HASH1}\0"),
        ];
        let history = GraphStreamParser::new(GraphStyle::Unicode)
            .parse(&lines)
            .unwrap();

        assert_eq!(history.rows.len(), 3);
        assert_eq!(history.store.len(), 2);
        assert_eq!(history.max_graph_width, 2);
        assert_eq!(history.mode, HistoryMode::Graph);

        assert_eq!(history.rows[0].commit, Some(0));
        assert_eq!(history.rows[0].connector_glyphs, "● ");
        assert_eq!(history.rows[1].commit, None);
        assert_eq!(history.rows[1].connector_glyphs, "│\\");
        assert_eq!(history.rows[2].commit, Some(1));

        let first = history.store.get(0).unwrap();
        assert_eq!(first.author, "Alice");
        assert_eq!(first.authored_at, 1_700_000_000);
        assert!(first.parent_short_hashes.is_empty());

        let second = history.store.get(1).unwrap();
        assert_eq!(second.subject, "Second");
        assert_eq!(second.parent_short_hashes, vec![HASH1[..7].to_string()]);
        assert_eq!(history.store.first_row_of_commit(1).unwrap(), 2);
    }

    #[test]
    fn test_short_record_is_dropped() {
        let lines = vec![
            format!("* {HASH1}\0Alice\01700000000"),
            format!("* {HASH2}\0Bob\01700000100\0Kept\0\0"),
        ];
        let history = GraphStreamParser::new(GraphStyle::Unicode)
            .parse(&lines)
            .unwrap();
        assert_eq!(history.rows.len(), 1);
        assert_eq!(history.store.get(0).unwrap().subject, "Kept");
    }

    #[test]
    fn test_refs_and_merge_parents() {
        let line = format!("*   {HASH2}\0Bob\01700000100\0Merge\0{HASH1} {HASH1}\0 HEAD -> main, tag: v1 ");
        let history = GraphStreamParser::new(GraphStyle::Unicode)
            .parse([line])
            .unwrap();
        let commit = history.store.get(0).unwrap();
        assert!(commit.is_merge());
        assert_eq!(commit.refs, "HEAD -> main, tag: v1");
        assert_eq!(history.rows[0].visual_width, 4);
    }

    #[test]
    fn test_bad_timestamp_defaults_to_zero() {
        let line = format!("* {HASH1}\0Alice\0yesterday\0Oops\0\0");
        let history = GraphStreamParser::new(GraphStyle::Unicode)
            .parse([line])
            .unwrap();
        assert_eq!(history.store.get(0).unwrap().authored_at, 0);
    }

    #[test]
    fn test_stream_without_records_is_unavailable() {
        let result = GraphStreamParser::new(GraphStyle::Unicode).parse(["fatal: not a git repository"]);
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));

        let empty: Vec<String> = Vec::new();
        let result = GraphStreamParser::new(GraphStyle::Unicode).parse(empty);
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn test_flat_record_with_pipe_in_subject() {
        let line = format!("{HASH2}|Bob|1700000100|fix a | b parsing|{HASH1}|HEAD -> main");
        let commit = parse_flat_record(&line).unwrap();
        assert_eq!(commit.subject, "fix a | b parsing");
        assert_eq!(commit.parent_short_hashes, vec![HASH1[..7].to_string()]);
        assert_eq!(commit.refs, "HEAD -> main");
    }

    #[test]
    fn test_flat_record_rejects_garbage() {
        assert!(matches!(
            parse_flat_record("not|a|commit|line"),
            Err(Error::ParseSkip(_))
        ));
        assert!(matches!(parse_flat_record("short"), Err(Error::ParseSkip(_))));
    }

    #[test]
    fn test_parse_flat_rows_follow_commits() {
        let lines = vec![
            format!("{HASH2}|Bob|1700000100|Second|{HASH1}|"),
            format!("{HASH1}|Alice|1700000000|Initial||"),
        ];
        let history = parse_flat(&lines, GraphStyle::Unicode).unwrap();
        assert_eq!(history.mode, HistoryMode::Simple);
        assert_eq!(history.rows.len(), 2);
        for (i, row) in history.rows.iter().enumerate() {
            assert_eq!(row.commit, Some(i));
        }
        assert_eq!(history.rows[0].connector_glyphs, "●");
        assert_eq!(history.rows[1].connector_glyphs, "◉");
    }

    proptest! {
        #[test]
        fn prop_rows_never_exceed_max_width(
            connectors in proptest::collection::vec("[*|/\\\\_. -]{0,12}", 1..40),
            with_commit in proptest::collection::vec(any::<bool>(), 40),
        ) {
            let lines: Vec<String> = connectors
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    if with_commit[i] {
                        format!("{c}{HASH1}\0Alice\01700000000\0Subject {i}\0\0")
                    } else {
                        c.clone()
                    }
                })
                .collect();

            if let Ok(history) = GraphStreamParser::new(GraphStyle::Unicode).parse(&lines) {
                let widest = history.rows.iter().map(|r| r.visual_width).max().unwrap_or(0);
                prop_assert_eq!(widest, history.max_graph_width);
                for row in &history.rows {
                    prop_assert!(row.visual_width <= history.max_graph_width);
                    prop_assert_eq!(row.connector_glyphs.chars().count(), row.visual_width);
                    if let Some(index) = row.commit {
                        prop_assert!(history.store.get(index).is_ok());
                    }
                }
            }
        }
    }
}
