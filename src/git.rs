use anyhow::{Context, Result, bail};
use git2::{Oid, Repository};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::graph::{Commit, DiffPayload, HistorySource};

/// `git log --graph` record: hash, author, author time, subject, parents, decorations
pub const GRAPH_FORMAT: &str = "%H%x00%an%x00%at%x00%s%x00%P%x00%D";
/// Same fields for the flat fallback, `|` separated
pub const FLAT_FORMAT: &str = "%H|%an|%at|%s|%P|%D";

const UNKNOWN: &str = "unknown";

/// Summary of the repository shown in the header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub branch: String,
    /// Short id of the checked out commit
    pub head: String,
}

impl Default for RepoInfo {
    fn default() -> Self {
        Self {
            name: UNKNOWN.to_string(),
            branch: UNKNOWN.to_string(),
            head: UNKNOWN.to_string(),
        }
    }
}

/// Repository wrapper for our git operations
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a repository at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path.as_ref())
            .with_context(|| format!("Failed to open repository at {:?}", path.as_ref()))?;
        Ok(Self { repo })
    }

    /// Get the repository's working directory
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Path of the `.git` directory
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get commits for building a graph (includes all branches)
    pub fn commit_graph(&self, max_commits: usize) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk().context("Failed to create revwalk")?;

        // Include all branches
        for (branch, _) in self.repo.branches(None)?.flatten() {
            if let Ok(reference) = branch.get().resolve() {
                if let Some(oid) = reference.target() {
                    let _ = revwalk.push(oid);
                }
            }
        }

        // Sort topologically for better graph layout
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let labels = self.ref_labels()?;
        let commits: Vec<Commit> = revwalk
            .take(max_commits)
            .filter_map(|oid| {
                let oid = oid.ok()?;
                let commit = self.repo.find_commit(oid).ok()?;
                let parents: Vec<String> = commit.parent_ids().map(|p| p.to_string()).collect();
                let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
                Some(Commit::new(
                    oid.to_string(),
                    commit.author().name().unwrap_or("Unknown"),
                    commit.time().seconds(),
                    commit.summary().unwrap_or(""),
                    &parents,
                    labels.get(&oid).map(|l| l.join(", ")).unwrap_or_default(),
                ))
            })
            .collect();

        Ok(commits)
    }

    /// Get the repository name (basename of workdir or bare repo path)
    pub fn repo_name(&self) -> String {
        self.repo
            .workdir()
            .or_else(|| self.repo.path().parent())
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(UNKNOWN)
            .to_string()
    }

    /// Get the current branch name
    pub fn current_branch(&self) -> Result<String> {
        let head = self.repo.head().context("Failed to get HEAD")?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            // Detached HEAD
            Ok("HEAD".to_string())
        }
    }

    /// Get the head commit OID
    pub fn head_oid(&self) -> Result<Oid> {
        let head = self.repo.head().context("Failed to get HEAD")?;
        head.target().context("HEAD has no target")
    }

    /// Get branch tips (for graph labels)
    pub fn branch_tips(&self) -> Result<Vec<BranchTip>> {
        let head = self.repo.head().ok();
        let head_branch = head
            .as_ref()
            .filter(|h| h.is_branch())
            .and_then(|h| h.shorthand().map(str::to_string));

        let mut tips = Vec::new();
        for (branch, branch_type) in self.repo.branches(None)?.flatten() {
            if let Ok(reference) = branch.get().resolve() {
                if let Some(oid) = reference.target() {
                    let name = branch.name().ok().flatten().unwrap_or("").to_string();
                    let is_remote = branch_type == git2::BranchType::Remote;
                    let is_head = !is_remote && head_branch.as_deref() == Some(name.as_str());
                    tips.push(BranchTip {
                        name,
                        oid,
                        is_remote,
                        is_head,
                    });
                }
            }
        }

        Ok(tips)
    }

    /// Get tags
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            // Resolve to the commit (tags can point to tag objects)
            let commit_oid = self
                .repo
                .find_object(oid, None)
                .ok()
                .and_then(|obj| obj.peel_to_commit().ok())
                .map(|c| c.id())
                .unwrap_or(oid);

            tags.push(TagInfo {
                name,
                oid: commit_oid,
            });
            true
        })?;

        Ok(tags)
    }

    /// Decoration labels per commit, in the style of `%D`
    pub fn ref_labels(&self) -> Result<HashMap<Oid, Vec<String>>> {
        let mut labels: HashMap<Oid, Vec<String>> = HashMap::new();

        if let Ok(oid) = self.head_oid() {
            if self.repo.head_detached().unwrap_or(false) {
                labels.entry(oid).or_default().push("HEAD".to_string());
            }
        }
        let mut tips = self.branch_tips()?;
        // Checked out branch first, then local before remote
        tips.sort_by_key(|t| (!t.is_head, t.is_remote));
        for tip in tips {
            let label = if tip.is_head {
                format!("HEAD -> {}", tip.name)
            } else {
                tip.name
            };
            labels.entry(tip.oid).or_default().push(label);
        }
        for tag in self.tags()? {
            labels.entry(tag.oid).or_default().push(format!("tag: {}", tag.name));
        }
        Ok(labels)
    }
}

/// Branch tip for graph labels
#[derive(Clone, Debug)]
pub struct BranchTip {
    pub name: String,
    pub oid: Oid,
    pub is_remote: bool,
    pub is_head: bool,
}

/// Tag information
#[derive(Clone, Debug)]
pub struct TagInfo {
    pub name: String,
    pub oid: Oid,
}

/// Run `git` in `workdir` and return its stdout
fn run_git(workdir: &Path, args: &[&str]) -> Result<String> {
    debug!("git {}", args.join(" "));
    let output = Command::new("git")
        .arg("-C")
        .arg(workdir)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run git {}", args.first().unwrap_or(&"")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git {} exited with {}: {}",
            args.first().unwrap_or(&""),
            output.status,
            stderr.trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// History source backed by the `git` command line, with git2 as last resort
pub struct GitCli {
    workdir: PathBuf,
    max_commits: usize,
}

impl GitCli {
    pub fn new(workdir: impl Into<PathBuf>, max_commits: usize) -> Self {
        Self {
            workdir: workdir.into(),
            max_commits,
        }
    }

    fn log_lines(&self, graph: bool, format: &str) -> Result<Vec<String>> {
        let limit = format!("-n{}", self.max_commits);
        let pretty = format!("--pretty=format:{format}");
        let mut args = vec!["log"];
        if graph {
            args.push("--graph");
        }
        args.extend(["--all", "--color=never", limit.as_str(), pretty.as_str()]);
        let out = run_git(&self.workdir, &args)?;
        Ok(out.lines().map(str::to_string).collect())
    }

    /// Name, branch and head id, degrading to `rev-parse` and then to `unknown`
    pub fn repo_info(&self) -> RepoInfo {
        let repo = GitRepo::open(&self.workdir)
            .inspect_err(|e| warn!("git2 could not open repository: {e:#}"))
            .ok();
        let rev_parse = |args: &[&str]| {
            run_git(&self.workdir, args)
                .map(|s| s.trim().to_string())
                .ok()
                .filter(|s| !s.is_empty())
        };

        let name = repo.as_ref().map(GitRepo::repo_name).or_else(|| {
            rev_parse(&["rev-parse", "--show-toplevel"]).and_then(|top| {
                Path::new(&top)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
        });
        let branch = repo
            .as_ref()
            .and_then(|r| r.current_branch().ok())
            .or_else(|| rev_parse(&["rev-parse", "--abbrev-ref", "HEAD"]));
        let head = repo
            .as_ref()
            .and_then(|r| r.head_oid().ok())
            .map(|oid| crate::graph::short_hash(&oid.to_string()))
            .or_else(|| rev_parse(&["rev-parse", "--short=7", "HEAD"]));

        let unknown = || UNKNOWN.to_string();
        RepoInfo {
            name: name.unwrap_or_else(unknown),
            branch: branch.unwrap_or_else(unknown),
            head: head.unwrap_or_else(unknown),
        }
    }

    /// Diff stat and patch for one commit, the patch cut at `line_cap` lines
    pub fn show_diff(&self, full_hash: &str, line_cap: usize) -> Result<DiffPayload> {
        let summary = run_git(&self.workdir, &["show", "--format=", "--stat", "--no-color", full_hash])?;
        let body = run_git(&self.workdir, &["show", "--format=", "--no-color", "-p", full_hash])?;
        let (body, truncated) = cap_lines(&body, line_cap);
        Ok(DiffPayload {
            summary: summary.trim().to_string(),
            body,
            truncated,
        })
    }
}

impl HistorySource for GitCli {
    fn graph_lines(&self) -> Result<Vec<String>> {
        self.log_lines(true, GRAPH_FORMAT)
    }

    fn flat_lines(&self) -> Result<Vec<String>> {
        self.log_lines(false, FLAT_FORMAT)
    }

    fn library_commits(&self) -> Result<Vec<Commit>> {
        GitRepo::open(&self.workdir)?.commit_graph(self.max_commits)
    }
}

/// Keep at most `cap` lines of `text`, reporting whether any were dropped
pub fn cap_lines(text: &str, cap: usize) -> (String, bool) {
    let total = text.lines().count();
    if total <= cap {
        return (text.trim_end().to_string(), false);
    }
    let kept: Vec<&str> = text.lines().take(cap).collect();
    (kept.join("\n"), true)
}
