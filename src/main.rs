mod app;
mod config;
mod crash_log;
mod error;
mod git;
mod graph;
mod input;
mod logging;
mod messages;
mod render;
mod terminal;
mod ui;
mod views;
mod watcher;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{info, warn};

use crate::app::AppState;
use crate::config::Config;
use crate::git::GitRepo;
use crate::graph::GraphStyle;
use crate::messages::TaskContext;
use crate::render::RenderOptions;
use crate::terminal::EventLoop;
use crate::ui::Theme;
use crate::watcher::RepoWatcher;

/// Terminal viewer for git commit graphs
#[derive(Parser, Debug)]
#[command(name = "gitraffe", version, about)]
struct CliArgs {
    /// Repository to open (any path inside it)
    #[arg(default_value = ".")]
    repo: PathBuf,

    /// Write logs here instead of the config directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Upper bound on commits read per load
    #[arg(long)]
    max_commits: Option<usize>,

    /// Draw the graph with git's ASCII glyphs
    #[arg(long)]
    ascii: bool,

    /// Do not reload when the repository changes on disk
    #[arg(long)]
    no_watch: bool,
}

impl CliArgs {
    /// Flags override the settings file
    fn apply(&self, mut config: Config) -> Config {
        if let Some(max) = self.max_commits {
            config.max_commits = max.max(1);
        }
        if self.ascii {
            config.graph_style = GraphStyle::Ascii;
        }
        if self.no_watch {
            config.watch_repo = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    crash_log::init();
    crash_log::install_panic_hook();
    crash_log::prune_crash_logs(crash_log::KEEP_CRASH_LOGS);
    let previous_crash = crash_log::has_crash_since_last_exit();

    let log_path = cli_args
        .log_file
        .clone()
        .unwrap_or_else(|| config::config_dir().join("gitraffe.log"));
    // Logging is best effort; the viewer works without it
    let log_path = match logging::init_global(&log_path) {
        Ok(()) => Some(log_path),
        Err(e) => {
            eprintln!("Logging disabled: {e:#}");
            None
        }
    };

    let config = cli_args.apply(Config::load());
    info!("gitraffe {} starting with {config:?}", env!("CARGO_PKG_VERSION"));

    // git2 resolves the top level; when it can't, the git CLI reports why
    let repo = GitRepo::open(&cli_args.repo)
        .inspect_err(|e| warn!("{e:#}"))
        .ok();
    let workdir = repo
        .as_ref()
        .and_then(|r| r.workdir().map(PathBuf::from))
        .unwrap_or_else(|| cli_args.repo.clone());

    let ctx = TaskContext {
        workdir: workdir.clone(),
        max_commits: config.max_commits,
        diff_line_cap: config.diff_line_cap,
        graph_style: config.graph_style,
    };

    let (sender, events) = mpsc::channel();

    let _watcher = match &repo {
        Some(repo) if config.watch_repo => {
            match RepoWatcher::new(repo.git_dir(), sender.clone()) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    warn!("File watching disabled: {e}");
                    None
                }
            }
        }
        _ => None,
    };

    let mut state = AppState::new(config.page_size, log_path);
    if let Some(path) = previous_crash {
        state.status = Some(format!("Previous session crashed; report at {}", path.display()));
    }

    let theme = Theme::dark();
    let event_loop = EventLoop {
        ctx: &ctx,
        theme: &theme,
        options: RenderOptions {
            graph_max_percent: config.graph_panel_max_percent,
        },
        sender,
    };
    terminal::run(state, &event_loop, &events)?;

    crash_log::mark_clean_exit();
    info!("clean exit");
    Ok(())
}
