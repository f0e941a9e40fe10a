//! Terminal session and the control loop.
//!
//! Every event (keys, resizes, task results, repository changes) arrives on
//! one channel and is applied in order; a full frame is redrawn after each.

use std::io::{self, Write};
use std::sync::mpsc::{Receiver, Sender};

use anyhow::Context;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event};
use crossterm::style::Print;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use tracing::{debug, error, info, warn};

use crate::app::{AppState, update};
use crate::crash_log;
use crate::input::map_key;
use crate::messages::{AppEvent, Task, TaskContext, spawn_task};
use crate::render::{RenderOptions, diagnostic_frame, render_frame};
use crate::ui::{Frame, Theme, ansi};

/// Raw mode plus the alternate screen, undone on drop
pub struct TerminalSession {
    _private: (),
}

impl TerminalSession {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        // From here on the guard owns cleanup, including on the error path
        let session = Self { _private: () };
        execute!(io::stdout(), EnterAlternateScreen, Hide)
            .context("entering alternate screen")?;
        Ok(session)
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        restore();
    }
}

/// Put the terminal back into cooked mode. Safe to call more than once.
pub fn restore() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Translate a crossterm event; `None` for events the viewer ignores
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) => map_key(key).map(AppEvent::Nav),
        Event::Resize(width, height) => Some(AppEvent::Resize {
            width: width as usize,
            height: height as usize,
        }),
        _ => None,
    }
}

fn spawn_input_thread(sender: Sender<AppEvent>) -> io::Result<()> {
    std::thread::Builder::new()
        .name("gitraffe-input".into())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(raw) => {
                        if let Some(event) = translate(raw)
                            && sender.send(event).is_err()
                        {
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read terminal input: {e}");
                        let _ = sender.send(AppEvent::Nav(crate::input::NavAction::Quit));
                        return;
                    }
                }
            }
        })
        .map(|_| ())
}

/// Write `frame` at the top-left corner, one terminal row per line
pub fn draw_frame(out: &mut impl Write, frame: &Frame, clear: bool) -> io::Result<()> {
    if clear {
        queue!(out, Clear(ClearType::All))?;
    }
    for (row, line) in frame.lines.iter().enumerate() {
        let row = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, row), Print(line), Print(ansi::RESET))?;
    }
    out.flush()
}

/// Owns everything the loop needs besides the application state
pub struct EventLoop<'a> {
    pub ctx: &'a TaskContext,
    pub theme: &'a Theme,
    pub options: RenderOptions,
    pub sender: Sender<AppEvent>,
}

impl EventLoop<'_> {
    fn start(&self, task: Option<Task>) {
        if let Some(task) = task {
            spawn_task(task, self.ctx, &self.sender);
        }
    }

    fn frame(&self, state: &AppState) -> Frame {
        match render_frame(state, self.theme, self.options) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Render failed: {e}");
                diagnostic_frame(&e, state.width, state.height, state.log_path.as_deref())
            }
        }
    }

    /// Apply events until a quit is requested or every sender is gone.
    /// Returns the final state.
    pub fn drive(
        &self,
        mut state: AppState,
        events: &Receiver<AppEvent>,
        out: &mut impl Write,
    ) -> anyhow::Result<AppState> {
        let mut drawn_size = (state.width, state.height);
        draw_frame(out, &self.frame(&state), true).context("drawing frame")?;

        while let Ok(event) = events.recv() {
            crash_log::breadcrumb(event.breadcrumb());
            let (next, task) = update(state, event);
            state = next;
            if !state.running {
                info!("quit requested");
                break;
            }
            self.start(task);

            let size = (state.width, state.height);
            let frame = self.frame(&state);
            draw_frame(out, &frame, size != drawn_size).context("drawing frame")?;
            drawn_size = size;
        }
        Ok(state)
    }
}

/// Take over the terminal and run until the user quits
pub fn run(
    state: AppState,
    event_loop: &EventLoop<'_>,
    events: &Receiver<AppEvent>,
) -> anyhow::Result<()> {
    let _session = TerminalSession::enter()?;
    spawn_input_thread(event_loop.sender.clone()).context("spawning input thread")?;

    match terminal::size() {
        Ok((width, height)) => {
            let _ = event_loop.sender.send(AppEvent::Resize {
                width: width as usize,
                height: height as usize,
            });
        }
        Err(e) => warn!("Could not query terminal size: {e}"),
    }
    debug!("initial history load");
    event_loop.start(Some(Task::LoadHistory));

    let mut stdout = io::stdout();
    event_loop.drive(state, events, &mut stdout)?;
    Ok(())
}
