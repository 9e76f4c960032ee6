//! Live display surface and the fixed-cadence render loop.
//!
//! The surface is an RAII guard over the alternate screen: `Drop`, the
//! panic hook, and the explicit `leave` on the loop's exit paths all
//! restore the terminal, so no path leaves the live mode active.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::render::Renderer;
use crate::state::PanelState;

/// The live display mode: alternate screen, hidden cursor.
pub struct LiveSurface {
    active: bool,
}

impl LiveSurface {
    pub fn enter() -> Result<Self> {
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { active: true })
    }

    /// Draw one frame, replacing the previous one in place.
    pub fn draw(&mut self, frame: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, cursor::MoveTo(0, 0), terminal::Clear(terminal::ClearType::All))?;
        stdout.write_all(frame.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore the normal screen. Safe to call more than once.
    pub fn leave(&mut self) {
        if self.active {
            self.active = false;
            let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        }
    }
}

impl Drop for LiveSurface {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Restore the terminal before the default panic report runs.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        original_hook(panic);
    }));
}

/// How the live loop ended.
pub struct LiveRun {
    pub interrupted: bool,
    /// Tick value for the final scrollback render.
    pub last_tick: u64,
}

/// Redraw on a fixed cadence until the probing work finishes or the token
/// is cancelled. Each tick takes a fresh snapshot, so the loop only ever
/// reads already-materialized records and is never blocked by network I/O.
pub async fn run_live(
    panel: &PanelState,
    renderer: &Renderer,
    frame_interval: Duration,
    work: &mut JoinHandle<()>,
    cancel: &CancellationToken,
) -> Result<LiveRun> {
    let mut surface = LiveSurface::enter()?;
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut tick: u64 = 0;
    let interrupted = loop {
        tokio::select! {
            _ = cancel.cancelled() => break true,
            _ = &mut *work => break false,
            _ = ticker.tick() => {
                surface.draw(&renderer.render(&panel.snapshot(tick)))?;
                tick += 1;
            }
        }
    };

    surface.leave();
    Ok(LiveRun { interrupted, last_tick: tick })
}
