//! Display loop
//!
//! Renders at its own cadence, decoupled from the think cadence. Each tick
//! reads the latest worker snapshot from the watch channel: surfaced
//! thoughts print as full lines, counters repaint a single status line in
//! place. On graceful stop it renders the final session summary; a forced
//! stop never reaches it.

use crate::session::DisplayState;
use std::io::Write;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct DisplayLoop {
    state_rx: watch::Receiver<DisplayState>,
    refresh: Duration,
    started: Instant,
    last_shown: u64,
}

impl DisplayLoop {
    pub fn new(state_rx: watch::Receiver<DisplayState>, refresh: Duration) -> Self {
        Self {
            state_rx,
            refresh,
            started: Instant::now(),
            last_shown: 0,
        }
    }

    /// Tick until cancelled, then render the final summary.
    pub async fn run(mut self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.render_tick(),
                _ = token.cancelled() => break,
            }
        }
        self.render_summary();
    }

    fn render_tick(&mut self) {
        let state = self.state_rx.borrow().clone();

        if let Some(thought) = &state.latest {
            if thought.number != self.last_shown {
                self.last_shown = thought.number;
                // Clear the status line before the full-line print
                print!("\r\x1b[2K");
                println!("[{}] {}", thought.number, thought.text.trim());
            }
        }

        print!(
            "\r\x1b[2K{}",
            format_status(&state, self.started.elapsed())
        );
        let _ = std::io::stdout().flush();
    }

    fn render_summary(&mut self) {
        let state = self.state_rx.borrow().clone();
        print!("\r\x1b[2K");
        println!();
        println!("session complete");
        println!("  thoughts:         {}", state.thoughts);
        println!("  surfaced:         {}", state.surfaced);
        println!("  emergence events: {}", state.emergences);
        println!("  log: {}", state.log_path.display());
    }
}

/// The one-line status repainted each tick.
pub fn format_status(state: &DisplayState, elapsed: Duration) -> String {
    let thought = if state.latest.is_none() {
        " | awaiting first surfaced thought".to_string()
    } else {
        String::new()
    };
    format!(
        "thoughts {} | surfaced {} | buffer {} chars | up {}{}",
        state.thoughts,
        state.surfaced,
        state.buffer_chars,
        format_elapsed(elapsed),
        thought
    )
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
