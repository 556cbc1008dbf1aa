//! Busy indicator on standard error while the tail loop waits.

use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveToColumn, Show};
use crossterm::execute;
use crossterm::style::{PrintStyledContent, Stylize};
use crossterm::terminal::{Clear, ClearType};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

pub struct Spinner {
    enabled: bool,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl Spinner {
    /// A disabled spinner never draws anything.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            running: None,
        }
    }

    /// Enabled only when standard error is a terminal.
    pub fn for_stderr() -> Self {
        Self::new(io::stderr().is_terminal())
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn start(&mut self) {
        if !self.enabled || self.running.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let stop = token.clone();
        let handle = tokio::spawn(async move {
            let mut stderr = io::stderr();
            let _ = execute!(stderr, Hide);
            for frame in FRAMES.iter().cycle() {
                let _ = execute!(
                    stderr,
                    MoveToColumn(0),
                    PrintStyledContent((*frame).red().bold())
                );
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = tokio::time::sleep(FRAME_INTERVAL) => {}
                }
            }
        });
        self.running = Some((token, handle));
    }

    /// Stop drawing and wait for the last frame to be erased.
    pub async fn stop(&mut self) {
        let Some((token, handle)) = self.running.take() else {
            return;
        };
        token.cancel();
        if let Err(e) = handle.await {
            tracing::debug!("Spinner task ended abnormally: {}", e);
        }
        let _ = execute!(
            io::stderr(),
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Show
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_spinner_never_runs() {
        let mut spinner = Spinner::new(false);
        spinner.start();
        assert!(!spinner.is_running());
        spinner.stop().await;
    }

    #[tokio::test]
    async fn test_start_stop() {
        let mut spinner = Spinner::new(true);
        spinner.start();
        assert!(spinner.is_running());
        spinner.stop().await;
        assert!(!spinner.is_running());
        spinner.stop().await;
    }
}
