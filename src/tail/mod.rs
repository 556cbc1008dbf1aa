//! Continuous polling with adaptive backoff.
//!
//! A [`TailLoop`] runs poll, render, sleep until its cancellation token
//! fires. The delay doubles after every empty poll, up to [`MAX_DELAY`], and
//! drops back to [`MIN_DELAY`] as soon as anything new shows up.

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, GraytailError, Result};
use crate::query::{RequestDescriptor, RELATIVE_SEARCH};
use crate::spinner::Spinner;

/// Seconds.
pub const MIN_DELAY: f64 = 0.2;
/// Seconds.
pub const MAX_DELAY: f64 = 30.0;
pub const GROWTH_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    current: f64,
    min: f64,
    max: f64,
    factor: f64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(MIN_DELAY, MAX_DELAY, GROWTH_FACTOR)
    }
}

impl Backoff {
    pub fn new(min: f64, max: f64, factor: f64) -> Self {
        Self {
            current: min,
            min,
            max: max.max(min),
            factor,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.current
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.current)
    }

    /// Adjust after a poll that produced `new_records`; returns the new delay.
    pub fn record(&mut self, new_records: usize) -> f64 {
        self.current = if new_records > 0 {
            self.min
        } else {
            (self.current * self.factor).clamp(self.min, self.max)
        };
        self.current
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailState {
    Idle,
    Polling,
    Rendering,
    Sleeping,
    Stopped,
}

pub struct TailLoop<'a> {
    ctx: &'a mut AppContext,
    request: RequestDescriptor,
    backoff: Backoff,
    cancel: CancellationToken,
    spinner: Option<Spinner>,
    state: TailState,
    cycles: u64,
    printed: u64,
}

impl<'a> TailLoop<'a> {
    /// Tailing re-runs the same request, so it has to be a relative search.
    pub fn new(
        ctx: &'a mut AppContext,
        request: RequestDescriptor,
        cancel: CancellationToken,
    ) -> Result<Self> {
        if request.path != RELATIVE_SEARCH {
            return Err(GraytailError::InvalidArgument(
                "Tailing requires a relative time range".into(),
            ));
        }

        Ok(Self {
            ctx,
            request,
            backoff: Backoff::default(),
            cancel,
            spinner: None,
            state: TailState::Idle,
            cycles: 0,
            printed: 0,
        })
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_spinner(mut self, spinner: Spinner) -> Self {
        self.spinner = Some(spinner);
        self
    }

    pub fn state(&self) -> TailState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn printed(&self) -> u64 {
        self.printed
    }

    /// Poll until cancelled. A batch that has started printing is always
    /// printed in full; cancellation is only observed while fetching or
    /// sleeping.
    pub async fn run<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let cancel = self.cancel.clone();
        let result = self.cycle_until_cancelled(&cancel, out).await;
        self.stop_spinner().await;
        self.transition(TailState::Stopped);
        result
    }

    async fn cycle_until_cancelled<W: Write>(
        &mut self,
        cancel: &CancellationToken,
        out: &mut W,
    ) -> Result<()> {
        while !cancel.is_cancelled() {
            self.transition(TailState::Polling);
            self.start_spinner();

            let records = tokio::select! {
                _ = cancel.cancelled() => break,
                records = self.ctx.poll(&self.request) => records?,
            };
            self.cycles += 1;

            if !records.is_empty() {
                self.transition(TailState::Rendering);
                self.stop_spinner().await;
                for record in &records {
                    writeln!(out, "{}", self.ctx.render(record))?;
                }
                out.flush()?;
                self.printed += records.len() as u64;
                self.start_spinner();
            }

            self.backoff.record(records.len());

            self.transition(TailState::Sleeping);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.backoff.delay()) => {}
            }
        }
        Ok(())
    }

    fn transition(&mut self, next: TailState) {
        tracing::debug!("Tail {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn start_spinner(&mut self) {
        if let Some(spinner) = self.spinner.as_mut() {
            spinner.start();
        }
    }

    async fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.as_mut() {
            spinner.stop().await;
        }
    }
}

/// Cancel `token` on SIGINT, SIGTERM, SIGHUP or SIGQUIT (Ctrl-C elsewhere).
pub fn cancel_on_shutdown(token: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::SignalKind;

        tokio::spawn(async move {
            let mut sigint = install(SignalKind::interrupt());
            let mut sigterm = install(SignalKind::terminate());
            let mut sighup = install(SignalKind::hangup());
            let mut sigquit = install(SignalKind::quit());

            tokio::select! {
                _ = recv(&mut sigint) => {},
                _ = recv(&mut sigterm) => {},
                _ = recv(&mut sighup) => {},
                _ = recv(&mut sigquit) => {},
            }
            tracing::debug!("Shutdown signal received");
            token.cancel();
        });
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            token.cancel();
        });
    }
}

#[cfg(unix)]
fn install(kind: tokio::signal::unix::SignalKind) -> Option<tokio::signal::unix::Signal> {
    match tokio::signal::unix::signal(kind) {
        Ok(signal) => Some(signal),
        Err(e) => {
            tracing::warn!("Failed to set up signal handler: {}", e);
            None
        }
    }
}

/// Pends forever for a handler that could not be installed.
#[cfg(unix)]
async fn recv(signal: &mut Option<tokio::signal::unix::Signal>) {
    match signal {
        Some(s) => {
            s.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}
