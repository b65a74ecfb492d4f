/// Interactive driver for the dashboard.
///
/// One thread owns the [`Dashboard`] and consumes [`Event`]s from a single
/// channel. Producers:
///
/// - a ticker thread sending [`Event::Tick`] every refresh interval,
/// - a stdin reader sending [`Event::Input`] per recognised command line,
/// - one short-lived worker per fetch, sending the result back with the
///   ticket it was issued under.
///
/// Events are handled one at a time, so navigator state is only ever touched
/// by the owning thread. Out-of-order fetch results are filtered by the
/// dashboard's ticket checks.
use std::io::{self, BufRead};
use std::ops::ControlFlow;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

use super::{Dashboard, DetailTicket, Outcome, SummaryTicket};
use crate::data::{DataSource, DetailRecord, FetchError, SummaryPoint};
use crate::render::RenderSink;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// User commands read from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Refresh,
    Quit,
}

/// Parse one input line into a command.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "n" | "next" | "]" => Some(Command::Next),
        "p" | "prev" | "previous" | "[" => Some(Command::Previous),
        "r" | "refresh" => Some(Command::Refresh),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Everything the owning thread reacts to.
#[derive(Debug)]
pub enum Event {
    Tick,
    Input(Command),
    Summary(SummaryTicket, Result<Vec<SummaryPoint>, FetchError>),
    Detail(DetailTicket, Box<Result<DetailRecord, FetchError>>),
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Channel-driven owner of a [`Dashboard`].
pub struct EventLoop<S, R> {
    dashboard: Dashboard<S, R>,
    tx: Sender<Event>,
    rx: Receiver<Event>,
    started: bool,
}

impl<S, R> EventLoop<S, R>
where
    S: DataSource + 'static,
    R: RenderSink,
{
    pub fn new(dashboard: Dashboard<S, R>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            dashboard,
            tx,
            rx,
            started: false,
        }
    }

    pub fn dashboard(&self) -> &Dashboard<S, R> {
        &self.dashboard
    }

    /// A sender for external event producers.
    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    /// Whether the startup summary has come back (successfully or not).
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run until the user quits.
    ///
    /// Spawns the ticker and the stdin reader, kicks off the startup summary
    /// fetch, then handles events until [`Command::Quit`].
    pub fn run(mut self, interval: Duration) -> Result<()> {
        spawn_ticker(self.sender(), interval)?;
        spawn_input_reader(self.sender())?;

        self.start();
        while let Ok(event) = self.rx.recv() {
            if self.handle(event).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Draw the empty controls and request the first summary.
    ///
    /// No detail is requested until that summary is handled.
    pub fn start(&mut self) {
        self.dashboard.render_controls();
        self.dashboard.flush();
        self.request_summary();
    }

    /// Wait up to `timeout` for one event and handle it.
    ///
    /// Returns `None` when nothing arrived in time.
    pub fn process_next(&mut self, timeout: Duration) -> Option<ControlFlow<()>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(self.handle(event)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Handle a single event.
    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Tick | Event::Input(Command::Refresh) => self.request_summary(),
            Event::Input(Command::Next) => {
                if let Some(ticket) = self.dashboard.select_next() {
                    self.request_detail(ticket);
                }
            }
            Event::Input(Command::Previous) => {
                if let Some(ticket) = self.dashboard.select_previous() {
                    self.request_detail(ticket);
                }
            }
            Event::Input(Command::Quit) => return ControlFlow::Break(()),
            Event::Summary(ticket, result) => self.on_summary(ticket, result),
            Event::Detail(ticket, result) => {
                self.dashboard.apply_detail(ticket, *result);
            }
        }
        self.dashboard.flush();
        ControlFlow::Continue(())
    }

    fn on_summary(&mut self, ticket: SummaryTicket, result: Result<Vec<SummaryPoint>, FetchError>) {
        let outcome = self.dashboard.apply_summary(ticket, result);
        if outcome.outcome == Outcome::Stale {
            return;
        }

        let first = !self.started;
        self.started = true;

        let nav = *self.dashboard.navigator();
        if (first && nav.has_selection()) || self.dashboard.wants_reload(&outcome) {
            let ticket = self.dashboard.begin_detail(nav.index());
            self.request_detail(ticket);
        }
    }

    fn request_summary(&mut self) {
        let ticket = self.dashboard.begin_summary();
        let source = self.dashboard.source();
        let tx = self.tx.clone();
        spawn_fetch("thermoview-summary", move || {
            let result = source.fetch_summary();
            let _ = tx.send(Event::Summary(ticket, result));
        });
    }

    fn request_detail(&mut self, ticket: DetailTicket) {
        let source = self.dashboard.source();
        let tx = self.tx.clone();
        spawn_fetch("thermoview-detail", move || {
            let result = source.fetch_detail(ticket.index());
            let _ = tx.send(Event::Detail(ticket, Box::new(result)));
        });
    }
}

// ---------------------------------------------------------------------------
// Producer threads
// ---------------------------------------------------------------------------

/// Run a fetch on its own thread. A failed spawn is logged; the next tick or
/// user action retries.
fn spawn_fetch(name: &str, job: impl FnOnce() + Send + 'static) {
    if let Err(e) = thread::Builder::new().name(name.to_string()).spawn(job) {
        tracing::warn!(error = %e, "failed to spawn fetch thread");
    }
}

/// Send a tick every `interval` until the receiver goes away.
fn spawn_ticker(tx: Sender<Event>, interval: Duration) -> Result<()> {
    thread::Builder::new()
        .name("thermoview-ticker".into())
        .spawn(move || {
            loop {
                thread::sleep(interval);
                if tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        })
        .context("failed to spawn ticker thread")?;
    Ok(())
}

/// Forward recognised stdin commands. End of input only stops the reader;
/// the dashboard keeps refreshing.
fn spawn_input_reader(tx: Sender<Event>) -> Result<()> {
    thread::Builder::new()
        .name("thermoview-input".into())
        .spawn(move || {
            for line in io::stdin().lock().lines().map_while(Result::ok) {
                match parse_command(&line) {
                    Some(command) => {
                        if tx.send(Event::Input(command)).is_err() {
                            break;
                        }
                    }
                    None => tracing::debug!(input = %line.trim(), "ignoring unknown command"),
                }
            }
            tracing::debug!("stdin closed, keyboard navigation disabled");
        })
        .context("failed to spawn input thread")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_accepts_aliases() {
        assert_eq!(parse_command("n"), Some(Command::Next));
        assert_eq!(parse_command("  NEXT \n"), Some(Command::Next));
        assert_eq!(parse_command("]"), Some(Command::Next));
        assert_eq!(parse_command("p"), Some(Command::Previous));
        assert_eq!(parse_command("prev"), Some(Command::Previous));
        assert_eq!(parse_command("r"), Some(Command::Refresh));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
    }

    #[test]
    fn parse_command_rejects_unknown() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("jump 3"), None);
    }
}
