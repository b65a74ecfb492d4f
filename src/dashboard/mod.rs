/// Refresh orchestration for the dashboard.
///
/// [`Dashboard`] owns the [`Navigator`], a shared [`DataSource`] and a
/// [`RenderSink`], and keeps them consistent:
///
/// - **Summary refresh**: fetch the summary list, feed its length to
///   [`Navigator::set_total`], redraw controls and the time-series chart.
/// - **Detail load**: fetch the record at an index and redraw the five
///   detail views plus filename and stats.
/// - **Navigation**: move the cursor, redraw controls, load the new detail.
///
/// Every operation exists in two shapes. The synchronous one (`refresh_summary`,
/// `load_detail`, `on_next`, ...) fetches inline. The split one (`begin_*` /
/// `apply_*`, `select_*`) hands out a ticket so the fetch can run elsewhere;
/// the result is applied only if its ticket is still current, which is how
/// late responses for an abandoned selection get dropped. See
/// [`event_loop`] for the threaded driver.
///
/// Failures never propagate: they are logged and the previous rendering
/// stays on screen. The next tick or the next user action is the recovery.
pub mod event_loop;

use std::sync::Arc;

use crate::config::schema::{RefreshConfig, RenderConfig};
use crate::data::{DataSource, DetailRecord, FetchError, SummaryPoint};
use crate::navigator::Navigator;
use crate::render::{self, RenderSink, TextTarget, views};

// ---------------------------------------------------------------------------
// Tickets and outcomes
// ---------------------------------------------------------------------------

/// Handle for an in-flight summary fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryTicket {
    seq: u64,
}

/// Handle for an in-flight detail fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTicket {
    index: usize,
    seq: u64,
}

impl DetailTicket {
    /// The dataset index this fetch is for.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// What happened to a fetch result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The result was rendered.
    Applied,
    /// A newer request superseded this one; the result was dropped.
    Stale,
    /// The fetch failed; the previous rendering was kept.
    Failed,
}

/// Result of applying a summary response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOutcome {
    pub outcome: Outcome,
    /// The new total forced the selected index down.
    pub clamped: bool,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The dashboard controller.
pub struct Dashboard<S, R> {
    source: Arc<S>,
    sink: R,
    nav: Navigator,
    render: RenderConfig,
    reload_on_clamp: bool,
    summary_issued: u64,
    summary_applied: u64,
    detail_issued: u64,
    shown_index: Option<usize>,
}

impl<S: DataSource, R: RenderSink> Dashboard<S, R> {
    pub fn new(source: Arc<S>, sink: R, render: RenderConfig, refresh: &RefreshConfig) -> Self {
        Self {
            source,
            sink,
            nav: Navigator::new(),
            render,
            reload_on_clamp: refresh.reload_on_clamp,
            summary_issued: 0,
            summary_applied: 0,
            detail_issued: 0,
            shown_index: None,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn sink(&self) -> &R {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut R {
        &mut self.sink
    }

    /// Shared handle to the data source, for fetches on other threads.
    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    /// Index whose detail views are currently on screen, if any.
    pub fn shown_index(&self) -> Option<usize> {
        self.shown_index
    }

    pub fn into_sink(self) -> R {
        self.sink
    }

    // -- Synchronous operations --

    /// Startup sequence: controls, then summary, then (if any dataset
    /// exists) the detail of the selected index.
    pub fn start(&mut self) {
        self.render_controls();
        self.refresh_summary_inner();
        if self.nav.has_selection() {
            self.load_detail_inner(self.nav.index());
        }
        self.sink.flush();
    }

    /// Fetch and apply the summary list.
    pub fn refresh_summary(&mut self) -> SummaryOutcome {
        let outcome = self.refresh_summary_inner();
        self.sink.flush();
        outcome
    }

    /// Fetch and render the detail record at `index`.
    pub fn load_detail(&mut self, index: usize) -> Outcome {
        let outcome = self.load_detail_inner(index);
        self.sink.flush();
        outcome
    }

    /// Move forward one dataset and load it. `false` at the last dataset.
    pub fn on_next(&mut self) -> bool {
        let ticket = self.select_next();
        self.fetch_selected(ticket)
    }

    /// Move back one dataset and load it. `false` at the first dataset.
    pub fn on_previous(&mut self) -> bool {
        let ticket = self.select_previous();
        self.fetch_selected(ticket)
    }

    /// Jump to `index` (clamped into range) and load it.
    pub fn on_select(&mut self, index: usize) -> bool {
        let ticket = self.select_index(index);
        self.fetch_selected(ticket)
    }

    fn fetch_selected(&mut self, ticket: Option<DetailTicket>) -> bool {
        let Some(ticket) = ticket else {
            return false;
        };
        let result = self.source.fetch_detail(ticket.index);
        self.apply_detail(ticket, result);
        self.sink.flush();
        true
    }

    fn refresh_summary_inner(&mut self) -> SummaryOutcome {
        let ticket = self.begin_summary();
        let result = self.source.fetch_summary();
        let outcome = self.apply_summary(ticket, result);
        if self.wants_reload(&outcome) {
            self.load_detail_inner(self.nav.index());
        }
        outcome
    }

    fn load_detail_inner(&mut self, index: usize) -> Outcome {
        let ticket = self.begin_detail(index);
        let result = self.source.fetch_detail(index);
        self.apply_detail(ticket, result)
    }

    // -- Split-phase operations --

    /// Redraw the counter and button enablement.
    pub fn render_controls(&mut self) {
        let state = self.nav.control_state();
        self.sink.set_controls(&state);
        self.sink.set_text(TextTarget::Counter, &state.label);
    }

    /// Push pending sink updates to the screen.
    pub fn flush(&mut self) {
        self.sink.flush();
    }

    /// Issue a summary request.
    pub fn begin_summary(&mut self) -> SummaryTicket {
        self.summary_issued += 1;
        SummaryTicket {
            seq: self.summary_issued,
        }
    }

    /// Apply a summary response.
    ///
    /// Responses older than the last applied one are dropped. On success the
    /// navigator total is overwritten and controls plus the time series are
    /// redrawn. A clamp does not reload the detail view by itself; see
    /// [`wants_reload`](Self::wants_reload).
    pub fn apply_summary(
        &mut self,
        ticket: SummaryTicket,
        result: Result<Vec<SummaryPoint>, FetchError>,
    ) -> SummaryOutcome {
        if ticket.seq <= self.summary_applied {
            tracing::debug!(seq = ticket.seq, "dropping out-of-order summary response");
            return SummaryOutcome {
                outcome: Outcome::Stale,
                clamped: false,
            };
        }

        let points = match result {
            Ok(points) => points,
            Err(e) => {
                tracing::warn!(error = %e, "summary refresh failed");
                return SummaryOutcome {
                    outcome: Outcome::Failed,
                    clamped: false,
                };
            }
        };

        self.summary_applied = ticket.seq;
        let previous = self.nav.index();
        let clamped = self.nav.set_total(points.len());
        if clamped {
            tracing::info!(
                from = previous,
                to = self.nav.index(),
                total = points.len(),
                "dataset count shrank, selection clamped"
            );
        }

        self.render_controls();
        self.sink
            .plot(render::ElementId::Timeseries, &views::timeseries(&points, &self.render));
        tracing::debug!(total = points.len(), "summary applied");

        SummaryOutcome {
            outcome: Outcome::Applied,
            clamped,
        }
    }

    /// Whether a summary outcome should be followed by a detail reload.
    ///
    /// Only when the selection was clamped, `refresh.reload_on_clamp` is on,
    /// and there is still something to select.
    pub fn wants_reload(&self, outcome: &SummaryOutcome) -> bool {
        self.reload_on_clamp
            && outcome.outcome == Outcome::Applied
            && outcome.clamped
            && self.nav.has_selection()
    }

    /// Issue a detail request for `index`. Supersedes every earlier one.
    pub fn begin_detail(&mut self, index: usize) -> DetailTicket {
        self.detail_issued += 1;
        tracing::debug!(index, seq = self.detail_issued, "requesting detail");
        DetailTicket {
            index,
            seq: self.detail_issued,
        }
    }

    /// Apply a detail response.
    ///
    /// Rendered only if the ticket is the newest detail request and its index
    /// is still the selected one.
    pub fn apply_detail(
        &mut self,
        ticket: DetailTicket,
        result: Result<DetailRecord, FetchError>,
    ) -> Outcome {
        if ticket.seq != self.detail_issued || ticket.index != self.nav.index() {
            tracing::debug!(
                index = ticket.index,
                selected = self.nav.index(),
                "dropping stale detail response"
            );
            return Outcome::Stale;
        }

        match result {
            Ok(detail) => {
                self.render_detail(&detail);
                self.shown_index = Some(ticket.index);
                tracing::debug!(index = ticket.index, file = %detail.filename, "detail applied");
                Outcome::Applied
            }
            Err(e) => {
                tracing::warn!(index = ticket.index, error = %e, "detail load failed");
                Outcome::Failed
            }
        }
    }

    /// Step forward. On success redraws controls and returns the detail
    /// request to fetch.
    pub fn select_next(&mut self) -> Option<DetailTicket> {
        if !self.nav.next() {
            return None;
        }
        self.render_controls();
        Some(self.begin_detail(self.nav.index()))
    }

    /// Step back. On success redraws controls and returns the detail
    /// request to fetch.
    pub fn select_previous(&mut self) -> Option<DetailTicket> {
        if !self.nav.previous() {
            return None;
        }
        self.render_controls();
        Some(self.begin_detail(self.nav.index()))
    }

    /// Jump to `index`. On a change redraws controls and returns the detail
    /// request to fetch.
    pub fn select_index(&mut self, index: usize) -> Option<DetailTicket> {
        if !self.nav.select(index) {
            return None;
        }
        self.render_controls();
        Some(self.begin_detail(self.nav.index()))
    }

    fn render_detail(&mut self, detail: &DetailRecord) {
        for (element, chart) in views::detail_views(detail, &self.render) {
            self.sink.plot(element, &chart);
        }

        let stats = &detail.stats;
        self.sink.set_text(TextTarget::Filename, &detail.filename);
        self.sink.set_text(TextTarget::StatMin, &render::format_stat(stats.min));
        self.sink.set_text(TextTarget::StatMax, &render::format_stat(stats.max));
        self.sink.set_text(TextTarget::StatAvg, &render::format_stat(stats.avg));
        for (target, coords) in [
            (TextTarget::HotSpot, stats.hot_spot_coords),
            (TextTarget::ColdSpot, stats.cold_spot_coords),
        ] {
            match coords {
                Some([row, col]) => self.sink.set_text(target, &format!("{row}, {col}")),
                None => self.sink.clear_text(target),
            }
        }
    }
}
