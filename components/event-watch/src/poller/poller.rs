// Local crates
use crate::{
    dedup::window::{DedupWindow, alert_key, call_key, message_key},
    normalizer::{
        models::{Category, LogEvent, Privacy},
        normalizer::{normalize_alert, normalize_call, normalize_message},
    },
    poller::{
        clock::Clock,
        error::WatchError,
        options::{STREAMING_DELAY, WatchOptions, streaming_lookback},
    },
    source::{
        models::FetchedEvents,
        source::{EventFilter, EventSource, SourceError},
    },
};

// External crates
use chrono::{DateTime, Utc};
use std::future::Future;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Drives polls against an [`EventSource`] and owns the dedup state between them.
///
/// ```text
/// fetch (3 sources, joined) -> dedup per category -> normalize -> merge + sort -> batch
/// ```
///
/// Polls never overlap: each one completes before the next delay starts, so the
/// [`DedupWindow`] is only ever touched from this loop.
#[derive(Debug)]
pub struct Poller<S, C> {
    source: S,
    clock: C,
    window: DedupWindow,
}

impl<S, C> Poller<S, C>
where
    S: EventSource,
    C: Clock,
{
    pub fn new(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            window: DedupWindow::new(),
        }
    }

    /// Validate `options`, then run a historical query or a streaming watch.
    ///
    /// Every non-empty batch is handed to `on_batch`. Returns when the historical query
    /// has been emitted, when `cancel` fires, or on the first fatal error.
    pub async fn run<F>(
        &mut self,
        options: &WatchOptions,
        mut on_batch: F,
        cancel: &CancellationToken,
    ) -> Result<(), WatchError>
    where
        F: FnMut(&[LogEvent]) -> io::Result<()>,
    {
        options.validate(self.clock.now())?;

        if options.streaming {
            return self.run_streaming(options, on_batch, cancel).await;
        }

        if let Some(events) = until_cancelled(cancel, self.run_historical(options)).await? {
            emit(&mut on_batch, &events)?;
        }
        Ok(())
    }

    /// One-shot query over the user's window.
    #[instrument(
        name = "event_watch_poller::historical",
        target = "poller::poller::Poller",
        skip_all,
        level = "debug"
    )]
    pub async fn run_historical(
        &mut self,
        options: &WatchOptions,
    ) -> Result<Vec<LogEvent>, WatchError> {
        let filter = historical_filter(options, self.clock.now());
        self.poll(&filter, options.privacy).await
    }

    /// Poll forever: a priming poll fills the dedup window, then every cycle fetches
    /// the last lookback window, emits what is new and sleeps.
    #[instrument(
        name = "event_watch_poller::streaming",
        target = "poller::poller::Poller",
        skip_all,
        level = "debug"
    )]
    pub async fn run_streaming<F>(
        &mut self,
        options: &WatchOptions,
        mut on_batch: F,
        cancel: &CancellationToken,
    ) -> Result<(), WatchError>
    where
        F: FnMut(&[LogEvent]) -> io::Result<()>,
    {
        let now = self.clock.now();
        let priming = EventFilter {
            start_date: options.start_date.unwrap_or(now - streaming_lookback()),
            end_date: None,
            log_level: options.log_level,
        };

        let Some(recent) = until_cancelled(cancel, self.poll(&priming, options.privacy)).await?
        else {
            return Ok(());
        };

        if options.emits_priming_batch() {
            emit(&mut on_batch, &recent)?;
        }

        loop {
            let filter = streaming_filter(options, self.clock.now());

            let Some(batch) = until_cancelled(cancel, self.poll(&filter, options.privacy)).await?
            else {
                return Ok(());
            };
            emit(&mut on_batch, &batch)?;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                _ = self.clock.sleep(STREAMING_DELAY) => {}
            }
        }
    }

    /// One dedup cycle: fetch, drop what the previous poll already returned, normalize
    /// and sort ascending by date.
    #[instrument(
        name = "event_watch_poller::poll",
        target = "poller::poller::Poller",
        skip_all,
        level = "debug"
    )]
    pub async fn poll(
        &mut self,
        filter: &EventFilter,
        privacy: Privacy,
    ) -> Result<Vec<LogEvent>, WatchError> {
        let fetched = self.fetch(filter).await?;

        tracing::debug!(
            start_date = %filter.start_date,
            end_date = ?filter.end_date,
            fetched = fetched.total(),
            "Poll fetched platform events"
        );

        let events = self.merge(fetched, filter, privacy);

        tracing::debug!(
            new_events = events.len(),
            remembered = ?Category::ALL.map(|category| self.window.remembered(category)),
            "Poll produced new events"
        );
        Ok(events)
    }

    /// Issue the three list queries concurrently with one shared filter. Any failure
    /// fails the whole fetch.
    pub async fn fetch(&self, filter: &EventFilter) -> Result<FetchedEvents, SourceError> {
        let (alerts, messages, calls) = tokio::try_join!(
            self.source.list_alerts(filter),
            self.source.list_messages(filter),
            self.source.list_calls(filter),
        )?;

        Ok(FetchedEvents {
            alerts,
            messages,
            calls,
        })
    }

    fn merge(
        &mut self,
        fetched: FetchedEvents,
        filter: &EventFilter,
        privacy: Privacy,
    ) -> Vec<LogEvent> {
        let FetchedEvents {
            mut alerts,
            messages,
            calls,
        } = fetched;

        if let Some(level) = filter.log_level {
            alerts.retain(|alert| level.matches(&alert.log_level));
        }

        let alerts = self.window.filter(Category::Debugger, alerts, alert_key);
        let messages = self.window.filter(Category::Message, messages, message_key);
        let calls = self.window.filter(Category::Call, calls, call_key);

        let mut events: Vec<LogEvent> = alerts
            .iter()
            .map(normalize_alert)
            .chain(messages.iter().map(|m| normalize_message(m, privacy)))
            .chain(calls.iter().map(|c| normalize_call(c, privacy)))
            .collect();

        // Stable, so same-instant events keep debugger, message, call order.
        events.sort_by_key(|event| event.date);
        events
    }
}

/// Window for a historical query: the user's bounds, or the lookback window ending now,
/// widened by one more lookback with `--show-recent-history`.
pub fn historical_filter(options: &WatchOptions, now: DateTime<Utc>) -> EventFilter {
    let mut start_date = options.start_date.unwrap_or(now - streaming_lookback());
    if options.show_recent_history {
        start_date -= streaming_lookback();
    }

    EventFilter {
        start_date,
        end_date: options.end_date,
        log_level: options.log_level,
    }
}

/// Window for one streaming cycle: open-ended, starting one lookback before `now`.
pub fn streaming_filter(options: &WatchOptions, now: DateTime<Utc>) -> EventFilter {
    EventFilter {
        start_date: now - streaming_lookback(),
        end_date: None,
        log_level: options.log_level,
    }
}

fn emit<F>(on_batch: &mut F, events: &[LogEvent]) -> Result<(), WatchError>
where
    F: FnMut(&[LogEvent]) -> io::Result<()>,
{
    if events.is_empty() {
        return Ok(());
    }
    on_batch(events).map_err(WatchError::Output)
}

/// Race `work` against cancellation. `Ok(None)` means cancelled; the in-flight work
/// is dropped.
async fn until_cancelled<T, Fut>(
    cancel: &CancellationToken,
    work: Fut,
) -> Result<Option<T>, WatchError>
where
    Fut: Future<Output = Result<T, WatchError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Ok(None),
        result = work => result.map(Some),
    }
}
