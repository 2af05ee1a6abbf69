// src/debounce.rs

//! Quiet-period debouncing for live-typed search.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;

use crate::catalog::Catalog;
use crate::location::LocationFix;
use crate::search::{search_typed, RankedResult, TypeFilter};

/// Delivers only the last value pushed before a quiet period of `window`.
///
/// Every push rearms the timer; the handler runs once per settled value.
/// Dropping the debouncer cancels any pending timer, so nothing fires after
/// teardown.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce task on the current Tokio runtime.
    pub fn spawn<F>(window: Duration, mut on_settled: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (input, mut pending) = mpsc::unbounded_channel::<T>();
        let task = tokio::spawn(async move {
            while let Some(first) = pending.recv().await {
                match settle(&mut pending, first, window).await {
                    Some(value) => on_settled(value),
                    None => return,
                }
            }
        });
        Debouncer { input, task }
    }

    /// Records a new value and restarts the quiet period.
    ///
    /// Returns false if the debouncer has already shut down.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    /// Stops the debouncer, discarding any value still waiting to settle.
    pub fn cancel(self) {
        drop(self);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Waits until `window` passes with no newer value and returns the last one.
///
/// Returns `None` if every sender is dropped first; the unsettled value is
/// discarded.
async fn settle<T>(
    pending: &mut mpsc::UnboundedReceiver<T>,
    first: T,
    window: Duration,
) -> Option<T> {
    let mut latest = first;
    loop {
        let next = tokio::select! {
            _ = time::sleep(window) => return Some(latest),
            next = pending.recv() => next,
        };
        latest = next?;
    }
}

/// A settled search and its ranked results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub filter: TypeFilter,
    /// The fix the results were ranked against.
    pub origin: Option<LocationFix>,
    pub results: Vec<RankedResult>,
}

enum Wake {
    Input(Option<SearchRequest>),
    FixChanged(bool),
}

#[derive(Debug)]
struct SearchRequest {
    query: String,
    filter: TypeFilter,
}

impl SearchRequest {
    fn run(&self, catalog: &Catalog, origin: Option<LocationFix>) -> SearchOutcome {
        SearchOutcome {
            query: self.query.clone(),
            filter: self.filter,
            origin,
            results: search_typed(catalog, &self.query, self.filter, origin.as_ref()),
        }
    }
}

/// Runs [`search_typed`] once typing has paused, and again for the last
/// settled query whenever the location session publishes a new fix.
#[derive(Debug)]
pub struct SearchDebouncer {
    input: mpsc::UnboundedSender<SearchRequest>,
    task: JoinHandle<()>,
}

impl SearchDebouncer {
    /// Spawns a debounced search over `catalog`, reporting into `outcomes`.
    ///
    /// `fixes` is usually [`LocationSession::subscribe`]; results are always
    /// ranked against its latest value.
    ///
    /// [`LocationSession::subscribe`]: crate::location::LocationSession::subscribe
    pub fn spawn(
        catalog: Arc<Catalog>,
        window: Duration,
        mut fixes: watch::Receiver<Option<LocationFix>>,
        outcomes: mpsc::UnboundedSender<SearchOutcome>,
    ) -> Self {
        let (input, mut pending) = mpsc::unbounded_channel::<SearchRequest>();
        let task = tokio::spawn(async move {
            let mut settled: Option<SearchRequest> = None;
            let mut fixes_live = true;
            loop {
                let wake = tokio::select! {
                    first = pending.recv() => Wake::Input(first),
                    changed = fixes.changed(), if fixes_live => Wake::FixChanged(changed.is_ok()),
                };
                let request = match wake {
                    Wake::Input(Some(first)) => match settle(&mut pending, first, window).await {
                        Some(request) => request,
                        None => return,
                    },
                    Wake::Input(None) => return,
                    Wake::FixChanged(true) => match settled.take() {
                        Some(request) => request,
                        None => continue,
                    },
                    // Session gone; its last fix stays readable.
                    Wake::FixChanged(false) => {
                        fixes_live = false;
                        continue;
                    }
                };

                let origin = *fixes.borrow_and_update();
                if outcomes.send(request.run(&catalog, origin)).is_err() {
                    log::debug!("Search outcome dropped: receiver closed");
                }
                settled = Some(request);
            }
        });
        SearchDebouncer { input, task }
    }

    /// Reports a keystroke.
    pub fn on_input(&self, query: impl Into<String>, filter: TypeFilter) -> bool {
        self.input
            .send(SearchRequest {
                query: query.into(),
                filter,
            })
            .is_ok()
    }

    /// Stops searching, discarding any query still waiting to settle.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
