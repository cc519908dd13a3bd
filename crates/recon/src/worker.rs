//! Background search on a dedicated thread.
//!
//! The caller keeps its own loop responsive and reads [`SearchEvent`]s off a
//! channel. The only shared state is the stop flag. Dropping the
//! [`SearchHandle`] or its receiver stops the worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::SearchParams;
use crate::engine::{CancelToken, Solver};
use crate::error::ReconError;
use crate::model::{Combination, Item, Progress, StreamSummary};

#[derive(Debug, Clone)]
pub enum SearchEvent {
    Match(Combination),
    Progress(Progress),
    /// Always the last event.
    Finished(StreamSummary),
}

pub struct SearchHandle {
    events: Receiver<SearchEvent>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
}

/// Start a streamed search over `items` on a new thread.
pub fn spawn_search(items: Vec<Item>, params: SearchParams) -> Result<SearchHandle, ReconError> {
    let cancel: CancelToken = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let token = Arc::clone(&cancel);

    let worker = thread::Builder::new()
        .name("combimatch-search".into())
        .spawn(move || {
            let abandon = Arc::clone(&token);
            let solver = Solver::new(&items, &params).with_cancel_token(token);
            let progress_tx = tx.clone();
            let mut stream = solver.stream().with_progress(move |p| {
                if progress_tx.send(SearchEvent::Progress(p)).is_err() {
                    abandon.store(true, Ordering::Relaxed);
                }
            });

            for combination in &mut stream {
                if tx.send(SearchEvent::Match(combination)).is_err() {
                    log::debug!("search receiver dropped, stopping");
                    return;
                }
            }
            let _ = tx.send(SearchEvent::Finished(stream.summary()));
        })
        .map_err(|e| ReconError::Worker(e.to_string()))?;

    Ok(SearchHandle {
        events: rx,
        cancel,
        worker: Some(worker),
    })
}

impl SearchHandle {
    /// Ask the worker to stop. It finishes the candidate in hand first.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn cancel_token(&self) -> CancelToken {
        Arc::clone(&self.cancel)
    }

    pub fn events(&self) -> &Receiver<SearchEvent> {
        &self.events
    }

    /// Blocking iterator over events; ends after `Finished`.
    pub fn iter(&self) -> impl Iterator<Item = SearchEvent> + '_ {
        self.events.iter()
    }

    /// Wait for the worker thread to exit.
    pub fn join(mut self) -> Result<(), ReconError> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| ReconError::Worker("search thread panicked".into())),
            None => Ok(()),
        }
    }
}

impl Drop for SearchHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
