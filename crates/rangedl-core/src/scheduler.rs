//! Bounded fan-out of part fetches over one shared destination file.
//!
//! A fixed pool of `min(capacity, parts)` worker threads pulls parts off a
//! shared queue. Each worker holds an `AdmissionGate` permit while a request
//! and its write are in flight, and reports a `PartOutcome` per part through
//! a results channel. The scheduler drains every outcome before returning.
//! A failing or panicking part never cancels its siblings.

use std::collections::VecDeque;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use crate::fetcher::{self, PartFetchError, RangeSource};
use crate::gate::AdmissionGate;
use crate::planner::PartSpec;
use crate::storage::StorageWriter;

/// Result of one part: bytes written, or why nothing was written.
#[derive(Debug)]
pub struct PartOutcome {
    pub part: PartSpec,
    pub result: Result<u64, PartFetchError>,
}

impl PartOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Fetch every part of `parts` into `storage`, at most `gate.capacity()` at a time.
///
/// Blocks until every part has reported. Outcomes come back ordered by part
/// index, one per part. No more than `gate.capacity()` worker threads exist
/// at once, whatever the part count.
pub fn run_parts(
    url: &str,
    parts: &[PartSpec],
    storage: &StorageWriter,
    gate: Arc<AdmissionGate>,
    source: Arc<dyn RangeSource>,
) -> Vec<PartOutcome> {
    if parts.is_empty() {
        return Vec::new();
    }

    let queue: Arc<Mutex<VecDeque<PartSpec>>> =
        Arc::new(Mutex::new(parts.iter().copied().collect()));
    let (tx, rx) = mpsc::channel::<PartOutcome>();
    let workers = gate.capacity().min(parts.len());
    let mut handles = Vec::with_capacity(workers);
    let mut spawn_error: Option<io::Error> = None;

    for worker in 0..workers {
        let queue = Arc::clone(&queue);
        let tx = tx.clone();
        let url = url.to_string();
        let storage = storage.clone();
        let gate = Arc::clone(&gate);
        let source = Arc::clone(&source);

        let spawned = thread::Builder::new()
            .name(format!("part-worker-{}", worker))
            .spawn(move || {
                while let Some(part) = next_part(&queue) {
                    let result = {
                        let _permit = gate.acquire();
                        tracing::debug!(part = part.index, range = %part.range_header_value(), "part admitted");
                        panic::catch_unwind(AssertUnwindSafe(|| {
                            fetcher::fetch_part(source.as_ref(), &url, &part, &storage)
                        }))
                        .unwrap_or(Err(PartFetchError::WorkerPanicked))
                    };
                    if tx.send(PartOutcome { part, result }).is_err() {
                        break;
                    }
                }
            });

        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                tracing::warn!(worker, error = %e, "could not start part worker");
                spawn_error = Some(e);
                break;
            }
        }
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(parts.len());
    // Ends once every worker has exited, dropping its sender.
    for outcome in rx.iter() {
        log_outcome(&outcome);
        outcomes.push(outcome);
    }
    for handle in handles {
        let _ = handle.join();
    }

    // Parts left queued had no worker to run them.
    let mut queue = queue.lock().unwrap_or_else(PoisonError::into_inner);
    while let Some(part) = queue.pop_front() {
        let result = match &spawn_error {
            Some(e) => Err(PartFetchError::Spawn(io::Error::new(e.kind(), e.to_string()))),
            None => Err(PartFetchError::WorkerPanicked),
        };
        let outcome = PartOutcome { part, result };
        log_outcome(&outcome);
        outcomes.push(outcome);
    }

    outcomes.sort_by_key(|o| o.part.index);
    outcomes
}

fn next_part(queue: &Mutex<VecDeque<PartSpec>>) -> Option<PartSpec> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

fn log_outcome(outcome: &PartOutcome) {
    let part = &outcome.part;
    match &outcome.result {
        Ok(bytes) => tracing::debug!(part = part.index, bytes, "part complete"),
        Err(e) => tracing::warn!(
            part = part.index,
            start = part.start,
            end = part.end,
            error = %e,
            "part failed"
        ),
    }
}
