//! Bounded AI worker pool
//!
//! Each worker owns a small request queue fed round-robin by [`IntentPool::submit`].
//! Results go into one bounded response queue. Producers on both sides use
//! `try_send`, so a full queue drops work instead of blocking; the scheduler's
//! synchronous fallback absorbs anything that goes missing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use super::intents::{IntentRequest, IntentResult, compute_intents};

/// Default bound on in-flight requests and buffered results
pub const DEFAULT_QUEUE_DEPTH: usize = 16;

/// Worker count used when the caller does not pick one
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| (n.get() / 2).clamp(1, 4))
        .unwrap_or(1)
}

pub struct IntentPool {
    senders: Vec<mpsc::SyncSender<IntentRequest>>,
    next_sender: AtomicUsize,
    rx: mpsc::Receiver<IntentResult>,
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl IntentPool {
    /// Spawn `workers` threads (at least one) sharing `queue_depth` slots
    pub fn new(workers: usize, queue_depth: usize) -> Self {
        let workers = workers.max(1);
        let queue_depth = queue_depth.max(1);
        let per_worker = queue_depth.div_ceil(workers);

        let (result_tx, result_rx) = mpsc::sync_channel(queue_depth);
        let stop = Arc::new(AtomicBool::new(false));
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for index in 0..workers {
            let (tx, rx) = mpsc::sync_channel::<IntentRequest>(per_worker);
            let result_tx = result_tx.clone();
            let stop = Arc::clone(&stop);
            let spawned = thread::Builder::new()
                .name(format!("ai-intents-{index}"))
                .spawn(move || {
                    while let Ok(req) = rx.recv() {
                        if stop.load(AtomicOrdering::Acquire) {
                            break;
                        }
                        let result = compute_intents(&req);
                        // Full response queue: drop, the scheduler recomputes
                        if let Err(mpsc::TrySendError::Disconnected(_)) = result_tx.try_send(result)
                        {
                            break;
                        }
                    }
                });
            match spawned {
                Ok(handle) => {
                    senders.push(tx);
                    handles.push(handle);
                }
                Err(err) => log::warn!("failed to spawn AI worker {index}: {err}"),
            }
        }

        log::debug!(
            "AI pool started: {} workers, queue depth {queue_depth}",
            handles.len()
        );

        Self {
            senders,
            next_sender: AtomicUsize::new(0),
            rx: result_rx,
            stop,
            handles,
        }
    }

    /// Number of live workers
    pub fn workers(&self) -> usize {
        self.handles.len()
    }

    /// Best-effort enqueue. Returns `false` when every queue is full or the
    /// pool is closed; that is not an error.
    pub fn submit(&self, req: IntentRequest) -> bool {
        if self.senders.is_empty() || self.stop.load(AtomicOrdering::Acquire) {
            return false;
        }
        let len = self.senders.len();
        let start = self.next_sender.fetch_add(1, AtomicOrdering::Relaxed) % len;
        let mut req = req;
        for offset in 0..len {
            let idx = (start + offset) % len;
            match self.senders[idx].try_send(req) {
                Ok(()) => return true,
                Err(mpsc::TrySendError::Full(returned))
                | Err(mpsc::TrySendError::Disconnected(returned)) => req = returned,
            }
        }
        log::debug!("AI request for tick {} dropped: queues full", req.tick);
        false
    }

    /// Take every result that is ready right now
    pub fn drain(&self) -> Vec<IntentResult> {
        let mut results = Vec::new();
        while let Ok(result) = self.rx.try_recv() {
            results.push(result);
        }
        results
    }

    /// Stop all workers and wait for them to exit. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.stop.store(true, AtomicOrdering::Release);
        // Dropping the senders wakes workers blocked in recv
        self.senders.clear();
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::warn!("AI worker panicked before shutdown");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for IntentPool {
    fn drop(&mut self) {
        self.close();
    }
}
