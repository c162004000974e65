//! Background prediction runs
//!
//! Wraps the predict pass in a worker thread so a caller (UI, service)
//! can keep control while the run executes and abort it cooperatively.
//! The loaded predictor is moved into the thread and handed back together
//! with the run's outcome, so output writing stays with the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};

use crate::error::{PredictError, Result};
use crate::graph::embed::EmbeddingSearch;
use crate::predict::engine::{PredictStats, Predictor};

/// Handle of a prediction run executing on a worker thread.
pub struct PredictHandle {
    stop: Arc<AtomicBool>,
    done: Receiver<(Predictor, Result<PredictStats>)>,
    thread: Option<JoinHandle<()>>,
}

impl PredictHandle {
    /// Ask the run to stop.
    ///
    /// Advisory: takes effect at the next rule and target graph pairing,
    /// the embeddings of the current pairing are still processed.
    pub fn abort(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether the run has already produced its result.
    pub fn is_finished(&self) -> bool {
        !self.done.is_empty()
    }

    /// Wait for the run to end and get the predictor back.
    ///
    /// An aborted run still returns `Ok`, with `aborted` set in the
    /// stats; `WorkerLost` means the worker died without reporting.
    pub fn wait(mut self) -> Result<(Predictor, PredictStats)> {
        let out = self.done.recv();
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
        match out {
            Ok((predictor, result)) => result.map(|stats| (predictor, stats)),
            Err(_) => Err(PredictError::WorkerLost),
        }
    }
}

/// Start `predictor.predict(search)` on a worker thread.
///
/// The predictor must be fully loaded; load errors are not deferred to
/// the worker.
pub fn spawn<S>(predictor: Predictor, mut search: S) -> PredictHandle
where
    S: EmbeddingSearch + Send + 'static,
{
    let stop = predictor.stop_flag();
    let (tx, rx) = bounded(1);
    let thread = thread::spawn(move || {
        let mut predictor = predictor;
        let result = predictor.predict(&mut search);
        let _ = tx.send((predictor, result));
    });
    PredictHandle {
        stop,
        done: rx,
        thread: Some(thread),
    }
}
