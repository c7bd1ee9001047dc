//! Concurrent scanning of many rows against one shared header tree.
//!
//! [`ScanPool`] owns a Rayon thread pool sized to the host's available parallelism (or an
//! explicit worker count). [`ScanPool::scan_rows`] submits one task per row; each task
//! decodes into its own fresh record and sends a [`RowResult`] on a channel with room for
//! every row, so no task ever blocks on send. The channel disconnects once the last task
//! has reported. Results arrive in completion order; use [`RowResult::row_index`] to
//! restore row order.

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        mpsc::{self, Receiver},
    },
    thread,
};

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{
    error::{Error, Result},
    header::HeaderTree,
    record::{Field, Record},
    scan::RowScanner,
};

#[derive(Debug)]
pub struct RowResult<R> {
    /// Position of the row in the submitted batch.
    pub row_index: usize,
    pub record: R,
    pub error: Option<Error>,
}

impl<R> RowResult<R> {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<R> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.record),
        }
    }
}

pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

pub struct ScanPool {
    pool: ThreadPool,
    workers: usize,
}

impl ScanPool {
    pub fn new(workers: Option<usize>) -> Result<Self> {
        let requested = workers.filter(|&n| n > 0).unwrap_or_else(default_worker_count);
        let build = |n: usize| {
            ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|idx| format!("sheet-scan-{idx}"))
                .build()
        };
        let (pool, workers) = match build(requested) {
            Ok(pool) => (pool, requested),
            Err(err) if requested > 1 => {
                warn!("Failed to start {requested} scan worker(s) ({err}); falling back to one");
                (build(1)?, 1)
            }
            Err(err) => return Err(err.into()),
        };
        debug!("Scan pool started with {workers} worker(s)");
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Decodes every row into a fresh `R` on the pool.
    ///
    /// A row that fails to decode reports its own error and never affects other rows. A
    /// panic raised while decoding a row is reported as [`Error::Internal`] for that row.
    pub fn scan_rows<R: Record>(
        &self,
        tree: Arc<HeaderTree>,
        rows: Vec<Vec<String>>,
    ) -> Receiver<RowResult<R>> {
        let (sender, receiver) = mpsc::sync_channel(rows.len());
        let fields: Arc<Vec<Field<R>>> = Arc::new(R::fields());
        info!(
            "Scanning {} row(s) of sheet '{}' on {} worker(s)",
            rows.len(),
            tree.sheet(),
            self.workers
        );

        for (row_index, row) in rows.into_iter().enumerate() {
            let sender = sender.clone();
            let tree = Arc::clone(&tree);
            let fields = Arc::clone(&fields);
            self.pool.spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    let scanner = RowScanner::new(&tree);
                    let mut record = R::default();
                    let error = scanner
                        .scan_fields(&fields, &row, &mut record)
                        .err()
                        .map(|err| Error::Cell(err.at_row(row_index)));
                    (record, error)
                }));
                let result = match outcome {
                    Ok((record, error)) => RowResult {
                        row_index,
                        record,
                        error,
                    },
                    Err(payload) => RowResult {
                        row_index,
                        record: R::default(),
                        error: Some(Error::Internal(panic_message(payload.as_ref()))),
                    },
                };
                // the receiver may already be gone; nothing left to report to
                let _ = sender.send(result);
            });
        }
        receiver
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "scan task panicked".to_string()
    }
}
