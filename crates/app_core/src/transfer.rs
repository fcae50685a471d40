//! Transfer jobs with progress and cooperative cancellation
//!
//! A job is a list of `ObjectReader`s. The transfer collaborator calls
//! `read()` on each in order; `abort()` only flips a flag that `read()`
//! checks before doing any work.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Verb shown in the transfer dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Converting,
    Copying,
    Moving,
    Extracting,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Operation::Converting => "Converting",
            Operation::Copying => "Copying",
            Operation::Moving => "Moving",
            Operation::Extracting => "Extracting",
        };
        f.write_str(verb)
    }
}

type ReadTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// One item of a transfer job
#[derive(Clone)]
pub struct ObjectReader {
    pub name: String,
    pub directory: String,
    pub operation: Operation,
    aborted: Arc<AtomicBool>,
    task: ReadTask,
}

impl ObjectReader {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        directory: impl Into<String>,
        operation: Operation,
        task: F,
    ) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name: name.into(),
            directory: directory.into(),
            operation,
            aborted: Arc::new(AtomicBool::new(false)),
            task: Arc::new(move || task().boxed()),
        }
    }

    /// Run the item unless it was aborted
    pub async fn read(&self) {
        if self.is_aborted() {
            tracing::debug!(name = %self.name, "Skipping aborted transfer item");
            return;
        }
        (self.task)().await;
    }

    /// Idempotent
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ObjectReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectReader")
            .field("name", &self.name)
            .field("directory", &self.directory)
            .field("operation", &self.operation)
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// The transfer/progress dialog
pub trait TransferDialog: Send + Sync {
    /// Show the dialog for `url`; `None` readers shows it in a pending state
    fn open(&self, url: &str, operation: Operation, readers: Option<Vec<ObjectReader>>);

    /// Close the dialog for `url`, aborting whatever is still queued
    fn close(&self, url: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    Running,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProgress {
    pub operation: Operation,
    pub total: usize,
    pub completed: usize,
    pub current: Option<String>,
    pub state: TransferState,
}

impl TransferProgress {
    fn pending(operation: Operation) -> Self {
        Self {
            operation,
            total: 0,
            completed: 0,
            current: None,
            state: TransferState::Pending,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TransferState::Done | TransferState::Cancelled)
    }
}

/// Run readers one at a time, publishing progress after each.
///
/// Does nothing when the job already left the pending state, e.g. it was
/// cancelled before the runtime got to it.
pub async fn run_readers(readers: &[ObjectReader], progress: &watch::Sender<TransferProgress>) {
    let total = readers.len();
    let started = progress.send_if_modified(|p| {
        if p.state != TransferState::Pending {
            return false;
        }
        p.total = total;
        p.state = TransferState::Running;
        true
    });
    if !started {
        return;
    }

    for reader in readers {
        progress.send_modify(|p| p.current = Some(reader.name.clone()));
        reader.read().await;
        progress.send_modify(|p| p.completed += 1);
    }

    let cancelled = readers.iter().any(ObjectReader::is_aborted);
    progress.send_modify(|p| {
        p.current = None;
        p.state = if cancelled {
            TransferState::Cancelled
        } else {
            TransferState::Done
        };
    });
}

/// Handle to one transfer job
#[derive(Clone)]
pub struct TransferHandle {
    id: u64,
    readers: Arc<Mutex<Vec<ObjectReader>>>,
    progress: Arc<watch::Sender<TransferProgress>>,
}

impl TransferHandle {
    fn new(id: u64, operation: Operation) -> Self {
        Self {
            id,
            readers: Arc::new(Mutex::new(Vec::new())),
            progress: Arc::new(watch::Sender::new(TransferProgress::pending(operation))),
        }
    }

    /// Abort every reader that has not run yet.
    ///
    /// A job that never started is marked cancelled right away.
    pub fn cancel(&self) {
        for reader in self.readers.lock().iter() {
            reader.abort();
        }
        self.progress.send_if_modified(|p| {
            if p.state != TransferState::Pending {
                return false;
            }
            p.state = TransferState::Cancelled;
            true
        });
    }

    pub fn progress(&self) -> TransferProgress {
        self.progress.borrow().clone()
    }

    /// Wait until the job is done or cancelled
    pub async fn finished(&self) -> TransferProgress {
        let mut rx = self.progress.subscribe();
        // the handle owns a sender, so this only returns once finished
        let _ = rx.wait_for(TransferProgress::is_finished).await;
        let progress = rx.borrow().clone();
        progress
    }

    /// Dialog shown without any readers yet
    fn is_placeholder(&self) -> bool {
        self.readers.lock().is_empty() && self.progress.borrow().state == TransferState::Pending
    }
}

type JobMap = Arc<Mutex<HashMap<String, TransferHandle>>>;

/// Transfer dialog that runs jobs on the tokio runtime, one item at a time.
///
/// One dialog per url: opening a url again supersedes (and cancels) the job
/// shown there, unless that job is still a pending placeholder. Jobs leave
/// the table when they finish or are closed.
#[derive(Default)]
pub struct SequentialTransfer {
    jobs: JobMap,
    next_id: AtomicU64,
}

impl SequentialTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the job shown for `url`
    pub fn handle(&self, url: &str) -> Option<TransferHandle> {
        self.jobs.lock().get(url).cloned()
    }

    pub fn is_open(&self, url: &str) -> bool {
        self.jobs.lock().contains_key(url)
    }

    fn fresh_handle(&self, operation: Operation) -> TransferHandle {
        TransferHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed), operation)
    }
}

impl TransferDialog for SequentialTransfer {
    fn open(&self, url: &str, operation: Operation, readers: Option<Vec<ObjectReader>>) {
        let mut jobs = self.jobs.lock();
        let previous = jobs.remove(url);

        let Some(readers) = readers else {
            if let Some(previous) = previous {
                previous.cancel();
            }
            jobs.insert(url.to_string(), self.fresh_handle(operation));
            tracing::debug!(url, %operation, "Transfer dialog pending");
            return;
        };

        let handle = match previous {
            Some(previous) if previous.is_placeholder() => previous,
            Some(previous) => {
                previous.cancel();
                tracing::info!(url, "Transfer superseded");
                self.fresh_handle(operation)
            }
            None => self.fresh_handle(operation),
        };
        *handle.readers.lock() = readers.clone();
        jobs.insert(url.to_string(), handle.clone());
        drop(jobs);

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(url, "No async runtime for transfer: {}", e);
                self.close(url);
                return;
            }
        };

        tracing::info!(url, %operation, items = readers.len(), "Transfer started");
        let jobs = self.jobs.clone();
        let url = url.to_string();
        runtime.spawn(async move {
            run_readers(&readers, &handle.progress).await;

            let mut jobs = jobs.lock();
            if jobs.get(&url).is_some_and(|current| current.id == handle.id) {
                jobs.remove(&url);
            }
            tracing::info!(url = %url, state = ?handle.progress().state, "Transfer finished");
        });
    }

    fn close(&self, url: &str) {
        let removed = self.jobs.lock().remove(url);
        if let Some(handle) = removed {
            handle.cancel();
            tracing::debug!(url, "Transfer dialog closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_reader(name: &str, count: Arc<AtomicUsize>) -> ObjectReader {
        ObjectReader::new(name, "/dir", Operation::Converting, move || {
            let count = count.clone();
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[tokio::test]
    async fn test_abort_before_read_is_noop() {
        let count = Arc::new(AtomicUsize::new(0));
        let reader = counting_reader("a.wav", count.clone());

        reader.abort();
        reader.abort();
        reader.read().await;

        assert!(reader.is_aborted());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_readers_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let readers: Vec<_> = ["one", "two", "three"]
            .into_iter()
            .map(|name| {
                let order = order.clone();
                ObjectReader::new(name, "/dir", Operation::Converting, move || {
                    let order = order.clone();
                    async move {
                        order.lock().push(name);
                    }
                })
            })
            .collect();

        let (tx, rx) = watch::channel(TransferProgress::pending(Operation::Converting));
        run_readers(&readers, &tx).await;

        assert_eq!(*order.lock(), vec!["one", "two", "three"]);
        let progress = rx.borrow().clone();
        assert_eq!(progress.completed, 3);
        assert_eq!(progress.total, 3);
        assert_eq!(progress.state, TransferState::Done);
    }

    #[tokio::test]
    async fn test_cancelled_job_reports_cancelled() {
        let count = Arc::new(AtomicUsize::new(0));
        let readers = vec![
            counting_reader("a", count.clone()),
            counting_reader("b", count.clone()),
        ];
        readers[1].abort();

        let (tx, rx) = watch::channel(TransferProgress::pending(Operation::Converting));
        run_readers(&readers, &tx).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(rx.borrow().state, TransferState::Cancelled);
    }

    #[tokio::test]
    async fn test_sequential_transfer_runs_job() {
        let transfer = SequentialTransfer::new();
        let count = Arc::new(AtomicUsize::new(0));

        transfer.open("/dir/a.wav", Operation::Converting, None);
        assert_eq!(
            transfer.handle("/dir/a.wav").unwrap().progress().state,
            TransferState::Pending
        );

        transfer.open(
            "/dir/a.wav",
            Operation::Converting,
            Some(vec![counting_reader("a.wav", count.clone())]),
        );
        let progress = transfer.handle("/dir/a.wav").unwrap().finished().await;

        assert_eq!(progress.state, TransferState::Done);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        transfer.close("/dir/a.wav");
        assert!(!transfer.is_open("/dir/a.wav"));
    }

    #[tokio::test]
    async fn test_reopen_cancels_superseded_job() {
        let transfer = SequentialTransfer::new();
        let first_count = Arc::new(AtomicUsize::new(0));
        let second_count = Arc::new(AtomicUsize::new(0));

        transfer.open(
            "/dir/a.wav",
            Operation::Converting,
            Some(vec![counting_reader("a.wav", first_count.clone())]),
        );
        let first = transfer.handle("/dir/a.wav").unwrap();
        transfer.open(
            "/dir/a.wav",
            Operation::Converting,
            Some(vec![counting_reader("a.wav", second_count.clone())]),
        );
        let second = transfer.handle("/dir/a.wav").unwrap();
        transfer.close("/dir/a.wav");

        assert_eq!(first.finished().await.state, TransferState::Cancelled);
        assert_eq!(second.finished().await.state, TransferState::Cancelled);
        tokio::task::yield_now().await;
        assert_eq!(first_count.load(Ordering::SeqCst), 0);
        assert_eq!(second_count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_finished_job_leaves_table() {
        let transfer = SequentialTransfer::new();
        let count = Arc::new(AtomicUsize::new(0));

        transfer.open(
            "/dir/a.wav",
            Operation::Converting,
            Some(vec![counting_reader("a.wav", count.clone())]),
        );
        let handle = transfer.handle("/dir/a.wav").unwrap();
        assert!(transfer.is_open("/dir/a.wav"));

        assert_eq!(handle.finished().await.state, TransferState::Done);
        tokio::task::yield_now().await;
        assert!(!transfer.is_open("/dir/a.wav"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pending_dialog_waits_until_closed() {
        let transfer = SequentialTransfer::new();
        transfer.open("/dir/a.wav", Operation::Converting, None);
        let handle = transfer.handle("/dir/a.wav").unwrap();

        let waited = tokio::time::timeout(Duration::from_millis(20), handle.finished()).await;
        assert!(waited.is_err());

        transfer.close("/dir/a.wav");
        assert_eq!(handle.finished().await.state, TransferState::Cancelled);
    }
}
