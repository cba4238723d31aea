//! Background recomputation of matches for many users.
//!
//! A batch is registered as a job, acknowledged immediately with its size, and drained by a fixed
//! pool of worker tasks. One user's failure is recorded on the job and never stops the others.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use super::domain::UserId;
use super::repository::{DirectoryError, MatchRepository, MatchingDirectory};
use super::service::MatchingService;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchJobId(pub String);

impl fmt::Display for BatchJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

static BATCH_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_batch_id() -> BatchJobId {
    let id = BATCH_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    BatchJobId(format!("batch-{id:06}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchJobStatus {
    Queued,
    Running,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub user_id: UserId,
    pub error: String,
}

/// Point-in-time view of a batch job. `processed` counts users whose matches were stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJobSnapshot {
    pub job_id: BatchJobId,
    pub status: BatchJobStatus,
    pub total_users: usize,
    pub processed: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchJobSnapshot {
    fn queued(job_id: BatchJobId, total_users: usize) -> Self {
        Self {
            job_id,
            status: BatchJobStatus::Queued,
            total_users,
            processed: 0,
            failed: 0,
            failures: Vec::new(),
            queued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == BatchJobStatus::Completed
    }
}

/// Immediate acknowledgement returned when a batch is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTicket {
    pub job_id: BatchJobId,
    pub total_users: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("unable to enumerate users for batch matching: {0}")]
    Enumerate(#[from] DirectoryError),
    #[error("batch matching requires a running tokio runtime")]
    NoRuntime,
}

type JobTable = HashMap<BatchJobId, Arc<watch::Sender<BatchJobSnapshot>>>;

/// Finished jobs kept for polling before the oldest are dropped.
pub const DEFAULT_RETAINED_JOBS: usize = 64;

/// Schedules batch recomputes onto a bounded worker pool and tracks their progress.
pub struct BatchCoordinator<D, R> {
    service: Arc<MatchingService<D, R>>,
    workers: usize,
    retained: usize,
    jobs: Arc<Mutex<JobTable>>,
}

impl<D, R> Clone for BatchCoordinator<D, R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            workers: self.workers,
            retained: self.retained,
            jobs: Arc::clone(&self.jobs),
        }
    }
}

impl<D, R> BatchCoordinator<D, R>
where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    pub fn new(service: Arc<MatchingService<D, R>>, workers: usize) -> Self {
        Self {
            service,
            workers: workers.max(1),
            retained: DEFAULT_RETAINED_JOBS,
            jobs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Keep at most `retained` finished jobs; running jobs are never dropped.
    pub fn with_retention(mut self, retained: usize) -> Self {
        self.retained = retained;
        self
    }

    /// Accept a batch and return before any user is processed.
    ///
    /// `None` or an empty list means every user known to the directory.
    pub fn start(&self, user_ids: Option<Vec<UserId>>) -> Result<BatchTicket, BatchError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| BatchError::NoRuntime)?;

        let user_ids = match user_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => self.service.directory().user_ids()?,
        };

        let job_id = next_batch_id();
        let total_users = user_ids.len();
        let (sender, _) = watch::channel(BatchJobSnapshot::queued(job_id.clone(), total_users));
        let sender = Arc::new(sender);

        {
            let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
            prune_finished(&mut jobs, self.retained);
            jobs.insert(job_id.clone(), Arc::clone(&sender));
        }

        info!(job = %job_id, total_users, "batch matching queued");
        runtime.spawn(run_batch(
            Arc::clone(&self.service),
            self.workers,
            user_ids,
            sender,
        ));

        Ok(BatchTicket {
            job_id,
            total_users,
        })
    }

    pub fn status(&self, job_id: &BatchJobId) -> Option<BatchJobSnapshot> {
        self.job(job_id).map(|sender| sender.borrow().clone())
    }

    /// Resolve once the job has completed; `None` for unknown jobs.
    pub async fn wait(&self, job_id: &BatchJobId) -> Option<BatchJobSnapshot> {
        let sender = self.job(job_id)?;
        let mut receiver = sender.subscribe();
        let snapshot = receiver
            .wait_for(BatchJobSnapshot::is_finished)
            .await
            .ok()
            .map(|snapshot| snapshot.clone());
        snapshot
    }

    fn job(&self, job_id: &BatchJobId) -> Option<Arc<watch::Sender<BatchJobSnapshot>>> {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .cloned()
    }
}

fn prune_finished(jobs: &mut JobTable, retained: usize) {
    let mut finished: Vec<(DateTime<Utc>, BatchJobId)> = jobs
        .values()
        .filter_map(|sender| {
            let snapshot = sender.borrow();
            let entry = match snapshot.finished_at {
                Some(finished_at) if snapshot.is_finished() => {
                    Some((finished_at, snapshot.job_id.clone()))
                }
                _ => None,
            };
            entry
        })
        .collect();

    if finished.len() <= retained {
        return;
    }

    finished.sort();
    let excess = finished.len() - retained;
    for (_, job_id) in finished.into_iter().take(excess) {
        jobs.remove(&job_id);
    }
}

async fn run_batch<D, R>(
    service: Arc<MatchingService<D, R>>,
    workers: usize,
    user_ids: Vec<UserId>,
    job: Arc<watch::Sender<BatchJobSnapshot>>,
) where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    let job_id = job.borrow().job_id.clone();
    let total = user_ids.len();
    job.send_modify(|snapshot| {
        snapshot.status = BatchJobStatus::Running;
        snapshot.started_at = Some(Utc::now());
    });

    let (queue_tx, queue_rx) = mpsc::channel::<UserId>(total.max(1));
    for user_id in user_ids {
        if queue_tx.send(user_id).await.is_err() {
            break;
        }
    }
    drop(queue_tx);

    let queue_rx = Arc::new(tokio::sync::Mutex::new(queue_rx));
    let worker_count = workers.min(total).max(1);
    let mut handles = Vec::with_capacity(worker_count);
    for worker in 0..worker_count {
        handles.push(tokio::spawn(worker_task(
            worker,
            Arc::clone(&service),
            Arc::clone(&queue_rx),
            Arc::clone(&job),
        )));
    }

    for handle in handles {
        if let Err(err) = handle.await {
            error!(job = %job_id, error = %err, "batch worker stopped unexpectedly");
        }
    }

    job.send_modify(|snapshot| {
        snapshot.status = BatchJobStatus::Completed;
        snapshot.finished_at = Some(Utc::now());
    });

    let snapshot = job.borrow().clone();
    info!(
        job = %job_id,
        processed = snapshot.processed,
        failed = snapshot.failed,
        total = snapshot.total_users,
        "batch matching finished"
    );
}

async fn worker_task<D, R>(
    worker: usize,
    service: Arc<MatchingService<D, R>>,
    queue: Arc<tokio::sync::Mutex<mpsc::Receiver<UserId>>>,
    job: Arc<watch::Sender<BatchJobSnapshot>>,
) where
    D: MatchingDirectory + 'static,
    R: MatchRepository + 'static,
{
    loop {
        let next = queue.lock().await.recv().await;
        let Some(user_id) = next else {
            return;
        };

        let calculation = {
            let service = Arc::clone(&service);
            let user_id = user_id.clone();
            tokio::task::spawn_blocking(move || service.calculate_matching(&user_id)).await
        };

        let failure = match calculation {
            Ok(Ok(_)) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(join_err) => Some(format!("matching task aborted: {join_err}")),
        };

        match failure {
            None => job.send_modify(|snapshot| snapshot.processed += 1),
            Some(message) => {
                warn!(worker, user = %user_id, error = %message, "batch matching failed for user");
                job.send_modify(|snapshot| {
                    snapshot.failed += 1;
                    snapshot.failures.push(BatchFailure {
                        user_id,
                        error: message,
                    });
                });
            }
        }
    }
}
