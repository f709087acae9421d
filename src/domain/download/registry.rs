use super::task::{BuildTask, DownloadInfo, TaskSnapshot, TaskState};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{AbortHandle, JoinHandle};

struct Entry {
    task: Arc<BuildTask>,
    abort: Option<AbortHandle>,
}

/// Build tasks keyed by request fingerprint.
///
/// At most one task per fingerprint is active. Finished tasks stay
/// registered so later callers can reuse the result until its file
/// disappears, the task failed, or the reaper expires it.
#[derive(Default)]
pub struct TaskRegistry {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &str) -> Option<Arc<BuildTask>> {
        self.entries
            .lock()
            .get(fingerprint)
            .map(|entry| entry.task.clone())
    }

    pub fn poll(&self, fingerprint: &str) -> Option<TaskSnapshot> {
        self.get(fingerprint).map(|task| task.snapshot())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Return the task for `fingerprint`, starting `build` in the background
    /// when there is none to reuse. Never waits for the build.
    pub async fn get_or_start<F, Fut, E>(
        &self,
        fingerprint: &str,
        name: &str,
        build: F,
    ) -> Arc<BuildTask>
    where
        F: FnOnce(Arc<BuildTask>) -> Fut,
        Fut: Future<Output = Result<DownloadInfo, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        if let Some(existing) = self.get(fingerprint) {
            if self.is_reusable(&existing).await {
                return existing;
            }
            self.evict(fingerprint, &existing);
        }

        let (task, created) = {
            let mut entries = self.entries.lock();
            match entries.get(fingerprint) {
                Some(entry) => (entry.task.clone(), false),
                None => {
                    let task = Arc::new(BuildTask::new(name, fingerprint));
                    entries.insert(
                        fingerprint.to_string(),
                        Entry {
                            task: task.clone(),
                            abort: None,
                        },
                    );
                    (task, true)
                }
            }
        };

        if created {
            tracing::info!(fingerprint = %fingerprint, name = %name, "Build started");
            let worker = tokio::spawn(build(task.clone()));
            if let Some(entry) = self.entries.lock().get_mut(fingerprint) {
                if Arc::ptr_eq(&entry.task, &task) {
                    entry.abort = Some(worker.abort_handle());
                }
            }
            tokio::spawn(Self::supervise(task.clone(), worker));
        }
        task
    }

    async fn supervise<E: Display>(
        task: Arc<BuildTask>,
        worker: JoinHandle<Result<DownloadInfo, E>>,
    ) {
        let fingerprint = task.fingerprint().to_string();
        match worker.await {
            Ok(Ok(download)) => {
                tracing::info!(
                    fingerprint = %fingerprint,
                    guid = %download.guid,
                    filename = %download.filename,
                    duration_secs = download.stats.duration,
                    "Build finished"
                );
                task.complete(download);
            }
            Ok(Err(e)) => {
                tracing::warn!(fingerprint = %fingerprint, error = %e, "Build failed");
                task.fail(e.to_string(), format!("{} failed", task.name()));
            }
            Err(e) if e.is_cancelled() => {
                task.fail("build cancelled", format!("{} was abandoned", task.name()));
            }
            Err(e) => {
                tracing::error!(fingerprint = %fingerprint, error = %e, "Build panicked");
                task.fail(e.to_string(), format!("{} failed", task.name()));
            }
        }
    }

    /// Active tasks are shared. Done tasks are shared while their file
    /// exists. Failed tasks are always restarted.
    async fn is_reusable(&self, task: &BuildTask) -> bool {
        match task.state() {
            TaskState::Active => true,
            TaskState::Done(download) => {
                let exists = tokio::fs::try_exists(&download.filepath)
                    .await
                    .unwrap_or(false);
                if !exists {
                    tracing::info!(
                        fingerprint = %task.fingerprint(),
                        filepath = %download.filepath.display(),
                        "Stale build evicted"
                    );
                }
                exists
            }
            TaskState::Failed { .. } => {
                tracing::info!(fingerprint = %task.fingerprint(), "Failed build evicted");
                false
            }
        }
    }

    /// Remove the entry only if it still holds `task`
    fn evict(&self, fingerprint: &str, task: &Arc<BuildTask>) {
        let mut entries = self.entries.lock();
        if entries
            .get(fingerprint)
            .is_some_and(|entry| Arc::ptr_eq(&entry.task, task))
        {
            entries.remove(fingerprint);
        }
    }

    /// Drop tasks idle longer than `max_idle`. Active ones are cancelled and
    /// failed, finished ones are forgotten while their audio stays cached.
    /// Returns the number of removed tasks.
    pub fn reap_abandoned(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let mut reaped = Vec::new();
        let mut expired = 0;
        self.entries.lock().retain(|fingerprint, entry| {
            if now - entry.task.last_active() <= max_idle {
                return true;
            }
            if entry.task.is_active() {
                if let Some(abort) = entry.abort.take() {
                    abort.abort();
                }
                reaped.push((fingerprint.clone(), entry.task.clone()));
            } else {
                expired += 1;
            }
            false
        });

        for (fingerprint, task) in &reaped {
            task.fail("build abandoned", format!("{} was abandoned", task.name()));
            tracing::warn!(
                fingerprint = %fingerprint,
                actions_done = task.actions_done(),
                actions_total = task.actions_total(),
                "Abandoned build reaped"
            );
        }
        if expired > 0 {
            tracing::debug!(expired, "Finished builds expired");
        }
        reaped.len() + expired
    }

    /// Periodically reap abandoned tasks
    pub fn spawn_reaper(self: &Arc<Self>, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.reap_abandoned(max_idle);
            }
        })
    }
}
