use crate::domain::playlist::PlaylistStats;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Result of a finished build
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadInfo {
    #[serde(skip)]
    pub filepath: PathBuf,
    pub filename: String,
    pub guid: String,
    pub stats: PlaylistStats,
    pub build_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskState {
    Active,
    Done(DownloadInfo),
    Failed { error: String, summary: String },
}

/// Progress and outcome of one build, shared between the worker and pollers
#[derive(Debug)]
pub struct BuildTask {
    name: String,
    fingerprint: String,
    actions_done: AtomicUsize,
    actions_total: AtomicUsize,
    started: DateTime<Utc>,
    last_active: Mutex<DateTime<Utc>>,
    state: Mutex<TaskState>,
    finished: Notify,
}

/// Point-in-time view of a task for callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSnapshot {
    pub name: String,
    pub fingerprint: String,
    pub actions_done: usize,
    pub actions_total: usize,
    pub started: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub ms_active: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BuildTask {
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            fingerprint: fingerprint.into(),
            actions_done: AtomicUsize::new(0),
            actions_total: AtomicUsize::new(0),
            started: now,
            last_active: Mutex::new(now),
            state: Mutex::new(TaskState::Active),
            finished: Notify::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn add_actions(&self, count: usize) {
        self.actions_total.fetch_add(count, Ordering::SeqCst);
        self.touch();
    }

    pub fn action_done(&self) {
        self.actions_done.fetch_add(1, Ordering::SeqCst);
        self.touch();
    }

    pub fn actions_done(&self) -> usize {
        self.actions_done.load(Ordering::SeqCst)
    }

    pub fn actions_total(&self) -> usize {
        self.actions_total.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        *self.last_active.lock() = Utc::now();
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        *self.last_active.lock()
    }

    pub fn state(&self) -> TaskState {
        self.state.lock().clone()
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.state.lock(), TaskState::Active)
    }

    pub fn download(&self) -> Option<DownloadInfo> {
        match &*self.state.lock() {
            TaskState::Done(download) => Some(download.clone()),
            _ => None,
        }
    }

    /// Terminal transitions only apply to an active task
    pub fn complete(&self, download: DownloadInfo) {
        self.finish(TaskState::Done(download));
    }

    pub fn fail(&self, error: impl Into<String>, summary: impl Into<String>) {
        self.finish(TaskState::Failed {
            error: error.into(),
            summary: summary.into(),
        });
    }

    fn finish(&self, terminal: TaskState) {
        let mut state = self.state.lock();
        let changed = matches!(*state, TaskState::Active);
        if changed {
            *state = terminal;
        }
        drop(state);
        self.touch();
        if changed {
            self.finished.notify_waiters();
        }
    }

    /// Wait until the task leaves the active state. A failed task yields
    /// its error message.
    pub async fn outcome(&self) -> Result<DownloadInfo, String> {
        loop {
            let notified = self.finished.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            match self.state() {
                TaskState::Active => notified.await,
                TaskState::Done(download) => return Ok(download),
                TaskState::Failed { error, .. } => return Err(error),
            }
        }
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let state = self.state();
        let last_active = self.last_active();
        let (summary, error) = match &state {
            TaskState::Active => (None, None),
            TaskState::Done(download) => (
                Some(format!("{} ({}s)", download.filename, download.stats.duration)),
                None,
            ),
            TaskState::Failed { error, summary } => (Some(summary.clone()), Some(error.clone())),
        };

        TaskSnapshot {
            name: self.name.clone(),
            fingerprint: self.fingerprint.clone(),
            actions_done: self.actions_done(),
            actions_total: self.actions_total(),
            started: self.started,
            last_active,
            ms_active: (last_active - self.started).num_milliseconds(),
            is_active: matches!(state, TaskState::Active),
            summary,
            error,
        }
    }
}
