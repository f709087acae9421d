pub mod args;
pub mod error;
pub mod registry;
pub mod service;
pub mod task;

pub use args::{AudioSuffix, DownloadArgs, DownloadDefaults, DownloadRequest, MAX_DURATION_SECS};
pub use error::DownloadError;
pub use registry::TaskRegistry;
pub use service::{BuildStatus, DownloadService, PlaylistDownload, TRACK_BREAK_SECS};
pub use task::{BuildTask, DownloadInfo, TaskSnapshot, TaskState};
