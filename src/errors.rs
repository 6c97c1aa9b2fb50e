use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("task directory is not set")]
    DirectoryMissing,
    #[error("task document is not set")]
    DocumentMissing,
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("unable to extract state and base directory from task path")]
    PathResolution,
    #[error("{0} still contains entries not created by the task")]
    DirectoryNotEmpty(PathBuf),
    #[error("no task found with id {0}")]
    NotFound(String),
    #[error("invalid task id: {0}")]
    InvalidId(String),
    #[error("task execution failed: {0}")]
    Execution(String),
}
