use super::task::{read_task_doc, Task};
use super::task_state::TaskState;
use crate::config::Config;
use crate::constants::{DELETE_REQUESTS, TASK_JSON};
use serde_json::{Map, Value};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Converts delete request tokens into task handles targeted for removal
///
/// A token is a file in the delete request directory whose name is the id
/// of the task to remove. Each token is consumed the first time it is
/// seen, whether or not a matching task still exists anywhere.
pub struct DeleteRequestSource {
    /// Directory the delete request tokens are dropped into
    delete_req_dir: PathBuf,
    /// State directories searched for the named task, in priority order
    searchdirs: Vec<PathBuf>,
}

impl DeleteRequestSource {
    /// Creates a new source scanning under the configured task directory
    pub fn new(config: &Config) -> Self {
        Self {
            delete_req_dir: config.task_dir.join(DELETE_REQUESTS),
            searchdirs: vec![
                config.task_dir.join(TaskState::Processing.dir_name()),
                config.task_dir.join(TaskState::Submitted.dir_name()),
                config.task_dir.join(TaskState::Done.dir_name()),
            ],
        }
    }

    /// Gets the next task that should be deleted
    ///
    /// The first token file found is unlinked unconditionally before the
    /// matching task is handed back; a token naming a task that no longer
    /// exists is consumed all the same and the call returns `None`.
    pub fn next_task(&self) -> Option<Task> {
        if !self.delete_req_dir.is_dir() {
            error!("{} is not a directory", self.delete_req_dir.display());
            return None;
        }
        debug!(
            "Examining {} for delete task requests",
            self.delete_req_dir.display()
        );
        let entries = match fs::read_dir(&self.delete_req_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Unable to list {}: {}", self.delete_req_dir.display(), e);
                return None;
            }
        };
        for entry in entries.flatten() {
            let token_path = entry.path();
            if !token_path.is_file() {
                continue;
            }
            let taskid = entry.file_name().to_string_lossy().into_owned();
            info!("Removing delete request file: {}", token_path.display());
            if let Err(e) = fs::remove_file(&token_path) {
                error!("Unable to remove {}: {}", token_path.display(), e);
            }
            let task = self.find_task_with_id(&taskid);
            if task.is_none() {
                info!("Task {} not found", taskid);
            }
            return task;
        }
        None
    }

    /// Searches the state directories for a task with the given id
    ///
    /// A match without a readable document still yields a handle with an
    /// empty document: reclaiming the storage takes priority over intact
    /// bookkeeping.
    fn find_task_with_id(&self, taskid: &str) -> Option<Task> {
        for search_dir in &self.searchdirs {
            let Ok(entries) = fs::read_dir(search_dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let candidate = entry.path().join(taskid);
                if !candidate.exists() {
                    continue;
                }
                if !candidate.is_dir() {
                    error!(
                        "Found match ({}), but its not a directory",
                        candidate.display()
                    );
                    continue;
                }
                if candidate.join(TASK_JSON).is_file() {
                    match read_task_doc(&candidate) {
                        Ok(doc) => return Some(Task::new(Some(candidate), Some(doc))),
                        Err(e) => {
                            error!(
                                "Unable to parse json for task {} going to skip json: {}",
                                candidate.display(),
                                e
                            );
                            return Some(Task::new(
                                Some(candidate),
                                Some(Value::Object(Map::new())),
                            ));
                        }
                    }
                }
                error!("No json for task {} going to skip json", candidate.display());
                return Some(Task::new(Some(candidate), Some(Value::Object(Map::new()))));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_next_task_without_request_dir() {
        let temp = TempDir::new().unwrap();
        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        assert!(source.next_task().is_none());
    }

    #[test]
    fn test_next_task_ignores_directories_in_request_dir() {
        let temp = TempDir::new().unwrap();
        let req_dir = temp.path().join(DELETE_REQUESTS);
        fs::create_dir_all(req_dir.join("uhohadir")).unwrap();
        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        assert!(source.next_task().is_none());
        assert!(req_dir.join("uhohadir").is_dir());
    }

    #[test]
    fn test_next_task_consumes_token_without_match() {
        let temp = TempDir::new().unwrap();
        let req_dir = temp.path().join(DELETE_REQUESTS);
        fs::create_dir_all(&req_dir).unwrap();
        let token = req_dir.join("02e487ef-79df-4d99-8f22-1ff1d6d52a2a");
        fs::write(&token, "1.2.3.4").unwrap();

        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        assert!(source.next_task().is_none());
        assert!(!token.exists());
    }

    #[test]
    fn test_next_task_finds_task_and_consumes_token() {
        let temp = TempDir::new().unwrap();
        let req_dir = temp.path().join(DELETE_REQUESTS);
        fs::create_dir_all(&req_dir).unwrap();
        let token = req_dir.join("02e487ef-79df-4d99-8f22-1ff1d6d52a2a");
        fs::write(&token, "1.2.3.4").unwrap();
        let done_dir = temp
            .path()
            .join("done")
            .join("1.2.3.4")
            .join("02e487ef-79df-4d99-8f22-1ff1d6d52a2a");
        fs::create_dir_all(&done_dir).unwrap();

        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        let task = source.next_task().unwrap();
        assert_eq!(task.taskdir(), Some(done_dir.as_path()));
        assert_eq!(task.doc(), Some(&json!({})));
        assert!(!token.exists());
    }

    #[test]
    fn test_find_task_with_id() {
        let temp = TempDir::new().unwrap();
        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        assert!(source.find_task_with_id("foo").is_none());

        // match exists but is a plain file
        let owner_dir = temp.path().join("submitted").join("1.2.3.4");
        fs::create_dir_all(&owner_dir).unwrap();
        fs::write(owner_dir.join("foo"), "").unwrap();
        assert!(source.find_task_with_id("foo").is_none());
        fs::remove_file(owner_dir.join("foo")).unwrap();

        // match without a document gets an empty one
        let submitdir = owner_dir.join("foo");
        fs::create_dir_all(&submitdir).unwrap();
        let task = source.find_task_with_id("foo").unwrap();
        assert_eq!(task.taskdir(), Some(submitdir.as_path()));
        assert_eq!(task.doc(), Some(&json!({})));

        // match with a document carries it along
        fs::write(
            submitdir.join(TASK_JSON),
            serde_json::to_string(&json!({"remoteip": "1.2.3.4"})).unwrap(),
        )
        .unwrap();
        let task = source.find_task_with_id("foo").unwrap();
        assert_eq!(task.owner_address().as_deref(), Some("1.2.3.4"));
        assert_eq!(task.doc(), Some(&json!({"remoteip": "1.2.3.4"})));

        // unparsable document falls back to an empty one
        fs::write(submitdir.join(TASK_JSON), "").unwrap();
        let task = source.find_task_with_id("foo").unwrap();
        assert_eq!(task.taskdir(), Some(submitdir.as_path()));
        assert_eq!(task.doc(), Some(&json!({})));
    }

    #[test]
    fn test_find_task_prefers_processing_over_done() {
        let temp = TempDir::new().unwrap();
        let procdir = temp
            .path()
            .join("processing")
            .join("4.5.5.5")
            .join("mytask");
        fs::create_dir_all(&procdir).unwrap();
        let done_dir = temp.path().join("done").join("4.5.5.5").join("mytask");
        fs::create_dir_all(&done_dir).unwrap();

        let source = DeleteRequestSource::new(&Config::new(temp.path()));
        let task = source.find_task_with_id("mytask").unwrap();
        assert_eq!(task.taskdir(), Some(procdir.as_path()));
    }
}
