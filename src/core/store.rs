use super::task_state::TaskState;
use crate::config::Config;
use crate::constants::{
    DELETE_REQUESTS, MAX_TASK_ID_LENGTH, NOTFOUND_STATUS, REMOTEIP_KEY, RESULT_KEY,
    SUBMIT_TIME_KEY, TASKTYPE_KEY, TASK_JSON, TASK_JSON_TMP, TASK_TYPE, UUID_KEY,
};
use crate::core::task::read_task_doc;
use crate::errors::Error;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Status of a task as reported to clients
///
/// There is no separate error status: a failed task is `done` with a
/// `message` field inside its parameters.
#[derive(Debug, Serialize)]
pub struct TaskStatus {
    /// One of `submitted`, `processing`, `done` or `notfound`
    pub status: String,
    /// The submitted parameters, with the client address removed
    pub parameters: Option<Value>,
    /// Result object, present once the task is done and succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl TaskStatus {
    /// Status reported for ids that match no tracked task
    pub fn not_found() -> Self {
        Self {
            status: NOTFOUND_STATUS.to_string(),
            parameters: None,
            result: None,
        }
    }
}

/// Producer side of the task queue
///
/// Creates task records under the submitted subtree, answers status
/// queries by scanning the state directories and accepts delete requests
/// by dropping token files. Concurrent callers are safe against each
/// other only through per-task-id directory uniqueness; there is no lock.
pub struct TaskStore {
    /// Service configuration the directory layout is taken from
    config: Config,
}

impl TaskStore {
    /// Creates a new TaskStore over the configured task directory
    pub fn new(config: Config) -> Self {
        TaskStore { config }
    }

    /// Gets the directory submitted tasks are placed under
    pub fn submit_dir(&self) -> PathBuf {
        self.config.task_dir.join(TaskState::Submitted.dir_name())
    }

    /// Gets the directory tasks being executed are placed under
    pub fn processing_dir(&self) -> PathBuf {
        self.config.task_dir.join(TaskState::Processing.dir_name())
    }

    /// Gets the directory finished tasks are placed under
    pub fn done_dir(&self) -> PathBuf {
        self.config.task_dir.join(TaskState::Done.dir_name())
    }

    /// Gets the directory delete request token files are placed under
    pub fn delete_request_dir(&self) -> PathBuf {
        self.config.task_dir.join(DELETE_REQUESTS)
    }

    /// Creates a task record from the submitted parameters
    ///
    /// The task id, task type, client address and submission time are
    /// stamped into the document, which is written to a temporary file
    /// and renamed into place so a scanner never sees a partial document.
    ///
    /// # Arguments
    /// * `remote_addr` - Address of the submitting client, becomes the
    ///   owner segment of the task path
    /// * `params` - Submitted parameters
    ///
    /// # Returns
    /// * The producer-assigned task id
    pub fn create_task(
        &self,
        remote_addr: &str,
        mut params: Map<String, Value>,
    ) -> Result<String, Error> {
        let uuid = Uuid::new_v4().to_string();
        params.insert(UUID_KEY.to_string(), Value::from(uuid.clone()));
        params.insert(TASKTYPE_KEY.to_string(), Value::from(TASK_TYPE));
        params.insert(REMOTEIP_KEY.to_string(), Value::from(remote_addr));
        params.insert(
            SUBMIT_TIME_KEY.to_string(),
            Value::from(Utc::now().timestamp_millis()),
        );

        let taskpath = self.submit_dir().join(remote_addr).join(&uuid);
        fs::create_dir_all(&taskpath)?;

        let tmp_path = taskpath.join(TASK_JSON_TMP);
        fs::write(&tmp_path, serde_json::to_string(&Value::Object(params))?)?;
        fs::rename(&tmp_path, taskpath.join(TASK_JSON))?;
        Ok(uuid)
    }

    /// Looks for a task with the given id under one state directory
    ///
    /// # Arguments
    /// * `taskid` - Id to look for
    /// * `basedir` - State directory to search the owner subdirectories of
    pub fn find_task(&self, taskid: &str, basedir: &Path) -> Option<PathBuf> {
        if !basedir.is_dir() {
            error!("{} is not a directory", basedir.display());
            return None;
        }
        let entries = fs::read_dir(basedir).ok()?;
        for entry in entries.flatten() {
            let ip_path = entry.path();
            if !ip_path.is_dir() {
                continue;
            }
            let taskpath = ip_path.join(taskid);
            if taskpath.is_dir() {
                return Some(taskpath);
            }
        }
        None
    }

    /// Gets the current status of a task
    ///
    /// The state directories are checked in submitted, processing, done
    /// order; whichever one holds the id decides the reported state.
    ///
    /// # Errors
    /// * `NotFound` when no state directory holds the id
    pub fn get_task_status(&self, taskid: &str) -> Result<TaskStatus, Error> {
        let cleanid = taskid.trim();

        if let Some(taskpath) = self.find_task(cleanid, &self.submit_dir()) {
            return Ok(TaskStatus {
                status: TaskState::Submitted.to_string(),
                parameters: self.task_parameters(&taskpath),
                result: None,
            });
        }

        if let Some(taskpath) = self.find_task(cleanid, &self.processing_dir()) {
            return Ok(TaskStatus {
                status: TaskState::Processing.to_string(),
                parameters: self.task_parameters(&taskpath),
                result: None,
            });
        }

        let Some(taskpath) = self.find_task(cleanid, &self.done_dir()) else {
            return Err(Error::NotFound(cleanid.to_string()));
        };
        let mut parameters = self.task_parameters(&taskpath);
        let result = parameters
            .as_mut()
            .and_then(|p| p.as_object_mut())
            .and_then(|p| p.remove(RESULT_KEY));
        Ok(TaskStatus {
            status: TaskState::Done.to_string(),
            parameters,
            result,
        })
    }

    /// Records a request to delete the task with the given id
    ///
    /// The request is a token file named after the task, holding the
    /// requester's address; the task runner turns it into the actual
    /// removal later. No acknowledgment beyond token acceptance exists.
    ///
    /// # Errors
    /// * `InvalidId` when the id is empty or longer than the accepted bound
    pub fn request_delete(&self, taskid: &str, requester: &str) -> Result<(), Error> {
        let cleanid = taskid.trim();
        if cleanid.is_empty() || cleanid.len() > MAX_TASK_ID_LENGTH {
            return Err(Error::InvalidId(format!(
                "id is empty or greater than {} chars",
                MAX_TASK_ID_LENGTH
            )));
        }
        let req_dir = self.delete_request_dir();
        if !req_dir.is_dir() {
            debug!("Creating directory: {}", req_dir.display());
            fs::create_dir_all(&req_dir)?;
        }
        fs::write(req_dir.join(cleanid), requester)?;
        Ok(())
    }

    /// Waits for a task to appear in the done directory
    ///
    /// Polls a bounded number of times with a fixed sleep between
    /// attempts and gives up quietly once they are exhausted.
    pub async fn wait_for_task(&self, taskid: &str) -> Option<PathBuf> {
        let done_dir = self.done_dir();
        for _ in 0..self.config.wait_count {
            if let Some(taskpath) = self.find_task(taskid, &done_dir) {
                return Some(taskpath);
            }
            debug!("Sleeping while waiting for {}", taskid);
            tokio::time::sleep(Duration::from_secs(self.config.sleep_time_secs)).await;
        }
        info!("Wait time exceeded while looking for: {}", taskid);
        None
    }

    /// Reads a task's parameters from its document
    ///
    /// The client address is removed before the parameters are handed
    /// back; an unreadable document is logged and reported as absent.
    fn task_parameters(&self, taskpath: &Path) -> Option<Value> {
        match read_task_doc(taskpath) {
            Ok(mut doc) => {
                if let Some(obj) = doc.as_object_mut() {
                    obj.remove(REMOTEIP_KEY);
                }
                Some(doc)
            }
            Err(e) => {
                error!(
                    "Caught exception getting parameters for {}: {}",
                    taskpath.display(),
                    e
                );
                None
            }
        }
    }
}
