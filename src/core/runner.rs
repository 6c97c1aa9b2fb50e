use super::delete_source::DeleteRequestSource;
use super::executor::Executor;
use super::submitted_source::SubmittedTaskSource;
use super::task::Task;
use super::task_state::TaskState;
use crate::config::Config;
use crate::constants::{PROGRESS_KEY, RESULT_KEY, SUBMIT_TIME_KEY, WALL_TIME_KEY};
use crate::errors::Error;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Runs tasks created by the submission side of the service
///
/// One instance is the single logical consumer of the queue: it drains
/// pending delete requests, claims one submitted task at a time and walks
/// it through the state machine around the executor call. Tasks never
/// overlap within one runner.
pub struct TaskRunner {
    /// Source of tasks awaiting execution
    task_source: SubmittedTaskSource,
    /// Source of delete requests, absent when deletion handling is disabled
    delete_source: Option<DeleteRequestSource>,
    /// Pipeline invoked for each claimed task
    executor: Arc<dyn Executor>,
    /// How long to sleep when no task is waiting
    wait_time: Duration,
}

impl TaskRunner {
    /// Creates a new TaskRunner
    ///
    /// # Arguments
    /// * `config` - Service configuration the sources and wait interval are taken from
    /// * `executor` - Pipeline invoked for each claimed task
    pub fn new(config: &Config, executor: Arc<dyn Executor>) -> Self {
        let delete_source = if config.disable_delete {
            info!("Deletion of tasks disabled");
            None
        } else {
            Some(DeleteRequestSource::new(config))
        };
        Self {
            task_source: SubmittedTaskSource::new(config),
            delete_source,
            executor,
            wait_time: Duration::from_secs(config.wait_time_secs),
        }
    }

    /// Main entry point, loops looking for tasks to run
    ///
    /// Delete requests are drained to exhaustion before each claim so
    /// cancellations take priority over forward progress. A failure while
    /// processing one task never stops the loop; the task is moved to the
    /// error state and the next iteration starts.
    ///
    /// # Arguments
    /// * `keep_looping` - Predicate checked once per iteration; the loop
    ///   exits when it returns false
    pub async fn run_tasks(&mut self, mut keep_looping: impl FnMut() -> bool) {
        while keep_looping() {
            while self.remove_deleted_task() {}

            let Some(mut task) = self.task_source.next_task() else {
                tokio::time::sleep(self.wait_time).await;
                continue;
            };

            info!("Found a task: {}", task.summary());
            if let Err(e) = self.process_task(&mut task).await {
                let emsg = format!("Caught error processing task: {}", e);
                error!("Skipping task cause - {}", emsg);
                if let Err(move_err) = task.transition(TaskState::Error, Some(&emsg)) {
                    error!("Unable to move task to error state: {}", move_err);
                }
            }
        }
    }

    /// Processes one claimed task
    ///
    /// The task is moved to processing, the executor is invoked with the
    /// task's own directory as work directory, and on success the result
    /// fields, progress and wall clock time are merged into the document
    /// before the move to done.
    async fn process_task(&self, task: &mut Task) -> Result<(), Error> {
        task.transition(TaskState::Processing, None)?;
        let workdir = task
            .taskdir()
            .map(|p| p.to_path_buf())
            .ok_or(Error::DirectoryMissing)?;
        info!("Task dir: {}", workdir.display());
        let params = task.doc().cloned().ok_or(Error::DocumentMissing)?;

        let result = self.executor.execute(&params, &workdir).await?;
        info!("Task finished");

        let curtime = Utc::now().timestamp_millis();
        let mut doc = params;
        if let Some(obj) = doc.as_object_mut() {
            obj.insert(PROGRESS_KEY.to_string(), Value::from(100));
            obj.insert(RESULT_KEY.to_string(), result);
            let submit_time = obj
                .get(SUBMIT_TIME_KEY)
                .and_then(Value::as_i64)
                .unwrap_or(curtime);
            obj.insert(WALL_TIME_KEY.to_string(), Value::from(curtime - submit_time));
        }
        task.set_doc(doc);
        task.persist()?;
        info!("Task processing completed");
        task.transition(TaskState::Done, None)?;
        Ok(())
    }

    /// Looks for one delete request and handles it
    ///
    /// # Returns
    /// * `true` when a request was handled, `false` when none were pending
    fn remove_deleted_task(&self) -> bool {
        let Some(delete_source) = &self.delete_source else {
            return false;
        };
        let Some(task) = delete_source.next_task() else {
            return false;
        };
        if task.taskdir().is_some() {
            info!("Deleting task: {}", task.summary());
            if let Err(e) = task.delete_record() {
                error!("Error deleting task: {}", e);
            }
        }
        true
    }
}
