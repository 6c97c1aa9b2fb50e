use super::task::{read_task_doc, Task};
use super::task_state::TaskState;
use crate::config::Config;
use crate::constants::TASK_JSON;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

/// Scans the submitted subtree of the task directory for work
///
/// The scan is two levels deep (owner address directories, then task id
/// directories) and hands back the first task with a readable document.
/// Nothing is reserved; a task only leaves this source's view once the
/// runner has moved it out of the submitted state.
pub struct SubmittedTaskSource {
    /// The `submitted` directory under the task root
    submitdir: PathBuf,
    /// Task directories whose document could not be parsed; recorded once
    /// and skipped on every later scan by this source instance
    problem_list: Vec<PathBuf>,
}

impl SubmittedTaskSource {
    /// Creates a new source scanning under the configured task directory
    pub fn new(config: &Config) -> Self {
        Self {
            submitdir: config.task_dir.join(TaskState::Submitted.dir_name()),
            problem_list: Vec::new(),
        }
    }

    /// Looks for the next task in the submitted directory
    ///
    /// Directory listing order decides which task is returned first; there
    /// is no fairness or FIFO guarantee.
    ///
    /// # Returns
    /// * `Some(Task)` for the first task id directory holding a parseable
    ///   document
    /// * `None` when the submitted directory is missing or holds nothing
    ///   eligible
    pub fn next_task(&mut self) -> Option<Task> {
        if !self.submitdir.is_dir() {
            error!(
                "{} does not exist or is not a directory",
                self.submitdir.display()
            );
            return None;
        }
        debug!("Examining {} for new tasks", self.submitdir.display());
        let entries = match fs::read_dir(&self.submitdir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Unable to list {}: {}", self.submitdir.display(), e);
                return None;
            }
        };
        for entry in entries.flatten() {
            let owner_dir = entry.path();
            if !owner_dir.is_dir() {
                continue;
            }
            let Ok(subentries) = fs::read_dir(&owner_dir) else {
                continue;
            };
            for subentry in subentries.flatten() {
                let task_dir = subentry.path();
                if !task_dir.is_dir() || !task_dir.join(TASK_JSON).is_file() {
                    continue;
                }
                match read_task_doc(&task_dir) {
                    Ok(doc) => return Some(Task::new(Some(task_dir), Some(doc))),
                    Err(e) => {
                        if !self.problem_list.contains(&task_dir) {
                            info!(
                                "Skipping task: {} due to error reading json file: {}",
                                task_dir.display(),
                                e
                            );
                            self.problem_list.push(task_dir);
                        }
                    }
                }
            }
        }
        None
    }

    /// Gets the list of task directories skipped due to unreadable documents
    pub fn problem_list(&self) -> &[PathBuf] {
        &self.problem_list
    }
}
