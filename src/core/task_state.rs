use std::str::FromStr;

/// Represents the lifecycle state of a task in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// State when a task has been created but not yet claimed by the runner
    Submitted,
    /// State while the task is being executed
    Processing,
    /// Terminal state, reached on success and on failure alike
    Done,
    /// Logical failure state; physically stored under `done` with an
    /// error message recorded in the task document
    Error,
}

#[allow(clippy::to_string_trait_impl)]
impl ToString for TaskState {
    /// Converts the TaskState enum to its string representation
    fn to_string(&self) -> String {
        match self {
            TaskState::Submitted => "submitted".to_string(),
            TaskState::Processing => "processing".to_string(),
            TaskState::Done => "done".to_string(),
            TaskState::Error => "error".to_string(),
        }
    }
}

impl FromStr for TaskState {
    type Err = ();

    /// Attempts to create a TaskState from a string representation
    ///
    /// # Arguments
    /// * `s` - String slice containing the state name
    ///
    /// # Returns
    /// * `Ok(TaskState)` if the string matches a valid state
    /// * `Err(())` if the string does not match any valid state
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(TaskState::Submitted),
            "processing" => Ok(TaskState::Processing),
            "done" => Ok(TaskState::Done),
            "error" => Ok(TaskState::Error),
            _ => Err(()),
        }
    }
}

impl TaskState {
    /// Name of the directory a task in this state lives under. The error
    /// state has no directory of its own, it is folded into `done`.
    pub fn dir_name(&self) -> &'static str {
        match self {
            TaskState::Submitted => "submitted",
            TaskState::Processing => "processing",
            TaskState::Done | TaskState::Error => "done",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_round_trips_through_from_str() {
        for state in [
            TaskState::Submitted,
            TaskState::Processing,
            TaskState::Done,
            TaskState::Error,
        ] {
            assert_eq!(TaskState::from_str(&state.to_string()), Ok(state));
        }
        assert!(TaskState::from_str("bogus").is_err());
    }

    #[test]
    fn test_error_state_folds_into_done_directory() {
        assert_eq!(TaskState::Error.dir_name(), "done");
        assert_eq!(TaskState::Done.dir_name(), "done");
        assert_eq!(TaskState::Submitted.dir_name(), "submitted");
        assert_eq!(TaskState::Processing.dir_name(), "processing");
    }
}
