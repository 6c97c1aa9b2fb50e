/// Name of the JSON document holding a task's parameters and results
pub const TASK_JSON: &str = "task.json";

/// Temporary name the task document is written under before being
/// renamed into place at submission time
pub const TASK_JSON_TMP: &str = "task.json.tmp";

/// Directory under the task root where delete request token files are
/// dropped, named after the task they target
pub const DELETE_REQUESTS: &str = "delete_requests";

/// Files a task directory is expected to contain; anything else is left
/// in place when a task record is deleted
pub const TASK_FILES: [&str; 1] = [TASK_JSON];

/// Status string reported for ids that match no tracked task
pub const NOTFOUND_STATUS: &str = "notfound";

/// Message stored when a task is moved to the error state without one
pub const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Task type stamped into every submitted task document
pub const TASK_TYPE: &str = "ddot_ontology";

/// Maximum accepted length of a task id in a delete request
pub const MAX_TASK_ID_LENGTH: usize = 40;

/// Key holding the producer-assigned task id
pub const UUID_KEY: &str = "uuid";

/// Key holding the submitting client's address
pub const REMOTEIP_KEY: &str = "remoteip";

/// Key holding the task type
pub const TASKTYPE_KEY: &str = "tasktype";

/// Key holding the submission time in milliseconds since the epoch
pub const SUBMIT_TIME_KEY: &str = "submitTime";

/// Key holding task progress, set to 100 on completion
pub const PROGRESS_KEY: &str = "progress";

/// Key holding the error message of a failed task
pub const MESSAGE_KEY: &str = "message";

/// Key holding the task's wall clock duration in milliseconds
pub const WALL_TIME_KEY: &str = "wallTime";

/// Key holding the nested result object of a completed task
pub const RESULT_KEY: &str = "result";

/// Key holding the disease ontology id parameter
pub const DOID_KEY: &str = "doid";

/// Key holding the NDEx server parameter
pub const NDEXSERVER_KEY: &str = "ndexserver";

/// Key holding the NDEx username parameter
pub const NDEXUSER_KEY: &str = "ndexuser";

/// Key holding the NDEx password parameter
pub const NDEXPASS_KEY: &str = "ndexpass";

/// Key holding the name to use for the network stored in NDEx
pub const NDEXNAME_KEY: &str = "ndexname";

/// Key holding the HiView server URL parameter
pub const HIVIEWURL_KEY: &str = "hiviewurl";
