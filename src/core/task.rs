use super::task_state::TaskState;
use crate::constants::{DEFAULT_ERROR_MESSAGE, MESSAGE_KEY, TASK_FILES, TASK_JSON};
use crate::constants::{DOID_KEY, HIVIEWURL_KEY, NDEXNAME_KEY, NDEXPASS_KEY, NDEXSERVER_KEY, NDEXUSER_KEY};
use crate::errors::Error;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Attributes of a task derived purely from its directory path.
///
/// A task path has the shape `<basedir>/<state>/<owner>/<id>`; segments
/// missing from a shallower path come back as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskAttributes {
    /// Root directory holding the state directories
    pub basedir: Option<PathBuf>,
    /// Name of the state directory the task currently lives under
    pub state: Option<String>,
    /// Address of the client that submitted the task
    pub owner: Option<String>,
    /// Producer-assigned task id
    pub id: Option<String>,
}

/// Equivalent of `os.path.dirname`: the parent of a path, saturating at
/// the filesystem root instead of disappearing.
fn dirname(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    }
}

/// Final path segment, or `None` for the root or an empty path.
fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Reads and parses the `task.json` document inside a task directory
pub(crate) fn read_task_doc(taskdir: &Path) -> Result<Value, Error> {
    let contents = fs::read_to_string(taskdir.join(TASK_JSON))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Represents one task record on the filesystem
///
/// The handle is bound to the record's current directory; identity, owner
/// and state are derived from that path rather than stored. Every state
/// change is a rewrite of the JSON document followed by a relocation of
/// the whole directory.
#[derive(Debug, Clone)]
pub struct Task {
    /// Directory the record currently occupies, if bound
    taskdir: Option<PathBuf>,
    /// Parsed task document, if one could be read
    doc: Option<Value>,
}

impl Task {
    /// Creates a new task handle bound to the given directory and document
    pub fn new(taskdir: Option<PathBuf>, doc: Option<Value>) -> Self {
        Self { taskdir, doc }
    }

    /// Gets the directory this handle is bound to
    pub fn taskdir(&self) -> Option<&Path> {
        self.taskdir.as_deref()
    }

    /// Rebinds the handle to a different directory
    pub fn set_taskdir(&mut self, taskdir: impl Into<PathBuf>) {
        self.taskdir = Some(taskdir.into());
    }

    /// Gets the task document
    pub fn doc(&self) -> Option<&Value> {
        self.doc.as_ref()
    }

    /// Replaces the task document
    pub fn set_doc(&mut self, doc: Value) {
        self.doc = Some(doc);
    }

    /// Decomposes the bound path into `{basedir, state, owner, id}`
    ///
    /// # Returns
    /// * `TaskAttributes` with every segment `None` when the handle is
    ///   unbound, and with the segments a shallow path cannot provide
    ///   left as `None`
    pub fn attributes(&self) -> TaskAttributes {
        let Some(taskdir) = self.taskdir.as_deref() else {
            error!("Task dir not set");
            return TaskAttributes::default();
        };
        let id = basename(taskdir);
        let ipdir = dirname(taskdir);
        let owner = basename(&ipdir);
        let statedir = dirname(&ipdir);
        let state = basename(&statedir);
        let basedir = dirname(&statedir);
        TaskAttributes {
            basedir: Some(basedir),
            state,
            owner,
            id,
        }
    }

    /// Gets the current state directory name of the task
    pub fn state(&self) -> Option<String> {
        self.attributes().state
    }

    /// Gets the owner address segment of the task path
    pub fn owner_address(&self) -> Option<String> {
        self.attributes().owner
    }

    /// Gets the task id segment of the task path
    pub fn task_id(&self) -> Option<String> {
        self.attributes().id
    }

    /// Quick human readable summary of the task for logging
    pub fn summary(&self) -> String {
        format!("{:?}", self.attributes())
    }

    /// Rewrites the task document to `task.json` inside the bound directory
    ///
    /// The write is a full overwrite of the previous file contents.
    ///
    /// # Errors
    /// * `DirectoryMissing` / `DocumentMissing` if the handle is unbound
    /// * `NotADirectory` if the bound path is not a directory
    pub fn persist(&self) -> Result<(), Error> {
        let taskdir = self.taskdir.as_deref().ok_or(Error::DirectoryMissing)?;
        let doc = self.doc.as_ref().ok_or(Error::DocumentMissing)?;
        if !taskdir.is_dir() {
            return Err(Error::NotADirectory(taskdir.to_path_buf()));
        }
        let json_path = taskdir.join(TASK_JSON);
        debug!("Writing task data to: {}", json_path.display());
        fs::write(json_path, serde_json::to_string(doc)?)?;
        Ok(())
    }

    /// Changes the state of the task by relocating its directory
    ///
    /// Only the state segment of the path changes; owner and id are kept.
    /// Moving to the state the task is already in is a no-op. Moving to
    /// the error state records `error_message` (or a default) in the
    /// document and persists it before relocating the directory into
    /// `done`, so the record is never visible there without its message.
    ///
    /// # Errors
    /// * `PathResolution` if the bound path cannot be decomposed into the
    ///   four required segments
    pub fn transition(
        &mut self,
        new_state: TaskState,
        error_message: Option<&str>,
    ) -> Result<(), Error> {
        let Some(taskdir) = self.taskdir.clone() else {
            return Err(Error::PathResolution);
        };
        let attrs = self.attributes();
        let (Some(basedir), Some(owner), Some(id)) = (attrs.basedir, attrs.owner, attrs.id) else {
            return Err(Error::PathResolution);
        };

        if attrs.state.as_deref() == Some(new_state.to_string().as_str()) {
            debug!("Attempt to move task to same state: {}", taskdir.display());
            return Ok(());
        }

        let target = if new_state == TaskState::Error {
            let emsg = error_message.unwrap_or(DEFAULT_ERROR_MESSAGE);
            info!("Task set to error state with message: {}", emsg);
            if let Some(doc) = self.doc.as_mut().and_then(|d| d.as_object_mut()) {
                doc.insert(MESSAGE_KEY.to_string(), Value::from(emsg));
            }
            self.persist()?;
            TaskState::Done
        } else {
            new_state
        };

        debug!("Changing task: {} to state {}", id, target.to_string());
        let dest = basedir.join(target.dir_name()).join(&owner).join(&id);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&taskdir, &dest)?;
        self.taskdir = Some(dest);
        Ok(())
    }

    /// Deletes the task record from the filesystem
    ///
    /// Only files on the known artifact list are unlinked; anything else
    /// is reported and left in place, in which case removing the
    /// directory itself fails and the record survives.
    ///
    /// # Errors
    /// * `DirectoryMissing` if the handle is unbound
    /// * `NotADirectory` if the bound path is not a directory
    /// * `DirectoryNotEmpty` if unrecognized entries remain
    pub fn delete_record(&self) -> Result<(), Error> {
        let taskdir = self.taskdir.as_deref().ok_or(Error::DirectoryMissing)?;
        if !taskdir.is_dir() {
            return Err(Error::NotADirectory(taskdir.to_path_buf()));
        }
        for entry in fs::read_dir(taskdir)? {
            let entry = entry?;
            let name = entry.file_name();
            if !TASK_FILES.iter().any(|known| name == *known) {
                error!("{} not in files created by task", name.to_string_lossy());
                continue;
            }
            let path = entry.path();
            if path.is_file() {
                fs::remove_file(&path)?;
            }
        }
        fs::remove_dir(taskdir).map_err(|e| match e.kind() {
            std::io::ErrorKind::DirectoryNotEmpty => {
                Error::DirectoryNotEmpty(taskdir.to_path_buf())
            }
            _ => Error::Io(e),
        })?;
        Ok(())
    }

    /// Gets the disease ontology id parameter
    pub fn disease_id(&self) -> Option<&Value> {
        self.doc.as_ref()?.get(DOID_KEY)
    }

    /// Gets the NDEx server parameter
    pub fn ndex_server(&self) -> Option<&str> {
        self.doc.as_ref()?.get(NDEXSERVER_KEY)?.as_str()
    }

    /// Gets the NDEx username parameter
    pub fn ndex_user(&self) -> Option<&str> {
        self.doc.as_ref()?.get(NDEXUSER_KEY)?.as_str()
    }

    /// Gets the NDEx password parameter
    pub fn ndex_pass(&self) -> Option<&str> {
        self.doc.as_ref()?.get(NDEXPASS_KEY)?.as_str()
    }

    /// Gets the network name parameter
    pub fn ndex_name(&self) -> Option<&str> {
        self.doc.as_ref()?.get(NDEXNAME_KEY)?.as_str()
    }

    /// Gets the HiView server URL parameter
    pub fn hiview_url(&self) -> Option<&str> {
        self.doc.as_ref()?.get(HIVIEWURL_KEY)?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_getters_on_unbound_task() {
        let task = Task::new(None, None);
        assert_eq!(task.task_id(), None);
        assert_eq!(task.owner_address(), None);
        assert_eq!(task.state(), None);
        assert_eq!(task.disease_id(), None);
        assert!(task.doc().is_none());
        assert!(task.taskdir().is_none());

        let mut task = Task::new(None, Some(json!({"doid": 1234})));
        assert_eq!(task.disease_id(), Some(&json!(1234)));
        task.set_doc(json!({}));
        assert_eq!(task.disease_id(), None);
        task.set_doc(json!({"doid": 2}));
        assert_eq!(task.disease_id(), Some(&json!(2)));
    }

    #[test]
    fn test_parameter_accessors() {
        let task = Task::new(
            None,
            Some(json!({
                "ndexserver": "test.ndexbio.org",
                "ndexuser": "ddot_anon",
                "ndexpass": "ddot_anon",
                "ndexname": "DDOTontology",
                "hiviewurl": "http://hiview-test.ucsd.edu"
            })),
        );
        assert_eq!(task.ndex_server(), Some("test.ndexbio.org"));
        assert_eq!(task.ndex_user(), Some("ddot_anon"));
        assert_eq!(task.ndex_pass(), Some("ddot_anon"));
        assert_eq!(task.ndex_name(), Some("DDOTontology"));
        assert_eq!(task.hiview_url(), Some("http://hiview-test.ucsd.edu"));

        let task = Task::new(None, Some(json!({})));
        assert_eq!(task.ndex_server(), None);
        assert_eq!(task.hiview_url(), None);
    }

    #[test]
    fn test_attributes_from_path() {
        let mut task = Task::new(None, None);
        assert_eq!(task.attributes(), TaskAttributes::default());

        // too basic a path
        task.set_taskdir("/foo");
        let attrs = task.attributes();
        assert_eq!(attrs.basedir.as_deref(), Some(Path::new("/")));
        assert_eq!(attrs.state, None);
        assert_eq!(attrs.owner, None);
        assert_eq!(attrs.id.as_deref(), Some("foo"));

        // valid four segment path
        task.set_taskdir("/b/submitted/i/myjob");
        let attrs = task.attributes();
        assert_eq!(attrs.basedir.as_deref(), Some(Path::new("/b")));
        assert_eq!(attrs.state.as_deref(), Some("submitted"));
        assert_eq!(attrs.owner.as_deref(), Some("i"));
        assert_eq!(attrs.id.as_deref(), Some("myjob"));

        // deeper path keeps everything below the last four segments
        task.set_taskdir("/a/c/b/submitted/i/myjob");
        let attrs = task.attributes();
        assert_eq!(attrs.basedir.as_deref(), Some(Path::new("/a/c/b")));
        assert_eq!(attrs.state.as_deref(), Some("submitted"));
        assert_eq!(attrs.owner.as_deref(), Some("i"));
        assert_eq!(attrs.id.as_deref(), Some("myjob"));
    }

    #[test]
    fn test_persist() {
        let temp = TempDir::new().unwrap();

        let mut task = Task::new(None, None);
        assert!(matches!(task.persist(), Err(Error::DirectoryMissing)));

        task.set_taskdir(temp.path());
        assert!(matches!(task.persist(), Err(Error::DocumentMissing)));

        // bound path is a file, not a directory
        let somefile = temp.path().join("somefile");
        fs::write(&somefile, "").unwrap();
        task.set_doc(json!({"blah": "value"}));
        task.set_taskdir(&somefile);
        assert!(matches!(task.persist(), Err(Error::NotADirectory(_))));

        task.set_taskdir(temp.path());
        task.persist().unwrap();
        let written = fs::read_to_string(temp.path().join(TASK_JSON)).unwrap();
        assert_eq!(written, r#"{"blah":"value"}"#);

        // persisting again just overwrites
        task.persist().unwrap();
        let written = fs::read_to_string(temp.path().join(TASK_JSON)).unwrap();
        assert_eq!(written, r#"{"blah":"value"}"#);
    }

    #[test]
    fn test_transition_requires_resolvable_path() {
        let mut task = Task::new(None, None);
        assert!(matches!(
            task.transition(TaskState::Processing, None),
            Err(Error::PathResolution)
        ));
    }

    #[test]
    fn test_transition_through_states() {
        let temp = TempDir::new().unwrap();
        let taskdir = temp
            .path()
            .join("submitted")
            .join("192.168.1.1")
            .join("qwerty-qwerty");
        fs::create_dir_all(&taskdir).unwrap();
        let mut task = Task::new(Some(taskdir.clone()), Some(json!({"hi": "bye"})));
        task.persist().unwrap();

        // same state is a no-op
        task.transition(TaskState::Submitted, None).unwrap();
        assert_eq!(task.taskdir(), Some(taskdir.as_path()));

        // submitted to processing
        task.transition(TaskState::Processing, None).unwrap();
        assert!(!taskdir.is_dir());
        let current = task.taskdir().unwrap().to_path_buf();
        assert!(current.is_dir());
        assert_eq!(task.state().as_deref(), Some("processing"));
        assert_eq!(task.owner_address().as_deref(), Some("192.168.1.1"));
        assert_eq!(task.task_id().as_deref(), Some("qwerty-qwerty"));

        // processing to done, then backward to submitted
        task.transition(TaskState::Done, None).unwrap();
        assert_eq!(task.state().as_deref(), Some("done"));
        task.transition(TaskState::Submitted, None).unwrap();
        assert_eq!(task.state().as_deref(), Some("submitted"));

        // error lands in done with a default message
        task.transition(TaskState::Error, None).unwrap();
        assert_eq!(task.state().as_deref(), Some("done"));
        let written: Value =
            serde_json::from_str(&fs::read_to_string(task.taskdir().unwrap().join(TASK_JSON)).unwrap())
                .unwrap();
        assert_eq!(written["message"], "Unknown error");

        // a later error overwrites the previous message
        task.transition(TaskState::Submitted, None).unwrap();
        task.transition(TaskState::Error, Some("bad")).unwrap();
        let written: Value =
            serde_json::from_str(&fs::read_to_string(task.taskdir().unwrap().join(TASK_JSON)).unwrap())
                .unwrap();
        assert_eq!(written["message"], "bad");
    }

    #[test]
    fn test_delete_record() {
        let temp = TempDir::new().unwrap();

        let task = Task::new(None, None);
        assert!(matches!(task.delete_record(), Err(Error::DirectoryMissing)));

        let notadir = temp.path().join("notadir");
        let task = Task::new(Some(notadir), None);
        assert!(matches!(task.delete_record(), Err(Error::NotADirectory(_))));

        // empty directory is removed
        let emptydir = temp.path().join("emptydir");
        fs::create_dir_all(&emptydir).unwrap();
        let task = Task::new(Some(emptydir.clone()), None);
        task.delete_record().unwrap();
        assert!(!emptydir.is_dir());

        // directory holding only known files is removed
        let valid_dir = temp.path().join("yoyo");
        fs::create_dir_all(&valid_dir).unwrap();
        fs::write(valid_dir.join(TASK_JSON), "").unwrap();
        let task = Task::new(Some(valid_dir.clone()), Some(json!({})));
        task.delete_record().unwrap();
        assert!(!valid_dir.is_dir());

        // an unexpected file is left alone and the directory survives
        let valid_dir = temp.path().join("yoyo");
        fs::create_dir_all(&valid_dir).unwrap();
        fs::write(valid_dir.join("somefile"), "").unwrap();
        fs::write(valid_dir.join(TASK_JSON), "").unwrap();
        let task = Task::new(Some(valid_dir.clone()), Some(json!({})));
        assert!(matches!(
            task.delete_record(),
            Err(Error::DirectoryNotEmpty(_))
        ));
        assert!(valid_dir.is_dir());
        assert!(valid_dir.join("somefile").is_file());
        assert!(!valid_dir.join(TASK_JSON).exists());
    }
}
