use crate::errors::Error;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Boundary to the computation pipeline invoked for each claimed task
///
/// The work directory passed in is the task's own directory, so the
/// pipeline may drop intermediate artifacts next to the task record.
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Runs the pipeline with the task's parameters
    ///
    /// # Arguments
    /// * `params` - The task document as submitted
    /// * `workdir` - Directory the pipeline should work in
    ///
    /// # Returns
    /// * `Result<Value, Error>` - The result object to store on the task,
    ///   or an error whose description becomes the task's error message
    async fn execute(&self, params: &Value, workdir: &Path) -> Result<Value, Error>;
}

/// Executor that runs a configured external command
///
/// The command receives the task document on standard input and is
/// expected to print a JSON result object on standard output.
#[derive(Debug)]
pub struct CommandExecutor {
    /// Program and arguments to run for each task
    command: Vec<String>,
}

impl CommandExecutor {
    /// Creates a new CommandExecutor for the given command line
    pub fn new(command: Vec<String>) -> Self {
        CommandExecutor { command }
    }
}

#[async_trait::async_trait]
impl Executor for CommandExecutor {
    async fn execute(&self, params: &Value, workdir: &Path) -> Result<Value, Error> {
        let Some((program, args)) = self.command.split_first() else {
            return Err(Error::Execution("no pipeline command configured".to_string()));
        };

        debug!("Running command: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(args)
            .current_dir(workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Execution(format!("failed to spawn {}: {}", program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(serde_json::to_string(params)?.as_bytes())
                .await
                .map_err(|e| Error::Execution(format!("failed to write to {}: {}", program, e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| Error::Execution(format!("failed to wait for {}: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Execution(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim())
            .map_err(|e| Error::Execution(format!("unparsable pipeline output: {}", e)))
    }
}
