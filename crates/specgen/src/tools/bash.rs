use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use specgen_core::tool::{Tool, ToolResult};
use tokio::process::Command;
use tokio::time::timeout;

/// How long a command may run before it is killed.
pub const BASH_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_SHELL: &str = "/bin/bash";

#[derive(Deserialize, JsonSchema)]
pub struct BashCommandParameters {
    #[schemars(description = "The shell command to run.")]
    command: String,
}

/// A tool for running shell commands.
///
/// The tool never fails: spawn errors, timeouts and non-zero exits are all
/// described in the returned text so the model can react to them.
pub struct BashCommandTool {
    parameter_schema: Value,
    shell: PathBuf,
    timeout: Duration,
}

impl BashCommandTool {
    /// Creates a new tool running `/bin/bash` with a 30 second timeout.
    #[inline]
    pub fn new() -> Self {
        BashCommandTool {
            parameter_schema: schema_for!(BashCommandParameters).to_value(),
            shell: PathBuf::from(DEFAULT_SHELL),
            timeout: BASH_COMMAND_TIMEOUT,
        }
    }

    /// Uses another shell. It must accept `-c <command>`.
    #[inline]
    pub fn with_shell<P: Into<PathBuf>>(mut self, shell: P) -> Self {
        self.shell = shell.into();
        self
    }

    /// Uses another timeout.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for BashCommandTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for BashCommandTool {
    type Input = BashCommandParameters;

    fn name(&self) -> &str {
        "bash_command"
    }

    fn description(&self) -> &str {
        r#"
Runs a bash command and returns its output.
Standard output is returned on success, standard error and the exit code on
failure. Commands are killed after 30 seconds."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: BashCommandParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let shell = self.shell.clone();
        let limit = self.timeout;
        async move { Ok(run_command(&shell, &input.command, limit).await) }
    }
}

/// Runs `command` with `shell -c` and describes the outcome.
pub async fn run_command(
    shell: &Path,
    command: &str,
    limit: Duration,
) -> String {
    debug!("running command: {command}");
    let output = Command::new(shell)
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    // Dropping the `output` future on timeout kills the child.
    match timeout(limit, output).await {
        Ok(Ok(output)) => describe_output(&output),
        Ok(Err(err)) => format!("Exception: {err}"),
        Err(_) => {
            warn!("command timed out: {command}");
            format!(
                "Exception: Command '{command}' timed out after {} seconds",
                format_seconds(limit)
            )
        }
    }
}

fn describe_output(output: &Output) -> String {
    if output.status.success() {
        if output.stdout.is_empty() {
            return "Success (no output)".to_owned();
        }
        return format!(
            "Success:\n{}",
            String::from_utf8_lossy(&output.stdout)
        );
    }
    if output.stderr.is_empty() {
        return "Unknown error".to_owned();
    }
    format!(
        "Error {}:\n{}",
        exit_code(output.status),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Returns the exit code, or the negated signal number for a process that
/// was killed by a signal.
#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|signal| -signal))
        .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

fn format_seconds(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        duration.as_secs().to_string()
    } else {
        duration.as_secs_f64().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(command: &str) -> String {
        run_command(Path::new(DEFAULT_SHELL), command, BASH_COMMAND_TIMEOUT)
            .await
    }

    #[tokio::test]
    async fn test_success() {
        assert_eq!(run("echo Hello").await, "Success:\nHello\n");
        assert_eq!(run("true").await, "Success (no output)");
    }

    #[tokio::test]
    async fn test_failure() {
        assert_eq!(run("exit 1").await, "Unknown error");
        assert_eq!(
            run("echo 'no such spec' >&2; exit 3").await,
            "Error 3:\nno such spec\n"
        );
        // Standard output is dropped on failure.
        assert_eq!(run("echo partial; exit 2").await, "Unknown error");
    }

    fn parameters(command: &str) -> BashCommandParameters {
        BashCommandParameters {
            command: command.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let tool =
            BashCommandTool::new().with_timeout(Duration::from_millis(200));
        let result = tool.execute(parameters("sleep 5")).await.unwrap();
        assert_eq!(
            result,
            "Exception: Command 'sleep 5' timed out after 0.2 seconds"
        );
        assert_eq!(format_seconds(BASH_COMMAND_TIMEOUT), "30");
    }

    #[tokio::test]
    async fn test_custom_shell() {
        let tool = BashCommandTool::new().with_shell("/bin/sh");
        let result = tool.execute(parameters("echo $0")).await.unwrap();
        assert_eq!(result, "Success:\n/bin/sh\n");
    }

    #[tokio::test]
    async fn test_missing_shell() {
        let tool = BashCommandTool::new().with_shell("/nonexistent/shell");
        let result = tool.execute(parameters("echo hi")).await.unwrap();
        assert!(result.starts_with("Exception: "), "{result}");
    }

    #[tokio::test]
    async fn test_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("problem_15_spec.txt");
        let tool = BashCommandTool::new();
        let command = format!("echo 'assert result' > {}", spec.display());
        let result = tool.execute(parameters(&command)).await.unwrap();
        assert_eq!(result, "Success (no output)");
        assert_eq!(
            std::fs::read_to_string(&spec).unwrap(),
            "assert result\n"
        );
    }
}
