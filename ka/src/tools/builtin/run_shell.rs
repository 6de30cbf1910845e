//! run_shell tool - execute shell commands in the project root

use async_trait::async_trait;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use serde_json::Value;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::llm::ToolArgs;
use crate::tools::args::{required_str, timeout_secs};
use crate::tools::output::{CappedBuffer, MAX_OUTPUT_BYTES, TRUNCATION_NOTICE};
use crate::tools::{Tool, ToolContext, ToolError};

/// Default wall-clock limit for one command
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(30);

/// Execute a shell command with the project root as working directory
pub struct RunShellTool {
    default_timeout: Duration,
}

impl RunShellTool {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }
}

impl Default for RunShellTool {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL_TIMEOUT)
    }
}

enum Outcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut,
    Cancelled,
}

#[async_trait]
impl Tool for RunShellTool {
    fn name(&self) -> &'static str {
        "run_shell"
    }

    fn description(&self) -> &'static str {
        "Run a command with `sh -c` in the project root. Returns exit_code=<n> followed by combined stdout and stderr."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to execute; pipes and redirection work"
                },
                "timeout_sec": {
                    "type": "number",
                    "description": "Timeout in seconds (default: 30)"
                }
            },
            "required": ["command"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, args: &ToolArgs, ctx: &ToolContext) -> Result<String, ToolError> {
        let command = required_str(args, "command")?;
        let timeout = ctx.effective_timeout(timeout_secs(args, "timeout_sec", self.default_timeout));
        debug!(%command, ?timeout, "RunShellTool::execute: called");

        Ok(run(command, ctx, timeout).await)
    }
}

/// Run `command` to completion, timeout or cancellation
///
/// Never fails: every outcome is rendered as `exit_code=<n>\n<output>`.
async fn run(command: &str, ctx: &ToolContext, timeout: Duration) -> String {
    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(ctx.root())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            debug!(%e, "run: failed to spawn");
            return format!("exit_code=-1\n{}", e);
        }
    };

    let pid = child.id();
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut output = CappedBuffer::new(MAX_OUTPUT_BYTES);

    let outcome = {
        let collect = async {
            let mut out_buf = [0u8; 8192];
            let mut err_buf = [0u8; 8192];
            let mut out_open = stdout.is_some();
            let mut err_open = stderr.is_some();

            loop {
                tokio::select! {
                    n = read_some(&mut stdout, &mut out_buf), if out_open => match n {
                        Ok(0) | Err(_) => out_open = false,
                        Ok(n) => output.push(&out_buf[..n]),
                    },
                    n = read_some(&mut stderr, &mut err_buf), if err_open => match n {
                        Ok(0) | Err(_) => err_open = false,
                        Ok(n) => output.push(&err_buf[..n]),
                    },
                    else => break,
                }
            }

            child.wait().await
        };

        tokio::select! {
            status = collect => Outcome::Exited(status),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            _ = ctx.cancellation().cancelled() => Outcome::Cancelled,
        }
    };

    let mut text = output.to_text();
    if output.is_truncated() {
        text.push_str(TRUNCATION_NOTICE);
    }

    let code = match outcome {
        Outcome::Exited(Ok(status)) => {
            debug!(?status, "run: command exited");
            status.code().unwrap_or(-1)
        }
        Outcome::Exited(Err(e)) => {
            warn!(%e, "run: failed waiting for command");
            text.push_str(&format!("\n... wait failed: {} ...", e));
            -1
        }
        Outcome::TimedOut => {
            debug!(?timeout, "run: command timed out");
            kill_group(pid, &mut child).await;
            text.push_str(&format!("\n... command timed out after {:?} ...", timeout));
            -1
        }
        Outcome::Cancelled => {
            debug!("run: command cancelled");
            kill_group(pid, &mut child).await;
            text.push_str("\n... command cancelled ...");
            -1
        }
    };

    format!("exit_code={}\n{}", code, text)
}

async fn read_some<R: AsyncRead + Unpin>(stream: &mut Option<R>, buf: &mut [u8]) -> std::io::Result<usize> {
    match stream {
        Some(s) => s.read(buf).await,
        None => Ok(0),
    }
}

/// SIGKILL the whole process group, then reap the shell
async fn kill_group(pid: Option<u32>, child: &mut tokio::process::Child) {
    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok())
        && let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL)
    {
        debug!(%e, pid, "kill_group: killpg failed");
    }
    if let Err(e) = child.kill().await {
        debug!(%e, "kill_group: child already gone");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;
    use tempfile::tempdir;
    use tokio_util::sync::CancellationToken;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_run_shell_basic() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let out = RunShellTool::default()
            .execute(&args(json!({"command": "echo hello"})), &ctx)
            .await
            .unwrap();

        assert_eq!(out, "exit_code=0\nhello\n");
    }

    #[tokio::test]
    async fn test_run_shell_nonzero_exit() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let out = RunShellTool::default()
            .execute(&args(json!({"command": "echo oops >&2; exit 3"})), &ctx)
            .await
            .unwrap();

        assert_eq!(out, "exit_code=3\noops\n");
    }

    #[tokio::test]
    async fn test_run_shell_combines_streams() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let out = RunShellTool::default()
            .execute(&args(json!({"command": "echo out; echo err >&2"})), &ctx)
            .await
            .unwrap();

        assert!(out.starts_with("exit_code=0\n"));
        assert!(out.contains("out\n"));
        assert!(out.contains("err\n"));
    }

    #[tokio::test]
    async fn test_run_shell_in_root() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let out = RunShellTool::default()
            .execute(&args(json!({"command": "pwd -P"})), &ctx)
            .await
            .unwrap();

        assert_eq!(out, format!("exit_code=0\n{}\n", ctx.root().display()));
    }

    #[tokio::test]
    async fn test_run_shell_timeout() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let start = Instant::now();
        let out = RunShellTool::default()
            .execute(&args(json!({"command": "echo started; sleep 5", "timeout_sec": 1})), &ctx)
            .await
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(3), "took {:?}", start.elapsed());
        assert!(out.starts_with("exit_code=-1\n"));
        assert!(out.contains("started"));
        assert!(out.contains("timed out"));
    }

    #[tokio::test]
    async fn test_run_shell_deadline_clamps_timeout() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path())
            .unwrap()
            .with_deadline(Some(tokio::time::Instant::now() + Duration::from_millis(500)));

        let start = Instant::now();
        let out = RunShellTool::default()
            .execute(&args(json!({"command": "sleep 5"})), &ctx)
            .await
            .unwrap();

        assert!(start.elapsed() < Duration::from_secs(3));
        assert!(out.starts_with("exit_code=-1\n"));
    }

    #[tokio::test]
    async fn test_run_shell_cancelled() {
        let temp = tempdir().unwrap();
        let cancel = CancellationToken::new();
        let ctx = ToolContext::new(temp.path()).unwrap().with_cancellation(cancel.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            cancel.cancel();
        });

        let start = Instant::now();
        let out = RunShellTool::default()
            .execute(&args(json!({"command": "sleep 5"})), &ctx)
            .await
            .unwrap();
        canceller.await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(3));
        assert!(out.starts_with("exit_code=-1\n"));
        assert!(out.contains("cancelled"));
    }

    #[tokio::test]
    async fn test_run_shell_output_capped() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let out = RunShellTool::default()
            .execute(&args(json!({"command": "yes | head -c 2000000"})), &ctx)
            .await
            .unwrap();

        assert!(out.starts_with("exit_code=0\n"));
        assert!(out.ends_with(TRUNCATION_NOTICE));
        assert!(out.len() <= "exit_code=0\n".len() + MAX_OUTPUT_BYTES + TRUNCATION_NOTICE.len());
    }

    #[tokio::test]
    async fn test_run_shell_missing_command() {
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path()).unwrap();

        let err = RunShellTool::default().execute(&ToolArgs::new(), &ctx).await.unwrap_err();

        assert!(matches!(err, ToolError::MissingArgument("command")));
    }
}
