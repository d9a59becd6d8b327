//! Subprocess boundary for tree generation.
//!
//! Every tool invocation goes through a [`ToolRunner`]. [`SystemRunner`]
//! spawns real processes, one at a time, and blocks until each exits.
//! [`ScriptedRunner`] replays canned outputs so traversal, staleness and
//! persistence can be exercised without the tools installed.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::debug;
use wait_timeout::ChildExt;

use crate::error::{GenerateError, Result};

/// Default per-invocation timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Captured result of one finished invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` if the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    /// Output of a process that exited with status 0.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Output of a process that exited with `code`.
    pub fn exited(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Locates and runs the tools whose trees are generated.
pub trait ToolRunner {
    /// Returns the resolved executable for `program`, or `None` if it is not
    /// installed.
    fn locate(&self, program: &str) -> Option<PathBuf>;

    /// Runs `argv` to completion and captures its output.
    ///
    /// A non-zero exit is not an error at this level; callers decide which
    /// statuses are acceptable.
    fn run(&self, argv: &[String]) -> Result<CapturedOutput>;
}

/// Runs real processes with a bounded wait.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

impl ToolRunner for SystemRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        if program.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(program);
            return is_executable(&path).then_some(path);
        }

        let path_env = env::var_os("PATH")?;
        env::split_paths(&path_env)
            .map(|dir| dir.join(program))
            .find(|candidate| is_executable(candidate))
    }

    fn run(&self, argv: &[String]) -> Result<CapturedOutput> {
        let joined = argv.join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Err(GenerateError::Spawn {
                argv: joined,
                source: std::io::Error::new(ErrorKind::InvalidInput, "empty command line"),
            });
        };

        debug!(command = ?argv, "Running");
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in tool_env() {
            command.env(key, value);
        }

        let mut child = command.spawn().map_err(|source| GenerateError::Spawn {
            argv: joined.clone(),
            source,
        })?;

        // Drain both pipes while waiting; the child stalls once a pipe fills.
        let stdout_thread = child.stdout.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let result = pipe.read_to_end(&mut buf);
                (buf, result)
            })
        });
        let stderr_thread = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let result = pipe.read_to_end(&mut buf);
                (buf, result)
            })
        });

        let status = match child.wait_timeout(self.timeout)? {
            Some(status) => status,
            None => {
                debug!(command = ?argv, timeout_secs = self.timeout.as_secs(), "Timed out, killing process");
                let _ = child.kill();
                let _ = child.wait();
                return Err(GenerateError::Timeout {
                    argv: joined,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        let stdout = join_pipe(stdout_thread)?;
        let stderr = join_pipe(stderr_thread)?;

        Ok(CapturedOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

type PipeThread = std::thread::JoinHandle<(Vec<u8>, std::io::Result<usize>)>;

fn join_pipe(handle: Option<PipeThread>) -> Result<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    match handle.join() {
        Ok((buf, Ok(_))) => Ok(buf),
        Ok((_, Err(e))) => Err(GenerateError::Io(e)),
        Err(_) => Err(GenerateError::Io(std::io::Error::other(
            "pipe reader thread panicked",
        ))),
    }
}

/// Environment applied to every tool invocation.
///
/// Keeps pagers, colors and terminal-width dependent layout out of the
/// captured text.
fn tool_env() -> [(&'static str, &'static str); 7] {
    [
        ("PAGER", "cat"),
        ("MANPAGER", "cat"),
        ("GIT_PAGER", "cat"),
        ("NO_COLOR", "1"),
        ("TERM", "dumb"),
        ("MANWIDTH", "80"),
        ("CLOUDSDK_CORE_DISABLE_PROMPTS", "1"),
    ]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };

    metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Replays canned tool output keyed by the space-joined command line.
///
/// Unknown command lines fail like a missing executable. Every invocation is
/// recorded and can be inspected with [`calls`](ScriptedRunner::calls).
///
/// # Examples
///
/// ```
/// use cli_tree_generator::runner::{CapturedOutput, ScriptedRunner, ToolRunner};
///
/// let runner = ScriptedRunner::new()
///     .installed("kubectl")
///     .respond("kubectl version --client", CapturedOutput::success("Client Version: v1.28.0\n"));
///
/// assert!(runner.locate("kubectl").is_some());
/// assert!(runner.locate("bq").is_none());
/// let out = runner.run(&["kubectl".into(), "version".into(), "--client".into()]).unwrap();
/// assert_eq!(out.exit_code, Some(0));
/// assert_eq!(runner.calls().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    installed: BTreeSet<String>,
    responses: HashMap<String, CapturedOutput>,
    calls: RefCell<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `program` as installed at `/usr/bin/<program>`.
    pub fn installed(mut self, program: &str) -> Self {
        self.installed.insert(program.to_string());
        self
    }

    /// Registers the output for the command line `argv` (space-joined).
    pub fn respond(mut self, argv: &str, output: CapturedOutput) -> Self {
        self.responses.insert(argv.to_string(), output);
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ToolRunner for ScriptedRunner {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let name = Path::new(program).file_name()?.to_str()?;
        self.installed
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }

    fn run(&self, argv: &[String]) -> Result<CapturedOutput> {
        self.calls.borrow_mut().push(argv.to_vec());
        let joined = argv.join(" ");
        self.responses
            .get(&joined)
            .cloned()
            .ok_or_else(|| GenerateError::Spawn {
                argv: joined,
                source: std::io::Error::new(ErrorKind::NotFound, "no scripted response"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_runner_unknown_command_fails() {
        let runner = ScriptedRunner::new();
        let err = runner.run(&["nope".to_string()]).unwrap_err();
        assert!(matches!(err, GenerateError::Spawn { .. }));
        assert_eq!(runner.calls(), vec![vec!["nope".to_string()]]);
    }

    #[test]
    fn test_system_runner_missing_program_not_located() {
        let runner = SystemRunner::default();
        assert!(runner.locate("__cli_tree_missing_command__").is_none());
    }

    #[test]
    fn test_system_runner_spawn_failure() {
        let runner = SystemRunner::default();
        let err = runner
            .run(&["__cli_tree_missing_command__".to_string()])
            .unwrap_err();
        assert!(matches!(err, GenerateError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_stdout_and_status() {
        let runner = SystemRunner::default();
        let argv = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo hello; exit 3".to_string(),
        ];
        let out = runner.run(&argv).unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert_eq!(out.stdout, "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_times_out() {
        let runner = SystemRunner::new(Duration::from_millis(100));
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let err = runner.run(&argv).unwrap_err();
        assert!(matches!(err, GenerateError::Timeout { .. }));
    }
}
