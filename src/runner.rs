//! Subprocess execution
//!
//! Runs the search command off the UI thread with cancellation and an
//! optional timeout. Elevated runs go through a privilege helper (`pkexec`
//! by default) without ever invoking a shell.

use crate::error::{FindViewError, Result};
use crate::logging;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Exit codes `pkexec` uses when authorization fails or is dismissed
const ELEVATION_DENIED_CODES: [i32; 2] = [126, 127];

/// How the command should be executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Normal,
    Elevated,
}

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Anything that can run a program and hand back its output
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        mode: ExecMode,
        cancel: &CancelToken,
    ) -> Result<CommandOutput>;
}

/// Runs real processes via `std::process`
#[derive(Debug, Clone)]
pub struct SystemRunner {
    elevate_program: String,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self {
            elevate_program: "pkexec".to_string(),
            poll_interval: Duration::from_millis(50),
            timeout: None,
        }
    }
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &crate::AppConfig) -> Self {
        Self {
            elevate_program: config.elevate_program.clone(),
            poll_interval: config.poll_interval,
            timeout: config.timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_elevate_program(mut self, program: impl Into<String>) -> Self {
        self.elevate_program = program.into();
        self
    }

    /// Resolve the binary and argv actually executed for a mode
    pub fn command_line(
        &self,
        program: &str,
        args: &[String],
        mode: ExecMode,
    ) -> (String, Vec<String>) {
        match mode {
            ExecMode::Normal => (program.to_string(), args.to_vec()),
            ExecMode::Elevated => {
                let mut argv = Vec::with_capacity(args.len() + 1);
                argv.push(program.to_string());
                argv.extend_from_slice(args);
                (self.elevate_program.clone(), argv)
            }
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        mode: ExecMode,
        cancel: &CancelToken,
    ) -> Result<CommandOutput> {
        let (bin, argv) = self.command_line(program, args, mode);
        logging::log_query(&bin, &argv, mode == ExecMode::Elevated);

        let mut child = Command::new(&bin)
            .args(&argv)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FindViewError::Spawn {
                program: bin.clone(),
                source,
            })?;

        // Drain both pipes so a chatty child never blocks on a full buffer.
        // Raising `hangup` makes the readers close their ends.
        let hangup = CancelToken::new();
        let stdout_reader = spawn_reader(child.stdout.take(), hangup.clone());
        let stderr_reader = spawn_reader(child.stderr.take(), hangup.clone());

        let started = Instant::now();
        let status = loop {
            if cancel.is_cancelled() {
                terminate(&mut child, &hangup);
                return Err(FindViewError::Cancelled);
            }
            if let Some(limit) = self.timeout {
                if started.elapsed() >= limit {
                    terminate(&mut child, &hangup);
                    return Err(FindViewError::Timeout(limit));
                }
            }
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => thread::sleep(self.poll_interval),
                Err(e) => {
                    terminate(&mut child, &hangup);
                    return Err(e.into());
                }
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();
        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code(),
        };

        logging::debug(
            "RUNNER",
            &format!(
                "{} exited with {:?} after {:?} ({} bytes stdout)",
                bin,
                output.exit_code,
                started.elapsed(),
                output.stdout.len()
            ),
        );

        if mode == ExecMode::Elevated
            && output.stdout.is_empty()
            && output
                .exit_code
                .is_some_and(|c| ELEVATION_DENIED_CODES.contains(&c))
        {
            return Err(FindViewError::ElevationDenied);
        }

        Ok(output)
    }
}

/// Read a pipe to EOF, or until `hangup` is raised. The pipe is dropped on
/// return, so a child still writing to it gets EPIPE.
fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
    hangup: CancelToken,
) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let Some(mut pipe) = pipe else {
            return buf;
        };
        let mut chunk = [0u8; 8192];
        while !hangup.is_cancelled() {
            match pipe.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        buf
    })
}

/// Kill and reap. An elevated child runs as another user and refuses the
/// signal; the readers then hang up so it dies on its next write.
fn terminate(child: &mut Child, hangup: &CancelToken) {
    hangup.cancel();
    match child.kill() {
        Ok(()) => {
            let _ = child.wait();
        }
        Err(e) => logging::warn(
            "RUNNER",
            &format!(
                "Could not kill child {}: {}; closing its output pipes",
                child.id(),
                e
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn elevated_command_line_wraps_program() {
        let runner = SystemRunner::new().with_elevate_program("sudo");
        let args = vec!["/tmp".to_string(), "-empty".to_string()];
        let (bin, argv) = runner.command_line("find", &args, ExecMode::Elevated);
        assert_eq!(bin, "sudo");
        assert_eq!(argv, vec!["find", "/tmp", "-empty"]);

        let (bin, argv) = runner.command_line("find", &args, ExecMode::Normal);
        assert_eq!(bin, "find");
        assert_eq!(argv, args);
    }

    #[test]
    fn captures_stdout_stderr_and_code() {
        let out = SystemRunner::new()
            .run(
                "sh",
                &sh("printf 'a\\nb\\n'; echo oops >&2; exit 3"),
                ExecMode::Normal,
                &CancelToken::new(),
            )
            .unwrap();
        assert_eq!(out.stdout, "a\nb\n");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[test]
    fn large_output_does_not_deadlock() {
        let out = SystemRunner::new()
            .run(
                "sh",
                &sh("i=0; while [ $i -lt 20000 ]; do echo /some/long/path/$i; i=$((i+1)); done"),
                ExecMode::Normal,
                &CancelToken::new(),
            )
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.lines().count(), 20000);
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = SystemRunner::new()
            .run(
                "definitely-not-a-real-binary-findview",
                &[],
                ExecMode::Normal,
                &CancelToken::new(),
            )
            .unwrap_err();
        assert!(matches!(err, FindViewError::Spawn { .. }));
    }

    #[test]
    fn cancel_kills_the_child() {
        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });
        let started = Instant::now();
        let err = SystemRunner::new()
            .run("sleep", &["10".to_string()], ExecMode::Normal, &token)
            .unwrap_err();
        canceller.join().unwrap();
        assert!(matches!(err, FindViewError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn timeout_kills_the_child() {
        let err = SystemRunner::new()
            .with_timeout(Some(Duration::from_millis(200)))
            .run("sleep", &["10".to_string()], ExecMode::Normal, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, FindViewError::Timeout(d) if d == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "Search timed out after 200ms");
    }

    #[test]
    fn hangup_closes_pipe_under_a_writing_child() {
        use std::os::unix::process::ExitStatusExt;

        // `yes` writes forever; only a closed pipe stops it
        let mut child = Command::new("yes")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        let hangup = CancelToken::new();
        let reader = spawn_reader(child.stdout.take(), hangup.clone());
        thread::sleep(Duration::from_millis(50));
        hangup.cancel();
        let read = reader.join().unwrap();
        assert!(!read.is_empty());

        let deadline = Instant::now() + Duration::from_secs(5);
        let status = loop {
            if let Some(status) = child.try_wait().unwrap() {
                break status;
            }
            assert!(Instant::now() < deadline, "child kept running after hangup");
            thread::sleep(Duration::from_millis(10));
        };
        // SIGPIPE, or an EPIPE write error if the signal is ignored
        assert!(status.signal() == Some(13) || !status.success());
    }

    #[test]
    fn terminate_reaps_and_hangs_up() {
        let mut child = Command::new("sleep")
            .arg("10")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let hangup = CancelToken::new();
        terminate(&mut child, &hangup);
        assert!(hangup.is_cancelled());
        // Already reaped, so the status is available right away
        assert!(child.try_wait().unwrap().is_some());
    }

    #[test]
    fn denied_elevation_is_reported() {
        // A helper that behaves like a dismissed pkexec prompt
        let runner = SystemRunner::new().with_elevate_program("sh");
        let err = runner
            .run("-c", &["exit 126".to_string()], ExecMode::Elevated, &CancelToken::new())
            .unwrap_err();
        assert!(matches!(err, FindViewError::ElevationDenied));
    }
}
