//! Captured command execution with a deadline.

use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How often a running child is polled while waiting on a deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    /// Exit status of the child.
    pub status: ExitStatus,

    /// Standard output (lossy UTF-8).
    pub stdout: String,

    /// Standard error (lossy UTF-8).
    pub stderr: String,

    /// Wall-clock time until exit.
    pub duration: Duration,
}

impl CapturedOutput {
    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// stdout followed by stderr.
    pub fn combined(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Failure to run a command to completion.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The program could not be started.
    #[error("failed to start: {0}")]
    Spawn(std::io::Error),

    /// The program did not exit before the deadline and was killed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// Waiting on the child failed.
    #[error("failed to wait for process: {0}")]
    Wait(std::io::Error),
}

/// Run `program` with `args`, capturing both streams.
///
/// With a `timeout`, the child is killed once the deadline passes and
/// [`ProcessError::TimedOut`] is returned. Without one, this waits for as long
/// as the child runs.
pub fn run_captured<I, S>(
    program: &Path,
    args: I,
    timeout: Option<Duration>,
) -> Result<CapturedOutput, ProcessError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let start = Instant::now();

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(ProcessError::Spawn)?;

    // Both pipes are drained concurrently so a chatty child cannot fill one
    // and block while we wait on the other.
    let stdout_handle = drain(child.stdout.take());
    let stderr_handle = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => wait_with_deadline(&mut child, start + limit).map_err(|e| match e {
            WaitError::Expired => ProcessError::TimedOut(limit),
            WaitError::Io(io) => ProcessError::Wait(io),
        })?,
        None => child.wait().map_err(ProcessError::Wait)?,
    };

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();

    Ok(CapturedOutput {
        status,
        stdout,
        stderr,
        duration: start.elapsed(),
    })
}

enum WaitError {
    Expired,
    Io(std::io::Error),
}

fn wait_with_deadline(child: &mut Child, deadline: Instant) -> Result<ExitStatus, WaitError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => return Err(WaitError::Io(e)),
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WaitError::Expired);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut reader) = stream {
            let _ = reader.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
