//! Running pip as a supervised subprocess.
//!
//! Each operation gets one reader thread per pipe and one supervising
//! thread that owns the child. Output lines flow to the caller through an
//! unbounded channel as soon as they are complete; the report arrives on a
//! second channel once the child has been reaped.
//!
//! At most one operation runs per environment. A virtual environment is
//! identified by its root, any other interpreter by its canonical path, so
//! every name for the same site-packages shares one slot. The slot is
//! claimed before spawning and released by a guard when the supervisor
//! finishes, whatever the outcome. Besides the in-process set, the guard
//! holds an exclusive lock on a per-environment lock file, which keeps
//! separate pipdesk processes apart too.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use fs4::FileExt;
use tracing::{debug, info, warn};

use super::{OperationReport, OperationState, OperationStatus, PipRequest};
use crate::error::{PipdeskError, Result};
use crate::interpreter::venv::venv_root_for;
use crate::process::{pump_lines, OutputLine, StreamKind};

/// Default number of output lines kept for the report.
pub const DEFAULT_TAIL_LINES: usize = 50;

/// Default time between SIGTERM and a hard kill on cancellation.
pub const DEFAULT_CANCEL_GRACE: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

type RunningSet = Arc<Mutex<HashMap<PathBuf, CancelToken>>>;

/// Starts pip operations and tracks which environments are busy.
///
/// Clones share the same running set.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    running: RunningSet,
    lock_dir: PathBuf,
    tail_lines: usize,
    cancel_grace: Duration,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_TAIL_LINES)
    }
}

impl Orchestrator {
    /// Create an orchestrator that keeps `tail_lines` lines per report.
    pub fn new(tail_lines: usize) -> Self {
        Self {
            running: Arc::default(),
            lock_dir: default_lock_dir(),
            tail_lines,
            cancel_grace: DEFAULT_CANCEL_GRACE,
        }
    }

    /// Keep environment lock files in `dir` instead of the user cache.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = dir.into();
        self
    }

    /// Override the SIGTERM-to-kill grace period.
    pub fn with_cancel_grace(mut self, grace: Duration) -> Self {
        self.cancel_grace = grace;
        self
    }

    /// Whether `python`'s environment has an operation running here.
    pub fn state(&self, python: &Path) -> OperationState {
        if lock(&self.running).contains_key(&environment_key(python)) {
            OperationState::Running
        } else {
            OperationState::Idle
        }
    }

    /// Cancel the operation running for `python`, if there is one.
    pub fn cancel(&self, python: &Path) -> bool {
        match lock(&self.running).get(&environment_key(python)) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Start `request` against `python`.
    ///
    /// Fails with [`PipdeskError::OperationInProgress`] without spawning
    /// anything if `python`'s environment is already busy, in this process
    /// or another.
    pub fn run(&self, python: &Path, request: PipRequest) -> Result<OperationHandle> {
        let cancel = CancelToken::default();
        let guard =
            RunningGuard::claim(&self.running, &self.lock_dir, python, cancel.clone())?;

        let mut command = Command::new(python);
        command
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group so cancellation reaches build subprocesses too.
            command.process_group(0);
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let mut child = command.spawn().map_err(|e| PipdeskError::OperationFailed {
            action: request.action().to_string(),
            package: request.package().to_string(),
            code: None,
            output: vec![format!("failed to start {}: {}", python.display(), e)],
        })?;

        info!(
            "Running pip {} {} with {}",
            request.action(),
            request.target(),
            python.display()
        );

        let (line_tx, line_rx) = mpsc::channel();
        let tail = Arc::new(Mutex::new(VecDeque::with_capacity(self.tail_lines)));
        let mut pumps = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            pumps.push(pump_lines(
                stdout,
                StreamKind::Stdout,
                line_tx.clone(),
                tail_recorder(&tail, self.tail_lines),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(pump_lines(
                stderr,
                StreamKind::Stderr,
                line_tx.clone(),
                tail_recorder(&tail, self.tail_lines),
            ));
        }
        drop(line_tx);

        let (report_tx, report_rx) = mpsc::channel();
        let supervisor_cancel = cancel.clone();
        let grace = self.cancel_grace;
        let supervised = request.clone();

        thread::spawn(move || {
            let status = supervise(&mut child, &supervisor_cancel, grace);
            for pump in pumps {
                let _ = pump.join();
            }
            // Reaped; the interpreter is free again.
            drop(guard);

            let cancelled = supervisor_cancel.is_cancelled();
            let (status, exit_code) = match status {
                Ok(exit) if cancelled && !exit.success() => {
                    (OperationStatus::Cancelled, exit.code())
                }
                Ok(exit) if exit.success() => (OperationStatus::Succeeded, Some(0)),
                Ok(exit) => (OperationStatus::Failed, exit.code()),
                Err(e) => {
                    warn!("Lost track of pip process: {}", e);
                    (OperationStatus::Failed, None)
                }
            };

            let report = OperationReport {
                action: supervised.action(),
                package: supervised.package().to_string(),
                version: supervised.version().map(str::to_string),
                status,
                exit_code,
                tail: lock(&tail).iter().cloned().collect(),
                started_at,
                duration_ms: start.elapsed().as_millis() as u64,
            };
            info!(
                "pip {} {} finished: {:?}",
                report.action, report.package, report.status
            );
            let _ = report_tx.send(report);
        });

        Ok(OperationHandle {
            request,
            lines: line_rx,
            report: report_rx,
            cancel,
            started_at,
        })
    }

    /// Run to completion, handing each line to `on_line` as it arrives.
    pub fn run_streaming<F>(
        &self,
        python: &Path,
        request: PipRequest,
        mut on_line: F,
    ) -> Result<OperationReport>
    where
        F: FnMut(&OutputLine),
    {
        let handle = self.run(python, request)?;
        for line in handle.lines() {
            on_line(&line);
        }
        Ok(handle.wait())
    }
}

/// Wait for the child, escalating from SIGTERM to a kill once cancelled.
fn supervise(
    child: &mut Child,
    cancel: &CancelToken,
    grace: Duration,
) -> std::io::Result<ExitStatus> {
    let mut kill_deadline: Option<Instant> = None;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if cancel.is_cancelled() {
            match kill_deadline {
                None => {
                    debug!("Cancelling pip process {}", child.id());
                    terminate(child);
                    kill_deadline = Some(Instant::now() + grace);
                }
                Some(deadline) if Instant::now() >= deadline => {
                    debug!("pip process {} ignored SIGTERM, killing", child.id());
                    force_kill(child);
                    return child.wait();
                }
                Some(_) => {}
            }
        }

        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    // The child leads its own group; signal the whole group.
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions. The child has not
    // been reaped, so the id still names our process group.
    unsafe {
        libc::kill(-pgid, libc::SIGTERM);
    }
}

#[cfg(unix)]
fn force_kill(child: &mut Child) {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: as in `terminate`.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(not(unix))]
fn force_kill(child: &mut Child) {
    let _ = child.kill();
}

fn tail_recorder(
    tail: &Arc<Mutex<VecDeque<String>>>,
    limit: usize,
) -> impl FnMut(&OutputLine) + Send + 'static {
    let tail = Arc::clone(tail);
    move |line: &OutputLine| {
        if limit == 0 {
            return;
        }
        let mut tail = lock(&tail);
        if tail.len() == limit {
            tail.pop_front();
        }
        tail.push_back(line.display_text());
    }
}

/// The environment `python` installs into.
fn environment_key(python: &Path) -> PathBuf {
    let root = venv_root_for(python);
    let target = root.as_deref().unwrap_or(python);
    fs::canonicalize(target)
        .or_else(|_| std::path::absolute(target))
        .unwrap_or_else(|_| target.to_path_buf())
}

fn default_lock_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pipdesk")
        .join("locks")
}

fn lock_path(lock_dir: &Path, key: &Path) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    lock_dir.join(format!("{:016x}.lock", hasher.finish()))
}

/// Take the environment's lock file, or `None` if another holder has it.
fn try_lock_environment(lock_dir: &Path, key: &Path) -> Result<Option<File>> {
    fs::create_dir_all(lock_dir)?;
    let path = lock_path(lock_dir, key);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(Some(file)),
        Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds an environment's slot in the running set, and its lock file,
/// until dropped.
#[derive(Debug)]
struct RunningGuard {
    running: RunningSet,
    key: PathBuf,
    lock_file: Option<File>,
}

impl RunningGuard {
    fn claim(
        running: &RunningSet,
        lock_dir: &Path,
        python: &Path,
        cancel: CancelToken,
    ) -> Result<Self> {
        let key = environment_key(python);
        let busy = || PipdeskError::OperationInProgress {
            python: python.to_path_buf(),
        };

        let mut running_now = lock(running);
        if running_now.contains_key(&key) {
            return Err(busy());
        }
        let Some(lock_file) = try_lock_environment(lock_dir, &key)? else {
            debug!("{} is locked by another process", key.display());
            return Err(busy());
        };
        running_now.insert(key.clone(), cancel);
        drop(running_now);
        Ok(Self {
            running: Arc::clone(running),
            key,
            lock_file: Some(lock_file),
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        // Closing the file releases the lock.
        drop(self.lock_file.take());
        lock(&self.running).remove(&self.key);
    }
}

/// Requests cancellation of a running operation. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Ask the operation to stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// A running operation.
///
/// Iterate [`lines`](Self::lines) to follow output, then call
/// [`wait`](Self::wait) for the report. Lines that are never read stay
/// queued; none are dropped.
#[derive(Debug)]
pub struct OperationHandle {
    request: PipRequest,
    lines: Receiver<OutputLine>,
    report: Receiver<OperationReport>,
    cancel: CancelToken,
    started_at: chrono::DateTime<Utc>,
}

impl OperationHandle {
    /// The request being run.
    pub fn request(&self) -> &PipRequest {
        &self.request
    }

    /// Output lines in arrival order; ends when both pipes are closed.
    pub fn lines(&self) -> impl Iterator<Item = OutputLine> + '_ {
        self.lines.iter()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the child has been reaped and return its report.
    pub fn wait(self) -> OperationReport {
        match self.report.recv() {
            Ok(report) => report,
            Err(_) => OperationReport {
                action: self.request.action(),
                package: self.request.package().to_string(),
                version: self.request.version().map(str::to_string),
                status: OperationStatus::Failed,
                exit_code: None,
                tail: vec!["operation supervisor exited unexpectedly".to_string()],
                started_at: self.started_at,
                duration_ms: (Utc::now() - self.started_at).num_milliseconds().max(0) as u64,
            },
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::operations::PipAction;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A fake interpreter whose `-m pip ...` behaviour is the given script.
    fn fake_python(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("python");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn orchestrator(temp: &TempDir) -> Orchestrator {
        Orchestrator::default().with_lock_dir(temp.path().join("locks"))
    }

    fn install(package: &str) -> PipRequest {
        PipRequest::new(PipAction::Install, package, None).unwrap()
    }

    #[test]
    fn streams_lines_in_order_and_succeeds() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(
            temp.path(),
            "echo \"args: $*\"\necho 'Collecting flask'\necho 'Successfully installed flask-3.0.0'",
        );

        let handle = orchestrator(&temp).run(&python, install("flask")).unwrap();
        let lines: Vec<_> = handle.lines().map(|l| l.text).collect();
        let report = handle.wait();

        assert_eq!(
            lines,
            [
                "args: -m pip install flask",
                "Collecting flask",
                "Successfully installed flask-3.0.0"
            ]
        );
        assert_eq!(report.status, OperationStatus::Succeeded);
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.tail.len(), 3);
    }

    #[test]
    fn nonzero_exit_is_failed_with_tail() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(
            temp.path(),
            "echo 'Collecting nope'\necho 'ERROR: No matching distribution found for nope' >&2\nexit 1",
        );

        let report = orchestrator(&temp)
            .run_streaming(&python, install("nope"), |_| {})
            .unwrap();
        assert_eq!(report.status, OperationStatus::Failed);
        assert_eq!(report.exit_code, Some(1));
        assert!(report
            .tail
            .iter()
            .any(|l| l == "[stderr] ERROR: No matching distribution found for nope"));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.kind(), "operation_failed");
    }

    #[test]
    fn tail_is_bounded() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "for i in 1 2 3 4 5 6; do echo line$i; done");

        let report = Orchestrator::new(2)
            .with_lock_dir(temp.path().join("locks"))
            .run_streaming(&python, install("x"), |_| {})
            .unwrap();
        assert_eq!(report.tail, ["line5", "line6"]);
    }

    #[test]
    fn second_run_is_rejected_while_busy() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "sleep 1");
        let orchestrator = orchestrator(&temp);

        let first = orchestrator.run(&python, install("a")).unwrap();
        assert_eq!(orchestrator.state(&python), OperationState::Running);

        let err = orchestrator.run(&python, install("b")).unwrap_err();
        assert!(matches!(err, PipdeskError::OperationInProgress { .. }));

        assert!(first.wait().succeeded());
        assert_eq!(orchestrator.state(&python), OperationState::Idle);
        assert!(orchestrator.run(&python, install("b")).unwrap().wait().succeeded());
    }

    #[test]
    fn different_interpreters_run_concurrently() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");
        fs::create_dir_all(&dir_a).unwrap();
        fs::create_dir_all(&dir_b).unwrap();
        let python_a = fake_python(&dir_a, "sleep 1");
        let python_b = fake_python(&dir_b, "true");
        let orchestrator = orchestrator(&temp);

        let a = orchestrator.run(&python_a, install("x")).unwrap();
        let b = orchestrator.run(&python_b, install("x")).unwrap();
        assert!(b.wait().succeeded());
        assert!(a.wait().succeeded());
    }

    #[test]
    fn cancel_terminates_and_reports_cancelled() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "echo started\nsleep 30");
        let orchestrator = orchestrator(&temp).with_cancel_grace(Duration::from_secs(2));

        let handle = orchestrator.run(&python, install("slow")).unwrap();
        let first = handle.lines().next().unwrap();
        assert_eq!(first.text, "started");

        let start = Instant::now();
        handle.cancel();
        let report = handle.wait();
        assert_eq!(report.status, OperationStatus::Cancelled);
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(orchestrator.state(&python), OperationState::Idle);
        assert_eq!(report.into_result().unwrap_err().kind(), "operation_cancelled");
    }

    #[test]
    fn cancel_by_interpreter_path() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "echo started\nsleep 30");
        let orchestrator = orchestrator(&temp).with_cancel_grace(Duration::from_secs(2));

        assert!(!orchestrator.cancel(&python));
        let handle = orchestrator.run(&python, install("slow")).unwrap();
        handle.lines().next().unwrap();

        assert!(orchestrator.cancel(&python));
        assert_eq!(handle.wait().status, OperationStatus::Cancelled);
        assert!(!orchestrator.cancel(&python));
    }

    #[test]
    fn spawn_failure_releases_the_slot() {
        let temp = TempDir::new().unwrap();
        let orchestrator = orchestrator(&temp);
        let missing = Path::new("/no/such/python");
        let err = orchestrator.run(missing, install("x")).unwrap_err();
        assert_eq!(err.kind(), "operation_failed");
        assert_eq!(orchestrator.state(missing), OperationState::Idle);
    }

    #[test]
    fn every_name_for_an_environment_shares_one_slot() {
        let temp = TempDir::new().unwrap();
        let venv = temp.path().join(".venv");
        let bin = venv.join("bin");
        fs::create_dir_all(&bin).unwrap();
        fs::write(venv.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();
        let python = fake_python(&bin, "sleep 1");
        let python3 = bin.join("python3");
        std::os::unix::fs::symlink(&python, &python3).unwrap();
        let orchestrator = orchestrator(&temp);

        let first = orchestrator.run(&python, install("a")).unwrap();
        assert_eq!(orchestrator.state(&python3), OperationState::Running);

        let err = orchestrator.run(&python3, install("b")).unwrap_err();
        assert_eq!(err.kind(), "operation_in_progress");
        assert!(first.wait().succeeded());
    }

    #[test]
    fn symlinked_system_interpreter_shares_one_slot() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "sleep 1");
        let alias = temp.path().join("python-alias");
        std::os::unix::fs::symlink(&python, &alias).unwrap();
        let orchestrator = orchestrator(&temp);

        let first = orchestrator.run(&python, install("a")).unwrap();
        let err = orchestrator.run(&alias, install("b")).unwrap_err();
        assert_eq!(err.kind(), "operation_in_progress");
        assert!(first.wait().succeeded());
    }

    #[test]
    fn lock_file_keeps_separate_orchestrators_apart() {
        let temp = TempDir::new().unwrap();
        let python = fake_python(temp.path(), "sleep 1");
        // Two orchestrators over one lock dir stand in for two processes.
        let first_process = orchestrator(&temp);
        let second_process = orchestrator(&temp);

        let first = first_process.run(&python, install("a")).unwrap();
        assert_eq!(second_process.state(&python), OperationState::Idle);
        let err = second_process.run(&python, install("b")).unwrap_err();
        assert!(matches!(err, PipdeskError::OperationInProgress { .. }));

        assert!(first.wait().succeeded());
        assert!(second_process
            .run(&python, install("b"))
            .unwrap()
            .wait()
            .succeeded());
    }
}
