//! Ctrl-C handling for running pip operations.
//!
//! pip runs in its own process group, so the terminal's SIGINT reaches only
//! pipdesk. The handler records the interrupt; [`watch`] turns it into a
//! cancellation of the running operation. An interrupt stays pending until
//! something was actually cancelled, so one that arrives before pip has
//! started still stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

const WATCH_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(unix)]
extern "C" fn on_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the interrupt flag. Idempotent.
#[cfg(unix)]
pub fn install() {
    let handler = on_sigint as extern "C" fn(libc::c_int);
    // SAFETY: the handler only stores to an atomic, which is
    // async-signal-safe.
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
pub fn install() {}

/// The flag the SIGINT handler sets.
pub fn flag() -> &'static AtomicBool {
    &INTERRUPTED
}

/// Record an interrupt as if SIGINT had arrived.
pub fn raise() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Call `on_interrupt` while `flag` is set, until `done` is set.
///
/// `flag` is cleared only once `on_interrupt` returns `true`.
pub fn watch(flag: &AtomicBool, done: &AtomicBool, mut on_interrupt: impl FnMut() -> bool) {
    while !done.load(Ordering::SeqCst) {
        if flag.load(Ordering::SeqCst) && on_interrupt() {
            flag.store(false, Ordering::SeqCst);
        }
        thread::sleep(WATCH_INTERVAL);
    }
}
