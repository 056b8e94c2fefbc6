use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// Ordered collection of outstanding background process ids.
///
/// Entries are appended when a background command is launched and removed
/// once the process is observed to have terminated. Scanning always visits
/// entries in registration order.
pub struct BackgroundJobs {
    pids: Vec<Pid>,
}

impl BackgroundJobs {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        BackgroundJobs { pids: Vec::new() }
    }

    /// Records a freshly launched background process.
    pub fn register(&mut self, pid: Pid) {
        self.pids.push(pid);
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Performs a non-blocking wait on every registered process, in
    /// registration order.
    ///
    /// Terminated processes are removed; with `verbose` their pid and
    /// termination cause are reported first. With `kill_all`, processes that
    /// are still running get a SIGTERM followed by one more non-blocking wait
    /// attempt; their entries are kept, since `kill_all` is only used on the
    /// way out of the shell.
    ///
    /// Called once before each prompt as `reap(true, false)` and once at
    /// shell exit as `reap(false, true)`.
    pub fn reap(&mut self, verbose: bool, kill_all: bool) {
        if self.pids.is_empty() {
            return;
        }
        self.pids.retain(|&pid| {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => {
                    if kill_all {
                        let _ = kill(pid, Signal::SIGTERM);
                        let _ = waitpid(pid, Some(WaitPidFlag::WNOHANG));
                    }
                    true
                }
                Ok(WaitStatus::Exited(_, code)) => {
                    if verbose {
                        println!("background pid {} is done: exit value {}", pid, code);
                    }
                    false
                }
                Ok(WaitStatus::Signaled(_, sig, _)) => {
                    if verbose {
                        println!(
                            "background pid {} is done: terminated by signal {}",
                            pid, sig as i32
                        );
                    }
                    false
                }
                // Stopped or continued: still ours, check again next time.
                Ok(_) => true,
                // Already collected elsewhere; nothing left to track.
                Err(_) => false,
            }
        });
    }
}
