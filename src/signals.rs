use nix::sys::signal::{self, SigHandler, SigSet, SigmaskHow, Signal};
use signal_hook::{consts::signal::SIGTSTP, iterator::Signals};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Installs the shell's own signal dispositions:
/// - SIGINT is ignored process-wide, so Ctrl-C only reaches foreground
///   children (which restore the default disposition before exec).
/// - SIGTSTP toggles foreground-only mode. signal-hook routes the signal over
///   its internal self-pipe to a dedicated thread, so the toggle and its
///   message never run in async-signal context; `foreground_only` is the only
///   datum shared with the main loop.
pub fn install_signal_handlers(foreground_only: Arc<AtomicBool>) {
    unsafe {
        let _ = signal::signal(Signal::SIGINT, SigHandler::SigIgn);
    }

    let mut signals =
        Signals::new(&[SIGTSTP]).expect("Unable to create signal handler");
    thread::spawn(move || {
        for _ in signals.forever() {
            let entering = !foreground_only.fetch_xor(true, Ordering::SeqCst);
            let message = if entering {
                "Entering foreground-only mode (& is now ignored)\n"
            } else {
                "Exiting foreground-only mode\n"
            };
            let mut out = io::stdout();
            let _ = out.write_all(message.as_bytes());
            let _ = out.flush();
        }
    });
}

/// Dispositions for a forked foreground child, applied before exec:
/// Ctrl-C regains its default effect, Ctrl-Z is ignored.
pub fn setup_foreground_child() {
    unsafe {
        let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal::signal(Signal::SIGTSTP, SigHandler::SigIgn);
    }
}

/// Dispositions for a forked background child, applied before exec:
/// the parent's mode toggling must not affect it. SIGINT stays ignored,
/// inherited from the shell.
pub fn setup_background_child() {
    unsafe {
        let _ = signal::signal(Signal::SIGTSTP, SigHandler::SigIgn);
    }
}

/// Blocks SIGTSTP in the calling thread for the duration of a foreground
/// wait, so the mode toggle cannot interleave with wait bookkeeping.
pub fn block_sigtstp() {
    mask_sigtstp(SigmaskHow::SIG_BLOCK);
}

/// Undoes [`block_sigtstp`] once the foreground wait has completed.
pub fn unblock_sigtstp() {
    mask_sigtstp(SigmaskHow::SIG_UNBLOCK);
}

fn mask_sigtstp(how: SigmaskHow) {
    let mut set = SigSet::empty();
    set.add(Signal::SIGTSTP);
    let _ = signal::pthread_sigmask(how, Some(&set), None);
}
