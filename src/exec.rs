use crate::parser::Command;
use crate::shell::ShellState;
use crate::signals;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, ForkResult, Pid};
use std::ffi::CString;
use std::process;
use std::sync::atomic::Ordering;

const DEV_NULL: &str = "/dev/null";

/// Executes an external command:
/// - forks a child that applies redirections and signal dispositions, then
///   replaces itself with the target program;
/// - in the parent, either registers a background child (printing its pid)
///   or blocks until a foreground child terminates and records how it went.
///
/// A background request is honored only while foreground-only mode is off;
/// otherwise the command is silently run in the foreground.
pub fn execute_command(cmd: &Command, state: &mut ShellState) {
    let background = cmd.background && !state.foreground_only.load(Ordering::SeqCst);

    // Build the exec argv before forking.
    let argv: Vec<CString> = match cmd
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<_, _>>()
    {
        Ok(argv) => argv,
        Err(_) => {
            eprintln!("{}: invalid argument", cmd.argv[0]);
            return;
        }
    };

    match unsafe { fork() } {
        Ok(ForkResult::Child) => run_child(cmd, &argv, background),
        Ok(ForkResult::Parent { child }) => {
            if background {
                state.jobs.register(child);
                println!("background pid is {}", child);
            } else {
                wait_for_foreground(child, state);
            }
        }
        Err(err) => eprintln!("fork error: {}", err),
    }
}

/// Child-side setup and exec. Never returns.
fn run_child(cmd: &Command, argv: &[CString], background: bool) -> ! {
    // Standard input: the user's redirect if given, /dev/null for an
    // unattended background job, the terminal otherwise.
    if let Some(path) = cmd.infile.as_deref() {
        match open(path, OFlag::O_RDONLY, Mode::empty()) {
            Ok(fd) => {
                let _ = dup2(fd, 0);
            }
            Err(_) => {
                println!("cannot open {} for input", path);
                process::exit(1);
            }
        }
    } else if background {
        if let Ok(fd) = open(DEV_NULL, OFlag::O_RDONLY, Mode::empty()) {
            let _ = dup2(fd, 0);
        }
    }

    // Standard output, symmetrically.
    if let Some(path) = cmd.outfile.as_deref() {
        let flags = OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC;
        match open(path, flags, Mode::from_bits_truncate(0o640)) {
            Ok(fd) => {
                let _ = dup2(fd, 1);
            }
            Err(_) => {
                println!("cannot open {} for output", path);
                process::exit(1);
            }
        }
    } else if background {
        if let Ok(fd) = open(DEV_NULL, OFlag::O_WRONLY, Mode::empty()) {
            let _ = dup2(fd, 1);
        }
    }

    if background {
        signals::setup_background_child();
    } else {
        signals::setup_foreground_child();
    }

    if let Err(errno) = execvp(&argv[0], argv) {
        if errno == Errno::ENOENT {
            println!("{}: no such file or directory", cmd.argv[0]);
        } else {
            eprintln!("{}: {}", cmd.argv[0], errno.desc());
        }
    }
    process::exit(1);
}

/// Blocks until the foreground child terminates and records the outcome in
/// `state.status`. SIGTSTP is masked for the duration of the wait so the
/// mode toggle cannot interleave with it.
fn wait_for_foreground(child: Pid, state: &mut ShellState) {
    signals::block_sigtstp();
    let status = loop {
        match waitpid(child, None) {
            Err(Errno::EINTR) => continue,
            other => break other,
        }
    };
    signals::unblock_sigtstp();

    match status {
        Ok(WaitStatus::Exited(_, code)) => {
            state.status = format!("exit value {}", code);
        }
        Ok(WaitStatus::Signaled(_, sig, _)) => {
            state.status = format!("terminated by signal {}", sig as i32);
            // A signal death is reported right away, not just via `status`.
            println!("{}", state.status);
        }
        Ok(_) => {}
        Err(err) => eprintln!("waitpid error: {}", err),
    }
}
