use crate::parser::Command;
use crate::shell::ShellState;
use std::env;
use std::path::PathBuf;
use std::process;

/// Checks if the command is a built-in command and, if so, executes it.
/// Supported built-ins are "cd", "status", and "exit".
/// Returns true if the command was built-in and handled; false otherwise.
pub fn handle_builtin(cmd: &Command, state: &mut ShellState) -> bool {
    if cmd.argv.is_empty() {
        return false;
    }
    match cmd.argv[0].as_str() {
        "cd" => {
            change_directory(cmd, state);
            true
        }
        "status" => {
            println!("{}", state.status);
            true
        }
        "exit" => {
            // Any background processes still running get a SIGTERM on the
            // way out.
            state.jobs.reap(false, true);
            process::exit(0);
        }
        _ => false,
    }
}

/// Changes the working directory: to `HOME` with no argument, otherwise to
/// the given path. `PWD` and the shell's own notion of the directory are
/// updated only after a successful change.
fn change_directory(cmd: &Command, state: &mut ShellState) {
    let target = if cmd.argv.len() == 1 {
        env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs_next::home_dir)
    } else {
        Some(PathBuf::from(&cmd.argv[1]))
    };

    let path = match target {
        Some(path) => path,
        None => {
            eprintln!("cd: HOME not set");
            return;
        }
    };

    if let Err(err) = env::set_current_dir(&path) {
        eprintln!("cd: {}: {}", path.display(), err);
        return;
    }
    if let Ok(cwd) = env::current_dir() {
        env::set_var("PWD", &cwd);
        state.current_dir = cwd;
    }
}
