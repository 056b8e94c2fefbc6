use crate::builtins::handle_builtin;
use crate::exec::execute_command;
use crate::jobs::BackgroundJobs;
use crate::parser::parse_command_line;
use crate::signals;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Global prompt string.
pub static PROMPT: &str = ": ";

/// Process-wide shell state, one instance for the lifetime of the program.
pub struct ShellState {
    /// Description of the most recent foreground command's termination.
    pub status: String,
    /// The shell's notion of its working directory, mirrored into `PWD`.
    pub current_dir: PathBuf,
    /// Outstanding background processes.
    pub jobs: BackgroundJobs,
    /// Flipped by the SIGTSTP handler thread; the only datum mutated outside
    /// the main flow, hence the atomic.
    pub foreground_only: Arc<AtomicBool>,
}

impl ShellState {
    pub fn new() -> Self {
        ShellState {
            status: String::from("exit value 0"),
            current_dir: env::current_dir().unwrap_or_default(),
            jobs: BackgroundJobs::new(),
            foreground_only: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Runs the main shell loop: reaps finished background processes, prints the
/// prompt (if enabled), reads input, parses it, and evaluates commands.
///
/// - `emit_prompt`: if true, prints the command prompt.
/// - `verbose`: if true, echoes each received command line.
pub fn run_shell(emit_prompt: bool, verbose: bool) {
    let mut state = ShellState::new();
    env::set_var("PWD", &state.current_dir);
    signals::install_signal_handlers(state.foreground_only.clone());

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Error initializing input: {}", err);
            return;
        }
    };

    loop {
        state.jobs.reap(true, false);

        let prompt = if emit_prompt { PROMPT } else { "" };
        let cmdline = match editor.readline(prompt) {
            Ok(line) => line,
            // An interrupted read behaves like an empty line.
            Err(ReadlineError::Interrupted) => String::new(),
            // End of input: clean up the same way the exit built-in does.
            Err(ReadlineError::Eof) => {
                state.jobs.reap(false, true);
                break;
            }
            Err(err) => {
                eprintln!("Error reading input: {}", err);
                state.jobs.reap(false, true);
                break;
            }
        };

        if verbose && !cmdline.trim().is_empty() {
            println!("Received command: {}", cmdline.trim());
        }

        let cmd = parse_command_line(&cmdline);
        if cmd.ignored {
            continue;
        }
        if !handle_builtin(&cmd, &mut state) {
            execute_command(&cmd, &mut state);
        }
    }
}
