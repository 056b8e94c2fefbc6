use nix::unistd::getpid;
use once_cell::sync::Lazy;

/// Token that marks a command for background execution when it is the
/// final token on the line.
pub const BACKGROUND_TOKEN: &str = "&";
/// Input redirection operator.
pub const INPUT_REDIRECT: &str = "<";
/// Output redirection operator.
pub const OUTPUT_REDIRECT: &str = ">";
/// Placeholder expanded to the shell's process id.
const PID_PLACEHOLDER: &str = "$$";

/// Decimal PID of the shell process, computed once on first use.
static SHELL_PID: Lazy<String> = Lazy::new(|| getpid().to_string());

/// Represents a parsed command.
#[derive(Debug, Default)]
pub struct Command {
    /// Command and its arguments; `argv[0]` is the command name.
    pub argv: Vec<String>,
    /// Input redirection file, if any.
    pub infile: Option<String>,
    /// Output redirection file, if any.
    pub outfile: Option<String>,
    /// True if the line ended with a standalone `&`.
    pub background: bool,
    /// True for blank lines and comments; such commands are never executed.
    pub ignored: bool,
}

/// Parses one line of input (without its trailing newline) into a [`Command`].
/// This function handles:
///
/// - Tokenization on runs of whitespace (no quoting, tokens are literal)
/// - `$$` expansion in every token, the command name included
/// - Comment lines (first token starting with `#`) and blank lines
/// - A trailing `&` marking background execution
/// - Input redirection (`<`) and output redirection (`>`) at the tail of
///   the argument list
///
/// Parsing never fails: malformed input degrades to literal argv entries or
/// to an ignored command.
pub fn parse_command_line(cmdline: &str) -> Command {
    parse_with_pid(cmdline, &SHELL_PID)
}

fn parse_with_pid(cmdline: &str, pid: &str) -> Command {
    let mut cmd = Command::default();
    let mut argv: Vec<String> = cmdline
        .split_whitespace()
        .map(|token| expand_pid(token, pid))
        .collect();

    if argv.is_empty() {
        cmd.ignored = true;
        return cmd;
    }

    // Comment lines are ignored wholesale, even if more tokens follow.
    if argv[0].starts_with('#') {
        cmd.ignored = true;
        cmd.argv = argv;
        return cmd;
    }

    // A lone "&" is a command named "&", not a background marker.
    if argv.len() >= 2 && argv.last().map(String::as_str) == Some(BACKGROUND_TOKEN) {
        cmd.background = true;
        argv.pop();
    }

    // Redirection operators are only recognized as the final one or two
    // operator+target pairs; anywhere else they pass through to the program.
    // Whichever operator sits nearer the end is primary, and only then is the
    // other one sought two slots further back.
    if argv.len() >= 3 {
        let op = argv.len() - 2;
        if argv[op] == INPUT_REDIRECT {
            cmd.infile = Some(argv[op + 1].clone());
            argv.drain(op..);
            if op >= 3 && argv[op - 2] == OUTPUT_REDIRECT {
                cmd.outfile = Some(argv[op - 1].clone());
                argv.drain(op - 2..);
            }
        } else if argv[op] == OUTPUT_REDIRECT {
            cmd.outfile = Some(argv[op + 1].clone());
            argv.drain(op..);
            if op >= 3 && argv[op - 2] == INPUT_REDIRECT {
                cmd.infile = Some(argv[op - 1].clone());
                argv.drain(op - 2..);
            }
        }
    }

    cmd.argv = argv;
    cmd
}

/// Replaces every occurrence of `$$` in `token` with `pid`, scanning left to
/// right. Replaced regions are not rescanned.
fn expand_pid(token: &str, pid: &str) -> String {
    token.replace(PID_PLACEHOLDER, pid)
}
