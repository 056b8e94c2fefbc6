//! End-to-end tests that drive the real shell binary over a pipe, the way
//! the grading scripts drive it: prompt suppressed with `-p`, one command
//! per line, output collected after the shell exits.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::Duration;

const SHELL: &str = env!("CARGO_BIN_EXE_minish");
const SPIN: &str = env!("CARGO_BIN_EXE_spin");
const INTERRUPT: &str = env!("CARGO_BIN_EXE_interrupt");

fn spawn_shell() -> Child {
    Command::new(SHELL)
        .arg("-p")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn shell")
}

fn feed(shell: &mut Child, script: &str) {
    let stdin = shell.stdin.as_mut().expect("shell stdin");
    stdin.write_all(script.as_bytes()).expect("write script");
}

/// Runs the shell, feeds it `script`, and collects its output once it exits.
fn run_script(script: &str) -> Output {
    let mut shell = spawn_shell();
    feed(&mut shell, script);
    shell.wait_with_output().expect("collect shell output")
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

/// Fresh scratch file path for redirection tests.
fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("minish-test-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir.join(name)
}

/// Pulls the pid out of a `background pid is N` announcement.
fn announced_pid(stdout: &str) -> u32 {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("background pid is "))
        .expect("background pid announcement")
        .trim()
        .parse()
        .expect("numeric pid")
}

/// True while `/proc` still shows the process as running (a zombie left for
/// init to collect counts as dead).
fn process_alive(pid: u32) -> bool {
    match fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => !stat.contains(") Z "),
        Err(_) => false,
    }
}

#[test]
fn status_starts_at_exit_value_zero() {
    let out = run_script("status\nexit\n");
    assert!(stdout_of(&out).contains("exit value 0"));
}

#[test]
fn status_reports_last_foreground_exit_code() {
    let out = run_script(&format!("{} 0 7\nstatus\nexit\n", SPIN));
    let stdout = stdout_of(&out);
    assert!(stdout.contains("exit value 7"), "stdout: {stdout}");
}

#[test]
fn status_reports_signal_termination() {
    let out = run_script(&format!("{} 0\nstatus\nexit\n", INTERRUPT));
    let stdout = stdout_of(&out);
    // Printed once as soon as the child dies, once more by `status`.
    assert_eq!(
        stdout.matches("terminated by signal 2").count(),
        2,
        "stdout: {stdout}"
    );
}

#[test]
fn expands_pid_placeholder() {
    let mut shell = spawn_shell();
    let pid = shell.id();
    feed(&mut shell, "echo $$ out-$$-fix\nexit\n");
    let out = shell.wait_with_output().expect("collect shell output");
    let stdout = stdout_of(&out);
    assert!(stdout.contains(&format!("{} out-{}-fix", pid, pid)), "stdout: {stdout}");
}

#[test]
fn redirects_output_to_file() {
    let target = scratch_path("redirect-out.txt");
    let out = run_script(&format!("echo hello > {}\nexit\n", target.display()));
    assert!(out.status.success());
    let written = fs::read_to_string(&target).expect("read redirect target");
    assert_eq!(written, "hello\n");
}

#[test]
fn redirects_input_from_file() {
    let source = scratch_path("redirect-in.txt");
    fs::write(&source, "alpha beta\n").expect("write redirect source");
    let out = run_script(&format!("cat < {}\nexit\n", source.display()));
    let stdout = stdout_of(&out);
    assert!(stdout.contains("alpha beta"), "stdout: {stdout}");
}

#[test]
fn rejects_missing_input_file() {
    let missing = scratch_path("no-such-input.txt");
    let out = run_script(&format!("cat < {}\nstatus\nexit\n", missing.display()));
    let stdout = stdout_of(&out);
    assert!(
        stdout.contains(&format!("cannot open {} for input", missing.display())),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("exit value 1"), "stdout: {stdout}");
}

#[test]
fn reports_unknown_command() {
    let out = run_script("definitely-not-a-command-xyz\nstatus\nexit\n");
    let stdout = stdout_of(&out);
    assert!(
        stdout.contains("definitely-not-a-command-xyz: no such file or directory"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("exit value 1"), "stdout: {stdout}");
}

#[test]
fn comments_and_blank_lines_produce_no_output() {
    let out = run_script("# a comment\n   \n#another > one &\nexit\n");
    assert_eq!(stdout_of(&out), "");
}

#[test]
fn cd_changes_the_working_directory() {
    let dir = scratch_path("cd-target");
    fs::create_dir_all(&dir).expect("create cd target");
    let canonical = dir.canonicalize().expect("canonicalize cd target");
    let out = run_script(&format!("cd {}\npwd\nexit\n", dir.display()));
    let stdout = stdout_of(&out);
    assert!(
        stdout.contains(&canonical.display().to_string()),
        "stdout: {stdout}"
    );
}

#[test]
fn background_job_is_announced_and_reaped_once() {
    // The one-second foreground spin guarantees the background child has
    // exited by the time the next prompt's reap runs.
    let out = run_script(&format!("{spin} 0 0 &\n{spin} 1 0\nstatus\nexit\n", spin = SPIN));
    let stdout = stdout_of(&out);
    let pid = announced_pid(&stdout);
    let done = format!("background pid {} is done: exit value 0", pid);
    assert_eq!(stdout.matches(&done).count(), 1, "stdout: {stdout}");
    assert!(!process_alive(pid));
}

#[test]
fn exit_terminates_outstanding_background_jobs() {
    let out = run_script(&format!("{} 30 0 &\nexit\n", SPIN));
    let stdout = stdout_of(&out);
    let pid = announced_pid(&stdout);
    let mut alive = process_alive(pid);
    for _ in 0..20 {
        if !alive {
            break;
        }
        thread::sleep(Duration::from_millis(100));
        alive = process_alive(pid);
    }
    assert!(!alive, "background pid {} survived exit", pid);
}

#[test]
fn sigtstp_downgrades_background_requests() {
    let mut shell = spawn_shell();
    // Give the shell time to install its handlers before signalling.
    thread::sleep(Duration::from_millis(600));
    kill(Pid::from_raw(shell.id() as i32), Signal::SIGTSTP).expect("send SIGTSTP");
    thread::sleep(Duration::from_millis(300));

    feed(&mut shell, &format!("{} 0 4 &\nstatus\nexit\n", SPIN));
    let out = shell.wait_with_output().expect("collect shell output");
    let stdout = stdout_of(&out);

    assert!(
        stdout.contains("Entering foreground-only mode (& is now ignored)"),
        "stdout: {stdout}"
    );
    // The background request ran in the foreground instead: no pid
    // announcement, and its exit code landed in `status`.
    assert!(!stdout.contains("background pid is"), "stdout: {stdout}");
    assert!(stdout.contains("exit value 4"), "stdout: {stdout}");
}

#[test]
fn sigtstp_toggles_back_out() {
    let mut shell = spawn_shell();
    let pid = Pid::from_raw(shell.id() as i32);
    thread::sleep(Duration::from_millis(600));
    kill(pid, Signal::SIGTSTP).expect("send SIGTSTP");
    thread::sleep(Duration::from_millis(300));
    kill(pid, Signal::SIGTSTP).expect("send SIGTSTP again");
    thread::sleep(Duration::from_millis(300));

    feed(&mut shell, &format!("{} 0 0 &\nexit\n", SPIN));
    let out = shell.wait_with_output().expect("collect shell output");
    let stdout = stdout_of(&out);

    assert!(stdout.contains("Exiting foreground-only mode"), "stdout: {stdout}");
    // Back in normal mode, & is honored again.
    assert!(stdout.contains("background pid is"), "stdout: {stdout}");
}
