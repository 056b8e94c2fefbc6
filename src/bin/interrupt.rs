/*
 * interrupt.rs - Another handy workload for exercising the shell
 *
 * usage: interrupt <secs>
 * Sleeps for <secs> seconds and sends SIGINT to itself. Run in the
 * foreground, it demonstrates signal-terminated status reporting.
 */

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::env;
use std::process;
use std::thread;
use std::time::Duration;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <secs>", args[0]);
        process::exit(0);
    }

    let secs = args[1].parse::<u64>().unwrap_or_else(|_| {
        eprintln!("Error: <secs> must be a non-negative integer");
        process::exit(1);
    });

    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
    }

    let pid = Pid::from_raw(process::id() as i32);

    if let Err(err) = signal::kill(pid, Signal::SIGINT) {
        eprintln!("kill (int) error: {}", err);
    }

    // Only reached if the signal somehow did not terminate us.
    process::exit(1);
}
