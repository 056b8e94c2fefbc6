use std::process;

pub fn print_usage() {
    println!("Usage: minish [-hvp]");
    println!("   -h   Print this help message");
    println!("   -v   Echo each command line as it is received");
    println!("   -p   Do not print a command prompt");
    process::exit(1);
}
