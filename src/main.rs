//! syscall-list CLI entrypoint

use clap::Parser;

use syscall_list::cli::Cli;
use syscall_list::output;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        output::error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
