//! User-facing diagnostics on stderr
//!
//! Plain colored messages without log noise (timestamps, levels, module
//! paths). Stdout is reserved for extracted names.

use crossterm::tty::IsTty;
use owo_colors::OwoColorize;

fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stderr().is_tty()
}

/// Display a warning message to the user in yellow with padding
///
/// # Example
/// ```ignore
/// output::warn("--pretty has no effect without --json");
/// ```
pub fn warn(message: &str) {
    if use_colors() {
        eprintln!("\n{}\n", message.yellow());
    } else {
        eprintln!("\n{}\n", message);
    }
}

/// Display an error message to the user in red with padding
///
/// # Example
/// ```ignore
/// output::error("Error: Failed to read input file 'syscalls.h'");
/// ```
pub fn error(message: &str) {
    if use_colors() {
        eprintln!("\n{}\n", message.red());
    } else {
        eprintln!("\n{}\n", message);
    }
}
