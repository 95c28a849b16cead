//! syscall-list: extract Linux system-call names from kernel sources
//!
//! Scans one kernel source file for `asmlinkage long sys_<name>` declarations
//! and prints each `<name>` through a format template, in order of appearance.
//!
//! # Architecture
//!
//! - **Extractor**: one regex pass over the raw input bytes
//! - **Template**: brace replacement fields rendered once per name
//! - **CLI**: argument parsing, logging setup and output modes
//!
//! # Example Usage
//!
//! ```
//! use syscall_list::{run, OutputTemplate};
//!
//! let input = "asmlinkage long sys_open(...);\nasmlinkage long sys_close(...);";
//! let template = OutputTemplate::parse("SYS_{}").unwrap();
//! let mut out = Vec::new();
//! let count = run(input.as_bytes(), &template, &mut out).unwrap();
//!
//! assert_eq!(count, 2);
//! assert_eq!(String::from_utf8(out).unwrap(), "SYS_open\nSYS_close\n");
//! ```

pub mod cli;
pub mod extractor;
pub mod models;
pub mod output;
pub mod template;

// Re-export commonly used types
pub use extractor::{read_input, run, SyscallExtractor, SYSCALL_PATTERN};
pub use models::{ExtractReport, InputSource, Syscall};
pub use template::OutputTemplate;
