//! Core data models for syscall-list
//!
//! These structures are the normalized output of one extraction run, shared by
//! the plain-text and JSON output modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single `asmlinkage long sys_<name>` declaration found in the input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Syscall {
    /// Identifier after the `sys_` prefix (`[a-z0-9_]+`)
    pub name: String,
    /// Line of the `asmlinkage` keyword (1-indexed)
    pub line: usize,
    /// Byte offset of the `asmlinkage` keyword
    pub offset: usize,
}

/// Where the input text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` and an absent path both mean standard input
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => InputSource::Stdin,
            Some(p) if p.as_os_str() == "-" => InputSource::Stdin,
            Some(p) => InputSource::File(p.to_path_buf()),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Result of one extraction run, as emitted by `--json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractReport {
    /// Input file path, or `<stdin>`
    pub source: String,
    pub count: usize,
    pub syscalls: Vec<Syscall>,
}

impl ExtractReport {
    pub fn new(source: &InputSource, syscalls: Vec<Syscall>) -> Self {
        Self {
            source: source.to_string(),
            count: syscalls.len(),
            syscalls,
        }
    }
}
