//! CLI argument parsing and command handling

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::extractor::{read_input, write_lines, SyscallExtractor};
use crate::models::{ExtractReport, InputSource};
use crate::output;
use crate::template::OutputTemplate;

/// syscall-list: extract Linux system-call names from kernel sources
#[derive(Parser, Debug)]
#[command(
    name = "syscall-list",
    version,
    about = "Extract system-call names declared as `asmlinkage long sys_<name>`",
    long_about = "Reads one kernel source file (usually include/linux/syscalls.h), finds every \
                  `asmlinkage long sys_<name>` declaration and prints each <name> through a \
                  format template, one line per declaration, in order of appearance.\n\n\
                  Examples:\n  \
                  syscall-list include/linux/syscalls.h\n  \
                  syscall-list -f '#define SYS_{0} __NR_{0}' syscalls.h\n  \
                  syscall-list -f 'SYS_{}' - < syscalls.h"
)]
pub struct Cli {
    /// Enable verbose logging (can be repeated for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Kernel source file to scan (`-` or omitted reads stdin)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output template; `{}` is replaced by each syscall name
    ///
    /// Supports `{{`/`}}` escapes, `{0}`, `{!r}` and string format specs
    /// such as `{:>20}` or `{:.8}`. The template is checked before the input
    /// is read, so a malformed one fails even when nothing matches.
    #[arg(short = 'f', long = "output-format", value_name = "FORMAT", default_value = "{}")]
    pub output_format: String,

    /// Output an extraction report as JSON (names, lines, byte offsets)
    #[arg(long, conflicts_with = "count")]
    pub json: bool,

    /// Pretty-print JSON output (only with --json)
    #[arg(long)]
    pub pretty: bool,

    /// Print only the number of declarations found
    #[arg(short, long)]
    pub count: bool,
}

/// What to write to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Lines,
    Count,
    Json { pretty: bool },
}

impl Cli {
    /// Execute the extraction
    pub fn execute(self) -> Result<()> {
        // Setup logging based on verbosity
        let log_level = match self.verbose {
            0 => "warn",   // Default: only warnings and errors
            1 => "info",   // -v: show info messages
            2 => "debug",  // -vv: show debug messages
            _ => "trace",  // -vvv: show trace messages
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();

        // Parsed before any input is read so a bad template fails even on empty input
        let template = OutputTemplate::parse(&self.output_format)
            .context("Invalid --output-format")?;
        log::debug!("Using output template '{}'", template);

        if self.pretty && !self.json {
            output::warn("--pretty has no effect without --json");
        }

        let mode = if self.json {
            OutputMode::Json { pretty: self.pretty }
        } else if self.count {
            OutputMode::Count
        } else {
            OutputMode::Lines
        };

        let source = InputSource::from_arg(self.file.as_deref());
        handle_extract(&source, &template, mode)
    }
}

/// Read, extract and write in one pass
fn handle_extract(source: &InputSource, template: &OutputTemplate, mode: OutputMode) -> Result<()> {
    log::info!("Scanning {}", source);

    let text = read_input(source)?;
    let extractor = SyscallExtractor::new()?;
    let syscalls = extractor.extract(&text);

    if syscalls.is_empty() {
        log::info!("No syscall declarations found in {}", source);
    } else {
        log::info!("Found {} syscall declarations in {}", syscalls.len(), source);
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let written = match mode {
        OutputMode::Lines => write_lines(&syscalls, template, &mut out),
        OutputMode::Count => writeln!(out, "{}", syscalls.len()).and_then(|_| out.flush()),
        OutputMode::Json { pretty } => {
            let report = ExtractReport::new(source, syscalls);
            let json_str = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            writeln!(out, "{}", json_str).and_then(|_| out.flush())
        }
    };

    match written {
        // Downstream closed early (e.g. `| head`); nothing left to report
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("Stdout closed early: {}", e);
            Ok(())
        }
        other => other.context("Failed to write output"),
    }
}
