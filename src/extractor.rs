//! System-call name extraction
//!
//! A single regex pass over the raw input bytes. Matching on bytes rather than
//! `str` keeps kernel sources with stray non-UTF-8 bytes readable; the captured
//! identifiers are ASCII by construction.

use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::io::{self, Read, Write};

use crate::models::{InputSource, Syscall};
use crate::template::OutputTemplate;

/// Declaration pattern; group 1 is the identifier after `sys_`
pub const SYSCALL_PATTERN: &str = r"asmlinkage long sys_([a-z0-9_]+)";

/// Finds `asmlinkage long sys_<name>` declarations
pub struct SyscallExtractor {
    regex: Regex,
}

impl SyscallExtractor {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(SYSCALL_PATTERN)
            .with_context(|| format!("Invalid syscall pattern: {}", SYSCALL_PATTERN))?;
        Ok(Self { regex })
    }

    /// Extract every declaration in order of appearance
    ///
    /// Matches are leftmost, non-overlapping and greedy, so `sys_readv` yields
    /// `readv` and never `read`. Duplicates are kept.
    pub fn extract(&self, text: &[u8]) -> Vec<Syscall> {
        let mut syscalls = Vec::new();
        let mut line = 1;
        let mut scanned = 0;

        for caps in self.regex.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            // Line numbers are counted incrementally between matches
            line += text[scanned..whole.start()].iter().filter(|&&b| b == b'\n').count();
            scanned = whole.start();

            syscalls.push(Syscall {
                name: String::from_utf8_lossy(name.as_bytes()).into_owned(),
                line,
                offset: whole.start(),
            });
        }

        log::debug!("Extracted {} syscall declarations from {} bytes", syscalls.len(), text.len());
        syscalls
    }

    /// Identifier names only, in match order
    pub fn names(&self, text: &[u8]) -> Vec<String> {
        self.extract(text).into_iter().map(|s| s.name).collect()
    }
}

/// Read the whole input source into memory
pub fn read_input(source: &InputSource) -> Result<Vec<u8>> {
    match source {
        InputSource::Stdin => {
            log::info!("Reading input from stdin");
            let mut buf = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
        InputSource::File(path) => {
            log::info!("Reading input file {}", path.display());
            std::fs::read(path)
                .with_context(|| format!("Failed to read input file '{}'", path.display()))
        }
    }
}

/// Read `input` fully, extract every syscall name and write one rendered line
/// per name to `out`
///
/// Returns the number of lines written. Zero matches is not an error.
pub fn run<R: Read, W: Write>(mut input: R, template: &OutputTemplate, mut out: W) -> Result<usize> {
    let mut text = Vec::new();
    input.read_to_end(&mut text).context("Failed to read input")?;

    let extractor = SyscallExtractor::new()?;
    let syscalls = extractor.extract(&text);
    write_lines(&syscalls, template, &mut out)?;

    Ok(syscalls.len())
}

/// Render each syscall through the template, one line each
pub fn write_lines<W: Write>(syscalls: &[Syscall], template: &OutputTemplate, out: &mut W) -> io::Result<()> {
    for syscall in syscalls {
        writeln!(out, "{}", template.render(&syscall.name))?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        SyscallExtractor::new().unwrap().names(text.as_bytes())
    }

    #[test]
    fn test_single_declaration() {
        assert_eq!(names("asmlinkage long sys_read(int fd)"), vec!["read"]);
    }

    #[test]
    fn test_order_is_preserved() {
        let text = "asmlinkage long sys_open(...)\nasmlinkage long sys_close(...)";
        assert_eq!(names(text), vec!["open", "close"]);
    }

    #[test]
    fn test_no_matches() {
        assert!(names("int main(void) { return 0; }").is_empty());
        assert!(names("").is_empty());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let text = "asmlinkage long sys_read(void);\nasmlinkage long sys_read(void);";
        assert_eq!(names(text), vec!["read", "read"]);
    }

    #[test]
    fn test_greedy_capture() {
        assert_eq!(names("asmlinkage long sys_readv(...)"), vec!["readv"]);
        assert_eq!(names("asmlinkage long sys_rt_sigaction(int)"), vec!["rt_sigaction"]);
        assert_eq!(names("asmlinkage long sys_wait4(pid_t)"), vec!["wait4"]);
    }

    #[test]
    fn test_uppercase_after_prefix_does_not_match() {
        assert!(names("asmlinkage long sys_Foo(void)").is_empty());
    }

    #[test]
    fn test_capture_stops_at_uppercase() {
        assert_eq!(names("asmlinkage long sys_fOo(void)"), vec!["f"]);
    }

    #[test]
    fn test_prefix_must_be_exact() {
        assert!(names("asmlinkage int sys_read(void)").is_empty());
        assert!(names("asmlinkage  long sys_read(void)").is_empty());
        assert!(names("asmlinkage long\nsys_read(void)").is_empty());
        assert!(names("asmlinkage long compat_sys_read(void)").is_empty());
    }

    #[test]
    fn test_adjacent_matches() {
        let text = "asmlinkage long sys_aasmlinkage long sys_b";
        // The first capture swallows the second declaration's keyword
        assert_eq!(names(text), vec!["aasmlinkage"]);

        let text = "asmlinkage long sys_a;asmlinkage long sys_b";
        assert_eq!(names(text), vec!["a", "b"]);
    }

    #[test]
    fn test_line_numbers_and_offsets() {
        let text = "/* header */\n\nasmlinkage long sys_open(void);\nasmlinkage long sys_close(void);\n";
        let syscalls = SyscallExtractor::new().unwrap().extract(text.as_bytes());
        assert_eq!(syscalls.len(), 2);
        assert_eq!(syscalls[0].line, 3);
        assert_eq!(syscalls[0].offset, 14);
        assert_eq!(syscalls[1].line, 4);
        assert_eq!(&text[syscalls[1].offset..syscalls[1].offset + 10], "asmlinkage");
    }

    #[test]
    fn test_non_utf8_input() {
        let mut text = b"\xff\xfe garbage\n".to_vec();
        text.extend_from_slice(b"asmlinkage long sys_ioctl(unsigned int fd);");
        let syscalls = SyscallExtractor::new().unwrap().extract(&text);
        assert_eq!(syscalls.len(), 1);
        assert_eq!(syscalls[0].name, "ioctl");
        assert_eq!(syscalls[0].line, 2);
    }

    #[test]
    fn test_run_default_template() {
        let input = "asmlinkage long sys_open(...)\nasmlinkage long sys_close(...)";
        let mut out = Vec::new();
        let count = run(input.as_bytes(), &OutputTemplate::default(), &mut out).unwrap();
        assert_eq!(count, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "open\nclose\n");
    }

    #[test]
    fn test_run_custom_template() {
        let input = "asmlinkage long sys_open(...)\nasmlinkage long sys_close(...)";
        let template = OutputTemplate::parse("SYS_{}").unwrap();
        let mut out = Vec::new();
        run(input.as_bytes(), &template, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SYS_open\nSYS_close\n");
    }

    #[test]
    fn test_run_zero_matches_writes_nothing() {
        let mut out = Vec::new();
        let count = run("nothing here".as_bytes(), &OutputTemplate::default(), &mut out).unwrap();
        assert_eq!(count, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_is_repeatable() {
        let input = "asmlinkage long sys_read(void);\nasmlinkage long sys_write(void);";
        let template = OutputTemplate::parse("__NR_{}").unwrap();
        let mut first = Vec::new();
        let mut second = Vec::new();
        run(input.as_bytes(), &template, &mut first).unwrap();
        run(input.as_bytes(), &template, &mut second).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_input_missing_file() {
        let source = InputSource::File("/nonexistent/syscalls.h".into());
        let err = read_input(&source).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/syscalls.h"));
    }
}
