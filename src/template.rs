//! Output format templates
//!
//! Templates use brace replacement fields with a single positional argument,
//! the syscall name:
//!
//! - `{}` or `{0}` inserts the name; `{{` and `}}` are literal braces
//! - `{!r}` inserts the quoted name (`'read'`), `{!s}` is the plain name
//! - `{:spec}` applies `[[fill]align][0][width][.precision][s]`, with `<`, `>`
//!   and `^` alignment (strings align left by default); width and precision
//!   are capped at [`MAX_FIELD_SIZE`]
//!
//! A template is parsed once, before any input is read, and rendered once per
//! extracted name. Rendering never fails.

use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

/// Upper bound for a field's width and precision
pub const MAX_FIELD_SIZE: usize = 4096;

/// A parsed format template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    source: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    conversion: Conversion,
    spec: FormatSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Str,
    Repr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Align,
    width: usize,
    precision: Option<usize>,
}

impl Default for FormatSpec {
    fn default() -> Self {
        Self {
            fill: ' ',
            align: Align::Left,
            width: 0,
            precision: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numbering {
    Auto,
    Manual,
}

impl OutputTemplate {
    /// Parse a template string
    ///
    /// Fails on unbalanced braces, named or out-of-range fields, mixed
    /// automatic/manual numbering, unsupported conversions or format specs,
    /// and templates with no replacement field at all.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut numbering: Option<Numbering> = None;
        let mut next_auto = 0usize;
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => bail!("Nested replacement fields are not supported in '{}'", template),
                            c => body.push(c),
                        }
                    }
                    if !closed {
                        if body.is_empty() {
                            bail!("Single '{{' encountered in format string '{}'", template);
                        }
                        bail!("Expected '}}' before end of format string '{}'", template);
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(parse_field(&body, &mut numbering, &mut next_auto)?));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => bail!("Single '}}' encountered in format string '{}'", template),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        if !segments.iter().any(|s| matches!(s, Segment::Field(_))) {
            bail!(
                "Output format '{}' has no replacement field; use '{{}}' where the syscall name goes",
                template
            );
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// Substitute `name` into every replacement field
    pub fn render(&self, name: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + name.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => field.render_into(name, &mut out),
            }
        }
        out
    }

    /// The template as originally written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for OutputTemplate {
    /// `{}`: the name unchanged
    fn default() -> Self {
        Self {
            source: "{}".to_string(),
            segments: vec![Segment::Field(Field {
                conversion: Conversion::Str,
                spec: FormatSpec::default(),
            })],
        }
    }
}

impl FromStr for OutputTemplate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OutputTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Field {
    fn render_into(&self, name: &str, out: &mut String) {
        let value = match self.conversion {
            Conversion::Str => name.to_string(),
            Conversion::Repr => format!("'{}'", name),
        };

        let value: String = match self.spec.precision {
            Some(p) => value.chars().take(p).collect(),
            None => value,
        };

        let len = value.chars().count();
        let pad = self.spec.width.saturating_sub(len);
        let (left, right) = match self.spec.align {
            Align::Left => (0, pad),
            Align::Right => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };

        out.extend(std::iter::repeat_n(self.spec.fill, left));
        out.push_str(&value);
        out.extend(std::iter::repeat_n(self.spec.fill, right));
    }
}

/// Parse the inside of one `{...}` replacement field
fn parse_field(body: &str, numbering: &mut Option<Numbering>, next_auto: &mut usize) -> Result<Field> {
    let name_end = body.find(['!', ':']).unwrap_or(body.len());
    let (name, mut rest) = body.split_at(name_end);

    let index = if name.is_empty() {
        if *numbering == Some(Numbering::Manual) {
            bail!("Cannot switch from manual field specification to automatic field numbering");
        }
        *numbering = Some(Numbering::Auto);
        let index = *next_auto;
        *next_auto += 1;
        index
    } else if name.contains(['.', '[']) {
        bail!("Attribute and index access in field '{}' is not supported", name);
    } else if let Ok(index) = name.parse::<usize>() {
        if *numbering == Some(Numbering::Auto) {
            bail!("Cannot switch from automatic field numbering to manual field specification");
        }
        *numbering = Some(Numbering::Manual);
        index
    } else {
        bail!("Named field '{}' is not supported; use '{{}}' or '{{0}}'", name);
    };

    if index != 0 {
        bail!("Replacement index {} out of range: the only argument is the syscall name", index);
    }

    let mut conversion = Conversion::Str;
    if let Some(after_bang) = rest.strip_prefix('!') {
        let mut conv = after_bang.chars();
        conversion = match conv.next() {
            Some('s') => Conversion::Str,
            Some('r') | Some('a') => Conversion::Repr,
            Some(c) => bail!("Unknown conversion specifier '{}'", c),
            None => bail!("End of format field while looking for conversion specifier"),
        };
        rest = conv.as_str();
        if !rest.is_empty() && !rest.starts_with(':') {
            bail!("Expected ':' after conversion specifier");
        }
    }

    let spec = match rest.strip_prefix(':') {
        Some(spec) => parse_spec(spec)?,
        None => FormatSpec::default(),
    };

    Ok(Field { conversion, spec })
}

fn align_of(c: char) -> Option<Result<Align>> {
    match c {
        '<' => Some(Ok(Align::Left)),
        '>' => Some(Ok(Align::Right)),
        '^' => Some(Ok(Align::Center)),
        '=' => Some(Err(anyhow::anyhow!("'=' alignment not allowed in string format specifier"))),
        _ => None,
    }
}

/// Parse a string format spec: `[[fill]align][0][width][.precision][s]`
fn parse_spec(spec: &str) -> Result<FormatSpec> {
    let chars: Vec<char> = spec.chars().collect();
    let mut out = FormatSpec::default();
    let mut i = 0;
    let mut explicit_align = false;

    if let Some(align) = chars.get(1).and_then(|&c| align_of(c)) {
        out.fill = chars[0];
        out.align = align?;
        explicit_align = true;
        i = 2;
    } else if let Some(align) = chars.first().and_then(|&c| align_of(c)) {
        out.align = align?;
        explicit_align = true;
        i = 1;
    }

    match chars.get(i) {
        Some('+') | Some('-') | Some(' ') => bail!("Sign not allowed in string format specifier"),
        Some('#') => bail!("Alternate form (#) not allowed in string format specifier"),
        Some('0') => {
            if !explicit_align {
                out.fill = '0';
            }
            i += 1;
        }
        _ => {}
    }

    let width_start = i;
    while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
        i += 1;
    }
    if i > width_start {
        out.width = digits(&chars[width_start..i], "width")?;
    }

    if matches!(chars.get(i), Some(',') | Some('_')) {
        bail!("Cannot specify '{}' with 's'", chars[i]);
    }

    if chars.get(i) == Some(&'.') {
        i += 1;
        let precision_start = i;
        while chars.get(i).is_some_and(|c| c.is_ascii_digit()) {
            i += 1;
        }
        if i == precision_start {
            bail!("Format specifier missing precision");
        }
        out.precision = Some(digits(&chars[precision_start..i], "precision")?);
    }

    match &chars[i..] {
        [] | ['s'] => Ok(out),
        [c] => bail!("Unknown format code '{}' for a syscall name", c),
        _ => bail!("Invalid format specifier '{}'", spec),
    }
}

fn digits(chars: &[char], what: &str) -> Result<usize> {
    let s: String = chars.iter().collect();
    let value = s
        .parse::<usize>()
        .map_err(|_| anyhow::anyhow!("Too many decimal digits in format string: {}", s))?;
    if value > MAX_FIELD_SIZE {
        bail!("Format {} {} exceeds the maximum of {}", what, value, MAX_FIELD_SIZE);
    }
    Ok(value)
}
