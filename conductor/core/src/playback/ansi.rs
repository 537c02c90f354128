//! ANSI Escape Translation
//!
//! Converts the color escapes that generated scripts typically embed in
//! `echo -e` lines into styled segments a surface can render.
//!
//! Recognized introducers, each followed by `[`:
//! a real ESC byte, and the textual spellings `\e`, `\033`, `\x1b`, `\x1B`
//! (scripts usually contain the escape as typed source, not as a byte).
//!
//! Recognized SGR parameters: `32` green, `33` yellow, `36` cyan open a span;
//! `0` or an empty parameter closes the innermost span; `1` (bold) is
//! accepted and dropped. A sequence using anything else is left in the text
//! unchanged.

use serde::{Deserialize, Serialize};

/// Colors a script can switch on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnsiColor {
    /// SGR 32
    Green,
    /// SGR 33
    Yellow,
    /// SGR 36
    Cyan,
}

impl AnsiColor {
    /// The SGR code for this color
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Cyan => 36,
        }
    }
}

/// A run of text with a single color
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// The visible text
    pub text: String,
    /// Innermost open color, if any
    pub color: Option<AnsiColor>,
}

impl Segment {
    fn new(text: impl Into<String>, color: Option<AnsiColor>) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

const INTRODUCERS: [&str; 5] = ["\u{1b}[", "\\e[", "\\033[", "\\x1b[", "\\x1B["];

enum Sgr {
    Open(AnsiColor),
    Close,
    Bold,
}

fn parse_param(param: &str) -> Option<Sgr> {
    match param {
        "" | "0" => Some(Sgr::Close),
        "1" => Some(Sgr::Bold),
        "32" => Some(Sgr::Open(AnsiColor::Green)),
        "33" => Some(Sgr::Open(AnsiColor::Yellow)),
        "36" => Some(Sgr::Open(AnsiColor::Cyan)),
        _ => None,
    }
}

/// Try to read a supported SGR sequence at the start of `rest`
///
/// Returns the parsed codes and the byte length consumed.
fn parse_sequence(rest: &str) -> Option<(Vec<Sgr>, usize)> {
    let introducer = INTRODUCERS.iter().find(|i| rest.starts_with(**i))?;
    let after = &rest[introducer.len()..];

    let params_len = after
        .find(|c: char| !(c.is_ascii_digit() || c == ';'))
        .unwrap_or(after.len());
    if !after[params_len..].starts_with('m') {
        return None;
    }

    let codes = after[..params_len]
        .split(';')
        .map(parse_param)
        .collect::<Option<Vec<_>>>()?;

    Some((codes, introducer.len() + params_len + 1))
}

/// Translate one line into colored segments
///
/// Empty segments are not emitted; a line with no text yields an empty
/// vector. Spans still open at the end of the line are closed implicitly.
#[must_use]
pub fn translate(line: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut stack: Vec<AnsiColor> = Vec::new();
    let mut text = String::new();
    let mut pos = 0;

    let flush = |text: &mut String, stack: &[AnsiColor], segments: &mut Vec<Segment>| {
        if !text.is_empty() {
            segments.push(Segment::new(std::mem::take(text), stack.last().copied()));
        }
    };

    while pos < line.len() {
        let rest = &line[pos..];

        if let Some((codes, consumed)) = parse_sequence(rest) {
            flush(&mut text, &stack, &mut segments);
            for code in codes {
                match code {
                    Sgr::Open(color) => stack.push(color),
                    Sgr::Close => {
                        stack.pop();
                    }
                    Sgr::Bold => {}
                }
            }
            pos += consumed;
            continue;
        }

        // Safe: pos always sits on a char boundary
        let Some(ch) = rest.chars().next() else { break };
        text.push(ch);
        pos += ch.len_utf8();
    }

    flush(&mut text, &stack, &mut segments);
    segments
}
