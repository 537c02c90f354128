//! Line Rendering Rules
//!
//! Decides how a revealed script line is shown. Rules apply in order:
//!
//! 1. a line whose trimmed text starts with the `sleep` command is hidden
//! 2. trimmed text starting with `#` is a comment (muted italic)
//! 3. a line containing `ERROR` is an alert
//! 4. everything else is plain
//!
//! Color escapes are translated independently of the style (see
//! [`super::ansi`]).

use serde::{Deserialize, Serialize};

use super::ansi::{translate, Segment};

/// Prompt glyph shown before every rendered line
pub const PROMPT_GLYPH: &str = "$";

/// Whole-line style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStyle {
    /// Ordinary output
    #[default]
    Plain,
    /// Shell comment
    Comment,
    /// Line mentioning an error
    Alert,
}

/// A line ready for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedLine {
    /// Whole-line style
    pub style: LineStyle,
    /// Colored runs of text
    pub segments: Vec<Segment>,
}

impl RenderedLine {
    /// Visible text with escapes removed
    #[must_use]
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Whether a line is a pacing directive that should not be shown
///
/// `sleep 2` and `  sleep 0.5 # wait` are hidden; `sleepy` and
/// `echo sleep 1` are not.
#[must_use]
pub fn is_suppressed(line: &str) -> bool {
    line.trim()
        .strip_prefix("sleep")
        .is_some_and(|rest| !rest.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Style for a line that is shown
#[must_use]
pub fn line_style(line: &str) -> LineStyle {
    if line.trim().starts_with('#') {
        LineStyle::Comment
    } else if line.contains("ERROR") {
        LineStyle::Alert
    } else {
        LineStyle::Plain
    }
}

/// Render a revealed line, or `None` if it is suppressed
#[must_use]
pub fn render_line(line: &str) -> Option<RenderedLine> {
    if is_suppressed(line) {
        return None;
    }

    Some(RenderedLine {
        style: line_style(line),
        segments: translate(line),
    })
}
