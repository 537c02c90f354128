//! Terminal Panel Widget
//!
//! Draws revealed script lines as a shell session: every line starts with
//! the prompt glyph, comments are muted italic, alerts are red, and color
//! spans from the script keep their color. Long lines wrap at the panel
//! width, preferring whitespace and breaking words only when they do not fit.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, StatefulWidget, Widget};
use unicode_width::UnicodeWidthChar;

use nexus_core::playback::PROMPT_GLYPH;
use nexus_core::RenderedLine;

use super::scroll::ScrollState;
use crate::theme;

/// Convert a rendered script line to a styled ratatui line
pub fn to_line(line: &RenderedLine) -> Line<'static> {
    let base = theme::line_style(line.style);
    let mut spans = Vec::with_capacity(line.segments.len() + 1);
    spans.push(Span::styled(
        format!("{PROMPT_GLYPH} "),
        Style::default().fg(theme::PROMPT_GREEN),
    ));
    for segment in &line.segments {
        let style = match segment.color {
            Some(color) => base.fg(theme::ansi_color(color)),
            None => base,
        };
        spans.push(Span::styled(segment.text.clone(), style));
    }
    Line::from(spans)
}

/// Split a styled line into rows no wider than `width` columns
///
/// Breaks after the last whitespace that fits, or mid-word when a word is
/// wider than the row. Whitespace at a break is dropped.
pub fn wrap_line(line: &Line<'_>, width: usize) -> Vec<Line<'static>> {
    let cells: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| {
            let style = line.style.patch(span.style);
            span.content.chars().map(move |c| (c, style))
        })
        .collect();
    if width == 0 || cells.is_empty() {
        return vec![Line::default()];
    }

    let mut rows = Vec::new();
    let mut start = 0;
    while start < cells.len() {
        let mut used = 0;
        let mut end = start;
        while end < cells.len() {
            let w = cells[end].0.width().unwrap_or(0);
            if used + w > width {
                break;
            }
            used += w;
            end += 1;
        }
        if end == start {
            // A single glyph wider than the row
            end += 1;
        }

        let mut next = end;
        if end < cells.len() && !cells[end].0.is_whitespace() {
            if let Some(space) = (start + 1..end).rev().find(|&i| cells[i].0.is_whitespace()) {
                end = space;
                next = space;
            }
        }
        rows.push(styled_row(&cells[start..end]));

        start = next;
        while start < cells.len() && cells[start].0.is_whitespace() {
            start += 1;
        }
    }
    rows
}

/// Group consecutive cells of equal style into spans
fn styled_row(cells: &[(char, Style)]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut text = String::new();
    let mut current: Option<Style> = None;
    for &(c, style) in cells {
        if current.is_some_and(|s| s != style) {
            spans.push(Span::styled(std::mem::take(&mut text), current.unwrap_or_default()));
        }
        current = Some(style);
        text.push(c);
    }
    if !text.is_empty() {
        spans.push(Span::styled(text, current.unwrap_or_default()));
    }
    Line::from(spans)
}

/// The simulated terminal
pub struct TerminalView<'a> {
    lines: &'a [RenderedLine],
    block: Option<Block<'a>>,
    cursor: bool,
}

impl<'a> TerminalView<'a> {
    /// View over the revealed lines
    pub fn new(lines: &'a [RenderedLine]) -> Self {
        Self {
            lines,
            block: None,
            cursor: false,
        }
    }

    /// Surround with a block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show a blinking prompt after the last line
    pub fn cursor(mut self, cursor: bool) -> Self {
        self.cursor = cursor;
        self
    }
}

impl StatefulWidget for TerminalView<'_> {
    type State = ScrollState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let mut rows: Vec<Line<'static>> = self
            .lines
            .iter()
            .flat_map(|line| wrap_line(&to_line(line), width))
            .collect();
        if self.cursor {
            rows.push(Line::from(vec![
                Span::styled(
                    format!("{PROMPT_GLYPH} "),
                    Style::default().fg(theme::PROMPT_GREEN),
                ),
                Span::styled(
                    "_",
                    Style::default()
                        .fg(theme::TERMINAL_TEXT)
                        .add_modifier(Modifier::SLOW_BLINK),
                ),
            ]));
        }

        state.set_viewport(inner.height as usize);
        state.set_total(rows.len());

        for (i, row) in rows[state.visible_range()].iter().enumerate() {
            let y = inner.y + i as u16;
            buf.set_line(inner.x, y, row, inner.width);
        }
    }
}
