//! Concept Card Widget
//!
//! Shows a generated OS concept: name and codename, the wrapped philosophy,
//! the system specs, features, packages and the boot screen art (verbatim,
//! never wrapped).

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Widget};

use nexus_core::OsConcept;

use crate::theme;

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(theme::NEXUS_VIOLET)
            .add_modifier(Modifier::BOLD),
    ))
}

fn spec_row(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<8} "), Style::default().fg(theme::DIM_GRAY)),
        Span::styled(value.to_string(), Style::default().fg(theme::INPUT_TEXT)),
    ])
}

/// Lay out a concept for a panel `width` columns wide
pub fn concept_lines(concept: &OsConcept, width: usize) -> Vec<Line<'static>> {
    let width = width.max(10);
    let text = Style::default().fg(theme::INPUT_TEXT);
    let mut lines = vec![
        Line::from(Span::styled(
            concept.os_name.clone(),
            Style::default()
                .fg(theme::NEXUS_CYAN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("\"{}\"", concept.codename),
            Style::default()
                .fg(theme::NEXUS_VIOLET)
                .add_modifier(Modifier::ITALIC),
        )),
        Line::default(),
    ];

    for row in textwrap::wrap(&concept.philosophy, width) {
        lines.push(Line::from(Span::styled(row.into_owned(), text)));
    }

    lines.push(Line::default());
    lines.push(heading("System"));
    lines.push(spec_row("Kernel", &concept.kernel_version));
    lines.push(spec_row("Desktop", &concept.desktop_environment));
    lines.push(spec_row("Shell", &concept.default_shell));

    lines.push(Line::default());
    lines.push(heading("Key Features"));
    let options = textwrap::Options::new(width)
        .initial_indent("- ")
        .subsequent_indent("  ");
    for feature in &concept.key_features {
        for row in textwrap::wrap(feature, &options) {
            lines.push(Line::from(Span::styled(row.into_owned(), text)));
        }
    }

    lines.push(Line::default());
    lines.push(heading("Default Packages"));
    for row in textwrap::wrap(&concept.default_packages.join(", "), width) {
        lines.push(Line::from(Span::styled(row.into_owned(), text)));
    }

    lines.push(Line::default());
    lines.push(heading("Boot Screen"));
    for row in concept.boot_screen_ascii.split('\n') {
        lines.push(Line::from(Span::styled(
            row.to_string(),
            Style::default().fg(theme::PROMPT_GREEN),
        )));
    }

    lines
}

/// The concept panel
pub struct ConceptView<'a> {
    concept: Option<&'a OsConcept>,
    block: Option<Block<'a>>,
    placeholder: &'a str,
}

impl<'a> ConceptView<'a> {
    /// View over the current concept, if any
    pub fn new(concept: Option<&'a OsConcept>) -> Self {
        Self {
            concept,
            block: None,
            placeholder: "",
        }
    }

    /// Surround with a block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Dim text shown while there is no concept
    pub fn placeholder(mut self, text: &'a str) -> Self {
        self.placeholder = text;
        self
    }
}

impl Widget for ConceptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
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

        let Some(concept) = self.concept else {
            buf.set_string(
                inner.x,
                inner.y,
                self.placeholder,
                Style::default().fg(theme::DIM_GRAY),
            );
            return;
        };

        for (i, line) in concept_lines(concept, inner.width as usize)
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}
