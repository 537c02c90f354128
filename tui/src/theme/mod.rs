//! Theme and Colors
//!
//! The Nexus palette: a dark console look with a phosphor-green terminal
//! panel and cool accents for the concept card.

use ratatui::style::{Color, Modifier, Style};

use nexus_core::playback::AnsiColor;
use nexus_core::{LineStyle, NotifyLevel};

// ============================================================================
// Accents
// ============================================================================

/// Headings and the OS name
pub const NEXUS_CYAN: Color = Color::Rgb(94, 234, 212);

/// Codename and secondary headings
pub const NEXUS_VIOLET: Color = Color::Rgb(167, 139, 250);

/// Panel borders
pub const BORDER_GRAY: Color = Color::Rgb(75, 85, 99);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Prompt input text
pub const INPUT_TEXT: Color = Color::Rgb(229, 231, 235);

// ============================================================================
// Terminal Panel
// ============================================================================

/// The `$` glyph
pub const PROMPT_GREEN: Color = Color::Rgb(74, 222, 128);

/// Plain script output
pub const TERMINAL_TEXT: Color = Color::Rgb(209, 213, 219);

/// `#` comment lines
pub const COMMENT_GRAY: Color = Color::Rgb(107, 114, 128);

/// Lines mentioning ERROR
pub const ALERT_RED: Color = Color::Rgb(248, 113, 113);

/// SGR 32
pub const ANSI_GREEN: Color = Color::Rgb(74, 222, 128);

/// SGR 33
pub const ANSI_YELLOW: Color = Color::Rgb(250, 204, 21);

/// SGR 36
pub const ANSI_CYAN: Color = Color::Rgb(34, 211, 238);

// ============================================================================
// Status
// ============================================================================

/// Error red
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Warning amber
pub const WARNING_AMBER: Color = Color::Rgb(251, 191, 36);

/// Success green
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Base style for a terminal line
pub fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Plain => Style::default().fg(TERMINAL_TEXT),
        LineStyle::Comment => Style::default()
            .fg(COMMENT_GRAY)
            .add_modifier(Modifier::ITALIC),
        LineStyle::Alert => Style::default().fg(ALERT_RED),
    }
}

/// Foreground for a script color span
pub fn ansi_color(color: AnsiColor) -> Color {
    match color {
        AnsiColor::Green => ANSI_GREEN,
        AnsiColor::Yellow => ANSI_YELLOW,
        AnsiColor::Cyan => ANSI_CYAN,
    }
}

/// Foreground for a notification
pub fn notify_color(level: NotifyLevel) -> Color {
    match level {
        NotifyLevel::Info => NEXUS_CYAN,
        NotifyLevel::Warning => WARNING_AMBER,
        NotifyLevel::Error => ERROR_RED,
        NotifyLevel::Success => SUCCESS_GREEN,
    }
}
