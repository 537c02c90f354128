//! Headless Surface
//!
//! Non-interactive mode: generate a concept from the command-line prompt and
//! files, print it, optionally build and replay the script with real ANSI
//! colors at playback pace, and optionally save it. Uses the same embedded
//! Conductor as the TUI.

use std::path::PathBuf;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use nexus_core::playback::PROMPT_GLYPH;
use nexus_core::{
    ConductorMessage, LineStyle, LlmBackend, NotifyLevel, OsConcept, RenderedLine, SurfaceType,
};

use crate::conductor_client::ConductorClient;
use crate::display::DisplayState;

const RESET: &str = "\u{1b}[0m";

/// What the headless run should do beyond generating a concept
#[derive(Clone, Debug, Default)]
pub struct HeadlessOptions {
    /// Initial prompt
    pub prompt: Option<String>,
    /// Context files
    pub files: Vec<PathBuf>,
    /// Also generate and replay the build script
    pub build: bool,
    /// Also write the script artifact
    pub save: bool,
    /// Wrap width for the concept text
    pub width: usize,
}

/// Results of a headless run
#[derive(Clone, Debug, Default)]
pub struct HeadlessOutcome {
    /// The generated concept
    pub concept: Option<OsConcept>,
    /// Lines printed by the replay, escapes included
    pub replayed_lines: usize,
    /// Where the script was saved
    pub saved: Option<PathBuf>,
}

/// SGR prefix for a whole-line style
fn style_prefix(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Plain => "",
        LineStyle::Comment => "\u{1b}[2;3m",
        LineStyle::Alert => "\u{1b}[31m",
    }
}

/// Render a line for a real terminal
pub fn ansi_line(line: &RenderedLine) -> String {
    let base = style_prefix(line.style);
    let mut out = format!("\u{1b}[32m{PROMPT_GLYPH}{RESET} {base}");
    for segment in &line.segments {
        match segment.color {
            Some(color) => {
                out.push_str(&format!("\u{1b}[{}m{}{RESET}{base}", color.code(), segment.text));
            }
            None => out.push_str(&segment.text),
        }
    }
    out.push_str(RESET);
    out
}

/// Plain-text concept card
pub fn format_concept(concept: &OsConcept, width: usize) -> String {
    let width = width.max(20);
    let mut out = format!("{}  \"{}\"\n\n", concept.os_name, concept.codename);
    for row in textwrap::wrap(&concept.philosophy, width) {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str(&format!(
        "\nKernel:   {}\nDesktop:  {}\nShell:    {}\n\nKey Features:\n",
        concept.kernel_version, concept.desktop_environment, concept.default_shell
    ));
    let options = textwrap::Options::new(width)
        .initial_indent("  - ")
        .subsequent_indent("    ");
    for feature in &concept.key_features {
        for row in textwrap::wrap(feature, &options) {
            out.push_str(&row);
            out.push('\n');
        }
    }
    out.push_str("\nDefault Packages:\n");
    let options = textwrap::Options::new(width)
        .initial_indent("  ")
        .subsequent_indent("  ");
    for row in textwrap::wrap(&concept.default_packages.join(", "), &options) {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str("\nBoot Screen:\n");
    out.push_str(&concept.boot_screen_ascii);
    out.push('\n');
    out
}

/// Drives the Conductor to completion and writes to `out`
pub struct HeadlessRunner<B: LlmBackend + 'static, W> {
    conductor: ConductorClient<B>,
    display: DisplayState,
    out: W,
}

impl<B: LlmBackend + 'static, W: AsyncWrite + Unpin> HeadlessRunner<B, W> {
    /// Create a runner writing to `out`
    pub fn new(conductor: ConductorClient<B>, out: W) -> Self {
        Self {
            conductor,
            display: DisplayState::new(),
            out,
        }
    }

    /// Give back the writer
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the whole flow
    ///
    /// A generation failure ends the run with the user-facing message as
    /// the error.
    pub async fn run(&mut self, options: HeadlessOptions) -> anyhow::Result<HeadlessOutcome> {
        let mut outcome = HeadlessOutcome::default();

        self.conductor.start().await?;
        self.conductor.connect(SurfaceType::Headless).await?;
        if let Some(prompt) = options.prompt {
            self.conductor.set_prompt(prompt).await?;
        }
        if !options.files.is_empty() {
            self.conductor.attach(options.files).await?;
        }
        self.drain().await?;

        self.conductor.generate().await?;
        self.conductor.wait_pending().await;
        self.drain().await?;

        let Some(concept) = self.display.concept.clone() else {
            anyhow::bail!("No concept was generated");
        };
        self.out
            .write_all(format_concept(&concept, options.width).as_bytes())
            .await?;
        outcome.concept = Some(concept);

        if options.build {
            self.conductor.build().await?;
            self.conductor.wait_pending().await;
            self.drain().await?;
            self.out.write_all(b"\n").await?;
            outcome.replayed_lines = self.replay().await?;
        }

        if options.save {
            self.conductor.export(None).await?;
            self.drain().await?;
            outcome.saved = self.display.saved_path.clone();
        }

        self.conductor.request_quit().await?;
        self.drain().await?;
        self.out.flush().await?;
        Ok(outcome)
    }

    /// Apply Conductor messages, echoing notifications
    async fn drain(&mut self) -> anyhow::Result<()> {
        for msg in self.conductor.recv_all() {
            match msg {
                ConductorMessage::Error { ref message } => {
                    let message = message.clone();
                    self.display.apply_message(msg);
                    anyhow::bail!(message);
                }
                ConductorMessage::Notify { level, ref message } => {
                    let prefix = match level {
                        NotifyLevel::Info | NotifyLevel::Success => "::",
                        NotifyLevel::Warning => "warning:",
                        NotifyLevel::Error => "error:",
                    };
                    let text = format!("{prefix} {message}\n");
                    self.out.write_all(text.as_bytes()).await?;
                }
                _ => {}
            }
            self.display.apply_message(msg);
        }
        Ok(())
    }

    /// Print lines as they are revealed; returns how many were printed
    async fn replay(&mut self) -> anyhow::Result<usize> {
        let mut printed = 0;
        while self.display.player_mut().next_change().await {
            let lines = self.display.terminal_lines();
            for line in &lines[printed..] {
                self.out.write_all(ansi_line(line).as_bytes()).await?;
                self.out.write_all(b"\n").await?;
            }
            self.out.flush().await?;
            printed = lines.len();
        }
        Ok(printed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::playback::render_line;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_line_has_green_prompt() {
        let line = render_line("echo hi").unwrap();
        assert_eq!(ansi_line(&line), "\u{1b}[32m$\u{1b}[0m echo hi\u{1b}[0m");
    }

    #[test]
    fn test_textual_escape_becomes_real_color() {
        let line = render_line(r"echo -e '\033[36mcyan\033[0m'").unwrap();
        let out = ansi_line(&line);
        assert!(out.contains("\u{1b}[36mcyan\u{1b}[0m"));
        assert!(!out.contains(r"\033"));
    }

    #[test]
    fn test_comment_is_dim_italic() {
        let line = render_line("# Phase 2").unwrap();
        assert!(ansi_line(&line).contains("\u{1b}[2;3m# Phase 2"));
    }

    #[test]
    fn test_concept_card_layout() {
        let concept = OsConcept {
            os_name: "Quillix".to_string(),
            codename: "Inkwell Dawn".to_string(),
            philosophy: "Words first.".to_string(),
            kernel_version: "6.9.1".to_string(),
            desktop_environment: "Sway".to_string(),
            default_shell: "Fish".to_string(),
            key_features: vec!["Focus mode".to_string()],
            default_packages: vec!["vim".to_string(), "pandoc".to_string()],
            boot_screen_ascii: " Q \n---".to_string(),
        };
        let card = format_concept(&concept, 80);
        assert!(card.starts_with("Quillix  \"Inkwell Dawn\"\n"));
        assert!(card.contains("Shell:    Fish\n"));
        assert!(card.contains("  - Focus mode\n"));
        assert!(card.contains("  vim, pandoc\n"));
        assert!(card.ends_with("Boot Screen:\n Q \n---\n"));
    }
}
