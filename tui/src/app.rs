//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for orchestration
//! - DisplayState for rendering
//!
//! The App:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use nexus_core::{ConductorState, LlmBackend, NotifyLevel, SurfaceType};

use crate::conductor_client::ConductorClient;
use crate::display::{DisplayNotification, DisplayState};
use crate::theme;
use crate::widgets::{ConceptView, ScrollState, TerminalView};

/// Prompt box height, borders included
const INPUT_HEIGHT: u16 = 3;

/// Lines moved by one mouse wheel notch
const WHEEL_LINES: usize = 3;

/// What a submitted input line asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCommand {
    /// Plain text: becomes the prompt, then generate
    Submit(String),
    /// `/attach <path>...`
    Attach(Vec<PathBuf>),
    /// `/detach`
    Detach,
    /// `/build`
    Build,
    /// `/save [dir]`
    Save(Option<PathBuf>),
    /// `/quit`
    Quit,
    /// A command used wrongly; carries the usage hint
    Usage(&'static str),
    /// Anything else starting with `/`
    Unknown(String),
}

/// Interpret a submitted input line
pub fn parse_input(input: &str) -> InputCommand {
    let trimmed = input.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return InputCommand::Submit(input.to_string());
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match name {
        "attach" if args.is_empty() => InputCommand::Usage("/attach <path>..."),
        "attach" => InputCommand::Attach(args.into_iter().map(PathBuf::from).collect()),
        "detach" => InputCommand::Detach,
        "build" => InputCommand::Build,
        "save" => InputCommand::Save(args.first().map(PathBuf::from)),
        "quit" | "exit" => InputCommand::Quit,
        _ => InputCommand::Unknown(trimmed.to_string()),
    }
}

/// Main application state
pub struct App<B: LlmBackend + 'static = Box<dyn LlmBackend>> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<B>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === Input State ===
    /// Text being edited
    input_buffer: String,
    /// Last prompt sent to the Conductor
    prompt: String,
    /// Terminal panel scroll
    terminal_scroll: ScrollState,

    // === Misc State ===
    /// Terminal size
    size: (u16, u16),
}

impl<B: LlmBackend + 'static> App<B> {
    /// Create a new App around a client
    pub fn new(conductor: ConductorClient<B>, size: (u16, u16)) -> Self {
        Self {
            running: true,
            conductor,
            display: DisplayState::new(),
            input_buffer: String::new(),
            prompt: String::new(),
            terminal_scroll: ScrollState::default(),
            size,
        }
    }

    /// Start the Conductor and connect as the TUI surface
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await?;
        self.conductor.connect(SurfaceType::Tui).await?;
        self.tick();
        Ok(())
    }

    /// Seed the prompt and attachments from the command line
    pub async fn preload(&mut self, prompt: Option<String>, files: Vec<PathBuf>) -> anyhow::Result<()> {
        if let Some(prompt) = prompt {
            self.conductor.set_prompt(prompt.clone()).await?;
            self.prompt = prompt;
        }
        if !files.is_empty() {
            self.conductor.attach(files).await?;
        }
        self.tick();
        Ok(())
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // ~30 FPS keeps 20 ms reveal gaps readable without busy rendering
        let frame_duration = Duration::from_millis(33);

        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();

        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| self.draw(frame))?;

        if let Err(e) = self.connect().await {
            tracing::warn!("Conductor start error: {}", e);
        }

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event).await,
                        Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                        None => self.running = false,
                    }
                }

                // Frame tick
                _ = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            // Apply finished backend calls, drain messages, advance playback
            self.poll().await;

            // Render
            terminal.draw(|frame| self.draw(frame))?;

            // Check for quit message
            if matches!(self.display.conductor_state, ConductorState::ShuttingDown) {
                self.running = false;
            }

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Drain Conductor messages and advance timers
    pub fn tick(&mut self) {
        for msg in self.conductor.recv_all() {
            self.display.apply_message(msg);
        }
        self.display.update();
    }

    /// Apply finished work and refresh display state without waiting
    pub async fn poll(&mut self) {
        self.conductor.poll_pending().await;
        self.tick();
    }

    /// Wait for the backend call in flight, then refresh display state
    pub async fn settle(&mut self) {
        self.conductor.wait_pending().await;
        self.tick();
    }

    /// Dispatch one terminal event
    pub async fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(w, h) => self.size = (w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    pub async fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let result = match key.code {
            // Quit
            KeyCode::Esc => self.quit().await,
            KeyCode::Char('c') if ctrl => self.quit().await,

            KeyCode::Char('b') if ctrl => self.conductor.build().await,
            KeyCode::Char('s') if ctrl => self.conductor.export(None).await,

            // Submit prompt or command
            KeyCode::Enter => {
                let input = std::mem::take(&mut self.input_buffer);
                self.submit(input).await
            }

            // Typing
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                Ok(())
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                Ok(())
            }

            // Terminal scrolling
            KeyCode::PageUp => {
                self.terminal_scroll.scroll_up(self.page_size());
                Ok(())
            }
            KeyCode::PageDown => {
                self.terminal_scroll.scroll_down(self.page_size());
                Ok(())
            }
            KeyCode::End if ctrl => {
                self.terminal_scroll.follow();
                Ok(())
            }

            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::warn!("Failed to handle key: {}", e);
        }
    }

    /// Handle mouse input
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.terminal_scroll.scroll_up(WHEEL_LINES),
            MouseEventKind::ScrollDown => self.terminal_scroll.scroll_down(WHEEL_LINES),
            _ => {}
        }
    }

    async fn submit(&mut self, input: String) -> anyhow::Result<()> {
        match parse_input(&input) {
            InputCommand::Submit(text) => {
                if !text.trim().is_empty() {
                    self.conductor.set_prompt(text.clone()).await?;
                    self.prompt = text;
                }
                self.conductor.generate().await
            }
            InputCommand::Attach(paths) => self.conductor.attach(paths).await,
            InputCommand::Detach => self.conductor.clear_files().await,
            InputCommand::Build => self.conductor.build().await,
            InputCommand::Save(dir) => self.conductor.export(dir).await,
            InputCommand::Quit => self.quit().await,
            InputCommand::Usage(usage) => {
                self.local_notice(NotifyLevel::Warning, format!("Usage: {usage}"));
                Ok(())
            }
            InputCommand::Unknown(command) => {
                self.local_notice(
                    NotifyLevel::Warning,
                    format!("Unknown command {command} (try /attach, /detach, /build, /save, /quit)"),
                );
                Ok(())
            }
        }
    }

    async fn quit(&mut self) -> anyhow::Result<()> {
        self.conductor.request_quit().await?;
        self.tick();
        self.running = false;
        Ok(())
    }

    fn local_notice(&mut self, level: NotifyLevel, message: String) {
        self.display.notification = Some(DisplayNotification::new(level, message));
    }

    fn page_size(&self) -> usize {
        (self.size.1.saturating_sub(INPUT_HEIGHT + 4) / 2).max(1) as usize
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Text in the prompt box
    pub fn input(&self) -> &str {
        &self.input_buffer
    }

    /// Last prompt sent to the Conductor
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Goodbye message for display after the TUI closes
    pub fn goodbye(&self) -> Option<&str> {
        self.display.goodbye.as_deref()
    }

    /// Render one frame
    pub fn draw(&mut self, frame: &mut Frame<'_>) {
        let area = frame.area();
        self.size = (area.width, area.height);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(INPUT_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_input(frame, rows[0]);
        self.draw_files(frame, rows[1]);
        self.draw_error(frame, rows[2]);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[3]);

        self.draw_concept(frame, panels[0]);
        self.draw_terminal(frame, panels[1]);
        self.draw_status(frame, rows[4]);
    }

    fn panel(title: String) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER_GRAY))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::NEXUS_CYAN)
                    .add_modifier(Modifier::BOLD),
            ))
    }

    fn draw_input(&self, frame: &mut Frame<'_>, area: Rect) {
        let width = area.width.saturating_sub(4) as usize;
        let line = if self.input_buffer.is_empty() && !self.prompt.is_empty() {
            Line::from(vec![
                Span::styled("> ", Style::default().fg(theme::PROMPT_GREEN)),
                Span::styled(
                    format!("{} (Enter to regenerate)", self.prompt),
                    Style::default().fg(theme::DIM_GRAY),
                ),
            ])
        } else {
            // Keep the cursor end in view
            let text = format!("{}_", self.input_buffer);
            let skip = text.chars().count().saturating_sub(width);
            Line::from(vec![
                Span::styled("> ", Style::default().fg(theme::PROMPT_GREEN)),
                Span::styled(
                    text.chars().skip(skip).collect::<String>(),
                    Style::default().fg(theme::INPUT_TEXT),
                ),
            ])
        };

        frame.render_widget(
            Paragraph::new(line).block(Self::panel(" Describe your OS ".to_string())),
            area,
        );
    }

    fn draw_files(&self, frame: &mut Frame<'_>, area: Rect) {
        let text = if self.display.files.is_empty() {
            "Files: none (/attach <path>)".to_string()
        } else {
            let labels: Vec<String> = self.display.files.iter().map(|f| f.label()).collect();
            format!("Files: {}", labels.join(", "))
        };
        frame.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::DIM_GRAY))),
            area,
        );
    }

    fn draw_error(&self, frame: &mut Frame<'_>, area: Rect) {
        if let Some(ref error) = self.display.error {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    error.clone(),
                    Style::default().fg(theme::ERROR_RED),
                ))
                .wrap(Wrap { trim: true }),
                area,
            );
        }
    }

    fn draw_concept(&self, frame: &mut Frame<'_>, area: Rect) {
        let placeholder = match self.display.conductor_state {
            ConductorState::Generating => "Generating concept...",
            _ => "Describe an OS and press Enter.",
        };
        frame.render_widget(
            ConceptView::new(self.display.concept.as_ref())
                .block(Self::panel(" Concept ".to_string()))
                .placeholder(placeholder),
            area,
        );
    }

    fn draw_terminal(&mut self, frame: &mut Frame<'_>, area: Rect) {
        let title = match self.display.codename {
            Some(ref codename) => format!(" Build: {codename} "),
            None => " Build Output ".to_string(),
        };
        let block = Self::panel(title);

        if !self.display.has_script() {
            let hint = match self.display.conductor_state {
                ConductorState::Building => "Generating build script...",
                _ if self.display.concept.is_some() => "Press Ctrl+B to generate a build script.",
                _ => "",
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, Style::default().fg(theme::DIM_GRAY)))
                    .block(block),
                area,
            );
            return;
        }

        let lines = self.display.terminal_lines();
        frame.render_stateful_widget(
            TerminalView::new(&lines)
                .block(block)
                .cursor(self.display.is_playing()),
            area,
            &mut self.terminal_scroll,
        );
    }

    fn draw_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let state = self.display.conductor_state;
        let state_style = if state.is_busy() {
            Style::default().fg(theme::WARNING_AMBER)
        } else {
            Style::default().fg(theme::DIM_GRAY)
        };

        let mut spans = vec![Span::styled(format!(" {}", state.description()), state_style)];

        if let Some(ref notification) = self.display.notification {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                notification.message.clone(),
                Style::default().fg(theme::notify_color(notification.level)),
            ));
        } else if let Some(ref path) = self.display.saved_path {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("Saved {}", path.display()),
                Style::default().fg(theme::SUCCESS_GREEN),
            ));
        }

        if !self.terminal_scroll.is_following() {
            spans.push(Span::styled(
                format!(" [^{} lines - PgDn to scroll]", self.terminal_scroll.offset),
                Style::default().fg(theme::DIM_GRAY),
            ));
        }

        spans.push(Span::styled(
            " | Enter generate  Ctrl+B build  Ctrl+S save  Esc quit",
            Style::default().fg(theme::DIM_GRAY),
        ));

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_submits() {
        assert_eq!(
            parse_input("An OS for astronomers"),
            InputCommand::Submit("An OS for astronomers".to_string())
        );
        assert_eq!(parse_input(""), InputCommand::Submit(String::new()));
    }

    #[test]
    fn test_attach_takes_paths() {
        assert_eq!(
            parse_input("/attach notes.md  ideas.txt"),
            InputCommand::Attach(vec![PathBuf::from("notes.md"), PathBuf::from("ideas.txt")])
        );
        assert_eq!(parse_input("/attach"), InputCommand::Usage("/attach <path>..."));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_input("/detach"), InputCommand::Detach);
        assert_eq!(parse_input("  /build "), InputCommand::Build);
        assert_eq!(parse_input("/save"), InputCommand::Save(None));
        assert_eq!(
            parse_input("/save out"),
            InputCommand::Save(Some(PathBuf::from("out")))
        );
        assert_eq!(parse_input("/quit"), InputCommand::Quit);
        assert_eq!(parse_input("/exit"), InputCommand::Quit);
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_input("/launch rockets"),
            InputCommand::Unknown("/launch rockets".to_string())
        );
    }
}
