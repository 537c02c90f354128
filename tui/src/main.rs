//! Nexus Entry Point
//!
//! Launches the terminal UI (or the headless runner) for the Nexus OS
//! generator.
//!
//! Usage:
//!   nexus [OPTIONS]
//!
//! Run `nexus --help` for the option list.

use std::fs::{self, OpenOptions};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nexus_core::{load_config_from_path, ConfigOverrides, NexusConfig, Provider};
use nexus_tui::{App, ConductorClient, HeadlessOptions, HeadlessRunner};

/// Default log directives when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "nexus=info,nexus_core=info,nexus_tui=info";

/// Describe an operating system, get a concept and a (simulated) build
#[derive(Parser, Debug)]
#[command(name = "nexus", version, about, long_about = None)]
struct Args {
    /// Initial prompt
    #[arg(short, long)]
    prompt: Option<String>,

    /// Attach a context file (repeatable)
    #[arg(short, long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Config file path
    #[arg(short, long, env = "NEXUS_CONFIG")]
    config: Option<PathBuf>,

    /// AI provider (gemini or ollama)
    #[arg(long)]
    provider: Option<Provider>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Where exported scripts are written
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Generate and print without the TUI
    #[arg(long)]
    headless: bool,

    /// (headless) Also generate and replay the build script
    #[arg(long, requires = "headless")]
    build: bool,

    /// (headless) Also save the build script
    #[arg(long, requires = "build")]
    save: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(provider) = self.provider {
            overrides = overrides.with_provider(provider);
        }
        if let Some(ref model) = self.model {
            overrides = overrides.with_model(model.clone());
        }
        if let Some(ref dir) = self.output_dir {
            overrides = overrides.with_output_dir(dir.clone());
        }
        overrides
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log to stderr (headless) or to a file under the cache dir (TUI)
///
/// The TUI owns the alternate screen, so anything written to the terminal
/// would corrupt it.
fn init_logging(headless: bool) -> anyhow::Result<Option<PathBuf>> {
    if headless {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(io::stderr),
            )
            .with(env_filter())
            .init();
        return Ok(None);
    }

    let Some(dir) = dirs::cache_dir().map(|d| d.join("nexus")) else {
        // Nowhere to write; stay silent rather than draw over the UI
        return Ok(None);
    };
    fs::create_dir_all(&dir)?;
    let path = dir.join("nexus.log");
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .init();
    Ok(Some(path))
}

fn load_config(args: &Args) -> anyhow::Result<NexusConfig> {
    let mut config = load_config_from_path(args.config.clone())?;
    args.overrides().apply(&mut config);
    config.validate()?;
    tracing::info!(
        provider = %config.provider,
        model = config.effective_model(),
        source = %config.source(),
        "Configuration loaded"
    );
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_path = init_logging(args.headless)?;
    let config = load_config(&args)?;

    if args.headless {
        return run_headless(args, &config).await;
    }

    // Check if we have a TTY before attempting initialization
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: nexus requires a terminal (TTY)");
        eprintln!();
        eprintln!("This usually means:");
        eprintln!("  - Running in a non-interactive environment (CI, container)");
        eprintln!("  - SSH without -t flag");
        eprintln!("  - Piped stdin/stdout");
        eprintln!();
        eprintln!("For scripted use, try: nexus --headless --prompt \"...\"");
        std::process::exit(1);
    }

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Restore terminal before printing panic
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the app
    let result = run_app(&mut terminal, args, &config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Some(path) = log_path {
        tracing::debug!(log = %path.display(), "Session ended");
    }

    // Propagate any errors
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    args: Args,
    config: &NexusConfig,
) -> anyhow::Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(ConductorClient::from_config(config), (size.width, size.height));
    app.preload(args.prompt, args.files).await?;
    app.run(terminal).await?;

    // Show goodbye message after TUI closes
    if let Some(goodbye) = app.goodbye() {
        println!("\n\x1b[36mNexus:\x1b[0m {goodbye}\n");
    }

    Ok(())
}

async fn run_headless(args: Args, config: &NexusConfig) -> anyhow::Result<()> {
    let width = crossterm::terminal::size().map_or(80, |(w, _)| usize::from(w).min(100));
    let options = HeadlessOptions {
        prompt: args.prompt,
        files: args.files,
        build: args.build,
        save: args.save,
        width,
    };

    let mut runner = HeadlessRunner::new(ConductorClient::from_config(config), tokio::io::stdout());
    let outcome = runner.run(options).await?;
    tracing::info!(
        concept = outcome.concept.as_ref().map(|c| c.os_name.as_str()),
        lines = outcome.replayed_lines,
        "Headless run finished"
    );
    Ok(())
}
