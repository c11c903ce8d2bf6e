use clap::Parser;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use space_arena::app::App;
use space_arena::config::ArenaConfig;

#[derive(Parser, Debug)]
#[command(name = "space-arena")]
#[command(about = "Top-down arena shooter for the terminal: fly, shoot bots, collect orbs, level up")]
struct Cli {
    /// Pilot name shown on the leaderboard
    #[arg(long)]
    name: Option<String>,
    /// Config file (defaults to ./space-arena.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
    /// Disable sound
    #[arg(long)]
    mute: bool,
    /// Where log output goes; the terminal is taken by the game
    #[arg(long, default_value = "space-arena.log")]
    log_file: PathBuf,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let mut config = ArenaConfig::load_or_default(cli.config.as_deref())?;
    if cli.mute {
        config.audio.enabled = false;
    }
    let name = cli.name.unwrap_or_else(|| config.player.name.clone());

    let supports_keyboard_enhancement = matches!(
        crossterm::terminal::supports_keyboard_enhancement(),
        Ok(true)
    );
    info!("keyboard enhancement supported: {supports_keyboard_enhancement}");

    // Setup terminal manually for full control
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Enable keyboard enhancement AFTER entering alternate screen
    if supports_keyboard_enhancement {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = App::new(config, name, cli.seed, supports_keyboard_enhancement).run(&mut terminal);

    // Cleanup
    if supports_keyboard_enhancement {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
