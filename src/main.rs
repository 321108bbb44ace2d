mod cli;
mod config;
mod enumerate;
mod session;
mod theory;
mod trainer;
mod tui;

use std::io::Write;
use std::time::{Duration, SystemTime};

use clap::Parser;
use cli::{Cli, Command, EnumerateTarget, PlayArgs};
use config::Config;
use session::SessionSettings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => play(cli.play),
        Some(Command::Play(args)) => play(args),
        Some(Command::Enumerate(target)) => {
            env_logger::init();
            match target {
                EnumerateTarget::Chords(arg) => enumerate::chords(arg.root),
                EnumerateTarget::Scales(arg) => enumerate::scales(arg.root),
                EnumerateTarget::Intervals(arg) => enumerate::intervals(arg.root),
                EnumerateTarget::Strings => enumerate::strings(),
            }
        }
        Some(Command::Describe { mode }) => {
            env_logger::init();
            println!("{}", mode.title());
            println!();
            println!("{}", mode.instructions());
            Ok(())
        }
    }
}

/// Custom logger that writes to stderr with \r\n line endings for raw mode.
struct RawModeLogger;

impl log::Log for RawModeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let now = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default();
            let secs = now.as_secs() % 86400;
            let h = secs / 3600;
            let m = (secs % 3600) / 60;
            let s = secs % 60;
            let ms = now.subsec_millis();
            let _ = write!(
                std::io::stderr(),
                "[{h:02}:{m:02}:{s:02}.{ms:03} {}] {}\r\n",
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static RAW_MODE_LOGGER: RawModeLogger = RawModeLogger;

/// Config file values, then command-line overrides.
fn resolve_settings(args: &PlayArgs) -> anyhow::Result<SessionSettings> {
    let config = match &args.config {
        Some(path) => config::load(path)?,
        None => Config::default(),
    };
    let mut settings = config.settings();
    if let Some(mode) = args.mode {
        settings.mode = mode;
    }
    if let Some(string) = args.string {
        settings.filter.string = string;
    }
    if let Some(notes) = args.notes {
        settings.filter.notes = notes;
    }
    if args.show_notes {
        settings.show_notes = true;
    }
    if let Some(ms) = args.feedback_ms {
        settings.feedback_delay = Duration::from_millis(ms);
    }
    Ok(settings)
}

fn play(args: PlayArgs) -> anyhow::Result<()> {
    log::set_logger(&RAW_MODE_LOGGER).ok();
    log::set_max_level(
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
    );

    let settings = resolve_settings(&args)?;
    log::info!(
        "Starting {} (string {}, notes {})",
        settings.mode.title(),
        settings.filter.string,
        settings.filter.notes.label()
    );

    tui::run(settings)?;

    log::info!("Stopping...");
    Ok(())
}
