use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::session::SessionSettings;
use crate::trainer::{FilterConfig, Mode, NoteFilter, StringPin};

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub trainer: TrainerConfig,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerConfig {
    pub mode: Mode,
    pub string: StringPin,
    pub notes: NoteFilter,
    pub show_notes: bool,
    pub feedback_delay_ms: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Note,
            string: StringPin::All,
            notes: NoteFilter::All,
            show_notes: false,
            feedback_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn settings(&self) -> SessionSettings {
        let t = &self.trainer;
        SessionSettings {
            mode: t.mode,
            filter: FilterConfig {
                string: t.string,
                notes: t.notes,
            },
            show_notes: t.show_notes,
            feedback_delay: Duration::from_millis(t.feedback_delay_ms),
        }
    }
}

pub fn load(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}
