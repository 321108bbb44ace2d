use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::theory::Note;
use crate::trainer::{Mode, NoteFilter, StringPin};

#[derive(Parser)]
#[command(name = "fretdrill", about = "Fretboard note, interval, chord and scale trainer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub play: PlayArgs,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the interactive fretboard (default)
    Play(PlayArgs),
    /// Print the theory tables used by the trainer
    #[command(subcommand)]
    Enumerate(EnumerateTarget),
    /// Show the instructions for a training mode
    Describe {
        #[arg(value_enum)]
        mode: Mode,
    },
}

#[derive(Subcommand)]
pub enum EnumerateTarget {
    /// Chord types and their intervals
    Chords(RootArg),
    /// Scale types and their intervals
    Scales(RootArg),
    /// The interval table
    Intervals(RootArg),
    /// Open-string notes, highest string first
    Strings,
}

#[derive(clap::Args)]
pub struct RootArg {
    /// Also spell each entry from this root note (e.g. C, F#)
    #[arg(long)]
    pub root: Option<Note>,
}

#[derive(clap::Args, Default)]
pub struct PlayArgs {
    /// Config file (.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Training mode
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// String for note training: 'all' or 1-6 (1 = highest)
    #[arg(long)]
    pub string: Option<StringPin>,

    /// Which notes note training may ask for
    #[arg(long, value_enum)]
    pub notes: Option<NoteFilter>,

    /// Label every fret with its note
    #[arg(long)]
    pub show_notes: bool,

    /// Delay before the next task after a completed one, in milliseconds
    #[arg(long)]
    pub feedback_ms: Option<u64>,
}
