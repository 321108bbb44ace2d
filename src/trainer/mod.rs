//! Task state for the four training modes.
//!
//! A [`Task`] is one live exercise: the [`Target`] to find, the markers
//! accumulated while looking for it, and whether it has been completed.
//! [`generator`] creates tasks, [`click`] resolves board clicks and
//! [`validate`] advances a task's state for each click.

pub mod click;
pub mod generator;
pub mod validate;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::theory::{ChordType, Interval, Note, Position, ScaleType, StringIndex};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Note,
    Interval,
    Chord,
    Scale,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Note, Mode::Interval, Mode::Chord, Mode::Scale];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Note => "Note",
            Mode::Interval => "Interval",
            Mode::Chord => "Chord",
            Mode::Scale => "Scale",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Note => "Note Training",
            Mode::Interval => "Interval Training",
            Mode::Chord => "Chord Training",
            Mode::Scale => "Scale Training",
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Mode::Note => {
                "Knowing the notes of the guitar neck from memory is one of the most powerful \
                 things you can do as a guitarist. It unlocks fluency, creativity, and precision \
                 in virtually every area of your playing. Test your knowledge by finding the \
                 requested note on the given string."
            }
            Mode::Interval => {
                "Intervals are the building blocks of melody and harmony. An interval is the \
                 distance between two notes, measured in semitones. Find any position on the \
                 neck that sits the requested interval above the root."
            }
            Mode::Chord => {
                "Learn to identify the notes that make up different chord types. Click on all \
                 the notes that belong to the given chord, one note per string. You can select \
                 notes in any order, and the exercise is complete when you've found all the \
                 required notes."
            }
            Mode::Scale => {
                "Master scale construction by identifying all the notes in different scale \
                 types. Click on each note that belongs to the given scale. This helps you \
                 understand scale patterns and improves your ability to play scales across the \
                 fretboard."
            }
        }
    }

    /// Multi-click modes that keep markers between clicks.
    pub fn tracks_progress(self) -> bool {
        matches!(self, Mode::Chord | Mode::Scale)
    }
}

/// Which notes Note mode may ask for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NoteFilter {
    #[default]
    All,
    Natural,
    Accidental,
}

impl NoteFilter {
    pub const ALL: [NoteFilter; 3] = [NoteFilter::All, NoteFilter::Natural, NoteFilter::Accidental];

    pub fn accepts(self, note: Note) -> bool {
        match self {
            NoteFilter::All => true,
            NoteFilter::Natural => note.is_natural(),
            NoteFilter::Accidental => !note.is_natural(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteFilter::All => "all",
            NoteFilter::Natural => "natural",
            NoteFilter::Accidental => "accidental",
        }
    }

    pub fn next(self) -> NoteFilter {
        match self {
            NoteFilter::All => NoteFilter::Natural,
            NoteFilter::Natural => NoteFilter::Accidental,
            NoteFilter::Accidental => NoteFilter::All,
        }
    }
}

/// Restricts Note mode to one string, or lets it pick any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "StringPinRepr")]
pub enum StringPin {
    #[default]
    All,
    String(StringIndex),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringPinRepr {
    Number(i64),
    Word(String),
}

impl TryFrom<StringPinRepr> for StringPin {
    type Error = String;

    fn try_from(repr: StringPinRepr) -> Result<Self, Self::Error> {
        match repr {
            StringPinRepr::Number(n) => n.to_string().parse(),
            StringPinRepr::Word(w) => w.parse(),
        }
    }
}

impl FromStr for StringPin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(StringPin::All);
        }
        s.parse::<u8>()
            .ok()
            .and_then(StringIndex::from_number)
            .map(StringPin::String)
            .ok_or_else(|| format!("invalid string '{s}' (expected 'all' or 1-6)"))
    }
}

impl fmt::Display for StringPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringPin::All => f.write_str("all"),
            StringPin::String(s) => write!(f, "{}", s.number()),
        }
    }
}

impl StringPin {
    /// Cycle all → 1 → 2 → ... → 6 → all.
    pub fn next(self) -> StringPin {
        match self {
            StringPin::All => StringIndex::new(0)
                .map(StringPin::String)
                .unwrap_or(StringPin::All),
            StringPin::String(s) => StringIndex::new(s.index() + 1)
                .map(StringPin::String)
                .unwrap_or(StringPin::All),
        }
    }

    pub fn pinned(self) -> Option<StringIndex> {
        match self {
            StringPin::All => None,
            StringPin::String(s) => Some(s),
        }
    }
}

/// Generation inputs. Only Note mode consults them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub string: StringPin,
    pub notes: NoteFilter,
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// Rules that distinguish chord coverage from scale coverage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoverageRules {
    /// At most one accepted note per string for the task's lifetime.
    pub one_note_per_string: bool,
    /// A pitch class already found cannot be accepted again.
    pub reject_repeats: bool,
}

impl CoverageRules {
    pub const CHORD: CoverageRules = CoverageRules {
        one_note_per_string: true,
        reject_repeats: false,
    };
    pub const SCALE: CoverageRules = CoverageRules {
        one_note_per_string: false,
        reject_repeats: true,
    };
}

/// Find-every-note exercise shared by chord and scale targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    pub root: Note,
    pub notes: Vec<Note>,
    pub selected: Vec<Note>,
    pub rules: CoverageRules,
}

impl Coverage {
    pub fn new(root: Note, notes: Vec<Note>, rules: CoverageRules) -> Self {
        Self {
            root,
            notes,
            selected: Vec::new(),
            rules,
        }
    }

    pub fn contains(&self, note: Note) -> bool {
        self.notes.contains(&note)
    }

    pub fn already_found(&self, note: Note) -> bool {
        self.selected.contains(&note)
    }

    pub fn unique_found(&self) -> usize {
        let mut found = self.selected.clone();
        found.sort();
        found.dedup();
        found.len()
    }

    pub fn is_covered(&self) -> bool {
        self.unique_found() == self.notes.len()
    }

    /// Target notes not yet found, in definition order.
    pub fn remaining(&self) -> Vec<Note> {
        self.notes
            .iter()
            .copied()
            .filter(|n| !self.selected.contains(n))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// One exact position.
    Note { position: Position, note: Note },
    /// Any position whose note is `interval` above `root`.
    Interval { root: Note, interval: Interval },
    Chord { chord: ChordType, cover: Coverage },
    Scale { scale: ScaleType, cover: Coverage },
}

impl Target {
    pub fn mode(&self) -> Mode {
        match self {
            Target::Note { .. } => Mode::Note,
            Target::Interval { .. } => Mode::Interval,
            Target::Chord { .. } => Mode::Chord,
            Target::Scale { .. } => Mode::Scale,
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            Target::Note { position, note } => format!(
                "Click on the {note} note on the {} string.",
                position.string.ordinal()
            ),
            Target::Interval { root, interval } => {
                format!("Find the {} from {root}", interval.name)
            }
            Target::Chord { chord, cover } => format!(
                "Find all the notes in {} {} chord",
                cover.root,
                chord.display_name()
            ),
            Target::Scale { scale, cover } => format!(
                "Find all the notes in {} {} scale",
                cover.root,
                scale.display_name()
            ),
        }
    }

    pub fn coverage(&self) -> Option<&Coverage> {
        match self {
            Target::Chord { cover, .. } | Target::Scale { cover, .. } => Some(cover),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    InProgress,
    Completed,
}

/// Markers kept so a full redraw can repaint a multi-click task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub correct: Vec<Position>,
    pub incorrect: Vec<Position>,
}

impl Progress {
    pub fn string_used(&self, string: StringIndex) -> bool {
        self.correct.iter().any(|p| p.string == string)
    }
}

/// The single live exercise. Replaced wholesale on regeneration.
#[derive(Clone, Debug)]
pub struct Task {
    /// Generation counter; a deferred advance only applies to the task it
    /// was scheduled for.
    pub id: u64,
    pub target: Target,
    pub progress: Progress,
    pub status: TaskStatus,
}

impl Task {
    pub fn new(id: u64, target: Target) -> Self {
        Self {
            id,
            target,
            progress: Progress::default(),
            status: TaskStatus::InProgress,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}
