use std::fmt;
use std::str::FromStr;

/// Chromatic pitch-class names, sharps only.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Open-string offsets in semitones above C, highest string first (E B G D A E).
const STRING_OFFSETS: [u8; 6] = [4, 11, 7, 2, 9, 4];

/// Number of fretted cells on the board. Fret 0 is the open string.
pub const FRET_COUNT: u8 = 12;

/// Frets that carry an inlay dot. The 12th carries two.
pub const DOT_FRETS: [u8; 5] = [3, 5, 7, 9, 12];

// ---------------------------------------------------------------------------
// Notes and board coordinates
// ---------------------------------------------------------------------------

/// One of the 12 pitch classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note(u8);

impl Note {
    pub const ALL: [Note; 12] = [
        Note(0),
        Note(1),
        Note(2),
        Note(3),
        Note(4),
        Note(5),
        Note(6),
        Note(7),
        Note(8),
        Note(9),
        Note(10),
        Note(11),
    ];

    /// Build a note from any semitone count, wrapping at the octave.
    pub fn from_semitones(semitones: u32) -> Note {
        Note((semitones % 12) as u8)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.0 as usize]
    }

    /// True when the display name carries no accidental.
    pub fn is_natural(self) -> bool {
        !self.name().contains('#')
    }

    /// The note `semitones` above this one.
    pub fn up(self, semitones: u8) -> Note {
        Note::from_semitones(self.index() as u32 + semitones as u32)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NOTE_NAMES
            .iter()
            .position(|name| name.eq_ignore_ascii_case(trimmed))
            .map(|i| Note(i as u8))
            .ok_or_else(|| {
                format!(
                    "unknown note '{s}' (expected one of: {})",
                    NOTE_NAMES.join(", ")
                )
            })
    }
}

/// A string on the board, 0 = highest pitched, 5 = lowest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringIndex(u8);

impl StringIndex {
    pub const COUNT: u8 = 6;

    pub fn new(index: u8) -> Option<StringIndex> {
        (index < Self::COUNT).then_some(StringIndex(index))
    }

    /// From the 1-based number a player uses ("1st string").
    pub fn from_number(number: u8) -> Option<StringIndex> {
        number.checked_sub(1).and_then(StringIndex::new)
    }

    pub fn all() -> impl Iterator<Item = StringIndex> {
        (0..Self::COUNT).map(StringIndex)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn number(self) -> u8 {
        self.0 + 1
    }

    pub fn open_note(self) -> Note {
        Note(STRING_OFFSETS[self.0 as usize])
    }

    /// "1st", "2nd", ...
    pub fn ordinal(self) -> String {
        ordinal(self.number() as u32)
    }
}

/// A fret, 0 (open) through 12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fret(u8);

impl Fret {
    pub const OPEN: Fret = Fret(0);

    pub fn new(fret: u8) -> Option<Fret> {
        (fret <= FRET_COUNT).then_some(Fret(fret))
    }

    pub fn all() -> impl Iterator<Item = Fret> {
        (0..=FRET_COUNT).map(Fret)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn is_open(self) -> bool {
        self.0 == 0
    }

    /// "open" or "5th fret".
    pub fn describe(self) -> String {
        if self.is_open() {
            "open".to_string()
        } else {
            format!("{} fret", ordinal(self.0 as u32))
        }
    }
}

/// A (string, fret) pair on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub string: StringIndex,
    pub fret: Fret,
}

impl Position {
    pub fn new(string: StringIndex, fret: Fret) -> Self {
        Self { string, fret }
    }

    pub fn note(self) -> Note {
        note_at(self.string, self.fret)
    }
}

pub fn note_at(string: StringIndex, fret: Fret) -> Note {
    string.open_note().up(fret.0)
}

pub fn ordinal(n: u32) -> String {
    match n {
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        _ => format!("{n}th"),
    }
}

// ---------------------------------------------------------------------------
// Chords, scales, intervals
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChordType {
    Major,
    Minor,
    Diminished,
    Augmented,
    Major7,
    Minor7,
    Dominant7,
    Diminished7,
}

impl ChordType {
    pub const ALL: [ChordType; 8] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Diminished,
        ChordType::Augmented,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::Dominant7,
        ChordType::Diminished7,
    ];

    /// Semitones above the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Augmented => &[0, 4, 8],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Diminished7 => &[0, 3, 6, 9],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Diminished => "diminished",
            ChordType::Augmented => "augmented",
            ChordType::Major7 => "major7",
            ChordType::Minor7 => "minor7",
            ChordType::Dominant7 => "dominant7",
            ChordType::Diminished7 => "diminished7",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Diminished => "diminished",
            ChordType::Augmented => "augmented",
            ChordType::Major7 => "major 7th",
            ChordType::Minor7 => "minor 7th",
            ChordType::Dominant7 => "dominant 7th",
            ChordType::Diminished7 => "diminished 7th",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleType {
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Dorian,
    Mixolydian,
    Lydian,
    Phrygian,
    Locrian,
}

impl ScaleType {
    pub const ALL: [ScaleType; 12] = [
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::PentatonicMajor,
        ScaleType::PentatonicMinor,
        ScaleType::Blues,
        ScaleType::Dorian,
        ScaleType::Mixolydian,
        ScaleType::Lydian,
        ScaleType::Phrygian,
        ScaleType::Locrian,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleType::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleType::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::NaturalMinor => "natural_minor",
            ScaleType::HarmonicMinor => "harmonic_minor",
            ScaleType::MelodicMinor => "melodic_minor",
            ScaleType::PentatonicMajor => "pentatonic_major",
            ScaleType::PentatonicMinor => "pentatonic_minor",
            ScaleType::Blues => "blues",
            ScaleType::Dorian => "dorian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::Lydian => "lydian",
            ScaleType::Phrygian => "phrygian",
            ScaleType::Locrian => "locrian",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::NaturalMinor => "natural minor",
            ScaleType::HarmonicMinor => "harmonic minor",
            ScaleType::MelodicMinor => "melodic minor",
            ScaleType::PentatonicMajor => "major pentatonic",
            ScaleType::PentatonicMinor => "minor pentatonic",
            ScaleType::Blues => "blues",
            ScaleType::Dorian => "dorian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::Lydian => "lydian",
            ScaleType::Phrygian => "phrygian",
            ScaleType::Locrian => "locrian",
        }
    }
}

/// A named interval, minor 2nd through octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Interval {
    pub name: &'static str,
    pub semitones: u8,
}

pub const INTERVALS: [Interval; 12] = [
    Interval { name: "minor 2nd", semitones: 1 },
    Interval { name: "major 2nd", semitones: 2 },
    Interval { name: "minor 3rd", semitones: 3 },
    Interval { name: "major 3rd", semitones: 4 },
    Interval { name: "perfect 4th", semitones: 5 },
    Interval { name: "tritone", semitones: 6 },
    Interval { name: "perfect 5th", semitones: 7 },
    Interval { name: "minor 6th", semitones: 8 },
    Interval { name: "major 6th", semitones: 9 },
    Interval { name: "minor 7th", semitones: 10 },
    Interval { name: "major 7th", semitones: 11 },
    Interval { name: "octave", semitones: 12 },
];

fn spell(root: Note, intervals: &[u8]) -> Vec<Note> {
    intervals.iter().map(|&i| root.up(i)).collect()
}

pub fn chord_notes(root: Note, chord: ChordType) -> Vec<Note> {
    spell(root, chord.intervals())
}

pub fn scale_notes(root: Note, scale: ScaleType) -> Vec<Note> {
    spell(root, scale.intervals())
}
