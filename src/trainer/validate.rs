use std::fmt;

use super::{Coverage, Target, Task, TaskStatus};
use crate::theory::{Note, Position};

/// Classification of a validated click.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultKind {
    Correct,
    Incorrect,
    /// Scale mode: the note was already found in this task.
    AlreadyFound,
    /// Chord mode: this string already holds an accepted note.
    StringAlreadyUsed,
}

impl ResultKind {
    pub fn is_correct(self) -> bool {
        self == ResultKind::Correct
    }
}

/// Text shown to the learner after a click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub headline: String,
    pub detail: String,
}

impl Feedback {
    fn new(headline: &str, detail: String) -> Self {
        Self {
            headline: headline.to_string(),
            detail,
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.headline, self.detail)
    }
}

/// Result of applying one click to a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub kind: ResultKind,
    pub feedback: Feedback,
    /// The click moved the task to `Completed`.
    pub completed: bool,
}

impl Verdict {
    fn correct(feedback: Feedback, completed: bool) -> Self {
        Self {
            kind: ResultKind::Correct,
            feedback,
            completed,
        }
    }

    fn rejected(kind: ResultKind, feedback: Feedback) -> Self {
        Self {
            kind,
            feedback,
            completed: false,
        }
    }
}

/// Apply a resolved click to the live task.
///
/// Note and Interval tasks complete on the first correct click. Chord and
/// Scale tasks accumulate found notes until every target note is covered.
/// A completed task must not be validated again.
pub fn validate(task: &mut Task, position: Position, note: Note) -> Verdict {
    debug_assert!(!task.is_completed(), "click validated against a completed task");

    let verdict = match &mut task.target {
        Target::Note {
            position: expected,
            note: expected_note,
        } => single_note(*expected, *expected_note, position, note),
        Target::Interval { root, interval } => {
            let expected = root.up(interval.semitones);
            single_interval(expected, note)
        }
        Target::Chord { chord, cover } => {
            let name = format!("{} {} chord", cover.root, chord.display_name());
            coverage(cover, &mut task.progress, position, note, "chord", &name)
        }
        Target::Scale { scale, cover } => {
            let name = format!("{} {} scale", cover.root, scale.display_name());
            coverage(cover, &mut task.progress, position, note, "scale", &name)
        }
    };

    if verdict.completed {
        task.status = TaskStatus::Completed;
    }
    verdict
}

fn single_note(expected: Position, expected_note: Note, clicked: Position, note: Note) -> Verdict {
    if clicked.string == expected.string && note == expected_note {
        Verdict::correct(
            Feedback::new(
                "Good!",
                format!(
                    "You found {note} on the {} string ({})!",
                    clicked.string.ordinal(),
                    expected.fret.describe()
                ),
            ),
            true,
        )
    } else {
        Verdict::rejected(
            ResultKind::Incorrect,
            Feedback::new(
                "OOPS",
                format!(
                    "You clicked {note} on the {} string ({}). Expected {expected_note} on the {} string ({}).",
                    clicked.string.ordinal(),
                    clicked.fret.describe(),
                    expected.string.ordinal(),
                    expected.fret.describe()
                ),
            ),
        )
    }
}

fn single_interval(expected: Note, note: Note) -> Verdict {
    if note == expected {
        Verdict::correct(
            Feedback::new("Good!", format!("You found {note} correctly!")),
            true,
        )
    } else {
        Verdict::rejected(
            ResultKind::Incorrect,
            Feedback::new("OOPS", format!("You clicked {note}. Expected {expected}.")),
        )
    }
}

fn join(notes: &[Note]) -> String {
    notes
        .iter()
        .map(|n| n.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Shared chord/scale rule set. Checks run in order: string reuse,
/// membership, repeat.
fn coverage(
    cover: &mut Coverage,
    progress: &mut super::Progress,
    position: Position,
    note: Note,
    kind: &str,
    name: &str,
) -> Verdict {
    if cover.rules.one_note_per_string && progress.string_used(position.string) {
        return Verdict::rejected(
            ResultKind::StringAlreadyUsed,
            Feedback::new(
                "String already used!",
                format!(
                    "You already selected a note on the {} string. Choose a different string.",
                    position.string.ordinal()
                ),
            ),
        );
    }

    if !cover.contains(note) {
        progress.incorrect.push(position);
        return Verdict::rejected(
            ResultKind::Incorrect,
            Feedback::new(
                &format!("Not in {kind}!"),
                format!("{note} is not in {name}. Need: {}", join(&cover.remaining())),
            ),
        );
    }

    if cover.rules.reject_repeats && cover.already_found(note) {
        return Verdict::rejected(
            ResultKind::AlreadyFound,
            Feedback::new(
                "Already found!",
                format!(
                    "You already found {note}. Find the remaining notes: {}",
                    join(&cover.remaining())
                ),
            ),
        );
    }

    cover.selected.push(note);
    progress.correct.push(position);

    if cover.is_covered() {
        let headline = if kind == "chord" {
            "Chord Complete!"
        } else {
            "Scale Complete!"
        };
        Verdict::correct(
            Feedback::new(headline, format!("You found all notes in {name}!")),
            true,
        )
    } else {
        Verdict::correct(Feedback::new("Good!", format!("Found {note}.")), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{
        ChordType, Fret, INTERVALS, ScaleType, StringIndex, chord_notes, note_at, scale_notes,
    };
    use crate::trainer::{CoverageRules, Progress};

    fn n(name: &str) -> Note {
        name.parse().unwrap()
    }

    fn pos(string: u8, fret: u8) -> Position {
        Position::new(StringIndex::new(string).unwrap(), Fret::new(fret).unwrap())
    }

    /// Click `position` and validate with the note that actually sounds there.
    fn click(task: &mut Task, string: u8, fret: u8) -> Verdict {
        let p = pos(string, fret);
        validate(task, p, note_at(p.string, p.fret))
    }

    /// First fret on `string` sounding `note`.
    fn find(string: u8, note: &str) -> u8 {
        let target = n(note);
        Fret::all()
            .find(|&f| note_at(StringIndex::new(string).unwrap(), f) == target)
            .map(Fret::number)
            .unwrap()
    }

    fn chord_task(root: &str, chord: ChordType) -> Task {
        let root = n(root);
        Task::new(
            1,
            Target::Chord {
                chord,
                cover: Coverage::new(root, chord_notes(root, chord), CoverageRules::CHORD),
            },
        )
    }

    fn scale_task(root: &str, scale: ScaleType) -> Task {
        let root = n(root);
        Task::new(
            1,
            Target::Scale {
                scale,
                cover: Coverage::new(root, scale_notes(root, scale), CoverageRules::SCALE),
            },
        )
    }

    fn selected(task: &Task) -> Vec<&'static str> {
        task.target
            .coverage()
            .unwrap()
            .selected
            .iter()
            .map(|n| n.name())
            .collect()
    }

    // -- note mode --

    #[test]
    fn note_mode_requires_exact_string() {
        // G on the 3rd string, open.
        let mut task = Task::new(
            1,
            Target::Note {
                position: pos(2, 0),
                note: n("G"),
            },
        );

        // G on the 1st string (3rd fret) is the right note on the wrong string.
        let v = click(&mut task, 0, 3);
        assert_eq!(v.kind, ResultKind::Incorrect);
        assert!(!v.completed);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(
            v.feedback.detail,
            "You clicked G on the 1st string (3rd fret). Expected G on the 3rd string (open)."
        );
        assert_eq!(task.progress, Progress::default());

        let v = click(&mut task, 2, 0);
        assert_eq!(v.kind, ResultKind::Correct);
        assert!(v.completed);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(v.feedback.detail, "You found G on the 3rd string (open)!");
    }

    #[test]
    fn note_mode_accepts_octave_on_same_string() {
        let mut task = Task::new(
            1,
            Target::Note {
                position: pos(5, 0),
                note: n("E"),
            },
        );
        assert!(click(&mut task, 5, 12).completed);
    }

    // -- interval mode --

    #[test]
    fn interval_mode_ignores_string() {
        let fifth = INTERVALS.iter().copied().find(|i| i.semitones == 7).unwrap();
        for string in 0..6 {
            let mut task = Task::new(
                1,
                Target::Interval {
                    root: n("C"),
                    interval: fifth,
                },
            );
            let v = click(&mut task, string, find(string, "G"));
            assert_eq!(v.kind, ResultKind::Correct);
            assert!(v.completed);
            assert_eq!(v.feedback.detail, "You found G correctly!");
        }
    }

    #[test]
    fn interval_mode_wrong_note() {
        let octave = INTERVALS[11];
        let mut task = Task::new(
            1,
            Target::Interval {
                root: n("A"),
                interval: octave,
            },
        );
        let v = click(&mut task, 0, 0);
        assert_eq!(v.kind, ResultKind::Incorrect);
        assert_eq!(v.feedback.detail, "You clicked E. Expected A.");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert!(click(&mut task, 4, 0).completed);
    }

    // -- chord mode --

    #[test]
    fn chord_completes_after_third_unique_note() {
        let mut task = chord_task("C", ChordType::Major);

        let v = click(&mut task, 4, find(4, "G"));
        assert_eq!(v.kind, ResultKind::Correct);
        assert!(!v.completed);
        assert_eq!(v.feedback.detail, "Found G.");

        let v = click(&mut task, 1, find(1, "C"));
        assert!(v.kind.is_correct() && !v.completed);
        assert_eq!(task.status, TaskStatus::InProgress);

        let v = click(&mut task, 0, find(0, "E"));
        assert!(v.completed);
        assert_eq!(v.feedback.headline, "Chord Complete!");
        assert_eq!(v.feedback.detail, "You found all notes in C major chord!");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.progress.correct.len(), 3);
    }

    #[test]
    fn chord_rejects_second_note_on_same_string() {
        let mut task = chord_task("C", ChordType::Major);
        assert!(click(&mut task, 2, find(2, "G")).kind.is_correct());

        // E is a chord tone, but the 3rd string is taken.
        let v = click(&mut task, 2, find(2, "E"));
        assert_eq!(v.kind, ResultKind::StringAlreadyUsed);
        assert_eq!(v.feedback.headline, "String already used!");
        assert!(v.feedback.detail.contains("3rd string"));
        assert_eq!(selected(&task), ["G"]);
        assert!(task.progress.incorrect.is_empty());
    }

    #[test]
    fn chord_string_check_runs_before_membership() {
        let mut task = chord_task("C", ChordType::Major);
        click(&mut task, 3, find(3, "C"));
        let v = click(&mut task, 3, find(3, "F#"));
        assert_eq!(v.kind, ResultKind::StringAlreadyUsed);
        assert!(task.progress.incorrect.is_empty());
    }

    #[test]
    fn chord_wrong_note_lists_remaining() {
        let mut task = chord_task("C", ChordType::Major);
        click(&mut task, 5, find(5, "C"));
        let v = click(&mut task, 0, find(0, "F"));
        assert_eq!(v.kind, ResultKind::Incorrect);
        assert_eq!(v.feedback.headline, "Not in chord!");
        assert_eq!(v.feedback.detail, "F is not in C major chord. Need: E, G");
        assert_eq!(task.progress.incorrect, vec![pos(0, find(0, "F"))]);
    }

    #[test]
    fn chord_repeated_pitch_on_new_string_does_not_complete() {
        let mut task = chord_task("C", ChordType::Major);
        click(&mut task, 5, find(5, "C"));
        let v = click(&mut task, 1, find(1, "C"));
        assert_eq!(v.kind, ResultKind::Correct);
        assert!(!v.completed);
        assert_eq!(selected(&task), ["C", "C"]);
        click(&mut task, 0, find(0, "E"));
        assert!(click(&mut task, 2, find(2, "G")).completed);
    }

    #[test]
    fn seventh_chord_needs_four_strings() {
        let mut task = chord_task("G", ChordType::Dominant7);
        let tones = ["G", "B", "D", "F"];
        for (i, tone) in tones.iter().enumerate() {
            let string = (5 - i) as u8;
            let v = click(&mut task, string, find(string, tone));
            assert_eq!(v.completed, i == 3, "after {tone}");
        }
    }

    // -- scale mode --

    #[test]
    fn scale_duplicate_is_already_found() {
        let mut task = scale_task("A", ScaleType::PentatonicMinor);
        assert!(click(&mut task, 4, 0).kind.is_correct());

        let v = click(&mut task, 2, find(2, "A"));
        assert_eq!(v.kind, ResultKind::AlreadyFound);
        assert_eq!(v.feedback.headline, "Already found!");
        assert_eq!(
            v.feedback.detail,
            "You already found A. Find the remaining notes: C, D, E, G"
        );
        assert_eq!(selected(&task), ["A"]);
        assert!(task.progress.incorrect.is_empty());
        assert_eq!(task.progress.correct.len(), 1);
    }

    #[test]
    fn scale_allows_many_notes_per_string() {
        let mut task = scale_task("C", ScaleType::PentatonicMajor);
        for tone in ["C", "D", "E", "G"] {
            assert!(!click(&mut task, 1, find(1, tone)).completed);
        }
        let v = click(&mut task, 1, find(1, "A"));
        assert!(v.completed);
        assert_eq!(v.feedback.headline, "Scale Complete!");
        assert_eq!(v.feedback.detail, "You found all notes in C major pentatonic scale!");
    }

    #[test]
    fn scale_wrong_note_is_tracked() {
        let mut task = scale_task("C", ScaleType::Major);
        let v = click(&mut task, 0, find(0, "F#"));
        assert_eq!(v.kind, ResultKind::Incorrect);
        assert_eq!(v.feedback.headline, "Not in scale!");
        assert_eq!(
            v.feedback.detail,
            "F# is not in C major scale. Need: C, D, E, F, G, A, B"
        );
        assert_eq!(task.progress.incorrect.len(), 1);
    }

    #[test]
    fn scale_completes_exactly_at_full_count() {
        let mut task = scale_task("D", ScaleType::Dorian);
        let notes = scale_notes(n("D"), ScaleType::Dorian);
        for (i, note) in notes.iter().enumerate() {
            let v = click(&mut task, 3, find(3, note.name()));
            assert_eq!(v.completed, i == notes.len() - 1);
        }
        assert_eq!(task.status, TaskStatus::Completed);
    }
}
