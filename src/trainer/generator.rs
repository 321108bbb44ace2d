use rand::Rng;

use super::{Coverage, CoverageRules, FilterConfig, Mode, NoteFilter, Target};
use crate::theory::{
    self, ChordType, FRET_COUNT, Fret, INTERVALS, Note, Position, ScaleType, StringIndex,
};

/// Upper bound on fret draws for one Note-mode target. Every string holds
/// both naturals and accidentals, so hitting this means the filter is broken.
pub const MAX_NOTE_DRAWS: usize = 1000;

/// Produce a fresh randomized target for `mode`.
pub fn generate<R: Rng>(mode: Mode, filter: FilterConfig, rng: &mut R) -> Target {
    match mode {
        Mode::Note => note_target(filter, rng),
        Mode::Interval => interval_target(rng),
        Mode::Chord => chord_target(rng),
        Mode::Scale => scale_target(rng),
    }
}

fn pick<T: Copy, R: Rng>(items: &[T], rng: &mut R) -> T {
    items[rng.gen_range(0..items.len())]
}

fn random_note<R: Rng>(rng: &mut R) -> Note {
    pick(&Note::ALL, rng)
}

fn note_target<R: Rng>(filter: FilterConfig, rng: &mut R) -> Target {
    let string = filter.string.pinned().unwrap_or_else(|| {
        let strings: Vec<StringIndex> = StringIndex::all().collect();
        pick(&strings, rng)
    });
    let position = draw_position(string, filter.notes, rng);
    Target::Note {
        position,
        note: position.note(),
    }
}

/// Rejection-sample a fret on `string` until its note passes `notes`.
fn draw_position<R: Rng>(string: StringIndex, notes: NoteFilter, rng: &mut R) -> Position {
    for _ in 0..MAX_NOTE_DRAWS {
        let fret = Fret::new(rng.gen_range(0..=FRET_COUNT)).unwrap_or(Fret::OPEN);
        let position = Position::new(string, fret);
        if notes.accepts(position.note()) {
            return position;
        }
    }
    panic!(
        "note filter {notes:?} rejected {MAX_NOTE_DRAWS} draws on the {} string",
        string.ordinal()
    );
}

fn interval_target<R: Rng>(rng: &mut R) -> Target {
    Target::Interval {
        root: random_note(rng),
        interval: pick(&INTERVALS, rng),
    }
}

fn chord_target<R: Rng>(rng: &mut R) -> Target {
    let chord = pick(&ChordType::ALL, rng);
    let root = random_note(rng);
    Target::Chord {
        chord,
        cover: Coverage::new(root, theory::chord_notes(root, chord), CoverageRules::CHORD),
    }
}

fn scale_target<R: Rng>(rng: &mut R) -> Target {
    let scale = pick(&ScaleType::ALL, rng);
    let root = random_note(rng);
    Target::Scale {
        scale,
        cover: Coverage::new(root, theory::scale_notes(root, scale), CoverageRules::SCALE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trainer::StringPin;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn natural_filter_never_yields_accidentals() {
        let mut rng = rng();
        let filter = FilterConfig {
            string: StringPin::All,
            notes: NoteFilter::Natural,
        };
        for _ in 0..2000 {
            match generate(Mode::Note, filter, &mut rng) {
                Target::Note { note, .. } => assert!(note.is_natural(), "got {note}"),
                other => panic!("unexpected target {other:?}"),
            }
        }
    }

    #[test]
    fn accidental_filter_never_yields_naturals() {
        let mut rng = rng();
        let filter = FilterConfig {
            string: StringPin::All,
            notes: NoteFilter::Accidental,
        };
        for _ in 0..2000 {
            let Target::Note { note, .. } = generate(Mode::Note, filter, &mut rng) else {
                panic!("expected a note target");
            };
            assert!(!note.is_natural(), "got {note}");
        }
    }

    #[test]
    fn pinned_string_is_respected() {
        let mut rng = rng();
        let pinned = StringIndex::new(3).unwrap();
        let filter = FilterConfig {
            string: StringPin::String(pinned),
            notes: NoteFilter::All,
        };
        for _ in 0..500 {
            let Target::Note { position, note } = generate(Mode::Note, filter, &mut rng) else {
                panic!("expected a note target");
            };
            assert_eq!(position.string, pinned);
            assert_eq!(position.note(), note);
        }
    }

    #[test]
    fn unpinned_note_targets_cover_every_string_and_fret() {
        let mut rng = rng();
        let mut strings = [false; 6];
        let mut frets = [false; 13];
        for _ in 0..3000 {
            let Target::Note { position, .. } = generate(Mode::Note, FilterConfig::default(), &mut rng)
            else {
                panic!("expected a note target");
            };
            strings[position.string.index() as usize] = true;
            frets[position.fret.number() as usize] = true;
        }
        assert!(strings.iter().all(|&s| s));
        assert!(frets.iter().all(|&f| f));
    }

    #[test]
    fn interval_targets_come_from_the_table() {
        let mut rng = rng();
        for _ in 0..200 {
            let Target::Interval { interval, .. } = generate(Mode::Interval, FilterConfig::default(), &mut rng)
            else {
                panic!("expected an interval target");
            };
            assert!((1..=12).contains(&interval.semitones));
            assert!(INTERVALS.contains(&interval));
        }
    }

    #[test]
    fn chord_targets_start_empty() {
        let mut rng = rng();
        for _ in 0..200 {
            let Target::Chord { chord, cover } = generate(Mode::Chord, FilterConfig::default(), &mut rng)
            else {
                panic!("expected a chord target");
            };
            assert!(cover.selected.is_empty());
            assert_eq!(cover.notes, theory::chord_notes(cover.root, chord));
            assert_eq!(cover.rules, CoverageRules::CHORD);
        }
    }

    #[test]
    fn scale_targets_start_empty() {
        let mut rng = rng();
        for _ in 0..200 {
            let Target::Scale { scale, cover } = generate(Mode::Scale, FilterConfig::default(), &mut rng)
            else {
                panic!("expected a scale target");
            };
            assert!(cover.selected.is_empty());
            assert_eq!(cover.notes.len(), scale.intervals().len());
            assert_eq!(cover.notes[0], cover.root);
            assert_eq!(cover.rules, CoverageRules::SCALE);
        }
    }

    #[test]
    fn filters_do_not_affect_other_modes() {
        let filter = FilterConfig {
            string: StringPin::String(StringIndex::new(0).unwrap()),
            notes: NoteFilter::Accidental,
        };
        let mut a = rng();
        let mut b = rng();
        assert_eq!(
            generate(Mode::Chord, filter, &mut a),
            generate(Mode::Chord, FilterConfig::default(), &mut b)
        );
    }
}
