use crate::theory::{self, ChordType, INTERVALS, Note, ScaleType, StringIndex};

fn spelled(root: Option<Note>, notes: impl FnOnce(Note) -> Vec<Note>) -> String {
    match root {
        Some(root) => {
            let names: Vec<_> = notes(root).iter().map(|n| n.name()).collect();
            format!("  [{}]", names.join(" "))
        }
        None => String::new(),
    }
}

fn semitones(intervals: &[u8]) -> String {
    intervals
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn chords(root: Option<Note>) -> anyhow::Result<()> {
    println!("=== Chord Types ===");
    for chord in ChordType::ALL {
        println!(
            "  {:<12} {:<15} {:<12}{}",
            chord.key(),
            chord.display_name(),
            semitones(chord.intervals()),
            spelled(root, |r| theory::chord_notes(r, chord)),
        );
    }
    Ok(())
}

pub fn scales(root: Option<Note>) -> anyhow::Result<()> {
    println!("=== Scale Types ===");
    for scale in ScaleType::ALL {
        println!(
            "  {:<17} {:<17} {:<16}{}",
            scale.key(),
            scale.display_name(),
            semitones(scale.intervals()),
            spelled(root, |r| theory::scale_notes(r, scale)),
        );
    }
    Ok(())
}

pub fn intervals(root: Option<Note>) -> anyhow::Result<()> {
    println!("=== Intervals ===");
    for interval in INTERVALS {
        let target = root
            .map(|r| format!("  {r} -> {}", r.up(interval.semitones)))
            .unwrap_or_default();
        println!("  {:>2}  {:<12}{target}", interval.semitones, interval.name);
    }
    Ok(())
}

pub fn strings() -> anyhow::Result<()> {
    println!("=== Open Strings ===");
    for string in StringIndex::all() {
        println!("  {:<5} {}", string.ordinal(), string.open_note());
    }
    Ok(())
}
