//! Session controller: owns the live task and the drawing surface, reacts to
//! mode/filter changes and clicks, and schedules the advance to the next task
//! once the current one is completed.

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::theory::{Note, Position, StringIndex};
use crate::trainer::click::{self, RawClick};
use crate::trainer::generator;
use crate::trainer::validate::{self, Feedback, ResultKind};
use crate::trainer::{FilterConfig, Mode, NoteFilter, Progress, StringPin, Target, Task};

pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    Correct,
    Incorrect,
}

/// Everything the surface needs for a full redraw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub mode: Mode,
    pub prompt: String,
    /// The pinned string, highlighted in Note mode.
    pub glow: Option<StringIndex>,
    pub show_notes: bool,
    pub markers: Progress,
}

/// The drawing collaborator. Implemented by the terminal board and by test
/// doubles.
pub trait Surface {
    /// Repaint the whole board. Clears transient feedback and markers not
    /// carried in `board.markers`.
    fn redraw(&mut self, board: &BoardSnapshot);
    fn place_marker(&mut self, position: Position, kind: MarkerKind);
}

/// Prompt and target of a freshly generated task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskPrompt {
    pub prompt: String,
    pub target: Target,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickOutcome {
    pub note: Note,
    /// Where the marker was placed.
    pub position: Position,
    pub kind: ResultKind,
    pub feedback: Feedback,
    pub task_completed: bool,
    pub task_id: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub mode: Mode,
    pub filter: FilterConfig,
    pub show_notes: bool,
    pub feedback_delay: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            mode: Mode::Note,
            filter: FilterConfig::default(),
            show_notes: false,
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
        }
    }
}

/// A scheduled move to the next task. Bound to the task it was scheduled
/// for; firing against any other task does nothing.
#[derive(Clone, Copy, Debug)]
struct PendingAdvance {
    task_id: u64,
    due: Instant,
}

pub struct Session<S: Surface> {
    mode: Mode,
    filter: FilterConfig,
    show_notes: bool,
    feedback_delay: Duration,
    task: Task,
    last_id: u64,
    pending: Option<PendingAdvance>,
    rng: SmallRng,
    surface: S,
}

impl<S: Surface> Session<S> {
    pub fn new(settings: SessionSettings, surface: S) -> Self {
        Self::with_rng(settings, surface, SmallRng::from_entropy())
    }

    pub fn with_rng(settings: SessionSettings, surface: S, mut rng: SmallRng) -> Self {
        let mut filter = settings.filter;
        if settings.mode == Mode::Interval {
            filter.string = StringPin::All;
        }
        let target = generator::generate(settings.mode, filter, &mut rng);
        let mut session = Self {
            mode: settings.mode,
            filter,
            show_notes: settings.show_notes,
            feedback_delay: settings.feedback_delay,
            task: Task::new(1, target),
            last_id: 1,
            pending: None,
            rng,
            surface,
        };
        log::info!("Task 1: {}", session.task.target.prompt());
        session.redraw();
        session
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn filter(&self) -> FilterConfig {
        self.filter
    }

    pub fn show_notes(&self) -> bool {
        self.show_notes
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn prompt(&self) -> String {
        self.task.target.prompt()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Markers to restore on a redraw.
    pub fn progress_markers(&self) -> &Progress {
        &self.task.progress
    }

    /// When the pending advance is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            mode: self.mode,
            prompt: self.task.target.prompt(),
            glow: if self.mode == Mode::Note {
                self.filter.string.pinned()
            } else {
                None
            },
            show_notes: self.show_notes,
            markers: if self.mode.tracks_progress() {
                self.task.progress.clone()
            } else {
                Progress::default()
            },
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Switch mode and filters at once and start a fresh task.
    pub fn generate_task(&mut self, mode: Mode, filter: FilterConfig) -> TaskPrompt {
        self.mode = mode;
        self.filter = filter;
        if mode == Mode::Interval {
            self.filter.string = StringPin::All;
        }
        self.regenerate();
        TaskPrompt {
            prompt: self.task.target.prompt(),
            target: self.task.target.clone(),
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.generate_task(mode, self.filter);
    }

    pub fn set_string_pin(&mut self, pin: StringPin) {
        self.filter.string = pin;
        self.filter_changed();
    }

    pub fn set_note_filter(&mut self, notes: NoteFilter) {
        self.filter.notes = notes;
        self.filter_changed();
    }

    /// Manual "new task" request.
    pub fn new_task(&mut self) {
        self.regenerate();
    }

    /// Display-only; repaints without touching the task.
    pub fn set_show_notes(&mut self, show: bool) {
        self.show_notes = show;
        self.redraw();
    }

    /// Validate a board click against the live task.
    ///
    /// Returns `None` when the task is already completed and waiting for its
    /// advance; such clicks are dropped.
    pub fn on_board_click(&mut self, raw: RawClick, now: Instant) -> Option<ClickOutcome> {
        if self.task.is_completed() {
            log::debug!("Task {} already completed, ignoring click {raw:?}", self.task.id);
            return None;
        }

        let (position, note) = click::interpret(raw);
        let verdict = validate::validate(&mut self.task, position, note);

        let marker = if verdict.kind.is_correct() {
            MarkerKind::Correct
        } else {
            MarkerKind::Incorrect
        };
        self.surface.place_marker(position, marker);

        log::debug!(
            "Task {}: {note} at string {} fret {} -> {:?}",
            self.task.id,
            position.string.number(),
            position.fret.number(),
            verdict.kind
        );

        if verdict.completed {
            let due = now + self.feedback_delay;
            self.pending = Some(PendingAdvance {
                task_id: self.task.id,
                due,
            });
            log::info!(
                "Task {} completed, next task in {} ms",
                self.task.id,
                self.feedback_delay.as_millis()
            );
        }

        Some(ClickOutcome {
            note,
            position,
            kind: verdict.kind,
            feedback: verdict.feedback,
            task_completed: verdict.completed,
            task_id: self.task.id,
        })
    }

    /// Fire the pending advance if it is due. Returns true if a new task was
    /// generated.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(p) if now >= p.due => {
                self.pending = None;
                self.advance(p.task_id)
            }
            _ => false,
        }
    }

    /// Move on from task `task_id`. A no-op if that task has already been
    /// replaced.
    pub fn advance(&mut self, task_id: u64) -> bool {
        if task_id != self.task.id {
            log::debug!("Stale advance for task {task_id} (current {})", self.task.id);
            return false;
        }
        self.regenerate();
        true
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn filter_changed(&mut self) {
        if self.mode == Mode::Note {
            self.regenerate();
        } else {
            log::debug!(
                "Filter change ({} / {}) ignored in {} mode",
                self.filter.string,
                self.filter.notes.label(),
                self.mode.label()
            );
        }
    }

    /// Replace the live task. Cancels any pending advance and drops all
    /// progress from the old task.
    fn regenerate(&mut self) {
        if let Some(p) = self.pending.take() {
            log::debug!("Cancelled pending advance for task {}", p.task_id);
        }
        self.last_id += 1;
        let target = generator::generate(self.mode, self.filter, &mut self.rng);
        debug_assert_eq!(target.mode(), self.mode);
        self.task = Task::new(self.last_id, target);
        log::info!("Task {}: {}", self.task.id, self.task.target.prompt());
        self.redraw();
    }

    fn redraw(&mut self) {
        let board = self.snapshot();
        self.surface.redraw(&board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::{Fret, note_at};
    use crate::trainer::TaskStatus;

    #[derive(Default)]
    struct RecordingSurface {
        redraws: Vec<BoardSnapshot>,
        markers: Vec<(Position, MarkerKind)>,
    }

    impl Surface for RecordingSurface {
        fn redraw(&mut self, board: &BoardSnapshot) {
            self.redraws.push(board.clone());
            self.markers.clear();
        }

        fn place_marker(&mut self, position: Position, kind: MarkerKind) {
            self.markers.push((position, kind));
        }
    }

    const DELAY: Duration = Duration::from_millis(2000);

    fn session(mode: Mode) -> Session<RecordingSurface> {
        let settings = SessionSettings {
            mode,
            ..SessionSettings::default()
        };
        Session::with_rng(settings, RecordingSurface::default(), SmallRng::seed_from_u64(42))
    }

    /// A click on `string` landing on the first fret that sounds `note`.
    fn click_for(string: u8, note: Note) -> RawClick {
        let s = StringIndex::new(string).unwrap();
        let fret = Fret::all().find(|&f| note_at(s, f) == note).unwrap();
        if fret.is_open() {
            RawClick::open(string)
        } else {
            // Middle of the fret's cell on a 120-wide board.
            RawClick::fretted(string, (fret.number() as f64 - 0.5) * 10.0, 120.0)
        }
    }

    /// Clicks that solve whatever the live task is, one note per string.
    fn solution(task: &Task) -> Vec<RawClick> {
        match &task.target {
            Target::Note { position, .. } => vec![click_for(position.string.index(), position.note())],
            Target::Interval { root, interval } => vec![click_for(0, root.up(interval.semitones))],
            Target::Chord { cover, .. } | Target::Scale { cover, .. } => cover
                .notes
                .iter()
                .enumerate()
                .map(|(i, &n)| click_for((i % 6) as u8, n))
                .collect(),
        }
    }

    fn solve(s: &mut Session<RecordingSurface>, now: Instant) -> Vec<ClickOutcome> {
        solution(s.task())
            .into_iter()
            .filter_map(|c| s.on_board_click(c, now))
            .collect()
    }

    #[test]
    fn new_session_starts_in_progress_and_draws() {
        let s = session(Mode::Chord);
        assert_eq!(s.task().status, TaskStatus::InProgress);
        assert_eq!(s.surface().redraws.len(), 1);
        assert_eq!(s.surface().redraws[0].prompt, s.prompt());
        assert!(s.next_deadline().is_none());
    }

    #[test]
    fn note_task_advances_after_delay() {
        let mut s = session(Mode::Note);
        let t0 = Instant::now();
        let first = s.task().id;

        let outcomes = solve(&mut s, t0);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].task_completed);
        assert_eq!(outcomes[0].kind, ResultKind::Correct);
        assert_eq!(s.next_deadline(), Some(t0 + DELAY));

        assert!(!s.tick(t0 + DELAY / 2));
        assert_eq!(s.task().id, first);

        assert!(s.tick(t0 + DELAY));
        assert_ne!(s.task().id, first);
        assert_eq!(s.task().status, TaskStatus::InProgress);
        assert!(s.next_deadline().is_none());
        // Advance fires only once.
        assert!(!s.tick(t0 + DELAY * 2));
    }

    #[test]
    fn chord_task_completes_once_and_clears_progress() {
        let mut s = session(Mode::Chord);
        let t0 = Instant::now();
        let outcomes = solve(&mut s, t0);
        let completions = outcomes.iter().filter(|o| o.task_completed).count();
        assert_eq!(completions, 1);
        assert!(outcomes.last().unwrap().task_completed);
        assert_eq!(s.progress_markers().correct.len(), outcomes.len());

        assert!(s.tick(t0 + DELAY));
        assert_eq!(s.progress_markers(), &Progress::default());
        assert!(s.task().target.coverage().unwrap().selected.is_empty());
    }

    #[test]
    fn clicks_on_a_completed_task_are_dropped() {
        let mut s = session(Mode::Interval);
        let t0 = Instant::now();
        let clicks = solution(s.task());
        assert!(s.on_board_click(clicks[0], t0).unwrap().task_completed);
        let markers = s.surface().markers.len();

        assert!(s.on_board_click(clicks[0], t0 + DELAY / 2).is_none());
        assert_eq!(s.surface().markers.len(), markers);
        // The first deadline stands.
        assert_eq!(s.next_deadline(), Some(t0 + DELAY));
    }

    #[test]
    fn mode_change_cancels_pending_advance() {
        let mut s = session(Mode::Note);
        let t0 = Instant::now();
        let completed_id = s.task().id;
        solve(&mut s, t0);

        s.set_mode(Mode::Scale);
        let scale_id = s.task().id;
        assert!(s.next_deadline().is_none());
        assert!(!s.tick(t0 + DELAY));
        assert_eq!(s.task().id, scale_id);

        // A late callback for the replaced task is a no-op.
        assert!(!s.advance(completed_id));
        assert_eq!(s.task().id, scale_id);
        assert_eq!(s.mode(), Mode::Scale);
    }

    #[test]
    fn manual_new_task_resets_progress() {
        let mut s = session(Mode::Scale);
        let t0 = Instant::now();
        let clicks = solution(s.task());
        s.on_board_click(clicks[0], t0);
        s.on_board_click(RawClick::open(0), t0);
        assert!(!s.progress_markers().correct.is_empty());

        s.new_task();
        assert_eq!(s.progress_markers(), &Progress::default());
        assert!(s.surface().redraws.last().unwrap().markers.correct.is_empty());
        assert!(s.surface().markers.is_empty());
    }

    #[test]
    fn regenerating_same_mode_is_idempotent_on_progress() {
        let mut s = session(Mode::Chord);
        let t0 = Instant::now();
        for click in solution(s.task()).into_iter().take(2) {
            s.on_board_click(click, t0);
        }
        let prompt = s.generate_task(Mode::Chord, s.filter());
        assert_eq!(prompt.prompt, prompt.target.prompt());
        assert_eq!(prompt.target.coverage().unwrap().selected.len(), 0);
        assert_eq!(s.progress_markers(), &Progress::default());
    }

    #[test]
    fn filters_only_regenerate_note_mode() {
        let mut s = session(Mode::Chord);
        let id = s.task().id;
        s.set_note_filter(NoteFilter::Natural);
        s.set_string_pin(StringPin::String(StringIndex::new(2).unwrap()));
        assert_eq!(s.task().id, id);
        assert_eq!(s.filter().notes, NoteFilter::Natural);

        s.set_mode(Mode::Note);
        let id = s.task().id;
        s.set_note_filter(NoteFilter::Accidental);
        assert_ne!(s.task().id, id);
        let Target::Note { position, note } = &s.task().target else {
            panic!("expected a note target");
        };
        assert_eq!(position.string.index(), 2);
        assert!(!note.is_natural());
        assert_eq!(s.snapshot().glow, StringIndex::new(2));
    }

    #[test]
    fn interval_mode_forces_all_strings() {
        let mut s = session(Mode::Note);
        s.set_string_pin(StringPin::String(StringIndex::new(4).unwrap()));
        s.set_mode(Mode::Interval);
        assert_eq!(s.filter().string, StringPin::All);
        assert_eq!(s.snapshot().glow, None);
    }

    #[test]
    fn markers_follow_click_outcomes() {
        let mut s = session(Mode::Chord);
        let t0 = Instant::now();
        let first = solution(s.task())[0];
        let ok = s.on_board_click(first, t0).unwrap();
        let again = s.on_board_click(first, t0).unwrap();
        assert_eq!(again.kind, ResultKind::StringAlreadyUsed);
        assert_eq!(
            s.surface().markers,
            vec![
                (ok.position, MarkerKind::Correct),
                (again.position, MarkerKind::Incorrect)
            ]
        );
        assert_eq!(s.progress_markers().correct, vec![ok.position]);
        assert!(s.progress_markers().incorrect.is_empty());
    }

    #[test]
    fn show_notes_redraws_without_new_task() {
        let mut s = session(Mode::Interval);
        let id = s.task().id;
        let redraws = s.surface().redraws.len();
        s.set_show_notes(true);
        assert_eq!(s.task().id, id);
        assert_eq!(s.surface().redraws.len(), redraws + 1);
        assert!(s.surface().redraws.last().unwrap().show_notes);
    }

    #[test]
    fn redraw_restores_progress_only_for_multi_click_modes() {
        let mut s = session(Mode::Scale);
        let t0 = Instant::now();
        let click = solution(s.task())[0];
        s.on_board_click(click, t0);
        s.set_show_notes(true);
        assert_eq!(s.surface().redraws.last().unwrap().markers.correct.len(), 1);

        let mut s = session(Mode::Note);
        s.on_board_click(RawClick::open(0), t0);
        s.set_show_notes(true);
        assert_eq!(s.surface().redraws.last().unwrap().markers, Progress::default());
    }
}
