mod board;

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use view::fretboard::OPEN_WIDTH;
use view::{BoardHit, Fretboard, SelectorBar, SelectorGroup, centered_rect};

use crate::session::{Session, SessionSettings};
use crate::theory::{FRET_COUNT, StringIndex};
use crate::trainer::click::RawClick;
use crate::trainer::validate::ResultKind;
use crate::trainer::{FilterConfig, Mode, NoteFilter, StringPin};

pub use board::BoardView;

const SELECTOR_SEP: &str = " │ ";
const MODE_OPTIONS: [&str; 4] = ["Note", "Interval", "Chord", "Scale"];
const STRING_OPTIONS: [&str; 7] = ["all", "1", "2", "3", "4", "5", "6"];
const NOTE_OPTIONS: [&str; 3] = ["all", "natural", "accidental"];
const KEY_HINTS: &str =
    "1-4 mode  n new task  s string  f notes  v show notes  ? instructions  q quit";

/// Upper bound on how long the loop sleeps without input.
const IDLE_POLL: Duration = Duration::from_millis(250);
/// Widest the fretted region gets; wider terminals leave a margin.
const MAX_FRET_COLUMNS: u16 = 6 * FRET_COUNT as u16;

#[derive(Default)]
struct Areas {
    selector: Rect,
    board: Rect,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

struct State {
    session: Session<BoardView>,
    areas: Areas,
    help_open: bool,
    quit: bool,
}

impl State {
    fn new(session: Session<BoardView>) -> Self {
        Self {
            session,
            areas: Areas::default(),
            help_open: false,
            quit: false,
        }
    }

    fn click_board(&mut self, hit: BoardHit, now: Instant) {
        let raw = match hit {
            BoardHit::Open { string } => RawClick::open(string as u8),
            BoardHit::Fretted {
                string,
                offset_x,
                width,
            } => RawClick::fretted(string as u8, offset_x as f64, width as f64),
        };
        if let Some(outcome) = self.session.on_board_click(raw, now) {
            log::debug!(
                "Task {}: clicked {} -> {:?}",
                outcome.task_id,
                outcome.note,
                outcome.kind
            );
            self.session
                .surface_mut()
                .show_feedback(outcome.kind, outcome.feedback);
        }
    }

    fn select(&mut self, group: usize, option: usize) {
        match group {
            0 => {
                if let Some(&mode) = Mode::ALL.get(option) {
                    self.session.set_mode(mode);
                }
            }
            1 => {
                let pin = match option {
                    0 => Some(StringPin::All),
                    n => StringIndex::new(n as u8 - 1).map(StringPin::String),
                };
                if let Some(pin) = pin {
                    self.session.set_string_pin(pin);
                }
            }
            2 => {
                if let Some(&notes) = NoteFilter::ALL.get(option) {
                    self.session.set_note_filter(notes);
                }
            }
            _ => {}
        }
    }
}

fn selector_groups(mode: Mode, filter: FilterConfig) -> [SelectorGroup<'static>; 3] {
    let mode_idx = Mode::ALL.iter().position(|&m| m == mode).unwrap_or(0);
    let string_idx = filter.string.pinned().map_or(0, |s| s.index() as usize + 1);
    let notes_idx = NoteFilter::ALL
        .iter()
        .position(|&n| n == filter.notes)
        .unwrap_or(0);
    let filters_enabled = mode == Mode::Note;
    [
        SelectorGroup::new("Mode", &MODE_OPTIONS, mode_idx),
        SelectorGroup::new("String", &STRING_OPTIONS, string_idx).enabled(filters_enabled),
        SelectorGroup::new("Notes", &NOTE_OPTIONS, notes_idx).enabled(filters_enabled),
    ]
}

pub fn run(settings: SessionSettings) -> anyhow::Result<()> {
    let mut s = State::new(Session::new(settings, BoardView::default()));

    // Set up terminal.
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Logging stays on when stderr is redirected (`fretdrill 2> drill.log`)
    // and is silenced when it would draw over the alternate screen.
    let prev_log_level = log::max_level();
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        log::set_max_level(log::LevelFilter::Off);
    }

    let result = event_loop(&mut terminal, &mut s);

    log::set_max_level(prev_log_level);

    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    crossterm::terminal::disable_raw_mode()?;

    result.map_err(Into::into)
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    s: &mut State,
) -> io::Result<()> {
    loop {
        if s.session.tick(Instant::now()) {
            log::debug!("Advanced to task {}", s.session.task().id);
        }

        terminal.draw(|frame| render(frame, s))?;
        if s.quit {
            break;
        }

        // Wake up in time for a pending advance even without input.
        let timeout = s
            .session
            .next_deadline()
            .map_or(IDLE_POLL, |due| {
                due.saturating_duration_since(Instant::now()).min(IDLE_POLL)
            });
        if !event::poll(timeout)? {
            continue;
        }
        let ev = event::read()?;
        process_event(s, ev);
        while event::poll(Duration::ZERO)? {
            process_event(s, event::read()?);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Event processing
// ---------------------------------------------------------------------------

fn process_event(s: &mut State, ev: Event) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            handle_key(s, key.code, key.modifiers);
        }
        Event::Mouse(mouse) => {
            if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
                handle_click(s, mouse.column, mouse.row, Instant::now());
            }
        }
        _ => {}
    }
}

fn handle_key(s: &mut State, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        s.quit = true;
        return;
    }
    if s.help_open {
        match code {
            KeyCode::Char('q') => s.quit = true,
            _ => s.help_open = false,
        }
        return;
    }
    match code {
        KeyCode::Char('q') => s.quit = true,
        KeyCode::Char(c @ '1'..='4') => {
            let idx = c as usize - '1' as usize;
            s.session.set_mode(Mode::ALL[idx]);
        }
        KeyCode::Char('n') => s.session.new_task(),
        KeyCode::Char('s') => {
            let pin = s.session.filter().string.next();
            s.session.set_string_pin(pin);
        }
        KeyCode::Char('f') => {
            let notes = s.session.filter().notes.next();
            s.session.set_note_filter(notes);
        }
        KeyCode::Char('v') => {
            let show = !s.session.show_notes();
            s.session.set_show_notes(show);
        }
        KeyCode::Char('?') | KeyCode::Char('i') => s.help_open = true,
        _ => {}
    }
}

fn handle_click(s: &mut State, x: u16, y: u16, now: Instant) {
    if s.help_open {
        s.help_open = false;
        return;
    }

    let groups = selector_groups(s.session.mode(), s.session.filter());
    if let Some((group, option)) =
        SelectorBar::option_at(x, y, s.areas.selector, &groups, SELECTOR_SEP)
    {
        s.select(group, option);
        return;
    }

    if let Some(hit) = Fretboard::hit_test(
        x,
        y,
        s.areas.board,
        StringIndex::COUNT as usize,
        FRET_COUNT as usize,
    ) {
        s.click_board(hit, now);
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(frame: &mut ratatui::Frame, s: &mut State) {
    let area = frame.area();
    let board_height = Fretboard::height(StringIndex::COUNT as usize);
    let [selector_area, _, title_area, prompt_area, _, board_row, progress_area, feedback_area, _, hint_area] =
        Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(board_height),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

    let board_width = area.width.saturating_sub(2).min(OPEN_WIDTH + MAX_FRET_COLUMNS);
    let board_area = Rect {
        x: area.x + 1,
        width: board_width,
        ..board_row
    };

    s.areas.selector = selector_area;
    s.areas.board = board_area;

    let groups = selector_groups(s.session.mode(), s.session.filter());
    frame.render_widget(SelectorBar::new(&groups).separator(SELECTOR_SEP), selector_area);

    let view = s.session.surface();
    let (title, prompt) = match view.board() {
        Some(board) => (board.mode.title(), board.prompt.clone()),
        None => (s.session.mode().title(), s.session.prompt()),
    };
    frame.render_widget(
        Paragraph::new(title).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        title_area,
    );
    frame.render_widget(
        Paragraph::new(prompt).style(Style::default().add_modifier(Modifier::BOLD)),
        prompt_area,
    );

    view.render(frame, board_area);

    if let Some(line) = progress_line(s) {
        frame.render_widget(
            Paragraph::new(line).style(Style::default().fg(Color::Cyan)),
            progress_area,
        );
    }

    if let Some((kind, feedback)) = view.feedback() {
        let color = match kind {
            ResultKind::Correct => Color::Green,
            ResultKind::Incorrect => Color::Red,
            ResultKind::AlreadyFound | ResultKind::StringAlreadyUsed => Color::Yellow,
        };
        let text = vec![
            Line::from(Span::styled(
                feedback.headline.as_str(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(feedback.detail.as_str()),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), feedback_area);
    }

    frame.render_widget(
        Paragraph::new(KEY_HINTS).style(Style::default().fg(Color::DarkGray)),
        hint_area,
    );

    if s.help_open {
        render_help(frame, area, s.session.mode());
    }
}

/// Found notes and miss count for Chord and Scale tasks.
fn progress_line(s: &State) -> Option<String> {
    let cover = s.session.task().target.coverage()?;
    let found: Vec<&str> = cover
        .notes
        .iter()
        .filter(|&&n| cover.already_found(n))
        .map(|n| n.name())
        .collect();
    let misses = s.session.progress_markers().incorrect.len();
    Some(format!(
        "Found {} of {}: {}  Misses: {misses}",
        cover.unique_found(),
        cover.notes.len(),
        if found.is_empty() { "-".to_string() } else { found.join(" ") },
    ))
}

fn render_help(frame: &mut ratatui::Frame, area: Rect, mode: Mode) {
    let popup = centered_rect(64, 20, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", mode.title()))
        .border_style(Style::default().fg(Color::Cyan));
    let mut lines: Vec<Line> = vec![Line::from(mode.instructions()), Line::from("")];
    lines.extend(build_help_lines().into_iter().map(|l| {
        if l.starts_with("  ") {
            Line::from(l)
        } else {
            Line::styled(
                l,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        }
    }));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        popup,
    );
}

fn build_help_lines() -> Vec<String> {
    vec![
        "Keys:".into(),
        "  1 2 3 4    Note / Interval / Chord / Scale training".into(),
        "  n          New task".into(),
        "  s f        Cycle string / note filter (note training)".into(),
        "  v          Show or hide note names".into(),
        "  ? i        Instructions".into(),
        "  q          Quit".into(),
        "Mouse:".into(),
        "  Click      Pick a fret, an open string or a setting".into(),
    ]
}
