use std::io;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::Paragraph;

use view::{BoardHit, BoardLabel, BoardMarker, Fretboard, SelectorBar, SelectorGroup};

const SEP: &str = " │ ";
const GLOW_OPTIONS: [&str; 7] = ["none", "1", "2", "3", "4", "5", "6"];
const LABEL_OPTIONS: [&str; 2] = ["off", "on"];
const OPEN: [&str; 6] = ["E", "B", "G", "D", "A", "E"];
const FRETS: usize = 12;
const DOTS: [usize; 5] = [3, 5, 7, 9, 12];

struct State {
    glow: usize,
    labels: bool,
    markers: Vec<BoardMarker>,
    last_hit: Option<BoardHit>,
    bar: Rect,
    board: Rect,
    quit: bool,
}

fn groups(s: &State) -> [SelectorGroup<'static>; 2] {
    [
        SelectorGroup::new("Glow", &GLOW_OPTIONS, s.glow),
        SelectorGroup::new("Labels", &LABEL_OPTIONS, s.labels as usize),
    ]
}

fn main() -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let result = run(&mut terminal);

    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    disable_raw_mode()?;
    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    let mut s = State {
        glow: 0,
        labels: false,
        markers: Vec::new(),
        last_hit: None,
        bar: Rect::default(),
        board: Rect::default(),
        quit: false,
    };
    loop {
        terminal.draw(|frame| render(frame, &mut s))?;
        if s.quit {
            return Ok(());
        }
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        process_event(&mut s, event::read()?);
    }
}

fn process_event(s: &mut State, ev: Event) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => s.quit = true,
            KeyCode::Char('c') => s.markers.clear(),
            _ => {}
        },
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            let (x, y) = (mouse.column, mouse.row);
            if let Some((group, option)) = SelectorBar::option_at(x, y, s.bar, &groups(s), SEP) {
                match group {
                    0 => s.glow = option,
                    _ => s.labels = option == 1,
                }
                return;
            }
            let Some(hit) = Fretboard::hit_test(x, y, s.board, OPEN.len(), FRETS) else {
                return;
            };
            let (string, fret) = match hit {
                BoardHit::Open { string } => (string, 0),
                BoardHit::Fretted {
                    string,
                    offset_x,
                    width,
                } => (string, offset_x as usize * FRETS / width as usize + 1),
            };
            let color = if s.markers.len() % 2 == 0 {
                Color::Green
            } else {
                Color::Red
            };
            s.markers.push(BoardMarker {
                string,
                fret,
                symbol: '●',
                style: Style::default().fg(color),
            });
            s.last_hit = Some(hit);
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, s: &mut State) {
    let [bar, _, board, _, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(Fretboard::height(OPEN.len())),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());
    s.bar = bar;
    s.board = board;

    let g = groups(s);
    frame.render_widget(SelectorBar::new(&g).separator(SEP), bar);

    let open: Vec<BoardLabel> = OPEN
        .iter()
        .map(|&t| BoardLabel::new(t, Style::default()))
        .collect();
    let labels: Vec<Vec<BoardLabel>> = (0..OPEN.len())
        .map(|_| {
            (0..FRETS)
                .map(|_| BoardLabel::new("·", Style::default().fg(Color::DarkGray)))
                .collect()
        })
        .collect();
    let mut widget = Fretboard::new(&open, FRETS)
        .markers(&s.markers)
        .dots(&DOTS)
        .glow(s.glow.checked_sub(1));
    if s.labels {
        widget = widget.labels(&labels);
    }
    frame.render_widget(widget, board);

    let text = match s.last_hit {
        Some(hit) => format!("{hit:?}  (c clears, q quits)"),
        None => "Click the board (c clears, q quits)".to_string(),
    };
    frame.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        status,
    );
}
