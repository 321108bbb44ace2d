use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use view::{BoardLabel, BoardMarker, Fretboard};

use crate::session::{BoardSnapshot, MarkerKind, Surface};
use crate::theory::{self, DOT_FRETS, FRET_COUNT, Fret, Position, StringIndex};
use crate::trainer::validate::{Feedback, ResultKind};

const STRING_NUMBERS: [&str; 6] = ["1", "2", "3", "4", "5", "6"];

/// The terminal side of the session: remembers what to paint until the next
/// frame is drawn.
#[derive(Default)]
pub struct BoardView {
    board: Option<BoardSnapshot>,
    markers: Vec<(Position, MarkerKind)>,
    feedback: Option<(ResultKind, Feedback)>,
}

impl Surface for BoardView {
    fn redraw(&mut self, board: &BoardSnapshot) {
        self.markers = board
            .markers
            .correct
            .iter()
            .map(|&p| (p, MarkerKind::Correct))
            .chain(board.markers.incorrect.iter().map(|&p| (p, MarkerKind::Incorrect)))
            .collect();
        self.feedback = None;
        self.board = Some(board.clone());
    }

    fn place_marker(&mut self, position: Position, kind: MarkerKind) {
        self.markers.push((position, kind));
    }
}

impl BoardView {
    pub fn board(&self) -> Option<&BoardSnapshot> {
        self.board.as_ref()
    }

    pub fn markers(&self) -> &[(Position, MarkerKind)] {
        &self.markers
    }

    pub fn feedback(&self) -> Option<&(ResultKind, Feedback)> {
        self.feedback.as_ref()
    }

    pub fn show_feedback(&mut self, kind: ResultKind, feedback: Feedback) {
        self.feedback = Some((kind, feedback));
    }

    /// Render the neck into `area`.
    pub fn render(&self, frame: &mut ratatui::Frame, area: Rect) {
        let Some(board) = &self.board else {
            return;
        };

        let open_labels: Vec<BoardLabel> = StringIndex::all()
            .map(|s| {
                if board.show_notes {
                    BoardLabel::new(s.open_note().name(), note_style(s.open_note().is_natural()))
                } else {
                    BoardLabel::new(STRING_NUMBERS[s.index() as usize], Style::default().fg(Color::DarkGray))
                }
            })
            .collect();

        let labels: Vec<Vec<BoardLabel>> = StringIndex::all()
            .map(|s| {
                Fret::all()
                    .skip(1)
                    .map(|f| {
                        let note = theory::note_at(s, f);
                        BoardLabel::new(note.name(), note_style(note.is_natural()))
                    })
                    .collect()
            })
            .collect();

        let markers: Vec<BoardMarker> = self
            .markers()
            .iter()
            .map(|(p, kind)| BoardMarker {
                string: p.string.index() as usize,
                fret: p.fret.number() as usize,
                symbol: '●',
                style: marker_style(*kind),
            })
            .collect();

        let dots = DOT_FRETS.map(|f| f as usize);
        let mut widget = Fretboard::new(&open_labels, FRET_COUNT as usize)
            .markers(&markers)
            .dots(&dots)
            .glow(board.glow.map(|s| s.index() as usize));
        if board.show_notes {
            widget = widget.labels(&labels);
        }
        frame.render_widget(widget, area);
    }
}

fn note_style(natural: bool) -> Style {
    if natural {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn marker_style(kind: MarkerKind) -> Style {
    let color = match kind {
        MarkerKind::Correct => Color::Green,
        MarkerKind::Incorrect => Color::Red,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
