use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

/// Columns left of the fretted region: open-note label, hitbox, nut.
pub const OPEN_WIDTH: u16 = 4;
/// Fret numbers sit on the first row.
const HEADER_ROWS: u16 = 1;
/// Each string takes one row plus a spacer row.
const ROW_SPACING: u16 = 2;

/// Text drawn at one board cell.
#[derive(Clone, Copy)]
pub struct BoardLabel<'a> {
    pub text: &'a str,
    pub style: Style,
}

impl<'a> BoardLabel<'a> {
    pub fn new(text: &'a str, style: Style) -> Self {
        Self { text, style }
    }
}

/// A click marker. `fret == 0` marks the open-string hitbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardMarker {
    pub string: usize,
    pub fret: usize,
    pub symbol: char,
    pub style: Style,
}

/// What a mouse position on the board corresponds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoardHit {
    Open { string: usize },
    /// `offset_x` is measured from the left edge of the fretted region,
    /// which is `width` columns wide.
    Fretted { string: usize, offset_x: u16, width: u16 },
}

/// A stringed-instrument neck: strings as rows, equal-width fret cells.
///
/// Fret cell `n` (1-based) spans columns
/// `[cell_start(n - 1), cell_start(n))` of the fretted region, so a column
/// offset `o` lies in fret `floor(o * frets / width) + 1`.
pub struct Fretboard<'a> {
    frets: usize,
    open_labels: &'a [BoardLabel<'a>],
    /// Per string, one label per fretted cell.
    labels: Option<&'a [Vec<BoardLabel<'a>>]>,
    markers: &'a [BoardMarker],
    glow: Option<usize>,
    dots: &'a [usize],
    string_style: Style,
    glow_style: Style,
    fret_style: Style,
    number_style: Style,
    dot_style: Style,
}

impl<'a> Fretboard<'a> {
    /// One open label per string; the string count follows from it.
    pub fn new(open_labels: &'a [BoardLabel<'a>], frets: usize) -> Self {
        Self {
            frets,
            open_labels,
            labels: None,
            markers: &[],
            glow: None,
            dots: &[],
            string_style: Style::default().fg(Color::Gray),
            glow_style: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            fret_style: Style::default().fg(Color::DarkGray),
            number_style: Style::default().fg(Color::DarkGray),
            dot_style: Style::default().fg(Color::White),
        }
    }

    pub fn labels(mut self, labels: &'a [Vec<BoardLabel<'a>>]) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn markers(mut self, markers: &'a [BoardMarker]) -> Self {
        self.markers = markers;
        self
    }

    /// Highlight one string.
    pub fn glow(mut self, string: Option<usize>) -> Self {
        self.glow = string;
        self
    }

    /// Frets that get an inlay dot; the last fret gets two.
    pub fn dots(mut self, dots: &'a [usize]) -> Self {
        self.dots = dots;
        self
    }

    pub fn string_style(mut self, style: Style) -> Self {
        self.string_style = style;
        self
    }

    /// Rows needed to draw `strings` strings.
    pub fn height(strings: usize) -> u16 {
        HEADER_ROWS + (strings.saturating_sub(1) as u16) * ROW_SPACING + 2
    }

    /// First column (relative to the fretted region) of cell `cell`
    /// (0-based). `cell_start(frets)` is the region width.
    pub fn cell_start(cell: usize, frets: usize, width: u16) -> u16 {
        ((cell * width as usize).div_ceil(frets)) as u16
    }

    /// Map a terminal position to a board hit.
    ///
    /// Returns `None` outside the strings, on the nut, or when the fretted
    /// region is narrower than one column per fret.
    pub fn hit_test(x: u16, y: u16, area: Rect, strings: usize, frets: usize) -> Option<BoardHit> {
        if !area.contains((x, y).into()) || area.width <= OPEN_WIDTH {
            return None;
        }
        let rel_y = y - area.y;
        if rel_y < HEADER_ROWS {
            return None;
        }
        let row = rel_y - HEADER_ROWS;
        if strings == 0 || row as usize > (strings - 1) * ROW_SPACING as usize {
            return None;
        }
        let string = (row / ROW_SPACING) as usize;

        let left = area.x + OPEN_WIDTH;
        let width = area.right() - left;
        if x < left - 1 {
            Some(BoardHit::Open { string })
        } else if x == left - 1 || (width as usize) < frets {
            None
        } else {
            Some(BoardHit::Fretted {
                string,
                offset_x: x - left,
                width,
            })
        }
    }

    fn string_y(area: Rect, string: usize) -> u16 {
        area.y + HEADER_ROWS + string as u16 * ROW_SPACING
    }

    /// Center column of fret `fret` (1-based), absolute.
    fn fret_x(&self, left: u16, width: u16, fret: usize) -> u16 {
        let start = Self::cell_start(fret - 1, self.frets, width);
        let end = Self::cell_start(fret, self.frets, width);
        left + start + (end - start).saturating_sub(1) / 2
    }

    /// Column of the fret wire closing cell `fret`, absolute.
    fn wire_x(&self, left: u16, width: u16, fret: usize) -> u16 {
        left + Self::cell_start(fret, self.frets, width) - 1
    }
}

fn put_str(buf: &mut Buffer, x: u16, y: u16, right: u16, text: &str, style: Style) {
    for (i, ch) in text.chars().enumerate() {
        let cx = x + i as u16;
        if cx >= right {
            break;
        }
        if let Some(cell) = buf.cell_mut((cx, y)) {
            cell.set_char(ch);
            cell.set_style(style);
        }
    }
}

impl Widget for Fretboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let strings = self.open_labels.len();
        if strings == 0 || self.frets == 0 || area.width <= OPEN_WIDTH || area.height == 0 {
            return;
        }
        let left = area.x + OPEN_WIDTH;
        let width = area.right() - left;
        if (width as usize) < self.frets {
            put_str(buf, area.x, area.y, area.right(), "(terminal too narrow)", self.fret_style);
            return;
        }
        let bottom = area.bottom();
        let last_string_y = Self::string_y(area, strings - 1).min(bottom.saturating_sub(1));

        // Fret numbers.
        for fret in 1..=self.frets {
            let label = fret.to_string();
            put_str(
                buf,
                self.fret_x(left, width, fret),
                area.y,
                area.right(),
                &label,
                self.number_style,
            );
        }

        // Strings, nut and fret wires.
        for y in Self::string_y(area, 0)..=last_string_y {
            let on_string = (y - area.y - HEADER_ROWS) % ROW_SPACING == 0;
            let string = ((y - area.y - HEADER_ROWS) / ROW_SPACING) as usize;
            if on_string {
                let style = if self.glow == Some(string) {
                    self.glow_style
                } else {
                    self.string_style
                };
                for x in left..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char('─');
                        cell.set_style(style);
                    }
                }
                let open = self.open_labels[string];
                put_str(buf, area.x, y, left - 1, open.text, open.style);
            }
            if let Some(cell) = buf.cell_mut((left - 1, y)) {
                cell.set_char('║');
                cell.set_style(self.fret_style);
            }
            for fret in 1..=self.frets {
                let x = self.wire_x(left, width, fret);
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(if on_string { '┼' } else { '│' });
                    cell.set_style(self.fret_style);
                }
            }
        }

        // Inlay dots.
        let dot_y = last_string_y + 1;
        if dot_y < bottom {
            for &fret in self.dots.iter().filter(|&&f| f >= 1 && f <= self.frets) {
                let x = self.fret_x(left, width, fret);
                let text = if fret == self.frets { "••" } else { "•" };
                put_str(buf, x, dot_y, area.right(), text, self.dot_style);
            }
        }

        // Note labels.
        if let Some(labels) = self.labels {
            for (string, row) in labels.iter().enumerate().take(strings) {
                let y = Self::string_y(area, string);
                if y >= bottom {
                    break;
                }
                for (i, label) in row.iter().enumerate().take(self.frets) {
                    let x = self.fret_x(left, width, i + 1);
                    put_str(buf, x, y, area.right(), label.text, label.style);
                }
            }
        }

        // Markers. With labels shown the label text is kept and restyled.
        for m in self.markers.iter().filter(|m| m.string < strings && m.fret <= self.frets) {
            let y = Self::string_y(area, m.string);
            if y >= bottom {
                continue;
            }
            if m.fret == 0 {
                let open = self.open_labels[m.string];
                put_str(buf, area.x, y, left - 1, open.text, m.style);
                if let Some(cell) = buf.cell_mut((area.x + 2, y)) {
                    cell.set_char(m.symbol);
                    cell.set_style(m.style);
                }
                continue;
            }
            let x = self.fret_x(left, width, m.fret);
            match self.labels.and_then(|l| l.get(m.string)).and_then(|r| r.get(m.fret - 1)) {
                Some(label) => put_str(buf, x, y, area.right(), label.text, m.style),
                None => {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char(m.symbol);
                        cell.set_style(m.style);
                    }
                }
            }
        }
    }
}
