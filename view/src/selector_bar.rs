use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Widget;

/// One labelled group of mutually exclusive options.
#[derive(Clone, Copy)]
pub struct SelectorGroup<'a> {
    pub label: &'a str,
    pub options: &'a [&'a str],
    pub active: usize,
    /// Disabled groups are drawn dimmed and ignore clicks.
    pub enabled: bool,
}

impl<'a> SelectorGroup<'a> {
    pub fn new(label: &'a str, options: &'a [&'a str], active: usize) -> Self {
        Self {
            label,
            options,
            active,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A single-row bar of option groups, e.g. `Mode: Note Interval │ String: all 1 2`.
pub struct SelectorBar<'a> {
    groups: &'a [SelectorGroup<'a>],
    style: Style,
    active_style: Style,
    label_style: Style,
    disabled_style: Style,
    separator: &'a str,
}

#[derive(Debug, PartialEq, Eq)]
enum Span {
    Label(usize),
    Option(usize, usize),
    Separator,
}

/// Column layout shared by rendering and hit-testing.
fn layout(groups: &[SelectorGroup], separator: &str) -> Vec<(Span, usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0;
    for (g, group) in groups.iter().enumerate() {
        if g > 0 {
            let len = separator.chars().count();
            spans.push((Span::Separator, pos, len));
            pos += len;
        }
        let len = group.label.chars().count() + 2;
        spans.push((Span::Label(g), pos, len));
        pos += len;
        for (o, option) in group.options.iter().enumerate() {
            if o > 0 {
                pos += 1;
            }
            let len = option.chars().count();
            spans.push((Span::Option(g, o), pos, len));
            pos += len;
        }
    }
    spans
}

impl<'a> SelectorBar<'a> {
    pub fn new(groups: &'a [SelectorGroup<'a>]) -> Self {
        Self {
            groups,
            style: Style::default().fg(Color::Gray),
            active_style: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            label_style: Style::default().fg(Color::DarkGray),
            disabled_style: Style::default().fg(Color::DarkGray),
            separator: " │ ",
        }
    }

    pub fn active_style(mut self, style: Style) -> Self {
        self.active_style = style;
        self
    }

    pub fn separator(mut self, sep: &'a str) -> Self {
        self.separator = sep;
        self
    }

    /// Hit-test: return `(group, option)` under the click, skipping
    /// disabled groups. `area` is the Rect the bar was rendered into.
    pub fn option_at(
        x: u16,
        y: u16,
        area: Rect,
        groups: &[SelectorGroup],
        separator: &str,
    ) -> Option<(usize, usize)> {
        if y != area.y || x < area.x || x >= area.right() {
            return None;
        }
        let rel_x = (x - area.x) as usize;
        layout(groups, separator)
            .into_iter()
            .find_map(|(span, start, len)| match span {
                Span::Option(g, o)
                    if groups[g].enabled && rel_x >= start && rel_x < start + len =>
                {
                    Some((g, o))
                }
                _ => None,
            })
    }
}

impl Widget for SelectorBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let y = area.y;
        for (span, start, _) in layout(self.groups, self.separator) {
            let (text, style) = match span {
                Span::Separator => (self.separator.to_string(), self.label_style),
                Span::Label(g) => (format!("{}: ", self.groups[g].label), self.label_style),
                Span::Option(g, o) => {
                    let group = &self.groups[g];
                    let style = if !group.enabled {
                        self.disabled_style
                    } else if o == group.active {
                        self.active_style
                    } else {
                        self.style
                    };
                    (group.options[o].to_string(), style)
                }
            };
            for (i, ch) in text.chars().enumerate() {
                let x = area.x as usize + start + i;
                if x >= area.right() as usize {
                    break;
                }
                if let Some(cell) = buf.cell_mut((x as u16, y)) {
                    cell.set_char(ch);
                    cell.set_style(style);
                }
            }
        }
    }
}
