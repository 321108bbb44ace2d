use crate::theory::{FRET_COUNT, Fret, Note, Position, StringIndex};

/// Where on a string the player clicked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    /// The open-string hitbox left of the nut.
    Open,
    /// Somewhere on the fretted region, `offset_x` from its left edge.
    Fretted { offset_x: f64, board_width: f64 },
}

/// A click as reported by the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawClick {
    /// Logical string index, 0 = highest string.
    pub string: u8,
    pub hit: Hit,
}

impl RawClick {
    pub fn open(string: u8) -> Self {
        Self {
            string,
            hit: Hit::Open,
        }
    }

    pub fn fretted(string: u8, offset_x: f64, board_width: f64) -> Self {
        Self {
            string,
            hit: Hit::Fretted {
                offset_x,
                board_width,
            },
        }
    }
}

/// Resolve a click into a board position and the note sounding there.
///
/// The fretted region is split into 12 equal cells numbered from 1.
///
/// # Panics
/// The surface's hitbox geometry guarantees a valid string and an offset
/// inside the fretted width; anything else is a contract violation.
pub fn interpret(click: RawClick) -> (Position, Note) {
    let string = StringIndex::new(click.string)
        .unwrap_or_else(|| panic!("click on string {} outside the board", click.string));
    let fret = match click.hit {
        Hit::Open => Fret::OPEN,
        Hit::Fretted {
            offset_x,
            board_width,
        } => {
            assert!(
                board_width > 0.0 && (0.0..board_width).contains(&offset_x),
                "click offset {offset_x} outside fretted width {board_width}"
            );
            // Offsets just below the width can round up to the full fret count.
            let cell = ((offset_x * FRET_COUNT as f64 / board_width).floor() as u8)
                .min(FRET_COUNT - 1);
            Fret::new(cell + 1)
                .unwrap_or_else(|| panic!("click offset {offset_x} resolved past the last fret"))
        }
    };
    let position = Position::new(string, fret);
    (position, position.note())
}
