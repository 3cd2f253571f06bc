//! Braille chord decoding
//!
//! A chord is built from up to six dot keys. Each dot contributes a fixed
//! positional value (1, 10, 100, ... 100000), so the accumulated code reads
//! like a six-digit binary number written in decimal. The code is then looked
//! up in a fixed table of Cyrillic letters.

use std::fmt;
use thiserror::Error;

/// Number of dot keys on the chord keyboard
pub const DOT_COUNT: usize = 6;

/// Positional value contributed by each dot, indexed by dot position
pub const DOT_WEIGHTS: [u32; DOT_COUNT] = [1, 10, 100, 1_000, 10_000, 100_000];

/// Errors produced by the chord decoder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChordError {
    /// Dot index outside `0..6`
    #[error("dot index {0} out of range (expected 0..{DOT_COUNT})")]
    DotOutOfRange(usize),
}

/// One of the six Braille dot positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dot(u8);

impl Dot {
    /// Creates a dot from a zero-based index
    ///
    /// # Errors
    /// Returns [`ChordError::DotOutOfRange`] if `index >= 6`
    pub fn new(index: usize) -> Result<Self, ChordError> {
        u8::try_from(index)
            .ok()
            .filter(|&i| usize::from(i) < DOT_COUNT)
            .map(Self)
            .ok_or(ChordError::DotOutOfRange(index))
    }

    /// Zero-based index of this dot
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Positional value this dot adds to a chord code
    pub const fn weight(self) -> u32 {
        DOT_WEIGHTS[self.0 as usize]
    }
}

/// Accumulated chord value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChordCode(pub u32);

impl fmt::Display for ChordCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

/// Result of resolving a chord code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Uppercase Cyrillic letter
    Letter(char),
    /// Empty chord
    Space,
    /// Code absent from the letter table
    Unknown,
}

impl Glyph {
    /// Character used when composing words, `None` for unknown chords
    pub const fn as_char(self) -> Option<char> {
        match self {
            Self::Letter(c) => Some(c),
            Self::Space => Some(' '),
            Self::Unknown => None,
        }
    }
}

const LETTER_TABLE: [(u32, char); 33] = [
    (1, 'А'),
    (11, 'Б'),
    (111_010, 'В'),
    (11_011, 'Г'),
    (11_001, 'Д'),
    (10_001, 'Е'),
    (100_001, 'Ё'),
    (11_010, 'Ж'),
    (110_101, 'З'),
    (1_010, 'И'),
    (101_111, 'Й'),
    (101, 'К'),
    (111, 'Л'),
    (1_101, 'М'),
    (11_101, 'Н'),
    (10_101, 'О'),
    (1_111, 'П'),
    (10_111, 'Р'),
    (1_110, 'С'),
    (11_110, 'Т'),
    (100_101, 'У'),
    (1_011, 'Ф'),
    (10_011, 'Х'),
    (1_001, 'Ц'),
    (11_111, 'Ч'),
    (110_001, 'Ш'),
    (101_101, 'Щ'),
    (110_111, 'Ъ'),
    (101_110, 'Ы'),
    (111_110, 'Ь'),
    (101_010, 'Э'),
    (110_011, 'Ю'),
    (101_011, 'Я'),
];

/// Looks up a chord code in the letter table
pub fn resolve(code: ChordCode) -> Glyph {
    if code.0 == 0 {
        return Glyph::Space;
    }
    LETTER_TABLE
        .iter()
        .find(|(value, _)| *value == code.0)
        .map_or(Glyph::Unknown, |&(_, letter)| Glyph::Letter(letter))
}

/// Chord code for a letter, if the letter is in the table
pub fn code_for(letter: char) -> Option<ChordCode> {
    let upper = letter.to_uppercase().next()?;
    LETTER_TABLE
        .iter()
        .find(|(_, l)| *l == upper)
        .map(|&(value, _)| ChordCode(value))
}

/// Accumulates dot presses into a chord
///
/// Pressed dots are kept as a bit mask, so pressing the same dot twice within
/// one chord counts once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChordDecoder {
    pressed: u8,
}

impl ChordDecoder {
    /// Creates an empty decoder
    pub const fn new() -> Self {
        Self { pressed: 0 }
    }

    /// Adds one dot to the current chord
    pub fn accumulate(&mut self, dot: Dot) {
        self.pressed |= 1 << dot.0;
        tracing::trace!(dot = dot.index(), code = %self.code(), "dot pressed");
    }

    /// Current accumulated code
    pub fn code(&self) -> ChordCode {
        ChordCode(self.pressed_dots().iter().map(|d| d.weight()).sum())
    }

    /// Dots pressed so far, in index order
    pub fn pressed_dots(&self) -> Vec<Dot> {
        (0..DOT_COUNT)
            .filter(|i| self.pressed & (1 << i) != 0)
            .filter_map(|i| Dot::new(i).ok())
            .collect()
    }

    /// Resolves the current chord without clearing it
    pub fn peek(&self) -> Glyph {
        resolve(self.code())
    }

    /// Resolves the current chord and clears the accumulator
    pub fn submit(&mut self) -> Glyph {
        let glyph = self.peek();
        self.reset();
        glyph
    }

    /// Clears the accumulator
    pub fn reset(&mut self) {
        self.pressed = 0;
    }
}
