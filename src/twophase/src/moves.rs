use std::{fmt, str::FromStr};

use itertools::Itertools;
use thiserror::Error;

/// The six faces in `U R F D L B` order. Opposite faces are three apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::U, Face::R, Face::F, Face::D, Face::L, Face::B];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// `0` for the U/D axis, `1` for R/L and `2` for F/B.
    #[must_use]
    pub const fn axis(self) -> usize {
        self as usize % 3
    }

    #[must_use]
    pub const fn opposite(self) -> Face {
        Face::ALL[(self as usize + 3) % 6]
    }

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }

    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Face> {
        Some(match letter {
            'U' => Face::U,
            'R' => Face::R,
            'F' => Face::F,
            'D' => Face::D,
            'L' => Face::L,
            'B' => Face::B,
            _ => return None,
        })
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A face turned clockwise `power` quarter turns, with `power` in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    face: Face,
    power: u8,
}

pub const N_MOVES: usize = 18;
pub const N_PHASE2_MOVES: usize = 10;

impl Move {
    /// Every move ordered face-major, so `Move::ALL[m.index()] == m`.
    pub const ALL: [Move; N_MOVES] = {
        let mut arr = [Move {
            face: Face::U,
            power: 1,
        }; N_MOVES];
        let mut i = 0;
        while i < N_MOVES {
            arr[i] = Move {
                face: Face::ALL[i / 3],
                power: (i % 3) as u8 + 1,
            };
            i += 1;
        }
        arr
    };

    /// The generator of the subgroup phase two searches in: every turn of U
    /// and D, and half turns of the side faces.
    pub const PHASE2: [Move; N_PHASE2_MOVES] = [
        Move::new(Face::U, 1),
        Move::new(Face::U, 2),
        Move::new(Face::U, 3),
        Move::new(Face::R, 2),
        Move::new(Face::F, 2),
        Move::new(Face::D, 1),
        Move::new(Face::D, 2),
        Move::new(Face::D, 3),
        Move::new(Face::L, 2),
        Move::new(Face::B, 2),
    ];

    /// # Panics
    ///
    /// Panics when `power` is not in `1..=3`.
    #[must_use]
    pub const fn new(face: Face, power: u8) -> Move {
        assert!(power >= 1 && power <= 3, "A move's power must be 1, 2 or 3");
        Move { face, power }
    }

    #[must_use]
    pub const fn face(self) -> Face {
        self.face
    }

    #[must_use]
    pub const fn power(self) -> u8 {
        self.power
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.face as usize * 3 + self.power as usize - 1
    }

    #[must_use]
    pub const fn inverse(self) -> Move {
        Move {
            face: self.face,
            power: 4 - self.power,
        }
    }

    #[must_use]
    pub const fn is_phase2(self) -> bool {
        matches!(self.face, Face::U | Face::D) || self.power == 2
    }

    /// Whether the move is an odd permutation of the eight U and D layer
    /// edge slots. Within the phase two subgroup this is the same as the
    /// parity flip it causes on the UD edge permutation.
    #[must_use]
    pub const fn flips_ud_edge_parity(self) -> bool {
        match self.face {
            Face::U | Face::D => self.power != 2,
            // A half turn of a side face swaps one U edge with one D edge
            _ => self.power == 2,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.power {
            1 => write!(f, "{}", self.face),
            2 => write!(f, "{}2", self.face),
            _ => write!(f, "{}'", self.face),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("Unknown move `{0}`, expected a face letter optionally followed by `2` or `'`")]
    UnknownToken(String),
    #[error("Unknown face letter `{0}` in a compact move sequence")]
    UnknownFace(char),
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut chars = token.chars();
        let face = chars
            .next()
            .and_then(Face::from_letter)
            .ok_or_else(|| MoveParseError::UnknownToken(token.to_owned()))?;
        let power = match chars.as_str() {
            "" | "1" => 1,
            "2" | "2'" => 2,
            "'" | "3" => 3,
            _ => return Err(MoveParseError::UnknownToken(token.to_owned())),
        };
        Ok(Move { face, power })
    }
}

/// Parses whitespace separated notation such as `R U2 F'`.
///
/// # Errors
///
/// Returns [`MoveParseError::UnknownToken`] for the first token that is not
/// a move.
pub fn parse_moves(s: &str) -> Result<Vec<Move>, MoveParseError> {
    s.split_whitespace().map(str::parse).collect()
}

#[must_use]
pub fn format_moves(moves: &[Move]) -> String {
    moves.iter().join(" ")
}

/// Writes each move as its face letter repeated `power` times, so `R U2 F'`
/// becomes `RUUFFF`. This only round trips for sequences that never turn the
/// same face twice in a row, which solver output guarantees.
#[must_use]
pub fn format_compact(moves: &[Move]) -> String {
    moves
        .iter()
        .flat_map(|m| std::iter::repeat_n(m.face.letter(), usize::from(m.power)))
        .collect()
}

/// Inverse of [`format_compact`]. A run of four identical letters is a full
/// turn and cancels; longer runs wrap around.
///
/// # Errors
///
/// Returns [`MoveParseError::UnknownFace`] for any letter that is not one of
/// `URFDLB`.
pub fn parse_compact(s: &str) -> Result<Vec<Move>, MoveParseError> {
    let mut moves = vec![];
    for (letter, run) in &s.chars().filter(|c| !c.is_whitespace()).chunk_by(|&c| c) {
        let face = Face::from_letter(letter).ok_or(MoveParseError::UnknownFace(letter))?;
        let power = run.count() % 4;
        if power != 0 {
            moves.push(Move {
                face,
                power: power as u8,
            });
        }
    }
    Ok(moves)
}

/// Merges consecutive turns of the same face, dropping the ones that cancel
/// out entirely.
#[must_use]
pub fn simplify(moves: &[Move]) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(moves.len());
    for &m in moves {
        match out.last_mut() {
            Some(last) if last.face == m.face => {
                let power = (last.power + m.power) % 4;
                if power == 0 {
                    out.pop();
                } else {
                    last.power = power;
                }
            }
            _ => out.push(m),
        }
    }
    out
}

/// A random walk of `len` moves in which no two consecutive moves share an
/// axis.
pub fn random_scramble(rng: &mut fastrand::Rng, len: usize) -> Vec<Move> {
    let mut moves = Vec::with_capacity(len);
    let mut last_axis = None;
    while moves.len() < len {
        let face = Face::ALL[rng.usize(..Face::ALL.len())];
        if last_axis == Some(face.axis()) {
            continue;
        }
        last_axis = Some(face.axis());
        moves.push(Move {
            face,
            power: rng.u8(1..=3),
        });
    }
    moves
}
