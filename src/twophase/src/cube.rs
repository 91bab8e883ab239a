use std::fmt;

use itertools::Itertools;
use thiserror::Error;

use crate::moves::{Face, Move};

pub const N_CORNERS: usize = 8;
pub const N_EDGES: usize = 12;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    URF,
    UFL,
    ULB,
    UBR,
    DFR,
    DLF,
    DBL,
    DRB,
}

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    UR,
    UF,
    UL,
    UB,
    DR,
    DF,
    DL,
    DB,
    FR,
    FL,
    BL,
    BR,
}

/// The pieces cycled by one clockwise quarter turn. With slots `[a, b, c, d]`
/// the piece in `b` moves to `a`, `c` to `b`, `d` to `c` and `a` to `d`.
struct FaceTurn {
    corners: [Corner; 4],
    edges: [Edge; 4],
    twists: bool,
    flips: bool,
}

/// Added to the twist of each cycled corner, in cycle order.
const TWIST_DELTAS: [u8; 4] = [2, 1, 2, 1];

const FACE_TURNS: [FaceTurn; 6] = {
    use Corner::*;
    use Edge::*;
    [
        FaceTurn {
            corners: [URF, UBR, ULB, UFL],
            edges: [UR, UB, UL, UF],
            twists: false,
            flips: false,
        },
        FaceTurn {
            corners: [URF, DFR, DRB, UBR],
            edges: [UR, FR, DR, BR],
            twists: true,
            flips: false,
        },
        FaceTurn {
            corners: [UFL, DLF, DFR, URF],
            edges: [UF, FL, DF, FR],
            twists: true,
            flips: true,
        },
        FaceTurn {
            corners: [DFR, DLF, DBL, DRB],
            edges: [DR, DF, DL, DB],
            twists: false,
            flips: false,
        },
        FaceTurn {
            corners: [ULB, DBL, DLF, UFL],
            edges: [UL, BL, DL, FL],
            twists: true,
            flips: false,
        },
        FaceTurn {
            corners: [UBR, DRB, DBL, ULB],
            edges: [UB, BR, DB, BL],
            twists: true,
            flips: true,
        },
    ]
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeStateError {
    #[error("The corner permutation {0:?} is not a permutation of the 8 corners")]
    CornerPermutation([u8; N_CORNERS]),
    #[error("The edge permutation {0:?} is not a permutation of the 12 edges")]
    EdgePermutation([u8; N_EDGES]),
    #[error("Corner twist {value} in slot {slot} is out of range, expected 0, 1 or 2")]
    TwistOutOfRange { slot: usize, value: u8 },
    #[error("Edge flip {value} in slot {slot} is out of range, expected 0 or 1")]
    FlipOutOfRange { slot: usize, value: u8 },
    #[error("The corner twists sum to {0}, which is not divisible by 3")]
    TwistSum(u32),
    #[error("The edge flips sum to {0}, which is not even")]
    FlipSum(u32),
    #[error("The corner and edge permutations have different parities")]
    ParityMismatch,
}

/// A cube as a permutation and orientation of its corners and edges.
///
/// Slot `i` of `cp` holds the id of the corner piece sitting in corner slot
/// `i`, and `co[i]` its clockwise twist. Edges are the same with flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeState {
    pub(crate) cp: [u8; N_CORNERS],
    pub(crate) co: [u8; N_CORNERS],
    pub(crate) ep: [u8; N_EDGES],
    pub(crate) eo: [u8; N_EDGES],
}

impl Default for CubeState {
    fn default() -> Self {
        Self::SOLVED
    }
}

fn cycle<const N: usize>(arr: &mut [u8; N], [a, b, c, d]: [usize; 4]) {
    let first = arr[a];
    arr[a] = arr[b];
    arr[b] = arr[c];
    arr[c] = arr[d];
    arr[d] = first;
}

/// Whether `perm` is an odd permutation.
fn is_odd(perm: &[u8]) -> bool {
    perm.iter()
        .tuple_combinations()
        .filter(|(a, b)| a > b)
        .count()
        % 2
        == 1
}

fn is_permutation(perm: &[u8]) -> bool {
    let mut seen = 0_u16;
    for &piece in perm {
        if usize::from(piece) >= perm.len() || seen & (1 << piece) != 0 {
            return false;
        }
        seen |= 1 << piece;
    }
    true
}

impl CubeState {
    pub const SOLVED: CubeState = CubeState {
        cp: [0, 1, 2, 3, 4, 5, 6, 7],
        co: [0; N_CORNERS],
        ep: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        eo: [0; N_EDGES],
    };

    /// Builds a state from raw piece data, checking that it describes a cube
    /// reachable by face turns.
    ///
    /// # Errors
    ///
    /// Returns the first broken invariant as a [`CubeStateError`].
    pub fn new(
        cp: [u8; N_CORNERS],
        co: [u8; N_CORNERS],
        ep: [u8; N_EDGES],
        eo: [u8; N_EDGES],
    ) -> Result<Self, CubeStateError> {
        let state = CubeState { cp, co, ep, eo };
        state.validate()?;
        Ok(state)
    }

    /// # Errors
    ///
    /// Returns the first broken invariant as a [`CubeStateError`].
    pub fn validate(&self) -> Result<(), CubeStateError> {
        if !is_permutation(&self.cp) {
            return Err(CubeStateError::CornerPermutation(self.cp));
        }
        if !is_permutation(&self.ep) {
            return Err(CubeStateError::EdgePermutation(self.ep));
        }
        if let Some((slot, &value)) = self.co.iter().find_position(|&&twist| twist > 2) {
            return Err(CubeStateError::TwistOutOfRange { slot, value });
        }
        if let Some((slot, &value)) = self.eo.iter().find_position(|&&flip| flip > 1) {
            return Err(CubeStateError::FlipOutOfRange { slot, value });
        }
        let twist_sum = self.co.iter().map(|&twist| u32::from(twist)).sum::<u32>();
        if twist_sum % 3 != 0 {
            return Err(CubeStateError::TwistSum(twist_sum));
        }
        let flip_sum = self.eo.iter().map(|&flip| u32::from(flip)).sum::<u32>();
        if flip_sum % 2 != 0 {
            return Err(CubeStateError::FlipSum(flip_sum));
        }
        if self.corner_parity() != self.edge_parity() {
            return Err(CubeStateError::ParityMismatch);
        }
        Ok(())
    }

    #[must_use]
    pub fn corner_permutation(&self) -> &[u8; N_CORNERS] {
        &self.cp
    }

    #[must_use]
    pub fn corner_orientation(&self) -> &[u8; N_CORNERS] {
        &self.co
    }

    #[must_use]
    pub fn edge_permutation(&self) -> &[u8; N_EDGES] {
        &self.ep
    }

    #[must_use]
    pub fn edge_orientation(&self) -> &[u8; N_EDGES] {
        &self.eo
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    /// Whether the corner permutation is odd.
    #[must_use]
    pub fn corner_parity(&self) -> bool {
        is_odd(&self.cp)
    }

    /// Whether the edge permutation is odd.
    #[must_use]
    pub fn edge_parity(&self) -> bool {
        is_odd(&self.ep)
    }

    fn quarter_turn(&mut self, face: Face) {
        let turn = &FACE_TURNS[face.index()];

        let corners = turn.corners.map(|corner| corner as usize);
        cycle(&mut self.cp, corners);
        cycle(&mut self.co, corners);
        if turn.twists {
            for (slot, delta) in corners.into_iter().zip(TWIST_DELTAS) {
                self.co[slot] = (self.co[slot] + delta) % 3;
            }
        }

        let edges = turn.edges.map(|edge| edge as usize);
        cycle(&mut self.ep, edges);
        cycle(&mut self.eo, edges);
        if turn.flips {
            for slot in edges {
                self.eo[slot] ^= 1;
            }
        }
    }

    pub fn apply(&mut self, m: Move) {
        for _ in 0..m.power() {
            self.quarter_turn(m.face());
        }
    }

    pub fn apply_sequence(&mut self, moves: &[Move]) {
        for &m in moves {
            self.apply(m);
        }
    }

    #[must_use]
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut state = Self::SOLVED;
        state.apply_sequence(moves);
        state
    }

    /// `self` followed by `other`: piece `i` of the result is the piece
    /// `self` holds at `other`'s slot for `i`, with `other`'s orientation
    /// added on top.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        let mut out = Self::SOLVED;
        for i in 0..N_CORNERS {
            let from = usize::from(other.cp[i]);
            out.cp[i] = self.cp[from];
            out.co[i] = (self.co[from] + other.co[i]) % 3;
        }
        for i in 0..N_EDGES {
            let from = usize::from(other.ep[i]);
            out.ep[i] = self.ep[from];
            out.eo[i] = (self.eo[from] + other.eo[i]) % 2;
        }
        out
    }

    #[must_use]
    pub fn invert(&self) -> Self {
        let mut out = Self::SOLVED;
        for i in 0..N_CORNERS {
            let to = usize::from(self.cp[i]);
            out.cp[to] = i as u8;
            out.co[to] = (3 - self.co[i]) % 3;
        }
        for i in 0..N_EDGES {
            let to = usize::from(self.ep[i]);
            out.ep[to] = i as u8;
            out.eo[to] = self.eo[i];
        }
        out
    }

    /// A uniformly random state among those reachable by face turns.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let mut state = Self::SOLVED;
        rng.shuffle(&mut state.cp);
        rng.shuffle(&mut state.ep);
        if state.corner_parity() != state.edge_parity() {
            state.ep.swap(0, 1);
        }
        for twist in &mut state.co[..N_CORNERS - 1] {
            *twist = rng.u8(0..3);
        }
        state.co[N_CORNERS - 1] = (3 - state.co.iter().sum::<u8>() % 3) % 3;
        for flip in &mut state.eo[..N_EDGES - 1] {
            *flip = rng.u8(0..2);
        }
        state.eo[N_EDGES - 1] = state.eo.iter().sum::<u8>() % 2;
        state
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let corners = self
            .cp
            .iter()
            .zip(&self.co)
            .map(|(piece, twist)| format!("{piece}:{twist}"))
            .join(" ");
        let edges = self
            .ep
            .iter()
            .zip(&self.eo)
            .map(|(piece, flip)| format!("{piece}:{flip}"))
            .join(" ");
        writeln!(f, "corners: {corners}")?;
        write!(f, "edges:   {edges}")
    }
}
