//! Rank and unrank functions mapping parts of a [`CubeState`] to small
//! integers.
//!
//! Every `unrank` returns a canonical representative that passes
//! [`CubeState::validate`]; pieces the coordinate does not describe are left
//! solved, and permutation parity is repaired with pieces the coordinate
//! ignores.

use crate::{
    CHOOSE, FACT_UNTIL_8,
    cube::{CubeState, N_CORNERS, N_EDGES},
    move_tables::MoveTables,
    moves::Move,
};

pub const N_CORNER_ORIENTATION: usize = 2187;
pub const N_EDGE_ORIENTATION: usize = 2048;
pub const N_UD_SLICE: usize = 495;
pub const N_CORNER_PERMUTATION: usize = 40320;
pub const N_UD_EDGE_PERMUTATION: usize = 40320;
pub const N_SLICE_PERMUTATION: usize = 24;
pub const N_LAYER_EDGE_PERMUTATION: usize = 24;

/// Slot positions `{8, 9, 10, 11}` ranked by [`ud_slice`].
pub const SOLVED_UD_SLICE: u16 = 494;

/// The first slice edge id; `FR FL BL BR` are `8..12`.
const SLICE_EDGE: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordKind {
    CornerOrientation,
    EdgeOrientation,
    UdSlice,
    CornerPermutation,
    UdEdgePermutation,
    SlicePermutation,
    UEdgePermutation,
    DEdgePermutation,
}

impl CoordKind {
    pub const ALL: [CoordKind; 8] = [
        CoordKind::CornerOrientation,
        CoordKind::EdgeOrientation,
        CoordKind::UdSlice,
        CoordKind::CornerPermutation,
        CoordKind::UdEdgePermutation,
        CoordKind::SlicePermutation,
        CoordKind::UEdgePermutation,
        CoordKind::DEdgePermutation,
    ];

    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            CoordKind::CornerOrientation => N_CORNER_ORIENTATION,
            CoordKind::EdgeOrientation => N_EDGE_ORIENTATION,
            CoordKind::UdSlice => N_UD_SLICE,
            CoordKind::CornerPermutation => N_CORNER_PERMUTATION,
            CoordKind::UdEdgePermutation => N_UD_EDGE_PERMUTATION,
            CoordKind::SlicePermutation => N_SLICE_PERMUTATION,
            CoordKind::UEdgePermutation | CoordKind::DEdgePermutation => {
                N_LAYER_EDGE_PERMUTATION
            }
        }
    }

    #[must_use]
    pub const fn solved(self) -> u16 {
        match self {
            CoordKind::UdSlice => SOLVED_UD_SLICE,
            _ => 0,
        }
    }

    /// Coordinates that are only defined once the slice edges are in the
    /// slice, and are therefore only closed under the phase two moves.
    #[must_use]
    pub const fn is_phase2_only(self) -> bool {
        matches!(
            self,
            CoordKind::UdEdgePermutation
                | CoordKind::SlicePermutation
                | CoordKind::UEdgePermutation
                | CoordKind::DEdgePermutation
        )
    }

    #[must_use]
    pub fn rank(self, state: &CubeState) -> u16 {
        match self {
            CoordKind::CornerOrientation => corner_orientation(state),
            CoordKind::EdgeOrientation => edge_orientation(state),
            CoordKind::UdSlice => ud_slice(state),
            CoordKind::CornerPermutation => corner_permutation(state),
            CoordKind::UdEdgePermutation => ud_edge_permutation(state),
            CoordKind::SlicePermutation => slice_permutation(state),
            CoordKind::UEdgePermutation => u_edge_permutation(state),
            CoordKind::DEdgePermutation => d_edge_permutation(state),
        }
    }

    /// # Panics
    ///
    /// Panics if `value` is not below [`CoordKind::size`].
    #[must_use]
    pub fn unrank(self, value: u16) -> CubeState {
        assert!(
            usize::from(value) < self.size(),
            "{value} is out of range for {self:?}"
        );
        match self {
            CoordKind::CornerOrientation => set_corner_orientation(value),
            CoordKind::EdgeOrientation => set_edge_orientation(value),
            CoordKind::UdSlice => set_ud_slice(value),
            CoordKind::CornerPermutation => set_corner_permutation(value),
            CoordKind::UdEdgePermutation => set_ud_edge_permutation(value),
            CoordKind::SlicePermutation => set_slice_permutation(value),
            CoordKind::UEdgePermutation => set_u_edge_permutation(value),
            CoordKind::DEdgePermutation => set_d_edge_permutation(value),
        }
    }
}

/// Lehmer rank of the relative order of `values`: the number of later
/// entries smaller than each entry, combined as a falling factorial number.
/// Identity order ranks 0.
fn lehmer_rank(values: &[u8]) -> u16 {
    let n = values.len();
    let mut rank = 0;
    for (i, &value) in values.iter().enumerate() {
        let smaller = values[i + 1..].iter().filter(|&&later| later < value).count();
        rank = rank * (n - i) as u32 + smaller as u32;
    }
    rank as u16
}

/// Writes the permutation of `0..out.len()` with Lehmer rank `rank`.
fn lehmer_unrank(mut rank: u32, out: &mut [u8]) {
    let n = out.len();
    let mut unused: Vec<u8> = (0..n as u8).collect();
    for (i, slot) in out.iter_mut().enumerate() {
        let place = FACT_UNTIL_8[n - 1 - i];
        let index = (rank / place) as usize;
        rank %= place;
        *slot = unused.remove(index);
    }
}

/// Parity of the permutation of `n` elements with Lehmer rank `rank`: the sum
/// of its Lehmer digits counts its inversions.
#[must_use]
pub fn lehmer_parity(rank: u16, n: usize) -> u8 {
    let mut rank = u32::from(rank);
    let mut inversions = 0;
    for i in 0..n {
        let place = FACT_UNTIL_8[n - 1 - i];
        inversions += rank / place;
        rank %= place;
    }
    (inversions % 2) as u8
}

fn repair_parity_with_corners(state: &mut CubeState) {
    if state.corner_parity() != state.edge_parity() {
        state.cp.swap(0, 1);
    }
}

fn repair_parity_with_edges(state: &mut CubeState) {
    if state.corner_parity() != state.edge_parity() {
        state.ep.swap(usize::from(SLICE_EDGE), usize::from(SLICE_EDGE) + 1);
    }
}

#[must_use]
pub fn corner_orientation(state: &CubeState) -> u16 {
    state.co[..N_CORNERS - 1]
        .iter()
        .fold(0, |acc, &twist| acc * 3 + u16::from(twist))
}

fn set_corner_orientation(mut value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    for twist in state.co[..N_CORNERS - 1].iter_mut().rev() {
        *twist = (value % 3) as u8;
        value /= 3;
    }
    state.co[N_CORNERS - 1] = (3 - state.co.iter().sum::<u8>() % 3) % 3;
    state
}

#[must_use]
pub fn edge_orientation(state: &CubeState) -> u16 {
    state.eo[..N_EDGES - 1]
        .iter()
        .fold(0, |acc, &flip| acc * 2 + u16::from(flip))
}

fn set_edge_orientation(mut value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    for flip in state.eo[..N_EDGES - 1].iter_mut().rev() {
        *flip = (value % 2) as u8;
        value /= 2;
    }
    state.eo[N_EDGES - 1] = state.eo.iter().sum::<u8>() % 2;
    state
}

/// Combinatorial rank of the four slots holding slice edges: with occupied
/// slots `p0 < p1 < p2 < p3` this is `C(p0, 1) + C(p1, 2) + C(p2, 3) + C(p3, 4)`.
#[must_use]
pub fn ud_slice(state: &CubeState) -> u16 {
    let mut rank = 0;
    let mut seen = 0;
    for (slot, &edge) in state.ep.iter().enumerate() {
        if edge >= SLICE_EDGE {
            seen += 1;
            rank += CHOOSE[slot][seen];
        }
    }
    rank as u16
}

fn set_ud_slice(value: u16) -> CubeState {
    let mut occupied = [false; N_EDGES];
    let mut rest = u32::from(value);
    for r in (1..=4).rev() {
        let slot = (0..N_EDGES).rev().find(|&n| CHOOSE[n][r] <= rest).unwrap_or(0);
        rest -= CHOOSE[slot][r];
        occupied[slot] = true;
    }

    let mut state = CubeState::SOLVED;
    let mut slice_edges = SLICE_EDGE..;
    let mut other_edges = 0..;
    for (piece, &is_slice) in state.ep.iter_mut().zip(&occupied) {
        let next = if is_slice {
            slice_edges.next()
        } else {
            other_edges.next()
        };
        *piece = next.unwrap_or_default();
    }
    repair_parity_with_corners(&mut state);
    state
}

#[must_use]
pub fn corner_permutation(state: &CubeState) -> u16 {
    lehmer_rank(&state.cp)
}

fn set_corner_permutation(value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    lehmer_unrank(u32::from(value), &mut state.cp);
    repair_parity_with_edges(&mut state);
    state
}

/// Rank of the eight U and D layer slots. Only meaningful when the slice
/// edges are in the slice.
#[must_use]
pub fn ud_edge_permutation(state: &CubeState) -> u16 {
    lehmer_rank(&state.ep[..usize::from(SLICE_EDGE)])
}

fn set_ud_edge_permutation(value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    lehmer_unrank(u32::from(value), &mut state.ep[..usize::from(SLICE_EDGE)]);
    repair_parity_with_corners(&mut state);
    state
}

/// Rank of the four slice slots. Only meaningful when the slice edges are in
/// the slice.
#[must_use]
pub fn slice_permutation(state: &CubeState) -> u16 {
    lehmer_rank(&state.ep[usize::from(SLICE_EDGE)..])
}

fn set_slice_permutation(value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    let slots = &mut state.ep[usize::from(SLICE_EDGE)..];
    lehmer_unrank(u32::from(value), slots);
    for piece in slots {
        *piece += SLICE_EDGE;
    }
    repair_parity_with_corners(&mut state);
    state
}

fn layer_edge_order(state: &CubeState, layer: std::ops::Range<u8>) -> [u8; 4] {
    let mut order = [0; 4];
    for (dst, &piece) in order.iter_mut().zip(
        state.ep[..usize::from(SLICE_EDGE)]
            .iter()
            .filter(|&&piece| layer.contains(&piece)),
    ) {
        *dst = piece;
    }
    order
}

/// Rank of the order in which `UR UF UL UB` appear across the U and D layer
/// slots.
#[must_use]
pub fn u_edge_permutation(state: &CubeState) -> u16 {
    lehmer_rank(&layer_edge_order(state, 0..4))
}

fn set_u_edge_permutation(value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    lehmer_unrank(u32::from(value), &mut state.ep[..4]);
    repair_parity_with_corners(&mut state);
    state
}

/// Rank of the order in which `DR DF DL DB` appear across the U and D layer
/// slots.
#[must_use]
pub fn d_edge_permutation(state: &CubeState) -> u16 {
    lehmer_rank(&layer_edge_order(state, 4..8))
}

fn set_d_edge_permutation(value: u16) -> CubeState {
    let mut state = CubeState::SOLVED;
    let slots = &mut state.ep[4..8];
    lehmer_unrank(u32::from(value), slots);
    for piece in slots {
        *piece += 4;
    }
    repair_parity_with_corners(&mut state);
    state
}

/// The coordinates phase one drives to `(0, 0, SOLVED_UD_SLICE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Phase1Coords {
    pub corner_orientation: u16,
    pub edge_orientation: u16,
    pub ud_slice: u16,
}

impl Phase1Coords {
    #[must_use]
    pub fn from_state(state: &CubeState) -> Self {
        Phase1Coords {
            corner_orientation: corner_orientation(state),
            edge_orientation: edge_orientation(state),
            ud_slice: ud_slice(state),
        }
    }

    #[must_use]
    pub fn apply(self, tables: &MoveTables, m: Move) -> Self {
        Phase1Coords {
            corner_orientation: tables.corner_orientation.apply(self.corner_orientation, m),
            edge_orientation: tables.edge_orientation.apply(self.edge_orientation, m),
            ud_slice: tables.ud_slice.apply(self.ud_slice, m),
        }
    }

    #[must_use]
    pub fn is_goal(self) -> bool {
        self.corner_orientation == 0 && self.edge_orientation == 0 && self.ud_slice == SOLVED_UD_SLICE
    }
}

/// The coordinates phase two drives to zero. Together they determine a state
/// of the phase two subgroup completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Phase2Coords {
    pub corner_permutation: u16,
    pub ud_edge_permutation: u16,
    pub slice_permutation: u16,
}

impl Phase2Coords {
    /// Only meaningful for states in the phase two subgroup.
    #[must_use]
    pub fn from_state(state: &CubeState) -> Self {
        Phase2Coords {
            corner_permutation: corner_permutation(state),
            ud_edge_permutation: ud_edge_permutation(state),
            slice_permutation: slice_permutation(state),
        }
    }

    /// `m` must be one of [`Move::PHASE2`].
    #[must_use]
    pub fn apply(self, tables: &MoveTables, m: Move) -> Self {
        debug_assert!(m.is_phase2());
        Phase2Coords {
            corner_permutation: tables.corner_permutation.apply(self.corner_permutation, m),
            ud_edge_permutation: tables.ud_edge_permutation.apply(self.ud_edge_permutation, m),
            slice_permutation: tables.slice_permutation.apply(self.slice_permutation, m),
        }
    }

    #[must_use]
    pub fn is_goal(self) -> bool {
        self.corner_permutation == 0 && self.ud_edge_permutation == 0 && self.slice_permutation == 0
    }
}
