use std::time::Instant;

use log::{debug, info};

use crate::{
    coord::{self, CoordKind, N_UD_EDGE_PERMUTATION},
    moves::{Face, Move, N_MOVES},
    start, success, working,
};

/// Next coordinate value for every value and every move.
pub struct MoveTable {
    kind: CoordKind,
    entries: Box<[u16]>,
}

impl MoveTable {
    /// Unranks every value of `kind`, turns each face of its representative
    /// one to three quarter turns, and re-ranks. Coordinates only defined on
    /// the phase two subgroup keep their own value for moves outside
    /// [`Move::PHASE2`].
    #[must_use]
    pub fn build(kind: CoordKind) -> Self {
        let size = kind.size();
        let mut entries = Vec::with_capacity(size * N_MOVES);
        for value in 0..size as u16 {
            let representative = kind.unrank(value);
            for face in Face::ALL {
                let mut state = representative;
                for power in 1..=3 {
                    state.apply(Move::new(face, 1));
                    let m = Move::new(face, power);
                    if kind.is_phase2_only() && !m.is_phase2() {
                        entries.push(value);
                    } else {
                        entries.push(kind.rank(&state));
                    }
                }
            }
        }
        MoveTable {
            kind,
            entries: entries.into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn apply(&self, value: u16, m: Move) -> u16 {
        self.entries[usize::from(value) * N_MOVES + m.index()]
    }
}

/// One [`MoveTable`] per coordinate, plus lookups that let the search read
/// the sub-coordinates of the UD edge permutation without tracking them.
pub struct MoveTables {
    pub corner_orientation: MoveTable,
    pub edge_orientation: MoveTable,
    pub ud_slice: MoveTable,
    pub corner_permutation: MoveTable,
    pub ud_edge_permutation: MoveTable,
    pub slice_permutation: MoveTable,
    pub u_edge_permutation: MoveTable,
    pub d_edge_permutation: MoveTable,
    u_edge_projection: Box<[u8]>,
    d_edge_projection: Box<[u8]>,
    ud_edge_parity: Box<[u8]>,
}

impl MoveTables {
    #[must_use]
    pub fn build() -> Self {
        info!(start!("Building move tables"));
        let start = Instant::now();

        let timed = |kind: CoordKind| {
            let table_start = Instant::now();
            let table = MoveTable::build(kind);
            debug!(
                working!("Built {:?} move table in {:.3}s"),
                kind,
                table_start.elapsed().as_secs_f64()
            );
            table
        };

        let mut u_edge_projection = Vec::with_capacity(N_UD_EDGE_PERMUTATION);
        let mut d_edge_projection = Vec::with_capacity(N_UD_EDGE_PERMUTATION);
        let mut ud_edge_parity = Vec::with_capacity(N_UD_EDGE_PERMUTATION);
        for value in 0..N_UD_EDGE_PERMUTATION as u16 {
            let state = CoordKind::UdEdgePermutation.unrank(value);
            u_edge_projection.push(coord::u_edge_permutation(&state) as u8);
            d_edge_projection.push(coord::d_edge_permutation(&state) as u8);
            ud_edge_parity.push(coord::lehmer_parity(value, 8));
        }

        let tables = MoveTables {
            corner_orientation: timed(CoordKind::CornerOrientation),
            edge_orientation: timed(CoordKind::EdgeOrientation),
            ud_slice: timed(CoordKind::UdSlice),
            corner_permutation: timed(CoordKind::CornerPermutation),
            ud_edge_permutation: timed(CoordKind::UdEdgePermutation),
            slice_permutation: timed(CoordKind::SlicePermutation),
            u_edge_permutation: timed(CoordKind::UEdgePermutation),
            d_edge_permutation: timed(CoordKind::DEdgePermutation),
            u_edge_projection: u_edge_projection.into_boxed_slice(),
            d_edge_projection: d_edge_projection.into_boxed_slice(),
            ud_edge_parity: ud_edge_parity.into_boxed_slice(),
        };

        info!(
            success!("Built move tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        tables
    }

    #[must_use]
    pub fn table(&self, kind: CoordKind) -> &MoveTable {
        match kind {
            CoordKind::CornerOrientation => &self.corner_orientation,
            CoordKind::EdgeOrientation => &self.edge_orientation,
            CoordKind::UdSlice => &self.ud_slice,
            CoordKind::CornerPermutation => &self.corner_permutation,
            CoordKind::UdEdgePermutation => &self.ud_edge_permutation,
            CoordKind::SlicePermutation => &self.slice_permutation,
            CoordKind::UEdgePermutation => &self.u_edge_permutation,
            CoordKind::DEdgePermutation => &self.d_edge_permutation,
        }
    }

    /// The U edge sub-permutation of a UD edge permutation value.
    #[inline]
    #[must_use]
    pub fn u_edge_of(&self, ud_edge_permutation: u16) -> u8 {
        self.u_edge_projection[usize::from(ud_edge_permutation)]
    }

    /// The D edge sub-permutation of a UD edge permutation value.
    #[inline]
    #[must_use]
    pub fn d_edge_of(&self, ud_edge_permutation: u16) -> u8 {
        self.d_edge_projection[usize::from(ud_edge_permutation)]
    }

    /// `1` when the UD edge permutation is odd.
    #[inline]
    #[must_use]
    pub fn ud_edge_parity(&self, ud_edge_permutation: u16) -> u8 {
        self.ud_edge_parity[usize::from(ud_edge_permutation)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_tables_agree_with_rank_apply() {
        for kind in [
            CoordKind::UdSlice,
            CoordKind::SlicePermutation,
            CoordKind::UEdgePermutation,
            CoordKind::DEdgePermutation,
        ] {
            let table = MoveTable::build(kind);
            assert_eq!(table.kind(), kind);
            for value in 0..kind.size() as u16 {
                for m in Move::ALL {
                    if kind.is_phase2_only() && !m.is_phase2() {
                        assert_eq!(table.apply(value, m), value);
                        continue;
                    }
                    let mut state = kind.unrank(value);
                    state.apply(m);
                    assert_eq!(table.apply(value, m), kind.rank(&state), "{kind:?} {value} {m}");
                }
            }
        }
    }

    #[test]
    fn inverse_moves_undo_each_other() {
        let table = MoveTable::build(CoordKind::CornerOrientation);
        for value in 0..CoordKind::CornerOrientation.size() as u16 {
            for m in Move::ALL {
                assert_eq!(table.apply(table.apply(value, m), m.inverse()), value);
            }
        }
    }
}
