use std::{
    sync::atomic::{AtomicBool, AtomicU8, Ordering},
    time::Instant,
};

use log::{debug, info};

use crate::{
    coord::{
        N_CORNER_ORIENTATION, N_CORNER_PERMUTATION, N_EDGE_ORIENTATION, N_LAYER_EDGE_PERMUTATION,
        N_SLICE_PERMUTATION, N_UD_EDGE_PERMUTATION, N_UD_SLICE, Phase1Coords, Phase2Coords,
        SOLVED_UD_SLICE,
    },
    move_tables::MoveTables,
    moves::Move,
    start, success, working,
};

/// Marks an entry the breadth first search has not reached yet.
const UNVISITED: u8 = u8::MAX;

/// Minimum move counts to the goal over one coordinate space.
///
/// Entries are atomics so that a table can be filled on one thread while
/// searches read it on others. An entry that has not been reached yet reads
/// as `0`, which never overestimates.
pub struct PruningTable {
    name: &'static str,
    entries: Box<[AtomicU8]>,
    complete: AtomicBool,
}

impl PruningTable {
    fn new(name: &'static str, len: usize) -> Self {
        PruningTable {
            name,
            entries: (0..len).map(|_| AtomicU8::new(UNVISITED)).collect(),
            complete: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> u8 {
        match self.entries[index].load(Ordering::Relaxed) {
            UNVISITED => 0,
            depth => depth,
        }
    }

    /// The stored distance, or `None` if the entry was never reached.
    #[must_use]
    pub fn distance(&self, index: usize) -> Option<u8> {
        match self.entries[index].load(Ordering::Relaxed) {
            UNVISITED => None,
            depth => Some(depth),
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    pub(crate) fn bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.iter().map(|entry| entry.load(Ordering::Relaxed))
    }

    /// Overwrites every entry; `bytes` must be exactly as long as the table.
    pub(crate) fn fill_from(&self, bytes: &[u8]) {
        debug_assert_eq!(bytes.len(), self.entries.len());
        for (entry, &byte) in self.entries.iter().zip(bytes) {
            entry.store(byte, Ordering::Relaxed);
        }
        self.complete.store(true, Ordering::Release);
    }

    /// Layered breadth first search from `goal`, storing the depth at which
    /// each index is first reached.
    fn fill_by_bfs(&self, goal: usize, moves: &[Move], successor: impl Fn(usize, Move) -> usize) {
        info!(start!("Building the {} pruning table"), self.name);
        let start = Instant::now();

        self.entries[goal].store(0, Ordering::Relaxed);
        let mut frontier = vec![goal as u32];
        let mut depth = 0_u8;
        let mut visited = 1;
        while !frontier.is_empty() {
            depth += 1;
            let mut next = vec![];
            for &index in &frontier {
                for &m in moves {
                    let succ = successor(index as usize, m);
                    if self.entries[succ].load(Ordering::Relaxed) == UNVISITED {
                        self.entries[succ].store(depth, Ordering::Relaxed);
                        next.push(succ as u32);
                    }
                }
            }
            visited += next.len();
            debug!(
                working!("{}: {} entries at depth {}"),
                self.name,
                next.len(),
                depth
            );
            frontier = next;
        }

        self.complete.store(true, Ordering::Release);
        info!(
            success!("Built the {} pruning table in {:.3}s, {}/{} entries reachable, max depth {}"),
            self.name,
            start.elapsed().as_secs_f64(),
            visited,
            self.len(),
            depth - 1
        );
    }

    /// Stores for every value of a projection the minimum of `source` over
    /// its preimage. A minimum of exact distances stays admissible.
    fn fill_by_projection(&self, source: &PruningTable, project: impl Fn(usize) -> usize) {
        let mut minimums = vec![UNVISITED; self.len()];
        for index in 0..source.len() {
            let projected = &mut minimums[project(index)];
            *projected = (*projected).min(source.entries[index].load(Ordering::Relaxed));
        }
        self.fill_from(&minimums);
        debug!(
            success!("Projected the {} pruning table from {}"),
            self.name,
            source.name
        );
    }
}

/// Every pruning table both phases consult.
pub struct PruningTables {
    /// Corner orientation × UD slice, keyed `corner_orientation * 495 + ud_slice`.
    pub corner_orientation_slice: PruningTable,
    /// Edge orientation × UD slice, keyed `edge_orientation * 495 + ud_slice`.
    pub edge_orientation_slice: PruningTable,
    pub corner_permutation: PruningTable,
    /// Keyed `corner_permutation * 2 + ud_edge_parity`.
    pub corner_permutation_parity: PruningTable,
    /// Keyed `(corner_permutation * 24 + slice_permutation) * 2 + ud_edge_parity`.
    pub corner_slice_parity: PruningTable,
    pub ud_edge_permutation: PruningTable,
    pub u_edge_permutation: PruningTable,
    pub d_edge_permutation: PruningTable,
}

impl Default for PruningTables {
    fn default() -> Self {
        Self::new_unbuilt()
    }
}

impl PruningTables {
    /// Tables with every entry unvisited, giving a heuristic of zero
    /// everywhere until they are built.
    #[must_use]
    pub fn new_unbuilt() -> Self {
        PruningTables {
            corner_orientation_slice: PruningTable::new(
                "corner orientation × slice",
                N_CORNER_ORIENTATION * N_UD_SLICE,
            ),
            edge_orientation_slice: PruningTable::new(
                "edge orientation × slice",
                N_EDGE_ORIENTATION * N_UD_SLICE,
            ),
            corner_permutation: PruningTable::new("corner permutation", N_CORNER_PERMUTATION),
            corner_permutation_parity: PruningTable::new(
                "corner permutation × parity",
                N_CORNER_PERMUTATION * 2,
            ),
            corner_slice_parity: PruningTable::new(
                "corner permutation × slice permutation × parity",
                N_CORNER_PERMUTATION * N_SLICE_PERMUTATION * 2,
            ),
            ud_edge_permutation: PruningTable::new(
                "UD edge permutation",
                N_UD_EDGE_PERMUTATION,
            ),
            u_edge_permutation: PruningTable::new("U edge permutation", N_LAYER_EDGE_PERMUTATION),
            d_edge_permutation: PruningTable::new("D edge permutation", N_LAYER_EDGE_PERMUTATION),
        }
    }

    /// All tables in a fixed order, as the cache stores them.
    #[must_use]
    pub fn all(&self) -> [&PruningTable; 8] {
        [
            &self.corner_orientation_slice,
            &self.edge_orientation_slice,
            &self.corner_permutation,
            &self.corner_permutation_parity,
            &self.corner_slice_parity,
            &self.ud_edge_permutation,
            &self.u_edge_permutation,
            &self.d_edge_permutation,
        ]
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.all().iter().all(|table| table.is_complete())
    }

    /// Fills every table. Phase one tables come first since every solve
    /// starts there.
    pub fn build_all(&self, moves: &MoveTables) {
        info!(start!("Building pruning tables"));
        let start = Instant::now();

        let slices = N_UD_SLICE;
        self.corner_orientation_slice.fill_by_bfs(
            usize::from(SOLVED_UD_SLICE),
            &Move::ALL,
            |index, m| {
                let co = moves.corner_orientation.apply((index / slices) as u16, m);
                let slice = moves.ud_slice.apply((index % slices) as u16, m);
                usize::from(co) * slices + usize::from(slice)
            },
        );
        self.edge_orientation_slice.fill_by_bfs(
            usize::from(SOLVED_UD_SLICE),
            &Move::ALL,
            |index, m| {
                let eo = moves.edge_orientation.apply((index / slices) as u16, m);
                let slice = moves.ud_slice.apply((index % slices) as u16, m);
                usize::from(eo) * slices + usize::from(slice)
            },
        );

        self.corner_permutation
            .fill_by_bfs(0, &Move::PHASE2, |index, m| {
                usize::from(moves.corner_permutation.apply(index as u16, m))
            });
        self.corner_permutation_parity
            .fill_by_bfs(0, &Move::PHASE2, |index, m| {
                let cp = moves.corner_permutation.apply((index / 2) as u16, m);
                let parity = (index % 2) ^ usize::from(m.flips_ud_edge_parity());
                usize::from(cp) * 2 + parity
            });
        self.corner_slice_parity
            .fill_by_bfs(0, &Move::PHASE2, |index, m| {
                let parity = (index % 2) ^ usize::from(m.flips_ud_edge_parity());
                let rest = index / 2;
                let cp = moves
                    .corner_permutation
                    .apply((rest / N_SLICE_PERMUTATION) as u16, m);
                let sp = moves
                    .slice_permutation
                    .apply((rest % N_SLICE_PERMUTATION) as u16, m);
                (usize::from(cp) * N_SLICE_PERMUTATION + usize::from(sp)) * 2 + parity
            });
        self.ud_edge_permutation
            .fill_by_bfs(0, &Move::PHASE2, |index, m| {
                usize::from(moves.ud_edge_permutation.apply(index as u16, m))
            });

        self.u_edge_permutation
            .fill_by_projection(&self.ud_edge_permutation, |index| {
                usize::from(moves.u_edge_of(index as u16))
            });
        self.d_edge_permutation
            .fill_by_projection(&self.ud_edge_permutation, |index| {
                usize::from(moves.d_edge_of(index as u16))
            });

        info!(
            success!("Built pruning tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
    }

    /// Lower bound on the phase one distance.
    #[inline]
    #[must_use]
    pub fn phase1_heuristic(&self, coords: Phase1Coords) -> u8 {
        let slice = usize::from(coords.ud_slice);
        let co = usize::from(coords.corner_orientation) * N_UD_SLICE + slice;
        let eo = usize::from(coords.edge_orientation) * N_UD_SLICE + slice;
        self.corner_orientation_slice
            .get(co)
            .max(self.edge_orientation_slice.get(eo))
    }

    /// Lower bound on the phase two distance.
    #[inline]
    #[must_use]
    pub fn phase2_heuristic(&self, moves: &MoveTables, coords: Phase2Coords) -> u8 {
        let cp = usize::from(coords.corner_permutation);
        let sp = usize::from(coords.slice_permutation);
        let ud = coords.ud_edge_permutation;
        let parity = usize::from(moves.ud_edge_parity(ud));

        [
            self.corner_permutation.get(cp),
            self.corner_permutation_parity.get(cp * 2 + parity),
            self.corner_slice_parity
                .get((cp * N_SLICE_PERMUTATION + sp) * 2 + parity),
            self.ud_edge_permutation.get(usize::from(ud)),
            self.u_edge_permutation.get(usize::from(moves.u_edge_of(ud))),
            self.d_edge_permutation.get(usize::from(moves.d_edge_of(ud))),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}
