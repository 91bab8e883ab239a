use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use log::{Level, debug, info, log, log_enabled, warn};

use crate::{
    config::SolverConfig,
    coord::{Phase1Coords, Phase2Coords},
    cube::CubeState,
    facelet::{self, FaceletError},
    moves::{self, Face, Move, N_MOVES},
    start, success,
    tables::Tables,
    working,
};

/// A verified move sequence that solves the cube it was found for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    moves: Vec<Move>,
    phase1_len: usize,
    phase2_len: usize,
}

impl Solution {
    /// Joins the two phases, merging turns of the same face across the
    /// boundary between them.
    fn new(path: &[Move], phase1_len: usize) -> Self {
        Solution {
            moves: moves::simplify(path),
            phase1_len,
            phase2_len: path.len() - phase1_len,
        }
    }

    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    #[must_use]
    pub fn into_moves(self) -> Vec<Move> {
        self.moves
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// How many moves each phase contributed before the two were joined.
    #[must_use]
    pub fn phase_lengths(&self) -> (usize, usize) {
        (self.phase1_len, self.phase2_len)
    }

    #[must_use]
    pub fn to_compact(&self) -> String {
        moves::format_compact(&self.moves)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&moves::format_moves(&self.moves))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved(Solution),
    /// No solution exists within the configured maximum depth.
    Exhausted,
    /// The interrupt flag was raised before a solution was found.
    Cancelled,
}

impl SolveOutcome {
    #[must_use]
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Solves cubes against a shared set of [`Tables`]. Each call to
/// [`TwoPhaseSolver::solve`] runs on the calling thread and only reads the
/// tables, so one set of tables can serve many solvers at once.
pub struct TwoPhaseSolver<'a> {
    tables: &'a Tables,
    config: SolverConfig,
    interrupt: Option<Arc<AtomicBool>>,
}

struct TwoPhaseSolverMutable {
    start: CubeState,
    path: Vec<Move>,
    phase1_len: usize,
    nodes_visited: u64,
    rejected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchStatus {
    Found,
    NotFound,
    Cancelled,
}

/// What distinguishes the two searches: their coordinates, generator,
/// heuristic, and what happens on reaching the goal.
trait Phase {
    type Coords: Copy;

    const NAME: &'static str;
    const MOVES: &'static [Move];
    const DEPTH_LOG_LEVEL: Level;

    fn apply(tables: &Tables, coords: Self::Coords, m: Move) -> Self::Coords;

    fn heuristic(tables: &Tables, coords: Self::Coords) -> u8;

    fn is_goal(coords: Self::Coords) -> bool;

    fn reached_goal(solver: &TwoPhaseSolver<'_>, mutable: &mut TwoPhaseSolverMutable)
    -> SearchStatus;
}

struct PhaseOne;
struct PhaseTwo;

fn allowed_after(face: Face, last_face: Option<Face>, prune_commuting_faces: bool) -> bool {
    let Some(last_face) = last_face else {
        return true;
    };
    if face == last_face {
        return false;
    }
    // Opposite faces commute, so only the order with the lower face first is
    // searched
    !(prune_commuting_faces && face == last_face.opposite() && face < last_face)
}

impl Phase for PhaseOne {
    type Coords = Phase1Coords;

    const NAME: &'static str = "phase one";
    const MOVES: &'static [Move] = &Move::ALL;
    const DEPTH_LOG_LEVEL: Level = Level::Debug;

    fn apply(tables: &Tables, coords: Phase1Coords, m: Move) -> Phase1Coords {
        coords.apply(tables.moves(), m)
    }

    fn heuristic(tables: &Tables, coords: Phase1Coords) -> u8 {
        tables.pruning().phase1_heuristic(coords)
    }

    fn is_goal(coords: Phase1Coords) -> bool {
        coords.is_goal()
    }

    /// Solves the rest of the cube inside the phase two subgroup, within
    /// whatever depth budget phase one left over.
    fn reached_goal(
        solver: &TwoPhaseSolver<'_>,
        mutable: &mut TwoPhaseSolverMutable,
    ) -> SearchStatus {
        let mut state = mutable.start;
        state.apply_sequence(&mutable.path);
        let phase1_len = mutable.path.len();
        let budget = usize::from(solver.config.max_depth).saturating_sub(phase1_len);

        let status = solver.deepen::<PhaseTwo>(
            mutable,
            Phase2Coords::from_state(&state),
            u8::try_from(budget).unwrap_or(u8::MAX),
        );
        if status == SearchStatus::Found {
            mutable.phase1_len = phase1_len;
        } else if status == SearchStatus::NotFound {
            debug!(
                "Phase two found nothing within {} moves after {}",
                budget,
                moves::format_moves(&mutable.path)
            );
        }
        status
    }
}

impl Phase for PhaseTwo {
    type Coords = Phase2Coords;

    const NAME: &'static str = "phase two";
    const MOVES: &'static [Move] = &Move::PHASE2;
    const DEPTH_LOG_LEVEL: Level = Level::Trace;

    fn apply(tables: &Tables, coords: Phase2Coords, m: Move) -> Phase2Coords {
        coords.apply(tables.moves(), m)
    }

    fn heuristic(tables: &Tables, coords: Phase2Coords) -> u8 {
        tables.pruning().phase2_heuristic(tables.moves(), coords)
    }

    fn is_goal(coords: Phase2Coords) -> bool {
        coords.is_goal()
    }

    /// Replays the whole path on a copy of the starting cube. Only a path
    /// that really solves it counts.
    fn reached_goal(
        _solver: &TwoPhaseSolver<'_>,
        mutable: &mut TwoPhaseSolverMutable,
    ) -> SearchStatus {
        let mut replay = mutable.start;
        replay.apply_sequence(&mutable.path);
        if replay.is_solved() {
            SearchStatus::Found
        } else {
            mutable.rejected += 1;
            warn!(
                "Rejected {} since it does not solve the cube",
                moves::format_moves(&mutable.path)
            );
            SearchStatus::NotFound
        }
    }
}

impl<'a> TwoPhaseSolver<'a> {
    #[must_use]
    pub fn new(tables: &'a Tables) -> Self {
        TwoPhaseSolver {
            tables,
            config: SolverConfig::default(),
            interrupt: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Makes [`TwoPhaseSolver::solve`] return [`SolveOutcome::Cancelled`]
    /// soon after `interrupt` becomes `true`.
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    fn is_interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|interrupt| interrupt.load(Ordering::Relaxed))
    }

    /// Depth first search below `coords` for a goal exactly
    /// `permitted_cost` moves away.
    fn search<P: Phase>(
        &self,
        mutable: &mut TwoPhaseSolverMutable,
        coords: P::Coords,
        last_face: Option<Face>,
        permitted_cost: u8,
    ) -> SearchStatus {
        if self.is_interrupted() {
            return SearchStatus::Cancelled;
        }
        if log_enabled!(Level::Debug) {
            mutable.nodes_visited += 1;
        }

        if permitted_cost == 0 {
            return if P::is_goal(coords) {
                P::reached_goal(self, mutable)
            } else {
                SearchStatus::NotFound
            };
        }

        let mut children = [(Move::ALL[0], coords, 0); N_MOVES];
        let mut len = 0;
        for &m in P::MOVES {
            if !allowed_after(m.face(), last_face, self.config.prune_commuting_faces) {
                continue;
            }
            let next = P::apply(self.tables, coords, m);
            let heuristic = P::heuristic(self.tables, next);
            if heuristic < permitted_cost {
                children[len] = (m, next, heuristic);
                len += 1;
            }
        }
        let children = &mut children[..len];
        if self.config.order_by_heuristic {
            children.sort_by_key(|&(_, _, heuristic)| heuristic);
        }

        for &(m, next, _) in children.iter() {
            mutable.path.push(m);
            match self.search::<P>(mutable, next, Some(m.face()), permitted_cost - 1) {
                SearchStatus::NotFound => {
                    mutable.path.pop();
                }
                status => return status,
            }
        }
        SearchStatus::NotFound
    }

    /// Iterative deepening from the root heuristic up to `max_depth`.
    fn deepen<P: Phase>(
        &self,
        mutable: &mut TwoPhaseSolverMutable,
        root: P::Coords,
        max_depth: u8,
    ) -> SearchStatus {
        for depth in P::heuristic(self.tables, root)..=max_depth {
            log!(
                P::DEPTH_LOG_LEVEL,
                working!("Searching {} depth {}..."),
                P::NAME,
                depth
            );
            let status = self.search::<P>(mutable, root, None, depth);
            if status != SearchStatus::NotFound {
                return status;
            }
        }
        SearchStatus::NotFound
    }

    /// Finds a solution of at most the configured maximum depth.
    ///
    /// Every returned solution has been replayed on a copy of `state` and
    /// verified to solve it.
    #[must_use]
    pub fn solve(&self, state: &CubeState) -> SolveOutcome {
        info!(start!("Searching for a two-phase solution"));
        let start = Instant::now();
        if !self.tables.is_complete() {
            debug!("Pruning tables are still building, the search will be slower");
        }

        let mut mutable = TwoPhaseSolverMutable {
            start: *state,
            path: Vec::with_capacity(usize::from(self.config.max_depth)),
            phase1_len: 0,
            nodes_visited: 0,
            rejected: 0,
        };
        let status = self.deepen::<PhaseOne>(
            &mut mutable,
            Phase1Coords::from_state(state),
            self.config.max_depth,
        );
        debug!(
            working!("Traversed {} nodes in {:.3}s, rejected {} candidates"),
            mutable.nodes_visited,
            start.elapsed().as_secs_f64(),
            mutable.rejected
        );

        match status {
            SearchStatus::Found => {
                let solution = Solution::new(&mutable.path, mutable.phase1_len);
                let (phase1_len, phase2_len) = solution.phase_lengths();
                info!(
                    success!("Found a {} move solution ({} + {}) in {:.3}s"),
                    solution.len(),
                    phase1_len,
                    phase2_len,
                    start.elapsed().as_secs_f64()
                );
                SolveOutcome::Solved(solution)
            }
            SearchStatus::NotFound => {
                info!(
                    "No solution within {} moves after {:.3}s",
                    self.config.max_depth,
                    start.elapsed().as_secs_f64()
                );
                SolveOutcome::Exhausted
            }
            SearchStatus::Cancelled => {
                info!(
                    "Search cancelled after {:.3}s",
                    start.elapsed().as_secs_f64()
                );
                SolveOutcome::Cancelled
            }
        }
    }

    /// Parses a facelet string and solves it.
    ///
    /// # Errors
    ///
    /// Returns a [`FaceletError`] when the facelets are malformed or describe
    /// an unreachable cube.
    pub fn solve_facelets(&self, facelets: &str) -> Result<SolveOutcome, FaceletError> {
        let state = facelet::parse(facelets)?;
        Ok(self.solve(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::parse_moves;

    #[test]
    fn commuting_faces_searched_in_one_order() {
        assert!(allowed_after(Face::D, Some(Face::U), true));
        assert!(!allowed_after(Face::U, Some(Face::D), true));
        assert!(allowed_after(Face::B, Some(Face::F), true));
        assert!(!allowed_after(Face::F, Some(Face::B), true));
        assert!(!allowed_after(Face::U, Some(Face::U), true));
        assert!(allowed_after(Face::R, Some(Face::U), true));
        assert!(allowed_after(Face::U, None, true));

        assert!(allowed_after(Face::U, Some(Face::D), false));
        assert!(!allowed_after(Face::D, Some(Face::D), false));
    }

    /// A phase whose goal is never reached and which has no moves.
    struct Unreachable;

    impl Phase for Unreachable {
        type Coords = ();

        const NAME: &'static str = "unreachable";
        const MOVES: &'static [Move] = &[];
        const DEPTH_LOG_LEVEL: Level = Level::Trace;

        fn apply(_tables: &Tables, (): (), _m: Move) {}

        fn heuristic(_tables: &Tables, (): ()) -> u8 {
            0
        }

        fn is_goal((): ()) -> bool {
            false
        }

        fn reached_goal(
            _solver: &TwoPhaseSolver<'_>,
            _mutable: &mut TwoPhaseSolverMutable,
        ) -> SearchStatus {
            SearchStatus::Found
        }
    }

    #[test]
    fn deepening_stops_at_the_largest_depth() {
        let tables = Tables::unbuilt();
        let solver = TwoPhaseSolver::new(&tables);
        let mut mutable = TwoPhaseSolverMutable {
            start: CubeState::SOLVED,
            path: vec![],
            phase1_len: 0,
            nodes_visited: 0,
            rejected: 0,
        };
        assert_eq!(
            solver.deepen::<Unreachable>(&mut mutable, (), u8::MAX),
            SearchStatus::NotFound
        );
        assert!(mutable.path.is_empty());
    }

    #[test]
    fn solution_merges_phase_boundary() {
        let path = parse_moves("R U F U2 F2").unwrap();
        let solution = Solution::new(&path, 3);
        assert_eq!(solution.to_string(), "R U F U2 F2");

        let path = parse_moves("F R U U2 F2").unwrap();
        let solution = Solution::new(&path, 3);
        assert_eq!(solution.to_string(), "F R U' F2");
        assert_eq!(solution.phase_lengths(), (3, 2));
        assert_eq!(solution.to_compact(), "FRUUUFF");

        let path = parse_moves("F R R' F'").unwrap();
        assert!(Solution::new(&path, 2).is_empty());
    }
}
