use std::{
    sync::{
        Arc, LazyLock,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use log::info;
use twophase::{
    CubeState, FaceletError, Move, SolveOutcome, SolverConfig, Tables, TwoPhaseSolver,
    moves::{parse_moves, random_scramble},
};

static TABLES: LazyLock<Tables> = LazyLock::new(Tables::build);

static SCRAMBLES: [[&str; 2]; 8] = [
    [
        "U2 R2 L D2 L F2 B2 U' D' F U R' L2 U2 D L F' B2 D R2",
        "FLLLULFRFRUURRRBBBLDDFFUBRUDFRDDUFLDUFUFLDLBRBDRBBULBD",
    ],
    [
        "L U' R2 F B2 R2 L U' D2 R2 F B' U R' U2 R2 D2 F2 U2 L'",
        "BLBLUFFFFDULURFRRULDLBFRDBUFDFBDDDBRDUUFLULRRUDRLBRBLB",
    ],
    [
        "R L2 U2 D2 R2 U2 R' D2 R' F' R L2 B R2 L' F' B2 U' D' F B2 U R' L2",
        "DUULUFBDDRRFURDBFLRBBUFBLBLULURDLLBDFUUFLRBDFRFRLBDFRD",
    ],
    [
        "L2 U2 D' L2 U2 L2 F2 U2 D' F2 B2 L2 U B U2 D R2 U' F2 D R2 L'",
        "BULRUDFDDFLDRRRBFBLFRUFFFBLULUFDLLDRRDURLLBURFBUBBUDBD",
    ],
    [
        "F U2 D2 R2 F' B2 D2 F B D2 L2 U2 D R F2 B' L' B R L U D2 R2 L'",
        "RFDUUDBFRFBFRRDBBUDRUDFBBDLLLULDUDLLUFRRLRRUDLLBFBUFBF",
    ],
    [
        "U D F' B' L' B R L2 F B R2 L' U F2 B R2 F2 B2 U' F2 B2 U D R2 D'",
        "BDUFULLBFRBRURBFUBFRDUFRUFRFRULDBDLRUDDFLFLULBRLDBLDDB",
    ],
    [
        "F2 L' D2 F2 B2 R' U2 B2 R' F' B2 R' D F R2 L2 D' R L2 F2 B R2",
        "LFDRUFUBLFRBURDBRRFLDFFLBFLRUUUDUULFDBLDLDFBURLBRBBDDR",
    ],
    [
        "B' U2 B U2 D R' L' D F B R F' D2 L2 F' R2 L2 F' D2 F2 R2 L2",
        "UFLBURFFLBFBLRRFRRLUUDFUBBDDRRFDDFBBRUULLLLLRDDFUBBUDD",
    ],
];

fn assert_solves(state: &CubeState, outcome: &SolveOutcome) -> usize {
    let solution = outcome
        .solution()
        .unwrap_or_else(|| panic!("Expected a solution, got {outcome:?}"));
    let mut replay = *state;
    replay.apply_sequence(solution.moves());
    assert!(replay.is_solved(), "{solution} does not solve the cube");
    for (a, b) in solution.moves().iter().zip(solution.moves().iter().skip(1)) {
        assert_ne!(a.face(), b.face(), "{solution} turns a face twice in a row");
    }
    solution.len()
}

#[test_log::test]
fn solved_cube_needs_no_moves() {
    let solver = TwoPhaseSolver::new(&TABLES);
    let outcome = solver.solve(&CubeState::SOLVED);
    let solution = outcome.into_solution().unwrap();
    assert!(solution.is_empty());
    assert_eq!(solution.to_string(), "");
}

#[test_log::test]
fn single_moves_are_undone() {
    let solver = TwoPhaseSolver::new(&TABLES);
    for m in Move::ALL {
        let state = CubeState::from_moves(&[m]);
        let solution = solver.solve(&state).into_solution().unwrap();
        assert_eq!(solution.moves(), &[m.inverse()], "{m}");
    }
}

#[test_log::test]
fn sexy_move() {
    let solver = TwoPhaseSolver::new(&TABLES);
    let state = CubeState::from_moves(&parse_moves("R U R' U'").unwrap());
    assert_solves(&state, &solver.solve(&state));
}

#[test_log::test]
fn known_scrambles() {
    let solver = TwoPhaseSolver::new(&TABLES);
    for [scramble, facelets] in SCRAMBLES {
        let state = CubeState::from_moves(&parse_moves(scramble).unwrap());
        let outcome = solver.solve_facelets(facelets).unwrap();
        let len = assert_solves(&state, &outcome);
        info!("{scramble} -> {} ({len} moves)", outcome.solution().unwrap());
        assert!(len <= 30, "{len}");
    }
}

#[test_log::test]
fn random_walks() {
    let solver = TwoPhaseSolver::new(&TABLES);
    let mut rng = fastrand::Rng::with_seed(20);
    for _ in 0..20 {
        let scramble = random_scramble(&mut rng, 20);
        let state = CubeState::from_moves(&scramble);
        let len = assert_solves(&state, &solver.solve(&state));
        assert!(len <= 30, "{len}");
    }
}

#[test_log::test]
fn random_states() {
    let solver = TwoPhaseSolver::new(&TABLES);
    let mut rng = fastrand::Rng::with_seed(3);
    for _ in 0..10 {
        let state = CubeState::random(&mut rng);
        assert_solves(&state, &solver.solve(&state));
    }
}

#[test_log::test]
fn phase_two_states_skip_phase_one() {
    let solver = TwoPhaseSolver::new(&TABLES);
    let state = CubeState::from_moves(&parse_moves("U R2 F2 D' L2 B2 U2 R2 D").unwrap());
    let solution = solver.solve(&state).into_solution().unwrap();
    assert_eq!(solution.phase_lengths().0, 0);
    assert!(solution.moves().iter().all(|m| m.is_phase2()));
    assert_solves(&state, &SolveOutcome::Solved(solution));
}

#[test_log::test]
fn without_move_ordering_or_commuting_pruning() {
    let config = SolverConfig::default()
        .with_order_by_heuristic(false)
        .with_prune_commuting_faces(false);
    let solver = TwoPhaseSolver::new(&TABLES).with_config(config);
    let mut rng = fastrand::Rng::with_seed(4);
    for _ in 0..5 {
        let state = CubeState::from_moves(&random_scramble(&mut rng, 20));
        assert_solves(&state, &solver.solve(&state));
    }
}

#[test_log::test]
fn shallow_limit_is_exhausted() {
    let solver =
        TwoPhaseSolver::new(&TABLES).with_config(SolverConfig::default().with_max_depth(3));
    let state = CubeState::from_moves(&parse_moves(SCRAMBLES[0][0]).unwrap());
    assert_eq!(solver.solve(&state), SolveOutcome::Exhausted);

    // Within the limit the same solver still succeeds
    let state = CubeState::from_moves(&parse_moves("R U2 F'").unwrap());
    assert_solves(&state, &solver.solve(&state));
}

#[test_log::test]
fn raised_interrupt_cancels() {
    let interrupt = Arc::new(AtomicBool::new(true));
    let solver = TwoPhaseSolver::new(&TABLES).with_interrupt(Arc::clone(&interrupt));
    let state = CubeState::from_moves(&parse_moves(SCRAMBLES[1][0]).unwrap());
    assert_eq!(solver.solve(&state), SolveOutcome::Cancelled);

    interrupt.store(false, Ordering::Relaxed);
    assert_solves(&state, &solver.solve(&state));
}

#[test_log::test]
fn malformed_facelets_are_rejected() {
    let solver = TwoPhaseSolver::new(&TABLES);
    assert_eq!(
        solver.solve_facelets("UUUUUUUUU"),
        Err(FaceletError::WrongLength(9))
    );
}

#[test_log::test]
fn concurrent_solves_share_tables() {
    let mut rng = fastrand::Rng::with_seed(5);
    let states = (0..4)
        .map(|_| CubeState::from_moves(&random_scramble(&mut rng, 20)))
        .collect::<Vec<_>>();
    thread::scope(|scope| {
        for state in &states {
            scope.spawn(move || {
                let solver = TwoPhaseSolver::new(&TABLES);
                assert_solves(state, &solver.solve(state));
            });
        }
    });
}

#[test_log::test]
fn solves_while_tables_build_in_the_background() {
    let (tables, handle) = Tables::spawn_background();
    let solver = TwoPhaseSolver::new(&tables);
    let state = CubeState::from_moves(&parse_moves("R U F'").unwrap());
    assert_solves(&state, &solver.solve(&state));

    handle.join().unwrap();
    assert!(tables.is_complete());
    let state = CubeState::from_moves(&parse_moves(SCRAMBLES[2][0]).unwrap());
    assert_solves(&state, &solver.solve(&state));
}
