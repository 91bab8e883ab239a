use std::{
    sync::{Arc, LazyLock},
    thread,
};

use twophase::{
    CubeState, Move, SharedTables, Tables,
    coord::{self, CoordKind, N_SLICE_PERMUTATION, Phase1Coords, Phase2Coords},
    moves::random_scramble,
};

static TABLES: LazyLock<Tables> = LazyLock::new(Tables::build);

#[test_log::test]
fn move_tables_agree_with_unrank_apply_rank() {
    for kind in CoordKind::ALL {
        let table = TABLES.moves().table(kind);
        assert_eq!(table.kind(), kind);
        let moves: &[Move] = if kind.is_phase2_only() {
            &Move::PHASE2
        } else {
            &Move::ALL
        };
        for value in 0..kind.size() as u16 {
            let representative = kind.unrank(value);
            for &m in moves {
                let mut state = representative;
                state.apply(m);
                assert_eq!(
                    table.apply(value, m),
                    kind.rank(&state),
                    "{kind:?} value {value} move {m}"
                );
            }
        }
    }
}

#[test_log::test]
fn move_tables_track_scrambles() {
    let mut rng = fastrand::Rng::with_seed(1);
    let moves = TABLES.moves();
    for _ in 0..50 {
        let scramble = random_scramble(&mut rng, 25);
        let mut coords = Phase1Coords::from_state(&CubeState::SOLVED);
        for &m in &scramble {
            coords = coords.apply(moves, m);
        }
        assert_eq!(coords, Phase1Coords::from_state(&CubeState::from_moves(&scramble)));
    }

    for _ in 0..50 {
        let scramble = (0..25)
            .map(|_| Move::PHASE2[rng.usize(..Move::PHASE2.len())])
            .collect::<Vec<_>>();
        let state = CubeState::from_moves(&scramble);
        let mut coords = Phase2Coords::from_state(&CubeState::SOLVED);
        for &m in &scramble {
            coords = coords.apply(moves, m);
        }
        assert_eq!(coords, Phase2Coords::from_state(&state));
        assert_eq!(
            u16::from(moves.u_edge_of(coords.ud_edge_permutation)),
            coord::u_edge_permutation(&state)
        );
        assert_eq!(
            u16::from(moves.d_edge_of(coords.ud_edge_permutation)),
            coord::d_edge_permutation(&state)
        );
        // Edge parity splits into the UD edge and slice edge parities
        let slice_parity = coord::lehmer_parity(coords.slice_permutation, 4) == 1;
        assert_eq!(
            moves.ud_edge_parity(coords.ud_edge_permutation) == 1,
            state.edge_parity() != slice_parity
        );
    }
}

#[test_log::test]
fn pruning_tables_are_complete() {
    let pruning = TABLES.pruning();
    assert!(TABLES.is_complete());

    for table in pruning.all() {
        assert!(table.is_complete(), "{}", table.name());
    }

    let solved_slice = usize::from(coord::SOLVED_UD_SLICE);
    assert_eq!(pruning.corner_orientation_slice.get(solved_slice), 0);
    assert_eq!(pruning.edge_orientation_slice.get(solved_slice), 0);
    assert_eq!(pruning.corner_permutation.get(0), 0);
    assert_eq!(pruning.ud_edge_permutation.get(0), 0);

    // Every orientation and slice combination is reachable with all moves,
    // and every permutation with the phase two moves
    for table in [
        &pruning.corner_orientation_slice,
        &pruning.edge_orientation_slice,
        &pruning.corner_permutation,
        &pruning.corner_permutation_parity,
        &pruning.ud_edge_permutation,
        &pruning.u_edge_permutation,
        &pruning.d_edge_permutation,
    ] {
        assert!(
            (0..table.len()).all(|index| table.distance(index).is_some()),
            "{} has unreachable entries",
            table.name()
        );
    }

    // Corner, slice and UD edge parities are tied together, so only half of
    // this table is reachable
    let reachable = (0..pruning.corner_slice_parity.len())
        .filter(|&index| pruning.corner_slice_parity.distance(index).is_some())
        .count();
    assert_eq!(reachable, pruning.corner_slice_parity.len() / 2);
    assert_eq!(
        pruning.corner_slice_parity.len(),
        coord::N_CORNER_PERMUTATION * N_SLICE_PERMUTATION * 2
    );
}

#[test_log::test]
fn heuristics_never_exceed_scramble_length() {
    let mut rng = fastrand::Rng::with_seed(2);
    for len in 0..14 {
        for _ in 0..40 {
            let scramble = random_scramble(&mut rng, len);
            let state = CubeState::from_moves(&scramble);
            let heuristic = TABLES
                .pruning()
                .phase1_heuristic(Phase1Coords::from_state(&state));
            assert!(heuristic as usize <= len, "{heuristic} > {len}");
        }
    }

    for len in 0..20 {
        for _ in 0..40 {
            let scramble = (0..len)
                .map(|_| Move::PHASE2[rng.usize(..Move::PHASE2.len())])
                .collect::<Vec<_>>();
            let state = CubeState::from_moves(&scramble);
            let heuristic = TABLES
                .pruning()
                .phase2_heuristic(TABLES.moves(), Phase2Coords::from_state(&state));
            assert!(heuristic as usize <= len, "{heuristic} > {len}");
        }
    }
}

#[test_log::test]
fn single_moves_have_distance_one() {
    for m in Move::ALL {
        let state = CubeState::from_moves(&[m]);
        let phase1 = TABLES
            .pruning()
            .phase1_heuristic(Phase1Coords::from_state(&state));
        assert_eq!(phase1, u8::from(!m.is_phase2()), "{m}");
    }
    for m in Move::PHASE2 {
        let state = CubeState::from_moves(&[m]);
        let phase2 = TABLES
            .pruning()
            .phase2_heuristic(TABLES.moves(), Phase2Coords::from_state(&state));
        assert_eq!(phase2, 1, "{m}");
    }
}

#[test_log::test]
fn cache_round_trips_through_a_file() {
    let dir = std::env::temp_dir().join(format!("twophase-tables-{}", std::process::id()));
    let path = dir.join("tables.bin");

    twophase::cache::save(&path, TABLES.pruning()).unwrap();
    let loaded = Tables::load_or_build(&path);
    assert!(loaded.is_complete());
    for (built, cached) in TABLES.pruning().all().into_iter().zip(loaded.pruning().all()) {
        assert!(
            (0..built.len()).all(|index| built.distance(index) == cached.distance(index)),
            "{} differs after loading",
            built.name()
        );
    }

    std::fs::write(&path, b"not a table cache").unwrap();
    let rebuilt = Tables::load_or_build(&path);
    assert!(rebuilt.is_complete());
    assert!(twophase::cache::load(&path, &twophase::pruning::PruningTables::new_unbuilt()).is_ok());

    std::fs::remove_dir_all(dir).unwrap();
}

#[test_log::test]
fn shared_tables_are_built_once_for_concurrent_requesters() {
    let dir = std::env::temp_dir().join(format!("twophase-shared-{}", std::process::id()));
    let path = dir.join("tables.bin");
    let shared = SharedTables::with_cache(path.clone());
    assert!(!shared.is_initialized());

    let handed_out = thread::scope(|scope| {
        let requesters = (0..4)
            .map(|_| scope.spawn(|| shared.get()))
            .collect::<Vec<_>>();
        requesters
            .into_iter()
            .map(|requester| requester.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert!(shared.is_initialized());
    assert!(handed_out[0].is_complete());
    for tables in &handed_out {
        assert!(Arc::ptr_eq(tables, &handed_out[0]));
    }
    assert!(Arc::ptr_eq(&shared.get(), &handed_out[0]));
    assert!(path.exists());

    // A fresh cell over the same cache loads what the first one wrote
    let reloaded = SharedTables::with_cache(path);
    assert!(reloaded.get().is_complete());
    assert!(!Arc::ptr_eq(&reloaded.get(), &handed_out[0]));

    std::fs::remove_dir_all(dir).unwrap();
}
