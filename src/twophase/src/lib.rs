#![warn(clippy::pedantic)]
#![allow(clippy::similar_names, clippy::too_many_lines)]

//! Two-phase solver for the 3x3x3 Rubik's Cube.
//!
//! A scrambled [`CubeState`] is first brought into the subgroup
//! `<U, D, R2, F2, L2, B2>` and then solved inside it. Both phases are IDA*
//! searches over small integer coordinates, driven by precomputed move
//! transition tables and admissible pruning tables bundled in [`Tables`].

pub mod cache;
pub mod config;
pub mod coord;
pub mod cube;
pub mod facelet;
pub mod move_tables;
pub mod moves;
pub mod pruning;
pub mod solver;
pub mod tables;

pub use config::SolverConfig;
pub use cube::{CubeState, CubeStateError};
pub use facelet::FaceletError;
pub use moves::{Face, Move, MoveParseError};
pub use solver::{Solution, SolveOutcome, TwoPhaseSolver};
pub use tables::{SharedTables, Tables};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}

// Largest permutation ranked anywhere is the 8 corners
const FACT_UNTIL_8: [u32; 9] = {
    let mut arr = [0; 9];
    arr[0] = 1;
    let mut i = 1;
    while i < arr.len() {
        arr[i] = arr[i - 1] * i as u32;
        i += 1;
    }
    arr
};

/// `CHOOSE[n][k]` is the binomial coefficient `n choose k` for the 12 edge
/// slots and up to the 4 slice edges.
const CHOOSE: [[u32; 5]; 13] = {
    let mut arr = [[0; 5]; 13];
    let mut n = 0;
    while n < arr.len() {
        arr[n][0] = 1;
        let mut k = 1;
        while k < arr[n].len() && k <= n {
            arr[n][k] = arr[n - 1][k - 1] + arr[n - 1][k];
            k += 1;
        }
        n += 1;
    }
    arr
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factorials() {
        assert_eq!(FACT_UNTIL_8[0], 1);
        assert_eq!(FACT_UNTIL_8[4], 24);
        assert_eq!(FACT_UNTIL_8[8], 40320);
    }

    #[test]
    fn binomials() {
        assert_eq!(CHOOSE[12][4], 495);
        assert_eq!(CHOOSE[4][4], 1);
        assert_eq!(CHOOSE[3][4], 0);
        assert_eq!(CHOOSE[11][3], 165);
    }
}
