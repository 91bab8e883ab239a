//! Conversion between [`CubeState`] and the 54 character facelet string.
//!
//! Faces are listed in `U R F D L B` order, each read row by row as seen from
//! outside the cube with the usual net orientation (U and D above and below
//! F). Each character names the face whose centre shows that colour, so any
//! six distinct characters work and the centres decide which is which.

use thiserror::Error;

use crate::{
    cube::{CubeState, CubeStateError, N_CORNERS, N_EDGES},
    moves::Face,
};

pub const N_FACELETS: usize = 54;

/// Facelet indices of the centres, in `U R F D L B` order.
const CENTRES: [usize; 6] = [4, 13, 22, 31, 40, 49];

/// The facelets of each corner slot, starting with its U or D facelet and
/// going clockwise.
const CORNER_FACELETS: [[usize; 3]; N_CORNERS] = [
    [8, 9, 20],
    [6, 18, 38],
    [0, 36, 47],
    [2, 45, 11],
    [29, 26, 15],
    [27, 44, 24],
    [33, 53, 42],
    [35, 17, 51],
];

/// The facelets of each edge slot, starting with its U, D, F or B facelet.
const EDGE_FACELETS: [[usize; 2]; N_EDGES] = [
    [5, 10],
    [7, 19],
    [3, 37],
    [1, 46],
    [32, 16],
    [28, 25],
    [30, 43],
    [34, 52],
    [23, 12],
    [21, 41],
    [50, 39],
    [48, 14],
];

const CORNER_COLOURS: [[Face; 3]; N_CORNERS] = {
    use Face::*;
    [
        [U, R, F],
        [U, F, L],
        [U, L, B],
        [U, B, R],
        [D, F, R],
        [D, L, F],
        [D, B, L],
        [D, R, B],
    ]
};

const EDGE_COLOURS: [[Face; 2]; N_EDGES] = {
    use Face::*;
    [
        [U, R],
        [U, F],
        [U, L],
        [U, B],
        [D, R],
        [D, F],
        [D, L],
        [D, B],
        [F, R],
        [F, L],
        [B, L],
        [B, R],
    ]
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaceletError {
    #[error("Expected {N_FACELETS} facelets but found {0}")]
    WrongLength(usize),
    #[error("The centre `{0}` appears on more than one face")]
    DuplicateCentre(char),
    #[error("Facelet {index} is `{colour}`, which is not the colour of any centre")]
    UnknownColour { index: usize, colour: char },
    #[error("The colour `{colour}` appears {count} times, expected 9")]
    ColourCount { colour: char, count: usize },
    #[error("The stickers of corner slot {0} do not belong to any corner")]
    UnknownCorner(usize),
    #[error("The stickers of edge slot {0} do not belong to any edge")]
    UnknownEdge(usize),
    #[error("The facelets describe an unreachable cube: {0}")]
    InvalidState(#[from] CubeStateError),
}

/// Reads a facelet string, ignoring whitespace between characters.
///
/// # Errors
///
/// Returns a [`FaceletError`] if the string is malformed or describes a
/// cube that cannot be reached by turning faces.
pub fn parse(facelets: &str) -> Result<CubeState, FaceletError> {
    let chars = facelets
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<Vec<_>>();
    if chars.len() != N_FACELETS {
        return Err(FaceletError::WrongLength(chars.len()));
    }

    let centres = CENTRES.map(|index| chars[index]);
    for (i, centre) in centres.iter().enumerate() {
        if centres[..i].contains(centre) {
            return Err(FaceletError::DuplicateCentre(*centre));
        }
    }

    let mut faces = [Face::U; N_FACELETS];
    let mut counts = [0_usize; 6];
    for (index, (&colour, face)) in chars.iter().zip(&mut faces).enumerate() {
        let position = centres
            .iter()
            .position(|&centre| centre == colour)
            .ok_or(FaceletError::UnknownColour { index, colour })?;
        *face = Face::ALL[position];
        counts[position] += 1;
    }
    if let Some((position, &count)) = counts.iter().enumerate().find(|&(_, &count)| count != 9) {
        return Err(FaceletError::ColourCount {
            colour: centres[position],
            count,
        });
    }

    let mut cp = [0; N_CORNERS];
    let mut co = [0; N_CORNERS];
    for (slot, facelets) in CORNER_FACELETS.iter().enumerate() {
        let twist = facelets
            .iter()
            .position(|&index| matches!(faces[index], Face::U | Face::D))
            .ok_or(FaceletError::UnknownCorner(slot))?;
        let clockwise = faces[facelets[(twist + 1) % 3]];
        let anticlockwise = faces[facelets[(twist + 2) % 3]];
        let piece = CORNER_COLOURS
            .iter()
            .position(|colours| colours[1] == clockwise && colours[2] == anticlockwise)
            .ok_or(FaceletError::UnknownCorner(slot))?;
        cp[slot] = piece as u8;
        co[slot] = twist as u8;
    }

    let mut ep = [0; N_EDGES];
    let mut eo = [0; N_EDGES];
    for (slot, &[first, second]) in EDGE_FACELETS.iter().enumerate() {
        let (first, second) = (faces[first], faces[second]);
        let (piece, flip) = EDGE_COLOURS
            .iter()
            .enumerate()
            .find_map(|(piece, &colours)| {
                if colours == [first, second] {
                    Some((piece, 0))
                } else if colours == [second, first] {
                    Some((piece, 1))
                } else {
                    None
                }
            })
            .ok_or(FaceletError::UnknownEdge(slot))?;
        ep[slot] = piece as u8;
        eo[slot] = flip;
    }

    Ok(CubeState::new(cp, co, ep, eo)?)
}

impl CubeState {
    /// The facelet string of this state, using the face letters `URFDLB` as
    /// colours.
    #[must_use]
    pub fn to_facelets(&self) -> String {
        let mut faces = [Face::U; N_FACELETS];
        for (face, &centre) in Face::ALL.iter().zip(&CENTRES) {
            faces[centre] = *face;
        }
        for slot in 0..N_CORNERS {
            let piece = usize::from(self.cp[slot]);
            let twist = usize::from(self.co[slot]);
            for n in 0..3 {
                faces[CORNER_FACELETS[slot][(n + twist) % 3]] = CORNER_COLOURS[piece][n];
            }
        }
        for slot in 0..N_EDGES {
            let piece = usize::from(self.ep[slot]);
            let flip = usize::from(self.eo[slot]);
            for n in 0..2 {
                faces[EDGE_FACELETS[slot][(n + flip) % 2]] = EDGE_COLOURS[piece][n];
            }
        }
        faces.iter().map(|face| face.letter()).collect()
    }
}
