//! Implements static position evaluation.
//!
//! The evaluation is the sum, over every occupied square, of the
//! piece's material value and a per-square positional bonus. Bonuses
//! are tabulated from white's perspective; for black pieces the
//! square index is mirrored vertically. The result is absolute:
//! positive favours white, and the search interprets it according to
//! which side is to move at the leaf.

use crate::basetypes::*;
use crate::board::Board;


/// Material values in centipawns, indexed by `PieceKind`.
///
/// The king's value is set high enough that any line capturing a
/// king dominates all material considerations.
pub const PIECE_VALUES: [Value; PIECE_KIND_COUNT] = [0, 100_000, 950, 563, 333, 305, 100];

/// Positional bonus per square, indexed by `PieceKind` and then by
/// square (from white's perspective).
const SQUARE_BONUS: [[i8; 64]; PIECE_KIND_COUNT] = [
    // no piece
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // king
    [
        20, 30, 10, 0, 0, 10, 30, 20,
        20, 20, 0, 0, 0, 0, 20, 20,
        -10, -20, -20, -20, -20, -20, -20, -10,
        -20, -30, -30, -40, -40, -30, -30, -20,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
        -30, -40, -40, -50, -50, -40, -40, -30,
    ],
    // queen
    [
        -20, -10, -10, -5, -5, -10, -10, -20,
        -10, 0, 0, 0, 0, 0, 0, -10,
        -10, 5, 5, 5, 5, 5, 0, -10,
        0, 0, 5, 5, 5, 5, 0, -5,
        -5, 0, 5, 5, 5, 5, 0, -5,
        -10, 0, 5, 5, 5, 5, 0, -10,
        -10, 0, 0, 0, 0, 0, 0, -10,
        -20, -10, -10, -5, -5, -10, -10, -20,
    ],
    // rook
    [
        0, 0, 0, 5, 5, 0, 0, 0,
        -5, 0, 0, 0, 0, 0, 0, -5,
        -5, 0, 0, 0, 0, 0, 0, -5,
        -5, 0, 0, 0, 0, 0, 0, -5,
        -5, 0, 0, 0, 0, 0, 0, -5,
        -5, 0, 0, 0, 0, 0, 0, -5,
        5, 10, 10, 10, 10, 10, 10, 5,
        0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20,
        -10, 5, 0, 0, 0, 0, 5, -10,
        -10, 10, 10, 10, 10, 10, 10, -10,
        -10, 0, 10, 10, 10, 10, 0, -10,
        -10, 5, 5, 10, 10, 5, 5, -10,
        -10, 0, 5, 10, 10, 5, 0, -10,
        -10, 0, 0, 0, 0, 0, 0, -10,
        -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50,
        -40, -20, 0, 5, 5, 0, -20, -40,
        -30, 5, 10, 15, 15, 10, 5, -30,
        -30, 0, 15, 20, 20, 15, 0, -30,
        -30, 5, 15, 20, 20, 15, 5, -30,
        -30, 0, 10, 15, 15, 10, 0, -30,
        -40, -20, 0, 0, 0, 0, -20, -40,
        -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // pawn
    [
        0, 0, 0, 0, 0, 0, 0, 0,
        5, 10, 10, -20, -20, 10, 10, 5,
        5, -5, -10, 0, 0, -10, -5, 5,
        0, 0, 0, 20, 20, 0, 0, 0,
        5, 5, 10, 25, 25, 10, 5, 5,
        10, 10, 20, 30, 30, 20, 10, 10,
        50, 50, 50, 50, 50, 50, 50, 50,
        0, 0, 0, 0, 0, 0, 0, 0,
    ],
];


/// Returns the square index a black piece at `square` uses for its
/// bonus lookup: the board flipped vertically, files unchanged.
#[inline]
fn mirror(square: usize) -> usize {
    ((63 - square) & !7) | (square & 7)
}

/// Statically evaluates a position. Positive means white is ahead.
pub fn evaluate(board: &Board) -> Value {
    let mut total = 0;
    for (square, cell) in board.cells().iter().enumerate() {
        let kind = cell.kind();
        let lookup = if cell.is_white() {
            square
        } else {
            mirror(square)
        };
        let score = PIECE_VALUES[kind] + SQUARE_BONUS[kind][lookup] as Value;
        if score != 0 {
            total += if cell.is_white() { score } else { -score };
        }
    }
    total
}
