//! This module defines the most basic types and constants: the piece
//! kinds, files, ranks, and the centipawn value scale.


/// `NO_PIECE`, `KING`, `QUEEN`, `ROOK`, `BISHOP`, `KNIGHT`, or `PAWN`.
///
/// `NO_PIECE` is zero so that "is this square occupied?" is a simple
/// nonzero test. The kinds are ordered by decreasing piece value,
/// which the move orderer and the evaluator rely on.
pub type PieceKind = usize;

pub const NO_PIECE: PieceKind = 0;
pub const KING: PieceKind = 1;
pub const QUEEN: PieceKind = 2;
pub const ROOK: PieceKind = 3;
pub const BISHOP: PieceKind = 4;
pub const KNIGHT: PieceKind = 5;
pub const PAWN: PieceKind = 6;

/// The number of distinct `PieceKind` values (including `NO_PIECE`).
pub const PIECE_KIND_COUNT: usize = 7;

// Files (0 is file A, 7 is file H)
pub const FILE_A: i8 = 0;
pub const FILE_B: i8 = 1;
pub const FILE_C: i8 = 2;
pub const FILE_D: i8 = 3;
pub const FILE_E: i8 = 4;
pub const FILE_F: i8 = 5;
pub const FILE_G: i8 = 6;
pub const FILE_H: i8 = 7;

// Ranks (0 is rank 1, 7 is rank 8)
pub const RANK_1: i8 = 0;
pub const RANK_2: i8 = 1;
pub const RANK_3: i8 = 2;
pub const RANK_4: i8 = 3;
pub const RANK_5: i8 = 4;
pub const RANK_6: i8 = 5;
pub const RANK_7: i8 = 6;
pub const RANK_8: i8 = 7;

/// The width of the board, in squares.
pub const BOARD_WIDTH: i8 = 8;


/// Evaluation value in centipawns.
///
/// Values are absolute: positive means white is ahead, regardless of
/// the side to move. The search interprets them according to the role
/// of the node being searched.
pub type Value = i32;

/// A value greater than any reachable evaluation.
pub const VALUE_MAX: Value = 16_000_000;

/// A value smaller than any reachable evaluation.
pub const VALUE_MIN: Value = -VALUE_MAX;
