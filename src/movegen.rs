//! Implements pseudo-legal move generation.
//!
//! Generation is expressed as a visitor: the caller supplies a sink
//! that is invoked with every generated move and the board it was
//! generated for. The sink returns [`ControlFlow`]: `Break` cancels
//! the pass before the next move is produced, and the cancellation
//! propagates out of [`visit_moves`]. The public collectors
//! ([`generate_all`], [`generate_ordered`], [`generate_captures`])
//! are sinks that gather moves into vectors.
//!
//! "Pseudo-legal" means that a move follows the piece's geometry and
//! stops at friendly pieces, but may leave the own king in check.
//! King safety is delegated to the search, which recognises a king
//! capture as a terminal event.

use std::ops::ControlFlow;

use crate::basetypes::*;
use crate::board::Board;
use crate::moves::Move;


// Ray and step tables. The scan orders are fixed; together with the
// file-then-rank board scan they make generation deterministic.
const DIAGONAL_DIRS: [(i8, i8); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
const ORTHOGONAL_DIRS: [(i8, i8); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const KING_STEPS: [(i8, i8); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1),
                                   (1, 1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [(-2, -1), (-1, -2), (1, -2), (2, -1), (2, 1), (1, 2),
                                     (-1, 2), (-2, 1)];


/// Feeds every pseudo-legal move for the side to move into `sink`.
///
/// Returns `ControlFlow::Break(())` if the sink cancelled the pass,
/// `ControlFlow::Continue(())` otherwise.
pub fn visit_moves<F>(board: &Board, sink: &mut F) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    visit_piece_kind(board, PAWN, sink)?;
    visit_piece_kind(board, KING, sink)?;
    visit_piece_kind(board, QUEEN, sink)?;
    visit_piece_kind(board, ROOK, sink)?;
    visit_piece_kind(board, BISHOP, sink)?;
    visit_piece_kind(board, KNIGHT, sink)?;
    ControlFlow::Continue(())
}

fn visit_piece_kind<F>(board: &Board, kind: PieceKind, sink: &mut F) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    for y in 0..BOARD_WIDTH {
        for x in 0..BOARD_WIDTH {
            let cell = board.cell(x, y);
            if cell.kind() != kind || cell.is_white() != board.white_to_move() {
                continue;
            }
            match kind {
                PAWN => visit_pawn_moves(board, sink, x, y)?,
                KING => {
                    for (dx, dy) in KING_STEPS {
                        emit_target(board, sink, x, y, x + dx, y + dy)?;
                    }
                    visit_castle_moves(board, sink, x, y)?;
                }
                KNIGHT => {
                    for (dx, dy) in KNIGHT_JUMPS {
                        emit_target(board, sink, x, y, x + dx, y + dy)?;
                    }
                }
                QUEEN | ROOK | BISHOP => {
                    if kind != ROOK {
                        for (dx, dy) in DIAGONAL_DIRS {
                            visit_ray(board, sink, x, y, dx, dy)?;
                        }
                    }
                    if kind != BISHOP {
                        for (dx, dy) in ORTHOGONAL_DIRS {
                            visit_ray(board, sink, x, y, dx, dy)?;
                        }
                    }
                }
                _ => unreachable!(),
            }
        }
    }
    ControlFlow::Continue(())
}

/// Emits a single-step move if the destination is on the board and
/// not occupied by a friendly piece.
fn emit_target<F>(board: &Board, sink: &mut F, sx: i8, sy: i8, tx: i8, ty: i8) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    if !Board::in_bounds(tx, ty) {
        return ControlFlow::Continue(());
    }
    let dest = board.cell(tx, ty);
    if dest.is_occupied() && dest.is_white() == board.white_to_move() {
        return ControlFlow::Continue(());
    }
    sink(board, Move::new(sx, sy, tx, ty))
}

/// Walks a ray, emitting moves until the edge of the board or the
/// first occupied square (which is still emitted when it holds an
/// enemy piece).
fn visit_ray<F>(board: &Board, sink: &mut F, sx: i8, sy: i8, dx: i8, dy: i8) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    let (mut tx, mut ty) = (sx + dx, sy + dy);
    while Board::in_bounds(tx, ty) {
        emit_target(board, sink, sx, sy, tx, ty)?;
        if board.cell(tx, ty).is_occupied() {
            break;
        }
        tx += dx;
        ty += dy;
    }
    ControlFlow::Continue(())
}

/// Emits a pawn move, fanning out into the two promotion variants
/// (queen first, then knight) when the destination is a back rank.
fn emit_pawn_move<F>(board: &Board,
                     sink: &mut F,
                     sx: i8,
                     sy: i8,
                     tx: i8,
                     ty: i8)
                     -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    if ty == RANK_8 || ty == RANK_1 {
        sink(board, Move::new_promotion(sx, sy, tx, ty, true))?;
        sink(board, Move::new_promotion(sx, sy, tx, ty, false))
    } else {
        sink(board, Move::new(sx, sy, tx, ty))
    }
}

fn visit_pawn_moves<F>(board: &Board, sink: &mut F, sx: i8, sy: i8) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    let white = board.cell(sx, sy).is_white();
    let dy = if white { 1 } else { -1 };
    let ty = sy + dy;

    if (0..BOARD_WIDTH).contains(&ty) && !board.cell(sx, ty).is_occupied() {
        // Double step from the pawn's starting rank, if both squares
        // ahead are free.
        if ((white && sy == RANK_2) || (!white && sy == RANK_7)) &&
           !board.cell(sx, ty + dy).is_occupied() {
            sink(board, Move::new(sx, sy, sx, ty + dy))?;
        }
        emit_pawn_move(board, sink, sx, sy, sx, ty)?;
    }

    // Diagonal captures.
    for tx in [sx - 1, sx + 1] {
        if Board::in_bounds(tx, ty) {
            let dest = board.cell(tx, ty);
            if dest.is_occupied() && dest.is_white() != white {
                emit_pawn_move(board, sink, sx, sy, tx, ty)?;
            }
        }
    }

    // En passant: a neighbouring enemy pawn that just double-stepped
    // can be taken in passing.
    if (white && sy == RANK_5) || (!white && sy == RANK_4) {
        for tx in [sx - 1, sx + 1] {
            if (0..BOARD_WIDTH).contains(&tx) {
                let beside = board.cell(tx, sy);
                if beside.kind() == PAWN && beside.last_was_double_step() &&
                   beside.is_white() != white {
                    sink(board, Move::new(sx, sy, tx, ty))?;
                }
            }
        }
    }

    ControlFlow::Continue(())
}

fn visit_castle_moves<F>(board: &Board, sink: &mut F, kx: i8, ky: i8) -> ControlFlow<()>
    where F: FnMut(&Board, Move) -> ControlFlow<()>
{
    let king = board.cell(kx, ky);
    debug_assert_eq!(king.kind(), KING);
    if king.has_moved() {
        return ControlFlow::Continue(());
    }
    let home = if king.is_white() { RANK_1 } else { RANK_8 };

    // Queen side: every square strictly between king and rook must be
    // empty and unattacked. The king's own square is not tested.
    if !board.cell(FILE_A, home).has_moved() {
        let mut clear = true;
        let mut x = kx - 1;
        while x > FILE_A {
            if board.cell(x, ky).is_occupied() ||
               square_is_attacked(board, x, ky, king.is_white()) {
                clear = false;
                break;
            }
            x -= 1;
        }
        if clear {
            sink(board, Move::new(kx, ky, FILE_A + 1, home))?;
        }
    }

    // King side.
    if !board.cell(FILE_H, home).has_moved() {
        let mut clear = true;
        let mut x = kx + 1;
        while x < FILE_H {
            if board.cell(x, ky).is_occupied() ||
               square_is_attacked(board, x, ky, king.is_white()) {
                clear = false;
                break;
            }
            x += 1;
        }
        if clear {
            sink(board, Move::new(kx, ky, FILE_H - 1, home))?;
        }
    }

    ControlFlow::Continue(())
}


/// Checks whether any enemy piece attacks the given square.
///
/// `white` is the colour of the defender. Used by the castling gate
/// only; kings are not counted as attackers.
pub fn square_is_attacked(board: &Board, x: i8, y: i8, white: bool) -> bool {
    debug_assert!(Board::in_bounds(x, y));

    for (dx, dy) in ORTHOGONAL_DIRS {
        if ray_hits_slider(board, x, y, dx, dy, white, ROOK) {
            return true;
        }
    }
    for (dx, dy) in DIAGONAL_DIRS {
        if ray_hits_slider(board, x, y, dx, dy, white, BISHOP) {
            return true;
        }
    }

    // Pawns attack diagonally towards their opponent's back rank.
    let dy = if white { 1 } else { -1 };
    for dx in [-1, 1] {
        let (px, py) = (x + dx, y + dy);
        if Board::in_bounds(px, py) {
            let cell = board.cell(px, py);
            if cell.kind() == PAWN && cell.is_white() != white {
                return true;
            }
        }
    }

    for (dx, dy) in KNIGHT_JUMPS {
        let (nx, ny) = (x + dx, y + dy);
        if Board::in_bounds(nx, ny) {
            let cell = board.cell(nx, ny);
            if cell.kind() == KNIGHT && cell.is_white() != white {
                return true;
            }
        }
    }

    false
}

/// Scans one ray for an enemy `slider` or queen. A friendly piece
/// ends the scan; an enemy piece that cannot deliver the attack does
/// not.
fn ray_hits_slider(board: &Board, x: i8, y: i8, dx: i8, dy: i8, white: bool, slider: PieceKind)
                   -> bool {
    let (mut tx, mut ty) = (x + dx, y + dy);
    while Board::in_bounds(tx, ty) {
        let cell = board.cell(tx, ty);
        if cell.is_occupied() {
            if cell.is_white() == white {
                return false;
            }
            if cell.kind() == slider || cell.kind() == QUEEN {
                return true;
            }
        }
        tx += dx;
        ty += dy;
    }
    false
}


/// Produces every pseudo-legal move for the side to move, in plain
/// generation order.
pub fn generate_all(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    let _ = visit_moves(board, &mut |_, m| {
        moves.push(m);
        ControlFlow::Continue(())
    });
    moves
}

/// Produces the same set as [`generate_all`], ordered for alpha-beta
/// efficiency (MVV-LVA, non-captures last).
pub fn generate_ordered(board: &Board) -> Vec<Move> {
    order_mvv_lva(bucket_by_attacker(board, false), true)
}

/// Produces the capturing subset only, in MVV-LVA order. Used by the
/// quiescence search.
///
/// The victim is read from the destination square, so en-passant
/// captures (whose destination is empty) are not part of this set.
pub fn generate_captures(board: &Board) -> Vec<Move> {
    order_mvv_lva(bucket_by_attacker(board, true), false)
}

/// Looks up the generated move with the given origin and destination.
///
/// For promotion moves `promote_to_queen` selects which of the two
/// variants to return; for all other moves it is ignored. This is the
/// operation front-ends use to turn coordinates received from a user
/// or a wire request into a playable move.
pub fn find_move(board: &Board,
                 origin: (i8, i8),
                 dest: (i8, i8),
                 promote_to_queen: Option<bool>)
                 -> Option<Move> {
    let mut found = None;
    let _ = visit_moves(board, &mut |_, m| {
        if (m.orig_x(), m.orig_y()) == origin && (m.dest_x(), m.dest_y()) == dest &&
           (!m.is_promotion() || promote_to_queen == Some(m.promotes_to_queen())) {
            found = Some(m);
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    found
}


/// A generated move together with the pieces taking part in it.
struct CaptureInfo {
    m: Move,
    victim: PieceKind,
}

/// Collects all moves into per-attacker buckets (`KING` ... `PAWN`).
/// With `captures_only` set, moves onto empty squares are skipped.
fn bucket_by_attacker(board: &Board, captures_only: bool) -> [Vec<CaptureInfo>; 6] {
    let mut buckets: [Vec<CaptureInfo>; 6] = Default::default();
    let _ = visit_moves(board, &mut |b, m| {
        let attacker = b.cell(m.orig_x(), m.orig_y()).kind();
        let victim = b.cell(m.dest_x(), m.dest_y()).kind();
        debug_assert!(attacker != NO_PIECE);
        if !(captures_only && victim == NO_PIECE) {
            buckets[attacker - 1].push(CaptureInfo { m, victim });
        }
        ControlFlow::Continue(())
    });
    buckets
}

/// Flattens attacker buckets into MVV-LVA order: buckets of the most
/// valuable victims first, least valuable attackers first within each
/// bucket, and (when `include_quiet` is set) the non-captures last.
fn order_mvv_lva(by_attacker: [Vec<CaptureInfo>; 6], include_quiet: bool) -> Vec<Move> {
    let mut by_victim: [Vec<Move>; PIECE_KIND_COUNT] = Default::default();
    for attacker_bucket in by_attacker.iter().rev() {
        for info in attacker_bucket {
            by_victim[info.victim].push(info.m);
        }
    }
    let mut ordered = Vec::new();
    for victim in KING..PIECE_KIND_COUNT {
        ordered.extend_from_slice(&by_victim[victim]);
    }
    if include_quiet {
        ordered.extend_from_slice(&by_victim[NO_PIECE]);
    }
    ordered
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::notation::board_from_diagram;

    fn contains(moves: &[Move], m: Move) -> bool {
        moves.contains(&m)
    }

    #[test]
    fn test_starting_position_has_twenty_moves() {
        let board = Board::starting_position();
        let moves = generate_all(&board);
        assert_eq!(moves.len(), 20);
        let ordered = generate_ordered(&board);
        assert_eq!(ordered.len(), 20);
        assert!(generate_captures(&board).is_empty());
    }

    #[test]
    fn test_knight_in_the_open() {
        let mut board = Board::empty();
        board.set_cell(FILE_A, RANK_1, Cell::new(KING, true));
        board.set_cell(FILE_H, RANK_8, Cell::new(KING, false));
        board.set_cell(FILE_D, RANK_4, Cell::new(KNIGHT, true));
        let moves = generate_all(&board);
        let knight_moves: Vec<_> = moves.iter().filter(|m| m.orig_x() == FILE_D).collect();
        assert_eq!(knight_moves.len(), 8);
    }

    #[test]
    fn test_en_passant_window() {
        let board = Board::starting_position();
        let board = board.apply_move(Move::new(FILE_E, RANK_2, FILE_E, RANK_4));
        let board = board.apply_move(Move::new(FILE_B, RANK_8, FILE_A, RANK_6));
        let board = board.apply_move(Move::new(FILE_E, RANK_4, FILE_E, RANK_5));
        let board = board.apply_move(Move::new(FILE_D, RANK_7, FILE_D, RANK_5));

        let capture = Move::new(FILE_E, RANK_5, FILE_D, RANK_6);
        assert!(contains(&generate_all(&board), capture));

        // Any intervening move closes the window.
        let board = board.apply_move(Move::new(FILE_A, RANK_2, FILE_A, RANK_3));
        let board = board.apply_move(Move::new(FILE_A, RANK_6, FILE_B, RANK_8));
        assert!(!contains(&generate_all(&board), capture));
    }

    #[test]
    fn test_promotion_fanout() {
        let board = board_from_diagram("k.......\n\
                                        ......P.\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        K.......")
                        .unwrap();
        let moves: Vec<_> = generate_all(&board)
                                .into_iter()
                                .filter(|m| m.orig_x() == FILE_G && m.orig_y() == RANK_7)
                                .collect();
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0], Move::new_promotion(FILE_G, RANK_7, FILE_G, RANK_8, true));
        assert_eq!(moves[1], Move::new_promotion(FILE_G, RANK_7, FILE_G, RANK_8, false));
    }

    #[test]
    fn test_castling_gate() {
        let board = board_from_diagram("r...k..r\n\
                                        pppppppp\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        PPPPPPPP\n\
                                        R...K..R")
                        .unwrap();
        let castles: Vec<_> = generate_all(&board)
                                  .into_iter()
                                  .filter(|m| (m.dest_x() - m.orig_x()).abs() > 1 &&
                                              board.cell(m.orig_x(), m.orig_y()).kind() == KING)
                                  .collect();
        assert_eq!(castles.len(), 2);
        assert!(contains(&castles, Move::new(FILE_E, RANK_1, FILE_B, RANK_1)));
        assert!(contains(&castles, Move::new(FILE_E, RANK_1, FILE_G, RANK_1)));

        // A king that has moved may not castle.
        let mut moved = board;
        let mut king = moved.cell(FILE_E, RANK_1);
        king.set_has_moved();
        moved.set_cell(FILE_E, RANK_1, king);
        let castles = generate_all(&moved)
                          .into_iter()
                          .filter(|m| (m.dest_x() - m.orig_x()).abs() > 1 &&
                                      moved.cell(m.orig_x(), m.orig_y()).kind() == KING)
                          .count();
        assert_eq!(castles, 0);
    }

    #[test]
    fn test_castling_blocked_by_attack() {
        // The black rook on d8 covers d1, which the king would pass
        // through on the queen side; the king side stays open.
        let board = board_from_diagram("r..rk..r\n\
                                        pppppppp\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        PPP.PPPP\n\
                                        R...K..R")
                        .unwrap();
        let moves = generate_all(&board);
        assert!(!contains(&moves, Move::new(FILE_E, RANK_1, FILE_B, RANK_1)));
        assert!(contains(&moves, Move::new(FILE_E, RANK_1, FILE_G, RANK_1)));
    }

    #[test]
    fn test_square_is_attacked() {
        let mut board = Board::empty();
        board.set_cell(FILE_D, RANK_8, Cell::new(ROOK, false));
        board.set_cell(FILE_B, RANK_3, Cell::new(PAWN, false));
        assert!(square_is_attacked(&board, FILE_D, RANK_1, true));
        assert!(!square_is_attacked(&board, FILE_E, RANK_1, true));
        // The black pawn on b3 attacks a2 and c2, downwards.
        assert!(square_is_attacked(&board, FILE_A, RANK_2, true));
        assert!(square_is_attacked(&board, FILE_C, RANK_2, true));
        assert!(!square_is_attacked(&board, FILE_B, RANK_2, true));
    }

    #[test]
    fn test_mvv_lva_ordering() {
        // The white pawn on b4 can take the queen on a5 or the rook
        // on c5; the white queen on h4 can take the pawn on h7.
        let board = board_from_diagram("....k...\n\
                                        .......p\n\
                                        ........\n\
                                        q.r.....\n\
                                        .P.....Q\n\
                                        ........\n\
                                        ........\n\
                                        ....K...")
                        .unwrap();
        let ordered = generate_ordered(&board);
        let queen_victim = Move::new(FILE_B, RANK_4, FILE_A, RANK_5);
        let rook_victim = Move::new(FILE_B, RANK_4, FILE_C, RANK_5);
        let pawn_victim = Move::new(FILE_H, RANK_4, FILE_H, RANK_7);
        let pos = |m: Move| ordered.iter().position(|&x| x == m).unwrap();
        assert!(pos(queen_victim) < pos(rook_victim));
        assert!(pos(rook_victim) < pos(pawn_victim));

        // All captures come before all quiet moves.
        let captures = generate_captures(&board);
        assert_eq!(captures.len(), 3);
        assert_eq!(&ordered[..captures.len()], &captures[..]);
        for m in &ordered[captures.len()..] {
            assert!(!board.cell(m.dest_x(), m.dest_y()).is_occupied());
        }
    }

    #[test]
    fn test_find_move() {
        let board = Board::starting_position();
        let m = find_move(&board, (FILE_E, RANK_2), (FILE_E, RANK_4), None);
        assert_eq!(m, Some(Move::new(FILE_E, RANK_2, FILE_E, RANK_4)));
        assert_eq!(find_move(&board, (FILE_E, RANK_2), (FILE_E, RANK_5), None), None);

        let promo = board_from_diagram("k.......\n\
                                        ......P.\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        K.......")
                        .unwrap();
        let q = find_move(&promo, (FILE_G, RANK_7), (FILE_G, RANK_8), Some(true));
        assert_eq!(q, Some(Move::new_promotion(FILE_G, RANK_7, FILE_G, RANK_8, true)));
        let n = find_move(&promo, (FILE_G, RANK_7), (FILE_G, RANK_8), Some(false));
        assert_eq!(n, Some(Move::new_promotion(FILE_G, RANK_7, FILE_G, RANK_8, false)));
    }
}
