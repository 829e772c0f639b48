//! Implements the searching algorithms and the move-selection API.
//!
//! Three searchers are provided:
//!
//! * A plain fixed-depth minimax, without pruning, ordering, or
//!   caching. It exists as a correctness baseline.
//!
//! * A fixed-depth alpha-beta search over MVV-LVA-ordered moves,
//!   with a transposition cache and a quiescence extension at the
//!   horizon.
//!
//! * An iterative-deepening driver over the alpha-beta search that
//!   re-uses each completed depth's score as the centre of an
//!   aspiration window for the next depth, re-searching with a
//!   widened bound on a fail-low or fail-high.
//!
//! The search is `find_min`-parameterised rather than negamax-shaped:
//! scores are always absolute (positive favours white), and each node
//! knows whether it is minimising. A node whose board already carries
//! a victory bit is terminal and yields a king-valued score, which is
//! how king capture stands in for checkmate.
//!
//! Everything here is single-threaded and synchronous; a caller that
//! wants a time bound must wrap the selector externally.

use std::time::Instant;

use rand::Rng;
use tracing::debug;

use crate::basetypes::*;
use crate::board::Board;
use crate::evaluation::{evaluate, PIECE_VALUES};
use crate::movegen::{generate_all, generate_captures, generate_ordered};
use crate::moves::Move;
use crate::tt::{CacheAllocError, Fingerprint, SearchCache};


/// The depth of the alpha-beta and iterative-deepening selectors.
pub const DEFAULT_SEARCH_DEPTH: u8 = 6;

/// The depth of the naive minimax selector.
pub const DEFAULT_MINIMAX_DEPTH: u8 = 4;

/// The quiescence extension stops after this many extra plies.
const MAX_QUIESCENCE_DEPTH: u8 = 20;

/// Half-width of the aspiration window, in centipawns.
const ASPIRATION_DELTA: Value = 50;


/// A line of play together with the value of its final position.
struct Line {
    /// The principal variation, starting with the move to play.
    moves: Vec<Move>,

    /// The value of the line's final position (absolute).
    score: Value,
}

impl Line {
    fn leaf(score: Value) -> Line {
        Line {
            moves: vec![],
            score,
        }
    }
}


/// One search invocation: the transposition cache plus counters.
struct Search {
    cache: SearchCache,
    nodes: u64,
    quiescence_nodes: u64,
}

impl Search {
    fn new() -> Result<Search, CacheAllocError> {
        Ok(Search {
            cache: SearchCache::new()?,
            nodes: 0,
            quiescence_nodes: 0,
        })
    }

    /// The alpha-beta step. `find_min` is `true` when the side to
    /// move at this node seeks to minimise the (absolute) score.
    fn alpha_beta(&mut self,
                  board: &Board,
                  depth: u8,
                  mut alpha: Value,
                  mut beta: Value,
                  find_min: bool)
                  -> Line {
        if find_min && board.white_won() {
            return Line::leaf(PIECE_VALUES[KING]);
        }
        if !find_min && board.black_won() {
            return Line::leaf(-PIECE_VALUES[KING]);
        }
        if depth == 0 {
            return Line::leaf(self.quiescence(board, alpha, beta, !find_min, 0));
        }

        let fingerprint = Fingerprint::from_board(board);
        if let Some(entry) = self.cache.probe(&fingerprint, depth) {
            return Line {
                moves: vec![entry.best()],
                score: entry.score(),
            };
        }
        let (window_bottom, window_top) = (alpha, beta);

        let mut best = Line::leaf(if find_min { VALUE_MAX } else { VALUE_MIN });
        for m in generate_ordered(board) {
            self.nodes += 1;
            let child = board.apply_move(m);
            let mut line = self.alpha_beta(&child, depth - 1, alpha, beta, !find_min);
            if find_min {
                if line.score < best.score {
                    line.moves.insert(0, m);
                    best = line;
                    if best.score < beta {
                        beta = best.score;
                    }
                    if best.score <= alpha {
                        break;
                    }
                }
            } else if line.score > best.score {
                line.moves.insert(0, m);
                best = line;
                if best.score > alpha {
                    alpha = best.score;
                }
                if best.score >= beta {
                    break;
                }
            }
        }

        // Only results that fell strictly inside the node's original
        // window are exact; everything else is a bound and may not be
        // replayed from the cache.
        if let Some(&first) = best.moves.first() {
            if window_bottom < best.score && best.score < window_top {
                self.cache.store(fingerprint, first, best.score, depth);
            }
        }
        best
    }

    /// The quiescence step: continues the search over capturing moves
    /// only, so that the horizon does not cut a capture sequence in
    /// half.
    fn quiescence(&mut self,
                  board: &Board,
                  mut alpha: Value,
                  mut beta: Value,
                  find_min: bool,
                  depth: u8)
                  -> Value {
        if board.black_won() {
            return -PIECE_VALUES[KING];
        }
        if board.white_won() {
            return PIECE_VALUES[KING];
        }
        if depth == MAX_QUIESCENCE_DEPTH {
            return evaluate(board);
        }

        let moves = generate_captures(board);
        if moves.is_empty() {
            return evaluate(board);
        }

        let mut best = if find_min { VALUE_MAX } else { VALUE_MIN };
        for m in moves {
            self.quiescence_nodes += 1;
            let child = board.apply_move(m);
            let score = self.quiescence(&child, alpha, beta, !find_min, depth + 1);
            if find_min {
                if score < best {
                    best = score;
                    if best < beta {
                        beta = best;
                    }
                    if best <= alpha {
                        break;
                    }
                }
            } else if score > best {
                best = score;
                if best > alpha {
                    alpha = best;
                }
                if best >= beta {
                    break;
                }
            }
        }
        best
    }

    /// Searches one depth with an aspiration window centred on the
    /// previous depth's score, re-searching with the failed side
    /// opened when the result falls on or outside a bound.
    fn aspiration(&mut self, board: &Board, depth: u8, guess: Value, find_min: bool) -> Line {
        let alpha = guess - ASPIRATION_DELTA;
        let beta = guess + ASPIRATION_DELTA;
        let line = self.alpha_beta(board, depth, alpha, beta, find_min);
        debug!(depth, score = line.score, alpha, beta, "aspiration search");
        if line.score <= alpha {
            self.alpha_beta(board, depth, VALUE_MIN, beta, find_min)
        } else if line.score >= beta {
            self.alpha_beta(board, depth, alpha, VALUE_MAX, find_min)
        } else {
            line
        }
    }

    /// Iterative deepening: depth 1 with a full window, then each
    /// further depth through an aspiration window. Once a king-valued
    /// score appears the line is decided and deepening stops.
    fn deepen(&mut self, board: &Board, max_depth: u8, find_min: bool) -> Line {
        let mut best = self.alpha_beta(board, 1, VALUE_MIN, VALUE_MAX, find_min);
        debug!(depth = 1, max_depth, score = best.score, "iterative deepening");
        for depth in 2..=max_depth {
            if best.score.abs() >= PIECE_VALUES[KING] {
                break;
            }
            best = self.aspiration(board, depth, best.score, find_min);
            debug!(depth, max_depth, score = best.score, "iterative deepening");
        }
        best
    }
}


/// The naive minimax step: no pruning, no ordering, no cache.
fn minimax(board: &Board, depth: u8, find_min: bool) -> (Move, Value) {
    if depth == 0 {
        return (Move::invalid(), evaluate(board));
    }
    let mut best = (Move::invalid(), if find_min { VALUE_MAX } else { VALUE_MIN });
    for m in generate_all(board) {
        let child = board.apply_move(m);
        let (_, score) = minimax(&child, depth - 1, !find_min);
        if (find_min && score < best.1) || (!find_min && score > best.1) {
            best = (m, score);
        }
    }
    best
}


fn alpha_beta_move(board: &Board, find_min: bool) -> Result<Move, CacheAllocError> {
    let started = Instant::now();
    let mut search = Search::new()?;
    let line = search.alpha_beta(board, DEFAULT_SEARCH_DEPTH, VALUE_MIN, VALUE_MAX, find_min);
    debug!(nodes = search.nodes,
           quiescence_nodes = search.quiescence_nodes,
           elapsed_ms = started.elapsed().as_millis() as u64,
           score = line.score,
           "alpha-beta search done");
    Ok(line.moves.first().copied().unwrap_or_else(Move::invalid))
}

fn complex_move(board: &Board, find_min: bool) -> Result<Move, CacheAllocError> {
    let started = Instant::now();
    let mut search = Search::new()?;
    let line = search.deepen(board, DEFAULT_SEARCH_DEPTH, find_min);
    debug!(nodes = search.nodes,
           quiescence_nodes = search.quiescence_nodes,
           elapsed_ms = started.elapsed().as_millis() as u64,
           score = line.score,
           "deepening search done");
    Ok(line.moves.first().copied().unwrap_or_else(Move::invalid))
}


/// Picks a move for white with the naive fixed-depth minimax.
pub fn minimax_move_white(board: &Board) -> Move {
    minimax(board, DEFAULT_MINIMAX_DEPTH, false).0
}

/// Picks a move for black with the naive fixed-depth minimax.
pub fn minimax_move_black(board: &Board) -> Move {
    minimax(board, DEFAULT_MINIMAX_DEPTH, true).0
}

/// Picks a move for white with the fixed-depth alpha-beta search.
///
/// A fresh transposition cache is allocated for the call and released
/// at return; failure to allocate it is the only error.
pub fn alpha_beta_move_white(board: &Board) -> Result<Move, CacheAllocError> {
    alpha_beta_move(board, false)
}

/// Picks a move for black with the fixed-depth alpha-beta search.
pub fn alpha_beta_move_black(board: &Board) -> Result<Move, CacheAllocError> {
    alpha_beta_move(board, true)
}

/// Picks a move for white with iterative deepening and aspiration
/// windows.
pub fn complex_move_white(board: &Board) -> Result<Move, CacheAllocError> {
    complex_move(board, false)
}

/// Picks a move for black with iterative deepening and aspiration
/// windows.
pub fn complex_move_black(board: &Board) -> Result<Move, CacheAllocError> {
    complex_move(board, true)
}

/// Picks a uniformly random pseudo-legal move, or `None` when the
/// position has none.
pub fn random_move(board: &Board) -> Option<Move> {
    let moves = generate_all(board);
    if moves.is_empty() {
        None
    } else {
        Some(moves[rand::thread_rng().gen_range(0..moves.len())])
    }
}
