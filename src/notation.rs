//! Reading boards and moves from text.
//!
//! Two board formats are accepted: a tolerant "diagram" format (eight
//! rank-lines top-down, `.` or space for empty squares, piece letters
//! with uppercase for white), and the piece-placement plus
//! side-to-move prefix of a FEN string. Neither format carries
//! castling or en-passant rights; instead, any square whose piece
//! kind differs from the standard starting position is marked as
//! having moved, which makes castling and double-step rights come out
//! right for positions derived from play.

use std::error::Error;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::basetypes::*;
use crate::board::{Board, Cell};


/// Signalled for text that does not describe a board or a move.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseError;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "malformed board or move text")
    }
}

impl Error for ParseError {}


lazy_static! {
    static ref FEN_SHAPE: Regex = Regex::new(r"^([KQRBNPkqrbnp1-8]+/){7}[KQRBNPkqrbnp1-8]+ [wb]")
                                      .unwrap();
    static ref MOVE_TEXT: Regex = Regex::new(r"^([a-h])([1-8])([a-h])([1-8])$").unwrap();
}


fn piece_from_char(c: char) -> Option<Cell> {
    let kind = match c.to_ascii_uppercase() {
        'K' => KING,
        'Q' => QUEEN,
        'R' => ROOK,
        'B' => BISHOP,
        'N' => KNIGHT,
        'P' => PAWN,
        _ => return None,
    };
    Some(Cell::new(kind, c.is_ascii_uppercase()))
}

/// Marks every square whose piece kind differs from the standard
/// starting position as having moved.
fn mark_derived_from_start(board: &mut Board) {
    let start = Board::starting_position();
    for square in 0..64 {
        if board.cell_at(square).kind() != start.cell_at(square).kind() {
            board.cell_at_mut(square).set_has_moved();
        }
    }
}

/// Parses the tolerant diagram format: eight rank-lines top-down
/// (black's back rank first), `.` or space for an empty square,
/// `KQRBNP`/`kqrbnp` for pieces, `\r` ignored, `\n` ending a rank.
/// White is to move.
pub fn board_from_diagram(text: &str) -> Result<Board, ParseError> {
    let mut board = Board::empty();
    let (mut x, mut y): (i8, i8) = (0, 7);
    for c in text.chars() {
        let cell = match c {
            '.' | ' ' => Cell::EMPTY,
            '\r' => continue,
            '\n' => {
                x = 0;
                y -= 1;
                if y < 0 {
                    break;
                }
                continue;
            }
            other => piece_from_char(other).ok_or(ParseError)?,
        };
        if x >= BOARD_WIDTH {
            return Err(ParseError);
        }
        board.set_cell(x, y, cell);
        x += 1;
        if x == BOARD_WIDTH && y == 0 {
            break;
        }
    }
    mark_derived_from_start(&mut board);
    Ok(board)
}

/// Parses the piece placement and side-to-move fields of a FEN
/// string. The castling, en-passant, and clock fields are not read.
pub fn board_from_fen(fen: &str) -> Result<Board, ParseError> {
    if !FEN_SHAPE.is_match(fen) {
        return Err(ParseError);
    }
    let mut board = Board::empty();
    let (mut x, mut y): (i8, i8) = (0, 7);
    let mut chars = fen.chars();
    for c in chars.by_ref() {
        match c {
            '1'..='8' => {
                let run = c as i8 - '0' as i8;
                if x + run > BOARD_WIDTH {
                    return Err(ParseError);
                }
                x += run;
            }
            '/' => {
                if y == 0 {
                    return Err(ParseError);
                }
                x = 0;
                y -= 1;
            }
            ' ' => break,
            other => {
                let cell = piece_from_char(other).ok_or(ParseError)?;
                if x >= BOARD_WIDTH {
                    return Err(ParseError);
                }
                board.set_cell(x, y, cell);
                x += 1;
            }
        }
    }
    let side = chars.next().ok_or(ParseError)?;
    board.set_white_to_move(side == 'w');
    mark_derived_from_start(&mut board);
    Ok(board)
}

/// Parses coordinate move text like `e2e4` into origin and
/// destination coordinates. The promotion piece is not part of the
/// text; front-ends ask for it separately.
pub fn parse_move_text(text: &str) -> Result<((i8, i8), (i8, i8)), ParseError> {
    let trimmed = text.trim();
    if !MOVE_TEXT.is_match(trimmed) {
        return Err(ParseError);
    }
    let bytes = trimmed.as_bytes();
    Ok((((bytes[0] - b'a') as i8, (bytes[1] - b'1') as i8),
        ((bytes[2] - b'a') as i8, (bytes[3] - b'1') as i8)))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagram_of_starting_position() {
        let board = board_from_diagram("rnbqkbnr\n\
                                        pppppppp\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        ........\n\
                                        PPPPPPPP\n\
                                        RNBQKBNR")
                        .unwrap();
        assert_eq!(board, Board::starting_position());
        for square in 0..64 {
            assert!(!board.cell_at(square).has_moved());
        }
    }

    #[test]
    fn test_diagram_accepts_spaces_and_crlf() {
        let text = "rnbqkbnr\r\npppppppp\r\n        \r\n........\r\n........\r\n........\r\nPPPPPPPP\r\nRNBQKBNR";
        let board = board_from_diagram(text).unwrap();
        assert_eq!(board, Board::starting_position());
    }

    #[test]
    fn test_diagram_rejects_garbage() {
        assert_eq!(board_from_diagram("xyz"), Err(ParseError));
    }

    #[test]
    fn test_derived_has_moved_marking() {
        let board = board_from_diagram("rnbqkbnr\n\
                                        pppppppp\n\
                                        ........\n\
                                        ........\n\
                                        ....P...\n\
                                        ........\n\
                                        PPPP.PPP\n\
                                        RNBQKBNR")
                        .unwrap();
        // The advanced pawn and its vacated square differ from the
        // starting position, everything else does not.
        assert!(board.cell(FILE_E, RANK_4).has_moved());
        assert!(board.cell(FILE_E, RANK_2).has_moved());
        assert!(!board.cell(FILE_E, RANK_1).has_moved());
        assert!(!board.cell(FILE_A, RANK_1).has_moved());
    }

    #[test]
    fn test_fen_matches_diagram() {
        let from_diagram = board_from_diagram("r...kb.r\n\
                                               ppp.pppp\n\
                                               n....n..\n\
                                               ....Q...\n\
                                               .....B..\n\
                                               ..N.KP..\n\
                                               PPP...qP\n\
                                               ...R..NR")
                               .unwrap();
        let from_fen = board_from_fen("r3kb1r/ppp1pppp/n4n2/4Q3/5B2/2N1KP2/PPP3qP/3R2NR w")
                           .unwrap();
        assert_eq!(from_diagram, from_fen);
        assert!(from_fen.white_to_move());
    }

    #[test]
    fn test_fen_side_to_move() {
        let board = board_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b").unwrap();
        assert!(!board.white_to_move());
    }

    #[test]
    fn test_fen_rejects_malformed_input() {
        assert!(board_from_fen("rnbqkbnr/pppppppp/8/8").is_err());
        assert!(board_from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x").is_err());
        assert!(board_from_fen("9/8/8/8/8/8/8/8 w").is_err());
        assert!(board_from_fen("rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w").is_err());
    }

    #[test]
    fn test_parse_move_text() {
        assert_eq!(parse_move_text("e2e4"), Ok(((4, 1), (4, 3))));
        assert_eq!(parse_move_text(" a7a8 \n"), Ok(((0, 6), (0, 7))));
        assert!(parse_move_text("e2").is_err());
        assert!(parse_move_text("e2e9").is_err());
        assert!(parse_move_text("i2i4").is_err());
    }
}
