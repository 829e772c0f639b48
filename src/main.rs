//! The interactive terminal front-end.
//!
//! Drives a game between two controllers (human or engine), renders
//! the board between moves, and announces the winner once a king has
//! been captured.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use philidor::basetypes::*;
use philidor::movegen::{find_move, generate_all};
use philidor::notation::{board_from_diagram, parse_move_text};
use philidor::search;
use philidor::tt::CacheAllocError;
use philidor::{Board, Move};


#[derive(Parser)]
#[command(about = "A minimax chess engine with alpha-beta pruning and a transposition cache")]
struct Args {
    /// Let a human play white (the default).
    #[arg(long)]
    play_white: bool,

    /// Let a human play black.
    #[arg(long)]
    play_black: bool,

    /// Pick white's moves at random.
    #[arg(long)]
    random_white: bool,

    /// Pick black's moves at random.
    #[arg(long)]
    random_black: bool,

    /// Use the naive minimax searcher for white.
    #[arg(long)]
    minimax_white: bool,

    /// Use the naive minimax searcher for black.
    #[arg(long)]
    minimax_black: bool,

    /// Use the fixed-depth alpha-beta searcher for white.
    #[arg(long)]
    alphabeta_white: bool,

    /// Use the fixed-depth alpha-beta searcher for black.
    #[arg(long)]
    alphabeta_black: bool,

    /// Use the iterative-deepening searcher for white.
    #[arg(long)]
    complex_white: bool,

    /// Use the iterative-deepening searcher for black (the default).
    #[arg(long)]
    complex_black: bool,

    /// Skip the startup self-checks.
    #[arg(long)]
    no_tests: bool,

    /// Start from the board diagram in this file instead of the
    /// standard starting position.
    position: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Controller {
    Player,
    Random,
    Minimax,
    AlphaBeta,
    Complex,
}

impl Args {
    fn white_controller(&self) -> Controller {
        if self.complex_white {
            Controller::Complex
        } else if self.alphabeta_white {
            Controller::AlphaBeta
        } else if self.minimax_white {
            Controller::Minimax
        } else if self.random_white {
            Controller::Random
        } else {
            Controller::Player
        }
    }

    fn black_controller(&self) -> Controller {
        if self.play_black {
            Controller::Player
        } else if self.random_black {
            Controller::Random
        } else if self.minimax_black {
            Controller::Minimax
        } else if self.alphabeta_black {
            Controller::AlphaBeta
        } else {
            Controller::Complex
        }
    }
}


fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if !args.no_tests {
        run_self_checks();
    }

    let mut board = match &args.position {
        Some(path) => match fs::read_to_string(path).ok().and_then(|t| {
            board_from_diagram(&t).ok()
        }) {
            Some(board) => board,
            None => {
                eprintln!("Failed to read a starting position from {}.", path.display());
                exit(1);
            }
        },
        None => Board::starting_position(),
    };

    let white = args.white_controller();
    let black = args.black_controller();

    println!("{}", board);

    loop {
        board = take_turn(&board, white);
        println!("{}", board);
        if board.white_won() {
            break;
        }

        board = take_turn(&board, black);
        println!("{}", board);
        if board.black_won() {
            break;
        }
    }

    println!("{} has won the game!",
             if board.black_won() { "Black" } else { "White" });
}

fn take_turn(board: &Board, controller: Controller) -> Board {
    let m = match controller {
        Controller::Player => read_move_from_input(board),
        Controller::Random => match search::random_move(board) {
            Some(m) => m,
            None => {
                eprintln!("Failed to retrieve moves. Aborting.");
                exit(1);
            }
        },
        Controller::Minimax => {
            if board.white_to_move() {
                search::minimax_move_white(board)
            } else {
                search::minimax_move_black(board)
            }
        }
        Controller::AlphaBeta => engine_move(if board.white_to_move() {
            search::alpha_beta_move_white(board)
        } else {
            search::alpha_beta_move_black(board)
        }),
        Controller::Complex => engine_move(if board.white_to_move() {
            search::complex_move_white(board)
        } else {
            search::complex_move_black(board)
        }),
    };

    if !m.is_valid() {
        eprintln!("Failed to retrieve moves. Aborting.");
        exit(1);
    }
    if controller != Controller::Player {
        println!("Played Move: {}\n", m.notation());
    }
    board.apply_move(m)
}

fn engine_move(result: Result<Move, CacheAllocError>) -> Move {
    match result {
        Ok(m) => m,
        Err(error) => {
            eprintln!("{}. Aborting.", error);
            exit(1);
        }
    }
}

fn read_move_from_input(board: &Board) -> Move {
    let stdin = io::stdin();
    loop {
        println!("Specify Move: (e.g. e2e4) - You are playing as {}",
                 if board.white_to_move() { "white" } else { "black" });
        print!("> ");
        io::stdout().flush().ok();

        let mut text = String::new();
        if stdin.lock().read_line(&mut text).is_err() || text.is_empty() {
            eprintln!("Failed to read input. Aborting.");
            exit(1);
        }
        let (origin, dest) = match parse_move_text(&text) {
            Ok(coords) => coords,
            Err(_) => {
                println!("Invalid Move!");
                continue;
            }
        };

        // A promotion needs one more answer from the player.
        let needs_promotion = generate_all(board)
                                  .iter()
                                  .any(|m| (m.orig_x(), m.orig_y()) == origin &&
                                           (m.dest_x(), m.dest_y()) == dest &&
                                           m.is_promotion());
        let promote_to_queen = if needs_promotion {
            println!("Promote to: ([q]ueen/k[n]ight)");
            print!("> ");
            io::stdout().flush().ok();
            let mut answer = String::new();
            if stdin.lock().read_line(&mut answer).is_err() {
                eprintln!("Failed to read input. Aborting.");
                exit(1);
            }
            match answer.trim() {
                "q" => Some(true),
                "k" | "n" => Some(false),
                _ => {
                    println!("Invalid Move!");
                    continue;
                }
            }
        } else {
            None
        };

        match find_move(board, origin, dest, promote_to_queen) {
            Some(m) => return m,
            None => {
                println!("Invalid Move!");
                continue;
            }
        }
    }
}

/// A pair of quick sanity checks, replayed at every start unless
/// `--no-tests` is given.
fn run_self_checks() {
    // The double-step flag must live for exactly one ply.
    let board = Board::starting_position();
    let board = board.apply_move(Move::new(FILE_E, RANK_2, FILE_E, RANK_4));
    assert!(board.cell(FILE_E, RANK_4).last_was_double_step());
    let board = board.apply_move(Move::new(FILE_B, RANK_7, FILE_B, RANK_5));
    assert!(!board.cell(FILE_E, RANK_4).last_was_double_step());
    assert!(board.cell(FILE_B, RANK_5).last_was_double_step());

    // The two board formats must agree.
    let diagram = board_from_diagram("r...kb.r\n\
                                      ppp.pppp\n\
                                      n....n..\n\
                                      ....Q...\n\
                                      .....B..\n\
                                      ..N.KP..\n\
                                      PPP...qP\n\
                                      ...R..NR")
                      .expect("self-check diagram must parse");
    let fen = philidor::notation::board_from_fen("r3kb1r/ppp1pppp/n4n2/4Q3/5B2/2N1KP2/PPP3qP/3R2NR w")
                  .expect("self-check FEN must parse");
    assert!(diagram == fen, "diagram and FEN parsers disagree");
}
