//! Crate root module declarations for the chess session core.
//!
//! Exposes the board model and move generator, the game state machine, the
//! engine adapter with its built-in move oracles, the session controller and
//! the UCI front-end, so the binary and external presentation layers can
//! import stable module paths.

pub mod config;
pub mod errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game;
    pub mod game_result;
    pub mod position;
}

pub mod moves {
    pub mod attack_tables;
    pub mod chess_move;
    pub mod sliding_attacks;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_moves_king;
    pub mod legal_moves_pawn;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod search_control;
    pub mod zobrist;
}

pub mod engines {
    pub mod background_search;
    pub mod engine_adapter;
    pub mod engine_greedy;
    pub mod engine_iterative;
    pub mod engine_random;
    pub mod engine_trait;
    pub mod engine_uci_process;
}

pub mod session {
    pub mod player;
    pub mod session_controller;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod pgn;
    pub mod render_game_state;
}
