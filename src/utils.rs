pub mod algebraic;
pub mod fen_parser;
pub mod long_algebraic;
pub mod render_game_state;
