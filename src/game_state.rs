pub mod chess_rules;
pub mod chess_types;
#[allow(clippy::module_inception)]
pub mod game_state;
