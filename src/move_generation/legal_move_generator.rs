//! Full legal move generation.
//!
//! Generates pseudo-legal candidates, applies each one, and keeps the moves
//! whose resulting position does not leave the mover's king in check. Each
//! surviving move carries its child position, so callers never re-apply.

use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::move_generator::{
    GeneratedMove, MoveGenResult, MoveGenerationError,
};
use crate::move_generation::pseudo_legal::generate_pseudo_legal;

pub fn legal_moves(game_state: &GameState) -> MoveGenResult<Vec<GeneratedMove>> {
    let mut pseudo = Vec::<u64>::with_capacity(64);
    generate_pseudo_legal(game_state, &mut pseudo);

    let mut legal = Vec::<GeneratedMove>::with_capacity(pseudo.len());
    for mv in pseudo {
        let next = apply_move(game_state, mv)
            .map_err(|e| MoveGenerationError::InvalidState(format!("apply_move failed: {e}")))?;

        if is_king_in_check(&next, game_state.side_to_move) {
            continue;
        }

        legal.push(GeneratedMove {
            move_description: mv,
            game_after_move: next,
        });
    }

    Ok(legal)
}

#[cfg(test)]
mod tests {
    use super::legal_moves;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_checks::checkers;
    use crate::moves::move_descriptions::{is_castling, is_en_passant};

    fn count_moves(fen: &str) -> usize {
        let game = GameState::from_fen(fen).expect("FEN should parse");
        legal_moves(&game).expect("generation should succeed").len()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        assert_eq!(count_moves(STARTING_POSITION_FEN), 20);
    }

    #[test]
    fn stalemate_has_no_moves_and_no_check() {
        let game = GameState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(legal_moves(&game).expect("generation should succeed").is_empty());
        assert!(checkers(&game).is_empty());
    }

    #[test]
    fn checkmate_has_no_moves_and_a_checker() {
        let game = GameState::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").expect("FEN should parse");
        assert!(legal_moves(&game).expect("generation should succeed").is_empty());
        assert!(!checkers(&game).is_empty());
    }

    #[test]
    fn pinned_piece_may_not_move_away() {
        // The e-file knight is pinned against the king by the rook.
        let game =
            GameState::from_fen("4r2k/8/8/8/8/4N3/8/4K3 w - - 0 1").expect("FEN should parse");
        let moves = legal_moves(&game).expect("generation should succeed");
        assert!(moves
            .iter()
            .all(|m| crate::moves::move_descriptions::move_from(m.move_description) == 4));
    }

    #[test]
    fn castling_and_en_passant_are_generated() {
        let castle = GameState::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .expect("FEN should parse");
        let castle_moves = legal_moves(&castle).expect("generation should succeed");
        assert_eq!(
            castle_moves
                .iter()
                .filter(|m| is_castling(m.move_description))
                .count(),
            2
        );

        let ep =
            GameState::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        let ep_moves = legal_moves(&ep).expect("generation should succeed");
        assert_eq!(
            ep_moves
                .iter()
                .filter(|m| is_en_passant(m.move_description))
                .count(),
            1
        );
    }

    #[test]
    fn moves_are_generated_in_a_stable_order() {
        let game = GameState::from_fen(STARTING_POSITION_FEN).expect("FEN should parse");
        let first = legal_moves(&game).expect("generation should succeed");
        let second = legal_moves(&game).expect("generation should succeed");
        let firsts: Vec<u64> = first.iter().map(|m| m.move_description).collect();
        let seconds: Vec<u64> = second.iter().map(|m| m.move_description).collect();
        assert_eq!(firsts, seconds);
    }
}
