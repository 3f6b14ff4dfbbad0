//! Depth-bounded helpmate search.
//!
//! `find_mate` explores the legal-move tree looking for a checkmate
//! delivered by the intended winner, with the loser treated as a possible
//! accomplice. Reward/punish classification stretches the remaining depth
//! along cooperative lines and shrinks it along defensive ones; it never
//! rejects a move, so iterative deepening stays exhaustive.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::geometry::pawn_structure::{has_lonely_pawns, nb_blocked_pawns, semi_blocked_target};
use crate::move_generation::legal_move_checks::checkers;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::move_generation::move_generator::{GeneratedMove, MoveGenResult};
use crate::moves::move_descriptions::{
    is_advanced_pawn_push, is_capture, move_moved_piece, move_promotion_piece,
};
use crate::search::search_state::Search;
use crate::search::shaping::{
    going_to_square, impossible_to_win, need_loser_promotion, set_target, VariationType,
};
use crate::search::transposition_table::TranspositionTable;

/// Full mode consults the transposition table; quick mode skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Quick,
    Full,
}

/// Any accepts the first mate found under reward shaping; Shortest
/// disables shaping so the iteration depth is the exact mate length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Any,
    Shortest,
}

// Reward shaping is switched off deep in the tree; a line that long is no
// longer "making progress toward the corner".
const REWARD_DEPTH_CUTOFF: i32 = 300;

/// Search for a helpmate from `pos`. Returns true and records the verdict
/// in `search` as soon as a mate by the intended winner is found.
#[allow(clippy::too_many_arguments)]
pub fn find_mate(
    pos: &GameState,
    search: &mut Search,
    tt: &mut TranspositionTable,
    depth: i32,
    past_progress: bool,
    was_semi_blocked: bool,
    mode: SearchMode,
    target: SearchTarget,
) -> MoveGenResult<bool> {
    let winner = search.intended_winner();
    let loser = winner.opposite();
    let moves_left = search.max_depth() - depth;

    // A position already searched with at least this budget has nothing
    // new to offer.
    if mode == SearchMode::Full {
        if let Some(entry) = tt.probe(pos.zobrist_key) {
            if entry.depth >= moves_left {
                return Ok(false);
            }
        }
    }

    if impossible_to_win(pos, winner) {
        return Ok(false);
    }

    let moves = legal_moves(pos)?;

    // Checkmate by the intended winner.
    if moves.is_empty() && pos.side_to_move == loser && !checkers(pos).is_empty() {
        search.set_winnable();
        return Ok(true);
    }

    if depth >= search.max_depth() || search.is_local_limit_reached() {
        search.interrupt();
        return Ok(false);
    }

    if mode == SearchMode::Full {
        tt.store(pos.zobrist_key, moves_left);
    }

    explore_moves(
        pos,
        &moves,
        search,
        tt,
        depth,
        past_progress,
        was_semi_blocked,
        mode,
        target,
    )
}

/// Search only the given root branches of `pos`. Each branch move is
/// classified and depth-shaped exactly as [`find_mate`] treats any other
/// ply; only the set of first moves is restricted.
pub fn find_mate_among(
    pos: &GameState,
    branches: &[GeneratedMove],
    search: &mut Search,
    tt: &mut TranspositionTable,
    mode: SearchMode,
    target: SearchTarget,
) -> MoveGenResult<bool> {
    explore_moves(pos, branches, search, tt, 0, false, false, mode, target)
}

// The move loop of the helpmate search: classify every move, stretch or
// shrink the remaining depth accordingly, and recurse.
#[allow(clippy::too_many_arguments)]
fn explore_moves(
    pos: &GameState,
    moves: &[GeneratedMove],
    search: &mut Search,
    tt: &mut TranspositionTable,
    depth: i32,
    past_progress: bool,
    was_semi_blocked: bool,
    mode: SearchMode,
    target: SearchTarget,
) -> MoveGenResult<bool> {
    let winner = search.intended_winner();
    let loser = winner.opposite();

    let need_promotion = need_loser_promotion(pos, winner);
    let winners_turn = pos.side_to_move == winner;

    let knights_rooks_queens = pos.pieces_kind(PieceKind::Knight)
        | pos.pieces_kind(PieceKind::Rook)
        | pos.pieces_kind(PieceKind::Queen);
    let only_pawns_and_bishops = knights_rooks_queens == 0;
    let blocked_heuristic = only_pawns_and_bishops
        && nb_blocked_pawns(pos) >= 4
        && !has_lonely_pawns(pos);
    let unblocking_target = semi_blocked_target(pos);

    for generated in moves {
        let m = generated.move_description;
        let moved_piece = move_moved_piece(m).unwrap_or(PieceKind::Pawn);
        let mut variation = VariationType::Normal;

        if target == SearchTarget::Any {
            let approach = set_target(pos, moved_piece, winner);

            if winners_turn {
                if is_advanced_pawn_push(pos.side_to_move, m)
                    || is_capture(m)
                    || going_to_square(m, approach, moved_piece, false)
                {
                    variation = VariationType::Reward;
                }
            } else {
                if need_promotion {
                    let heavy = matches!(
                        move_promotion_piece(m),
                        Some(PieceKind::Queen) | Some(PieceKind::Rook)
                    );
                    variation = if moved_piece == PieceKind::Pawn && !heavy {
                        VariationType::Reward
                    } else {
                        VariationType::Punish
                    };
                }

                if going_to_square(m, approach, moved_piece, false) {
                    variation = VariationType::Reward;
                }

                if is_capture(m) {
                    variation = VariationType::Punish;
                }
            }
        }

        // Heuristic override for semi-blocked pawn-and-bishop positions.
        if blocked_heuristic {
            if unblocking_target.is_some() || was_semi_blocked {
                if is_capture(m) && winners_turn {
                    variation = VariationType::Reward;
                } else if moved_piece == PieceKind::King {
                    variation = VariationType::Normal;
                    if let Some(unblock) = unblocking_target {
                        if going_to_square(m, unblock, moved_piece, false) {
                            variation = VariationType::Reward;
                        }
                    }
                } else {
                    variation = VariationType::Punish;
                }
            } else {
                let approach = set_target(pos, moved_piece, winner);
                if going_to_square(m, approach, moved_piece, true)
                    && pos.count(loser, PieceKind::Bishop) > 1
                {
                    variation = VariationType::Reward;
                }
            }
        }

        let next = &generated.game_after_move;
        let mut new_depth = depth + 1;

        if target == SearchTarget::Any {
            // Clear the reward tag while the loser keeps queens on the
            // board, and once the line has grown past the shaping horizon.
            if variation == VariationType::Reward {
                let loser_keeps_queens =
                    !winners_turn && next.count(loser, PieceKind::Queen) > 0;
                if loser_keeps_queens || search.actual_depth() > REWARD_DEPTH_CUTOFF {
                    variation = VariationType::Normal;
                }
            }

            match variation {
                VariationType::Reward => new_depth -= 1,
                VariationType::Punish => new_depth = search.max_depth().min(new_depth + 2),
                VariationType::Normal => {
                    // Reward once more if the previous player made progress.
                    if past_progress {
                        new_depth -= 1;
                    }
                }
            }
        }

        search.annotate_move(m);
        search.step();

        let mate = find_mate(
            next,
            search,
            tt,
            new_depth,
            variation == VariationType::Reward,
            unblocking_target.is_some() || was_semi_blocked,
            mode,
            target,
        )?;

        search.undo_step();

        if mate {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Depth-bounded proof that every line is unwinnable for `winner`.
///
/// Returns false as soon as one branch fails to prove it (which includes
/// running out of depth), so open positions exit quickly. A checkmate by
/// the winner found along the way is recorded in `search`.
pub fn dynamically_unwinnable(
    pos: &GameState,
    depth: i32,
    winner: Color,
    search: &mut Search,
) -> MoveGenResult<bool> {
    if impossible_to_win(pos, winner) {
        return Ok(true);
    }

    let moves = legal_moves(pos)?;

    if moves.is_empty() && !checkers(pos).is_empty() {
        if pos.side_to_move == winner {
            // The winner is the one checkmated.
            return Ok(true);
        }
        search.set_winnable();
        return Ok(false);
    }

    if depth <= 0 {
        return Ok(false);
    }

    for generated in &moves {
        search.annotate_move(generated.move_description);
        search.step();
        let unwinnable =
            dynamically_unwinnable(&generated.game_after_move, depth - 1, winner, search)?;
        search.undo_step();

        if !unwinnable {
            return Ok(false);
        }
    }

    // Stalemate, or every reply proven unwinnable.
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{dynamically_unwinnable, find_mate, find_mate_among, SearchMode, SearchTarget};
    use crate::game_state::chess_types::Color;
    use crate::game_state::game_state::GameState;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::search::search_state::{Search, SearchResult};
    use crate::search::transposition_table::TranspositionTable;
    use crate::utils::long_algebraic::{format_move, format_variation};

    fn search_for(winner: Color) -> Search {
        let mut search = Search::new();
        search.set_winner(winner);
        search.set_limit(1_000_000);
        search.init();
        search
    }

    #[test]
    fn finds_a_mate_in_one() {
        let game =
            GameState::from_fen("7k/5K2/6Q1/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::White);
        let mut tt = TranspositionTable::with_entries(1 << 12);

        // A tiny local budget: immediate mates are found regardless, and the
        // cooperative wander through earlier branches exhausts right away.
        search.set(2, 100);
        let mate = find_mate(
            &game,
            &mut search,
            &mut tt,
            0,
            false,
            false,
            SearchMode::Quick,
            SearchTarget::Any,
        )
        .expect("search should succeed");

        assert!(mate);
        assert_eq!(search.result(), SearchResult::Winnable);
        assert_eq!(
            format_variation(search.principal_variation()).expect("should format"),
            "g6g7"
        );
    }

    #[test]
    fn mate_must_be_delivered_by_the_intended_winner() {
        // Same mate-in-one, but Black is supposed to win.
        let game =
            GameState::from_fen("7k/5K2/6Q1/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::Black);
        let mut tt = TranspositionTable::with_entries(1 << 12);

        search.set(2, 5000);
        let mate = find_mate(
            &game,
            &mut search,
            &mut tt,
            0,
            false,
            false,
            SearchMode::Quick,
            SearchTarget::Any,
        )
        .expect("search should succeed");

        assert!(!mate);
        assert_eq!(search.result(), SearchResult::Undetermined);
    }

    #[test]
    fn rook_mate_in_one_from_the_seventh() {
        let game =
            GameState::from_fen("4k3/R7/4K3/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::White);
        let mut tt = TranspositionTable::with_entries(1 << 12);

        search.set(2, 100);
        let mate = find_mate(
            &game,
            &mut search,
            &mut tt,
            0,
            false,
            false,
            SearchMode::Full,
            SearchTarget::Any,
        )
        .expect("search should succeed");

        assert!(mate);
        assert_eq!(
            format_variation(search.principal_variation()).expect("should format"),
            "a7a8"
        );
    }

    #[test]
    fn shortest_target_disables_shaping_but_still_mates() {
        let game =
            GameState::from_fen("7k/5K2/6Q1/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::White);
        let mut tt = TranspositionTable::with_entries(1 << 12);

        search.set(1, 5000);
        let mate = find_mate(
            &game,
            &mut search,
            &mut tt,
            0,
            false,
            false,
            SearchMode::Full,
            SearchTarget::Shortest,
        )
        .expect("search should succeed");

        assert!(mate);
        assert_eq!(search.principal_variation().len(), 1);
    }

    #[test]
    fn restricted_root_search_visits_only_the_given_branches() {
        let game =
            GameState::from_fen("4k3/R7/4K3/8/8/8/8/8 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::White);
        let mut tt = TranspositionTable::with_entries(1 << 12);

        let branch = |coords: &str| {
            legal_moves(&game)
                .expect("generation should succeed")
                .into_iter()
                .filter(|g| {
                    format_move(g.move_description).expect("should format") == coords
                })
                .collect::<Vec<_>>()
        };

        // Restricted to the mating branch, the mate is found and recorded.
        let mating = branch("a7a8");
        assert_eq!(mating.len(), 1);
        search.set(2, 100);
        let mate = find_mate_among(
            &game,
            &mating,
            &mut search,
            &mut tt,
            SearchMode::Full,
            SearchTarget::Any,
        )
        .expect("search should succeed");
        assert!(mate);
        assert_eq!(
            format_variation(search.principal_variation()).expect("should format"),
            "a7a8"
        );

        // Restricted to a quiet branch, the tiny budget runs out instead.
        let quiet = branch("a7b7");
        assert_eq!(quiet.len(), 1);
        tt.clear();
        search.set(2, 1);
        let mate = find_mate_among(
            &game,
            &quiet,
            &mut search,
            &mut tt,
            SearchMode::Full,
            SearchTarget::Any,
        )
        .expect("search should succeed");
        assert!(!mate);
        assert!(search.is_interrupted());
    }

    #[test]
    fn bare_kings_are_dynamically_unwinnable() {
        let game =
            GameState::from_fen("8/8/8/8/8/8/4k3/4K3 w - - 0 1").expect("FEN should parse");
        let mut search = search_for(Color::White);
        search.set(0, 0);
        assert!(
            dynamically_unwinnable(&game, 3, Color::White, &mut search)
                .expect("search should succeed")
        );
    }

    #[test]
    fn open_positions_are_not_dynamically_unwinnable() {
        let game = GameState::from_fen("4k3/R7/4K3/8/8/8/8/8 w - - 0 1")
            .expect("FEN should parse");
        let mut search = search_for(Color::White);
        search.set(0, 0);
        assert!(
            !dynamically_unwinnable(&game, 5, Color::White, &mut search)
                .expect("search should succeed")
        );
    }
}
