//! The unwinnability decision pipeline.
//!
//! Cheap, sound filters run first and expensive search last: forced-move
//! normalization, a shallow rewarded search, the semi-static prover, a
//! one-ply static lookahead, and finally iterative-deepening helpmate
//! search over the branches the static layer could not close.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::geometry::pawn_structure::{has_lonely_pawns, nb_blocked_pawns};
use crate::move_generation::legal_move_checks::{checkers, is_king_in_check};
use crate::move_generation::legal_move_generator::legal_moves;
use crate::move_generation::move_generator::{GeneratedMove, MoveGenResult};
use crate::search::helpmate::{
    dynamically_unwinnable, find_mate, find_mate_among, SearchMode, SearchTarget,
};
use crate::search::search_state::{Search, SearchResult, SearchStage};
use crate::search::transposition_table::TranspositionTable;
use crate::search::shaping::impossible_to_win;
use crate::semistatic::System;

/// Forced-move chains longer than this are abandoned; cyclic chains would
/// otherwise loop.
const TRIVIAL_PROGRESS_CAP: usize = 100;

/// Plies of shallow search and its per-depth node budget.
const SHALLOW_DEPTH: i32 = 2;
const SHALLOW_NODES: u64 = 5_000;

/// Per-depth node budget of the deep iterative-deepening phase.
const DEEP_NODES: u64 = 10_000;

const MAX_ITERATION_DEPTH: i32 = 1000;

/// Depth of the quick dynamic predicate, and its extension for frozen
/// pawn-and-bishop structures.
const QUICK_DEPTH: i32 = 7;
const QUICK_DEPTH_BLOCKED: i32 = 15;

/// Outcome of the forced-move normalization.
pub struct ForcedLine {
    pub position: GameState,
    pub moves: Vec<u64>,
    pub repetition: bool,
}

/// Play out the forced prefix: while exactly one legal move exists, make
/// it. A threefold repetition inside the chain means both sides are locked
/// in it and neither can ever escape to deliver mate.
pub fn trivial_progress(pos: &GameState, cap: usize) -> MoveGenResult<ForcedLine> {
    let mut current = pos.clone();
    let mut moves = Vec::new();

    for _ in 0..cap {
        let mut legal = legal_moves(&current)?;
        if legal.len() != 1 {
            break;
        }
        let only = legal.remove(0);
        moves.push(only.move_description);
        current = only.game_after_move;

        if current.is_repetition() {
            return Ok(ForcedLine {
                position: current,
                moves,
                repetition: true,
            });
        }
    }

    Ok(ForcedLine {
        position: current,
        moves,
        repetition: false,
    })
}

/// One semi-static system, one transposition table: the state a single
/// analysis pipeline owns across positions.
pub struct Analyzer {
    system: System,
    tt: TranspositionTable,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            tt: TranspositionTable::new(),
        }
    }

    /// The complete decision procedure for one position.
    pub fn full_analysis(
        &mut self,
        pos: &GameState,
        search: &mut Search,
    ) -> MoveGenResult<SearchResult> {
        search.init();
        let winner = search.intended_winner();
        let loser = winner.opposite();

        // A position where the side to move could capture the enemy king is
        // unreachable by legal play; classify it as unwinnable.
        if is_king_in_check(pos, pos.side_to_move.opposite()) {
            search.set_unwinnable();
            return Ok(search.result());
        }

        let forced = trivial_progress(pos, TRIVIAL_PROGRESS_CAP)?;
        for &m in &forced.moves {
            search.annotate_move(m);
            search.step();
        }
        search.rebase();
        if forced.repetition {
            search.set_unwinnable();
            return Ok(search.result());
        }
        let pos = &forced.position;

        let legal = legal_moves(pos)?;
        if legal.is_empty() {
            if pos.side_to_move == loser && !checkers(pos).is_empty() {
                search.set_winnable();
            } else {
                search.set_unwinnable();
            }
            return Ok(search.result());
        }

        if impossible_to_win(pos, winner) {
            search.set_unwinnable();
            return Ok(search.result());
        }

        // Shallow rewarded search; it settles most winnable positions.
        search.set(SHALLOW_DEPTH, SHALLOW_NODES);
        let mate = find_mate(
            pos,
            search,
            &mut self.tt,
            0,
            false,
            false,
            SearchMode::Quick,
            SearchTarget::Any,
        )?;
        if !search.is_interrupted() && !mate {
            search.set_unwinnable();
        }

        if search.result() == SearchResult::Undetermined {
            search.set_stage(SearchStage::Static);
            if self.system.is_unwinnable(pos, winner)? {
                search.set_unwinnable();
            }
        }

        if search.result() == SearchResult::Undetermined {
            // One-ply lookahead: keep only the branches the static layer
            // cannot already refute.
            let mut surviving: Vec<GeneratedMove> = Vec::new();
            for generated in legal {
                if !self.is_unwinnable_with_trivial_progress(&generated.game_after_move, winner)? {
                    surviving.push(generated);
                }
            }

            if surviving.is_empty() {
                search.set_unwinnable();
            } else {
                search.set_stage(SearchStage::PostStatic);
                self.tt.clear();

                for max_depth in SHALLOW_DEPTH..=MAX_ITERATION_DEPTH {
                    search.set(max_depth, DEEP_NODES);
                    let mate = find_mate_among(
                        pos,
                        &surviving,
                        search,
                        &mut self.tt,
                        SearchMode::Full,
                        SearchTarget::Any,
                    )?;

                    if !search.is_interrupted() && !mate {
                        search.set_unwinnable();
                    }
                    if search.result() != SearchResult::Undetermined || search.is_limit_reached() {
                        break;
                    }
                }
            }
        }

        Ok(search.result())
    }

    /// The one-shot triage used for dead-position queries and batch runs.
    pub fn quick_analysis(
        &mut self,
        pos: &GameState,
        search: &mut Search,
    ) -> MoveGenResult<SearchResult> {
        search.init();
        search.set(0, 0);
        let winner = search.intended_winner();

        // Material flags are taken before the forced prefix is played; the
        // blocked-candidate test looks at the normalized position.
        let knights_rooks_queens = pos.pieces_kind(PieceKind::Knight)
            | pos.pieces_kind(PieceKind::Rook)
            | pos.pieces_kind(PieceKind::Queen);
        let only_pawns_and_bishops = knights_rooks_queens == 0;
        let almost_only_pawns_and_bishops = knights_rooks_queens.count_ones() <= 1;

        let forced = trivial_progress(pos, TRIVIAL_PROGRESS_CAP)?;
        if forced.repetition {
            search.set_unwinnable();
            return Ok(search.result());
        }
        let pos = &forced.position;

        let blocked_candidate = nb_blocked_pawns(pos) >= 1 && !has_lonely_pawns(pos);

        let depth = if only_pawns_and_bishops && blocked_candidate {
            QUICK_DEPTH_BLOCKED
        } else {
            QUICK_DEPTH
        };
        let mut unwinnable = dynamically_unwinnable(pos, depth, winner, search)?;

        if blocked_candidate && !unwinnable && only_pawns_and_bishops {
            unwinnable = self.system.is_unwinnable(pos, winner)?;
        }

        if blocked_candidate
            && !unwinnable
            && almost_only_pawns_and_bishops
            && (!checkers(pos).is_empty() || pos.pieces_kind(PieceKind::Knight) != 0)
        {
            unwinnable = self.system.is_unwinnable_after_one_move(pos, winner)?;
        }

        if unwinnable {
            search.set_unwinnable();
        }
        Ok(search.result())
    }

    /// Same pipeline skeleton as [`Analyzer::full_analysis`] but with
    /// reward shaping disabled, so the first mate found is the shortest.
    /// Iterations step by two plies from the mate-parity depth.
    pub fn find_shortest(
        &mut self,
        pos: &GameState,
        search: &mut Search,
    ) -> MoveGenResult<SearchResult> {
        search.init();
        let winner = search.intended_winner();
        let loser = winner.opposite();

        if is_king_in_check(pos, pos.side_to_move.opposite()) {
            search.set_unwinnable();
            return Ok(search.result());
        }

        let forced = trivial_progress(pos, TRIVIAL_PROGRESS_CAP)?;
        for &m in &forced.moves {
            search.annotate_move(m);
            search.step();
        }
        search.rebase();
        if forced.repetition {
            search.set_unwinnable();
            return Ok(search.result());
        }
        let pos = &forced.position;

        let legal = legal_moves(pos)?;
        if legal.is_empty() {
            if pos.side_to_move == loser && !checkers(pos).is_empty() {
                search.set_winnable();
            } else {
                search.set_unwinnable();
            }
            return Ok(search.result());
        }

        if impossible_to_win(pos, winner) {
            search.set_unwinnable();
            return Ok(search.result());
        }

        if self.system.is_unwinnable(pos, winner)? {
            search.set_unwinnable();
            return Ok(search.result());
        }

        self.tt.clear();

        // A mate delivered by the winner lands on odd ply when the winner
        // is to move, even ply otherwise.
        let mut depth = if pos.side_to_move == winner { 1 } else { 2 };
        while depth <= MAX_ITERATION_DEPTH {
            search.set(depth, search.global_limit());
            let mate = find_mate(
                pos,
                search,
                &mut self.tt,
                0,
                false,
                false,
                SearchMode::Full,
                SearchTarget::Shortest,
            )?;

            if !search.is_interrupted() && !mate {
                search.set_unwinnable();
            }
            if search.result() != SearchResult::Undetermined || search.is_limit_reached() {
                break;
            }
            depth += 2;
        }

        Ok(search.result())
    }

    /// Forced-move normalization followed by the static proof.
    pub fn is_unwinnable_with_trivial_progress(
        &mut self,
        pos: &GameState,
        winner: Color,
    ) -> MoveGenResult<bool> {
        let forced = trivial_progress(pos, TRIVIAL_PROGRESS_CAP)?;
        if forced.repetition {
            return Ok(true);
        }
        self.system.is_unwinnable(&forced.position, winner)
    }

    /// A position is dead when neither player can ever deliver mate.
    pub fn is_dead(&mut self, pos: &GameState, search: &mut Search) -> MoveGenResult<bool> {
        search.set_winner(Color::White);
        if self.quick_analysis(pos, search)? != SearchResult::Unwinnable {
            return Ok(false);
        }

        search.set_winner(Color::Black);
        Ok(self.quick_analysis(pos, search)? == SearchResult::Unwinnable)
    }
}
