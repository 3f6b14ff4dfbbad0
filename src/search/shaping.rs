//! Heuristic move classification for the helpmate search.
//!
//! Variations are rewarded when they make pieces approach a mating setup
//! in a corner: the corner lies on the intended winner's eighth rank and
//! its color depends on the bishops on the board. With a dark corner and
//! White winning, the corner is h8: the loser king belongs on h8, the
//! winner king on h6, a loser piece on g8 blocking the exit, and any
//! winner piece pointing at h8 delivering mate. Rewards and punishments
//! only stretch or shrink the remaining depth; no legal move is ever
//! filtered out.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::geometry::board_geometry::{flip_file, flip_rank, square_distance, DARK_SQUARES};
use crate::geometry::knight_distance;
use crate::moves::move_descriptions::{move_from, move_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariationType {
    Normal,
    Reward,
    Punish,
}

/// The square the moving piece should approach, given who moves and who is
/// supposed to win.
pub fn set_target(pos: &GameState, moved_piece: PieceKind, winner: Color) -> Square {
    // A dark corner when the winner has a dark-squared bishop, or when the
    // winner has no bishops and the loser owns a light-squared one.
    let winner_bishops = pos.pieces_of(winner, PieceKind::Bishop);
    let loser_bishops = pos.pieces_of(winner.opposite(), PieceKind::Bishop);
    let dark_corner = (DARK_SQUARES & winner_bishops) != 0
        || (winner_bishops == 0 && (!DARK_SQUARES & loser_bishops) != 0);

    let king = moved_piece == PieceKind::King;
    let winners_turn = pos.side_to_move == winner;

    // Assume for a moment that the corner is h8.
    const H8: Square = 63;
    const H6: Square = 47;
    const G8: Square = 62;
    let mut target = if winners_turn {
        if king {
            H6
        } else {
            H8
        }
    } else if king {
        H8
    } else {
        G8
    };

    // Correct the file for a light corner (a8), and the rank when the
    // winner is Black (h1 or a1).
    if !dark_corner {
        target = flip_file(target);
    }
    if winner == Color::Black {
        target = flip_rank(flip_file(target));
    }

    target
}

/// Whether the move brings its piece strictly closer to `target`. Only
/// meaningful for slow pieces: kings (and bishops when the semi-blocked
/// heuristic asks for them) measure Chebyshev distance, knights measure
/// knight distance, everything else reports no progress.
pub fn going_to_square(m: u64, target: Square, piece: PieceKind, check_bishops: bool) -> bool {
    match piece {
        PieceKind::King => {
            square_distance(move_to(m), target) < square_distance(move_from(m), target)
        }
        PieceKind::Bishop if check_bishops => {
            square_distance(move_to(m), target) < square_distance(move_from(m), target)
        }
        PieceKind::Knight => {
            knight_distance::get(move_to(m), target) < knight_distance::get(move_from(m), target)
        }
        _ => false,
    }
}

/// Whether the loser must promote for the winner to have mating material.
/// False positives are fine: they only cause pawn pushes to be rewarded.
pub fn need_loser_promotion(pos: &GameState, winner: Color) -> bool {
    let loser = winner.opposite();
    let minors_and_rooks = pos.pieces_kind(PieceKind::Knight)
        | pos.pieces_kind(PieceKind::Bishop)
        | pos.pieces_kind(PieceKind::Rook);

    // Winner has bare king + knight, loser has no minors or rooks to be
    // cornered with.
    if pos.piece_total(winner) == 2
        && pos.count(winner, PieceKind::Knight) == 1
        && (pos.pieces(loser) & minors_and_rooks) == 0
    {
        return true;
    }

    // Winner has bare king + same-colored bishops; loser has no knights
    // and no bishop of the opposite color.
    let winner_bishops = pos.pieces_of(winner, PieceKind::Bishop);
    let bishops_color = if (DARK_SQUARES & winner_bishops) != 0 {
        DARK_SQUARES
    } else {
        !DARK_SQUARES
    };
    if pos.piece_total(winner) == pos.count(winner, PieceKind::Bishop) + 1
        && (!bishops_color & pos.pieces_kind(PieceKind::Bishop)) == 0
        && pos.count(loser, PieceKind::Knight) == 0
    {
        return true;
    }

    false
}

/// Statically decide that the winner can never checkmate. Never a false
/// positive: `need_loser_promotion` is only consulted once the loser has
/// no pawns left, where it is exact.
pub fn impossible_to_win(pos: &GameState, winner: Color) -> bool {
    if pos.piece_total(winner) == 1 {
        return true;
    }

    pos.count(winner.opposite(), PieceKind::Pawn) == 0 && need_loser_promotion(pos, winner)
}

#[cfg(test)]
mod tests {
    use super::{going_to_square, impossible_to_win, need_loser_promotion, set_target};
    use crate::game_state::chess_types::{Color, PieceKind};
    use crate::game_state::game_state::GameState;
    use crate::moves::move_descriptions::pack_move_description;

    #[test]
    fn dark_corner_targets_for_white_winner() {
        // White has a dark-squared bishop: the mating corner is h8.
        let game = GameState::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1")
            .expect("FEN should parse");

        // Winner to move: king heads for h6, pieces for h8.
        assert_eq!(set_target(&game, PieceKind::King, Color::White), 47);
        assert_eq!(set_target(&game, PieceKind::Bishop, Color::White), 63);

        // Loser to move: its king belongs on h8, its pieces on g8.
        let black_to_move = GameState::from_fen("4k3/8/8/8/8/8/8/2B1K3 b - - 0 1")
            .expect("FEN should parse");
        assert_eq!(set_target(&black_to_move, PieceKind::King, Color::White), 63);
        assert_eq!(set_target(&black_to_move, PieceKind::Pawn, Color::White), 62);
    }

    #[test]
    fn light_corner_flips_the_file_and_black_flips_the_rank() {
        // White winner with a light-squared bishop: corner a8.
        let light = GameState::from_fen("4k3/8/8/8/8/8/8/3BK3 w - - 0 1")
            .expect("FEN should parse");
        assert_eq!(set_target(&light, PieceKind::Bishop, Color::White), 56);

        // Black winner with a dark-squared bishop: corner a1.
        let black = GameState::from_fen("3bk3/8/8/8/8/8/8/4K3 b - - 0 1")
            .expect("FEN should parse");
        assert_eq!(set_target(&black, PieceKind::Bishop, Color::Black), 0);
    }

    #[test]
    fn progress_tests_use_the_right_metric() {
        let king_closer = pack_move_description(0, 9, PieceKind::King, None, None, 0);
        assert!(going_to_square(king_closer, 18, PieceKind::King, false));
        let king_away = pack_move_description(9, 0, PieceKind::King, None, None, 0);
        assert!(!going_to_square(king_away, 18, PieceKind::King, false));

        // b1 -> c3 halves the knight distance to e4.
        let knight = pack_move_description(1, 18, PieceKind::Knight, None, None, 0);
        assert!(going_to_square(knight, 28, PieceKind::Knight, false));

        // Bishops only count when explicitly requested.
        let bishop = pack_move_description(2, 9, PieceKind::Bishop, None, None, 0);
        assert!(!going_to_square(bishop, 16, PieceKind::Bishop, false));
        assert!(going_to_square(bishop, 16, PieceKind::Bishop, true));

        // Sliders never report progress.
        let rook = pack_move_description(0, 8, PieceKind::Rook, None, None, 0);
        assert!(!going_to_square(rook, 16, PieceKind::Rook, false));
    }

    #[test]
    fn knight_endings_need_a_loser_promotion() {
        let game = GameState::from_fen("8/8/8/8/8/8/5k2/5K1N w - - 0 1")
            .expect("FEN should parse");
        assert!(need_loser_promotion(&game, Color::White));
        assert!(impossible_to_win(&game, Color::White));
    }

    #[test]
    fn same_colored_bishops_need_a_loser_promotion() {
        let game = GameState::from_fen("8/8/8/2k5/8/2K5/8/2B5 w - - 0 1")
            .expect("FEN should parse");
        assert!(need_loser_promotion(&game, Color::White));
        assert!(impossible_to_win(&game, Color::White));
    }

    #[test]
    fn loser_pawns_keep_hope_alive() {
        let game = GameState::from_fen("8/8/8/2k3p1/8/2K5/8/2B5 w - - 0 1")
            .expect("FEN should parse");
        assert!(need_loser_promotion(&game, Color::White));
        assert!(!impossible_to_win(&game, Color::White));
    }

    #[test]
    fn bare_king_cannot_win() {
        let game = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1")
            .expect("FEN should parse");
        assert!(impossible_to_win(&game, Color::White));
        assert!(impossible_to_win(&game, Color::Black));
    }

    #[test]
    fn rook_material_is_never_hopeless() {
        let game = GameState::from_fen("4k3/R7/4K3/8/8/8/8/8 w - - 0 1")
            .expect("FEN should parse");
        assert!(!impossible_to_win(&game, Color::White));
        assert!(!need_loser_promotion(&game, Color::White));
    }
}
