//! Board geometry shared by the semi-static prover and the search shaper.
//!
//! Predecessor squares answer "from where could this piece have moved into
//! this square in one move"; sliders are modelled with single-square steps,
//! which is exact for reachability since a slider only passes through
//! squares it could also stop on.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::king_attacks;

/// Squares of the dark diagonal color class (a1 is dark).
pub const DARK_SQUARES: u64 = 0xAA55_AA55_AA55_AA55;

#[inline]
pub fn square_file(square: Square) -> u8 {
    square % 8
}

#[inline]
pub fn square_rank(square: Square) -> u8 {
    square / 8
}

#[inline]
pub fn file_distance(x: Square, y: Square) -> u8 {
    square_file(x).abs_diff(square_file(y))
}

#[inline]
pub fn rank_distance(x: Square, y: Square) -> u8 {
    square_rank(x).abs_diff(square_rank(y))
}

/// Chebyshev distance: the number of king moves between two squares.
#[inline]
pub fn square_distance(x: Square, y: Square) -> u8 {
    file_distance(x, y).max(rank_distance(x, y))
}

#[inline]
pub fn flip_file(square: Square) -> Square {
    square ^ 7
}

#[inline]
pub fn flip_rank(square: Square) -> Square {
    square ^ 56
}

#[inline]
pub fn is_corner(square: Square) -> bool {
    square == 0 || square == 7 || square == 56 || square == 63
}

/// King-adjacent squares of `square`.
#[inline]
pub fn neighbours(square: Square) -> u64 {
    king_attacks(square)
}

#[inline]
pub fn find_king(pos: &GameState, color: Color) -> Option<Square> {
    let kings = pos.pieces_of(color, PieceKind::King);
    if kings == 0 {
        None
    } else {
        Some(kings.trailing_zeros() as Square)
    }
}

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const DIAGONAL_DELTAS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ORTHOGONAL_DELTAS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const ALL_DELTAS: [(i8, i8); 8] = [
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Squares from which `piece` of `color` could move into `square` in one
/// move (up to 8).
///
/// For pawns the direction depends on the color, index 0 is always the
/// push predecessor, and later entries are the capture predecessors; the
/// caller distinguishes them by index. Double pushes are not modelled: a
/// double push requires an empty transit square a single push could also
/// use.
pub fn predecessors(piece: PieceKind, color: Color, square: Square) -> Vec<Square> {
    let mut out = Vec::with_capacity(8);

    match piece {
        PieceKind::Pawn => {
            let behind = if color == Color::White { -1 } else { 1 };
            for delta in [(0i8, behind), (-1, behind), (1, behind)] {
                if let Some(prev) = offset(square, delta) {
                    out.push(prev);
                }
            }
        }
        PieceKind::Knight => collect_deltas(square, &KNIGHT_DELTAS, &mut out),
        PieceKind::Bishop => collect_deltas(square, &DIAGONAL_DELTAS, &mut out),
        PieceKind::Rook => collect_deltas(square, &ORTHOGONAL_DELTAS, &mut out),
        PieceKind::Queen | PieceKind::King => collect_deltas(square, &ALL_DELTAS, &mut out),
    }

    out
}

fn collect_deltas(square: Square, deltas: &[(i8, i8)], out: &mut Vec<Square>) {
    for &delta in deltas {
        if let Some(prev) = offset(square, delta) {
            out.push(prev);
        }
    }
}

#[inline]
fn offset(square: Square, (file_delta, rank_delta): (i8, i8)) -> Option<Square> {
    let file = square_file(square) as i8 + file_delta;
    let rank = square_rank(square) as i8 + rank_delta;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::game_state::GameState;

    #[test]
    fn dark_squares_contains_a1_but_not_h1() {
        assert_ne!(DARK_SQUARES & 1, 0);
        assert_eq!(DARK_SQUARES & (1u64 << 7), 0);
        assert_eq!(DARK_SQUARES.count_ones(), 32);
    }

    #[test]
    fn chebyshev_distance_and_flips() {
        assert_eq!(square_distance(0, 63), 7);
        assert_eq!(square_distance(27, 36), 1);
        assert_eq!(flip_file(63), 56);
        assert_eq!(flip_rank(63), 7);
    }

    #[test]
    fn pawn_predecessors_put_the_push_first() {
        // White pawn into e4 comes from e3 (push), d3 or f3 (captures).
        let preds = predecessors(PieceKind::Pawn, Color::White, 28);
        assert_eq!(preds[0], 20);
        assert_eq!(&preds[1..], &[19, 21]);

        // Black pawn into e5 comes from e6, d6 or f6.
        let preds = predecessors(PieceKind::Pawn, Color::Black, 36);
        assert_eq!(preds[0], 44);
        assert_eq!(&preds[1..], &[43, 45]);

        // A white pawn can never arrive on the first rank.
        assert!(predecessors(PieceKind::Pawn, Color::White, 4).is_empty());
    }

    #[test]
    fn corner_predecessor_counts() {
        assert_eq!(predecessors(PieceKind::Knight, Color::White, 0).len(), 2);
        assert_eq!(predecessors(PieceKind::King, Color::White, 0).len(), 3);
        assert_eq!(predecessors(PieceKind::Rook, Color::White, 0).len(), 2);
        assert_eq!(predecessors(PieceKind::Queen, Color::Black, 27).len(), 8);
    }

    #[test]
    fn neighbours_match_king_reach() {
        assert_eq!(neighbours(0).count_ones(), 3);
        assert_eq!(neighbours(27).count_ones(), 8);
    }

    #[test]
    fn finds_each_king() {
        let game =
            GameState::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        assert_eq!(find_king(&game, Color::White), Some(4));
        assert_eq!(find_king(&game, Color::Black), Some(60));
    }
}
