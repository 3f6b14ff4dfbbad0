//! Attack and check queries on a position.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::moves::leaper_attacks::{king_attacks, knight_attacks, pawn_attacks};
use crate::moves::slider_attacks::{bishop_attacks, rook_attacks};

#[inline]
pub fn king_square(game_state: &GameState, color: Color) -> Option<Square> {
    let kings = game_state.pieces[color.index()][PieceKind::King.index()];
    if kings == 0 {
        None
    } else {
        Some(kings.trailing_zeros() as Square)
    }
}

#[inline]
pub fn is_king_in_check(game_state: &GameState, color: Color) -> bool {
    let Some(king_sq) = king_square(game_state, color) else {
        return false;
    };
    is_square_attacked(game_state, king_sq, color.opposite())
}

pub fn is_square_attacked(game_state: &GameState, square: Square, attacker_color: Color) -> bool {
    let attacker = attacker_color.index();

    // A pawn of `attacker_color` attacks `square` iff a pawn of the
    // opposite color standing on `square` would attack the pawn's square.
    let pawns = game_state.pieces[attacker][PieceKind::Pawn.index()];
    if pawn_attacks(attacker_color.opposite(), square) & pawns != 0 {
        return true;
    }

    if knight_attacks(square) & game_state.pieces[attacker][PieceKind::Knight.index()] != 0 {
        return true;
    }

    if king_attacks(square) & game_state.pieces[attacker][PieceKind::King.index()] != 0 {
        return true;
    }

    let bishops_queens = game_state.pieces[attacker][PieceKind::Bishop.index()]
        | game_state.pieces[attacker][PieceKind::Queen.index()];
    if bishop_attacks(square, game_state.occupancy_all) & bishops_queens != 0 {
        return true;
    }

    let rooks_queens = game_state.pieces[attacker][PieceKind::Rook.index()]
        | game_state.pieces[attacker][PieceKind::Queen.index()];
    if rook_attacks(square, game_state.occupancy_all) & rooks_queens != 0 {
        return true;
    }

    false
}

/// Squares (and piece kinds) of `attacker_color` pieces attacking `square`.
pub fn attackers_to_square(
    game_state: &GameState,
    square: Square,
    attacker_color: Color,
) -> Vec<(Square, PieceKind)> {
    let attacker = attacker_color.index();
    let mut attackers = Vec::<(Square, PieceKind)>::new();

    let pawns = game_state.pieces[attacker][PieceKind::Pawn.index()]
        & pawn_attacks(attacker_color.opposite(), square);
    collect(pawns, PieceKind::Pawn, &mut attackers);

    let knights = game_state.pieces[attacker][PieceKind::Knight.index()] & knight_attacks(square);
    collect(knights, PieceKind::Knight, &mut attackers);

    let diagonal = bishop_attacks(square, game_state.occupancy_all);
    let straight = rook_attacks(square, game_state.occupancy_all);

    collect(
        game_state.pieces[attacker][PieceKind::Bishop.index()] & diagonal,
        PieceKind::Bishop,
        &mut attackers,
    );
    collect(
        game_state.pieces[attacker][PieceKind::Rook.index()] & straight,
        PieceKind::Rook,
        &mut attackers,
    );
    collect(
        game_state.pieces[attacker][PieceKind::Queen.index()] & (diagonal | straight),
        PieceKind::Queen,
        &mut attackers,
    );

    let kings = game_state.pieces[attacker][PieceKind::King.index()] & king_attacks(square);
    collect(kings, PieceKind::King, &mut attackers);

    attackers
}

/// Pieces giving check to the side to move.
#[inline]
pub fn checkers(game_state: &GameState) -> Vec<(Square, PieceKind)> {
    let Some(king_sq) = king_square(game_state, game_state.side_to_move) else {
        return Vec::new();
    };
    attackers_to_square(game_state, king_sq, game_state.side_to_move.opposite())
}

fn collect(mut bitboard: u64, kind: PieceKind, out: &mut Vec<(Square, PieceKind)>) {
    while bitboard != 0 {
        out.push((bitboard.trailing_zeros() as Square, kind));
        bitboard &= bitboard - 1;
    }
}
