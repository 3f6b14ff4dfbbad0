//! Piece-wise pseudo-legal move generation.
//!
//! Moves are emitted in a fixed order (pawns, knights, bishops, rooks,
//! queens, king; ascending origin squares) so the search is deterministic.
//! Self-check filtering happens in the legal generator.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::move_generation::legal_move_apply::build_move;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::leaper_attacks::{king_attacks, knight_attacks};
use crate::moves::move_descriptions::{
    FLAG_CAPTURE, FLAG_CASTLING, FLAG_DOUBLE_PAWN_PUSH, FLAG_EN_PASSANT,
};
use crate::moves::slider_attacks::{bishop_attacks, queen_attacks, rook_attacks};

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
];

pub fn generate_pseudo_legal(game_state: &GameState, out: &mut Vec<u64>) {
    generate_pawn_moves(game_state, out);
    generate_piece_moves(game_state, PieceKind::Knight, out);
    generate_piece_moves(game_state, PieceKind::Bishop, out);
    generate_piece_moves(game_state, PieceKind::Rook, out);
    generate_piece_moves(game_state, PieceKind::Queen, out);
    generate_king_moves(game_state, out);
}

fn generate_pawn_moves(game_state: &GameState, out: &mut Vec<u64>) {
    let side = game_state.side_to_move;
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let empty = !game_state.occupancy_all;
    let promotion_rank = if side == Color::White { 7 } else { 0 };
    let start_rank = if side == Color::White { 1 } else { 6 };

    let mut pawns = game_state.pieces[side.index()][PieceKind::Pawn.index()];
    while pawns != 0 {
        let from = pawns.trailing_zeros() as Square;
        pawns &= pawns - 1;

        let file = from % 8;
        let rank = from / 8;

        let one_step = if side == Color::White {
            from.checked_add(8)
        } else {
            from.checked_sub(8)
        };

        if let Some(to) = one_step {
            if (1u64 << to) & empty != 0 {
                if to / 8 == promotion_rank {
                    for promo in PROMOTION_KINDS {
                        out.push(build_move(from, to, PieceKind::Pawn, None, Some(promo), 0));
                    }
                } else {
                    out.push(build_move(from, to, PieceKind::Pawn, None, None, 0));

                    if rank == start_rank {
                        let two_step = if side == Color::White { from + 16 } else { from - 16 };
                        if (1u64 << two_step) & empty != 0 {
                            out.push(build_move(
                                from,
                                two_step,
                                PieceKind::Pawn,
                                None,
                                None,
                                FLAG_DOUBLE_PAWN_PUSH,
                            ));
                        }
                    }
                }
            }
        }

        // Captures and en passant.
        for file_delta in [-1i8, 1i8] {
            let new_file = file as i8 + file_delta;
            if !(0..=7).contains(&new_file) {
                continue;
            }

            let to = if side == Color::White {
                from as i16 + 8 + file_delta as i16
            } else {
                from as i16 - 8 + file_delta as i16
            };
            if !(0..64).contains(&to) {
                continue;
            }
            let to = to as Square;
            let to_mask = 1u64 << to;

            if to_mask & enemy_occ != 0 {
                let captured = enemy_piece_on(game_state, to);
                if to / 8 == promotion_rank {
                    for promo in PROMOTION_KINDS {
                        out.push(build_move(
                            from,
                            to,
                            PieceKind::Pawn,
                            captured,
                            Some(promo),
                            FLAG_CAPTURE,
                        ));
                    }
                } else {
                    out.push(build_move(
                        from,
                        to,
                        PieceKind::Pawn,
                        captured,
                        None,
                        FLAG_CAPTURE,
                    ));
                }
            } else if game_state.en_passant_square == Some(to) {
                out.push(build_move(
                    from,
                    to,
                    PieceKind::Pawn,
                    Some(PieceKind::Pawn),
                    None,
                    FLAG_CAPTURE | FLAG_EN_PASSANT,
                ));
            }
        }
    }
}

fn generate_piece_moves(game_state: &GameState, kind: PieceKind, out: &mut Vec<u64>) {
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];

    let mut pieces = game_state.pieces[side.index()][kind.index()];
    while pieces != 0 {
        let from = pieces.trailing_zeros() as Square;
        pieces &= pieces - 1;

        let mut attacks = match kind {
            PieceKind::Knight => knight_attacks(from),
            PieceKind::Bishop => bishop_attacks(from, game_state.occupancy_all),
            PieceKind::Rook => rook_attacks(from, game_state.occupancy_all),
            PieceKind::Queen => queen_attacks(from, game_state.occupancy_all),
            _ => 0,
        } & !own_occ;

        while attacks != 0 {
            let to = attacks.trailing_zeros() as Square;
            attacks &= attacks - 1;

            let is_capture = (1u64 << to) & enemy_occ != 0;
            let captured = if is_capture {
                enemy_piece_on(game_state, to)
            } else {
                None
            };
            out.push(build_move(
                from,
                to,
                kind,
                captured,
                None,
                if is_capture { FLAG_CAPTURE } else { 0 },
            ));
        }
    }
}

fn generate_king_moves(game_state: &GameState, out: &mut Vec<u64>) {
    let side = game_state.side_to_move;
    let own_occ = game_state.occupancy_by_color[side.index()];
    let enemy_occ = game_state.occupancy_by_color[side.opposite().index()];
    let king_bb = game_state.pieces[side.index()][PieceKind::King.index()];
    if king_bb == 0 {
        return;
    }

    let from = king_bb.trailing_zeros() as Square;
    let mut attacks = king_attacks(from) & !own_occ;
    while attacks != 0 {
        let to = attacks.trailing_zeros() as Square;
        attacks &= attacks - 1;

        let is_capture = (1u64 << to) & enemy_occ != 0;
        let captured = if is_capture {
            enemy_piece_on(game_state, to)
        } else {
            None
        };
        out.push(build_move(
            from,
            to,
            PieceKind::King,
            captured,
            None,
            if is_capture { FLAG_CAPTURE } else { 0 },
        ));
    }

    generate_castling_moves(game_state, out, from);
}

fn generate_castling_moves(game_state: &GameState, out: &mut Vec<u64>, king_from: Square) {
    let side = game_state.side_to_move;
    let enemy = side.opposite();

    // Cannot castle out of check.
    if is_square_attacked(game_state, king_from, enemy) {
        return;
    }

    let candidates: [(Square, Square, CastlingRights, u64, [Square; 2]); 2] = match side {
        Color::White => [
            (4, 6, CASTLE_WHITE_KINGSIDE, (1u64 << 5) | (1u64 << 6), [5, 6]),
            (
                4,
                2,
                CASTLE_WHITE_QUEENSIDE,
                (1u64 << 1) | (1u64 << 2) | (1u64 << 3),
                [3, 2],
            ),
        ],
        Color::Black => [
            (
                60,
                62,
                CASTLE_BLACK_KINGSIDE,
                (1u64 << 61) | (1u64 << 62),
                [61, 62],
            ),
            (
                60,
                58,
                CASTLE_BLACK_QUEENSIDE,
                (1u64 << 57) | (1u64 << 58) | (1u64 << 59),
                [59, 58],
            ),
        ],
    };

    for (from, to, right, empty, transit) in candidates {
        if king_from != from || (game_state.castling_rights & right) == 0 {
            continue;
        }
        if (game_state.occupancy_all & empty) != 0 {
            continue;
        }
        if transit
            .iter()
            .any(|&sq| is_square_attacked(game_state, sq, enemy))
        {
            continue;
        }
        out.push(build_move(from, to, PieceKind::King, None, None, FLAG_CASTLING));
    }
}

#[inline]
fn enemy_piece_on(game_state: &GameState, square: Square) -> Option<PieceKind> {
    let enemy = game_state.side_to_move.opposite().index();
    let mask = 1u64 << square;
    ALL_PIECE_KINDS
        .into_iter()
        .find(|piece| (game_state.pieces[enemy][piece.index()] & mask) != 0)
}
