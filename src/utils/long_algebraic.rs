//! Long algebraic rendering of packed moves.
//!
//! The analyzer prints principal variations as coordinate moves (`e2e4`,
//! `a7a8q`), the form the packed move description encodes directly.

use crate::game_state::chess_types::PieceKind;
use crate::moves::move_descriptions::{move_from, move_promotion_piece, move_to};
use crate::utils::algebraic::square_to_algebraic;

pub fn format_move(move_description: u64) -> Result<String, String> {
    let mut out = String::new();
    out.push_str(&square_to_algebraic(move_from(move_description))?);
    out.push_str(&square_to_algebraic(move_to(move_description))?);

    if let Some(promotion) = move_promotion_piece(move_description) {
        out.push(promotion_to_char(promotion)?);
    }

    Ok(out)
}

/// Render a principal variation as space-separated coordinate moves.
pub fn format_variation(moves: &[u64]) -> Result<String, String> {
    let rendered: Result<Vec<String>, String> = moves.iter().map(|&m| format_move(m)).collect();
    Ok(rendered?.join(" "))
}

fn promotion_to_char(piece_kind: PieceKind) -> Result<char, String> {
    match piece_kind {
        PieceKind::Knight => Ok('n'),
        PieceKind::Bishop => Ok('b'),
        PieceKind::Rook => Ok('r'),
        PieceKind::Queen => Ok('q'),
        _ => Err(format!("Invalid promotion piece: {piece_kind:?}")),
    }
}
