//! Board state consumed by the unwinnability pipeline.
//!
//! `GameState` stores piece bitboards, occupancy caches, turn/state flags,
//! clocks, the Zobrist key, and the repetition history of the line that led
//! here. Moves are applied by value (`apply_move` returns the child state),
//! so "undo" is simply dropping the child.

use crate::game_state::chess_types::*;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug, Clone)]
pub struct GameState {
    // [color][piece_kind]
    pub pieces: [[u64; 6]; 2],

    // Occupancy caches.
    pub occupancy_by_color: [u64; 2],
    pub occupancy_all: u64,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    pub zobrist_key: u64,

    // Plies since the analysis root; grows along every applied move.
    pub ply: u16,

    // Zobrist keys of every position on the line so far, this one included.
    pub repetition_history: Vec<u64>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,

            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,

            halfmove_clock: 0,
            fullmove_number: 1,

            zobrist_key: 0,

            ply: 0,
            repetition_history: Vec::new(),
        }
    }
}

impl GameState {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        parse_fen(fen)
    }

    /// Piece and owner on `square`, if any.
    pub fn piece_on(&self, square: Square) -> Option<(Color, PieceKind)> {
        let mask = 1u64 << square;
        if (self.occupancy_all & mask) == 0 {
            return None;
        }
        for color in [Color::White, Color::Black] {
            if (self.occupancy_by_color[color.index()] & mask) == 0 {
                continue;
            }
            for piece in ALL_PIECE_KINDS {
                if (self.pieces[color.index()][piece.index()] & mask) != 0 {
                    return Some((color, piece));
                }
            }
        }
        None
    }

    /// All pieces of one color.
    #[inline]
    pub fn pieces(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    /// Pieces of one color and kind.
    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    /// Pieces of one kind, both colors.
    #[inline]
    pub fn pieces_kind(&self, kind: PieceKind) -> u64 {
        self.pieces[Color::White.index()][kind.index()]
            | self.pieces[Color::Black.index()][kind.index()]
    }

    #[inline]
    pub fn count(&self, color: Color, kind: PieceKind) -> u32 {
        self.pieces_of(color, kind).count_ones()
    }

    /// Number of pieces (king included) one side has on the board.
    #[inline]
    pub fn piece_total(&self, color: Color) -> u32 {
        self.pieces(color).count_ones()
    }

    #[inline]
    pub fn empty(&self, square: Square) -> bool {
        (self.occupancy_all & (1u64 << square)) == 0
    }

    /// True when the current position has occurred at least three times on
    /// the line recorded in `repetition_history`.
    pub fn is_repetition(&self) -> bool {
        let threshold = crate::game_state::chess_rules::REPETITION_THRESHOLD;
        self.repetition_history
            .iter()
            .filter(|&&key| key == self.zobrist_key)
            .count()
            >= threshold
    }

    /// Rebuild the occupancy caches from the piece bitboards.
    pub fn recalc_occupancy(&mut self) {
        for color in [Color::White, Color::Black] {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .copied()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[Color::White.index()]
            | self.occupancy_by_color[Color::Black.index()];
    }
}
