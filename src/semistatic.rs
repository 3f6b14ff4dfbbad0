//! Semi-static reachability analysis.
//!
//! Determines which pieces can move in a given position and the squares
//! they can potentially reach, based solely on the current placement. The
//! analysis may conclude that a piece can NEVER reach a square no matter
//! how play continues, which is what makes it useful for identifying
//! blocked positions.
//!
//! The system is a set of Boolean variables `Move(p, c, s, t)` ("the piece
//! of kind `p` and color `c` now on `s` can potentially land on `t`"),
//! related by move-predecessor implications: to arrive on `t` the piece
//! must first be able to arrive on one of the squares from which `t` is
//! reachable in one move. Auxiliary variables refine the model:
//!
//! * `Clear(c, s)`: square `s` can be emptied of `c`-colored occupants.
//! * `Reach(c, s)`: some non-king `c`-colored piece can reach `s`.
//! * `Capture(c, s)`: a `c`-colored piece can land on `s` capturing.
//!
//! Saturating the system to a fixed point keeps it SOUND for negative
//! statements: a Movement variable left false denotes a truly impossible
//! trip. True variables are over-approximate and carry no guarantee.

use crate::game_state::{chess_types::*, game_state::GameState};
use crate::geometry::board_geometry::{
    find_king, neighbours, predecessors, square_distance, square_file, square_rank, DARK_SQUARES,
};
use crate::geometry::pawn_structure::has_lonely_pawns;
use crate::move_generation::legal_move_checks::{attackers_to_square, checkers};
use crate::move_generation::legal_move_generator::legal_moves;
use crate::move_generation::move_generator::MoveGenResult;
use crate::moves::move_descriptions::is_en_passant;

pub const N_MOVE_VARS: usize = 49_152; // piece kind * color * from * to
pub const N_PROM_VARS: usize = 128; // color * square, reserved
pub const N_CLEAR_VARS: usize = 128;
pub const N_REACH_VARS: usize = 128;
pub const N_CAPTURE_VARS: usize = 128;

// Equation rows exist for Movement and (reserved) Promotion variables.
pub const N_EQS: usize = N_MOVE_VARS + N_PROM_VARS;
pub const N_VARS: usize = N_MOVE_VARS + N_PROM_VARS + N_CLEAR_VARS + N_REACH_VARS + N_CAPTURE_VARS;

/// Disjuncts per equation; unused slots hold the terminator −1.
const EQUATION_WIDTH: usize = 8;

#[inline]
fn move_index(p: PieceKind, c: Color, source: Square, target: Square) -> usize {
    p.index() * (1 << 13) + c.index() * (1 << 12) + (source as usize) * 64 + target as usize
}

#[inline]
fn color_square_index(c: Color, s: Square) -> usize {
    c.index() * 64 + s as usize
}

#[inline]
fn clear_index(c: Color, s: Square) -> usize {
    N_MOVE_VARS + N_PROM_VARS + color_square_index(c, s)
}

#[inline]
fn reach_index(c: Color, s: Square) -> usize {
    N_MOVE_VARS + N_PROM_VARS + N_CLEAR_VARS + color_square_index(c, s)
}

#[inline]
fn capture_index(c: Color, s: Square) -> usize {
    N_MOVE_VARS + N_PROM_VARS + N_CLEAR_VARS + N_REACH_VARS + color_square_index(c, s)
}

/// The Boolean constraint system. The equations table is built once and
/// read-only afterwards; the variables vector is zeroed and repopulated on
/// every call to [`System::saturate`].
pub struct System {
    equations: Vec<[i32; EQUATION_WIDTH]>,
    variables: Vec<bool>,
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    pub fn new() -> Self {
        let mut equations = vec![[-1i32; EQUATION_WIDTH]; N_EQS];

        for p in ALL_PIECE_KINDS {
            for c in [Color::White, Color::Black] {
                for target in 0u8..64 {
                    let preds = predecessors(p, c, target);
                    for source in 0u8..64 {
                        let row = &mut equations[move_index(p, c, source, target)];
                        for (j, &prev) in preds.iter().enumerate() {
                            row[j] = move_index(p, c, source, prev) as i32;
                        }
                    }
                }
            }
        }

        Self {
            equations,
            variables: vec![false; N_VARS],
        }
    }

    /// Saturate the system for `pos`: seed the occupancy facts and iterate
    /// the implications to a fixed point. Variables only ever flip from
    /// false to true, so termination is guaranteed.
    pub fn saturate(&mut self, pos: &GameState) {
        self.variables.fill(false);

        let mut occupied: Vec<(Square, Color, PieceKind)> = Vec::with_capacity(32);

        for s in 0u8..64 {
            match pos.piece_on(s) {
                None => {
                    self.variables[clear_index(Color::White, s)] = true;
                    self.variables[clear_index(Color::Black, s)] = true;
                }
                Some((c, p)) => {
                    self.variables[clear_index(c.opposite(), s)] = true;
                    self.variables[move_index(p, c, s, s)] = true;
                    occupied.push((s, c, p));
                }
            }
        }

        let mut change = true;
        while change {
            change = false;

            for &(source, c, p) in &occupied {
                change |= self.update_clear(pos, source, c, p);
                change |= self.update_reach_and_capture(source, c, p);
                change |= self.update_movement(pos, source, c, p);

                if p == PieceKind::Pawn {
                    change |= self.collapse_promotion(source, c);
                }
            }
        }
    }

    // A piece can be cleared from its square if it can move somewhere else
    // or an opposing piece can capture it where it stands.
    fn update_clear(&mut self, pos: &GameState, source: Square, c: Color, p: PieceKind) -> bool {
        if self.variables[clear_index(c, source)] {
            return false;
        }

        for aux in 0u8..64 {
            if aux == source {
                continue;
            }

            let movable_away = self.variables[move_index(p, c, source, aux)];
            let capturable = match pos.piece_on(aux) {
                Some((aux_c, aux_p)) if aux_c == c.opposite() => {
                    self.variables[move_index(aux_p, aux_c, aux, source)]
                }
                _ => false,
            };

            if movable_away || capturable {
                self.variables[clear_index(c, source)] = true;
                return true;
            }
        }

        false
    }

    fn update_reach_and_capture(&mut self, source: Square, c: Color, p: PieceKind) -> bool {
        let mut change = false;

        for target in 0u8..64 {
            if !self.variables[move_index(p, c, source, target)] {
                continue;
            }

            if p != PieceKind::King && !self.variables[reach_index(c, target)] {
                self.variables[reach_index(c, target)] = true;
                change = true;
            }

            // Pawn captures are credited in the movement update instead.
            if p != PieceKind::Pawn && !self.variables[capture_index(c, target)] {
                self.variables[capture_index(c, target)] = true;
                change = true;
            }
        }

        change
    }

    fn update_movement(&mut self, pos: &GameState, source: Square, c: Color, p: PieceKind) -> bool {
        let mut change = false;

        for target in 0u8..64 {
            // Cannot land on a square that can never be vacated.
            if !self.variables[clear_index(c, target)] {
                continue;
            }

            // A king may not step onto a square whose attackers can never
            // be cleared away.
            if p == PieceKind::King && self.king_target_unsafe(pos, c, target) {
                continue;
            }

            let i = move_index(p, c, source, target);
            if self.variables[i] {
                continue;
            }

            for j in 0..EQUATION_WIDTH {
                let var = self.equations[i][j];
                if var < 0 {
                    break;
                }
                if !self.variables[var as usize] {
                    continue;
                }

                if p == PieceKind::Pawn {
                    if j == 0 {
                        // Push: the target must also be clearable of enemy
                        // occupants, and a direct pawn confrontation that
                        // neither side can ever resolve denies it.
                        if !self.variables[clear_index(c.opposite(), target)] {
                            continue;
                        }
                        if self.confronting_pawns(pos, c, source, target) {
                            continue;
                        }
                    } else {
                        // Capture: something must be there to take.
                        if !self.variables[reach_index(c.opposite(), target)] {
                            continue;
                        }
                        if !self.variables[capture_index(c, target)] {
                            self.variables[capture_index(c, target)] = true;
                            change = true;
                        }
                    }
                }

                self.variables[i] = true;
                change = true;
                break;
            }
        }

        change
    }

    fn king_target_unsafe(&self, pos: &GameState, c: Color, target: Square) -> bool {
        attackers_to_square(pos, target, c.opposite())
            .iter()
            .any(|&(attacker_sq, _)| !self.variables[clear_index(c.opposite(), attacker_sq)])
    }

    // An enemy pawn sits right in front on the same file, neither pawn can
    // ever leave the file, and no capture of ours can open the span between
    // them: the push stays impossible forever.
    fn confronting_pawns(&self, pos: &GameState, c: Color, source: Square, target: Square) -> bool {
        match pos.piece_on(target) {
            Some((tc, PieceKind::Pawn)) if tc != c => {}
            _ => return false,
        }
        if square_file(source) != square_file(target) {
            return false;
        }

        for aux in 0u8..64 {
            if square_file(aux) != square_file(source) {
                if self.variables[move_index(PieceKind::Pawn, c, source, aux)]
                    || self.variables[move_index(PieceKind::Pawn, c.opposite(), target, aux)]
                {
                    return false;
                }
            } else {
                let (sr, ar, tr) = (square_rank(source), square_rank(aux), square_rank(target));
                let in_span = (sr < ar && ar <= tr) || (sr > ar && ar >= tr);
                if in_span && self.variables[capture_index(c, aux)] {
                    return false;
                }
            }
        }

        true
    }

    // If the pawn can reach its promotion rank it may go anywhere, at this
    // level of abstraction.
    fn collapse_promotion(&mut self, source: Square, c: Color) -> bool {
        let prom_base: Square = if c == Color::White { 56 } else { 0 };
        let promotes = (0u8..8)
            .any(|f| self.variables[move_index(PieceKind::Pawn, c, source, prom_base + f)]);
        if !promotes {
            return false;
        }

        let mut change = false;
        for target in 0u8..64 {
            let i = move_index(PieceKind::Pawn, c, source, target);
            if !self.variables[i] {
                self.variables[i] = true;
                change = true;
            }
        }
        change
    }

    /// Squares the `c` king can potentially visit.
    pub fn king_region(&self, pos: &GameState, c: Color) -> u64 {
        let Some(king_sq) = find_king(pos, c) else {
            return 0;
        };

        let mut region = 0u64;
        for t in 0u8..64 {
            if self.variables[move_index(PieceKind::King, c, king_sq, t)] {
                region |= 1u64 << t;
            }
        }
        region
    }

    /// Squares holding a `c`-colored piece that can visit `region`.
    ///
    /// Pawns that cannot promote are not counted: their reach is frozen and
    /// they cannot take part in building a mate elsewhere. (The a1 Movement
    /// bit doubles as the promotion-collapse sentinel.)
    pub fn visitors(&self, pos: &GameState, region: u64, c: Color) -> u64 {
        let mut out = 0u64;

        for s in 0u8..64 {
            let Some((color, p)) = pos.piece_on(s) else {
                continue;
            };
            if color != c {
                continue;
            }
            if p == PieceKind::Pawn && !self.variables[move_index(p, c, s, 0)] {
                continue;
            }

            let mut targets = region;
            while targets != 0 {
                let t = targets.trailing_zeros() as Square;
                targets &= targets - 1;
                if self.variables[move_index(p, c, s, t)] {
                    out |= 1u64 << s;
                    break;
                }
            }
        }

        out
    }

    // The unwinnability verdict on a saturated system. Sound for `true`.
    fn region_unwinnable(&self, pos: &GameState, winner: Color) -> bool {
        if has_lonely_pawns(pos) {
            return false;
        }

        let loser = winner.opposite();
        let loser_king_region = self.king_region(pos, loser);
        let winner_king = pos.pieces_of(winner, PieceKind::King);
        let visitors = self.visitors(pos, loser_king_region, winner) & !winner_king;

        // No winner piece ever enters the loser king's world: no mate.
        if visitors == 0 {
            return true;
        }

        // Visitors on both square colors can cover any escape square.
        if (visitors & DARK_SQUARES) != 0 && (visitors & !DARK_SQUARES) != 0 {
            return false;
        }

        // Any non-bishop visitor changes square color at will.
        let mut scan = visitors;
        while scan != 0 {
            let s = scan.trailing_zeros() as Square;
            scan &= scan - 1;
            match pos.piece_on(s) {
                Some((_, PieceKind::Bishop)) => {}
                _ => return false,
            }
        }

        let visitors_square_color = if (visitors & DARK_SQUARES) != 0 {
            DARK_SQUARES
        } else {
            !DARK_SQUARES
        };

        // All visitors are same-colored bishops. Try every candidate mating
        // square inside the loser king's region.
        for s in 0u8..64 {
            let s_mask = 1u64 << s;
            let mating_bishops = self.visitors(pos, s_mask, winner) & !winner_king;
            if mating_bishops == 0 || (loser_king_region & s_mask) == 0 {
                continue;
            }

            let mut escaping_squares = 0u64;
            let mut checking_squares = 0u64;
            for t in 0u8..64 {
                if square_distance(s, t) == 1 && (loser_king_region & (1u64 << t)) != 0 {
                    if (visitors_square_color & (1u64 << t)) == 0 {
                        escaping_squares |= 1u64 << t;
                    } else {
                        checking_squares |= 1u64 << t;
                    }
                }
            }

            let active_winners_king =
                (winner_king & self.visitors(pos, neighbours(s), winner)) != 0;

            // Two checking squares flanking `s` on one line means two mating
            // diagonals point at it; a single bishop cannot cover both.
            let two_diagonals =
                checking_squares & ((checking_squares >> 2) | (checking_squares >> 16)) != 0;

            if two_diagonals && mating_bishops.count_ones() < 2 && !active_winners_king {
                continue;
            }

            // Every escape square needs a loser piece able to stand on it.
            let all_kings = pos.pieces_kind(PieceKind::King);
            let mut unblockable = false;
            let mut escapes = escaping_squares;
            while escapes != 0 {
                let e = escapes.trailing_zeros() as Square;
                escapes &= escapes - 1;
                if (self.visitors(pos, 1u64 << e, loser) & !all_kings) == 0 {
                    unblockable = true;
                    break;
                }
            }
            if unblockable && !active_winners_king {
                continue;
            }

            let blockers = self.visitors(pos, escaping_squares, loser) & !all_kings;
            let blockers_cnt = blockers.count_ones() + u32::from(active_winners_king);

            if escaping_squares.count_ones() <= blockers_cnt {
                return false;
            }
        }

        // Every candidate square admits an escape of the opposite color the
        // bishops can never control.
        true
    }

    /// Check whether `pos` is semi-statically unwinnable for `winner`.
    pub fn is_unwinnable(&mut self, pos: &GameState, winner: Color) -> MoveGenResult<bool> {
        let moves = legal_moves(pos)?;

        // Checkmate or stalemate is answered directly.
        if moves.is_empty() {
            return Ok(checkers(pos).is_empty() || pos.side_to_move == winner);
        }

        // En passant resolves pawn tension the constraint model ignores.
        if moves.iter().any(|m| is_en_passant(m.move_description)) {
            return Ok(false);
        }

        self.saturate(pos);
        Ok(self.region_unwinnable(pos, winner))
    }

    /// Check whether every legal move leads to a position that is
    /// semi-statically unwinnable for `winner`.
    pub fn is_unwinnable_after_one_move(
        &mut self,
        pos: &GameState,
        winner: Color,
    ) -> MoveGenResult<bool> {
        let moves = legal_moves(pos)?;

        if moves.is_empty() {
            return Ok(checkers(pos).is_empty() || pos.side_to_move == winner);
        }

        for m in &moves {
            if !self.is_unwinnable(&m.game_after_move, winner)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
