//! Occupancy-aware attack generation for the sliding pieces.
//!
//! Rays are traced on demand; the first occupied square on a ray is
//! included and stops the trace.

const BISHOP_STEPS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ROOK_STEPS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[inline]
pub fn bishop_attacks(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, &BISHOP_STEPS, occupancy)
}

#[inline]
pub fn rook_attacks(square: u8, occupancy: u64) -> u64 {
    trace_rays(square, &ROOK_STEPS, occupancy)
}

#[inline]
pub fn queen_attacks(square: u8, occupancy: u64) -> u64 {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

fn trace_rays(square: u8, steps: &[(i32, i32); 4], occupancy: u64) -> u64 {
    let mut attacks = 0u64;

    for &(file_step, rank_step) in steps {
        let mut file = (square as i32 % 8) + file_step;
        let mut rank = (square as i32 / 8) + rank_step;

        while (0..8).contains(&file) && (0..8).contains(&rank) {
            let bit = 1u64 << (rank * 8 + file) as usize;
            attacks |= bit;

            if (occupancy & bit) != 0 {
                break;
            }

            file += file_step;
            rank += rank_step;
        }
    }

    attacks
}
