//! Minimum knight-move distances between squares.
//!
//! The distance can be computed from just the rank distance and the file
//! distance between the squares, following the tables:
//!
//! ```text
//!      0 2 4 6            1 3 5 7            1 3 5 7
//!     ---------          ---------          ---------
//!  0 | 0 2 2 4        1 | 2 2 4 4        0 | 3 3 3 5
//!  2 |   4 2 4        3 |   2 4 4        2 | 1 3 3 5
//!  4 |     4 4        5 |     4 4        4 | 3 3 3 5
//!  6 |       4        7 |       6        6 | 3 3 5 5
//! ```
//!
//! Exceptionally, the distance between a corner and its diagonal neighbour
//! is 4 and cannot be read off the tables.

use std::sync::OnceLock;

use crate::game_state::chess_types::Square;
use crate::geometry::board_geometry::{file_distance, is_corner, rank_distance};

static TABLE: OnceLock<[u8; 4096]> = OnceLock::new();

/// Closed-form knight distance between two squares.
pub fn knight_distance(x: Square, y: Square) -> u8 {
    let fd = file_distance(x, y);
    let rd = rank_distance(x, y);
    let (a, b) = if fd < rd { (fd, rd) } else { (rd, fd) };

    // Corner exception.
    if a == 1 && b == 1 && (is_corner(x) || is_corner(y)) {
        return 4;
    }

    // First and second tables.
    if a % 2 == b % 2 {
        return match (a, b) {
            (0, 0) => 0,
            (0, 2) | (0, 4) | (2, 4) => 2,
            (1, 1) | (1, 3) | (3, 3) => 2,
            (7, 7) => 6,
            _ => 4,
        };
    }

    // Third table.
    match (a, b) {
        (_, 7) => 5,
        (1, 2) => 1,
        (5, 6) => 5,
        _ => 3,
    }
}

#[inline]
fn index(x: Square, y: Square) -> usize {
    (x as usize) | ((y as usize) << 6)
}

/// Table lookup; the table is built on first use.
#[inline]
pub fn get(x: Square, y: Square) -> u8 {
    let table = TABLE.get_or_init(|| {
        let mut table = [0u8; 4096];
        for x in 0u8..64 {
            for y in 0u8..64 {
                table[index(x, y)] = knight_distance(x, y);
            }
        }
        table
    });
    table[index(x, y)]
}
