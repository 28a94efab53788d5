//! Snapshot encoding for board queries
//!
//! One line per column, in column order. Each line holds `height` characters,
//! one base-`PALETTE_SIZE` digit per cell (row 0 first), terminated by `\n`.
//!
//! Encoding never takes a lock: a snapshot taken while paints are being
//! applied may mix cells from before and after those paints.

use crate::board::Board;
use crate::palette::ColorIndex;

/// Render the whole board as text
pub fn encode(board: &Board) -> String {
    let mut out = String::with_capacity(board.width() * (board.height() + 1));

    for x in 0..board.width() {
        out.extend(board.column(x).map(ColorIndex::to_digit));
        out.push('\n');
    }

    out
}
