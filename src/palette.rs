//! Colors used to tell parts apart.

use std::fmt;

/// A 24-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const YELLOW: Color = Color(0xffff00);
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xffffff)
    }
}

/// Part colors, in part ID order.
pub const PALETTE: [Color; 10] = [
    Color(0x1f77b4),
    Color(0xe377c2),
    Color(0xff7f0e),
    Color(0x2ca02c),
    Color(0xd62728),
    Color(0x9467bd),
    Color(0x8c564b),
    Color(0x7f7f7f),
    Color(0xbcbd22),
    Color(0x17becf),
];

/// Color of the markers put on cluster centers and component means.
pub const CENTER_MARKER: Color = Color::YELLOW;

/// Returns the color of the given part.
///
/// IDs past the palette size wrap around, so parts `i` and `i + 10` share a
/// color.
pub fn color(part: usize) -> Color {
    PALETTE[part % PALETTE.len()]
}

/// Warns when some parts will share a color.
pub(crate) fn check_part_count(part_count: usize) {
    if PALETTE.len() < part_count {
        tracing::warn!(
            part_count,
            palette_size = PALETTE.len(),
            "more parts than colors, some parts will share a color"
        );
    }
}
