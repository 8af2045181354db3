//! Edge colouring channel mask.

use bitflags::bitflags;

bitflags! {
    /// A three-bit mask over {R, G, B}. The colouring algorithm only ever
    /// produces `CYAN`, `MAGENTA`, `YELLOW` (and transiently `WHITE`); the
    /// single-channel constants exist because error correction reads
    /// individual bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EdgeColor: u8 {
        const BLACK = 0;
        const RED = 1;
        const GREEN = 2;
        const YELLOW = Self::RED.bits() | Self::GREEN.bits();
        const BLUE = 4;
        const MAGENTA = Self::RED.bits() | Self::BLUE.bits();
        const CYAN = Self::GREEN.bits() | Self::BLUE.bits();
        const WHITE = Self::RED.bits() | Self::GREEN.bits() | Self::BLUE.bits();
    }
}

impl Default for EdgeColor {
    fn default() -> Self {
        EdgeColor::WHITE
    }
}
