//! Composite resource keys.

use core::fmt;

/// Identifies one GPIO line (chip, pin) or one SPI device (bus, channel).
///
/// Ordering is by primary id, then secondary id, which is the same order the
/// packed legacy `u16` sorts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceKey {
    primary: u8,
    secondary: u8,
}

impl ResourceKey {
    pub const fn new(primary: u8, secondary: u8) -> Self {
        Self { primary, secondary }
    }

    /// Chip or bus id.
    pub const fn primary(self) -> u8 {
        self.primary
    }

    /// Pin or channel id.
    pub const fn secondary(self) -> u8 {
        self.secondary
    }

    /// Legacy `primary << 8 | secondary` form, for diagnostics.
    pub const fn packed(self) -> u16 {
        (self.primary as u16) << 8 | self.secondary as u16
    }
}

impl From<(u8, u8)> for ResourceKey {
    fn from((primary, secondary): (u8, u8)) -> Self {
        Self::new(primary, secondary)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.primary, self.secondary)
    }
}
