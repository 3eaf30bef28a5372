use std::fmt;

use crate::{Error, Result};

/// Disposition of a block input slot: a default shadow present, no shadow
/// at all, or a shadow obscured by a plugged-in unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadowStatus {
    HasShadow,
    NoShadow,
    Obscured,
}

impl ShadowStatus {
    /// Wire code, 1..=3.
    pub const fn code(self) -> u8 {
        match self {
            ShadowStatus::HasShadow => 1,
            ShadowStatus::NoShadow => 2,
            ShadowStatus::Obscured => 3,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShadowStatus::HasShadow => "has shadow",
            ShadowStatus::NoShadow => "no shadow",
            ShadowStatus::Obscured => "obscured",
        }
    }

    /// Canonical status for `code`; anything outside 1..=3 fails.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(ShadowStatus::HasShadow),
            2 => Ok(ShadowStatus::NoShadow),
            3 => Ok(ShadowStatus::Obscured),
            _ => Err(Error::UnknownShadowCode { code }),
        }
    }
}

impl fmt::Display for ShadowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
