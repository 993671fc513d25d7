//! Strictly positive line quantities.
//!
//! A cart line with a quantity of zero or less is never valid, so the type
//! cannot represent one. Decrementing past one yields `None`, which callers
//! treat as "remove the line".

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Number of units of a product on a cart or order line (always >= 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Largest quantity a stored line can hold (a signed 32-bit column).
    pub const MAX: Self = match NonZeroU32::new(i32::MAX.unsigned_abs()) {
        Some(n) => Self(n),
        None => Self::ONE,
    };

    /// Create a quantity, returning `None` for zero.
    #[must_use]
    pub const fn new(n: u32) -> Option<Self> {
        match NonZeroU32::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Create a quantity from a signed value as stored in the database,
    /// returning `None` for zero or negative values.
    #[must_use]
    pub fn from_i32(n: i32) -> Option<Self> {
        u32::try_from(n).ok().and_then(Self::new)
    }

    /// The count as a plain integer.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    /// The count as a signed integer for database columns.
    #[must_use]
    pub fn as_i32(&self) -> i32 {
        i32::try_from(self.0.get()).unwrap_or(i32::MAX)
    }

    /// One more unit, saturating at [`Quantity::MAX`].
    #[must_use]
    pub const fn increment(&self) -> Self {
        if self.0.get() >= Self::MAX.0.get() {
            Self::MAX
        } else {
            Self(self.0.saturating_add(1))
        }
    }

    /// One fewer unit, or `None` if that would reach zero.
    #[must_use]
    pub const fn decrement(&self) -> Option<Self> {
        Self::new(self.0.get() - 1)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = &'static str;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n).ok_or("quantity must be at least 1")
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.get()
    }
}
