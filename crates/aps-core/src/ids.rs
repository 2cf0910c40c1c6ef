//! Strongly typed, zero-cost identifier wrappers and the composite
//! [`ResourceKey`].
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into dense `Vec`s via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — equivalent to the type's MAX.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identity of a schedulable resource (machine, line, cell).
    pub struct ResourceId(u32);
}

typed_id! {
    /// Identity of one unit of work released to a resource.
    pub struct ActivityId(u32);
}

typed_id! {
    /// Identity of the operation an activity executes.  Operations carry the
    /// sequencing-relevant setup state; many activities may share one.
    pub struct OperationId(u32);
}

typed_id! {
    /// Identity of a batch.  Batched activities share a clean span and a
    /// primary timeline block.
    pub struct BatchId(u32);
}

typed_id! {
    /// A categorical setup-compatibility tag.  Using `u16` keeps attribute
    /// sets compact (max 65,535 distinct tags per plant model).
    pub struct AttributeId(u16);
}

// ── ResourceKey ───────────────────────────────────────────────────────────────

/// Composite resource identity with a total order.
///
/// Resources sort rank-major, then by ID, which is the order every ordered
/// resource directory maintains.  Equality is key equality — two resources
/// with the same key are the same resource as far as any directory is
/// concerned.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceKey {
    /// Ordering field: resources with lower rank sort (and are indexed) first.
    pub rank: u16,
    /// The resource's stable identity within its rank.
    pub id: ResourceId,
}

impl ResourceKey {
    pub fn new(rank: u16, id: ResourceId) -> Self {
        Self { rank, id }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}.{}", self.rank, self.id.0)
    }
}
