//! # Lane Mask
//!
//! `LaneMask` is the execution mask: a per-lane predicate saying which lanes
//! may commit effects. Every masked write in the crate (variable assignment,
//! scatter, gather) consults the current `LaneMask` held by
//! [`crate::context`].
//!
//! `LaneBits` is the same information as plain flags, one bit per lane. It is
//! what tests and reports look at, and what the mask collapses to when a
//! combinator asks "is anything left on?".

use crate::backend::{Backend, MaskOps, Native};
use bitflags::bitflags;
use core::fmt::{Debug, Formatter};
use core::ops::{BitAnd, BitOr, Not};
use serde::{Deserialize, Serialize};

type NativeMask = <Native as Backend>::Mask;

/// Number of lanes in every vector value (`W`).
pub const LANES: usize = <Native as Backend>::LANES;

bitflags! {
    /// One bit per lane; bit `i` is lane `i`.
    ///
    /// Only the first `LANES` bits are meaningful. Named constants cover the
    /// first four lanes, which is the native width on every supported target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct LaneBits: u32 {
        const LANE_0 = 1 << 0;
        const LANE_1 = 1 << 1;
        const LANE_2 = 1 << 2;
        const LANE_3 = 1 << 3;
    }
}

impl LaneBits {
    /// All `LANES` lanes set.
    #[inline]
    pub fn full() -> Self {
        Self::from_bits_retain(full_bits())
    }

    /// Lane numbers that are set, lowest first.
    pub fn lanes(self) -> impl Iterator<Item = usize> {
        (0..LANES).filter(move |&i| self.bits() & (1 << i) != 0)
    }
}

#[inline(always)]
fn full_bits() -> u32 {
    if LANES >= 32 {
        u32::MAX
    } else {
        (1u32 << LANES) - 1
    }
}

/// The execution mask.
///
/// Constructed all-on at the start of every thread; narrowed and restored
/// only through [`crate::context::MaskScope`].
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct LaneMask(pub(crate) NativeMask);

impl LaneMask {
    /// Every lane active.
    #[inline(always)]
    pub fn all_on() -> Self {
        Self(NativeMask::splat(true))
    }

    /// No lane active.
    #[inline(always)]
    pub fn all_off() -> Self {
        Self(NativeMask::splat(false))
    }

    /// Build from per-lane flags.
    #[inline(always)]
    pub fn from_bits(bits: LaneBits) -> Self {
        Self(NativeMask::from_bitmask(bits.bits()))
    }

    /// Collapse to per-lane flags.
    #[inline(always)]
    pub fn bits(self) -> LaneBits {
        LaneBits::from_bits_retain(self.0.bitmask() & full_bits())
    }

    /// Is lane `lane` active?
    #[inline(always)]
    pub fn is_active(self, lane: usize) -> bool {
        lane < LANES && self.0.bitmask() & (1 << lane) != 0
    }

    /// Check if any lane is active.
    #[inline(always)]
    pub fn any(self) -> bool {
        self.0.any()
    }

    /// Check if all lanes are active.
    #[inline(always)]
    pub fn all(self) -> bool {
        self.0.all()
    }

    /// Check if no lane is active.
    #[inline(always)]
    pub fn none(self) -> bool {
        !self.0.any()
    }

    /// Number of active lanes.
    #[inline(always)]
    pub fn count(self) -> u32 {
        self.0.bitmask().count_ones()
    }
}

impl Default for LaneMask {
    fn default() -> Self {
        Self::all_on()
    }
}

impl Debug for LaneMask {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "LaneMask({:0width$b})", self.bits().bits(), width = LANES)
    }
}

impl PartialEq for LaneMask {
    fn eq(&self, other: &Self) -> bool {
        self.0.bitmask() == other.0.bitmask()
    }
}

impl Eq for LaneMask {}

// ============================================================================
// Boolean Operations
// ============================================================================

impl BitAnd for LaneMask {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for LaneMask {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Not for LaneMask {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<LaneBits> for LaneMask {
    fn from(bits: LaneBits) -> Self {
        Self::from_bits(bits)
    }
}

impl From<LaneMask> for LaneBits {
    fn from(mask: LaneMask) -> Self {
        mask.bits()
    }
}
