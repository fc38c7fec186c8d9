//! Backend trait and SIMD operations.
//!
//! This module defines the interface the mask and control-flow layers are
//! written against. Implementations live in submodules:
//!
//! - `x86`: SSE2, 4 lanes (x86_64 only).
//! - `portable`: plain arrays, any width from 1 to 32 lanes.
//!
//! The crate picks exactly one of them at compile time as [`Native`]. Width is
//! a compile-time constant of the backend, never a runtime value.

use core::fmt::Debug;
use core::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Sub};

pub mod portable;
#[cfg(target_arch = "x86_64")]
pub mod x86;

/// The backend every vector type in this crate is built on.
#[cfg(target_arch = "x86_64")]
pub type Native = x86::Sse2;

/// The backend every vector type in this crate is built on.
#[cfg(not(target_arch = "x86_64"))]
pub type Native = portable::Portable<4>;

/// A backend provides the SIMD implementation for a specific platform.
pub trait Backend: 'static + Copy + Clone + Send + Sync + Debug {
    /// Number of lanes in the SIMD vector.
    const LANES: usize;

    /// Per-lane predicate.
    type Mask: MaskOps;

    /// The SIMD vector type for f32.
    type F32: SimdOps<Mask = Self::Mask>;

    /// The SIMD vector type for i32 (lane indices and offsets).
    type I32: SimdI32Ops<Mask = Self::Mask>;
}

/// Operations on native mask types.
///
/// A mask lane is either fully set or fully clear. Bit `i` of
/// [`MaskOps::bitmask`] is lane `i`.
pub trait MaskOps:
    Copy
    + Clone
    + Debug
    + Default
    + Send
    + Sync
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Not<Output = Self>
{
    /// Same value in every lane.
    fn splat(val: bool) -> Self;

    /// Build from a lane bitmask. Bits at or above the lane count are ignored.
    fn from_bitmask(bits: u32) -> Self;

    /// Collapse to one bit per lane.
    fn bitmask(self) -> u32;

    /// Check if any lane is true.
    fn any(self) -> bool;

    /// Check if all lanes are true.
    fn all(self) -> bool;
}

/// All SIMD operations for f32 the SPMD layer needs.
pub trait SimdOps:
    Copy
    + Clone
    + Debug
    + Default
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Native mask type for this SIMD width.
    type Mask: MaskOps;

    /// Number of lanes.
    const LANES: usize;

    /// Splat a scalar across all lanes.
    fn splat(val: f32) -> Self;

    /// Load from a slice. Panics if the slice is shorter than `LANES`.
    fn from_slice(slice: &[f32]) -> Self;

    /// Store to a slice. Panics if the slice is shorter than `LANES`.
    fn store(&self, out: &mut [f32]);

    /// Less than comparison.
    fn cmp_lt(self, rhs: Self) -> Self::Mask;
    /// Less than or equal comparison.
    fn cmp_le(self, rhs: Self) -> Self::Mask;
    /// Greater than comparison.
    fn cmp_gt(self, rhs: Self) -> Self::Mask;
    /// Greater than or equal comparison.
    fn cmp_ge(self, rhs: Self) -> Self::Mask;
    /// Equality comparison.
    fn cmp_eq(self, rhs: Self) -> Self::Mask;

    /// Square root.
    fn simd_sqrt(self) -> Self;
    /// Absolute value.
    fn simd_abs(self) -> Self;
    /// Element-wise minimum.
    fn simd_min(self, rhs: Self) -> Self;
    /// Element-wise maximum.
    fn simd_max(self, rhs: Self) -> Self;

    /// `mask ? if_true : if_false`, per lane.
    fn simd_select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;
}

/// SIMD operations for i32 vectors.
pub trait SimdI32Ops:
    Copy + Clone + Debug + Default + Send + Sync + Add<Output = Self> + Sub<Output = Self>
{
    /// Native mask type for this SIMD width.
    type Mask: MaskOps;

    /// Number of lanes.
    const LANES: usize;

    /// Splat a scalar across all lanes.
    fn splat(val: i32) -> Self;

    /// Create sequential values [start, start+1, ...], lane 0 first.
    fn sequential(start: i32) -> Self;

    /// Load from a slice. Panics if the slice is shorter than `LANES`.
    fn from_slice(slice: &[i32]) -> Self;

    /// Store to a slice. Panics if the slice is shorter than `LANES`.
    fn store(&self, out: &mut [i32]);

    /// Signed less than comparison.
    fn cmp_lt(self, rhs: Self) -> Self::Mask;
    /// Equality comparison.
    fn cmp_eq(self, rhs: Self) -> Self::Mask;

    /// Value of lane 0.
    fn first(self) -> i32;

    /// `mask ? if_true : if_false`, per lane.
    fn simd_select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;
}
