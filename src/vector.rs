//! Lane vectors: `VFloat`, `VBool`, `VInt`.
//!
//! Arithmetic and comparisons always run on every lane, whatever the current
//! mask says. Masking happens only where a value is committed: [`VFloat::assign`],
//! [`VInt::assign`], and the memory operations in [`crate::memref`].

use crate::backend::{Backend, MaskOps, Native, SimdI32Ops, SimdOps};
use crate::context::current_mask;
use crate::mask::{LaneMask, LANES};
use core::cell::Cell;
use core::fmt::{Debug, Formatter};
use core::ops::{Add, BitAnd, BitOr, Div, Mul, Neg, Not, Sub};

type NativeF32 = <Native as Backend>::F32;
type NativeI32 = <Native as Backend>::I32;
type NativeMask = <Native as Backend>::Mask;

/// Lane count as an `i32`, for index arithmetic.
pub const PROGRAM_COUNT: i32 = LANES as i32;

/// `[0, 1, ..., LANES - 1]`: lane `i` holds `i`.
#[inline(always)]
pub fn program_index() -> VInt {
    VInt(NativeI32::sequential(0))
}

// ============================================================================
// VFloat
// ============================================================================

/// One `f32` per lane.
#[derive(Copy, Clone, Default)]
#[repr(transparent)]
pub struct VFloat(pub(crate) NativeF32);

impl VFloat {
    #[inline(always)]
    pub fn splat(val: f32) -> Self {
        Self(NativeF32::splat(val))
    }

    #[inline(always)]
    pub fn from_array(lanes: [f32; LANES]) -> Self {
        Self(NativeF32::from_slice(&lanes))
    }

    #[inline(always)]
    pub fn to_array(self) -> [f32; LANES] {
        let mut out = [0.0; LANES];
        self.0.store(&mut out);
        out
    }

    /// Value held by lane `lane`. Panics if `lane >= LANES`.
    #[inline]
    pub fn lane(self, lane: usize) -> f32 {
        self.to_array()[lane]
    }

    /// Masked assignment: lanes active in the current mask take `other`,
    /// the rest keep their old value.
    #[inline(always)]
    pub fn assign(&mut self, other: VFloat) {
        self.0 = NativeF32::simd_select(current_mask().0, other.0, self.0);
    }

    #[inline(always)]
    pub fn sqrt(self) -> Self {
        Self(self.0.simd_sqrt())
    }

    #[inline(always)]
    pub fn abs(self) -> Self {
        Self(self.0.simd_abs())
    }

    #[inline(always)]
    pub fn min(self, rhs: impl Into<VFloat>) -> Self {
        Self(self.0.simd_min(rhs.into().0))
    }

    #[inline(always)]
    pub fn max(self, rhs: impl Into<VFloat>) -> Self {
        Self(self.0.simd_max(rhs.into().0))
    }

    #[inline(always)]
    pub fn lt(self, rhs: impl Into<VFloat>) -> VBool {
        VBool(self.0.cmp_lt(rhs.into().0))
    }

    #[inline(always)]
    pub fn le(self, rhs: impl Into<VFloat>) -> VBool {
        VBool(self.0.cmp_le(rhs.into().0))
    }

    #[inline(always)]
    pub fn gt(self, rhs: impl Into<VFloat>) -> VBool {
        VBool(self.0.cmp_gt(rhs.into().0))
    }

    #[inline(always)]
    pub fn ge(self, rhs: impl Into<VFloat>) -> VBool {
        VBool(self.0.cmp_ge(rhs.into().0))
    }

    #[inline(always)]
    pub fn eq_lanes(self, rhs: impl Into<VFloat>) -> VBool {
        VBool(self.0.cmp_eq(rhs.into().0))
    }

    /// `cond ? if_true : if_false` per lane. Ignores the execution mask.
    #[inline(always)]
    pub fn select(cond: VBool, if_true: VFloat, if_false: VFloat) -> Self {
        Self(NativeF32::simd_select(cond.0, if_true.0, if_false.0))
    }
}

/// Free-function spelling of [`VFloat::sqrt`].
#[inline(always)]
pub fn sqrt(v: VFloat) -> VFloat {
    v.sqrt()
}

impl Debug for VFloat {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "VFloat({:?})", self.to_array())
    }
}

impl From<f32> for VFloat {
    #[inline(always)]
    fn from(val: f32) -> Self {
        Self::splat(val)
    }
}

impl From<[f32; LANES]> for VFloat {
    #[inline(always)]
    fn from(lanes: [f32; LANES]) -> Self {
        Self::from_array(lanes)
    }
}

macro_rules! impl_vfloat_binop {
    ($trait:ident, $method:ident) => {
        impl $trait for VFloat {
            type Output = VFloat;
            #[inline(always)]
            fn $method(self, rhs: VFloat) -> VFloat {
                VFloat(self.0.$method(rhs.0))
            }
        }

        impl $trait<f32> for VFloat {
            type Output = VFloat;
            #[inline(always)]
            fn $method(self, rhs: f32) -> VFloat {
                VFloat(self.0.$method(NativeF32::splat(rhs)))
            }
        }

        impl $trait<VFloat> for f32 {
            type Output = VFloat;
            #[inline(always)]
            fn $method(self, rhs: VFloat) -> VFloat {
                VFloat(NativeF32::splat(self).$method(rhs.0))
            }
        }
    };
}

impl_vfloat_binop!(Add, add);
impl_vfloat_binop!(Sub, sub);
impl_vfloat_binop!(Mul, mul);
impl_vfloat_binop!(Div, div);

impl Neg for VFloat {
    type Output = VFloat;
    #[inline(always)]
    fn neg(self) -> VFloat {
        VFloat(-self.0)
    }
}

// ============================================================================
// VBool
// ============================================================================

/// One boolean per lane, produced by comparisons and consumed as a branch
/// condition by the combinators in [`crate::control`].
#[derive(Copy, Clone, Default)]
#[repr(transparent)]
pub struct VBool(pub(crate) NativeMask);

impl VBool {
    #[inline(always)]
    pub fn splat(val: bool) -> Self {
        Self(NativeMask::splat(val))
    }

    pub fn from_array(lanes: [bool; LANES]) -> Self {
        let bits = lanes
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &on)| acc | ((on as u32) << i));
        Self(NativeMask::from_bitmask(bits))
    }

    pub fn to_array(self) -> [bool; LANES] {
        let bits = self.0.bitmask();
        core::array::from_fn(|i| bits & (1 << i) != 0)
    }

    #[inline(always)]
    pub fn any(self) -> bool {
        self.0.any()
    }

    #[inline(always)]
    pub fn all(self) -> bool {
        self.0.all()
    }

    #[inline(always)]
    pub fn none(self) -> bool {
        !self.0.any()
    }

    /// View as an execution mask.
    #[inline(always)]
    pub fn to_mask(self) -> LaneMask {
        LaneMask(self.0)
    }
}

impl Debug for VBool {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "VBool({:?})", self.to_array())
    }
}

impl From<VBool> for LaneMask {
    #[inline(always)]
    fn from(cond: VBool) -> Self {
        cond.to_mask()
    }
}

impl From<LaneMask> for VBool {
    #[inline(always)]
    fn from(mask: LaneMask) -> Self {
        VBool(mask.0)
    }
}

impl BitAnd for VBool {
    type Output = Self;
    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for VBool {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Not for VBool {
    type Output = Self;
    #[inline(always)]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

// ============================================================================
// VInt
// ============================================================================

/// One `i32` per lane: loop indices and per-lane memory offsets.
#[derive(Copy, Clone, Default)]
#[repr(transparent)]
pub struct VInt(pub(crate) NativeI32);

impl VInt {
    #[inline(always)]
    pub fn splat(val: i32) -> Self {
        Self(NativeI32::splat(val))
    }

    #[inline(always)]
    pub fn from_array(lanes: [i32; LANES]) -> Self {
        Self(NativeI32::from_slice(&lanes))
    }

    #[inline(always)]
    pub fn to_array(self) -> [i32; LANES] {
        let mut out = [0; LANES];
        self.0.store(&mut out);
        out
    }

    /// Value held by lane `lane`. Panics if `lane >= LANES`.
    #[inline]
    pub fn lane(self, lane: usize) -> i32 {
        self.to_array()[lane]
    }

    /// Value held by lane 0.
    #[inline(always)]
    pub fn first(self) -> i32 {
        self.0.first()
    }

    /// Masked assignment, same rule as [`VFloat::assign`].
    #[inline(always)]
    pub fn assign(&mut self, other: VInt) {
        self.0 = NativeI32::simd_select(current_mask().0, other.0, self.0);
    }

    #[inline(always)]
    pub fn lt(self, rhs: impl Into<VInt>) -> VBool {
        VBool(self.0.cmp_lt(rhs.into().0))
    }

    #[inline(always)]
    pub fn eq_lanes(self, rhs: impl Into<VInt>) -> VBool {
        VBool(self.0.cmp_eq(rhs.into().0))
    }

    /// True when lane `i` holds `first() + i` for every lane, i.e. the
    /// offsets address `LANES` consecutive elements.
    #[inline(always)]
    pub fn is_contiguous(self) -> bool {
        self.eq_lanes(program_index() + self.first()).all()
    }
}

impl Debug for VInt {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "VInt({:?})", self.to_array())
    }
}

impl From<i32> for VInt {
    #[inline(always)]
    fn from(val: i32) -> Self {
        Self::splat(val)
    }
}

impl From<[i32; LANES]> for VInt {
    #[inline(always)]
    fn from(lanes: [i32; LANES]) -> Self {
        Self::from_array(lanes)
    }
}

impl Add for VInt {
    type Output = VInt;
    #[inline(always)]
    fn add(self, rhs: VInt) -> VInt {
        VInt(self.0 + rhs.0)
    }
}

impl Add<i32> for VInt {
    type Output = VInt;
    #[inline(always)]
    fn add(self, rhs: i32) -> VInt {
        VInt(self.0 + NativeI32::splat(rhs))
    }
}

impl Add<VInt> for i32 {
    type Output = VInt;
    #[inline(always)]
    fn add(self, rhs: VInt) -> VInt {
        VInt(NativeI32::splat(self) + rhs.0)
    }
}

impl Sub<i32> for VInt {
    type Output = VInt;
    #[inline(always)]
    fn sub(self, rhs: i32) -> VInt {
        VInt(self.0 - NativeI32::splat(rhs))
    }
}

// ============================================================================
// Varying
// ============================================================================

/// Vector types whose assignment is masked.
pub trait MaskedAssign: Copy {
    /// Lanes active in the current mask take `other`; the rest are kept.
    fn assign(&mut self, other: Self);
}

impl MaskedAssign for VFloat {
    #[inline(always)]
    fn assign(&mut self, other: Self) {
        VFloat::assign(self, other)
    }
}

impl MaskedAssign for VInt {
    #[inline(always)]
    fn assign(&mut self, other: Self) {
        VInt::assign(self, other)
    }
}

/// A masked variable that can be written through a shared reference.
///
/// Sibling bodies of [`crate::control::spmd_if_else`] are two closures alive at
/// the same time, so they cannot both hold `&mut` to one local. Both can hold
/// `&Varying`.
#[derive(Default)]
pub struct Varying<T: MaskedAssign>(Cell<T>);

impl<T: MaskedAssign> Varying<T> {
    pub fn new(value: T) -> Self {
        Self(Cell::new(value))
    }

    #[inline(always)]
    pub fn get(&self) -> T {
        self.0.get()
    }

    /// Masked assignment.
    #[inline(always)]
    pub fn set(&self, value: T) {
        let mut current = self.0.get();
        current.assign(value);
        self.0.set(current);
    }

    pub fn into_inner(self) -> T {
        self.0.into_inner()
    }
}

impl<T: MaskedAssign + Debug> Debug for Varying<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Varying").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests;
