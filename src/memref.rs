//! Masked memory references: scatter and gather through per-lane offsets.
//!
//! A [`MaskedRef`] pairs a buffer with a [`VInt`] of element offsets, one per
//! lane. Storing through it writes only the lanes active in the current mask;
//! loading through it reads only those lanes and leaves the others at `0.0`.
//!
//! When every lane is active and the offsets are consecutive, both directions
//! collapse to one unaligned vector load/store. Any other offset pattern takes
//! the per-lane path, so arbitrary offsets are always handled correctly.
//!
//! Inactive lanes are never dereferenced, so their offsets may be anything.
//! An active lane whose offset is negative or past the end of the buffer is a
//! caller bug and panics. When two active lanes name the same element, lanes
//! are committed in ascending order and the highest lane's value is kept.

use crate::backend::{Backend, Native, SimdOps};
use crate::context::current_mask;
use crate::mask::LANES;
use crate::vector::{VFloat, VInt};

type NativeF32 = <Native as Backend>::F32;

/// A buffer viewed through one offset per lane.
#[derive(Debug)]
pub struct MaskedRef<'a> {
    base: &'a mut [f32],
    offsets: VInt,
}

impl<'a> MaskedRef<'a> {
    pub fn new(base: &'a mut [f32], offsets: VInt) -> Self {
        Self { base, offsets }
    }

    pub fn offsets(&self) -> VInt {
        self.offsets
    }

    /// Scatter `value` to the active lanes' elements.
    #[inline]
    pub fn store(&mut self, value: VFloat) {
        scatter(self.base, self.offsets, value);
    }

    /// Gather the active lanes' elements.
    #[inline]
    pub fn load(&self) -> VFloat {
        gather(self.base, self.offsets)
    }
}

impl From<&MaskedRef<'_>> for VFloat {
    #[inline]
    fn from(r: &MaskedRef<'_>) -> Self {
        r.load()
    }
}

impl From<MaskedRef<'_>> for VFloat {
    #[inline]
    fn from(r: MaskedRef<'_>) -> Self {
        r.load()
    }
}

impl VInt {
    /// Reference `base[self[i]]` for every lane `i`.
    #[inline]
    pub fn at(self, base: &mut [f32]) -> MaskedRef<'_> {
        MaskedRef::new(base, self)
    }

    /// Gather `base[self[i]]` for every active lane from a read-only buffer.
    #[inline]
    pub fn load_from(self, base: &[f32]) -> VFloat {
        gather(base, self)
    }
}

/// Element index for `lane`, or a panic naming the offending lane.
#[track_caller]
#[inline]
fn lane_address(lane: usize, offset: i32, len: usize) -> usize {
    match usize::try_from(offset) {
        Ok(ix) if ix < len => ix,
        _ => panic!(
            "active lane {} has offset {} outside a buffer of {} elements",
            lane, offset, len
        ),
    }
}

/// Start index of a contiguous run, checking both ends of the run.
#[track_caller]
#[inline]
fn contiguous_start(offsets: VInt, len: usize) -> usize {
    let start = lane_address(0, offsets.first(), len);
    lane_address(LANES - 1, offsets.lane(LANES - 1), len);
    start
}

/// Masked gather: `out[i] = base[offsets[i]]` for active lanes, `0.0` elsewhere.
#[track_caller]
pub fn gather(base: &[f32], offsets: VInt) -> VFloat {
    let mask = current_mask();
    if mask.all() && offsets.is_contiguous() {
        // "all on" optimization: vector load
        let start = contiguous_start(offsets, base.len());
        return VFloat(NativeF32::from_slice(&base[start..]));
    }

    let offs = offsets.to_array();
    let mut loaded = [0.0f32; LANES];
    for lane in mask.bits().lanes() {
        loaded[lane] = base[lane_address(lane, offs[lane], base.len())];
    }
    VFloat::from_array(loaded)
}

/// Masked scatter: `base[offsets[i]] = value[i]` for active lanes only.
#[track_caller]
pub fn scatter(base: &mut [f32], offsets: VInt, value: VFloat) {
    let mask = current_mask();
    if mask.all() && offsets.is_contiguous() {
        // "all on" optimization: vector store
        let start = contiguous_start(offsets, base.len());
        value.0.store(&mut base[start..]);
        return;
    }

    let stored = value.to_array();
    let offs = offsets.to_array();
    for lane in mask.bits().lanes() {
        let ix = lane_address(lane, offs[lane], base.len());
        base[ix] = stored[lane];
    }
}
