//! Per-thread execution context.
//!
//! The current [`LaneMask`] lives in a thread-local slot, so independent SPMD
//! computations on different threads never see each other's masks. Each
//! thread starts with every lane active.
//!
//! The only way to change the mask is a [`MaskScope`]: it saves the mask on
//! creation, narrows it, and puts the saved value back when dropped. Drop runs
//! on normal exit, early return and unwinding alike, so code after a scope
//! always observes the mask its enclosing scope set up.
//!
//! Live scopes are tracked on a per-thread stack. Releasing a scope also
//! releases every scope opened inside it, so dropping guards out of order (or
//! leaking an inner one) can never leave a stale narrowed mask behind.

use crate::mask::{LaneBits, LaneMask};
use core::marker::PhantomData;
use log::{trace, warn};
use std::cell::{Cell, RefCell};

thread_local! {
    static EXEC: Cell<LaneMask> = Cell::new(LaneMask::all_on());
    static SCOPES: RefCell<ScopeStack> = RefCell::new(ScopeStack::default());
}

/// Ids of the live scopes on this thread, innermost last.
#[derive(Default)]
struct ScopeStack {
    next_id: u64,
    live: Vec<u64>,
}

impl ScopeStack {
    fn open(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.push(id);
        id
    }

    /// Release `id` and everything opened after it. Returns how many inner
    /// scopes went with it, or `None` if `id` was already released.
    fn release(&mut self, id: u64) -> Option<usize> {
        let pos = self.live.iter().rposition(|&live| live == id)?;
        let inner = self.live.len() - pos - 1;
        self.live.truncate(pos);
        Some(inner)
    }

    fn is_innermost(&self, id: u64) -> bool {
        self.live.last() == Some(&id)
    }
}

/// The execution mask in effect on this thread.
#[inline(always)]
pub fn current_mask() -> LaneMask {
    EXEC.with(Cell::get)
}

/// [`current_mask`] as flags.
#[inline]
pub fn current_lanes() -> LaneBits {
    current_mask().bits()
}

#[inline(always)]
fn set_mask(mask: LaneMask) {
    EXEC.with(|exec| exec.set(mask));
}

/// Scoped save/narrow/restore of the execution mask.
///
/// Scopes are meant to nest LIFO. Dropping an outer scope while inner ones
/// are still alive restores the outer saved mask and turns the inner guards
/// into no-ops. The guard belongs to the thread that opened it, so it is
/// neither `Send` nor `Sync`.
#[must_use = "the mask is restored as soon as the scope is dropped"]
pub struct MaskScope {
    id: u64,
    saved: LaneMask,
    _not_send: PhantomData<*const ()>,
}

impl MaskScope {
    /// Save the current mask and narrow it to `current & cond`.
    #[inline(always)]
    pub fn narrow(cond: LaneMask) -> Self {
        let saved = current_mask();
        let id = SCOPES.with(|scopes| scopes.borrow_mut().open());
        set_mask(saved & cond);
        Self {
            id,
            saved,
            _not_send: PhantomData,
        }
    }

    /// Re-narrow from the saved mask: the current mask becomes `saved & cond`.
    ///
    /// Used to switch from one branch to its sibling without leaving the scope.
    /// Panics unless this is the innermost live scope on the thread.
    #[inline(always)]
    pub fn retarget(&self, cond: LaneMask) {
        let innermost = SCOPES.with(|scopes| scopes.borrow().is_innermost(self.id));
        assert!(
            innermost,
            "MaskScope::retarget called while an inner scope is live or after release"
        );
        set_mask(self.saved & cond);
    }

    /// The mask that will be restored on drop.
    #[inline(always)]
    pub fn saved(&self) -> LaneMask {
        self.saved
    }

    /// Does the narrowed mask leave any lane active?
    #[inline(always)]
    pub fn any_active(&self) -> bool {
        current_mask().any()
    }
}

impl Drop for MaskScope {
    #[inline(always)]
    fn drop(&mut self) {
        match SCOPES.with(|scopes| scopes.borrow_mut().release(self.id)) {
            Some(0) => set_mask(self.saved),
            Some(inner) => {
                warn!(
                    "MaskScope released with {} inner scope(s) still live, restoring {:?}",
                    inner, self.saved
                );
                set_mask(self.saved);
            }
            None => trace!("MaskScope already released by an enclosing scope"),
        }
    }
}
