use core::marker::PhantomData;

use super::irq::IrqControl;

/// Scoped critical section.
///
/// Construction disables interrupts and records the previous masking
/// state; dropping the guard restores that state. Nesting is safe: an
/// inner guard observes "already disabled" and its drop leaves
/// interrupts off for the outer guard to restore.
///
/// The guard is `!Send` so a critical section cannot migrate off the
/// context that opened it.
pub struct IrqGuard<I: IrqControl> {
    prev: I::State,
    // *mut () keeps the guard out of Send/Sync
    _not_send: PhantomData<*mut ()>,
}

impl<I: IrqControl> IrqGuard<I> {
    /// Open a critical section.
    pub fn new() -> Self {
        Self {
            prev: I::disable(),
            _not_send: PhantomData,
        }
    }
}

impl<I: IrqControl> Default for IrqGuard<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: IrqControl> Drop for IrqGuard<I> {
    fn drop(&mut self) {
        I::restore(self.prev);
    }
}

/// Run `f` with interrupts disabled, restoring the prior state after.
pub fn with_irqs_disabled<I: IrqControl, R>(f: impl FnOnce() -> R) -> R {
    let _guard = IrqGuard::<I>::new();
    f()
}
