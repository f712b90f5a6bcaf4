//! Interrupt vector handler registry.
//!
//! The surrounding firmware binds each hardware interrupt line to a
//! handler here at init time; the architecture's exception vector calls
//! [`dispatch`] with the pending IRQ number.
//!
//! Registration must happen before the corresponding line is unmasked
//! at the interrupt controller: [`dispatch`] runs in interrupt context
//! and takes the same lock, so a registration racing its own first
//! interrupt would deadlock a single core.

use spin::Mutex;

/// A registered interrupt handler.
pub type IrqHandler = fn();

const MAX_IRQS: usize = 128;

static HANDLERS: Mutex<[Option<IrqHandler>; MAX_IRQS]> = Mutex::new([None; MAX_IRQS]);

/// Bind `handler` to interrupt line `irq`.
///
/// Returns `false` when `irq` is out of range. Re-registering a line
/// replaces its previous handler.
pub fn register(irq: u32, handler: IrqHandler) -> bool {
    match HANDLERS.lock().get_mut(irq as usize) {
        Some(slot) => {
            *slot = Some(handler);
            true
        }
        None => false,
    }
}

/// Remove the handler for interrupt line `irq`.
pub fn unregister(irq: u32) {
    if let Some(slot) = HANDLERS.lock().get_mut(irq as usize) {
        *slot = None;
    }
}

/// Invoke the handler registered for `irq`.
///
/// Returns `true` when a handler ran. Spurious interrupts are logged
/// and otherwise ignored.
pub fn dispatch(irq: u32) -> bool {
    let handler = HANDLERS
        .lock()
        .get(irq as usize)
        .copied()
        .flatten();

    match handler {
        Some(handler) => {
            handler();
            true
        }
        None => {
            log::warn!("unhandled IRQ: {irq}");
            false
        }
    }
}
