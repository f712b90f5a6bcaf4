use crate::sync::irq::IrqControl;

const CPSR_I_BIT: u32 = 1 << 7;

/// Interrupt masking via the ARM CPSR I bit.
///
/// `State` is a `bool`: `true` means IRQs were enabled before the
/// disable. `restore` only re-enables; it never force-disables, so a
/// caller that entered with interrupts off leaves with them off.
pub struct ArmIrq;

impl IrqControl for ArmIrq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        let cpsr: u32;
        unsafe {
            // Save current CPSR, then mask IRQs
            core::arch::asm!(
                "mrs {0}, cpsr",
                "cpsid i",
                out(reg) cpsr,
                options(nomem, nostack)
            );
        }
        cpsr & CPSR_I_BIT == 0
    }

    #[inline(always)]
    fn restore(prev_enabled: bool) {
        if prev_enabled {
            unsafe {
                core::arch::asm!("cpsie i", options(nomem, nostack));
            }
        }
    }
}
