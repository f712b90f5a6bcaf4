use core::fmt::Debug;

/// Architecture-specific interrupt masking interface.
///
/// Implemented by the architecture layer (see [`crate::arch`]). Drivers
/// are generic over this trait so the same code runs on hardware and in
/// host-side tests.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);
}

/// No-op interrupt control.
///
/// For contexts without asynchronous preemption: host-side unit tests,
/// or early boot before the vector table is installed.
pub struct NullIrq;

impl IrqControl for NullIrq {
    type State = ();

    #[inline(always)]
    fn disable() {}

    #[inline(always)]
    fn restore(_state: ()) {}
}
