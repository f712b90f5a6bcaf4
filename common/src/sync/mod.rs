pub mod critical;
pub mod irq;
pub mod irq_spinlock;

pub use critical::IrqGuard;
pub use irq::{IrqControl, NullIrq};
pub use irq_spinlock::IrqSpinLock;
