//! Architecture-specific backends for [`crate::sync::irq::IrqControl`].

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        pub mod arm;
        pub use arm::irq::ArmIrq;
    }
}
