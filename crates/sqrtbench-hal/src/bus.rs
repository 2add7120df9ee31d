//! Volatile register bus abstraction.

use std::sync::Arc;

/// Word-wide access to memory-mapped registers.
///
/// Implementations must not cache, merge, or reorder accesses: every call is one
/// bus transaction, because several registers have side effects on access
/// (a write to the timer snapshot latches the counter, a read of the
/// coprocessor `done` flag is a poll).
pub trait RegisterBus: Send + Sync {
    /// Read the 32-bit register at physical address `addr`.
    fn read(&self, addr: u32) -> u32;

    /// Write `value` to the 32-bit register at physical address `addr`.
    fn write(&self, addr: u32, value: u32);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &T {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value);
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for Arc<T> {
    #[inline]
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&self, addr: u32, value: u32) {
        (**self).write(addr, value);
    }
}
