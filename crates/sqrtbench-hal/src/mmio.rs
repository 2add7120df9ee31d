//! Physical register window mapped from `/dev/mem`.
//!
//! Used when the harness runs under Linux on the same SoC as the FPGA fabric
//! (for example behind a lightweight HPS-to-FPGA bridge). Every access is a
//! single volatile load or store.

use crate::bus::RegisterBus;
use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};
use sqrtbench_common::error::{BenchError, BenchResult};
use std::ffi::c_void;
use std::fs::OpenOptions;
use std::num::NonZeroUsize;
use std::os::unix::fs::OpenOptionsExt;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

const PAGE_SIZE: u32 = 4096;

/// Only one window may be open per process.
static WINDOW_OPEN: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct Mapping {
    ptr: NonNull<c_void>,
    len: usize,
    /// Physical address of `ptr`.
    page_base: u32,
    /// Accessible physical range `[lo, hi)`.
    lo: u32,
    hi: u32,
}

// SAFETY: the mapping is device memory accessed only through volatile
// word-sized loads and stores; it carries no thread affinity.
unsafe impl Send for Mapping {}
// SAFETY: see above; concurrent volatile accesses are individual bus transactions.
unsafe impl Sync for Mapping {}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` come from the successful `mmap` in `MmioBus::open`.
        if let Err(e) = unsafe { munmap(self.ptr, self.len) } {
            error!(error = %e, "failed to unmap register window");
        }
        WINDOW_OPEN.store(false, Ordering::Release);
    }
}

/// Register bus backed by a `/dev/mem` mapping.
///
/// Cloning shares the mapping; [`Peripherals`](crate::Peripherals) relies on this to
/// give each register block its own handle.
#[derive(Debug, Clone)]
pub struct MmioBus {
    mapping: Arc<Mapping>,
}

impl MmioBus {
    /// Map the physical range `[base, base + len)`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::PeripheralsTaken`] if a window is already open in this
    /// process, or [`BenchError::Bus`] if `/dev/mem` cannot be opened or mapped.
    ///
    /// # Safety
    ///
    /// The range must describe device registers. Nothing else in the process may
    /// map or otherwise access the same physical range while the bus is alive.
    pub unsafe fn open(base: u32, len: u32) -> BenchResult<Self> {
        if WINDOW_OPEN.swap(true, Ordering::AcqRel) {
            return Err(BenchError::PeripheralsTaken);
        }

        match unsafe { Self::map(base, len) } {
            Ok(bus) => Ok(bus),
            Err(e) => {
                WINDOW_OPEN.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    unsafe fn map(base: u32, len: u32) -> BenchResult<Self> {
        let hi = base
            .checked_add(len)
            .ok_or_else(|| BenchError::Bus(format!("window {base:#010x}+{len:#x} overflows")))?;
        let page_base = base & !(PAGE_SIZE - 1);
        let map_len = usize::try_from(hi - page_base)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| BenchError::Bus("empty register window".into()))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(OFlag::O_SYNC.bits())
            .open("/dev/mem")
            .map_err(|e| BenchError::Bus(format!("failed to open /dev/mem: {e}")))?;

        let offset = i64::from(page_base)
            .try_into()
            .map_err(|_| BenchError::Bus(format!("offset {page_base:#010x} out of range")))?;

        // SAFETY: shared mapping of a device range the caller vouched for.
        let ptr = unsafe {
            mmap(
                None,
                map_len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                offset,
            )
        }
        .map_err(|e| BenchError::Bus(format!("mmap of {page_base:#010x} failed: {e}")))?;

        info!(base, len, "register window mapped");

        Ok(Self {
            mapping: Arc::new(Mapping {
                ptr,
                len: map_len.get(),
                page_base,
                lo: base,
                hi,
            }),
        })
    }

    fn register(&self, addr: u32) -> Option<*mut u32> {
        let m = &self.mapping;
        if addr % 4 != 0 || addr < m.lo || addr.checked_add(4).map_or(true, |end| end > m.hi) {
            return None;
        }
        let offset = usize::try_from(addr - m.page_base).ok()?;
        // SAFETY: `offset + 4 <= len`, checked against the window bounds above.
        Some(unsafe { m.ptr.as_ptr().cast::<u8>().add(offset).cast::<u32>() })
    }
}

impl RegisterBus for MmioBus {
    fn read(&self, addr: u32) -> u32 {
        match self.register(addr) {
            // SAFETY: aligned pointer inside the live mapping.
            Some(reg) => unsafe { reg.read_volatile() },
            None => {
                error!(addr, "read outside register window");
                0
            }
        }
    }

    fn write(&self, addr: u32, value: u32) {
        match self.register(addr) {
            // SAFETY: aligned pointer inside the live mapping.
            Some(reg) => unsafe { reg.write_volatile(value) },
            None => error!(addr, value, "write outside register window ignored"),
        }
    }
}
