use std::num::NonZeroUsize;
use std::slice;

use anyhow::{Context, Result};
use log::debug;
use libc::c_void;
use nix::sys::mman::{mmap, mprotect, munmap, MapFlags, ProtFlags};

/// Sharing semantics of the anonymous mapping. Shared is one kernel-side
/// instance accounted once across every process that inherits it; Private is
/// copy-on-write, accounted per inheriting process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shared,
    Private,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Shared => "shared",
            Mode::Private => "private",
        }
    }

    fn map_flags(self) -> MapFlags {
        let sharing = match self {
            Mode::Shared => MapFlags::MAP_SHARED,
            Mode::Private => MapFlags::MAP_PRIVATE,
        };
        MapFlags::MAP_ANONYMOUS | sharing
    }
}

/// An anonymous mapping owned by the parent. Mapped read-write, filled once,
/// then downgraded to read-only before any fork; unmapped exactly once, after
/// all children are reaped. No Drop: on a fatal error the process exits and
/// the kernel tears the mapping down.
pub struct Region {
    addr: *mut c_void,
    len: NonZeroUsize,
    mode: Mode,
}

impl Region {
    pub fn map_anonymous(len: usize, mode: Mode) -> Result<Region> {
        let len = NonZeroUsize::new(len).context("region size must be non-zero")?;
        let addr = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                mode.map_flags(),
                -1,
                0,
            )
        }
        .context("mmap")?;
        debug!("mapped {} {} bytes at {:p}", mode.as_str(), len, addr);

        Ok(Region { addr, len, mode })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The region as machine-word slots, in address order.
    pub fn words(&self) -> &[usize] {
        let count = self.len.get() / std::mem::size_of::<usize>();
        unsafe { slice::from_raw_parts(self.addr as *const usize, count) }
    }

    /// Write each word its 0-based index, first to last. Touching every slot
    /// forces every page resident, so the next Committed_AS sample reflects
    /// real usage instead of lazily zero-filled pages. Must not be called
    /// after `set_readonly`.
    pub fn fill_words(&mut self) {
        let count = self.len.get() / std::mem::size_of::<usize>();
        let words = unsafe { slice::from_raw_parts_mut(self.addr as *mut usize, count) };
        for (i, slot) in words.iter_mut().enumerate() {
            *slot = i;
        }
    }

    /// Downgrade to read-only for every process that will ever see the
    /// mapping (the protection is inherited across fork).
    pub fn set_readonly(&mut self) -> Result<()> {
        unsafe { mprotect(self.addr, self.len.get(), ProtFlags::PROT_READ) }
            .context("mprotect")?;
        debug!("region at {:p} is now read-only", self.addr);
        Ok(())
    }

    pub fn unmap(self) -> Result<()> {
        unsafe { munmap(self.addr, self.len.get()) }.context("munmap")
    }
}
