// Reproduction of the dnsmasq large-blocklist OOM scenario.
//
// dnsmasq loads blocklists into private anonymous memory, then forks a child
// per TCP request. Linux overcommit accounting charges each fork its own
// copy-on-write instance of that memory, so Committed_AS balloons and the
// OOM killer can fire on small systems. Mapping the blocklist as shared
// anonymous memory makes the kernel account the single instance once, no
// matter how many children inherit it.
// https://www.kernel.org/doc/html/v5.4/vm/overcommit-accounting.html
//
// The binary walks the sequence map -> write -> mprotect(RO) -> fork N ->
// reap -> munmap and echoes the Committed_AS line from /proc/meminfo at each
// step, for either sharing mode.

use std::time::Duration;

pub mod cli;
pub mod meminfo;
pub mod region;
pub mod workers;

// wait() reaps any child of the test process, so tests that fork take this
// lock to keep their children out of each other's way.
#[cfg(test)]
pub(crate) static FORK_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Tunables for one demonstration run. Compile-time constants, not flags;
/// tests shrink them so a run fits in a harness.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Size of the anonymous region mapped by the parent, in bytes.
    pub region_bytes: usize,
    /// Number of children forked after the region is made read-only.
    pub children: usize,
    /// How long each child naps before exiting.
    pub child_nap: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region_bytes: 64 * 1024 * 1024,
            children: 16,
            child_nap: Duration::from_secs(3),
        }
    }
}
