use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use nix::sys::wait::{wait, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

/// Fork `count` children. Each child inherits the parent's mappings, naps,
/// and exits; it writes nothing and allocates nothing of its own. A fork
/// failure is fatal and already-spawned children are left to run out.
pub fn spawn_sleepers(count: usize, nap: Duration) -> Result<Vec<Pid>> {
    let mut pids = Vec::with_capacity(count);
    for _ in 0..count {
        match unsafe { fork() }.context("fork")? {
            ForkResult::Child => {
                thread::sleep(nap);
                // _exit skips atexit and stdio teardown, which belong to the
                // parent's copy of the process state.
                unsafe { libc::_exit(0) };
            }
            ForkResult::Parent { child } => {
                debug!("forked child {}", child);
                pids.push(child);
            }
        }
    }
    Ok(pids)
}

/// Block until `count` children have terminated, in whatever order the
/// kernel reports them. Returns one status per reaped child.
pub fn reap(count: usize) -> Result<Vec<WaitStatus>> {
    let mut statuses = Vec::with_capacity(count);
    for _ in 0..count {
        let status = wait().context("wait")?;
        debug!("reaped {:?}", status);
        statuses.push(status);
    }
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // wait() reaps any child of this process, so fork tests serialize on
    // FORK_TEST_LOCK instead of running concurrently.
    #[test]
    fn reap_collects_one_clean_exit_per_child() {
        let _serialize = crate::FORK_TEST_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let quick = spawn_sleepers(3, Duration::from_millis(10)).unwrap();
        let slow = spawn_sleepers(2, Duration::from_millis(200)).unwrap();

        let spawned: HashSet<Pid> = quick.iter().chain(slow.iter()).copied().collect();
        assert_eq!(spawned.len(), 5);

        let statuses = reap(5).unwrap();
        assert_eq!(statuses.len(), 5);

        let reaped: HashSet<Pid> = statuses
            .iter()
            .map(|status| match status {
                WaitStatus::Exited(pid, 0) => *pid,
                other => panic!("unexpected child status: {:?}", other),
            })
            .collect();
        assert_eq!(reaped, spawned);
    }
}
