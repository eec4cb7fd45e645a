//! Process-pool backend: W forked workers over an anonymous shared mapping.
//!
//! The mapping holds a [`RegionHeader`] (round barrier plus start gate)
//! followed by the two score rows. The match index and row symbols are
//! inherited copy-on-write at fork time and only ever read.
//!
//! Children never return into the caller: they run their rounds and leave
//! through `_exit`, without allocating, logging or running destructors.
//! The parent reaps every child it forked before returning, on every path.

use std::io;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;
use std::sync::atomic::{fence, AtomicU32, Ordering};
use std::thread;

use crate::backends::run_worker;
use crate::barrier::SharedBarrier;
use crate::error::{LcsError, ResourceError, Result};
use crate::rows::AtomicRows;
use crate::traits::{LcsJob, Outcome, RowScheduler};

const GATE_PENDING: u32 = 0;
const GATE_GO: u32 = 1;
const GATE_ABORT: u32 = 2;

/// Exit status of a child whose rounds panicked.
const PANIC_STATUS: i32 = 101;

/// Forked-process scheduler (Unix only).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessScheduler;

/// Shared state at the start of the mapping.
#[repr(C)]
struct RegionHeader {
    barrier: SharedBarrier,
    gate: AtomicU32,
}

/// An anonymous `MAP_SHARED` mapping, unmapped on drop.
struct SharedRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl SharedRegion {
    /// Map `len` zeroed bytes shared with future children.
    fn map(len: usize) -> io::Result<Self> {
        // SAFETY: anonymous mapping with no address hint; the result is
        // checked against MAP_FAILED before use.
        let raw = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED | libc::MAP_ANON,
                -1,
                0,
            )
        };
        if raw == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        NonNull::new(raw.cast::<u8>())
            .map(|ptr| Self { ptr, len })
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "mmap returned null"))
    }
}

impl Drop for SharedRegion {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` describe exactly the mapping created in `map`.
        unsafe {
            libc::munmap(self.ptr.as_ptr().cast(), self.len);
        }
    }
}

/// Typed view over a [`SharedRegion`]: header, then two rows of `width`.
struct SharedState {
    region: SharedRegion,
    width: usize,
}

impl SharedState {
    fn rows_offset() -> usize {
        let align = mem::align_of::<AtomicU32>();
        mem::size_of::<RegionHeader>().div_ceil(align) * align
    }

    fn create(columns: usize, workers: u32) -> Result<Self> {
        let width = columns + 1;
        let bytes = Self::rows_offset() + 2 * width * mem::size_of::<AtomicU32>();
        let region = SharedRegion::map(bytes)
            .map_err(|source| ResourceError::SharedMemory { bytes, source })?;
        // SAFETY: the mapping is page aligned and at least `bytes` long; the
        // header is written once before any other process exists. The rows
        // are already zero, which is a valid `AtomicU32`.
        unsafe {
            ptr::write(
                region.ptr.as_ptr().cast::<RegionHeader>(),
                RegionHeader {
                    barrier: SharedBarrier::new(workers),
                    gate: AtomicU32::new(GATE_PENDING),
                },
            );
        }
        Ok(Self { region, width })
    }

    fn header(&self) -> &RegionHeader {
        // SAFETY: initialised in `create`; only accessed through atomics.
        unsafe { &*self.region.ptr.as_ptr().cast::<RegionHeader>() }
    }

    fn rows(&self) -> AtomicRows<'_> {
        // SAFETY: both rows lie inside the mapping, are 4-byte aligned and
        // zero-initialised; all access goes through atomics.
        unsafe {
            let base = self
                .region
                .ptr
                .as_ptr()
                .add(Self::rows_offset())
                .cast::<AtomicU32>();
            AtomicRows::new(
                slice::from_raw_parts(base, self.width),
                slice::from_raw_parts(base.add(self.width), self.width),
            )
        }
    }
}

/// Child side: wait for the gate, run the rounds, exit.
fn child_main(job: &LcsJob<'_>, state: &SharedState, worker: usize) -> ! {
    let header = state.header();
    loop {
        match header.gate.load(Ordering::Acquire) {
            GATE_GO => break,
            // SAFETY: see below; an aborted run has nothing to do.
            GATE_ABORT => unsafe { libc::_exit(0) },
            _ => thread::yield_now(),
        }
    }

    let block = &job.partition.blocks()[worker];
    let rows = state.rows();
    // Faults are counted inside the shared barrier itself.
    let ran = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        run_worker(job, rows, block, &header.barrier, |_, _| {})
    }));
    let status = if ran.is_ok() { 0 } else { PANIC_STATUS };
    // SAFETY: terminates the child without unwinding into the parent's
    // stack frames or running its destructors.
    unsafe { libc::_exit(status) }
}

fn describe_status(status: libc::c_int) -> Option<String> {
    if libc::WIFEXITED(status) {
        match libc::WEXITSTATUS(status) {
            0 => None,
            code => Some(format!("exited with status {code}")),
        }
    } else if libc::WIFSIGNALED(status) {
        Some(format!("killed by signal {}", libc::WTERMSIG(status)))
    } else {
        Some(format!("stopped with raw status {status}"))
    }
}

/// Block until `pid` terminates.
fn reap(pid: libc::pid_t) -> io::Result<libc::c_int> {
    let mut status: libc::c_int = 0;
    loop {
        // SAFETY: `pid` is a child of this process; `status` is a valid out pointer.
        let rc = unsafe { libc::waitpid(pid, &mut status, 0) };
        if rc == pid {
            return Ok(status);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

/// Reap all children, keeping the first failure.
fn reap_all(children: &[(usize, libc::pid_t)]) -> Result<()> {
    let mut failure = None;
    for &(worker, pid) in children {
        match reap(pid) {
            Ok(status) => {
                if let Some(detail) = describe_status(status) {
                    failure.get_or_insert(LcsError::WorkerFailed { worker, detail });
                }
            }
            Err(source) => {
                failure.get_or_insert(ResourceError::Wait(source).into());
            }
        }
    }
    failure.map_or(Ok(()), Err)
}

impl RowScheduler for ProcessScheduler {
    fn name(&self) -> &'static str {
        "processes"
    }

    fn run(&self, job: &LcsJob<'_>) -> Result<Outcome> {
        let state = SharedState::create(job.columns(), job.workers() as u32)?;
        let header = state.header();

        let mut children = Vec::with_capacity(job.workers());
        for block in job.partition.blocks() {
            // SAFETY: the child only runs `child_main`, which neither
            // allocates nor returns.
            match unsafe { libc::fork() } {
                -1 => {
                    let source = io::Error::last_os_error();
                    header.gate.store(GATE_ABORT, Ordering::Release);
                    // Best effort: the fork error is what gets reported.
                    let _ = reap_all(&children);
                    return Err(ResourceError::Fork {
                        worker: block.worker,
                        source,
                    }
                    .into());
                }
                0 => child_main(job, &state, block.worker),
                pid => children.push((block.worker, pid)),
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(children = children.len(), "forked workers, opening gate");
        header.gate.store(GATE_GO, Ordering::Release);
        reap_all(&children)?;
        fence(Ordering::Acquire);

        Ok(Outcome {
            score: state.rows().final_score(job.rounds()),
            barrier_faults: header.barrier.faults(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Sequence;
    use crate::blocks::Partition;
    use crate::match_index::MatchIndex;

    fn run(cols: &str, rows: &str, workers: usize) -> Outcome {
        let cols: Sequence = cols.parse().unwrap();
        let rows: Sequence = rows.parse().unwrap();
        let index = MatchIndex::build(&cols);
        let partition = Partition::new(cols.len(), workers).unwrap();
        let job = LcsJob {
            index: &index,
            row_symbols: rows.symbols(),
            partition: &partition,
        };
        ProcessScheduler.run(&job).unwrap()
    }

    #[test]
    fn rows_start_after_aligned_header() {
        let offset = SharedState::rows_offset();
        assert!(offset >= mem::size_of::<RegionHeader>());
        assert_eq!(offset % mem::align_of::<AtomicU32>(), 0);
    }

    #[test]
    fn shared_rows_start_zeroed() {
        let state = SharedState::create(5, 2).unwrap();
        assert_eq!(state.rows().final_score(0), 0);
        assert_eq!(state.header().barrier.participants(), 2);
        assert_eq!(state.header().gate.load(Ordering::Relaxed), GATE_PENDING);
    }

    #[test]
    fn clean_exit_is_not_a_failure() {
        assert_eq!(describe_status(0), None);
    }

    #[test]
    fn nonzero_exit_is_described() {
        // Exit codes live in the second byte of a wait status.
        assert_eq!(
            describe_status(PANIC_STATUS << 8).as_deref(),
            Some("exited with status 101")
        );
    }

    #[test]
    fn signal_death_is_described() {
        let detail = describe_status(libc::SIGKILL).unwrap();
        assert!(detail.starts_with("killed by signal"), "{detail}");
        assert!(detail.ends_with(&libc::SIGKILL.to_string()));
    }

    #[test]
    fn reaping_reports_first_failed_child() {
        let mut children = Vec::new();
        for (worker, status) in [(0, 0), (1, PANIC_STATUS), (2, 3)] {
            // SAFETY: the child exits immediately without touching any state.
            match unsafe { libc::fork() } {
                -1 => panic!("fork failed: {}", io::Error::last_os_error()),
                0 => unsafe { libc::_exit(status) },
                pid => children.push((worker, pid)),
            }
        }
        match reap_all(&children) {
            Err(LcsError::WorkerFailed { worker, detail }) => {
                assert_eq!(worker, 1);
                assert_eq!(detail, "exited with status 101");
            }
            other => panic!("expected a worker failure, got {other:?}"),
        }
    }

    #[test]
    fn identical_sequences() {
        for w in [1, 2, 4] {
            let outcome = run("ATCG", "ATCG", w);
            assert_eq!(outcome.score, 4);
            assert_eq!(outcome.barrier_faults, 0);
        }
    }

    #[test]
    fn disjoint_alphabets() {
        assert_eq!(run("AAAA", "TTTT", 3).score, 0);
    }
}
