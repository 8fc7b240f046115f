//! Process memory counters sampled on demand.
//!
//! Three counters back the harness's before/after snapshots:
//!
//! - `heap_used`: live bytes currently held from the allocator, tracked by a
//!   counting [`GlobalAlloc`] wrapper around [`System`].
//! - `heap_total`: cumulative bytes handed out since process start. Its delta
//!   over a run is the total allocation traffic of that run.
//! - `rss`: resident set size, read from `/proc/self/status` on Linux. Reported
//!   as 0 on platforms without a cheap equivalent.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};

static LIVE_BYTES: AtomicU64 = AtomicU64::new(0);
static TOTAL_BYTES: AtomicU64 = AtomicU64::new(0);

/// System allocator wrapper that keeps live/cumulative byte counters.
pub struct CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            LIVE_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
            TOTAL_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        LIVE_BYTES.fetch_sub(layout.size() as u64, Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let old_size = layout.size() as u64;
            let new_size = new_size as u64;
            if new_size >= old_size {
                LIVE_BYTES.fetch_add(new_size - old_size, Ordering::Relaxed);
                TOTAL_BYTES.fetch_add(new_size - old_size, Ordering::Relaxed);
            } else {
                LIVE_BYTES.fetch_sub(old_size - new_size, Ordering::Relaxed);
            }
        }
        new_ptr
    }
}

#[global_allocator]
static ALLOC: CountingAlloc = CountingAlloc;

/// Live bytes currently allocated.
pub fn heap_used_bytes() -> u64 {
    LIVE_BYTES.load(Ordering::Relaxed)
}

/// Cumulative bytes allocated since process start.
pub fn heap_total_bytes() -> u64 {
    TOTAL_BYTES.load(Ordering::Relaxed)
}

/// Current RSS (Resident Set Size) on Linux, via /proc/self/status.
#[cfg(target_os = "linux")]
pub fn current_rss_bytes() -> Option<u64> {
    use std::fs;
    let status = fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let mut parts = rest.split_whitespace();
            if let Some(kb) = parts.next().and_then(|s| s.parse::<u64>().ok()) {
                return Some(kb * 1024);
            }
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
pub fn current_rss_bytes() -> Option<u64> {
    None
}

/// Point-in-time capture of all three counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemSnapshot {
    pub heap_used: u64,
    pub heap_total: u64,
    pub rss: u64,
}

impl MemSnapshot {
    pub fn capture() -> Self {
        Self {
            heap_used: heap_used_bytes(),
            heap_total: heap_total_bytes(),
            rss: current_rss_bytes().unwrap_or(0),
        }
    }

    /// Signed per-counter difference `self - before`.
    pub fn delta_from(&self, before: &MemSnapshot) -> MemDelta {
        MemDelta {
            heap_used: signed_delta(self.heap_used, before.heap_used),
            heap_total: signed_delta(self.heap_total, before.heap_total),
            rss: signed_delta(self.rss, before.rss),
        }
    }
}

/// Signed change in each counter across a run. Negative values mean the
/// counter shrank (frees outpaced allocations during the run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemDelta {
    pub heap_used: i64,
    pub heap_total: i64,
    pub rss: i64,
}

fn signed_delta(after: u64, before: u64) -> i64 {
    (after as i128 - before as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are process-global and other test threads allocate too, so
    // assertions leave generous slack around a 1 MiB allocation.
    #[test]
    fn test_heap_counters_track_allocations() {
        const MIB: i64 = 1 << 20;

        let before = MemSnapshot::capture();
        let buf = vec![0u8; MIB as usize];
        let after = MemSnapshot::capture();

        let delta = after.delta_from(&before);
        assert!(delta.heap_used >= MIB / 2, "live delta: {}", delta.heap_used);
        assert!(delta.heap_total >= MIB, "total delta: {}", delta.heap_total);
        drop(buf);

        let released = MemSnapshot::capture().delta_from(&after);
        assert!(released.heap_used <= -(MIB / 2), "released: {}", released.heap_used);
    }

    #[test]
    fn test_heap_total_is_monotonic() {
        let a = heap_total_bytes();
        let _v = vec![0u8; 4096];
        let b = heap_total_bytes();
        assert!(b >= a + 4096);
    }

    #[test]
    fn test_delta_is_exact_pairwise_difference() {
        let before = MemSnapshot {
            heap_used: 2048,
            heap_total: 8192,
            rss: 1_048_576,
        };
        let after = MemSnapshot {
            heap_used: 1024,
            heap_total: 8192,
            rss: 1_050_624,
        };
        let d = after.delta_from(&before);
        assert_eq!(d.heap_used, -1024);
        assert_eq!(d.heap_total, 0);
        assert_eq!(d.rss, 2048);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_rss_is_reported_on_linux() {
        let rss = current_rss_bytes().unwrap();
        assert!(rss > 0);
    }
}
