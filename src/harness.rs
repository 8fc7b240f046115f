//! Shared measurement harness.
//!
//! Every demo funnels through [`measure`]: run an operation a fixed number of
//! times, strictly sequentially, and report wall-clock totals plus process
//! memory deltas. Memory is snapshotted twice (before and after the whole run,
//! never per iteration), so the deltas conflate allocation and collection
//! across all iterations. That is intentional; this is an illustrative
//! comparison tool, not a profiler. There is no warm-up phase and no outlier
//! handling for the same reason.

use std::hint::black_box;
use std::io;
use std::time::Instant;

use futures::future::LocalBoxFuture;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::memory::{MemDelta, MemSnapshot};

#[derive(Clone, Copy, Debug)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    pub fn iters(&self) -> u64 {
        match self.profile {
            Profile::Quick => 10_000,
            Profile::Full => 200_000,
        }
    }
}

/// One invocation's result: produced immediately or behind a future.
///
/// A single sequencing loop resolves both arms, so synchronous and
/// asynchronous operations share the identical measurement path.
pub enum Step<T> {
    Ready(T),
    Deferred(LocalBoxFuture<'static, T>),
}

impl<T> Step<T> {
    pub fn ready(value: T) -> Self {
        Step::Ready(value)
    }

    pub fn deferred(fut: impl std::future::Future<Output = T> + 'static) -> Self {
        Step::Deferred(Box::pin(fut))
    }
}

/// Completed run: inputs plus derived timing and memory attributes.
#[derive(Clone, Debug)]
pub struct Measured {
    pub label: String,
    pub iters: u64,
    pub total_ns: u128,
    pub ns_per_iter: f64,
    pub mem: MemDelta,
}

impl Measured {
    /// Human-readable report block, one line per attribute.
    pub fn render(&self) -> String {
        format!(
            "=== {} ===\n\
             iterations       : {}\n\
             total time       : {:.3} ms\n\
             mean / iteration : {:.1} ns\n\
             heap used delta  : {}\n\
             heap total delta : {}\n\
             rss delta        : {}",
            self.label,
            self.iters,
            self.total_ns as f64 / 1_000_000.0,
            self.ns_per_iter,
            format_bytes(self.mem.heap_used),
            format_bytes(self.mem.heap_total),
            format_bytes(self.mem.rss),
        )
    }
}

/// Run `op` exactly `iters` times, print the report to stdout, and return the
/// measured record.
///
/// Iterations never overlap: a `Deferred` step is awaited to completion before
/// the next invocation starts, so the total means "N sequential operations".
/// A zero iteration count is rejected before `op` is ever invoked. Panics from
/// `op` unwind through the harness untouched; operations that expect routine
/// failures must handle them inside the closure.
pub async fn measure<T, F>(label: &str, iters: u64, mut op: F) -> io::Result<Measured>
where
    F: FnMut() -> Step<T>,
{
    if iters == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{label}': iteration count must be >= 1"),
        ));
    }

    let mem_before = MemSnapshot::capture();
    let start = Instant::now();

    for _ in 0..iters {
        match op() {
            Step::Ready(v) => {
                black_box(v);
            }
            Step::Deferred(fut) => {
                black_box(fut.await);
            }
        }
    }

    let elapsed = start.elapsed();
    let mem_after = MemSnapshot::capture();

    let total_ns = elapsed.as_nanos();
    let measured = Measured {
        label: label.to_string(),
        iters,
        total_ns,
        ns_per_iter: total_ns as f64 / iters as f64,
        mem: mem_after.delta_from(&mem_before),
    };

    println!("{}", measured.render());
    Ok(measured)
}

/// Synchronous entry point: wraps `op` in [`Step::Ready`] and drives the same
/// loop on a local executor. Do not call from inside an async context; it
/// blocks the current thread.
pub fn measure_blocking<T, F>(label: &str, iters: u64, mut op: F) -> io::Result<Measured>
where
    F: FnMut() -> T,
{
    futures::executor::block_on(measure(label, iters, || Step::Ready(op())))
}

/// Scale a signed byte count to the largest unit in {B, KB, MB, GB} whose
/// magnitude stays below 1024, two decimals. Signed values are formatted
/// directly so decreases render with a leading minus.
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let sign = if bytes < 0 { "-" } else { "" };
    let mut value = bytes.unsigned_abs() as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{sign}{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::panic::{self, AssertUnwindSafe};
    use std::rc::Rc;

    #[test]
    fn test_invokes_exactly_n_times() {
        for n in [1u64, 2, 7, 100] {
            let calls = Cell::new(0u64);
            let m = measure_blocking("noop", n, || calls.set(calls.get() + 1)).unwrap();
            assert_eq!(calls.get(), n);
            assert_eq!(m.iters, n);
        }
    }

    #[test]
    fn test_mean_is_total_over_iters() {
        for n in [1u64, 3, 50] {
            let m = measure_blocking("mean", n, || ()).unwrap();
            let expected = m.total_ns as f64 / n as f64;
            assert!((m.ns_per_iter - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_zero_iterations_rejected_before_op_runs() {
        let invoked = Cell::new(false);
        let err = measure_blocking("x", 0, || invoked.set(true)).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
        assert!(!invoked.get());
    }

    #[tokio::test]
    async fn test_deferred_iterations_never_overlap() {
        let order: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        let next = Rc::new(Cell::new(0u64));

        let n = 20;
        let m = measure("sequencing", n, || {
            let order = Rc::clone(&order);
            let next = Rc::clone(&next);
            Step::deferred(async move {
                next.set(next.get() + 1);
                let entered = next.get();
                // Yield so an overlapping schedule would interleave entries.
                tokio::task::yield_now().await;
                order.borrow_mut().push(entered);
            })
        })
        .await
        .unwrap();

        assert_eq!(m.iters, n);
        let recorded = order.borrow();
        let expected: Vec<u64> = (1..=n).collect();
        assert_eq!(*recorded, expected);
    }

    #[test]
    fn test_panic_aborts_remaining_iterations() {
        let calls = Cell::new(0u64);
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            measure_blocking("panics", 5, || {
                calls.set(calls.get() + 1);
                if calls.get() == 3 {
                    panic!("boom on third call");
                }
            })
        }));
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_render_contains_label_and_deltas() {
        let m = Measured {
            label: "render.check".to_string(),
            iters: 4,
            total_ns: 8_000_000,
            ns_per_iter: 2_000_000.0,
            mem: crate::memory::MemDelta {
                heap_used: 1536,
                heap_total: 1_048_576,
                rss: -2048,
            },
        };
        let text = m.render();
        assert!(text.contains("=== render.check ==="));
        assert!(text.contains("iterations       : 4"));
        assert!(text.contains("total time       : 8.000 ms"));
        assert!(text.contains("1.50 KB"));
        assert!(text.contains("1.00 MB"));
        assert!(text.contains("-2.00 KB"));
    }

    #[test]
    fn test_format_bytes_fixed_points() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1_048_576), "1.00 MB");
        assert_eq!(format_bytes(1024_i64.pow(3)), "1.00 GB");
    }

    #[test]
    fn test_format_bytes_caps_at_gb() {
        // 4 TB still renders in GB; there is no further unit.
        assert_eq!(format_bytes(4 * 1024_i64.pow(4)), "4096.00 GB");
    }

    #[test]
    fn test_format_bytes_preserves_sign() {
        assert_eq!(format_bytes(-1024), "-1.00 KB");
        assert_eq!(format_bytes(-1536), "-1.50 KB");
        assert_eq!(format_bytes(-1), "-1.00 B");
    }

    #[test]
    fn test_runs_are_independent() {
        let a = measure_blocking("first", 10, || vec![0u8; 64]).unwrap();
        let b = measure_blocking("second", 10, || ()).unwrap();
        assert_eq!(a.iters, 10);
        assert_eq!(b.iters, 10);
        assert_ne!(a.label, b.label);
    }
}
