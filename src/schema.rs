use serde::{Deserialize, Serialize};

use crate::harness::Measured;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub profile: String,
    pub seed: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub name: String,

    pub iters: u64,
    pub total_ns: u128,
    pub ns_per_iter: f64,

    pub heap_used_delta: i64,
    pub heap_total_delta: i64,
    pub rss_delta: i64,

    pub extra: serde_json::Value,
}

impl Measurement {
    pub fn from_measured(m: &Measured, extra: serde_json::Value) -> Self {
        Self {
            name: m.label.clone(),
            iters: m.iters,
            total_ns: m.total_ns,
            ns_per_iter: m.ns_per_iter,
            heap_used_delta: m.mem.heap_used,
            heap_total_delta: m.mem.heap_total,
            rss_delta: m.mem.rss,
            extra,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternBenchReport {
    pub run: RunMeta,
    pub measurements: Vec<Measurement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemDelta;
    use serde_json::json;

    #[test]
    fn test_measurement_copies_deltas_unscaled() {
        let measured = Measured {
            label: "demo.case".to_string(),
            iters: 100,
            total_ns: 5_000,
            ns_per_iter: 50.0,
            mem: MemDelta {
                heap_used: -512,
                heap_total: 4096,
                rss: 0,
            },
        };
        let m = Measurement::from_measured(&measured, json!({"kind": "pattern"}));
        assert_eq!(m.name, "demo.case");
        assert_eq!(m.heap_used_delta, -512);
        assert_eq!(m.heap_total_delta, 4096);
        assert_eq!(m.rss_delta, 0);
    }

    #[test]
    fn test_report_round_trips_as_json() {
        let report = PatternBenchReport {
            run: RunMeta {
                schema_version: 1,
                bench_version: "0.3.0".to_string(),
                profile: "quick".to_string(),
                seed: 7,
                timestamp_utc: "unix:0".to_string(),
                git_sha: None,
            },
            measurements: vec![],
        };
        let json = serde_json::to_string(&report).unwrap();
        let back: PatternBenchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run.seed, 7);
        assert_eq!(back.run.profile, "quick");
    }
}
