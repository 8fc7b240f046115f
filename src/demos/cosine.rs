//! Cosine similarity toy: iterator pipeline vs. indexed loop.

use std::io;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

pub const DIM: usize = 1024;

/// Cosine similarity via zipped iterators. Returns 0.0 when either vector has
/// zero magnitude.
pub fn cosine_iter(a: &[f64], b: &[f64]) -> f64 {
    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| (dot + x * y, na + x * x, nb + y * y),
    );
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

/// Same arithmetic with explicit indexing.
pub fn cosine_indexed(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().min(b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for i in 0..len {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

fn random_vector(rng: &mut impl Rng, dim: usize) -> Vec<f64> {
    (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let a = random_vector(&mut rng, DIM);
    let b = random_vector(&mut rng, DIM);

    let mut out = Vec::new();

    {
        let m = measure("cosine.iterator", iters, || Step::ready(cosine_iter(&a, &b))).await?;
        out.push(Measurement::from_measured(&m, json!({"dim": DIM})));
    }

    {
        let m = measure("cosine.indexed", iters, || {
            Step::ready(cosine_indexed(&a, &b))
        })
        .await?;
        out.push(Measurement::from_measured(&m, json!({"dim": DIM})));
    }

    Ok(out)
}
