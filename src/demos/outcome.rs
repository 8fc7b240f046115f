//! Result-returning error handling vs. panic-and-catch.
//!
//! Both sides parse the same mixed batch of price strings. The Result path
//! matches on the error; the unwind path panics on bad input and traps it with
//! `catch_unwind` inside the operation closure, so expected failures never
//! reach the harness. The default panic hook is silenced for the duration of
//! that run to keep stderr readable.

use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    NonNumeric,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty price"),
            ParseError::NonNumeric => write!(f, "price is not a number"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a price in cents, reporting failure as a value.
pub fn parse_price(input: &str) -> Result<u64, ParseError> {
    if input.is_empty() {
        return Err(ParseError::Empty);
    }
    input.parse::<u64>().map_err(|_| ParseError::NonNumeric)
}

/// Same parse, failure as a panic.
pub fn parse_price_or_panic(input: &str) -> u64 {
    if input.is_empty() {
        panic!("empty price");
    }
    match input.parse::<u64>() {
        Ok(v) => v,
        Err(_) => panic!("price is not a number: {input}"),
    }
}

fn sample_inputs(rng: &mut impl Rng, count: usize) -> Vec<String> {
    (0..count)
        .map(|_| match rng.gen_range(0..10u32) {
            // Two bad inputs in ten.
            0 => String::new(),
            1 => "4x99".to_string(),
            _ => rng.gen_range(1..100_000u64).to_string(),
        })
        .collect()
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let inputs = sample_inputs(&mut rng, 256);

    let mut out = Vec::new();

    {
        let mut cursor = 0usize;
        let mut failures = 0u64;
        let m = measure("outcome.result", iters, || {
            let input = &inputs[cursor & 255];
            cursor += 1;
            let value = match parse_price(input) {
                Ok(v) => v,
                Err(_) => {
                    failures += 1;
                    0
                }
            };
            Step::ready(value)
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "failures": failures}),
        ));
    }

    {
        let mut cursor = 0usize;
        let mut failures = 0u64;
        let previous_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let result = measure("outcome.catch_unwind", iters, || {
            let input = &inputs[cursor & 255];
            cursor += 1;
            let value = match panic::catch_unwind(AssertUnwindSafe(|| parse_price_or_panic(input)))
            {
                Ok(v) => v,
                Err(_) => {
                    failures += 1;
                    0
                }
            };
            Step::ready(value)
        })
        .await;
        panic::set_hook(previous_hook);
        let m = result?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": true, "failures": failures}),
        ));
    }

    Ok(out)
}
