//! Composed validators vs. inline checks.

use std::io;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

#[derive(Debug, Clone)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub age: u32,
}

pub type Validator = Box<dyn Fn(&SignupForm) -> Result<(), &'static str>>;

/// Ordered list of checks; the first failure short-circuits.
#[derive(Default)]
pub struct ValidatorSet {
    checks: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, check: Validator) -> Self {
        self.checks.push(check);
        self
    }

    pub fn validate(&self, form: &SignupForm) -> Result<(), &'static str> {
        for check in &self.checks {
            check(form)?;
        }
        Ok(())
    }
}

pub fn username_present(form: &SignupForm) -> Result<(), &'static str> {
    if form.username.is_empty() {
        Err("username required")
    } else {
        Ok(())
    }
}

pub fn email_has_at_sign(form: &SignupForm) -> Result<(), &'static str> {
    if form.email.contains('@') {
        Ok(())
    } else {
        Err("email malformed")
    }
}

pub fn age_is_adult(form: &SignupForm) -> Result<(), &'static str> {
    if form.age >= 18 {
        Ok(())
    } else {
        Err("must be 18+")
    }
}

pub fn standard_set() -> ValidatorSet {
    ValidatorSet::new()
        .with(Box::new(username_present))
        .with(Box::new(email_has_at_sign))
        .with(Box::new(age_is_adult))
}

/// Baseline: the same three checks, written out by hand.
pub fn validate_inline(form: &SignupForm) -> Result<(), &'static str> {
    if form.username.is_empty() {
        return Err("username required");
    }
    if !form.email.contains('@') {
        return Err("email malformed");
    }
    if form.age < 18 {
        return Err("must be 18+");
    }
    Ok(())
}

fn sample_forms(rng: &mut impl Rng, count: usize) -> Vec<SignupForm> {
    (0..count)
        .map(|i| SignupForm {
            username: if rng.gen_ratio(9, 10) {
                format!("user{i}")
            } else {
                String::new()
            },
            email: if rng.gen_ratio(9, 10) {
                format!("user{i}@example.com")
            } else {
                "not-an-email".to_string()
            },
            age: rng.gen_range(10..80),
        })
        .collect()
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let forms = sample_forms(&mut rng, 256);

    let mut out = Vec::new();

    {
        let set = standard_set();
        let mut cursor = 0usize;
        let mut rejected = 0u64;
        let m = measure("validation.composed", iters, || {
            let form = &forms[cursor & 255];
            cursor += 1;
            // Invalid forms are expected input, not harness failures.
            if set.validate(form).is_err() {
                rejected += 1;
            }
            Step::ready(rejected)
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "rejected": rejected}),
        ));
    }

    {
        let mut cursor = 0usize;
        let mut rejected = 0u64;
        let m = measure("validation.inline", iters, || {
            let form = &forms[cursor & 255];
            cursor += 1;
            if validate_inline(form).is_err() {
                rejected += 1;
            }
            Step::ready(rejected)
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": true, "rejected": rejected}),
        ));
    }

    Ok(out)
}
