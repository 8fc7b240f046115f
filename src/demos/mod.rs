//! Demo call sites.
//!
//! Each module pairs a pattern implementation with a naive baseline and drives
//! both through the shared harness. Demos own all of their state; nothing here
//! is shared across modules or across runs.

use std::io;

use crate::harness::BenchConfig;
use crate::schema::Measurement;
use crate::DemoVariant;

pub mod chain;
pub mod command;
pub mod cosine;
pub mod entity;
pub mod injection;
pub mod outcome;
pub mod repository;
pub mod validation;

/// Run the selected demo family (or all of them) and collect measurements.
pub async fn run_variant(cfg: &BenchConfig, variant: DemoVariant) -> io::Result<Vec<Measurement>> {
    use DemoVariant as V;

    let run_repository = matches!(variant, V::All | V::Repository);
    let run_injection = matches!(variant, V::All | V::Injection);
    let run_command = matches!(variant, V::All | V::Command);
    let run_chain = matches!(variant, V::All | V::Chain);
    let run_validation = matches!(variant, V::All | V::Validation);
    let run_entity = matches!(variant, V::All | V::Entity);
    let run_outcome = matches!(variant, V::All | V::Outcome);
    let run_cosine = matches!(variant, V::All | V::Cosine);

    let mut out = Vec::new();

    if run_repository {
        out.extend(repository::run(cfg).await?);
    }
    if run_injection {
        out.extend(injection::run(cfg).await?);
    }
    if run_command {
        out.extend(command::run(cfg).await?);
    }
    if run_chain {
        out.extend(chain::run(cfg).await?);
    }
    if run_validation {
        out.extend(validation::run(cfg).await?);
    }
    if run_entity {
        out.extend(entity::run(cfg).await?);
    }
    if run_outcome {
        out.extend(outcome::run(cfg).await?);
    }
    if run_cosine {
        out.extend(cosine::run(cfg).await?);
    }

    Ok(out)
}
