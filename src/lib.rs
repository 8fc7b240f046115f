use clap::ValueEnum;

pub mod demos;
pub mod harness;
pub mod memory;
pub mod schema;

/// Demo family to run.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum DemoVariant {
    /// Run every demo family.
    All,
    /// Trait-object repository vs. direct map CRUD.
    Repository,
    /// Injected trait dependency vs. hard-wired collaborator.
    Injection,
    /// Boxed command objects with undo vs. direct mutation.
    Command,
    /// Chain-of-responsibility pipeline vs. one monolithic function.
    Chain,
    /// Composed validator list vs. inline checks.
    Validation,
    /// Invariant-enforcing entity vs. plain-struct field access.
    Entity,
    /// Result-returning fallible path vs. panic-and-catch.
    Outcome,
    /// Cosine similarity, iterator pipeline vs. indexed loop.
    Cosine,
}
