//! Command pattern with undo vs. direct mutation.
//!
//! Commands apply to a ledger and know how to revert themselves; the executor
//! keeps the applied stack. The baseline mutates the balance inline and undoes
//! by hand.

use std::io;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ledger {
    pub balance: i64,
}

pub trait Command {
    fn apply(&self, ledger: &mut Ledger);
    fn revert(&self, ledger: &mut Ledger);
}

pub struct Deposit(pub u64);

impl Command for Deposit {
    fn apply(&self, ledger: &mut Ledger) {
        ledger.balance += self.0 as i64;
    }

    fn revert(&self, ledger: &mut Ledger) {
        ledger.balance -= self.0 as i64;
    }
}

pub struct Withdraw(pub u64);

impl Command for Withdraw {
    fn apply(&self, ledger: &mut Ledger) {
        ledger.balance -= self.0 as i64;
    }

    fn revert(&self, ledger: &mut Ledger) {
        ledger.balance += self.0 as i64;
    }
}

#[derive(Default)]
pub struct CommandStack {
    applied: Vec<Box<dyn Command>>,
}

impl CommandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&mut self, command: Box<dyn Command>, ledger: &mut Ledger) {
        command.apply(ledger);
        self.applied.push(command);
    }

    /// Revert the most recent command, if any.
    pub fn undo_last(&mut self, ledger: &mut Ledger) -> bool {
        match self.applied.pop() {
            Some(command) => {
                command.revert(ledger);
                true
            }
            None => false,
        }
    }

    pub fn depth(&self) -> usize {
        self.applied.len()
    }
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let amounts: Vec<u64> = (0..256).map(|_| rng.gen_range(1..1_000)).collect();

    let mut out = Vec::new();

    {
        let mut ledger = Ledger::default();
        let mut stack = CommandStack::new();
        let mut cursor = 0usize;
        let m = measure("command.boxed_with_undo", iters, || {
            let amount = amounts[cursor & 255];
            cursor += 1;
            stack.execute(Box::new(Deposit(amount)), &mut ledger);
            stack.execute(Box::new(Withdraw(amount / 2)), &mut ledger);
            stack.undo_last(&mut ledger);
            stack.undo_last(&mut ledger);
            Step::ready(ledger.balance)
        })
        .await?;
        out.push(Measurement::from_measured(&m, json!({"baseline": false})));
    }

    {
        let mut balance = 0i64;
        let mut cursor = 0usize;
        let m = measure("command.direct_mutation", iters, || {
            let amount = amounts[cursor & 255];
            cursor += 1;
            balance += amount as i64;
            balance -= (amount / 2) as i64;
            // Manual undo of both steps.
            balance += (amount / 2) as i64;
            balance -= amount as i64;
            Step::ready(balance)
        })
        .await?;
        out.push(Measurement::from_measured(&m, json!({"baseline": true})));
    }

    Ok(out)
}
