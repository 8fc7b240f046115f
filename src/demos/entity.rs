//! Invariant-enforcing entity vs. plain-struct field access.
//!
//! `Account` keeps its balance private and refuses overdrafts; the baseline
//! record exposes a signed field and lets callers do whatever arithmetic they
//! like.

use std::io;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

/// Entity: balance is unsigned and can never go negative.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Account {
    balance: u64,
}

impl Account {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn deposit(&mut self, amount: u64) {
        self.balance += amount;
    }

    pub fn withdraw(&mut self, amount: u64) -> Result<(), &'static str> {
        match self.balance.checked_sub(amount) {
            Some(rest) => {
                self.balance = rest;
                Ok(())
            }
            None => Err("insufficient funds"),
        }
    }
}

/// Baseline: a bare record with no rules of its own.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AccountRecord {
    pub balance: i64,
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let amounts: Vec<u64> = (0..256).map(|_| rng.gen_range(1..500)).collect();

    let mut out = Vec::new();

    {
        let mut account = Account::new();
        let mut cursor = 0usize;
        let mut refused = 0u64;
        let m = measure("entity.guarded", iters, || {
            let amount = amounts[cursor & 255];
            cursor += 1;
            account.deposit(amount);
            // Overdraft attempts are routine input for this demo.
            if account.withdraw(amount * 2).is_err() {
                refused += 1;
            }
            Step::ready(account.balance())
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "refused": refused}),
        ));
    }

    {
        let mut record = AccountRecord::default();
        let mut cursor = 0usize;
        let m = measure("entity.plain_record", iters, || {
            let amount = amounts[cursor & 255];
            cursor += 1;
            record.balance += amount as i64;
            record.balance -= (amount * 2) as i64;
            Step::ready(record.balance)
        })
        .await?;
        out.push(Measurement::from_measured(&m, json!({"baseline": true})));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_then_withdraw() {
        let mut account = Account::new();
        account.deposit(100);
        assert_eq!(account.withdraw(40), Ok(()));
        assert_eq!(account.balance(), 60);
    }

    #[test]
    fn test_overdraft_is_refused_and_balance_unchanged() {
        let mut account = Account::new();
        account.deposit(10);
        assert_eq!(account.withdraw(11), Err("insufficient funds"));
        assert_eq!(account.balance(), 10);
    }

    #[test]
    fn test_plain_record_goes_negative() {
        let mut record = AccountRecord::default();
        record.balance += 10;
        record.balance -= 25;
        // The record has no invariant; this is exactly the hazard the entity
        // version removes.
        assert_eq!(record.balance, -15);
    }
}
