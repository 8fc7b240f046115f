//! Dependency injection vs. a hard-wired collaborator.
//!
//! `Checkout` totals a cart against an injected `PriceSource` trait object.
//! The baseline owns its price map directly. A third case drives the injected
//! source through the harness's deferred path, standing in for a price lookup
//! that completes asynchronously.

use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

pub trait PriceSource {
    /// Unit price in cents; unknown SKUs price at zero.
    fn price(&self, sku: &str) -> u64;
}

pub struct FixedPriceSource {
    prices: HashMap<String, u64>,
}

impl FixedPriceSource {
    pub fn new(prices: HashMap<String, u64>) -> Self {
        Self { prices }
    }
}

impl PriceSource for FixedPriceSource {
    fn price(&self, sku: &str) -> u64 {
        self.prices.get(sku).copied().unwrap_or(0)
    }
}

pub struct Checkout {
    source: Box<dyn PriceSource>,
}

impl Checkout {
    pub fn new(source: Box<dyn PriceSource>) -> Self {
        Self { source }
    }

    pub fn total<'a>(&self, items: impl IntoIterator<Item = &'a str>) -> u64 {
        items.into_iter().map(|sku| self.source.price(sku)).sum()
    }
}

/// Baseline with the price map wired in directly.
pub struct CheckoutDirect {
    prices: HashMap<String, u64>,
}

impl CheckoutDirect {
    pub fn new(prices: HashMap<String, u64>) -> Self {
        Self { prices }
    }

    pub fn total<'a>(&self, items: impl IntoIterator<Item = &'a str>) -> u64 {
        items
            .into_iter()
            .map(|sku| self.prices.get(sku).copied().unwrap_or(0))
            .sum()
    }
}

fn price_table(rng: &mut impl Rng, skus: &[String]) -> HashMap<String, u64> {
    skus.iter()
        .map(|sku| (sku.clone(), rng.gen_range(100..10_000)))
        .collect()
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();

    let skus: Vec<String> = (0..32).map(|i| format!("sku-{i:04}")).collect();
    let prices = price_table(&mut rng, &skus);
    let cart: Vec<String> = (0..8)
        .map(|_| skus[rng.gen_range(0..skus.len())].clone())
        .collect();

    let mut out = Vec::new();

    {
        let checkout = Checkout::new(Box::new(FixedPriceSource::new(prices.clone())));
        let m = measure("injection.trait_object", iters, || {
            Step::ready(checkout.total(cart.iter().map(String::as_str)))
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "cart_size": cart.len()}),
        ));
    }

    {
        let checkout = CheckoutDirect::new(prices.clone());
        let m = measure("injection.hard_wired", iters, || {
            Step::ready(checkout.total(cart.iter().map(String::as_str)))
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": true, "cart_size": cart.len()}),
        ));
    }

    {
        let checkout = Rc::new(Checkout::new(Box::new(FixedPriceSource::new(prices))));
        let cart = Rc::new(cart);
        let m = measure("injection.trait_object_deferred", iters, || {
            let checkout = Rc::clone(&checkout);
            let cart = Rc::clone(&cart);
            Step::deferred(async move {
                tokio::task::yield_now().await;
                checkout.total(cart.iter().map(String::as_str))
            })
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "deferred": true}),
        ));
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> HashMap<String, u64> {
        HashMap::from([("a".to_string(), 100), ("b".to_string(), 250)])
    }

    #[test]
    fn test_injected_and_direct_totals_agree() {
        let injected = Checkout::new(Box::new(FixedPriceSource::new(table())));
        let direct = CheckoutDirect::new(table());

        let items = ["a", "b", "b"];
        assert_eq!(injected.total(items), 600);
        assert_eq!(direct.total(items), 600);
    }

    #[test]
    fn test_unknown_sku_prices_at_zero() {
        let checkout = Checkout::new(Box::new(FixedPriceSource::new(table())));
        assert_eq!(checkout.total(["missing"]), 0);
        assert_eq!(checkout.total(["a", "missing"]), 100);
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let checkout = CheckoutDirect::new(table());
        assert_eq!(checkout.total([]), 0);
    }
}
