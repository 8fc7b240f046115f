//! Chain of responsibility vs. one monolithic function.
//!
//! A request walks an ordered list of boxed handlers (auth, rate limit,
//! routing); any handler may deny it. The baseline folds the same checks into
//! a single function. The rate limiter owns its per-user counters and models
//! window reset as an explicit schedule-and-cancel deadline checked on access,
//! not a background timer.

use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

#[derive(Debug, Clone)]
pub struct Request {
    pub user: String,
    pub path: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Next,
    Deny(&'static str),
}

pub trait Handler {
    fn handle(&mut self, request: &Request) -> Decision;
}

/// Pending window reset; cancelling it extends the current window until the
/// next scheduled deadline.
#[derive(Debug, Clone, Copy)]
pub struct WindowReset {
    pub deadline: Instant,
}

/// Fixed-window rate limiter. Counters live on the instance, so independent
/// limiters never observe each other.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    counts: HashMap<String, u32>,
    reset: Option<WindowReset>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            counts: HashMap::new(),
            reset: None,
        }
    }

    pub fn allow(&mut self, user: &str) -> bool {
        self.allow_at(user, Instant::now())
    }

    /// Deterministic entry point: the caller supplies "now".
    pub fn allow_at(&mut self, user: &str, now: Instant) -> bool {
        if self.reset.is_some_and(|r| now >= r.deadline) {
            self.counts.clear();
            self.reset = None;
        }
        if self.reset.is_none() {
            self.reset = Some(WindowReset {
                deadline: now + self.window,
            });
        }

        let seen = self.counts.entry(user.to_string()).or_insert(0);
        *seen += 1;
        *seen <= self.limit
    }

    /// Cancel the pending reset; counts survive past the old deadline until a
    /// new window is scheduled by the next access.
    pub fn cancel_reset(&mut self) -> Option<WindowReset> {
        self.reset.take()
    }

    pub fn scheduled_reset(&self) -> Option<WindowReset> {
        self.reset
    }
}

pub struct AuthHandler;

impl Handler for AuthHandler {
    fn handle(&mut self, request: &Request) -> Decision {
        match &request.token {
            Some(token) if !token.is_empty() => Decision::Next,
            _ => Decision::Deny("missing token"),
        }
    }
}

pub struct RateLimitHandler {
    pub limiter: RateLimiter,
}

impl Handler for RateLimitHandler {
    fn handle(&mut self, request: &Request) -> Decision {
        if self.limiter.allow(&request.user) {
            Decision::Next
        } else {
            Decision::Deny("rate limited")
        }
    }
}

pub struct RouteHandler;

impl Handler for RouteHandler {
    fn handle(&mut self, request: &Request) -> Decision {
        if request.path.starts_with('/') {
            Decision::Next
        } else {
            Decision::Deny("unknown route")
        }
    }
}

#[derive(Default)]
pub struct Pipeline {
    handlers: Vec<Box<dyn Handler>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, handler: Box<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// First denial wins; `Ok` means every handler passed the request on.
    pub fn dispatch(&mut self, request: &Request) -> Result<(), &'static str> {
        for handler in &mut self.handlers {
            if let Decision::Deny(reason) = handler.handle(request) {
                return Err(reason);
            }
        }
        Ok(())
    }
}

/// Baseline: the same checks, one function, its own limiter state.
pub struct MonolithicGate {
    limiter: RateLimiter,
}

impl MonolithicGate {
    pub fn new(limiter: RateLimiter) -> Self {
        Self { limiter }
    }

    pub fn dispatch(&mut self, request: &Request) -> Result<(), &'static str> {
        match &request.token {
            Some(token) if !token.is_empty() => {}
            _ => return Err("missing token"),
        }
        if !self.limiter.allow(&request.user) {
            return Err("rate limited");
        }
        if !request.path.starts_with('/') {
            return Err("unknown route");
        }
        Ok(())
    }
}

fn sample_requests(rng: &mut impl Rng, count: usize) -> Vec<Request> {
    let users = ["ana", "bo", "cy", "dee"];
    (0..count)
        .map(|i| Request {
            user: users[rng.gen_range(0..users.len())].to_string(),
            path: if rng.gen_ratio(9, 10) {
                format!("/orders/{i}")
            } else {
                "no-leading-slash".to_string()
            },
            // One request in ten arrives unauthenticated.
            token: if rng.gen_ratio(9, 10) {
                Some("tok".to_string())
            } else {
                None
            },
        })
        .collect()
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let requests = sample_requests(&mut rng, 256);
    let window = Duration::from_secs(60);

    let mut out = Vec::new();

    {
        let mut pipeline = Pipeline::new()
            .push(Box::new(AuthHandler))
            .push(Box::new(RateLimitHandler {
                limiter: RateLimiter::new(u32::MAX, window),
            }))
            .push(Box::new(RouteHandler));
        let mut cursor = 0usize;
        let mut denied = 0u64;
        let m = measure("chain.handler_pipeline", iters, || {
            let request = &requests[cursor & 255];
            cursor += 1;
            // Denials are routine here; count them instead of escaping.
            if pipeline.dispatch(request).is_err() {
                denied += 1;
            }
            Step::ready(denied)
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": false, "denied": denied}),
        ));
    }

    {
        let mut gate = MonolithicGate::new(RateLimiter::new(u32::MAX, window));
        let mut cursor = 0usize;
        let mut denied = 0u64;
        let m = measure("chain.monolithic", iters, || {
            let request = &requests[cursor & 255];
            cursor += 1;
            if gate.dispatch(request).is_err() {
                denied += 1;
            }
            Step::ready(denied)
        })
        .await?;
        out.push(Measurement::from_measured(
            &m,
            json!({"baseline": true, "denied": denied}),
        ));
    }

    Ok(out)
}
