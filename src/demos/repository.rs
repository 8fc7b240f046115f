//! Repository pattern vs. direct map manipulation.
//!
//! The pattern side hides a `HashMap` behind a trait object; the baseline
//! performs the same insert/get/remove cycle on the map inline.

use std::collections::HashMap;
use std::io;

use rand::Rng;
use serde_json::json;

use crate::harness::{measure, BenchConfig, Step};
use crate::schema::Measurement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub active: bool,
}

pub trait UserRepository {
    fn insert(&mut self, name: &str) -> u64;
    fn get(&self, id: u64) -> Option<&User>;
    fn set_active(&mut self, id: u64, active: bool) -> bool;
    fn remove(&mut self, id: u64) -> Option<User>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    next_id: u64,
    users: HashMap<u64, User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&mut self, name: &str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
                active: true,
            },
        );
        id
    }

    fn get(&self, id: u64) -> Option<&User> {
        self.users.get(&id)
    }

    fn set_active(&mut self, id: u64, active: bool) -> bool {
        match self.users.get_mut(&id) {
            Some(user) => {
                user.active = active;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: u64) -> Option<User> {
        self.users.remove(&id)
    }

    fn len(&self) -> usize {
        self.users.len()
    }
}

pub async fn run(cfg: &BenchConfig) -> io::Result<Vec<Measurement>> {
    let iters = cfg.iters();
    let mut rng = cfg.rng();
    let names: Vec<String> = (0..64).map(|_| format!("user-{:08x}", rng.gen::<u32>())).collect();

    let mut out = Vec::new();

    {
        let mut repo: Box<dyn UserRepository> = Box::new(InMemoryUserRepository::new());
        let mut cursor = 0usize;
        let m = measure("repository.trait_object", iters, || {
            let name = &names[cursor & 63];
            cursor += 1;
            let id = repo.insert(name);
            let present = repo.get(id).is_some();
            repo.set_active(id, false);
            repo.remove(id);
            Step::ready(present)
        })
        .await?;
        out.push(Measurement::from_measured(&m, json!({"baseline": false})));
    }

    {
        let mut users: HashMap<u64, User> = HashMap::new();
        let mut next_id = 0u64;
        let mut cursor = 0usize;
        let m = measure("repository.direct_map", iters, || {
            let name = &names[cursor & 63];
            cursor += 1;
            next_id += 1;
            users.insert(
                next_id,
                User {
                    id: next_id,
                    name: name.clone(),
                    active: true,
                },
            );
            let present = users.contains_key(&next_id);
            if let Some(user) = users.get_mut(&next_id) {
                user.active = false;
            }
            users.remove(&next_id);
            Step::ready(present)
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
    fn test_insert_assigns_fresh_ids() {
        let mut repo = InMemoryUserRepository::new();
        let a = repo.insert("alice");
        let b = repo.insert("bob");
        assert_ne!(a, b);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get(a).unwrap().name, "alice");
    }

    #[test]
    fn test_set_active_on_missing_user() {
        let mut repo = InMemoryUserRepository::new();
        assert!(!repo.set_active(42, false));

        let id = repo.insert("carol");
        assert!(repo.set_active(id, false));
        assert!(!repo.get(id).unwrap().active);
    }

    #[test]
    fn test_remove_returns_the_user() {
        let mut repo = InMemoryUserRepository::new();
        let id = repo.insert("dave");
        let removed = repo.remove(id).unwrap();
        assert_eq!(removed.name, "dave");
        assert!(repo.get(id).is_none());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_trait_object_cycle_through_harness() {
        let mut repo: Box<dyn UserRepository> = Box::new(InMemoryUserRepository::new());
        let m = measure("repository.smoke", 10, || {
            let id = repo.insert("x");
            Step::ready(repo.remove(id).is_some())
        })
        .await
        .unwrap();
        assert_eq!(m.iters, 10);
        assert!(repo.is_empty());
    }
}
