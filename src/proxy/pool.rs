//! Validated proxy pool with round-robin and random selection

use crate::proxy::ProxyEndpoint;
use crate::ProxyError;
use rand::Rng;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Strategy used to pick a proxy for each fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationStrategy {
    #[default]
    RoundRobin,
    Random,
}

impl RotationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::Random => "random",
        }
    }
}

impl FromStr for RotationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "round-robin" | "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => Err(format!(
                "unknown rotation strategy '{}', expected 'round-robin' or 'random'",
                other
            )),
        }
    }
}

/// A non-empty set of validated proxies
///
/// The endpoint list never changes after construction. The only mutable state
/// is the round-robin cursor, which is advanced atomically so the pool can be
/// shared by any number of concurrent fetches.
#[derive(Debug)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
    cursor: AtomicUsize,
}

impl ProxyPool {
    /// Creates a pool from proxies that already passed validation
    ///
    /// # Returns
    ///
    /// * `Ok(ProxyPool)` - Pool with the cursor on the first endpoint
    /// * `Err(ProxyError::EmptyPool)` - No endpoints were given
    pub fn from_validated(endpoints: Vec<ProxyEndpoint>) -> Result<Self, ProxyError> {
        if endpoints.is_empty() {
            return Err(ProxyError::EmptyPool);
        }

        Ok(Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Returns the next endpoint in round-robin order
    ///
    /// Read and advance happen in a single atomic update, so concurrent callers
    /// each get their own slot.
    pub fn next(&self) -> &ProxyEndpoint {
        let len = self.endpoints.len();
        let slot = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % len))
        {
            Ok(previous) | Err(previous) => previous,
        };
        &self.endpoints[slot]
    }

    /// Returns a uniformly chosen endpoint without moving the cursor
    pub fn random(&self) -> &ProxyEndpoint {
        let index = rand::thread_rng().gen_range(0..self.endpoints.len());
        &self.endpoints[index]
    }

    /// Picks an endpoint using the given strategy
    pub fn select(&self, strategy: RotationStrategy) -> &ProxyEndpoint {
        match strategy {
            RotationStrategy::RoundRobin => self.next(),
            RotationStrategy::Random => self.random(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoints(&self) -> &[ProxyEndpoint] {
        &self.endpoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn endpoints(n: usize) -> Vec<ProxyEndpoint> {
        (0..n)
            .map(|i| ProxyEndpoint::normalize(&format!("10.0.0.{}:8080", i + 1)).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_pool_rejected() {
        let result = ProxyPool::from_validated(Vec::new());
        assert!(matches!(result, Err(ProxyError::EmptyPool)));
    }

    #[test]
    fn test_round_robin_order_and_wrap() {
        let input = endpoints(3);
        let pool = ProxyPool::from_validated(input.clone()).unwrap();

        let first_cycle: Vec<ProxyEndpoint> = (0..3).map(|_| pool.next().clone()).collect();
        assert_eq!(first_cycle, input);

        assert_eq!(pool.next(), &input[0]);
        assert_eq!(pool.next(), &input[1]);
    }

    #[test]
    fn test_single_endpoint_pool() {
        let input = endpoints(1);
        let pool = ProxyPool::from_validated(input.clone()).unwrap();

        for _ in 0..5 {
            assert_eq!(pool.next(), &input[0]);
        }
    }

    #[test]
    fn test_random_stays_in_pool_and_keeps_cursor() {
        let input = endpoints(4);
        let pool = ProxyPool::from_validated(input.clone()).unwrap();

        assert_eq!(pool.next(), &input[0]);
        for _ in 0..50 {
            assert!(input.contains(pool.random()));
        }
        assert_eq!(pool.next(), &input[1]);
    }

    #[test]
    fn test_select_dispatches_on_strategy() {
        let input = endpoints(2);
        let pool = ProxyPool::from_validated(input.clone()).unwrap();

        assert_eq!(pool.select(RotationStrategy::RoundRobin), &input[0]);
        assert!(input.contains(pool.select(RotationStrategy::Random)));
        assert_eq!(pool.select(RotationStrategy::RoundRobin), &input[1]);
    }

    #[test]
    fn test_concurrent_next_is_balanced() {
        const POOL_SIZE: usize = 4;
        const THREADS: usize = 8;
        const CALLS: usize = 100;

        let pool = ProxyPool::from_validated(endpoints(POOL_SIZE)).unwrap();

        let per_thread: Vec<Vec<ProxyEndpoint>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| (0..CALLS).map(|_| pool.next().clone()).collect::<Vec<_>>())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut counts: HashMap<ProxyEndpoint, usize> = HashMap::new();
        for endpoint in per_thread.into_iter().flatten() {
            *counts.entry(endpoint).or_default() += 1;
        }

        let total: usize = counts.values().sum();
        assert_eq!(total, THREADS * CALLS);
        assert_eq!(counts.len(), POOL_SIZE);
        for count in counts.values() {
            assert_eq!(*count, THREADS * CALLS / POOL_SIZE);
        }
    }

    #[test]
    fn test_rotation_strategy_from_str() {
        assert_eq!(
            "round-robin".parse::<RotationStrategy>(),
            Ok(RotationStrategy::RoundRobin)
        );
        assert_eq!(
            "Round_Robin".parse::<RotationStrategy>(),
            Ok(RotationStrategy::RoundRobin)
        );
        assert_eq!(
            "random".parse::<RotationStrategy>(),
            Ok(RotationStrategy::Random)
        );
        assert!("least-conn".parse::<RotationStrategy>().is_err());
    }

    #[test]
    fn test_rotation_strategy_as_str() {
        assert_eq!(RotationStrategy::RoundRobin.as_str(), "round-robin");
        assert_eq!(RotationStrategy::Random.as_str(), "random");
    }
}
