//! Per-chain cache of router and periphery addresses.
//!
//! Entries expire after a fixed TTL so that redeployments on the aggregation
//! service are eventually picked up.

use alloy_primitives::Address;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Contracts used to execute swaps on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainRouters {
	pub router: Address,
	pub periphery: Address,
}

#[derive(Debug, Clone)]
struct CachedRouters {
	routers: ChainRouters,
	cached_at: Instant,
}

#[derive(Debug, Clone)]
pub struct RouterCache {
	entries: Arc<DashMap<u64, CachedRouters>>,
	ttl: Duration,
}

impl Default for RouterCache {
	fn default() -> Self {
		Self::with_ttl(Duration::from_secs(60 * 60))
	}
}

impl RouterCache {
	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			entries: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Returns the cached routers for `chain_id` unless the entry has expired.
	pub fn get(&self, chain_id: u64) -> Option<ChainRouters> {
		self.entries
			.remove_if(&chain_id, |_, cached| cached.cached_at.elapsed() > self.ttl);
		self.entries.get(&chain_id).map(|cached| cached.routers)
	}

	/// Stores routers for `chain_id`, keeping a concurrent writer's fresh entry.
	pub fn insert(&self, chain_id: u64, routers: ChainRouters) -> ChainRouters {
		match self.entries.entry(chain_id) {
			Entry::Occupied(entry) if entry.get().cached_at.elapsed() <= self.ttl => {
				debug!(chain_id, "Router entry already cached by another task");
				entry.get().routers
			},
			Entry::Occupied(mut entry) => {
				entry.insert(CachedRouters {
					routers,
					cached_at: Instant::now(),
				});
				routers
			},
			Entry::Vacant(entry) => {
				entry.insert(CachedRouters {
					routers,
					cached_at: Instant::now(),
				});
				routers
			},
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
