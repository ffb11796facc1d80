//! Weight-budgeted least-recently-used cache.
//!
//! Every asset kind gets its own [`Cache`] instance. Entries carry a
//! caller-chosen weight (bytes for raw files, `1` for decoded items) and
//! the sum of weights never exceeds the budget: inserting evicts the least
//! recently used entries until the new one fits.
//!
//! ```
//! use horadric_types::cache::Cache;
//!
//! let mut cache = Cache::new(10);
//! cache.insert("a", 1u32, 6).unwrap();
//! cache.insert("b", 2u32, 4).unwrap();
//! cache.retrieve("a");
//! cache.insert("c", 3u32, 3).unwrap();
//! assert!(cache.contains("a"));
//! assert!(!cache.contains("b"));
//! ```

use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;
use thiserror::Error;

/// Errors returned by [`Cache`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
	/// The entry alone is heavier than the whole budget
	#[error("cache entry '{key}' weighs {weight}, budget is {budget}")]
	EntryTooLarge {
		/// Key of the rejected entry
		key: String,
		/// Weight of the rejected entry
		weight: usize,
		/// Budget of the cache
		budget: usize,
	},
}

/// Hit and eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
	/// Successful retrievals
	pub hits: u64,
	/// Retrievals of absent keys
	pub misses: u64,
	/// Entries dropped to make room
	pub evictions: u64,
}

impl CacheStats {
	/// Fraction of retrievals that hit, in `0.0..=1.0`.
	pub fn hit_ratio(&self) -> f64 {
		let total = self.hits + self.misses;
		if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
	}
}

/// Point-in-time view of a cache's occupancy.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSummary {
	/// Cache name
	pub name: String,
	/// Number of entries
	pub entries: usize,
	/// Total weight
	pub weight: usize,
	/// Budget
	pub budget: usize,
	/// Hit, miss and eviction counters
	pub stats: CacheStats,
}

impl CacheSummary {
	/// Weight as a percentage of the budget.
	pub fn usage_percent(&self) -> f64 {
		if self.budget == 0 { 0.0 } else { self.weight as f64 * 100.0 / self.budget as f64 }
	}
}

impl fmt::Display for CacheSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} cache: {:.2}% ({} entries, {} hits, {} misses)",
			self.name,
			self.usage_percent(),
			self.entries,
			self.stats.hits,
			self.stats.misses
		)
	}
}

#[derive(Debug, Clone)]
struct Entry<V> {
	value: V,
	weight: usize,
	last_used: Instant,
}

/// A budgeted cache keyed by strings.
///
/// Entries are kept in recency order: the front of the map is the least
/// recently used entry and the first to go.
#[derive(Debug, Clone)]
pub struct Cache<V> {
	name: String,
	entries: IndexMap<String, Entry<V>>,
	budget: usize,
	weight: usize,
	verbose: bool,
	stats: CacheStats,
}

impl<V: Clone> Cache<V> {
	/// Creates an empty cache.
	pub fn new(budget: usize) -> Self {
		Self::named("cache", budget)
	}

	/// Creates an empty cache with a name used in log messages.
	pub fn named(name: impl Into<String>, budget: usize) -> Self {
		Self {
			name: name.into(),
			entries: IndexMap::new(),
			budget,
			weight: 0,
			verbose: false,
			stats: CacheStats::default(),
		}
	}

	/// Inserts an entry, evicting least recently used entries until it fits.
	///
	/// An existing entry under the same key is replaced.
	///
	/// # Errors
	///
	/// Returns [`CacheError::EntryTooLarge`] if `weight` exceeds the budget.
	/// The cache is left unchanged in that case.
	pub fn insert(&mut self, key: impl Into<String>, value: V, weight: usize) -> Result<(), CacheError> {
		let key = key.into();
		if weight > self.budget {
			return Err(CacheError::EntryTooLarge {
				key,
				weight,
				budget: self.budget,
			});
		}

		if let Some(old) = self.entries.shift_remove(&key) {
			self.weight -= old.weight;
		}

		// Front of the map is the least recently used entry. Shifting it out is
		// linear in the entry count, which stays small under item-count budgets.
		while self.weight + weight > self.budget {
			let Some((evicted, entry)) = self.entries.shift_remove_index(0) else {
				break;
			};
			self.weight -= entry.weight;
			self.stats.evictions += 1;
			if self.verbose {
				log::debug!(
					"[{}] evicted '{}' (weight {}, idle {:?})",
					self.name,
					evicted,
					entry.weight,
					entry.last_used.elapsed()
				);
			}
		}

		if self.verbose {
			log::debug!(
				"[{}] cached '{}' (weight {}, total {}/{})",
				self.name,
				key,
				weight,
				self.weight + weight,
				self.budget
			);
		}
		self.entries.insert(
			key,
			Entry {
				value,
				weight,
				last_used: Instant::now(),
			},
		);
		self.weight += weight;
		Ok(())
	}

	/// Returns a clone of the entry and marks it most recently used.
	pub fn retrieve(&mut self, key: &str) -> Option<V> {
		let Some(index) = self.entries.get_index_of(key) else {
			self.stats.misses += 1;
			return None;
		};
		self.stats.hits += 1;
		let last = self.entries.len() - 1;
		// Linear like eviction
		self.entries.move_index(index, last);
		let entry = &mut self.entries[last];
		entry.last_used = Instant::now();
		Some(entry.value.clone())
	}

	/// Borrows an entry without touching recency or statistics.
	pub fn peek(&self, key: &str) -> Option<&V> {
		self.entries.get(key).map(|entry| &entry.value)
	}

	/// Whether `key` is cached.
	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Removes an entry.
	pub fn remove(&mut self, key: &str) -> Option<V> {
		let entry = self.entries.shift_remove(key)?;
		self.weight -= entry.weight;
		Some(entry.value)
	}

	/// Drops every entry. Statistics are kept.
	pub fn clear(&mut self) {
		if self.verbose {
			log::debug!("[{}] cleared {} entries", self.name, self.entries.len());
		}
		self.entries.clear();
		self.weight = 0;
	}

	/// Total weight of the cached entries.
	pub fn get_weight(&self) -> usize {
		self.weight
	}

	/// Maximum total weight.
	pub fn get_budget(&self) -> usize {
		self.budget
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the cache is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Keys from least to most recently used.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// Name used in log messages.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Enables per-operation debug logging.
	pub fn set_verbose(&mut self, verbose: bool) {
		self.verbose = verbose;
	}

	/// Whether per-operation logging is enabled.
	pub fn is_verbose(&self) -> bool {
		self.verbose
	}

	/// Hit, miss and eviction counters.
	pub fn stats(&self) -> CacheStats {
		self.stats
	}

	/// Weight as a percentage of the budget.
	pub fn usage_percent(&self) -> f64 {
		self.summary().usage_percent()
	}

	/// Snapshot of occupancy and counters.
	pub fn summary(&self) -> CacheSummary {
		CacheSummary {
			name: self.name.clone(),
			entries: self.entries.len(),
			weight: self.weight,
			budget: self.budget,
			stats: self.stats,
		}
	}
}

impl<V> fmt::Display for Cache<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {} entries, {}/{}", self.name, self.entries.len(), self.weight, self.budget)
	}
}
