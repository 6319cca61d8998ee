//! Memoization for text measuring, shaping and squashing.
//!
//! Measuring and shaping are pure, so their entries are keyed by the full
//! input and never go stale. Squash results depend on the tree, which is
//! rebuilt every pass; they carry the epoch they were computed in and read
//! as absent once the epoch moves on.

use super::measure::{measure, wrap_or_truncate, Size};
use super::squash::squash;
use crate::error::Result;
use crate::node::{Node, NodeId};
use crate::style::TextWrap;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Hit/miss counters for one cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to compute.
    pub misses: u64,
}

impl CacheStats {
    #[inline]
    fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }
}

/// Memoized [`measure`] and [`wrap_or_truncate`].
#[derive(Debug, Default)]
pub struct MeasurementCache {
    measured: FxHashMap<String, Size>,
    // Keyed by shape first so lookups borrow the text instead of cloning it.
    shaped: FxHashMap<(usize, TextWrap), FxHashMap<String, Arc<str>>>,
    measure_stats: CacheStats,
    shape_stats: CacheStats,
}

impl MeasurementCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Measure `text`, memoized.
    pub fn measure(&mut self, text: &str) -> Size {
        if let Some(size) = self.measured.get(text) {
            self.measure_stats.record(true);
            return *size;
        }
        self.measure_stats.record(false);
        let size = measure(text);
        self.measured.insert(text.to_owned(), size);
        size
    }

    /// Shape `text` to `max_width` with `mode`, memoized.
    pub fn shape(&mut self, text: &str, max_width: usize, mode: TextWrap) -> Arc<str> {
        let table = self.shaped.entry((max_width, mode)).or_default();
        if let Some(shaped) = table.get(text) {
            self.shape_stats.record(true);
            return Arc::clone(shaped);
        }
        self.shape_stats.record(false);
        let shaped: Arc<str> = wrap_or_truncate(text, max_width, mode).into();
        table.insert(text.to_owned(), Arc::clone(&shaped));
        shaped
    }

    /// Counters for [`MeasurementCache::measure`].
    pub const fn measure_stats(&self) -> CacheStats {
        self.measure_stats
    }

    /// Counters for [`MeasurementCache::shape`].
    pub const fn shape_stats(&self) -> CacheStats {
        self.shape_stats
    }

    /// Number of memoized entries across both tables.
    pub fn len(&self) -> usize {
        self.measured.len() + self.shaped.values().map(FxHashMap::len).sum::<usize>()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Squash results per node, valid for a single epoch.
#[derive(Debug, Default)]
pub struct SquashCache {
    epoch: u64,
    entries: FxHashMap<NodeId, (u64, Arc<str>)>,
    stats: CacheStats,
}

impl SquashCache {
    /// Create an empty cache at epoch 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current epoch.
    #[inline]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Move to the next epoch, invalidating every entry at once.
    pub fn advance(&mut self) -> u64 {
        self.epoch = self.epoch.wrapping_add(1);
        self.epoch
    }

    /// The squashed text of `id` if it was computed in the current epoch.
    pub fn get(&mut self, id: NodeId) -> Option<Arc<str>> {
        let hit = match self.entries.get(&id) {
            Some((epoch, text)) if *epoch == self.epoch => Some(Arc::clone(text)),
            _ => None,
        };
        self.stats.record(hit.is_some());
        hit
    }

    /// Store the squashed text of `id` for the current epoch.
    pub fn insert(&mut self, id: NodeId, text: Arc<str>) {
        if id != NodeId::ANONYMOUS {
            self.entries.insert(id, (self.epoch, text));
        }
    }

    /// Lookup counters.
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

/// Both text caches of one render target.
#[derive(Debug, Default)]
pub struct TextCache {
    /// Pure measuring and shaping.
    pub measurements: MeasurementCache,
    /// Per-pass squash results.
    pub squashes: SquashCache,
}

impl TextCache {
    /// Create empty caches at epoch 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current epoch.
    #[inline]
    pub const fn epoch(&self) -> u64 {
        self.squashes.epoch()
    }

    /// Start a new pass: squash results from earlier passes read as absent.
    pub fn advance_epoch(&mut self) -> u64 {
        self.squashes.advance()
    }

    /// Squash a text node, reusing this epoch's result if there is one.
    pub fn squash(&mut self, node: &Node) -> Result<Arc<str>> {
        squash(node, &mut self.squashes)
    }

    /// Size of a text node's content when given at most `max_width` cells.
    ///
    /// Text that fits is measured as is; wider text is measured after
    /// shaping with the node's wrap mode.
    pub fn measure_text_node(&mut self, node: &Node, max_width: usize) -> Result<Size> {
        let text = self.squash(node)?;
        let size = self.measurements.measure(&text);
        if size.width <= max_width {
            return Ok(size);
        }
        let shaped = self.measurements.shape(&text, max_width, node.style.text_wrap);
        Ok(self.measurements.measure(&shaped))
    }
}
