// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reuse of built color ramps across paints and frames.
//!
//! Building a [`ColorRamp`] costs a few hundred to a few thousand color
//! interpolations. Documents tend to repeat the same gradients, so the
//! [`RampCache`] keys ramps by their exact inputs and hands out shared
//! [`Arc`]s. Entries carry the epoch in which they were last requested;
//! [`RampCache::advance`] ends an epoch and drops entries that sat idle for
//! too long. Within an epoch, capacity eviction follows request order.

use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::cycle::CycleMethod;
use crate::error::RampError;
use crate::ramp::{ColorRamp, GradientStop, InterpolationSpace};

/// Tuning for a [`RampCache`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RampCacheConfig {
    /// Maximum number of ramps kept at once.
    ///
    /// When full, the least recently used ramp is dropped to make room.
    pub capacity: usize,
    /// Number of epochs an unused ramp survives [`RampCache::advance`].
    ///
    /// `0` drops everything that was not requested in the epoch being ended.
    pub max_idle_epochs: u64,
}

impl Default for RampCacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            max_idle_epochs: 2,
        }
    }
}

/// Exact inputs of a ramp; offsets are compared by bit pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct RampKey {
    stops: Vec<(u32, u32)>,
    space: InterpolationSpace,
    cycle: CycleMethod,
}

impl RampKey {
    fn new(stops: &[GradientStop], space: InterpolationSpace, cycle: CycleMethod) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|s| {
                    let c = s.color;
                    (s.offset.to_bits(), u32::from_be_bytes([c.r, c.g, c.b, c.a]))
                })
                .collect(),
            space,
            cycle,
        }
    }
}

#[derive(Debug)]
struct CachedRamp {
    ramp: Arc<ColorRamp>,
    /// Epoch of the last request, for idle eviction.
    last_used: u64,
    /// Value of the access counter at the last request, for capacity eviction.
    last_access: u64,
}

/// A cache of shared [`ColorRamp`]s keyed by stops, color space and cycle method.
#[derive(Debug, Default)]
pub struct RampCache {
    config: RampCacheConfig,
    entries: HashMap<RampKey, CachedRamp>,
    epoch: u64,
    /// Bumped on every hit and insert.
    access: u64,
}

impl RampCache {
    /// Creates an empty cache with the given configuration.
    #[must_use]
    pub fn new(config: RampCacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            epoch: 0,
            access: 0,
        }
    }

    /// The configuration this cache was created with.
    #[must_use]
    pub fn config(&self) -> RampCacheConfig {
        self.config
    }

    /// Returns the cached ramp for these inputs, building it on a miss.
    ///
    /// Invalid stop lists are reported every time and never cached.
    pub fn get_or_build(
        &mut self,
        stops: &[GradientStop],
        space: InterpolationSpace,
        cycle: CycleMethod,
    ) -> Result<Arc<ColorRamp>, RampError> {
        let key = RampKey::new(stops, space, cycle);
        self.access += 1;
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = self.epoch;
            entry.last_access = self.access;
            log::trace!("ramp cache hit ({} stops)", stops.len());
            return Ok(Arc::clone(&entry.ramp));
        }

        let ramp = Arc::new(ColorRamp::new(stops, space, cycle)?);
        if self.config.capacity == 0 {
            return Ok(ramp);
        }
        if self.entries.len() >= self.config.capacity {
            self.evict_least_recently_used();
        }
        log::trace!("ramp cache miss ({} stops)", stops.len());
        self.entries.insert(
            key,
            CachedRamp {
                ramp: Arc::clone(&ramp),
                last_used: self.epoch,
                last_access: self.access,
            },
        );
        Ok(ramp)
    }

    /// Ends the current epoch, dropping ramps idle for more than
    /// [`RampCacheConfig::max_idle_epochs`] epochs.
    ///
    /// Ramps still referenced elsewhere stay alive through their [`Arc`].
    pub fn advance(&mut self) {
        let before = self.entries.len();
        let oldest_kept = self.epoch.saturating_sub(self.config.max_idle_epochs);
        self.entries.retain(|_, entry| entry.last_used >= oldest_kept);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            log::debug!(
                "ramp cache epoch {}: evicted {evicted}, kept {}",
                self.epoch,
                self.entries.len()
            );
        }
        self.epoch += 1;
    }

    fn evict_least_recently_used(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// The current epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of cached ramps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no ramps are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached ramp. The epoch counter is kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
