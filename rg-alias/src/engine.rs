//! Aliasing engine: groups resources with non-overlapping lifetimes into
//! shared memory pools using best-fit interval scheduling subject to
//! memory-requirement compatibility.

use std::collections::BTreeMap;

use rg_core::{DeviceId, ResourceRef};

use crate::requirements::MemoryRequirements;
use crate::stats::AliasStats;

/// Default aliasing threshold (spec §4.8): "A resource below the
/// configured aliasing threshold (default 1 MiB) is never aliased."
pub const DEFAULT_ALIAS_THRESHOLD_BYTES: u64 = 1024 * 1024;

struct AvailableEntry {
    resource: ResourceRef,
    requirements: MemoryRequirements,
    device: Option<DeviceId>,
    released_frame: u64,
}

/// State: "an available multimap keyed by size, plus a per-resource active
/// map."
#[derive(Default)]
pub struct AliasingEngine {
    threshold: u64,
    /// Keyed by size so a best-fit lookup can start from the smallest
    /// entry that is still large enough.
    available: BTreeMap<u64, Vec<AvailableEntry>>,
    /// resource requesting an alias -> the resource whose memory it now
    /// shares.
    active: std::collections::HashMap<ResourceRef, ResourceRef>,
    stats: AliasStats,
}

impl AliasingEngine {
    pub fn new(threshold: u64) -> Self {
        AliasingEngine {
            threshold,
            ..Default::default()
        }
    }

    pub fn with_default_threshold() -> Self {
        Self::new(DEFAULT_ALIAS_THRESHOLD_BYTES)
    }

    pub fn stats(&self) -> AliasStats {
        self.stats
    }

    /// Returns a compatible released resource (largest-enough,
    /// smallest-qualifying), removes it from the available map, and
    /// records an alias relationship against `for_resource`'s identity.
    ///
    /// Only device-local resources are considered — callers must not
    /// invoke this for host-visible resources; doing so with `device`
    /// mismatched against every pooled entry simply yields no match.
    pub fn find_alias(
        &mut self,
        for_resource: ResourceRef,
        requirements: &MemoryRequirements,
        device: Option<DeviceId>,
        min_bytes: u64,
    ) -> Option<ResourceRef> {
        if requirements.size < self.threshold {
            return None;
        }
        self.stats.attempts += 1;

        let required_size = requirements.size.max(min_bytes);
        let mut found: Option<(u64, usize)> = None;
        for (&size, entries) in self.available.range(required_size..) {
            if let Some(index) = entries.iter().position(|e| {
                e.device == device
                    && e.requirements.compatible_with(requirements)
                    && e.requirements.size >= required_size
            }) {
                found = Some((size, index));
                break;
            }
        }

        match found {
            Some((size, index)) => {
                let entries = self.available.get_mut(&size).unwrap();
                let entry = entries.remove(index);
                if entries.is_empty() {
                    self.available.remove(&size);
                }
                self.active.insert(for_resource, entry.resource);
                self.stats.successes += 1;
                self.stats.bytes_saved += requirements.size;
                log::trace!(
                    "aliased {} onto released resource {}",
                    for_resource,
                    entry.resource
                );
                Some(entry.resource)
            }
            None => {
                self.stats.failures += 1;
                self.stats.bytes_allocated += requirements.size;
                None
            }
        }
    }

    /// "mark_released(r, frame) moves r into the available map tagged with
    /// the release frame."
    pub fn mark_released(
        &mut self,
        resource: ResourceRef,
        frame: u64,
        requirements: MemoryRequirements,
        device: Option<DeviceId>,
    ) {
        self.available
            .entry(requirements.size)
            .or_default()
            .push(AvailableEntry {
                resource,
                requirements,
                device,
                released_frame: frame,
            });
    }

    /// "clear_released(older_than_frame) prunes."
    pub fn clear_released(&mut self, older_than_frame: u64) {
        self.available.retain(|_, entries| {
            entries.retain(|e| e.released_frame >= older_than_frame);
            !entries.is_empty()
        });
    }

    pub fn alias_of(&self, resource: ResourceRef) -> Option<ResourceRef> {
        self.active.get(&resource).copied()
    }

    pub fn available_count(&self) -> usize {
        self.available.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reqs(size: u64) -> MemoryRequirements {
        MemoryRequirements {
            size,
            alignment: 256,
            memory_type_bits: 0b1,
        }
    }

    #[test]
    fn below_threshold_is_never_aliased() {
        let mut engine = AliasingEngine::new(1024 * 1024);
        engine.mark_released(ResourceRef(0), 1, reqs(512), None);
        assert!(engine
            .find_alias(ResourceRef(1), &reqs(512), None, 0)
            .is_none());
        assert_eq!(engine.stats().attempts, 0);
    }

    #[test]
    fn compatible_released_resource_is_reused() {
        let mut engine = AliasingEngine::new(0);
        engine.mark_released(ResourceRef(0), 1, reqs(4096), None);
        let found = engine.find_alias(ResourceRef(1), &reqs(2048), None, 0);
        assert_eq!(found, Some(ResourceRef(0)));
        assert_eq!(engine.stats().successes, 1);
        assert_eq!(engine.alias_of(ResourceRef(1)), Some(ResourceRef(0)));
    }

    #[test]
    fn device_mismatch_never_aliases() {
        let mut engine = AliasingEngine::new(0);
        engine.mark_released(ResourceRef(0), 1, reqs(4096), Some(DeviceId(0)));
        assert!(engine
            .find_alias(ResourceRef(1), &reqs(2048), Some(DeviceId(1)), 0)
            .is_none());
        assert_eq!(engine.stats().failures, 1);
    }

    #[test]
    fn clear_released_prunes_stale_entries() {
        let mut engine = AliasingEngine::new(0);
        engine.mark_released(ResourceRef(0), 1, reqs(4096), None);
        engine.clear_released(5);
        assert_eq!(engine.available_count(), 0);
    }

    #[test]
    fn best_fit_picks_smallest_qualifying_block() {
        let mut engine = AliasingEngine::new(0);
        engine.mark_released(ResourceRef(0), 1, reqs(8192), None);
        engine.mark_released(ResourceRef(1), 1, reqs(4096), None);
        let found = engine.find_alias(ResourceRef(2), &reqs(2048), None, 0);
        assert_eq!(found, Some(ResourceRef(1)));
    }
}
