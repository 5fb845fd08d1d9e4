use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::{Chunk, ChunkPos};

/// Chunks of one world: an LRU-bounded resident set plus a spill map.
///
/// A chunk pushed out of the resident set moves to the spill map and is
/// reloaded on the next mutable access, so block data is never dropped.
#[derive(Debug)]
pub struct ChunkStorage {
    resident: LruCache<ChunkPos, Chunk>,
    spilled: BTreeMap<ChunkPos, Chunk>,
    evictions: u64,
}

impl ChunkStorage {
    /// Storage keeping at most `capacity` chunks resident (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            resident: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            spilled: BTreeMap::new(),
            evictions: 0,
        }
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.resident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resident.is_empty() && self.spilled.is_empty()
    }

    #[cfg(test)]
    fn spilled_len(&self) -> usize {
        self.spilled.len()
    }

    /// Times a chunk left the resident set to stay within budget.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    /// Mutable access to the chunk at `pos`, creating an empty one if absent.
    pub fn ensure_chunk(&mut self, pos: ChunkPos) -> &mut Chunk {
        if !self.resident.contains(&pos) {
            let chunk = self.spilled.remove(&pos).unwrap_or_else(|| Chunk::new(pos));
            self.make_resident(pos, chunk);
        }
        self.resident.get_or_insert_mut(pos, || Chunk::new(pos))
    }

    /// Read a chunk without touching its recency or residency.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.resident.peek(&pos).or_else(|| self.spilled.get(&pos))
    }

    /// Mutable access to an existing chunk; reloads it if spilled and marks
    /// it most recently used.
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        if let Some(chunk) = self.spilled.remove(&pos) {
            self.make_resident(pos, chunk);
        }
        self.resident.get_mut(&pos)
    }

    /// Every chunk, resident or spilled, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Chunk> + '_ {
        self.resident
            .iter_mut()
            .map(|(_, chunk)| chunk)
            .chain(self.spilled.values_mut())
    }

    fn make_resident(&mut self, pos: ChunkPos, chunk: Chunk) {
        if let Some((evicted, chunk)) = self.resident.push(pos, chunk) {
            if evicted == pos {
                return;
            }
            self.evictions += 1;
            debug!(
                chunk = %evicted,
                dirty = chunk.is_dirty(),
                spilled = self.spilled.len() + 1,
                "spilling chunk"
            );
            self.spilled.insert(evicted, chunk);
        }
    }
}
