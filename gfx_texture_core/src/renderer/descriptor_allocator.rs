/// Descriptor allocator - fixed-capacity CPU descriptor heaps
///
/// Each heap is a contiguous block of `capacity` descriptors created once.
/// Slots are handed out by a bounded `SlotAllocator`; a released slot goes
/// back to the free list only after the frame that last referenced it has
/// retired, like native resources in `ResourceAllocator`.

use slotmap::{new_key_type, SlotMap};
use crate::device::{CpuDescriptorHandle, DescriptorHeapKind, GraphicsDevice};
use crate::error::{Error, Result};
use crate::utils::SlotAllocator;
use crate::{engine_err, engine_error, engine_trace};

const SOURCE: &str = "gfx::DescriptorAllocator";

new_key_type! {
    /// Stable identifier of a descriptor heap
    pub struct DescriptorHeapId;
}

#[derive(Debug, Clone, Copy)]
struct PendingSlot {
    frame_index: u64,
    slot: u32,
}

#[derive(Debug)]
struct DescriptorHeap {
    kind: DescriptorHeapKind,
    capacity: u32,
    base: CpuDescriptorHandle,
    increment_size: u32,
    slots: SlotAllocator,
    pending: Vec<PendingSlot>,
}

/// Allocator of descriptor slots across fixed-capacity heaps
#[derive(Debug, Default)]
pub struct DescriptorAllocator {
    heaps: SlotMap<DescriptorHeapId, DescriptorHeap>,
}

impl DescriptorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a heap of `capacity` descriptors of the given kind
    pub fn alloc_heap(
        &mut self,
        device: &mut dyn GraphicsDevice,
        kind: DescriptorHeapKind,
        capacity: u32,
    ) -> Result<DescriptorHeapId> {
        let base = device.create_descriptor_heap(kind, capacity).map_err(|err| {
            engine_error!(SOURCE, "Failed to create {:?} heap: {}", kind, err);
            err
        })?;
        let increment_size = device.descriptor_handle_increment_size(kind);
        let id = self.heaps.insert(DescriptorHeap {
            kind,
            capacity,
            base,
            increment_size,
            slots: SlotAllocator::with_capacity(capacity),
            pending: Vec::new(),
        });
        engine_trace!(SOURCE, "Created {:?} heap with {} slots", kind, capacity);
        Ok(id)
    }

    fn heap(&self, heap: DescriptorHeapId) -> Result<&DescriptorHeap> {
        self.heaps
            .get(heap)
            .ok_or_else(|| engine_err!(SOURCE, "Unknown descriptor heap {:?}", heap))
    }

    fn heap_mut(&mut self, heap: DescriptorHeapId) -> Result<&mut DescriptorHeap> {
        self.heaps
            .get_mut(heap)
            .ok_or_else(|| engine_err!(SOURCE, "Unknown descriptor heap {:?}", heap))
    }

    /// Take a free slot from `heap`
    ///
    /// Fails with `DescriptorHeapExhausted` when every slot is either in use
    /// or still waiting for its frame to retire.
    pub fn alloc_slot(&mut self, heap: DescriptorHeapId) -> Result<u32> {
        let entry = self.heap_mut(heap)?;
        match entry.slots.alloc() {
            Some(slot) => Ok(slot),
            None => {
                engine_error!(SOURCE, "{:?} heap exhausted ({} slots, {} pending release)",
                    entry.kind, entry.capacity, entry.pending.len());
                Err(Error::DescriptorHeapExhausted {
                    heap: entry.kind,
                    capacity: entry.capacity,
                })
            }
        }
    }

    /// CPU address of `slot` in `heap`
    pub fn cpu_handle(&self, heap: DescriptorHeapId, slot: u32) -> Result<CpuDescriptorHandle> {
        let entry = self.heap(heap)?;
        debug_assert!(slot < entry.capacity, "descriptor slot {} out of range", slot);
        Ok(entry.base.offset(slot, entry.increment_size))
    }

    /// Return `slot` to `heap` once frame `frame_index` has retired
    pub fn release_slot_deferred(&mut self, heap: DescriptorHeapId, frame_index: u64, slot: u32) -> Result<()> {
        let entry = self.heap_mut(heap)?;
        debug_assert!(
            entry.pending.iter().all(|pending| pending.slot != slot),
            "descriptor slot {} released twice",
            slot
        );
        entry.pending.push(PendingSlot { frame_index, slot });
        Ok(())
    }

    /// Return every pending slot whose frame has retired to its free list
    pub fn garbage_collect(&mut self, completed_frame_index: u64) -> usize {
        let mut recycled = 0;
        for entry in self.heaps.values_mut() {
            let DescriptorHeap { slots, pending, .. } = entry;
            pending.retain(|pending| {
                if pending.frame_index <= completed_frame_index {
                    slots.free(pending.slot);
                    recycled += 1;
                    false
                } else {
                    true
                }
            });
        }
        recycled
    }

    /// Return every pending slot now (device must be idle)
    pub fn free_all_pending(&mut self) -> usize {
        let mut recycled = 0;
        for entry in self.heaps.values_mut() {
            for pending in entry.pending.drain(..) {
                entry.slots.free(pending.slot);
                recycled += 1;
            }
        }
        recycled
    }

    pub fn heap_kind(&self, heap: DescriptorHeapId) -> Option<DescriptorHeapKind> {
        self.heaps.get(heap).map(|entry| entry.kind)
    }

    pub fn capacity(&self, heap: DescriptorHeapId) -> Option<u32> {
        self.heaps.get(heap).map(|entry| entry.capacity)
    }

    /// Slots held by live owners (excludes slots waiting for release)
    pub fn live_slot_count(&self, heap: DescriptorHeapId) -> Option<u32> {
        self.heaps
            .get(heap)
            .map(|entry| entry.slots.len() - entry.pending.len() as u32)
    }

    /// Slots released but not yet returned to the free list
    pub fn pending_slot_count(&self, heap: DescriptorHeapId) -> Option<u32> {
        self.heaps.get(heap).map(|entry| entry.pending.len() as u32)
    }
}

#[cfg(test)]
#[path = "descriptor_allocator_tests.rs"]
mod tests;
