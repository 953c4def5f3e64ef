/// Allocates and recycles `u32` indices, optionally bounded.
///
/// Backs the fixed-capacity descriptor heaps (one index per view slot) and
/// the mock device's native handle ids. Freed indices are recycled LIFO.
/// A bounded allocator returns `None` once every index below the capacity
/// is live; exhaustion is never silent.
///
/// # Example
///
/// ```ignore
/// let mut alloc = SlotAllocator::with_capacity(2);
/// let a = alloc.alloc();   // Some(0)
/// let b = alloc.alloc();   // Some(1)
/// assert_eq!(alloc.alloc(), None);
/// alloc.free(0);
/// let c = alloc.alloc();   // Some(0) (recycled)
/// ```
#[derive(Debug)]
pub struct SlotAllocator {
    free_list: Vec<u32>,
    next_id: u32,
    len: u32,
    capacity: Option<u32>,
}

impl SlotAllocator {
    /// Create a new unbounded allocator
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            len: 0,
            capacity: None,
        }
    }

    /// Create an allocator that hands out at most `capacity` live indices
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            len: 0,
            capacity: Some(capacity),
        }
    }

    /// Allocate the next available slot index
    ///
    /// Returns `None` when a bounded allocator is full.
    pub fn alloc(&mut self) -> Option<u32> {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None => {
                if self.capacity.is_some_and(|cap| self.next_id >= cap) {
                    return None;
                }
                let id = self.next_id;
                self.next_id += 1;
                id
            }
        };
        self.len += 1;
        Some(id)
    }

    /// Return a slot index to the pool for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated slot: {}", id);
        debug_assert!(!self.free_list.contains(&id), "double free of slot: {}", id);
        self.len -= 1;
        self.free_list.push(id);
    }

    /// Highest index ever allocated + 1.
    pub fn high_water_mark(&self) -> u32 {
        self.next_id
    }

    /// Maximum number of live indices (`None` if unbounded)
    pub fn capacity(&self) -> Option<u32> {
        self.capacity
    }

    /// Number of currently allocated slots
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether no slots are currently allocated
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "slot_allocator_tests.rs"]
mod tests;
