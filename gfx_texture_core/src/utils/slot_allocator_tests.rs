use super::*;

// ============================================================================
// Basic allocation tests
// ============================================================================

#[test]
fn test_sequential_alloc() {
    let mut alloc = SlotAllocator::new();
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), Some(2));
}

#[test]
fn test_new_is_empty_and_unbounded() {
    let alloc = SlotAllocator::new();
    assert!(alloc.is_empty());
    assert_eq!(alloc.len(), 0);
    assert_eq!(alloc.high_water_mark(), 0);
    assert_eq!(alloc.capacity(), None);
}

// ============================================================================
// Free and recycle tests
// ============================================================================

#[test]
fn test_free_multiple_recycle_lifo() {
    // Free list is a stack (LIFO): last freed = first recycled
    let mut alloc = SlotAllocator::new();
    let a = alloc.alloc().unwrap(); // 0
    let _b = alloc.alloc().unwrap(); // 1
    let c = alloc.alloc().unwrap(); // 2
    alloc.free(a);
    alloc.free(c);

    assert_eq!(alloc.alloc(), Some(2));
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(3));
}

#[test]
fn test_high_water_mark_never_decreases() {
    let mut alloc = SlotAllocator::new();
    alloc.alloc();
    alloc.alloc();
    alloc.free(0);
    alloc.free(1);
    assert_eq!(alloc.high_water_mark(), 2);

    alloc.alloc(); // recycled
    assert_eq!(alloc.high_water_mark(), 2);
}

// ============================================================================
// Bounded allocator tests
// ============================================================================

#[test]
fn test_bounded_exhaustion_returns_none() {
    let mut alloc = SlotAllocator::with_capacity(2);
    assert_eq!(alloc.capacity(), Some(2));
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), Some(1));
    assert_eq!(alloc.alloc(), None);
    assert_eq!(alloc.alloc(), None);
    // A failed alloc must not change the live count
    assert_eq!(alloc.len(), 2);
}

#[test]
fn test_bounded_recycles_after_free() {
    let mut alloc = SlotAllocator::with_capacity(1);
    assert_eq!(alloc.alloc(), Some(0));
    assert_eq!(alloc.alloc(), None);
    alloc.free(0);
    assert_eq!(alloc.alloc(), Some(0));
}

#[test]
fn test_zero_capacity_never_allocates() {
    let mut alloc = SlotAllocator::with_capacity(0);
    assert_eq!(alloc.alloc(), None);
    assert!(alloc.is_empty());
}

// ============================================================================
// Stress / pattern tests
// ============================================================================

#[test]
fn test_indices_are_unique() {
    let mut alloc = SlotAllocator::with_capacity(64);
    let mut seen = std::collections::HashSet::new();

    for _ in 0..50 {
        seen.insert(alloc.alloc().unwrap());
    }
    for id in 0..10 {
        alloc.free(id);
        seen.remove(&id);
    }
    for _ in 0..14 {
        let id = alloc.alloc().unwrap();
        assert!(seen.insert(id), "duplicate slot id: {}", id);
    }
    assert_eq!(seen.len(), 54);
    assert_eq!(alloc.high_water_mark(), 54);
}
