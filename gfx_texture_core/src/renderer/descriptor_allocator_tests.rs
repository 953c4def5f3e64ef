use super::*;
use crate::device::mock_graphics_device::MockGraphicsDevice;

fn rtv_heap(capacity: u32) -> (MockGraphicsDevice, DescriptorAllocator, DescriptorHeapId) {
    let mut device = MockGraphicsDevice::new();
    let mut allocator = DescriptorAllocator::new();
    let heap = allocator
        .alloc_heap(&mut device, DescriptorHeapKind::RenderTargetView, capacity)
        .unwrap();
    (device, allocator, heap)
}

// ============================================================================
// Heaps and slots
// ============================================================================

#[test]
fn test_alloc_heap_registers_with_device() {
    let (device, allocator, heap) = rtv_heap(4);
    assert_eq!(allocator.heap_kind(heap), Some(DescriptorHeapKind::RenderTargetView));
    assert_eq!(allocator.capacity(heap), Some(4));
    assert_eq!(
        device.state().lock().unwrap().heaps,
        vec![(DescriptorHeapKind::RenderTargetView, 4)]
    );
}

#[test]
fn test_cpu_handles_use_increment_size() {
    let (device, mut allocator, heap) = rtv_heap(4);
    let increment = device.descriptor_handle_increment_size(DescriptorHeapKind::RenderTargetView) as usize;
    let first = allocator.alloc_slot(heap).unwrap();
    let second = allocator.alloc_slot(heap).unwrap();

    let a = allocator.cpu_handle(heap, first).unwrap();
    let b = allocator.cpu_handle(heap, second).unwrap();
    assert_eq!(b.ptr - a.ptr, increment);
}

#[test]
fn test_heap_exhaustion_is_an_error() {
    let (_device, mut allocator, heap) = rtv_heap(2);
    allocator.alloc_slot(heap).unwrap();
    allocator.alloc_slot(heap).unwrap();

    let result = allocator.alloc_slot(heap);
    assert!(matches!(
        result,
        Err(Error::DescriptorHeapExhausted { heap: DescriptorHeapKind::RenderTargetView, capacity: 2 })
    ));
}

#[test]
fn test_unknown_heap_is_an_error() {
    let (_device, mut allocator, _heap) = rtv_heap(2);
    let unknown = DescriptorHeapId::default();
    assert!(allocator.alloc_slot(unknown).is_err());
    assert!(allocator.cpu_handle(unknown, 0).is_err());
    assert_eq!(allocator.live_slot_count(unknown), None);
}

// ============================================================================
// Deferred slot release
// ============================================================================

#[test]
fn test_released_slot_is_not_reused_before_retirement() {
    let (_device, mut allocator, heap) = rtv_heap(2);
    let a = allocator.alloc_slot(heap).unwrap();
    allocator.release_slot_deferred(heap, 5, a).unwrap();
    assert_eq!(allocator.live_slot_count(heap), Some(0));
    assert_eq!(allocator.pending_slot_count(heap), Some(1));

    let b = allocator.alloc_slot(heap).unwrap();
    assert_ne!(a, b);

    // Heap of 2: one live, one pending, nothing left
    assert!(allocator.alloc_slot(heap).is_err());

    assert_eq!(allocator.garbage_collect(4), 0);
    assert_eq!(allocator.garbage_collect(5), 1);
    assert_eq!(allocator.alloc_slot(heap).unwrap(), a);
}

#[test]
fn test_free_all_pending() {
    let (mut device, mut allocator, rtv) = rtv_heap(4);
    let dsv = allocator
        .alloc_heap(&mut device, DescriptorHeapKind::DepthStencilView, 4)
        .unwrap();
    let a = allocator.alloc_slot(rtv).unwrap();
    let b = allocator.alloc_slot(dsv).unwrap();
    allocator.release_slot_deferred(rtv, 10, a).unwrap();
    allocator.release_slot_deferred(dsv, 11, b).unwrap();

    assert_eq!(allocator.free_all_pending(), 2);
    assert_eq!(allocator.pending_slot_count(rtv), Some(0));
    assert_eq!(allocator.pending_slot_count(dsv), Some(0));
    assert_eq!(allocator.live_slot_count(rtv), Some(0));
}
