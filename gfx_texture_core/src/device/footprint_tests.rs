use super::*;
use crate::device::{HeapType, NativeFormat, ResourceFlags, ResourceStates};

fn texture_desc(dimension: ResourceDimension, width: u64, height: u32, depth_or_array_size: u32, mips: u32) -> ResourceDesc {
    ResourceDesc {
        dimension,
        width,
        height,
        depth_or_array_size,
        mip_levels: mips,
        format: Some(NativeFormat::R8G8B8A8_UNORM),
        sample_count: 1,
        heap_type: HeapType::Default,
        flags: ResourceFlags::empty(),
        initial_state: ResourceStates::COPY_DEST,
        clear_value: None,
    }
}

// ============================================================================
// Row pitch and placement alignment
// ============================================================================

#[test]
fn test_oversized_texture_saturates_instead_of_overflowing() {
    let mut desc = texture_desc(ResourceDimension::Texture2D, 1 << 30, 1 << 30, 1, 1);
    desc.format = Some(NativeFormat::R32G32B32A32_FLOAT);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts[0].row_size_in_bytes, u32::MAX);
    assert_eq!(fp.layouts[0].row_pitch, u32::MAX);
    assert_eq!(fp.total_bytes, u32::MAX as u64 * (1u64 << 30));
    assert!(fp.packed_size() >= fp.total_bytes);
}

#[test]
fn test_row_pitch_is_aligned() {
    let desc = texture_desc(ResourceDimension::Texture2D, 100, 50, 1, 1);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts.len(), 1);
    assert_eq!(fp.layouts[0].row_size_in_bytes, 400);
    assert_eq!(fp.layouts[0].row_pitch, 512);
    assert_eq!(fp.layouts[0].num_rows, 50);
    assert_eq!(fp.total_bytes, 512 * 50);
    assert_eq!(fp.packed_size(), 400 * 50);
}

#[test]
fn test_mip_chain_layout() {
    let desc = texture_desc(ResourceDimension::Texture2D, 64, 64, 1, 2);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts.len(), 2);
    assert_eq!(fp.layouts[0].offset, 0);
    assert_eq!(fp.layouts[1].offset, 16384);
    assert_eq!(fp.layouts[1].width, 32);
    assert_eq!(fp.layouts[1].row_pitch, 256);
    assert_eq!(fp.total_bytes, 16384 + 8192);
    assert_eq!(fp.packed_size(), 16384 + 4096);
}

#[test]
fn test_subresource_offsets_are_placement_aligned() {
    let desc = texture_desc(ResourceDimension::Texture2D, 1, 1, 1, 2);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts[0].offset, 0);
    assert_eq!(fp.layouts[1].offset, 512);
    assert_eq!(fp.total_bytes, 768);
}

// ============================================================================
// Cube and 3D layouts
// ============================================================================

#[test]
fn test_cube_faces_are_consecutive_subresources() {
    let desc = texture_desc(ResourceDimension::Texture2D, 4, 4, 6, 1);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts.len(), 6);
    for (face, layout) in fp.layouts.iter().enumerate() {
        assert_eq!(layout.offset, face as u64 * 1024);
    }
    assert_eq!(fp.total_bytes, 6144);
}

#[test]
fn test_volume_layout_shrinks_depth_per_mip() {
    let desc = texture_desc(ResourceDimension::Texture3D, 8, 8, 4, 2);
    let fp = compute_copyable_footprints(&desc, &DeviceLimits::default());

    assert_eq!(fp.layouts.len(), 2);
    assert_eq!(fp.layouts[0].depth, 4);
    assert_eq!(fp.layouts[1].depth, 2);
    assert_eq!(fp.layouts[1].offset, 8192);
    assert_eq!(fp.total_bytes, 10240);
}

#[test]
fn test_buffer_has_no_footprint() {
    let fp = compute_copyable_footprints(&ResourceDesc::upload_buffer(1024), &DeviceLimits::default());
    assert!(fp.layouts.is_empty());
    assert_eq!(fp.total_bytes, 0);
}
