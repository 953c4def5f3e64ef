use super::*;

// ============================================================================
// PixelFormat predicates
// ============================================================================

#[test]
fn test_render_target_color_formats() {
    assert!(PixelFormat::RGBA8.is_valid_render_target_color_format());
    assert!(PixelFormat::RGBA16F.is_valid_render_target_color_format());
    assert!(!PixelFormat::DEPTH.is_valid_render_target_color_format());
    assert!(!PixelFormat::DXT1.is_valid_render_target_color_format());
    assert!(!PixelFormat::None.is_valid_render_target_color_format());
}

#[test]
fn test_depth_formats() {
    assert!(PixelFormat::DEPTH.is_depth_format());
    assert!(PixelFormat::DEPTHSTENCIL.is_valid_render_target_depth_format());
    assert!(!PixelFormat::RGBA8.is_depth_format());
}

#[test]
fn test_compressed_formats() {
    assert!(PixelFormat::DXT5.is_compressed_format());
    assert!(PixelFormat::ETC2_RGB8.is_compressed_format());
    assert!(!PixelFormat::RGBA8.is_compressed_format());
    assert!(!PixelFormat::RGB8.is_compressed_format());
}

#[test]
fn test_default_is_none() {
    assert_eq!(PixelFormat::default(), PixelFormat::None);
}

// ============================================================================
// Native translation
// ============================================================================

#[test]
fn test_native_translation() {
    assert_eq!(PixelFormat::RGBA8.as_native_format(), Some(NativeFormat::R8G8B8A8_UNORM));
    assert_eq!(PixelFormat::DEPTHSTENCIL.as_native_format(), Some(NativeFormat::D24_UNORM_S8_UINT));
    assert_eq!(PixelFormat::DXT1.as_native_format(), Some(NativeFormat::BC1_UNORM));
}

#[test]
fn test_formats_without_native_equivalent() {
    assert_eq!(PixelFormat::RGB8.as_native_format(), None);
    assert_eq!(PixelFormat::PVRTC4_RGBA.as_native_format(), None);
    assert_eq!(PixelFormat::ETC2_RGB8.as_native_format(), None);
    assert_eq!(PixelFormat::None.as_native_format(), None);
}

// ============================================================================
// Row layout
// ============================================================================

#[test]
fn test_uncompressed_row_layout() {
    let fmt = NativeFormat::R8G8B8A8_UNORM;
    assert_eq!(fmt.row_size(100), 400);
    assert_eq!(fmt.num_rows(50), 50);
    assert_eq!(NativeFormat::R16G16B16A16_FLOAT.row_size(3), 24);
}

#[test]
fn test_row_size_of_huge_width_does_not_wrap() {
    assert_eq!(NativeFormat::R32G32B32A32_FLOAT.row_size(1 << 30), 16 << 30);
    assert_eq!(NativeFormat::R8G8B8A8_UNORM.row_size(u32::MAX), 4 * u32::MAX as u64);
}

#[test]
fn test_block_compressed_row_layout() {
    // BC1: 8 bytes per 4x4 block
    let fmt = NativeFormat::BC1_UNORM;
    assert_eq!(fmt.row_size(16), 32);
    assert_eq!(fmt.num_rows(16), 4);
    // Partial blocks round up, tiny mips still need one block
    assert_eq!(fmt.row_size(5), 16);
    assert_eq!(fmt.row_size(1), 8);
    assert_eq!(fmt.num_rows(1), 1);
    assert_eq!(NativeFormat::BC3_UNORM.row_size(8), 32);
}
