/// Unit tests for texture.rs
///
/// Tests TextureSetup constructors and predicates, Locator, and the empty
/// Texture entity. Creation paths are covered by texture_factory_tests.rs.

use super::*;

// ============================================================================
// Locator
// ============================================================================

#[test]
fn test_locator_shared() {
    let locator = Locator::new("scene_depth");
    assert!(locator.is_shared());
    assert_eq!(locator.name(), "scene_depth");
}

#[test]
fn test_locator_non_shared() {
    let locator = Locator::non_shared();
    assert!(!locator.is_shared());
    assert_eq!(locator, Locator::default());
}

// ============================================================================
// TextureSetup
// ============================================================================

#[test]
fn test_render_target_setup() {
    let setup = TextureSetup::render_target(320, 200).with_depth_format(PixelFormat::DEPTHSTENCIL);
    assert!(setup.should_setup_as_render_target());
    assert!(!setup.should_setup_empty());
    assert!(!setup.should_setup_from_pixel_data());
    assert!(!setup.is_rel_size_render_target());
    assert!(setup.has_depth());
    assert!(!setup.has_shared_depth());
    assert_eq!(setup.usage, Usage::Immutable);
    assert_eq!(setup.num_mip_maps, 1);
}

#[test]
fn test_render_target_without_depth() {
    let setup = TextureSetup::render_target(320, 200);
    assert!(!setup.has_depth());
}

#[test]
fn test_rel_size_render_target_setup() {
    let setup = TextureSetup::rel_size_render_target(0.5, 0.25);
    assert!(setup.should_setup_as_render_target());
    assert!(setup.is_rel_size_render_target());
    assert_eq!(setup.rel_width, 0.5);
    assert_eq!(setup.rel_height, 0.25);
}

#[test]
fn test_shared_depth_setup_has_depth() {
    let setup = TextureSetup::shared_depth_render_target(Locator::new("main"));
    assert!(setup.should_setup_as_render_target());
    assert!(setup.has_shared_depth());
    // The depth format comes from the provider, but the setup still has depth
    assert_eq!(setup.depth_format, PixelFormat::None);
    assert!(setup.has_depth());
}

#[test]
fn test_pixel_data_setups() {
    let tex_2d = TextureSetup::from_pixel_data_2d(16, 16, 5, PixelFormat::RGBA8);
    assert!(tex_2d.should_setup_from_pixel_data());
    assert_eq!(tex_2d.texture_type, TextureType::Texture2D);
    assert_eq!(tex_2d.num_faces(), 1);

    let cube = TextureSetup::from_pixel_data_cube(16, 16, 1, PixelFormat::RGBA8);
    assert_eq!(cube.texture_type, TextureType::TextureCube);
    assert_eq!(cube.num_faces(), 6);

    let volume = TextureSetup::from_pixel_data_3d(16, 16, 8, 1, PixelFormat::RGBA8);
    assert_eq!(volume.texture_type, TextureType::Texture3D);
    assert_eq!(volume.depth, 8);
    assert_eq!(volume.num_faces(), 1);
}

#[test]
fn test_empty_setup() {
    let setup = TextureSetup::empty(64, 32, 1, PixelFormat::RGBA8, Usage::Stream);
    assert!(setup.should_setup_empty());
    assert_eq!(setup.usage, Usage::Stream);
    assert_eq!((setup.width, setup.height), (64, 32));
}

#[test]
fn test_setup_builders() {
    let hint = ClearHint {
        color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        depth: 0.0,
        stencil: 7,
    };
    let setup = TextureSetup::render_target(8, 8)
        .with_locator(Locator::new("rt"))
        .with_color_format(PixelFormat::RGBA16F)
        .with_clear_hint(hint)
        .with_sample_count(4);

    assert_eq!(setup.locator.name(), "rt");
    assert_eq!(setup.color_format, PixelFormat::RGBA16F);
    assert_eq!(setup.clear_hint, hint);
    assert_eq!(setup.sample_count, 4);
}

#[test]
fn test_default_clear_hint() {
    let hint = ClearHint::default();
    assert_eq!(hint.color, Vec4::new(0.0, 0.0, 0.0, 1.0));
    assert_eq!(hint.depth, 1.0);
    assert_eq!(hint.stencil, 0);
}

// ============================================================================
// Texture entity
// ============================================================================

#[test]
fn test_new_texture_is_empty() {
    let tex = Texture::new(TextureSetup::render_target(16, 16));
    assert!(tex.is_empty());
    assert_eq!(tex.state(), ResourceState::Initial);
    assert_eq!(tex.num_slots(), 1);
    assert_eq!(tex.active_slot_index(), 0);
    assert!(tex.active_resource().is_none());
    assert!(tex.depth_buffer().is_none());
    assert!(tex.rtv_slot().is_none());
    assert!(tex.dsv_slot().is_none());
    assert_eq!(tex.attrs(), &TextureAttrs::default());
}

#[test]
fn test_slot_access_is_bounded_by_num_slots() {
    let mut tex = Texture::new(TextureSetup::empty(4, 4, 1, PixelFormat::RGBA8, Usage::Stream));
    assert!(tex.slot(0).is_some());
    assert!(tex.slot(1).is_none());

    tex.num_slots = 2;
    assert!(tex.slot(1).is_some());
    assert!(tex.slot(MAX_TEXTURE_SLOTS).is_none());
}

#[test]
fn test_clear_keeps_setup_and_resets_state() {
    let mut tex = Texture::new(TextureSetup::empty(4, 4, 1, PixelFormat::RGBA8, Usage::Dynamic));
    tex.state = ResourceState::Valid;
    tex.num_slots = 2;
    tex.active_slot = 1;
    tex.update_frame_index = Some(3);
    tex.attrs.width = 4;

    tex.clear();

    assert_eq!(tex.state(), ResourceState::Initial);
    assert_eq!(tex.num_slots(), 1);
    assert_eq!(tex.active_slot_index(), 0);
    assert_eq!(tex.update_frame_index, None);
    assert_eq!(tex.attrs().width, 0);
    assert_eq!(tex.setup().usage, Usage::Dynamic);
    assert!(tex.setup().should_setup_empty());
}

#[test]
fn test_texture_with_descriptor_slot_is_not_empty() {
    let mut tex = Texture::new(TextureSetup::render_target(16, 16));
    tex.rtv_slot = Some(0);
    assert!(!tex.is_empty());
}
