//! Integration tests for the logging system
//!
//! Verifies the global logger and what the texture lifecycle reports through it.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use gfx_texture_core::gfx::Engine;
use gfx_texture_core::gfx::GfxConfig;
use gfx_texture_core::gfx::device::PixelFormat;
use gfx_texture_core::gfx::device::mock_graphics_device::MockGraphicsDevice;
use gfx_texture_core::gfx::display::DesktopSurface;
use gfx_texture_core::gfx::log::{Logger, LogEntry, LogSeverity};
use gfx_texture_core::gfx::texture::{ResourceState, TextureManager, TextureSetup};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn create_manager(config: GfxConfig) -> TextureManager {
    let device = MockGraphicsDevice::new();
    let cmd = device.command_list();
    TextureManager::new(&config, Box::new(DesktopSurface), Box::new(device), Box::new(cmd)).unwrap()
}

fn entries_at(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity) -> Vec<LogEntry> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|entry| entry.severity == severity)
        .cloned()
        .collect()
}

// ============================================================================
// LOGGER TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Info);
        assert_eq!(captured[0].source, "test::module");
        assert_eq!(captured[1].message, "Test warning message");
        assert_eq!(captured[1].file, None);
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    {
        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].file, Some("test_file.rs"));
        assert_eq!(captured[0].line, Some(42));
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());

    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    // Still only the first message
    assert_eq!(entries.lock().unwrap().len(), 1);
}

// ============================================================================
// TEXTURE LIFECYCLE LOGGING
// ============================================================================

#[test]
#[serial]
fn test_integration_rejected_3d_texture_is_warned() {
    let mut manager = create_manager(GfxConfig::default());
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let setup = TextureSetup::from_pixel_data_3d(4, 4, 4, 1, PixelFormat::RGBA8);
    let (_, state) = manager.create_texture_from_data(setup, &[0u8; 256]).unwrap();

    assert_eq!(state, ResourceState::Failed);
    let warnings = entries_at(&entries, LogSeverity::Warn);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].source, "gfx::TextureFactory");
    assert!(warnings[0].message.contains("3d textures"));
    assert!(entries_at(&entries, LogSeverity::Error).is_empty());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_unknown_format_is_warned() {
    let mut manager = create_manager(GfxConfig::default());
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let setup = TextureSetup::from_pixel_data_2d(4, 4, 1, PixelFormat::ETC2_RGB8);
    let (_, state) = manager.create_texture_from_data(setup, &[0u8; 64]).unwrap();

    assert_eq!(state, ResourceState::Failed);
    let warnings = entries_at(&entries, LogSeverity::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("ETC2_RGB8"));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_heap_exhaustion_is_logged_as_error() {
    let config = GfxConfig {
        rtv_heap_capacity: 1,
        ..GfxConfig::default()
    };
    let mut manager = create_manager(config);
    manager.create_texture(TextureSetup::render_target(8, 8)).unwrap();

    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    assert!(manager.create_texture(TextureSetup::render_target(8, 8)).is_err());

    let errors = entries_at(&entries, LogSeverity::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "gfx::DescriptorAllocator");
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());

    Engine::reset_logger();
}
