//! Configuration tests - paths, YAML persistence, applying defaults

mod common;

use richedit::config::{ConfigError, TextViewConfig};
use richedit::config_paths;
use richedit::editable::{Color, EditConstraints, Font, TextAlignment};
use richedit::geometry::EdgeInsets;
use tempfile::tempdir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_file_ends_with_yaml() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    if let (Some(config), Some(logs)) = (config_paths::config_dir(), config_paths::logs_dir()) {
        assert!(logs.starts_with(&config));
    }
}

// ========================================================================
// Persistence Tests
// ========================================================================

#[test]
fn test_save_then_load_keeps_every_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let config = TextViewConfig {
        constraints: EditConstraints::read_only(),
        max_undo_level: 7,
        font: Some(Font::system(18.0)),
        text_color: Some(Color::rgb(10, 20, 30)),
        text_alignment: TextAlignment::Right,
        vertical_form: true,
        text_container_inset: Some(EdgeInsets::new(1.0, 2.0, 3.0, 4.0)),
        placeholder: Some("Say something".into()),
        file_logging: false,
        ..Default::default()
    };

    config.save_to(&path).unwrap();
    let loaded = TextViewConfig::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_yaml_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "max_undo_level: [not, a, number]\n").unwrap();

    let err = TextViewConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = TextViewConfig::load_from(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

// ========================================================================
// Applying Tests
// ========================================================================

#[test]
fn test_applied_undo_limit_bounds_history() {
    let mut view = common::editing_view("");
    TextViewConfig {
        max_undo_level: 1,
        ..Default::default()
    }
    .apply(&mut view);

    // Long enough that the tap at column 0 lands outside the caret hit box
    common::insert(&mut view, "abcdef");
    common::tap(&mut view, common::char_point(0, 0));
    assert_eq!(view.selected_range(), 0..0);
    common::insert(&mut view, "b");
    assert_eq!(view.text(), "babcdef");

    common::send(&mut view, richedit::messages::EditMsg::Undo);
    assert_eq!(view.text(), "abcdef");
    assert!(!view.can_undo());
}

#[test]
fn test_applied_vertical_form_swaps_default_insets() {
    let mut view = common::test_view("abc");
    TextViewConfig {
        vertical_form: true,
        ..Default::default()
    }
    .apply(&mut view);

    assert_eq!(view.text_container_inset(), EdgeInsets::DEFAULT_VERTICAL);
}
