//! Script replay tests - loading scripts from disk and driving a view

use richedit::config::TextViewConfig;
use richedit::script::{Script, ScriptError, ScriptRunner};
use richedit::Cmd;
use tempfile::tempdir;

fn replay(script: &Script) -> richedit::script::ViewReport {
    let mut runner = ScriptRunner::new(&TextViewConfig::default(), script.frame);
    runner.run(&script.steps);
    runner.report()
}

#[test]
fn test_json_script_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typing.json");
    std::fs::write(
        &path,
        r#"{
            "steps": [
                {"send": {"responder": "become"}},
                {"send": {"input": {"insert_text": "hello"}}},
                {"send": {"input": "delete_backward"}}
            ]
        }"#,
    )
    .unwrap();

    let report = replay(&Script::load(&path).unwrap());
    assert_eq!(report.text, "hell");
    assert_eq!(report.selected_range, 4..4);
    assert!(report.can_undo);
}

#[test]
fn test_yaml_long_press_script() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("long_press.yaml");
    std::fs::write(
        &path,
        r#"
steps:
  - set_text: "hello world"
  - send: { touch: { began: { point: { x: 61.0, y: 14.0 }, time_ms: 0 } } }
  - fire_timers
  - send: { touch: { ended: { point: { x: 61.0, y: 14.0 }, time_ms: 600 } } }
"#,
    )
    .unwrap();

    let report = replay(&Script::load(&path).unwrap());
    assert_eq!(report.selected_range, 6..11);
    assert!(!report.first_responder);
    assert!(report
        .commands
        .iter()
        .any(|c| matches!(c, Cmd::ShowMenu { .. })));
}

#[test]
fn test_script_frame_overrides_default() {
    let script = Script::from_yaml("frame: { x: 0.0, y: 0.0, width: 100.0, height: 50.0 }\n").unwrap();
    let runner = ScriptRunner::new(&TextViewConfig::default(), script.frame);
    assert_eq!(runner.view().viewport().frame.width, 100.0);
}

#[test]
fn test_unknown_step_is_rejected() {
    let err = Script::from_json(r#"{"steps": [{"explode": true}]}"#).unwrap_err();
    assert!(matches!(err, ScriptError::Json(_)));
}

#[test]
fn test_missing_script_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Script::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ScriptError::Io(_)));
}

#[test]
fn test_report_serializes_commands() {
    let script = Script::from_json(
        r#"{"steps": [{"send": {"responder": "become"}}, {"send": {"edit": "shake"}}]}"#,
    )
    .unwrap();
    let report = replay(&script);
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["first_responder"], true);
    let commands = json["commands"].as_array().unwrap();
    assert!(commands.iter().any(|c| c["cmd"] == "focus_changed"));
}
