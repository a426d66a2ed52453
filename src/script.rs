//! Scripted replay of host events
//!
//! A script is a list of [`ScriptStep`]s in JSON or YAML. [`ScriptRunner`]
//! plays them against a text view laid out with the monospace reference
//! engine, acting as the host: it fills an in-memory pasteboard, fires armed
//! timers on request and records every command the view returns.
//!
//! ```yaml
//! frame: { x: 0, y: 0, width: 320, height: 480 }
//! steps:
//!   - send: { responder: become }
//!   - send: { input: { insert_text: "hello" } }
//!   - send: { edit: undo }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::commands::Cmd;
use crate::config::TextViewConfig;
use crate::geometry::Rect;
use crate::layout::{MonospaceLayoutEngine, MonospaceMetrics};
use crate::messages::{Msg, TimerMsg, ViewportMsg};
use crate::model::{TextView, TrackingMode};
use crate::services::{MemoryPasteboard, Pasteboard, Services};
use crate::update::update;

/// Errors loading a script
#[derive(Debug)]
pub enum ScriptError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Io(e) => write!(f, "failed to read script: {}", e),
            ScriptError::Json(e) => write!(f, "invalid JSON script: {}", e),
            ScriptError::Yaml(e) => write!(f, "invalid YAML script: {}", e),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Io(e) => Some(e),
            ScriptError::Json(e) => Some(e),
            ScriptError::Yaml(e) => Some(e),
        }
    }
}

/// One host action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Deliver a message through `update`
    Send(Msg),
    SetText(String),
    SetSelectedRange { start: usize, end: usize },
    /// Put a plain string on the pasteboard
    SetPasteboard(String),
    /// Fire every armed timer once, in kind order
    FireTimers,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Script {
    /// View frame in window coordinates
    pub frame: Rect,
    pub steps: Vec<ScriptStep>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, 320.0, 480.0),
            steps: Vec::new(),
        }
    }
}

impl Script {
    pub fn from_json(content: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(content).map_err(ScriptError::Json)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ScriptError> {
        // Steps are written as single-key maps, not YAML tags
        let de = serde_yaml::Deserializer::from_str(content);
        serde_yaml::with::singleton_map_recursive::deserialize(de).map_err(ScriptError::Yaml)
    }

    /// Read a script, choosing the format by extension (`.json` or YAML)
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(ScriptError::Io)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }
}

/// Final state of a replayed view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewReport {
    pub text: String,
    pub selected_range: Range<usize>,
    pub marked_range: Option<Range<usize>>,
    pub first_responder: bool,
    pub tracking: TrackingMode,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub refresh_count: u64,
    /// Every command returned while replaying, flattened
    pub commands: Vec<Cmd>,
}

pub struct ScriptRunner {
    view: TextView,
    pasteboard: Rc<RefCell<MemoryPasteboard>>,
    commands: Vec<Cmd>,
}

impl ScriptRunner {
    pub fn new(config: &TextViewConfig, frame: Rect) -> Self {
        let services = Services::new();
        let engine = Rc::new(MonospaceLayoutEngine::new(MonospaceMetrics::default()));
        let mut view = TextView::new(&services, engine);
        let pasteboard = Rc::new(RefCell::new(MemoryPasteboard::new()));
        view.set_pasteboard(pasteboard.clone());
        config.apply(&mut view);

        let mut runner = Self {
            view,
            pasteboard,
            commands: Vec::new(),
        };
        runner.send(ViewportMsg::SetFrame(frame).into());
        runner
    }

    pub fn view(&self) -> &TextView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut TextView {
        &mut self.view
    }

    fn send(&mut self, msg: Msg) {
        if let Some(cmd) = update(&mut self.view, msg) {
            self.commands.extend(cmd.into_vec());
        }
    }

    fn collect(&mut self) {
        if let Some(cmd) = self.view.flush() {
            self.commands.extend(cmd.into_vec());
        }
    }

    pub fn run_step(&mut self, step: &ScriptStep) {
        tracing::debug!(?step, "replaying");
        match step {
            ScriptStep::Send(msg) => self.send(msg.clone()),
            ScriptStep::SetText(text) => {
                self.view.set_text(text);
                self.collect();
            }
            ScriptStep::SetSelectedRange { start, end } => {
                self.view.set_selected_range(*start..*end);
                self.collect();
            }
            ScriptStep::SetPasteboard(text) => self.pasteboard.borrow_mut().set_string(text),
            ScriptStep::FireTimers => {
                for (kind, token) in self.view.armed_timers() {
                    self.send(TimerMsg::Fired { kind, token }.into());
                }
            }
        }
    }

    pub fn run(&mut self, steps: &[ScriptStep]) {
        for step in steps {
            self.run_step(step);
        }
    }

    pub fn report(&mut self) -> ViewReport {
        self.collect();
        ViewReport {
            text: self.view.text().to_string(),
            selected_range: self.view.selected_range(),
            marked_range: self.view.marked_range(),
            first_responder: self.view.is_first_responder(),
            tracking: self.view.tracking_mode(),
            can_undo: self.view.can_undo(),
            can_redo: self.view.can_redo(),
            undo_depth: self.view.undo_depth(),
            redo_depth: self.view.redo_depth(),
            refresh_count: self.view.refresh_count(),
            commands: std::mem::take(&mut self.commands),
        }
    }
}
