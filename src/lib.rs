//! richedit - Elm-style rich-text editing core
//!
//! This crate provides the model and update logic of a rich-text editing
//! widget: an attributed buffer, a selection and marked-text state machine,
//! touch tracking, undo/redo and coalesced layout refresh. Rendering and
//! platform input are left to the host, which feeds [`Msg`] values through
//! [`update`] and performs the returned [`Cmd`] side effects.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod geometry;
pub mod layout;
pub mod messages;
pub mod model;
pub mod protocol;
pub mod script;
pub mod services;
pub mod tracing;
pub mod update;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::TextViewConfig;
pub use editable::{AttributedBuffer, Attributes, EditConstraints, TextPosition, TextRange};
pub use layout::{MonospaceLayoutEngine, MonospaceMetrics};
pub use messages::Msg;
pub use model::TextView;
pub use services::Services;
pub use update::update;
