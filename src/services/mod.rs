//! Collaborators of the text view.
//!
//! Shared, process-wide services ([`Services`]) are cloned into each view,
//! which registers itself on construction and deregisters on drop. The
//! remaining traits are injected per view.

mod debug;
mod delegate;
mod detector;
mod keyboard;
mod notifications;
mod parser;
mod pasteboard;
mod tokenizer;

pub use debug::{DebugOptions, DebugRegistry};
pub use delegate::{InputDelegate, TextViewDelegate};
pub use detector::{DataDetector, DetectedKind, DetectedSpan, DetectorTypes, RegexDataDetector};
pub use keyboard::KeyboardManager;
pub use notifications::{
    Notification, NotificationCenter, SubscriptionId, TextViewNotification, ViewId,
};
pub use parser::{ReplacementParser, TextParser};
pub use pasteboard::{ImagePayload, MemoryPasteboard, Pasteboard, SystemPasteboard};
pub use tokenizer::{StorageDirection, Tokenizer, WordTokenizer};

use std::cell::Cell;
use std::rc::Rc;

/// Handles to the shared services. Cloning shares the same instances.
#[derive(Clone, Default)]
pub struct Services {
    pub notifications: NotificationCenter,
    pub keyboard: KeyboardManager,
    pub debug: DebugRegistry,
    next_view_id: Rc<Cell<u64>>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_view_id(&self) -> ViewId {
        let id = self.next_view_id.get() + 1;
        self.next_view_id.set(id);
        ViewId(id)
    }
}
