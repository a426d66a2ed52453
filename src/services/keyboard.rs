//! Shared keyboard-frame tracker.
//!
//! Text views register on construction and deregister on drop. When the host
//! reports a new keyboard frame, the tracker returns the views that must be
//! told (the host then delivers `ViewportMsg::KeyboardChanged` to each).

use std::cell::RefCell;
use std::rc::Rc;

use super::notifications::ViewId;
use crate::geometry::Rect;

#[derive(Debug, Default)]
struct Inner {
    observers: Vec<ViewId>,
    /// Keyboard frame in window coordinates, `None` while hidden
    frame: Option<Rect>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyboardManager {
    inner: Rc<RefCell<Inner>>,
}

impl KeyboardManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, view: ViewId) {
        let mut inner = self.inner.borrow_mut();
        if !inner.observers.contains(&view) {
            inner.observers.push(view);
        }
    }

    pub fn deregister(&self, view: ViewId) {
        self.inner.borrow_mut().observers.retain(|v| *v != view);
    }

    pub fn is_registered(&self, view: ViewId) -> bool {
        self.inner.borrow().observers.contains(&view)
    }

    pub fn observers(&self) -> Vec<ViewId> {
        self.inner.borrow().observers.clone()
    }

    /// Record a new frame and return the views to notify
    pub fn set_frame(&self, frame: Option<Rect>) -> Vec<ViewId> {
        let mut inner = self.inner.borrow_mut();
        let frame = frame.filter(|f| f.width > 0.0 && f.height > 0.0);
        if inner.frame == frame {
            return Vec::new();
        }
        tracing::debug!(?frame, "keyboard frame changed");
        inner.frame = frame;
        inner.observers.clone()
    }

    pub fn frame(&self) -> Option<Rect> {
        self.inner.borrow().frame
    }

    pub fn is_visible(&self) -> bool {
        self.inner.borrow().frame.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_notify() {
        let kb = KeyboardManager::new();
        kb.register(ViewId(1));
        kb.register(ViewId(1));
        kb.register(ViewId(2));
        assert_eq!(kb.observers(), vec![ViewId(1), ViewId(2)]);

        let notified = kb.set_frame(Some(Rect::new(0.0, 300.0, 320.0, 180.0)));
        assert_eq!(notified.len(), 2);
        assert!(kb.is_visible());

        // Same frame again is not a change
        assert!(kb
            .set_frame(Some(Rect::new(0.0, 300.0, 320.0, 180.0)))
            .is_empty());

        kb.deregister(ViewId(1));
        assert_eq!(kb.set_frame(None), vec![ViewId(2)]);
        assert!(!kb.is_visible());
    }

    #[test]
    fn test_zero_sized_frame_means_hidden() {
        let kb = KeyboardManager::new();
        kb.set_frame(Some(Rect::new(0.0, 480.0, 320.0, 0.0)));
        assert_eq!(kb.frame(), None);
    }
}
