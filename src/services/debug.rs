//! Shared debug-drawing options.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::notifications::ViewId;

/// What the host should outline when drawing a text view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    pub line_bounds: bool,
    pub baselines: bool,
    pub container_insets: bool,
}

impl DebugOptions {
    pub fn needs_drawing(&self) -> bool {
        self.line_bounds || self.baselines || self.container_insets
    }
}

#[derive(Debug, Default)]
struct Inner {
    views: Vec<ViewId>,
    options: DebugOptions,
}

#[derive(Debug, Clone, Default)]
pub struct DebugRegistry {
    inner: Rc<RefCell<Inner>>,
}

impl DebugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, view: ViewId) {
        let mut inner = self.inner.borrow_mut();
        if !inner.views.contains(&view) {
            inner.views.push(view);
        }
    }

    pub fn deregister(&self, view: ViewId) {
        self.inner.borrow_mut().views.retain(|v| *v != view);
    }

    pub fn views(&self) -> Vec<ViewId> {
        self.inner.borrow().views.clone()
    }

    pub fn options(&self) -> DebugOptions {
        self.inner.borrow().options
    }

    /// Replace the options and return the views that need a redraw
    pub fn set_options(&self, options: DebugOptions) -> Vec<ViewId> {
        let mut inner = self.inner.borrow_mut();
        if inner.options == options {
            return Vec::new();
        }
        inner.options = options;
        inner.views.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_options_reports_registered_views() {
        let registry = DebugRegistry::new();
        registry.register(ViewId(7));
        let opts = DebugOptions {
            line_bounds: true,
            ..Default::default()
        };
        assert_eq!(registry.set_options(opts), vec![ViewId(7)]);
        assert!(registry.options().needs_drawing());
        assert!(registry.set_options(opts).is_empty());

        registry.deregister(ViewId(7));
        assert!(registry.views().is_empty());
    }
}
