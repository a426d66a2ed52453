//! Pasteboard access.

use std::borrow::Cow;

use crate::editable::AttributedBuffer;

/// Decoded RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub trait Pasteboard {
    fn string(&mut self) -> Option<String>;

    /// Replaces every item on the pasteboard
    fn set_string(&mut self, text: &str);

    fn attributed_text(&mut self) -> Option<AttributedBuffer>;

    /// Writes the styled text and its plain string
    fn set_attributed_text(&mut self, text: &AttributedBuffer);

    fn image(&mut self) -> Option<ImagePayload>;

    fn set_image(&mut self, image: ImagePayload);
}

/// In-process pasteboard.
#[derive(Debug, Clone, Default)]
pub struct MemoryPasteboard {
    string: Option<String>,
    attributed: Option<AttributedBuffer>,
    image: Option<ImagePayload>,
}

impl MemoryPasteboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pasteboard for MemoryPasteboard {
    fn string(&mut self) -> Option<String> {
        self.string.clone()
    }

    fn set_string(&mut self, text: &str) {
        self.string = Some(text.to_string());
        self.attributed = None;
        self.image = None;
    }

    fn attributed_text(&mut self) -> Option<AttributedBuffer> {
        self.attributed.clone()
    }

    fn set_attributed_text(&mut self, text: &AttributedBuffer) {
        self.string = Some(text.text());
        self.attributed = Some(text.clone());
        self.image = None;
    }

    fn image(&mut self) -> Option<ImagePayload> {
        self.image.clone()
    }

    fn set_image(&mut self, image: ImagePayload) {
        self.string = None;
        self.attributed = None;
        self.image = Some(image);
    }
}

/// The system clipboard.
///
/// The clipboard only carries plain text and images, so styled copies are
/// remembered locally and handed back while the clipboard still holds the
/// same plain text.
#[derive(Debug, Default)]
pub struct SystemPasteboard {
    attributed: Option<AttributedBuffer>,
}

impl SystemPasteboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pasteboard for SystemPasteboard {
    fn string(&mut self) -> Option<String> {
        let mut clipboard = arboard::Clipboard::new().ok()?;
        clipboard.get_text().ok()
    }

    fn set_string(&mut self, text: &str) {
        self.attributed = None;
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            if let Err(e) = clipboard.set_text(text) {
                tracing::warn!("failed to write clipboard text: {e}");
            }
        }
    }

    fn attributed_text(&mut self) -> Option<AttributedBuffer> {
        let current = self.string()?;
        match &self.attributed {
            Some(text) if text.text() == current => Some(text.clone()),
            _ => None,
        }
    }

    fn set_attributed_text(&mut self, text: &AttributedBuffer) {
        self.set_string(&text.text());
        self.attributed = Some(text.clone());
    }

    fn image(&mut self) -> Option<ImagePayload> {
        let mut clipboard = arboard::Clipboard::new().ok()?;
        let image = clipboard.get_image().ok()?;
        Some(ImagePayload {
            width: image.width,
            height: image.height,
            rgba: image.bytes.into_owned(),
        })
    }

    fn set_image(&mut self, image: ImagePayload) {
        self.attributed = None;
        if let Ok(mut clipboard) = arboard::Clipboard::new() {
            let data = arboard::ImageData {
                width: image.width,
                height: image.height,
                bytes: Cow::Owned(image.rgba),
            };
            if let Err(e) = clipboard.set_image(data) {
                tracing::warn!("failed to write clipboard image: {e}");
            }
        }
    }
}
