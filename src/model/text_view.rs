//! The text view model
//!
//! `TextView` exclusively owns the buffer, the selection, the current layout,
//! the undo history and the touch tracking state. It is only mutated through
//! `update()` and the property setters; read-only queries live next to the
//! handlers in `crate::update`.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::{Rc, Weak};

use super::overlay::{ActiveHighlight, OverlayState, PlaceholderFrame};
use super::scheduler::UpdateScheduler;
use super::timers::{TimerKind, Timers, Timings};
use super::tracking::{TrackingMode, TrackingState};
use crate::commands::Cmd;
use crate::editable::{
    AttributeKey, AttributeValue, AttributedBuffer, Attributes, Border, Color, EditConstraints,
    Font, Highlight, SelectionState, TextAlignment, TextRange, UndoManager,
};
use crate::geometry::{EdgeInsets, Point, Rect, Size};
use crate::layout::{Container, LayoutEngine, TextLayout, VerticalAlignment};
use crate::services::{
    DataDetector, DebugOptions, DetectorTypes, InputDelegate, Notification, Pasteboard,
    Services, TextParser, TextViewDelegate, TextViewNotification, Tokenizer, ViewId,
};
use crate::services::{MemoryPasteboard, WordTokenizer};

// ============================================================================
// Supporting state
// ============================================================================

/// Scroll view geometry. The frame is in window coordinates; everything
/// else is in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub frame: Rect,
    pub content_offset: Point,
    pub content_size: Size,
    pub content_inset: EdgeInsets,
    pub scroll_indicator_insets: EdgeInsets,
    /// Height of an accessory view stacked on top of the keyboard
    pub extra_accessory_view_height: f64,
    pub scroll_enabled: bool,
    /// Insets from before the keyboard pushed the bottom inset up
    pub original_insets: Option<(EdgeInsets, EdgeInsets)>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            content_offset: Point::ZERO,
            content_size: Size::ZERO,
            content_inset: EdgeInsets::ZERO,
            scroll_indicator_insets: EdgeInsets::ZERO,
            extra_accessory_view_height: 0.0,
            scroll_enabled: true,
            original_insets: None,
        }
    }
}

impl Viewport {
    /// The visible rect in content coordinates
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.frame.size()).with_origin(self.content_offset)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ViewFlags {
    pub first_responder: bool,
    /// A range was picked by long press while not editing
    pub selected_without_edit: bool,
    /// The selection covers a binding run awaiting a second backspace
    pub delete_confirm: bool,
    /// The typing attributes were set explicitly for the next insertion
    pub typing_attributes_once: bool,
    pub ignore_first_responder: bool,
    pub ignore_touch_began: bool,
    pub clears_on_insertion_once: bool,
    pub first_responder_before_undo_alert: bool,
    /// Panning is disabled while a caret or grabber drag is tracked
    pub scroll_locked: bool,
}

/// Values exposed through the public getters, refreshed after each commit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OuterProperties {
    pub text: String,
    pub font: Font,
    pub text_color: Color,
    pub alignment: TextAlignment,
    pub selected_range: Range<usize>,
    pub typing_attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PlaceholderState {
    pub text: Option<AttributedBuffer>,
    pub font: Option<Font>,
    pub color: Option<Color>,
    pub frame: Option<PlaceholderFrame>,
}

fn default_link_attributes() -> Attributes {
    Attributes::new().with(AttributeKey::ForegroundColor, AttributeValue::Color(Color::TINT))
}

fn default_highlight_attributes() -> Attributes {
    let border = Border {
        color: Color::rgba(0, 0, 0, 0),
        width: 0.0,
        fill: Some(Color::rgba(26, 26, 26, 51)),
        corner_radius: 3.0,
        insets: EdgeInsets::new(-2.0, -2.0, -2.0, -2.0),
    };
    Attributes::new().with(AttributeKey::Border, AttributeValue::Border(border))
}

// ============================================================================
// TextView
// ============================================================================

pub struct TextView {
    pub(crate) id: ViewId,
    pub(crate) services: Services,

    // Collaborators
    pub(crate) layout_engine: Rc<dyn LayoutEngine>,
    pub(crate) delegate: Option<Weak<RefCell<dyn TextViewDelegate>>>,
    pub(crate) input_delegate: Option<Weak<RefCell<dyn InputDelegate>>>,
    pub(crate) text_parser: Option<Rc<dyn TextParser>>,
    pub(crate) data_detector: Option<Rc<dyn DataDetector>>,
    pub(crate) detector_types: DetectorTypes,
    pub(crate) pasteboard: Rc<RefCell<dyn Pasteboard>>,
    pub(crate) tokenizer: Rc<dyn Tokenizer>,

    // Text
    pub(crate) inner_text: AttributedBuffer,
    /// Layout copy decorated with detected links, when anything was found
    pub(crate) detected_text: Option<AttributedBuffer>,
    pub(crate) selection: SelectionState,
    pub(crate) typing_holder: Attributes,
    pub(crate) last_type_range: Option<TextRange>,
    pub(crate) history: UndoManager,
    pub(crate) constraints: EditConstraints,
    pub(crate) link_text_attributes: Attributes,
    pub(crate) highlight_text_attributes: Attributes,
    pub(crate) clears_on_insertion: bool,

    // Layout
    pub(crate) container: Container,
    /// Exclusion paths as set, before the vertical-form translation
    pub(crate) exclusion_paths: Vec<Rect>,
    pub(crate) layout: Option<Rc<dyn TextLayout>>,
    pub(crate) vertical_alignment: VerticalAlignment,

    pub(crate) viewport: Viewport,

    // Transient
    pub(crate) tracking: TrackingState,
    pub(crate) highlight: Option<ActiveHighlight>,
    pub(crate) overlay: OverlayState,
    pub(crate) flags: ViewFlags,
    pub(crate) scheduler: UpdateScheduler,
    pub(crate) timers: Timers,
    pub(crate) timings: Timings,
    pub(crate) outer: OuterProperties,
    pub(crate) placeholder: PlaceholderState,
    pub(crate) debug_options: DebugOptions,
    pub(crate) outbox: Vec<Cmd>,
}

impl TextView {
    /// Create an empty view registered with the shared services.
    pub fn new(services: &Services, layout_engine: Rc<dyn LayoutEngine>) -> Self {
        let id = services.allocate_view_id();
        let debug_options = services.debug.options();
        services.debug.register(id);
        services.keyboard.register(id);

        let font = Font::default();
        let typing_holder = Attributes::new()
            .with(AttributeKey::Font, AttributeValue::Font(font.clone()))
            .with(AttributeKey::ForegroundColor, AttributeValue::Color(Color::BLACK));

        let mut view = Self {
            id,
            services: services.clone(),
            layout_engine,
            delegate: None,
            input_delegate: None,
            text_parser: None,
            data_detector: None,
            detector_types: DetectorTypes::default(),
            pasteboard: Rc::new(RefCell::new(MemoryPasteboard::new())),
            tokenizer: Rc::new(WordTokenizer),
            inner_text: AttributedBuffer::new(),
            detected_text: None,
            selection: SelectionState::default(),
            typing_holder: typing_holder.clone(),
            last_type_range: None,
            history: UndoManager::default(),
            constraints: EditConstraints::default(),
            link_text_attributes: default_link_attributes(),
            highlight_text_attributes: default_highlight_attributes(),
            clears_on_insertion: false,
            container: Container::new(Size::ZERO, EdgeInsets::DEFAULT),
            exclusion_paths: Vec::new(),
            layout: None,
            vertical_alignment: VerticalAlignment::Top,
            viewport: Viewport::default(),
            tracking: TrackingState::default(),
            highlight: None,
            overlay: OverlayState::default(),
            flags: ViewFlags::default(),
            scheduler: UpdateScheduler::default(),
            timers: Timers::default(),
            timings: Timings::default(),
            outer: OuterProperties {
                text: String::new(),
                font,
                text_color: Color::BLACK,
                alignment: TextAlignment::Natural,
                selected_range: 0..0,
                typing_attributes: typing_holder,
            },
            placeholder: PlaceholderState::default(),
            debug_options,
            outbox: Vec::new(),
        };
        view.update_inner_container_size();
        view.update_now();
        tracing::debug!(view = view.id.0, "text view created");
        view
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    // ========================================================================
    // Command outbox
    // ========================================================================

    pub(crate) fn emit(&mut self, cmd: Cmd) {
        self.outbox.push(cmd);
    }

    /// Drain the side effects produced since the last call
    pub fn take_commands(&mut self) -> Option<Cmd> {
        Cmd::from_list(std::mem::take(&mut self.outbox))
    }

    /// Run any pending refresh and hand back the queued commands. Call after
    /// using the property setters outside of `update()`.
    pub fn flush(&mut self) -> Option<Cmd> {
        self.end_turn();
        self.take_commands()
    }

    pub(crate) fn end_turn(&mut self) {
        self.update_if_needed();
        self.update_placeholder_if_needed();
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    pub fn set_delegate<D: TextViewDelegate + 'static>(&mut self, delegate: &Rc<RefCell<D>>) {
        let delegate: Rc<RefCell<dyn TextViewDelegate>> = delegate.clone();
        self.delegate = Some(Rc::downgrade(&delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    pub fn set_input_delegate<D: InputDelegate + 'static>(&mut self, delegate: &Rc<RefCell<D>>) {
        let delegate: Rc<RefCell<dyn InputDelegate>> = delegate.clone();
        self.input_delegate = Some(Rc::downgrade(&delegate));
    }

    pub fn set_pasteboard(&mut self, pasteboard: Rc<RefCell<dyn Pasteboard>>) {
        self.pasteboard = pasteboard;
    }

    pub fn set_tokenizer(&mut self, tokenizer: Rc<dyn Tokenizer>) {
        self.tokenizer = tokenizer;
    }

    pub fn set_data_detector(&mut self, detector: Option<Rc<dyn DataDetector>>) {
        self.data_detector = detector;
        self.reset_undo_and_redo_stack();
        self.commit_update();
    }

    /// Call the delegate if one is registered and still alive
    pub(crate) fn with_delegate<R>(
        &self,
        f: impl FnOnce(&mut dyn TextViewDelegate, ViewId) -> R,
    ) -> Option<R> {
        let delegate = self.delegate.as_ref()?.upgrade()?;
        let mut delegate = delegate.try_borrow_mut().ok()?;
        Some(f(&mut *delegate, self.id))
    }

    pub(crate) fn with_input_delegate(&self, f: impl FnOnce(&mut dyn InputDelegate, ViewId)) {
        let Some(delegate) = self.input_delegate.as_ref().and_then(Weak::upgrade) else {
            return;
        };
        let Ok(mut delegate) = delegate.try_borrow_mut() else {
            return;
        };
        f(&mut *delegate, self.id);
    }

    pub(crate) fn text_will_change(&self) {
        self.with_input_delegate(|d, id| d.text_will_change(id));
    }

    pub(crate) fn text_did_change(&self) {
        self.with_input_delegate(|d, id| d.text_did_change(id));
    }

    pub(crate) fn selection_will_change(&self) {
        self.with_input_delegate(|d, id| d.selection_will_change(id));
    }

    pub(crate) fn selection_did_change(&self) {
        self.with_input_delegate(|d, id| d.selection_did_change(id));
    }

    pub(crate) fn post(&self, name: TextViewNotification) {
        self.services.notifications.post(Notification {
            name,
            sender: self.id,
        });
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn text(&self) -> &str {
        &self.outer.text
    }

    pub fn attributed_text(&self) -> &AttributedBuffer {
        &self.inner_text
    }

    pub fn font(&self) -> &Font {
        &self.outer.font
    }

    pub fn text_color(&self) -> Color {
        self.outer.text_color
    }

    pub fn text_alignment(&self) -> TextAlignment {
        self.outer.alignment
    }

    pub fn vertical_alignment(&self) -> VerticalAlignment {
        self.vertical_alignment
    }

    pub fn selected_range(&self) -> Range<usize> {
        self.outer.selected_range.clone()
    }

    pub fn typing_attributes(&self) -> &Attributes {
        &self.outer.typing_attributes
    }

    pub fn marked_range(&self) -> Option<Range<usize>> {
        self.selection.marked.map(|m| m.as_range())
    }

    pub fn is_first_responder(&self) -> bool {
        self.flags.first_responder
    }

    pub fn constraints(&self) -> EditConstraints {
        self.constraints
    }

    pub fn timings(&self) -> Timings {
        self.timings
    }

    pub fn data_detector_types(&self) -> DetectorTypes {
        self.detector_types
    }

    pub fn link_text_attributes(&self) -> &Attributes {
        &self.link_text_attributes
    }

    pub fn highlight_text_attributes(&self) -> &Attributes {
        &self.highlight_text_attributes
    }

    pub fn clears_on_insertion(&self) -> bool {
        self.clears_on_insertion
    }

    pub fn text_container_inset(&self) -> EdgeInsets {
        self.container.insets
    }

    pub fn exclusion_paths(&self) -> &[Rect] {
        &self.exclusion_paths
    }

    pub fn is_vertical_form(&self) -> bool {
        self.container.vertical_form
    }

    pub fn debug_options(&self) -> DebugOptions {
        self.debug_options
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn tracking_mode(&self) -> TrackingMode {
        self.tracking.mode(self.highlight.is_some())
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.active
    }

    /// Whether the current touch belongs to the text view. When false the
    /// host should forward the touch to the views behind it.
    pub fn swallows_touch(&self) -> bool {
        self.tracking.swallow
    }

    /// The highlight span under the current touch, if it is being shown
    pub fn active_highlight(&self) -> Option<(&Highlight, Range<usize>)> {
        self.highlight
            .as_ref()
            .filter(|h| h.showing)
            .map(|h| (&h.highlight, h.range.clone()))
    }

    pub fn is_timer_armed(&self, kind: TimerKind) -> bool {
        self.timers.is_armed(kind)
    }

    pub fn armed_timers(&self) -> Vec<(TimerKind, super::TimerToken)> {
        self.timers.armed().collect()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_count()
    }

    pub fn max_undo_level(&self) -> usize {
        self.history.max_size()
    }

    /// Layout refreshes performed so far
    pub fn refresh_count(&self) -> u64 {
        self.scheduler.refresh_count()
    }

    pub fn needs_update(&self) -> bool {
        self.scheduler.needs_update()
    }

    /// Current layout, refreshed first if anything is pending
    pub fn layout(&mut self) -> Option<Rc<dyn TextLayout>> {
        self.update_if_needed();
        self.display_layout()
    }

    /// The layout to draw: the highlight layout while a highlight is shown
    pub(crate) fn display_layout(&self) -> Option<Rc<dyn TextLayout>> {
        match &self.highlight {
            Some(h) if h.showing && h.layout.is_some() => h.layout.clone(),
            _ => self.layout.clone(),
        }
    }

    pub fn placeholder(&mut self) -> Option<&PlaceholderFrame> {
        self.update_placeholder_if_needed();
        self.placeholder.frame.as_ref()
    }

    pub fn placeholder_text(&self) -> Option<String> {
        self.placeholder.text.as_ref().map(AttributedBuffer::text)
    }

    pub fn placeholder_attributed_text(&self) -> Option<&AttributedBuffer> {
        self.placeholder.text.as_ref()
    }
}

// ============================================================================
// Invariants
// ============================================================================

impl TextView {
    /// Panic if the selection or composition left the buffer bounds
    #[cfg(debug_assertions)]
    pub fn assert_invariants_with_context(&self, context: &str) {
        let len = self.inner_text.len();
        let selected = self.selection.selected;
        assert!(
            selected.start.offset <= selected.end.offset && selected.is_valid(len),
            "[{}] selection {:?} invalid for {} chars",
            context,
            selected,
            len
        );
        if let Some(marked) = self.selection.marked {
            assert!(
                marked.is_valid(len),
                "[{}] marked range {:?} invalid for {} chars",
                context,
                marked,
                len
            );
        }
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    pub fn assert_invariants_with_context(&self, _context: &str) {}
}

impl Drop for TextView {
    fn drop(&mut self) {
        let pending = self.timers.cancel_all();
        self.services.keyboard.deregister(self.id);
        self.services.debug.deregister(self.id);
        tracing::debug!(
            view = self.id.0,
            cancelled_timers = pending.len(),
            "text view dropped"
        );
    }
}

impl std::fmt::Debug for TextView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextView")
            .field("id", &self.id)
            .field("text", &self.outer.text)
            .field("selection", &self.selection)
            .field("first_responder", &self.flags.first_responder)
            .field("tracking", &self.tracking_mode())
            .finish()
    }
}
