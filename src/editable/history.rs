//! Undo/redo history of whole-buffer snapshots.

use super::buffer::AttributedBuffer;
use super::position::TextRange;

/// Text and selection captured before an edit.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoSnapshot {
    pub text: AttributedBuffer,
    pub selected_range: TextRange,
}

impl UndoSnapshot {
    pub fn new(text: AttributedBuffer, selected_range: TextRange) -> Self {
        Self {
            text,
            selected_range,
        }
    }
}

/// Bounded undo and redo stacks. The oldest snapshot is evicted first.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<UndoSnapshot>,
    redo_stack: Vec<UndoSnapshot>,
    max_size: usize,
    restoring: bool,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::with_max_size(20)
    }
}

impl UndoManager {
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
            restoring: false,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        Self::trim(&mut self.undo_stack, max_size);
        Self::trim(&mut self.redo_stack, max_size);
    }

    /// Drop all history and keep `baseline` as the only undo entry
    pub fn reset(&mut self, baseline: UndoSnapshot) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(baseline);
    }

    /// Push unless the top already holds the same text
    pub fn push_undo(&mut self, snapshot: UndoSnapshot) -> bool {
        Self::push_checked(&mut self.undo_stack, snapshot, self.max_size)
    }

    pub fn push_redo(&mut self, snapshot: UndoSnapshot) -> bool {
        Self::push_checked(&mut self.redo_stack, snapshot, self.max_size)
    }

    pub fn clear_redo(&mut self) {
        self.redo_stack.clear();
    }

    pub fn can_undo(&self, current: &AttributedBuffer) -> bool {
        self.undo_stack.last().is_some_and(|top| &top.text != current)
    }

    pub fn can_redo(&self, current: &AttributedBuffer) -> bool {
        self.redo_stack.last().is_some_and(|top| &top.text != current)
    }

    /// Move `current` to the redo stack and hand back the snapshot to restore
    pub fn undo(&mut self, current: UndoSnapshot) -> Option<UndoSnapshot> {
        if !self.can_undo(&current.text) {
            return None;
        }
        self.push_redo(current);
        self.undo_stack.pop()
    }

    /// Move `current` to the undo stack and hand back the snapshot to restore
    pub fn redo(&mut self, current: UndoSnapshot) -> Option<UndoSnapshot> {
        if !self.can_redo(&current.text) {
            return None;
        }
        self.push_undo(current);
        self.redo_stack.pop()
    }

    /// Set while a snapshot is being written back, so the restore itself is
    /// not captured as a new edit
    pub fn set_restoring(&mut self, restoring: bool) {
        self.restoring = restoring;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_checked(stack: &mut Vec<UndoSnapshot>, snapshot: UndoSnapshot, max: usize) -> bool {
        if stack.last().is_some_and(|top| top.text == snapshot.text) {
            return false;
        }
        stack.push(snapshot);
        Self::trim(stack, max);
        true
    }

    fn trim(stack: &mut Vec<UndoSnapshot>, max: usize) {
        while stack.len() > max {
            stack.remove(0);
        }
    }
}
