//! Selection tracking.
//!
//! Mirrors the scene's selection events into editor state. Property changes
//! never move the tracker; only selection events do.

use crate::scene::SceneEvent;
use crate::shapes::ObjectId;

/// Observable selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    #[default]
    Empty,
    Single,
    /// An active selection grouping several objects.
    Multiple,
}

/// Tracks the active objects as reported by selection events.
#[derive(Default)]
pub struct SelectionTracker {
    selected: Vec<ObjectId>,
    kind: SelectionKind,
    on_cleared: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for SelectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionTracker")
            .field("selected", &self.selected)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the callback run whenever the selection is cleared, e.g. to
    /// switch the UI back to its default tool.
    pub fn set_on_cleared(&mut self, callback: impl FnMut() + 'static) {
        self.on_cleared = Some(Box::new(callback));
    }

    pub fn kind(&self) -> SelectionKind {
        self.kind
    }

    /// Tracked ids in selection order.
    pub fn selected(&self) -> &[ObjectId] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Feed one scene event. Non-selection events are ignored.
    pub fn handle(&mut self, event: &SceneEvent) {
        match event {
            SceneEvent::SelectionCreated(ids) | SceneEvent::SelectionUpdated(ids) => {
                self.replace(ids);
            }
            SceneEvent::SelectionCleared => {
                self.selected.clear();
                self.kind = SelectionKind::Empty;
                if let Some(callback) = self.on_cleared.as_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }

    fn replace(&mut self, ids: &[ObjectId]) {
        self.selected = ids.to_vec();
        self.kind = match ids.len() {
            0 => SelectionKind::Empty,
            1 => SelectionKind::Single,
            _ => SelectionKind::Multiple,
        };
    }
}
