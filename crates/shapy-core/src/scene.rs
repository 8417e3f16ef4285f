//! Scene document: ordered objects, the active selection, and the event
//! queue the editor drains after every mutation.

use crate::shapes::{ObjectId, SceneObject};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Version string written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1";

/// Legacy type tag rewritten to [`CANONICAL_TEXT_TYPE`] on save and load.
pub const LEGACY_TEXT_TYPE: &str = "text";

/// Canonical type tag for text objects.
pub const CANONICAL_TEXT_TYPE: &str = "textbox";

/// Scene errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Notifications emitted by the scene, in the order mutations happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    ObjectModified(ObjectId),
    /// The whole object list was replaced from a snapshot.
    SceneReplaced,
    /// A selection appeared where there was none.
    SelectionCreated(Vec<ObjectId>),
    /// An existing selection changed.
    SelectionUpdated(Vec<ObjectId>),
    SelectionCleared,
}

impl SceneEvent {
    /// Whether the event changes persisted document state.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SceneEvent::ObjectAdded(_)
                | SceneEvent::ObjectRemoved(_)
                | SceneEvent::ObjectModified(_)
                | SceneEvent::SceneReplaced
        )
    }
}

/// Persisted form of a scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub version: String,
    pub objects: Vec<SceneObject>,
}

/// Rewrite legacy `"text"` type tags to `"textbox"`, descending into groups.
pub fn normalize_text_types(objects: &mut Value) {
    let Some(items) = objects.as_array_mut() else {
        return;
    };
    for item in items {
        if let Some(children) = item.get_mut("objects") {
            normalize_text_types(children);
        } else if item.get("type").and_then(Value::as_str) == Some(LEGACY_TEXT_TYPE) {
            item["type"] = Value::from(CANONICAL_TEXT_TYPE);
        }
    }
}

/// The live scene bound to one open document.
#[derive(Debug, Default)]
pub struct Scene {
    /// Objects back to front; index is z-order.
    objects: Vec<SceneObject>,
    /// Active objects in selection order.
    active: Vec<ObjectId>,
    /// Events not yet drained.
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object at the top of the z-order.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id();
        self.objects.push(object);
        self.events.push(SceneEvent::ObjectAdded(id));
        id
    }

    /// Remove an object. If it was active, the selection shrinks (or clears)
    /// first.
    pub fn remove(&mut self, id: ObjectId) -> Option<SceneObject> {
        let index = self.index_of(id)?;
        if self.active.contains(&id) {
            self.active.retain(|&active| active != id);
            self.events.push(if self.active.is_empty() {
                SceneEvent::SelectionCleared
            } else {
                SceneEvent::SelectionUpdated(self.active.clone())
            });
        }
        let object = self.objects.remove(index);
        self.events.push(SceneEvent::ObjectRemoved(id));
        Some(object)
    }

    /// Remove every object without emitting per-object events.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.discard_active();
        self.events.push(SceneEvent::SceneReplaced);
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Mutable access. Callers report the change with [`Scene::mark_modified`].
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Objects back to front.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub(crate) fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Record that an object changed.
    pub fn mark_modified(&mut self, id: ObjectId) {
        if self.index_of(id).is_some() {
            self.events.push(SceneEvent::ObjectModified(id));
        }
    }

    /// Move an object one layer forward. Returns false if already at front.
    pub fn bring_forward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.objects.len() => {
                self.objects.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move an object one layer backward. Returns false if already at back.
    pub fn send_backward(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.objects.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Move an object to the very back.
    pub fn send_to_back(&mut self, id: ObjectId) -> bool {
        match self.index_of(id) {
            Some(0) | None => false,
            Some(pos) => {
                let object = self.objects.remove(pos);
                self.objects.insert(0, object);
                true
            }
        }
    }

    /// Replace the active set. Unknown ids are ignored; an empty list clears.
    pub fn set_active(&mut self, ids: &[ObjectId]) {
        let ids: Vec<ObjectId> = ids
            .iter()
            .copied()
            .filter(|&id| self.index_of(id).is_some())
            .collect();
        if ids.is_empty() {
            self.discard_active();
            return;
        }
        let event = if self.active.is_empty() {
            SceneEvent::SelectionCreated(ids.clone())
        } else {
            SceneEvent::SelectionUpdated(ids.clone())
        };
        self.active = ids;
        self.events.push(event);
    }

    /// Clear the active set.
    pub fn discard_active(&mut self) {
        if !self.active.is_empty() {
            self.active.clear();
            self.events.push(SceneEvent::SelectionCleared);
        }
    }

    /// Active ids in selection order.
    pub fn active_ids(&self) -> &[ObjectId] {
        &self.active
    }

    /// Active objects in selection order.
    pub fn active_objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.active.iter().filter_map(|&id| self.get(id))
    }

    /// Take every pending event.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deep, decoupled copy of the persisted state.
    pub fn to_snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            objects: self.objects.clone(),
        }
    }

    /// Persisted state as a JSON value, with legacy text tags normalized.
    pub fn to_value(&self) -> SceneResult<Value> {
        let mut value = serde_json::to_value(self.to_snapshot())?;
        if let Some(objects) = value.get_mut("objects") {
            normalize_text_types(objects);
        }
        Ok(value)
    }

    /// Compact JSON snapshot.
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    /// Parse a snapshot without touching the live scene.
    pub fn parse_snapshot(json: &str) -> SceneResult<SceneSnapshot> {
        let mut value: Value = serde_json::from_str(json)?;
        let objects = value
            .get_mut("objects")
            .ok_or_else(|| SceneError::InvalidSnapshot("missing \"objects\" array".to_string()))?;
        if !objects.is_array() {
            return Err(SceneError::InvalidSnapshot("\"objects\" is not an array".to_string()));
        }
        normalize_text_types(objects);
        if value.get("version").is_none() {
            value["version"] = Value::from(SNAPSHOT_VERSION);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Replace the whole scene from a JSON snapshot.
    ///
    /// Parsing happens before anything is replaced, so a malformed snapshot
    /// leaves the scene untouched.
    pub fn load_json(&mut self, json: &str) -> SceneResult<()> {
        let snapshot = Self::parse_snapshot(json)?;
        self.replace(snapshot.objects);
        Ok(())
    }

    /// Replace every object, clearing the selection.
    pub fn replace(&mut self, objects: Vec<SceneObject>) {
        self.discard_active();
        self.objects = objects;
        self.events.push(SceneEvent::SceneReplaced);
    }
}
