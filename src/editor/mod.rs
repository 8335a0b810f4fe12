//! # Editor
//!
//! The editing core: an explicit [`EditorState`] plus the events that change
//! it. [`reduce`] is the pure transform `(state, event) → state`; [`Editor`]
//! wraps it with the pointer capture that must only exist while a drag is in
//! progress.
//!
//! ```
//! use std::sync::Arc;
//! use tripcard::catalog::Catalog;
//! use tripcard::content::FieldName;
//! use tripcard::editor::{Editor, Event};
//!
//! let mut editor = Editor::new(Arc::new(Catalog::builtin()));
//! editor.dispatch(Event::SetField { field: FieldName::Price, value: "49".into() });
//!
//! let canvas = editor.render_display();
//! let price = canvas.boxes.iter().find(|b| b.element_id == "price").unwrap();
//! assert_eq!(price.text, "$49");
//! ```

pub mod drag;
pub mod mutate;

pub use drag::{DragState, Point, PointerButton, PointerCapture, PointerListeners};
pub use mutate::{NumericInput, QuickAlign};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::content::{ContentFields, FieldName};
use crate::error::TripcardError;
use crate::export::ExportSnapshot;
use crate::model::{BackgroundProperty, Position, Size, StyleProperty, TemplateLayout};
use crate::render::{self, RenderedCanvas};

/// Everything the renderer needs, and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorState {
    pub content: ContentFields,
    /// Private copy of the selected catalog layout; edits land here.
    pub layout: TemplateLayout,
    pub selected: Option<String>,
    pub drag: DragState,
}

impl EditorState {
    /// Sample content on a fresh copy of `layout`.
    pub fn new(layout: &TemplateLayout) -> Self {
        Self {
            content: ContentFields::default(),
            layout: layout.clone(),
            selected: None,
            drag: DragState::Idle,
        }
    }

    pub fn selected_element(&self) -> Option<&crate::model::TemplateElement> {
        self.selected.as_deref().and_then(|id| self.layout.element(id))
    }
}

/// A discrete UI event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    /// Replace one content field.
    SetField { field: FieldName, value: String },
    /// Switch to a catalog layout (resets edits, clears selection).
    SelectLayout { id: String },
    /// Click on an element (`Some`) or on the empty canvas (`None`).
    SelectElement { id: Option<String> },
    SetStyle { id: String, property: StyleProperty },
    SetPosition { id: String, position: Position },
    SetSize { id: String, size: Size },
    /// Typed text in one of the x/y/width/height fields.
    SetNumericInput { id: String, input: NumericInput, text: String },
    SetLocked { id: String, locked: bool },
    SetBackground { property: BackgroundProperty },
    QuickAlign { id: String, align: QuickAlign },
    PointerDown {
        id: String,
        #[serde(default)]
        button: PointerButton,
        pointer: Point,
        #[serde(default)]
        container_origin: Point,
    },
    PointerMove {
        pointer: Point,
        #[serde(default)]
        container_origin: Point,
    },
    PointerUp,
}

impl Event {
    /// Events delivered only to an active pointer capture.
    pub fn needs_pointer_capture(&self) -> bool {
        matches!(self, Event::PointerMove { .. } | Event::PointerUp)
    }
}

/// Apply one event in place.
pub fn apply(state: &mut EditorState, event: &Event, catalog: &Catalog) {
    match event {
        Event::SetField { field, value } => {
            state.content.set_field(*field, value.clone());
        }

        Event::SelectLayout { id } => match catalog.by_id(id) {
            Some(layout) => {
                tracing::debug!(layout = %id, "layout selected");
                state.layout = layout.clone();
                state.selected = None;
                state.drag = DragState::Idle;
            }
            None => tracing::debug!(layout = %id, "ignoring unknown layout"),
        },

        Event::SelectElement { id: None } => state.selected = None,
        Event::SelectElement { id: Some(id) } => {
            if state.layout.element(id).is_some() {
                state.selected = Some(id.clone());
            }
        }

        Event::SetStyle { id, property } => {
            mutate::set_style(&mut state.layout, id, property.clone());
        }
        Event::SetPosition { id, position } => {
            mutate::set_position(&mut state.layout, id, *position);
        }
        Event::SetSize { id, size } => {
            mutate::set_size(&mut state.layout, id, *size);
        }
        Event::SetNumericInput { id, input, text } => {
            mutate::set_numeric_input(&mut state.layout, id, *input, text);
        }
        Event::SetLocked { id, locked } => {
            mutate::set_locked(&mut state.layout, id, *locked);
        }
        Event::SetBackground { property } => {
            mutate::set_background(&mut state.layout, property.clone());
        }
        Event::QuickAlign { id, align } => {
            mutate::quick_align(&mut state.layout, id, *align);
        }

        Event::PointerDown {
            id,
            button,
            pointer,
            container_origin,
        } => {
            if state.drag.is_dragging() || *button != PointerButton::Primary {
                return;
            }
            let Some(element) = state.layout.element(id) else {
                return;
            };
            if element.locked {
                return;
            }
            let offset = drag::grab_offset(&state.layout, element, *pointer, *container_origin);
            tracing::debug!(element = %id, ?offset, "drag started");
            state.drag = DragState::Dragging {
                element_id: id.clone(),
                offset,
            };
            state.selected = Some(id.clone());
        }

        Event::PointerMove {
            pointer,
            container_origin,
        } => {
            let DragState::Dragging { element_id, offset } = &state.drag else {
                return;
            };
            let locked = state
                .layout
                .element(element_id)
                .is_none_or(|el| el.locked);
            if locked {
                return;
            }
            let position = drag::drag_position(&state.layout, *pointer, *container_origin, *offset);
            let id = element_id.clone();
            mutate::set_position(&mut state.layout, &id, position);
        }

        Event::PointerUp => {
            if let DragState::Dragging { element_id, .. } = &state.drag {
                tracing::debug!(element = %element_id, "drag ended");
            }
            state.drag = DragState::Idle;
        }
    }
}

/// Pure transform: the state after `event`.
pub fn reduce(state: EditorState, event: &Event, catalog: &Catalog) -> EditorState {
    let mut next = state;
    apply(&mut next, event, catalog);
    next
}

/// An editing session: state, catalog and the pointer capture.
#[derive(Debug)]
pub struct Editor {
    catalog: Arc<Catalog>,
    state: EditorState,
    listeners: PointerListeners,
    capture: Option<PointerCapture>,
}

impl Editor {
    /// Open the editor on the catalog's first layout with sample content.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let state = EditorState::new(catalog.first());
        Self::from_state(catalog, state)
    }

    /// Open the editor on a specific layout.
    pub fn with_layout(catalog: Arc<Catalog>, layout_id: &str) -> Result<Self, TripcardError> {
        let layout = catalog
            .by_id(layout_id)
            .ok_or_else(|| unknown_layout(&catalog, layout_id))?;
        let state = EditorState::new(layout);
        Ok(Self::from_state(catalog, state))
    }

    fn from_state(catalog: Arc<Catalog>, state: EditorState) -> Self {
        Self {
            catalog,
            state,
            listeners: PointerListeners::new(),
            capture: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Subscription registry; `active()` is 1 during a drag and 0 otherwise.
    pub fn listeners(&self) -> &PointerListeners {
        &self.listeners
    }

    /// Replace the content wholesale (e.g. from a JSON file).
    pub fn set_content(&mut self, content: ContentFields) {
        self.state.content = content;
    }

    /// Apply one event.
    ///
    /// Pointer-move/up without an active capture are dropped: nothing is
    /// listening for them.
    pub fn dispatch(&mut self, event: Event) {
        if event.needs_pointer_capture() && self.capture.is_none() {
            tracing::trace!(?event, "no pointer capture, event dropped");
            return;
        }
        apply(&mut self.state, &event, &self.catalog);
        self.sync_capture();
    }

    /// Acquire or release the capture to match the drag state.
    fn sync_capture(&mut self) {
        match (self.state.drag.is_dragging(), self.capture.is_some()) {
            (true, false) => self.capture = Some(self.listeners.capture()),
            (false, true) => self.capture = None,
            _ => {}
        }
    }

    /// The live editing canvas (display scale, selection highlighted).
    pub fn render_display(&self) -> RenderedCanvas {
        render::render_display(&self.state)
    }

    /// Standalone HTML preview, background URLs resolved against `origin`.
    pub fn preview_html(&self, origin: Option<&str>) -> String {
        render::html::preview_document(&render::render_static(&self.state), origin)
    }

    /// Snapshot for the exporter; later edits do not affect it.
    pub fn export_snapshot(&self) -> ExportSnapshot {
        ExportSnapshot::capture(&self.state)
    }
}

pub(crate) fn unknown_layout(catalog: &Catalog, id: &str) -> TripcardError {
    TripcardError::Template(format!(
        "unknown layout '{}' (available: {})",
        id,
        catalog.ids().collect::<Vec<_>>().join(", ")
    ))
}
