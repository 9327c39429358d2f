//! Retained widget tree
//!
//! Stands in for the rendered UI: a flat list of widgets in display order,
//! each tagged with a data id and an optional parent id. Replacing the
//! widget list starts a new generation; handles from older generations keep
//! their data id but no longer click or draw.

use crate::focus::Outline;
use crate::grid::{Selector, TargetDiscovery, TargetHandle};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// One rendered element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub data_id: String,
    /// Data id of the enclosing element
    pub parent: Option<String>,
    pub label: String,
    pub disabled: bool,
}

impl Widget {
    pub fn new(data_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            data_id: data_id.into(),
            parent: None,
            label: label.into(),
            disabled: false,
        }
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

#[derive(Debug, Default)]
struct TreeState {
    generation: u64,
    widgets: Vec<Widget>,
    outlines: Vec<Option<Outline>>,
    /// Data ids clicked since the last drain
    clicks: Vec<String>,
}

/// Shared widget tree; clones refer to the same tree
#[derive(Debug, Clone, Default)]
pub struct WidgetTree {
    state: Arc<Mutex<TreeState>>,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render: swap in a new widget list and invalidate old handles
    pub fn replace(&self, widgets: Vec<Widget>) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.outlines = vec![None; widgets.len()];
        state.widgets = widgets;
        debug!("Widget tree generation {} ({} widgets)", state.generation, state.widgets.len());
    }

    pub fn widgets(&self) -> Vec<Widget> {
        self.state.lock().widgets.clone()
    }

    /// Clicks recorded since the last call, oldest first
    pub fn drain_clicks(&self) -> Vec<String> {
        std::mem::take(&mut self.state.lock().clicks)
    }

    /// Outline currently drawn on the first widget with this data id
    pub fn outline_of(&self, data_id: &str) -> Option<Outline> {
        let state = self.state.lock();
        let position = state.widgets.iter().position(|w| w.data_id == data_id)?;
        state.outlines.get(position).copied().flatten()
    }

    /// Widgets paired with their outlines, for text rendering
    pub fn outlined(&self) -> Vec<(Widget, Option<Outline>)> {
        let state = self.state.lock();
        state
            .widgets
            .iter()
            .cloned()
            .zip(state.outlines.iter().copied())
            .collect()
    }

    fn handle(&self, generation: u64, position: usize, data_id: &str) -> WidgetHandle {
        WidgetHandle {
            state: self.state.clone(),
            generation,
            position,
            data_id: data_id.to_string(),
        }
    }
}

impl TargetDiscovery for WidgetTree {
    type Handle = WidgetHandle;

    fn query(&self, selector: &Selector) -> Vec<WidgetHandle> {
        let state = self.state.lock();
        state
            .widgets
            .iter()
            .enumerate()
            .filter(|(_, widget)| match selector {
                Selector::ChildrenOf { parent, .. } => {
                    widget.parent.as_deref() == Some(parent.as_str()) && selector.matches_id(&widget.data_id)
                },
                _ => selector.matches_id(&widget.data_id),
            })
            .map(|(position, widget)| self.handle(state.generation, position, &widget.data_id))
            .collect()
    }
}

/// Reference to one widget of one generation
#[derive(Clone)]
pub struct WidgetHandle {
    state: Arc<Mutex<TreeState>>,
    generation: u64,
    position: usize,
    data_id: String,
}

impl std::fmt::Debug for WidgetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetHandle")
            .field("data_id", &self.data_id)
            .field("generation", &self.generation)
            .field("position", &self.position)
            .finish()
    }
}

impl WidgetHandle {
    /// Run `f` on the tree if this handle is still current
    fn with_live<R>(&self, f: impl FnOnce(&mut TreeState) -> R) -> Option<R> {
        let mut state = self.state.lock();
        if state.generation != self.generation || self.position >= state.widgets.len() {
            return None;
        }
        Some(f(&mut state))
    }
}

impl TargetHandle for WidgetHandle {
    fn data_id(&self) -> String {
        self.data_id.clone()
    }

    fn click(&self) {
        let position = self.position;
        let clicked = self.with_live(|state| {
            if state.widgets[position].disabled {
                return false;
            }
            let id = state.widgets[position].data_id.clone();
            state.clicks.push(id);
            true
        });
        if clicked != Some(true) {
            debug!("Click on {} ignored (stale or disabled)", self.data_id);
        }
    }

    fn set_focus_visual(&self, outline: Option<Outline>) {
        let position = self.position;
        self.with_live(|state| state.outlines[position] = outline);
    }

    fn is_disabled(&self) -> bool {
        let position = self.position;
        self.with_live(|state| state.widgets[position].disabled).unwrap_or(true)
    }
}
