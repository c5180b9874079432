use crate::color::Color;
use crate::error::FigureError;
use crate::scene::{IndexRemap, Scene, TraceCategory, DEFAULT_OUTLINE_WIDTH};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Emphasis outline applied to selected traces.
pub const SELECTION_OUTLINE: Color = Color::new(255, 0, 255);
pub const SELECTION_OUTLINE_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectMode {
    #[default]
    Idle,
    Selecting,
}

impl SelectMode {
    pub fn toggled(self) -> Self {
        match self {
            SelectMode::Idle => SelectMode::Selecting,
            SelectMode::Selecting => SelectMode::Idle,
        }
    }
}

/// Select-mode state plus the set of trace indices currently marked for
/// recoloring. Indices are curve numbers into the Scene's trace list, so
/// the set must be remapped after any category-scoped removal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    pub mode: SelectMode,
    indices: BTreeSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Re-resolves every cached index after a category-scoped removal;
    /// indices of removed traces drop out of the set.
    pub fn apply_remap(&mut self, remap: &IndexRemap) {
        self.indices = self
            .indices
            .iter()
            .filter_map(|&index| remap.remap(index))
            .collect();
    }
}

/// Handles a click while select mode is on: toggles the clicked trace's
/// membership and its emphasis outline. Clicks while Idle or on traces
/// that are not genes/homologies change nothing.
pub fn toggle_selection(
    mut scene: Scene,
    mut selection: SelectionSet,
    clicked_index: usize,
) -> Result<(Scene, SelectionSet), FigureError> {
    if selection.mode != SelectMode::Selecting {
        return Ok((scene, selection));
    }
    let trace = scene
        .trace(clicked_index)
        .ok_or_else(|| FigureError::index_out_of_range(clicked_index, scene.len()))?;
    if !matches!(trace.category, TraceCategory::Gene | TraceCategory::Homology) {
        return Ok((scene, selection));
    }
    if selection.contains(clicked_index) {
        selection.indices.remove(&clicked_index);
        let fill = trace.fill;
        scene.set_outline(clicked_index, fill, DEFAULT_OUTLINE_WIDTH)?;
    } else {
        selection.indices.insert(clicked_index);
        scene.set_outline(clicked_index, SELECTION_OUTLINE, SELECTION_OUTLINE_WIDTH)?;
    }
    Ok((scene, selection))
}

/// Applies the chosen color to every selected trace, then clears the set.
/// A no-op, not an error, on an empty selection.
pub fn recolor_selected(
    mut scene: Scene,
    mut selection: SelectionSet,
    color: Color,
) -> Result<(Scene, SelectionSet), FigureError> {
    for index in selection.indices.iter().copied().collect::<Vec<_>>() {
        scene.recolor(index, color, color, DEFAULT_OUTLINE_WIDTH)?;
    }
    selection.clear();
    Ok((scene, selection))
}
