//! Comparative genome diagrams: multiple linear DNA sequences stacked
//! vertically, annotated with gene arrows, connected by homology ribbons
//! colored by percent identity.
//!
//! The crate consumes already-parsed input (tracks, genes, homology
//! segments) and produces a [`scene::Scene`] of drawable traces that can be
//! incrementally edited (recolored, re-annotated, selected) without
//! recomputing geometry, then exported through [`render_export`].

pub mod annotate;
pub mod arrow;
pub mod color;
pub mod color_scale;
pub mod error;
pub mod figure;
pub mod polygon;
pub mod render_export;
pub mod ribbon;
pub mod scene;
pub mod selection;
pub mod track;

pub use error::{ErrorKind, FigureError};
pub use figure::{build_figure, recolor_homologies, set_annotations, toggle_scale_bar};
pub use render_export::export;
pub use selection::{recolor_selected, toggle_selection};
