//! Directed chord diagram panel.
//!
//! Draws weighted flows between entities as a ring of arcs (one per entity)
//! joined by arrowed ribbons (one per source/target pair):
//! - Rows of a data frame are aggregated into an adjacency matrix
//! - A directed chord layout turns the matrix into angles
//! - Colors come from the field configuration (palette, fixed, thresholds,
//!   gradients, value mappings)
//! - The result is an SVG scene mounted into the panel's `<svg>`
//!
//! # Example
//!
//! ```ignore
//! use chord_panel::{ChordPanel, PanelData};
//!
//! let data: PanelData = serde_json::from_str(payload)?;
//! view! { <ChordPanel data=data height=600.0 /> }
//! ```

mod color;
mod component;
mod display;
mod dom;
mod error;
mod layout;
mod matrix;
mod path;
mod render;
mod scene;
mod theme;
mod types;
mod wrap;

pub use color::ColorResolver;
pub use component::{ChordPanel, FIELD_PROMPT};
pub use display::{DisplayValue, FieldDisplay, format_value};
pub use dom::{CanvasMeasure, SvgSink, build, clear, mount};
pub use error::{ChordError, ChordResult};
pub use layout::{
	Chord, ChordEndpoint, ChordGroup, ChordLayout, Geometry, LayoutConfig, arc_path, chord_directed,
	ribbon_arrow_path,
};
pub use matrix::{
	AdjacencyMatrix, MatrixData, NameIndex, ResolvedColumns, build_matrix, entity_key, numeric,
	resolve_columns, weight,
};
pub use render::{ELLIPSIS, build_scene, render_chord};
pub use scene::{GroupShape, Label, Ribbon, SVG_NS, Scene, SvgNode, TextAnchor, Tick};
pub use theme::{Color, Palette, PanelTheme};
pub use types::{
	ChordOptions, ColorMode, ColumnSelectors, DataFrame, Field, FieldColor, FieldConfig,
	MappingResult, PanelData, RangeOptions, Row, ThresholdStep, Thresholds, ThresholdsMode, ValueMapping,
};
pub use wrap::{ApproxMeasure, TextMeasure, wrap_words};
