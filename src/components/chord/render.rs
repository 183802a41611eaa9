//! Scene building for the chord diagram.
//!
//! Turns a [`ChordLayout`] into a [`Scene`]:
//! 1. Ribbons, one per chord, colored via the [`ColorResolver`]
//! 2. Group bands with tooltips
//! 3. Radial labels (wrapped, flipped on the lower half) and ticks

use std::f64::consts::PI;

use log::debug;

use super::color::ColorResolver;
use super::display::DisplayValue;
use super::error::{ChordError, ChordResult};
use super::layout::{ChordGroup, ChordLayout, LayoutConfig};
use super::matrix::{NameIndex, build_matrix};
use super::scene::{GroupShape, Label, Ribbon, Scene, TextAnchor, Tick};
use super::theme::darker_css;
use super::types::{ChordOptions, PanelData};
use super::wrap::{TextMeasure, wrap_words};

/// Label shown in place of names on groups too thin to fit one.
pub const ELLIPSIS: &str = ". . .";

/// Runs the whole pipeline for one render: matrix, layout, colors, scene.
pub fn render_chord(
	data: &PanelData,
	height: f64,
	config: &LayoutConfig,
	measure: &dyn TextMeasure,
) -> ChordResult<Scene> {
	let frame = data.frame().ok_or(ChordError::NoFrame)?;
	let options = &data.options;
	let built = build_matrix(frame, &options.selectors())?;
	let layout = ChordLayout::compute(
		&built.matrix,
		height,
		options.label_width(),
		options.point_length,
		config,
	)?;
	let colors = ColorResolver::new(frame, &built.columns, &built.names, options.color_by_source)?;

	debug!(
		"chord: {} chords, {} groups, inner radius {:.1}",
		layout.chords.len(),
		layout.groups.len(),
		layout.geometry.inner_radius
	);

	Ok(build_scene(
		&layout,
		&built.names,
		&colors,
		options,
		&data.theme.text_color,
		config,
		measure,
	))
}

/// Builds the scene for a computed layout.
pub fn build_scene(
	layout: &ChordLayout,
	names: &NameIndex,
	colors: &ColorResolver,
	options: &ChordOptions,
	text_color: &str,
	config: &LayoutConfig,
	measure: &dyn TextMeasure,
) -> Scene {
	let values = colors.value_display();

	let ribbons = layout
		.chords
		.iter()
		.map(|chord| {
			let fill = colors.color_for_chord(chord);
			let shown = values.display_number(chord.source.value);
			Ribbon {
				source: chord.source.index,
				target: chord.target.index,
				path: layout.ribbon_path(chord),
				stroke: darker_css(&fill),
				fill,
				title: format!(
					"{} to {} : {}",
					names.label(chord.source.index),
					names.label(chord.target.index),
					value_text(&shown)
				),
			}
		})
		.collect();

	let groups = layout
		.groups
		.iter()
		.map(|group| {
			let fill = colors.color_for_group(group.index, group.value);
			let stroke = darker_css(&fill);
			let name = names.label(group.index);
			GroupShape {
				index: group.index,
				path: layout.arc_path(group),
				title: format!(
					"{name} Total : {}",
					value_text(&values.display_number(group.value))
				),
				label: label(group, name, layout, options, config, measure),
				tick: Tick {
					rotation: bisector_degrees(group),
					offset: layout.geometry.outer_radius,
					length: config.tick_length,
					stroke: stroke.clone(),
				},
				fill,
				stroke,
			}
		})
		.collect();

	Scene {
		size: layout.geometry.radius * 2.0,
		font_size: options.label_size,
		text_color: text_color.to_string(),
		ribbons,
		groups,
	}
}

fn label(
	group: &ChordGroup,
	name: &str,
	layout: &ChordLayout,
	options: &ChordOptions,
	config: &LayoutConfig,
	measure: &dyn TextMeasure,
) -> Label {
	let geometry = &layout.geometry;
	let text = if group.span() > config.label_min_angle {
		name
	} else {
		ELLIPSIS
	};
	let lower_half = group.start_angle >= PI;

	Label {
		rotation: bisector_degrees(group),
		offset: geometry.outer_radius + geometry.label_width / 2.0 + config.label_padding,
		anchor: if lower_half {
			TextAnchor::End
		} else {
			TextAnchor::Start
		},
		flipped: lower_half,
		lines: wrap_words(text, geometry.label_width, options.label_size, measure),
	}
}

/// Bisector of the group in degrees, measured from the positive x axis.
fn bisector_degrees(group: &ChordGroup) -> f64 {
	group.mid_angle().to_degrees() - 90.0
}

/// `<prefix><text> <suffix>` without dangling whitespace.
fn value_text(shown: &DisplayValue) -> String {
	format!("{}{} {}", shown.prefix, shown.text, shown.suffix.trim_start())
		.trim_end()
		.to_string()
}
