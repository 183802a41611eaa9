//! Fill colors for groups and chords.

use serde_json::Value;

use super::display::FieldDisplay;
use super::error::{ChordError, ChordResult};
use super::layout::{Chord, ChordEndpoint};
use super::matrix::{NameIndex, ResolvedColumns};
use super::theme::{Palette, resolve_css};
use super::types::{ColorMode, DataFrame};

/// Resolves colors from the color-by flag and the configuration of the
/// source, target and value fields. Holds no state beyond borrowed config.
#[derive(Clone, Debug)]
pub struct ColorResolver<'a> {
	color_by_source: bool,
	names: &'a NameIndex,
	source: FieldDisplay<'a>,
	target: FieldDisplay<'a>,
	value: FieldDisplay<'a>,
	palette: Palette,
}

impl<'a> ColorResolver<'a> {
	/// Builds display processors for the three resolved columns of `frame`.
	pub fn new(
		frame: &'a DataFrame,
		columns: &ResolvedColumns,
		names: &'a NameIndex,
		color_by_source: bool,
	) -> ChordResult<Self> {
		let display = |selector: &'static str, column: &str| {
			frame
				.fields
				.iter()
				.enumerate()
				.find(|(_, f)| f.name == column)
				.map(|(i, f)| FieldDisplay::new(f, i))
				.ok_or_else(|| ChordError::missing_column(selector, column))
		};

		Ok(Self {
			color_by_source,
			names,
			source: display("source", &columns.source)?,
			target: display("target", &columns.target)?,
			value: display("value", &columns.value)?,
			palette: Palette::classic(),
		})
	}

	/// Display processor of the value field, used for tooltip text too.
	pub fn value_display(&self) -> &FieldDisplay<'a> {
		&self.value
	}

	/// Color of entity `index`, whose aggregate flow is `value`.
	pub fn color_for_group(&self, index: usize, value: f64) -> String {
		let active = if self.color_by_source {
			&self.source
		} else {
			&self.target
		};
		let config = active.config();

		if let Some(color) = config.mapped_color(self.names.label(index)) {
			return resolve_css(color);
		}

		match config.color.mode {
			ColorMode::PaletteClassic => self.palette.get(index).to_string(),
			ColorMode::Fixed => active.display(&Value::from(index)).color,
			_ => self.value.display_number(value).color,
		}
	}

	/// Color of the group an endpoint sits on.
	pub fn color_for_endpoint(&self, endpoint: &ChordEndpoint) -> String {
		self.color_for_group(endpoint.index, endpoint.value)
	}

	/// A chord takes the color of its source or target group.
	pub fn color_for_chord(&self, chord: &Chord) -> String {
		if self.color_by_source {
			self.color_for_endpoint(&chord.source)
		} else {
			self.color_for_endpoint(&chord.target)
		}
	}
}
