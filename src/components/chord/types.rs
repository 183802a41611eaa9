//! Host payload structures: data frames, field configuration and panel options.

use std::collections::HashMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::theme::PanelTheme;

/// Everything the host hands to one chord panel render.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PanelData {
	/// Query results. Only the first frame is drawn.
	pub frames: Vec<DataFrame>,
	/// Panel options chosen by the user.
	pub options: ChordOptions,
	/// Host theme.
	pub theme: PanelTheme,
	/// Explicit panel size. Falls back to the container/window size.
	pub width: Option<f64>,
	/// Explicit panel height; the diagram is a square of this side.
	pub height: Option<f64>,
}

impl PanelData {
	/// The frame the panel draws.
	pub fn frame(&self) -> Option<&DataFrame> {
		self.frames.first()
	}

	/// True when the panel cannot infer its columns and the user has to
	/// pick Source/Target/Value first.
	pub fn needs_field_selection(&self) -> bool {
		let selectors = self.options.selectors();
		let field_count = self.frame().map(|f| f.fields.len()).unwrap_or(0);
		!selectors.is_complete() && field_count < 3
	}
}

/// Column-oriented table, one [`Field`] per column.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct DataFrame {
	/// Query name, if the host set one.
	pub name: Option<String>,
	/// Columns, in key order.
	pub fields: Vec<Field>,
}

impl DataFrame {
	/// Column named `name`.
	pub fn field(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Column names in field order. This is the key order of every row.
	pub fn field_names(&self) -> Vec<&str> {
		self.fields.iter().map(|f| f.name.as_str()).collect()
	}

	/// Number of rows, taken from the longest field.
	pub fn row_count(&self) -> usize {
		self.fields.iter().map(|f| f.values.len()).max().unwrap_or(0)
	}

	/// Row views in order.
	pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
		(0..self.row_count()).map(move |index| Row { frame: self, index })
	}
}

/// Row view over a [`DataFrame`].
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
	frame: &'a DataFrame,
	index: usize,
}

impl<'a> Row<'a> {
	/// Zero-based row index.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Cell for `column`. `None` when the column is absent or shorter than
	/// this row; JSON `null` cells come back as `Some(Value::Null)`.
	pub fn get(&self, column: &str) -> Option<&'a Value> {
		self.frame.field(column)?.values.get(self.index)
	}

	/// Column names of the frame, in field order.
	pub fn keys(&self) -> Vec<&'a str> {
		self.frame.field_names()
	}
}

/// One column of a frame.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Field {
	/// Column name.
	pub name: String,
	/// Cells, one per row.
	pub values: Vec<Value>,
	/// Display configuration.
	pub config: FieldConfig,
}

/// Per-field display configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
	/// Unit id, e.g. `bytes`, `percent`, `bps` or `suffix:<text>`.
	pub unit: Option<String>,
	/// Fixed number of decimals; automatic when unset.
	pub decimals: Option<u32>,
	/// Lower bound for gradients and percentage thresholds.
	pub min: Option<f64>,
	/// Upper bound for gradients and percentage thresholds.
	pub max: Option<f64>,
	/// Color mode.
	pub color: FieldColor,
	/// Value and range mappings, first match wins.
	pub mappings: Vec<ValueMapping>,
	/// Threshold steps for the `thresholds` mode.
	pub thresholds: Option<Thresholds>,
}

impl FieldConfig {
	/// Color carried by an explicit value mapping for `key`, if any.
	pub fn mapped_color(&self, key: &str) -> Option<&str> {
		self.mappings.iter().find_map(|m| match m {
			ValueMapping::Value { options } => options.get(key)?.color.as_deref(),
			_ => None,
		})
	}
}

/// Color settings of a field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldColor {
	/// How colors are picked.
	pub mode: ColorMode,
	/// Color for the `fixed` and `shades` modes.
	pub fixed_color: Option<String>,
}

/// How a field picks its colors.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
pub enum ColorMode {
	/// One color for every value.
	#[serde(rename = "fixed")]
	Fixed,
	/// Classic palette color by index.
	#[default]
	#[serde(rename = "palette-classic")]
	PaletteClassic,
	/// Color of the highest threshold step passed.
	#[serde(rename = "thresholds")]
	Thresholds,
	/// Shades of the fixed color along min..max.
	#[serde(rename = "shades")]
	Shades,
	/// Green to yellow to red along min..max.
	#[serde(rename = "continuous-GrYlRd")]
	GreenYellowRed,
	/// Red to yellow to green.
	#[serde(rename = "continuous-RdYlGr")]
	RedYellowGreen,
	/// Blue to yellow to red.
	#[serde(rename = "continuous-BlYlRd")]
	BlueYellowRed,
	/// Yellow to red.
	#[serde(rename = "continuous-YlRd")]
	YellowRed,
	/// Blue to purple.
	#[serde(rename = "continuous-BlPu")]
	BluePurple,
	/// Light to dark blue.
	#[serde(rename = "continuous-blues")]
	Blues,
	/// Light to dark red.
	#[serde(rename = "continuous-reds")]
	Reds,
	/// Light to dark green.
	#[serde(rename = "continuous-greens")]
	Greens,
	/// Light to dark purple.
	#[serde(rename = "continuous-purples")]
	Purples,
	/// The viridis scheme.
	#[serde(rename = "continuous-viridis")]
	Viridis,
	/// Any mode not listed; treated like `thresholds`.
	#[serde(other)]
	Other,
}

/// Value-to-display overrides configured on a field.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueMapping {
	/// Exact match on the value's text form.
	Value {
		options: HashMap<String, MappingResult>,
	},
	/// Inclusive numeric range; open ends are unbounded.
	Range { options: RangeOptions },
	/// Mapping kinds the panel ignores, such as special-value matches.
	#[serde(other)]
	Unsupported,
}

/// Bounds and result of a range mapping.
#[derive(Clone, Debug, Deserialize)]
pub struct RangeOptions {
	/// Inclusive lower bound.
	pub from: Option<f64>,
	/// Inclusive upper bound.
	pub to: Option<f64>,
	/// What a matching value turns into.
	pub result: MappingResult,
}

/// Replacement text and color of a mapping.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MappingResult {
	/// Display text replacing the formatted value.
	pub text: Option<String>,
	/// Color override.
	pub color: Option<String>,
}

/// Threshold steps of a field.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Thresholds {
	/// Whether step values are absolute or percentages of min..max.
	pub mode: ThresholdsMode,
	/// Ascending steps. The first step's `value` is `null` (minus infinity).
	pub steps: Vec<ThresholdStep>,
}

/// Interpretation of threshold step values.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdsMode {
	/// Compared with the raw value.
	#[default]
	Absolute,
	/// Compared with the value's percentage of min..max.
	Percentage,
}

/// One threshold step.
#[derive(Clone, Debug, Deserialize)]
pub struct ThresholdStep {
	/// Lower bound of the step; `None` for the base step.
	pub value: Option<f64>,
	/// Color from this bound up to the next step.
	pub color: String,
}

/// User-facing panel options.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChordOptions {
	/// Source column; inferred as the first column when unset.
	pub source_field: Option<String>,
	/// Target column; inferred as the second column when unset.
	pub target_field: Option<String>,
	/// Value column; inferred as the third column when unset.
	pub value_field: Option<String>,
	/// Space reserved for labels outside the ring, 1..=200.
	pub txt_length: u32,
	/// Label font size in pixels.
	pub label_size: f64,
	/// Chords take their source's color when set, else their target's.
	#[serde(alias = "colorBy", deserialize_with = "color_by_source")]
	pub color_by_source: bool,
	/// Ribbon arrowhead length, percent of the inner radius.
	pub point_length: f64,
}

impl Default for ChordOptions {
	fn default() -> Self {
		Self {
			source_field: None,
			target_field: None,
			value_field: None,
			txt_length: 100,
			label_size: 10.0,
			color_by_source: true,
			point_length: 10.0,
		}
	}
}

impl ChordOptions {
	/// Column choices with blank names treated as unset.
	pub fn selectors(&self) -> ColumnSelectors {
		ColumnSelectors {
			source: selected(&self.source_field),
			target: selected(&self.target_field),
			value: selected(&self.value_field),
		}
	}

	/// Label space with the host's 1..=200 bound applied.
	pub fn label_width(&self) -> f64 {
		self.txt_length.clamp(1, 200) as f64
	}
}

fn selected(field: &Option<String>) -> Option<String> {
	field
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
}

/// Accepts `true`/`false` or the `"source"`/`"target"` select values.
fn color_by_source<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Flag(bool),
		Name(String),
	}

	match Raw::deserialize(deserializer)? {
		Raw::Flag(flag) => Ok(flag),
		Raw::Name(name) => match name.as_str() {
			"source" => Ok(true),
			"target" => Ok(false),
			other => Err(D::Error::unknown_variant(other, &["source", "target"])),
		},
	}
}

/// Source/target/value column choices. `None` means "infer by position".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnSelectors {
	/// Source column name.
	pub source: Option<String>,
	/// Target column name.
	pub target: Option<String>,
	/// Value column name.
	pub value: Option<String>,
}

impl ColumnSelectors {
	/// True when all three columns are chosen.
	pub fn is_complete(&self) -> bool {
		self.source.is_some() && self.target.is_some() && self.value.is_some()
	}
}
