//! Field display processing: value text, unit suffix and color.
//!
//! A [`FieldDisplay`] is the panel's equivalent of the dashboard's field
//! display processor. It is built per render from a field's config and
//! answers `display(value)` with formatted text and the color the field's
//! color mode assigns to that value.

use serde_json::Value;

use super::matrix::{entity_key, numeric};
use super::theme::{Color, Palette, resolve_css};
use super::types::{ColorMode, Field, FieldConfig, ThresholdStep, ThresholdsMode, ValueMapping};

/// Formatted value ready for tooltips.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayValue {
	/// Text before the value, such as a currency sign.
	pub prefix: String,
	/// The formatted value or its mapped text.
	pub text: String,
	/// Unit text after the value, with its leading space.
	pub suffix: String,
	/// CSS color.
	pub color: String,
}

const FALLBACK_COLOR: &str = "#808080";

/// Display processor for one field.
#[derive(Clone, Debug)]
pub struct FieldDisplay<'a> {
	config: &'a FieldConfig,
	/// Position of the field in its frame; picks its classic palette color.
	series_index: usize,
	min: f64,
	max: f64,
	palette: Palette,
}

impl<'a> FieldDisplay<'a> {
	/// Processor for `field`. Min and max come from the config, else from the field's numbers.
	pub fn new(field: &'a Field, series_index: usize) -> Self {
		let numbers = || field.values.iter().filter(|v| v.is_number()).filter_map(numeric);
		let min = field
			.config
			.min
			.unwrap_or_else(|| numbers().fold(f64::INFINITY, f64::min));
		let max = field
			.config
			.max
			.unwrap_or_else(|| numbers().fold(f64::NEG_INFINITY, f64::max));
		let (min, max) = if min.is_finite() && max.is_finite() {
			(min, max)
		} else {
			(0.0, 0.0)
		};

		Self {
			config: &field.config,
			series_index,
			min,
			max,
			palette: Palette::classic(),
		}
	}

	/// The field configuration this processor reads.
	pub fn config(&self) -> &'a FieldConfig {
		self.config
	}

	/// Formats a raw cell, applying value and range mappings first.
	pub fn display(&self, value: &Value) -> DisplayValue {
		if value.is_null() {
			return DisplayValue {
				color: self.color_for_number(None),
				..Default::default()
			};
		}

		let number = numeric(value);

		let key = entity_key(value).unwrap_or_default();
		if let Some((text, color)) = self.mapping(&key, number) {
			let formatted = number.map(|n| self.format(n)).unwrap_or_else(|| DisplayValue {
				text: key.clone(),
				..Default::default()
			});
			let has_text = text.is_some();
			return DisplayValue {
				prefix: if has_text { String::new() } else { formatted.prefix },
				text: text.unwrap_or(formatted.text),
				suffix: if has_text { String::new() } else { formatted.suffix },
				color: color
					.map(resolve_css)
					.unwrap_or_else(|| self.color_for_number(number)),
			};
		}

		match number {
			Some(n) => self.unmapped(n),
			None => DisplayValue {
				text: key,
				color: self.color_for_number(None),
				..Default::default()
			},
		}
	}

	/// Display of a computed number such as an aggregate flow. Value and
	/// range mappings apply as they do to raw cells.
	pub fn display_number(&self, value: f64) -> DisplayValue {
		if value.is_finite() {
			self.display(&Value::from(value))
		} else {
			self.unmapped(value)
		}
	}

	fn unmapped(&self, value: f64) -> DisplayValue {
		DisplayValue {
			color: self.color_for_number(Some(value)),
			..self.format(value)
		}
	}

	/// Text and color of the first mapping matching `key` or `number`.
	fn mapping(&self, key: &str, number: Option<f64>) -> Option<(Option<String>, Option<&str>)> {
		self.config.mappings.iter().find_map(|m| {
			let result = match m {
				ValueMapping::Value { options } => options.get(key)?,
				ValueMapping::Range { options } => {
					let n = number?;
					let above = options.from.is_none_or(|from| n >= from);
					let below = options.to.is_none_or(|to| n <= to);
					if !(above && below) {
						return None;
					}
					&options.result
				}
				ValueMapping::Unsupported => return None,
			};
			Some((result.text.clone(), result.color.as_deref()))
		})
	}

	fn format(&self, value: f64) -> DisplayValue {
		let (prefix, text, suffix) = format_value(value, self.config.unit.as_deref(), self.config.decimals);
		DisplayValue {
			prefix,
			text,
			suffix,
			color: String::new(),
		}
	}

	/// Position of `value` within the field's min..max, in 0..=1.
	fn percent(&self, value: f64) -> f64 {
		if self.max > self.min {
			((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
		} else {
			0.0
		}
	}

	fn color_for_number(&self, value: Option<f64>) -> String {
		let fixed = || {
			self.config
				.color
				.fixed_color
				.as_deref()
				.map(resolve_css)
				.unwrap_or_else(|| FALLBACK_COLOR.to_string())
		};

		match self.config.color.mode {
			ColorMode::Fixed => fixed(),
			ColorMode::PaletteClassic => self.palette.get(self.series_index).to_string(),
			ColorMode::Shades => {
				let base = Color::parse(&fixed()).unwrap_or(Color::rgb(128, 128, 128));
				let t = value.map(|v| self.percent(v)).unwrap_or(0.0);
				base.darker(1.0).lerp(base, t).to_css()
			}
			ColorMode::Thresholds | ColorMode::Other => match value {
				Some(v) => self.threshold_color(v),
				None => self.threshold_color(f64::NEG_INFINITY),
			},
			scheme => {
				let t = value.map(|v| self.percent(v)).unwrap_or(0.0);
				gradient(scheme_stops(scheme), t).to_css()
			}
		}
	}

	fn threshold_color(&self, value: f64) -> String {
		let default_steps;
		let (steps, mode) = match &self.config.thresholds {
			Some(t) if !t.steps.is_empty() => (t.steps.as_slice(), t.mode),
			_ => {
				default_steps = default_thresholds();
				(default_steps.as_slice(), ThresholdsMode::Absolute)
			}
		};
		let probe = match mode {
			ThresholdsMode::Absolute => value,
			ThresholdsMode::Percentage => self.percent(value) * 100.0,
		};

		steps
			.iter()
			.take_while(|step| step.value.is_none_or(|v| probe >= v))
			.last()
			.or(steps.first())
			.map(|step| resolve_css(&step.color))
			.unwrap_or_else(|| FALLBACK_COLOR.to_string())
	}
}

fn default_thresholds() -> Vec<ThresholdStep> {
	vec![
		ThresholdStep {
			value: None,
			color: "green".into(),
		},
		ThresholdStep {
			value: Some(80.0),
			color: "red".into(),
		},
	]
}

fn scheme_stops(mode: ColorMode) -> &'static [&'static str] {
	match mode {
		ColorMode::GreenYellowRed => &["green", "yellow", "red"],
		ColorMode::RedYellowGreen => &["red", "yellow", "green"],
		ColorMode::BlueYellowRed => &["dark-blue", "super-light-yellow", "dark-red"],
		ColorMode::YellowRed => &["super-light-yellow", "dark-red"],
		ColorMode::BluePurple => &["blue", "purple"],
		ColorMode::Blues => &["super-light-blue", "dark-blue"],
		ColorMode::Reds => &["super-light-red", "dark-red"],
		ColorMode::Greens => &["super-light-green", "dark-green"],
		ColorMode::Purples => &["super-light-purple", "dark-purple"],
		ColorMode::Viridis => &["#440154", "#3b528b", "#21908d", "#5dc963", "#fde725"],
		_ => &["green"],
	}
}

/// Evenly spaced multi-stop gradient sampled at `t` in 0..=1.
fn gradient(stops: &[&str], t: f64) -> Color {
	let colors: Vec<Color> = stops
		.iter()
		.filter_map(|s| Color::parse(s))
		.collect();
	match colors.len() {
		0 => Color::rgb(128, 128, 128),
		1 => colors[0],
		n => {
			let scaled = t.clamp(0.0, 1.0) * (n - 1) as f64;
			let i = (scaled.floor() as usize).min(n - 2);
			colors[i].lerp(colors[i + 1], scaled - i as f64)
		}
	}
}

/// Formats `value` for `unit`, returning `(prefix, text, suffix)`.
pub fn format_value(value: f64, unit: Option<&str>, decimals: Option<u32>) -> (String, String, String) {
	if !value.is_finite() {
		return (String::new(), value.to_string(), String::new());
	}

	let unit = unit.unwrap_or("none");
	let plain = |v: f64, suffix: &str| (String::new(), to_fixed(v, decimals), suffix.to_string());

	match unit {
		"none" | "" => plain(value, ""),
		"short" => scaled(value, 1000.0, &["", " K", " Mil", " Bil", " Tri"], decimals),
		"percent" => plain(value, "%"),
		"percentunit" => plain(value * 100.0, "%"),
		"bytes" => scaled(value, 1024.0, &[" B", " KiB", " MiB", " GiB", " TiB", " PiB"], decimals),
		"decbytes" => scaled(value, 1000.0, &[" B", " kB", " MB", " GB", " TB", " PB"], decimals),
		"bps" => scaled(value, 1000.0, &[" b/s", " kb/s", " Mb/s", " Gb/s", " Tb/s", " Pb/s"], decimals),
		"Bps" => scaled(value, 1000.0, &[" B/s", " kB/s", " MB/s", " GB/s", " TB/s", " PB/s"], decimals),
		other => {
			if let Some(suffix) = other.strip_prefix("suffix:") {
				plain(value, suffix)
			} else if let Some(prefix) = other.strip_prefix("prefix:") {
				(prefix.to_string(), to_fixed(value, decimals), String::new())
			} else {
				plain(value, &format!(" {other}"))
			}
		}
	}
}

fn scaled(value: f64, base: f64, steps: &[&str], decimals: Option<u32>) -> (String, String, String) {
	let mut v = value;
	let mut step = 0;
	while v.abs() >= base && step + 1 < steps.len() {
		v /= base;
		step += 1;
	}
	(String::new(), to_fixed(v, decimals), steps[step].to_string())
}

/// Fixed decimals when configured, otherwise roughly three significant
/// digits with trailing zeros dropped.
fn to_fixed(value: f64, decimals: Option<u32>) -> String {
	match decimals {
		Some(d) => format!("{:.*}", d as usize, value),
		None if value.fract() == 0.0 => format!("{value:.0}"),
		None => {
			let magnitude = value.abs().log10().floor() as i32;
			let d = (2 - magnitude).clamp(0, 3) as usize;
			let s = format!("{value:.d$}");
			if s.contains('.') {
				s.trim_end_matches('0').trim_end_matches('.').to_string()
			} else {
				s
			}
		}
	}
}
