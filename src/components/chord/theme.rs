//! Colors, the classic series palette and the host theme.

use serde::Deserialize;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha, 0..=1.
	pub a: f64,
}

/// Channel multiplier for one [`Color::darker`] step.
const DARKER: f64 = 0.7;

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Darken by `k` steps, each step scaling every channel by 0.7.
	pub fn darker(self, k: f64) -> Self {
		let f = DARKER.powf(k);
		Self {
			r: (self.r as f64 * f).round().clamp(0.0, 255.0) as u8,
			g: (self.g as f64 * f).round().clamp(0.0, 255.0) as u8,
			b: (self.b as f64 * f).round().clamp(0.0, 255.0) as u8,
			a: self.a,
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// Lowercase `#rrggbb`, or `rgba(...)` when translucent.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses hex (`#rgb`, `#rrggbb`, `#rrggbbaa`), `rgb()`/`rgba()` and the
	/// host's named colors.
	pub fn parse(input: &str) -> Option<Color> {
		let s = input.trim();
		if let Some(hex) = s.strip_prefix('#') {
			return parse_hex(hex);
		}
		if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			let channel = |i: usize| nums.get(i).and_then(|n| n.parse::<f64>().ok());
			let (r, g, b) = (channel(0)?, channel(1)?, channel(2)?);
			let a = channel(3).unwrap_or(1.0);
			return Some(Color::rgba(r as u8, g as u8, b as u8, a));
		}
		named_color(s).and_then(parse_hex_str)
	}
}

fn parse_hex_str(s: &str) -> Option<Color> {
	parse_hex(s.strip_prefix('#')?)
}

fn parse_hex(hex: &str) -> Option<Color> {
	let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
	match hex.len() {
		3 => {
			let nib = |i: usize| {
				let v = u8::from_str_radix(hex.get(i..i + 1)?, 16).ok()?;
				Some(v * 17)
			};
			Some(Color::rgb(nib(0)?, nib(1)?, nib(2)?))
		}
		6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
		8 => Some(Color::rgba(
			byte(0)?,
			byte(2)?,
			byte(4)?,
			byte(6)? as f64 / 255.0,
		)),
		_ => None,
	}
}

/// Resolves a configured color (named or CSS) to a CSS string. Unknown
/// strings pass through so the browser gets a chance at them.
pub fn resolve_css(color: &str) -> String {
	match named_color(color) {
		Some(hex) => hex.to_string(),
		None => color.to_string(),
	}
}

/// Stroke color for a fill: one `darker` step. Unparseable input is kept.
pub fn darker_css(color: &str) -> String {
	Color::parse(color)
		.map(|c| c.darker(1.0).to_css())
		.unwrap_or_else(|| color.to_string())
}

/// The dashboard's named visualization colors.
pub fn named_color(name: &str) -> Option<&'static str> {
	let hex = match name {
		"super-light-red" => "#FFA6B0",
		"light-red" => "#FF7383",
		"red" => "#F2495C",
		"semi-dark-red" => "#E02F44",
		"dark-red" => "#C4162A",
		"super-light-orange" => "#FFCB7D",
		"light-orange" => "#FFB357",
		"orange" => "#FF9830",
		"semi-dark-orange" => "#FA6400",
		"dark-orange" => "#FA6400",
		"super-light-yellow" => "#FFF899",
		"light-yellow" => "#FFEE52",
		"yellow" => "#FADE2A",
		"semi-dark-yellow" => "#F2CC0C",
		"dark-yellow" => "#E0B400",
		"super-light-green" => "#C8F2C2",
		"light-green" => "#96D98D",
		"green" => "#73BF69",
		"semi-dark-green" => "#56A64B",
		"dark-green" => "#37872D",
		"super-light-blue" => "#C0D8FF",
		"light-blue" => "#8AB8FF",
		"blue" => "#5794F2",
		"semi-dark-blue" => "#3274D9",
		"dark-blue" => "#1F60C4",
		"super-light-purple" => "#DEB6F2",
		"light-purple" => "#CA95E5",
		"purple" => "#B877D9",
		"semi-dark-purple" => "#A352CC",
		"dark-purple" => "#8F3BB8",
		"transparent" => "#00000000",
		"white" => "#FFFFFF",
		"black" => "#000000",
		_ => return None,
	};
	Some(hex)
}

/// The classic series palette, assigned by index and cycling.
#[derive(Clone, Debug)]
pub struct Palette {
	colors: Vec<&'static str>,
}

impl Palette {
	/// The 56 colors of the classic palette.
	pub fn classic() -> Self {
		Self {
			colors: vec![
				"#7EB26D", "#EAB839", "#6ED0E0", "#EF843C", "#E24D42", "#1F78C1", "#BA43A6",
				"#705DA0", "#508642", "#CCA300", "#447EBC", "#C15C17", "#890F02", "#0A437C",
				"#6D1F62", "#584477", "#B7DBAB", "#F4D598", "#70DBED", "#F9BA8F", "#F29191",
				"#82B5D8", "#E5A8E2", "#AEA2E0", "#629E51", "#E5AC0E", "#64B0C8", "#E0752D",
				"#BF1B00", "#0A50A1", "#962D82", "#614D93", "#9AC48A", "#F2C96D", "#65C5DB",
				"#F9934E", "#EA6460", "#5195CE", "#D683CE", "#806EB7", "#3F6833", "#967302",
				"#2F575E", "#99440A", "#58140C", "#052B51", "#511749", "#3F2B5B", "#E0F9D7",
				"#FCEACA", "#CFFAFF", "#F9E2D2", "#FCE2DE", "#BADFF4", "#F9D9F9", "#DEDAF7",
			],
		}
	}

	/// Number of colors before the palette repeats.
	pub fn len(&self) -> usize {
		self.colors.len()
	}

	/// Always false for the classic palette.
	pub fn is_empty(&self) -> bool {
		self.colors.is_empty()
	}

	/// Color for series `index`, cycling.
	pub fn get(&self, index: usize) -> &'static str {
		self.colors[index % self.colors.len()]
	}
}

impl Default for Palette {
	fn default() -> Self {
		Self::classic()
	}
}

/// The parts of the host theme the panel draws with.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PanelTheme {
	/// Primary text color, used for labels.
	pub text_color: String,
}

impl Default for PanelTheme {
	fn default() -> Self {
		Self {
			text_color: "#ccccdc".to_string(),
		}
	}
}
