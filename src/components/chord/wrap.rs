//! Label text measurement and greedy word wrapping.

/// Measures rendered text width.
pub trait TextMeasure {
	/// Width of `text` at `font_size` pixels, in pixels.
	fn width(&self, text: &str, font_size: f64) -> f64;
}

/// Width estimate from an average glyph width, for use outside a browser.
#[derive(Clone, Copy, Debug)]
pub struct ApproxMeasure {
	/// Average glyph width as a fraction of the font size.
	pub glyph_ratio: f64,
}

impl Default for ApproxMeasure {
	fn default() -> Self {
		Self { glyph_ratio: 0.6 }
	}
}

impl TextMeasure for ApproxMeasure {
	fn width(&self, text: &str, font_size: f64) -> f64 {
		text.chars().count() as f64 * font_size * self.glyph_ratio
	}
}

/// Splits `text` into lines no wider than `max_width`.
///
/// Words are appended to the current line until the next one would overflow
/// it; that word then starts a new line. A word wider than `max_width` on
/// its own is kept whole on its own line. Always returns at least one line.
pub fn wrap_words(text: &str, max_width: f64, font_size: f64, measure: &dyn TextMeasure) -> Vec<String> {
	let mut lines = Vec::new();
	let mut line = String::new();

	for word in text.split_whitespace() {
		if line.is_empty() {
			line.push_str(word);
			continue;
		}
		let candidate = format!("{line} {word}");
		if measure.width(&candidate, font_size) > max_width {
			lines.push(std::mem::replace(&mut line, word.to_string()));
		} else {
			line = candidate;
		}
	}

	if !line.is_empty() || lines.is_empty() {
		lines.push(line);
	}
	lines
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	/// One unit per character.
	struct Chars;

	impl TextMeasure for Chars {
		fn width(&self, text: &str, _font_size: f64) -> f64 {
			text.chars().count() as f64
		}
	}

	#[test]
	fn wraps_greedily() {
		let lines = wrap_words("the quick brown fox jumps", 10.0, 10.0, &Chars);
		assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
	}

	#[test]
	fn oversized_word_gets_its_own_line() {
		let lines = wrap_words("a enormousword b", 5.0, 10.0, &Chars);
		assert_eq!(lines, vec!["a", "enormousword", "b"]);

		let first = wrap_words("enormousword tail", 5.0, 10.0, &Chars);
		assert_eq!(first, vec!["enormousword", "tail"]);
	}

	#[test]
	fn empty_text_is_one_empty_line() {
		assert_eq!(wrap_words("   ", 10.0, 10.0, &Chars), vec![String::new()]);
	}

	#[test]
	fn approx_scales_with_font_size() {
		let m = ApproxMeasure::default();
		assert_eq!(m.width("abcd", 10.0), 24.0);
		assert_eq!(m.width("abcd", 20.0), 48.0);
	}

	proptest! {
		#[test]
		fn lines_fit_unless_single_word(
			words in prop::collection::vec("[a-z]{1,15}", 0..20),
			width in 1.0f64..40.0,
		) {
			let text = words.join(" ");
			let lines = wrap_words(&text, width, 10.0, &Chars);
			for line in &lines {
				let fits = Chars.width(line, 10.0) <= width;
				let single = line.split_whitespace().count() <= 1;
				prop_assert!(fits || single, "line {:?} exceeds {}", line, width);
			}
			let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
			prop_assert_eq!(rejoined, words.iter().map(String::as_str).collect::<Vec<_>>());
		}
	}
}
