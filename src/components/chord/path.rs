//! SVG path data built with canvas-style drawing verbs.
//!
//! Mirrors the `CanvasRenderingContext2d` path API (`move_to`, `line_to`,
//! `arc`, `quadratic_curve_to`, `close_path`) but serializes to an SVG `d`
//! attribute so the same geometry can be drawn as DOM elements.

use std::f64::consts::{PI, TAU};
use std::fmt::Write;

const EPSILON: f64 = 1e-6;

#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
	out: String,
	start: Option<(f64, f64)>,
	current: Option<(f64, f64)>,
}

impl PathBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn move_to(&mut self, x: f64, y: f64) {
		let _ = write!(self.out, "M{},{}", num(x), num(y));
		self.start = Some((x, y));
		self.current = Some((x, y));
	}

	pub fn line_to(&mut self, x: f64, y: f64) {
		let _ = write!(self.out, "L{},{}", num(x), num(y));
		self.current = Some((x, y));
	}

	pub fn quadratic_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
		let _ = write!(self.out, "Q{},{},{},{}", num(cx), num(cy), num(x), num(y));
		self.current = Some((x, y));
	}

	/// Circular arc around `(x, y)` from angle `a0` to `a1`, clockwise unless
	/// `ccw`. Connects from the current point with a line when needed.
	pub fn arc(&mut self, x: f64, y: f64, r: f64, a0: f64, a1: f64, ccw: bool) {
		let (dx, dy) = (r * a0.cos(), r * a0.sin());
		let (x0, y0) = (x + dx, y + dy);
		let sweep = u8::from(!ccw);
		let mut da = if ccw { a0 - a1 } else { a1 - a0 };

		match self.current {
			None => self.move_to(x0, y0),
			Some((cx, cy)) if (cx - x0).abs() > EPSILON || (cy - y0).abs() > EPSILON => {
				self.line_to(x0, y0)
			}
			Some(_) => {}
		}

		if r == 0.0 {
			return;
		}
		if da < 0.0 {
			da = da % TAU + TAU;
		}

		let r_s = num(r);
		if da > TAU - EPSILON {
			// Full circle: two half arcs, ending back at the start point.
			let _ = write!(
				self.out,
				"A{r_s},{r_s},0,1,{sweep},{},{}A{r_s},{r_s},0,1,{sweep},{},{}",
				num(x - dx),
				num(y - dy),
				num(x0),
				num(y0)
			);
			self.current = Some((x0, y0));
		} else if da > EPSILON {
			let (x1, y1) = (x + r * a1.cos(), y + r * a1.sin());
			let large = u8::from(da >= PI);
			let _ = write!(
				self.out,
				"A{r_s},{r_s},0,{large},{sweep},{},{}",
				num(x1),
				num(y1)
			);
			self.current = Some((x1, y1));
		}
	}

	pub fn close_path(&mut self) {
		if self.current.is_some() {
			self.current = self.start;
			self.out.push('Z');
		}
	}

	pub fn finish(self) -> String {
		self.out
	}
}

/// Three decimals, trailing zeros trimmed, no negative zero.
pub fn num(v: f64) -> String {
	let rounded = (v * 1000.0).round() / 1000.0;
	let s = format!("{:.3}", if rounded == 0.0 { 0.0 } else { rounded });
	s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::f64::consts::FRAC_PI_2;

	#[test]
	fn formats_numbers_compactly() {
		assert_eq!(num(1.0), "1");
		assert_eq!(num(-0.0001), "0");
		assert_eq!(num(2.5), "2.5");
		assert_eq!(num(1.23456), "1.235");
		assert_eq!(num(-10.0), "-10");
	}

	#[test]
	fn quarter_arc_from_empty_path() {
		let mut p = PathBuilder::new();
		p.arc(0.0, 0.0, 10.0, 0.0, FRAC_PI_2, false);
		assert_eq!(p.finish(), "M10,0A10,10,0,0,1,0,10");
	}

	#[test]
	fn arc_connects_with_line_and_sweeps_ccw() {
		let mut p = PathBuilder::new();
		p.move_to(0.0, 0.0);
		p.arc(0.0, 0.0, 10.0, FRAC_PI_2, 0.0, true);
		assert_eq!(p.finish(), "M0,0L0,10A10,10,0,0,0,10,0");
	}

	#[test]
	fn full_circle_is_two_halves() {
		let mut p = PathBuilder::new();
		p.arc(0.0, 0.0, 5.0, 0.0, TAU, false);
		assert_eq!(p.finish(), "M5,0A5,5,0,1,1,-5,0A5,5,0,1,1,5,0");
	}

	#[test]
	fn close_returns_to_start() {
		let mut p = PathBuilder::new();
		p.move_to(1.0, 1.0);
		p.line_to(2.0, 2.0);
		p.quadratic_curve_to(0.0, 0.0, 3.0, 3.0);
		p.close_path();
		assert_eq!(p.current, Some((1.0, 1.0)));
		assert_eq!(p.finish(), "M1,1L2,2Q0,0,3,3Z");
	}
}
