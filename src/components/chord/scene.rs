//! Drawable scene: typed shapes plus their SVG element tree.
//!
//! A [`Scene`] is plain data. [`Scene::to_nodes`] turns it into
//! [`SvgNode`]s, which the DOM writer mounts and
//! [`Scene::to_svg_string`] serializes.

use std::fmt::Write;

use super::path::num;

/// Text anchor of a group label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
	/// Text starts at the anchor point.
	Start,
	/// Text ends at the anchor point.
	End,
}

impl TextAnchor {
	/// SVG `text-anchor` value.
	pub fn as_str(self) -> &'static str {
		match self {
			TextAnchor::Start => "start",
			TextAnchor::End => "end",
		}
	}
}

/// A flow ribbon.
#[derive(Clone, Debug, PartialEq)]
pub struct Ribbon {
	/// Source entity index.
	pub source: usize,
	/// Target entity index.
	pub target: usize,
	/// SVG path data.
	pub path: String,
	/// CSS fill color.
	pub fill: String,
	/// CSS stroke color, a darker shade of the fill.
	pub stroke: String,
	/// Tooltip text.
	pub title: String,
}

/// Radial label placed along a group's bisector.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	/// Bisector angle in degrees, 0 pointing right.
	pub rotation: f64,
	/// Distance from the center to the label's middle.
	pub offset: f64,
	/// Which end of the text sits at the anchor point.
	pub anchor: TextAnchor,
	/// Turned 180 degrees so text on the lower half reads upright.
	pub flipped: bool,
	/// Wrapped label lines, top to bottom.
	pub lines: Vec<String>,
}

/// Short radial line between a group's band and its label.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
	/// Bisector angle in degrees, 0 pointing right.
	pub rotation: f64,
	/// Distance from the center to the tick's inner end.
	pub offset: f64,
	/// Tick length.
	pub length: f64,
	/// CSS stroke color.
	pub stroke: String,
}

/// One entity's band with its label and tick.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupShape {
	/// Entity index.
	pub index: usize,
	/// SVG path data of the band.
	pub path: String,
	/// CSS fill color.
	pub fill: String,
	/// CSS stroke color.
	pub stroke: String,
	/// Tooltip text.
	pub title: String,
	/// Name label outside the band.
	pub label: Label,
	/// Tick between band and label.
	pub tick: Tick,
}

/// Everything one render draws.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
	/// Side of the square, centered view box.
	pub size: f64,
	/// Label font size in pixels.
	pub font_size: f64,
	/// Label fill color.
	pub text_color: String,
	/// Ribbons, drawn first.
	pub ribbons: Vec<Ribbon>,
	/// Group bands with labels and ticks, drawn over the ribbons.
	pub groups: Vec<GroupShape>,
}

impl Scene {
	/// `viewBox` centering the diagram on the origin.
	pub fn view_box(&self) -> String {
		let half = num(-self.size / 2.0);
		format!("{half} {half} {} {}", num(self.size), num(self.size))
	}

	/// Element tree: a ribbon layer followed by a group layer.
	pub fn to_nodes(&self) -> Vec<SvgNode> {
		let ribbons = SvgNode::new("g")
			.attr("fill-opacity", "0.99")
			.children(self.ribbons.iter().map(|r| {
				SvgNode::new("path")
					.attr("d", &r.path)
					.attr("fill", &r.fill)
					.attr("stroke", &r.stroke)
					.attr("style", "mix-blend-mode: normal")
					.child(SvgNode::new("title").text(&r.title))
			}));

		let groups = SvgNode::new("g")
			.attr("font-family", "sans-serif")
			.attr("font-size", num(self.font_size))
			.children(self.groups.iter().map(|g| self.group_node(g)));

		vec![ribbons, groups]
	}

	fn group_node(&self, g: &GroupShape) -> SvgNode {
		let band = SvgNode::new("path")
			.attr("d", &g.path)
			.attr("fill", &g.fill)
			.attr("stroke", &g.stroke)
			.child(SvgNode::new("title").text(&g.title));

		let mut text = SvgNode::new("text").attr("text-anchor", g.label.anchor.as_str());
		if g.label.flipped {
			text = text.attr("transform", "rotate(180)");
		}
		text = text.children(g.label.lines.iter().enumerate().map(|(i, line)| {
			SvgNode::new("tspan")
				.attr("text-anchor", "middle")
				.attr("x", "0")
				.attr("dy", if i == 0 { ".35em" } else { ".9em" })
				.text(line)
		}));

		let label = SvgNode::new("g")
			.attr("transform", radial(g.label.rotation, g.label.offset))
			.attr("fill", &self.text_color)
			.child(text);

		let tick = SvgNode::new("line")
			.attr("transform", radial(g.tick.rotation, g.tick.offset))
			.attr("stroke", &g.tick.stroke)
			.attr("x2", num(g.tick.length));

		SvgNode::new("g").child(band).child(label).child(tick)
	}

	/// Standalone SVG document for the scene.
	pub fn to_svg_string(&self) -> String {
		let mut out = format!(
			r#"<svg xmlns="{SVG_NS}" viewBox="{}" width="{}" height="{}">"#,
			self.view_box(),
			num(self.size),
			num(self.size)
		);
		for node in self.to_nodes() {
			node.write_to(&mut out);
		}
		out.push_str("</svg>");
		out
	}
}

/// Namespace of every element the scene creates.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

fn radial(rotation: f64, offset: f64) -> String {
	format!("rotate({}) translate({},0)", num(rotation), num(offset))
}

/// An SVG element with attributes, optional text and children.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgNode {
	/// Element name.
	pub tag: &'static str,
	/// Attributes in insertion order.
	pub attrs: Vec<(&'static str, String)>,
	/// Text content, written before any children.
	pub text: Option<String>,
	/// Child elements.
	pub children: Vec<SvgNode>,
}

impl SvgNode {
	/// Empty element named `tag`.
	pub fn new(tag: &'static str) -> Self {
		Self {
			tag,
			attrs: Vec::new(),
			text: None,
			children: Vec::new(),
		}
	}

	/// Adds an attribute.
	pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
		self.attrs.push((name, value.into()));
		self
	}

	/// Sets the text content.
	pub fn text(mut self, text: impl Into<String>) -> Self {
		self.text = Some(text.into());
		self
	}

	/// Appends one child.
	pub fn child(mut self, child: SvgNode) -> Self {
		self.children.push(child);
		self
	}

	/// Appends several children.
	pub fn children(mut self, children: impl IntoIterator<Item = SvgNode>) -> Self {
		self.children.extend(children);
		self
	}

	/// Value of attribute `name`.
	#[cfg(test)]
	pub fn get(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(k, _)| *k == name)
			.map(|(_, v)| v.as_str())
	}

	fn write_to(&self, out: &mut String) {
		let _ = write!(out, "<{}", self.tag);
		for (name, value) in &self.attrs {
			let _ = write!(out, r#" {name}="{}""#, escape(value));
		}
		out.push('>');
		if let Some(text) = &self.text {
			out.push_str(&escape(text));
		}
		for child in &self.children {
			child.write_to(out);
		}
		let _ = write!(out, "</{}>", self.tag);
	}
}

fn escape(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			_ => out.push(c),
		}
	}
	out
}
