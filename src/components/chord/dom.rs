//! Browser side: writes a [`Scene`] into a mounted `<svg>` and measures
//! label text with a 2D canvas context.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement};

use super::scene::{SVG_NS, Scene, SvgNode};
use super::wrap::{ApproxMeasure, TextMeasure};

/// Removes every child of `target`.
pub fn clear(target: &Element) -> Result<(), JsValue> {
	while let Some(child) = target.first_child() {
		target.remove_child(&child)?;
	}
	Ok(())
}

/// Replaces the content of `target` with `scene`. With no scene the target
/// is left empty, so a failed render never shows a stale diagram.
pub fn mount(target: &Element, scene: Option<&Scene>) -> Result<(), JsValue> {
	clear(target)?;
	let Some(scene) = scene else {
		return Ok(());
	};

	let document = target
		.owner_document()
		.ok_or_else(|| JsValue::from_str("mount target is detached from a document"))?;
	let size = scene.size.to_string();
	target.set_attribute("viewBox", &scene.view_box())?;
	target.set_attribute("width", &size)?;
	target.set_attribute("height", &size)?;

	let mut sink = DomSink { document: &document };
	for node in scene.to_nodes() {
		let element = build(&mut sink, &node)?;
		target.append_child(&element)?;
	}
	Ok(())
}

/// Destination of an [`SvgNode`] tree.
pub trait SvgSink {
	/// Handle to a created element.
	type Node;
	/// Failure reported by the sink.
	type Error;

	/// Creates a detached element with the node's attributes and text.
	fn create(&mut self, node: &SvgNode) -> Result<Self::Node, Self::Error>;

	/// Attaches `child` as the last child of `parent`.
	fn append(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), Self::Error>;
}

/// Creates `node` and its subtree in `sink`, returning the root.
pub fn build<S: SvgSink>(sink: &mut S, node: &SvgNode) -> Result<S::Node, S::Error> {
	let element = sink.create(node)?;
	for child in &node.children {
		let child = build(sink, child)?;
		sink.append(&element, &child)?;
	}
	Ok(element)
}

struct DomSink<'a> {
	document: &'a Document,
}

impl SvgSink for DomSink<'_> {
	type Node = Element;
	type Error = JsValue;

	fn create(&mut self, node: &SvgNode) -> Result<Element, JsValue> {
		let element = self.document.create_element_ns(Some(SVG_NS), node.tag)?;
		for (name, value) in &node.attrs {
			element.set_attribute(name, value)?;
		}
		if let Some(text) = &node.text {
			element.set_text_content(Some(text));
		}
		Ok(element)
	}

	fn append(&mut self, parent: &Element, child: &Element) -> Result<(), JsValue> {
		parent.append_child(child)?;
		Ok(())
	}
}

/// Measures text with an offscreen canvas, falling back to
/// [`ApproxMeasure`] when no 2D context is available.
pub struct CanvasMeasure {
	ctx: Option<CanvasRenderingContext2d>,
	fallback: ApproxMeasure,
}

impl CanvasMeasure {
	/// Creates the offscreen canvas, if a document is available.
	pub fn new() -> Self {
		Self {
			ctx: offscreen_context(),
			fallback: ApproxMeasure::default(),
		}
	}
}

impl Default for CanvasMeasure {
	fn default() -> Self {
		Self::new()
	}
}

fn offscreen_context() -> Option<CanvasRenderingContext2d> {
	let document = web_sys::window()?.document()?;
	let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

impl TextMeasure for CanvasMeasure {
	fn width(&self, text: &str, font_size: f64) -> f64 {
		let Some(ctx) = &self.ctx else {
			return self.fallback.width(text, font_size);
		};
		ctx.set_font(&format!("{font_size}px sans-serif"));
		ctx.measure_text(text)
			.map(|m| m.width())
			.unwrap_or_else(|_| self.fallback.width(text, font_size))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::chord::scene::{GroupShape, Label, Ribbon, TextAnchor, Tick};

	/// Flat arena of created elements; `Node` is an index into it.
	#[derive(Default)]
	struct Arena {
		tags: Vec<&'static str>,
		children: Vec<Vec<usize>>,
	}

	impl SvgSink for Arena {
		type Node = usize;
		type Error = String;

		fn create(&mut self, node: &SvgNode) -> Result<usize, String> {
			self.tags.push(node.tag);
			self.children.push(Vec::new());
			Ok(self.tags.len() - 1)
		}

		fn append(&mut self, parent: &usize, child: &usize) -> Result<(), String> {
			self.children[*parent].push(*child);
			Ok(())
		}
	}

	/// Fails on the first element with `tag`.
	struct Refuse(&'static str);

	impl SvgSink for Refuse {
		type Node = ();
		type Error = String;

		fn create(&mut self, node: &SvgNode) -> Result<(), String> {
			if node.tag == self.0 {
				Err(format!("cannot create {}", node.tag))
			} else {
				Ok(())
			}
		}

		fn append(&mut self, _: &(), _: &()) -> Result<(), String> {
			Ok(())
		}
	}

	fn scene() -> Scene {
		Scene {
			size: 400.0,
			font_size: 10.0,
			text_color: "#fff".into(),
			ribbons: vec![Ribbon {
				source: 0,
				target: 0,
				path: "M0,0Z".into(),
				fill: "#7EB26D".into(),
				stroke: "#587d4c".into(),
				title: "A to A : 1".into(),
			}],
			groups: vec![GroupShape {
				index: 0,
				path: "M1,1Z".into(),
				fill: "#7EB26D".into(),
				stroke: "#587d4c".into(),
				title: "A Total : 2".into(),
				label: Label {
					rotation: 0.0,
					offset: 150.0,
					anchor: TextAnchor::Start,
					flipped: false,
					lines: vec!["A".into()],
				},
				tick: Tick {
					rotation: 0.0,
					offset: 100.0,
					length: 4.0,
					stroke: "#587d4c".into(),
				},
			}],
		}
	}

	#[test]
	fn build_appends_every_child_under_its_parent() {
		let mut arena = Arena::default();
		let roots: Vec<usize> = scene()
			.to_nodes()
			.iter()
			.map(|node| build(&mut arena, node).unwrap())
			.collect();

		// ribbons g > path > title
		let ribbon = arena.children[roots[0]][0];
		assert_eq!(arena.tags[ribbon], "path");
		assert_eq!(arena.tags[arena.children[ribbon][0]], "title");

		// groups g > g > (path, g > text > tspan, line)
		let group = arena.children[roots[1]][0];
		let parts: Vec<&str> = arena.children[group].iter().map(|&i| arena.tags[i]).collect();
		assert_eq!(parts, vec!["path", "g", "line"]);
		let text = arena.children[arena.children[group][1]][0];
		assert_eq!(arena.tags[arena.children[text][0]], "tspan");

		// 2 roots, ribbon path + title, group g, band + title, label g, text, tspan, tick
		assert_eq!(arena.tags.len(), 11);
	}

	#[test]
	fn build_stops_at_first_failure() {
		let nodes = scene().to_nodes();
		assert_eq!(build(&mut Refuse("text"), &nodes[0]), Ok(()));
		assert_eq!(
			build(&mut Refuse("text"), &nodes[1]),
			Err("cannot create text".to_string())
		);
	}
}
