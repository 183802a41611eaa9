//! chord-panel: directed chord diagram panel.
//!
//! This crate provides a WASM-based component that aggregates
//! source/target/value rows into a weighted flow matrix and draws it as an
//! SVG chord diagram with arrowed ribbons, colored from field configuration.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::chord::{
	ChordError, ChordOptions, ChordPanel, ChordResult, DataFrame, Field, PanelData, Scene,
	render_chord,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("chord-panel: logging initialized");
}

/// Parse the host payload.
pub fn parse_panel_data(json: &str) -> serde_json::Result<PanelData> {
	serde_json::from_str(json)
}

/// Load panel data from a script element with id="chord-data".
/// Expected format: JSON with { frames: [...], options: {...}, theme: {...} }
fn load_panel_data() -> Option<PanelData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("chord-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_panel_data(&json_text) {
		Ok(data) => {
			info!(
				"chord-panel: loaded {} frames, first has {} rows",
				data.frames.len(),
				data.frame().map(DataFrame::row_count).unwrap_or(0)
			);
			Some(data)
		}
		Err(e) => {
			warn!("chord-panel: failed to parse panel data: {}", e);
			None
		}
	}
}

fn window_size() -> Option<(f64, f64)> {
	let window = web_sys::window()?;
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Main application component.
/// Loads panel data from the DOM and renders the chord diagram at the
/// payload's size, or the window's when the payload has none.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let panel_data = load_panel_data().unwrap_or_default();
	let (window_w, window_h) = window_size().unzip();
	let width = panel_data.width.or(window_w);
	let height = panel_data.height.or(window_h);
	let panel_signal = Signal::derive(move || panel_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Chord Diagram" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-panel">
			<ChordPanel data=panel_signal width=width height=height />
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_payload_is_an_error() {
		assert!(parse_panel_data("{ not json").is_err());
	}

	#[test]
	fn empty_payload_uses_defaults() {
		let data = parse_panel_data("{}").unwrap();
		assert!(data.frames.is_empty());
		assert_eq!(data.options, ChordOptions::default());
		assert!(data.needs_field_selection());
	}
}
