//! Leptos component wrapping the chord diagram.
//!
//! The component owns an `<svg>` mount target. An effect reruns the whole
//! pipeline whenever the `data` signal changes and rewrites the target in
//! place; a failing render leaves it empty.

use leptos::prelude::*;
use log::{debug, info, warn};

use super::dom::{self, CanvasMeasure};
use super::error::ChordError;
use super::layout::LayoutConfig;
use super::render::render_chord;
use super::types::PanelData;

/// Shown instead of the diagram until the columns can be resolved.
pub const FIELD_PROMPT: &str = "Please select the Source, Target and Value fields in the panel options.";

const FALLBACK_HEIGHT: f64 = 600.0;

/// Renders a directed chord diagram from the first frame in `data`.
///
/// The diagram is a square whose side is the panel height. Explicit
/// `width`/`height` override the payload's size, which in turn overrides the
/// size of the parent container.
#[component]
pub fn ChordPanel(
	/// Host payload; every change reruns the render.
	#[prop(into)]
	data: Signal<PanelData>,
	/// Container width in pixels.
	#[prop(default = None)]
	width: Option<f64>,
	/// Diagram height in pixels.
	#[prop(default = None)]
	height: Option<f64>,
) -> impl IntoView {
	let svg_ref = NodeRef::<leptos::svg::Svg>::new();
	let measure = CanvasMeasure::new();
	let config = LayoutConfig::default();

	Effect::new(move |_| {
		let panel = data.get();
		let Some(svg) = svg_ref.get() else {
			debug!("chord-panel: {}", ChordError::NoMountTarget);
			return;
		};
		let h = height.or(panel.height).unwrap_or_else(|| {
			svg.parent_element()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(FALLBACK_HEIGHT)
		});

		let scene = match render_chord(&panel, h, &config, &measure) {
			Ok(scene) => {
				info!(
					"chord-panel: drew {} groups, {} ribbons",
					scene.groups.len(),
					scene.ribbons.len()
				);
				Some(scene)
			}
			Err(e @ (ChordError::NoFrame | ChordError::NoData)) => {
				info!("chord-panel: nothing to draw: {e}");
				None
			}
			Err(e) => {
				warn!("chord-panel: render failed: {e}");
				None
			}
		};

		if let Err(e) = dom::mount(&svg, scene.as_ref()) {
			warn!("chord-panel: failed to write svg: {e:?}");
		}
	});

	let needs_fields = move || data.with(PanelData::needs_field_selection);
	let style = move || {
		let w = width.or(data.with(|d| d.width));
		match w {
			Some(w) => format!("width: {w}px; display: flex; justify-content: center;"),
			None => "width: 100%; display: flex; justify-content: center;".to_string(),
		}
	};

	view! {
		<div class="chord-panel" style=style>
			<Show
				when=move || !needs_fields()
				fallback=|| view! { <div class="chord-panel-prompt">{FIELD_PROMPT}</div> }
			>
				<svg node_ref=svg_ref class="chord-panel-svg" style="display: block;" />
			</Show>
		</div>
	}
}
