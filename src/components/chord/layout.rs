//! Directed chord layout and the arc/ribbon geometry derived from it.
//!
//! Angles are in radians, clockwise from 12 o'clock. Each group's span is
//! the sum of its outgoing and incoming flow scaled onto the circle, with a
//! constant gap between groups.

use std::cmp::Ordering;
use std::f64::consts::{FRAC_PI_2, TAU};

use super::error::{ChordError, ChordResult};
use super::matrix::AdjacencyMatrix;
use super::path::PathBuilder;

const EPSILON: f64 = 1e-12;

/// Fixed geometry parameters of the diagram.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Smallest usable outer radius; anything below is not drawn.
	pub min_radius: f64,
	/// Thickness of the outer group band.
	pub band_width: f64,
	/// Gap between the band and the label area.
	pub label_padding: f64,
	/// Gap between groups, in units of arc length at the inner radius.
	pub group_gap: f64,
	/// Gap between ribbons sharing a group, same units as `group_gap`.
	pub ribbon_gap: f64,
	/// Ribbons end this far inside the inner radius.
	pub ribbon_inset: f64,
	/// Groups narrower than this (radians) get a placeholder label.
	pub label_min_angle: f64,
	/// Length of the tick between band and label.
	pub tick_length: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			min_radius: 180.0,
			band_width: 12.0,
			label_padding: 4.0,
			group_gap: 12.0,
			ribbon_gap: 2.0,
			ribbon_inset: 2.0,
			label_min_angle: 0.025,
			tick_length: 4.0,
		}
	}
}

/// Radii for a panel of a given height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
	/// Half the panel height.
	pub radius: f64,
	/// Inner edge of the group band, where ribbons attach.
	pub inner_radius: f64,
	/// Outer edge of the group band.
	pub outer_radius: f64,
	/// Space reserved for labels beyond the band.
	pub label_width: f64,
}

impl Geometry {
	/// Fits the ring and label area into `height`. Rejects panels whose
	/// radius is under `config.min_radius`. The label reservation shrinks
	/// so that at least one unit of inner radius remains.
	pub fn new(height: f64, label_width: f64, config: &LayoutConfig) -> ChordResult<Self> {
		let radius = height / 2.0;
		if !(radius >= config.min_radius) {
			return Err(ChordError::TooSmall {
				radius,
				min: config.min_radius,
			});
		}
		let label_width = label_width
			.min(radius - config.label_padding - config.band_width - 1.0)
			.max(0.0);
		let inner_radius = radius - (label_width + config.label_padding + config.band_width);
		if inner_radius <= 0.0 {
			return Err(ChordError::TooSmall {
				radius,
				min: config.label_padding + config.band_width,
			});
		}
		Ok(Self {
			radius,
			inner_radius,
			outer_radius: inner_radius + config.band_width,
			label_width,
		})
	}
}

/// One end of a chord: a sub-span of an entity's group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChordEndpoint {
	/// Entity index.
	pub index: usize,
	/// Start of the span, radians clockwise from 12 o'clock.
	pub start_angle: f64,
	/// End of the span.
	pub end_angle: f64,
	/// Flow carried by this end.
	pub value: f64,
}

/// A directed flow from `source` to `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Chord {
	/// The span on the data source's group.
	pub source: ChordEndpoint,
	/// The span on the target's group, where the arrowhead points.
	pub target: ChordEndpoint,
}

/// One entity's outer arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChordGroup {
	/// Entity index.
	pub index: usize,
	/// Start of the arc, radians clockwise from 12 o'clock.
	pub start_angle: f64,
	/// End of the arc.
	pub end_angle: f64,
	/// Outgoing plus incoming flow.
	pub value: f64,
}

impl ChordGroup {
	/// Angular width of the arc.
	pub fn span(&self) -> f64 {
		self.end_angle - self.start_angle
	}

	/// Bisector angle, where the label and tick go.
	pub fn mid_angle(&self) -> f64 {
		(self.start_angle + self.end_angle) / 2.0
	}
}

/// Lays out `matrix` as a directed chord diagram with `pad_angle` between
/// groups.
///
/// Within a group, outgoing spans come first, largest first, followed by
/// incoming spans, smallest first. Chords are ordered by descending total
/// value. Both sorts are stable, so ties keep matrix order.
pub fn chord_directed(matrix: &AdjacencyMatrix, pad_angle: f64) -> (Vec<Chord>, Vec<ChordGroup>) {
	let n = matrix.size();
	if n == 0 {
		return (Vec::new(), Vec::new());
	}

	let sums: Vec<f64> = (0..n)
		.map(|i| (0..n).map(|j| matrix.flow(i, j) + matrix.flow(j, i)).sum())
		.collect();
	let total: f64 = sums.iter().sum();

	let k = (TAU - pad_angle * n as f64).max(0.0) / total;
	let (k, dx) = if k.is_finite() && k > 0.0 {
		(k, pad_angle)
	} else {
		(0.0, TAU / n as f64)
	};

	let mut sources: Vec<Option<ChordEndpoint>> = vec![None; n * n];
	let mut targets: Vec<Option<ChordEndpoint>> = vec![None; n * n];
	let mut groups = Vec::with_capacity(n);
	let mut x = 0.0;

	for i in 0..n {
		let x0 = x;

		// Incoming flows are keyed negative, visited from the last row down.
		let mut subgroups: Vec<(Subgroup, f64)> = (0..n)
			.rev()
			.map(|r| (Subgroup::Incoming(r), matrix.flow(r, i)))
			.chain((0..n).map(|j| (Subgroup::Outgoing(j), matrix.flow(i, j))))
			.filter(|(_, v)| *v != 0.0 && !v.is_nan())
			.collect();
		subgroups.sort_by(|a, b| descending(a.0.key(a.1), b.0.key(b.1)));

		for (sub, value) in subgroups {
			let start = x;
			x += value * k;
			let endpoint = ChordEndpoint {
				index: i,
				start_angle: start,
				end_angle: x,
				value,
			};
			match sub {
				Subgroup::Incoming(r) => targets[r * n + i] = Some(endpoint),
				Subgroup::Outgoing(j) => sources[i * n + j] = Some(endpoint),
			}
		}

		groups.push(ChordGroup {
			index: i,
			start_angle: x0,
			end_angle: x,
			value: sums[i],
		});
		x += dx;
	}

	let mut chords: Vec<Chord> = sources
		.into_iter()
		.zip(targets)
		.filter_map(|(source, target)| Some(Chord {
			source: source?,
			target: target?,
		}))
		.collect();
	chords.sort_by(|a, b| {
		descending(
			a.source.value + a.target.value,
			b.source.value + b.target.value,
		)
	});

	(chords, groups)
}

#[derive(Clone, Copy, Debug)]
enum Subgroup {
	Incoming(usize),
	Outgoing(usize),
}

impl Subgroup {
	fn key(self, value: f64) -> f64 {
		match self {
			Subgroup::Incoming(_) => -value,
			Subgroup::Outgoing(_) => value,
		}
	}
}

fn descending(a: f64, b: f64) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Complete layout for one render.
#[derive(Clone, Debug)]
pub struct ChordLayout {
	/// Radii the layout was computed for.
	pub geometry: Geometry,
	/// Chords, largest first.
	pub chords: Vec<Chord>,
	/// One group per entity, in index order.
	pub groups: Vec<ChordGroup>,
	/// Radius ribbons start and end on.
	pub ribbon_radius: f64,
	/// Angle trimmed from both sides of each ribbon end.
	pub ribbon_pad_angle: f64,
	/// Arrowhead length of every ribbon.
	pub head_radius: f64,
}

impl ChordLayout {
	/// Runs the layout. `point_length` is the arrowhead length as a
	/// percentage of the inner radius.
	pub fn compute(
		matrix: &AdjacencyMatrix,
		height: f64,
		label_width: f64,
		point_length: f64,
		config: &LayoutConfig,
	) -> ChordResult<Self> {
		let geometry = Geometry::new(height, label_width, config)?;
		let inner = geometry.inner_radius;
		let (chords, groups) = chord_directed(matrix, config.group_gap / inner);

		Ok(Self {
			geometry,
			chords,
			groups,
			ribbon_radius: inner - config.ribbon_inset,
			ribbon_pad_angle: config.ribbon_gap / inner,
			head_radius: inner * point_length.max(0.0) / 100.0,
		})
	}

	/// Band path for `group`.
	pub fn arc_path(&self, group: &ChordGroup) -> String {
		arc_path(
			group.start_angle,
			group.end_angle,
			self.geometry.inner_radius,
			self.geometry.outer_radius,
		)
	}

	/// Arrowed ribbon path for `chord`.
	pub fn ribbon_path(&self, chord: &Chord) -> String {
		ribbon_arrow_path(chord, self.ribbon_radius, self.ribbon_pad_angle, self.head_radius)
	}
}

/// Annular sector between `inner` and `outer` radius.
pub fn arc_path(start_angle: f64, end_angle: f64, inner: f64, outer: f64) -> String {
	let (r0, r1) = if outer < inner { (outer, inner) } else { (inner, outer) };
	let a0 = start_angle - FRAC_PI_2;
	let a1 = end_angle - FRAC_PI_2;
	let da = (a1 - a0).abs();
	let cw = a1 > a0;
	let mut p = PathBuilder::new();

	if r1 <= EPSILON {
		p.move_to(0.0, 0.0);
	} else if da > TAU - EPSILON {
		p.move_to(r1 * a0.cos(), r1 * a0.sin());
		p.arc(0.0, 0.0, r1, a0, a1, !cw);
		if r0 > EPSILON {
			p.move_to(r0 * a1.cos(), r0 * a1.sin());
			p.arc(0.0, 0.0, r0, a1, a0, cw);
		}
	} else {
		p.move_to(r1 * a0.cos(), r1 * a0.sin());
		p.arc(0.0, 0.0, r1, a0, a1, !cw);
		if r0 > EPSILON && da > EPSILON {
			p.arc(0.0, 0.0, r0, a1, a0, cw);
		} else {
			p.line_to(r0 * a1.cos(), r0 * a1.sin());
		}
	}
	p.close_path();
	p.finish()
}

/// Ribbon from the source span to an arrowhead on the target span.
pub fn ribbon_arrow_path(chord: &Chord, radius: f64, pad_angle: f64, head_radius: f64) -> String {
	let ap = pad_angle / 2.0;
	let (mut sa0, mut sa1) = (
		chord.source.start_angle - FRAC_PI_2,
		chord.source.end_angle - FRAC_PI_2,
	);
	let (mut ta0, mut ta1) = (
		chord.target.start_angle - FRAC_PI_2,
		chord.target.end_angle - FRAC_PI_2,
	);

	if ap > EPSILON {
		(sa0, sa1) = inset(sa0, sa1, ap);
		(ta0, ta1) = inset(ta0, ta1, ap);
	}

	let mut p = PathBuilder::new();
	p.move_to(radius * sa0.cos(), radius * sa0.sin());
	p.arc(0.0, 0.0, radius, sa0, sa1, false);
	if sa0 != ta0 || sa1 != ta1 {
		if head_radius > 0.0 {
			let neck = radius - head_radius;
			let tip = (ta0 + ta1) / 2.0;
			p.quadratic_curve_to(0.0, 0.0, neck * ta0.cos(), neck * ta0.sin());
			p.line_to(radius * tip.cos(), radius * tip.sin());
			p.line_to(neck * ta1.cos(), neck * ta1.sin());
		} else {
			p.quadratic_curve_to(0.0, 0.0, radius * ta0.cos(), radius * ta0.sin());
			p.arc(0.0, 0.0, radius, ta0, ta1, false);
		}
	}
	p.quadratic_curve_to(0.0, 0.0, radius * sa0.cos(), radius * sa0.sin());
	p.close_path();
	p.finish()
}

/// Shrinks a span by `ap` at both ends, collapsing it to its midpoint when
/// it is too narrow.
fn inset(a0: f64, a1: f64, ap: f64) -> (f64, f64) {
	if (a1 - a0).abs() > ap * 2.0 + EPSILON {
		if a1 > a0 { (a0 + ap, a1 - ap) } else { (a0 - ap, a1 + ap) }
	} else {
		let mid = (a0 + a1) / 2.0;
		(mid, mid)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matrix(rows: &[&[f64]]) -> AdjacencyMatrix {
		AdjacencyMatrix::from_rows(&rows.iter().map(|r| r.to_vec()).collect::<Vec<_>>())
	}

	fn approx(a: f64, b: f64) -> bool {
		(a - b).abs() < 1e-9
	}

	#[test]
	fn rejects_small_radius() {
		let config = LayoutConfig::default();
		assert!(matches!(
			Geometry::new(359.0, 100.0, &config),
			Err(ChordError::TooSmall { .. })
		));
		let ok = Geometry::new(360.0, 100.0, &config).unwrap();
		assert_eq!(ok.radius, 180.0);
		assert_eq!(ok.inner_radius, 180.0 - 116.0);
		assert_eq!(ok.outer_radius, ok.inner_radius + 12.0);
	}

	#[test]
	fn label_space_shrinks_to_keep_the_ring() {
		let config = LayoutConfig::default();
		let g = Geometry::new(360.0, 200.0, &config).unwrap();
		assert_eq!(g.label_width, 163.0);
		assert_eq!(g.inner_radius, 1.0);

		let g = Geometry::new(400.0, 200.0, &config).unwrap();
		assert_eq!(g.label_width, 183.0);
		assert!(g.inner_radius > 0.0);

		// room to spare: reservation kept as asked
		let g = Geometry::new(600.0, 200.0, &config).unwrap();
		assert_eq!(g.label_width, 200.0);
	}

	#[test]
	fn accepts_and_produces_geometry_at_threshold() {
		let m = matrix(&[&[0.0, 1.0], &[2.0, 0.0]]);
		let layout = ChordLayout::compute(&m, 360.0, 50.0, 10.0, &LayoutConfig::default()).unwrap();
		assert_eq!(layout.groups.len(), 2);
		assert_eq!(layout.chords.len(), 2);
		assert!(layout.groups.iter().all(|g| g.span() > 0.0));
		assert!(approx(layout.head_radius, layout.geometry.inner_radius * 0.1));
	}

	#[test]
	fn group_spans_fill_circle_minus_padding() {
		// cell [t][s]: 0 -> 1 is 10, 1 -> 0 is 5, 2 -> 0 is 5
		let m = matrix(&[&[0.0, 5.0, 5.0], &[10.0, 0.0, 0.0], &[0.0, 0.0, 0.0]]);
		let pad = 0.1;
		let (chords, groups) = chord_directed(&m, pad);

		let spans: f64 = groups.iter().map(ChordGroup::span).sum();
		assert!(approx(spans, TAU - 3.0 * pad));
		assert!(approx(groups[0].value, 20.0));
		assert!(approx(groups[1].value, 15.0));
		assert!(approx(groups[2].value, 5.0));
		assert!(approx(groups[1].start_angle, groups[0].end_angle + pad));

		assert_eq!(chords.len(), 3);
		assert_eq!((chords[0].source.index, chords[0].target.index), (0, 1));
		assert!(approx(chords[0].source.value, 10.0));
	}

	#[test]
	fn outgoing_spans_precede_incoming_within_a_group() {
		let m = matrix(&[&[0.0, 5.0], &[10.0, 0.0]]);
		let (chords, groups) = chord_directed(&m, 0.0);
		let out = chords.iter().find(|c| c.source.index == 0).unwrap();
		let inc = chords.iter().find(|c| c.target.index == 0).unwrap();
		assert!(approx(out.source.start_angle, groups[0].start_angle));
		assert!(approx(inc.target.start_angle, out.source.end_angle));
	}

	#[test]
	fn ties_keep_matrix_order() {
		let m = matrix(&[&[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0], &[1.0, 1.0, 0.0]]);
		let (chords, _) = chord_directed(&m, 0.0);
		let pairs: Vec<_> = chords
			.iter()
			.map(|c| (c.source.index, c.target.index))
			.collect();
		assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1)]);
	}

	#[test]
	fn single_self_loop_lays_out() {
		let m = matrix(&[&[4.0]]);
		let layout = ChordLayout::compute(&m, 600.0, 100.0, 10.0, &LayoutConfig::default()).unwrap();
		assert_eq!(layout.groups.len(), 1);
		assert_eq!(layout.chords.len(), 1);
		let chord = layout.chords[0];
		assert_eq!(chord.source.index, chord.target.index);
		assert!(approx(chord.source.end_angle, chord.target.start_angle));
		assert!(approx(layout.groups[0].value, 8.0));
		assert!(layout.ribbon_path(&chord).starts_with('M'));
		assert!(layout.arc_path(&layout.groups[0]).ends_with('Z'));
	}

	#[test]
	fn all_zero_matrix_has_empty_spans() {
		let m = matrix(&[&[0.0, 0.0], &[0.0, 0.0]]);
		let (chords, groups) = chord_directed(&m, 0.1);
		assert!(chords.is_empty());
		assert!(groups.iter().all(|g| g.span() == 0.0));
		assert!(approx(groups[1].start_angle, TAU / 2.0));
	}

	#[test]
	fn arc_path_for_quarter_band() {
		let d = arc_path(0.0, FRAC_PI_2, 10.0, 20.0);
		assert_eq!(d, "M0,-20A20,20,0,0,1,20,0L10,0A10,10,0,0,0,0,-10Z");
	}

	#[test]
	fn ribbon_with_head_ends_in_arrow() {
		let chord = Chord {
			source: ChordEndpoint {
				index: 0,
				start_angle: 0.0,
				end_angle: 0.5,
				value: 1.0,
			},
			target: ChordEndpoint {
				index: 1,
				start_angle: 2.0,
				end_angle: 2.5,
				value: 1.0,
			},
		};
		let d = ribbon_arrow_path(&chord, 100.0, 0.0, 10.0);
		assert_eq!(d.matches('Q').count(), 2);
		assert_eq!(d.matches('L').count(), 2);
		assert!(d.ends_with('Z'));

		let flat = ribbon_arrow_path(&chord, 100.0, 0.0, 0.0);
		assert_eq!(flat.matches('A').count(), 2);
	}
}
