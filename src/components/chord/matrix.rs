//! Aggregation of source/target/value rows into a weighted adjacency matrix.
//!
//! Entities are indexed in first-seen order over the whole frame (a row's
//! source before its target). The matrix is stored row-major with rows
//! keyed by target and columns by source, so cell `[t][s]` holds the total
//! flow from `s` to `t`.

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use super::error::{ChordError, ChordResult};
use super::types::{ColumnSelectors, DataFrame};

/// Concrete column names after positional inference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedColumns {
	/// Column holding source identifiers.
	pub source: String,
	/// Column holding target identifiers.
	pub target: String,
	/// Column holding flow weights.
	pub value: String,
}

/// Resolves each unset selector to the column at its fixed position
/// (source 0, target 1, value 2) in `keys`, the first row's key order.
pub fn resolve_columns(selectors: &ColumnSelectors, keys: &[&str]) -> ChordResult<ResolvedColumns> {
	let pick = |selector: &'static str, chosen: &Option<String>, position: usize| match chosen {
		Some(name) if keys.contains(&name.as_str()) => Ok(name.clone()),
		Some(name) => Err(ChordError::missing_column(selector, name.as_str())),
		None => keys
			.get(position)
			.map(|k| k.to_string())
			.ok_or_else(|| ChordError::missing_column(selector, format!("#{position}"))),
	};

	Ok(ResolvedColumns {
		source: pick("source", &selectors.source, 0)?,
		target: pick("target", &selectors.target, 1)?,
		value: pick("value", &selectors.value, 2)?,
	})
}

/// Bidirectional entity name <-> index lookup. Built once per render.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NameIndex {
	names: Vec<String>,
	index: HashMap<String, usize>,
}

impl NameIndex {
	/// Deduplicates `names`, keeping first-seen order.
	pub fn from_names<I, S>(names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut out = Self::default();
		for name in names {
			let name = name.into();
			if !out.index.contains_key(&name) {
				out.index.insert(name.clone(), out.names.len());
				out.names.push(name);
			}
		}
		out
	}

	/// Index of `name`, if it was seen.
	pub fn index_of(&self, name: &str) -> Option<usize> {
		self.index.get(name).copied()
	}

	/// Name at `index`.
	pub fn name(&self, index: usize) -> Option<&str> {
		self.names.get(index).map(String::as_str)
	}

	/// Name for `index`, or an empty string for an index out of range.
	pub fn label(&self, index: usize) -> &str {
		self.name(index).unwrap_or_default()
	}

	#[cfg(test)]
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Number of distinct entities.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	/// True when no entity was seen.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

/// Square matrix, rows keyed by target entity, columns by source entity.
#[derive(Clone, Debug, PartialEq)]
pub struct AdjacencyMatrix {
	size: usize,
	cells: Vec<f64>,
}

impl AdjacencyMatrix {
	/// All-zero `size` by `size` matrix.
	pub fn zeros(size: usize) -> Self {
		Self {
			size,
			cells: vec![0.0; size * size],
		}
	}

	/// Builds from nested rows. Rows shorter than the row count are padded
	/// with zeros.
	#[cfg(test)]
	pub fn from_rows(rows: &[Vec<f64>]) -> Self {
		let mut matrix = Self::zeros(rows.len());
		for (r, row) in rows.iter().enumerate() {
			for (c, v) in row.iter().take(rows.len()).enumerate() {
				matrix.cells[r * matrix.size + c] = *v;
			}
		}
		matrix
	}

	/// Number of rows (and columns).
	pub fn size(&self) -> usize {
		self.size
	}

	/// Raw cell `[row][col]`.
	pub fn get(&self, row: usize, col: usize) -> f64 {
		self.cells[row * self.size + col]
	}

	/// Total flow from `source` to `target`.
	pub fn flow(&self, source: usize, target: usize) -> f64 {
		self.get(target, source)
	}

	/// Adds `value` to the `source -> target` cell.
	pub fn add_flow(&mut self, source: usize, target: usize, value: f64) {
		self.cells[target * self.size + source] += value;
	}

	/// Copies the cells out as nested rows.
	#[cfg(test)]
	pub fn to_rows(&self) -> Vec<Vec<f64>> {
		self.cells.chunks(self.size.max(1)).map(<[f64]>::to_vec).collect()
	}
}

/// Output of [`build_matrix`].
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixData {
	/// Aggregated flows.
	pub matrix: AdjacencyMatrix,
	/// Entity names in matrix order.
	pub names: NameIndex,
	/// The columns the rows were read from.
	pub columns: ResolvedColumns,
}

/// Builds the adjacency matrix for `frame`.
///
/// Fails as a whole when any row lacks a source or target value.
pub fn build_matrix(frame: &DataFrame, selectors: &ColumnSelectors) -> ChordResult<MatrixData> {
	let Some(first) = frame.rows().next() else {
		return Err(ChordError::NoData);
	};
	let columns = resolve_columns(selectors, &first.keys())?;

	let mut endpoints = Vec::with_capacity(frame.row_count());
	for row in frame.rows() {
		let source = row.get(&columns.source).and_then(entity_key);
		let target = row.get(&columns.target).and_then(entity_key);
		match (source, target) {
			(Some(s), Some(t)) => endpoints.push((s, t, row.index())),
			(None, _) => return Err(ChordError::malformed_row(row.index(), &columns.source)),
			(_, None) => return Err(ChordError::malformed_row(row.index(), &columns.target)),
		}
	}

	let names = NameIndex::from_names(
		endpoints
			.iter()
			.flat_map(|(s, t, _)| [s.as_str(), t.as_str()]),
	);

	let mut matrix = AdjacencyMatrix::zeros(names.len());
	for (source, target, row) in &endpoints {
		let (Some(s), Some(t)) = (names.index_of(source), names.index_of(target)) else {
			continue;
		};
		let value = frame
			.field(&columns.value)
			.and_then(|f| f.values.get(*row))
			.map(weight)
			.unwrap_or(0.0);
		matrix.add_flow(s, t, value);
	}

	debug!(
		"chord: {} rows -> {} entities ({} / {} / {})",
		endpoints.len(),
		names.len(),
		columns.source,
		columns.target,
		columns.value
	);

	Ok(MatrixData {
		matrix,
		names,
		columns,
	})
}

/// String form of an identifier cell; `None` for null.
pub fn entity_key(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(if let Some(i) = n.as_i64() {
			i.to_string()
		} else if let Some(u) = n.as_u64() {
			u.to_string()
		} else {
			// f64 Display prints integral floats without a fraction: 7.0 -> "7"
			n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
		}),
		Value::Bool(b) => Some(b.to_string()),
		other => Some(other.to_string()),
	}
}

/// Finite number carried by a cell, parsing numeric strings.
pub fn numeric(value: &Value) -> Option<f64> {
	let n = match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	};
	n.filter(|n| n.is_finite())
}

/// Numeric weight of a value cell. Non-numeric and non-finite cells weigh
/// nothing.
pub fn weight(value: &Value) -> f64 {
	numeric(value).unwrap_or_else(|| {
		if !value.is_null() {
			debug!("chord: weight {value} counted as 0");
		}
		0.0
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::chord::types::Field;
	use proptest::prelude::*;
	use serde_json::json;

	fn frame(columns: &[(&str, Vec<Value>)]) -> DataFrame {
		DataFrame {
			name: None,
			fields: columns
				.iter()
				.map(|(name, values)| Field {
					name: name.to_string(),
					values: values.clone(),
					..Default::default()
				})
				.collect(),
		}
	}

	fn abc(rows: &[(Value, Value, Value)]) -> DataFrame {
		frame(&[
			("a", rows.iter().map(|r| r.0.clone()).collect()),
			("b", rows.iter().map(|r| r.1.clone()).collect()),
			("c", rows.iter().map(|r| r.2.clone()).collect()),
		])
	}

	fn explicit() -> ColumnSelectors {
		ColumnSelectors {
			source: Some("a".into()),
			target: Some("b".into()),
			value: Some("c".into()),
		}
	}

	#[test]
	fn repeated_pairs_accumulate() {
		let data = abc(&[
			(json!("X"), json!("Y"), json!(10)),
			(json!("Y"), json!("X"), json!(5)),
			(json!("X"), json!("Y"), json!(3)),
		]);
		let built = build_matrix(&data, &explicit()).unwrap();
		let x = built.names.index_of("X").unwrap();
		let y = built.names.index_of("Y").unwrap();

		assert_eq!(built.matrix.size(), 2);
		assert_eq!(built.matrix.get(y, x), 13.0);
		assert_eq!(built.matrix.get(x, y), 5.0);
		assert_eq!(built.matrix.flow(x, y), 13.0);
	}

	#[test]
	fn self_loop_is_one_cell() {
		let data = abc(&[(json!("A"), json!("A"), json!(4))]);
		let built = build_matrix(&data, &explicit()).unwrap();
		assert_eq!(built.matrix.to_rows(), vec![vec![4.0]]);
	}

	#[test]
	fn numeric_identifiers_collapse_with_strings() {
		let data = abc(&[
			(json!(7), json!("7"), json!(1)),
			(json!(7.0), json!("8"), json!(2)),
		]);
		let built = build_matrix(&data, &explicit()).unwrap();
		assert_eq!(built.names.names(), &["7".to_string(), "8".to_string()]);
		assert_eq!(built.matrix.flow(0, 0), 1.0);
		assert_eq!(built.matrix.flow(0, 1), 2.0);
	}

	#[test]
	fn any_null_endpoint_fails_the_whole_build() {
		let data = abc(&[
			(json!("X"), json!("Y"), json!(1)),
			(json!("X"), Value::Null, json!(1)),
			(json!("Z"), json!("Y"), json!(1)),
		]);
		assert_eq!(
			build_matrix(&data, &explicit()),
			Err(ChordError::malformed_row(1, "b"))
		);
	}

	#[test]
	fn short_column_is_malformed() {
		let data = frame(&[
			("a", vec![json!("X"), json!("Y")]),
			("b", vec![json!("Y")]),
			("c", vec![json!(1), json!(2)]),
		]);
		assert_eq!(
			build_matrix(&data, &explicit()),
			Err(ChordError::malformed_row(1, "b"))
		);
	}

	#[test]
	fn unset_selectors_infer_by_position() {
		let data = frame(&[
			("from", vec![json!("X")]),
			("to", vec![json!("Y")]),
			("bytes", vec![json!(9)]),
			("extra", vec![json!("ignored")]),
		]);
		let built = build_matrix(&data, &ColumnSelectors::default()).unwrap();
		assert_eq!(
			built.columns,
			ResolvedColumns {
				source: "from".into(),
				target: "to".into(),
				value: "bytes".into(),
			}
		);
		assert_eq!(built.matrix.flow(0, 1), 9.0);
	}

	#[test]
	fn partial_selection_mixes_explicit_and_inferred() {
		let keys = ["x", "y", "z"];
		let selectors = ColumnSelectors {
			source: None,
			target: Some("z".into()),
			value: None,
		};
		let resolved = resolve_columns(&selectors, &keys).unwrap();
		assert_eq!(resolved.source, "x");
		assert_eq!(resolved.target, "z");
		assert_eq!(resolved.value, "z");
	}

	#[test]
	fn unknown_or_missing_columns_fail() {
		let keys = ["x", "y"];
		let unknown = ColumnSelectors {
			source: Some("nope".into()),
			..Default::default()
		};
		assert_eq!(
			resolve_columns(&unknown, &keys),
			Err(ChordError::missing_column("source", "nope"))
		);
		assert_eq!(
			resolve_columns(&ColumnSelectors::default(), &keys),
			Err(ChordError::missing_column("value", "#2"))
		);
	}

	#[test]
	fn empty_frame_is_no_data() {
		assert_eq!(
			build_matrix(&DataFrame::default(), &explicit()),
			Err(ChordError::NoData)
		);
	}

	#[test]
	fn weights_coerce() {
		assert_eq!(weight(&json!(2.5)), 2.5);
		assert_eq!(weight(&json!(" 4 ")), 4.0);
		assert_eq!(weight(&json!("lots")), 0.0);
		assert_eq!(weight(&Value::Null), 0.0);
		assert_eq!(weight(&json!(true)), 0.0);
	}

	#[test]
	fn non_finite_weights_count_as_zero() {
		for text in ["NaN", "inf", "-inf", "infinity", " -Infinity "] {
			assert_eq!(weight(&json!(text)), 0.0, "{text}");
		}

		let data = abc(&[
			(json!("A"), json!("B"), json!(1)),
			(json!("B"), json!("C"), json!(2)),
			(json!("C"), json!("A"), json!("NaN")),
			(json!("A"), json!("C"), json!("inf")),
		]);
		let built = build_matrix(&data, &ColumnSelectors::default()).unwrap();
		let rows = built.matrix.to_rows();
		assert!(rows.iter().flatten().all(|v| v.is_finite()));
		assert_eq!(built.matrix.flow(0, 1), 1.0);
		assert_eq!(built.matrix.flow(2, 0), 0.0);
		assert_eq!(built.matrix.flow(0, 2), 0.0);
	}

	#[test]
	fn one_sided_entities_still_get_a_slot() {
		let data = abc(&[
			(json!("S"), json!("T"), json!(1)),
			(json!("U"), json!("T"), json!(0)),
		]);
		let built = build_matrix(&data, &explicit()).unwrap();
		assert_eq!(built.names.len(), 3);
		assert_eq!(built.names.index_of("U"), Some(2));
		assert_eq!(built.matrix.flow(2, 1), 0.0);
	}

	fn rows_strategy() -> impl Strategy<Value = Vec<(u8, u8, u16)>> {
		prop::collection::vec((0u8..12, 0u8..12, 0u16..1000), 1..60)
	}

	fn numbered(rows: &[(u8, u8, u16)]) -> DataFrame {
		abc(&rows
			.iter()
			.map(|(s, t, v)| (json!(format!("n{s}")), json!(format!("n{t}")), json!(*v)))
			.collect::<Vec<_>>())
	}

	proptest! {
		#[test]
		fn every_entity_indexed_exactly_once(rows in rows_strategy()) {
			let built = build_matrix(&numbered(&rows), &explicit()).unwrap();
			let mut expected: Vec<String> = rows
				.iter()
				.flat_map(|(s, t, _)| [format!("n{s}"), format!("n{t}")])
				.collect();
			expected.sort();
			expected.dedup();

			prop_assert_eq!(built.names.len(), expected.len());
			prop_assert_eq!(built.matrix.size(), expected.len());
			for name in &expected {
				let i = built.names.index_of(name).unwrap();
				prop_assert!(i < expected.len());
				prop_assert_eq!(built.names.name(i), Some(name.as_str()));
			}
		}

		#[test]
		fn aggregation_is_order_independent(rows in rows_strategy()) {
			let forward = build_matrix(&numbered(&rows), &explicit()).unwrap();
			let mut reversed_rows = rows.clone();
			reversed_rows.reverse();
			let reversed = build_matrix(&numbered(&reversed_rows), &explicit()).unwrap();

			for (s, t, _) in &rows {
				let (sn, tn) = (format!("n{s}"), format!("n{t}"));
				let expected: f64 = rows
					.iter()
					.filter(|(s2, t2, _)| s2 == s && t2 == t)
					.map(|(_, _, v)| *v as f64)
					.sum();
				let fwd = forward.matrix.flow(
					forward.names.index_of(&sn).unwrap(),
					forward.names.index_of(&tn).unwrap(),
				);
				let rev = reversed.matrix.flow(
					reversed.names.index_of(&sn).unwrap(),
					reversed.names.index_of(&tn).unwrap(),
				);
				prop_assert_eq!(fwd, expected);
				prop_assert_eq!(rev, expected);
			}
		}
	}
}
