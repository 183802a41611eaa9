//! Error types for the chord pipeline.

use thiserror::Error;

/// Result type for chord pipeline operations.
pub type ChordResult<T> = Result<T, ChordError>;

/// Reasons a render produces no diagram. None of these are fatal; the
/// panel is left empty and the next data or option change tries again.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChordError {
	/// The widget has no element to draw into.
	#[error("no mount target")]
	NoMountTarget,

	/// The host passed no data frame.
	#[error("no data frame")]
	NoFrame,

	/// The frame has no rows.
	#[error("data frame has no rows")]
	NoData,

	/// A column selector names a column the frame does not have, or
	/// positional inference ran past the last column.
	#[error("cannot resolve {selector} column {column:?}")]
	MissingColumn {
		/// Which selector failed: `source`, `target` or `value`.
		selector: &'static str,
		/// The column name, or `#<position>` for inferred columns.
		column: String,
	},

	/// A row lacks a source or target identifier.
	#[error("row {row} has no value in {column:?}")]
	MalformedRow {
		/// Zero-based row index.
		row: usize,
		/// Column holding the missing identifier.
		column: String,
	},

	/// The panel is too small for a readable diagram.
	#[error("radius {radius} is below the minimum of {min}")]
	TooSmall {
		/// Half the panel height.
		radius: f64,
		/// Smallest radius accepted.
		min: f64,
	},
}

impl ChordError {
	/// Shorthand for [`ChordError::MissingColumn`].
	pub fn missing_column(selector: &'static str, column: impl Into<String>) -> Self {
		Self::MissingColumn {
			selector,
			column: column.into(),
		}
	}

	/// Shorthand for [`ChordError::MalformedRow`].
	pub fn malformed_row(row: usize, column: impl Into<String>) -> Self {
		Self::MalformedRow {
			row,
			column: column.into(),
		}
	}
}
