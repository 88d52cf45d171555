//! Spreadsheet range reads and row appends addressed in A1 notation.

pub mod memory;

pub use memory::MemorySpreadsheet;

// self
use crate::{
	_prelude::*,
	collab::{CollabFuture, CollaboratorError},
};

/// First row written when column A holds no data; rows above it are header space.
pub const FIRST_DATA_ROW: u32 = 3;

/// Row that an append should start at, given the column-A values of a sheet.
///
/// `column_a` holds one entry per row from row 1 down to the last populated row, the
/// shape a range read of `Sheet!A:A` returns.
pub fn next_append_row(column_a: &[Vec<String>]) -> u32 {
	if column_a.is_empty() { FIRST_DATA_ROW } else { column_a.len() as u32 + 1 }
}

/// One corner of a range; `row` is absent for whole-column references like `A`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
	/// 1-based column index (`A` = 1).
	pub column: u32,
	/// 1-based row index.
	pub row: Option<u32>,
}
impl CellRef {
	/// Parses `G2`, `AA10`, or a bare column such as `A`.
	pub fn parse(raw: &str) -> Result<Self, CollaboratorError> {
		let split = raw.find(|c: char| c.is_ascii_digit()).unwrap_or(raw.len());
		let (letters, digits) = raw.split_at(split);

		if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
			return Err(CollaboratorError::invalid(format!("`{raw}` is not a cell reference")));
		}

		let column = letters.chars().try_fold(0_u32, |acc, c| {
			acc.checked_mul(26)?.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
		});
		let Some(column) = column else {
			return Err(CollaboratorError::invalid(format!("column `{letters}` is out of range")));
		};
		let row = if digits.is_empty() {
			None
		} else {
			match digits.parse::<u32>() {
				Ok(row) if row > 0 => Some(row),
				_ => return Err(CollaboratorError::invalid(format!("row `{digits}` is invalid"))),
			}
		};

		Ok(Self { column, row })
	}
}
impl Display for CellRef {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&column_letters(self.column))?;

		if let Some(row) = self.row {
			write!(f, "{row}")?;
		}

		Ok(())
	}
}

/// Rectangular range on one sheet, e.g. `Sheet1!G2:H2` or `Sheet1!A:A`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SheetRange {
	/// Sheet (tab) name.
	pub sheet: String,
	/// Top-left corner.
	pub start: CellRef,
	/// Bottom-right corner; equal to `start` for single-cell references.
	pub end: CellRef,
}
impl SheetRange {
	/// Whole-column range `sheet!A:A`.
	pub fn column(sheet: impl Into<String>, column: u32) -> Self {
		let cell = CellRef { column, row: None };

		Self { sheet: sheet.into(), start: cell, end: cell }
	}

	/// First populated row index covered by this range.
	pub fn first_row(&self) -> u32 {
		self.start.row.unwrap_or(1)
	}
}
impl FromStr for SheetRange {
	type Err = CollaboratorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let Some((sheet, cells)) = s.rsplit_once('!') else {
			return Err(CollaboratorError::invalid(format!("`{s}` has no sheet name")));
		};
		let sheet = sheet.trim_matches('\'');

		if sheet.is_empty() {
			return Err(CollaboratorError::invalid(format!("`{s}` has an empty sheet name")));
		}

		let (start, end) = match cells.split_once(':') {
			Some((start, end)) => (CellRef::parse(start)?, CellRef::parse(end)?),
			None => {
				let cell = CellRef::parse(cells)?;

				(cell, cell)
			},
		};

		if start.column > end.column || matches!((start.row, end.row), (Some(a), Some(b)) if a > b) {
			return Err(CollaboratorError::invalid(format!("`{s}` is not ordered top-left to bottom-right")));
		}

		Ok(Self { sheet: sheet.to_owned(), start, end })
	}
}
impl Display for SheetRange {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.sheet.contains(|c: char| !c.is_ascii_alphanumeric() && c != '_') {
			write!(f, "'{}'!", self.sheet)?;
		} else {
			write!(f, "{}!", self.sheet)?;
		}

		if self.start == self.end && self.start.row.is_some() {
			write!(f, "{}", self.start)
		} else {
			write!(f, "{}:{}", self.start, self.end)
		}
	}
}

/// Result of an append.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendOutcome {
	/// Cells that received the new rows.
	pub updated_range: SheetRange,
	/// Number of rows written.
	pub updated_rows: usize,
}

/// Spreadsheet reads and appends; cell values are stored raw, without formula parsing.
pub trait SpreadsheetStore
where
	Self: Send + Sync,
{
	/// Reads `range` row by row, trailing empty rows and cells trimmed.
	fn read_range<'a>(&'a self, range: &'a SheetRange) -> CollabFuture<'a, Vec<Vec<String>>>;

	/// Appends `rows` to `sheet`, starting at [`next_append_row`] of its column A.
	fn append_rows<'a>(
		&'a self,
		sheet: &'a str,
		rows: Vec<Vec<String>>,
	) -> CollabFuture<'a, AppendOutcome>;
}

fn column_letters(mut column: u32) -> String {
	let mut letters = Vec::new();

	while column > 0 {
		let rem = (column - 1) % 26;

		letters.push(char::from(b'A' + rem as u8));
		column = (column - 1) / 26;
	}

	letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_cell_and_column_ranges() {
		let range: SheetRange = "Sheet1!G2:H2".parse().expect("Cell range should parse.");

		assert_eq!(range.sheet, "Sheet1");
		assert_eq!(range.start, CellRef { column: 7, row: Some(2) });
		assert_eq!(range.end, CellRef { column: 8, row: Some(2) });
		assert_eq!(range.to_string(), "Sheet1!G2:H2");

		let column: SheetRange = "Sheet1!A:A".parse().expect("Column range should parse.");

		assert_eq!(column, SheetRange::column("Sheet1", 1));
		assert_eq!(column.to_string(), "Sheet1!A:A");

		let quoted: SheetRange = "'Q3 Sales'!AA10".parse().expect("Quoted sheet should parse.");

		assert_eq!(quoted.sheet, "Q3 Sales");
		assert_eq!(quoted.start, CellRef { column: 27, row: Some(10) });
		assert_eq!(quoted.to_string(), "'Q3 Sales'!AA10");
	}

	#[test]
	fn rejects_malformed_ranges() {
		for raw in ["G2:H2", "!A1", "Sheet1!2A", "Sheet1!A0", "Sheet1!H2:G2", "Sheet1!A1-B2"] {
			assert!(raw.parse::<SheetRange>().is_err(), "`{raw}` should be rejected.");
		}
	}

	#[test]
	fn append_row_starts_below_headers_or_last_row() {
		assert_eq!(next_append_row(&[]), FIRST_DATA_ROW);

		let column = vec![vec!["Title".to_owned()], vec![], vec!["Camera".to_owned()]];

		assert_eq!(next_append_row(&column), 4);
	}

	#[test]
	fn column_letters_round_trip_past_z() {
		for (column, letters) in [(1, "A"), (26, "Z"), (27, "AA"), (52, "AZ"), (703, "AAA")] {
			assert_eq!(column_letters(column), letters);
			assert_eq!(CellRef::parse(letters).expect("Column should parse.").column, column);
		}
	}
}
