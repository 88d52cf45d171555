//! In-memory [`SpreadsheetStore`] keeping one grid per sheet.

// self
use crate::{
	_prelude::*,
	collab::{
		CollabFuture, CollaboratorError,
		sheets::{self, AppendOutcome, CellRef, SheetRange, SpreadsheetStore},
	},
	id::SpreadsheetId,
};

// Row-major cells, 0-based; rows may be ragged.
type Grid = Vec<Vec<String>>;

/// Thread-safe spreadsheet double addressed by sheet name.
#[derive(Clone, Debug)]
pub struct MemorySpreadsheet {
	id: SpreadsheetId,
	sheets: Arc<RwLock<HashMap<String, Grid>>>,
}
impl MemorySpreadsheet {
	/// Creates an empty spreadsheet.
	pub fn new(id: SpreadsheetId) -> Self {
		Self { id, sheets: Default::default() }
	}

	/// Identifier of the document.
	pub fn id(&self) -> &SpreadsheetId {
		&self.id
	}

	/// Overwrites the cell at 1-based `row` and `column`, growing the grid as needed.
	pub fn set_cell(&self, sheet: &str, row: u32, column: u32, value: impl Into<String>) {
		let (Some(r), Some(c)) = (row.checked_sub(1), column.checked_sub(1)) else {
			return;
		};
		let mut sheets = self.sheets.write();
		let grid = sheets.entry(sheet.to_owned()).or_default();

		write_cell(grid, r as usize, c as usize, value.into());
	}

	fn read_now(&self, range: &SheetRange) -> Result<Vec<Vec<String>>, CollaboratorError> {
		let sheets = self.sheets.read();
		let Some(grid) = sheets.get(&range.sheet) else {
			return Err(CollaboratorError::invalid(format!("sheet `{}` does not exist", range.sheet)));
		};

		Ok(read_grid(grid, range))
	}

	fn append_now(
		&self,
		sheet: &str,
		rows: Vec<Vec<String>>,
	) -> Result<AppendOutcome, CollaboratorError> {
		if rows.is_empty() {
			return Err(CollaboratorError::invalid("no rows to append"));
		}

		let mut sheets = self.sheets.write();
		let grid = sheets.entry(sheet.to_owned()).or_default();
		let column_a = read_grid(grid, &SheetRange::column(sheet, 1));
		let first_row = sheets::next_append_row(&column_a);
		let width = rows.iter().map(Vec::len).max().unwrap_or(0).max(1) as u32;
		let updated_rows = rows.len();

		for (offset, row) in rows.into_iter().enumerate() {
			for (column, value) in row.into_iter().enumerate() {
				write_cell(grid, first_row as usize - 1 + offset, column, value);
			}
		}

		let last_row = first_row + updated_rows as u32 - 1;

		Ok(AppendOutcome {
			updated_range: SheetRange {
				sheet: sheet.to_owned(),
				start: CellRef { column: 1, row: Some(first_row) },
				end: CellRef { column: width, row: Some(last_row) },
			},
			updated_rows,
		})
	}
}
impl SpreadsheetStore for MemorySpreadsheet {
	fn read_range<'a>(&'a self, range: &'a SheetRange) -> CollabFuture<'a, Vec<Vec<String>>> {
		Box::pin(async move { self.read_now(range) })
	}

	fn append_rows<'a>(
		&'a self,
		sheet: &'a str,
		rows: Vec<Vec<String>>,
	) -> CollabFuture<'a, AppendOutcome> {
		Box::pin(async move { self.append_now(sheet, rows) })
	}
}

fn write_cell(grid: &mut Grid, row: usize, column: usize, value: String) {
	if grid.len() <= row {
		grid.resize_with(row + 1, Vec::new);
	}

	let cells = &mut grid[row];

	if cells.len() <= column {
		cells.resize_with(column + 1, String::new);
	}

	cells[column] = value;
}

fn read_grid(grid: &Grid, range: &SheetRange) -> Vec<Vec<String>> {
	let first_row = range.first_row() as usize - 1;
	let last_row = range.end.row.map_or(grid.len(), |row| (row as usize).min(grid.len()));
	let first_column = range.start.column as usize - 1;
	let last_column = range.end.column as usize;
	let mut values = (first_row..last_row)
		.map(|r| {
			let mut row = (first_column..last_column.min(grid[r].len()))
				.map(|c| grid[r].get(c).cloned().unwrap_or_default())
				.collect::<Vec<_>>();

			while row.last().is_some_and(String::is_empty) {
				row.pop();
			}

			row
		})
		.collect::<Vec<_>>();

	while values.last().is_some_and(Vec::is_empty) {
		values.pop();
	}

	values
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn sheet() -> MemorySpreadsheet {
		MemorySpreadsheet::new(SpreadsheetId::new("sheet-1").expect("Spreadsheet fixture should be valid."))
	}

	fn row(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| (*value).to_owned()).collect()
	}

	#[tokio::test]
	async fn first_append_lands_on_row_three() {
		let sheet = sheet();
		let outcome = sheet
			.append_rows("Sheet1", vec![row(&["Camera", "45.00"]), row(&["Lens"])])
			.await
			.expect("Append should succeed.");

		assert_eq!(outcome.updated_range.to_string(), "Sheet1!A3:B4");
		assert_eq!(outcome.updated_rows, 2);

		let column = sheet
			.read_range(&"Sheet1!A:A".parse().expect("Range should parse."))
			.await
			.expect("Read should succeed.");

		assert_eq!(column, vec![Vec::<String>::new(), Vec::new(), row(&["Camera"]), row(&["Lens"])]);
	}

	#[tokio::test]
	async fn later_appends_follow_last_populated_row() {
		let sheet = sheet();

		sheet.set_cell("Sheet1", 1, 1, "Title");
		sheet.set_cell("Sheet1", 5, 1, "Tripod");

		let outcome = sheet
			.append_rows("Sheet1", vec![row(&["Flash"])])
			.await
			.expect("Append should succeed.");

		assert_eq!(outcome.updated_range.to_string(), "Sheet1!A6");
	}

	#[tokio::test]
	async fn reads_fixed_range_and_trims_empties() {
		let sheet = sheet();

		sheet.set_cell("Sheet1", 2, 7, "Total");
		sheet.set_cell("Sheet1", 2, 8, "1234.50");

		let values = sheet
			.read_range(&"Sheet1!G2:H2".parse().expect("Range should parse."))
			.await
			.expect("Read should succeed.");

		assert_eq!(values, vec![row(&["Total", "1234.50"])]);

		let empty = sheet
			.read_range(&"Sheet1!J1:K9".parse().expect("Range should parse."))
			.await
			.expect("Read should succeed.");

		assert!(empty.is_empty());
		assert!(sheet.read_range(&SheetRange::column("Missing", 1)).await.is_err());
	}

	#[tokio::test]
	async fn wide_ranges_only_cover_populated_columns() {
		let sheet = sheet();

		sheet.set_cell("Sheet1", 1, 1, "Title");
		sheet.set_cell("Sheet1", 1, 2, "Price");

		let values = sheet
			.read_range(&"Sheet1!A1:ZZZZZZ1".parse().expect("Range should parse."))
			.await
			.expect("Read should succeed.");

		assert_eq!(values, vec![row(&["Title", "Price"])]);

		let beyond = sheet
			.read_range(&"Sheet1!C1:ZZZZZZ1".parse().expect("Range should parse."))
			.await
			.expect("Read should succeed.");

		assert!(beyond.is_empty());
	}
}
