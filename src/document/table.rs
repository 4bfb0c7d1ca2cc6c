//! Grid tables built from `table` content nodes.

use super::Block;

/// Rows of cells. Rows may be ragged; the writer pads them to
/// [`Table::column_count`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Width of the grid, taken from the longest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// No row holds a cell.
    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }

    /// One line per row, cells separated by tabs.
    pub fn plain_text(&self) -> String {
        let lines: Vec<String> = self.rows.iter().map(TableRow::plain_text).collect();
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    /// A row made only of header cells repeats on each page.
    pub fn is_header(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| c.is_header)
    }

    fn plain_text(&self) -> String {
        let cells: Vec<String> = self.cells.iter().map(TableCell::plain_text).collect();
        cells.join("\t")
    }
}

/// A cell holds blocks of its own, so tables may nest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub content: Vec<Block>,
    pub is_header: bool,
}

impl TableCell {
    pub fn new(content: Vec<Block>) -> Self {
        Self {
            content,
            is_header: false,
        }
    }

    pub fn header(content: Vec<Block>) -> Self {
        Self {
            content,
            is_header: true,
        }
    }

    fn plain_text(&self) -> String {
        let parts: Vec<String> = self.content.iter().map(Block::plain_text).collect();
        parts.join(" ")
    }
}
