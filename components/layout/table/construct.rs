/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::Range;

use layout_api::style::Display;
use layout_api::{Document, NodeId};

use super::TableGrid;
use crate::content::CellContent;
use crate::error::Result;

/// A cell placed in the grid.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GridCell<'dom> {
    pub content: CellContent<'dom>,
    pub column: usize,
    pub row: usize,
    /// Zero spans as far right as the other cells allow until the grid is built.
    pub colspan: usize,
    /// Zero spans to the last row until the grid is built.
    pub rowspan: usize,
}

/// A row of the grid, and the cells that start in it.
#[derive(Clone, Debug)]
pub(crate) struct GridRow {
    /// `None` for rows made up for cells that had nothing to sit in, and for rows that only
    /// exist because a cell above spans into them.
    pub node: Option<NodeId>,
    pub cells: Range<usize>,
}

/// How long a column stays taken by a cell from an earlier row.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Coverage {
    #[default]
    Free,
    Rows(usize),
    UntilEnd,
}

/// The largest spans the HTML table model allows.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Parse a `colspan` or `rowspan` attribute the way `atoi` would: leading white-space, an
/// optional sign, then as many digits as there are. Anything without digits, and any negative
/// value, counts as one.
pub(crate) fn parse_span(value: Option<&str>) -> usize {
    let Some(value) = value else {
        return 1;
    };
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 1;
    }
    match digits[..end].parse::<usize>() {
        Ok(0) => 0,
        Ok(_) if negative => 1,
        Ok(span) => span,
        // Only overflow gets here.
        Err(_) if negative => 1,
        Err(_) => usize::MAX,
    }
}

pub(crate) struct GridBuilder<'dom> {
    document: &'dom Document,
    grid: TableGrid<'dom>,
    coverage: Vec<Coverage>,
    current_column: usize,
    /// The index of the last row some cell spans into.
    last_spanned_row: Option<usize>,
}

impl<'dom> GridBuilder<'dom> {
    /// Place every cell of `table` in a grid, wrapping stray content in anonymous row groups,
    /// rows and cells as needed.
    ///
    /// The first header group is placed before everything else and the first footer group after
    /// everything else. Rows that only exist because a cell spans into them are added at the end.
    pub(crate) fn build(document: &'dom Document, table: NodeId) -> Result<TableGrid<'dom>> {
        let mut builder = GridBuilder {
            document,
            grid: TableGrid::default(),
            coverage: Vec::new(),
            current_column: 0,
            last_spanned_row: None,
        };

        let children = document.children(table);
        let display = |node: NodeId| document.style(node).display;
        let header = children
            .iter()
            .copied()
            .find(|child| display(*child) == Display::TableHeaderGroup);
        let footer = children
            .iter()
            .copied()
            .find(|child| display(*child) == Display::TableFooterGroup);

        if let Some(header) = header {
            builder.handle_row_group(document.children(header))?;
        }

        let mut index = 0;
        while index < children.len() {
            let child = children[index];
            if Some(child) == header || Some(child) == footer || document.is_whitespace(child) {
                index += 1;
                continue;
            }
            if display(child).is_row_group() {
                builder.handle_row_group(document.children(child))?;
                index += 1;
                continue;
            }
            let end = run_end(children, index, |node| display(node).is_row_group());
            builder.handle_row_group(&children[index..end])?;
            index = end;
        }

        if let Some(footer) = footer {
            builder.handle_row_group(document.children(footer))?;
        }

        while builder
            .last_spanned_row
            .is_some_and(|last| builder.grid.rows.len() <= last)
        {
            builder.finish_row(None)?;
        }

        builder.resolve_open_spans();
        Ok(builder.grid)
    }

    fn handle_row_group(&mut self, children: &'dom [NodeId]) -> Result<()> {
        let document = self.document;
        let display = |node: NodeId| document.style(node).display;
        let mut index = 0;
        while index < children.len() {
            let child = children[index];
            if document.is_whitespace(child) {
                index += 1;
                continue;
            }
            if display(child) == Display::TableRow {
                self.handle_row(Some(child), document.children(child))?;
                index += 1;
                continue;
            }
            let end = run_end(children, index, |node| display(node) == Display::TableRow);
            self.handle_row(None, &children[index..end])?;
            index = end;
        }
        Ok(())
    }

    fn handle_row(&mut self, node: Option<NodeId>, children: &'dom [NodeId]) -> Result<()> {
        self.current_column = 0;
        let document = self.document;
        let display = |node: NodeId| document.style(node).display;
        let mut index = 0;
        while index < children.len() {
            let child = children[index];
            if document.is_whitespace(child) {
                index += 1;
                continue;
            }
            if display(child) == Display::TableCell {
                self.handle_cell(CellContent::Element(child))?;
                index += 1;
                continue;
            }
            let end = run_end(children, index, |node| display(node) == Display::TableCell);
            self.handle_cell(CellContent::Anonymous(&children[index..end]))?;
            index = end;
        }
        self.finish_row(node)
    }

    fn handle_cell(&mut self, content: CellContent<'dom>) -> Result<()> {
        let (colspan, rowspan) = match content.node() {
            Some(node) => (
                parse_span(self.document.attribute(node, "colspan")).min(MAX_COLSPAN),
                parse_span(self.document.attribute(node, "rowspan")).min(MAX_ROWSPAN),
            ),
            None => (1, 1),
        };
        // A span to the end of the table takes a single column while cells are being placed.
        let width = colspan.max(1);

        // Move right past columns still taken by cells from the rows above.
        loop {
            let start = self.current_column.min(self.coverage.len());
            let end = self
                .current_column
                .saturating_add(width)
                .min(self.coverage.len());
            if self.coverage[start..end]
                .iter()
                .all(|coverage| *coverage == Coverage::Free)
            {
                break;
            }
            self.current_column += 1;
        }

        let column = self.current_column;
        let end = column.saturating_add(width);
        if rowspan != 1 {
            if self.coverage.len() < end {
                self.coverage.try_reserve(end - self.coverage.len())?;
                self.coverage.resize(end, Coverage::Free);
            }
            let coverage = match rowspan {
                0 => Coverage::UntilEnd,
                rows => Coverage::Rows(rows),
            };
            self.coverage[column..end].fill(coverage);
        }

        let row = self.grid.rows.len();
        self.grid.cells.try_reserve(1)?;
        self.grid.cells.push(GridCell {
            content,
            column,
            row,
            colspan,
            rowspan,
        });
        self.grid.column_count = self.grid.column_count.max(end);
        if rowspan > 0 {
            let last = row.saturating_add(rowspan - 1);
            self.last_spanned_row = Some(self.last_spanned_row.map_or(last, |row| row.max(last)));
        }
        self.current_column = end;
        Ok(())
    }

    /// Give every cell with a zero span a definite one. A row span reaches the last row. A
    /// column span reaches the last column, or stops just left of the nearest cell to its right
    /// in any of the rows it covers.
    fn resolve_open_spans(&mut self) {
        let grid = &mut self.grid;
        let row_count = grid.rows.len();
        for cell in grid.cells.iter_mut().filter(|cell| cell.rowspan == 0) {
            cell.rowspan = row_count.saturating_sub(cell.row).max(1);
        }

        for index in 0..grid.cells.len() {
            let cell = grid.cells[index];
            if cell.colspan != 0 {
                continue;
            }
            let rows = cell.row..cell.row.saturating_add(cell.rowspan);
            let end = grid
                .cells
                .iter()
                .filter(|other| {
                    other.column > cell.column &&
                        other.row < rows.end &&
                        rows.start < other.row.saturating_add(other.rowspan)
                })
                .map(|other| other.column)
                .min()
                .unwrap_or(grid.column_count);
            grid.cells[index].colspan = end.saturating_sub(cell.column).max(1);
        }
    }

    fn finish_row(&mut self, node: Option<NodeId>) -> Result<()> {
        let first_cell = self
            .grid
            .rows
            .last()
            .map_or(0, |previous| previous.cells.end);
        self.grid.rows.try_reserve(1)?;
        self.grid.rows.push(GridRow {
            node,
            cells: first_cell..self.grid.cells.len(),
        });
        for coverage in self.coverage.iter_mut() {
            if let Coverage::Rows(rows) = coverage {
                *coverage = match *rows {
                    0 | 1 => Coverage::Free,
                    rows => Coverage::Rows(rows - 1),
                };
            }
        }
        Ok(())
    }
}

/// The end of the run of children starting at `start` that ends just before the next child
/// matching `stop`.
fn run_end(children: &[NodeId], start: usize, stop: impl Fn(NodeId) -> bool) -> usize {
    children[start + 1..]
        .iter()
        .position(|child| stop(*child))
        .map_or(children.len(), |offset| start + 1 + offset)
}
