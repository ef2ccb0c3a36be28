/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! # Tables
//!
//! Table layout happens in three phases every time a table is laid out:
//!
//! 1. Grid Construction
//! 2. Measurement
//! 3. Drawing
//!
//! ## Grid Construction
//!
//! `construct.rs` walks the children of the table and places every cell in a grid of rows and
//! columns. Elements are treated according to their `display` value: `table-row-group`,
//! `table-header-group` and `table-footer-group` children are row groups, `table-row` elements
//! are rows and `table-cell` elements are cells. Anything else is wrapped, together with its
//! neighbouring siblings of the same kind, in an anonymous row group, row or cell. Those wrappers
//! never become nodes in the document. The first header group is moved before all other rows and
//! the first footer group after them.
//!
//! A cell is placed just right of the previous cell in its row, and then further right while any
//! column it would cover is still taken by a cell from a row above that spans down into this one.
//!
//! ## Measurement
//!
//! The minimum and maximum content widths of every cell, along with its `width`, are folded into
//! per-column measures by a [`track::TrackSolver`], first from cells spanning a single column and
//! then from cells spanning several. The solver then shares the width available to the table
//! between its columns. When only the minimum or maximum width of the table is wanted, layout
//! stops here.
//!
//! Otherwise every cell is laid out at the width of the columns it spans. The heights of the
//! results go through a second solver for the rows, whose answers are the least height of each
//! row.
//!
//! ## Drawing
//!
//! Rows are drawn from top to bottom. The bottom edge of each row is pushed down as far as the
//! tallest cell ending in it needs. A cell that spans several rows stays open until the last of
//! its rows has been drawn. Only then is its height known, so only then are its box and content
//! added to the display list, aligned within the cell according to `vertical-align`.

mod construct;
mod layout;
pub mod track;

use display_list::Canvas;
use serde::Serialize;

pub(crate) use self::construct::GridBuilder;
use self::construct::{GridCell, GridRow};
pub(crate) use self::layout::TableLayout;

/// What a table layout is asked to produce.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum LayoutMode {
    /// Size every column and row and draw the table.
    #[default]
    Draw,
    /// Only work out the narrowest the table can be.
    MinWidth,
    /// Only work out the widest the table would usefully be.
    MaxWidth,
}

/// The space a table is laid out in. A height of zero leaves every row at its least height.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ContainingBlock {
    pub width: i32,
    pub height: i32,
}

impl ContainingBlock {
    pub fn new(width: i32, height: i32) -> Self {
        ContainingBlock { width, height }
    }
}

/// The result of laying out a table.
///
/// The width includes the border spacing on either side of the outermost columns. The canvas is
/// positioned relative to the top-left corner of the table's content box, and is empty unless
/// the table was laid out with [`LayoutMode::Draw`].
#[derive(Debug, Default)]
pub struct TableBox {
    pub width: i32,
    pub height: i32,
    /// The width of each column, when the table was drawn.
    pub column_widths: Vec<i32>,
    pub canvas: Canvas,
}

/// The cells of a table, placed in rows and columns.
#[derive(Debug, Default)]
pub(crate) struct TableGrid<'dom> {
    cells: Vec<GridCell<'dom>>,
    rows: Vec<GridRow>,
    column_count: usize,
}

impl<'dom> TableGrid<'dom> {
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn cells(&self) -> &[GridCell<'dom>] {
        &self.cells
    }

    pub(crate) fn rows(&self) -> &[GridRow] {
        &self.rows
    }
}
