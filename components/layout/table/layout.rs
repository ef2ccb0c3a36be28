/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use display_list::Canvas;
use layout_api::style::{Display, LengthPercentageOrAuto, Position, VerticalAlign};
use layout_api::{Document, NodeId};
use log::{debug, trace, warn};
use tabula_geometry::{CanvasPoint, CanvasSize, CanvasVector};

use super::construct::GridCell;
use super::track::{CellContribution, TrackSolver};
use super::{ContainingBlock, GridBuilder, LayoutMode, TableBox, TableGrid};
use crate::content::{CellContent, ContentBox, ContentLayout, ContentSizes};
use crate::context::BoxItemCache;
use crate::error::Result;
use crate::options::LayoutOptions;

/// A track count as a pixel multiplier.
fn to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

fn fixed_pixels(size: LengthPercentageOrAuto) -> Option<i32> {
    match size {
        LengthPercentageOrAuto::Pixels(pixels) => Some(pixels),
        LengthPercentageOrAuto::Auto | LengthPercentageOrAuto::Percent(_) => None,
    }
}

/// The total size of `count` tracks starting at `start`, including the gaps between them.
fn spanned_size(sizes: &[i32], start: usize, count: usize, spacing: i32) -> i32 {
    let end = start.saturating_add(count).min(sizes.len());
    let start = start.min(end);
    let gaps = to_i32(end - start).saturating_sub(1).max(0);
    sizes[start..end].iter().sum::<i32>() + spacing.saturating_mul(gaps)
}

/// A cell whose content has been laid out but which is waiting for the last row it spans to be
/// drawn.
#[derive(Debug)]
struct OpenCell<'dom> {
    content: CellContent<'dom>,
    start_row: usize,
    /// The row just past the last one the cell spans.
    end_row: usize,
    colspan: usize,
    content_box: ContentBox,
}

/// The state of the drawing phase.
struct GridDrawing<'dom> {
    /// The top edge of each row, followed by the bottom edge of the table. Zero until known.
    row_positions: Vec<i32>,
    /// Open cells, by the column they start in.
    open_cells: Vec<Option<OpenCell<'dom>>>,
    canvas: Canvas,
}

/// The working state of one table layout.
pub(crate) struct TableLayout<'a, 'dom> {
    document: &'dom Document,
    content: &'a dyn ContentLayout,
    options: &'a LayoutOptions,
    table: NodeId,
    grid: TableGrid<'dom>,
    spacing: i32,
    containing_block: ContainingBlock,
}

impl<'a, 'dom> TableLayout<'a, 'dom> {
    pub(crate) fn new(
        document: &'dom Document,
        content: &'a dyn ContentLayout,
        options: &'a LayoutOptions,
        table: NodeId,
        containing_block: ContainingBlock,
    ) -> Result<Self> {
        let grid = GridBuilder::build(document, table)?;
        debug!(
            "Dimensions are {}x{}",
            grid.column_count(),
            grid.row_count()
        );

        if containing_block.width < 0 || containing_block.height < 0 {
            warn!(
                "Table {:?} laid out in a negative containing block ({}x{}).",
                table, containing_block.width, containing_block.height
            );
        }

        Ok(TableLayout {
            document,
            content,
            options,
            table,
            grid,
            spacing: document.style(table).border_spacing.max(0),
            containing_block: ContainingBlock::new(
                containing_block.width.max(0),
                containing_block.height.max(0),
            ),
        })
    }

    /// The spacing around and between `count` tracks.
    fn total_spacing(&self, count: usize) -> i32 {
        self.spacing.saturating_mul(to_i32(count).saturating_add(1))
    }

    pub(crate) fn layout(
        &self,
        mode: LayoutMode,
        box_items: &mut BoxItemCache,
    ) -> Result<TableBox> {
        let columns = self.compute_column_measures()?;
        let column_count = self.grid.column_count();
        let available_width = self.containing_block.width - self.total_spacing(column_count);

        let mut table_box = match mode {
            LayoutMode::MinWidth => TableBox {
                width: columns.min_sum(),
                ..TableBox::default()
            },
            LayoutMode::MaxWidth => {
                let fixed_width = fixed_pixels(self.document.style(self.table).width);
                let width = columns
                    .max_size(fixed_width, self.percentages_considered())
                    .min(available_width)
                    .max(columns.min_sum());
                TableBox {
                    width,
                    ..TableBox::default()
                }
            },
            LayoutMode::Draw => {
                let column_widths = columns.distribute(available_width);
                self.draw(column_widths, box_items)?
            },
        };

        table_box.width += self.total_spacing(column_count);
        debug!("Content size is {}x{}", table_box.width, table_box.height);
        Ok(table_box)
    }

    /// Whether percentage widths of columns count towards the maximum width of the table.
    ///
    /// They don't for a table inside another table, unless something in between has a fixed
    /// width or is positioned, and only when configured so.
    fn percentages_considered(&self) -> bool {
        if !self.options.percent_ignored_in_nested_tables {
            return true;
        }
        for ancestor in self.document.inclusive_ancestors(self.table).skip(1) {
            let style = self.document.style(ancestor);
            if style.width != LengthPercentageOrAuto::Auto || style.position != Position::Static {
                break;
            }
            if matches!(
                style.display,
                Display::Table | Display::TableCell | Display::TableRow
            ) {
                return false;
            }
        }
        true
    }

    fn width_contribution(&self, cell: &GridCell) -> CellContribution {
        let style = cell.content.style(self.document);
        CellContribution {
            sizes: self
                .content
                .content_sizes(self.document, cell.content)
                .normalized(),
            edges: style.box_edges().horizontal(),
            size: style.width,
        }
    }

    fn compute_column_measures(&self) -> Result<TrackSolver<'a>> {
        let mut columns =
            TrackSolver::new(self.grid.column_count(), self.spacing, self.options)?;

        for cell in self.grid.cells() {
            columns.note_originating_cell(cell.column);
            if cell.colspan == 1 {
                columns.add_single_span(cell.column, self.width_contribution(cell));
            }
        }
        columns.finish_single_spans();

        for cell in self.grid.cells() {
            if cell.colspan > 1 {
                columns.add_multi_span(cell.column, cell.colspan, self.width_contribution(cell));
            }
        }

        trace!("Column measures: {:?}", columns.tracks());
        Ok(columns)
    }

    /// Lay out the content of every cell at the width of the columns it spans, in the order of
    /// [`TableGrid::cells`].
    fn layout_cells(&self, column_widths: &[i32]) -> Result<Vec<Option<ContentBox>>> {
        let mut laid_out = Vec::new();
        laid_out.try_reserve_exact(self.grid.cell_count())?;
        for cell in self.grid.cells() {
            let edges = cell.content.style(self.document).box_edges();
            let containing_width =
                spanned_size(column_widths, cell.column, cell.colspan, self.spacing) -
                    edges.horizontal();
            laid_out.push(Some(self.content.layout(
                self.document,
                cell.content,
                containing_width.max(0),
            )));
        }
        Ok(laid_out)
    }

    /// The least height of every row, given the laid out cells.
    fn compute_row_heights(&self, laid_out: &[Option<ContentBox>]) -> Result<Vec<i32>> {
        let mut rows = TrackSolver::new(self.grid.row_count(), self.spacing, self.options)?;

        for (index, row) in self.grid.rows().iter().enumerate() {
            if let Some(node) = row.node {
                rows.add_single_span(
                    index,
                    CellContribution {
                        size: self.document.style(node).height,
                        ..CellContribution::default()
                    },
                );
            }
        }

        let height_contribution = |cell: &GridCell, content_box: &Option<ContentBox>| {
            let style = cell.content.style(self.document);
            let height = content_box.as_ref().map_or(0, |content_box| content_box.height);
            CellContribution {
                sizes: ContentSizes::new(height, height),
                edges: style.box_edges().vertical(),
                size: style.height,
            }
        };

        for (cell, content_box) in self.grid.cells().iter().zip(laid_out) {
            if cell.rowspan == 1 {
                rows.add_single_span(cell.row, height_contribution(cell, content_box));
            }
        }
        rows.finish_single_spans();
        for (cell, content_box) in self.grid.cells().iter().zip(laid_out) {
            if cell.rowspan > 1 {
                rows.add_multi_span(cell.row, cell.rowspan, height_contribution(cell, content_box));
            }
        }

        trace!("Row measures: {:?}", rows.tracks());
        let available_height =
            self.containing_block.height - self.total_spacing(self.grid.row_count());
        Ok(rows.distribute(available_height))
    }

    fn draw(&self, column_widths: Vec<i32>, box_items: &mut BoxItemCache) -> Result<TableBox> {
        let mut laid_out = self.layout_cells(&column_widths)?;
        let row_heights = self.compute_row_heights(&laid_out)?;
        let row_count = self.grid.row_count();

        let mut row_positions = Vec::new();
        row_positions.try_reserve_exact(row_count + 1)?;
        row_positions.resize(row_count + 1, 0);
        let mut open_cells = Vec::new();
        open_cells.try_reserve_exact(self.grid.column_count())?;
        open_cells.resize_with(self.grid.column_count(), || None);
        let mut drawing = GridDrawing {
            row_positions,
            open_cells,
            canvas: Canvas::new(),
        };

        for (index, row) in self.grid.rows().iter().enumerate() {
            for cell_index in row.cells.clone() {
                let cell = &self.grid.cells()[cell_index];
                let content_box = laid_out[cell_index].take().unwrap_or_default();
                self.open_cell(&mut drawing, cell, content_box, row_heights[index]);
            }
            self.draw_row(&mut drawing, index, row.node, &column_widths, box_items);
        }

        let height = drawing.row_positions[row_count];
        Ok(TableBox {
            width: column_widths.iter().sum(),
            height,
            column_widths,
            canvas: drawing.canvas,
        })
    }

    /// Start a cell in the row it originates in, pushing the bottom edge of the last row it
    /// spans down far enough to hold it.
    fn open_cell(
        &self,
        drawing: &mut GridDrawing<'dom>,
        cell: &GridCell<'dom>,
        content_box: ContentBox,
        row_height: i32,
    ) {
        let row = cell.row;
        let end_row = (row + cell.rowspan).min(self.grid.row_count());
        let positions = &mut drawing.row_positions;

        let mut top = positions[row];
        if top == 0 {
            top = self.spacing.saturating_mul(to_i32(row) + 1);
            positions[row] = top;
        }

        let style = cell.content.style(self.document);
        let height = (content_box.height + style.box_edges().vertical())
            .max(fixed_pixels(style.height).unwrap_or(0))
            .max(row_height);
        let below = top + height + self.spacing;
        positions[end_row] = positions[end_row].max(below);
        let bottom = positions[end_row];
        for position in positions[end_row + 1..].iter_mut() {
            *position = (*position).max(bottom);
        }

        let open = OpenCell {
            content: cell.content,
            start_row: row,
            end_row,
            colspan: cell.colspan,
            content_box,
        };
        if let Some(slot) = drawing.open_cells.get_mut(cell.column) {
            if slot.is_some() {
                warn!("Cell at column {} opened over another open cell.", cell.column);
            }
            *slot = Some(open);
        }
    }

    /// Draw the box of row `index`, then every open cell whose last row it is.
    fn draw_row(
        &self,
        drawing: &mut GridDrawing<'dom>,
        index: usize,
        node: Option<NodeId>,
        column_widths: &[i32],
        box_items: &mut BoxItemCache,
    ) {
        let next = index + 1;
        let positions = &mut drawing.row_positions;

        if let Some(node) = node {
            let top = positions[index];
            let mut height = (positions[next] - top - self.spacing).max(0);
            if let Some(fixed) = fixed_pixels(self.document.style(node).height) {
                if fixed > height {
                    positions[next] += fixed - height;
                    height = fixed;
                }
            }
            let width = spanned_size(column_widths, 0, column_widths.len(), self.spacing);
            box_items.draw_box(
                &mut drawing.canvas,
                self.document,
                CanvasPoint::new(self.spacing, top),
                CanvasSize::new(width, height),
                node,
            );
        }

        let mut x = 0;
        for (column, width) in column_widths.iter().enumerate() {
            x += self.spacing;
            let finishes_here = drawing.open_cells[column]
                .as_ref()
                .is_some_and(|open| open.end_row == next);
            if finishes_here {
                if let Some(open) = drawing.open_cells[column].take() {
                    self.close_cell(drawing, open, column, x, column_widths, box_items);
                }
            }
            x += width;
        }
    }

    /// Draw the box of a cell whose last row has been drawn, and its content aligned within.
    fn close_cell(
        &self,
        drawing: &mut GridDrawing<'dom>,
        open: OpenCell<'dom>,
        column: usize,
        x: i32,
        column_widths: &[i32],
        box_items: &mut BoxItemCache,
    ) {
        let top = drawing.row_positions[open.start_row];
        let bottom = drawing.row_positions[open.end_row];
        let width = spanned_size(column_widths, column, open.colspan, self.spacing);
        let height = bottom - self.spacing - top;

        if let Some(node) = open.content.node() {
            box_items.draw_box(
                &mut drawing.canvas,
                self.document,
                CanvasPoint::new(x, top),
                CanvasSize::new(width, height),
                node,
            );
        }

        let style = open.content.style(self.document);
        let edges = style.box_edges();
        let content_height = open.content_box.height;
        let y = match style.vertical_align {
            VerticalAlign::Top | VerticalAlign::Baseline => top + edges.top,
            VerticalAlign::Bottom => bottom - content_height - edges.bottom - self.spacing,
            VerticalAlign::Middle => {
                top + (height - edges.top - edges.bottom - content_height) / 2 + edges.top
            },
        };

        let mut content_canvas = open.content_box.canvas;
        content_canvas.draw_origin();
        drawing
            .canvas
            .merge(content_canvas, CanvasVector::new(x + edges.left, y));
    }
}
