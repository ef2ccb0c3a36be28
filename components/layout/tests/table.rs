/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use display_list::{Canvas, CanvasItem, ItemHandle, Primitive};
use layout::{
    CellContent, ContainingBlock, ContentBox, ContentLayout, ContentSizes, LayoutError,
    LayoutMode, LayoutOptions, LayoutSession,
};
use layout_api::style::{Display, LengthPercentageOrAuto, VerticalAlign};
use layout_api::{ComputedStyle, Document, NodeId};
use quickcheck::quickcheck;
use tabula_geometry::{CanvasPoint, CanvasSize, PhysicalSides};

const LINE_HEIGHT: i32 = 10;
const CHAR_WIDTH: i32 = 10;

/// Lays out every text child of a cell on a line of its own, as a window as wide as the text.
struct OneLinePerText;

impl OneLinePerText {
    fn text_width(document: &Document, node: NodeId) -> Option<i32> {
        document
            .text(node)
            .map(|text| CHAR_WIDTH * text.chars().count() as i32)
    }
}

impl ContentLayout for OneLinePerText {
    fn content_sizes(&self, document: &Document, content: CellContent<'_>) -> ContentSizes {
        let width = content
            .children(document)
            .iter()
            .filter_map(|child| Self::text_width(document, *child))
            .max()
            .unwrap_or(0);
        ContentSizes::new(width, width)
    }

    fn layout(&self, document: &Document, content: CellContent<'_>, _: i32) -> ContentBox {
        let mut content_box = ContentBox::default();
        for child in content.children(document) {
            if let Some(width) = Self::text_width(document, *child) {
                content_box.canvas.draw_window(
                    CanvasPoint::new(0, content_box.height),
                    CanvasSize::new(width, LINE_HEIGHT),
                    *child,
                );
                content_box.height += LINE_HEIGHT;
                content_box.width = content_box.width.max(width);
            }
        }
        content_box
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn styled(display: Display) -> Arc<ComputedStyle> {
    Arc::new(ComputedStyle {
        display,
        ..ComputedStyle::default()
    })
}

fn new_table(spacing: i32) -> (Document, NodeId) {
    let mut document = Document::new();
    let style = Arc::new(ComputedStyle {
        display: Display::Table,
        border_spacing: spacing,
        ..ComputedStyle::default()
    });
    let table = document.create_element(None, "table", Some(style)).unwrap();
    (document, table)
}

fn element(document: &mut Document, parent: NodeId, name: &str, display: Display) -> NodeId {
    document
        .create_element(Some(parent), name, Some(styled(display)))
        .unwrap()
}

/// Add a cell holding `text` to `row`, returning the cell and its text node.
fn cell(document: &mut Document, row: NodeId, text: &str) -> (NodeId, NodeId) {
    let cell = element(document, row, "td", Display::TableCell);
    let text = document.create_text(cell, text).unwrap();
    (cell, text)
}

fn window_of(primitives: &[Primitive], node: NodeId) -> (i32, i32, i32, i32) {
    primitives
        .iter()
        .find_map(|primitive| match *primitive {
            Primitive::DrawWindow {
                x,
                y,
                width,
                height,
                node: drawn,
            } if drawn == node => Some((x, y, width, height)),
            _ => None,
        })
        .unwrap()
}

fn box_of(primitives: &[Primitive], node: NodeId) -> (i32, i32, i32, i32) {
    primitives
        .iter()
        .find_map(|primitive| match *primitive {
            Primitive::DrawBox {
                x,
                y,
                width,
                height,
                node: drawn,
            } if drawn == node => Some((x, y, width, height)),
            _ => None,
        })
        .unwrap()
}

fn box_items(canvas: &Canvas) -> Vec<&ItemHandle> {
    canvas
        .entries()
        .iter()
        .filter(|entry| matches!(entry.item.item(), CanvasItem::Box(_)))
        .map(|entry| &entry.item)
        .collect()
}

#[test]
fn simple_grid_is_drawn_row_by_row() {
    init_logging();
    let (mut document, table) = new_table(2);
    let first_row = element(&mut document, table, "tr", Display::TableRow);
    let (a, a_text) = cell(&mut document, first_row, "ab");
    let (b, b_text) = cell(&mut document, first_row, "abcd");
    let second_row = element(&mut document, table, "tr", Display::TableRow);
    let (c, c_text) = cell(&mut document, second_row, "abc");
    let (d, d_text) = cell(&mut document, second_row, "a");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let max = session
        .layout_table(table, ContainingBlock::new(500, 0), LayoutMode::MaxWidth)
        .unwrap();
    assert_eq!((max.width, max.height), (76, 0));

    let drawn = session
        .layout_table(table, ContainingBlock::new(76, 0), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.column_widths, vec![30, 40]);
    assert_eq!((drawn.width, drawn.height), (76, 26));

    let boxed = |x, y, width, height, node| Primitive::DrawBox {
        x,
        y,
        width,
        height,
        node,
    };
    let window = |x, y, width, height, node| Primitive::DrawWindow {
        x,
        y,
        width,
        height,
        node,
    };
    assert_eq!(
        drawn.canvas.primitives(),
        vec![
            boxed(2, 2, 72, 10, first_row),
            boxed(2, 2, 30, 10, a),
            window(2, 2, 20, 10, a_text),
            boxed(34, 2, 40, 10, b),
            window(34, 2, 40, 10, b_text),
            boxed(2, 14, 72, 10, second_row),
            boxed(2, 14, 30, 10, c),
            window(2, 14, 30, 10, c_text),
            boxed(34, 14, 40, 10, d),
            window(34, 14, 10, 10, d_text),
        ]
    );
}

#[test]
fn minimum_width_only_measures() {
    let (mut document, table) = new_table(3);
    let row = element(&mut document, table, "tr", Display::TableRow);
    cell(&mut document, row, "abcde");
    cell(&mut document, row, "a");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let min = session
        .layout_table(table, ContainingBlock::new(10, 0), LayoutMode::MinWidth)
        .unwrap();
    assert_eq!((min.width, min.height), (50 + 10 + 9, 0));
    assert!(min.canvas.is_empty());
    assert!(min.column_widths.is_empty());
}

#[test]
fn cells_spanning_columns_widen_them() {
    let (mut document, table) = new_table(2);
    let first_row = element(&mut document, table, "tr", Display::TableRow);
    let (wide, wide_text) = cell(&mut document, first_row, "abcdefgh");
    document.set_attribute(wide, "ColSpan", "2").unwrap();
    let second_row = element(&mut document, table, "tr", Display::TableRow);
    cell(&mut document, second_row, "ab");
    cell(&mut document, second_row, "abc");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let min = session
        .layout_table(table, ContainingBlock::new(0, 0), LayoutMode::MinWidth)
        .unwrap();
    assert!(min.width >= 80 + 2 * 2, "{}", min.width);

    let drawn = session
        .layout_table(table, ContainingBlock::new(min.width, 0), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.column_widths.len(), 2);
    let primitives = drawn.canvas.primitives();
    let (x, _, width, _) = box_of(&primitives, wide);
    assert_eq!(x, 2);
    assert_eq!(width, drawn.column_widths.iter().sum::<i32>() + 2);
    assert!(width >= 80);
    assert_eq!(window_of(&primitives, wide_text).0, 2);
}

#[test]
fn stray_content_is_wrapped_in_anonymous_cells() {
    let (mut document, table) = new_table(0);
    let stray = document.create_text(table, "abc").unwrap();
    let (real, real_text) = cell(&mut document, table, "de");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(50, 0), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.column_widths, vec![30, 20]);

    let primitives = drawn.canvas.primitives();
    let boxes = primitives
        .iter()
        .filter(|primitive| matches!(primitive, Primitive::DrawBox { .. }))
        .count();
    assert_eq!(boxes, 1);
    assert_eq!(box_of(&primitives, real), (30, 0, 20, 10));
    assert_eq!(window_of(&primitives, stray), (0, 0, 30, 10));
    assert_eq!(window_of(&primitives, real_text), (30, 0, 20, 10));
}

#[test]
fn header_and_footer_groups_are_moved_to_the_ends() {
    let (mut document, table) = new_table(1);
    let body = element(&mut document, table, "tbody", Display::TableRowGroup);
    let body_row = element(&mut document, body, "tr", Display::TableRow);
    let (_, body_text) = cell(&mut document, body_row, "b");
    let footer = element(&mut document, table, "tfoot", Display::TableFooterGroup);
    let footer_row = element(&mut document, footer, "tr", Display::TableRow);
    let (_, footer_text) = cell(&mut document, footer_row, "c");
    let header = element(&mut document, table, "thead", Display::TableHeaderGroup);
    let header_row = element(&mut document, header, "tr", Display::TableRow);
    let (_, header_text) = cell(&mut document, header_row, "a");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(100, 0), LayoutMode::Draw)
        .unwrap();
    let primitives = drawn.canvas.primitives();
    let header_y = window_of(&primitives, header_text).1;
    let body_y = window_of(&primitives, body_text).1;
    let footer_y = window_of(&primitives, footer_text).1;
    assert_eq!((header_y, body_y, footer_y), (1, 12, 23));
    assert_eq!(drawn.height, 34);
}

#[test]
fn rows_are_added_for_cells_spanning_past_the_end() {
    let (mut document, table) = new_table(2);
    let row = element(&mut document, table, "tr", Display::TableRow);
    let (tall, _) = cell(&mut document, row, "a");
    document.set_attribute(tall, "rowspan", "3").unwrap();
    cell(&mut document, row, "b");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(100, 0), LayoutMode::Draw)
        .unwrap();
    let (_, y, _, height) = box_of(&drawn.canvas.primitives(), tall);
    assert_eq!(y, 2);
    assert!(drawn.height >= 2 + LINE_HEIGHT + 2);
    assert_eq!(height, drawn.height - 2 - 2);
}

#[test]
fn zero_colspans_stop_at_the_next_cell() {
    let (mut document, table) = new_table(0);
    let first_row = element(&mut document, table, "tr", Display::TableRow);
    let (wide, _) = cell(&mut document, first_row, "aaa");
    document.set_attribute(wide, "colspan", "0").unwrap();
    let (next, _) = cell(&mut document, first_row, "bb");
    let second_row = element(&mut document, table, "tr", Display::TableRow);
    let (last, _) = cell(&mut document, second_row, "c");
    document.set_attribute(last, "colspan", "0").unwrap();

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(200, 0), LayoutMode::Draw)
        .unwrap();
    let primitives = drawn.canvas.primitives();
    let (wide_x, _, wide_width, _) = box_of(&primitives, wide);
    let (next_x, _, _, _) = box_of(&primitives, next);
    assert_eq!(drawn.column_widths.len(), 2);
    assert!(wide_x + wide_width <= next_x);

    let (last_x, _, last_width, _) = box_of(&primitives, last);
    assert_eq!(last_x, 0);
    assert_eq!(last_width, drawn.column_widths.iter().sum::<i32>());
}

#[test]
fn zero_rowspans_reach_the_last_row() {
    let (mut document, table) = new_table(2);
    let first_row = element(&mut document, table, "tr", Display::TableRow);
    let (tall, _) = cell(&mut document, first_row, "a");
    document.set_attribute(tall, "rowspan", "0").unwrap();
    cell(&mut document, first_row, "b");
    let second_row = element(&mut document, table, "tr", Display::TableRow);
    let (second, _) = cell(&mut document, second_row, "c");
    let third_row = element(&mut document, table, "tr", Display::TableRow);
    let (third, _) = cell(&mut document, third_row, "d");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(100, 0), LayoutMode::Draw)
        .unwrap();
    let primitives = drawn.canvas.primitives();
    let (tall_x, tall_y, tall_width, tall_height) = box_of(&primitives, tall);
    assert_eq!(tall_y, 2);
    assert_eq!(tall_height, drawn.height - 2 - 2);
    for below in [second, third] {
        assert!(tall_x + tall_width <= box_of(&primitives, below).0);
    }
}

#[test]
fn cell_content_is_aligned_vertically() {
    let (mut document, table) = new_table(0);
    let row = element(&mut document, table, "tr", Display::TableRow);
    let tall = element(&mut document, row, "td", Display::TableCell);
    for line in ["a", "b", "c"] {
        document.create_text(tall, line).unwrap();
    }

    let mut aligned = |align: VerticalAlign, text: &str| {
        let style = Arc::new(ComputedStyle {
            display: Display::TableCell,
            vertical_align: align,
            ..ComputedStyle::default()
        });
        let cell = document.create_element(Some(row), "td", Some(style)).unwrap();
        document.create_text(cell, text).unwrap()
    };
    let bottom = aligned(VerticalAlign::Bottom, "x");
    let top = aligned(VerticalAlign::Top, "y");
    let middle = aligned(VerticalAlign::Middle, "z");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(40, 0), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.height, 30);
    let primitives = drawn.canvas.primitives();
    assert_eq!(window_of(&primitives, bottom).1, 20);
    assert_eq!(window_of(&primitives, top).1, 0);
    assert_eq!(window_of(&primitives, middle).1, 10);
}

#[test]
fn cell_content_sits_inside_border_and_padding() {
    let (mut document, table) = new_table(0);
    let row = element(&mut document, table, "tr", Display::TableRow);
    let style = Arc::new(ComputedStyle {
        display: Display::TableCell,
        padding: PhysicalSides::uniform(3),
        vertical_align: VerticalAlign::Top,
        ..ComputedStyle::default()
    });
    let padded = document.create_element(Some(row), "td", Some(style)).unwrap();
    let text = document.create_text(padded, "ab").unwrap();

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(26, 0), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.column_widths, vec![26]);
    assert_eq!(drawn.height, 16);
    let primitives = drawn.canvas.primitives();
    assert_eq!(box_of(&primitives, padded), (0, 0, 26, 16));
    assert_eq!(window_of(&primitives, text), (3, 3, 20, 10));
}

#[test]
fn nested_tables_can_ignore_percentages() {
    let (mut document, outer) = new_table(0);
    let outer_row = element(&mut document, outer, "tr", Display::TableRow);
    let outer_cell = element(&mut document, outer_row, "td", Display::TableCell);
    let inner = element(&mut document, outer_cell, "table", Display::Table);
    let inner_row = element(&mut document, inner, "tr", Display::TableRow);
    let style = Arc::new(ComputedStyle {
        display: Display::TableCell,
        width: LengthPercentageOrAuto::Percent(50.),
        ..ComputedStyle::default()
    });
    let half = document.create_element(Some(inner_row), "td", Some(style)).unwrap();
    document.create_text(half, "ab").unwrap();

    let content = OneLinePerText;
    let containing_block = ContainingBlock::new(1000, 0);
    let mut session = LayoutSession::new(&document, &content);
    let considered = session
        .layout_table(inner, containing_block, LayoutMode::MaxWidth)
        .unwrap();
    assert_eq!(considered.width, 40);

    let options = LayoutOptions {
        percent_ignored_in_nested_tables: true,
        ..LayoutOptions::default()
    };
    let mut session = LayoutSession::with_options(&document, &content, options);
    let ignored = session
        .layout_table(inner, containing_block, LayoutMode::MaxWidth)
        .unwrap();
    assert_eq!(ignored.width, 20);
}

#[test]
fn negative_containing_blocks_give_the_narrowest_table() {
    let (mut document, table) = new_table(1);
    let row = element(&mut document, table, "tr", Display::TableRow);
    cell(&mut document, row, "abc");
    cell(&mut document, row, "ab");

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let drawn = session
        .layout_table(table, ContainingBlock::new(-40, -5), LayoutMode::Draw)
        .unwrap();
    assert_eq!(drawn.column_widths, vec![30, 20]);
    assert_eq!(drawn.width, 53);
}

#[test]
fn only_tables_can_be_laid_out() {
    let (mut document, table) = new_table(0);
    let div = element(&mut document, table, "div", Display::Block);
    let text = document.create_text(div, "hello").unwrap();

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let mode = LayoutMode::Draw;
    let containing_block = ContainingBlock::default();
    assert!(matches!(
        session.layout_table(div, containing_block, mode),
        Err(LayoutError::NotATable(node)) if node == div
    ));
    assert!(matches!(
        session.layout_table(text, containing_block, mode),
        Err(LayoutError::NotATable(_))
    ));

    let mut bigger = Document::new();
    let root = bigger.create_element(None, "html", None).unwrap();
    let stranger = (0..8)
        .map(|_| bigger.create_element(Some(root), "p", None).unwrap())
        .last()
        .unwrap();
    assert!(matches!(
        session.layout_table(stranger, containing_block, mode),
        Err(LayoutError::UnknownNode(node)) if node == stranger
    ));
}

#[test]
fn unchanged_boxes_are_shared_between_layouts() {
    let (mut document, table) = new_table(2);
    let row = element(&mut document, table, "tr", Display::TableRow);
    cell(&mut document, row, "abc");
    cell(&mut document, row, "de");
    let containing_block = ContainingBlock::new(200, 0);

    let content = OneLinePerText;
    let mut session = LayoutSession::new(&document, &content);
    let first = session
        .layout_table(table, containing_block, LayoutMode::Draw)
        .unwrap();
    let second = session
        .layout_table(table, containing_block, LayoutMode::Draw)
        .unwrap();
    let (first_items, second_items) = (box_items(&first.canvas), box_items(&second.canvas));
    assert_eq!(first_items.len(), 3);
    assert_eq!(first_items.len(), second_items.len());
    assert!(first_items
        .iter()
        .zip(&second_items)
        .all(|(first, second)| first.ptr_eq(second)));

    let options = LayoutOptions {
        reuse_box_items: false,
        ..LayoutOptions::default()
    };
    let mut session = LayoutSession::with_options(&document, &content, options);
    let first = session
        .layout_table(table, containing_block, LayoutMode::Draw)
        .unwrap();
    let second = session
        .layout_table(table, containing_block, LayoutMode::Draw)
        .unwrap();
    assert!(box_items(&first.canvas)
        .iter()
        .zip(box_items(&second.canvas))
        .all(|(first, second)| !first.ptr_eq(second)));
}

/// Build a table from rows of `(text length, colspan, rowspan)`.
fn generated_table(rows: &[Vec<(u8, u8, u8)>]) -> (Document, NodeId) {
    let (mut document, table) = new_table(2);
    for cells in rows.iter().take(6) {
        let row = element(&mut document, table, "tr", Display::TableRow);
        for &(length, colspan, rowspan) in cells.iter().take(6) {
            let text = "x".repeat(usize::from(length % 12));
            let (cell, _) = cell(&mut document, row, &text);
            document
                .set_attribute(cell, "colspan", &(colspan % 4).to_string())
                .unwrap();
            document
                .set_attribute(cell, "rowspan", &(rowspan % 4).to_string())
                .unwrap();
        }
    }
    (document, table)
}

quickcheck! {
    fn layouts_are_repeatable(rows: Vec<Vec<(u8, u8, u8)>>, width: u16) -> bool {
        let (document, table) = generated_table(&rows);
        let content = OneLinePerText;
        let containing_block = ContainingBlock::new(i32::from(width % 1000), 0);

        let mut session = LayoutSession::new(&document, &content);
        let first = session.layout_table(table, containing_block, LayoutMode::Draw).unwrap();
        let second = session.layout_table(table, containing_block, LayoutMode::Draw).unwrap();
        let mut fresh = LayoutSession::new(&document, &content);
        let third = fresh.layout_table(table, containing_block, LayoutMode::Draw).unwrap();

        [&second, &third].iter().all(|other| {
            other.column_widths == first.column_widths &&
                (other.width, other.height) == (first.width, first.height) &&
                other.canvas.primitives() == first.canvas.primitives()
        })
    }

    fn drawn_tables_are_never_narrower_than_their_minimum(
        rows: Vec<Vec<(u8, u8, u8)>>,
        width: u16
    ) -> bool {
        let (document, table) = generated_table(&rows);
        let content = OneLinePerText;
        let containing_block = ContainingBlock::new(i32::from(width % 1000), 0);
        let mut session = LayoutSession::new(&document, &content);
        let min = session.layout_table(table, containing_block, LayoutMode::MinWidth).unwrap();
        let max = session.layout_table(table, containing_block, LayoutMode::MaxWidth).unwrap();
        let drawn = session.layout_table(table, containing_block, LayoutMode::Draw).unwrap();
        min.width <= max.width && min.width <= drawn.width
    }

    fn drawn_cells_never_overlap(rows: Vec<Vec<(u8, u8, u8)>>, width: u16) -> bool {
        let (document, table) = generated_table(&rows);
        let content = OneLinePerText;
        let containing_block = ContainingBlock::new(i32::from(width % 1000), 0);
        let mut session = LayoutSession::new(&document, &content);
        let drawn = session.layout_table(table, containing_block, LayoutMode::Draw).unwrap();

        let cells: Vec<_> = drawn
            .canvas
            .primitives()
            .into_iter()
            .filter_map(|primitive| match primitive {
                Primitive::DrawBox { x, y, width, height, node }
                    if document.style(node).display == Display::TableCell =>
                {
                    Some((x, y, x + width, y + height))
                },
                _ => None,
            })
            .collect();
        cells.iter().enumerate().all(|(index, a)| {
            cells[index + 1..]
                .iter()
                .all(|b| a.2 <= b.0 || b.2 <= a.0 || a.3 <= b.1 || b.3 <= a.1)
        })
    }
}
