/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Materializing a canvas onto a real surface.
//!
//! Painting walks the items visible in a viewport in z-order and lowers each of them to a few
//! primitive operations on a [`PaintBackend`]. All geometry handed to the backend is relative to
//! the top-left corner of the viewport.

use layout_api::style::{BorderSide, TextDecorationLine};
use layout_api::{ComputedStyle, Document, FontHandle, ImageHandle, NodeId};
use log::trace;
use tabula_geometry::{CanvasPoint, CanvasRect, CanvasVector, rect_from_origin_and_size};

use crate::canvas::Canvas;
use crate::item::{BoxFlags, BoxItem, CanvasItem, LineItem};
use crate::search::Viewport;
use crate::sort::{ItemSorter, SortedSlot};

pub use layout_api::style::Color;

/// A surface that can draw the primitives a canvas lowers to.
pub trait PaintBackend {
    /// Restrict all following operations to `clip`, or lift the restriction if it is `None`.
    fn set_clip(&mut self, clip: Option<CanvasRect>);

    fn fill_rect(&mut self, rect: CanvasRect, color: Color);

    /// Draw `text` with the left end of its baseline at `baseline`.
    fn draw_text(&mut self, baseline: CanvasPoint, text: &str, font: &FontHandle, color: Color);

    /// Draw `image` scaled to fill `rect`.
    fn draw_image(&mut self, rect: CanvasRect, image: &ImageHandle);

    /// Map the embedded window owned by `node` onto `rect`.
    fn place_window(&mut self, node: NodeId, rect: CanvasRect);
}

/// Paint every item of `canvas` that is visible in `viewport` onto `backend`, lowest z-level
/// first.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "paint_canvas", skip_all, level = "trace")
)]
pub fn paint_canvas(
    canvas: &Canvas,
    document: &Document,
    viewport: &Viewport,
    backend: &mut dyn PaintBackend,
) {
    let sorter = ItemSorter::collect(canvas, document, viewport.band(), viewport);
    trace!("Painting {} items", sorter.len());

    let mut current_clip: Option<CanvasRect> = None;
    for slot in sorter.iter() {
        let clip = slot
            .clip
            .as_ref()
            .map(|clip| clip.rect.translate(-viewport.scroll_offset()));
        if clip != current_clip {
            backend.set_clip(clip);
            current_clip = clip;
        }
        paint_slot(slot, document, viewport, backend);
    }
    if current_clip.is_some() {
        backend.set_clip(None);
    }
}

fn paint_slot(
    slot: &SortedSlot,
    document: &Document,
    viewport: &Viewport,
    backend: &mut dyn PaintBackend,
) {
    let mut shift = viewport.scroll_offset();
    if let Some(clip) = &slot.clip {
        shift += clip.scroll;
    }
    let position = slot.position - shift;

    match slot.item.item() {
        CanvasItem::Box(item) => paint_box(item, position, backend),
        CanvasItem::Text(text) => {
            let color = document.style(text.node).color;
            backend.draw_text(position, &text.text, &text.font, color);
        },
        CanvasItem::Line(line) => paint_line(line, position, document, backend),
        CanvasItem::Image(image) => {
            if let Some(handle) = &image.image {
                let rect = rect_from_origin_and_size(
                    position.x,
                    position.y,
                    image.size.width,
                    image.size.height,
                );
                backend.draw_image(rect, handle);
            }
        },
        CanvasItem::Window(window) => {
            let rect = rect_from_origin_and_size(
                position.x,
                position.y,
                window.size.width,
                window.size.height,
            );
            backend.place_window(window.node, rect);
        },
        CanvasItem::Origin(_) | CanvasItem::Marker(_) | CanvasItem::Overflow(_) => {},
    }
}

fn paint_box(item: &BoxItem, position: CanvasPoint, backend: &mut dyn PaintBackend) {
    let style: &ComputedStyle = &item.style;
    let (x, y) = (position.x, position.y);
    let (width, height) = (item.size.width, item.size.height);

    let mut sides = style.border;
    if item.flags.contains(BoxFlags::OPEN_LEFT) {
        sides.left = BorderSide::default();
    }
    if item.flags.contains(BoxFlags::OPEN_RIGHT) {
        sides.right = BorderSide::default();
    }
    let widths = sides.map(|side| side.used_width());

    let inner = rect_from_origin_and_size(
        x + widths.left,
        y + widths.top,
        width - widths.horizontal(),
        height - widths.vertical(),
    );
    if !inner.is_empty() {
        if let Some(color) = style.background_color {
            backend.fill_rect(inner, color);
        }
        if let Some(image) = &style.background_image {
            backend.draw_image(inner, image);
        }
    }

    let edges = [
        (sides.top, rect_from_origin_and_size(x, y, width, widths.top)),
        (
            sides.bottom,
            rect_from_origin_and_size(x, y + height - widths.bottom, width, widths.bottom),
        ),
        (sides.left, rect_from_origin_and_size(x, y, widths.left, height)),
        (
            sides.right,
            rect_from_origin_and_size(x + width - widths.right, y, widths.right, height),
        ),
    ];
    for (side, rect) in edges {
        if side.used_width() > 0 {
            backend.fill_rect(rect, side.color);
        }
    }

    let outline = style.outline_width();
    if outline > 0 {
        let color = style.outline.color;
        let outer = rect_from_origin_and_size(
            x - outline,
            y - outline,
            width + 2 * outline,
            height + 2 * outline,
        );
        let outer_width = outer.width();
        let outer_height = outer.height();
        let (ox, oy) = (outer.min.x, outer.min.y);
        backend.fill_rect(rect_from_origin_and_size(ox, oy, outer_width, outline), color);
        backend.fill_rect(
            rect_from_origin_and_size(ox, outer.max.y - outline, outer_width, outline),
            color,
        );
        backend.fill_rect(rect_from_origin_and_size(ox, oy, outline, outer_height), color);
        backend.fill_rect(
            rect_from_origin_and_size(outer.max.x - outline, oy, outline, outer_height),
            color,
        );
    }
}

fn paint_line(
    line: &LineItem,
    position: CanvasPoint,
    document: &Document,
    backend: &mut dyn PaintBackend,
) {
    let style = document.style(line.node);
    let decoration = style.text_decoration;
    let offsets = [
        (TextDecorationLine::OVERLINE, 0),
        (TextDecorationLine::LINE_THROUGH, line.y_linethrough),
        (TextDecorationLine::UNDERLINE, line.y_underline),
    ];
    for (flag, offset) in offsets {
        if decoration.contains(flag) {
            let origin = position + CanvasVector::new(0, offset);
            backend.fill_rect(
                rect_from_origin_and_size(origin.x, origin.y, line.width, 1),
                style.color,
            );
        }
    }
}
