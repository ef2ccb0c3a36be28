/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::ControlFlow;
use std::sync::Arc;

use atomic_refcell::AtomicRefCell;
use layout_api::{ComputedStyle, Document, FontHandle, ImageHandle, NodeId};
use rustc_hash::FxHashMap;
use serde::Serialize;
use strum::IntoStaticStr;
use tabula_geometry::{
    CanvasPoint, CanvasRect, CanvasSize, CanvasVector, RectUnion, extend_bounds,
    rect_from_origin_and_size,
};

use crate::item::{
    BoxFlags, BoxItem, CanvasItem, ImageItem, ItemHandle, LineItem, MarkerKind, OriginMarker,
    OverflowRegion, TextRun, WindowItem,
};
use crate::search::{SearchRange, Viewport, search_canvas};

/// An item together with its place in a canvas.
#[derive(Clone, Debug)]
pub struct CanvasEntry {
    /// For drawable items and markers, the position of the item relative to the enclosing origin
    /// frame. For origin markers, the shift this marker applies to the running origin.
    pub offset: CanvasVector,
    pub item: ItemHandle,
    /// For the start of an origin bracket, the distance to its end marker. For an overflow
    /// region, the distance to the last entry clipped by it. Zero otherwise.
    partner: usize,
}

impl CanvasEntry {
    fn new(offset: CanvasVector, item: CanvasItem) -> Self {
        CanvasEntry {
            offset,
            item: ItemHandle::new(item),
            partner: 0,
        }
    }

    /// The index of the entry paired with this one, if it opens an origin bracket or an overflow
    /// region and sits at `index`.
    pub fn partner_index(&self, index: usize) -> Option<usize> {
        (self.partner > 0).then_some(index + self.partner)
    }

    pub(crate) fn partner(&self) -> usize {
        self.partner
    }
}

/// A display list: an ordered sequence of canvas items and a running bounding box.
///
/// Items are positioned relative to the origin frame they sit in. Frames are opened and closed by
/// pairs of origin markers, so that a whole canvas can be moved by adjusting the offsets of its
/// top-level entries only, and so that searches can skip over frames that lie outside the area
/// they are interested in.
///
/// A measuring canvas only tracks its bounding box. Drawing onto it creates no items, apart from
/// markers, which layout always needs to read back.
#[derive(Debug)]
pub struct Canvas {
    entries: Vec<CanvasEntry>,
    bounds: CanvasRect,
    measure_only: bool,
    node_boxes: AtomicRefCell<FxHashMap<NodeId, Option<CanvasRect>>>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Canvas {
            entries: Vec::new(),
            bounds: CanvasRect::zero(),
            measure_only: false,
            node_boxes: Default::default(),
        }
    }

    /// A canvas that records bounds but no items.
    pub fn measuring() -> Self {
        Canvas {
            measure_only: true,
            ..Self::new()
        }
    }

    pub fn is_measure_only(&self) -> bool {
        self.measure_only
    }

    pub fn bounds(&self) -> CanvasRect {
        self.bounds
    }

    pub fn entries(&self) -> &[CanvasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has extended the bounds of this canvas beyond its origin.
    pub fn is_empty(&self) -> bool {
        self.bounds.min == self.bounds.max
    }

    fn touch(&mut self) {
        self.node_boxes.get_mut().clear();
    }

    fn extend(&mut self, rect: &CanvasRect) {
        extend_bounds(&mut self.bounds, rect);
    }

    fn push(&mut self, offset: CanvasVector, item: CanvasItem) -> ItemHandle {
        self.touch();
        let entry = CanvasEntry::new(offset, item);
        let handle = entry.item.clone();
        self.entries.push(entry);
        handle
    }

    /// Add a box for `node` with its top-left outer border corner at `origin`.
    ///
    /// If `candidate` is a box item with the same size, flags and style, it is reused rather than
    /// allocating a new item, so that an unchanged box stays identical across layouts.
    pub fn draw_box(
        &mut self,
        origin: CanvasPoint,
        size: CanvasSize,
        node: NodeId,
        style: &Arc<ComputedStyle>,
        flags: BoxFlags,
        candidate: Option<&ItemHandle>,
    ) -> Option<ItemHandle> {
        if self.measure_only {
            self.extend(&rect_from_origin_and_size(
                origin.x,
                origin.y,
                size.width,
                size.height,
            ));
            return None;
        }

        let reusable = candidate.filter(|candidate| match candidate.item() {
            CanvasItem::Box(item) => {
                item.node == node &&
                    item.size == size &&
                    item.flags == flags &&
                    Arc::ptr_eq(&item.style, style)
            },
            _ => false,
        });
        let handle = match reusable {
            Some(candidate) => {
                self.touch();
                self.entries.push(CanvasEntry {
                    offset: origin.to_vector(),
                    item: candidate.clone(),
                    partner: 0,
                });
                candidate.clone()
            },
            None => self.push(
                origin.to_vector(),
                CanvasItem::Box(BoxItem {
                    node,
                    size,
                    flags,
                    style: style.clone(),
                }),
            ),
        };
        if let Some(extent) = handle.extent(origin) {
            self.extend(&extent);
        }
        Some(handle)
    }

    /// Add the decoration lines of `node`. The three y coordinates are absolute within the
    /// current frame; the overline is the top of the item.
    pub fn draw_line(
        &mut self,
        x: i32,
        width: i32,
        y_overline: i32,
        y_linethrough: i32,
        y_underline: i32,
        node: NodeId,
    ) {
        if !self.measure_only {
            self.push(
                CanvasVector::new(x, y_overline),
                CanvasItem::Line(LineItem {
                    node,
                    width,
                    y_underline: y_underline - y_overline,
                    y_linethrough: y_linethrough - y_overline,
                }),
            );
        }
        self.extend(&CanvasRect::new(
            CanvasPoint::new(x, y_overline),
            CanvasPoint::new(x + width, y_underline),
        ));
    }

    /// Add a run of text with the left end of its baseline at `baseline`.
    pub fn draw_text(
        &mut self,
        baseline: CanvasPoint,
        width: i32,
        node: NodeId,
        font: &FontHandle,
        text: &str,
        char_offset: Option<usize>,
    ) {
        if !self.measure_only {
            self.push(
                baseline.to_vector(),
                CanvasItem::Text(TextRun {
                    node,
                    width,
                    font: font.clone(),
                    text: Arc::from(text),
                    char_offset,
                }),
            );
        }
        self.extend(&CanvasRect::new(
            CanvasPoint::new(baseline.x, baseline.y - font.ascent()),
            CanvasPoint::new(baseline.x + width, baseline.y + font.descent()),
        ));
    }

    pub fn draw_image(
        &mut self,
        origin: CanvasPoint,
        size: CanvasSize,
        node: NodeId,
        image: Option<ImageHandle>,
    ) {
        if !self.measure_only {
            self.push(
                origin.to_vector(),
                CanvasItem::Image(ImageItem { node, size, image }),
            );
        }
        self.extend(&rect_from_origin_and_size(
            origin.x,
            origin.y,
            size.width,
            size.height,
        ));
    }

    pub fn draw_window(&mut self, origin: CanvasPoint, size: CanvasSize, node: NodeId) {
        if !self.measure_only {
            self.push(
                origin.to_vector(),
                CanvasItem::Window(WindowItem { node, size }),
            );
        }
        self.extend(&rect_from_origin_and_size(
            origin.x,
            origin.y,
            size.width,
            size.height,
        ));
    }

    /// Bracket everything currently on the canvas with a pair of origin markers. Does nothing if
    /// the canvas has no entries.
    pub fn draw_origin(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.touch();

        let mut start = CanvasEntry::new(
            CanvasVector::zero(),
            CanvasItem::Origin(OriginMarker::Start {
                extent: self.bounds,
            }),
        );
        start.partner = self.entries.len() + 1;
        self.entries.insert(0, start);
        self.entries.push(CanvasEntry::new(
            CanvasVector::zero(),
            CanvasItem::Origin(OriginMarker::End),
        ));
    }

    pub fn draw_marker(&mut self, point: CanvasPoint, kind: MarkerKind) -> ItemHandle {
        self.push(point.to_vector(), CanvasItem::Marker(kind))
    }

    pub fn draw_linebox(&mut self, point: CanvasPoint) {
        self.draw_marker(point, MarkerKind::Linebox);
    }

    /// Clip everything currently on the canvas to the `size` rectangle at its origin, on behalf of
    /// `node`. The bounds of the canvas become that rectangle.
    ///
    /// Trailing markers are left outside the region. Does nothing if the canvas holds nothing but
    /// markers.
    pub fn draw_overflow(&mut self, node: NodeId, size: CanvasSize) {
        let Some(last) = self
            .entries
            .iter()
            .rposition(|entry| !matches!(entry.item.item(), CanvasItem::Marker(_)))
        else {
            return;
        };
        self.touch();

        let mut region = CanvasEntry::new(
            CanvasVector::zero(),
            CanvasItem::Overflow(OverflowRegion { node, size }),
        );
        region.partner = last + 1;
        self.entries.insert(0, region);
        self.bounds = rect_from_origin_and_size(0, 0, size.width, size.height);
    }

    /// Move the contents of `other` onto the end of this canvas, translated by `offset`.
    ///
    /// Only the top-level entries of `other` are adjusted: each origin bracket is moved by
    /// shifting its start marker and compensating at its end marker.
    pub fn merge(&mut self, other: Canvas, offset: CanvasVector) {
        let Canvas {
            mut entries,
            bounds,
            ..
        } = other;

        if !entries.is_empty() {
            self.touch();
            if offset != CanvasVector::zero() {
                let mut index = 0;
                while index < entries.len() {
                    entries[index].offset += offset;
                    if matches!(
                        entries[index].item.item(),
                        CanvasItem::Origin(OriginMarker::Start { .. })
                    ) {
                        index += entries[index].partner;
                        if let Some(end) = entries.get_mut(index) {
                            end.offset -= offset;
                        }
                    }
                    index += 1;
                }
            }
            self.entries.append(&mut entries);
        }

        self.extend(&bounds.translate(offset));
    }

    /// Walk the entries with the running origin, the way [`Canvas::take_marker`] and
    /// [`Canvas::find_linebox`] read marker positions back.
    fn find_marker(
        &self,
        predicate: impl Fn(&CanvasEntry) -> bool,
    ) -> Option<(usize, CanvasPoint)> {
        let mut origin = CanvasVector::zero();
        for (index, entry) in self.entries.iter().enumerate() {
            match entry.item.item() {
                CanvasItem::Origin(_) => origin += entry.offset,
                CanvasItem::Marker(_) if predicate(entry) => {
                    return Some((index, (origin + entry.offset).to_point()));
                },
                _ => {},
            }
        }
        None
    }

    /// Remove `marker` from the canvas and return its position relative to the canvas origin.
    pub fn take_marker(&mut self, marker: &ItemHandle) -> Option<CanvasPoint> {
        let (index, position) = self.find_marker(|entry| entry.item.ptr_eq(marker))?;
        self.touch();
        self.entries.remove(index);
        for (earlier, entry) in self.entries[..index].iter_mut().enumerate() {
            if entry.partner > 0 && earlier + entry.partner >= index {
                entry.partner -= 1;
            }
        }
        Some(position)
    }

    /// The position of the first line box baseline marker on the canvas.
    pub fn find_linebox(&self) -> Option<CanvasPoint> {
        self.find_marker(|entry| {
            matches!(entry.item.item(), CanvasItem::Marker(MarkerKind::Linebox))
        })
        .map(|(_, position)| position)
    }

    /// The bounding box of the content generated by `node` and its descendants.
    ///
    /// Content inside an overflow region is clipped to the region, and a region owned by `node`
    /// or one of its descendants counts in full. Results are cached until the canvas changes.
    pub fn node_bounding_box(&self, document: &Document, node: NodeId) -> Option<CanvasRect> {
        if let Some(cached) = self.node_boxes.borrow().get(&node) {
            return *cached;
        }
        let result = if document.contains(node) {
            self.compute_node_bounding_box(document, node)
        } else {
            None
        };
        self.node_boxes.borrow_mut().insert(node, result);
        result
    }

    fn compute_node_bounding_box(&self, document: &Document, node: NodeId) -> Option<CanvasRect> {
        let mut union = RectUnion::default();
        let mut origin = CanvasVector::zero();
        let mut clips: Vec<(CanvasRect, usize)> = Vec::new();

        for (index, entry) in self.entries.iter().enumerate() {
            match entry.item.item() {
                CanvasItem::Origin(_) => origin += entry.offset,
                CanvasItem::Marker(_) => {},
                CanvasItem::Overflow(region) => {
                    let position = origin + entry.offset;
                    let mut clip = rect_from_origin_and_size(
                        position.x,
                        position.y,
                        region.size.width,
                        region.size.height,
                    );
                    if let Some((outer, _)) = clips.last() {
                        clip = clip.intersection(outer).unwrap_or(CanvasRect::zero());
                    }
                    if document.is_inclusive_ancestor(node, region.node) {
                        union.add(clip);
                    }
                    clips.push((clip, index + entry.partner));
                },
                item => {
                    let owned = item
                        .node()
                        .is_some_and(|item_node| document.is_inclusive_ancestor(node, item_node));
                    if owned {
                        let extent = item.extent((origin + entry.offset).to_point());
                        let clipped = match (extent, clips.last()) {
                            (Some(extent), Some((clip, _))) => extent.intersection(clip),
                            (extent, None) => extent,
                            (None, _) => None,
                        };
                        if let Some(rect) = clipped {
                            union.add(rect);
                        }
                    }
                },
            }
            while clips.last().is_some_and(|(_, end)| *end <= index) {
                clips.pop();
            }
        }
        union.finish()
    }

    /// A flattened listing of every drawable item with its absolute position.
    pub fn primitives(&self) -> Vec<Primitive> {
        let mut primitives = Vec::new();
        let _ = search_canvas(
            self,
            SearchRange::UNBOUNDED,
            &Viewport::default(),
            |visit| {
                let (x, y) = (visit.position.x, visit.position.y);
                let primitive = match visit.item.item() {
                    CanvasItem::Text(text) => Primitive::DrawText {
                        x,
                        y,
                        width: text.width,
                        node: text.node,
                        text: text.text.to_string(),
                        char_offset: text.char_offset,
                    },
                    CanvasItem::Line(line) => Primitive::DrawLine {
                        x,
                        y,
                        width: line.width,
                        y_underline: line.y_underline,
                        y_linethrough: line.y_linethrough,
                        node: line.node,
                    },
                    CanvasItem::Box(item) => Primitive::DrawBox {
                        x,
                        y,
                        width: item.size.width,
                        height: item.size.height,
                        node: item.node,
                    },
                    CanvasItem::Image(image) => Primitive::DrawImage {
                        x,
                        y,
                        width: image.size.width,
                        height: image.size.height,
                        node: image.node,
                    },
                    CanvasItem::Window(window) => Primitive::DrawWindow {
                        x,
                        y,
                        width: window.size.width,
                        height: window.size.height,
                        node: window.node,
                    },
                    CanvasItem::Origin(_) | CanvasItem::Marker(_) | CanvasItem::Overflow(_) => {
                        return ControlFlow::Continue(());
                    },
                };
                primitives.push(primitive);
                ControlFlow::Continue(())
            },
        );
        primitives
    }
}

/// One drawable item of a canvas in absolute coordinates, for debugging output.
#[derive(Clone, Debug, Eq, IntoStaticStr, PartialEq, Serialize)]
#[serde(tag = "primitive", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Primitive {
    DrawText {
        x: i32,
        y: i32,
        width: i32,
        node: NodeId,
        text: String,
        char_offset: Option<usize>,
    },
    DrawLine {
        x: i32,
        y: i32,
        width: i32,
        y_underline: i32,
        y_linethrough: i32,
        node: NodeId,
    },
    DrawBox {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        node: NodeId,
    },
    DrawImage {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        node: NodeId,
    },
    DrawWindow {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        node: NodeId,
    },
}

impl Primitive {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
