/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Geometric queries over a finished canvas: hit testing, text positions, selection bounds and
//! scroll targets. All coordinates taken and returned are document coordinates unless a function
//! says otherwise.

use std::cmp::{max, min};
use std::ops::ControlFlow;

use layout_api::{Document, NodeId, prefix_by_chars};
use tabula_geometry::{CanvasPoint, CanvasRect, contains_inclusive};

use crate::canvas::Canvas;
use crate::item::{CanvasItem, ItemHandle};
use crate::search::{SearchRange, Viewport, search_canvas};

/// The nodes whose content covers `point`, innermost first among related nodes, ordered by the
/// block z-level of their elements.
///
/// Nodes that are hidden, detached from the document or clipped away by an overflow region at
/// `point` are not reported. When one candidate is an ancestor of another only the descendant is
/// kept.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "nodes_at", skip_all, level = "trace")
)]
pub fn nodes_at(
    canvas: &Canvas,
    document: &Document,
    viewport: &Viewport,
    point: CanvasPoint,
) -> Vec<NodeId> {
    let mut found: Vec<NodeId> = Vec::new();
    let range = SearchRange::new(point.y - 1, point.y + 1);
    let _ = search_canvas(canvas, range, viewport, |visit| {
        if visit
            .clip
            .is_some_and(|clip| !contains_inclusive(&clip.rect, point))
        {
            return ControlFlow::Continue(());
        }
        let (Some(node), Some(extent)) = (visit.item.node(), visit.scrolled_extent()) else {
            return ControlFlow::Continue(());
        };
        if !contains_inclusive(&extent, point) ||
            !document.is_attached(node) ||
            document.style(node).is_hidden()
        {
            return ControlFlow::Continue(());
        }

        for existing in found.iter_mut() {
            if document.is_inclusive_ancestor(*existing, node) {
                *existing = node;
                return ControlFlow::Continue(());
            }
            if document.is_inclusive_ancestor(node, *existing) {
                return ControlFlow::Continue(());
            }
        }
        found.push(node);
        ControlFlow::Continue(())
    });

    found.sort_by_key(|node| document.style(*node).stacking.block);
    found
}

/// The nearest element at or above `node` that starts a new flow of text: a table cell, a float
/// or a positioned box.
fn flow_node(document: &Document, node: NodeId) -> Option<NodeId> {
    let element = document.element_for(node)?;
    document
        .inclusive_ancestors(element)
        .find(|ancestor| document.style(*ancestor).establishes_flow())
}

struct TextIndexQuery {
    point: CanvasPoint,
    closest: Option<ItemHandle>,
    closest_x: i32,
    flow: Option<NodeId>,
}

impl TextIndexQuery {
    /// Consider the text run `item` with the on-screen extent `extent`. Breaks if the point is
    /// inside of it.
    fn visit(
        &mut self,
        document: &Document,
        item: &ItemHandle,
        node: NodeId,
        extent: CanvasRect,
    ) -> ControlFlow<()> {
        let point = self.point;
        if contains_inclusive(&extent, point) {
            self.closest = Some(item.clone());
            self.closest_x = extent.min.x;
            return ControlFlow::Break(());
        }

        let (x, right, top, bottom) = (extent.min.x, extent.max.x, extent.min.y, extent.max.y);
        let flow = flow_node(document, node);
        let above = top <= point.y &&
            ((x <= point.x && point.x <= right) ||
                (x <= point.x && point.y < bottom && x > self.closest_x) ||
                self.flow == flow);
        if above {
            self.flow = flow;
            self.closest = Some(item.clone());
            self.closest_x = x;
        }
        ControlFlow::Continue(())
    }
}

/// The text node and character offset under `point`, or failing that the end of the text run
/// that most closely precedes it in reading order.
///
/// The canvas is searched in successively wider bands above `point`, first the hundred pixels
/// above it, then everything from the top of the viewport, then everything.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "text_index_at", skip_all, level = "trace")
)]
pub fn text_index_at(
    canvas: &Canvas,
    document: &Document,
    viewport: &Viewport,
    point: CanvasPoint,
) -> Option<(NodeId, usize)> {
    let bands = [
        SearchRange::new(point.y - 100, point.y),
        SearchRange::new(viewport.rect.min.y, point.y),
        SearchRange {
            min: None,
            max: (point.y >= 0).then_some(point.y),
        },
    ];

    for range in bands {
        let mut query = TextIndexQuery {
            point,
            closest: None,
            closest_x: 0,
            flow: None,
        };
        let hit = search_canvas(canvas, range, viewport, |visit| match visit.item.item() {
            CanvasItem::Text(run) if run.char_offset.is_some() => match visit.scrolled_extent() {
                Some(extent) => query.visit(document, visit.item, run.node, extent),
                None => ControlFlow::Continue(()),
            },
            _ => ControlFlow::Continue(()),
        })
        .is_break();

        let Some(CanvasItem::Text(run)) = query.closest.as_deref() else {
            continue;
        };
        let within_run = if hit {
            run.font.chars_fitting(&run.text, point.x - query.closest_x)
        } else {
            run.text.chars().count()
        };
        return Some((run.node, within_run + run.char_offset.unwrap_or(0)));
    }
    None
}

/// A position in the text of the document.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextPosition {
    pub node: NodeId,
    /// A character offset into the text of `node`.
    pub offset: usize,
}

impl TextPosition {
    pub fn new(node: NodeId, offset: usize) -> Self {
        TextPosition { node, offset }
    }
}

#[derive(Default)]
struct RangeBounds {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    found: bool,
}

impl RangeBounds {
    fn add(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        if self.found {
            self.left = min(self.left, left);
            self.top = min(self.top, top);
            self.right = max(self.right, right);
            self.bottom = max(self.bottom, bottom);
        } else {
            *self = RangeBounds {
                left,
                top,
                right,
                bottom,
                found: true,
            };
        }
    }

    fn finish(self) -> Option<CanvasRect> {
        self.found.then(|| {
            CanvasRect::new(
                CanvasPoint::new(self.left, self.top),
                CanvasPoint::new(self.right, self.bottom),
            )
        })
    }
}

fn text_range_search(
    canvas: &Canvas,
    viewport: &Viewport,
    range: SearchRange,
    start: TextPosition,
    end: TextPosition,
) -> Option<CanvasRect> {
    let (start, end) = if (start.node, start.offset) <= (end.node, end.offset) {
        (start, end)
    } else {
        (end, start)
    };

    let mut bounds = RangeBounds::default();
    let _ = search_canvas(canvas, range, viewport, |visit| {
        let CanvasItem::Text(run) = visit.item.item() else {
            return ControlFlow::Continue(());
        };
        let Some(offset) = run.char_offset else {
            return ControlFlow::Continue(());
        };
        if run.node < start.node || run.node > end.node {
            return ControlFlow::Continue(());
        }
        let length = run.text.chars().count();
        if (run.node == start.node && offset + length < start.offset) ||
            (run.node == end.node && offset > end.offset)
        {
            return ControlFlow::Continue(());
        }

        let font = &run.font;
        let top = visit.position.y - font.ascent();
        let bottom = visit.position.y + font.descent();
        let mut left = visit.position.x;
        let right = if run.node == end.node {
            let chars = min(length, 1 + end.offset - offset);
            left + font.text_width(prefix_by_chars(&run.text, chars))
        } else {
            left + run.width
        };
        if run.node == start.node && start.offset > 0 {
            let chars = start.offset.saturating_sub(offset);
            if chars > 0 {
                left += font.text_width(prefix_by_chars(&run.text, chars));
            }
        }

        let scroll = visit.clip.map(|clip| clip.scroll).unwrap_or_default();
        bounds.add(
            left - scroll.x,
            top - scroll.y,
            right - scroll.x,
            bottom - scroll.y,
        );
        ControlFlow::Continue(())
    });
    bounds.finish()
}

/// The bounding box of the text from `start` to `end`, both inclusive, in document coordinates.
/// The two positions may be given in either order.
pub fn text_range_bounds(
    canvas: &Canvas,
    viewport: &Viewport,
    start: TextPosition,
    end: TextPosition,
) -> Option<CanvasRect> {
    text_range_search(canvas, viewport, SearchRange::UNBOUNDED, start, end)
}

/// The part of the viewport to repaint when the selection covering the text from `start` to
/// `end` changes, in viewport coordinates.
pub fn text_range_damage(
    canvas: &Canvas,
    viewport: &Viewport,
    start: TextPosition,
    end: TextPosition,
) -> Option<CanvasRect> {
    let rect = text_range_search(canvas, viewport, viewport.band(), start, end)?;
    rect.translate(-viewport.scroll_offset())
        .intersection(&CanvasRect::from_size(viewport.rect.size()))
}

/// The y coordinate to scroll to in order to bring `node` into view.
///
/// This is the top of the first box generated by `node`. If `node` generates no box, it is the
/// top of the last content generated by the closest node that precedes it in document order, or
/// zero if there is none.
pub fn node_top(canvas: &Canvas, viewport: &Viewport, node: NodeId) -> i32 {
    let mut top = 0;
    let mut min_node: Option<NodeId> = None;
    let _ = search_canvas(canvas, SearchRange::UNBOUNDED, viewport, |visit| {
        let (Some(item_node), Some(extent)) = (visit.item.node(), visit.item.extent(visit.position))
        else {
            return ControlFlow::Continue(());
        };
        if item_node == node && matches!(visit.item.item(), CanvasItem::Box(_)) {
            top = extent.min.y;
            return ControlFlow::Break(());
        }
        if item_node <= node && min_node.is_none_or(|min_node| item_node >= min_node) {
            top = extent.min.y;
            min_node = Some(item_node);
        }
        ControlFlow::Continue(())
    });
    top
}

/// The clip rectangle of the overflow region owned by `node`, in document coordinates.
pub fn overflow_box(canvas: &Canvas, viewport: &Viewport, node: NodeId) -> Option<CanvasRect> {
    let mut found = None;
    let _ = search_canvas(canvas, SearchRange::UNBOUNDED, viewport, |visit| {
        match visit.clip {
            Some(clip) if clip.node == node => {
                found = Some(clip.rect);
                ControlFlow::Break(())
            },
            _ => ControlFlow::Continue(()),
        }
    });
    found
}
