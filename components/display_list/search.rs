/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The traversal every canvas query is built on.
//!
//! [`search_canvas`] walks a canvas front to back, keeping track of the running origin and of the
//! overflow regions the walk is inside of, and hands each drawable item to a visitor together
//! with its absolute position. When given a vertical range, the walk skips every origin bracket
//! whose recorded extent lies entirely outside of it, so that a query restricted to the viewport
//! costs time in proportion to the visible content rather than to the whole document.

use std::ops::ControlFlow;

use layout_api::NodeId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tabula_geometry::{CanvasPoint, CanvasRect, CanvasVector, rect_from_origin_and_size};

use crate::canvas::Canvas;
use crate::item::{CanvasItem, ItemHandle, MarkerKind, OriginMarker};

/// A vertical range of the canvas to search. A missing bound is unbounded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl SearchRange {
    pub const UNBOUNDED: SearchRange = SearchRange {
        min: None,
        max: None,
    };

    /// The range `min..max`. A negative bound stands for no bound at all.
    pub fn new(min: i32, max: i32) -> Self {
        SearchRange {
            min: (min >= 0).then_some(min),
            max: (max >= 0).then_some(max),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Whether an item spanning `top..bottom` lies entirely outside of this range, once the range
    /// has been shifted by `scroll` pixels.
    fn excludes(&self, top: i32, bottom: i32, scroll: i32) -> bool {
        self.max.is_some_and(|max| top >= max + scroll) ||
            self.min.is_some_and(|min| bottom <= min + scroll)
    }

    /// Like [`SearchRange::excludes`], for an origin bracket. A bracket that only touches the
    /// range is still entered.
    fn excludes_bracket(&self, top: i32, bottom: i32, scroll: i32) -> bool {
        self.max.is_some_and(|max| top > max + scroll) ||
            self.min.is_some_and(|min| bottom < min + scroll)
    }
}

/// The part of the document on screen, and how far each scrollable overflow region is scrolled.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// The visible rectangle in document coordinates. Its top-left corner is the scroll offset of
    /// the document.
    pub rect: CanvasRect,
    pub overflow_scroll: FxHashMap<NodeId, CanvasVector>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(CanvasRect::zero())
    }
}

impl Viewport {
    pub fn new(rect: CanvasRect) -> Self {
        Viewport {
            rect,
            overflow_scroll: FxHashMap::default(),
        }
    }

    pub fn scroll_offset(&self) -> CanvasVector {
        self.rect.min.to_vector()
    }

    /// The vertical band this viewport covers.
    pub fn band(&self) -> SearchRange {
        SearchRange::new(self.rect.min.y, self.rect.max.y)
    }

    fn scroll_of(&self, node: NodeId) -> CanvasVector {
        self.overflow_scroll
            .get(&node)
            .copied()
            .unwrap_or_else(CanvasVector::zero)
    }
}

/// An overflow region that a search is currently inside of.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OverflowClip {
    /// The element with the `overflow` property.
    pub node: NodeId,
    /// The clip rectangle in absolute coordinates.
    pub rect: CanvasRect,
    /// How far the content of the region is scrolled.
    pub scroll: CanvasVector,
    end: usize,
}

/// A drawable item found by [`search_canvas`].
#[derive(Debug)]
pub struct Visit<'a> {
    pub index: usize,
    pub item: &'a ItemHandle,
    /// The absolute position of the item, before any overflow scrolling.
    pub position: CanvasPoint,
    /// The innermost overflow region the item is inside of.
    pub clip: Option<&'a OverflowClip>,
}

impl Visit<'_> {
    /// The extent of the item as it appears on screen, shifted by the scroll offset of its
    /// overflow region.
    pub fn scrolled_extent(&self) -> Option<CanvasRect> {
        let extent = self.item.extent(self.position)?;
        Some(match self.clip {
            Some(clip) => extent.translate(-clip.scroll),
            None => extent,
        })
    }
}

/// Visit every drawable item of `canvas` that overlaps `range`, in list order.
///
/// Stops early and returns `Break` as soon as `visitor` does.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "search_canvas", skip_all, level = "trace")
)]
pub fn search_canvas(
    canvas: &Canvas,
    range: SearchRange,
    viewport: &Viewport,
    mut visitor: impl FnMut(&Visit<'_>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let entries = canvas.entries();
    let mut origin = CanvasVector::zero();
    let mut clips: SmallVec<[OverflowClip; 4]> = SmallVec::new();
    let mut seen_fixed = false;

    let mut index = 0;
    while index < entries.len() {
        let entry = &entries[index];
        let mut next = index + 1;
        let scroll = clips.last().map_or(0, |clip| clip.scroll.y);

        match entry.item.item() {
            CanvasItem::Origin(marker) => {
                origin += entry.offset;
                if let OriginMarker::Start { extent } = marker {
                    let (top, bottom) = (origin.y + extent.min.y, origin.y + extent.max.y);
                    if range.excludes_bracket(top, bottom, scroll) {
                        next = index + entry.partner();
                    }
                }
            },
            CanvasItem::Marker(MarkerKind::Fixed) => {
                debug_assert!(!seen_fixed, "more than one fixed marker");
                seen_fixed = true;
                origin = viewport.scroll_offset();
            },
            CanvasItem::Marker(_) => {},
            CanvasItem::Overflow(region) => {
                let position = origin + entry.offset;
                clips.push(OverflowClip {
                    node: region.node,
                    rect: rect_from_origin_and_size(
                        position.x,
                        position.y,
                        region.size.width,
                        region.size.height,
                    ),
                    scroll: viewport.scroll_of(region.node),
                    end: index + entry.partner(),
                });
            },
            item => {
                let position = (origin + entry.offset).to_point();
                let culled = range.is_bounded() &&
                    item
                        .extent(position)
                        .is_some_and(|extent| range.excludes(extent.min.y, extent.max.y, scroll));
                if !culled {
                    let visit = Visit {
                        index,
                        item: &entry.item,
                        position,
                        clip: clips.last(),
                    };
                    if visitor(&visit).is_break() {
                        return ControlFlow::Break(());
                    }
                }
            },
        }

        while clips.last().is_some_and(|clip| clip.end <= index) {
            clips.pop();
        }
        index = next;
    }
    ControlFlow::Continue(())
}
