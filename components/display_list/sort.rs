/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::ControlFlow;

use layout_api::Document;
use tabula_geometry::CanvasPoint;

use crate::canvas::Canvas;
use crate::item::{CanvasItem, ItemHandle};
use crate::search::{OverflowClip, SearchRange, Viewport, Visit, search_canvas};

/// An item placed by a search, ready to be painted or compared.
#[derive(Clone, Debug)]
pub struct SortedSlot {
    pub item: ItemHandle,
    /// The absolute position of the item, before overflow scrolling.
    pub position: CanvasPoint,
    pub clip: Option<OverflowClip>,
}

/// Buckets the drawable items of a canvas by z-level.
///
/// Iteration yields the lowest level first and, within a level, items in the order they were
/// inserted, which is document order for the items of a single search. Items that would not paint
/// anything are left out.
#[derive(Debug, Default)]
pub struct ItemSorter {
    levels: Vec<Vec<SortedSlot>>,
}

impl ItemSorter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort every paintable item of `canvas` that overlaps `range`.
    pub fn collect(
        canvas: &Canvas,
        document: &Document,
        range: SearchRange,
        viewport: &Viewport,
    ) -> Self {
        let mut sorter = ItemSorter::new();
        let _ = search_canvas(canvas, range, viewport, |visit| {
            sorter.insert(document, visit);
            ControlFlow::Continue(())
        });
        sorter
    }

    pub fn insert(&mut self, document: &Document, visit: &Visit<'_>) {
        if !paints_anything(document, visit.item) {
            return;
        }

        let level = visit.item.z_level(document) as usize;
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
        self.levels[level].push(SortedSlot {
            item: visit.item.clone(),
            position: visit.position,
            clip: visit.clip.cloned(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortedSlot> {
        self.levels.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Vec::is_empty)
    }
}

fn paints_anything(document: &Document, item: &CanvasItem) -> bool {
    match item {
        CanvasItem::Box(item) => item.style.paints_anything(),
        CanvasItem::Line(line) => !document.style(line.node).text_decoration.is_empty(),
        _ => true,
    }
}
