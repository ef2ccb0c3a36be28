/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The display list produced by layout.
//!
//! A [`Canvas`] is an ordered list of drawable items (text runs, boxes, decoration lines, images
//! and embedded windows) positioned relative to nested origin frames, plus the structural markers
//! layout needs to read positions back out. Canvases are built bottom-up and spliced into one
//! another at an offset, which only touches their top-level entries.
//!
//! On top of the list sit the queries the rest of the engine asks of a laid out document: which
//! nodes are at a point, which character is at a point, where a node's content is, which part of
//! the viewport changed since the last [`Snapshot`], and finally [`paint::paint_canvas`], which
//! lowers the visible items to a [`paint::PaintBackend`] in stacking order.

#![deny(unsafe_code)]

mod canvas;
mod item;
pub mod paint;
pub mod query;
pub mod search;
pub mod snapshot;
pub mod sort;

pub use canvas::{Canvas, CanvasEntry, Primitive};
pub use item::{
    BoxFlags, BoxItem, CanvasItem, ImageItem, ItemHandle, LineItem, MarkerKind, OriginMarker,
    OverflowRegion, TextRun, WindowItem,
};
pub use search::{SearchRange, Viewport};
pub use snapshot::{Damage, Snapshot};
