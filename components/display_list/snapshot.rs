/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Snapshots of the paint order of a canvas, and the damage between two of them.
//!
//! A snapshot holds shared references to the items it captured, so it stays valid after the
//! canvas it was taken from has been dropped or rebuilt. Diffing a snapshot against the current
//! state of a canvas yields the smallest rectangle that needs to be repainted, along with a new
//! snapshot to diff against next time.

use std::sync::atomic::{AtomicU32, Ordering};

use layout_api::{Document, NodeId};
use log::trace;
use rustc_hash::FxHashSet;
use tabula_geometry::{CanvasRect, CanvasVector, RectUnion};

use crate::canvas::Canvas;
use crate::search::Viewport;
use crate::sort::{ItemSorter, SortedSlot};

static NEXT_SNAPSHOT_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Default)]
pub struct Snapshot {
    /// Zero for the empty snapshot, which captured nothing.
    id: u32,
    sorter: ItemSorter,
}

/// The result of [`Snapshot::damage`].
#[derive(Debug)]
pub struct Damage {
    /// The area to repaint, in viewport coordinates, or `None` if nothing visible changed.
    pub rect: Option<CanvasRect>,
    /// A snapshot of the current state, to diff against next time.
    pub snapshot: Snapshot,
}

#[derive(Debug, Default)]
struct DamageStats {
    created: usize,
    deleted: usize,
    dirty: usize,
    moved: usize,
    stuck: usize,
}

impl Snapshot {
    /// A snapshot with no items in it. Diffing against it damages everything that is visible.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the paint order of the part of `canvas` inside `viewport`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "Snapshot::take", skip_all, level = "trace")
    )]
    pub fn take(canvas: &Canvas, document: &Document, viewport: &Viewport) -> Self {
        let sorter = ItemSorter::collect(canvas, document, viewport.band(), viewport);
        let snapshot = Snapshot {
            id: NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed),
            sorter,
        };
        snapshot.tag_items();
        snapshot
    }

    fn tag_items(&self) {
        for slot in self.sorter.iter() {
            slot.item.set_snapshot_id(self.id);
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn slots(&self) -> impl Iterator<Item = &SortedSlot> {
        self.sorter.iter()
    }

    pub fn len(&self) -> usize {
        self.sorter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorter.is_empty()
    }

    /// Compare this snapshot with the current state of `canvas`.
    ///
    /// Both sides are walked in paint order in lock step. An item equal to its counterpart at the
    /// same position is left alone unless its node is in `dirty`. An equal item that has moved
    /// damages both of its locations. Otherwise, if the current item was captured by this
    /// snapshot, the old item has gone and damages its old location; if not, the current item is
    /// new and damages its new location.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "Snapshot::damage", skip_all, level = "trace")
    )]
    pub fn damage(
        &self,
        canvas: &Canvas,
        document: &Document,
        viewport: &Viewport,
        dirty: &FxHashSet<NodeId>,
    ) -> Damage {
        let current = Snapshot {
            id: NEXT_SNAPSHOT_ID.fetch_add(1, Ordering::Relaxed),
            sorter: ItemSorter::collect(canvas, document, viewport.band(), viewport),
        };

        let mut union = RectUnion::default();
        let mut stats = DamageStats::default();
        // The walk borrows `current`, which is moved into the damage below.
        {
            let mut damage_slot = |slot: &SortedSlot| {
                if let Some(extent) = slot.item.extent(slot.position) {
                    union.add(extent);
                }
            };

            let mut old_slots = self.slots().peekable();
            let mut new_slots = current.slots().peekable();
            loop {
                match (old_slots.peek().copied(), new_slots.peek().copied()) {
                    (Some(old), Some(new)) => {
                        if new.item.same_content(&old.item) {
                            if new.position != old.position {
                                damage_slot(old);
                                damage_slot(new);
                                stats.moved += 1;
                            } else if new.item.node().is_some_and(|node| dirty.contains(&node)) {
                                damage_slot(new);
                                stats.dirty += 1;
                            } else {
                                stats.stuck += 1;
                            }
                            old_slots.next();
                            new_slots.next();
                        } else if self.id != 0 && new.item.snapshot_id() == self.id {
                            damage_slot(old);
                            stats.deleted += 1;
                            old_slots.next();
                        } else {
                            damage_slot(new);
                            stats.created += 1;
                            new_slots.next();
                        }
                    },
                    (Some(old), None) => {
                        damage_slot(old);
                        stats.deleted += 1;
                        old_slots.next();
                    },
                    (None, Some(new)) => {
                        damage_slot(new);
                        stats.created += 1;
                        new_slots.next();
                    },
                    (None, None) => break,
                }
            }
        }
        trace!("Snapshot damage: {stats:?}");

        current.tag_items();
        Damage {
            rect: union.finish().and_then(|rect| to_viewport(rect, viewport)),
            snapshot: current,
        }
    }
}

/// Widen a damaged area by a pixel up and to the left, move it into viewport coordinates, and
/// clip it to the viewport.
fn to_viewport(rect: CanvasRect, viewport: &Viewport) -> Option<CanvasRect> {
    let scroll = viewport.scroll_offset();
    let widened = CanvasRect::new(rect.min - CanvasVector::new(1, 1), rect.max);
    let visible = CanvasRect::from_size(viewport.rect.size());
    widened.translate(-scroll).intersection(&visible)
}
