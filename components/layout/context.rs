/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use display_list::{BoxFlags, Canvas, ItemHandle};
use layout_api::style::Display;
use layout_api::{Document, NodeId};
use rustc_hash::FxHashMap;
use tabula_geometry::{CanvasPoint, CanvasSize};

use crate::content::ContentLayout;
use crate::error::{LayoutError, Result};
use crate::options::LayoutOptions;
use crate::table::{ContainingBlock, LayoutMode, TableBox, TableLayout};

/// The box item drawn for each node by the latest layout, offered back to the next one.
#[derive(Debug)]
pub(crate) struct BoxItemCache {
    enabled: bool,
    items: FxHashMap<NodeId, ItemHandle>,
}

impl BoxItemCache {
    fn new(enabled: bool) -> Self {
        BoxItemCache {
            enabled,
            items: FxHashMap::default(),
        }
    }

    /// Draw the box of `node`, sharing the item from the previous layout when nothing about it
    /// changed.
    pub(crate) fn draw_box(
        &mut self,
        canvas: &mut Canvas,
        document: &Document,
        origin: CanvasPoint,
        size: CanvasSize,
        node: NodeId,
    ) {
        let candidate = if self.enabled {
            self.items.get(&node)
        } else {
            None
        };
        let drawn = canvas.draw_box(
            origin,
            size,
            node,
            document.style(node),
            BoxFlags::empty(),
            candidate,
        );
        if let Some(item) = drawn.filter(|_| self.enabled) {
            self.items.insert(node, item);
        }
    }
}

/// Everything table layout needs that outlives a single table: the document, the layout of cell
/// content, the options, and the box items of earlier layouts.
pub struct LayoutSession<'a> {
    document: &'a Document,
    content: &'a dyn ContentLayout,
    options: LayoutOptions,
    box_items: BoxItemCache,
}

impl<'a> LayoutSession<'a> {
    pub fn new(document: &'a Document, content: &'a dyn ContentLayout) -> Self {
        Self::with_options(document, content, LayoutOptions::default())
    }

    pub fn with_options(
        document: &'a Document,
        content: &'a dyn ContentLayout,
        options: LayoutOptions,
    ) -> Self {
        LayoutSession {
            document,
            content,
            box_items: BoxItemCache::new(options.reuse_box_items),
            options,
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Forget the box items of earlier layouts.
    pub fn clear_box_items(&mut self) {
        self.box_items.items.clear();
    }

    /// Lay out the table element `table` in `containing_block`.
    ///
    /// With [`LayoutMode::Draw`] the returned box holds the display list of the table, relative
    /// to the top-left corner of its content box. The other modes only measure.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "LayoutSession::layout_table", skip_all, level = "trace")
    )]
    pub fn layout_table(
        &mut self,
        table: NodeId,
        containing_block: ContainingBlock,
        mode: LayoutMode,
    ) -> Result<TableBox> {
        if !self.document.contains(table) {
            return Err(LayoutError::UnknownNode(table));
        }
        if self.document.is_text(table) || self.document.style(table).display != Display::Table {
            return Err(LayoutError::NotATable(table));
        }

        TableLayout::new(
            self.document,
            self.content,
            &self.options,
            table,
            containing_block,
        )?
        .layout(mode, &mut self.box_items)
    }
}
