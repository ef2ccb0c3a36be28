/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The boundary between table layout and the layout of whatever is inside a table cell.
//!
//! Table layout only decides where cells go and how big they are. The content of each cell is
//! measured and laid out by a [`ContentLayout`] supplied by the caller, which in a full engine
//! is normal flow layout (and, recursively, table layout again for nested tables).

use std::sync::Arc;

use display_list::Canvas;
use layout_api::{ComputedStyle, Document, NodeId};
use serde::Serialize;

/// The content of one table cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellContent<'dom> {
    /// The children of an element with `display: table-cell`.
    Element(NodeId),
    /// A run of sibling nodes that were not in a cell and have been wrapped in an anonymous one.
    /// Anonymous cells have no node of their own and use the initial style.
    Anonymous(&'dom [NodeId]),
}

impl<'dom> CellContent<'dom> {
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            CellContent::Element(node) => Some(node),
            CellContent::Anonymous(_) => None,
        }
    }

    /// The nodes to lay out inside the cell.
    pub fn children(&self, document: &'dom Document) -> &'dom [NodeId] {
        match *self {
            CellContent::Element(node) => document.children(node),
            CellContent::Anonymous(nodes) => nodes,
        }
    }

    pub fn style<'a>(&self, document: &'a Document) -> &'a Arc<ComputedStyle> {
        match *self {
            CellContent::Element(node) => document.style(node),
            CellContent::Anonymous(_) => Document::initial_style(),
        }
    }
}

/// The narrowest and widest a piece of content can usefully be laid out, excluding the border
/// and padding of the box around it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ContentSizes {
    pub min_content: i32,
    pub max_content: i32,
}

impl ContentSizes {
    pub fn new(min_content: i32, max_content: i32) -> Self {
        ContentSizes {
            min_content,
            max_content,
        }
    }

    /// Both sizes moved into range: neither is negative and the maximum is at least the minimum.
    pub fn normalized(self) -> Self {
        let min_content = self.min_content.max(0);
        if self.max_content < min_content {
            log::warn!(
                "Content reported a maximum width ({}) below its minimum ({}).",
                self.max_content,
                min_content
            );
        }
        ContentSizes {
            min_content,
            max_content: self.max_content.max(min_content),
        }
    }
}

/// Content laid out at a given width. The canvas is positioned relative to the top-left corner
/// of the content box.
#[derive(Debug, Default)]
pub struct ContentBox {
    pub width: i32,
    pub height: i32,
    pub canvas: Canvas,
}

/// Measures and lays out the content of table cells.
///
/// Implementations must not depend on anything that table layout changes, so that measuring the
/// same content twice gives the same answer.
pub trait ContentLayout {
    fn content_sizes(&self, document: &Document, content: CellContent<'_>) -> ContentSizes;

    /// Lay out `content` into a box `containing_width` pixels wide.
    fn layout(
        &self,
        document: &Document,
        content: CellContent<'_>,
        containing_width: i32,
    ) -> ContentBox;
}
