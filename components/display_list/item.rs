/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::Deref;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use bitflags::bitflags;
use layout_api::{ComputedStyle, Document, FontHandle, ImageHandle, NodeId};
use layout_api::style::BorderStyle;
use tabula_geometry::{CanvasPoint, CanvasRect, CanvasSize, rect_from_origin_and_size};

bitflags! {
    /// Flags attached to a box item.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct BoxFlags: u8 {
        /// The box continues on a previous line, so its left border is not drawn.
        const OPEN_LEFT = 1 << 0;
        /// The box continues on a following line, so its right border is not drawn.
        const OPEN_RIGHT = 1 << 1;
    }
}

/// A run of text in a single font. The position of a text item is the left end of its baseline.
#[derive(Debug)]
pub struct TextRun {
    pub node: NodeId,
    pub width: i32,
    pub font: FontHandle,
    pub text: Arc<str>,
    /// The character offset of this run within the text of `node`, or `None` for generated text
    /// that has no counterpart in the document.
    pub char_offset: Option<usize>,
}

/// Text decoration lines. The position of a line item is the left end of its overline; the
/// other two offsets are relative to that.
#[derive(Debug, Eq, PartialEq)]
pub struct LineItem {
    pub node: NodeId,
    pub width: i32,
    pub y_underline: i32,
    pub y_linethrough: i32,
}

/// A box with the border, background and outline of `style`. The position of a box item is its
/// top-left outer border corner, and its size excludes the outline.
#[derive(Debug)]
pub struct BoxItem {
    pub node: NodeId,
    pub size: CanvasSize,
    pub flags: BoxFlags,
    pub style: Arc<ComputedStyle>,
}

#[derive(Debug)]
pub struct ImageItem {
    pub node: NodeId,
    pub size: CanvasSize,
    /// `None` when the image failed to load; the item still takes up room.
    pub image: Option<ImageHandle>,
}

/// A place where an embedded window of the given size is mapped.
#[derive(Debug, Eq, PartialEq)]
pub struct WindowItem {
    pub node: NodeId,
    pub size: CanvasSize,
}

/// One half of a pair of origin markers.
#[derive(Debug, Eq, PartialEq)]
pub enum OriginMarker {
    /// Opens the bracket. `extent` is the bounding box of the bracketed items in the coordinate
    /// frame the bracket establishes.
    Start { extent: CanvasRect },
    End,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MarkerKind {
    /// The static position of a positioned box, taken back out of the list once layout knows
    /// where the box goes.
    StaticPosition,
    /// Everything after this marker belongs to `position: fixed` content and is positioned
    /// relative to the viewport.
    Fixed,
    /// The baseline of a line box.
    Linebox,
}

/// The start of a region clipped to the padding box of an element with `overflow` other than
/// `visible`.
#[derive(Debug, Eq, PartialEq)]
pub struct OverflowRegion {
    pub node: NodeId,
    pub size: CanvasSize,
}

#[derive(Debug)]
pub enum CanvasItem {
    Text(TextRun),
    Line(LineItem),
    Box(BoxItem),
    Image(ImageItem),
    Window(WindowItem),
    Origin(OriginMarker),
    Marker(MarkerKind),
    Overflow(OverflowRegion),
}

impl CanvasItem {
    /// The node that generated this item, for the item kinds that have one.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            CanvasItem::Text(text) => Some(text.node),
            CanvasItem::Line(line) => Some(line.node),
            CanvasItem::Box(item) => Some(item.node),
            CanvasItem::Image(image) => Some(image.node),
            CanvasItem::Window(window) => Some(window.node),
            CanvasItem::Overflow(region) => Some(region.node),
            CanvasItem::Origin(_) | CanvasItem::Marker(_) => None,
        }
    }

    /// Whether this item paints something, as opposed to the structural markers.
    pub fn is_drawable(&self) -> bool {
        matches!(
            self,
            CanvasItem::Text(_) |
                CanvasItem::Line(_) |
                CanvasItem::Box(_) |
                CanvasItem::Image(_) |
                CanvasItem::Window(_)
        )
    }

    /// The area covered by this item when it is placed at `position`, or `None` for markers.
    pub fn extent(&self, position: CanvasPoint) -> Option<CanvasRect> {
        let (x, y) = (position.x, position.y);
        Some(match self {
            CanvasItem::Box(item) => {
                let outline = if item.style.outline.style != BorderStyle::None {
                    item.style.outline.width.max(0)
                } else {
                    0
                };
                rect_from_origin_and_size(
                    x - outline,
                    y - outline,
                    item.size.width + 2 * outline,
                    item.size.height + 2 * outline,
                )
            },
            CanvasItem::Text(text) => {
                let ascent = text.font.ascent();
                rect_from_origin_and_size(x, y - ascent, text.width, ascent + text.font.descent())
            },
            CanvasItem::Image(image) => {
                rect_from_origin_and_size(x, y, image.size.width, image.size.height)
            },
            CanvasItem::Line(line) => rect_from_origin_and_size(x, y, line.width, line.y_underline + 1),
            CanvasItem::Window(window) => {
                rect_from_origin_and_size(x, y, window.size.width, window.size.height)
            },
            CanvasItem::Origin(_) | CanvasItem::Marker(_) | CanvasItem::Overflow(_) => return None,
        })
    }

    /// The z-level this item paints at, given the styles in `document`.
    pub(crate) fn z_level(&self, document: &Document) -> u32 {
        let Some(node) = self.node() else {
            return 0;
        };
        if matches!(self, CanvasItem::Window(_) | CanvasItem::Overflow(_)) {
            return 0;
        }
        let Some(element) = document.element_for(node) else {
            return 0;
        };
        let style = document.style(element);
        if matches!(self, CanvasItem::Text(_)) ||
            style.display == layout_api::style::Display::Inline
        {
            style.stacking.inline
        } else if style.establishes_stacking_context() {
            style.stacking.stacking
        } else {
            style.stacking.block
        }
    }

    /// Structural equality used when diffing snapshots. Positions are compared separately by the
    /// caller, and boxes and windows are only ever equal to themselves.
    pub(crate) fn same_content(&self, other: &CanvasItem) -> bool {
        match (self, other) {
            (CanvasItem::Text(a), CanvasItem::Text(b)) => {
                a.width == b.width &&
                    ptr::addr_eq(Arc::as_ptr(&a.font), Arc::as_ptr(&b.font)) &&
                    a.text == b.text
            },
            (CanvasItem::Line(a), CanvasItem::Line(b)) => {
                a.width == b.width &&
                    a.y_underline == b.y_underline &&
                    a.y_linethrough == b.y_linethrough
            },
            (CanvasItem::Image(a), CanvasItem::Image(b)) => {
                a.size == b.size &&
                    match (&a.image, &b.image) {
                        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                        (None, None) => true,
                        _ => false,
                    }
            },
            _ => false,
        }
    }
}

#[derive(Debug)]
struct ItemCell {
    item: CanvasItem,
    /// The id of the last snapshot this item was captured by, zero if none.
    snapshot: AtomicU32,
}

/// A shared reference to a canvas item.
///
/// Items are shared between the canvas that owns them, the session that may offer them for reuse
/// on the next layout pass, and any snapshot that captured them. The item and the font, image and
/// style handles it holds are released when the last of those drops its handle.
#[derive(Clone, Debug)]
pub struct ItemHandle(Arc<ItemCell>);

impl ItemHandle {
    pub(crate) fn new(item: CanvasItem) -> Self {
        ItemHandle(Arc::new(ItemCell {
            item,
            snapshot: AtomicU32::new(0),
        }))
    }

    pub fn ptr_eq(&self, other: &ItemHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn snapshot_id(&self) -> u32 {
        self.0.snapshot.load(Ordering::Relaxed)
    }

    pub(crate) fn set_snapshot_id(&self, id: u32) {
        self.0.snapshot.store(id, Ordering::Relaxed)
    }

    /// Whether `self` and `other` would paint the same thing, given equal positions.
    pub(crate) fn same_content(&self, other: &ItemHandle) -> bool {
        self.ptr_eq(other) || self.item().same_content(other.item())
    }

    pub fn item(&self) -> &CanvasItem {
        &self.0.item
    }
}

impl Deref for ItemHandle {
    type Target = CanvasItem;

    fn deref(&self) -> &CanvasItem {
        &self.0.item
    }
}

#[cfg(test)]
mod tests {
    use layout_api::FontMetrics;
    use layout_api::style::{BorderSide, Color};

    use super::*;

    #[derive(Debug)]
    struct FixedFont;

    impl FontMetrics for FixedFont {
        fn ascent(&self) -> i32 {
            12
        }
        fn descent(&self) -> i32 {
            4
        }
        fn text_width(&self, text: &str) -> i32 {
            8 * text.chars().count() as i32
        }
    }

    fn node(document: &mut Document) -> NodeId {
        document.create_element(None, "div", None).unwrap()
    }

    #[test]
    fn box_extent_includes_outline() {
        let mut document = Document::new();
        let node = node(&mut document);
        let style = Arc::new(ComputedStyle {
            outline: BorderSide {
                width: 2,
                style: BorderStyle::Dotted,
                color: Color::BLACK,
            },
            ..Default::default()
        });
        let item = CanvasItem::Box(BoxItem {
            node,
            size: CanvasSize::new(20, 10),
            flags: BoxFlags::empty(),
            style,
        });
        assert_eq!(
            item.extent(CanvasPoint::new(5, 5)),
            Some(rect_from_origin_and_size(3, 3, 24, 14))
        );
    }

    #[test]
    fn text_extent_hangs_from_baseline() {
        let mut document = Document::new();
        let node = node(&mut document);
        let item = CanvasItem::Text(TextRun {
            node,
            width: 40,
            font: Arc::new(FixedFont),
            text: Arc::from("hello"),
            char_offset: Some(0),
        });
        assert_eq!(
            item.extent(CanvasPoint::new(0, 20)),
            Some(rect_from_origin_and_size(0, 8, 40, 16))
        );
    }

    #[test]
    fn text_equality_requires_the_same_font() {
        let mut document = Document::new();
        let node = node(&mut document);
        let font: FontHandle = Arc::new(FixedFont);
        let run = |font: &FontHandle| {
            ItemHandle::new(CanvasItem::Text(TextRun {
                node,
                width: 40,
                font: font.clone(),
                text: Arc::from("hello"),
                char_offset: Some(0),
            }))
        };
        assert!(run(&font).same_content(&run(&font)));
        assert!(!run(&font).same_content(&run(&(Arc::new(FixedFont) as FontHandle))));
    }
}
