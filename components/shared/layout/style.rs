/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Computed values of the properties that table layout and the display list read.
//!
//! Values here are already resolved to pixels wherever the cascade can resolve them. Lengths that
//! depend on the size of a containing block stay as [`LengthPercentageOrAuto`] so that layout can
//! resolve them against the right box.

use bitflags::bitflags;
use serde::Serialize;
use tabula_geometry::PhysicalSides;

use crate::resources::{FontHandle, ImageHandle};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Display {
    #[default]
    Inline,
    Block,
    InlineBlock,
    ListItem,
    Table,
    TableRowGroup,
    TableHeaderGroup,
    TableFooterGroup,
    TableRow,
    TableColumn,
    TableColumnGroup,
    TableCell,
    TableCaption,
    None,
}

impl Display {
    /// Whether this is one of the three row group display types.
    pub fn is_row_group(self) -> bool {
        matches!(
            self,
            Display::TableRowGroup | Display::TableHeaderGroup | Display::TableFooterGroup
        )
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Float {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
    Auto,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
    Baseline,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum TextAlign {
    #[default]
    Start,
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum BorderStyle {
    #[default]
    None,
    Hidden,
    Solid,
    Dashed,
    Dotted,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl BorderStyle {
    /// Whether a border with this style takes up room and paints.
    pub fn is_visible(self) -> bool {
        !matches!(self, BorderStyle::None | BorderStyle::Hidden)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct TextDecorationLine: u8 {
        const UNDERLINE = 1 << 0;
        const OVERLINE = 1 << 1;
        const LINE_THROUGH = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }
}

/// A `width` or `height` as the cascade left it. Percentages are stored on a 0 to 100 scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub enum LengthPercentageOrAuto {
    #[default]
    Auto,
    Pixels(i32),
    Percent(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BorderSide {
    pub width: i32,
    pub style: BorderStyle,
    pub color: Color,
}

impl BorderSide {
    /// The used width of this side, which is zero unless the side has a visible style.
    pub fn used_width(&self) -> i32 {
        if self.style.is_visible() {
            self.width.max(0)
        } else {
            0
        }
    }
}

/// The z-levels a node paints its content at.
///
/// Boxes of ordinary block-level elements go into the `block` level, inline content and text into
/// the `inline` level, and elements that establish a stacking context into `stacking`. The display
/// list sorter draws lower levels first.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct StackingLevels {
    pub inline: u32,
    pub block: u32,
    pub stacking: u32,
}

#[derive(Clone, Debug)]
pub struct ComputedStyle {
    pub display: Display,
    pub position: Position,
    pub float: Float,
    pub visibility: Visibility,
    pub overflow: Overflow,
    pub border: PhysicalSides<BorderSide>,
    pub padding: PhysicalSides<i32>,
    pub background_color: Option<Color>,
    pub background_image: Option<ImageHandle>,
    pub width: LengthPercentageOrAuto,
    pub height: LengthPercentageOrAuto,
    pub vertical_align: VerticalAlign,
    pub text_align: TextAlign,
    pub text_decoration: TextDecorationLine,
    pub outline: BorderSide,
    /// The computed `border-spacing`, used in both axes.
    pub border_spacing: i32,
    pub color: Color,
    pub font: Option<FontHandle>,
    pub stacking: StackingLevels,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        ComputedStyle {
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            visibility: Visibility::Visible,
            overflow: Overflow::Visible,
            border: PhysicalSides::uniform(BorderSide::default()),
            padding: PhysicalSides::uniform(0),
            background_color: None,
            background_image: None,
            width: LengthPercentageOrAuto::Auto,
            height: LengthPercentageOrAuto::Auto,
            vertical_align: VerticalAlign::Middle,
            text_align: TextAlign::Start,
            text_decoration: TextDecorationLine::empty(),
            outline: BorderSide::default(),
            border_spacing: 0,
            color: Color::BLACK,
            font: None,
            stacking: StackingLevels::default(),
        }
    }
}

impl ComputedStyle {
    pub fn border_widths(&self) -> PhysicalSides<i32> {
        self.border.map(|side| side.used_width())
    }

    /// The width of each side of the border plus padding area around the content box.
    pub fn box_edges(&self) -> PhysicalSides<i32> {
        self.border_widths() + self.padding
    }

    pub fn outline_width(&self) -> i32 {
        self.outline.used_width()
    }

    /// Whether a box with this style would draw anything at all: a border, an outline, or a
    /// background.
    pub fn paints_anything(&self) -> bool {
        let borders = self.border_widths();
        borders.top > 0 ||
            borders.right > 0 ||
            borders.bottom > 0 ||
            borders.left > 0 ||
            self.outline_width() > 0 ||
            self.background_image.is_some() ||
            self.background_color.is_some()
    }

    pub fn establishes_stacking_context(&self) -> bool {
        self.position != Position::Static
    }

    /// Whether an element with this style starts a new flow for text hit testing. Table cells,
    /// floats and positioned elements all do.
    pub fn establishes_flow(&self) -> bool {
        self.display == Display::TableCell ||
            self.float != Float::None ||
            self.position != Position::Static
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }
}
