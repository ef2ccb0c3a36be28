/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::ops::Add;

use euclid::{Box2D, Point2D, Size2D, Vector2D};
use serde::Serialize;

// Units for use with euclid typed geometry.

/// A whole pixel on a layout canvas.
///
/// Table layout and the display list work exclusively in integer pixels: column widths are
/// distributed with integer division, and the rounding residue is handed out explicitly, so
/// there is no fractional unit in between layout and the paint backend.
#[derive(Clone, Copy, Debug)]
pub enum CanvasPixel {}

pub type CanvasPoint = Point2D<i32, CanvasPixel>;
pub type CanvasVector = Vector2D<i32, CanvasPixel>;
pub type CanvasSize = Size2D<i32, CanvasPixel>;

/// An axis-aligned rectangle stored as its `min` (left/top) and `max` (right/bottom) corners.
pub type CanvasRect = Box2D<i32, CanvasPixel>;

/// Build a rectangle from its top-left corner and its size.
#[inline]
pub fn rect_from_origin_and_size(x: i32, y: i32, width: i32, height: i32) -> CanvasRect {
    CanvasRect::new(
        CanvasPoint::new(x, y),
        CanvasPoint::new(x + width, y + height),
    )
}

/// Grow `bounds` so that it also covers `other`.
///
/// Unlike [`Box2D::union`], neither side is treated specially when it has zero area. A canvas
/// starts out as the degenerate rectangle at its origin and that origin stays part of its bounds.
#[inline]
pub fn extend_bounds(bounds: &mut CanvasRect, other: &CanvasRect) {
    bounds.min.x = bounds.min.x.min(other.min.x);
    bounds.min.y = bounds.min.y.min(other.min.y);
    bounds.max.x = bounds.max.x.max(other.max.x);
    bounds.max.y = bounds.max.y.max(other.max.y);
}

/// Whether `point` lies within `rect`, counting the right and bottom edges as inside.
#[inline]
pub fn contains_inclusive(rect: &CanvasRect, point: CanvasPoint) -> bool {
    rect.min.x <= point.x && point.x <= rect.max.x && rect.min.y <= point.y && point.y <= rect.max.y
}

/// Accumulates the union of a number of rectangles, starting from nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct RectUnion {
    rect: Option<CanvasRect>,
}

impl RectUnion {
    pub fn add(&mut self, rect: CanvasRect) {
        match self.rect.as_mut() {
            Some(current) => extend_bounds(current, &rect),
            None => self.rect = Some(rect),
        }
    }

    /// The union so far, or `None` if nothing with a positive area was added.
    pub fn finish(self) -> Option<CanvasRect> {
        self.rect
            .filter(|rect| rect.min.x < rect.max.x && rect.min.y < rect.max.y)
    }
}

/// A value for each of the four physical sides of a box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PhysicalSides<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> PhysicalSides<T> {
    pub fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: T) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn map<U>(&self, f: impl Fn(T) -> U) -> PhysicalSides<U> {
        PhysicalSides {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}

impl<T: Copy + Add<Output = T>> PhysicalSides<T> {
    #[inline]
    pub fn horizontal(&self) -> T {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> T {
        self.top + self.bottom
    }
}

impl<T: Copy + Add<Output = T>> Add for PhysicalSides<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}
