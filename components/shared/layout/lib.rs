/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! This module contains the interfaces that table layout and the display list consume from the
//! rest of the engine: the document tree, per-node computed style, and the font and image
//! collaborators. Everything here is read-only for the duration of a layout pass, so nothing that
//! layout calls out to can mutate the tree underneath it.

#![deny(unsafe_code)]

mod document;
mod resources;
pub mod style;

pub use document::{Document, DocumentError, NodeId};
pub use resources::{FontHandle, FontMetrics, Image, ImageHandle, prefix_by_chars};
pub use style::ComputedStyle;
