/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Table layout.
//!
//! A [`LayoutSession`] lays out `display: table` elements of a [`layout_api::Document`] into
//! [`display_list::Canvas`]es. What goes inside each cell is left to a [`ContentLayout`] supplied
//! by the caller; see the [`table`] module for how the table itself is put together.

#![deny(unsafe_code)]

mod content;
mod context;
mod error;
mod options;
pub mod table;

pub use content::{CellContent, ContentBox, ContentLayout, ContentSizes};
pub use context::LayoutSession;
pub use error::{LayoutError, Result};
pub use options::LayoutOptions;
pub use table::{ContainingBlock, LayoutMode, TableBox};
