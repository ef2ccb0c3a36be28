/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use serde::{Deserialize, Serialize};

/// Tunables for table layout. Every field has a default, so a partial JSON object is a valid
/// configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// The narrowest a column can be once any cell originates in it.
    pub minimum_column_width: i32,
    /// The maximum width reported for a table whose percentage columns add up to 100% or more
    /// while other columns still want room.
    pub overconstrained_percent_width: i32,
    /// Ignore percentage column widths when computing the maximum width of a table nested in
    /// another table, unless an element in between has a fixed width or is positioned.
    pub percent_ignored_in_nested_tables: bool,
    /// Offer the box item drawn for a node by the previous layout to the next one, so that an
    /// unchanged box is shared between the two display lists.
    pub reuse_box_items: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            minimum_column_width: 1,
            overconstrained_percent_width: 10000,
            percent_ignored_in_nested_tables: false,
            reuse_box_items: true,
        }
    }
}

impl LayoutOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
