/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::TryReserveError;

use layout_api::NodeId;

/// The ways a table layout can fail. Broken table markup is not one of them: missing rows, cells
/// and groups are repaired while the grid is built.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("no node with handle {0:?} exists in this document")]
    UnknownNode(NodeId),
    #[error("node {0:?} does not have `display: table`")]
    NotATable(NodeId),
    #[error("could not allocate the table grid: {0}")]
    Allocation(#[from] TryReserveError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
