/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::style::ComputedStyle;

static INITIAL_STYLE: LazyLock<Arc<ComputedStyle>> =
    LazyLock::new(|| Arc::new(ComputedStyle::default()));

/// A handle to a node in a [`Document`].
///
/// The ordinal of a handle is the node's sequence number: nodes created in document order compare
/// in document order. A handle is a plain index with no ownership attached to it; once its node
/// has been detached, queries that take it report "not found" rather than misbehaving.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The stable sequence index of this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("no node with handle {0:?} exists in this document")]
    UnknownNode(NodeId),
    #[error("text node {0:?} cannot have children")]
    TextHasNoChildren(NodeId),
}

pub type Result<T> = std::result::Result<T, DocumentError>;

#[derive(Debug)]
enum NodeKind {
    Element {
        name: String,
        attributes: FxHashMap<String, String>,
        style: Option<Arc<ComputedStyle>>,
    },
    Text(Arc<str>),
}

#[derive(Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An arena holding a document tree.
///
/// Layout only ever reads from a `Document`; the builder methods exist for the code that owns the
/// tree (the parser and cascade in a full engine, fixtures in tests).
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index())
    }

    fn data_mut(&mut self, node: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(node.index())
            .ok_or(DocumentError::UnknownNode(node))
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> Result<NodeId> {
        if let Some(parent) = parent {
            match self.data(parent) {
                None => return Err(DocumentError::UnknownNode(parent)),
                Some(NodeData {
                    kind: NodeKind::Text(_),
                    ..
                }) => return Err(DocumentError::TextHasNoChildren(parent)),
                Some(_) => {},
            }
        }

        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            parent,
            children: Vec::new(),
            kind,
        });
        match parent {
            Some(parent) => self.data_mut(parent)?.children.push(id),
            None if self.root.is_none() => self.root = Some(id),
            None => {},
        }
        Ok(id)
    }

    /// Append a new element to `parent`. The first parentless element becomes the root.
    pub fn create_element(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        style: Option<Arc<ComputedStyle>>,
    ) -> Result<NodeId> {
        self.push(
            parent,
            NodeKind::Element {
                name: name.to_owned(),
                attributes: FxHashMap::default(),
                style,
            },
        )
    }

    pub fn create_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId> {
        self.push(Some(parent), NodeKind::Text(Arc::from(text)))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        if let NodeKind::Element { attributes, .. } = &mut self.data_mut(node)?.kind {
            attributes.insert(name.to_ascii_lowercase(), value.to_owned());
        }
        Ok(())
    }

    pub fn set_style(&mut self, node: NodeId, new_style: Arc<ComputedStyle>) -> Result<()> {
        if let NodeKind::Element { style, .. } = &mut self.data_mut(node)?.kind {
            *style = Some(new_style);
        }
        Ok(())
    }

    /// Remove `node` and its subtree from the tree. The handles stay valid, but the nodes are
    /// orphans from then on and [`Document::is_attached`] reports `false` for them.
    pub fn detach(&mut self, node: NodeId) -> Result<()> {
        let parent = self.data_mut(node)?.parent.take();
        if let Some(parent) = parent {
            self.data_mut(parent)?.children.retain(|child| *child != node);
        }
        if self.root == Some(node) {
            self.root = None;
        }
        Ok(())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.data(node).is_some()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|data| data.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(
            self.data(node),
            Some(NodeData {
                kind: NodeKind::Text(_),
                ..
            })
        )
    }

    pub fn text(&self, node: NodeId) -> Option<&Arc<str>> {
        match &self.data(node)?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Whether this is a text node made of nothing but white-space.
    pub fn is_whitespace(&self, node: NodeId) -> bool {
        self.text(node)
            .is_some_and(|text| text.chars().all(char::is_whitespace))
    }

    pub fn element_name(&self, node: NodeId) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.data(node)?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeKind::Text(_) => None,
        }
    }

    /// The element whose style governs `node`: the node itself, or the parent of a text node.
    pub fn element_for(&self, node: NodeId) -> Option<NodeId> {
        if self.is_text(node) {
            self.parent(node)
        } else if self.contains(node) {
            Some(node)
        } else {
            None
        }
    }

    /// The style attached to `node` itself, if any.
    pub fn own_style(&self, node: NodeId) -> Option<&Arc<ComputedStyle>> {
        match &self.data(node)?.kind {
            NodeKind::Element { style, .. } => style.as_ref(),
            NodeKind::Text(_) => None,
        }
    }

    /// The computed style that applies to `node`. Text nodes read their parent's style, and a
    /// node that has no style (or does not exist) reads the initial values.
    pub fn style(&self, node: NodeId) -> &Arc<ComputedStyle> {
        self.element_for(node)
            .and_then(|element| self.own_style(element))
            .unwrap_or_else(|| Self::initial_style())
    }

    /// The shared style holding the initial value of every property.
    pub fn initial_style() -> &'static Arc<ComputedStyle> {
        &INITIAL_STYLE
    }

    /// `node` followed by each of its ancestors, innermost first.
    pub fn inclusive_ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.contains(node).then_some(node), move |current| {
            self.parent(*current)
        })
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.inclusive_ancestors(node).any(|current| current == ancestor)
    }

    /// Whether `node` is still connected to the root of the document.
    pub fn is_attached(&self, node: NodeId) -> bool {
        match (self.root, self.inclusive_ancestors(node).last()) {
            (Some(root), Some(top)) => root == top,
            _ => false,
        }
    }
}
