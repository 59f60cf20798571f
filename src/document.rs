//! The node tree a composed document is made of.
//!
//! Nodes are addressed by plain `usize` index rather than a nonzero id: they live in
//! `Document::nodes` and are referred to by `usize` position, with `0` a
//! perfectly ordinary root index rather than a reserved null sentinel.

use core::cell::Cell;

use crate::{MappingStyle, Mark, ScalarStyle, SequenceStyle, TagDirective, VersionDirective};

/// A composed YAML document: a node arena plus the directives that
/// governed it.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Document {
    /// The document's nodes, in the order they were composed. Index 0,
    /// when present, is the root.
    pub nodes: Vec<Node>,
    /// Anchors registered while composing, most-recently-defined last so a
    /// lookup by name finds the nearest preceding definition first.
    pub anchors: Vec<(String, usize)>,
    pub version_directive: Option<VersionDirective>,
    pub tag_directives: Vec<TagDirective>,
    pub start_implicit: bool,
    pub end_implicit: bool,
    pub start_mark: Mark,
    pub end_mark: Mark,
}

/// A single node in the composed tree.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct Node {
    pub data: NodeData,
    pub tag: Option<String>,
    pub anchor: Option<String>,
    /// Index of the containing sequence or mapping node, `None` at the root.
    pub parent: Option<usize>,
    pub start_mark: Mark,
    pub end_mark: Mark,
    /// Generation counter used by cycle-detecting tree walks (path
    /// evaluation, merge-key expansion) instead of a plain visited `bool`,
    /// so a single node can be safely revisited across separate walks
    /// without an explicit reset pass.
    pub(crate) visited: Cell<u32>,
}

impl Node {
    fn new(data: NodeData, tag: Option<String>, start_mark: Mark, end_mark: Mark) -> Self {
        Node {
            data,
            tag,
            anchor: None,
            parent: None,
            start_mark,
            end_mark,
            visited: Cell::new(0),
        }
    }
}

/// The shape of a node's content.
#[derive(Clone, Debug, Default)]
pub enum NodeData {
    /// The empty-document placeholder, or an explicit `~`/`null`.
    #[default]
    Null,
    Scalar {
        value: String,
        style: ScalarStyle,
    },
    Sequence {
        items: Vec<usize>,
        style: SequenceStyle,
    },
    Mapping {
        pairs: Vec<NodePair>,
        style: MappingStyle,
    },
    /// An unresolved `*anchor` reference, produced by the builder and
    /// replaced with a deep copy of its target by
    /// [`crate::resolver::resolve`].
    Alias {
        name: String,
    },
}

/// One key/value pair of a mapping node, referring to other nodes by index.
#[derive(Copy, Clone, Debug)]
pub struct NodePair {
    pub key: usize,
    pub value: usize,
}

impl Document {
    pub(crate) fn empty() -> Self {
        Document {
            nodes: Vec::new(),
            anchors: Vec::new(),
            version_directive: None,
            tag_directives: Vec::new(),
            start_implicit: false,
            end_implicit: false,
            start_mark: Mark::default(),
            end_mark: Mark::default(),
        }
    }

    pub fn get_node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn get_node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// The root node, i.e. index 0. An empty document (end of stream) has
    /// no root.
    pub fn root(&self) -> Option<&Node> {
        self.nodes.first()
    }

    /// Looks up the nearest preceding anchor definition with this name, as
    /// YAML requires an alias to refer to an anchor already seen.
    pub fn find_anchor(&self, name: &str) -> Option<usize> {
        self.anchors
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, index)| *index)
    }

    pub(crate) fn push_node(&mut self, node: Node) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    pub(crate) fn new_node(
        data: NodeData,
        tag: Option<String>,
        start_mark: Mark,
        end_mark: Mark,
    ) -> Node {
        Node::new(data, tag, start_mark, end_mark)
    }

    /// Renders the subtree at `index` as a single-line flow-style string
    /// (`{k: v, ...}` / `[a, b, ...]` / the bare scalar text), with no
    /// trailing newline. Not a general-purpose emitter (formatting fidelity,
    /// quoting style, and line width are out of scope); this exists only to
    /// give a complex (non-scalar) mapping key a stable path-component text,
    /// the same way a scalar key's own text already is one.
    pub(crate) fn serialize_flow_oneline(&self, index: usize) -> String {
        let Some(node) = self.get_node(index) else {
            return "null".to_string();
        };
        match &node.data {
            NodeData::Null => "null".to_string(),
            NodeData::Scalar { value, .. } => value.clone(),
            NodeData::Alias { name } => format!("*{name}"),
            NodeData::Sequence { items, .. } => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|&item| self.serialize_flow_oneline(item))
                    .collect();
                format!("[{}]", parts.join(", "))
            }
            NodeData::Mapping { pairs, .. } => {
                let parts: Vec<String> = pairs
                    .iter()
                    .map(|pair| {
                        format!(
                            "{}: {}",
                            self.serialize_flow_oneline(pair.key),
                            self.serialize_flow_oneline(pair.value)
                        )
                    })
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }

    /// Fills in every node's `parent` field from the tree's actual
    /// containment structure. The builder appends nodes in document order
    /// but only records child lists, so this pass is run once after a
    /// document is fully composed.
    pub(crate) fn link_parents(&mut self) {
        let mut edges = Vec::new();
        for (index, node) in self.nodes.iter().enumerate() {
            match &node.data {
                NodeData::Sequence { items, .. } => {
                    for &child in items {
                        edges.push((child, index));
                    }
                }
                NodeData::Mapping { pairs, .. } => {
                    for pair in pairs {
                        edges.push((pair.key, index));
                        edges.push((pair.value, index));
                    }
                }
                _ => {}
            }
        }
        for (child, parent) in edges {
            self.nodes[child].parent = Some(parent);
        }
    }
}
