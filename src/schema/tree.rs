//! tree module provides the arena-allocated field-node tree that backs
//! both the per-record and the cumulative schemas.

use std::collections::HashMap;

use crate::types::{DataType, Field, PendingKind};

/// Index of a node inside its tree's arena.
pub(crate) type NodeId = usize;

/// What a node currently is.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    /// A typed leaf.
    Scalar(DataType),
    /// A struct with at least one typed field.
    Struct,
    /// A list with exactly one element subtree.
    List,
    /// A node whose type could not be evaluated yet.
    Pending(PendingKind),
}

impl NodeKind {
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, NodeKind::Pending(_))
    }
}

/// A node in the schema tree.
///
/// Nodes are owned by the arena and navigate both ways: children in
/// insertion order plus a by-name index, and a parent id (the root is
/// its own parent). A list element node carries the synthetic name
/// `<list>.elem`, which substitutes for the list's path segment so the
/// element of `$results` sits at `$results.elem`.
#[derive(Debug, Clone)]
pub(crate) struct FieldNode {
    pub(crate) name: String,
    /// Dotted-path segments from the root; empty for the root itself.
    pub(crate) path: Vec<String>,
    pub(crate) parent: NodeId,
    pub(crate) depth: usize,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    child_index: HashMap<String, NodeId>,
    pub(crate) is_list: bool,
    pub(crate) is_struct: bool,
    pub(crate) is_item: bool,
}

impl FieldNode {
    /// Dotted path of the node, `$` for the root.
    pub(crate) fn dot_path(&self) -> String {
        if self.path.is_empty() {
            "$".to_string()
        } else {
            format!("${}", self.path.join("."))
        }
    }
}

/// An arena of field nodes with a synthetic struct root at index 0.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<FieldNode>,
}

impl Tree {
    pub(crate) const ROOT: NodeId = 0;

    pub(crate) fn new() -> Self {
        Tree {
            nodes: vec![FieldNode {
                name: String::new(),
                path: Vec::new(),
                parent: Self::ROOT,
                depth: 0,
                kind: NodeKind::Struct,
                children: Vec::new(),
                child_index: HashMap::new(),
                is_list: false,
                is_struct: true,
                is_item: false,
            }],
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &FieldNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut FieldNode {
        &mut self.nodes[id]
    }

    /// Attach a named child under a parent.
    ///
    /// The caller is responsible for name uniqueness among siblings;
    /// walker and unifier both look up before inserting.
    pub(crate) fn add_child(&mut self, parent: NodeId, name: &str, kind: NodeKind) -> NodeId {
        let mut path = self.nodes[parent].path.clone();
        path.push(name.to_string());
        self.push_node(parent, name.to_string(), path, kind, false)
    }

    /// Attach the element subtree of a list node.
    pub(crate) fn add_list_item(&mut self, list: NodeId, kind: NodeKind) -> NodeId {
        let name = format!("{}.elem", self.nodes[list].name);
        let mut path = self.nodes[list].path.clone();
        path.pop();
        path.push(name.clone());
        self.push_node(list, name, path, kind, true)
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        name: String,
        path: Vec<String>,
        kind: NodeKind,
        is_item: bool,
    ) -> NodeId {
        let id = self.nodes.len();
        let depth = self.nodes[parent].depth + 1;
        self.nodes.push(FieldNode {
            name: name.clone(),
            path,
            parent,
            depth,
            kind,
            children: Vec::new(),
            child_index: HashMap::new(),
            is_list: false,
            is_struct: false,
            is_item,
        });
        let parent_node = &mut self.nodes[parent];
        parent_node.children.push(id);
        parent_node.child_index.insert(name, id);
        id
    }

    pub(crate) fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes[parent].child_index.get(name).copied()
    }

    /// The element subtree of a list node, if attached.
    pub(crate) fn list_item(&self, list: NodeId) -> Option<NodeId> {
        self.nodes[list].children.first().copied()
    }

    /// Resolve a sequence of plain field names from a starting node.
    pub(crate) fn get_path(&self, start: NodeId, segments: &[&str]) -> Option<NodeId> {
        let mut cur = start;
        for segment in segments {
            cur = self.child_by_name(cur, segment)?;
        }
        Some(cur)
    }

    /// Pre-order ids of a subtree, the given node first.
    pub(crate) fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            out.push(cur);
            // Reverse keeps pre-order left to right with a stack.
            for child in self.nodes[cur].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Copy a subtree from another arena under `parent`, recomputing
    /// paths and depths for the destination. Returns the new root id.
    pub(crate) fn adopt_subtree(&mut self, parent: NodeId, src: &Tree, src_id: NodeId) -> NodeId {
        let src_node = src.node(src_id);
        let dst = if src_node.is_item {
            self.add_list_item(parent, src_node.kind.clone())
        } else {
            self.add_child(parent, &src_node.name, src_node.kind.clone())
        };
        {
            let node = self.node_mut(dst);
            node.is_list = src_node.is_list;
            node.is_struct = src_node.is_struct;
        }
        for child in &src_node.children {
            self.adopt_subtree(dst, src, *child);
        }
        dst
    }

    /// Detach a child from its parent, leaving the arena slot orphaned.
    ///
    /// Only the walker uses this, to back out of an element subtree
    /// that turned out to be untypeable.
    pub(crate) fn detach_child(&mut self, child: NodeId) {
        let parent = self.nodes[child].parent;
        let name = self.nodes[child].name.clone();
        let parent_node = &mut self.nodes[parent];
        parent_node.children.retain(|c| *c != child);
        parent_node.child_index.remove(&name);
    }

    /// The composite column type of a node, computed from its subtree.
    ///
    /// Pending nodes have no type; pending children of a struct are
    /// left out of its fields.
    pub(crate) fn data_type(&self, id: NodeId) -> Option<DataType> {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Pending(_) => None,
            NodeKind::Scalar(t) => Some(t.clone()),
            NodeKind::Struct => Some(DataType::Struct(self.struct_fields(id))),
            NodeKind::List => {
                let item = self.list_item(id)?;
                Some(DataType::List(Box::new(self.data_type(item)?)))
            }
        }
    }

    /// The typed fields of a struct node, in child insertion order.
    pub(crate) fn struct_fields(&self, id: NodeId) -> Vec<Field> {
        self.nodes[id]
            .children
            .iter()
            .filter_map(|child| {
                self.data_type(*child)
                    .map(|t| Field::new(self.nodes[*child].name.clone(), t))
            })
            .collect()
    }
}
