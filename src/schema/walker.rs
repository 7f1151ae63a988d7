//! walker module provides the per-record traversal: it mirrors a
//! decoded record as a schema tree with every leaf classified, without
//! consulting or mutating the cumulative tree.

use log::trace;

use crate::schema::classify::classify_scalar;
use crate::schema::tree::{NodeId, NodeKind, Tree};
use crate::types::{DataType, PendingKind};
use crate::unifier::Options;
use crate::value::Value;
use crate::{Error, ErrorKind, Result};

/// Recursion bound on record nesting.
pub(crate) const MAX_DEPTH: usize = 256;

/// Build the schema tree of a single record.
pub(crate) fn walk_record(fields: &[(String, Value)], options: &Options) -> Result<Tree> {
    let mut tree = Tree::new();
    walk_struct(&mut tree, Tree::ROOT, fields, options)?;
    Ok(tree)
}

/// Children of a node past the depth bound are not walked.
fn depth_guard(tree: &Tree, parent: NodeId) -> Result<()> {
    if tree.node(parent).depth >= MAX_DEPTH {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("record nesting exceeds the depth bound of {MAX_DEPTH}"),
        ));
    }
    Ok(())
}

fn walk_struct(
    tree: &mut Tree,
    parent: NodeId,
    fields: &[(String, Value)],
    options: &Options,
) -> Result<()> {
    depth_guard(tree, parent)?;
    for (name, value) in fields {
        walk_value(tree, parent, name, value, options)?;
    }
    Ok(())
}

fn walk_value(
    tree: &mut Tree,
    parent: NodeId,
    name: &str,
    value: &Value,
    options: &Options,
) -> Result<()> {
    match value {
        Value::Struct(fields) => {
            let node = tree.add_child(parent, name, NodeKind::Struct);
            tree.node_mut(node).is_struct = true;
            walk_struct(tree, node, fields, options)?;
            mark_empty_struct_pending(tree, node);
        }
        Value::List(items) => {
            let node = tree.add_child(parent, name, NodeKind::List);
            tree.node_mut(node).is_list = true;
            walk_list(tree, node, items, options)?;
        }
        scalar => {
            let kind = match classify_scalar(scalar, options) {
                Some(data_type) => NodeKind::Scalar(data_type),
                None => NodeKind::Pending(PendingKind::UnknownLeaf),
            };
            trace!("walk {name}: {kind:?}");
            tree.add_child(parent, name, kind);
        }
    }
    Ok(())
}

/// A struct with no typed field cannot be evaluated yet. Its pending
/// children stay in the tree for diagnostics.
fn mark_empty_struct_pending(tree: &mut Tree, node: NodeId) {
    let any_typed = tree
        .node(node)
        .children
        .iter()
        .any(|child| !tree.node(*child).kind.is_pending());
    if !any_typed {
        tree.node_mut(node).kind = NodeKind::Pending(PendingKind::EmptyStruct);
    }
}

/// Resolve the element subtree of a list node.
///
/// The element type comes from the first element only, unless union
/// checking is on; a list that offers no usable evidence (no elements,
/// or a first element that is null or itself untypeable) is parked as
/// pending.
fn walk_list(tree: &mut Tree, list: NodeId, items: &[Value], options: &Options) -> Result<()> {
    depth_guard(tree, list)?;
    if items.is_empty() {
        tree.node_mut(list).kind = NodeKind::Pending(PendingKind::EmptyList);
        return Ok(());
    }

    if options.check_for_union && options.use_variant_for_unions && list_is_mixed(items, options)
    {
        tree.add_list_item(list, NodeKind::Scalar(DataType::Variant));
        return Ok(());
    }

    match &items[0] {
        Value::Struct(fields) => {
            let item = tree.add_list_item(list, NodeKind::Struct);
            tree.node_mut(item).is_struct = true;
            walk_struct(tree, item, fields, options)?;
            mark_empty_struct_pending(tree, item);
            if tree.node(item).kind.is_pending() {
                tree.detach_child(item);
                tree.node_mut(list).kind = NodeKind::Pending(PendingKind::EmptyList);
            }
        }
        Value::List(inner) => {
            let item = tree.add_list_item(list, NodeKind::List);
            tree.node_mut(item).is_list = true;
            walk_list(tree, item, inner, options)?;
            if tree.node(item).kind.is_pending() {
                tree.detach_child(item);
                tree.node_mut(list).kind = NodeKind::Pending(PendingKind::EmptyList);
            }
        }
        scalar => match classify_scalar(scalar, options) {
            Some(data_type) => {
                tree.add_list_item(list, NodeKind::Scalar(data_type));
            }
            None => {
                tree.node_mut(list).kind = NodeKind::Pending(PendingKind::EmptyList);
            }
        },
    }
    Ok(())
}

/// Whether the elements of a list disagree on their type.
///
/// Null elements carry no evidence and are skipped; nested elements
/// compare by shape, scalars by classified type.
fn list_is_mixed(items: &[Value], options: &Options) -> bool {
    let mut seen: Option<ElementShape> = None;
    for item in items {
        let shape = match item {
            Value::Null => continue,
            Value::Struct(_) => ElementShape::Struct,
            Value::List(_) => ElementShape::List,
            scalar => match classify_scalar(scalar, options) {
                Some(data_type) => ElementShape::Scalar(data_type),
                None => continue,
            },
        };
        match &seen {
            None => seen = Some(shape),
            Some(first) if *first != shape => return true,
            Some(_) => {}
        }
    }
    false
}

#[derive(PartialEq)]
enum ElementShape {
    Scalar(DataType),
    Struct,
    List,
}
