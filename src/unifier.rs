//! unifier module provides the engine: it folds per-record schema
//! trees into a cumulative tree, grafting new branches, promoting
//! conflicting types along the lattice and recording every change.

use log::debug;
use serde::Serialize;

use crate::schema::{walk_record, Change, NodeId, NodeKind, PathMap, Tree};
use crate::types::{promote, DataType, PendingKind, Promotion, Schema};
use crate::value::Value;
use crate::{Error, ErrorKind, Result};

/// Configuration of a [`Unifier`].
///
/// Options are fixed for the lifetime of the engine except for the
/// unification cap, which can be lifted with
/// [`Unifier::reset_max_count`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Scan string values for time, date and timestamp shapes.
    pub infer_time_units: bool,
    /// Apply the promotion lattice when a field is observed with a
    /// conflicting type. Off, the first-observed type wins.
    pub type_conversion: bool,
    /// Keep quoted scalars ("42", "true") as strings. Date and time
    /// detection is unaffected.
    pub quoted_values_are_strings: bool,
    /// Inspect every list element rather than only the first.
    pub check_for_union: bool,
    /// Type a mixed list as `list<item: variant>`.
    pub use_variant_for_unions: bool,
    /// Cap on accepted unifications.
    pub max_count: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            infer_time_units: false,
            type_conversion: false,
            quoted_values_are_strings: false,
            check_for_union: false,
            use_variant_for_unions: false,
            max_count: u64::MAX,
        }
    }
}

impl Options {
    /// Enable date, time and timestamp detection in string values.
    pub fn with_infer_time_units(mut self) -> Self {
        self.infer_time_units = true;
        self
    }

    /// Enable the promotion lattice on type conflicts.
    pub fn with_type_conversion(mut self) -> Self {
        self.type_conversion = true;
        self
    }

    /// Keep quoted scalar values as strings.
    pub fn with_quoted_values_are_strings(mut self) -> Self {
        self.quoted_values_are_strings = true;
        self
    }

    /// Scan all list elements for mixed types.
    pub fn with_check_for_union(mut self) -> Self {
        self.check_for_union = true;
        self
    }

    /// Use the variant placeholder as the element type of mixed lists.
    pub fn with_use_variant_for_unions(mut self) -> Self {
        self.use_variant_for_unions = true;
        self
    }

    /// Cap the number of accepted unifications.
    pub fn with_max_count(mut self, max_count: u64) -> Self {
        self.max_count = max_count;
        self
    }
}

/// A known field, as listed by [`Unifier::paths`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    /// Dotted path of the field.
    pub dot_path: String,
    /// Current column type of the field.
    pub data_type: DataType,
    /// Number of child nodes of the field.
    pub children: usize,
}

/// A field that could not be typed yet, as listed by
/// [`Unifier::pending`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingField {
    /// Dotted path of the field.
    pub dot_path: String,
    /// Why the field is pending.
    pub reason: PendingKind,
}

/// The schema engine.
///
/// A `Unifier` infers a columnar schema from the first record it is
/// given and evolves it as further records arrive: new fields are
/// grafted in, fields observed with conflicting types are promoted
/// along the lattice, and fields without usable evidence are parked
/// until evidence shows up. Mutating entry points serialize on the
/// instance; distinct instances are independent.
pub struct Unifier {
    options: Options,
    /// Tree built from the first accepted record, frozen for audit.
    original: Option<Tree>,
    /// Cumulative tree, mutated by every subsequent unification.
    current: Option<Tree>,
    /// Per-record tree of the most recent accepted record.
    last: Option<Tree>,
    known_paths: PathMap,
    pending_paths: PathMap,
    unification_count: u64,
    changes: Vec<Change>,
}

impl Default for Unifier {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Unifier {
    /// Create an engine with the given options.
    pub fn new(options: Options) -> Self {
        Self {
            options,
            original: None,
            current: None,
            last: None,
            known_paths: PathMap::default(),
            pending_paths: PathMap::default(),
            unification_count: 0,
            changes: Vec::new(),
        }
    }

    /// Fold a record into the cumulative schema.
    ///
    /// The first accepted record seeds the schema; every further one
    /// merges into it. A failed call leaves the engine untouched.
    pub fn unify(&mut self, record: &Value) -> Result<()> {
        self.check_count()?;
        let fields = record.as_record()?;
        let incoming = walk_record(fields, &self.options)?;

        if self.current.is_none() {
            self.install_first(incoming);
            return Ok(());
        }
        self.merge_at(incoming, Tree::ROOT)
    }

    /// Seed the engine from the first accepted record: the cumulative
    /// tree starts as a copy of the per-record tree, a second copy is
    /// frozen for audit, and every node is registered in the path
    /// stores. Nothing is logged.
    fn install_first(&mut self, incoming: Tree) {
        let tree = incoming.clone();
        for id in tree.descendants(Tree::ROOT).into_iter().skip(1) {
            let path = tree.node(id).dot_path();
            if tree.node(id).kind.is_pending() {
                self.pending_paths.set(path, id);
            } else {
                self.known_paths.set(path, id);
            }
        }
        self.original = Some(incoming.clone());
        self.current = Some(tree);
        self.last = Some(incoming);
        self.unification_count += 1;
    }

    /// Merge a per-record tree into the cumulative tree under an
    /// existing node.
    fn merge_at(&mut self, incoming: Tree, mount: NodeId) -> Result<()> {
        let tree = match self.current.as_mut() {
            Some(tree) => tree,
            None => {
                return Err(Error::new(
                    ErrorKind::PathNotFound,
                    "no schema to mount into",
                ))
            }
        };
        let mut merger = Merger {
            tree,
            known: &mut self.known_paths,
            pending: &mut self.pending_paths,
            changes: &mut self.changes,
            options: &self.options,
        };
        for child in incoming.node(Tree::ROOT).children.clone() {
            merger.merge_node(&incoming, child, mount);
        }

        self.last = Some(incoming);
        self.unification_count += 1;
        Ok(())
    }

    /// Decode a JSON record and fold it into the cumulative schema.
    pub fn unify_json(&mut self, json: &str) -> Result<()> {
        let record = Value::from_json_str(json)?;
        self.unify(&record)
    }

    /// Fold a record into the cumulative schema under an existing
    /// mount path.
    ///
    /// The mount must name a concrete struct already in the schema;
    /// `""` and `"$"` mean the root. A failed call leaves the engine
    /// untouched.
    pub fn unify_at_path(&mut self, record: &Value, mount: &str) -> Result<()> {
        self.check_count()?;
        let segments = parse_mount_path(mount)?;
        let mount_id = {
            let tree = self.current.as_ref().ok_or_else(|| {
                Error::new(ErrorKind::PathNotFound, "no schema to mount into").with_path(mount)
            })?;
            let mount_id = tree.get_path(Tree::ROOT, &segments).ok_or_else(|| {
                Error::new(ErrorKind::PathNotFound, "mount path does not exist").with_path(mount)
            })?;
            if tree.node(mount_id).kind != NodeKind::Struct {
                return Err(Error::new(
                    ErrorKind::PathNotFound,
                    "mount path is not a concrete struct",
                )
                .with_path(mount));
            }
            mount_id
        };

        let fields = record.as_record()?;
        let incoming = walk_record(fields, &self.options)?;
        self.merge_at(incoming, mount_id)
    }

    /// Snapshot of the schema inferred from the first accepted record.
    ///
    /// Empty before any record has been accepted.
    pub fn origin_schema(&self) -> Schema {
        match &self.original {
            None => Schema::default(),
            Some(tree) => Schema::new(tree.struct_fields(Tree::ROOT)),
        }
    }

    /// Snapshot of the cumulative schema.
    ///
    /// Empty before any record has been accepted. Pending fields are
    /// left out until they resolve.
    pub fn schema(&self) -> Schema {
        match &self.current {
            None => Schema::default(),
            Some(tree) => Schema::new(tree.struct_fields(Tree::ROOT)),
        }
    }

    /// Snapshot of the schema of the most recent accepted record.
    pub fn last_schema(&self) -> Result<Schema> {
        match &self.last {
            None => Err(Error::new(
                ErrorKind::NoLatestSchema,
                "no record has been accepted yet",
            )),
            Some(tree) => Ok(Schema::new(tree.struct_fields(Tree::ROOT))),
        }
    }

    /// Known fields, deepest paths first.
    pub fn paths(&self) -> Vec<FieldSummary> {
        let Some(tree) = &self.current else {
            return Vec::new();
        };
        self.known_paths
            .keys_by_depth_desc()
            .into_iter()
            .filter_map(|path| {
                let id = self.known_paths.get(path)?;
                Some(FieldSummary {
                    dot_path: path.to_string(),
                    data_type: tree.data_type(id)?,
                    children: tree.node(id).children.len(),
                })
            })
            .collect()
    }

    /// Fields that could not be typed yet, deepest paths first.
    pub fn pending(&self) -> Vec<PendingField> {
        let Some(tree) = &self.current else {
            return Vec::new();
        };
        self.pending_paths
            .keys_by_depth_desc()
            .into_iter()
            .filter_map(|path| {
                let id = self.pending_paths.get(path)?;
                match &tree.node(id).kind {
                    NodeKind::Pending(reason) => Some(PendingField {
                        dot_path: path.to_string(),
                        reason: *reason,
                    }),
                    _ => None,
                }
            })
            .collect()
    }

    /// Number of known field paths.
    pub fn count_paths(&self) -> usize {
        self.known_paths.len()
    }

    /// Number of pending field paths.
    pub fn count_pending(&self) -> usize {
        self.pending_paths.len()
    }

    /// Every addition and promotion performed over the lifetime of the
    /// engine, in mutation order. Counter resets do not clear it.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Number of records folded into the cumulative schema.
    pub fn count(&self) -> u64 {
        self.unification_count
    }

    /// Maximum number of records to accept.
    pub fn max_count(&self) -> u64 {
        self.options.max_count
    }

    /// Zero the accepted-record counter. Schema state is preserved.
    pub fn reset_count(&mut self) {
        self.unification_count = 0;
    }

    /// Lift the cap on accepted records.
    pub fn reset_max_count(&mut self) {
        self.options.max_count = u64::MAX;
    }

    /// The engine's options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn check_count(&self) -> Result<()> {
        if self.unification_count >= self.options.max_count {
            return Err(Error::new(
                ErrorKind::MaxCountExceeded,
                format!("unification cap of {} reached", self.options.max_count),
            ));
        }
        Ok(())
    }
}

/// Parse a dotted mount path into its segments; empty means the root.
fn parse_mount_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() || path == "$" {
        return Ok(Vec::new());
    }
    let rest = path.strip_prefix('$').ok_or_else(|| {
        Error::new(ErrorKind::PathNotFound, "mount path must start with $").with_path(path)
    })?;
    let rest = rest.strip_prefix('.').unwrap_or(rest);
    if rest.is_empty() {
        return Ok(Vec::new());
    }
    let segments: Vec<&str> = rest.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(
            Error::new(ErrorKind::PathNotFound, "mount path has an empty segment")
                .with_path(path),
        );
    }
    Ok(segments)
}

/// One merge pass over the cumulative tree.
///
/// Split out of [`Unifier`] so the tree, the path stores and the
/// change log can be borrowed independently during recursion.
struct Merger<'a> {
    tree: &'a mut Tree,
    known: &'a mut PathMap,
    pending: &'a mut PathMap,
    changes: &'a mut Vec<Change>,
    options: &'a Options,
}

impl Merger<'_> {
    fn merge_node(&mut self, incoming: &Tree, new_id: NodeId, target_parent: NodeId) {
        let name = incoming.node(new_id).name.clone();
        match self.tree.child_by_name(target_parent, &name) {
            None => self.graft(incoming, new_id, target_parent),
            Some(old_id) => self.reconcile(incoming, new_id, old_id),
        }
    }

    /// Attach a copy of a new subtree and log one addition for its
    /// root. A root that is itself pending is only registered; it logs
    /// when it resolves.
    fn graft(&mut self, incoming: &Tree, new_id: NodeId, target_parent: NodeId) {
        let root = self.tree.adopt_subtree(target_parent, incoming, new_id);
        self.register_subtree(root);
        if let Some(data_type) = self.tree.data_type(root) {
            let path = self.tree.node(root).dot_path();
            debug!("graft {path} : {data_type}");
            self.changes.push(Change::Added {
                path,
                data_type: data_type.to_string(),
            });
        }
    }

    fn register_subtree(&mut self, root: NodeId) {
        for id in self.tree.descendants(root) {
            let path = self.tree.node(id).dot_path();
            if self.tree.node(id).kind.is_pending() {
                self.pending.set(path, id);
            } else {
                self.known.set(path, id);
            }
        }
    }

    fn reconcile(&mut self, incoming: &Tree, new_id: NodeId, old_id: NodeId) {
        let old_pending = self.tree.node(old_id).kind.is_pending();
        let new_pending = incoming.node(new_id).kind.is_pending();
        match (old_pending, new_pending) {
            (true, false) => self.resolve(incoming, new_id, old_id),
            (_, true) => {
                // No new evidence for this node. An object whose fields
                // are all untyped still surfaces those fields as
                // pending nodes under an existing struct.
                if incoming.node(new_id).is_struct && self.tree.node(old_id).is_struct {
                    for child in incoming.node(new_id).children.clone() {
                        self.merge_node(incoming, child, old_id);
                    }
                }
            }
            (false, false) => self.merge_concrete(incoming, new_id, old_id),
        }
    }

    /// A pending field just received concrete evidence: take over the
    /// incoming subtree and log one addition.
    fn resolve(&mut self, incoming: &Tree, new_id: NodeId, old_id: NodeId) {
        self.adopt_in_place(incoming, new_id, old_id);
        if let Some(data_type) = self.tree.data_type(old_id) {
            let path = self.tree.node(old_id).dot_path();
            debug!("resolve {path} : {data_type}");
            self.changes.push(Change::Added {
                path,
                data_type: data_type.to_string(),
            });
        }
    }

    /// Overwrite a pending node with an incoming node, recursing into
    /// children. Descendants move between the path stores silently.
    fn adopt_in_place(&mut self, incoming: &Tree, new_id: NodeId, old_id: NodeId) {
        let new_node = incoming.node(new_id);
        let kind = new_node.kind.clone();
        let is_struct = new_node.is_struct;
        let is_list = new_node.is_list;
        let new_children = new_node.children.clone();
        {
            let old = self.tree.node_mut(old_id);
            old.kind = kind;
            old.is_struct = is_struct;
            old.is_list = is_list;
        }
        if !self.tree.node(old_id).kind.is_pending() {
            let path = self.tree.node(old_id).dot_path();
            self.pending.delete(&path);
            self.known.set(path, old_id);
        }
        for child in new_children {
            let child_name = incoming.node(child).name.clone();
            match self.tree.child_by_name(old_id, &child_name) {
                None => {
                    let grafted = self.tree.adopt_subtree(old_id, incoming, child);
                    self.register_subtree(grafted);
                }
                Some(existing) => {
                    // A pending parent only ever holds pending
                    // children; adopt those that now have evidence.
                    let existing_pending = self.tree.node(existing).kind.is_pending();
                    let child_pending = incoming.node(child).kind.is_pending();
                    if existing_pending && !child_pending {
                        self.adopt_in_place(incoming, child, existing);
                    }
                }
            }
        }
    }

    /// Both sides are concrete: recurse through matching structure and
    /// consult the lattice on conflicts.
    fn merge_concrete(&mut self, incoming: &Tree, new_id: NodeId, old_id: NodeId) {
        let old_struct = self.tree.node(old_id).is_struct;
        let old_list = self.tree.node(old_id).is_list;
        let new_struct = incoming.node(new_id).is_struct;
        let new_list = incoming.node(new_id).is_list;

        if (old_struct && new_struct) || (old_list && new_list) {
            for child in incoming.node(new_id).children.clone() {
                self.merge_node(incoming, child, old_id);
            }
            return;
        }

        if !self.options.type_conversion {
            return;
        }
        let (Some(old_type), Some(new_type)) = (
            self.tree.data_type(old_id),
            incoming.data_type(new_id),
        ) else {
            return;
        };
        if old_type == new_type {
            return;
        }
        match promote(&old_type, &new_type) {
            Promotion::Upgraded(to) => {
                let path = self.tree.node(old_id).dot_path();
                debug!("promote {path} : {old_type} -> {to}");
                {
                    let node = self.tree.node_mut(old_id);
                    node.kind = NodeKind::Scalar(to.clone());
                    node.is_struct = false;
                    node.is_list = false;
                }
                self.changes.push(Change::Promoted {
                    path,
                    from: old_type.to_string(),
                    to: to.to_string(),
                });
            }
            Promotion::Unchanged | Promotion::NotUpgradable => {}
        }
    }
}
