//! Schema provides the field-node tree the engine maintains, the
//! per-record walker that builds one from a decoded value, the leaf
//! classifier, the ordered path stores, and the change-log events.

mod tree;
pub(crate) use tree::*;

mod classify;
pub(crate) use classify::*;

mod walker;
pub(crate) use walker::*;

mod paths;
pub(crate) use paths::*;

mod changes;
pub use changes::Change;
