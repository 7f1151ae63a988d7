//! changes module provides the events recorded when unification alters
//! the cumulative tree.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// A single structural change performed during unification.
///
/// The engine appends one event per field addition and per type
/// promotion, in the order the mutations occurred. Types are carried in
/// their canonical rendered form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Change {
    /// A field was added to the tree, or a pending field resolved to a
    /// concrete type.
    Added {
        /// Dotted path of the graft root.
        path: String,
        /// Rendered type of the added subtree.
        data_type: String,
    },
    /// A field's type moved up the promotion lattice.
    Promoted {
        /// Dotted path of the promoted field.
        path: String,
        /// Rendered type before the promotion.
        from: String,
        /// Rendered type after the promotion.
        to: String,
    },
}

impl Change {
    /// Dotted path the event applies to.
    pub fn path(&self) -> &str {
        match self {
            Change::Added { path, .. } => path,
            Change::Promoted { path, .. } => path,
        }
    }
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added { path, data_type } => write!(f, "added {path} : {data_type}"),
            Change::Promoted { path, from, to } => {
                write!(f, "promoted {path} : {from} -> {to}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_display() {
        let added = Change::Added {
            path: "$previous".to_string(),
            data_type: "string".to_string(),
        };
        assert_eq!(added.to_string(), "added $previous : string");
        assert_eq!(added.path(), "$previous");

        let promoted = Change::Promoted {
            path: "$count".to_string(),
            from: "int64".to_string(),
            to: "float64".to_string(),
        };
        assert_eq!(promoted.to_string(), "promoted $count : int64 -> float64");
    }
}
