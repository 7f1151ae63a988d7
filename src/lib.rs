//! quiver is a library for inferring [Apache Arrow](https://arrow.apache.org/)
//! style columnar schemas from semi-structured, loosely-typed records,
//! and for evolving such a schema incrementally as further records
//! arrive.
//!
//! Records carry no declared schema: each one is a tree of string-keyed
//! objects, ordered lists and scalar leaves. The [`Unifier`] walks
//! every record into a per-record schema tree, merges it into the
//! cumulative tree, promotes conflicting column types along a fixed
//! lattice, parks fields without usable evidence until evidence shows
//! up, and keeps an ordered log of every change it performed.
//!
//! ```
//! use quiver::{Options, Unifier};
//!
//! let mut unifier = Unifier::new(Options::default().with_type_conversion());
//! unifier.unify_json(r#"{"id": 1, "name": "a"}"#)?;
//! unifier.unify_json(r#"{"id": 1.5, "seen": true}"#)?;
//! assert_eq!(unifier.schema().to_string(), "id: float64, name: string, seen: bool");
//! # Ok::<(), quiver::Error>(())
//! ```

// Make sure all our public APIs have docs.
#![deny(missing_docs)]

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

pub mod types;

mod schema;
pub use schema::Change;

mod unifier;
pub use unifier::FieldSummary;
pub use unifier::Options;
pub use unifier::PendingField;
pub use unifier::Unifier;

mod value;
pub use value::Value;
