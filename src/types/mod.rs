//! Types provides the definition of the in-memory column types the
//! engine infers, the promotion lattice between them, and conversions
//! to Apache Arrow schemas.

mod datatype;
pub use datatype::*;

mod promote;
pub use promote::*;

mod to_arrow;
pub use to_arrow::*;
