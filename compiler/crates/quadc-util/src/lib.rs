//! Foundation layer shared by every compiler phase: string interning,
//! typed indices, and source-line tracking.

pub mod error;
pub mod index_vec;
pub mod span;
pub mod symbol;

pub use error::{UtilError, UtilResult};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use symbol::Symbol;
pub use rustc_hash::{FxHashMap, FxHashSet};
