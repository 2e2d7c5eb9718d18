//! lensfs-core: file layout and artifact persistence for a lens modelling pipeline
//!
//! - `PathResolver`: canonical locations of settings, logs, outputs and data under a root
//! - `codec`: JSON encoding of value trees that carry n-dimensional numeric arrays
//! - `OutputStore`: save/load of named results through the codec
//! - `json`: bounded, human-readable rendering; `archive`: zip snapshots of an entity's outputs
//!
pub mod archive;
pub mod array;
pub mod codec;
pub mod error;
pub mod json;
pub mod paths;
pub mod store;
pub mod value;

pub use array::{DType, Element, NumericArray};
pub use codec::{ARRAY_MARKER, decode, encode};
pub use error::{Error, Result};
pub use paths::PathResolver;
pub use store::OutputStore;
pub use value::Value;
