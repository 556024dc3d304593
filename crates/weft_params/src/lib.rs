//! Typed, immutable, hashable parameter records for the Weft hardware-graph library.
//!
//! A [`ParamSchema`] declares an ordered list of typed fields (required fields
//! first); a [`ParamClass`] is one validated value of that schema. Param classes
//! compare and hash by value, which makes them suitable as elaboration-cache keys
//! and as arguments to leaf components.

#![warn(missing_docs)]

pub mod class;
pub mod dtype;
pub mod error;
pub mod mapping;
pub mod schema;
pub mod value;

pub use class::ParamClass;
pub use dtype::Dtype;
pub use error::{ParamError, ValidationKind};
pub use mapping::{MapValue, ParamMap};
pub use schema::{Field, ParamSchema, SchemaBuilder};
pub use value::ParamValue;
