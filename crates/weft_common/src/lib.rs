//! Shared foundational types used across the Weft hardware-graph library.
//!
//! This crate provides interned identifiers, content hashing, metric-prefixed
//! decimal quantities and the [`Scalar`] parameter value built on top of them.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;
pub mod prefix;
pub mod scalar;

pub use hash::ContentHash;
pub use ident::{Ident, Interner};
pub use prefix::{ParsePrefixedError, Prefix, Prefixed};
pub use scalar::{Literal, Scalar};
