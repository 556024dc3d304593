//! Elaboration for the Weft hardware-graph library.
//!
//! A [`Context`] owns the [`weft_ir::Design`] under construction and offers:
//!
//! - a module-building API (ports, signals, instances, literals) accepting
//!   both call-style and assignment-style connections,
//! - memoized [`Generator`] elaboration with recursion detection,
//! - the bundle resolver (typed and anonymous bundles, roles, flipping),
//! - the connectivity validator run by [`Context::freeze`].

#![warn(missing_docs)]

pub mod builder;
pub mod bundle;
pub mod context;
pub mod errors;
pub mod generator;
pub mod handles;
pub mod validate;

pub use context::Context;
pub use errors::ElabError;
pub use generator::Generator;
pub use handles::{BundleRef, Connectable, InstanceRef, SignalRef};
