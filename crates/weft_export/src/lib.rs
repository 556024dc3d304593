//! The interchange format for Weft designs.
//!
//! [`export`] turns frozen module trees into a [`Package`] of plain,
//! serializable records; [`import`] rebuilds a design from one. A module
//! instantiated in several places is written once and referenced by name,
//! and import restores that sharing.

#![warn(missing_docs)]

pub mod error;
pub mod export;
pub mod import;
pub mod records;

pub use error::ExportError;
pub use export::export;
pub use import::import;
pub use records::{
    ConnectionRecord, ExternalRecord, InstanceRecord, ModuleRecord, Package, PortRecord,
    SignalRecord, TargetRef,
};
