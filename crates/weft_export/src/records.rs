//! Interchange records.
//!
//! Records carry names rather than IDs and contain only flattened signals:
//! bundle ports appear as their member ports (`bus.data`, ...), and every
//! instance connection is at signal level, in target port order.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use weft_ir::Direction;
use weft_params::ParamMap;

/// A port of a module or external module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Port name.
    pub name: String,
    /// Direction.
    pub direction: Direction,
    /// Bit width.
    pub width: u32,
}

/// An internal signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Signal name.
    pub name: String,
    /// Bit width.
    pub width: u32,
}

/// What an instance refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetRef {
    /// A module record of the same package.
    Module {
        /// Module record name.
        name: String,
    },
    /// An external module listed in the package.
    External {
        /// External domain.
        domain: String,
        /// External name.
        name: String,
        /// Parameter values.
        params: ParamMap,
    },
    /// A primitive left in place.
    Primitive {
        /// Primitive name, such as `Mos`.
        name: String,
        /// Parameter values.
        params: ParamMap,
    },
}

/// One signal-level connection of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Target port name.
    pub port: String,
    /// Signal or port of the enclosing module.
    pub signal: String,
}

/// An instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance name.
    pub name: String,
    /// What is instantiated.
    pub target: TargetRef,
    /// Connections in target port order.
    pub connections: Vec<ConnectionRecord>,
}

/// A module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    /// Unique name within the package.
    pub name: String,
    /// Ports in declaration order.
    pub ports: Vec<PortRecord>,
    /// Internal signals in declaration order.
    pub signals: Vec<SignalRecord>,
    /// Instances in declaration order.
    pub instances: Vec<InstanceRecord>,
    /// Pass-through text in insertion order.
    pub literals: Vec<String>,
}

/// An external module definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRecord {
    /// Domain.
    pub domain: String,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub desc: String,
    /// Ports in order.
    pub ports: Vec<PortRecord>,
}

/// A self-contained set of module records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package domain.
    #[serde(default)]
    pub domain: String,
    /// Modules, each after every module it instantiates.
    pub modules: Vec<ModuleRecord>,
    /// External modules referenced by instances.
    #[serde(default)]
    pub externals: Vec<ExternalRecord>,
    /// Names of the top-level modules.
    pub tops: Vec<String>,
}

impl Package {
    /// Finds a module record by name.
    pub fn module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Encodes the package as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes a package from JSON.
    pub fn from_json(text: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(text)?)
    }
}
