//! Externally defined leaf modules.

use crate::direction::Direction;
use crate::error::IrError;
use std::sync::Arc;
use weft_params::ParamSchema;

/// One port of an [`ExternalModule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name.
    pub name: String,
    /// Bit width.
    pub width: u32,
    /// Direction.
    pub direction: Direction,
}

/// A leaf implemented outside the design, such as a PDK device.
///
/// A design holds at most one external module per `(domain, name)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalModule {
    /// Module name as known to downstream tools.
    pub name: String,
    /// Namespace the name lives in, such as a PDK name.
    pub domain: String,
    /// Free-form description.
    pub desc: String,
    /// Ports in order.
    pub ports: Vec<PortSpec>,
    /// Parameter schema; `None` accepts any parameter record.
    pub schema: Option<Arc<ParamSchema>>,
}

impl ExternalModule {
    /// Creates an external module with no ports.
    pub fn new(domain: impl Into<String>, name: impl Into<String>) -> Self {
        ExternalModule {
            name: name.into(),
            domain: domain.into(),
            desc: String::new(),
            ports: Vec::new(),
            schema: None,
        }
    }

    /// Appends a port.
    pub fn port(mut self, name: &str, width: u32, direction: Direction) -> Self {
        self.ports.push(PortSpec {
            name: name.to_string(),
            width,
            direction,
        });
        self
    }

    /// Sets the description.
    pub fn desc(mut self, desc: &str) -> Self {
        self.desc = desc.to_string();
        self
    }

    /// Sets the parameter schema.
    pub fn params(mut self, schema: &Arc<ParamSchema>) -> Self {
        self.schema = Some(Arc::clone(schema));
        self
    }

    /// Looks up a port by name.
    pub fn find_port(&self, name: &str) -> Option<&PortSpec> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Checks port names are unique and widths nonzero.
    pub fn validate(&self) -> Result<(), IrError> {
        for (i, port) in self.ports.iter().enumerate() {
            if port.width == 0 {
                return Err(IrError::ZeroWidth {
                    owner: self.name.clone(),
                    name: port.name.clone(),
                });
            }
            if self.ports[..i].iter().any(|p| p.name == port.name) {
                return Err(IrError::DuplicateMember {
                    owner: self.name.clone(),
                    member: port.name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_and_lookup() {
        let m = ExternalModule::new("sample", "nmos")
            .desc("Sample NMOS")
            .port("d", 1, Direction::Inout)
            .port("g", 1, Direction::Inout);
        assert_eq!(m.find_port("g").map(|p| p.width), Some(1));
        assert!(m.find_port("x").is_none());
        assert!(m.validate().is_ok());
    }

    #[test]
    fn duplicate_port_rejected() {
        let m = ExternalModule::new("d", "x")
            .port("a", 1, Direction::Input)
            .port("a", 1, Direction::Output);
        assert!(matches!(m.validate(), Err(IrError::DuplicateMember { .. })));
    }
}
