//! The technology-mapping interface.

use crate::error::PdkError;
use indexmap::IndexMap;
use weft_config::Installation;
use weft_ir::{ExternalModule, PrimitiveCall};
use weft_params::ParamClass;

/// An external-module instance template produced for one primitive call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalMapping {
    /// The technology module replacing the primitive.
    pub module: ExternalModule,
    /// Parameters for `module`, of its schema (or `NoParams` when it has none).
    pub params: ParamClass,
    /// Primitive port name to external port name; unlisted ports keep their names.
    pub ports: IndexMap<String, String>,
}

impl ExternalMapping {
    /// A mapping onto `module` with ports of the same names.
    pub fn new(module: ExternalModule, params: ParamClass) -> Self {
        ExternalMapping {
            module,
            params,
            ports: IndexMap::new(),
        }
    }

    /// Renames primitive port `from` to external port `to`.
    pub fn rename(mut self, from: &str, to: &str) -> Self {
        self.ports.insert(from.to_string(), to.to_string());
        self
    }

    /// The external port name for primitive port `port`.
    pub fn port<'a>(&'a self, port: &'a str) -> &'a str {
        self.ports.get(port).map(String::as_str).unwrap_or(port)
    }
}

/// What a technology does with one primitive call.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    /// Replace the primitive with an external module instance.
    External(ExternalMapping),
    /// Leave the primitive in place, as for ideal sources understood by every simulator.
    Keep,
}

/// A process technology.
///
/// `map_primitive` must be deterministic: the compiler calls it at most once
/// per distinct primitive call and reuses the answer.
pub trait Pdk {
    /// Technology name, used in diagnostics.
    fn name(&self) -> &str;

    /// Maps a primitive call, or returns `None` if the technology has no equivalent.
    fn map_primitive(&self, call: &PrimitiveCall) -> Result<Option<Mapping>, PdkError>;

    /// Checks that site installation data has what this technology needs.
    fn check_installation(&self, install: &Installation) -> Result<(), PdkError> {
        let _ = install;
        Ok(())
    }
}

/// A [`Pdk`] backed by a closure.
pub struct FnPdk<F> {
    name: String,
    func: F,
}

/// Wraps a mapping closure as a [`Pdk`].
pub fn pdk_fn<F>(name: &str, func: F) -> FnPdk<F>
where
    F: Fn(&PrimitiveCall) -> Result<Option<Mapping>, PdkError>,
{
    FnPdk {
        name: name.to_string(),
        func,
    }
}

impl<F> Pdk for FnPdk<F>
where
    F: Fn(&PrimitiveCall) -> Result<Option<Mapping>, PdkError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn map_primitive(&self, call: &PrimitiveCall) -> Result<Option<Mapping>, PdkError> {
        (self.func)(call)
    }
}

impl<F> std::fmt::Debug for FnPdk<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnPdk").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_ir::{Direction, PrimitiveKind};

    #[test]
    fn renamed_ports_fall_back_to_identity() {
        let module = ExternalModule::new("lib", "res")
            .port("plus", 1, Direction::Undirected)
            .port("n", 1, Direction::Undirected);
        let mapping = ExternalMapping::new(module, ParamClass::none()).rename("p", "plus");
        assert_eq!(mapping.port("p"), "plus");
        assert_eq!(mapping.port("n"), "n");
    }

    #[test]
    fn closure_pdk_delegates() {
        let pdk = pdk_fn("keep-all", |_| Ok(Some(Mapping::Keep)));
        let call = PrimitiveKind::Short.call([]).unwrap();
        assert_eq!(pdk.name(), "keep-all");
        assert_eq!(pdk.map_primitive(&call).unwrap(), Some(Mapping::Keep));
        assert!(pdk.check_installation(&Installation::new()).is_ok());
    }
}
