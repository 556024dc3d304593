//! Mutable elaboration state.
//!
//! [`Context`] owns the [`Design`] under construction, the generator cache
//! (keyed by generator identity and parameter value), the active generator
//! call stack used for recursion detection, and the stack of modules being
//! frozen used for circular-instance detection.

use crate::errors::ElabError;
use crate::generator::Generator;
use crate::handles::InstanceRef;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use weft_config::{ElabOptions, WeftConfig};
use weft_ir::{Design, ModuleId};
use weft_params::ParamClass;

/// A generator compared and hashed by identity.
///
/// Holding the `Arc` keeps the generator alive, so its address cannot be
/// reused by another generator while the cache entry exists.
#[derive(Clone)]
pub(crate) struct GeneratorKey(pub(crate) Arc<Generator>);

impl PartialEq for GeneratorKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for GeneratorKey {}

impl Hash for GeneratorKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

/// Cache key: generator identity plus parameter value.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct CallKey {
    pub(crate) generator: GeneratorKey,
    pub(crate) params: ParamClass,
}

/// Elaboration session state.
pub struct Context {
    /// The design being built.
    pub design: Design,
    options: ElabOptions,
    pub(crate) cache: HashMap<CallKey, ModuleId>,
    pub(crate) call_stack: Vec<CallKey>,
    pub(crate) freezing: Vec<ModuleId>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Creates a context with default options.
    pub fn new() -> Self {
        Self::with_options(ElabOptions::default())
    }

    /// Creates a context with explicit options.
    pub fn with_options(options: ElabOptions) -> Self {
        Context {
            design: Design::new(),
            options,
            cache: HashMap::new(),
            call_stack: Vec::new(),
            freezing: Vec::new(),
        }
    }

    /// Creates a context from a loaded `weft.toml`.
    pub fn from_config(config: &WeftConfig) -> Self {
        Self::with_options(config.elaborate.clone())
    }

    /// The options in effect.
    pub fn options(&self) -> &ElabOptions {
        &self.options
    }

    /// Number of cached generator results.
    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    /// Returns `true` while a generator body is executing.
    pub fn in_generator(&self) -> bool {
        !self.call_stack.is_empty()
    }

    /// Consumes the context, returning the design.
    pub fn into_design(self) -> Design {
        self.design
    }

    /// Fails if `module` is frozen.
    pub(crate) fn ensure_open(&self, module: ModuleId) -> Result<(), ElabError> {
        if self.design.module(module).frozen {
            return Err(ElabError::Frozen {
                module: self.design.module_name(module).to_string(),
            });
        }
        Ok(())
    }

    /// `Module.name`, for diagnostics.
    pub(crate) fn path(&self, module: ModuleId, name: &str) -> String {
        format!("{}.{}", self.design.module_name(module), name)
    }

    /// `Module.instance`, for diagnostics.
    pub(crate) fn instance_path(&self, inst: InstanceRef) -> String {
        let m = self.design.module(inst.module);
        self.path(inst.module, self.design.resolve(m.instances[inst.id].name))
    }

    /// Human-readable rendering of a generator call.
    pub(crate) fn describe(key: &CallKey) -> String {
        if key.params.values().is_empty() {
            key.generator.0.name().to_string()
        } else {
            format!("{}({})", key.generator.0.name(), key.params.unique_name(usize::MAX))
        }
    }
}
