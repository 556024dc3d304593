//! Parametrized module generators and memoized elaboration.

use crate::context::{CallKey, Context, GeneratorKey};
use crate::errors::ElabError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use weft_ir::ModuleId;
use weft_params::{ParamClass, ParamSchema, ParamValue};

/// The body of a generator.
pub type GeneratorFn = dyn Fn(&mut Context, &ParamClass) -> Result<ModuleId, ElabError> + Send + Sync;

/// A named function from a parameter record to a module.
///
/// Generators are shared behind [`Arc`]; the cache identifies them by that
/// allocation, so two separately created generators never share results.
pub struct Generator {
    name: String,
    schema: Arc<ParamSchema>,
    func: Box<GeneratorFn>,
}

impl Generator {
    /// Creates a generator taking parameters of `schema`.
    pub fn new<F>(name: &str, schema: &Arc<ParamSchema>, func: F) -> Arc<Self>
    where
        F: Fn(&mut Context, &ParamClass) -> Result<ModuleId, ElabError> + Send + Sync + 'static,
    {
        Arc::new(Generator {
            name: name.to_string(),
            schema: Arc::clone(schema),
            func: Box::new(func),
        })
    }

    /// Creates a parameterless generator.
    pub fn without_params<F>(name: &str, func: F) -> Arc<Self>
    where
        F: Fn(&mut Context) -> Result<ModuleId, ElabError> + Send + Sync + 'static,
    {
        Arc::new(Generator {
            name: name.to_string(),
            schema: ParamClass::none().schema().clone(),
            func: Box::new(move |ctx, _| func(ctx)),
        })
    }

    /// The generator name, also the base of generated module names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter schema.
    pub fn schema(&self) -> &Arc<ParamSchema> {
        &self.schema
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("name", &self.name)
            .field("schema", &self.schema.name())
            .finish()
    }
}

impl Context {
    /// Elaborates `generator` with `params`.
    ///
    /// Calls with value-equal parameters return the same [`ModuleId`]. The
    /// returned module is named `Generator(k=v ...)` (or by a parameter hash
    /// when that would be too long) and frozen. A generator reached again
    /// with equal parameters before its first call completes fails with
    /// [`ElabError::RecursiveGenerator`].
    pub fn elaborate(
        &mut self,
        generator: &Arc<Generator>,
        params: ParamClass,
    ) -> Result<ModuleId, ElabError> {
        if params.schema() != generator.schema() {
            return Err(ElabError::WrongTargetParams {
                path: generator.name.clone(),
                target: generator.name.clone(),
                reason: format!(
                    "must be '{}', got '{}'",
                    generator.schema.name(),
                    params.schema().name()
                ),
            });
        }
        let key = CallKey {
            generator: GeneratorKey(Arc::clone(generator)),
            params,
        };
        if let Some(&id) = self.cache.get(&key) {
            debug!(generator = %generator.name, module = id.as_raw(), "generator cache hit");
            return Ok(id);
        }
        if let Some(pos) = self.call_stack.iter().position(|k| *k == key) {
            let mut cycle: Vec<String> = self.call_stack[pos..].iter().map(Context::describe).collect();
            cycle.push(Context::describe(&key));
            return Err(ElabError::RecursiveGenerator { cycle });
        }

        debug!(generator = %generator.name, "elaborating generator");
        let first_new = self.design.module_count();
        self.call_stack.push(key.clone());
        let result = (generator.func)(self, &key.params);
        self.call_stack.pop();
        let id = result?;

        let module = self.design.module(id);
        if id.as_raw() as usize >= first_new && module.local {
            let suffix = key.params.unique_name(self.options().max_readable_name);
            let name = if suffix.is_empty() {
                generator.name.clone()
            } else {
                format!("{}({suffix})", generator.name)
            };
            let name = self.design.intern(&name);
            let module = self.design.module_mut(id);
            module.name = name;
            module.local = false;
        }
        self.freeze(id)?;
        debug!(
            generator = %generator.name,
            module = %self.design.module_name(id),
            "generator elaborated"
        );
        self.cache.insert(key, id);
        Ok(id)
    }

    /// Constructs parameters from named values and elaborates `generator`.
    pub fn call<'a, I>(&mut self, generator: &Arc<Generator>, values: I) -> Result<ModuleId, ElabError>
    where
        I: IntoIterator<Item = (&'a str, ParamValue)>,
    {
        let params = ParamClass::new(generator.schema(), values)?;
        self.elaborate(generator, params)
    }
}
