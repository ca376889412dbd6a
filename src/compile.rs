use crate::ast::Ast;
use crate::errors::{Error, Result};
use crate::functions::{structural, Registry};
use crate::operators::OperatorTable;
use crate::Options;
use serde_json::Value;

/// A compiled query: a pure function from input data to output data.
///
/// Evaluators never mutate their input and may be reused and shared
/// freely; every sub-query they need was compiled up front, so running
/// one performs no table lookups.
pub type Evaluator = Box<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// The effective function and operator tables for a single compile.
///
/// A context lives exactly as long as one call to [`crate::compile`].
/// Builders that accept sub-queries re-enter through [`Context::compile`]
/// and therefore see the same tables as their parent, including any
/// per-compile extensions.
pub struct Context {
    functions: Registry,
    operators: OperatorTable,
}

impl Context {
    pub(crate) fn new(options: &Options) -> Context {
        let mut functions = Registry::with_builtins();
        for (name, builder) in &options.functions {
            functions.register(name, builder.clone());
        }
        Context {
            functions,
            operators: OperatorTable::with_custom(&options.operators),
        }
    }

    /// Lowers an AST into an evaluator using this context's tables.
    pub fn compile(&self, ast: &Ast) -> Result<Evaluator> {
        match ast {
            Ast::Literal(v) => {
                let v = v.clone();
                Ok(Box::new(move |_| Ok(v.clone())))
            }
            // Pipe and array construction go through the registry so
            // user functions can shadow them like any other name.
            Ast::Pipe(items) => self.call("pipe", items),
            Ast::Array(items) => self.call("array", items),
            Ast::Object(pairs) => structural::object(pairs, self),
            Ast::Function { name, args } => self.call(name, args),
        }
    }

    fn call(&self, name: &str, args: &[Ast]) -> Result<Evaluator> {
        tracing::trace!(function = name, "compiling call");
        let builder = self
            .functions
            .get(name)
            .ok_or_else(|| Error::UnknownFunction {
                name: name.to_string(),
            })?;
        builder(args, self)
    }

    pub(crate) fn operators(&self) -> &OperatorTable {
        &self.operators
    }
}
