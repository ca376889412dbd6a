use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::errors::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub mod arithmetic;
pub mod collection;
pub mod logic;
pub mod strings;
pub mod structural;

/// A function builder: given argument ASTs and the compile context, it
/// compiles its sub-queries once and returns an evaluator that closes
/// over them.
pub type Builder = Arc<dyn Fn(&[Ast], &Context) -> Result<Evaluator> + Send + Sync>;

/// Thread-safe function table mapping names to builders.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<String, Builder>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The core standard library.
    pub fn with_builtins() -> Self {
        let mut map: HashMap<String, Builder> = HashMap::new();
        structural::install(&mut map);
        collection::install(&mut map);
        arithmetic::install(&mut map);
        logic::install(&mut map);
        strings::install(&mut map);
        Self {
            inner: Arc::new(map),
        }
    }

    /// Registers a builder, shadowing any existing entry with that name.
    pub fn register(&mut self, name: &str, builder: Builder) {
        let map = Arc::make_mut(&mut self.inner);
        map.insert(name.to_string(), builder);
    }

    pub fn get(&self, name: &str) -> Option<Builder> {
        self.inner.get(name).cloned()
    }
}

/// Wraps a plain value-level function into a builder that compiles its
/// arguments and applies them to the input before calling the function.
///
/// ```
/// use jsonquery::{build_function, query, Options};
/// use serde_json::json;
///
/// let double = build_function(|args| {
///     Ok(json!(args[0].as_f64().unwrap_or(0.0) * 2.0))
/// });
/// let options = Options::new().function("double", double);
/// let out = query(&json!({"x": 21}), "double(.x)", &options).unwrap();
/// assert_eq!(out, json!(42.0));
/// ```
pub fn build_function<F>(f: F) -> Builder
where
    F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |args: &[Ast], ctx: &Context| {
        let compiled = args
            .iter()
            .map(|a| ctx.compile(a))
            .collect::<Result<Vec<_>>>()?;
        let f = Arc::clone(&f);
        Ok(Box::new(move |input: &Value| {
            let values = compiled
                .iter()
                .map(|arg| arg(input))
                .collect::<Result<Vec<_>>>()?;
            f(&values)
        }))
    })
}

/// Argument-count check shared by the core builders.
pub(crate) fn expect_arity(name: &str, args: &[Ast], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if max == usize::MAX {
            format!("at least {min}")
        } else if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        return Err(Error::arity(name, expected, args.len()));
    }
    Ok(())
}

/// Shorthand for inserting a plain builder function into the table.
pub(crate) fn put(
    map: &mut HashMap<String, Builder>,
    name: &str,
    builder: fn(&[Ast], &Context) -> Result<Evaluator>,
) {
    map.insert(name.to_string(), Arc::new(builder));
}
