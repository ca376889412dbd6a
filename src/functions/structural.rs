use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::errors::{Error, Result};
use crate::functions::{put, Builder};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn install(map: &mut HashMap<String, Builder>) {
    put(map, "pipe", pipe);
    put(map, "array", array);
    put(map, "get", get);
}

/// `a | b | c`: apply each stage to the previous stage's result.
/// The empty pipe is the identity.
fn pipe(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    let stages = args
        .iter()
        .map(|a| ctx.compile(a))
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(move |input| {
        let mut current = input.clone();
        for stage in &stages {
            current = stage(&current)?;
        }
        Ok(current)
    }))
}

/// `[e1, e2, ...]`: every element evaluated against the same input.
fn array(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    let elements = args
        .iter()
        .map(|a| ctx.compile(a))
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(move |input| {
        elements
            .iter()
            .map(|el| el(input))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }))
}

/// `{k1: e1, ...}`: declared key order, siblings all see the original
/// input. Reached through the compiler rather than the registry because
/// its arguments are key/query pairs, not a plain argument list.
pub(crate) fn object(pairs: &[(String, Ast)], ctx: &Context) -> Result<Evaluator> {
    let fields = pairs
        .iter()
        .map(|(k, v)| Ok((k.clone(), ctx.compile(v)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(move |input| {
        let mut map = serde_json::Map::new();
        for (key, field) in &fields {
            map.insert(key.clone(), field(input)?);
        }
        Ok(Value::Object(map))
    }))
}

/// One step of a property path. Object lookups go by name; array
/// lookups need the key to read as a non-negative integer.
#[derive(Debug, Clone)]
pub(crate) struct PathKey {
    name: String,
    index: Option<usize>,
}

impl PathKey {
    fn from_ast(op: &'static str, arg: &Ast) -> Result<PathKey> {
        match arg {
            Ast::Literal(Value::String(s)) => Ok(PathKey {
                index: s.parse::<usize>().ok(),
                name: s.clone(),
            }),
            Ast::Literal(Value::Number(n)) => Ok(PathKey {
                name: n.to_string(),
                index: n.as_u64().and_then(|i| usize::try_from(i).ok()),
            }),
            other => Err(Error::Type {
                op,
                observed: format!("non-literal path key {other:?}"),
            }),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

/// Extracts the literal key list from a `get` call. `pick` and `exists`
/// accept only property paths, not arbitrary sub-queries.
pub(crate) fn literal_path(op: &'static str, ast: &Ast) -> Result<Vec<PathKey>> {
    match ast {
        Ast::Function { name, args } if name == "get" => {
            args.iter().map(|a| PathKey::from_ast(op, a)).collect()
        }
        _ => Err(Error::Type {
            op,
            observed: "argument that is not a property path".to_string(),
        }),
    }
}

/// Walks a path. A step that does not apply yields nothing, and with it
/// every later step.
pub(crate) fn walk_path<'v>(input: &'v Value, keys: &[PathKey]) -> Option<&'v Value> {
    let mut current = input;
    for key in keys {
        current = match current {
            Value::Object(map) => map.get(key.name())?,
            Value::Array(arr) => arr.get(key.index?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `.a.b."c"`: navigate by a literal path; absent keys yield null
/// rather than an error.
fn get(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    let keys = args
        .iter()
        .map(|a| PathKey::from_ast("get", a))
        .collect::<Result<Vec<_>>>()?;
    Ok(Box::new(move |input| {
        Ok(walk_path(input, &keys).cloned().unwrap_or(Value::Null))
    }))
}

/// Compiles an optional argument, defaulting to the identity (`get()`).
pub(crate) fn compile_or_identity(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    match args.first() {
        Some(ast) => ctx.compile(ast),
        None => Ok(Box::new(|input| Ok(input.clone()))),
    }
}
