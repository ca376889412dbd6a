use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::comparison::{as_number, to_display_string, type_name};
use crate::errors::{Error, Result};
use crate::functions::{expect_arity, put, Builder};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn install(map: &mut HashMap<String, Builder>) {
    put(map, "split", split);
    put(map, "substring", substring);
    put(map, "string", string);
}

fn as_text(op: &'static str, v: Value) -> Result<String> {
    match v {
        Value::String(s) => Ok(s),
        other => Err(Error::Type {
            op,
            observed: type_name(&other).to_string(),
        }),
    }
}

/// `split(text, sep?)`: without a separator, trims and splits on runs
/// of whitespace. An empty separator splits into codepoints.
fn split(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("split", args, 1, 2)?;
    let text = ctx.compile(&args[0])?;
    let sep = match args.get(1) {
        Some(ast) => Some(ctx.compile(ast)?),
        None => None,
    };
    Ok(Box::new(move |input| {
        let s = as_text("split", text(input)?)?;
        let parts: Vec<Value> = match &sep {
            None => s
                .split_whitespace()
                .map(|p| Value::String(p.to_string()))
                .collect(),
            Some(ev) => {
                let sep = as_text("split", ev(input)?)?;
                if sep.is_empty() {
                    s.chars().map(|c| Value::String(c.to_string())).collect()
                } else {
                    s.split(sep.as_str())
                        .map(|p| Value::String(p.to_string()))
                        .collect()
                }
            }
        };
        Ok(Value::Array(parts))
    }))
}

/// `substring(text, start, end?)`: codepoint indices; a negative start
/// clamps to 0, the end clamps to the length.
fn substring(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("substring", args, 2, 3)?;
    let text = ctx.compile(&args[0])?;
    let start = ctx.compile(&args[1])?;
    let end = match args.get(2) {
        Some(ast) => Some(ctx.compile(ast)?),
        None => None,
    };
    Ok(Box::new(move |input| {
        let s = as_text("substring", text(input)?)?;
        let bound = |v: Value| -> Result<f64> {
            as_number(&v).ok_or_else(|| Error::Type {
                op: "substring",
                observed: type_name(&v).to_string(),
            })
        };
        let chars: Vec<char> = s.chars().collect();
        let len = chars.len();
        let from = (bound(start(input)?)?.max(0.0) as usize).min(len);
        let to = match &end {
            Some(ev) => (bound(ev(input)?)?.max(0.0) as usize).min(len),
            None => len,
        };
        if to <= from {
            return Ok(Value::String(String::new()));
        }
        Ok(Value::String(chars[from..to].iter().collect()))
    }))
}

/// `string(x)`: canonical text form of any value.
fn string(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("string", args, 1, 1)?;
    let value = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        Ok(Value::String(to_display_string(&value(input)?)))
    }))
}
