use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::comparison::{is_truthy, value_cmp, value_eq};
use crate::errors::{Error, Result};
use crate::functions::structural::{literal_path, walk_path};
use crate::functions::{expect_arity, put, Builder};
use regex::RegexBuilder;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

pub(crate) fn install(map: &mut HashMap<String, Builder>) {
    put(map, "eq", eq);
    put(map, "ne", ne);
    put(map, "gt", gt);
    put(map, "gte", gte);
    put(map, "lt", lt);
    put(map, "lte", lte);
    put(map, "and", and);
    put(map, "or", or);
    put(map, "not", not);
    put(map, "if", if_fn);
    put(map, "exists", exists);
    put(map, "in", in_fn);
    put(map, "not in", not_in);
    put(map, "regex", regex_fn);
}

fn eq(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("eq", args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        Ok(Value::Bool(value_eq(&lhs(input)?, &rhs(input)?)))
    }))
}

fn ne(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("ne", args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        Ok(Value::Bool(!value_eq(&lhs(input)?, &rhs(input)?)))
    }))
}

/// Ordering comparisons are false whenever the two values do not order
/// (mixed or composite types).
fn ordering(
    name: &'static str,
    args: &[Ast],
    ctx: &Context,
    pred: fn(Ordering) -> bool,
) -> Result<Evaluator> {
    expect_arity(name, args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        let hit = value_cmp(&lhs(input)?, &rhs(input)?)
            .map(pred)
            .unwrap_or(false);
        Ok(Value::Bool(hit))
    }))
}

fn gt(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    ordering("gt", args, ctx, Ordering::is_gt)
}

fn gte(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    ordering("gte", args, ctx, Ordering::is_ge)
}

fn lt(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    ordering("lt", args, ctx, Ordering::is_lt)
}

fn lte(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    ordering("lte", args, ctx, Ordering::is_le)
}

// `and`/`or` are eager: both operands always evaluate, and the result
// is a plain boolean over truthiness.

fn and(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("and", args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        let l = is_truthy(&lhs(input)?);
        let r = is_truthy(&rhs(input)?);
        Ok(Value::Bool(l && r))
    }))
}

fn or(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("or", args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        let l = is_truthy(&lhs(input)?);
        let r = is_truthy(&rhs(input)?);
        Ok(Value::Bool(l || r))
    }))
}

fn not(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("not", args, 1, 1)?;
    let value = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        Ok(Value::Bool(!is_truthy(&value(input)?)))
    }))
}

fn if_fn(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("if", args, 3, 3)?;
    let cond = ctx.compile(&args[0])?;
    let then_branch = ctx.compile(&args[1])?;
    let else_branch = ctx.compile(&args[2])?;
    Ok(Box::new(move |input| {
        if is_truthy(&cond(input)?) {
            then_branch(input)
        } else {
            else_branch(input)
        }
    }))
}

/// `exists(.a.b)`: true iff the final key is present on its parent.
/// Presence is distinct from null-ness: `{"a": null}` has `a`.
fn exists(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("exists", args, 1, 1)?;
    let mut keys = literal_path("exists", &args[0])?;
    let last = keys.pop().ok_or_else(|| Error::Type {
        op: "exists",
        observed: "empty property path".to_string(),
    })?;
    Ok(Box::new(move |input| {
        let present = match walk_path(input, &keys) {
            Some(Value::Object(map)) => map.contains_key(last.name()),
            _ => false,
        };
        Ok(Value::Bool(present))
    }))
}

fn membership(name: &'static str, args: &[Ast], ctx: &Context, negate: bool) -> Result<Evaluator> {
    expect_arity(name, args, 2, 2)?;
    let needle = ctx.compile(&args[0])?;
    let haystack = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        let v = needle(input)?;
        let found = match haystack(input)? {
            Value::Array(items) => items.iter().any(|el| value_eq(el, &v)),
            _ => false,
        };
        Ok(Value::Bool(found != negate))
    }))
}

fn in_fn(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    membership("in", args, ctx, false)
}

fn not_in(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    membership("not in", args, ctx, true)
}

/// `regex(path, pattern, flags?)`: the pattern and flags must be
/// literals; the regex is compiled once, at build time. A non-string
/// target tests false.
fn regex_fn(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("regex", args, 2, 3)?;
    let target = ctx.compile(&args[0])?;
    let pattern = args[1].as_literal_str().ok_or_else(|| Error::Type {
        op: "regex",
        observed: "non-literal pattern".to_string(),
    })?;
    let mut builder = RegexBuilder::new(pattern);
    if let Some(flags) = args.get(2) {
        let flags = flags.as_literal_str().ok_or_else(|| Error::Type {
            op: "regex",
            observed: "non-literal flags".to_string(),
        })?;
        for flag in flags.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'u' => &mut builder, // Unicode is the default
                other => {
                    return Err(Error::Type {
                        op: "regex",
                        observed: format!("unsupported flag '{other}'"),
                    })
                }
            };
        }
    }
    let re = builder.build().map_err(|e| Error::Type {
        op: "regex",
        observed: format!("invalid pattern: {e}"),
    })?;
    Ok(Box::new(move |input| {
        let hit = match target(input)? {
            Value::String(s) => re.is_match(&s),
            _ => false,
        };
        Ok(Value::Bool(hit))
    }))
}
