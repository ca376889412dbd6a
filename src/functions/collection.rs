use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::comparison::{
    as_number, is_truthy, number_value, to_display_string, type_name, value_cmp, value_eq,
};
use crate::errors::{Error, Result};
use crate::functions::structural::{compile_or_identity, literal_path, walk_path, PathKey};
use crate::functions::{expect_arity, put, Builder};
use itertools::Itertools;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

pub(crate) fn install(map: &mut HashMap<String, Builder>) {
    put(map, "map", map_fn);
    put(map, "filter", filter);
    put(map, "sort", sort);
    put(map, "reverse", reverse);
    put(map, "pick", pick);
    put(map, "groupBy", group_by);
    put(map, "keyBy", key_by);
    put(map, "flatten", flatten);
    put(map, "join", join);
    put(map, "uniq", uniq);
    put(map, "uniqBy", uniq_by);
    put(map, "limit", limit);
    put(map, "size", size);
    put(map, "keys", keys);
    put(map, "values", values);
    put(map, "sum", sum);
    put(map, "prod", prod);
    put(map, "average", average);
    put(map, "min", min);
    put(map, "max", max);
}

fn as_array<'v>(op: &'static str, v: &'v Value) -> Result<&'v Vec<Value>> {
    match v {
        Value::Array(arr) => Ok(arr),
        other => Err(Error::Type {
            op,
            observed: type_name(other).to_string(),
        }),
    }
}

fn map_fn(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("map", args, 1, 1)?;
    let cb = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("map", input)?;
        arr.iter().map(|el| cb(el)).collect::<Result<Vec<_>>>().map(Value::Array)
    }))
}

fn filter(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("filter", args, 1, 1)?;
    let cb = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("filter", input)?;
        let mut out = Vec::new();
        for el in arr {
            if is_truthy(&cb(el)?) {
                out.push(el.clone());
            }
        }
        Ok(Value::Array(out))
    }))
}

/// `sort(path?, dir?)`: stable; pairs that don't order (mixed types)
/// keep their input order.
fn sort(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("sort", args, 0, 2)?;
    let key = compile_or_identity(args, ctx)?;
    let descending = match args.get(1) {
        None => false,
        Some(arg) => match arg.as_literal_str() {
            Some("asc") => false,
            Some("desc") => true,
            _ => {
                return Err(Error::Type {
                    op: "sort",
                    observed: "direction other than \"asc\" or \"desc\"".to_string(),
                })
            }
        },
    };
    Ok(Box::new(move |input| {
        let arr = as_array("sort", input)?;
        let mut keyed = arr
            .iter()
            .map(|el| Ok((key(el)?, el.clone())))
            .collect::<Result<Vec<_>>>()?;
        // Insertion sort: stable, and safe under the partial ordering;
        // incomparable pairs (mixed types) simply do not move.
        for i in 1..keyed.len() {
            let mut j = i;
            while j > 0 {
                let ord = value_cmp(&keyed[j - 1].0, &keyed[j].0).unwrap_or(Ordering::Equal);
                let ord = if descending { ord.reverse() } else { ord };
                if ord != Ordering::Greater {
                    break;
                }
                keyed.swap(j - 1, j);
                j -= 1;
            }
        }
        Ok(Value::Array(keyed.into_iter().map(|(_, el)| el).collect()))
    }))
}

fn reverse(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("reverse", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let arr = as_array("reverse", input)?;
        Ok(Value::Array(arr.iter().rev().cloned().collect()))
    }))
}

/// `pick(.a, .b.c, ...)`: keeps the named properties, keyed by the last
/// path segment. Arrays are mapped element-wise.
fn pick(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("pick", args, 1, usize::MAX)?;
    let mut paths = Vec::with_capacity(args.len());
    for arg in args {
        let keys = literal_path("pick", arg)?;
        let last = keys
            .last()
            .ok_or_else(|| Error::Type {
                op: "pick",
                observed: "empty property path".to_string(),
            })?
            .name()
            .to_string();
        paths.push((last, keys));
    }
    fn pick_object(paths: &[(String, Vec<PathKey>)], v: &Value) -> Value {
        let mut out = serde_json::Map::new();
        for (name, keys) in paths {
            let picked = walk_path(v, keys).cloned().unwrap_or(Value::Null);
            out.insert(name.clone(), picked);
        }
        Value::Object(out)
    }
    Ok(Box::new(move |input| match input {
        Value::Array(arr) => Ok(Value::Array(
            arr.iter().map(|el| pick_object(&paths, el)).collect(),
        )),
        Value::Object(_) => Ok(pick_object(&paths, input)),
        other => Err(Error::Type {
            op: "pick",
            observed: type_name(other).to_string(),
        }),
    }))
}

fn group_by(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("groupBy", args, 1, 1)?;
    let key = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("groupBy", input)?;
        let mut groups = serde_json::Map::new();
        for el in arr {
            let k = to_display_string(&key(el)?);
            let members = groups
                .entry(k)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(members) = members {
                members.push(el.clone());
            }
        }
        Ok(Value::Object(groups))
    }))
}

fn key_by(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("keyBy", args, 1, 1)?;
    let key = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("keyBy", input)?;
        let mut out = serde_json::Map::new();
        for el in arr {
            let k = to_display_string(&key(el)?);
            // First occurrence wins; later collisions are ignored.
            out.entry(k).or_insert_with(|| el.clone());
        }
        Ok(Value::Object(out))
    }))
}

fn flatten(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("flatten", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let arr = as_array("flatten", input)?;
        let mut out = Vec::new();
        for el in arr {
            match el {
                Value::Array(inner) => out.extend(inner.iter().cloned()),
                other => out.push(other.clone()),
            }
        }
        Ok(Value::Array(out))
    }))
}

fn join(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("join", args, 0, 1)?;
    let sep = match args.first() {
        Some(ast) => Some(ctx.compile(ast)?),
        None => None,
    };
    Ok(Box::new(move |input| {
        let arr = as_array("join", input)?;
        let sep = match &sep {
            Some(ev) => to_display_string(&ev(input)?),
            None => String::new(),
        };
        Ok(Value::String(
            arr.iter().map(to_display_string).join(&sep),
        ))
    }))
}

fn uniq(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("uniq", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let arr = as_array("uniq", input)?;
        let mut out: Vec<Value> = Vec::new();
        for el in arr {
            if !out.iter().any(|seen| value_eq(seen, el)) {
                out.push(el.clone());
            }
        }
        Ok(Value::Array(out))
    }))
}

fn uniq_by(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("uniqBy", args, 1, 1)?;
    let key = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("uniqBy", input)?;
        let mut seen: Vec<Value> = Vec::new();
        let mut out = Vec::new();
        for el in arr {
            let k = key(el)?;
            if !seen.iter().any(|s| value_eq(s, &k)) {
                seen.push(k);
                out.push(el.clone());
            }
        }
        Ok(Value::Array(out))
    }))
}

fn limit(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("limit", args, 1, 1)?;
    let count = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let arr = as_array("limit", input)?;
        let n = match as_number(&count(input)?) {
            Some(f) => f.max(0.0) as usize,
            None => {
                return Err(Error::Type {
                    op: "limit",
                    observed: "non-numeric count".to_string(),
                })
            }
        };
        Ok(Value::Array(arr.iter().take(n).cloned().collect()))
    }))
}

fn size(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("size", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let n = match input {
            Value::Array(arr) => arr.len(),
            Value::Object(map) => map.len(),
            Value::String(s) => s.chars().count(),
            other => {
                return Err(Error::Type {
                    op: "size",
                    observed: type_name(other).to_string(),
                })
            }
        };
        Ok(number_value(n as f64))
    }))
}

fn keys(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("keys", args, 0, 0)?;
    Ok(Box::new(move |input| match input {
        Value::Object(map) => Ok(Value::Array(
            map.keys().map(|k| Value::String(k.clone())).collect(),
        )),
        other => Err(Error::Type {
            op: "keys",
            observed: type_name(other).to_string(),
        }),
    }))
}

fn values(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("values", args, 0, 0)?;
    Ok(Box::new(move |input| match input {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        other => Err(Error::Type {
            op: "values",
            observed: type_name(other).to_string(),
        }),
    }))
}

fn numeric_items(op: &'static str, arr: &[Value]) -> Result<Vec<f64>> {
    arr.iter()
        .map(|el| {
            as_number(el).ok_or_else(|| Error::Type {
                op,
                observed: type_name(el).to_string(),
            })
        })
        .collect()
}

fn sum(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("sum", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let nums = numeric_items("sum", as_array("sum", input)?)?;
        Ok(number_value(nums.iter().sum()))
    }))
}

fn prod(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("prod", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let nums = numeric_items("prod", as_array("prod", input)?)?;
        Ok(number_value(nums.iter().product()))
    }))
}

fn average(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("average", args, 0, 0)?;
    Ok(Box::new(move |input| {
        let nums = numeric_items("average", as_array("average", input)?)?;
        if nums.is_empty() {
            return Ok(Value::Null);
        }
        Ok(number_value(nums.iter().sum::<f64>() / nums.len() as f64))
    }))
}

/// `min`/`max` hand back the original element so integer representation
/// survives the fold.
fn extremum(op: &'static str, pick_greater: bool) -> impl Fn(&Value) -> Result<Value> {
    move |input: &Value| {
        let arr = as_array(op, input)?;
        let nums = numeric_items(op, arr)?;
        let mut best: Option<usize> = None;
        for (i, n) in nums.iter().enumerate() {
            let better = match best {
                None => true,
                Some(b) => {
                    if pick_greater {
                        *n > nums[b]
                    } else {
                        *n < nums[b]
                    }
                }
            };
            if better {
                best = Some(i);
            }
        }
        Ok(best.map(|i| arr[i].clone()).unwrap_or(Value::Null))
    }
}

fn min(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("min", args, 0, 0)?;
    Ok(Box::new(extremum("min", false)))
}

fn max(args: &[Ast], _ctx: &Context) -> Result<Evaluator> {
    expect_arity("max", args, 0, 0)?;
    Ok(Box::new(extremum("max", true)))
}
