use crate::ast::Ast;
use crate::compile::{Context, Evaluator};
use crate::comparison::{as_number, number_value, type_name};
use crate::errors::{Error, Result};
use crate::functions::{expect_arity, put, Builder};
use serde_json::Value;
use std::collections::HashMap;

pub(crate) fn install(map: &mut HashMap<String, Builder>) {
    put(map, "add", add);
    put(map, "subtract", subtract);
    put(map, "multiply", multiply);
    put(map, "divide", divide);
    put(map, "pow", pow);
    put(map, "mod", modulo);
    put(map, "abs", abs);
    put(map, "round", round);
    put(map, "number", number);
}

/// Standard double semantics throughout. Results without a JSON
/// representation (NaN and infinities, e.g. from division by zero)
/// become null.
fn binary(
    name: &'static str,
    args: &[Ast],
    ctx: &Context,
    f: fn(f64, f64) -> f64,
) -> Result<Evaluator> {
    expect_arity(name, args, 2, 2)?;
    let lhs = ctx.compile(&args[0])?;
    let rhs = ctx.compile(&args[1])?;
    Ok(Box::new(move |input| {
        let a = lhs(input)?;
        let b = rhs(input)?;
        match (as_number(&a), as_number(&b)) {
            (Some(x), Some(y)) => Ok(number_value(f(x, y))),
            _ => Err(Error::Type {
                op: name,
                observed: type_name(if as_number(&a).is_none() { &a } else { &b }).to_string(),
            }),
        }
    }))
}

fn add(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("add", args, ctx, |a, b| a + b)
}

fn subtract(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("subtract", args, ctx, |a, b| a - b)
}

fn multiply(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("multiply", args, ctx, |a, b| a * b)
}

fn divide(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("divide", args, ctx, |a, b| a / b)
}

fn pow(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("pow", args, ctx, f64::powf)
}

fn modulo(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    binary("mod", args, ctx, |a, b| a % b)
}

fn abs(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("abs", args, 1, 1)?;
    let value = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        let v = value(input)?;
        match as_number(&v) {
            Some(x) => Ok(number_value(x.abs())),
            None => Err(Error::Type {
                op: "abs",
                observed: type_name(&v).to_string(),
            }),
        }
    }))
}

/// `round(value, digits = 0)`: half away from zero at the requested
/// decimal digit.
fn round(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("round", args, 1, 2)?;
    let value = ctx.compile(&args[0])?;
    let digits = match args.get(1) {
        Some(ast) => Some(ctx.compile(ast)?),
        None => None,
    };
    Ok(Box::new(move |input| {
        let v = value(input)?;
        let x = as_number(&v).ok_or_else(|| Error::Type {
            op: "round",
            observed: type_name(&v).to_string(),
        })?;
        let d = match &digits {
            Some(ev) => {
                let dv = ev(input)?;
                match as_number(&dv) {
                    Some(d) if d >= 0.0 && d.fract() == 0.0 => d as i32,
                    _ => {
                        return Err(Error::Type {
                            op: "round",
                            observed: "digit count that is not a non-negative integer".to_string(),
                        })
                    }
                }
            }
            None => 0,
        };
        let factor = 10f64.powi(d);
        Ok(number_value((x * factor).round() / factor))
    }))
}

/// `number(text)`: a number, or null when the text does not parse.
fn number(args: &[Ast], ctx: &Context) -> Result<Evaluator> {
    expect_arity("number", args, 1, 1)?;
    let value = ctx.compile(&args[0])?;
    Ok(Box::new(move |input| {
        Ok(match value(input)? {
            Value::Number(n) => Value::Number(n),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(number_value)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        })
    }))
}
