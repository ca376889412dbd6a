use crate::ast::Ast;
use crate::operators::{OperatorTable, Precedence};
use crate::Options;
use serde_json::Value;

/// Prints an AST in the canonical text form: whitespace minimized,
/// parentheses only where precedence demands them. The output of
/// [`crate::parse`] survives a round trip: parsing the stringified
/// text yields the same AST.
pub fn stringify(ast: &Ast, options: &Options) -> String {
    let table = OperatorTable::with_custom(&options.operators);
    render(ast, &table).0
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn quote(s: &str) -> String {
    serde_json::to_string(&Value::String(s.to_string())).unwrap_or_default()
}

/// Renders a node and reports how tightly it binds, so callers can
/// decide whether it needs parentheses in their position.
fn render(ast: &Ast, table: &OperatorTable) -> (String, Precedence) {
    match ast {
        Ast::Literal(v) => (
            serde_json::to_string(v).unwrap_or_default(),
            Precedence::Primary,
        ),
        Ast::Pipe(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(|item| {
                    let (text, prec) = render(item, table);
                    if prec <= Precedence::Pipe {
                        format!("({text})")
                    } else {
                        text
                    }
                })
                .collect();
            (parts.join("|"), Precedence::Pipe)
        }
        Ast::Array(items) => {
            let parts: Vec<String> = items.iter().map(|item| render(item, table).0).collect();
            (format!("[{}]", parts.join(",")), Precedence::Primary)
        }
        Ast::Object(pairs) => {
            let parts: Vec<String> = pairs
                .iter()
                .map(|(key, value)| {
                    let key = if is_identifier(key) {
                        key.clone()
                    } else {
                        quote(key)
                    };
                    format!("{key}:{}", render(value, table).0)
                })
                .collect();
            (format!("{{{}}}", parts.join(",")), Precedence::Primary)
        }
        Ast::Function { name, args } => render_function(name, args, table),
    }
}

fn render_function(name: &str, args: &[Ast], table: &OperatorTable) -> (String, Precedence) {
    if name == "get" {
        if let Some(chain) = property_chain(args) {
            return (chain, Precedence::Primary);
        }
    }
    if name == "not" && args.len() == 1 {
        let (text, prec) = render(&args[0], table);
        let operand = if prec < Precedence::Unary {
            format!("({text})")
        } else {
            text
        };
        return (format!("not {operand}"), Precedence::Unary);
    }
    if args.len() == 2 {
        if let Some((symbol, prec)) = table.infix(name) {
            return (render_infix(symbol, prec, args, table), prec);
        }
    }
    let parts: Vec<String> = args.iter().map(|arg| render(arg, table).0).collect();
    (format!("{name}({})", parts.join(",")), Precedence::Primary)
}

fn render_infix(symbol: &str, prec: Precedence, args: &[Ast], table: &OperatorTable) -> String {
    let right_assoc = prec == Precedence::Power;
    let (left, left_prec) = render(&args[0], table);
    let (right, right_prec) = render(&args[1], table);
    let wrap_left = if right_assoc {
        left_prec <= prec
    } else {
        left_prec < prec
    };
    let wrap_right = if right_assoc {
        right_prec < prec
    } else {
        right_prec <= prec
    };
    let left = if wrap_left {
        format!("({left})")
    } else {
        left
    };
    let right = if wrap_right {
        format!("({right})")
    } else {
        right
    };
    // Word operators need the spaces; symbol operators don't.
    let spaced = symbol
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic())
        .unwrap_or(false);
    if spaced {
        format!("{left} {symbol} {right}")
    } else {
        format!("{left}{symbol}{right}")
    }
}

/// `get` calls whose keys are all strings print as a property chain;
/// anything else falls back to call syntax.
fn property_chain(args: &[Ast]) -> Option<String> {
    if args.is_empty() {
        return Some(".".to_string());
    }
    let mut out = String::new();
    for arg in args {
        match arg {
            Ast::Literal(Value::String(key)) => {
                out.push('.');
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    out.push_str(&quote(key));
                }
            }
            _ => return None,
        }
    }
    Some(out)
}
