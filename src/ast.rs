use crate::errors::{Error, Result};
use serde_json::Value;

/// The abstract form of a query.
///
/// Infix operators in the text format parse into [`Ast::Function`] nodes
/// named after the operator's canonical function (`+` becomes `add`,
/// `and` stays `and`), and property chains parse into `get` calls, so a
/// handful of variants covers the whole language.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A constant.
    Literal(Value),
    /// A call, by function name. Operators and property access land here.
    Function { name: String, args: Vec<Ast> },
    /// `a | b | c`: feed each result into the next query.
    Pipe(Vec<Ast>),
    /// Object construction with literal keys and dynamic values,
    /// in declared order.
    Object(Vec<(String, Ast)>),
    /// Array construction with dynamic elements.
    Array(Vec<Ast>),
}

impl Ast {
    pub fn function(name: impl Into<String>, args: Vec<Ast>) -> Ast {
        Ast::Function {
            name: name.into(),
            args,
        }
    }

    /// Converts the structured (JSON) query form into an AST.
    ///
    /// Arrays are calls: `["get", "name"]`, `["pipe", q1, q2]`. Objects
    /// construct objects, and every other JSON value is a literal.
    pub fn from_value(form: &Value) -> Result<Ast> {
        match form {
            Value::Array(items) => {
                let name = match items.first() {
                    Some(Value::String(name)) => name.clone(),
                    _ => {
                        return Err(Error::Parse {
                            offset: 0,
                            message: "structured query: expected a function name".to_string(),
                        })
                    }
                };
                let args = items[1..]
                    .iter()
                    .map(Ast::from_value)
                    .collect::<Result<Vec<_>>>()?;
                Ok(match name.as_str() {
                    "pipe" => Ast::Pipe(args),
                    "array" => Ast::Array(args),
                    _ => Ast::Function { name, args },
                })
            }
            Value::Object(map) => {
                let pairs = map
                    .iter()
                    .map(|(k, v)| Ok((k.clone(), Ast::from_value(v)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Ast::Object(pairs))
            }
            other => Ok(Ast::Literal(other.clone())),
        }
    }

    /// Serializes the AST back into the structured form.
    pub fn to_value(&self) -> Value {
        match self {
            Ast::Literal(v) => v.clone(),
            Ast::Function { name, args } => {
                let mut items = vec![Value::String(name.clone())];
                items.extend(args.iter().map(Ast::to_value));
                Value::Array(items)
            }
            Ast::Pipe(items) => {
                let mut out = vec![Value::String("pipe".to_string())];
                out.extend(items.iter().map(Ast::to_value));
                Value::Array(out)
            }
            Ast::Array(items) => {
                let mut out = vec![Value::String("array".to_string())];
                out.extend(items.iter().map(Ast::to_value));
                Value::Array(out)
            }
            Ast::Object(pairs) => {
                let map = pairs
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// The literal string inside this node, if it is one.
    pub(crate) fn as_literal_str(&self) -> Option<&str> {
        match self {
            Ast::Literal(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}
