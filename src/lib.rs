//! An embeddable query language for navigating and transforming
//! JSON-like data.
//!
//! A query is either a compact text expression or a structured JSON
//! form; both compile to the same [`Evaluator`], a pure function from
//! input data to output data.
//!
//! ```
//! use jsonquery::{query, Options};
//! use serde_json::json;
//!
//! let data = json!({"friends": [
//!     {"name": "Chris", "age": 23, "city": "New York"},
//!     {"name": "Emily", "age": 19, "city": "Atlanta"},
//!     {"name": "Joe", "age": 32, "city": "New York"}
//! ]});
//!
//! let names = query(
//!     &data,
//!     r#".friends | filter(.city == "New York") | sort(.age) | map(.name)"#,
//!     &Options::new(),
//! ).unwrap();
//!
//! assert_eq!(names, json!(["Chris", "Joe"]));
//! ```

mod ast;
mod comparison;
mod compile;
mod errors;
mod functions;
mod operators;
mod parser;
mod stringify;

pub use ast::Ast;
pub use compile::{Context, Evaluator};
pub use errors::{Error, Result};
pub use functions::{build_function, Builder, Registry};
pub use stringify::stringify;

use operators::OperatorTable;
use parser::Parser;
use serde_json::Value;
use std::collections::HashMap;

/// Per-compile extensions: user functions shadow core functions by
/// name, and new operator symbols map to function names (their
/// precedence follows the comparison tier).
#[derive(Clone, Default)]
pub struct Options {
    pub functions: HashMap<String, Builder>,
    pub operators: HashMap<String, String>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn function(mut self, name: &str, builder: Builder) -> Options {
        self.functions.insert(name.to_string(), builder);
        self
    }

    pub fn operator(mut self, symbol: &str, name: &str) -> Options {
        self.operators.insert(symbol.to_string(), name.to_string());
        self
    }
}

/// Parses query text into the abstract form.
pub fn parse(source: &str, options: &Options) -> Result<Ast> {
    tracing::trace!(source, "parsing query");
    let table = OperatorTable::with_custom(&options.operators);
    Parser::new(source, &table).parse()
}

/// Lowers an AST into a reusable evaluator.
pub fn compile(ast: &Ast, options: &Options) -> Result<Evaluator> {
    tracing::debug!("compiling query");
    Context::new(options).compile(ast)
}

/// Parses, compiles and runs a text query against `data`.
pub fn query(data: &Value, source: &str, options: &Options) -> Result<Value> {
    let context = Context::new(options);
    tracing::trace!(source, "parsing query");
    let ast = Parser::new(source, context.operators()).parse()?;
    let evaluator = context.compile(&ast)?;
    evaluator(data)
}

/// Compiles and runs a structured (JSON form) query against `data`.
pub fn query_value(data: &Value, form: &Value, options: &Options) -> Result<Value> {
    let ast = Ast::from_value(form)?;
    let evaluator = compile(&ast, options)?;
    evaluator(data)
}
