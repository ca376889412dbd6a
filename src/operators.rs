use std::collections::HashMap;

/// Binding strength, loosest to tightest. The parser has one level per
/// tier; stringify compares tiers to decide where parentheses are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Pipe,
    Or,
    And,
    Comparison,
    Additive,
    Multiplicative,
    Power,
    Unary,
    Primary,
}

/// The built-in infix operators and their canonical function names.
/// `|`, `and` and `or` have dedicated parser levels; everything listed
/// under `Comparison`, `Additive`, `Multiplicative` and `Power` is
/// matched within its tier in declaration order.
const CORE: &[(&str, &str, Precedence)] = &[
    ("or", "or", Precedence::Or),
    ("and", "and", Precedence::And),
    ("==", "eq", Precedence::Comparison),
    ("!=", "ne", Precedence::Comparison),
    ("<=", "lte", Precedence::Comparison),
    (">=", "gte", Precedence::Comparison),
    ("<", "lt", Precedence::Comparison),
    (">", "gt", Precedence::Comparison),
    ("not in", "not in", Precedence::Comparison),
    ("in", "in", Precedence::Comparison),
    ("+", "add", Precedence::Additive),
    ("-", "subtract", Precedence::Additive),
    ("*", "multiply", Precedence::Multiplicative),
    ("/", "divide", Precedence::Multiplicative),
    ("%", "mod", Precedence::Multiplicative),
    ("^", "pow", Precedence::Power),
];

/// The effective operator set for one compile: the core table plus the
/// caller's extensions. Extensions are new symbols bound to function
/// names; they parse at the comparison tier.
#[derive(Debug, Clone)]
pub struct OperatorTable {
    /// Comparison-tier operators (built-in and custom), longest symbol
    /// first so `<=` wins over `<`.
    comparison: Vec<(String, String)>,
    /// name -> (symbol, tier), used by stringify to print infix form.
    by_name: HashMap<String, (String, Precedence)>,
}

impl OperatorTable {
    pub fn with_custom(custom: &HashMap<String, String>) -> OperatorTable {
        // Custom symbols come first so they shadow a core symbol on a
        // tie; the stable sort then only enforces longest-match.
        let mut comparison: Vec<(String, String)> = custom
            .iter()
            .map(|(sym, name)| (sym.clone(), name.clone()))
            .collect();
        comparison.extend(
            CORE.iter()
                .filter(|(_, _, p)| *p == Precedence::Comparison)
                .map(|(sym, name, _)| (sym.to_string(), name.to_string())),
        );
        let mut by_name: HashMap<String, (String, Precedence)> = CORE
            .iter()
            .map(|(sym, name, p)| (name.to_string(), (sym.to_string(), *p)))
            .collect();
        for (sym, name) in custom {
            by_name.insert(name.clone(), (sym.clone(), Precedence::Comparison));
        }
        comparison.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        OperatorTable {
            comparison,
            by_name,
        }
    }

    /// Comparison-tier operators in matching order.
    pub fn comparison_ops(&self) -> impl Iterator<Item = (&str, &str)> {
        self.comparison.iter().map(|(s, n)| (s.as_str(), n.as_str()))
    }

    /// The infix symbol and tier for a canonical function name, if the
    /// name denotes an operator.
    pub fn infix(&self, name: &str) -> Option<(&str, Precedence)> {
        self.by_name.get(name).map(|(sym, p)| (sym.as_str(), *p))
    }
}
