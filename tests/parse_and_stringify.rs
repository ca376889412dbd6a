use jsonquery::{parse, stringify, Ast, Options};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ast(source: &str) -> Ast {
    parse(source, &Options::new()).unwrap()
}

/// Structural checks go through the JSON form of the AST.
fn form(source: &str) -> serde_json::Value {
    ast(source).to_value()
}

#[test]
fn property_chains_parse_to_get() {
    assert_eq!(form(".name"), json!(["get", "name"]));
    assert_eq!(form(".a.b.c"), json!(["get", "a", "b", "c"]));
    assert_eq!(form(r#".a."b c".d"#), json!(["get", "a", "b c", "d"]));
    assert_eq!(form("."), json!(["get"]));
}

#[test]
fn bare_identifiers_are_properties() {
    assert_eq!(form("name"), json!(["get", "name"]));
    assert_eq!(form("a.b"), json!(["get", "a", "b"]));
}

#[test]
fn keywords_are_literals() {
    assert_eq!(form("true"), json!(true));
    assert_eq!(form("false"), json!(false));
    assert_eq!(form("null"), json!(null));
}

#[test]
fn number_literals() {
    assert_eq!(form("0"), json!(0));
    assert_eq!(form("42"), json!(42));
    assert_eq!(form("-5"), json!(-5));
    assert_eq!(form("2.5"), json!(2.5));
    assert_eq!(form("-0.5"), json!(-0.5));
    assert_eq!(form("1e3"), json!(1000));
    assert_eq!(form("2.5e-1"), json!(0.25));
}

#[test]
fn string_escapes() {
    assert_eq!(form(r#""a\nb""#), json!("a\nb"));
    assert_eq!(form(r#""tab\there""#), json!("tab\there"));
    assert_eq!(form(r#""quote \" backslash \\""#), json!("quote \" backslash \\"));
    assert_eq!(form(r#""A""#), json!("A"));
    // Surrogate pair.
    assert_eq!(form(r#""😀""#), json!("😀"));
}

#[test]
fn pipes_flatten_into_one_node() {
    assert_eq!(
        form(".a | .b | .c"),
        json!(["pipe", ["get", "a"], ["get", "b"], ["get", "c"]])
    );
}

#[test]
fn operators_parse_to_canonical_functions() {
    assert_eq!(form(".a + 1"), json!(["add", ["get", "a"], 1]));
    assert_eq!(form(".a == 2"), json!(["eq", ["get", "a"], 2]));
    assert_eq!(form(".a and .b"), json!(["and", ["get", "a"], ["get", "b"]]));
    assert_eq!(
        form(".a in [1, 2]"),
        json!(["in", ["get", "a"], ["array", 1, 2]])
    );
    assert_eq!(
        form(".a not in [1, 2]"),
        json!(["not in", ["get", "a"], ["array", 1, 2]])
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    assert_eq!(form("1 + 2 * 3"), json!(["add", 1, ["multiply", 2, 3]]));
    assert_eq!(form("(1 + 2) * 3"), json!(["multiply", ["add", 1, 2], 3]));
}

#[test]
fn binary_operators_are_left_associative() {
    assert_eq!(form("10 - 2 - 3"), json!(["subtract", ["subtract", 10, 2], 3]));
    assert_eq!(form("24 / 4 / 2"), json!(["divide", ["divide", 24, 4], 2]));
}

#[test]
fn power_is_right_associative() {
    assert_eq!(form("2 ^ 3 ^ 2"), json!(["pow", 2, ["pow", 3, 2]]));
}

#[test]
fn unary_forms() {
    assert_eq!(form("not .a"), json!(["not", ["get", "a"]]));
    assert_eq!(form("-.a"), json!(["subtract", 0, ["get", "a"]]));
    assert_eq!(
        form("not .a and .b"),
        json!(["and", ["not", ["get", "a"]], ["get", "b"]])
    );
}

#[test]
fn logic_precedence_or_loosest() {
    assert_eq!(
        form(".a or .b and .c"),
        json!(["or", ["get", "a"], ["and", ["get", "b"], ["get", "c"]]])
    );
    assert_eq!(
        form(".a == 1 and .b == 2"),
        json!(["and", ["eq", ["get", "a"], 1], ["eq", ["get", "b"], 2]])
    );
}

#[test]
fn object_and_array_literals() {
    assert_eq!(form("{}"), json!({}));
    assert_eq!(
        form(r#"{a: 1, "b c": .x}"#),
        json!({"a": 1, "b c": ["get", "x"]})
    );
    assert_eq!(form("[1, .a, \"s\"]"), json!(["array", 1, ["get", "a"], "s"]));
}

#[test]
fn function_calls_take_full_queries_as_arguments() {
    assert_eq!(
        form("filter(.a | size() > 2)"),
        json!(["filter", ["pipe", ["get", "a"], ["gt", ["size"], 2]]])
    );
}

#[test]
fn regex_literal_desugars_to_pattern_string() {
    assert_eq!(form("/a+b/"), json!("a+b"));
    assert_eq!(form("/a+b/i"), json!("(?i)a+b"));
    assert_eq!(form(r"/a\/b/"), json!(r"a\/b"));
}

#[test]
fn whitespace_between_tokens_is_ignored() {
    assert_eq!(
        form("  sort( .a ,\n\t\"desc\" ) "),
        json!(["sort", ["get", "a"], "desc"])
    );
}

// --------------------------------------------------------- stringify

#[test]
fn stringify_produces_compact_canonical_text() {
    let options = Options::new();
    assert_eq!(stringify(&ast(".a |  .b"), &options), ".a|.b");
    assert_eq!(stringify(&ast("1 + 2 * 3"), &options), "1+2*3");
    assert_eq!(stringify(&ast("(1 + 2) * 3"), &options), "(1+2)*3");
    assert_eq!(stringify(&ast("sort( .a )"), &options), "sort(.a)");
    assert_eq!(stringify(&ast(".a in [1, 2]"), &options), ".a in [1,2]");
    assert_eq!(stringify(&ast(r#"."two words""#), &options), r#"."two words""#);
}

#[test]
fn stringify_parenthesizes_only_where_needed() {
    let options = Options::new();
    assert_eq!(stringify(&ast("10 - (2 - 3)"), &options), "10-(2-3)");
    assert_eq!(stringify(&ast("10 - 2 - 3"), &options), "10-2-3");
    assert_eq!(stringify(&ast("(2 ^ 3) ^ 2"), &options), "(2^3)^2");
    assert_eq!(stringify(&ast("2 ^ (3 ^ 2)"), &options), "2^3^2");
    assert_eq!(stringify(&ast("not (.a and .b)"), &options), "not (.a and .b)");
}

#[test]
fn stringify_round_trips_to_the_same_ast() {
    let options = Options::new();
    let sources = [
        ".name",
        r#".a.b."c d""#,
        "sort(.a) | map(.a)",
        "filter(.x > 2)",
        "1 + 2 * 3",
        "(1 + 2) * 3",
        "2 ^ 3 ^ 2",
        "-.a",
        "-5",
        "not .a and .b",
        ".a in [1, 2]",
        ".a not in [1, 2]",
        r#"{a: 1, "b c": .x, nested: {y: [1, 2]}}"#,
        "[1, 2, 3]",
        r#"if(.a > 1, "big", "small")"#,
        ".price == null or .price > 10",
        "groupBy(.g) | keys()",
        r#"regex(.name, /^a+$/i)"#,
        ".",
        "{}",
        "[]",
    ];
    for source in sources {
        let parsed = ast(source);
        let printed = stringify(&parsed, &options);
        let reparsed = parse(&printed, &options)
            .unwrap_or_else(|e| panic!("stringify({source:?}) = {printed:?} failed to reparse: {e}"));
        assert_eq!(reparsed, parsed, "round trip of {source:?} via {printed:?}");
    }
}

#[test]
fn structured_form_round_trips_through_ast() {
    let forms = [
        json!(["get", "name"]),
        json!(["pipe", ["get", "a"], ["sort"]]),
        json!({"a": ["get", "x"], "b": 2}),
        json!(["array", 1, 2]),
        json!(["map", ["multiply", ["get", "price"], 2]]),
        json!("literal string"),
        json!(3.5),
    ];
    for form in forms {
        let parsed = Ast::from_value(&form).unwrap();
        assert_eq!(parsed.to_value(), form);
    }
}
