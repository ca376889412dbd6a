use jsonquery::{query, Options};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn run(data: Value, source: &str) -> Value {
    query(&data, source, &Options::new()).unwrap()
}

// ------------------------------------------------------- structural

#[test]
fn get_walks_nested_objects() {
    let data = json!({"a": {"b": {"c": 7}}});
    assert_eq!(run(data, ".a.b.c"), json!(7));
}

#[test]
fn get_quoted_key() {
    let data = json!({"first name": "Ada"});
    assert_eq!(run(data, r#"."first name""#), json!("Ada"));
}

#[test]
fn get_indexes_arrays_by_integer_key() {
    let data = json!({"items": ["a", "b", "c"]});
    let out = jsonquery::query_value(&data, &json!(["get", "items", 1]), &Options::new());
    assert_eq!(out.unwrap(), json!("b"));
}

#[test]
fn get_index_out_of_bounds_is_null() {
    let data = json!({"items": [1]});
    let out = jsonquery::query_value(&data, &json!(["get", "items", 5]), &Options::new());
    assert_eq!(out.unwrap(), json!(null));
}

#[test]
fn object_construction_keeps_declared_order() {
    let data = json!({"a": 1, "b": 2});
    let out = run(data, "{second: .b, first: .a, both: .a + .b}");
    assert_eq!(out, json!({"second": 2, "first": 1, "both": 3}));
    let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["second", "first", "both"]);
}

#[test]
fn array_construction_evaluates_against_same_input() {
    let data = json!({"a": 1, "b": 2});
    assert_eq!(run(data, "[.b, .a, 3]"), json!([2, 1, 3]));
}

#[test]
fn empty_object_and_array_literals() {
    assert_eq!(run(json!(null), "{}"), json!({}));
    assert_eq!(run(json!(null), "[]"), json!([]));
}

// ------------------------------------------------------- collection

#[test]
fn map_applies_callback() {
    let data = json!([{"price": 2, "n": 3}, {"price": 5, "n": 1}]);
    assert_eq!(run(data, "map(.price * .n)"), json!([6, 5]));
}

#[test]
fn filter_keeps_truthy_results() {
    let data = json!([{"ok": true}, {"ok": false}, {"ok": 1}, {}]);
    assert_eq!(run(data, "filter(.ok)"), json!([{"ok": true}, {"ok": 1}]));
}

#[test]
fn sort_without_path_sorts_values() {
    assert_eq!(run(json!([3, 1, 2]), "sort()"), json!([1, 2, 3]));
    assert_eq!(run(json!(["b", "c", "a"]), "sort()"), json!(["a", "b", "c"]));
}

#[test]
fn sort_descending() {
    let data = json!([{"a": 1}, {"a": 3}, {"a": 2}]);
    assert_eq!(
        run(data, r#"sort(.a, "desc") | map(.a)"#),
        json!([3, 2, 1])
    );
}

#[test]
fn reverse_returns_new_array() {
    assert_eq!(run(json!([1, 2, 3]), "reverse()"), json!([3, 2, 1]));
}

#[test]
fn pick_keys_by_last_segment() {
    let data = json!({"name": "Ada", "address": {"city": "London"}, "age": 36});
    assert_eq!(
        run(data, "pick(.name, .address.city)"),
        json!({"name": "Ada", "city": "London"})
    );
}

#[test]
fn pick_maps_over_arrays_and_fills_missing_with_null() {
    let data = json!([{"a": 1, "b": 2}, {"a": 3}]);
    assert_eq!(
        run(data, "pick(.a, .b)"),
        json!([{"a": 1, "b": 2}, {"a": 3, "b": null}])
    );
}

#[test]
fn key_by_keeps_first_collision() {
    let data = json!([
        {"id": "a", "v": 1},
        {"id": "b", "v": 2},
        {"id": "a", "v": 3}
    ]);
    assert_eq!(
        run(data, "keyBy(.id)"),
        json!({"a": {"id": "a", "v": 1}, "b": {"id": "b", "v": 2}})
    );
}

#[test]
fn group_by_stringifies_keys() {
    let data = json!([{"n": 1}, {"n": 2}, {"n": 1}]);
    assert_eq!(
        run(data, "groupBy(.n)"),
        json!({"1": [{"n": 1}, {"n": 1}], "2": [{"n": 2}]})
    );
}

#[test]
fn flatten_is_shallow() {
    let data = json!([[1, 2], [3, [4]], 5]);
    assert_eq!(run(data, "flatten()"), json!([1, 2, 3, [4], 5]));
}

#[test]
fn join_with_and_without_separator() {
    assert_eq!(run(json!(["a", "b", "c"]), r#"join(", ")"#), json!("a, b, c"));
    assert_eq!(run(json!(["a", "b"]), "join()"), json!("ab"));
}

#[test]
fn join_converts_non_strings() {
    assert_eq!(run(json!([1, true, null]), r#"join("-")"#), json!("1-true-null"));
}

#[test]
fn uniq_preserves_first_occurrence() {
    assert_eq!(run(json!([1, 1.0, 2, 1]), "uniq()"), json!([1, 2]));
}

#[test]
fn uniq_by_computed_key() {
    let data = json!([{"k": 1, "id": "a"}, {"k": 1, "id": "b"}, {"k": 2, "id": "c"}]);
    assert_eq!(run(data, "uniqBy(.k) | map(.id)"), json!(["a", "c"]));
}

#[test]
fn limit_clamps_to_length() {
    assert_eq!(run(json!([1, 2, 3]), "limit(2)"), json!([1, 2]));
    assert_eq!(run(json!([1, 2, 3]), "limit(0)"), json!([]));
    assert_eq!(run(json!([1, 2]), "limit(10)"), json!([1, 2]));
}

#[test]
fn size_of_arrays_objects_strings() {
    assert_eq!(run(json!([1, 2, 3]), "size()"), json!(3));
    assert_eq!(run(json!({"a": 1, "b": 2}), "size()"), json!(2));
    assert_eq!(run(json!("héllo"), "size()"), json!(5));
}

#[test]
fn keys_and_values_in_declared_order() {
    let data: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
    assert_eq!(run(data.clone(), "keys()"), json!(["b", "a"]));
    assert_eq!(run(data, "values()"), json!([1, 2]));
}

#[test]
fn numeric_folds() {
    assert_eq!(run(json!([1, 2, 3]), "sum()"), json!(6));
    assert_eq!(run(json!([2, 3, 4]), "prod()"), json!(24));
    assert_eq!(run(json!([1, 2, 3, 4]), "average()"), json!(2.5));
    assert_eq!(run(json!([3, 1.5, 2]), "min()"), json!(1.5));
    assert_eq!(run(json!([3, 1.5, 2]), "max()"), json!(3));
}

#[test]
fn folds_on_empty_arrays() {
    assert_eq!(run(json!([]), "sum()"), json!(0));
    assert_eq!(run(json!([]), "prod()"), json!(1));
    assert_eq!(run(json!([]), "min()"), json!(null));
    assert_eq!(run(json!([]), "max()"), json!(null));
}

// ----------------------------------------------------------- string

#[test]
fn split_on_whitespace_trims() {
    assert_eq!(
        run(json!("  one  two\tthree "), "split(.)"),
        json!(["one", "two", "three"])
    );
}

#[test]
fn split_on_separator() {
    assert_eq!(run(json!("a,b,,c"), r#"split(., ",")"#), json!(["a", "b", "", "c"]));
}

#[test]
fn split_on_empty_separator_yields_codepoints() {
    assert_eq!(run(json!("héllo"), r#"split(., "")"#), json!(["h", "é", "l", "l", "o"]));
}

#[test]
fn substring_clamps_bounds() {
    assert_eq!(run(json!("hello"), "substring(., 1, 3)"), json!("el"));
    assert_eq!(run(json!("hello"), "substring(., -2, 3)"), json!("hel"));
    assert_eq!(run(json!("hello"), "substring(., 3)"), json!("lo"));
    assert_eq!(run(json!("hello"), "substring(., 4, 99)"), json!("o"));
    assert_eq!(run(json!("hello"), "substring(., 3, 2)"), json!(""));
}

#[test]
fn string_conversion_is_canonical() {
    assert_eq!(run(json!(null), "string(.)"), json!("null"));
    assert_eq!(run(json!(true), "string(.)"), json!("true"));
    assert_eq!(run(json!(2.5), "string(.)"), json!("2.5"));
    assert_eq!(run(json!("as-is"), "string(.)"), json!("as-is"));
    assert_eq!(run(json!({"a": [1]}), "string(.)"), json!(r#"{"a":[1]}"#));
}

#[test]
fn number_conversion() {
    assert_eq!(run(json!(" 3.5 "), "number(.)"), json!(3.5));
    assert_eq!(run(json!("12"), "number(.)"), json!(12));
    assert_eq!(run(json!("abc"), "number(.)"), json!(null));
    assert_eq!(run(json!(7), "number(.)"), json!(7));
    assert_eq!(run(json!(true), "number(.)"), json!(null));
}

// ------------------------------------------------------- arithmetic

#[test]
fn arithmetic_operators() {
    let data = json!({"a": 6, "b": 4});
    assert_eq!(run(data.clone(), ".a + .b"), json!(10));
    assert_eq!(run(data.clone(), ".a - .b"), json!(2));
    assert_eq!(run(data.clone(), ".a * .b"), json!(24));
    assert_eq!(run(data.clone(), ".a / .b"), json!(1.5));
    assert_eq!(run(data.clone(), ".a % .b"), json!(2));
    assert_eq!(run(data, ".a ^ 2"), json!(36));
}

#[test]
fn division_by_zero_is_null() {
    assert_eq!(run(json!(null), "1 / 0"), json!(null));
}

#[test]
fn abs_function() {
    assert_eq!(run(json!({"x": -3.5}), "abs(.x)"), json!(3.5));
    assert_eq!(run(json!({"x": 2}), "abs(.x)"), json!(2));
}

#[test]
fn round_at_decimal_digits() {
    assert_eq!(run(json!(null), "round(2.5)"), json!(3));
    assert_eq!(run(json!(null), "round(2.4)"), json!(2));
    assert_eq!(run(json!({"x": 3.14159}), "round(.x, 2)"), json!(3.14));
}

// ------------------------------------------------- comparison, logic

#[test]
fn equality_is_by_value() {
    assert_eq!(run(json!({"a": 1}), ".a == 1.0"), json!(true));
    assert_eq!(run(json!({"a": [1, 2]}), ".a == [1, 2]"), json!(true));
    assert_eq!(run(json!({"a": null}), ".a == null"), json!(true));
    assert_eq!(run(json!({"a": 1}), ".a != 2"), json!(true));
}

#[test]
fn ordering_comparisons() {
    assert_eq!(run(json!(null), "2 > 1"), json!(true));
    assert_eq!(run(json!(null), r#""b" > "a""#), json!(true));
    assert_eq!(run(json!(null), "2 >= 2"), json!(true));
    assert_eq!(run(json!(null), "1 < 2"), json!(true));
    assert_eq!(run(json!(null), "2 <= 1"), json!(false));
}

#[test]
fn mixed_type_comparisons_are_false() {
    assert_eq!(run(json!(null), r#"1 < "a""#), json!(false));
    assert_eq!(run(json!(null), r#"1 > "a""#), json!(false));
}

#[test]
fn boolean_logic_on_truthiness() {
    assert_eq!(run(json!(null), "1 and true"), json!(true));
    assert_eq!(run(json!(null), "0 or false"), json!(false));
    // Empty strings and containers are truthy.
    assert_eq!(run(json!(null), r#""" or 0"#), json!(true));
    assert_eq!(run(json!(null), "not 0"), json!(true));
    assert_eq!(run(json!(null), "not 1"), json!(false));
}

#[test]
fn if_selects_branch_by_truthiness() {
    let adult = run(json!({"age": 32}), r#"if(.age >= 18, "adult", "minor")"#);
    assert_eq!(adult, json!("adult"));
    let minor = run(json!({"age": 9}), r#"if(.age >= 18, "adult", "minor")"#);
    assert_eq!(minor, json!("minor"));
}

#[test]
fn exists_checks_key_presence_not_nullness() {
    assert_eq!(run(json!({"a": null}), "exists(.a)"), json!(true));
    assert_eq!(run(json!({"a": null}), "exists(.b)"), json!(false));
    assert_eq!(run(json!({"a": {"b": 1}}), "exists(.a.b)"), json!(true));
    // Parent is not an object.
    assert_eq!(run(json!({"a": [1]}), "exists(.a.b)"), json!(false));
    assert_eq!(run(json!(5), "exists(.a)"), json!(false));
}

#[test]
fn membership_operators() {
    let data = json!({"x": 2});
    assert_eq!(run(data.clone(), ".x in [1, 2, 3]"), json!(true));
    assert_eq!(run(data.clone(), ".x in [4, 5]"), json!(false));
    assert_eq!(run(data.clone(), ".x not in [4, 5]"), json!(true));
    assert_eq!(run(data, ".x not in [1, 2]"), json!(false));
}

#[test]
fn regex_matches_strings() {
    let data = json!({"name": "Arthur"});
    assert_eq!(run(data.clone(), r#"regex(.name, "^A")"#), json!(true));
    assert_eq!(run(data.clone(), r#"regex(.name, "^B")"#), json!(false));
    assert_eq!(run(data.clone(), r#"regex(.name, "^a", "i")"#), json!(true));
    assert_eq!(run(data, "regex(.name, /^a/i)"), json!(true));
}

#[test]
fn regex_on_non_string_is_false() {
    assert_eq!(run(json!({"x": 12}), r#"regex(.x, "1")"#), json!(false));
}
