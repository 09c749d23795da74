use cuelite::path::{lookup, Path, Selector};
use cuelite::value::{Field, Value};
use pretty_assertions::assert_eq;

fn field(name: &str, value: Value) -> Field {
    Field {
        name: name.to_string(),
        hidden: false,
        value,
    }
}

fn sample() -> Value {
    Value::Struct(vec![
        field(
            "Foo",
            Value::Struct(vec![field("Bar", Value::String("Baz".to_string()))]),
        ),
        field(
            "items",
            Value::List(vec![Value::Int(10), Value::Int(20)]),
        ),
        field(
            "weird key",
            Value::String("here".to_string()),
        ),
        Field {
            name: "_secret".to_string(),
            hidden: true,
            value: Value::String("no".to_string()),
        },
    ])
}

#[test]
fn parses_dotted_fields() {
    let p = Path::parse("Foo.Bar").unwrap();
    assert_eq!(
        p.selectors,
        vec![
            Selector::Field("Foo".to_string()),
            Selector::Field("Bar".to_string())
        ]
    );
}

#[test]
fn parses_indices_and_quoted_labels() {
    let p = Path::parse("items[1]").unwrap();
    assert_eq!(
        p.selectors,
        vec![Selector::Field("items".to_string()), Selector::Index(1)]
    );
    let q = Path::parse("\"weird key\"").unwrap();
    assert_eq!(q.selectors, vec![Selector::Field("weird key".to_string())]);
}

#[test]
fn rejects_malformed_expressions() {
    for expr in ["", "path,not,found", "a..b", "a[", "a[1.5]", "a[-1]", "a b"] {
        assert!(Path::parse(expr).is_err(), "{expr:?} should not parse");
    }
}

#[test]
fn looks_up_present_paths() {
    let v = sample();
    let p = Path::parse("Foo.Bar").unwrap();
    assert_eq!(lookup(&v, &p), Some(&Value::String("Baz".to_string())));

    let p = Path::parse("items[1]").unwrap();
    assert_eq!(lookup(&v, &p), Some(&Value::Int(20)));

    let p = Path::parse("\"weird key\"").unwrap();
    assert_eq!(lookup(&v, &p), Some(&Value::String("here".to_string())));
}

#[test]
fn absent_paths_are_lookup_misses_not_parse_errors() {
    let v = sample();
    for expr in ["path.not.found", "Foo.Missing", "items[9]", "Foo[0]"] {
        let p = Path::parse(expr).expect("well-formed path");
        assert_eq!(lookup(&v, &p), None, "{expr} should miss");
    }
}

#[test]
fn hidden_fields_are_not_addressable() {
    let v = sample();
    let p = Path::parse("_secret").unwrap();
    assert_eq!(lookup(&v, &p), None);
}
