use std::fs;

use cuelite::{Client, ExportError, ExportRequest};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn export_source(src: &str) -> cuelite::Result<cuelite::Export> {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.cue"), src).unwrap();
    let client = Client::new();
    cuelite::export::export(
        &client,
        &ExportRequest {
            dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        },
    )
}

#[test]
fn scalars_lists_and_nested_structs_render() {
    let out = export_source(
        r#"
        // emit a bit of everything
        name:  "svc"
        port:  8080
        ratio: 0.5
        on:    true
        none:  null
        tags:  ["a", "b"]
        meta: { owner: "ops", tier: 1 }
        "#,
    )
    .unwrap();
    assert_eq!(
        out.rendered,
        r#"{"name":"svc","port":8080,"ratio":0.5,"on":true,"none":null,"tags":["a","b"],"meta":{"owner":"ops","tier":1}}"#
    );
}

#[test]
fn references_resolve_lexically() {
    let out = export_source(
        r#"
        base: "app"
        svc: {
            suffix: "prod"
            name:   "\(base)-\(suffix)"
        }
        "#,
    )
    .unwrap();
    assert_eq!(
        out.rendered,
        r#"{"base":"app","svc":{"suffix":"prod","name":"app-prod"}}"#
    );
}

#[test]
fn dotted_references_navigate_structs() {
    let out = export_source(
        r#"
        meta: { region: "eu" }
        where: meta.region
        "#,
    )
    .unwrap();
    assert_eq!(out.rendered, r#"{"meta":{"region":"eu"},"where":"eu"}"#);
}

#[test]
fn hidden_fields_are_referencable_but_not_rendered() {
    let out = export_source(
        r#"
        _host: "db.internal"
        url:   "postgres://\(_host)/app"
        "#,
    )
    .unwrap();
    assert_eq!(out.rendered, r#"{"url":"postgres://db.internal/app"}"#);
}

#[test]
fn duplicate_fields_in_one_instance_unify() {
    let out = export_source(
        r#"
        svc: { name: "a" }
        svc: { port: 1 }
        "#,
    )
    .unwrap();
    assert_eq!(out.rendered, r#"{"svc":{"name":"a","port":1}}"#);

    let err = export_source("x: 1\nx: 2\n").unwrap_err();
    assert!(matches!(err, ExportError::Build { .. }), "got {err}");
}

#[test]
fn default_disjunction_renders_its_default() {
    let out = export_source("port: *8080 | int\n").unwrap();
    assert_eq!(out.rendered, r#"{"port":8080}"#);
}

#[test]
fn defaultless_disjunction_fails_validation() {
    let err = export_source("port: 8080 | 9090\n").unwrap_err();
    assert!(matches!(err, ExportError::Validate(_)), "got {err}");
}

#[test]
fn constraint_meets_value_across_duplicate_fields() {
    let out = export_source("port: int\nport: 8080\n").unwrap();
    assert_eq!(out.rendered, r#"{"port":8080}"#);
}

#[test]
fn interpolating_an_unresolved_field_stays_incomplete() {
    let err = export_source(
        r#"
        _who: string
        msg:  "hi \(_who)"
        "#,
    )
    .unwrap_err();
    match err {
        ExportError::Validate(msg) => assert!(msg.contains("msg"), "got {msg}"),
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn reference_cycles_are_build_errors() {
    let err = export_source("a: b\nb: a\n").unwrap_err();
    match err {
        ExportError::Build { reason, .. } => assert!(reason.contains("cycle"), "got {reason}"),
        other => panic!("expected build error, got {other}"),
    }
}

#[test]
fn undefined_references_are_build_errors() {
    let err = export_source("a: nowhere\n").unwrap_err();
    assert!(matches!(err, ExportError::Build { .. }), "got {err}");
}

#[test]
fn syntax_errors_surface_as_load_errors() {
    let err = export_source("a: {\n").unwrap_err();
    assert!(matches!(err, ExportError::Load { .. }), "got {err}");
}

#[test]
fn quoted_labels_round_trip() {
    let out = export_source("\"weird key\": \"v\"\n").unwrap();
    assert_eq!(out.rendered, r#"{"weird key":"v"}"#);
}
