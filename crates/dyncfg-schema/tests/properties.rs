//! Behavioral properties of validation that hold for every configuration kind.

use dyncfg_core::{normalize, CanonicalDocument, ConfigKind, DyncfgError};
use dyncfg_schema::{validate, verify_schema_outcome, SchemaRegistry, ViolationCategory};
use proptest::prelude::*;
use serde_json::{json, Value};

fn minimal(kind: ConfigKind) -> Value {
    match kind {
        ConfigKind::Security => json!({"rules": {"roles": ["admin"]}}),
        ConfigKind::Variable => json!({"variables": {"region": "US"}}),
        ConfigKind::Table => json!({
            "tables": [{
                "name": "PlayerStats",
                "dimensions": [{"name": "playerName", "type": "TEXT", "definition": "{{name}}"}]
            }]
        }),
    }
}

/// Dotted paths of the required keys present in [`minimal`].
fn required_paths(kind: ConfigKind) -> &'static [&'static str] {
    match kind {
        ConfigKind::Security => &["rules", "rules.roles"],
        ConfigKind::Variable => &["variables"],
        ConfigKind::Table => &[
            "tables",
            "tables[0].name",
            "tables[0].dimensions",
            "tables[0].dimensions[0].name",
            "tables[0].dimensions[0].type",
            "tables[0].dimensions[0].definition",
        ],
    }
}

fn remove_at(value: &mut Value, pointer: &str) {
    let Some((parent, key)) = pointer.rsplit_once('/') else {
        return;
    };
    let target = if parent.is_empty() {
        Some(value)
    } else {
        value.pointer_mut(parent)
    };
    if let Some(Value::Object(map)) = target {
        map.remove(key);
    }
}

fn to_pointer(dotted: &str) -> String {
    let mut pointer = String::new();
    for part in dotted.split('.') {
        let (key, indices) = match part.find('[') {
            Some(i) => (&part[..i], &part[i..]),
            None => (part, ""),
        };
        pointer.push('/');
        pointer.push_str(key);
        for index in indices.split(['[', ']']).filter(|s| !s.is_empty()) {
            pointer.push('/');
            pointer.push_str(index);
        }
    }
    pointer
}

#[test]
fn minimal_documents_are_valid() {
    for kind in ConfigKind::all() {
        let outcome = validate(*kind, &CanonicalDocument::from_value(minimal(*kind)));
        assert!(outcome.is_valid(), "{kind}: {outcome}");
    }
}

#[test]
fn removing_a_required_key_is_reported_at_that_key() {
    for kind in ConfigKind::all() {
        let base = minimal(*kind);
        for path in required_paths(*kind) {
            let mut doc = base.clone();
            remove_at(&mut doc, &to_pointer(path));
            assert_ne!(doc, base, "{kind}: {path} not present");
            let outcome = validate(*kind, &CanonicalDocument::from_value(doc));
            assert!(!outcome.is_valid(), "{kind}: removing {path} stayed valid");
            assert!(
                outcome.violations().iter().any(|v| v.path.to_string() == *path
                    && v.category == ViolationCategory::MissingRequiredKey),
                "{kind}: no violation at {path}\n{outcome}"
            );
        }
    }
}

#[test]
fn an_extra_top_level_key_is_rejected() {
    for kind in ConfigKind::all() {
        let mut doc = minimal(*kind);
        doc["unexpected"] = json!(true);
        let outcome = validate(*kind, &CanonicalDocument::from_value(doc));
        assert!(!outcome.is_valid(), "{kind}");
        assert!(outcome.has_violation(ViolationCategory::UnknownKey, "unexpected"));
    }
}

#[test]
fn relaxed_and_strict_text_yield_identical_outcomes() {
    let cases = [
        (
            "security",
            r#"{"rules": {"roles": ["admin", "admin"], "extra": 1}}"#,
            "rules: {\n  roles: [\n    admin\n    admin\n  ]\n  extra: 1 // not allowed\n}",
        ),
        (
            "variable",
            r#"{"variables": {"ok": 1, "not ok": 2}}"#,
            "{\n  variables: {\n    ok: 1,\n    'not ok': 2,\n  },\n}",
        ),
        (
            "table",
            r#"{"tables": [{"name": "T", "dimensions": []}]}"#,
            "# table\ntables: [\n  {\n    name: T\n    dimensions: []\n  }\n]",
        ),
    ];
    for (kind, strict, relaxed) in cases {
        let a = verify_schema_outcome(kind, strict).unwrap();
        let b = verify_schema_outcome(kind, relaxed).unwrap();
        assert!(!a.is_valid(), "{kind}");
        assert_eq!(a, b, "{kind}");
    }
}

#[test]
fn unknown_kind_and_syntax_errors_are_distinct() {
    assert!(matches!(
        verify_schema_outcome("view", "{}"),
        Err(DyncfgError::UnknownKind(_))
    ));
    assert!(matches!(
        verify_schema_outcome("view", "{{{"),
        Err(DyncfgError::UnknownKind(_))
    ));
    assert!(matches!(
        verify_schema_outcome("table", "{{{"),
        Err(DyncfgError::Syntax(_))
    ));
    assert!(matches!(
        verify_schema_outcome("table", r#"{"tables": [], "tables": []}"#),
        Err(DyncfgError::Syntax(_))
    ));
}

#[test]
fn concurrent_validation_is_consistent() {
    let registry = SchemaRegistry::global();
    let doc = normalize(r#"{"tables": [{"name": "T", "dimensions": [{"name": "d"}]}]}"#).unwrap();
    let expected = registry.validate(ConfigKind::Table, &doc);
    assert!(!expected.is_valid());

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    (0..25)
                        .map(|_| registry.validate(ConfigKind::Table, &doc))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for outcome in handle.join().unwrap() {
                assert_eq!(outcome, expected);
            }
        }
    });
}

fn arb_role() -> impl Strategy<Value = String> {
    "[A-Za-z][0-9A-Za-z_. ]{0,10}".prop_map(|s| s.trim_end().to_string())
}

proptest! {
    #[test]
    fn any_unique_role_list_is_valid(roles in prop::collection::btree_set(arb_role(), 1..6)) {
        let doc = CanonicalDocument::from_value(json!({"rules": {"roles": roles}}));
        let outcome = validate(ConfigKind::Security, &doc);
        prop_assert!(outcome.is_valid(), "{}", outcome);
    }

    #[test]
    fn validation_is_idempotent(key in "[a-z]{1,8}", value in any::<i64>()) {
        let doc = CanonicalDocument::from_value(json!({"variables": {key: value}, "extra": null}));
        let first = validate(ConfigKind::Variable, &doc);
        let second = validate(ConfigKind::Variable, &doc);
        prop_assert!(!first.is_valid());
        prop_assert_eq!(first, second);
    }
}
