use serde_json::json;
use sreg_domain::script::{Direction, ScriptDeclaration, ScriptEdit};

#[test]
fn declaration_builders_set_fields() {
    let decl = ScriptDeclaration::new("menu.js")
        .with_expression("not: anonymous")
        .with_inline(true)
        .with_enabled(false);

    assert_eq!(decl.id, "menu.js");
    assert_eq!(decl.expression, "not: anonymous");
    assert!(decl.inline);
    assert!(!decl.enabled);
}

#[test]
fn direction_parses_only_known_values() {
    assert_eq!(Direction::parse("up"), Some(Direction::Up));
    assert_eq!(Direction::parse("down"), Some(Direction::Down));
    assert_eq!(Direction::parse("sideways"), None);
    assert_eq!(Direction::parse("UP"), None);
    assert_eq!(Direction::Down.to_string(), "down");
}

#[test]
fn edit_orders_records_by_sort_key() {
    let edit: ScriptEdit = serde_json::from_value(json!({
        "debug_mode": true,
        "scripts": [
            { "sort": 3, "id": "c.js" },
            { "sort": 1, "id": "a.js", "expression": "member" },
            { "sort": 2, "id": "b.js", "enabled": false },
            { "sort": 1, "id": "a2.js" }
        ]
    }))
    .expect("edit deserialize");

    assert!(edit.debug_mode);
    let ids: Vec<String> = edit.into_ordered().into_iter().map(|d| d.id).collect();
    assert_eq!(ids, ["a.js", "a2.js", "b.js", "c.js"]);
}

#[test]
fn declarations_require_an_id() {
    let decl: ScriptDeclaration = serde_json::from_value(json!({ "id": "menu.js" })).expect("decl");
    assert_eq!(decl, ScriptDeclaration::new("menu.js"));
    assert!(decl.enabled);

    let err = serde_json::from_value::<ScriptDeclaration>(json!({ "expression": "member" }))
        .expect_err("a declaration without an id");
    assert!(err.to_string().contains("missing field `id`"));

    let row = serde_json::from_value::<ScriptEdit>(json!({ "scripts": [{ "sort": 1 }] }));
    assert!(row.is_err());
}
