use sreg_registry::domain::config::RegistryConfig;
use sreg_registry::domain::script::{Direction, ScriptDeclaration, ScriptEdit, ScriptRecord};
use sreg_registry::*;

fn ids(registry: &Registry) -> Vec<String> {
    registry.declarations().into_iter().map(|d| d.id).collect()
}

fn group_ids(registry: &Registry) -> Vec<String> {
    registry.cooked().groups().iter().map(|g| g.id.clone()).collect()
}

fn merged_id(members: &[&str], expression: &str) -> String {
    let members: Vec<String> = members.iter().map(|m| (*m).to_owned()).collect();
    SyntheticIds::default().for_group(&members, expression, false)
}

#[test]
fn duplicate_registration_keeps_the_count() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js")).unwrap();

    let err = registry.register(ScriptDeclaration::new("a.js")).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateId { .. }));
    assert!(err.to_string().contains("a.js"));
    assert_eq!(registry.declarations().len(), 1);
}

#[test]
fn adjacent_equal_declarations_merge_unless_debugging() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js").with_expression("member")).unwrap();
    registry.register(ScriptDeclaration::new("b.js").with_expression("member")).unwrap();

    let merged = merged_id(&["a.js", "b.js"], "member");
    assert_eq!(group_ids(&registry), [merged.clone()]);
    assert_eq!(registry.members(&merged).unwrap(), ["a.js", "b.js"]);

    registry.set_debug_mode(true);
    assert!(registry.debug_mode());
    assert_eq!(group_ids(&registry), ["a.js", "b.js"]);
    assert!(!registry.contains(&merged));

    registry.set_debug_mode(false);
    assert_eq!(group_ids(&registry), [merged]);
}

#[test]
fn three_identical_declarations_share_one_group() {
    let registry = Registry::new();
    for id in ["a.js", "b.js", "c.js"] {
        registry.register(ScriptDeclaration::new(id)).unwrap();
    }

    let cooked = registry.cooked();
    assert_eq!(cooked.groups().len(), 1);
    let merged = &cooked.groups()[0].id;
    assert_eq!(merged, &merged_id(&["a.js", "b.js", "c.js"], ""));
    assert_eq!(cooked.members(merged).unwrap(), ["a.js", "b.js", "c.js"]);
    assert_eq!(cooked.membership().len(), 4);
}

#[test]
fn disabled_declarations_only_self_map() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js").with_expression("x")).unwrap();
    registry.register(ScriptDeclaration::new("off.js").with_enabled(false)).unwrap();

    assert_eq!(group_ids(&registry), ["a.js"]);
    assert_eq!(registry.members("off.js").unwrap(), ["off.js"]);
}

#[test]
fn boundary_moves_are_silent_no_ops() {
    let registry = Registry::new();
    for id in ["a.js", "b.js", "c.js"] {
        registry.register(ScriptDeclaration::new(id).with_expression(id)).unwrap();
    }

    registry.move_script("a.js", Direction::Up).unwrap();
    registry.move_script("c.js", Direction::Down).unwrap();
    assert_eq!(ids(&registry), ["a.js", "b.js", "c.js"]);

    registry.move_script_named("c.js", "up").unwrap();
    assert_eq!(ids(&registry), ["a.js", "c.js", "b.js"]);
    assert_eq!(group_ids(&registry), ["a.js", "c.js", "b.js"]);
}

#[test]
fn sideways_is_not_a_direction() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js")).unwrap();

    let err = registry.move_script_named("a.js", "sideways").unwrap_err();
    assert!(matches!(err, RegistryError::InvalidDirection { .. }));
    assert_eq!(err.context_note(), Some("Moving script 'a.js'"));

    let err = registry.move_script("missing.js", Direction::Down).unwrap_err();
    assert!(matches!(err, RegistryError::NotFound { .. }));
}

#[test]
fn moving_can_split_and_join_groups() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js")).unwrap();
    registry.register(ScriptDeclaration::new("x.js").with_expression("member")).unwrap();
    registry.register(ScriptDeclaration::new("b.js")).unwrap();
    assert_eq!(group_ids(&registry), ["a.js", "x.js", "b.js"]);

    registry.move_script("x.js", Direction::Down).unwrap();
    let merged = merged_id(&["a.js", "b.js"], "");
    assert_eq!(group_ids(&registry), [merged.clone(), "x.js".to_owned()]);
    assert_eq!(registry.members(&merged).unwrap(), ["a.js", "b.js"]);
}

#[test]
fn replacing_members_renames_the_group() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js")).unwrap();
    registry.register(ScriptDeclaration::new("b.js")).unwrap();
    let before = group_ids(&registry);

    registry
        .replace_all(vec![ScriptDeclaration::new("c.js"), ScriptDeclaration::new("d.js")])
        .unwrap();
    let after = group_ids(&registry);

    assert_eq!(before.len(), 1);
    assert_eq!(after.len(), 1);
    assert_ne!(before, after);
    assert!(registry.members(&before[0]).is_none());
    assert_eq!(registry.members(&after[0]).unwrap(), ["c.js", "d.js"]);
}

#[test]
fn unchanged_content_keeps_its_group_id_across_mutations() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js")).unwrap();
    registry.register(ScriptDeclaration::new("b.js")).unwrap();
    let before = group_ids(&registry);

    registry.register(ScriptDeclaration::new("z.js").with_expression("member")).unwrap();
    registry.unregister("z.js");
    assert_eq!(group_ids(&registry), before);

    registry.register(ScriptDeclaration::new("c.js")).unwrap();
    assert_ne!(group_ids(&registry), before);
}

#[test]
fn blank_ids_are_rejected() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("keep.js")).unwrap();

    let err = registry.register(ScriptDeclaration::new("")).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidId { .. }));
    assert!(registry.register(ScriptDeclaration::new("  ")).is_err());

    let err = registry
        .replace_all(vec![ScriptDeclaration::new("a.js"), ScriptDeclaration::new("")])
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidId { .. }));
    assert_eq!(err.context_note(), Some("Replacing declarations"));
    assert_eq!(ids(&registry), ["keep.js"]);
    assert!(!registry.contains(""));
}

#[test]
fn replace_all_is_atomic() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("keep.js")).unwrap();

    let err = registry
        .replace_all(vec![ScriptDeclaration::new("a.js"), ScriptDeclaration::new("a.js")])
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateId { .. }));
    assert_eq!(ids(&registry), ["keep.js"]);

    registry
        .replace_all(vec![ScriptDeclaration::new("b.js"), ScriptDeclaration::new("c.js")])
        .unwrap();
    assert_eq!(ids(&registry), ["b.js", "c.js"]);
    assert!(!registry.contains("keep.js"));
}

#[test]
fn bulk_edit_orders_by_sort_key_and_sets_debug_mode() {
    let registry = Registry::new();
    let edit = ScriptEdit {
        debug_mode: true,
        scripts: vec![
            ScriptRecord { sort: 2, declaration: ScriptDeclaration::new("c.js") },
            ScriptRecord { sort: 0, declaration: ScriptDeclaration::new("a.js") },
            ScriptRecord { sort: 1, declaration: ScriptDeclaration::new("b.js") },
        ],
    };

    registry.apply_edit(edit).unwrap();
    assert!(registry.debug_mode());
    assert_eq!(ids(&registry), ["a.js", "b.js", "c.js"]);
    assert_eq!(group_ids(&registry), ["a.js", "b.js", "c.js"]);
}

#[test]
fn declaration_lookup_returns_copies() {
    let registry = Registry::new();
    registry.register(ScriptDeclaration::new("a.js").with_inline(true)).unwrap();

    let mut copy = registry.declaration("a.js").unwrap();
    copy.inline = false;
    assert!(registry.declaration("a.js").unwrap().inline);
    assert!(registry.declaration("b.js").is_none());
}

#[test]
fn configuration_seeds_the_registry() {
    let config = RegistryConfig {
        debug_mode: false,
        synthetic_prefix: "bundle".into(),
        synthetic_suffix: ".js".into(),
        scripts: vec![ScriptDeclaration::new("a.js"), ScriptDeclaration::new("b.js")],
    };
    let registry = Registry::from_config(&config).unwrap();
    let merged = &group_ids(&registry)[0];
    assert!(merged.starts_with("bundle") && merged.ends_with(".js"));
    assert_eq!(registry.members(merged).unwrap(), ["a.js", "b.js"]);

    let duplicated = RegistryConfig {
        scripts: vec![ScriptDeclaration::new("a.js"), ScriptDeclaration::new("a.js")],
        ..RegistryConfig::default()
    };
    assert!(Registry::from_config(&duplicated).is_err());

    let blank = RegistryConfig { scripts: vec![ScriptDeclaration::new("")], ..RegistryConfig::default() };
    assert!(matches!(Registry::from_config(&blank).unwrap_err(), RegistryError::InvalidId { .. }));
}

#[test]
fn clones_share_state() {
    let registry = Registry::new();
    let handle = registry.clone();
    handle.register(ScriptDeclaration::new("a.js")).unwrap();
    assert!(registry.contains("a.js"));
}
