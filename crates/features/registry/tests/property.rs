use proptest::prelude::*;
use sreg_registry::domain::script::{Direction, ScriptDeclaration};
use sreg_registry::*;

#[derive(Debug, Clone)]
enum Op {
    Register { id: u8, expression: u8, inline: bool, enabled: bool },
    Unregister(u8),
    Move(u8, bool),
    Debug(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..8, 0u8..2, any::<bool>(), any::<bool>())
            .prop_map(|(id, expression, inline, enabled)| Op::Register { id, expression, inline, enabled }),
        1 => (0u8..8).prop_map(Op::Unregister),
        2 => (0u8..8, any::<bool>()).prop_map(|(id, up)| Op::Move(id, up)),
        1 => any::<bool>().prop_map(Op::Debug),
    ]
}

fn script_id(n: u8) -> String {
    format!("s{n}.js")
}

fn apply(registry: &Registry, op: &Op) {
    match op {
        Op::Register { id, expression, inline, enabled } => {
            let declaration = ScriptDeclaration::new(script_id(*id))
                .with_expression(if *expression == 0 { "" } else { "member" })
                .with_inline(*inline)
                .with_enabled(*enabled);
            let _ = registry.register(declaration);
        },
        Op::Unregister(id) => {
            registry.unregister(&script_id(*id));
        },
        Op::Move(id, up) => {
            let direction = if *up { Direction::Up } else { Direction::Down };
            let _ = registry.move_script(&script_id(*id), direction);
        },
        Op::Debug(on) => registry.set_debug_mode(*on),
    }
}

proptest! {
    #[test]
    fn every_declaration_maps_to_itself(ops in proptest::collection::vec(op(), 0..40)) {
        let registry = Registry::new();
        for op in &ops {
            apply(&registry, op);
        }

        let cooked = registry.cooked();
        for declaration in registry.declarations() {
            let expected = [declaration.id.clone()];
            prop_assert_eq!(cooked.members(&declaration.id), Some(&expected[..]));
        }
    }

    #[test]
    fn groups_cover_enabled_declarations_in_order(ops in proptest::collection::vec(op(), 0..40)) {
        let registry = Registry::new();
        for op in &ops {
            apply(&registry, op);
        }

        let cooked = registry.cooked();
        let delivered: Vec<String> = cooked
            .composition()
            .into_iter()
            .flat_map(|(_, members)| members.to_vec())
            .collect();
        let enabled: Vec<String> =
            registry.declarations().into_iter().filter(|d| d.enabled).map(|d| d.id).collect();
        prop_assert_eq!(delivered, enabled);
    }

    #[test]
    fn recooking_without_mutation_is_stable(ops in proptest::collection::vec(op(), 0..40)) {
        let registry = Registry::new();
        for op in &ops {
            apply(&registry, op);
        }

        let before = registry.cooked();
        registry.set_debug_mode(registry.debug_mode());
        prop_assert_eq!(before, registry.cooked());
    }
}
