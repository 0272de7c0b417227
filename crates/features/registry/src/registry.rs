//! # Registry
//!
//! The ordered declaration list together with its cooked projection.
//!
//! Declarations, debug mode and the cooked state share one [`RwLock`]: every mutation
//! re-cooks under the same write guard, so a reader never sees declarations paired with a
//! stale cook. Structural checks run before anything is touched, which keeps failed
//! mutations free of side effects.

use crate::cooker::{CookedGroup, CookedState, SyntheticIds, cook};
use crate::error::{RegistryError, RegistryErrorExt};
use fxhash::FxHashSet;
use parking_lot::RwLock;
use sreg_domain::config::RegistryConfig;
use sreg_domain::script::{Direction, ScriptDeclaration, ScriptEdit};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct RegistryState {
    scripts: Vec<ScriptDeclaration>,
    debug_mode: bool,
    cooked: CookedState,
    ids: SyntheticIds,
}

impl RegistryState {
    fn recook(&mut self) {
        self.cooked = cook(&self.scripts, self.debug_mode, &self.ids);
        debug!(
            declarations = self.scripts.len(),
            groups = self.cooked.groups().len(),
            debug_mode = self.debug_mode,
            "Scripts cooked"
        );
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.scripts.iter().position(|s| s.id == id)
    }
}

/// A member of a delivery unit, as the resolver needs it.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub(crate) id: String,
    pub(crate) expression: String,
}

/// Members of one effective id and the debug mode they were cooked under.
#[derive(Debug, Clone)]
pub(crate) struct Expansion {
    pub(crate) members: Vec<Member>,
    pub(crate) debug_mode: bool,
}

/// Shared handle to one script registry. Clones refer to the same registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<RegistryState>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry minting synthetic ids with a custom naming scheme.
    #[must_use]
    pub fn with_synthetic_ids(ids: SyntheticIds) -> Self {
        let state = RegistryState { ids, ..RegistryState::default() };
        Self { inner: Arc::new(RwLock::new(state)) }
    }

    /// Builds a registry from configuration, registering the configured scripts in order.
    ///
    /// # Errors
    /// [`RegistryError::InvalidId`] or [`RegistryError::DuplicateId`] if the configured
    /// scripts carry a blank or repeated id.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let registry = Self::with_synthetic_ids(SyntheticIds::new(
            &config.synthetic_prefix,
            &config.synthetic_suffix,
        ));
        registry.apply(config.scripts.clone(), Some(config.debug_mode))?;
        Ok(registry)
    }

    // --- Mutations ---

    /// Appends a declaration.
    ///
    /// # Errors
    /// * [`RegistryError::InvalidId`] if the id is empty or blank.
    /// * [`RegistryError::DuplicateId`] if the id is already registered, enabled or not.
    pub fn register(&self, declaration: ScriptDeclaration) -> Result<(), RegistryError> {
        RegistryError::check_id(&declaration.id)?;
        let mut state = self.inner.write();
        if state.position(&declaration.id).is_some() {
            return Err(RegistryError::duplicate(&declaration.id));
        }

        info!(id = %declaration.id, "Script registered");
        state.scripts.push(declaration);
        state.recook();
        Ok(())
    }

    /// Removes the declaration with `id`. Returns whether anything was removed.
    pub fn unregister(&self, id: &str) -> bool {
        let mut state = self.inner.write();
        let before = state.scripts.len();
        state.scripts.retain(|s| s.id != id);
        let removed = state.scripts.len() != before;

        if removed {
            info!(%id, "Script unregistered");
        }
        state.recook();
        removed
    }

    /// Swaps the declaration with its neighbour. Moving past either end is a no-op.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if no declaration has this id.
    pub fn move_script(&self, id: &str, direction: Direction) -> Result<(), RegistryError> {
        let mut state = self.inner.write();
        let index = state.position(id).ok_or_else(|| RegistryError::not_found(id))?;

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < state.scripts.len()),
        };
        if let Some(target) = target {
            state.scripts.swap(index, target);
            info!(%id, %direction, "Script moved");
        }
        state.recook();
        Ok(())
    }

    /// [`Registry::move_script`] with a textual direction (`"up"` / `"down"`).
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] for an unknown id, then
    /// [`RegistryError::InvalidDirection`] for any other direction text.
    pub fn move_script_named(&self, id: &str, direction: &str) -> Result<(), RegistryError> {
        if self.inner.read().position(id).is_none() {
            return Err(RegistryError::not_found(id));
        }
        let direction = Direction::parse(direction).ok_or_else(|| RegistryError::InvalidDirection {
            message: direction.to_owned().into(),
            context: Some(format!("Moving script '{id}'").into()),
        })?;
        self.move_script(id, direction)
    }

    /// Replaces every declaration at once.
    ///
    /// # Errors
    /// [`RegistryError::InvalidId`] for a blank id, [`RegistryError::DuplicateId`] if
    /// `declarations` repeats an id; nothing is replaced either way.
    pub fn replace_all(&self, declarations: Vec<ScriptDeclaration>) -> Result<(), RegistryError> {
        self.apply(declarations, None)
    }

    /// Applies a bulk edit: rows are ordered by their sort key, then the debug flag and the
    /// declarations are committed together.
    ///
    /// # Errors
    /// [`RegistryError::InvalidId`] or [`RegistryError::DuplicateId`] as for
    /// [`Registry::replace_all`]; nothing is applied.
    pub fn apply_edit(&self, edit: ScriptEdit) -> Result<(), RegistryError> {
        let debug_mode = edit.debug_mode;
        self.apply(edit.into_ordered(), Some(debug_mode))
    }

    /// Empties the registry. The cooked state is reset, not recomputed.
    pub fn clear(&self) {
        let mut state = self.inner.write();
        state.scripts.clear();
        state.cooked = CookedState::default();
        info!("Registry cleared");
    }

    pub fn set_debug_mode(&self, debug_mode: bool) {
        let mut state = self.inner.write();
        state.debug_mode = debug_mode;
        info!(debug_mode, "Debug mode changed");
        state.recook();
    }

    fn apply(
        &self,
        declarations: Vec<ScriptDeclaration>,
        debug_mode: Option<bool>,
    ) -> Result<(), RegistryError> {
        for declaration in &declarations {
            RegistryError::check_id(&declaration.id).context("Replacing declarations")?;
        }

        let mut seen = FxHashSet::default();
        if let Some(dup) = declarations.iter().find(|d| !seen.insert(d.id.as_str())) {
            return Err(RegistryError::DuplicateId {
                message: dup.id.clone().into(),
                context: Some("Replacing declarations".into()),
            });
        }

        let mut state = self.inner.write();
        if let Some(debug_mode) = debug_mode {
            state.debug_mode = debug_mode;
        }
        info!(count = declarations.len(), debug_mode = state.debug_mode, "Declarations replaced");
        state.scripts = declarations;
        state.recook();
        Ok(())
    }

    // --- Reads ---

    /// A copy of the declarations in delivery order.
    #[must_use]
    pub fn declarations(&self) -> Vec<ScriptDeclaration> {
        self.inner.read().scripts.clone()
    }

    #[must_use]
    pub fn declaration(&self, id: &str) -> Option<ScriptDeclaration> {
        let state = self.inner.read();
        state.position(id).map(|i| state.scripts[i].clone())
    }

    #[must_use]
    pub fn debug_mode(&self) -> bool {
        self.inner.read().debug_mode
    }

    /// A snapshot of the current groups and membership.
    #[must_use]
    pub fn cooked(&self) -> CookedState {
        self.inner.read().cooked.clone()
    }

    /// Whether `id` is deliverable, as a declaration or a synthetic group.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().cooked.contains(id)
    }

    /// The ordered declaration ids `id` delivers.
    #[must_use]
    pub fn members(&self, id: &str) -> Option<Vec<String>> {
        self.inner.read().cooked.members(id).map(<[String]>::to_vec)
    }

    pub(crate) fn groups(&self) -> Vec<CookedGroup> {
        self.inner.read().cooked.groups().to_vec()
    }

    /// Expands an effective id to its members, their expressions and the debug mode,
    /// all under one read guard.
    pub(crate) fn expand(&self, id: &str) -> Result<Expansion, RegistryError> {
        let state = self.inner.read();
        let members = state.cooked.members(id).ok_or_else(|| RegistryError::not_found(id))?;

        let members = members
            .iter()
            .map(|member| Member {
                id: member.clone(),
                expression: state
                    .position(member)
                    .map(|i| state.scripts[i].expression.clone())
                    .unwrap_or_default(),
            })
            .collect();
        Ok(Expansion { members, debug_mode: state.debug_mode })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(ids: &[&str]) -> Registry {
        let registry = Registry::new();
        for id in ids {
            registry.register(ScriptDeclaration::new(*id)).unwrap();
        }
        registry
    }

    fn order(registry: &Registry) -> Vec<String> {
        registry.declarations().into_iter().map(|d| d.id).collect()
    }

    #[test]
    fn register_rejects_duplicates_without_side_effects() {
        let registry = registry(&["a.js"]);
        let before = registry.cooked();

        let err = registry
            .register(ScriptDeclaration::new("a.js").with_enabled(false))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateId { .. }));
        assert_eq!(registry.declarations().len(), 1);
        assert_eq!(registry.cooked(), before);
    }

    #[test]
    fn unregister_is_a_no_op_for_unknown_ids() {
        let registry = registry(&["a.js", "b.js"]);
        assert!(!registry.unregister("missing.js"));
        assert!(registry.unregister("a.js"));
        assert_eq!(order(&registry), ["b.js"]);
        assert!(!registry.contains("a.js"));
    }

    #[test]
    fn moves_stop_at_the_boundaries() {
        let registry = registry(&["a.js", "b.js", "c.js"]);

        registry.move_script("a.js", Direction::Up).unwrap();
        assert_eq!(order(&registry), ["a.js", "b.js", "c.js"]);

        registry.move_script("a.js", Direction::Down).unwrap();
        assert_eq!(order(&registry), ["b.js", "a.js", "c.js"]);

        registry.move_script("c.js", Direction::Down).unwrap();
        assert_eq!(order(&registry), ["b.js", "a.js", "c.js"]);
    }

    #[test]
    fn named_moves_validate_id_then_direction() {
        let registry = registry(&["a.js", "b.js"]);

        assert!(matches!(
            registry.move_script_named("missing.js", "sideways").unwrap_err(),
            RegistryError::NotFound { .. }
        ));
        assert!(matches!(
            registry.move_script_named("a.js", "sideways").unwrap_err(),
            RegistryError::InvalidDirection { .. }
        ));
        registry.move_script_named("b.js", "up").unwrap();
        assert_eq!(order(&registry), ["b.js", "a.js"]);
    }

    #[test]
    fn clear_drops_the_cooked_state() {
        let registry = registry(&["a.js", "b.js"]);
        registry.clear();
        assert!(registry.declarations().is_empty());
        assert!(registry.cooked().groups().is_empty());
        assert!(registry.cooked().membership().is_empty());
    }

    #[test]
    fn expand_carries_member_expressions() {
        let registry = Registry::new();
        registry.register(ScriptDeclaration::new("a.js").with_expression("member")).unwrap();
        registry.register(ScriptDeclaration::new("b.js").with_expression("member")).unwrap();

        let synthetic = registry.cooked().groups()[0].id.clone();
        let expansion = registry.expand(&synthetic).unwrap();
        assert_eq!(expansion.members.len(), 2);
        assert_eq!(expansion.members[1].id, "b.js");
        assert_eq!(expansion.members[1].expression, "member");
        assert!(!expansion.debug_mode);
        assert!(registry.expand("nope.js").is_err());
    }

    #[test]
    fn expand_reports_the_debug_mode_it_saw() {
        let registry = registry(&["a.js", "b.js"]);
        registry.set_debug_mode(true);

        let expansion = registry.expand("a.js").unwrap();
        assert!(expansion.debug_mode);
        assert_eq!(expansion.members.len(), 1);
    }
}
