//! Facade crate for the script registry.
//! Re-exports domain/kernel primitives and composes the registry with its file-backed
//! collaborators.
//! Keep this crate thin: it should compose other crates, not implement registry logic.
//!
//! ## Usage
//! - Build a [`ScriptHost`] from an [`AppConfig`] (or load one with [`ScriptHost::load`]).
//! - Use [`ScriptHost::resolver`] for `resolve`, `resolve_ordered` and `deliver`.

use std::borrow::Cow;
use std::path::Path;

pub use sreg_domain as domain;
pub use sreg_kernel as kernel;
pub use sreg_registry as registry;

use sreg_domain::config::AppConfig;
use sreg_kernel::config::{ConfigError, load_config};
use sreg_registry::{DirectoryContent, PathEvaluator, Registry, RegistryError, Resolver};

#[sreg_derive::sreg_error]
pub enum HostError {
    #[error("{source}")]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Registry setup failed{}: {source}", format_context(.context))]
    Registry { source: RegistryError, context: Option<Cow<'static, str>> },
}

/// A registry wired to directory content and the path evaluator, configured from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ScriptHost {
    config: AppConfig,
    registry: Registry,
    content: DirectoryContent,
    evaluator: PathEvaluator,
}

impl ScriptHost {
    /// Loads configuration (see [`load_config`]) and builds a host from it.
    ///
    /// # Errors
    /// [`HostError::Config`] when configuration cannot be loaded,
    /// [`HostError::Registry`] when the configured scripts repeat an id.
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, HostError> {
        let config: AppConfig = load_config(path)?;
        Self::from_config(config)
    }

    /// # Errors
    /// [`HostError::Registry`] when the configured scripts repeat an id.
    pub fn from_config(config: AppConfig) -> Result<Self, HostError> {
        let registry =
            Registry::from_config(&config.registry).context("Registering configured scripts")?;
        let content = DirectoryContent::new(&config.content.root);

        tracing::info!(
            scripts = config.registry.scripts.len(),
            root = %config.content.root.display(),
            "Script host ready"
        );
        Ok(Self { config, registry, content, evaluator: PathEvaluator })
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// A resolver using the configured delivery policy.
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.registry, &self.content, &self.evaluator)
            .with_delivery_config(&self.config.delivery)
    }
}
