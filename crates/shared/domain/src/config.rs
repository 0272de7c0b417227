use crate::constants::{
    CACHE_DURATION_SECONDS, CONTENT_TYPE, SYNTHETIC_PREFIX, SYNTHETIC_SUFFIX,
};
use crate::script::ScriptDeclaration;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration shared by the registry and its hosts.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub registry: RegistryConfig,
    pub delivery: DeliveryConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Registry behaviour and the initial declaration set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Disables merging of adjacent declarations.
    pub debug_mode: bool,
    pub synthetic_prefix: String,
    pub synthetic_suffix: String,
    /// Declarations registered at startup, in delivery order.
    pub scripts: Vec<ScriptDeclaration>,
}

/// Caching and content-type metadata for delivered content.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub cache_duration_seconds: u64,
    pub content_type: String,
    /// Overrides the host-provided charset.
    pub charset: Option<String>,
    /// Per-member lookup budget; slower lookups are reported.
    pub member_budget_ms: u64,
}

/// Where file-backed content lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub json: bool,
}

// --- Default ---

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            debug_mode: false,
            synthetic_prefix: SYNTHETIC_PREFIX.to_owned(),
            synthetic_suffix: SYNTHETIC_SUFFIX.to_owned(),
            scripts: Vec::new(),
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            cache_duration_seconds: CACHE_DURATION_SECONDS,
            content_type: CONTENT_TYPE.to_owned(),
            charset: None,
            member_budget_ms: 250,
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("scripts") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), directory: None, json: false }
    }
}
