use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "SREG";
/// File stem probed (`sreg.toml`, `sreg.json`, ...) when no explicit path is given.
pub const DEFAULT_CONFIG_STEM: &str = "sreg";

#[sreg_derive::sreg_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered under environment overrides.
///
/// 1. **Base File**: an explicit `path` must exist. Without one, `sreg.*` in the working
///    directory is used if present, otherwise every setting keeps its default.
/// 2. **Environment Overrides**: variables prefixed with `SREG__`; nested keys use double
///    underscores (e.g., `SREG__REGISTRY__DEBUG_MODE=true` maps to `registry.debug_mode`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing, a source is malformed, or
/// the merged settings do not match `T`.
///
/// # Example
/// ```rust
/// use sreg_kernel::config::load_config;
/// use sreg_kernel::domain::config::AppConfig;
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match &path {
        Some(p) => File::from(p.as_ref()).required(true),
        None => File::with_name(DEFAULT_CONFIG_STEM).required(false),
    };

    match &path {
        Some(p) => info!(path = %p.as_ref().display(), "Loading config"),
        None => info!(stem = DEFAULT_CONFIG_STEM, "Loading optional default config"),
    }

    let config = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
