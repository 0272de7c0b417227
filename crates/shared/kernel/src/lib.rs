//! Kernel utilities shared across the registry crates.
//! Keep this crate lightweight; it re-exports the domain and provides layered config loading.
//!
//! ## Config loading
//! ```rust,ignore
//! use sreg_kernel::config::load_config;
//! use sreg_kernel::domain::config::AppConfig;
//!
//! let cfg: AppConfig = load_config(Some("sreg.toml")).unwrap();
//! ```

pub mod config;

pub use sreg_domain as domain;
