//! # Script Registry
//!
//! An ordered registry of script declarations that is "cooked" into delivery groups and
//! served per request.
//!
//! ## Architecture
//!
//! 1.  **Registry ([`Registry`]):** the ordered declarations and their unique ids. Every
//!     mutation re-cooks before it returns.
//! 2.  **Cooker ([`cooker`]):** merges runs of adjacent enabled declarations that share a
//!     visibility expression and embedding mode into synthetic groups, and maps every
//!     effective id to the declaration ids it delivers.
//! 3.  **Resolver ([`Resolver`]):** filters a group's members by visibility, concatenates
//!     their content and attaches serving metadata.
//!
//! Content and visibility are host concerns, reached through [`ContentLookup`] and
//! [`ExpressionEvaluator`].
//!
//! ## Example
//! ```
//! use sreg_registry::{PathEvaluator, Registry, Resolver, StaticContent};
//! use sreg_registry::domain::script::ScriptDeclaration;
//!
//! let registry = Registry::new();
//! registry.register(ScriptDeclaration::new("a.js")).unwrap();
//! registry.register(ScriptDeclaration::new("b.js")).unwrap();
//!
//! let content = StaticContent::new().with("a.js", "a();").with("b.js", "b();");
//! let resolver = Resolver::new(&registry, &content, &PathEvaluator);
//!
//! let merged = registry.cooked().groups()[0].id.clone();
//! assert!(merged.starts_with("mergedScripts"));
//!
//! let text = resolver.resolve(&merged, None).unwrap();
//! assert!(text.contains("/* ----- b.js ----- */\nb();"));
//! ```

pub mod content;
pub mod cooker;
pub mod delivery;
mod error;
pub mod expression;
mod registry;
mod resolver;

pub use crate::content::{ContentError, ContentLookup, ContentSource, DirectoryContent, StaticContent};
pub use crate::cooker::{CookedGroup, CookedState, SyntheticIds};
pub use crate::delivery::{CachePolicy, Delivery, EncodingProvider, StandardDelivery};
pub use crate::error::{RegistryError, RegistryErrorExt};
pub use crate::expression::{EvaluationError, ExpressionEvaluator, PathEvaluator, RenderContext};
pub use crate::registry::Registry;
pub use crate::resolver::Resolver;
pub use sreg_domain as domain;
