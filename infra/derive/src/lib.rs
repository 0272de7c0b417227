#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the registry workspace.
//! Today this is a single attribute macro, [`macro@sreg_error`], which turns a plain enum into an
//! error type wired for `?` propagation and context annotation.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! sreg-derive = { path = "../infra/derive" }
//! thiserror = "2"
//! ```

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Context Accessor**: Generates `context_note()` returning the attached context, if any.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field
///   (or a field marked `#[source]`/`#[from]`), enabling `?` on upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping external errors must also carry the `context` field.
/// 4. Tuple or unit variants are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use sreg_derive::sreg_error;
/// use std::borrow::Cow;
///
/// #[sreg_error]
/// pub enum LoadError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, LoadError> {
///     std::fs::read_to_string(path).context("Reading script source")
/// }
/// ```
#[proc_macro_attribute]
pub fn sreg_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}
