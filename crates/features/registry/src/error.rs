use crate::expression::EvaluationError;
use std::borrow::Cow;

/// Errors reported by registry mutations and delivery lookups.
///
/// Structural errors are raised before anything is committed: a failed call
/// leaves the registry exactly as it was.
#[sreg_derive::sreg_error]
pub enum RegistryError {
    /// A declaration with this id is already registered (or appears twice in a bulk edit).
    #[error("Duplicate script id{}: {message}", format_context(.context))]
    DuplicateId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A declaration id is empty or only whitespace.
    #[error("Invalid script id{}: {message}", format_context(.context))]
    InvalidId { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// No declaration or delivery unit carries this id.
    #[error("Script not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A reorder was requested with something other than `up` or `down`.
    #[error("Invalid move direction{}: {message}", format_context(.context))]
    InvalidDirection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A visibility expression failed for a reason other than a missing attribute.
    #[error("Expression evaluation failed{}: {source}", format_context(.context))]
    Evaluation { source: EvaluationError, context: Option<Cow<'static, str>> },
}

impl RegistryError {
    pub(crate) fn duplicate(id: &str) -> Self {
        Self::DuplicateId { message: id.to_owned().into(), context: None }
    }

    /// Rejects ids no content lookup or delivery url could use.
    pub(crate) fn check_id(id: &str) -> Result<(), Self> {
        if id.trim().is_empty() {
            return Err(Self::InvalidId { message: format!("'{id}'").into(), context: None });
        }
        Ok(())
    }

    pub(crate) fn not_found(id: &str) -> Self {
        Self::NotFound { message: id.to_owned().into(), context: None }
    }
}
