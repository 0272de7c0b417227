use sreg_derive::sreg_error;
use std::borrow::Cow;

#[sreg_error]
pub enum LookupError {
    #[error("Missing script{}: {id}", format_context(.context))]
    Missing { id: String, context: Option<Cow<'static, str>> },

    #[error("Read failure{}: {source}", format_context(.context))]
    Read { source: std::io::Error, context: Option<Cow<'static, str>> },
}

fn missing() -> Result<(), LookupError> {
    Err(LookupError::Missing { id: "a.js".to_owned(), context: None })
}

fn unreadable() -> Result<(), LookupError> {
    Err(std::io::Error::other("disk")).context("Reading a.js")
}

fn main() {
    let err = missing().context("Resolving group").unwrap_err();
    assert_eq!(err.context_note(), Some("Resolving group"));
    assert_eq!(err.to_string(), "Missing script (Resolving group): a.js");

    let err = unreadable().unwrap_err();
    assert!(matches!(err, LookupError::Read { .. }));
    assert_eq!(err.context_note(), Some("Reading a.js"));
}
