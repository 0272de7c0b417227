//! # Content Lookup
//!
//! The registry never reads script bodies itself: a host-provided [`ContentLookup`]
//! turns a declaration id into a [`ContentSource`], and the resolver renders that
//! source to text.
//!
//! Two lookups ship with the crate:
//! * [`StaticContent`]: an in-memory table, handy for embedded assets and tests.
//! * [`DirectoryContent`]: files under a root directory, with traversal protection.

use crate::expression::RenderContext;
use fxhash::FxHashMap;
use std::borrow::Cow;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

#[sreg_derive::sreg_error]
pub enum ContentError {
    /// Nothing is published under the requested id.
    #[error("Content not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The id would resolve outside the content root.
    #[error("Content id rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Content I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}

impl ContentError {
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Renders content for a request; used for generated scripts.
pub type RenderFn = dyn Fn(Option<&RenderContext>) -> String + Send + Sync;

/// The kinds of content a lookup may hand back.
#[derive(Clone)]
pub enum ContentSource {
    /// Ready-made script text.
    Text(String),
    /// Raw file bytes, decoded as UTF-8 (invalid sequences are replaced).
    Bytes(Vec<u8>),
    /// A callable producing text for the current request.
    Rendered(Arc<RenderFn>),
}

impl ContentSource {
    pub fn rendered<F>(render: F) -> Self
    where
        F: Fn(Option<&RenderContext>) -> String + Send + Sync + 'static,
    {
        Self::Rendered(Arc::new(render))
    }

    /// Produces the text to deliver for this source.
    #[must_use]
    pub fn render(&self, context: Option<&RenderContext>) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Bytes(bytes) => String::from_utf8_lossy(bytes),
            Self::Rendered(render) => Cow::Owned(render(context)),
        }
    }
}

impl fmt::Debug for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Rendered(_) => f.write_str("Rendered(..)"),
        }
    }
}

impl From<String> for ContentSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ContentSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Resolves a declaration id to its content.
pub trait ContentLookup: Send + Sync {
    /// # Errors
    /// [`ContentError::NotFound`] when nothing is published under `id`; other variants for
    /// lookups that exist but cannot be read.
    fn fetch(&self, id: &str, context: Option<&RenderContext>) -> Result<ContentSource, ContentError>;
}

/// In-memory content table.
#[derive(Debug, Clone, Default)]
pub struct StaticContent {
    entries: FxHashMap<String, ContentSource>,
}

impl StaticContent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, id: impl Into<String>, source: impl Into<ContentSource>) -> Self {
        self.insert(id, source);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, source: impl Into<ContentSource>) {
        self.entries.insert(id.into(), source.into());
    }
}

impl ContentLookup for StaticContent {
    fn fetch(&self, id: &str, _context: Option<&RenderContext>) -> Result<ContentSource, ContentError> {
        self.entries.get(id).cloned().ok_or_else(|| ContentError::NotFound {
            message: id.to_owned().into(),
            context: Some("Static content table".into()),
        })
    }
}

/// Serves files below `root`, addressing them by declaration id.
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    root: PathBuf,
}

impl DirectoryContent {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `id` to the root, refusing anything that could leave it.
    fn locate(&self, id: &str) -> Result<PathBuf, ContentError> {
        let relative = Path::new(id);
        let mut safe = PathBuf::new();

        for component in relative.components() {
            match component {
                Component::Normal(segment) => safe.push(segment),
                Component::CurDir => {},
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ContentError::Rejected {
                        message: id.to_owned().into(),
                        context: Some("Content ids must stay inside the content root".into()),
                    });
                },
            }
        }

        if safe.as_os_str().is_empty() {
            return Err(ContentError::Rejected {
                message: id.to_owned().into(),
                context: Some("Empty content id".into()),
            });
        }

        Ok(self.root.join(safe))
    }
}

impl ContentLookup for DirectoryContent {
    fn fetch(&self, id: &str, _context: Option<&RenderContext>) -> Result<ContentSource, ContentError> {
        let path = self.locate(id)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(ContentSource::Bytes(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ContentError::NotFound {
                message: id.to_owned().into(),
                context: Some(format!("No file at {}", path.display()).into()),
            }),
            Err(e) => Err(ContentError::Io {
                source: e,
                context: Some(format!("Failed to read {}", path.display()).into()),
            }),
        }
    }
}
