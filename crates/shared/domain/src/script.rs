use crate::constants::{DOWN, UP};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata of one registered script.
///
/// Declarations are plain values: the registry hands out copies and never
/// shares its own storage. Only `id` is required when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptDeclaration {
    /// Unique identifier, also the name the content is looked up by.
    pub id: String,
    /// Visibility condition. Empty means always visible.
    #[serde(default)]
    pub expression: String,
    /// Whether hosts should embed the delivered content inline instead of linking it.
    #[serde(default)]
    pub inline: bool,
    /// Disabled declarations are kept but never cooked into a delivery group.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

impl Default for ScriptDeclaration {
    fn default() -> Self {
        Self { id: String::new(), expression: String::new(), inline: false, enabled: true }
    }
}

impl ScriptDeclaration {
    /// An enabled, always-visible, linked declaration.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    #[must_use]
    pub const fn with_inline(mut self, inline: bool) -> Self {
        self.inline = inline;
        self
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Direction of a single-step reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Parses the textual direction used by management surfaces (`"up"` / `"down"`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            UP => Some(Self::Up),
            DOWN => Some(Self::Down),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => UP,
            Self::Down => DOWN,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a bulk edit submitted by a management surface.
///
/// Rows arrive in form order; `sort` carries the order the editor chose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub sort: i64,
    #[serde(flatten)]
    pub declaration: ScriptDeclaration,
}

/// A complete bulk edit: the new debug flag plus every declaration row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptEdit {
    pub debug_mode: bool,
    pub scripts: Vec<ScriptRecord>,
}

impl ScriptEdit {
    /// Returns the declarations ordered by their `sort` key.
    ///
    /// The sort is stable, so rows sharing a key keep their submitted order.
    #[must_use]
    pub fn into_ordered(self) -> Vec<ScriptDeclaration> {
        let mut records = self.scripts;
        records.sort_by_key(|record| record.sort);
        records.into_iter().map(|record| record.declaration).collect()
    }
}
