//! # Visibility Expressions
//!
//! Every declaration may carry a visibility expression that is evaluated against the
//! [`RenderContext`] of a request. The registry only depends on the
//! [`ExpressionEvaluator`] contract; [`PathEvaluator`] is the bundled implementation.
//!
//! ## Evaluator Contract
//! * `Ok(bool)`: the member is visible or hidden.
//! * [`EvaluationError::MissingAttribute`]: the context lacks something the expression
//!   refers to. Callers treat the member as **visible** (fail open).
//! * Any other error is propagated to the caller.
//!
//! ## Path Syntax
//! ```text
//! member                   truthiness of context["member"]
//! path:portal/anonymous    nested lookup, `path:` is optional
//! not: member              negation of any other expression
//! exists: portal/theme     true when the path resolves, never fails
//! user/role | default      first alternative that resolves
//! ```

use serde_json::{Map, Value};
use std::borrow::Cow;

const NOT: &str = "not";
const PATH: &str = "path";
const EXISTS: &str = "exists";

#[sreg_derive::sreg_error]
pub enum EvaluationError {
    /// The context does not provide an attribute the expression refers to.
    #[error("Missing attribute{}: {message}", format_context(.context))]
    MissingAttribute { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The expression uses a syntax this evaluator cannot run.
    #[error("Unsupported expression{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl EvaluationError {
    /// Whether the error belongs to the fail-open class.
    #[must_use]
    pub const fn is_missing_attribute(&self) -> bool {
        matches!(self, Self::MissingAttribute { .. })
    }
}

/// Request-scoped data visibility expressions are evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    attributes: Map<String, Value>,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a top-level attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Resolves a `/`-separated path through nested objects.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/').map(str::trim).filter(|s| !s.is_empty());
        let mut current = self.attributes.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl TryFrom<Value> for RenderContext {
    type Error = EvaluationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(attributes) => Ok(Self { attributes }),
            other => Err(EvaluationError::Unsupported {
                message: other.to_string().into(),
                context: Some("Render context must be a JSON object".into()),
            }),
        }
    }
}

/// Evaluates visibility expressions.
pub trait ExpressionEvaluator: Send + Sync {
    /// Evaluates `expression` against `context`.
    ///
    /// # Errors
    /// See the module-level contract: [`EvaluationError::MissingAttribute`] is the fail-open class.
    fn evaluate(&self, expression: &str, context: &RenderContext) -> Result<bool, EvaluationError>;
}

/// Path-expression evaluator over a [`RenderContext`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator;

impl ExpressionEvaluator for PathEvaluator {
    fn evaluate(&self, expression: &str, context: &RenderContext) -> Result<bool, EvaluationError> {
        let expression = expression.trim();
        match split_prefix(expression) {
            Some((NOT, rest)) => self.evaluate(rest, context).map(|visible| !visible),
            Some((EXISTS, rest)) => Ok(first_match(rest, context).is_some()),
            Some((PATH, rest)) => resolve_paths(rest, context).map(truthy),
            Some((other, _)) => Err(EvaluationError::Unsupported {
                message: expression.to_owned().into(),
                context: Some(format!("Unknown expression type '{other}'").into()),
            }),
            None => resolve_paths(expression, context).map(truthy),
        }
    }
}

/// Splits `type: body` when the head is a bare lowercase word.
fn split_prefix(expression: &str) -> Option<(&str, &str)> {
    let (head, rest) = expression.split_once(':')?;
    let head = head.trim();
    let is_word = !head.is_empty() && head.chars().all(|c| c.is_ascii_lowercase());
    is_word.then(|| (head, rest.trim()))
}

fn first_match<'a>(alternatives: &str, context: &'a RenderContext) -> Option<&'a Value> {
    alternatives.split('|').map(str::trim).find_map(|path| context.lookup(path))
}

fn resolve_paths<'a>(
    alternatives: &str,
    context: &'a RenderContext,
) -> Result<&'a Value, EvaluationError> {
    first_match(alternatives, context).ok_or_else(|| EvaluationError::MissingAttribute {
        message: alternatives.to_owned().into(),
        context: None,
    })
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > f64::EPSILON),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
