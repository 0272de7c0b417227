//! # Resolver
//!
//! Read side of the registry. A [`Resolver`] borrows a [`Registry`] together with the
//! host collaborators (content lookup, expression evaluator, delivery policies) and turns
//! an effective id into delivered text.
//!
//! ## Composite Layout
//! A delivery unit with a single member is delivered as that member's content. A unit with
//! several members starts with a banner, and every visible member is preceded by a
//! delimiter naming its id:
//! ```text
//! /* Merged script file ... */
//!
//! /* ----- a.js ----- */
//! ...content of a.js...
//!
//! /* ----- b.js ----- */
//! ...content of b.js...
//! ```
//! Lookup failures never abort a response; the member is replaced by an error marker.

use crate::content::{ContentError, ContentLookup};
use crate::cooker::CookedGroup;
use crate::delivery::{CachePolicy, EncodingProvider, StandardDelivery};
use crate::error::RegistryError;
use crate::expression::{ExpressionEvaluator, RenderContext};
use crate::registry::{Expansion, Member, Registry};
use sreg_domain::config::DeliveryConfig;
use sreg_domain::constants::CONTENT_TYPE;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

const BANNER: &str = "/* Merged script file\n * \
    This file is assembled from separate scripts at delivery time.\n * \
    License or copyright notes inside a section apply to that section only.\n * \
    Sections are separated by ----- id ----- markers.\n */\n";

pub struct Resolver<'a> {
    registry: &'a Registry,
    content: &'a dyn ContentLookup,
    evaluator: &'a dyn ExpressionEvaluator,
    pub(crate) cache: &'a dyn CachePolicy,
    pub(crate) encoding: &'a dyn EncodingProvider,
    pub(crate) media_type: &'a str,
    member_budget: Option<Duration>,
}

impl fmt::Debug for Resolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("registry", self.registry)
            .field("media_type", &self.media_type)
            .field("member_budget", &self.member_budget)
            .finish_non_exhaustive()
    }
}

impl<'a> Resolver<'a> {
    /// A resolver with the standard delivery policy and no latency budget.
    pub fn new(
        registry: &'a Registry,
        content: &'a dyn ContentLookup,
        evaluator: &'a dyn ExpressionEvaluator,
    ) -> Self {
        Self {
            registry,
            content,
            evaluator,
            cache: &StandardDelivery,
            encoding: &StandardDelivery,
            media_type: CONTENT_TYPE,
            member_budget: None,
        }
    }

    /// Takes cache lifetime, charset, media type and member budget from configuration.
    #[must_use]
    pub fn with_delivery_config(mut self, config: &'a DeliveryConfig) -> Self {
        self.cache = config;
        self.encoding = config;
        self.media_type = &config.content_type;
        self.member_budget = Some(Duration::from_millis(config.member_budget_ms));
        self
    }

    #[must_use]
    pub fn with_cache_policy(mut self, cache: &'a dyn CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: &'a dyn EncodingProvider) -> Self {
        self.encoding = encoding;
        self
    }

    /// Members whose lookup takes longer than `budget` are still delivered, but reported.
    #[must_use]
    pub const fn with_member_budget(mut self, budget: Duration) -> Self {
        self.member_budget = Some(budget);
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Delivers the text of an effective id, filtered by each member's visibility.
    ///
    /// Without a context every member is visible.
    ///
    /// # Errors
    /// * [`RegistryError::NotFound`] if `id` is neither a declaration nor a synthetic group.
    /// * [`RegistryError::Evaluation`] if a visibility expression fails for a reason other
    ///   than a missing attribute.
    pub fn resolve(
        &self,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<String, RegistryError> {
        self.render(id, &self.registry.expand(id)?, context)
    }

    /// Concatenates the visible members of an expansion taken earlier.
    pub(crate) fn render(
        &self,
        id: &str,
        expansion: &Expansion,
        context: Option<&RenderContext>,
    ) -> Result<String, RegistryError> {
        let members = &expansion.members;
        let composite = members.len() > 1;

        let mut out = String::new();
        if composite {
            out.push_str(BANNER);
        }

        for member in members {
            if !self.is_visible(&member.id, &member.expression, context)? {
                trace!(%id, member = %member.id, "Member hidden");
                continue;
            }
            self.append_member(&mut out, member, context, composite);
        }

        Ok(out)
    }

    /// The cooked groups visible in `context`, last group first.
    ///
    /// Groups are filtered by the expression of their first declaration only; per-member
    /// filtering happens in [`Resolver::resolve`].
    ///
    /// # Errors
    /// [`RegistryError::Evaluation`] as for [`Resolver::resolve`].
    pub fn resolve_ordered(
        &self,
        context: Option<&RenderContext>,
    ) -> Result<Vec<CookedGroup>, RegistryError> {
        let mut visible = Vec::new();
        for group in self.registry.groups().into_iter().rev() {
            if self.is_visible(&group.id, &group.expression, context)? {
                visible.push(group);
            }
        }
        Ok(visible)
    }

    fn is_visible(
        &self,
        id: &str,
        expression: &str,
        context: Option<&RenderContext>,
    ) -> Result<bool, RegistryError> {
        let Some(context) = context else {
            return Ok(true);
        };
        if expression.trim().is_empty() {
            return Ok(true);
        }

        match self.evaluator.evaluate(expression, context) {
            Ok(visible) => Ok(visible),
            Err(e) if e.is_missing_attribute() => {
                warn!(%id, %expression, error = %e, "Visibility expression incomplete, delivering");
                Ok(true)
            },
            Err(e) => Err(RegistryError::Evaluation {
                source: e,
                context: Some(format!("Visibility of '{id}'").into()),
            }),
        }
    }

    fn append_member(
        &self,
        out: &mut String,
        member: &Member,
        context: Option<&RenderContext>,
        composite: bool,
    ) {
        let started = Instant::now();
        let fetched = self.content.fetch(&member.id, context);
        let text = fetched.as_ref().map(|source| source.render(context));

        if let Some(budget) = self.member_budget {
            let elapsed = started.elapsed();
            if elapsed > budget {
                warn!(member = %member.id, ?elapsed, ?budget, "Content lookup exceeded budget");
            }
        }

        match text {
            Ok(text) if text.is_empty() => {},
            Ok(text) if composite => {
                out.push_str("\n/* ----- ");
                out.push_str(&member.id);
                out.push_str(" ----- */\n");
                out.push_str(&text);
                out.push('\n');
            },
            Ok(text) => out.push_str(&text),
            Err(e) => {
                warn!(member = %member.id, error = %e, "Content lookup failed");
                out.push_str(&error_marker(&member.id, e));
            },
        }
    }
}

fn error_marker(id: &str, error: &ContentError) -> String {
    if error.is_not_found() {
        format!("\n/* XXX ERROR -- could not find '{id}' XXX */\n")
    } else {
        // Keep the diagnostic inside one comment.
        let reason = error.to_string().replace("*/", "* /");
        format!("\n/* XXX ERROR -- could not read '{id}': {reason} XXX */\n")
    }
}
