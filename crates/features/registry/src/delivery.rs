//! # Delivery
//!
//! Item access for hosts: resolved text plus the metadata needed to serve it
//! (content type with charset and an absolute expiry).

use crate::error::RegistryError;
use crate::expression::RenderContext;
use crate::resolver::Resolver;
use chrono::{DateTime, TimeDelta, Utc};
use sreg_domain::config::DeliveryConfig;
use sreg_domain::constants::{CACHE_DURATION_SECONDS, DEFAULT_CHARSET};
use std::time::Duration;
use tracing::debug;

/// HTTP-date layout used for `Expires` headers.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// How long delivered content may be cached.
pub trait CachePolicy: Send + Sync {
    fn lifetime(&self) -> Duration;
}

/// Supplies the charset of delivered content. `None` falls back to UTF-8.
pub trait EncodingProvider: Send + Sync {
    fn charset(&self) -> Option<String>;
}

/// Seven-day caching, no host charset.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDelivery;

impl CachePolicy for StandardDelivery {
    fn lifetime(&self) -> Duration {
        Duration::from_secs(CACHE_DURATION_SECONDS)
    }
}

impl EncodingProvider for StandardDelivery {
    fn charset(&self) -> Option<String> {
        None
    }
}

impl CachePolicy for DeliveryConfig {
    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.cache_duration_seconds)
    }
}

impl EncodingProvider for DeliveryConfig {
    fn charset(&self) -> Option<String> {
        self.charset.clone()
    }
}

/// Resolved content ready to be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub id: String,
    pub body: String,
    /// Media type with charset, e.g. `application/x-javascript;charset=utf-8`.
    pub content_type: String,
    pub expires: DateTime<Utc>,
}

impl Delivery {
    /// `expires` formatted as an HTTP date.
    #[must_use]
    pub fn expires_header(&self) -> String {
        self.expires.format(HTTP_DATE).to_string()
    }
}

impl Resolver<'_> {
    /// Resolves `id` and wraps the text with serving metadata, expiring relative to now.
    ///
    /// # Errors
    /// As for [`Resolver::resolve`].
    pub fn deliver(
        &self,
        id: &str,
        context: Option<&RenderContext>,
    ) -> Result<Delivery, RegistryError> {
        self.deliver_at(id, context, Utc::now())
    }

    /// [`Resolver::deliver`] with an explicit clock. Debug mode disables caching, so the
    /// content expires at `now`.
    ///
    /// # Errors
    /// As for [`Resolver::resolve`].
    pub fn deliver_at(
        &self,
        id: &str,
        context: Option<&RenderContext>,
        now: DateTime<Utc>,
    ) -> Result<Delivery, RegistryError> {
        let expansion = self.registry().expand(id)?;
        let body = self.render(id, &expansion, context)?;

        let lifetime = if expansion.debug_mode { Duration::ZERO } else { self.cache.lifetime() };
        let expires = TimeDelta::from_std(lifetime)
            .ok()
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let charset = self.encoding.charset().unwrap_or_else(|| DEFAULT_CHARSET.to_owned());
        let content_type = format!("{};charset={charset}", self.media_type);

        debug!(%id, bytes = body.len(), ?lifetime, "Content delivered");
        Ok(Delivery { id: id.to_owned(), body, content_type, expires })
    }
}
