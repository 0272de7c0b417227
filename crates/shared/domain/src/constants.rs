//! Well-known names and defaults shared between the registry and its hosts.

/// Alphabetic prefix of synthetic (merged) delivery ids.
pub const SYNTHETIC_PREFIX: &str = "mergedScripts";
/// Suffix of synthetic delivery ids, marking them as script files.
pub const SYNTHETIC_SUFFIX: &str = ".js";
/// Width of the zero-padded numeric part of synthetic ids. The number is a digest of
/// the group's content, so this also bounds how many distinct groups can be named.
pub const SYNTHETIC_DIGITS: u32 = 8;

/// Media type used for delivered script content.
pub const CONTENT_TYPE: &str = "application/x-javascript";
/// Charset used when the host does not provide one.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Cache lifetime of delivered content: seven days.
pub const CACHE_DURATION_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Move directions accepted by the registry.
pub const UP: &str = "up";
pub const DOWN: &str = "down";
