//! Environment variable names read by [`LayoutConfig::from_env`].
//!
//! [`LayoutConfig::from_env`]: crate::config::LayoutConfig::from_env

/// `true` to emit source location fields.
pub const LAYOUT_LOCATION_INFO_ENV: &str = "LOGSTASH_LAYOUT_LOCATION_INFO";

/// Output charset, e.g. `UTF-8` or `ISO-8859-1`.
pub const LAYOUT_CHARSET_ENV: &str = "LOGSTASH_LAYOUT_CHARSET";

/// Accepted for compatibility, no effect on the output.
pub const LAYOUT_PROPERTIES_ENV: &str = "LOGSTASH_LAYOUT_PROPERTIES";

/// Accepted for compatibility, no effect on the output.
pub const LAYOUT_COMPLETE_ENV: &str = "LOGSTASH_LAYOUT_COMPLETE";

/// Accepted for compatibility, no effect on the output.
pub const LAYOUT_COMPACT_ENV: &str = "LOGSTASH_LAYOUT_COMPACT";

/// Accepted for compatibility, no effect on the output.
pub const LAYOUT_EVENT_EOL_ENV: &str = "LOGSTASH_LAYOUT_EVENT_EOL";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
