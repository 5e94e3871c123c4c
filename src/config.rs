use std::fmt;
use std::str::FromStr;

use crate::env::{
    env_or, LAYOUT_CHARSET_ENV, LAYOUT_COMPACT_ENV, LAYOUT_COMPLETE_ENV, LAYOUT_EVENT_EOL_ENV,
    LAYOUT_LOCATION_INFO_ENV, LAYOUT_PROPERTIES_ENV,
};

/// Output byte encoding of an encoded line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    UsAscii,
    Iso8859_1,
}

impl Charset {
    /// Canonical name, as used in `Content-Type` headers.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::UsAscii => "US-ASCII",
            Charset::Iso8859_1 => "ISO-8859-1",
        }
    }

    /// Encode `text`, replacing characters the charset cannot represent
    /// with `?`.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let max = match self {
            Charset::Utf8 => return text.as_bytes().to_vec(),
            Charset::UsAscii => 0x7f,
            Charset::Iso8859_1 => 0xff,
        };
        text.chars()
            .map(|c| if (c as u32) <= max { c as u32 as u8 } else { b'?' })
            .collect()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Charset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Charset::Utf8),
            "US-ASCII" | "ASCII" => Ok(Charset::UsAscii),
            "ISO-8859-1" | "ISO8859-1" | "ISO_8859_1" | "LATIN1" => Ok(Charset::Iso8859_1),
            _ => Err(ConfigError::UnsupportedCharset(s.to_string())),
        }
    }
}

/// Error type returned when building a [`LayoutConfig`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported charset: {0}")]
    UnsupportedCharset(String),
}

/// Settings of a [`JsonEventLayout`](crate::layout::JsonEventLayout).
///
/// **Fields**
/// - `location_info`: emit `file`, `line_number`, `class` and `method`.
/// - `charset`: byte encoding used by `to_bytes`.
/// - `properties`, `complete`, `compact`, `event_eol`: accepted for
///   compatibility with other JSON layouts; they do not change the output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutConfig {
    pub location_info: bool,
    pub properties: bool,
    pub complete: bool,
    pub compact: bool,
    pub event_eol: bool,
    pub charset: Charset,
}

impl LayoutConfig {
    /// Build a config from `name = value` attribute pairs.
    ///
    /// Recognized names are `locationInfo`, `properties`, `complete`,
    /// `compact`, `eventEol` and `charset`. Booleans are true only for a
    /// case-insensitive `true`. Unknown names are ignored with a warning.
    ///
    /// **Returns**
    /// - `Err(ConfigError::UnsupportedCharset)` if `charset` names an
    ///   encoding this crate cannot produce.
    pub fn from_attributes<I, K, V>(attributes: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = LayoutConfig::default();
        for (key, value) in attributes {
            let value = value.as_ref();
            match key.as_ref() {
                "locationInfo" => config.location_info = parse_bool(value),
                "properties" => config.properties = parse_bool(value),
                "complete" => config.complete = parse_bool(value),
                "compact" => config.compact = parse_bool(value),
                "eventEol" => config.event_eol = parse_bool(value),
                "charset" => config.charset = value.parse()?,
                other => tracing::warn!(attribute = other, "ignoring unknown layout attribute"),
            }
        }
        Ok(config)
    }

    /// Build a config from the `LOGSTASH_LAYOUT_*` environment variables,
    /// falling back to defaults for unset ones.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_attributes([
            ("locationInfo", env_or(LAYOUT_LOCATION_INFO_ENV, "false")),
            ("properties", env_or(LAYOUT_PROPERTIES_ENV, "false")),
            ("complete", env_or(LAYOUT_COMPLETE_ENV, "false")),
            ("compact", env_or(LAYOUT_COMPACT_ENV, "false")),
            ("eventEol", env_or(LAYOUT_EVENT_EOL_ENV, "false")),
            ("charset", env_or(LAYOUT_CHARSET_ENV, Charset::Utf8.name())),
        ])
    }
}

fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
