//! Encode structured log events as logstash `json_event` lines.
//!
//! [`JsonEventLayout`] turns one [`LogEvent`] into one newline-terminated
//! JSON document. With the `layer` feature, [`layer::JsonEventLayer`] feeds
//! it from `tracing` and writes the lines to a [`sink::LogSink`].

pub mod config;
pub mod env;
pub mod event;
pub mod host;
pub mod layout;
pub mod time;
pub mod sink;
pub mod noop_sink;

#[cfg(feature = "layer")]
pub mod layer;

#[cfg(feature = "layer")]
pub mod init;

pub use config::{Charset, ConfigError, LayoutConfig};
pub use event::{Level, LogEvent, SourceLocation, ThrownError};
pub use layout::JsonEventLayout;
