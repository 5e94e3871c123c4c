use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{Charset, LayoutConfig};
use crate::event::{LogEvent, SourceLocation, ThrownError};
use crate::host;
use crate::time::format_timestamp;

/// Top-level and `@fields` keys of the emitted document.
pub mod keys {
    pub const SOURCE_HOST: &str = "@source_host";
    pub const TIMESTAMP: &str = "@timestamp";
    pub const MESSAGE: &str = "@message";
    pub const FIELDS: &str = "@fields";

    pub const EXCEPTION: &str = "exception";
    pub const EXCEPTION_CLASS: &str = "exception_class";
    pub const EXCEPTION_MESSAGE: &str = "exception_message";
    pub const STACKTRACE: &str = "stacktrace";

    pub const FILE: &str = "file";
    pub const LINE_NUMBER: &str = "line_number";
    pub const CLASS: &str = "class";
    pub const METHOD: &str = "method";

    pub const LOGGER_NAME: &str = "loggerName";
    pub const MDC: &str = "mdc";
    pub const NDC: &str = "ndc";
    pub const LEVEL: &str = "level";
    pub const THREAD_NAME: &str = "threadName";
}

use keys::*;

/// Encodes [`LogEvent`]s as single-line logstash `json_event` documents.
///
/// The layout holds only its configuration and the host name captured at
/// construction, so one instance can be shared across threads and used
/// concurrently. Each call to [`encode`](Self::encode) builds its document in
/// locals.
///
/// ```text
/// {"@fields":{"level":"INFO","loggerName":"app","threadName":"main"},
///  "@message":"hello","@source_host":"web-1","@timestamp":"1970-01-01T00:00:00.000Z"}
/// ```
#[derive(Debug, Clone)]
pub struct JsonEventLayout {
    config: LayoutConfig,
    hostname: String,
}

impl JsonEventLayout {
    /// Create a layout that reports the local host name.
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_hostname(config, host::hostname())
    }

    /// Create a layout that reports `hostname` as `@source_host`.
    pub fn with_hostname(config: LayoutConfig, hostname: impl Into<String>) -> Self {
        JsonEventLayout {
            config,
            hostname: hostname.into(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Whether `file`, `line_number`, `class` and `method` are emitted.
    pub fn location_info(&self) -> bool {
        self.config.location_info
    }

    /// Always `false`: thrown errors are part of the encoded document.
    pub fn ignores_throwable(&self) -> bool {
        false
    }

    pub fn charset(&self) -> Charset {
        self.config.charset
    }

    pub fn content_type(&self) -> String {
        format!("application/json; charset={}", self.config.charset)
    }

    /// Encode one event as a JSON object followed by `\n`.
    ///
    /// Never fails: a message that is not a JSON object is embedded as a
    /// string, and any field that cannot be serialized is left out.
    pub fn encode(&self, event: &LogEvent) -> String {
        let thread_name = event.thread_name.as_str();
        let timestamp = event.timestamp_millis;

        let mut fields = Map::new();
        let mut document = Map::new();

        document.insert(SOURCE_HOST.to_string(), Value::String(self.hostname.clone()));
        document.insert(TIMESTAMP.to_string(), Value::String(format_timestamp(timestamp)));
        document.insert(MESSAGE.to_string(), message_value(&event.message));

        if let Some(thrown) = &event.thrown {
            fields.insert(EXCEPTION.to_string(), Value::Object(exception_fields(thrown)));
        }

        if self.config.location_info {
            match &event.source {
                Some(source) => add_location(&mut fields, source),
                None => tracing::debug!(
                    logger = %event.logger_name,
                    "location info enabled but event carries no source location"
                ),
            }
        }

        add_field(&mut fields, LOGGER_NAME, Some(&event.logger_name));
        add_field(
            &mut fields,
            MDC,
            Some(&event.context_map).filter(|mdc| !mdc.is_empty()),
        );
        add_field(
            &mut fields,
            NDC,
            Some(&event.context_stack).filter(|ndc| !ndc.is_empty()),
        );
        add_field(&mut fields, LEVEL, Some(&event.level));
        add_field(&mut fields, THREAD_NAME, Some(thread_name));

        document.insert(FIELDS.to_string(), Value::Object(fields));

        let mut line = Value::Object(document).to_string();
        line.push('\n');
        line
    }

    /// [`encode`](Self::encode) the event and convert the line to the
    /// configured charset.
    pub fn to_bytes(&self, event: &LogEvent) -> Vec<u8> {
        self.config.charset.encode(&self.encode(event))
    }
}

/// Nest the message when it is a JSON object, otherwise keep the raw text.
fn message_value(message: &str) -> Value {
    match serde_json::from_str::<Map<String, Value>>(message) {
        Ok(object) => Value::Object(object),
        Err(_) => Value::String(message.to_string()),
    }
}

fn exception_fields(thrown: &ThrownError) -> Map<String, Value> {
    let mut exception = Map::new();
    add_field(&mut exception, EXCEPTION_CLASS, non_empty(&thrown.class_name));
    add_field(&mut exception, EXCEPTION_MESSAGE, non_empty(&thrown.message));
    add_field(&mut exception, STACKTRACE, non_empty(&thrown.cause_stack_trace));
    exception
}

fn add_location(fields: &mut Map<String, Value>, source: &SourceLocation) {
    add_field(fields, FILE, source.file.as_ref());
    add_field(fields, LINE_NUMBER, source.line.as_ref());
    add_field(fields, CLASS, source.class.as_ref());
    add_field(fields, METHOD, source.method.as_ref());
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Insert `value` under `key` unless it is absent, serializes to `null`, or
/// fails to serialize.
fn add_field<T>(fields: &mut Map<String, Value>, key: &str, value: Option<&T>)
where
    T: Serialize + ?Sized,
{
    let Some(value) = value else {
        return;
    };
    match serde_json::to_value(value) {
        Ok(Value::Null) => {}
        Ok(value) => {
            fields.insert(key.to_string(), value);
        }
        Err(e) => tracing::debug!(field = key, error = %e, "skipping field that cannot be serialized"),
    }
}
