use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

/// Severity of a [`LogEvent`].
///
/// The wire form is always the upper-case name returned by [`Level::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Off,
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    All,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Off => "OFF",
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
            Level::All => "ALL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Trace,
        }
    }
}

/// Error attached to a [`LogEvent`].
///
/// Every part is optional; the encoder only emits the parts that are present
/// and non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrownError {
    /// Fully-qualified type name of the error, when known.
    pub class_name: Option<String>,
    pub message: Option<String>,
    /// Rendered error followed by its chain of causes.
    pub cause_stack_trace: Option<String>,
}

impl ThrownError {
    /// Capture a typed error, using its Rust type path as the class name.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + 'static,
    {
        let class_name = std::any::type_name::<E>().to_string();
        let mut thrown = Self::from_dyn(error);
        thrown.cause_stack_trace = Some(render_cause_chain(Some(&class_name), error));
        thrown.class_name = Some(class_name);
        thrown
    }

    /// Capture an error whose concrete type is erased.
    ///
    /// No class name is recorded.
    pub fn from_dyn(error: &(dyn Error + 'static)) -> Self {
        ThrownError {
            class_name: None,
            message: Some(error.to_string()),
            cause_stack_trace: Some(render_cause_chain(None, error)),
        }
    }
}

/// `<class>: <message>` for the error itself, then one `Caused by: ` line per
/// source.
fn render_cause_chain(class_name: Option<&str>, error: &(dyn Error + 'static)) -> String {
    let mut out = match class_name {
        Some(class) => format!("{}: {}", class, error),
        None => error.to_string(),
    };
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Call site that produced a [`LogEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Enclosing type or module path.
    pub class: Option<String>,
    pub method: Option<String>,
}

/// One log record handed to the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub message: String,
    pub timestamp_millis: i64,
    pub level: Level,
    pub logger_name: String,
    pub thread_name: String,
    pub thrown: Option<ThrownError>,
    /// Mapped diagnostic context (MDC).
    pub context_map: BTreeMap<String, serde_json::Value>,
    /// Nested diagnostic context (NDC), outermost entry first.
    pub context_stack: Vec<String>,
    pub source: Option<SourceLocation>,
}

impl LogEvent {
    /// Create an event stamped with the current time and the name of the
    /// calling thread. Optional parts start out empty.
    pub fn new(level: Level, logger_name: impl Into<String>, message: impl Into<String>) -> Self {
        LogEvent {
            message: message.into(),
            timestamp_millis: chrono::Utc::now().timestamp_millis(),
            level,
            logger_name: logger_name.into(),
            thread_name: current_thread_name(),
            thrown: None,
            context_map: BTreeMap::new(),
            context_stack: Vec::new(),
            source: None,
        }
    }

    pub fn with_timestamp_millis(mut self, timestamp_millis: i64) -> Self {
        self.timestamp_millis = timestamp_millis;
        self
    }

    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    pub fn with_thrown(mut self, thrown: ThrownError) -> Self {
        self.thrown = Some(thrown);
        self
    }

    pub fn with_context_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.context_map.insert(key.into(), value.into());
        self
    }

    pub fn with_context_stack<I, T>(mut self, stack: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.context_stack = stack.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source(mut self, source: SourceLocation) -> Self {
        self.source = Some(source);
        self
    }
}

/// Name of the current thread, or its id when the thread is unnamed.
pub fn current_thread_name() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
