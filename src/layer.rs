use crate::event::{Level, LogEvent, SourceLocation, ThrownError};
use crate::layout::JsonEventLayout;
use crate::sink::LogSink;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that encodes every event with a
/// [`JsonEventLayout`] and writes the line to a [`LogSink`].
///
/// Events are mapped onto [`LogEvent`]s as follows:
/// - the event target becomes the logger name;
/// - the names of the enclosing spans, outermost first, become the NDC;
/// - span fields, overridden by event fields, become the MDC;
/// - a field recorded as `dyn Error` becomes the thrown error;
/// - file, line and module path become the source location.
///
/// Encoding and writing happen on the emitting thread. Nothing is buffered.
pub struct JsonEventLayer {
    layout: Arc<JsonEventLayout>,
    sink: Arc<dyn LogSink>,
    /// Total events seen by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Lines accepted by the sink.
    pub written_events: Arc<AtomicU64>,
    /// Lines the sink failed to write.
    pub failed_events: Arc<AtomicU64>,
}

impl JsonEventLayer {
    pub fn new(layout: JsonEventLayout, sink: Arc<dyn LogSink>) -> Self {
        JsonEventLayer {
            layout: Arc::new(layout),
            sink,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn layout(&self) -> &JsonEventLayout {
        &self.layout
    }
}

/// Fields recorded on a span, stored in its extensions.
struct SpanFields(BTreeMap<String, serde_json::Value>);

impl<S> Layer<S> for JsonEventLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut visitor = FieldVisitor::for_span();
        attrs.record(&mut visitor);
        span.extensions_mut().insert(SpanFields(visitor.fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanFields(fields)) = extensions.get_mut::<SpanFields>() {
            let mut visitor = FieldVisitor::for_span();
            values.record(&mut visitor);
            fields.extend(visitor.fields);
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let mut context_map = BTreeMap::new();
        let mut context_stack = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                context_stack.push(span.name().to_string());
                if let Some(SpanFields(fields)) = span.extensions().get::<SpanFields>() {
                    context_map.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let mut visitor = FieldVisitor::for_event();
        event.record(&mut visitor);
        context_map.extend(visitor.fields);

        let meta = event.metadata();
        let mut record = LogEvent::new(
            Level::from(*meta.level()),
            meta.target(),
            visitor.message.unwrap_or_default(),
        );
        record.thrown = visitor.thrown;
        record.context_map = context_map;
        record.context_stack = context_stack;
        record.source = Some(SourceLocation {
            file: meta.file().map(|s| s.to_string()),
            line: meta.line(),
            class: meta.module_path().map(|s| s.to_string()),
            method: None,
        });

        let line = self.layout.to_bytes(&record);
        match self.sink.write(&line) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("log sink write failed: {}", e);
            }
        }
    }
}

/// Collects the fields of an event or span.
///
/// For events, `message` is split out. For spans it is an ordinary field.
/// The first error-typed field becomes the thrown error. Everything else
/// lands in `fields`.
pub struct FieldVisitor {
    pub fields: BTreeMap<String, serde_json::Value>,
    pub message: Option<String>,
    pub thrown: Option<ThrownError>,
    split_message: bool,
}

impl FieldVisitor {
    pub fn for_event() -> Self {
        Self::new(true)
    }

    pub fn for_span() -> Self {
        Self::new(false)
    }

    fn new(split_message: bool) -> Self {
        FieldVisitor {
            fields: BTreeMap::new(),
            message: None,
            thrown: None,
            split_message,
        }
    }

    fn is_message(&self, field: &Field) -> bool {
        self.split_message && field.name() == "message"
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if self.is_message(field) {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        if self.thrown.is_none() {
            self.thrown = Some(ThrownError::from_dyn(value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if self.is_message(field) {
            self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}
