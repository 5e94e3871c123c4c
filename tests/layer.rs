#![cfg(feature = "layer")]

use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use logstash_json_layout::config::LayoutConfig;
use logstash_json_layout::event::current_thread_name;
use logstash_json_layout::layer::JsonEventLayer;
use logstash_json_layout::layout::JsonEventLayout;
use logstash_json_layout::sink::LogSink;
use serde_json::{json, Value};
use tracing::{error, info, info_span, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Collects every line in memory.
#[derive(Clone, Default)]
struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    fn lines(&self) -> Vec<Value> {
        let buffer = self.buffer.lock().unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.is_empty() || text.ends_with('\n'));
        text.lines().map(|line| serde_json::from_str(line).unwrap()).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, line: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.buffer.lock().unwrap().extend_from_slice(line);
        Ok(())
    }
}

struct FailingSink;

impl LogSink for FailingSink {
    fn write(&self, _line: &[u8]) -> Result<(), Box<dyn Error + Send + Sync>> {
        Err("disk full".into())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("row not found")]
struct RowNotFound;

#[derive(Debug, thiserror::Error)]
#[error("query failed")]
struct QueryFailed(#[source] RowNotFound);

fn capture(config: LayoutConfig, f: impl FnOnce()) -> Vec<Value> {
    let sink = MemorySink::default();
    let layout = JsonEventLayout::with_hostname(config, "test-host");
    let layer = JsonEventLayer::new(layout, Arc::new(sink.clone()));
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    sink.lines()
}

#[test]
fn test_plain_event_output() {
    let lines = capture(LayoutConfig::default(), || {
        info!("service started");
    });

    assert_eq!(lines.len(), 1);
    let entry = &lines[0];
    assert_eq!(entry["@source_host"], "test-host");
    assert!(entry["@timestamp"].as_str().unwrap().ends_with('Z'));
    assert_eq!(entry["@message"], "service started");
    assert_eq!(
        entry["@fields"],
        json!({
            "loggerName": module_path!(),
            "level": "INFO",
            "threadName": current_thread_name(),
        })
    );
}

#[test]
fn test_json_message_is_nested() {
    let lines = capture(LayoutConfig::default(), || {
        warn!("{}", r#"{"event":"login","user_id":42}"#);
    });

    assert_eq!(lines[0]["@message"], json!({"event": "login", "user_id": 42}));
    assert_eq!(lines[0]["@fields"]["level"], "WARN");
}

#[test]
fn test_spans_become_diagnostic_context() {
    let lines = capture(LayoutConfig::default(), || {
        let request = info_span!("request", request_id = "req-1", user = tracing::field::Empty);
        let _request = request.enter();
        request.record("user", "bob");

        let query = info_span!("query", table = "orders", attempt = 1u64);
        let _query = query.enter();

        info!(attempt = 2u64, cached = false, "loaded");
    });

    let fields = &lines[0]["@fields"];
    assert_eq!(fields["ndc"], json!(["request", "query"]));
    assert_eq!(
        fields["mdc"],
        json!({
            "request_id": "req-1",
            "user": "bob",
            "table": "orders",
            "attempt": 2,
            "cached": false,
        })
    );
}

#[test]
fn test_span_message_field_stays_in_context() {
    let lines = capture(LayoutConfig::default(), || {
        let job = info_span!("job", message = "nightly export", step = tracing::field::Empty);
        let _job = job.enter();
        job.record("step", "upload");

        info!("running");
    });

    assert_eq!(lines[0]["@message"], "running");
    assert_eq!(
        lines[0]["@fields"]["mdc"],
        json!({"message": "nightly export", "step": "upload"})
    );
}

#[test]
fn test_event_outside_spans_has_no_context() {
    let lines = capture(LayoutConfig::default(), || {
        info!("bare");
    });

    let fields = lines[0]["@fields"].as_object().unwrap();
    assert!(!fields.contains_key("mdc"));
    assert!(!fields.contains_key("ndc"));
}

#[test]
fn test_error_field_becomes_exception() {
    let lines = capture(LayoutConfig::default(), || {
        let err = QueryFailed(RowNotFound);
        error!(error = &err as &(dyn Error + 'static), "lookup failed");
    });

    assert_eq!(
        lines[0]["@fields"]["exception"],
        json!({
            "exception_message": "query failed",
            "stacktrace": "query failed\nCaused by: row not found",
        })
    );
    assert_eq!(lines[0]["@fields"]["level"], "ERROR");
}

#[test]
fn test_location_info() {
    let config = LayoutConfig {
        location_info: true,
        ..LayoutConfig::default()
    };
    let lines = capture(config, || {
        info!("located");
    });

    let fields = &lines[0]["@fields"];
    assert!(fields["file"].as_str().unwrap().ends_with("layer.rs"));
    assert!(fields["line_number"].is_u64());
    assert_eq!(fields["class"], module_path!());
    assert!(fields.get("method").is_none());

    let lines = capture(LayoutConfig::default(), || {
        info!("not located");
    });
    assert!(lines[0]["@fields"].get("file").is_none());
    assert!(lines[0]["@fields"].get("line_number").is_none());
}

#[test]
fn test_sink_failures_are_counted() {
    let layout = JsonEventLayout::with_hostname(LayoutConfig::default(), "test-host");
    let layer = JsonEventLayer::new(layout, Arc::new(FailingSink));
    let total = Arc::clone(&layer.total_events);
    let written = Arc::clone(&layer.written_events);
    let failed = Arc::clone(&layer.failed_events);

    tracing::subscriber::with_default(Registry::default().with(layer), || {
        info!("one");
        info!("two");
    });

    assert_eq!(total.load(Ordering::Relaxed), 2);
    assert_eq!(written.load(Ordering::Relaxed), 0);
    assert_eq!(failed.load(Ordering::Relaxed), 2);
}
