use std::sync::Arc;
use tracing::{error, info, info_span};

use logstash_json_layout::config::LayoutConfig;
use logstash_json_layout::init::init_tracing_with_config;
use logstash_json_layout::sink::WriterSink;

#[derive(Debug, thiserror::Error)]
#[error("invalid password")]
struct InvalidPassword;

fn main() {
    let config = LayoutConfig {
        location_info: true,
        ..LayoutConfig::default()
    };
    if let Err(e) = init_tracing_with_config(Arc::new(WriterSink::stdout()), config) {
        eprintln!("failed to install subscriber: {}", e);
        return;
    }

    info!("starting service");

    let request = info_span!("request", request_id = "req-17");
    let _guard = request.enter();

    let payload = r#"{"event":"login","user_id":42}"#;
    info!("{}", payload);

    let err = InvalidPassword;
    error!(
        user_id = 42,
        error = &err as &(dyn std::error::Error + 'static),
        "authentication failed"
    );
}
