//! Users service demo.
//!
//! Loads configuration (`users-service.toml`, `.env`, then `USERS__*`
//! variables), builds the service and walks one sign-up session through it.

use hierarch::prelude::*;
use http::Method as HttpMethod;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use users_service::{build_service, UserStore, ADD_CALL_EVENT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_defaults()
        .with_optional_file("users-service.toml")?
        .with_dotenv()?
        .with_env_prefix("USERS")
        .load()?;
    init_logging(&config.logging.to_log_config())?;
    init_metrics()?;

    let service = build_service(&config, Arc::new(UserStore::new()))?;
    for route in service.routes() {
        info!(route = %route, "route registered");
    }

    let prefix = service.base_path().to_string();
    let session = [
        InboundRequest::new(HttpMethod::POST, format!("{prefix}/v1/users")).with_json(json!({
            "data": {
                "name": "Ann",
                "username": "ann",
                "password": "x",
                "address": {"line1": "1 Rd", "street": true, "country": "US", "code": 1},
                "age": 30
            }
        })),
        InboundRequest::new(HttpMethod::POST, format!("{prefix}/v1/users/ann"))
            .with_query("method", ADD_CALL_EVENT)
            .with_json(json!({"data": {"time": 1_700_000_000_000_u64, "duration": 42}}))
            .with_bearer_token("ann"),
        InboundRequest::new(HttpMethod::GET, format!("{prefix}/v1/users/ann"))
            .with_bearer_token("ann"),
        InboundRequest::new(HttpMethod::GET, format!("{prefix}/v1/users"))
            .with_query("age", "30")
            .with_bearer_token("admin"),
    ];

    for request in session {
        let line = format!("{} {}", request.method(), request.path());
        let response = service.handle(request).await;
        info!(request = %line, status = response.status.as_u16(), body = %response.body, "handled");
    }

    if let Some(metrics) = hierarch::telemetry::render_metrics() {
        info!(metrics = %metrics, "metrics snapshot");
    }
    Ok(())
}

