//! Sends a `reverse_ip_whois` request and prints the reply.
//!
//! The service runs in-process on a `LocalBus` with a canned API client, so
//! the demo needs no broker or DomainTools account.
//!
//! ```text
//! cargo run -p dtbus-server --example basic_reverse_ip_whois -- --query google
//! ```

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dtbus_core::messages::{decode_payload, dict_to_json_payload, to_pretty_json};
use dtbus_core::{ApiResponse, LocalBus, Message, MessageBus, RemoteOperation, Request, StubApi};
use dtbus_server::service::topic_for;
use dtbus_server::{init_tracing, DomainToolsService, LogFormat, DEFAULT_SERVICE_TYPE};
use serde_json::{json, Map, Value};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Value sent as the `query` parameter.
    #[arg(long, default_value = "google")]
    query: String,

    /// Topic prefix the service registers under.
    #[arg(long, env = "DTBUS_SERVICE_TYPE", default_value = DEFAULT_SERVICE_TYPE)]
    service_type: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

fn canned_api() -> StubApi {
    StubApi::new().on(RemoteOperation::ReverseIpWhois, |params| {
        let query = params.get("query").and_then(Value::as_str).unwrap_or("");
        Ok(ApiResponse::new(json!({
            "record_count": 1,
            "records": [{
                "ip_from": "8.8.8.0",
                "ip_to": "8.8.8.255",
                "organization": format!("{query} LLC"),
                "country": "US",
            }],
        })))
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let bus = LocalBus::new();
    let service = DomainToolsService::new(cli.service_type.clone(), Arc::new(canned_api()));
    service.register_services(&bus).await?;

    let topic = topic_for(&cli.service_type, "reverse_ip_whois");
    let mut params = Map::new();
    params.insert("query".to_string(), Value::from(cli.query));

    let mut request = Request::new(topic.clone());
    request.payload = dict_to_json_payload(&params);

    match bus.sync_request(request, REQUEST_TIMEOUT).await? {
        Message::Error(err) => {
            println!(
                "Error invoking service with topic '{topic}': {} ({})",
                err.error_message, err.error_code
            );
        }
        Message::Response(res) => match serde_json::from_slice::<Value>(&res.payload) {
            Ok(value) => println!("{}", to_pretty_json(&value)),
            Err(_) => println!("{}", decode_payload(&res.payload)),
        },
        Message::Request(_) => anyhow::bail!("unexpected request envelope in reply"),
    }

    bus.unregister_service(service.service_type()).await?;
    Ok(())
}
