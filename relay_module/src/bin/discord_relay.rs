use std::sync::Arc;

use tracing::{error, info, warn};

use relay_module::discord_gateway::start_discord_client;
use relay_module::server::run_health_server;
use relay_module::{Relay, RelayConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    install_panic_hook();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            std::process::exit(1);
        }
    };

    info!(
        "relay config: forward={}, assign={}, allowlist={} ids, command_scope={:?}, dry_run={}, timeout={:?}",
        config.forward_url.is_some(),
        config.assign_url.is_some(),
        config.allowlist.len(),
        config.command_scope,
        config.dry_run,
        config.request_timeout
    );
    if config.forward_url.is_none() {
        warn!("FORWARD_URL not set; payloads will only be logged");
    }

    let host = config.host.clone();
    let port = config.port;
    let relay = Arc::new(Relay::new(Arc::new(config)));

    let mut server = tokio::spawn(async move {
        run_health_server(&host, port, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    });

    tokio::select! {
        result = start_discord_client(relay) => {
            match result {
                Ok(()) => error!("Discord gateway client stopped"),
                Err(err) => error!("Discord gateway error: {}", err),
            }
            std::process::exit(1);
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => info!("health server stopped"),
                Ok(Err(err)) => {
                    error!("health server error: {}", err);
                    std::process::exit(1);
                }
                Err(err) => {
                    error!("health server task failed: {}", err);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Route panics from any task through tracing so they show up next to the relay logs.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!("panic at {}: {}", location, message);
    }));
}
