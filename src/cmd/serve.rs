//! `facteur serve` — start the relay server.
//!
//! Builds the shared application state (direct-mode tracking client
//! holding the server-side API key, rate limiter, stats), starts the
//! Axum HTTP server, and runs until Ctrl+C / SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::cli::ServeArgs;
use crate::client::{ClientConfig, TrackingClient};
use crate::error::FacteurError;
use crate::logging;
use crate::relay::rate_limit::{RateLimiter, RATE_LIMIT_MAX, RATE_LIMIT_WINDOW};
use crate::server::{self, AppState, Stats};

pub async fn execute(args: ServeArgs) -> Result<(), FacteurError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let client = TrackingClient::new(ClientConfig {
        api_key: Some(args.api_key),
        endpoint: args.endpoint,
        relay_attribution: true,
    });

    let state = Arc::new(AppState {
        client,
        limiter: RateLimiter::new(RATE_LIMIT_MAX, RATE_LIMIT_WINDOW),
        stats: Stats::new(),
        start_time: Instant::now(),
    });

    let endpoint = state.client.endpoint().to_string();
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, endpoint = %endpoint, "facteur relay started");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("facteur relay stopped");
    Ok(())
}
