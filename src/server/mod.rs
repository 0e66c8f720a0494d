pub mod transport;

use crate::{Service, config::Config, statistics::Statistics};

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::{ConnectInfo, FromRequestParts, Request, State, ws::WebSocketUpgrade},
    http::{StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use tokio::net::TcpListener;
use tower_http::services::ServeDir;

struct ServerState {
    config: Arc<Config>,
    service: Service,
    statistics: Statistics,
}

/// start signaling server.
///
/// Binds the listener and spawns the http server on it. Websocket upgrades
/// on any path become signaling sessions, each served by its own task, and
/// everything else is answered from the static assets directory if there is
/// one.
pub async fn run(
    config: Arc<Config>,
    service: Service,
    statistics: Statistics,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.server.listen).await?;

    let app: Router = match &config.server.static_dir {
        Some(dir) => Router::new().fallback_service(ServeDir::new(dir)),
        None => Router::new().fallback(|| async { StatusCode::NOT_FOUND }),
    };

    let app = app.layer(middleware::from_fn_with_state(
        Arc::new(ServerState {
            config: config.clone(),
            service,
            statistics,
        }),
        websocket,
    ));

    tokio::spawn(async move {
        if let Err(e) = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        {
            log::error!("signaling server exited: err={}", e);
        }
    });

    log::info!(
        "signaling server listening: addr={}, max message size={}, static dir={:?}",
        config.server.listen,
        config.server.max_message_size,
        config.server.static_dir,
    );

    Ok(())
}

async fn websocket(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    match WebSocketUpgrade::from_request_parts(&mut parts, &state).await {
        Ok(upgrade) => {
            let size = state.config.server.max_message_size;
            let queue = state.config.server.max_queued_messages;
            let service = state.service.clone();
            let statistics = state.statistics.clone();

            upgrade
                .max_message_size(size)
                .max_frame_size(size)
                .on_failed_upgrade(move |e| {
                    log::warn!("websocket handshake failed: addr={}, err={}", addr, e);
                })
                .on_upgrade(move |socket| {
                    transport::websocket_session(socket, addr, queue, service, statistics)
                })
        }
        // A broken handshake is refused, it is not a request for a file.
        Err(e) if parts.headers.contains_key(header::UPGRADE) => e.into_response(),
        Err(_) => next.run(Request::from_parts(parts, body)).await,
    }
}
