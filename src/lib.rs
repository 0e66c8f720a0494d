//! ## The signaling server
//!
//! Two browsers that want to talk to each other over WebRTC first have to
//! find each other and swap session descriptions and ICE candidates. This
//! server is the meeting point: every browser tab keeps one websocket open
//! to it, gets a random peer id on connect, and can ask to be introduced to
//! the next peer with `{"next": "video"}` or `{"next": "audio"}`.
//!
//! Once introduced, the two sides exchange `offer`, `answer`,
//! `iceCandidate` and chat `message` frames addressed with `to`. The server
//! does not look inside those frames, it forwards them to the addressed
//! peer with `from` set to the sender and drops them when the peer is gone.
//!
//! The media itself never passes through here.

pub mod config;
pub mod handler;
pub mod server;
pub mod statistics;

use self::{
    config::Config, handler::Handler, server::transport::WebSocketSender, statistics::Statistics,
};

use std::sync::Arc;

use service::ServiceOptions;

pub(crate) type Service = service::Service<WebSocketSender, Handler>;

/// In order to let the integration test directly use the signaling crate and
/// start the server, a function is opened to replace the main function to
/// directly start the server.
pub async fn startup(config: Arc<Config>) -> anyhow::Result<()> {
    let statistics = Statistics::default();
    let service = Service::new(ServiceOptions {
        handler: Handler::new(statistics.clone()),
        capacity: 1024,
    });

    server::run(config.clone(), service, statistics.clone()).await?;

    // The server is non-blocking after it runs and needs to be kept from
    // exiting immediately.
    statistics.report(config.log.stats_interval).await;

    Ok(())
}
