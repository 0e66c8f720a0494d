#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::sync::Arc;

use peer_signaling::config::Config;

fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::load()?);
    simple_logger::init_with_level(config.log.level.as_level())?;

    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.runtime.max_threads)
        .enable_all()
        .build()?
        .block_on(peer_signaling::startup(config))
}
