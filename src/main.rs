use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use freightlink::api::DynAPI;
use freightlink::config::Config;
use freightlink::db::PgPool;
use freightlink::engine::Engine;
use freightlink::error::Error;
use freightlink::jobs;
use freightlink::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("freightlink=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let PgPool(pool) = PgPool::new(&config.database_url, config.database_max_connections).await?;

    let api: DynAPI = Arc::new(Engine::new(pool).await?);

    let sweeper = jobs::spawn_sweeper(api.clone(), &config);

    let result = serve(api, config.addr()).await;
    sweeper.abort();

    result
}
