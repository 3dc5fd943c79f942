use std::sync::Arc;

use poem::listener::TcpListener;
use tracing::Level;
use user_directory::{core::db::init_pool, init_openapi_route, settings::get_config, AppState};

#[tokio::main]
async fn main() {
    let log_level = Level::DEBUG;
    // Logging to File
    let file_appender = tracing_appender::rolling::daily("./logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(log_level)
        .init();

    // Logging to Console
    // tracing_subscriber::fmt().with_max_level(log_level).init();

    let config = get_config();
    tracing::info!("run with config: {:?}", config);

    // Init Database Connection
    tracing::info!("Init Postgres connection on {}", config.database_url);
    let pool = init_pool(&config).await;
    // Create tables if absent
    tracing::info!("run pending migrations");
    sqlx::migrate!().run(&pool).await.unwrap();
    // Init App State
    let app_state = Arc::new(AppState { db: pool });

    let app = init_openapi_route(app_state.clone(), &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!(
        "{}:{}",
        config.host, config.port
    )))
    .run(app)
    .await
    .unwrap()
}
