//! 스프린트 플랫폼 인증 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다. 서명 키 파생 실패(비밀 키 누락,
//! 256비트 미만)는 치명적 오류로 서버가 기동되지 않습니다.

use std::net::SocketAddr;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use sprint_api::repository::run_migrations;
use sprint_api::routes::create_api_router;
use sprint_api::state::AppState;
use sprint_core::{init_logging_from_env, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 파일이 있으면 로드 (없어도 무방)
    dotenvy::dotenv().ok();

    init_logging_from_env().map_err(|e| anyhow::anyhow!("logging init failed: {}", e))?;

    // 설정 파일이 있으면 파일+환경 변수, 없으면 환경 변수만
    let config = match AppConfig::load_default() {
        Ok(config) => config,
        Err(_) => {
            warn!("config/default.toml not found, loading configuration from environment");
            AppConfig::from_env()?
        }
    };

    // 데이터베이스 연결
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&config.database.url)
        .await?;
    run_migrations(&pool).await?;
    info!("Database connected and migrated");

    // 서명 키 파생은 여기서 실패하면 치명적
    let state = AppState::with_pg_pool(pool, &config.auth)
        .map_err(|e| anyhow::anyhow!("signing key derivation failed: {}", e))?;
    info!(version = %state.version, "Application state initialized");

    // 로컬 프런트엔드만 허용
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| {
            origin.as_bytes().starts_with(b"http://localhost")
                || origin.as_bytes().starts_with(b"http://127.0.0.1")
        }))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let app = create_api_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::new(Duration::from_secs(30)));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
